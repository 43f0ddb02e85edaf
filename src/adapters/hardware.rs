//! Hardware adapter: bridges the bus drivers to the domain port traits.
//!
//! Owns the RTC, LCD and servo bank drivers, each holding its own handle
//! onto the shared I²C bus, and exposes them through [`ClockPort`],
//! [`ActuatorPort`] and [`TextDisplayPort`]. Generic over the bus and delay
//! types so integration tests can run it on a simulated bus.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;
use log::{info, warn};

use crate::app::ports::{ActuatorPort, ClockPort, TextDisplayPort};
use crate::clock_time::ClockTime;
use crate::config::ClockConfig;
use crate::drivers::ds1307::Ds1307;
use crate::drivers::lcd::CharacterLcd;
use crate::drivers::pca9685::Pca9685;
use crate::drivers::servo::ServoBank;
use crate::error::{Error, Result};

/// Concrete adapter that combines all peripherals behind port traits.
pub struct HardwareAdapter<I2C, D> {
    rtc: Ds1307<I2C>,
    lcd: CharacterLcd<I2C, D>,
    servos: ServoBank<I2C>,
}

impl<I2C: I2c, D: DelayNs> HardwareAdapter<I2C, D> {
    pub fn new(rtc: Ds1307<I2C>, lcd: CharacterLcd<I2C, D>, servos: ServoBank<I2C>) -> Self {
        Self { rtc, lcd, servos }
    }

    /// Construct and initialise every driver.
    ///
    /// `bus` is called once per device and must hand out a handle onto the
    /// same physical bus (e.g. an `embedded_hal_bus::i2c::RefCellDevice`).
    /// A halted RTC is started.
    pub fn build(mut bus: impl FnMut() -> I2C, mut delay: D, config: &ClockConfig) -> Result<Self> {
        config.validate()?;

        let mut controllers = Vec::new();
        for &address in &config.servo_controllers {
            controllers
                .push(Pca9685::new(bus(), address))
                .map_err(|_| Error::Config("too many servo controllers"))?;
        }
        let mut servos = ServoBank::new(controllers, config)?;
        servos.init(&mut delay)?;

        let mut lcd = CharacterLcd::new(
            bus(),
            delay,
            config.lcd_address,
            config.lcd_columns,
            config.lcd_rows,
        );
        lcd.init()?;
        info!(
            "LCD @ 0x{:02X} initialized ({}x{})",
            config.lcd_address, config.lcd_columns, config.lcd_rows
        );

        let mut rtc = Ds1307::new(bus(), config.rtc_address);
        if !rtc.is_running()? {
            warn!("RTC is not running, starting it...");
            rtc.set_running(true)?;
        }
        info!("DS1307 @ 0x{:02X} initialized", config.rtc_address);

        Ok(Self::new(rtc, lcd, servos))
    }

    pub fn rtc_mut(&mut self) -> &mut Ds1307<I2C> {
        &mut self.rtc
    }

    pub fn lcd_mut(&mut self) -> &mut CharacterLcd<I2C, D> {
        &mut self.lcd
    }

    pub fn servos_mut(&mut self) -> &mut ServoBank<I2C> {
        &mut self.servos
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<I2C: I2c, D: DelayNs> ClockPort for HardwareAdapter<I2C, D> {
    fn read_time(&mut self) -> Result<ClockTime> {
        self.rtc.read_time()
    }

    fn set_time(&mut self, time: &ClockTime) -> Result<()> {
        self.rtc.set_time(time)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C: I2c, D: DelayNs> ActuatorPort for HardwareAdapter<I2C, D> {
    fn set_angle(&mut self, index: usize, angle: u16) -> Result<()> {
        self.servos.set_angle(index, angle).map(|_duty| ())
    }

    fn actuator_count(&self) -> usize {
        self.servos.servo_count()
    }

    fn release_all(&mut self) -> Result<()> {
        self.servos.release()
    }
}

// ── TextDisplayPort implementation ────────────────────────────

impl<I2C: I2c, D: DelayNs> TextDisplayPort for HardwareAdapter<I2C, D> {
    fn clear(&mut self) -> Result<()> {
        self.lcd.clear()
    }

    fn set_cursor(&mut self, line: u8, col: u8) -> Result<()> {
        self.lcd.set_cursor(line, col)
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.lcd.print(text)
    }
}
