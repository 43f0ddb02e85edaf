//! PCA9685 16-channel, 12-bit PWM controller.
//!
//! Only the subset needed to hold servos at a position is implemented:
//! frame-rate setup, per-channel duty, all-off and sleep. Each channel is
//! driven with ON = 0 and OFF = duty, so `duty / 4096` of every frame is high.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::info;

use crate::config::{CHANNELS_PER_CONTROLLER, DUTY_FULL_SCALE};
use crate::error::{ActuatorError, Device, Error, Result};

/// Register addresses
pub mod registers {
    pub const MODE1: u8 = 0x00;
    pub const MODE2: u8 = 0x01;
    /// LED0_ON_L; channel n starts at `LED0_ON_L + 4 * n`.
    pub const LED0_ON_L: u8 = 0x06;
    pub const ALL_LED_ON_L: u8 = 0xFA;
    pub const PRE_SCALE: u8 = 0xFE;
}

/// MODE1 bits
pub mod mode1 {
    pub const RESTART: u8 = 0x80;
    pub const AUTO_INCREMENT: u8 = 0x20;
    pub const SLEEP: u8 = 0x10;
    pub const ALLCALL: u8 = 0x01;
}

/// MODE2: totem-pole outputs.
const MODE2_OUTDRV: u8 = 0x04;
/// Bit 4 of LEDn_OFF_H forces the output fully off.
const FULL_OFF: u8 = 0x10;
/// Internal oscillator frequency.
const OSC_HZ: u32 = 25_000_000;
/// Oscillator start-up time after leaving sleep.
const WAKE_US: u32 = 500;

/// PRE_SCALE value for `freq_hz`: round(osc / (4096 * f)) - 1.
pub const fn prescale_for(freq_hz: u16) -> u8 {
    let steps = 4096 * freq_hz as u32;
    let value = (OSC_HZ + steps / 2) / steps;
    (value - 1) as u8
}

pub struct Pca9685<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Pca9685<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Program the frame rate and enable outputs.
    ///
    /// PRE_SCALE is only writable while asleep, so the chip is put to
    /// sleep, reprogrammed, woken and restarted.
    pub fn init(&mut self, freq_hz: u16, delay: &mut impl DelayNs) -> Result<()> {
        let prescale = prescale_for(freq_hz);
        self.write_reg(registers::MODE1, mode1::SLEEP | mode1::AUTO_INCREMENT)?;
        self.write_reg(registers::PRE_SCALE, prescale)?;
        self.write_reg(registers::MODE2, MODE2_OUTDRV)?;
        self.write_reg(registers::MODE1, mode1::AUTO_INCREMENT | mode1::ALLCALL)?;
        delay.delay_us(WAKE_US);
        self.write_reg(
            registers::MODE1,
            mode1::RESTART | mode1::AUTO_INCREMENT | mode1::ALLCALL,
        )?;
        info!(
            "PCA9685 @ 0x{:02X} initialized ({} Hz, prescale {})",
            self.address, freq_hz, prescale
        );
        Ok(())
    }

    /// Set `channel` (0–15) to `duty` counts out of 4095 (clamped).
    pub fn set_duty(&mut self, channel: u8, duty: u16) -> Result<()> {
        if channel >= CHANNELS_PER_CONTROLLER {
            return Err(ActuatorError::InvalidChannel(channel).into());
        }
        let duty = duty.min(DUTY_FULL_SCALE);
        let [off_l, off_h] = if duty == 0 {
            [0, FULL_OFF]
        } else {
            duty.to_le_bytes()
        };
        let reg = registers::LED0_ON_L + 4 * channel;
        self.write(&[reg, 0, 0, off_l, off_h])
    }

    /// Force every channel fully off in one write.
    pub fn all_off(&mut self) -> Result<()> {
        self.write(&[registers::ALL_LED_ON_L, 0, 0, 0, FULL_OFF])
    }

    /// Stop the oscillator; outputs go low until the next [`init`](Self::init).
    pub fn sleep(&mut self) -> Result<()> {
        self.write_reg(registers::MODE1, mode1::SLEEP | mode1::AUTO_INCREMENT)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.write(&[reg, value])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|e| Error::bus(Device::PwmController(self.address), &e))
    }
}
