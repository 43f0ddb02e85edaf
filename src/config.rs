//! System configuration parameters
//!
//! Hardware layout and timing for the clock. Defaults match the reference
//! board in [`crate::pins`]; a JSON override can be baked in at build time
//! through the `SERVOCLOCK_CONFIG` environment variable.

use heapless::Vec;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::drivers::lcd::MAX_COLUMNS;
use crate::pins;
use crate::segments::{DIGIT_COUNT, SEGMENTS_PER_DIGIT};

/// Upper bound on PCA9685 controllers sharing the bus.
pub const MAX_SERVO_CONTROLLERS: usize = 4;
/// Outputs per PCA9685.
pub const CHANNELS_PER_CONTROLLER: u8 = 16;
/// Full-scale 12-bit duty count.
pub const DUTY_FULL_SCALE: u16 = 4095;

/// Core clock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    // --- Bus ---
    pub i2c_baud_hz: u32,
    pub rtc_address: u8,
    pub lcd_address: u8,
    /// PCA9685 addresses, in servo-index order.
    pub servo_controllers: Vec<u8, MAX_SERVO_CONTROLLERS>,

    // --- Servos ---
    /// Servos wired to each controller (channels 0..n).
    pub servos_per_controller: u8,
    /// Total servos across all controllers.
    pub servo_count: u16,
    /// PWM frame rate in Hz
    pub pwm_frequency_hz: u16,
    /// Duty count written for 0°
    pub duty_min: u16,
    /// Duty count written for 180°
    pub duty_max: u16,

    // --- Character display ---
    pub lcd_columns: u8,
    pub lcd_rows: u8,
    /// Print the date on line 1 beneath the greeting.
    pub show_date: bool,

    // --- Timing ---
    /// Poll loop period (milliseconds)
    pub refresh_interval_ms: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        let servo_controllers =
            Vec::from_slice(&[pins::PCA_HOURS_ADDR, pins::PCA_MINUTES_ADDR]).unwrap_or_default();

        Self {
            i2c_baud_hz: pins::I2C_BAUD_HZ,
            rtc_address: pins::RTC_ADDR,
            lcd_address: pins::LCD_ADDR,
            servo_controllers,

            servos_per_controller: pins::SERVOS_PER_CONTROLLER,
            servo_count: (DIGIT_COUNT * SEGMENTS_PER_DIGIT) as u16, // 28
            pwm_frequency_hz: pins::SERVO_PWM_FREQ_HZ,
            duty_min: 0,
            duty_max: DUTY_FULL_SCALE,

            lcd_columns: 20,
            lcd_rows: 4,
            show_date: false,

            refresh_interval_ms: 1000, // 1 Hz
        }
    }
}

impl ClockConfig {
    /// Check the layout is physically possible.
    pub fn validate(&self) -> Result<()> {
        if self.servo_controllers.is_empty() {
            return Err(Error::Config("no servo controllers configured"));
        }
        if self.servos_per_controller == 0 || self.servos_per_controller > CHANNELS_PER_CONTROLLER {
            return Err(Error::Config("servos_per_controller must be 1..=16"));
        }
        let capacity = self.servo_controllers.len() * self.servos_per_controller as usize;
        if usize::from(self.servo_count) > capacity {
            return Err(Error::Config("servo_count exceeds controller capacity"));
        }
        if usize::from(self.servo_count) < DIGIT_COUNT * SEGMENTS_PER_DIGIT {
            return Err(Error::Config("four digits need at least 28 servos"));
        }
        if !(24..=1526).contains(&self.pwm_frequency_hz) {
            return Err(Error::Config("pwm_frequency_hz must be 24..=1526"));
        }
        if self.duty_min >= self.duty_max || self.duty_max > DUTY_FULL_SCALE {
            return Err(Error::Config("duty range must satisfy min < max <= 4095"));
        }
        if !(1..=4).contains(&self.lcd_rows) || !(1..=MAX_COLUMNS).contains(&self.lcd_columns) {
            return Err(Error::Config("lcd geometry must be 1..=4 rows, 1..=40 columns"));
        }
        if self.show_date && self.lcd_rows < 2 {
            return Err(Error::Config("show_date needs a second lcd row"));
        }
        if self.refresh_interval_ms == 0 {
            return Err(Error::Config("refresh_interval_ms must be > 0"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Build-time override from `SERVOCLOCK_CONFIG`, else defaults.
    pub fn load() -> Self {
        match option_env!("SERVOCLOCK_CONFIG") {
            Some(json) => match Self::from_json(json) {
                Ok(config) => {
                    info!("Config loaded from SERVOCLOCK_CONFIG");
                    config
                }
                Err(e) => {
                    warn!("SERVOCLOCK_CONFIG rejected ({}), using defaults", e);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}
