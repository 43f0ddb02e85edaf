//! Servo bank spread across one or more PCA9685 controllers.
//!
//! Servo `i` lives on controller `i / servos_per_controller`, channel
//! `i % servos_per_controller`. With the default layout digits 1–2 use
//! channels 0–13 of the first controller and digits 3–4 channels 0–13 of
//! the second.
//!
//! ## Validation contract
//!
//! Out-of-range requests are refused before any bus traffic and logged at
//! `warn`; the caller decides whether to continue (the clock always does).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;
use log::{debug, info, warn};

use crate::config::{ClockConfig, MAX_SERVO_CONTROLLERS};
use crate::drivers::pca9685::Pca9685;
use crate::error::{ActuatorError, Error, Result};

pub const MAX_ANGLE: u16 = 180;

/// Linear map of 0..=180° onto `duty_min..=duty_max`.
pub const fn angle_to_duty(angle: u16, duty_min: u16, duty_max: u16) -> u16 {
    let span = (duty_max - duty_min) as u32;
    duty_min + (angle as u32 * span / MAX_ANGLE as u32) as u16
}

pub struct ServoBank<I2C> {
    controllers: Vec<Pca9685<I2C>, MAX_SERVO_CONTROLLERS>,
    servos_per_controller: u8,
    servo_count: usize,
    duty_min: u16,
    duty_max: u16,
    pwm_frequency_hz: u16,
}

impl<I2C: I2c> ServoBank<I2C> {
    /// Assemble a bank from already-constructed controllers, in servo order.
    ///
    /// `config` must have passed [`ClockConfig::validate`].
    pub fn new(
        controllers: Vec<Pca9685<I2C>, MAX_SERVO_CONTROLLERS>,
        config: &ClockConfig,
    ) -> Result<Self> {
        let capacity = controllers.len() * usize::from(config.servos_per_controller);
        if usize::from(config.servo_count) > capacity {
            return Err(Error::Config("servo_count exceeds controller capacity"));
        }
        Ok(Self {
            controllers,
            servos_per_controller: config.servos_per_controller,
            servo_count: usize::from(config.servo_count),
            duty_min: config.duty_min,
            duty_max: config.duty_max,
            pwm_frequency_hz: config.pwm_frequency_hz,
        })
    }

    /// Configure every controller for the servo frame rate.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<()> {
        for pca in &mut self.controllers {
            pca.init(self.pwm_frequency_hz, delay)?;
        }
        info!(
            "servo bank ready: {} servos on {} controller(s)",
            self.servo_count,
            self.controllers.len()
        );
        Ok(())
    }

    pub fn servo_count(&self) -> usize {
        self.servo_count
    }

    /// Move servo `index` to `angle` degrees. Returns the duty written.
    pub fn set_angle(&mut self, index: usize, angle: u16) -> Result<u16> {
        if index >= self.servo_count {
            warn!("Invalid servo index or angle: servo {} (have {})", index, self.servo_count);
            return Err(ActuatorError::InvalidIndex {
                index,
                count: self.servo_count,
            }
            .into());
        }
        if angle > MAX_ANGLE {
            warn!("Invalid servo index or angle: {} degrees", angle);
            return Err(ActuatorError::InvalidAngle(angle).into());
        }

        let duty = angle_to_duty(angle, self.duty_min, self.duty_max);
        self.write_duty(index, duty)?;
        debug!("Servo {} set to {} degrees (duty {})", index, angle, duty);
        Ok(duty)
    }

    /// Drive every servo to 0°.
    pub fn zero_all(&mut self) -> Result<()> {
        for index in 0..self.servo_count {
            self.set_angle(index, 0)?;
        }
        info!("All {} servos reset to 0 degrees", self.servo_count);
        Ok(())
    }

    /// Switch every channel full-off and put the controllers to sleep.
    ///
    /// Every controller is attempted even if an earlier one fails; the
    /// first error is returned.
    pub fn release(&mut self) -> Result<()> {
        let mut first_error = None;
        for pca in &mut self.controllers {
            let off = pca.all_off();
            let slept = pca.sleep();
            if let Err(e) = off.and(slept) {
                warn!("PCA9685 @ 0x{:02X} not released: {}", pca.address(), e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => {
                info!("servo bank released");
                Ok(())
            }
        }
    }

    fn write_duty(&mut self, index: usize, duty: u16) -> Result<()> {
        let per = usize::from(self.servos_per_controller);
        let channel = (index % per) as u8;
        self.controllers[index / per].set_duty(channel, duty)
    }
}
