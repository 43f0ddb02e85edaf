//! GPIO pin assignments and I²C bus addresses for the ServoClock board.
//!
//! Single source of truth: drivers and the config defaults reference this
//! module rather than hard-coding numbers.

// ---------------------------------------------------------------------------
// I²C bus (RTC, LCD backpack, both PWM controllers)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Standard-mode clock; the DS1307 does not support fast mode.
pub const I2C_BAUD_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Stop button
// ---------------------------------------------------------------------------

/// BOOT button, active low with on-board pull-up.
pub const STOP_BUTTON_GPIO: i32 = 0;

// ---------------------------------------------------------------------------
// Device addresses (7-bit)
// ---------------------------------------------------------------------------

/// DS1307 real-time clock.
pub const RTC_ADDR: u8 = 0x68;
/// PCF8574 backpack on the HD44780 panel (0x3F on some boards).
pub const LCD_ADDR: u8 = 0x27;
/// PCA9685 driving digits 1–2 (hours).
pub const PCA_HOURS_ADDR: u8 = 0x40;
/// PCA9685 driving digits 3–4 (minutes), A0 strapped high.
pub const PCA_MINUTES_ADDR: u8 = 0x41;

// ---------------------------------------------------------------------------
// Servo layout
// ---------------------------------------------------------------------------

/// Each controller drives two digits on channels 0–13.
pub const SERVOS_PER_CONTROLLER: u8 = 14;
/// Frame rate expected by hobby servos.
pub const SERVO_PWM_FREQ_HZ: u16 = 50;
