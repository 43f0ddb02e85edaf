//! Unified error types for the ServoClock firmware.
//!
//! Every driver and the orchestrator funnel their failures into [`Error`].
//! All variants are `Copy` so they can be logged, classified, and returned
//! from the poll loop without allocation.
//!
//! Two classes matter to the caller:
//!
//! - **fatal**: the I²C bus failed or the configuration is unusable; the
//!   main loop stops, attempts cleanup and surfaces the error.
//! - **rejected**: an operation was refused before anything was written
//!   (bad servo index/angle, unknown digit, cursor off-screen, garbage
//!   clock registers); it is logged and skipped.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An I²C transaction with `device` failed.
    Bus { device: Device, kind: ErrorKind },
    /// The RTC returned, or was asked to store, an impossible time.
    Clock(ClockError),
    /// A servo write was refused.
    Actuator(ActuatorError),
    /// A character-display request was refused.
    Display(DisplayError),
    /// A digit outside 0–9 was sent to a segment display.
    InvalidDigit(u8),
    /// Configuration is invalid.
    Config(&'static str),
}

impl Error {
    /// Wrap a HAL bus error with the device it came from.
    pub fn bus<E: embedded_hal::i2c::Error>(device: Device, err: &E) -> Self {
        Self::Bus {
            device,
            kind: err.kind(),
        }
    }

    /// Fatal errors end the poll loop; everything else is skipped.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Bus { .. } | Self::Config(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus { device, kind } => write!(f, "bus: {device}: {kind}"),
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::InvalidDigit(d) => write!(f, "segment: no pattern for digit {d}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus devices
// ---------------------------------------------------------------------------

/// Which peripheral a bus transaction was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Rtc,
    Lcd,
    /// PCA9685 at the given 7-bit address.
    PwmController(u8),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rtc => write!(f, "DS1307 RTC"),
            Self::Lcd => write!(f, "HD44780 LCD"),
            Self::PwmController(addr) => write!(f, "PCA9685 @ 0x{addr:02X}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// Register contents do not decode to a calendar time.
    InvalidData,
    /// A caller-supplied time is outside the representable range.
    InvalidTime,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidData => write!(f, "registers hold an invalid time"),
            Self::InvalidTime => write!(f, "time out of range"),
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Servo index is not below the configured servo count.
    InvalidIndex { index: usize, count: usize },
    /// Angle is above 180°.
    InvalidAngle(u16),
    /// PWM channel does not exist on the controller.
    InvalidChannel(u8),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex { index, count } => {
                write!(f, "servo index {index} out of range (0..{count})")
            }
            Self::InvalidAngle(angle) => write!(f, "angle {angle} out of range (0..=180)"),
            Self::InvalidChannel(ch) => write!(f, "PWM channel {ch} out of range (0..16)"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// Cursor position lies outside the panel.
    InvalidCursor { line: u8, col: u8 },
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCursor { line, col } => {
                write!(f, "cursor ({line}, {col}) outside the panel")
            }
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
