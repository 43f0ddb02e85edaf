//! Port traits: the hexagonal boundary between the clock logic and the
//! peripherals.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ClockService (domain)
//! ```
//!
//! [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter) implements
//! every port over the real drivers; tests implement them in memory.
//! All port errors are the crate [`Error`](crate::error::Error); callers
//! branch on [`Error::is_fatal`](crate::error::Error::is_fatal).

use crate::clock_time::ClockTime;
use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Clock port (RTC → domain)
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    fn read_time(&mut self) -> Result<ClockTime>;

    fn set_time(&mut self, time: &ClockTime) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → servos)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorPort {
    /// Move servo `index` to `angle` (0–180). Out-of-range requests are
    /// refused with a non-fatal error and nothing is written.
    fn set_angle(&mut self, index: usize, angle: u16) -> Result<()>;

    /// Number of addressable servos.
    fn actuator_count(&self) -> usize;

    /// Zero every output and release the controllers.
    fn release_all(&mut self) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Text display port (domain → character LCD)
// ───────────────────────────────────────────────────────────────

pub trait TextDisplayPort {
    fn clear(&mut self) -> Result<()>;

    fn set_cursor(&mut self, line: u8, col: u8) -> Result<()>;

    fn print(&mut self, text: &str) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The service reports what it did through this port; adapters decide
/// where it goes.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::ClockEvent);
}
