//! Outbound application events.
//!
//! The [`ClockService`](super::service::ClockService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEvent {
    /// The service cleared the display and entered the poll loop.
    Started,

    /// The segment displays were driven to `hour:minute`.
    TimeShown { hour: u8, minute: u8 },

    /// The hour changed and the greeting was redrawn.
    GreetingShown { hour: u8, greeting: &'static str },

    /// A non-fatal error; the operation was skipped.
    Skipped(Error),

    /// The loop ended after `ticks` iterations.
    Stopped { ticks: u64 },
}
