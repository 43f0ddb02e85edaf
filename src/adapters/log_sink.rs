//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one structured line per
//! [`ClockEvent`] to the ESP-IDF logger (UART / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::ClockEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`ClockEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ClockEvent) {
        match event {
            ClockEvent::Started => info!("START | poll loop running"),
            // Once per second; keep it out of the default log level.
            ClockEvent::TimeShown { hour, minute } => debug!("TIME  | {:02}:{:02}", hour, minute),
            ClockEvent::GreetingShown { hour, greeting } => {
                info!("GREET | hour={} \"{}\"", hour, greeting);
            }
            ClockEvent::Skipped(e) => warn!("SKIP  | {}", e),
            ClockEvent::Stopped { ticks } => info!("STOP  | after {} ticks", ticks),
        }
    }
}
