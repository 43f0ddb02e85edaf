//! Clock service: the orchestrator.
//!
//! [`ClockService`] owns the four segment displays and the "last displayed
//! hour" state. All I/O flows through port traits passed in at call sites,
//! so the whole poll loop runs against in-memory mocks in tests.
//!
//! ```text
//!  ClockPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                │      ClockService      │
//! ActuatorPort ◀─│ digits · greeting      │─▶ TextDisplayPort
//!                └────────────────────────┘
//! ```
//!
//! ## Greeting state
//!
//! `last_hour` starts as `None`, so the first successful tick always draws
//! the greeting. After that the display is only touched when the freshly
//! read hour differs from the stored one.

use core::time::Duration;

use log::{error, info, warn};

use crate::clock_time::ClockTime;
use crate::config::ClockConfig;
use crate::error::Result;
use crate::segments::{DIGIT_COUNT, SegmentDisplay, time_digits};

use super::events::ClockEvent;
use super::greeting::{date_line, greeting};
use super::ports::{ActuatorPort, ClockPort, EventSink, TextDisplayPort};

pub struct ClockService {
    displays: [SegmentDisplay; DIGIT_COUNT],
    last_hour: Option<u8>,
    refresh_interval: Duration,
    show_date: bool,
    tick_count: u64,
}

impl ClockService {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            displays: SegmentDisplay::clock_face(),
            last_hour: None,
            refresh_interval: Duration::from_millis(u64::from(config.refresh_interval_ms)),
            show_date: config.show_date,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Clear the character display before the first tick.
    pub fn start(
        &mut self,
        hw: &mut impl TextDisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        hw.clear()?;
        sink.emit(&ClockEvent::Started);
        info!("ClockService started");
        Ok(())
    }

    /// Start, poll until `should_stop` returns `true`, then shut down.
    ///
    /// `sleep` is called with the refresh interval after every tick. A
    /// fatal error ends the loop early; shutdown is still attempted and the
    /// first error is returned.
    pub fn run<H>(
        &mut self,
        hw: &mut H,
        sink: &mut impl EventSink,
        mut should_stop: impl FnMut() -> bool,
        mut sleep: impl FnMut(Duration),
    ) -> Result<()>
    where
        H: ClockPort + ActuatorPort + TextDisplayPort,
    {
        let outcome = match self.start(hw, sink) {
            Ok(()) => loop {
                if should_stop() {
                    info!("Stop requested after {} ticks", self.tick_count);
                    break Ok(());
                }
                if let Err(e) = self.tick(hw, sink) {
                    error!("Fatal: {}", e);
                    break Err(e);
                }
                sleep(self.refresh_interval);
            },
            Err(e) => Err(e),
        };

        let cleanup = self.shutdown(hw, sink);
        match (outcome, cleanup) {
            (Err(e), Err(cleanup_err)) => {
                error!("Cleanup after fatal error failed: {}", cleanup_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), cleanup) => cleanup,
        }
    }

    /// Clear the character display and release every servo.
    ///
    /// Both steps are attempted even if the first one fails.
    pub fn shutdown(
        &mut self,
        hw: &mut (impl ActuatorPort + TextDisplayPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let cleared = hw.clear();
        let released = hw.release_all();
        sink.emit(&ClockEvent::Stopped {
            ticks: self.tick_count,
        });
        cleared.and(released)
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One poll iteration: read the RTC, drive the digits, refresh the
    /// greeting if the hour changed.
    ///
    /// Only fatal errors are returned; rejected operations are reported
    /// through `sink` and skipped.
    pub fn tick(
        &mut self,
        hw: &mut (impl ClockPort + ActuatorPort + TextDisplayPort),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.tick_count += 1;

        let now = match hw.read_time() {
            Ok(now) => now,
            Err(e) => return absorb(Err(e), sink),
        };

        self.show_time(hw, now.hour, now.minute, sink)?;

        if self.last_hour != Some(now.hour) {
            match self.draw_greeting(hw, &now) {
                Ok(()) => {
                    self.last_hour = Some(now.hour);
                    sink.emit(&ClockEvent::GreetingShown {
                        hour: now.hour,
                        greeting: greeting(now.hour),
                    });
                }
                // Retried on the next tick.
                Err(e) => absorb(Err(e), sink)?,
            }
        }
        Ok(())
    }

    /// Drive the four digit displays to `hour:minute`.
    pub fn show_time(
        &self,
        hw: &mut impl ActuatorPort,
        hour: u8,
        minute: u8,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        for (display, digit) in self.displays.iter().zip(time_digits(hour, minute)) {
            absorb(display.show(digit, hw), sink)?;
        }
        sink.emit(&ClockEvent::TimeShown { hour, minute });
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Hour currently shown by the greeting, `None` before the first draw.
    pub fn last_hour(&self) -> Option<u8> {
        self.last_hour
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn displays(&self) -> &[SegmentDisplay; DIGIT_COUNT] {
        &self.displays
    }

    // ── Internal ──────────────────────────────────────────────

    fn draw_greeting(&self, hw: &mut impl TextDisplayPort, now: &ClockTime) -> Result<()> {
        hw.clear()?;
        hw.set_cursor(0, 0)?;
        hw.print(greeting(now.hour))?;
        if self.show_date {
            hw.set_cursor(1, 0)?;
            hw.print(&date_line(now))?;
        }
        Ok(())
    }
}

/// Pass fatal errors through; log and report everything else.
fn absorb(result: Result<()>, sink: &mut impl EventSink) -> Result<()> {
    match result {
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!("Skipped: {}", e);
            sink.emit(&ClockEvent::Skipped(e));
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}

