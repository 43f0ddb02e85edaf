//! Stop button: the device's Ctrl-C.
//!
//! ## Hardware
//!
//! The BOOT button (GPIO0) is active-low with an on-board pull-up. A
//! falling edge fires an ISR that latches a process-wide atomic flag; the
//! poll loop checks [`stop_requested`] once per iteration and shuts down
//! cleanly.
//!
//! The flag is the only state shared with interrupt context. Host builds
//! have no button; tests and the console call [`request_stop`] directly.

use core::sync::atomic::{AtomicBool, Ordering};

/// Written by the ISR, read by the main loop.
static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Ask the poll loop to stop after the current iteration. ISR-safe.
pub fn request_stop() {
    STOP_REQUESTED.store(true, Ordering::Release);
}

pub fn stop_requested() -> bool {
    STOP_REQUESTED.load(Ordering::Acquire)
}

/// Re-arm after a completed shutdown.
pub fn clear_stop() {
    STOP_REQUESTED.store(false, Ordering::Release);
}

#[cfg(target_os = "espidf")]
pub use esp::StopButton;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_hal::gpio::{Input, InputPin, InterruptType, OutputPin, PinDriver, Pull};
    use esp_idf_hal::peripheral::Peripheral;
    use log::info;

    use super::request_stop;

    /// Owns the button pin for as long as the ISR must stay subscribed.
    pub struct StopButton<'d, P: InputPin + OutputPin> {
        _pin: PinDriver<'d, P, Input>,
    }

    impl<'d, P: InputPin + OutputPin> StopButton<'d, P> {
        /// Configure the pin and subscribe the falling-edge ISR.
        pub fn attach(pin: impl Peripheral<P = P> + 'd) -> anyhow::Result<Self> {
            let mut pin = PinDriver::input(pin)?;
            pin.set_pull(Pull::Up)?;
            pin.set_interrupt_type(InterruptType::NegEdge)?;
            // SAFETY: the callback only stores to an atomic, which is
            // ISR-safe and does not touch any non-'static state.
            unsafe {
                pin.subscribe(request_stop)?;
            }
            pin.enable_interrupt()?;
            info!("Stop button armed (press BOOT to stop)");
            Ok(Self { _pin: pin })
        }
    }
}
