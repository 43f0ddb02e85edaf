//! Servo seven-segment clock firmware library.
//!
//! Exposes the drivers, the clock service and the bring-up diagnostics to
//! both binaries and to the host-side integration tests. Everything except
//! [`drivers::button::StopButton`] is generic over `embedded-hal` traits
//! and builds on the host with `--no-default-features`.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod clock_time;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod segments;
