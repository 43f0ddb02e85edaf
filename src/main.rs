//! ServoClock Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter                            LogEventSink       │
//! │  (Clock + Actuator + TextDisplay)           (EventSink)        │
//! │   ├─ Ds1307      @ 0x68 ┐                                      │
//! │   ├─ CharacterLcd @ 0x27 ├─ one I²C bus (RefCellDevice)        │
//! │   └─ ServoBank   @ 0x40/0x41 ┘                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ClockService (pure logic)                 │    │
//! │  │  digits · segment patterns · greeting                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  StopButton (BOOT, GPIO0) ──▶ atomic stop flag                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::cell::RefCell;

use anyhow::Result;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_hal::delay::Ets;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use log::{error, info};

use servoclock::adapters::hardware::HardwareAdapter;
use servoclock::adapters::log_sink::LogEventSink;
use servoclock::app::service::ClockService;
use servoclock::config::ClockConfig;
use servoclock::drivers::button::{StopButton, stop_requested};
use servoclock::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ServoClock v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = ClockConfig::load();
    config.validate()?;

    // ── 3. Shared I²C bus ─────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(config.i2c_baud_hz.Hz()),
    )?;
    info!(
        "I2C initialized (SDA={}, SCL={}, {} Hz)",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        config.i2c_baud_hz
    );
    let bus = RefCell::new(i2c);

    // ── 4. Stop button ────────────────────────────────────────
    let _button = StopButton::attach(peripherals.pins.gpio0)?;
    info!("Stop button on GPIO{}", pins::STOP_BUTTON_GPIO);

    // ── 5. Peripherals behind the port traits ─────────────────
    let mut hw = match HardwareAdapter::build(|| RefCellDevice::new(&bus), Ets, &config) {
        Ok(hw) => hw,
        Err(e) => {
            error!("Hardware init failed: {}", e);
            return Err(e.into());
        }
    };

    // ── 6. Poll loop ──────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut clock = ClockService::new(&config);
    info!("Clock running. Press BOOT to stop.");

    let outcome = clock.run(&mut hw, &mut sink, stop_requested, std::thread::sleep);

    info!("Program terminated");
    outcome.map_err(Into::into)
}
