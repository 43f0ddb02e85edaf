//! Bring-up console.
//!
//! Scans the I²C bus, reports any configured device that did not answer,
//! then hands the serial console to an interactive prompt for moving
//! individual servos and setting the RTC. Flash this before the clock
//! firmware when wiring a new board.

use core::cell::RefCell;
use std::io;

use anyhow::Result;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_hal::delay::Ets;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use log::{info, warn};

use servoclock::adapters::hardware::HardwareAdapter;
use servoclock::config::ClockConfig;
use servoclock::diagnostics::{missing_devices, run_console, scan_bus};

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = ClockConfig::load();
    config.validate()?;

    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(config.i2c_baud_hz.Hz()),
    )?;
    let bus = RefCell::new(i2c);

    info!("Scanning I2C bus...");
    let found = scan_bus(&mut RefCellDevice::new(&bus));
    if found.is_empty() {
        warn!("No I2C devices found");
    }
    for address in &found {
        info!("I2C device found at address 0x{:02X}", address);
    }
    let missing = missing_devices(&found, &config);
    for address in &missing {
        warn!("Expected device at 0x{:02X} did not respond", address);
    }
    if !missing.is_empty() {
        anyhow::bail!("{} configured device(s) missing, check wiring", missing.len());
    }

    let mut hw = HardwareAdapter::build(|| RefCellDevice::new(&bus), Ets, &config)?;
    info!("Servo control ready ({} servos)", config.servo_count);

    let stdin = io::stdin();
    run_console(&mut stdin.lock(), &mut io::stdout(), &mut hw)?;

    info!("Program terminated");
    Ok(())
}
