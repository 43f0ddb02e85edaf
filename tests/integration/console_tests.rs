//! Bring-up console and bus scan tests.

use core::cell::RefCell;
use std::io::Cursor;

use embedded_hal_bus::i2c::RefCellDevice;

use servoclock::adapters::hardware::HardwareAdapter;
use servoclock::app::greeting::MORNING;
use servoclock::clock_time::ClockTime;
use servoclock::config::ClockConfig;
use servoclock::diagnostics::{ConsoleError, missing_devices, run_console, scan_bus};
use servoclock::pins;

use crate::mock_hw::{HwCall, MockClockHw, NoDelay, SimBus};

fn session(input: &str, hw: &mut MockClockHw) -> (Result<(), ConsoleError>, String) {
    let mut output = Vec::new();
    let result = run_console(&mut Cursor::new(input.as_bytes()), &mut output, hw);
    (result, String::from_utf8(output).unwrap())
}

#[test]
fn moves_a_servo_and_quits() {
    let mut hw = MockClockHw::at(9, 5);
    let (result, out) = session("0 90\nservo 27 180\nq\n", &mut hw);
    result.unwrap();

    assert!(out.contains("Servo 0 set to 90 degrees."));
    assert!(out.contains("Servo 27 set to 180 degrees."));
    assert!(out.ends_with("Exiting...\n"));
    assert_eq!(hw.angles(), vec![(0, 90), (27, 180)]);
}

#[test]
fn rejects_bad_servo_input_and_keeps_prompting() {
    let mut hw = MockClockHw::at(9, 5);
    let (result, out) = session("0 181\n-1 90\n28 90\nabc\n0\nquit\n", &mut hw);
    result.unwrap();

    assert_eq!(out.matches("Invalid servo index or angle.").count(), 3);
    assert!(out.contains("Unknown command"));
    assert!(out.contains("Invalid input. Use: servo_index angle"));
    // Only the in-range-but-missing index reached the hardware.
    assert_eq!(hw.angles(), vec![(28, 90)]);
}

#[test]
fn greet_previews_the_greeting() {
    let mut hw = MockClockHw::at(9, 5);
    let (result, out) = session("greet 7\ngreet 24\ngreet x\n", &mut hw);
    result.unwrap();

    assert!(out.contains("Showing \"Good Morning!\""));
    assert!(out.contains("Please enter a valid hour between 0 and 23"));
    assert!(out.contains("Please enter a valid number"));
    assert_eq!(hw.printed(), vec![MORNING]);
}

#[test]
fn reads_and_sets_the_rtc() {
    let mut hw = MockClockHw::at(9, 5);
    let (result, out) = session("time\nset 2026-01-02 03:04:05\ntime\n", &mut hw);
    result.unwrap();

    assert!(out.contains("Current Time: 2025-04-27 09:05:00"));
    assert!(out.contains("RTC set to 2026-01-02 03:04:05"));
    assert!(out.contains("Current Time: 2026-01-02 03:04:05"));
    assert_eq!(
        hw.count(&HwCall::SetTime(ClockTime::new(2026, 1, 2, 3, 4, 5).unwrap())),
        1
    );
}

#[test]
fn zero_drives_every_servo() {
    let mut hw = MockClockHw::at(9, 5);
    let (result, out) = session("zero\n", &mut hw);
    result.unwrap();

    assert!(out.contains("All 28 servos reset to 0 degrees"));
    assert_eq!(hw.angles(), (0..28).map(|i| (i, 0)).collect::<Vec<_>>());
}

#[test]
fn eof_releases_servos_and_clears_display() {
    let mut hw = MockClockHw::at(9, 5);
    let (result, _) = session("", &mut hw);
    result.unwrap();
    assert_eq!(hw.calls, vec![HwCall::ReleaseAll, HwCall::Clear]);
}

#[test]
fn fatal_bus_error_ends_session_after_cleanup() {
    let mut hw = MockClockHw::at(9, 5);
    hw.bus_down = true;
    let (result, out) = session("0 90\n1 90\n", &mut hw);

    assert!(matches!(result, Err(ConsoleError::Device(e)) if e.is_fatal()));
    assert!(out.ends_with("Exiting...\n"));
    assert_eq!(
        hw.calls,
        vec![
            HwCall::SetAngle { index: 0, angle: 90 },
            HwCall::ReleaseAll,
            HwCall::Clear,
        ]
    );
}

#[test]
fn console_drives_real_drivers() {
    let bus = RefCell::new(SimBus::clock_board());
    let config = ClockConfig::default();
    let mut hw = HardwareAdapter::build(|| RefCellDevice::new(&bus), NoDelay, &config).unwrap();
    let mut output = Vec::new();

    run_console(&mut Cursor::new(&b"3 180\ngreet 9\n"[..]), &mut output, &mut hw).unwrap();

    let sim = bus.borrow();
    // Released on exit.
    assert_eq!(sim.servo_duty(3), Some(0));
    assert!(sim.pwm_asleep(pins::PCA_HOURS_ADDR));
    assert_eq!(sim.lcd.line(0), "");
    assert_eq!(sim.lcd.chars_written, MORNING.len());
}

#[test]
fn scan_finds_every_board_device() {
    let bus = RefCell::new(SimBus::clock_board());
    let found = scan_bus(&mut RefCellDevice::new(&bus));
    assert_eq!(found.as_slice(), &[0x27, 0x40, 0x41, 0x68]);
    assert!(missing_devices(&found, &ClockConfig::default()).is_empty());
}

#[test]
fn scan_reports_missing_controller() {
    let bus = RefCell::new(SimBus::clock_board());
    bus.borrow_mut().remove_device(pins::PCA_MINUTES_ADDR);
    let found = scan_bus(&mut RefCellDevice::new(&bus));
    let missing = missing_devices(&found, &ClockConfig::default());
    assert_eq!(missing.as_slice(), &[pins::PCA_MINUTES_ADDR]);
}
