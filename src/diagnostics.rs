//! Hardware bring-up diagnostics.
//!
//! Not part of the clock's poll loop. The `bringup` binary uses these to
//! check wiring before the clock firmware is flashed:
//!
//! - [`scan_bus`] reads one byte from every 7-bit address and reports who answers.
//! - [`run_console`] is a line-oriented prompt for driving single servos,
//!   previewing greetings, and reading or setting the RTC.
//!
//! Console grammar (one command per line):
//!
//! ```text
//! <index> <angle> | servo <index> <angle>   move one servo
//! greet <hour>                              show the greeting for hour 0-23
//! time                                      print the RTC time
//! set YYYY-MM-DD HH:MM:SS                   set the RTC
//! zero                                      drive every servo to 0 degrees
//! help
//! q | quit
//! ```

use core::fmt;
use std::io::{BufRead, Write};

use embedded_hal::i2c::I2c;
use heapless::Vec;

use crate::app::greeting::greeting;
use crate::app::ports::{ActuatorPort, ClockPort, TextDisplayPort};
use crate::clock_time::ClockTime;
use crate::config::{ClockConfig, MAX_SERVO_CONTROLLERS};
use crate::drivers::servo::MAX_ANGLE;
use crate::error::Error;

// ── Bus scan ──────────────────────────────────────────────────

/// First and last non-reserved 7-bit addresses.
const SCAN_RANGE: core::ops::RangeInclusive<u8> = 0x08..=0x77;

/// Addresses that acknowledge a one-byte read.
pub fn scan_bus(i2c: &mut impl I2c) -> Vec<u8, 112> {
    let mut buf = [0u8; 1];
    SCAN_RANGE
        .filter(|&address| i2c.read(address, &mut buf).is_ok())
        .collect()
}

/// Configured devices that did not answer a scan.
pub fn missing_devices(
    found: &[u8],
    config: &ClockConfig,
) -> Vec<u8, { MAX_SERVO_CONTROLLERS + 2 }> {
    [config.rtc_address, config.lcd_address]
        .into_iter()
        .chain(config.servo_controllers.iter().copied())
        .filter(|address| !found.contains(address))
        .collect()
}

// ── Command parsing ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Servo { index: usize, angle: u16 },
    Greet(u8),
    ShowTime,
    SetTime(ClockTime),
    Zero,
    Help,
    Quit,
    /// Blank line.
    Empty,
}

/// Why a line was rejected; [`message`](Self::message) is printed before
/// the prompt is shown again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    ServoUsage,
    ServoRange,
    HourRange,
    NotANumber,
    TimeFormat,
    Unknown,
}

impl ParseError {
    pub const fn message(self) -> &'static str {
        match self {
            Self::ServoUsage => "Invalid input. Use: servo_index angle (e.g., '0 90')",
            Self::ServoRange => "Invalid servo index or angle.",
            Self::HourRange => "Please enter a valid hour between 0 and 23",
            Self::NotANumber => "Please enter a valid number",
            Self::TimeFormat => "Invalid time. Use: set YYYY-MM-DD HH:MM:SS",
            Self::Unknown => "Unknown command. Type 'help' for a list.",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, ParseError> {
    let mut tokens: Vec<&str, 4> = Vec::new();
    for token in line.split_whitespace() {
        tokens.push(token).map_err(|_| ParseError::Unknown)?;
    }
    let Some(&first) = tokens.first() else {
        return Ok(ConsoleCommand::Empty);
    };

    match first.to_ascii_lowercase().as_str() {
        "q" | "quit" if tokens.len() == 1 => Ok(ConsoleCommand::Quit),
        "help" | "?" if tokens.len() == 1 => Ok(ConsoleCommand::Help),
        "time" if tokens.len() == 1 => Ok(ConsoleCommand::ShowTime),
        "zero" if tokens.len() == 1 => Ok(ConsoleCommand::Zero),
        "greet" => parse_greet(&tokens[1..]),
        "servo" => parse_servo(&tokens[1..]),
        "set" => parse_set(&tokens[1..]),
        _ if first.parse::<i64>().is_ok() => parse_servo(&tokens),
        _ => Err(ParseError::Unknown),
    }
}

fn parse_servo(args: &[&str]) -> Result<ConsoleCommand, ParseError> {
    let [index, angle] = args else {
        return Err(ParseError::ServoUsage);
    };
    let index: i64 = index.parse().map_err(|_| ParseError::ServoUsage)?;
    let angle: i64 = angle.parse().map_err(|_| ParseError::ServoUsage)?;
    let index = usize::try_from(index).map_err(|_| ParseError::ServoRange)?;
    let angle = u16::try_from(angle)
        .ok()
        .filter(|&a| a <= MAX_ANGLE)
        .ok_or(ParseError::ServoRange)?;
    Ok(ConsoleCommand::Servo { index, angle })
}

fn parse_greet(args: &[&str]) -> Result<ConsoleCommand, ParseError> {
    let [hour] = args else {
        return Err(ParseError::NotANumber);
    };
    let hour: i64 = hour.parse().map_err(|_| ParseError::NotANumber)?;
    match u8::try_from(hour) {
        Ok(hour) if hour < 24 => Ok(ConsoleCommand::Greet(hour)),
        _ => Err(ParseError::HourRange),
    }
}

fn parse_set(args: &[&str]) -> Result<ConsoleCommand, ParseError> {
    let [date, time] = args else {
        return Err(ParseError::TimeFormat);
    };
    let [year, month, day] = split_fields::<3>(date, '-').ok_or(ParseError::TimeFormat)?;
    let [hour, minute, second] = split_fields::<3>(time, ':').ok_or(ParseError::TimeFormat)?;
    let year = u16::try_from(year).map_err(|_| ParseError::TimeFormat)?;
    let narrow = |v: u32| u8::try_from(v).map_err(|_| ParseError::TimeFormat);
    ClockTime::new(
        year,
        narrow(month)?,
        narrow(day)?,
        narrow(hour)?,
        narrow(minute)?,
        narrow(second)?,
    )
    .map(ConsoleCommand::SetTime)
    .map_err(|_| ParseError::TimeFormat)
}

/// Exactly `N` unsigned fields separated by `sep`.
fn split_fields<const N: usize>(text: &str, sep: char) -> Option<[u32; N]> {
    let mut fields = [0u32; N];
    let mut parts = text.split(sep);
    for field in &mut fields {
        *field = parts.next()?.parse().ok()?;
    }
    parts.next().is_none().then_some(fields)
}

// ── Console session ───────────────────────────────────────────

const HELP: &str = "\
Commands:
  <index> <angle>          move one servo (angle 0-180)
  servo <index> <angle>    same as above
  greet <hour>             show the greeting for hour 0-23
  time                     print the RTC time
  set YYYY-MM-DD HH:MM:SS  set the RTC
  zero                     drive every servo to 0 degrees
  q                        quit";

#[derive(Debug)]
pub enum ConsoleError {
    Io(std::io::Error),
    Device(Error),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "console I/O: {e}"),
            Self::Device(e) => write!(f, "device: {e}"),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<Error> for ConsoleError {
    fn from(e: Error) -> Self {
        Self::Device(e)
    }
}

/// Prompt on `output`, execute lines from `input` until `q` or EOF.
///
/// Bad input prints a diagnostic and reprompts. On exit every servo is
/// released and the display cleared, also after a fatal bus error.
pub fn run_console<H>(
    input: &mut impl BufRead,
    output: &mut impl Write,
    hw: &mut H,
) -> Result<(), ConsoleError>
where
    H: ClockPort + ActuatorPort + TextDisplayPort,
{
    let session = console_session(input, output, hw);
    let released = hw.release_all();
    let cleared = hw.clear();
    writeln!(output, "Exiting...")?;
    session?;
    released?;
    cleared?;
    Ok(())
}

fn console_session<H>(
    input: &mut impl BufRead,
    output: &mut impl Write,
    hw: &mut H,
) -> Result<(), ConsoleError>
where
    H: ClockPort + ActuatorPort + TextDisplayPort,
{
    writeln!(output, "{HELP}")?;
    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        match parse_command(&line) {
            Ok(ConsoleCommand::Quit) => return Ok(()),
            Ok(command) => execute(command, output, hw)?,
            Err(e) => writeln!(output, "{e}")?,
        }
    }
}

fn execute<H>(
    command: ConsoleCommand,
    output: &mut impl Write,
    hw: &mut H,
) -> Result<(), ConsoleError>
where
    H: ClockPort + ActuatorPort + TextDisplayPort,
{
    match command {
        ConsoleCommand::Servo { index, angle } => match hw.set_angle(index, angle) {
            Ok(()) => writeln!(output, "Servo {index} set to {angle} degrees.")?,
            Err(e) if !e.is_fatal() => writeln!(output, "{}", ParseError::ServoRange)?,
            Err(e) => return Err(e.into()),
        },
        ConsoleCommand::Greet(hour) => {
            let text = greeting(hour);
            hw.clear()?;
            hw.set_cursor(0, 0)?;
            hw.print(text)?;
            writeln!(output, "Showing \"{text}\"")?;
        }
        ConsoleCommand::ShowTime => match hw.read_time() {
            Ok(now) => writeln!(output, "Current Time: {now}")?,
            Err(e) if !e.is_fatal() => writeln!(output, "RTC holds no valid time; use 'set'")?,
            Err(e) => return Err(e.into()),
        },
        ConsoleCommand::SetTime(time) => {
            hw.set_time(&time)?;
            writeln!(output, "RTC set to {time}")?;
        }
        ConsoleCommand::Zero => {
            let count = hw.actuator_count();
            for index in 0..count {
                hw.set_angle(index, 0)?;
            }
            writeln!(output, "All {count} servos reset to 0 degrees")?;
        }
        ConsoleCommand::Help => writeln!(output, "{HELP}")?,
        ConsoleCommand::Quit | ConsoleCommand::Empty => {}
    }
    Ok(())
}
