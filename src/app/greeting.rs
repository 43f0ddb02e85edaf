//! Time-of-day greeting shown on the character display.

use core::fmt::Write;

use heapless::String;

use crate::clock_time::ClockTime;

pub const MORNING: &str = "Good Morning!";
pub const AFTERNOON: &str = "Good Afternoon!";
pub const NIGHT: &str = "Good Night!";

/// 05–11 morning, 12–16 afternoon, anything else night.
pub const fn greeting(hour: u8) -> &'static str {
    match hour {
        5..=11 => MORNING,
        12..=16 => AFTERNOON,
        _ => NIGHT,
    }
}

/// `"Sun 27/04/2025"`, sized for one 20-column line.
pub fn date_line(time: &ClockTime) -> String<20> {
    let mut line = String::new();
    let _ = write!(
        line,
        "{} {:02}/{:02}/{:04}",
        time.weekday_name(),
        time.day,
        time.month,
        time.year
    );
    line
}
