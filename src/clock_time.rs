//! Calendar time as held by the RTC.
//!
//! The DS1307 stores two-digit years, so the representable range is
//! 2000-01-01 00:00:00 through 2099-12-31 23:59:59.

use core::fmt;

use crate::error::ClockError;

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// A validated wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    /// ISO weekday, Monday = 1 … Sunday = 7.
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ClockTime {
    /// Build a time, deriving the weekday from the date.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, ClockError> {
        let time = Self {
            year,
            month,
            day,
            weekday: 1,
            hour,
            minute,
            second,
        };
        if !time.is_valid() {
            return Err(ClockError::InvalidTime);
        }
        Ok(Self {
            weekday: iso_weekday(year, month, day),
            ..time
        })
    }

    /// Calendar and clock ranges hold (weekday is not cross-checked).
    pub fn is_valid(&self) -> bool {
        (2000..=2099).contains(&self.year)
            && (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && (1..=7).contains(&self.weekday)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }

    /// Three-letter weekday name.
    pub fn weekday_name(&self) -> &'static str {
        WEEKDAY_NAMES[usize::from(self.weekday.clamp(1, 7) - 1)]
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Sakamoto's method, remapped so Monday = 1 and Sunday = 7.
pub fn iso_weekday(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let y = if month < 3 { year - 1 } else { year };
    let dow =
        (y + y / 4 - y / 100 + y / 400 + OFFSETS[usize::from(month - 1)] + u16::from(day)) % 7;
    // dow: 0 = Sunday
    if dow == 0 { 7 } else { dow as u8 }
}
