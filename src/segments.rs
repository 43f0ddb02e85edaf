//! Seven-segment glyphs rendered with servos.
//!
//! Each digit is seven servos, one per segment, flipped to 180° to show the
//! segment and 0° to hide it:
//!
//! ```text
//!    aaa
//!   f   b
//!    ggg
//!   e   c
//!    ddd
//! ```
//!
//! The four digits of `HH:MM` occupy disjoint servo ranges starting at
//! 0, 7, 14 and 21.

use crate::app::ports::ActuatorPort;
use crate::error::{Error, Result};

pub const SEGMENTS_PER_DIGIT: usize = 7;
pub const DIGIT_COUNT: usize = 4;

/// Servo angle for a visible segment.
pub const SEGMENT_ON: u16 = 180;
/// Servo angle for a hidden segment.
pub const SEGMENT_OFF: u16 = 0;

const X: u16 = SEGMENT_ON;
const O: u16 = SEGMENT_OFF;

/// Segment angles a..g for digits 0–9.
pub const DIGIT_PATTERNS: [[u16; SEGMENTS_PER_DIGIT]; 10] = [
    [X, X, X, X, X, X, O], // 0
    [O, X, X, O, O, O, O], // 1
    [X, X, O, X, X, O, X], // 2
    [X, X, X, X, O, O, X], // 3
    [O, X, X, O, O, X, X], // 4
    [X, O, X, X, O, X, X], // 5
    [X, O, X, X, X, X, X], // 6
    [X, X, X, O, O, O, O], // 7
    [X, X, X, X, X, X, X], // 8
    [X, X, X, X, O, X, X], // 9
];

/// Angles for `digit`, or `None` outside 0–9.
pub fn pattern(digit: u8) -> Option<&'static [u16; SEGMENTS_PER_DIGIT]> {
    DIGIT_PATTERNS.get(usize::from(digit))
}

/// Split a two-digit value into (tens, ones).
pub const fn split_digits(value: u8) -> (u8, u8) {
    (value / 10, value % 10)
}

/// The four digits shown for `hour:minute`, most significant first.
pub const fn time_digits(hour: u8, minute: u8) -> [u8; DIGIT_COUNT] {
    let (h_tens, h_ones) = split_digits(hour);
    let (m_tens, m_ones) = split_digits(minute);
    [h_tens, h_ones, m_tens, m_ones]
}

/// One digit position: seven consecutive servos starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentDisplay {
    offset: usize,
}

impl SegmentDisplay {
    pub const fn new(offset: usize) -> Self {
        Self { offset }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The four displays for `HH:MM`.
    pub const fn clock_face() -> [Self; DIGIT_COUNT] {
        [
            Self::new(0),
            Self::new(SEGMENTS_PER_DIGIT),
            Self::new(2 * SEGMENTS_PER_DIGIT),
            Self::new(3 * SEGMENTS_PER_DIGIT),
        ]
    }

    /// Drive the seven servos to show `digit`, segments a..g in order.
    ///
    /// Digits above 9 write nothing and return [`Error::InvalidDigit`].
    /// A rejected servo write is skipped and the remaining segments are
    /// still written; a bus failure aborts immediately.
    pub fn show(&self, digit: u8, actuators: &mut impl ActuatorPort) -> Result<()> {
        let angles = pattern(digit).ok_or(Error::InvalidDigit(digit))?;
        for (segment, &angle) in angles.iter().enumerate() {
            if let Err(e) = actuators.set_angle(self.offset + segment, angle) {
                if e.is_fatal() {
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
