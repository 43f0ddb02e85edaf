//! HD44780 character LCD behind a PCF8574 I²C backpack.
//!
//! The expander's eight outputs drive the panel in 4-bit mode:
//!
//! | PCF8574 | P7..P4   | P3        | P2 | P1 | P0 |
//! |---------|----------|-----------|----|----|----|
//! | HD44780 | D7..D4   | backlight | E  | RW | RS |
//!
//! Every byte goes out as two nibbles, high first. Each nibble is latched
//! by pulsing E with 500 µs settling delays around each edge. RW is held
//! low (write-only).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{Device, DisplayError, Error, Result};

const BACKLIGHT: u8 = 0x08;
const ENABLE: u8 = 0x04;
const RS_DATA: u8 = 0x01;
const RS_COMMAND: u8 = 0x00;

const SETTLE_US: u32 = 500;
const CLEAR_MS: u32 = 5;

/// Command bytes
pub mod commands {
    /// Two 8-bit "function set" pulses, then the switch to 4-bit mode.
    pub const INIT_8BIT: u8 = 0x33;
    pub const INIT_4BIT: u8 = 0x32;
    /// 4-bit bus, 2-line addressing, 5x8 font.
    pub const FUNCTION_SET: u8 = 0x28;
    /// Display on, cursor off, blink off.
    pub const DISPLAY_ON: u8 = 0x0C;
    /// Increment cursor, no shift.
    pub const ENTRY_MODE: u8 = 0x06;
    pub const CLEAR: u8 = 0x01;
}

/// DDRAM address commands for the start of lines 0–3 on a 20x4 panel.
pub const LINE_OFFSETS: [u8; 4] = [0x80, 0xC0, 0x94, 0xD4];
/// Widest line an HD44780 can address.
pub const MAX_COLUMNS: u8 = 40;

pub struct CharacterLcd<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    columns: u8,
    rows: u8,
}

impl<I2C: I2c, D: DelayNs> CharacterLcd<I2C, D> {
    /// Create the driver. Call [`init`](Self::init) before use.
    pub fn new(i2c: I2C, delay: D, address: u8, columns: u8, rows: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            columns: columns.min(MAX_COLUMNS),
            rows: rows.min(LINE_OFFSETS.len() as u8),
        }
    }

    /// Put the controller into 4-bit, 2-line mode and clear it.
    pub fn init(&mut self) -> Result<()> {
        for cmd in [
            commands::INIT_8BIT,
            commands::INIT_4BIT,
            commands::FUNCTION_SET,
            commands::DISPLAY_ON,
            commands::ENTRY_MODE,
            commands::CLEAR,
        ] {
            self.command(cmd)?;
        }
        self.delay.delay_ms(CLEAR_MS);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.command(commands::CLEAR)?;
        self.delay.delay_ms(CLEAR_MS);
        Ok(())
    }

    /// Move the cursor to `col` on `line` (both zero-based).
    pub fn set_cursor(&mut self, line: u8, col: u8) -> Result<()> {
        let address = (line < self.rows && col < self.columns)
            .then(|| LINE_OFFSETS[usize::from(line)].checked_add(col))
            .flatten()
            .ok_or(DisplayError::InvalidCursor { line, col })?;
        self.command(address)
    }

    /// Write `text` at the cursor. Characters outside ASCII print as `?`.
    pub fn print(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
            self.send(byte, RS_DATA)?;
        }
        Ok(())
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    fn command(&mut self, cmd: u8) -> Result<()> {
        self.send(cmd, RS_COMMAND)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<()> {
        self.write_nibble(byte & 0xF0, mode)?;
        self.write_nibble((byte << 4) & 0xF0, mode)
    }

    /// Present `nibble` (already in bits 7..4) and strobe E.
    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<()> {
        let value = nibble | BACKLIGHT | mode;
        self.expander_write(value)?;
        self.delay.delay_us(SETTLE_US);
        self.expander_write(value | ENABLE)?;
        self.delay.delay_us(SETTLE_US);
        self.expander_write(value & !ENABLE)?;
        self.delay.delay_us(SETTLE_US);
        Ok(())
    }

    fn expander_write(&mut self, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[value])
            .map_err(|e| Error::bus(Device::Lcd, &e))
    }
}
