//! DS1307 real-time clock driver.
//!
//! Seven BCD registers starting at 0x00: seconds, minutes, hours, weekday,
//! date, month, year. Bit 7 of the seconds register is the clock-halt (CH)
//! flag; bit 6 of the hours register selects 12-hour mode, which this
//! firmware never enables, so hours are read as 24-hour values. The weekday
//! register is written on `set_time` but recomputed from the date on read.
//!
//! The driver owns its bus handle; callers must not touch the RTC through
//! another handle concurrently.

use embedded_hal::i2c::I2c;
use log::debug;

use crate::clock_time::ClockTime;
use crate::error::{ClockError, Device, Error, Result};

/// Register addresses
pub mod registers {
    pub const SECONDS: u8 = 0x00;
    // Sequential: Minutes=0x01, Hours=0x02, Weekday=0x03, Date=0x04, Month=0x05, Year=0x06
    pub const CONTROL: u8 = 0x07;
}

/// Clock-halt flag in the seconds register.
const CH_BIT: u8 = 0x80;
/// 24-hour value bits of the hours register.
const HOURS_MASK: u8 = 0x3F;
const YEAR_BASE: u16 = 2000;

/// Packed BCD (tens in the high nibble) to integer.
pub const fn bcd_to_int(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Integer 0–99 to packed BCD.
pub const fn int_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

pub struct Ds1307<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ds1307<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Read the current date and time.
    pub fn read_time(&mut self) -> Result<ClockTime> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(self.address, &[registers::SECONDS], &mut regs)
            .map_err(|e| Error::bus(Device::Rtc, &e))?;

        // The weekday register is ignored; it is derived from the date.
        ClockTime::new(
            YEAR_BASE + u16::from(bcd_to_int(regs[6])),
            bcd_to_int(regs[5] & 0x1F),
            bcd_to_int(regs[4] & 0x3F),
            bcd_to_int(regs[2] & HOURS_MASK),
            bcd_to_int(regs[1] & 0x7F),
            bcd_to_int(regs[0] & !CH_BIT),
        )
        .map_err(|_| {
            debug!("rtc: undecodable registers {:02X?}", regs);
            ClockError::InvalidData.into()
        })
    }

    /// Write all seven time registers in one transaction.
    ///
    /// Writing the seconds register with CH cleared also starts the
    /// oscillator.
    pub fn set_time(&mut self, time: &ClockTime) -> Result<()> {
        if !time.is_valid() {
            return Err(ClockError::InvalidTime.into());
        }
        let frame = [
            registers::SECONDS,
            int_to_bcd(time.second),
            int_to_bcd(time.minute),
            int_to_bcd(time.hour),
            int_to_bcd(time.weekday),
            int_to_bcd(time.day),
            int_to_bcd(time.month),
            int_to_bcd((time.year - YEAR_BASE) as u8),
        ];
        self.i2c
            .write(self.address, &frame)
            .map_err(|e| Error::bus(Device::Rtc, &e))?;
        debug!("rtc: set to {}", time);
        Ok(())
    }

    /// `true` unless the clock-halt flag is set.
    pub fn is_running(&mut self) -> Result<bool> {
        Ok(self.read_seconds_register()? & CH_BIT == 0)
    }

    /// Start or halt the oscillator, preserving the seconds count.
    pub fn set_running(&mut self, running: bool) -> Result<()> {
        let seconds = self.read_seconds_register()?;
        let value = if running {
            seconds & !CH_BIT
        } else {
            seconds | CH_BIT
        };
        self.i2c
            .write(self.address, &[registers::SECONDS, value])
            .map_err(|e| Error::bus(Device::Rtc, &e))
    }

    /// Set the SQW/OUT control register (0x00 disables the square wave).
    pub fn set_control(&mut self, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[registers::CONTROL, value])
            .map_err(|e| Error::bus(Device::Rtc, &e))
    }

    fn read_seconds_register(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[registers::SECONDS], &mut buf)
            .map_err(|e| Error::bus(Device::Rtc, &e))?;
        Ok(buf[0])
    }
}
