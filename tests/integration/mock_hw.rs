//! Mock hardware for integration tests.
//!
//! Two levels of fake:
//!
//! - [`SimBus`] emulates the register files of the DS1307, both PCA9685s
//!   and the PCF8574-driven HD44780 behind one `embedded_hal::i2c::I2c`,
//!   so the real drivers run unmodified.
//! - [`MockClockHw`] implements the port traits directly and records every
//!   call, for exercising `ClockService` and the console without a bus.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use servoclock::app::events::ClockEvent;
use servoclock::app::ports::{ActuatorPort, ClockPort, EventSink, TextDisplayPort};
use servoclock::clock_time::ClockTime;
use servoclock::drivers::ds1307::int_to_bcd;
use servoclock::error::{ActuatorError, Device, DisplayError, Error, Result};
use servoclock::pins;

// ── Delay ─────────────────────────────────────────────────────

/// Returns immediately; simulated devices have no timing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── Register-pointer device (DS1307, PCA9685) ────────────────

pub struct RegisterFile<const N: usize> {
    pub regs: [u8; N],
    pointer: usize,
}

impl<const N: usize> RegisterFile<N> {
    fn new() -> Self {
        Self {
            regs: [0; N],
            pointer: 0,
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        let Some((&reg, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = usize::from(reg) % N;
        for &b in data {
            self.regs[self.pointer] = b;
            self.pointer = (self.pointer + 1) % N;
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        for b in buf {
            *b = self.regs[self.pointer];
            self.pointer = (self.pointer + 1) % N;
        }
    }
}

// ── HD44780 behind a PCF8574 ──────────────────────────────────

const LCD_ENABLE: u8 = 0x04;
const LCD_RS: u8 = 0x01;
const LCD_BACKLIGHT: u8 = 0x08;
const LCD_COLUMNS: usize = 20;
const LCD_LINE_BASES: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Latches nibbles on the falling edge of EN and keeps a DDRAM image.
pub struct LcdSim {
    port: u8,
    high_nibble: Option<(u8, bool)>,
    ddram_address: u8,
    pub commands: Vec<u8>,
    pub chars_written: usize,
    screen: [[u8; LCD_COLUMNS]; 4],
}

impl LcdSim {
    fn new() -> Self {
        Self {
            port: 0,
            high_nibble: None,
            ddram_address: 0,
            commands: Vec::new(),
            chars_written: 0,
            screen: [[b' '; LCD_COLUMNS]; 4],
        }
    }

    fn port_write(&mut self, value: u8) {
        let falling_edge = self.port & LCD_ENABLE != 0 && value & LCD_ENABLE == 0;
        if falling_edge {
            self.latch(self.port & 0xF0, self.port & LCD_RS != 0);
        }
        self.port = value;
    }

    fn latch(&mut self, nibble: u8, rs: bool) {
        match self.high_nibble.take() {
            None => self.high_nibble = Some((nibble, rs)),
            Some((high, rs)) => {
                let byte = high | (nibble >> 4);
                if rs {
                    self.data(byte);
                } else {
                    self.command(byte);
                }
            }
        }
    }

    fn command(&mut self, cmd: u8) {
        self.commands.push(cmd);
        if cmd == 0x01 {
            self.screen = [[b' '; LCD_COLUMNS]; 4];
            self.ddram_address = 0;
        } else if cmd & 0x80 != 0 {
            self.ddram_address = cmd & 0x7F;
        }
    }

    fn data(&mut self, byte: u8) {
        self.chars_written += 1;
        for (line, &base) in LCD_LINE_BASES.iter().enumerate() {
            let col = self.ddram_address.wrapping_sub(base);
            if usize::from(col) < LCD_COLUMNS {
                self.screen[line][usize::from(col)] = byte;
                break;
            }
        }
        self.ddram_address = self.ddram_address.wrapping_add(1);
    }

    /// Visible text on `line`, trailing blanks removed.
    pub fn line(&self, line: usize) -> String {
        String::from_utf8_lossy(&self.screen[line]).trim_end().to_owned()
    }

    pub fn clear_count(&self) -> usize {
        self.commands.iter().filter(|&&c| c == 0x01).count()
    }

    pub fn backlight_on(&self) -> bool {
        self.port & LCD_BACKLIGHT != 0
    }
}

// ── The bus ───────────────────────────────────────────────────

/// Every device on the clock board, answering at its default address.
pub struct SimBus {
    pub rtc: RegisterFile<64>,
    pub pwm: BTreeMap<u8, RegisterFile<256>>,
    pub lcd: LcdSim,
    /// `(address, bytes)` for every write, in order.
    pub writes: Vec<(u8, Vec<u8>)>,
    failing: Option<u8>,
}

impl SimBus {
    pub fn clock_board() -> Self {
        let mut pwm = BTreeMap::new();
        pwm.insert(pins::PCA_HOURS_ADDR, RegisterFile::new());
        pwm.insert(pins::PCA_MINUTES_ADDR, RegisterFile::new());
        let mut bus = Self {
            rtc: RegisterFile::new(),
            pwm,
            lcd: LcdSim::new(),
            writes: Vec::new(),
            failing: None,
        };
        bus.set_rtc(&ClockTime::new(2025, 4, 27, 9, 5, 0).unwrap());
        bus
    }

    /// Make every transaction to `address` NACK.
    pub fn fail(&mut self, address: Option<u8>) {
        self.failing = address;
    }

    pub fn remove_device(&mut self, address: u8) {
        self.pwm.remove(&address);
    }

    pub fn set_rtc(&mut self, t: &ClockTime) {
        let regs = [
            int_to_bcd(t.second),
            int_to_bcd(t.minute),
            int_to_bcd(t.hour),
            int_to_bcd(t.weekday),
            int_to_bcd(t.day),
            int_to_bcd(t.month),
            int_to_bcd((t.year - 2000) as u8),
        ];
        self.rtc.regs[..7].copy_from_slice(&regs);
    }

    pub fn halt_rtc(&mut self) {
        self.rtc.regs[0] |= 0x80;
    }

    pub fn rtc_halted(&self) -> bool {
        self.rtc.regs[0] & 0x80 != 0
    }

    /// OFF count last written for servo `index` (14 per controller):
    /// `Some(0)` for full-off, `None` if never written.
    pub fn servo_duty(&self, index: usize) -> Option<u16> {
        let per = usize::from(pins::SERVOS_PER_CONTROLLER);
        let address = [pins::PCA_HOURS_ADDR, pins::PCA_MINUTES_ADDR][index / per];
        let regs = &self.pwm[&address].regs;
        let base = 6 + 4 * (index % per);
        let led = &regs[base..base + 4];
        if led[3] & 0x10 != 0 {
            Some(0)
        } else if led.iter().all(|&b| b == 0) {
            None
        } else {
            Some(u16::from_le_bytes([led[2], led[3] & 0x0F]))
        }
    }

    pub fn pwm_asleep(&self, address: u8) -> bool {
        self.pwm[&address].regs[0] & 0x10 != 0
    }

    fn present(&self, address: u8) -> bool {
        address == pins::RTC_ADDR || address == pins::LCD_ADDR || self.pwm.contains_key(&address)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) {
        self.writes.push((address, bytes.to_vec()));
        match address {
            pins::RTC_ADDR => self.rtc.write(bytes),
            pins::LCD_ADDR => bytes.iter().for_each(|&b| self.lcd.port_write(b)),
            _ => {
                if let Some(pca) = self.pwm.get_mut(&address) {
                    pca.write(bytes);
                    // ALL_LED_* fans out to every channel.
                    if matches!(bytes.first(), Some(0xFA..=0xFD)) {
                        let all: [u8; 4] = pca.regs[0xFA..0xFE].try_into().unwrap();
                        for ch in 0..16 {
                            pca.regs[6 + 4 * ch..10 + 4 * ch].copy_from_slice(&all);
                        }
                    }
                }
            }
        }
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) {
        match address {
            pins::RTC_ADDR => self.rtc.read(buf),
            pins::LCD_ADDR => buf.fill(self.lcd.port),
            _ => {
                if let Some(pca) = self.pwm.get_mut(&address) {
                    pca.read(buf);
                }
            }
        }
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> core::result::Result<(), Self::Error> {
        if self.failing == Some(address) || !self.present(address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.write(address, bytes),
                Operation::Read(buf) => self.read(address, buf),
            }
        }
        Ok(())
    }
}

// ── Port-level mock ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    ReadTime,
    SetTime(ClockTime),
    SetAngle { index: usize, angle: u16 },
    ReleaseAll,
    Clear,
    SetCursor { line: u8, col: u8 },
    Print(String),
}

pub struct MockClockHw {
    pub calls: Vec<HwCall>,
    /// Returned by `read_time` in order; `now` once exhausted.
    pub readings: VecDeque<Result<ClockTime>>,
    pub now: ClockTime,
    pub servo_count: usize,
    pub lcd_rows: u8,
    /// Every operation fails with a bus error (after being recorded).
    pub bus_down: bool,
}

impl MockClockHw {
    pub fn new(now: ClockTime) -> Self {
        Self {
            calls: Vec::new(),
            readings: VecDeque::new(),
            now,
            servo_count: 28,
            lcd_rows: 4,
            bus_down: false,
        }
    }

    pub fn at(hour: u8, minute: u8) -> Self {
        Self::new(ClockTime::new(2025, 4, 27, hour, minute, 0).unwrap())
    }

    /// Angles written, in call order.
    pub fn angles(&self) -> Vec<(usize, u16)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::SetAngle { index, angle } => Some((*index, *angle)),
                _ => None,
            })
            .collect()
    }

    pub fn printed(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Print(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &HwCall) -> usize {
        self.calls.iter().filter(|&c| c == call).count()
    }

    fn bus(&self, device: Device) -> Result<()> {
        if self.bus_down {
            Err(Error::Bus {
                device,
                kind: ErrorKind::Bus,
            })
        } else {
            Ok(())
        }
    }
}

impl ClockPort for MockClockHw {
    fn read_time(&mut self) -> Result<ClockTime> {
        self.calls.push(HwCall::ReadTime);
        self.bus(Device::Rtc)?;
        self.readings.pop_front().unwrap_or(Ok(self.now))
    }

    fn set_time(&mut self, time: &ClockTime) -> Result<()> {
        self.calls.push(HwCall::SetTime(*time));
        self.bus(Device::Rtc)?;
        self.now = *time;
        Ok(())
    }
}

impl ActuatorPort for MockClockHw {
    fn set_angle(&mut self, index: usize, angle: u16) -> Result<()> {
        self.calls.push(HwCall::SetAngle { index, angle });
        self.bus(Device::PwmController(pins::PCA_HOURS_ADDR))?;
        if index >= self.servo_count {
            return Err(ActuatorError::InvalidIndex {
                index,
                count: self.servo_count,
            }
            .into());
        }
        if angle > 180 {
            return Err(ActuatorError::InvalidAngle(angle).into());
        }
        Ok(())
    }

    fn actuator_count(&self) -> usize {
        self.servo_count
    }

    fn release_all(&mut self) -> Result<()> {
        self.calls.push(HwCall::ReleaseAll);
        self.bus(Device::PwmController(pins::PCA_HOURS_ADDR))
    }
}

impl TextDisplayPort for MockClockHw {
    fn clear(&mut self) -> Result<()> {
        self.calls.push(HwCall::Clear);
        self.bus(Device::Lcd)
    }

    fn set_cursor(&mut self, line: u8, col: u8) -> Result<()> {
        self.calls.push(HwCall::SetCursor { line, col });
        self.bus(Device::Lcd)?;
        if line >= self.lcd_rows {
            return Err(DisplayError::InvalidCursor { line, col }.into());
        }
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.calls.push(HwCall::Print(text.to_owned()));
        self.bus(Device::Lcd)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<ClockEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipped(&self) -> Vec<Error> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ClockEvent::Skipped(err) => Some(*err),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &ClockEvent) {
        self.events.push(event.clone());
    }
}
