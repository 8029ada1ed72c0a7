//! MAX31856 thermocouple-to-digital converter (K type).
//!
//! Runs the converter in one-shot mode so that "conversion still running"
//! is observable: the 1SHOT bit in CR0 stays set until the result lands in
//! the LTCB registers.  Each [`ThermocouplePort::sample`] call either
//! returns the finished conversion and arms the next one, or reports that
//! the conversion is pending.
//!
//! Fault status (SR) bits are folded into the controller's [`FaultCode`].

use embedded_hal::spi::{Operation, SpiDevice};

use crate::app::ports::ThermocouplePort;
use crate::sensors::channel::{FaultCode, FaultKind};

const REG_CR0: u8 = 0x00;
const REG_CR1: u8 = 0x01;
const REG_LTCBH: u8 = 0x0C;
const WRITE: u8 = 0x80;

const CR0_1SHOT: u8 = 0x40;
/// Open-circuit detection enabled, comparator fault mode.
const CR0_OCFAULT: u8 = 0x10;
const CR0_FAULTCLR: u8 = 0x02;
/// Type K, single-sample averaging.
const CR1_TYPE_K: u8 = 0x03;

const SR_CJ_RANGE: u8 = 0x80;
const SR_TC_RANGE: u8 = 0x40;
const SR_CJ_HIGH: u8 = 0x20;
const SR_CJ_LOW: u8 = 0x10;
const SR_TC_HIGH: u8 = 0x08;
const SR_TC_LOW: u8 = 0x04;
const SR_OVUV: u8 = 0x02;
const SR_OPEN: u8 = 0x01;

pub struct Max31856<SPI> {
    spi: SPI,
    armed: bool,
}

impl<SPI: SpiDevice> Max31856<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi, armed: false }
    }

    /// Program thermocouple type and fault detection.
    pub fn configure(&mut self) -> Result<(), FaultCode> {
        self.write_reg(REG_CR0, CR0_OCFAULT)?;
        self.write_reg(REG_CR1, CR1_TYPE_K)?;
        self.armed = false;
        Ok(())
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), FaultCode> {
        self.spi
            .write(&[reg | WRITE, value])
            .map_err(|_| FaultCode::from(FaultKind::BusError))
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), FaultCode> {
        self.spi
            .transaction(&mut [Operation::Write(&[reg]), Operation::Read(buf)])
            .map_err(|_| FaultCode::from(FaultKind::BusError))
    }

    fn trigger(&mut self) -> Result<(), FaultCode> {
        self.write_reg(REG_CR0, CR0_OCFAULT | CR0_1SHOT)?;
        self.armed = true;
        Ok(())
    }
}

impl<SPI: SpiDevice> ThermocouplePort for Max31856<SPI> {
    fn sample(&mut self) -> Result<Option<i32>, FaultCode> {
        if !self.armed {
            self.trigger()?;
            return Ok(None);
        }

        let mut cr0 = [0u8; 1];
        self.read_regs(REG_CR0, &mut cr0)?;
        if cr0[0] & CR0_1SHOT != 0 {
            return Ok(None);
        }

        // LTCBH, LTCBM, LTCBL, SR
        let mut regs = [0u8; 4];
        self.read_regs(REG_LTCBH, &mut regs)?;
        self.trigger()?;

        let faults = decode_status(regs[3]);
        if !faults.is_empty() {
            return Err(faults);
        }
        Ok(Some(celsius128_to_fahrenheit(decode_linearized(
            regs[0], regs[1], regs[2],
        ))))
    }

    fn clear_fault(&mut self) {
        if self.write_reg(REG_CR0, CR0_OCFAULT | CR0_FAULTCLR).is_err() {
            log::warn!("MAX31856: fault clear write failed");
        }
        self.armed = false;
    }
}

/// 19-bit two's complement temperature, LSB = 1/128 °C.
fn decode_linearized(h: u8, m: u8, l: u8) -> i32 {
    i32::from_be_bytes([h, m, l, 0]) >> 13
}

fn celsius128_to_fahrenheit(raw: i32) -> i32 {
    // °F = raw * 9 / (5 * 128) + 32, rounded half up.
    (raw * 9 + 320).div_euclid(640) + 32
}

fn decode_status(sr: u8) -> FaultCode {
    let mut code = FaultCode::empty();
    if sr & SR_CJ_RANGE != 0 {
        code.insert(FaultKind::ReferenceBias);
    }
    if sr & SR_TC_RANGE != 0 {
        code.insert(FaultKind::OutOfRange);
    }
    if sr & (SR_CJ_HIGH | SR_TC_HIGH) != 0 {
        code.insert(FaultKind::ThresholdHigh);
    }
    if sr & (SR_CJ_LOW | SR_TC_LOW) != 0 {
        code.insert(FaultKind::ThresholdLow);
    }
    if sr & SR_OVUV != 0 {
        code.insert(FaultKind::OverUnderVoltage);
    }
    if sr & SR_OPEN != 0 {
        code.insert(FaultKind::OpenCircuit);
    }
    code
}
