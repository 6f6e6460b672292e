//! A single architectural register.
//!
//! Registers hold a [`UInt`] bit string and start in the X state. Reads and
//! writes address the low `size` bits; a partial write keeps the upper bits.

use crate::error::{RegFileError, Result};
use crate::init::{InitStrategy, Xorshift64};
use isasim_types::{Bits, DataType, UInt};

#[derive(Debug, Clone)]
pub struct Register {
    name: String,
    value: UInt,
}

impl Register {
    pub fn new(name: impl Into<String>, width: u32) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            value: UInt::new(width)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.value.width()
    }

    /// Full register contents
    pub fn value(&self) -> &UInt {
        &self.value
    }

    pub fn is_x(&self) -> bool {
        self.value.is_x()
    }

    /// Access sizes run from 1 bit up to `limit`
    pub(crate) fn check_size(&self, size: u32, limit: u32) -> Result<()> {
        if size == 0 || size > limit.min(self.width()) {
            return Err(RegFileError::InvalidAccessSize {
                name: self.name.clone(),
                size,
                width: limit.min(self.width()),
            });
        }
        Ok(())
    }

    /// Low `size` bits; X if the register is X
    pub fn read(&self, size: u32) -> Result<UInt> {
        self.check_size(size, self.width())?;
        Ok(self.value.field(size - 1, 0)?)
    }

    /// Inclusive bit range `[msb:lsb]`
    pub fn read_field(&self, msb: u32, lsb: u32) -> Result<UInt> {
        Ok(self.value.field(msb, lsb)?)
    }

    /// Write the low `size` bits. An X value leaves the register untouched;
    /// writing into an X register zeroes the bits above `size`.
    pub fn write(&mut self, size: u32, value: &impl DataType) -> Result<()> {
        self.check_size(size, self.width())?;
        self.value.set_field(size - 1, 0, value)?;
        Ok(())
    }

    /// Write an inclusive bit range
    pub fn write_field(&mut self, msb: u32, lsb: u32, value: &impl DataType) -> Result<()> {
        self.value.set_field(msb, lsb, value)?;
        Ok(())
    }

    pub fn write_u128(&mut self, size: u32, value: u128) -> Result<()> {
        self.check_size(size, self.width())?;
        let bits = Bits::from_u128(size, value)?;
        self.value.set_field_bits(size - 1, 0, &bits)?;
        Ok(())
    }

    /// Replace the whole contents; `None` is X
    pub fn set_bits(&mut self, bits: Option<Bits>) {
        self.value.set_bits(bits);
    }

    pub fn fill(&mut self, strategy: InitStrategy, rng: &mut Xorshift64) -> Result<()> {
        let bits = strategy.bits(self.width(), rng)?;
        self.value.set_bits(bits);
        Ok(())
    }
}
