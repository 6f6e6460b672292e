//! # Bit Masks
//!
//! A [`BitMask`] matches values whose cared-for bits equal a pattern:
//! `(other & mask) == value`. It is the decode primitive for instruction
//! encodings written as `"1101_0xx1"`.

use crate::bits::{check_width, Bits};
use crate::error::{DataTypeError, Result};
use crate::value::DataType;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitMask {
    value: Bits,
    mask: Bits,
}

impl BitMask {
    /// Mask from an expected value and a care mask. The value may not set
    /// bits the mask does not care about.
    pub fn new(width: u32, value: u128, mask: u128) -> Result<Self> {
        Self::from_bits(Bits::from_u128(width, value)?, Bits::from_u128(width, mask)?)
    }

    pub fn from_bits(value: Bits, mask: Bits) -> Result<Self> {
        if value.width() != mask.width() {
            return Err(DataTypeError::InvalidMask(format!(
                "value is {} bits but mask is {} bits",
                value.width(),
                mask.width()
            )));
        }
        if value.and(&mask) != value {
            return Err(DataTypeError::InvalidMask(format!(
                "value {} sets bits outside mask {}",
                value, mask
            )));
        }
        Ok(Self { value, mask })
    }

    /// Parse a pattern of `0`, `1` and `x` (don't care), most significant bit
    /// first. Underscores are ignored.
    pub fn parse(pattern: &str) -> Result<Self> {
        let digits: Vec<char> = pattern.chars().filter(|&c| c != '_').collect();
        let width = digits.len() as u32;
        check_width(width).map_err(|_| DataTypeError::InvalidMask(pattern.to_string()))?;

        let mut value = Bits::zero(width)?;
        let mut mask = Bits::zero(width)?;
        for (i, c) in digits.iter().rev().enumerate() {
            let i = i as u32;
            match c {
                '0' => mask.set_bit(i, true)?,
                '1' => {
                    mask.set_bit(i, true)?;
                    value.set_bit(i, true)?;
                }
                'x' | 'X' => {}
                _ => return Err(DataTypeError::InvalidMask(pattern.to_string())),
            }
        }
        Ok(Self { value, mask })
    }

    pub fn width(&self) -> u32 {
        self.value.width()
    }

    pub fn value(&self) -> &Bits {
        &self.value
    }

    pub fn mask(&self) -> &Bits {
        &self.mask
    }

    /// Whether a value matches; X never matches
    pub fn matches(&self, other: &impl DataType) -> bool {
        other.bits().is_some_and(|bits| self.matches_bits(bits))
    }

    /// Whether a raw bit string matches. Bits above the mask width are ignored.
    pub fn matches_bits(&self, bits: &Bits) -> bool {
        bits.fit(self.width()).and(&self.mask) == self.value
    }
}

impl FromStr for BitMask {
    type Err = DataTypeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width()).rev() {
            let c = match (self.mask.bit(i), self.value.bit(i)) {
                (false, _) => 'x',
                (true, false) => '0',
                (true, true) => '1',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
