//! # Floating-Point Data Type
//!
//! IEEE 754-style binary formats with configurable exponent and mantissa
//! widths, from 8-bit minifloats up to binary64.
//!
//! ## Encoding
//!
//! ```text
//! | sign | exponent (exp_width) | mantissa (man_width) |
//! ```
//!
//! - Biased exponent 0 encodes zeros and subnormals
//! - All-ones exponent encodes infinities (mantissa 0) and NaNs
//! - bias = 2^(exp_width-1) - 1
//!
//! Every supported format is a subset of binary64, so decoding is exact and
//! arithmetic is done in `f64` then rounded back (nearest, ties to even).
//! `%` is the host `fmod`, so the remainder takes the sign of the dividend.

use crate::bits::Bits;
use crate::error::{DataTypeError, Result};
use crate::value::{debug_value, display_value, DataType, Native};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Exponent and mantissa widths of a binary floating-point format.
///
/// Only validated formats can be built, so every method below may assume the
/// widths are in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FloatFormatRepr", into = "FloatFormatRepr")]
pub struct FloatFormat {
    exp_width: u32,
    man_width: u32,
}

#[derive(Serialize, Deserialize)]
struct FloatFormatRepr {
    exp_width: u32,
    man_width: u32,
}

impl TryFrom<FloatFormatRepr> for FloatFormat {
    type Error = DataTypeError;

    fn try_from(repr: FloatFormatRepr) -> Result<Self> {
        Self::new(repr.exp_width, repr.man_width)
    }
}

impl From<FloatFormat> for FloatFormatRepr {
    fn from(format: FloatFormat) -> Self {
        FloatFormatRepr {
            exp_width: format.exp_width,
            man_width: format.man_width,
        }
    }
}

impl FloatFormat {
    /// OCP FP8 E4M3 (IEEE-style: infinities and NaNs reserved)
    pub const FP8_E4M3: Self = Self::raw(4, 3);
    /// OCP FP8 E5M2
    pub const FP8_E5M2: Self = Self::raw(5, 2);
    /// Brain float
    pub const BFLOAT16: Self = Self::raw(8, 7);
    /// binary16
    pub const HALF: Self = Self::raw(5, 10);
    /// binary32
    pub const SINGLE: Self = Self::raw(8, 23);
    /// binary64
    pub const DOUBLE: Self = Self::raw(11, 52);

    pub const MIN_EXP_WIDTH: u32 = 2;
    pub const MAX_EXP_WIDTH: u32 = 11;
    pub const MIN_MAN_WIDTH: u32 = 1;
    pub const MAX_MAN_WIDTH: u32 = 52;

    const fn raw(exp_width: u32, man_width: u32) -> Self {
        Self {
            exp_width,
            man_width,
        }
    }

    pub fn new(exp_width: u32, man_width: u32) -> Result<Self> {
        let format = Self::raw(exp_width, man_width);
        format.validate()?;
        Ok(format)
    }

    fn validate(&self) -> Result<()> {
        let exp_ok = (Self::MIN_EXP_WIDTH..=Self::MAX_EXP_WIDTH).contains(&self.exp_width);
        let man_ok = (Self::MIN_MAN_WIDTH..=Self::MAX_MAN_WIDTH).contains(&self.man_width);
        if !exp_ok || !man_ok {
            return Err(DataTypeError::InvalidFormat {
                exp_width: self.exp_width,
                man_width: self.man_width,
            });
        }
        Ok(())
    }

    pub const fn exp_width(&self) -> u32 {
        self.exp_width
    }

    pub const fn man_width(&self) -> u32 {
        self.man_width
    }

    /// Total width: sign + exponent + mantissa
    pub const fn width(&self) -> u32 {
        1 + self.exp_width + self.man_width
    }

    pub const fn bias(&self) -> i32 {
        (1 << (self.exp_width - 1)) - 1
    }

    /// Smallest unbiased exponent of a normal number
    pub const fn min_exponent(&self) -> i32 {
        1 - self.bias()
    }

    /// Largest unbiased exponent of a normal number
    pub const fn max_exponent(&self) -> i32 {
        self.bias()
    }

    const fn exp_mask(&self) -> u64 {
        (1 << self.exp_width) - 1
    }

    const fn man_mask(&self) -> u64 {
        (1 << self.man_width) - 1
    }

    /// Round a host float into this format's bit pattern
    pub fn encode(&self, value: f64) -> u64 {
        let m = self.man_width;
        let exp_max = self.exp_mask();
        let sign = (value.is_sign_negative() as u64) << (self.exp_width + m);
        let inf = sign | (exp_max << m);

        if value.is_nan() {
            return inf | (1 << (m - 1));
        }
        let a = value.abs();
        if a.is_infinite() {
            return inf;
        }
        if a == 0.0 {
            return sign;
        }

        // a = sig * 2^(exp - 52) with sig in [2^52, 2^53)
        let raw = a.to_bits();
        let field = ((raw >> 52) & 0x7FF) as i32;
        let frac = raw & ((1 << 52) - 1);
        let (sig, exp) = if field == 0 {
            let lz = frac.leading_zeros() - 11;
            (frac << lz, -1022 - lz as i32)
        } else {
            (frac | (1 << 52), field - 1023)
        };

        if exp > self.max_exponent() {
            return inf;
        }
        let emin = self.min_exponent();
        let mag = if exp >= emin {
            let rounded = round_shift(sig, 52 - m);
            // A carry out of the mantissa bumps the exponent, as it should
            (((exp + self.bias()) as u64) << m) + (rounded - (1 << m))
        } else {
            round_shift(sig, 52 - m + (emin - exp) as u32)
        };
        if mag >= exp_max << m {
            return inf;
        }
        sign | mag
    }

    /// Exact host value of a bit pattern in this format
    pub fn decode(&self, bits: u64) -> f64 {
        let m = self.man_width;
        let negative = (bits >> (self.exp_width + m)) & 1 == 1;
        let exp = (bits >> m) & self.exp_mask();
        let man = bits & self.man_mask();

        let mag = if exp == self.exp_mask() {
            if man == 0 {
                f64::INFINITY
            } else {
                f64::NAN
            }
        } else if exp == 0 {
            scale2(man as f64, self.min_exponent() - m as i32)
        } else {
            scale2((man | (1 << m)) as f64, exp as i32 - self.bias() - m as i32)
        };
        if negative {
            -mag
        } else {
            mag
        }
    }
}

impl fmt::Display for FloatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}M{}", self.exp_width, self.man_width)
    }
}

/// Shift right with round to nearest, ties to even
fn round_shift(value: u64, shift: u32) -> u64 {
    if shift == 0 {
        return value;
    }
    if shift >= 64 {
        return 0;
    }
    let q = value >> shift;
    let r = value & ((1 << shift) - 1);
    let half = 1 << (shift - 1);
    if r > half || (r == half && q & 1 == 1) {
        q + 1
    } else {
        q
    }
}

/// Power of two for exponents in the normal range
fn pow2(exp: i32) -> f64 {
    f64::from_bits(((exp + 1023) as u64) << 52)
}

/// `x * 2^exp` without intermediate overflow or underflow of the scale factor
pub(crate) fn scale2(mut x: f64, mut exp: i32) -> f64 {
    while exp > 1000 {
        x *= pow2(1000);
        exp -= 1000;
    }
    while exp < -1000 {
        x *= pow2(-1000);
        exp += 1000;
    }
    x * pow2(exp)
}

/// Floating-point value
#[derive(Clone)]
pub struct Floating {
    format: FloatFormat,
    bits: Option<Bits>,
}

impl Floating {
    /// Create a value in the X state
    pub fn new(exp_width: u32, man_width: u32) -> Result<Self> {
        Ok(Self::from_format(FloatFormat::new(exp_width, man_width)?))
    }

    pub fn from_format(format: FloatFormat) -> Self {
        Self { format, bits: None }
    }

    /// Round `value` into `format`; formats are validated on construction so
    /// this cannot fail
    fn encoded(format: FloatFormat, value: f64) -> Self {
        let bits = Bits::from_u128(format.width(), format.encode(value) as u128).ok();
        Self { format, bits }
    }

    pub fn with_value(exp_width: u32, man_width: u32, value: impl Into<Native>) -> Result<Self> {
        let mut v = Self::new(exp_width, man_width)?;
        v.from_native(value.into())?;
        Ok(v)
    }

    pub fn format(&self) -> FloatFormat {
        self.format
    }

    pub fn bias(&self) -> i32 {
        self.format.bias()
    }

    fn pattern(&self, op: &'static str) -> Result<u64> {
        self.bits
            .as_ref()
            .map(Bits::to_u64)
            .ok_or(DataTypeError::unknown(op))
    }

    /// Host value; X is an error
    pub fn to_f64(&self) -> Result<f64> {
        Ok(self.format.decode(self.pattern("to_f64")?))
    }

    pub fn sign(&self) -> Result<bool> {
        let bits = self.pattern("sign")?;
        Ok((bits >> (self.format.width() - 1)) & 1 == 1)
    }

    pub fn biased_exponent(&self) -> Result<u64> {
        let bits = self.pattern("exponent")?;
        Ok((bits >> self.format.man_width) & self.format.exp_mask())
    }

    /// Unbiased exponent; subnormals and zeros report the minimum exponent
    pub fn exponent(&self) -> Result<i32> {
        let biased = self.biased_exponent()? as i32;
        Ok(biased.max(1) - self.bias())
    }

    /// Fraction field as a value in [0, 1)
    pub fn mantissa(&self) -> Result<f64> {
        let man = self.pattern("mantissa")? & self.format.man_mask();
        Ok(scale2(man as f64, -(self.format.man_width as i32)))
    }

    pub fn is_nan(&self) -> Result<bool> {
        Ok(self.to_f64()?.is_nan())
    }

    pub fn is_infinite(&self) -> Result<bool> {
        Ok(self.to_f64()?.is_infinite())
    }

    pub fn is_zero(&self) -> Result<bool> {
        Ok(self.to_f64()? == 0.0)
    }

    pub fn is_subnormal(&self) -> Result<bool> {
        let man = self.pattern("is_subnormal")? & self.format.man_mask();
        Ok(self.biased_exponent()? == 0 && man != 0)
    }

    fn binop(&self, rhs: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        match (self.to_f64(), rhs.to_f64()) {
            (Ok(a), Ok(b)) => Self::encoded(self.format, f(a, b)),
            _ => Self::from_format(self.format),
        }
    }

    fn scalar_op(&self, rhs: f64, f: impl Fn(f64, f64) -> f64) -> Self {
        match self.to_f64() {
            Ok(a) => Self::encoded(self.format, f(a, rhs)),
            Err(_) => Self::from_format(self.format),
        }
    }
}

impl DataType for Floating {
    fn type_name(&self) -> &'static str {
        "Floating"
    }

    fn width(&self) -> u32 {
        self.format.width()
    }

    fn bits(&self) -> Option<&Bits> {
        self.bits.as_ref()
    }

    fn set_bits(&mut self, bits: Option<Bits>) {
        self.bits = bits.map(|b| b.fit(self.format.width()));
    }

    fn to_native(&self) -> Result<Native> {
        Ok(Native::Float(self.format.decode(self.pattern("to_native")?)))
    }

    fn from_native(&mut self, value: Native) -> Result<()> {
        *self = Self::encoded(self.format, value.as_f64());
        Ok(())
    }
}

impl fmt::Debug for Floating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_value(self, f)
    }
}

impl fmt::Display for Floating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self, f)
    }
}

impl PartialEq for Floating {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Floating {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.to_f64().ok()?.partial_cmp(&other.to_f64().ok()?)
    }
}

impl PartialEq<f64> for Floating {
    fn eq(&self, other: &f64) -> bool {
        matches!(self.to_f64(), Ok(v) if v == *other)
    }
}

impl PartialOrd<f64> for Floating {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.to_f64().ok()?.partial_cmp(other)
    }
}

macro_rules! float_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Floating {
            type Output = Floating;
            fn $method(self, rhs: Self) -> Floating {
                self.binop(&rhs, |a, b| a $op b)
            }
        }

        impl<'a> $trait<&'a Floating> for &'a Floating {
            type Output = Floating;
            fn $method(self, rhs: &'a Floating) -> Floating {
                self.binop(rhs, |a, b| a $op b)
            }
        }

        impl $trait<f64> for Floating {
            type Output = Floating;
            fn $method(self, rhs: f64) -> Floating {
                self.scalar_op(rhs, |a, b| a $op b)
            }
        }
    };
}

float_binop!(Add, add, +);
float_binop!(Sub, sub, -);
float_binop!(Mul, mul, *);
float_binop!(Div, div, /);
float_binop!(Rem, rem, %);

impl Neg for Floating {
    type Output = Floating;
    fn neg(mut self) -> Floating {
        let top = self.format.width() - 1;
        if let Some(bits) = self.bits.as_mut() {
            let sign = bits.bit(top);
            bits.put_bit(top, !sign);
        }
        self
    }
}

// ============================================================================
// Common formats
// ============================================================================

pub fn fp8_e4m3(value: f64) -> Floating {
    Floating::encoded(FloatFormat::FP8_E4M3, value)
}

pub fn fp8_e5m2(value: f64) -> Floating {
    Floating::encoded(FloatFormat::FP8_E5M2, value)
}

pub fn bfloat16(value: f64) -> Floating {
    Floating::encoded(FloatFormat::BFLOAT16, value)
}

pub fn half(value: f64) -> Floating {
    Floating::encoded(FloatFormat::HALF, value)
}

pub fn single(value: f64) -> Floating {
    Floating::encoded(FloatFormat::SINGLE, value)
}

pub fn double(value: f64) -> Floating {
    Floating::encoded(FloatFormat::DOUBLE, value)
}
