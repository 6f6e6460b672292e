//! # Fixed-Point Data Type
//!
//! A [`Fixed`] value is a `width`-bit integer scaled by `2^-frac_bits`. The
//! format travels with the value; operators take the left operand's format and
//! rescale the right operand into it. The `checked_*` methods insist on equal
//! formats instead.

use crate::bits::{check_width, Bits};
use crate::error::{DataTypeError, Result};
use crate::floating::scale2;
use crate::value::{debug_value, display_value, DataType, Native};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Width, binary point position and signedness of a fixed-point value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FixedFormatRepr", into = "FixedFormatRepr")]
pub struct FixedFormat {
    width: u32,
    frac_bits: u32,
    signed: bool,
}

#[derive(Serialize, Deserialize)]
struct FixedFormatRepr {
    width: u32,
    frac_bits: u32,
    signed: bool,
}

impl TryFrom<FixedFormatRepr> for FixedFormat {
    type Error = DataTypeError;

    fn try_from(repr: FixedFormatRepr) -> Result<Self> {
        Self::new(repr.width, repr.frac_bits, repr.signed)
    }
}

impl From<FixedFormat> for FixedFormatRepr {
    fn from(format: FixedFormat) -> Self {
        FixedFormatRepr {
            width: format.width,
            frac_bits: format.frac_bits,
            signed: format.signed,
        }
    }
}

impl FixedFormat {
    pub fn new(width: u32, frac_bits: u32, signed: bool) -> Result<Self> {
        let format = Self {
            width,
            frac_bits,
            signed,
        };
        format.validate()?;
        Ok(format)
    }

    fn validate(&self) -> Result<()> {
        check_width(self.width)?;
        if self.frac_bits > self.width {
            return Err(DataTypeError::BitRangeOutOfBounds {
                msb: self.frac_bits,
                lsb: 0,
                width: self.width,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn frac_bits(&self) -> u32 {
        self.frac_bits
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Integer bits, including the sign bit when signed
    pub fn int_bits(&self) -> u32 {
        self.width - self.frac_bits
    }
}

impl fmt::Display for FixedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.signed { "Q" } else { "UQ" };
        write!(f, "{}{}.{}", prefix, self.int_bits(), self.frac_bits)
    }
}

/// Fixed-point value
#[derive(Clone)]
pub struct Fixed {
    format: FixedFormat,
    bits: Option<Bits>,
}

/// Extend to a wider width according to signedness
fn extend(bits: &Bits, signed: bool, width: u32) -> Bits {
    if signed {
        bits.sign_extend_unchecked(width)
    } else {
        bits.fit(width)
    }
}

impl Fixed {
    /// Create a fixed-point value in the X state
    pub fn new(width: u32, frac_bits: u32, signed: bool) -> Result<Self> {
        Ok(Self::from_format(FixedFormat::new(width, frac_bits, signed)?))
    }

    pub fn from_format(format: FixedFormat) -> Self {
        Self { format, bits: None }
    }

    pub fn with_value(
        width: u32,
        frac_bits: u32,
        signed: bool,
        value: impl Into<Native>,
    ) -> Result<Self> {
        let mut v = Self::new(width, frac_bits, signed)?;
        v.from_native(value.into())?;
        Ok(v)
    }

    pub fn format(&self) -> FixedFormat {
        self.format
    }

    pub fn frac_bits(&self) -> u32 {
        self.format.frac_bits
    }

    pub fn is_signed(&self) -> bool {
        self.format.signed
    }

    fn with_bits(&self, bits: Option<Bits>) -> Self {
        Self {
            format: self.format,
            bits: bits.map(|b| b.fit(self.format.width)),
        }
    }

    /// Raw bits moved from `from` to `to`: widened, binary point shifted,
    /// then truncated to the target width
    fn realign(bits: &Bits, from: FixedFormat, to: FixedFormat) -> Bits {
        let work = from.width.max(to.width) + from.frac_bits.abs_diff(to.frac_bits) + 1;
        let wide = extend(bits, from.signed, work);
        let shifted = match to.frac_bits.cmp(&from.frac_bits) {
            Ordering::Greater => wide.shl(to.frac_bits - from.frac_bits),
            Ordering::Less if from.signed => wide.ashr(from.frac_bits - to.frac_bits),
            Ordering::Less => wide.lshr(from.frac_bits - to.frac_bits),
            Ordering::Equal => wide,
        };
        shifted.fit(to.width)
    }

    /// Right operand's bits in this value's format
    fn aligned(&self, rhs: &Self) -> Option<(&Bits, Bits)> {
        let a = self.bits.as_ref()?;
        let b = rhs.bits.as_ref()?;
        Some((a, Self::realign(b, rhs.format, self.format)))
    }

    /// Same value with a different number of fraction bits (width kept).
    /// Dropped fraction bits round toward negative infinity.
    pub fn rescale(&self, frac_bits: u32) -> Result<Self> {
        let format = FixedFormat::new(self.format.width, frac_bits, self.format.signed)?;
        Ok(Self {
            format,
            bits: self.bits.as_ref().map(|b| Self::realign(b, self.format, format)),
        })
    }

    /// Convert into another format. Dropped fraction bits round toward
    /// negative infinity and integer bits wrap.
    pub fn convert_to(&self, format: FixedFormat) -> Self {
        Self {
            format,
            bits: self.bits.as_ref().map(|b| Self::realign(b, self.format, format)),
        }
    }

    fn add_impl(&self, rhs: &Self) -> Self {
        let sum = self.aligned(rhs).map(|(a, b)| a.wrapping_add(&b));
        self.with_bits(sum)
    }

    fn sub_impl(&self, rhs: &Self) -> Self {
        let diff = self.aligned(rhs).map(|(a, b)| a.wrapping_sub(&b));
        self.with_bits(diff)
    }

    fn mul_impl(&self, rhs: &Self) -> Self {
        let FixedFormat {
            width,
            frac_bits,
            signed,
        } = self.format;
        let product = self.aligned(rhs).map(|(a, b)| {
            let wide = 2 * width;
            let p = extend(a, signed, wide).wrapping_mul(&extend(&b, signed, wide));
            if signed {
                p.ashr(frac_bits)
            } else {
                p.lshr(frac_bits)
            }
        });
        self.with_bits(product)
    }

    fn div_impl(&self, rhs: &Self) -> Self {
        let FixedFormat {
            width,
            frac_bits,
            signed,
        } = self.format;
        let quotient = self.aligned(rhs).and_then(|(a, b)| {
            let wide = 2 * width + 1;
            let dividend = extend(a, signed, wide).shl(frac_bits);
            let divisor = extend(&b, signed, wide);
            let result = if signed {
                dividend.sdivrem(&divisor)
            } else {
                dividend.udivrem(&divisor)
            };
            result.ok().map(|(q, _)| q)
        });
        self.with_bits(quotient)
    }

    fn same_format(&self, rhs: &Self, op: &'static str) -> Result<()> {
        if self.format != rhs.format {
            return Err(DataTypeError::FormatMismatch {
                left: self.format.to_string(),
                right: rhs.format.to_string(),
            });
        }
        if self.is_x() || rhs.is_x() {
            return Err(DataTypeError::unknown(op));
        }
        Ok(())
    }

    pub fn checked_add(&self, rhs: &Self) -> Result<Self> {
        self.same_format(rhs, "+")?;
        Ok(self.add_impl(rhs))
    }

    pub fn checked_sub(&self, rhs: &Self) -> Result<Self> {
        self.same_format(rhs, "-")?;
        Ok(self.sub_impl(rhs))
    }

    pub fn checked_mul(&self, rhs: &Self) -> Result<Self> {
        self.same_format(rhs, "*")?;
        Ok(self.mul_impl(rhs))
    }

    pub fn checked_div(&self, rhs: &Self) -> Result<Self> {
        self.same_format(rhs, "/")?;
        if rhs.raw()?.is_zero() {
            return Err(DataTypeError::DivisionByZero);
        }
        Ok(self.div_impl(rhs))
    }
}

impl DataType for Fixed {
    fn type_name(&self) -> &'static str {
        "Fixed"
    }

    fn width(&self) -> u32 {
        self.format.width
    }

    fn bits(&self) -> Option<&Bits> {
        self.bits.as_ref()
    }

    fn set_bits(&mut self, bits: Option<Bits>) {
        self.bits = bits.map(|b| b.fit(self.format.width));
    }

    fn to_native(&self) -> Result<Native> {
        let raw = self.raw()?.to_f64(self.format.signed);
        Ok(Native::Float(scale2(raw, -(self.format.frac_bits as i32))))
    }

    fn from_native(&mut self, value: Native) -> Result<()> {
        let FixedFormat {
            width, frac_bits, ..
        } = self.format;
        let bits = match value {
            Native::Int(v) => Bits::wrap_i128(width, v).shl(frac_bits),
            Native::Float(f) => Bits::from_f64_trunc(width, scale2(f, frac_bits as i32))?,
        };
        self.bits = Some(bits);
        Ok(())
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_value(self, f)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self, f)
    }
}

impl PartialEq for Fixed {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Fixed {
    /// Exact comparison at a format wide enough for both operands
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (a, b) = (self.bits.as_ref()?, other.bits.as_ref()?);
        let frac_bits = self.format.frac_bits.max(other.format.frac_bits);
        let int_bits = self.format.int_bits().max(other.format.int_bits());
        let common = FixedFormat {
            width: int_bits + frac_bits + 1,
            frac_bits,
            signed: true,
        };
        let a = Self::realign(a, self.format, common);
        let b = Self::realign(b, other.format, common);
        Some(a.cmp_signed(&b))
    }
}

macro_rules! fixed_binop {
    ($trait:ident, $method:ident, $impl:ident) => {
        impl $trait for Fixed {
            type Output = Fixed;
            fn $method(self, rhs: Self) -> Fixed {
                self.$impl(&rhs)
            }
        }

        impl<'a> $trait<&'a Fixed> for &'a Fixed {
            type Output = Fixed;
            fn $method(self, rhs: &'a Fixed) -> Fixed {
                self.$impl(rhs)
            }
        }
    };
}

fixed_binop!(Add, add, add_impl);
fixed_binop!(Sub, sub, sub_impl);
fixed_binop!(Mul, mul, mul_impl);
fixed_binop!(Div, div, div_impl);

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Fixed {
        let bits = self.bits.as_ref().map(Bits::wrapping_neg);
        self.with_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(width: u32, frac: u32, v: f64) -> Fixed {
        Fixed::with_value(width, frac, true, v).unwrap()
    }

    fn float(v: &Fixed) -> f64 {
        v.to_native().unwrap().as_f64()
    }

    #[test]
    fn test_encoding() {
        let v = q(8, 4, 1.5);
        assert_eq!(v.raw().unwrap().to_u64(), 0x18);
        assert_eq!(float(&v), 1.5);

        let v = q(8, 4, -1.5);
        assert_eq!(v.raw().unwrap().to_u64(), 0xE8);
        assert_eq!(float(&v), -1.5);

        // Truncation toward zero
        assert_eq!(float(&q(8, 4, 1.99)), 1.9375);
        assert_eq!(float(&q(8, 4, -1.99)), -1.9375);

        let v = Fixed::with_value(8, 4, false, 3).unwrap();
        assert_eq!(float(&v), 3.0);
    }

    #[test]
    fn test_format_validation() {
        assert!(Fixed::new(8, 9, true).is_err());
        assert!(Fixed::new(0, 0, true).is_err());
        assert!(Fixed::new(8, 8, false).is_ok());
        assert_eq!(FixedFormat::new(16, 8, true).unwrap().to_string(), "Q8.8");
        assert_eq!(FixedFormat::new(16, 12, false).unwrap().to_string(), "UQ4.12");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(float(&(q(16, 8, 1.5) + q(16, 8, 2.25))), 3.75);
        assert_eq!(float(&(q(16, 8, 1.5) - q(16, 8, 2.25))), -0.75);
        assert_eq!(float(&(q(16, 8, 1.5) * q(16, 8, -2.5))), -3.75);
        assert_eq!(float(&(q(16, 8, 3.0) / q(16, 8, 4.0))), 0.75);
        assert_eq!(float(&-q(16, 8, 3.0)), -3.0);
    }

    #[test]
    fn test_mixed_formats() {
        // Right operand rescaled into the left format
        let sum = q(16, 8, 1.5) + q(8, 2, 0.75);
        assert_eq!(sum.format(), FixedFormat::new(16, 8, true).unwrap());
        assert_eq!(float(&sum), 2.25);

        let err = q(16, 8, 1.0).checked_add(&q(8, 2, 1.0)).unwrap_err();
        assert!(matches!(err, DataTypeError::FormatMismatch { .. }));

        assert!(q(8, 2, 1.0) == q(16, 8, 1.0));
        assert!(q(8, 2, -1.0) < q(16, 8, 0.25));
    }

    #[test]
    fn test_division_by_zero() {
        assert!((q(16, 8, 1.0) / q(16, 8, 0.0)).is_x());
        assert_eq!(
            q(16, 8, 1.0).checked_div(&q(16, 8, 0.0)),
            Err(DataTypeError::DivisionByZero)
        );
    }

    #[test]
    fn test_rescale() {
        let v = q(16, 8, 1.75).rescale(4).unwrap();
        assert_eq!(v.frac_bits(), 4);
        assert_eq!(float(&v), 1.75);

        let v = q(16, 8, 1.75).rescale(1).unwrap();
        assert_eq!(float(&v), 1.5);

        assert!(q(16, 8, 1.0).rescale(17).is_err());
    }

    #[test]
    fn test_deserialize_validates_format() {
        let q8_8 = FixedFormat::new(16, 8, true).unwrap();
        let bytes = bincode::serialize(&q8_8).unwrap();
        let format: FixedFormat = bincode::deserialize(&bytes).unwrap();
        assert_eq!(format, q8_8);
        assert_eq!((format.width(), format.frac_bits(), format.is_signed()), (16, 8, true));

        let bytes = bincode::serialize(&(0u32, 0u32, true)).unwrap();
        assert!(bincode::deserialize::<FixedFormat>(&bytes).is_err());
        // More fraction bits than the width would underflow int_bits
        let bytes = bincode::serialize(&(8u32, 20u32, true)).unwrap();
        assert!(bincode::deserialize::<FixedFormat>(&bytes).is_err());
    }

    #[test]
    fn test_unsigned_arithmetic() {
        let a = Fixed::with_value(8, 4, false, 3.5).unwrap();
        let b = Fixed::with_value(8, 4, false, 2.25).unwrap();
        assert_eq!(float(&(a.clone() * b.clone())), 7.875);
        assert_eq!(float(&a.checked_mul(&b).unwrap()), 7.875);

        let a = Fixed::with_value(8, 4, false, 7.5).unwrap();
        let b = Fixed::with_value(8, 4, false, 2.5).unwrap();
        assert_eq!(float(&(a.clone() / b.clone())), 3.0);
        assert_eq!(float(&a.checked_div(&b).unwrap()), 3.0);

        // High bit set: would read negative if treated as signed
        let big = Fixed::with_value(8, 4, false, 12.0).unwrap();
        let half = Fixed::with_value(8, 4, false, 0.5).unwrap();
        assert_eq!(float(&(big.clone() * half.clone())), 6.0);
        assert_eq!(float(&(big / Fixed::with_value(8, 4, false, 4.0).unwrap())), 3.0);
    }

    #[test]
    fn test_convert_to() {
        let v = q(16, 8, -1.25);

        // Narrowing, value still fits
        let narrow = v.convert_to(FixedFormat::new(8, 2, true).unwrap());
        assert_eq!(narrow.format().to_string(), "Q6.2");
        assert_eq!(float(&narrow), -1.25);

        // Signed to unsigned wraps modulo 2^8 in UQ4.4
        let unsigned = v.convert_to(FixedFormat::new(8, 4, false).unwrap());
        assert!(!unsigned.is_signed());
        assert_eq!(float(&unsigned), 14.75);

        // Dropped fraction bits round toward negative infinity
        let coarse = v.convert_to(FixedFormat::new(8, 1, true).unwrap());
        assert_eq!(float(&coarse), -1.5);

        let x = Fixed::new(16, 8, true).unwrap();
        assert!(x.convert_to(FixedFormat::new(8, 4, false).unwrap()).is_x());
    }

    #[test]
    fn test_x_propagates() {
        let x = Fixed::new(16, 8, true).unwrap();
        assert!((x.clone() + q(16, 8, 1.0)).is_x());
        assert!((q(16, 8, 1.0) * x.clone()).is_x());
        assert!(x.partial_cmp(&q(16, 8, 1.0)).is_none());
        assert!(q(16, 8, 1.0).checked_sub(&x).unwrap_err().is_unknown());
    }
}
