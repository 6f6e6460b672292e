//! # Integer Data Types
//!
//! [`Integer`] is a fixed-width integer whose signedness is a const generic:
//!
//! ```
//! use isasim_types::{DataType, Native, SInt};
//!
//! // -5 + 4 = -1, encoded as 0xFB + 0x04 -> 0xFF
//! let a = SInt::with_value(8, -5).unwrap();
//! let b = SInt::with_value(8, 4).unwrap();
//! let c = a + b;
//! assert_eq!(c.to_native().unwrap(), Native::Int(-1));
//! assert_eq!(c.to_hex(), "0xff");
//! ```
//!
//! Arithmetic wraps at the left operand's width. Division truncates toward
//! zero; [`Integer::floor_div`] and [`Integer::floor_mod`] round toward
//! negative infinity instead. Division by zero gives X through the operators
//! and an error through [`Integer::checked_div`].
//!
//! `%` therefore takes the sign of the dividend, like Rust's `%` on host
//! integers and unlike a floored modulo. Code ported from a floored-modulo
//! model should call [`Integer::floor_mod`]:
//!
//! ```
//! use isasim_types::sint8;
//!
//! assert!(sint8(-7) % sint8(2) == -1);
//! assert!(sint8(-7).floor_mod(&sint8(2)) == 1);
//! ```

use crate::bits::{check_width, Bits};
use crate::error::{DataTypeError, Result};
use crate::value::{debug_value, display_value, DataType, Native};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

/// Fixed-width integer; `SIGNED` selects two's-complement interpretation
#[derive(Clone)]
pub struct Integer<const SIGNED: bool> {
    width: u32,
    bits: Option<Bits>,
}

/// Unsigned integer
pub type UInt = Integer<false>;

/// Two's-complement signed integer
pub type SInt = Integer<true>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    FloorDiv,
    FloorMod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl<const SIGNED: bool> Integer<SIGNED> {
    /// Create an integer in the X state
    pub fn new(width: u32) -> Result<Self> {
        check_width(width)?;
        Ok(Self { width, bits: None })
    }

    /// Create an integer holding `value` wrapped into `width` bits
    pub fn with_value(width: u32, value: impl Into<Native>) -> Result<Self> {
        let mut v = Self::new(width)?;
        v.from_native(value.into())?;
        Ok(v)
    }

    /// Wrap an existing bit string (width taken from the bits)
    pub fn from_bits(bits: Bits) -> Self {
        Self {
            width: bits.width(),
            bits: Some(bits),
        }
    }

    pub(crate) fn wrapped(width: u32, value: i128) -> Self {
        Self::from_bits(Bits::wrap_i128(width, value))
    }

    pub fn is_signed(&self) -> bool {
        SIGNED
    }

    /// Extend a bit pattern of this signedness to a wider width
    fn extend(bits: &Bits, width: u32) -> Bits {
        if SIGNED {
            bits.sign_extend_unchecked(width)
        } else {
            bits.fit(width)
        }
    }

    fn with_bits(&self, bits: Option<Bits>) -> Self {
        Self {
            width: self.width,
            bits: bits.map(|b| b.fit(self.width)),
        }
    }

    /// Both operands at their common width, or `None` if either is X
    fn operands(&self, rhs: &Self) -> Option<(Bits, Bits)> {
        let (a, b) = (self.bits.as_ref()?, rhs.bits.as_ref()?);
        let width = self.width.max(rhs.width);
        Some((Self::extend(a, width), Self::extend(b, width)))
    }

    /// Shift distance; negative distances are undefined
    fn shift_amount(bits: &Bits) -> Option<u32> {
        if SIGNED && bits.msb() {
            return None;
        }
        Some(bits.to_u128_checked().map_or(u32::MAX, |v| v.min(u32::MAX as u128) as u32))
    }

    fn divrem(a: &Bits, b: &Bits, floor: bool) -> Option<(Bits, Bits)> {
        let result = match (SIGNED, floor) {
            (true, false) => a.sdivrem(b),
            (true, true) => a.sdivrem_floor(b),
            (false, _) => a.udivrem(b),
        };
        result.ok()
    }

    fn apply(&self, op: IntOp, rhs: &Self) -> Self {
        let Some((a, b)) = self.operands(rhs) else {
            return self.with_bits(None);
        };
        let result = match op {
            IntOp::Add => Some(a.wrapping_add(&b)),
            IntOp::Sub => Some(a.wrapping_sub(&b)),
            IntOp::Mul => Some(a.wrapping_mul(&b)),
            IntOp::Div => Self::divrem(&a, &b, false).map(|(q, _)| q),
            IntOp::Rem => Self::divrem(&a, &b, false).map(|(_, r)| r),
            IntOp::FloorDiv => Self::divrem(&a, &b, true).map(|(q, _)| q),
            IntOp::FloorMod => Self::divrem(&a, &b, true).map(|(_, r)| r),
            IntOp::And => Some(a.and(&b)),
            IntOp::Or => Some(a.or(&b)),
            IntOp::Xor => Some(a.xor(&b)),
            IntOp::Shl => Self::shift_amount(&b).map(|n| self.raw_or_zero().shl(n)),
            IntOp::Shr => Self::shift_amount(&b).map(|n| {
                let v = self.raw_or_zero();
                if SIGNED {
                    v.ashr(n)
                } else {
                    v.lshr(n)
                }
            }),
        };
        self.with_bits(result)
    }

    fn raw_or_zero(&self) -> Bits {
        self.bits.clone().unwrap_or_else(|| Bits::blank(self.width))
    }

    /// Right operand converted into this type, at least 128 bits wide
    fn scalar(&self, rhs: i128) -> Self {
        Self::wrapped(self.width.max(128), rhs)
    }

    /// Division that reports a zero divisor instead of producing X
    pub fn checked_div(&self, rhs: &Self) -> Result<Self> {
        self.checked(IntOp::Div, rhs)
    }

    /// Remainder that reports a zero divisor instead of producing X
    pub fn checked_rem(&self, rhs: &Self) -> Result<Self> {
        self.checked(IntOp::Rem, rhs)
    }

    fn checked(&self, op: IntOp, rhs: &Self) -> Result<Self> {
        if self.is_x() || rhs.is_x() {
            return Err(DataTypeError::unknown(if op == IntOp::Div { "/" } else { "%" }));
        }
        if rhs.raw()?.is_zero() {
            return Err(DataTypeError::DivisionByZero);
        }
        Ok(self.apply(op, rhs))
    }

    /// Quotient rounded toward negative infinity
    pub fn floor_div(&self, rhs: &Self) -> Self {
        self.apply(IntOp::FloorDiv, rhs)
    }

    /// Remainder with the sign of the divisor
    pub fn floor_mod(&self, rhs: &Self) -> Self {
        self.apply(IntOp::FloorMod, rhs)
    }

    /// Wrapping power. Negative exponents give the truncated real result:
    /// zero unless the base is 1 or -1. A zero base with a negative exponent is X.
    pub fn pow(&self, exp: i128) -> Self {
        let Some(base) = self.bits.as_ref() else {
            return self.clone();
        };
        if exp < 0 {
            let one = Bits::wrap_i128(self.width, 1);
            let minus_one = Bits::wrap_i128(self.width, -1);
            return if base.is_zero() {
                self.with_bits(None)
            } else if *base == one {
                self.clone()
            } else if SIGNED && *base == minus_one {
                let odd = exp % 2 != 0;
                self.with_bits(Some(if odd { minus_one } else { one }))
            } else {
                self.with_bits(Some(Bits::blank(self.width)))
            };
        }

        // Square-and-multiply; wrapping is exact modulo 2^width
        let mut result = Bits::wrap_i128(self.width, 1);
        let mut square = base.clone();
        let mut e = exp as u128;
        while e > 0 {
            if e & 1 == 1 {
                result = result.wrapping_mul(&square);
            }
            square = square.wrapping_mul(&square);
            e >>= 1;
        }
        self.with_bits(Some(result))
    }

    /// Power with an integer exponent of the same type
    pub fn pow_by(&self, exp: &Self) -> Self {
        // X exponents and exponents past i128 both give X
        match exp.to_native().and_then(Native::as_i128) {
            Ok(e) => self.pow(e),
            Err(_) => self.with_bits(None),
        }
    }

    /// Full-width product at `self.width + other.width` bits
    pub fn mul_extend(&self, other: &Self) -> Result<Self> {
        let width = self.width + other.width;
        check_width(width)?;
        let Some((a, b)) = self.bits.as_ref().zip(other.bits.as_ref()) else {
            return Ok(Self { width, bits: None });
        };
        let product = Self::extend(a, width).wrapping_mul(&Self::extend(b, width));
        Ok(Self::from_bits(product))
    }

    /// Same bits read with the other signedness
    pub fn reinterpret<const S: bool>(&self) -> Integer<S> {
        Integer {
            width: self.width,
            bits: self.bits.clone(),
        }
    }

    /// Convert to another width, sign- or zero-extending as appropriate
    pub fn resize(&self, width: u32) -> Result<Self> {
        check_width(width)?;
        Ok(Self {
            width,
            bits: self.bits.as_ref().map(|b| Self::extend(b, width)),
        })
    }
}

impl<const SIGNED: bool> DataType for Integer<SIGNED> {
    fn type_name(&self) -> &'static str {
        if SIGNED {
            "SInt"
        } else {
            "UInt"
        }
    }

    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn bits(&self) -> Option<&Bits> {
        self.bits.as_ref()
    }

    fn set_bits(&mut self, bits: Option<Bits>) {
        self.bits = bits.map(|b| b.fit(self.width));
    }

    fn to_native(&self) -> Result<Native> {
        let bits = self.raw()?;
        if SIGNED {
            return bits.to_i128().map(Native::Int);
        }
        bits.to_u128_checked()
            .and_then(|v| i128::try_from(v).ok())
            .map(Native::Int)
            .ok_or_else(|| DataTypeError::NotRepresentable {
                value: bits.to_string(),
                target: "i128",
            })
    }

    fn from_native(&mut self, value: Native) -> Result<()> {
        self.bits = Some(match value {
            Native::Int(v) => Bits::wrap_i128(self.width, v),
            Native::Float(f) => Bits::from_f64_trunc(self.width, f)?,
        });
        Ok(())
    }
}

impl<const SIGNED: bool> fmt::Debug for Integer<SIGNED> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_value(self, f)
    }
}

impl<const SIGNED: bool> fmt::Display for Integer<SIGNED> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self, f)
    }
}

impl<const SIGNED: bool> fmt::LowerHex for Integer<SIGNED> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bits {
            Some(bits) => fmt::LowerHex::fmt(bits, f),
            None => f.pad("x"),
        }
    }
}

impl<const SIGNED: bool> PartialEq for Integer<SIGNED> {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl<const SIGNED: bool> PartialOrd for Integer<SIGNED> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (a, b) = self.operands(other)?;
        Some(if SIGNED {
            a.cmp_signed(&b)
        } else {
            a.cmp_unsigned(&b)
        })
    }
}

impl<const SIGNED: bool> PartialEq<i128> for Integer<SIGNED> {
    fn eq(&self, other: &i128) -> bool {
        matches!(self.to_native(), Ok(Native::Int(v)) if v == *other)
    }
}

impl<const SIGNED: bool> PartialOrd<i128> for Integer<SIGNED> {
    fn partial_cmp(&self, other: &i128) -> Option<Ordering> {
        let bits = self.bits.as_ref()?;
        let width = self.width.max(128) + 1;
        let a = Self::extend(bits, width);
        let b = Bits::wrap_i128(width, *other);
        Some(a.cmp_signed(&b))
    }
}

macro_rules! int_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:expr) => {
        impl<const S: bool> $trait for Integer<S> {
            type Output = Integer<S>;
            fn $method(self, rhs: Self) -> Self::Output {
                self.apply($op, &rhs)
            }
        }

        impl<'a, const S: bool> $trait<&'a Integer<S>> for &'a Integer<S> {
            type Output = Integer<S>;
            fn $method(self, rhs: &'a Integer<S>) -> Self::Output {
                self.apply($op, rhs)
            }
        }

        impl<const S: bool> $trait<i128> for Integer<S> {
            type Output = Integer<S>;
            fn $method(self, rhs: i128) -> Self::Output {
                let rhs = self.scalar(rhs);
                self.apply($op, &rhs)
            }
        }

        impl<const S: bool> $assign_trait for Integer<S> {
            fn $assign_method(&mut self, rhs: Self) {
                *self = self.apply($op, &rhs);
            }
        }

        impl<const S: bool> $assign_trait<i128> for Integer<S> {
            fn $assign_method(&mut self, rhs: i128) {
                let rhs = self.scalar(rhs);
                *self = self.apply($op, &rhs);
            }
        }
    };
}

int_binop!(Add, add, AddAssign, add_assign, IntOp::Add);
int_binop!(Sub, sub, SubAssign, sub_assign, IntOp::Sub);
int_binop!(Mul, mul, MulAssign, mul_assign, IntOp::Mul);
int_binop!(Div, div, DivAssign, div_assign, IntOp::Div);
int_binop!(Rem, rem, RemAssign, rem_assign, IntOp::Rem);
int_binop!(BitAnd, bitand, BitAndAssign, bitand_assign, IntOp::And);
int_binop!(BitOr, bitor, BitOrAssign, bitor_assign, IntOp::Or);
int_binop!(BitXor, bitxor, BitXorAssign, bitxor_assign, IntOp::Xor);
int_binop!(Shl, shl, ShlAssign, shl_assign, IntOp::Shl);
int_binop!(Shr, shr, ShrAssign, shr_assign, IntOp::Shr);

impl<const S: bool> Neg for Integer<S> {
    type Output = Integer<S>;
    fn neg(self) -> Self::Output {
        let bits = self.bits.as_ref().map(Bits::wrapping_neg);
        self.with_bits(bits)
    }
}

impl<const S: bool> Not for Integer<S> {
    type Output = Integer<S>;
    fn not(self) -> Self::Output {
        let bits = self.bits.as_ref().map(Bits::not);
        self.with_bits(bits)
    }
}

// ============================================================================
// Common widths
// ============================================================================

/// 8-bit unsigned integer
pub fn uint8(value: i128) -> UInt {
    UInt::wrapped(8, value)
}

/// 16-bit unsigned integer
pub fn uint16(value: i128) -> UInt {
    UInt::wrapped(16, value)
}

/// 32-bit unsigned integer
pub fn uint32(value: i128) -> UInt {
    UInt::wrapped(32, value)
}

/// 64-bit unsigned integer
pub fn uint64(value: i128) -> UInt {
    UInt::wrapped(64, value)
}

/// 8-bit signed integer
pub fn sint8(value: i128) -> SInt {
    SInt::wrapped(8, value)
}

/// 16-bit signed integer
pub fn sint16(value: i128) -> SInt {
    SInt::wrapped(16, value)
}

/// 32-bit signed integer
pub fn sint32(value: i128) -> SInt {
    SInt::wrapped(32, value)
}

/// 64-bit signed integer
pub fn sint64(value: i128) -> SInt {
    SInt::wrapped(64, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(v: &impl DataType) -> i128 {
        v.to_native().unwrap().as_i128().unwrap()
    }

    #[test]
    fn test_uint_arithmetic() {
        let a = uint8(8);
        let b = uint8(10);
        assert_eq!(native(&(a.clone() + b.clone())), 18);
        assert_eq!(native(&(a.clone() - b.clone())), 256 - 2);
        assert_eq!(native(&(a.clone() * b.clone())), 80);
        assert_eq!(native(&(a.clone() / b.clone())), 0);
        assert_eq!(native(&(a.clone() % b.clone())), 8);
        assert_eq!(format!("{}", a), "0x8");
    }

    #[test]
    fn test_sint_arithmetic() {
        let a = sint8(-5);
        let b = sint8(4);
        let c = &a + &b;
        assert_eq!(native(&c), -1);
        assert_eq!(c.raw().unwrap().to_u64(), 0xFF);

        assert_eq!(native(&(sint8(100) + sint8(100))), -56);
        assert_eq!(native(&(sint8(-7) / sint8(2))), -3);
        assert_eq!(native(&(sint8(-7) % sint8(2))), -1);
        assert_eq!(native(&sint8(-7).floor_div(&sint8(2))), -4);
        assert_eq!(native(&sint8(-7).floor_mod(&sint8(2))), 1);
        assert_eq!(native(&(sint8(-128) / sint8(-1))), -128);
    }

    #[test]
    fn test_scalar_operands() {
        assert_eq!(native(&(uint8(8) + 4)), 12);
        assert_eq!(native(&(uint8(8) + -1)), 7);
        assert_eq!(native(&(sint16(-3) * 5)), -15);

        let mut v = uint32(1);
        v <<= 31;
        assert_eq!(native(&v), 1 << 31);
        v += 1;
        assert_eq!(native(&v), (1 << 31) + 1);
    }

    #[test]
    fn test_x_propagates() {
        let x = UInt::new(8).unwrap();
        assert!((x.clone() + uint8(1)).is_x());
        assert!((uint8(1) * x.clone()).is_x());
        assert!((-x.clone()).is_x());
        assert!((!x.clone()).is_x());
        assert!(x.pow(2).is_x());

        assert!(x != x.clone());
        assert_eq!(x.partial_cmp(&uint8(0)), None);
        assert!(x.to_native().unwrap_err().is_unknown());
    }

    #[test]
    fn test_division_by_zero() {
        assert!((uint8(5) / uint8(0)).is_x());
        assert!((sint8(5) % sint8(0)).is_x());
        assert_eq!(uint8(5).checked_div(&uint8(0)), Err(DataTypeError::DivisionByZero));
        assert_eq!(native(&uint8(9).checked_rem(&uint8(4)).unwrap()), 1);
        assert!(uint8(5).checked_div(&UInt::new(8).unwrap()).unwrap_err().is_unknown());
    }

    #[test]
    fn test_shifts() {
        assert_eq!(native(&(uint8(0x81) >> 1)), 0x40);
        assert_eq!(native(&(sint8(-128) >> 1)), -64);
        assert_eq!(native(&(sint8(-128) >> 100)), -1);
        assert_eq!(native(&(uint8(1) << 8)), 0);
        // Negative shift distance is undefined
        assert!((sint8(1) << sint8(-1)).is_x());
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(native(&(uint8(0b1100) & uint8(0b1010))), 0b1000);
        assert_eq!(native(&(uint8(0b1100) | uint8(0b1010))), 0b1110);
        assert_eq!(native(&(uint8(0b1100) ^ uint8(0b1010))), 0b0110);
        assert_eq!(native(&!uint8(0)), 0xFF);
        assert_eq!(native(&!sint8(0)), -1);
        assert_eq!(native(&-uint8(1)), 0xFF);
    }

    #[test]
    fn test_pow() {
        assert_eq!(native(&uint8(3).pow(4)), 81);
        assert_eq!(native(&uint8(2).pow(8)), 0);
        assert_eq!(native(&sint8(-2).pow(3)), -8);
        assert_eq!(native(&sint8(2).pow(-1)), 0);
        assert_eq!(native(&sint8(-1).pow(-3)), -1);
        assert_eq!(native(&sint8(-1).pow(-2)), 1);
        assert!(sint8(0).pow(-1).is_x());
        assert_eq!(native(&uint8(3).pow_by(&uint8(2))), 9);
    }

    #[test]
    fn test_mul_extend() {
        let p = uint8(200).mul_extend(&uint8(200)).unwrap();
        assert_eq!(p.width(), 16);
        assert_eq!(native(&p), 40000);

        let p = sint8(-128).mul_extend(&sint8(127)).unwrap();
        assert_eq!(native(&p), -16256);

        let p = uint8(1).mul_extend(&UInt::new(8).unwrap()).unwrap();
        assert!(p.is_x());
        assert_eq!(p.width(), 16);
    }

    #[test]
    fn test_comparisons() {
        assert!(sint8(-1) < sint8(0));
        assert!(uint8(0xFF) > uint8(0));
        assert!(sint8(-1) == -1);
        assert!(uint8(0xFF) == 255);
        assert!(sint8(-1) < 0);
        assert!(uint8(0xFF) > 0);
        assert!(sint16(-1) == sint8(-1));
    }

    #[test]
    fn test_from_float() {
        assert_eq!(native(&UInt::with_value(8, 3.9).unwrap()), 3);
        assert_eq!(native(&SInt::with_value(8, -3.9).unwrap()), -3);
        assert_eq!(native(&UInt::with_value(8, -1.0).unwrap()), 255);
        assert!(UInt::with_value(8, f64::NAN).is_err());
    }

    #[test]
    fn test_width_limits() {
        assert!(UInt::new(0).is_err());
        let v = UInt::with_value(128, -1).unwrap();
        assert!(v.to_native().is_err());
        assert_eq!(native(&SInt::with_value(128, -1).unwrap()), -1);
    }

    #[test]
    fn test_resize_and_reinterpret() {
        assert_eq!(native(&sint8(-2).resize(16).unwrap()), -2);
        assert_eq!(native(&uint8(0xFE).resize(16).unwrap()), 0xFE);
        assert_eq!(native(&sint8(-2).reinterpret::<false>()), 0xFE);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", uint8(18)), "UInt(18)");
        assert_eq!(format!("{:?}", sint8(-1)), "SInt(-1)");
        assert_eq!(format!("{:?}", UInt::new(8).unwrap()), "UInt(None)");
        assert_eq!(format!("{}", UInt::new(8).unwrap()), "");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sint8_matches_i8(a: i8, b: i8) {
            let x = sint8(a as i128);
            let y = sint8(b as i128);
            prop_assert!((&x + &y) == a.wrapping_add(b) as i128);
            prop_assert!((&x - &y) == a.wrapping_sub(b) as i128);
            prop_assert!((&x * &y) == a.wrapping_mul(b) as i128);
            if b != 0 {
                prop_assert!((&x / &y) == a.wrapping_div(b) as i128);
                prop_assert!((&x % &y) == a.wrapping_rem(b) as i128);
            }
        }

        #[test]
        fn uint32_matches_u32(a: u32, b: u32) {
            let x = uint32(a as i128);
            let y = uint32(b as i128);
            prop_assert!((&x + &y) == a.wrapping_add(b) as i128);
            prop_assert!((&x * &y) == a.wrapping_mul(b) as i128);
            prop_assert_eq!(x.partial_cmp(&y), a.partial_cmp(&b));
        }

        #[test]
        fn floor_div_matches_euclid_for_positive_divisor(a: i32, b in 1i32..1000) {
            let x = sint32(a as i128);
            let y = sint32(b as i128);
            prop_assert!(x.floor_div(&y) == a.div_euclid(b) as i128);
            prop_assert!(x.floor_mod(&y) == a.rem_euclid(b) as i128);
        }
    }
}
