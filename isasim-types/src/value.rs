//! # Base Data Type
//!
//! Every data value is a fixed-width bit string with an interpretation. The
//! [`DataType`] trait is the common surface: width, raw bits, X state, and
//! conversion to and from the unconstrained host representation [`Native`].
//!
//! ## X State
//!
//! A value whose bit pattern is unknown is in the X state (`bits() == None`).
//! X is distinct from zero:
//!
//! | Operation                 | X operand                                  |
//! |---------------------------|--------------------------------------------|
//! | arithmetic / bitwise ops  | result is X                                |
//! | `field`                   | result is X                                |
//! | `set_field`               | X field: no-op; X target: zeroed first     |
//! | `==`, `<`, ...            | `false` / `None`; `try_cmp` is an error    |
//! | `to_native`, `msb`        | `UnknownValue` error                       |

use crate::bits::{ordered_range, Bits};
use crate::error::{DataTypeError, Result};
use crate::integer::UInt;
use std::cmp::Ordering;
use std::fmt;

/// Host-side value used for conversions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Native {
    Int(i128),
    Float(f64),
}

impl Native {
    /// Integer value; floats truncate toward zero
    pub fn as_i128(self) -> Result<i128> {
        match self {
            Native::Int(v) => Ok(v),
            Native::Float(f) => {
                // 2^127 is exactly representable, so the bounds are exact
                const LIMIT: f64 = 170141183460469231731687303715884105728.0;
                let t = f.trunc();
                if !t.is_finite() || t >= LIMIT || t < -LIMIT {
                    return Err(DataTypeError::NotRepresentable {
                        value: f.to_string(),
                        target: "i128",
                    });
                }
                Ok(t as i128)
            }
        }
    }

    /// Floating-point value; large integers round to nearest
    pub fn as_f64(self) -> f64 {
        match self {
            Native::Int(v) => v as f64,
            Native::Float(f) => f,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Native::Float(_))
    }
}

impl fmt::Display for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::Int(v) => write!(f, "{}", v),
            Native::Float(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i128> for Native {
    fn from(v: i128) -> Self {
        Native::Int(v)
    }
}

impl From<i64> for Native {
    fn from(v: i64) -> Self {
        Native::Int(v as i128)
    }
}

impl From<i32> for Native {
    fn from(v: i32) -> Self {
        Native::Int(v as i128)
    }
}

impl From<u64> for Native {
    fn from(v: u64) -> Self {
        Native::Int(v as i128)
    }
}

impl From<f64> for Native {
    fn from(v: f64) -> Self {
        Native::Float(v)
    }
}

impl From<f32> for Native {
    fn from(v: f32) -> Self {
        Native::Float(v as f64)
    }
}

/// Common behaviour of all bit-accurate data types
pub trait DataType: Clone + fmt::Debug {
    /// Type name used in `Debug` output
    fn type_name(&self) -> &'static str;

    /// Width in bits
    fn width(&self) -> u32;

    /// Bit pattern, or `None` in the X state
    fn bits(&self) -> Option<&Bits>;

    /// Replace the bit pattern. The pattern is truncated or zero-extended to
    /// the value's width; `None` sets the X state.
    fn set_bits(&mut self, bits: Option<Bits>);

    /// Decode into the host representation
    fn to_native(&self) -> Result<Native>;

    /// Encode a host value into this type's width
    fn from_native(&mut self, value: Native) -> Result<()>;

    #[inline]
    fn is_x(&self) -> bool {
        self.bits().is_none()
    }

    fn set_x(&mut self) {
        self.set_bits(None);
    }

    /// Bit pattern, failing in the X state
    fn raw(&self) -> Result<&Bits> {
        self.bits().ok_or(DataTypeError::unknown("raw"))
    }

    /// Low 128 bits as an unsigned host integer; X and wider patterns are errors
    fn raw_u128(&self) -> Result<u128> {
        let bits = self.raw()?;
        bits.to_u128_checked()
            .ok_or_else(|| DataTypeError::NotRepresentable {
                value: bits.to_string(),
                target: "u128",
            })
    }

    /// The bit pattern retyped as an unsigned value of another width,
    /// truncated or zero-extended. X stays X.
    fn with_width(&self, width: u32) -> Result<UInt> {
        let mut copy = UInt::new(width)?;
        copy.set_bits(self.bits().cloned());
        Ok(copy)
    }

    /// Read an inclusive bit range as an unsigned bit string
    fn field(&self, a: u32, b: u32) -> Result<UInt> {
        let (msb, lsb) = ordered_range(a, b);
        if msb >= self.width() {
            return Err(DataTypeError::BitRangeOutOfBounds {
                msb,
                lsb,
                width: self.width(),
            });
        }
        let mut out = self.with_width(msb - lsb + 1)?;
        if let Some(bits) = self.bits() {
            out.set_bits(Some(bits.lshr(lsb)));
        }
        Ok(out)
    }

    /// Write an inclusive bit range.
    ///
    /// Writing an X field leaves the value untouched. Writing into an X value
    /// zeroes every bit outside the field.
    fn set_field<T: DataType>(&mut self, a: u32, b: u32, value: &T) -> Result<()> {
        match value.bits() {
            Some(bits) => self.set_field_bits(a, b, bits),
            None => {
                let (msb, _) = ordered_range(a, b);
                if msb >= self.width() {
                    return Err(DataTypeError::BitRangeOutOfBounds {
                        msb,
                        lsb: a.min(b),
                        width: self.width(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Write an inclusive bit range from a raw bit string
    fn set_field_bits(&mut self, a: u32, b: u32, value: &Bits) -> Result<()> {
        let mut bits = match self.bits() {
            Some(bits) => bits.clone(),
            None => Bits::zero(self.width())?,
        };
        bits.set_field(a, b, value)?;
        self.set_bits(Some(bits));
        Ok(())
    }

    /// Most significant bit
    fn msb(&self) -> Result<bool> {
        self.bits()
            .map(Bits::msb)
            .ok_or(DataTypeError::unknown("msb"))
    }

    /// Set the most significant bit; an X value is zeroed first
    fn set_msb(&mut self, value: bool) -> Result<()> {
        let top = self.width() - 1;
        self.set_field_bits(top, top, &Bits::from_u64(1, value as u64)?)
    }

    /// Truth value: non-zero
    fn is_nonzero(&self) -> Result<bool> {
        self.bits()
            .map(|b| !b.is_zero())
            .ok_or(DataTypeError::unknown("bool"))
    }

    /// Ordering that refuses X operands (and unordered values such as NaN)
    fn try_cmp(&self, other: &Self) -> Result<Ordering>
    where
        Self: PartialOrd,
    {
        if self.is_x() || other.is_x() {
            return Err(DataTypeError::unknown("cmp"));
        }
        self.partial_cmp(other)
            .ok_or_else(|| DataTypeError::NotRepresentable {
                value: "unordered".to_string(),
                target: "ordering",
            })
    }

    /// Hexadecimal bit pattern; empty for X
    fn to_hex(&self) -> String {
        self.bits().map(|b| b.to_string()).unwrap_or_default()
    }
}

/// Shared `Debug` body: `Type(native)` or `Type(None)`
pub(crate) fn debug_value<T: DataType>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (value.bits(), value.to_native()) {
        (None, _) => write!(f, "{}(None)", value.type_name()),
        (Some(_), Ok(native)) => write!(f, "{}({})", value.type_name(), native),
        (Some(bits), Err(_)) => write!(f, "{}({})", value.type_name(), bits),
    }
}

/// Shared `Display` body: hex pattern, empty for X
pub(crate) fn display_value<T: DataType>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.bits() {
        Some(bits) => write!(f, "{}", bits),
        None => Ok(()),
    }
}
