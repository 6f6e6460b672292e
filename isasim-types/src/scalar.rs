//! Tagged union over every data type, for code that picks a format at run time.

use crate::bits::Bits;
use crate::error::Result;
use crate::fixed::{Fixed, FixedFormat};
use crate::floating::{FloatFormat, Floating};
use crate::integer::{SInt, UInt};
use crate::value::{DataType, Native};
use std::fmt;

/// Interpretation and width of a scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    UInt(u32),
    SInt(u32),
    Fixed(FixedFormat),
    Floating(FloatFormat),
}

impl Format {
    pub fn width(&self) -> u32 {
        match self {
            Format::UInt(w) | Format::SInt(w) => *w,
            Format::Fixed(f) => f.width(),
            Format::Floating(f) => f.width(),
        }
    }

    /// A value of this format in the X state
    pub fn unknown(&self) -> Result<Scalar> {
        Ok(match *self {
            Format::UInt(w) => Scalar::UInt(UInt::new(w)?),
            Format::SInt(w) => Scalar::SInt(SInt::new(w)?),
            Format::Fixed(f) => Scalar::Fixed(Fixed::from_format(f)),
            Format::Floating(f) => Scalar::Floating(Floating::from_format(f)),
        })
    }

    /// A value of this format holding `value`
    pub fn value(&self, value: impl Into<Native>) -> Result<Scalar> {
        let mut scalar = self.unknown()?;
        scalar.from_native(value.into())?;
        Ok(scalar)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::UInt(w) => write!(f, "u{}", w),
            Format::SInt(w) => write!(f, "s{}", w),
            Format::Fixed(fmt) => write!(f, "{}", fmt),
            Format::Floating(fmt) => write!(f, "{}", fmt),
        }
    }
}

#[derive(Clone, PartialEq)]
pub enum Scalar {
    UInt(UInt),
    SInt(SInt),
    Fixed(Fixed),
    Floating(Floating),
}

macro_rules! delegate {
    ($self:ident, $v:ident => $e:expr) => {
        match $self {
            Scalar::UInt($v) => $e,
            Scalar::SInt($v) => $e,
            Scalar::Fixed($v) => $e,
            Scalar::Floating($v) => $e,
        }
    };
}

impl Scalar {
    pub fn kind(&self) -> Format {
        match self {
            Scalar::UInt(v) => Format::UInt(v.width()),
            Scalar::SInt(v) => Format::SInt(v.width()),
            Scalar::Fixed(v) => Format::Fixed(v.format()),
            Scalar::Floating(v) => Format::Floating(v.format()),
        }
    }

    /// Same value in another format
    pub fn convert_to(&self, format: Format) -> Result<Scalar> {
        let mut out = format.unknown()?;
        if !self.is_x() {
            out.from_native(self.to_native()?)?;
        }
        Ok(out)
    }
}

impl DataType for Scalar {
    fn type_name(&self) -> &'static str {
        delegate!(self, v => v.type_name())
    }

    fn width(&self) -> u32 {
        delegate!(self, v => v.width())
    }

    fn bits(&self) -> Option<&Bits> {
        delegate!(self, v => v.bits())
    }

    fn set_bits(&mut self, bits: Option<Bits>) {
        delegate!(self, v => v.set_bits(bits))
    }

    fn to_native(&self) -> Result<Native> {
        delegate!(self, v => v.to_native())
    }

    fn from_native(&mut self, value: Native) -> Result<()> {
        delegate!(self, v => v.from_native(value))
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        delegate!(self, v => fmt::Debug::fmt(v, f))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        delegate!(self, v => fmt::Display::fmt(v, f))
    }
}

impl From<UInt> for Scalar {
    fn from(v: UInt) -> Self {
        Scalar::UInt(v)
    }
}

impl From<SInt> for Scalar {
    fn from(v: SInt) -> Self {
        Scalar::SInt(v)
    }
}

impl From<Fixed> for Scalar {
    fn from(v: Fixed) -> Self {
        Scalar::Fixed(v)
    }
}

impl From<Floating> for Scalar {
    fn from(v: Floating) -> Self {
        Scalar::Floating(v)
    }
}
