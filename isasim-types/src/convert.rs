//! Conversions between data types through their native form.

use crate::error::Result;
use crate::value::DataType;

/// Convert `value` into the type and width of `template`.
///
/// The template's own value is discarded. An X value converts to X.
///
/// ```
/// use isasim_types::{convert, uint8, DataType, Native, SInt};
///
/// let wide = convert(SInt::new(16).unwrap(), &uint8(200)).unwrap();
/// assert_eq!(wide.to_native().unwrap(), Native::Int(200));
/// ```
pub fn convert<T: DataType>(template: T, value: &impl DataType) -> Result<T> {
    let mut out = template;
    match value.bits() {
        None => out.set_x(),
        Some(_) => out.from_native(value.to_native()?)?,
    }
    Ok(out)
}

/// Host float value; integers convert to the nearest float
pub fn to_f64(value: &impl DataType) -> Result<f64> {
    Ok(value.to_native()?.as_f64())
}

/// Host integer value; floats truncate toward zero
pub fn to_i128(value: &impl DataType) -> Result<i128> {
    value.to_native()?.as_i128()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataTypeError;
    use crate::fixed::Fixed;
    use crate::floating::{bfloat16, half, Floating};
    use crate::integer::{sint8, uint8, SInt, UInt};
    use crate::value::Native;

    #[test]
    fn test_to_host_types() {
        assert_eq!(to_f64(&uint8(8)).unwrap(), 8.0);
        assert_eq!(to_i128(&bfloat16(1.5)).unwrap(), 1);
        assert_eq!(to_i128(&bfloat16(-1.5)).unwrap(), -1);
        assert!(to_i128(&half(f64::INFINITY)).is_err());
        assert!(to_f64(&UInt::new(8).unwrap()).unwrap_err().is_unknown());
    }

    #[test]
    fn test_integer_to_integer() {
        let v = convert(UInt::new(4).unwrap(), &uint8(0x1F)).unwrap();
        assert_eq!(v.to_native().unwrap(), Native::Int(0xF));

        let v = convert(UInt::new(8).unwrap(), &sint8(-1)).unwrap();
        assert_eq!(v.to_native().unwrap(), Native::Int(255));
    }

    #[test]
    fn test_float_conversions() {
        let v = convert(SInt::new(8).unwrap(), &half(-2.75)).unwrap();
        assert_eq!(v.to_native().unwrap(), Native::Int(-2));

        let v = convert(Floating::new(5, 10).unwrap(), &sint8(-3)).unwrap();
        assert_eq!(v.to_native().unwrap(), Native::Float(-3.0));

        let v = convert(Fixed::new(8, 4, true).unwrap(), &half(1.75)).unwrap();
        assert_eq!(v.to_native().unwrap(), Native::Float(1.75));

        let err = convert(UInt::new(8).unwrap(), &half(f64::NAN)).unwrap_err();
        assert!(matches!(err, DataTypeError::NotRepresentable { .. }));
    }

    #[test]
    fn test_x_converts_to_x() {
        let v = convert(uint8(3), &Floating::new(5, 10).unwrap()).unwrap();
        assert!(v.is_x());
        assert_eq!(v.width(), 8);
    }
}
