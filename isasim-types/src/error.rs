//! # Error Types for the numeric type layer

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataTypeError {
    #[error("Invalid width: {0} bits (valid range: 1-{})", crate::bits::MAX_WIDTH)]
    InvalidWidth(u32),

    #[error("Bit range [{msb}:{lsb}] out of bounds for {width}-bit value")]
    BitRangeOutOfBounds { msb: u32, lsb: u32, width: u32 },

    #[error("Value not supported: {op} cannot operate on X value")]
    UnknownValue { op: &'static str },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Value {value} is not representable as {target}")]
    NotRepresentable { value: String, target: &'static str },

    #[error("Invalid floating-point format: exponent {exp_width} bits, mantissa {man_width} bits")]
    InvalidFormat { exp_width: u32, man_width: u32 },

    #[error("Format mismatch: {left} vs {right}")]
    FormatMismatch { left: String, right: String },

    #[error("Invalid mask pattern: {0}")]
    InvalidMask(String),
}

impl DataTypeError {
    pub(crate) fn unknown(op: &'static str) -> Self {
        DataTypeError::UnknownValue { op }
    }

    /// Check if this error was caused by an X operand
    pub fn is_unknown(&self) -> bool {
        matches!(self, DataTypeError::UnknownValue { .. })
    }
}

pub type Result<T> = std::result::Result<T, DataTypeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataTypeError::InvalidWidth(0);
        assert_eq!(err.to_string(), "Invalid width: 0 bits (valid range: 1-65536)");

        let err = DataTypeError::BitRangeOutOfBounds { msb: 9, lsb: 0, width: 8 };
        assert_eq!(err.to_string(), "Bit range [9:0] out of bounds for 8-bit value");

        let err = DataTypeError::unknown("<");
        assert_eq!(err.to_string(), "Value not supported: < cannot operate on X value");
    }

    #[test]
    fn test_is_unknown() {
        assert!(DataTypeError::unknown("==").is_unknown());
        assert!(!DataTypeError::DivisionByZero.is_unknown());
    }
}
