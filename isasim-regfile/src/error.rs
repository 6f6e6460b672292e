//! Register file error types

use isasim_types::DataTypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegFileError {
    #[error("Data type error: {0}")]
    DataType(#[from] DataTypeError),

    #[error("Invalid register: {kind}{index} (valid range: 0-{max})")]
    InvalidRegister {
        kind: &'static str,
        index: usize,
        max: usize,
    },

    #[error("Invalid access size: {size} bits for {width}-bit register {name}")]
    InvalidAccessSize { name: String, size: u32, width: u32 },

    #[error("Invalid lane: element size {esize} bits, lane {lane} (vector length {vl})")]
    InvalidLane { esize: u32, lane: usize, vl: u32 },

    #[error("Invalid vector length: {0} bits (must be a multiple of 128 in 128-2048)")]
    InvalidVectorLength(u32),

    #[error("Invalid initialization strategy: {0}")]
    InvalidStrategy(String),

    #[error("Invalid image magic: {0:#010x}")]
    InvalidMagic(u32),

    #[error("Invalid image version: expected {expected:#x}, found {found:#x}")]
    InvalidVersion { expected: u32, found: u32 },

    #[error("Image truncated: expected at least {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("Image checksum mismatch")]
    ChecksumMismatch,

    #[error("Image mismatch: {0}")]
    ImageMismatch(String),

    #[error("Image encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, RegFileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_register_display() {
        let err = RegFileError::InvalidRegister {
            kind: "Z",
            index: 32,
            max: 31,
        };
        assert_eq!(err.to_string(), "Invalid register: Z32 (valid range: 0-31)");
    }

    #[test]
    fn test_access_size_display() {
        let err = RegFileError::InvalidAccessSize {
            name: "X3".to_string(),
            size: 65,
            width: 64,
        };
        assert_eq!(
            err.to_string(),
            "Invalid access size: 65 bits for 64-bit register X3"
        );
    }

    #[test]
    fn test_image_errors_display() {
        assert_eq!(
            RegFileError::InvalidMagic(0xDEADBEEF).to_string(),
            "Invalid image magic: 0xdeadbeef"
        );
        let err = RegFileError::InvalidVersion {
            expected: 1,
            found: 2,
        };
        assert_eq!(err.to_string(), "Invalid image version: expected 0x1, found 0x2");
    }

    #[test]
    fn test_from_data_type_error() {
        let err: RegFileError = DataTypeError::DivisionByZero.into();
        assert!(matches!(err, RegFileError::DataType(DataTypeError::DivisionByZero)));
        assert_eq!(err.to_string(), "Data type error: Division by zero");
    }
}
