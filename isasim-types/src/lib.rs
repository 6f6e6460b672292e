//! # ISA Simulator Data Types
//!
//! Bit-accurate numeric types for instruction-set simulators and reference
//! models.
//!
//! ## Key Features
//! - Arbitrary-width bit strings (1 to 65536 bits)
//! - Unsigned and two's-complement integers with wrapping arithmetic
//! - Fixed-point values with a per-value binary point
//! - IEEE-style floating point with configurable exponent/mantissa widths
//! - Explicit unknown (X) state that propagates through every operation
//! - Bit-field reads and writes, bit masks for decode tables

pub mod bits;
pub mod convert;
pub mod error;
pub mod fixed;
pub mod floating;
pub mod integer;
pub mod mask;
pub mod scalar;
pub mod value;

pub use bits::{Bits, MAX_WIDTH};
pub use convert::{convert, to_f64, to_i128};
pub use error::{DataTypeError, Result};
pub use fixed::{Fixed, FixedFormat};
pub use floating::{bfloat16, double, fp8_e4m3, fp8_e5m2, half, single, FloatFormat, Floating};
pub use integer::{
    sint16, sint32, sint64, sint8, uint16, uint32, uint64, uint8, Integer, SInt, UInt,
};
pub use mask::BitMask;
pub use scalar::{Format, Scalar};
pub use value::{DataType, Native};
