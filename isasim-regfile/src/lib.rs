//! # ISA Simulator Register Files
//!
//! Architectural register state built on the `isasim-types` bit strings.
//! Every register starts in the X state unless an initialization strategy
//! fills it.
//!
//! ```
//! use isasim_regfile::{ArmRegFile, RegFileConfig};
//! use isasim_types::{uint64, DataType, Native};
//!
//! let mut rf = ArmRegFile::new(RegFileConfig::DEFAULT).unwrap();
//! rf.write_r(1, 64, &uint64(42)).unwrap();
//! assert_eq!(rf.read_r(1, 32).unwrap().to_native().unwrap(), Native::Int(42));
//! assert!(rf.read_r(2, 64).unwrap().is_x());
//! ```

pub mod arm;
pub mod config;
pub mod error;
pub mod image;
pub mod init;
pub mod register;

pub use arm::{
    ArmRegFile, ELEMENT_SIZES, GPR_COUNT, GPR_WIDTH, PREDICATE_COUNT, SIMD_WIDTH, VECTOR_COUNT,
    ZERO_REGISTER,
};
pub use config::RegFileConfig;
pub use error::{RegFileError, Result};
pub use image::{RegFileImage, IMAGE_HEADER_SIZE, IMAGE_MAGIC, IMAGE_VERSION};
pub use init::{InitStrategy, Xorshift64};
pub use register::Register;
