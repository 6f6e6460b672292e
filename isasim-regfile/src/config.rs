//! # Register File Configuration
//!
//! Vector length and per-class initialization strategies for the AArch64
//! register file.

use crate::error::{RegFileError, Result};
use crate::init::InitStrategy;
use std::fmt;

/// Register file configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegFileConfig {
    /// SVE vector length in bits (multiple of 128, 128-2048)
    pub vector_length: u32,
    /// Initial state of the general purpose registers
    pub gpr_init: InitStrategy,
    /// Initial state of the scalable vector registers
    pub vector_init: InitStrategy,
    /// Initial state of the predicate registers
    pub predicate_init: InitStrategy,
    /// Seed for `InitStrategy::Random`
    pub seed: u64,
}

impl RegFileConfig {
    pub const MIN_VECTOR_LENGTH: u32 = 128;
    pub const MAX_VECTOR_LENGTH: u32 = 2048;

    /// Default configuration:
    /// - VL 256 bits (predicates 32 bits)
    /// - GPRs and vectors start as X
    /// - Predicates start all-true
    pub const DEFAULT: Self = Self {
        vector_length: 256,
        gpr_init: InitStrategy::Unknown,
        vector_init: InitStrategy::Unknown,
        predicate_init: InitStrategy::AllTrue,
        seed: 0x5EED_1234_ABCD,
    };

    /// Default configuration with the given vector length
    pub fn new(vector_length: u32) -> Result<Self> {
        let config = Self {
            vector_length,
            ..Self::DEFAULT
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let vl = self.vector_length;
        if !(Self::MIN_VECTOR_LENGTH..=Self::MAX_VECTOR_LENGTH).contains(&vl) || vl % 128 != 0 {
            return Err(RegFileError::InvalidVectorLength(vl));
        }
        Ok(())
    }

    /// Predicate register width: one bit per vector byte
    #[inline]
    pub const fn predicate_length(&self) -> u32 {
        self.vector_length / 8
    }

    pub fn with_vector_length(mut self, vector_length: u32) -> Self {
        self.vector_length = vector_length;
        self
    }

    pub fn with_gpr_init(mut self, strategy: InitStrategy) -> Self {
        self.gpr_init = strategy;
        self
    }

    pub fn with_vector_init(mut self, strategy: InitStrategy) -> Self {
        self.vector_init = strategy;
        self
    }

    pub fn with_predicate_init(mut self, strategy: InitStrategy) -> Self {
        self.predicate_init = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for RegFileConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RegFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegFileConfig {{ vl: {} bits, pl: {} bits, gpr: {}, vector: {}, predicate: {}, seed: {:#x} }}",
            self.vector_length,
            self.predicate_length(),
            self.gpr_init,
            self.vector_init,
            self.predicate_init,
            self.seed,
        )
    }
}
