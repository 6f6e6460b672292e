//! Register initialization strategies.
//!
//! Registers start in the X state unless a strategy says otherwise. `Random`
//! draws from a seeded xorshift generator so runs are reproducible.

use crate::error::RegFileError;
use isasim_types::{Bits, Result as TypeResult};
use std::fmt;
use std::str::FromStr;

/// How a register's initial bits are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStrategy {
    /// Every bit set (all predicate elements active)
    AllTrue,
    /// Every bit clear
    AllFalse,
    /// Uniformly random bits
    Random,
    /// X state
    Unknown,
}

impl InitStrategy {
    /// Initial bits for a `width`-bit register; `None` means X
    pub fn bits(&self, width: u32, rng: &mut Xorshift64) -> TypeResult<Option<Bits>> {
        Ok(match self {
            InitStrategy::AllTrue => Some(Bits::ones(width)?),
            InitStrategy::AllFalse => Some(Bits::zero(width)?),
            InitStrategy::Random => Some(rng.bits(width)?),
            InitStrategy::Unknown => None,
        })
    }
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStrategy::AllTrue => "ALL_TRUE",
            InitStrategy::AllFalse => "ALL_FALSE",
            InitStrategy::Random => "RANDOM",
            InitStrategy::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

impl FromStr for InitStrategy {
    type Err = RegFileError;

    /// Case-insensitive; `-` and `_` are interchangeable
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ALL_TRUE" => Ok(InitStrategy::AllTrue),
            "ALL_FALSE" => Ok(InitStrategy::AllFalse),
            "RANDOM" => Ok(InitStrategy::Random),
            "UNKNOWN" | "X" => Ok(InitStrategy::Unknown),
            _ => Err(RegFileError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Xorshift64 generator; deterministic for a given seed
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed | 1, // ensure non-zero
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniformly random bit string
    pub fn bits(&mut self, width: u32) -> TypeResult<Bits> {
        let limbs: Vec<u64> = (0..width.div_ceil(64)).map(|_| self.next_u64()).collect();
        Bits::from_limbs(width, &limbs)
    }
}
