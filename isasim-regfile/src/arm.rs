//! # AArch64 Register File
//!
//! Software-visible register state of an AArch64 core with SVE:
//!
//! | Class | Count | Width    | Notes                                   |
//! |-------|-------|----------|-----------------------------------------|
//! | X/W   | 31    | 64       | index 31 is XZR: reads zero, writes drop |
//! | Z     | 32    | VL       | scalable vectors                         |
//! | V     | 32    | 128      | SIMD&FP view of the low bits of Z        |
//! | P     | 16    | VL / 8   | one predicate bit per vector byte        |
//!
//! GPRs and vectors start as X by default; predicates start all-true. See
//! [`RegFileConfig`] for the strategies.

use crate::config::RegFileConfig;
use crate::error::{RegFileError, Result};
use crate::init::{InitStrategy, Xorshift64};
use crate::register::Register;
use isasim_types::{DataType, UInt};
use tracing::{debug, trace};

/// Number of general purpose registers
pub const GPR_COUNT: usize = 31;
/// Number of scalable vector registers
pub const VECTOR_COUNT: usize = 32;
/// Number of predicate registers
pub const PREDICATE_COUNT: usize = 16;
/// GPR index that encodes the zero register
pub const ZERO_REGISTER: usize = 31;

/// GPR width in bits
pub const GPR_WIDTH: u32 = 64;
/// SIMD&FP register width in bits
pub const SIMD_WIDTH: u32 = 128;

/// Element sizes usable for lane access
pub const ELEMENT_SIZES: [u32; 5] = [8, 16, 32, 64, 128];

/// AArch64 register file
#[derive(Debug, Clone)]
pub struct ArmRegFile {
    config: RegFileConfig,
    gprs: Vec<Register>,
    vectors: Vec<Register>,
    predicates: Vec<Register>,
    rng: Xorshift64,
}

impl ArmRegFile {
    /// Create a register file and apply the configured initial state
    pub fn new(config: RegFileConfig) -> Result<Self> {
        config.validate()?;
        debug!("creating AArch64 register file: {}", config);

        let bank = |prefix: &str, count: usize, width: u32| -> Result<Vec<Register>> {
            (0..count)
                .map(|i| Register::new(format!("{}{}", prefix, i), width))
                .collect()
        };
        let mut regfile = Self {
            gprs: bank("X", GPR_COUNT, GPR_WIDTH)?,
            vectors: bank("Z", VECTOR_COUNT, config.vector_length)?,
            predicates: bank("P", PREDICATE_COUNT, config.predicate_length())?,
            rng: Xorshift64::new(config.seed),
            config,
        };
        regfile.initialize()?;
        Ok(regfile)
    }

    /// Default configuration with the given vector length
    pub fn with_vector_length(vector_length: u32) -> Result<Self> {
        Self::new(RegFileConfig::new(vector_length)?)
    }

    fn initialize(&mut self) -> Result<()> {
        let RegFileConfig {
            gpr_init,
            vector_init,
            predicate_init,
            ..
        } = self.config;
        debug!(
            "initializing registers: gpr={}, vector={}, predicate={}",
            gpr_init, vector_init, predicate_init
        );
        for reg in &mut self.gprs {
            reg.fill(gpr_init, &mut self.rng)?;
        }
        for reg in &mut self.vectors {
            reg.fill(vector_init, &mut self.rng)?;
        }
        self.fill_predicates(predicate_init)
    }

    /// Re-apply the configured initial state. The random generator is
    /// re-seeded, so a reset file matches a freshly created one.
    pub fn reset(&mut self) -> Result<()> {
        trace!("resetting register file");
        self.rng = Xorshift64::new(self.config.seed);
        self.initialize()
    }

    pub fn config(&self) -> &RegFileConfig {
        &self.config
    }

    pub fn vector_length(&self) -> u32 {
        self.config.vector_length
    }

    pub fn predicate_length(&self) -> u32 {
        self.config.predicate_length()
    }

    // ========================================================================
    // Register lookup
    // ========================================================================

    fn index_error(kind: &'static str, index: usize, count: usize) -> RegFileError {
        RegFileError::InvalidRegister {
            kind,
            index,
            max: count - 1,
        }
    }

    /// General purpose register `n` (0-30)
    pub fn gpr(&self, n: usize) -> Result<&Register> {
        self.gprs
            .get(n)
            .ok_or_else(|| Self::index_error("X", n, GPR_COUNT))
    }

    /// Scalable vector register `n`
    pub fn vector(&self, n: usize) -> Result<&Register> {
        self.vectors
            .get(n)
            .ok_or_else(|| Self::index_error("Z", n, VECTOR_COUNT))
    }

    /// Predicate register `n`
    pub fn predicate(&self, n: usize) -> Result<&Register> {
        self.predicates
            .get(n)
            .ok_or_else(|| Self::index_error("P", n, PREDICATE_COUNT))
    }

    fn vector_mut(&mut self, n: usize) -> Result<&mut Register> {
        self.vectors
            .get_mut(n)
            .ok_or_else(|| Self::index_error("Z", n, VECTOR_COUNT))
    }

    fn predicate_mut(&mut self, n: usize) -> Result<&mut Register> {
        self.predicates
            .get_mut(n)
            .ok_or_else(|| Self::index_error("P", n, PREDICATE_COUNT))
    }

    pub(crate) fn banks(&self) -> [&[Register]; 3] {
        [&self.gprs, &self.vectors, &self.predicates]
    }

    pub(crate) fn banks_mut(&mut self) -> [&mut [Register]; 3] {
        [&mut self.gprs, &mut self.vectors, &mut self.predicates]
    }

    // ========================================================================
    // General purpose registers
    // ========================================================================

    /// Read the low `size` bits of X`n`. Index 31 reads zero.
    pub fn read_r(&self, n: usize, size: u32) -> Result<UInt> {
        if n == ZERO_REGISTER {
            Self::check_zero_size(size)?;
            return Ok(UInt::with_value(size, 0)?);
        }
        self.gprs
            .get(n)
            .ok_or_else(|| Self::index_error("X", n, GPR_COUNT + 1))?
            .read(size)
    }

    /// Write the low `size` bits of X`n`. Writes to index 31 are discarded.
    pub fn write_r(&mut self, n: usize, size: u32, value: &impl DataType) -> Result<()> {
        if n == ZERO_REGISTER {
            return Self::check_zero_size(size);
        }
        self.gprs
            .get_mut(n)
            .ok_or_else(|| Self::index_error("X", n, GPR_COUNT + 1))?
            .write(size, value)
    }

    fn check_zero_size(size: u32) -> Result<()> {
        if size == 0 || size > GPR_WIDTH {
            return Err(RegFileError::InvalidAccessSize {
                name: "XZR".to_string(),
                size,
                width: GPR_WIDTH,
            });
        }
        Ok(())
    }

    // ========================================================================
    // SIMD&FP and scalable vector registers
    // ========================================================================

    /// Read the low `size` bits (up to 128) of V`n`
    pub fn read_v(&self, n: usize, size: u32) -> Result<UInt> {
        let reg = self.vector(n)?;
        reg.check_size(size, SIMD_WIDTH)?;
        reg.read(size)
    }

    /// Write the low `size` bits (up to 128) of V`n`; the rest of Z`n` is kept
    pub fn write_v(&mut self, n: usize, size: u32, value: &impl DataType) -> Result<()> {
        let reg = self.vector_mut(n)?;
        reg.check_size(size, SIMD_WIDTH)?;
        reg.write(size, value)
    }

    /// Read the low `size` bits (up to VL) of Z`n`
    pub fn read_z(&self, n: usize, size: u32) -> Result<UInt> {
        self.vector(n)?.read(size)
    }

    /// Write the low `size` bits (up to VL) of Z`n`
    pub fn write_z(&mut self, n: usize, size: u32, value: &impl DataType) -> Result<()> {
        self.vector_mut(n)?.write(size, value)
    }

    /// Number of `esize`-bit elements in a vector
    pub fn lane_count(&self, esize: u32) -> Result<usize> {
        if !ELEMENT_SIZES.contains(&esize) {
            return Err(RegFileError::InvalidLane {
                esize,
                lane: 0,
                vl: self.vector_length(),
            });
        }
        Ok((self.vector_length() / esize) as usize)
    }

    /// Bit offset of a lane, validating element size and lane index
    fn lane_offset(&self, esize: u32, lane: usize) -> Result<u32> {
        if lane >= self.lane_count(esize)? {
            return Err(RegFileError::InvalidLane {
                esize,
                lane,
                vl: self.vector_length(),
            });
        }
        Ok(lane as u32 * esize)
    }

    /// Read element `lane` of Z`n`
    pub fn read_z_lane(&self, n: usize, esize: u32, lane: usize) -> Result<UInt> {
        let lsb = self.lane_offset(esize, lane)?;
        self.vector(n)?.read_field(lsb + esize - 1, lsb)
    }

    /// Write element `lane` of Z`n`
    pub fn write_z_lane(
        &mut self,
        n: usize,
        esize: u32,
        lane: usize,
        value: &impl DataType,
    ) -> Result<()> {
        let lsb = self.lane_offset(esize, lane)?;
        self.vector_mut(n)?.write_field(lsb + esize - 1, lsb, value)
    }

    // ========================================================================
    // Predicate registers
    // ========================================================================

    /// Read the low `size` bits (up to VL/8) of P`n`
    pub fn read_p(&self, n: usize, size: u32) -> Result<UInt> {
        self.predicate(n)?.read(size)
    }

    /// Write the low `size` bits (up to VL/8) of P`n`
    pub fn write_p(&mut self, n: usize, size: u32, value: &impl DataType) -> Result<()> {
        self.predicate_mut(n)?.write(size, value)
    }

    /// Whether element `lane` of size `esize` is active under P`p`.
    /// Each element owns `esize / 8` predicate bits; the lowest one decides.
    pub fn predicate_active(&self, p: usize, esize: u32, lane: usize) -> Result<bool> {
        let bit = self.lane_offset(esize, lane)? / 8;
        let flag = self.predicate(p)?.read_field(bit, bit)?;
        Ok(flag.is_nonzero()?)
    }

    fn fill_predicates(&mut self, strategy: InitStrategy) -> Result<()> {
        debug!("filling predicate registers: {}", strategy);
        for reg in &mut self.predicates {
            reg.fill(strategy, &mut self.rng)?;
        }
        Ok(())
    }

    /// Set every predicate bit (all elements active)
    pub fn all_true_predicate(&mut self) -> Result<()> {
        self.fill_predicates(InitStrategy::AllTrue)
    }

    /// Clear every predicate bit (all elements inactive)
    pub fn all_false_predicate(&mut self) -> Result<()> {
        self.fill_predicates(InitStrategy::AllFalse)
    }

    /// Fill predicates from the seeded generator
    pub fn random_predicate(&mut self) -> Result<()> {
        self.fill_predicates(InitStrategy::Random)
    }

    /// Return every predicate register to X
    pub fn unknown_predicate(&mut self) -> Result<()> {
        self.fill_predicates(InitStrategy::Unknown)
    }
}
