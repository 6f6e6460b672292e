//! # Register File Images
//!
//! A [`RegFileImage`] is a snapshot of every register of an [`ArmRegFile`],
//! X state included. The binary form is:
//!
//! ```text
//! Offset  Size  Field
//! ──────────────────────────────────
//! 0x00    4     magic ("ISRF")
//! 0x04    4     version (little endian)
//! 0x08    32    SHA-256 of the payload
//! 0x28    ..    payload (bincode)
//! ```

use crate::arm::{ArmRegFile, GPR_COUNT, GPR_WIDTH, PREDICATE_COUNT, VECTOR_COUNT};
use crate::config::RegFileConfig;
use crate::error::{RegFileError, Result};
use isasim_types::{Bits, DataType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

/// Image magic: "ISRF"
pub const IMAGE_MAGIC: [u8; 4] = *b"ISRF";

/// Image format version
pub const IMAGE_VERSION: u32 = 1;

/// Magic, version and checksum
pub const IMAGE_HEADER_SIZE: usize = 4 + 4 + 32;

/// Snapshot of register contents; `None` entries are X
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegFileImage {
    pub vector_length: u32,
    pub gprs: Vec<Option<Bits>>,
    pub vectors: Vec<Option<Bits>>,
    pub predicates: Vec<Option<Bits>>,
}

impl RegFileImage {
    /// Check register counts and widths against the vector length
    pub fn validate(&self) -> Result<()> {
        RegFileConfig::DEFAULT
            .with_vector_length(self.vector_length)
            .validate()?;
        let banks = [
            ("X", &self.gprs, GPR_COUNT, GPR_WIDTH),
            ("Z", &self.vectors, VECTOR_COUNT, self.vector_length),
            ("P", &self.predicates, PREDICATE_COUNT, self.vector_length / 8),
        ];
        for (kind, regs, count, width) in banks {
            if regs.len() != count {
                return Err(RegFileError::ImageMismatch(format!(
                    "{} {} registers, expected {}",
                    regs.len(),
                    kind,
                    count
                )));
            }
            for (i, bits) in regs.iter().enumerate() {
                if let Some(bits) = bits {
                    if bits.width() != width {
                        return Err(RegFileError::ImageMismatch(format!(
                            "{}{} is {} bits, expected {}",
                            kind,
                            i,
                            bits.width(),
                            width
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Encode with header and checksum
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        let digest = Sha256::digest(&payload);

        let mut bytes = Vec::with_capacity(IMAGE_HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&IMAGE_MAGIC);
        bytes.extend_from_slice(&IMAGE_VERSION.to_le_bytes());
        bytes.extend_from_slice(&digest);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode and verify an encoded image
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < IMAGE_HEADER_SIZE {
            return Err(RegFileError::Truncated {
                expected: IMAGE_HEADER_SIZE,
                found: bytes.len(),
            });
        }
        if bytes[0..4] != IMAGE_MAGIC {
            let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            return Err(RegFileError::InvalidMagic(magic));
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != IMAGE_VERSION {
            return Err(RegFileError::InvalidVersion {
                expected: IMAGE_VERSION,
                found: version,
            });
        }

        let payload = &bytes[IMAGE_HEADER_SIZE..];
        if Sha256::digest(payload).as_slice() != &bytes[8..IMAGE_HEADER_SIZE] {
            return Err(RegFileError::ChecksumMismatch);
        }
        trace!("image checksum ok, {} payload bytes", payload.len());

        let image: Self = bincode::deserialize(payload)?;
        image.validate()?;
        debug!("decoded register file image (VL {})", image.vector_length);
        Ok(image)
    }
}

impl ArmRegFile {
    /// Capture every register
    pub fn snapshot(&self) -> RegFileImage {
        let [gprs, vectors, predicates] = self.banks().map(|bank| {
            bank.iter()
                .map(|r| r.value().bits().cloned())
                .collect::<Vec<_>>()
        });
        RegFileImage {
            vector_length: self.vector_length(),
            gprs,
            vectors,
            predicates,
        }
    }

    /// Overwrite every register from an image with the same vector length
    pub fn restore(&mut self, image: &RegFileImage) -> Result<()> {
        image.validate()?;
        if image.vector_length != self.vector_length() {
            return Err(RegFileError::ImageMismatch(format!(
                "image VL {} bits, register file VL {} bits",
                image.vector_length,
                self.vector_length()
            )));
        }

        let sources = [&image.gprs, &image.vectors, &image.predicates];
        for (bank, source) in self.banks_mut().into_iter().zip(sources) {
            for (reg, bits) in bank.iter_mut().zip(source) {
                reg.set_bits(bits.clone());
            }
        }
        debug!("restored register file from image (VL {})", image.vector_length);
        Ok(())
    }
}
