//! # Fixed-Width Bit Strings
//!
//! [`Bits`] is the storage behind every data value and register. A bit string
//! has a fixed width chosen at construction and holds its pattern in 64-bit
//! limbs, least significant limb first. Bits above the width are always zero.
//!
//! All arithmetic wraps at the width, so computing an unconstrained result and
//! re-encoding it to the fixed width is the same as operating on the limbs.
//!
//! ```
//! use isasim_types::Bits;
//!
//! let a = Bits::from_u64(8, 0xFB).unwrap();
//! let b = Bits::from_u64(8, 0x04).unwrap();
//! assert_eq!(a.wrapping_add(&b).to_u64(), 0xFF);
//! ```

use crate::error::{DataTypeError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Widest bit string that can be constructed
pub const MAX_WIDTH: u32 = 1 << 16;

/// Bits per storage limb
pub const LIMB_BITS: u32 = 64;

/// Fixed-width bit string
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BitsRepr", into = "BitsRepr")]
pub struct Bits {
    width: u32,
    /// Limbs, least significant first (only the low `width` bits are used)
    limbs: Vec<u64>,
}

/// Serialized form; validated on the way back in
#[derive(Serialize, Deserialize)]
struct BitsRepr {
    width: u32,
    limbs: Vec<u64>,
}

impl TryFrom<BitsRepr> for Bits {
    type Error = DataTypeError;

    fn try_from(repr: BitsRepr) -> Result<Self> {
        check_width(repr.width)?;
        if repr.limbs.len() != limb_count(repr.width) {
            return Err(DataTypeError::InvalidWidth(repr.width));
        }
        let bits = Bits {
            width: repr.width,
            limbs: repr.limbs,
        };
        let top = bits.limbs[bits.limbs.len() - 1];
        if top & !top_mask(bits.width) != 0 {
            return Err(DataTypeError::BitRangeOutOfBounds {
                msb: bits.limbs.len() as u32 * LIMB_BITS - 1,
                lsb: bits.width,
                width: bits.width,
            });
        }
        Ok(bits)
    }
}

impl From<Bits> for BitsRepr {
    fn from(bits: Bits) -> Self {
        BitsRepr {
            width: bits.width,
            limbs: bits.limbs,
        }
    }
}

#[inline]
fn limb_count(width: u32) -> usize {
    width.div_ceil(LIMB_BITS) as usize
}

#[inline]
fn top_mask(width: u32) -> u64 {
    match width % LIMB_BITS {
        0 => u64::MAX,
        r => (1u64 << r) - 1,
    }
}

pub(crate) fn check_width(width: u32) -> Result<()> {
    if width == 0 || width > MAX_WIDTH {
        Err(DataTypeError::InvalidWidth(width))
    } else {
        Ok(())
    }
}

/// Order an inclusive bit range so that the first element is the MSB
#[inline]
pub(crate) fn ordered_range(a: u32, b: u32) -> (u32, u32) {
    if a >= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Bits {
    /// All-zero bit string (width unchecked)
    pub(crate) fn blank(width: u32) -> Self {
        Self {
            width,
            limbs: vec![0; limb_count(width)],
        }
    }

    #[inline]
    fn normalize(mut self) -> Self {
        let last = self.limbs.len() - 1;
        self.limbs[last] &= top_mask(self.width);
        self
    }

    /// All-zero bit string
    pub fn zero(width: u32) -> Result<Self> {
        check_width(width)?;
        Ok(Self::blank(width))
    }

    /// All-one bit string
    pub fn ones(width: u32) -> Result<Self> {
        check_width(width)?;
        Ok(Self::blank(width).not())
    }

    /// Create from u64, truncated to the width
    pub fn from_u64(width: u32, val: u64) -> Result<Self> {
        Self::from_u128(width, val as u128)
    }

    /// Create from u128, truncated to the width
    pub fn from_u128(width: u32, val: u128) -> Result<Self> {
        let mut bits = Self::zero(width)?;
        bits.limbs[0] = val as u64;
        if let Some(limb) = bits.limbs.get_mut(1) {
            *limb = (val >> 64) as u64;
        }
        Ok(bits.normalize())
    }

    /// Create from i128 with two's-complement wraparound at the width
    pub fn from_i128(width: u32, val: i128) -> Result<Self> {
        check_width(width)?;
        Ok(Self::wrap_i128(width, val))
    }

    pub(crate) fn wrap_i128(width: u32, val: i128) -> Self {
        let mut bits = Self::blank(width);
        let fill = if val < 0 { u64::MAX } else { 0 };
        for (i, limb) in bits.limbs.iter_mut().enumerate() {
            *limb = match i {
                0 => val as u64,
                1 => (val >> 64) as u64,
                _ => fill,
            };
        }
        bits.normalize()
    }

    /// Truncate a float toward zero and wrap the integer into the width.
    /// Exact for every finite input, however large.
    pub fn from_f64_trunc(width: u32, val: f64) -> Result<Self> {
        check_width(width)?;
        if !val.is_finite() {
            return Err(DataTypeError::NotRepresentable {
                value: val.to_string(),
                target: "integer",
            });
        }
        let t = val.trunc().abs();
        if t == 0.0 {
            return Ok(Self::blank(width));
        }
        // t >= 1, so it is a normal float: t = man * 2^exp
        let raw = t.to_bits();
        let exp = ((raw >> 52) & 0x7FF) as i32 - 1075;
        let man = (raw & ((1u64 << 52) - 1)) | (1u64 << 52);
        let mag = if exp >= 0 {
            Self::wrap_i128(width, man as i128).shl(exp as u32)
        } else {
            Self::wrap_i128(width, (man >> (-exp) as u32) as i128)
        };
        Ok(if val < 0.0 { mag.wrapping_neg() } else { mag })
    }

    /// Nearest float to the unsigned (or two's-complement) value
    pub fn to_f64(&self, signed: bool) -> f64 {
        let negative = signed && self.msb();
        let mag = if negative { self.wrapping_neg() } else { self.clone() };
        let mut acc = 0.0f64;
        for limb in mag.limbs.iter().rev() {
            acc = acc * 18446744073709551616.0 + *limb as f64;
        }
        if negative {
            -acc
        } else {
            acc
        }
    }

    /// Create from limbs, least significant first. Missing limbs are zero and
    /// bits beyond the width are dropped.
    pub fn from_limbs(width: u32, limbs: &[u64]) -> Result<Self> {
        let mut bits = Self::zero(width)?;
        for (dst, src) in bits.limbs.iter_mut().zip(limbs) {
            *dst = *src;
        }
        Ok(bits.normalize())
    }

    /// Width in bits
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Limbs, least significant first
    #[inline]
    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }

    #[inline]
    fn limb(&self, i: usize) -> u64 {
        self.limbs.get(i).copied().unwrap_or(0)
    }

    /// Read one bit (bits beyond the width read as zero)
    #[inline]
    pub fn bit(&self, idx: u32) -> bool {
        idx < self.width && (self.limbs[(idx / LIMB_BITS) as usize] >> (idx % LIMB_BITS)) & 1 == 1
    }

    #[inline]
    pub(crate) fn put_bit(&mut self, idx: u32, value: bool) {
        debug_assert!(idx < self.width);
        let limb = &mut self.limbs[(idx / LIMB_BITS) as usize];
        let mask = 1u64 << (idx % LIMB_BITS);
        if value {
            *limb |= mask;
        } else {
            *limb &= !mask;
        }
    }

    /// Write one bit
    pub fn set_bit(&mut self, idx: u32, value: bool) -> Result<()> {
        if idx >= self.width {
            return Err(DataTypeError::BitRangeOutOfBounds {
                msb: idx,
                lsb: idx,
                width: self.width,
            });
        }
        self.put_bit(idx, value);
        Ok(())
    }

    /// Most significant bit
    #[inline]
    pub fn msb(&self) -> bool {
        self.bit(self.width - 1)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    #[inline]
    pub fn is_ones(&self) -> bool {
        self.not().is_zero()
    }

    pub fn count_ones(&self) -> u32 {
        self.limbs.iter().map(|l| l.count_ones()).sum()
    }

    /// Low 64 bits
    #[inline]
    pub fn to_u64(&self) -> u64 {
        self.limbs[0]
    }

    /// Low 128 bits
    #[inline]
    pub fn to_u128(&self) -> u128 {
        (self.limb(0) as u128) | ((self.limb(1) as u128) << 64)
    }

    /// Unsigned value, if it fits in u128
    pub fn to_u128_checked(&self) -> Option<u128> {
        if self.limbs.iter().skip(2).all(|&l| l == 0) {
            Some(self.to_u128())
        } else {
            None
        }
    }

    /// Two's-complement value; `NotRepresentable` if it does not fit in i128
    pub fn to_i128(&self) -> Result<i128> {
        self.fit_i128().ok_or_else(|| DataTypeError::NotRepresentable {
            value: self.to_string(),
            target: "i128",
        })
    }

    fn fit_i128(&self) -> Option<i128> {
        let negative = self.msb();
        if self.width <= 128 {
            let raw = self.to_u128();
            if negative && self.width < 128 {
                return Some((raw | (u128::MAX << self.width)) as i128);
            }
            return Some(raw as i128);
        }

        // Wider than 128 bits: everything from bit 127 up must be sign fill
        if self.bit(127) != negative {
            return None;
        }
        let fill = if negative { u64::MAX } else { 0 };
        let last = self.limbs.len() - 1;
        for (i, &limb) in self.limbs.iter().enumerate().skip(2) {
            let expected = if i == last { fill & top_mask(self.width) } else { fill };
            if limb != expected {
                return None;
            }
        }
        Some(self.to_u128() as i128)
    }

    /// Zero-extend or truncate to a new width
    pub fn resize(&self, width: u32) -> Result<Self> {
        let mut bits = Self::zero(width)?;
        for (dst, src) in bits.limbs.iter_mut().zip(&self.limbs) {
            *dst = *src;
        }
        Ok(bits.normalize())
    }

    /// Sign-extend or truncate to a new width
    pub fn sign_extend(&self, width: u32) -> Result<Self> {
        let resized = self.resize(width)?;
        if width <= self.width || !self.msb() {
            return Ok(resized);
        }
        let fill = Self::blank(width).not().shl(self.width);
        Ok(resized.or(&fill))
    }

    /// Read the inclusive bit range `[msb:lsb]` (either order accepted)
    pub fn field(&self, a: u32, b: u32) -> Result<Self> {
        let (msb, lsb) = ordered_range(a, b);
        if msb >= self.width {
            return Err(DataTypeError::BitRangeOutOfBounds {
                msb,
                lsb,
                width: self.width,
            });
        }
        self.lshr(lsb).resize(msb - lsb + 1)
    }

    /// Write the inclusive bit range `[msb:lsb]`. The value is truncated or
    /// zero-extended to the field width; other bits are kept.
    pub fn set_field(&mut self, a: u32, b: u32, value: &Bits) -> Result<()> {
        let (msb, lsb) = ordered_range(a, b);
        if msb >= self.width {
            return Err(DataTypeError::BitRangeOutOfBounds {
                msb,
                lsb,
                width: self.width,
            });
        }
        let field_width = msb - lsb + 1;
        let field = value.resize(field_width)?.resize(self.width)?.shl(lsb);
        let mask = Self::blank(field_width).not().resize(self.width)?.shl(lsb);
        *self = self.and(&mask.not()).or(&field);
        Ok(())
    }

    // ========================================================================
    // Bitwise operations (right operand zero-extended or truncated)
    // ========================================================================

    pub fn not(&self) -> Self {
        Self {
            width: self.width,
            limbs: self.limbs.iter().map(|l| !l).collect(),
        }
        .normalize()
    }

    pub fn and(&self, rhs: &Bits) -> Self {
        self.zip_limbs(rhs, |a, b| a & b)
    }

    pub fn or(&self, rhs: &Bits) -> Self {
        self.zip_limbs(rhs, |a, b| a | b)
    }

    pub fn xor(&self, rhs: &Bits) -> Self {
        self.zip_limbs(rhs, |a, b| a ^ b)
    }

    fn zip_limbs(&self, rhs: &Bits, op: impl Fn(u64, u64) -> u64) -> Self {
        Self {
            width: self.width,
            limbs: self
                .limbs
                .iter()
                .enumerate()
                .map(|(i, &a)| op(a, rhs.limb(i)))
                .collect(),
        }
        .normalize()
    }

    /// Left shift; shifting by the width or more gives zero
    pub fn shl(&self, shift: u32) -> Self {
        if shift >= self.width {
            return Self::blank(self.width);
        }
        let limb_shift = (shift / LIMB_BITS) as usize;
        let bit_shift = shift % LIMB_BITS;
        let mut out = Self::blank(self.width);
        for i in limb_shift..self.limbs.len() {
            let src = i - limb_shift;
            let mut limb = self.limbs[src] << bit_shift;
            if bit_shift > 0 && src > 0 {
                limb |= self.limbs[src - 1] >> (LIMB_BITS - bit_shift);
            }
            out.limbs[i] = limb;
        }
        out.normalize()
    }

    /// Logical right shift; shifting by the width or more gives zero
    pub fn lshr(&self, shift: u32) -> Self {
        if shift >= self.width {
            return Self::blank(self.width);
        }
        let limb_shift = (shift / LIMB_BITS) as usize;
        let bit_shift = shift % LIMB_BITS;
        let mut out = Self::blank(self.width);
        for i in 0..self.limbs.len() - limb_shift {
            let src = i + limb_shift;
            let mut limb = self.limbs[src] >> bit_shift;
            if bit_shift > 0 {
                limb |= self.limb(src + 1) << (LIMB_BITS - bit_shift);
            }
            out.limbs[i] = limb;
        }
        out
    }

    /// Arithmetic right shift; shifting by the width or more gives sign fill
    pub fn ashr(&self, shift: u32) -> Self {
        if !self.msb() {
            return self.lshr(shift);
        }
        if shift >= self.width {
            return Self::blank(self.width).not();
        }
        let fill = Self::blank(self.width).not().shl(self.width - shift);
        self.lshr(shift).or(&fill)
    }

    // ========================================================================
    // Wrapping arithmetic (right operand zero-extended or truncated)
    // ========================================================================

    pub fn wrapping_add(&self, rhs: &Bits) -> Self {
        let mut out = Self::blank(self.width);
        let mut carry = false;
        for (i, limb) in out.limbs.iter_mut().enumerate() {
            let (sum, c1) = self.limbs[i].overflowing_add(rhs.limb(i));
            let (sum, c2) = sum.overflowing_add(carry as u64);
            *limb = sum;
            carry = c1 || c2;
        }
        out.normalize()
    }

    pub fn wrapping_sub(&self, rhs: &Bits) -> Self {
        let mut out = Self::blank(self.width);
        let mut borrow = false;
        for (i, limb) in out.limbs.iter_mut().enumerate() {
            let (diff, b1) = self.limbs[i].overflowing_sub(rhs.limb(i));
            let (diff, b2) = diff.overflowing_sub(borrow as u64);
            *limb = diff;
            borrow = b1 || b2;
        }
        out.normalize()
    }

    pub fn wrapping_neg(&self) -> Self {
        Self::blank(self.width).wrapping_sub(self)
    }

    pub fn wrapping_mul(&self, rhs: &Bits) -> Self {
        let n = self.limbs.len();
        let mut out = Self::blank(self.width);
        for i in 0..n {
            let a = self.limbs[i] as u128;
            if a == 0 {
                continue;
            }
            let mut carry = 0u128;
            for j in 0..n - i {
                let t = a * rhs.limb(j) as u128 + out.limbs[i + j] as u128 + carry;
                out.limbs[i + j] = t as u64;
                carry = t >> 64;
            }
        }
        out.normalize()
    }

    /// Compare as unsigned integers of any widths
    pub fn cmp_unsigned(&self, rhs: &Bits) -> Ordering {
        let n = self.limbs.len().max(rhs.limbs.len());
        for i in (0..n).rev() {
            match self.limb(i).cmp(&rhs.limb(i)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Compare as two's-complement integers (each at its own width)
    pub fn cmp_signed(&self, rhs: &Bits) -> Ordering {
        match (self.msb(), rhs.msb()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => {
                let width = self.width.max(rhs.width);
                let a = self.sign_extend_unchecked(width);
                let b = rhs.sign_extend_unchecked(width);
                a.cmp_unsigned(&b)
            }
        }
    }

    pub(crate) fn sign_extend_unchecked(&self, width: u32) -> Self {
        let mut out = Self::blank(width);
        for (dst, src) in out.limbs.iter_mut().zip(&self.limbs) {
            *dst = *src;
        }
        if width > self.width && self.msb() {
            let fill = Self::blank(width).not().shl(self.width);
            out = out.or(&fill);
        }
        out.normalize()
    }

    /// Unsigned quotient and remainder, both at the dividend's width
    pub fn udivrem(&self, rhs: &Bits) -> Result<(Self, Self)> {
        if rhs.is_zero() {
            return Err(DataTypeError::DivisionByZero);
        }
        if let (Some(a), Some(b)) = (self.to_u128_checked(), rhs.to_u128_checked()) {
            return Ok((
                Self::from_u128(self.width, a / b)?,
                Self::from_u128(self.width, a % b)?,
            ));
        }

        // Restoring division, one quotient bit per step
        let work = self.width.max(rhs.width) + 1;
        let divisor = rhs.fit(work);
        let mut rem = Self::blank(work);
        let mut quot = Self::blank(self.width);
        for i in (0..self.width).rev() {
            rem = rem.shl(1);
            rem.put_bit(0, self.bit(i));
            if rem.cmp_unsigned(&divisor) != Ordering::Less {
                rem = rem.wrapping_sub(&divisor);
                quot.put_bit(i, true);
            }
        }
        Ok((quot, rem.fit(self.width)))
    }

    /// Zero-extend or truncate (width unchecked)
    pub(crate) fn fit(&self, width: u32) -> Self {
        let mut out = Self::blank(width);
        for (dst, src) in out.limbs.iter_mut().zip(&self.limbs) {
            *dst = *src;
        }
        out.normalize()
    }

    /// Signed quotient and remainder truncated toward zero. Both operands are
    /// read as two's complement at their own widths; results take `self`'s width.
    pub fn sdivrem(&self, rhs: &Bits) -> Result<(Self, Self)> {
        let neg_a = self.msb();
        let neg_b = rhs.msb();
        let mag_a = if neg_a { self.wrapping_neg() } else { self.clone() };
        let mag_b = if neg_b { rhs.wrapping_neg() } else { rhs.clone() };
        let (q, r) = mag_a.udivrem(&mag_b)?;
        let q = if neg_a != neg_b { q.wrapping_neg() } else { q };
        let r = if neg_a { r.wrapping_neg() } else { r };
        Ok((q, r))
    }

    /// Signed quotient and remainder rounded toward negative infinity; the
    /// remainder takes the sign of the divisor.
    pub fn sdivrem_floor(&self, rhs: &Bits) -> Result<(Self, Self)> {
        let (q, r) = self.sdivrem(rhs)?;
        if !r.is_zero() && self.msb() != rhs.msb() {
            let one = Self::from_u64(self.width, 1)?;
            let divisor = rhs.sign_extend_unchecked(self.width);
            return Ok((q.wrapping_sub(&one), r.wrapping_add(&divisor)));
        }
        Ok((q, r))
    }

    fn hex_digits(&self) -> String {
        let mut digits = String::new();
        for limb in self.limbs.iter().rev() {
            if digits.is_empty() {
                if *limb != 0 {
                    digits = format!("{:x}", limb);
                }
            } else {
                digits.push_str(&format!("{:016x}", limb));
            }
        }
        if digits.is_empty() {
            digits.push('0');
        }
        digits
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits<{}>({:#x})", self.width, self)
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self)
    }
}

impl fmt::LowerHex for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(true, "0x", &self.hex_digits())
    }
}

impl fmt::UpperHex for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(true, "0x", &self.hex_digits().to_uppercase())
    }
}
