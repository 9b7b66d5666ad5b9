//! The `Code` value type: an ordered sequence of 1 to `MAX_CODE_LEN` bits.
//!
//! Bits are held right-aligned in a `u128`; the first bit of the code is the
//! most significant of the `len` low bits. Ordering is by length, then value,
//! which keeps `BTreeMap<Code, _>` iteration stable.

use std::fmt;
use std::str::FromStr;

use crate::error::BitBufferError;

/// Longest code representable (bits in the backing `u128`).
pub const MAX_CODE_LEN: usize = 128;

/// A prefix code for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Code {
    len: u8,
    bits: u128,
}

impl Code {
    /// The zero-length code. Only used as a starting point for accumulation.
    pub const EMPTY: Code = Code { len: 0, bits: 0 };

    /// The one-bit code "0", given to the lone symbol of a one-symbol alphabet.
    pub const SINGLE_ZERO: Code = Code { len: 1, bits: 0 };

    /// Build a code from the low `len` bits of `bits`.
    ///
    /// Returns `None` if `len` exceeds `MAX_CODE_LEN`. Bits above `len` are ignored.
    pub fn from_bits(bits: u128, len: usize) -> Option<Self> {
        if len > MAX_CODE_LEN {
            return None;
        }
        let bits = if len == MAX_CODE_LEN {
            bits
        } else {
            bits & ((1u128 << len) - 1)
        };
        Some(Self {
            len: len as u8,
            bits,
        })
    }

    /// Append one bit to the end, or `None` if the code is already at `MAX_CODE_LEN`.
    #[must_use]
    pub fn push(self, bit: bool) -> Option<Self> {
        if self.len() == MAX_CODE_LEN {
            return None;
        }
        Some(Self {
            len: self.len + 1,
            bits: (self.bits << 1) | u128::from(bit),
        })
    }

    /// Number of bits in the code.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The code bits, right-aligned.
    pub fn bits(&self) -> u128 {
        self.bits
    }

    /// Bit `index`, counting from the first (most significant) bit.
    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.len() {
            return None;
        }
        Some((self.bits >> (self.len() - 1 - index)) & 1 == 1)
    }

    /// True if `self` is a prefix of `other` (a code is a prefix of itself).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len > other.len {
            return false;
        }
        other.bits.checked_shr(u32::from(other.len - self.len)).unwrap_or(0) == self.bits
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len() {
            let c = if self.bit(i) == Some(true) { '1' } else { '0' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = BitBufferError;

    /// Parse a string of '0'/'1' characters. The empty string is `Code::EMPTY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut code = Code::EMPTY;
        for (index, c) in s.chars().enumerate() {
            let bit = match c {
                '0' => false,
                '1' => true,
                found => return Err(BitBufferError::InvalidBitChar { index, found }),
            };
            code = code.push(bit).ok_or(BitBufferError::InvalidBitCount {
                count: s.len(),
                max: MAX_CODE_LEN,
            })?;
        }
        Ok(code)
    }
}
