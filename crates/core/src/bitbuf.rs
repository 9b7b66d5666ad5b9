//! Growable bit-addressable byte buffer.
//!
//! `BitBuffer` accumulates bits MSB-first into a byte array and exposes only
//! the fully packed prefix for output, while remembering any partial trailing
//! byte so later appends continue exactly where the last one stopped.
//!
//! # Layout
//! - `storage.len()` is the capacity; every byte past the write frontier is zero
//! - `byte_index` is the first byte that is not yet full
//! - `bit_index` (0-7) counts the valid high-order bits in `storage[byte_index]`
//!
//! # Example
//! ```
//! use huffpack_core::bitbuf::BitBuffer;
//!
//! let mut buf = BitBuffer::new();
//! buf.append_bit_str("101").unwrap();
//! buf.append_bit_str("11011").unwrap();
//!
//! assert_eq!(buf.bit_string(), "10111011");
//! assert_eq!(buf.num_bits(), 8);
//! assert!(!buf.has_partial_byte());
//! ```

use std::fmt;

use crate::code::{Code, MAX_CODE_LEN};
use crate::error::{BitBufferError, Result};

/// Mask selecting the low `bits` bits of a byte.
///
/// Offsets are always taken modulo 8 by construction, so `bits` is in 0..=8.
#[inline]
fn low_mask(bits: usize) -> u8 {
    debug_assert!(bits <= 8, "mask width {bits} out of range");
    ((1u16 << bits) - 1) as u8
}

/// Byte-backed buffer addressable at bit granularity.
///
/// # Invariants
/// - `num_bits() == byte_index * 8 + bit_index`
/// - `storage.len() > byte_index` (grown by doubling before it would be violated)
/// - bytes at and after the frontier hold zero in every not-yet-written bit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer {
    storage: Vec<u8>,
    byte_index: usize,
    bit_index: usize,
}

impl BitBuffer {
    /// Capacity in bytes used by `new()`.
    pub const DEFAULT_CAPACITY: usize = 20;

    /// Create an empty buffer with `DEFAULT_CAPACITY` bytes of storage.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with room for `capacity` bytes (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity.max(1)],
            byte_index: 0,
            bit_index: 0,
        }
    }

    /// Create a buffer holding the bits of a '0'/'1' string.
    pub fn from_bit_str(bits: &str) -> Result<Self> {
        let mut buf = Self::with_capacity(bits.len() / 8 + 1);
        buf.append_bit_str(bits)?;
        Ok(buf)
    }

    /// Append the low `count` bits of `value`, most significant first.
    ///
    /// Writing value=0b101 with count=3 appends the bits 1, 0, 1 in that order.
    /// A count of 0 is a no-op.
    ///
    /// # Errors
    /// Returns `BitBufferError::InvalidBitCount` if count exceeds `MAX_CODE_LEN`.
    pub fn append_bits(&mut self, value: u128, count: usize) -> Result<()> {
        if count > MAX_CODE_LEN {
            return Err(BitBufferError::InvalidBitCount {
                count,
                max: MAX_CODE_LEN,
            }
            .into());
        }
        self.push_bits(value, count);
        Ok(())
    }

    /// Append every bit of a code.
    pub fn append_code(&mut self, code: &Code) {
        self.push_bits(code.bits(), code.len());
    }

    /// Append bits given as a string of '0'/'1' characters.
    ///
    /// The string is validated before anything is written, so a rejected
    /// string leaves the buffer untouched.
    pub fn append_bit_str(&mut self, bits: &str) -> Result<()> {
        if let Some((index, found)) = bits.chars().enumerate().find(|&(_, c)| c != '0' && c != '1')
        {
            return Err(BitBufferError::InvalidBitChar { index, found }.into());
        }

        let mut acc = 0u128;
        let mut pending = 0;
        for c in bits.bytes() {
            acc = (acc << 1) | u128::from(c == b'1');
            pending += 1;
            if pending == MAX_CODE_LEN {
                self.push_bits(acc, pending);
                acc = 0;
                pending = 0;
            }
        }
        self.push_bits(acc, pending);
        Ok(())
    }

    /// Append whole bytes.
    ///
    /// When a partial byte is pending, each incoming byte's top `8 - bit_index`
    /// bits complete it and its remaining low bits seed the next partial byte.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.reserve_bits(bytes.len() * 8);

        if self.bit_index == 0 {
            let end = self.byte_index + bytes.len();
            self.storage[self.byte_index..end].copy_from_slice(bytes);
            self.byte_index = end;
            return;
        }

        let used = self.bit_index;
        let free = 8 - used;
        for &byte in bytes {
            self.storage[self.byte_index] |= byte >> used;
            self.byte_index += 1;
            self.storage[self.byte_index] = (byte & low_mask(used)) << free;
        }
    }

    /// Infallible core of `append_bits`; `count` must not exceed `MAX_CODE_LEN`.
    fn push_bits(&mut self, value: u128, count: usize) {
        if count == 0 {
            return;
        }
        self.reserve_bits(count);

        let mut remaining = count;
        while remaining > 0 {
            // How many bits fit in the current byte?
            let free = 8 - self.bit_index;
            let take = remaining.min(free);

            // Top `take` bits of what is left, aligned under the frontier
            let shift = remaining - take;
            let chunk = (value >> shift) as u8 & low_mask(take);
            self.storage[self.byte_index] |= chunk << (free - take);

            self.bit_index += take;
            if self.bit_index == 8 {
                self.byte_index += 1;
                self.bit_index = 0;
            }
            remaining -= take;
        }
    }

    /// Double the storage until the frontier after `count` more bits is in bounds.
    fn reserve_bits(&mut self, count: usize) {
        let frontier = self.byte_index + (self.bit_index + count) / 8;
        let mut capacity = self.storage.len();
        while frontier >= capacity {
            capacity *= 2;
        }
        if capacity != self.storage.len() {
            self.storage.resize(capacity, 0);
        }
    }

    /// Copy of every byte that contains no not-yet-written bits.
    pub fn full_bytes(&self) -> Vec<u8> {
        self.storage[..self.byte_index].to_vec()
    }

    /// Copy of all written bytes, including the partial byte zero-padded in its low bits.
    pub fn to_padded_bytes(&self) -> Vec<u8> {
        let end = self.byte_index + usize::from(self.has_partial_byte());
        self.storage[..end].to_vec()
    }

    /// Whether the trailing byte is incomplete.
    pub fn has_partial_byte(&self) -> bool {
        self.bit_index != 0
    }

    /// Number of valid high bits in the partial byte (0 when there is none).
    pub fn partial_byte_bit_count(&self) -> usize {
        self.bit_index
    }

    /// Total number of valid bits.
    pub fn num_bits(&self) -> usize {
        self.byte_index * 8 + self.bit_index
    }

    /// Number of fully packed bytes.
    pub fn num_full_bytes(&self) -> usize {
        self.byte_index
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits() == 0
    }

    /// Current storage capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bit at `index`, counting from the first bit written.
    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.num_bits() {
            return None;
        }
        let byte = self.storage[index / 8];
        Some((byte >> (7 - index % 8)) & 1 == 1)
    }

    /// Empty the buffer, zeroing the used bytes and keeping the capacity.
    pub fn reset(&mut self) {
        self.storage[..=self.byte_index].fill(0);
        self.byte_index = 0;
        self.bit_index = 0;
    }

    /// Drop the first `count` bits; the rest move to the front, still MSB-first.
    pub fn discard_front(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let total = self.num_bits();
        if count >= total {
            self.reset();
            return;
        }

        let kept = total - count;
        let offset = count % 8;
        let source = self.storage[count / 8..=self.byte_index].to_vec();
        self.reset();

        // Rest of the first source byte
        let head = kept.min(8 - offset);
        let first = (source[0] & low_mask(8 - offset)) >> (8 - offset - head);
        self.push_bits(u128::from(first), head);

        // Whole bytes, then whatever is left of the last one
        let remaining = kept - head;
        let whole = remaining / 8;
        self.append_bytes(&source[1..1 + whole]);
        let tail = remaining % 8;
        if tail > 0 {
            self.push_bits(u128::from(source[1 + whole] >> (8 - tail)), tail);
        }
    }

    /// '0'/'1' rendering of every valid bit. Diagnostics only.
    pub fn bit_string(&self) -> String {
        (0..self.num_bits())
            .map(|i| if self.bit(i) == Some(true) { '1' } else { '0' })
            .collect()
    }

    /// Lowercase hex rendering of the padded bytes. Diagnostics only.
    pub fn hex_string(&self) -> String {
        self.to_padded_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bit_string())
    }
}
