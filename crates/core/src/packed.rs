//! Packed payload format and whole-stream pipelines.
//!
//! # Format
//!
//! ```text
//! +--------------------------+
//! | full_bytes (8)           |  u64 big-endian, fully packed payload bytes
//! +--------------------------+
//! | trailing_bits (4)        |  u32 big-endian, 0..=7 valid bits in a final partial byte
//! +--------------------------+
//! | payload                  |  full_bytes bytes, plus one if trailing_bits > 0
//! | (variable)               |
//! +--------------------------+
//! ```
//!
//! The payload is every symbol's code in input order, MSB-first, with the
//! final byte zero-padded in its low bits. `full_bytes * 8 + trailing_bits` is
//! the exact number of code bits; padding past it is never decoded.
//!
//! The code table travels separately (see `table`).

use std::io::{ErrorKind, Read};

use crate::codebook::Codebook;
use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{HeaderError, Result};

/// Size of the payload header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Exact bit length of a packed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PayloadHeader {
    /// Count of fully packed payload bytes
    pub full_bytes: u64,
    /// Valid bits in the final partial byte (0 = none)
    pub trailing_bits: u32,
}

impl PayloadHeader {
    /// Header describing a payload of exactly `bits` bits.
    pub fn from_bit_len(bits: u64) -> Self {
        Self {
            full_bytes: bits / 8,
            trailing_bits: (bits % 8) as u32,
        }
    }

    /// Total encoded bit length; the decoder's stopping condition.
    pub fn total_bits(&self) -> u64 {
        self.full_bytes
            .saturating_mul(8)
            .saturating_add(u64::from(self.trailing_bits))
    }

    /// Number of payload bytes following the header.
    pub fn payload_len(&self) -> u64 {
        self.full_bytes
            .saturating_add(u64::from(self.trailing_bits > 0))
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..8].copy_from_slice(&self.full_bytes.to_be_bytes());
        out[8..].copy_from_slice(&self.trailing_bits.to_be_bytes());
        out
    }

    /// Parse the header from the start of `bytes`.
    ///
    /// # Errors
    /// - `HeaderError::TooShort` if fewer than `HEADER_SIZE` bytes are given
    /// - `HeaderError::InvalidTrailingBits` if the trailing count exceeds 7
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(HeaderError::TooShort {
                required: HEADER_SIZE,
                actual: bytes.len(),
            }
            .into());
        };

        let mut full = [0u8; 8];
        full.copy_from_slice(&header[..8]);
        let mut trailing = [0u8; 4];
        trailing.copy_from_slice(&header[8..]);

        let trailing_bits = u32::from_be_bytes(trailing);
        if trailing_bits > 7 {
            return Err(HeaderError::InvalidTrailingBits(trailing_bits).into());
        }

        Ok(Self {
            full_bytes: u64::from_be_bytes(full),
            trailing_bits,
        })
    }

    /// Read and parse a header from a stream.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        reader.by_ref().take(HEADER_SIZE as u64).read_to_end(&mut bytes)?;
        Self::parse(&bytes)
    }
}

/// Result of compressing a buffer: the codebook plus header and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub codebook: Codebook,
    pub packed: Vec<u8>,
}

/// Build a codebook for `data` and pack it with default settings.
///
/// Empty input is valid: it yields an empty codebook and a zero-bit header.
pub fn compress(data: &[u8]) -> Result<Compressed> {
    compress_with(data, &CodecConfig::default())
}

/// Codebook for `data`; empty input gets the empty codebook.
pub fn codebook_for(data: &[u8]) -> Result<Codebook> {
    if data.is_empty() {
        Ok(Codebook::empty())
    } else {
        Codebook::from_data(data)
    }
}

/// Build a codebook for `data` and pack it.
pub fn compress_with(data: &[u8], config: &CodecConfig) -> Result<Compressed> {
    let codebook = codebook_for(data)?;
    let packed = Encoder::new(&codebook, config)?.encode(data)?;
    Ok(Compressed { codebook, packed })
}

/// Unpack a header-prefixed payload held in memory.
pub fn decompress(packed: &[u8], codebook: &Codebook) -> Result<Vec<u8>> {
    let mut reader = packed;
    decompress_from(&mut reader, codebook, CodecConfig::DEFAULT_READ_CHUNK_BYTES)
}

/// Unpack a header-prefixed payload from a stream, `chunk_bytes` at a time.
///
/// Bytes after the recorded payload are left unread or ignored.
pub fn decompress_from<R: Read>(
    reader: &mut R,
    codebook: &Codebook,
    chunk_bytes: usize,
) -> Result<Vec<u8>> {
    let header = PayloadHeader::read_from(reader)?;
    let mut decoder = Decoder::new(codebook, header.total_bits())?;

    let mut out = Vec::new();
    let mut chunk = vec![0u8; chunk_bytes.max(1)];
    while !decoder.is_complete() {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        decoder.feed(&chunk[..n], &mut out)?;
    }

    decoder.finish()?;
    Ok(out)
}
