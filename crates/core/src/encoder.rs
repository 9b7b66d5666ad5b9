//! Symbol stream → packed payload.
//!
//! The encoder runs two passes over the input. The first sums code lengths,
//! which both fills in the header and rejects unknown symbols before a single
//! byte reaches the sink. The second appends codes to a `BitBuffer` and hands
//! full bytes to the sink whenever the buffer holds at least
//! `flush_threshold` of them and no partial byte is pending, so a partial
//! byte never has to cross a flush.

use std::io::Write;

use tracing::{debug, trace};

use crate::bitbuf::BitBuffer;
use crate::code::Code;
use crate::codebook::Codebook;
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::packed::{PayloadHeader, HEADER_SIZE};

/// What an encode produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Header written before the payload
    pub header: PayloadHeader,
    /// Symbols encoded
    pub symbols: u64,
    /// Bytes written to the sink, header included
    pub bytes_written: u64,
    /// Intermediate flushes before the final one
    pub flushes: u64,
}

/// Packs symbols with a fixed codebook.
#[derive(Debug, Clone)]
pub struct Encoder<'a> {
    codebook: &'a Codebook,
    buffer_capacity: usize,
    flush_threshold: usize,
}

impl<'a> Encoder<'a> {
    /// # Errors
    /// Returns `Error::Config` if `config` does not validate.
    pub fn new(codebook: &'a Codebook, config: &CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            codebook,
            buffer_capacity: config.buffer_capacity,
            flush_threshold: config.flush_threshold,
        })
    }

    /// Write the header and payload for `symbols` to `sink`.
    ///
    /// # Errors
    /// - `Error::UnknownSymbol` if a symbol has no code; nothing is written
    /// - `Error::Io` if the sink fails
    pub fn encode_to<W: Write>(&self, symbols: &[u8], sink: &mut W) -> Result<EncodeSummary> {
        let total_bits = self.codebook.encoded_bit_len(symbols)?;
        let header = PayloadHeader::from_bit_len(total_bits);
        sink.write_all(&header.to_bytes())?;

        let mut lookup: [Option<Code>; 256] = [None; 256];
        for (symbol, code) in self.codebook.iter() {
            lookup[symbol as usize] = Some(code);
        }

        let mut buf = BitBuffer::with_capacity(self.buffer_capacity);
        let mut bytes_written = HEADER_SIZE as u64;
        let mut flushes = 0u64;

        for &symbol in symbols {
            let code = lookup[symbol as usize].ok_or(Error::UnknownSymbol { symbol })?;
            buf.append_code(&code);

            if buf.num_full_bytes() >= self.flush_threshold && !buf.has_partial_byte() {
                let bytes = buf.full_bytes();
                sink.write_all(&bytes)?;
                bytes_written += bytes.len() as u64;
                flushes += 1;
                trace!(bytes = bytes.len(), "flushed encoder buffer");
                buf.reset();
            }
        }

        // Final partial byte goes out zero-padded
        let tail = buf.to_padded_bytes();
        sink.write_all(&tail)?;
        bytes_written += tail.len() as u64;

        debug!(
            symbols = symbols.len(),
            bits = total_bits,
            bytes = bytes_written,
            "encoded payload"
        );
        Ok(EncodeSummary {
            header,
            symbols: symbols.len() as u64,
            bytes_written,
            flushes,
        })
    }

    /// Encode into a new header-prefixed byte vector.
    pub fn encode(&self, symbols: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_to(symbols, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FrequencyTable;

    /// a:5, b:2, c:1, d:1, giving a=1, b=00, c=010, d=011
    fn walkthrough_codebook() -> Codebook {
        let mut counts = [0u64; 256];
        counts[b'a' as usize] = 5;
        counts[b'b' as usize] = 2;
        counts[b'c' as usize] = 1;
        counts[b'd' as usize] = 1;
        Codebook::from_frequencies(&FrequencyTable::from_counts(counts)).unwrap()
    }

    fn default_encoder(codebook: &Codebook) -> Encoder<'_> {
        Encoder::new(codebook, &CodecConfig::default()).unwrap()
    }

    #[test]
    fn test_exact_bytes() {
        let book = walkthrough_codebook();
        let out = default_encoder(&book).encode(b"aaaaabbccd").unwrap();

        // 11111 0000 010010 011 -> 11111000 00100100 11000000
        let mut expected = vec![0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2];
        expected.extend_from_slice(&[0b11111000, 0b00100100, 0b11000000]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_summary() {
        let book = walkthrough_codebook();
        let mut out = Vec::new();
        let summary = default_encoder(&book)
            .encode_to(b"aaaaabbccd", &mut out)
            .unwrap();

        assert_eq!(summary.header.total_bits(), 18);
        assert_eq!(summary.symbols, 10);
        assert_eq!(summary.bytes_written, out.len() as u64);
        assert_eq!(summary.flushes, 0);
    }

    #[test]
    fn test_flushing_does_not_change_output() {
        // Equal weights: 'a' = 0, 'b' = 1, so every 8 symbols end on a byte boundary
        let data = b"ab".repeat(500);
        let book = Codebook::from_data(&data).unwrap();

        let small = CodecConfig {
            buffer_capacity: 4,
            flush_threshold: 2,
            ..CodecConfig::default()
        };
        let mut flushed = Vec::new();
        let summary = Encoder::new(&book, &small)
            .unwrap()
            .encode_to(&data, &mut flushed)
            .unwrap();

        assert!(summary.flushes > 0);
        assert_eq!(flushed, default_encoder(&book).encode(&data).unwrap());
    }

    #[test]
    fn test_empty_input() {
        let book = Codebook::empty();
        let out = default_encoder(&book).encode(b"").unwrap();
        assert_eq!(out, vec![0u8; HEADER_SIZE]);
    }

    #[test]
    fn test_unknown_symbol_writes_nothing() {
        let book = Codebook::from_data(b"abc").unwrap();
        let mut out = Vec::new();
        let result = default_encoder(&book).encode_to(b"abcabcxyz", &mut out);

        assert!(matches!(result, Err(Error::UnknownSymbol { symbol: b'x' })));
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_symbol_header() {
        let book = Codebook::from_data(b"q").unwrap();
        let out = default_encoder(&book).encode(&[b'q'; 13]).unwrap();
        let header = PayloadHeader::parse(&out).unwrap();
        assert_eq!(header.total_bits(), 13);
        assert_eq!(&out[HEADER_SIZE..], &[0, 0]);
    }

    #[test]
    fn test_invalid_config() {
        let book = Codebook::empty();
        let config = CodecConfig {
            flush_threshold: 0,
            ..CodecConfig::default()
        };
        assert!(matches!(
            Encoder::new(&book, &config),
            Err(Error::Config(_))
        ));
    }
}
