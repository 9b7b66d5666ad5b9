//! Packed payload → symbol stream.
//!
//! The decoder is incremental: payload bytes arrive in arbitrary chunks via
//! `feed`, and bits are matched against the codebook as soon as they are
//! available. Bits that end a chunk in the middle of a code stay in the
//! input buffer until the next chunk completes them. Decoding stops at the
//! exact bit count from the header, so pad bits and anything after the
//! payload are never interpreted.

use tracing::{debug, trace};

use crate::bitbuf::BitBuffer;
use crate::code::Code;
use crate::codebook::Codebook;
use crate::error::{CodeTableError, Error, Result};

/// Incremental prefix-code decoder for one payload.
#[derive(Debug)]
pub struct Decoder<'a> {
    codebook: &'a Codebook,
    total_bits: u64,
    consumed: u64,
    input: BitBuffer,
}

impl<'a> Decoder<'a> {
    /// Decoder for a payload of exactly `total_bits` bits.
    ///
    /// # Errors
    /// Returns `Error::EmptyAlphabet` if the codebook is empty but bits are expected.
    pub fn new(codebook: &'a Codebook, total_bits: u64) -> Result<Self> {
        if codebook.is_empty() && total_bits > 0 {
            return Err(Error::EmptyAlphabet);
        }
        Ok(Self {
            codebook,
            total_bits,
            consumed: 0,
            input: BitBuffer::new(),
        })
    }

    /// Append `chunk` and decode every complete code now available, pushing
    /// symbols onto `out`. Returns the number of symbols produced.
    ///
    /// # Errors
    /// Returns `CodeTableError::UnmatchedBits` when `max_code_len` bits match
    /// no code; the payload does not belong to this codebook.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<u8>) -> Result<usize> {
        if self.is_complete() {
            return Ok(0);
        }
        self.input.append_bytes(chunk);

        let wanted = self.total_bits - self.consumed;
        let limit = (self.input.num_bits() as u64).min(wanted) as usize;
        let max_len = self.codebook.max_code_len();

        let mut matched = 0usize;
        let mut window = Code::EMPTY;
        let mut produced = 0usize;

        for index in 0..limit {
            let bit = self.input.bit(index).unwrap_or(false);
            window = match window.push(bit) {
                Some(code) => code,
                None => return Err(self.unmatched(matched, window.len())),
            };

            if let Some(symbol) = self.codebook.symbol(&window) {
                out.push(symbol);
                produced += 1;
                matched = index + 1;
                window = Code::EMPTY;
            } else if window.len() >= max_len {
                return Err(self.unmatched(matched, window.len()));
            }
        }

        self.consumed += matched as u64;
        self.input.discard_front(matched);
        trace!(
            chunk = chunk.len(),
            symbols = produced,
            pending_bits = self.input.num_bits(),
            "decoded chunk"
        );
        Ok(produced)
    }

    fn unmatched(&self, matched: usize, window: usize) -> Error {
        CodeTableError::UnmatchedBits {
            position: self.consumed + matched as u64,
            window,
            max_code_len: self.codebook.max_code_len(),
        }
        .into()
    }

    /// Whether every bit named by the header has been decoded.
    pub fn is_complete(&self) -> bool {
        self.consumed == self.total_bits
    }

    /// Bits decoded so far.
    pub fn bits_decoded(&self) -> u64 {
        self.consumed
    }

    /// Bits the payload holds in total.
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Finish decoding once the input is exhausted.
    ///
    /// # Errors
    /// - `Error::TruncatedStream` if the input ended before `total_bits`
    /// - `CodeTableError::UnmatchedBits` if all bits arrived but the last ones
    ///   do not complete a code
    pub fn finish(self) -> Result<()> {
        if self.is_complete() {
            debug!(bits = self.total_bits, "decoded payload");
            return Ok(());
        }

        let available = self.consumed + self.input.num_bits() as u64;
        if available >= self.total_bits {
            let window = (self.total_bits - self.consumed) as usize;
            return Err(self.unmatched(0, window));
        }
        Err(Error::TruncatedStream {
            expected_bits: self.total_bits,
            available_bits: available,
        })
    }
}

/// Decode a whole payload (no header) held in memory.
pub fn decode(payload: &[u8], total_bits: u64, codebook: &Codebook) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(codebook, total_bits)?;
    let mut out = Vec::new();
    decoder.feed(payload, &mut out)?;
    decoder.finish()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FrequencyTable;

    fn code(bits: &str) -> Code {
        bits.parse().unwrap()
    }

    /// a:5, b:2, c:1, d:1, giving a=1, b=00, c=010, d=011
    fn walkthrough_codebook() -> Codebook {
        let mut counts = [0u64; 256];
        counts[b'a' as usize] = 5;
        counts[b'b' as usize] = 2;
        counts[b'c' as usize] = 1;
        counts[b'd' as usize] = 1;
        Codebook::from_frequencies(&FrequencyTable::from_counts(counts)).unwrap()
    }

    fn abc_book() -> Codebook {
        Codebook::from_codes([(b'a', code("0")), (b'b', code("10")), (b'c', code("11"))]).unwrap()
    }

    #[test]
    fn test_decode_known_payload() {
        let book = walkthrough_codebook();
        let payload = [0b11111000, 0b00100100, 0b11000000];
        assert_eq!(decode(&payload, 18, &book).unwrap(), b"aaaaabbccd");
    }

    #[test]
    fn test_padding_ignored() {
        let book = abc_book();
        // "b a c" = 10 0 11, padded with ones that would otherwise decode as 'c'
        let payload = [0b10011111];
        assert_eq!(decode(&payload, 5, &book).unwrap(), b"bac");
    }

    #[test]
    fn test_byte_by_byte_matches_whole() {
        let data = b"abracadabra, said the magician, abracadabra!";
        let book = Codebook::from_data(data).unwrap();
        let packed = crate::encoder::Encoder::new(&book, &Default::default())
            .unwrap()
            .encode(data)
            .unwrap();
        let header = crate::packed::PayloadHeader::parse(&packed).unwrap();
        let payload = &packed[crate::packed::HEADER_SIZE..];

        let mut decoder = Decoder::new(&book, header.total_bits()).unwrap();
        let mut out = Vec::new();
        for byte in payload {
            decoder.feed(std::slice::from_ref(byte), &mut out).unwrap();
        }
        decoder.finish().unwrap();

        assert_eq!(out, data);
        assert_eq!(out, decode(payload, header.total_bits(), &book).unwrap());
    }

    #[test]
    fn test_code_spanning_chunks() {
        let book = abc_book();
        // "aaaaaaab c" = 0000000 1|0 11 -> 00000001 011....
        let mut decoder = Decoder::new(&book, 11).unwrap();
        let mut out = Vec::new();

        assert_eq!(decoder.feed(&[0b00000001], &mut out).unwrap(), 7);
        assert_eq!(decoder.bits_decoded(), 7);
        assert_eq!(decoder.feed(&[0b01100000], &mut out).unwrap(), 2);
        assert!(decoder.is_complete());
        decoder.finish().unwrap();
        assert_eq!(out, b"aaaaaaabc");
    }

    #[test]
    fn test_feed_after_complete() {
        let book = abc_book();
        let mut decoder = Decoder::new(&book, 1).unwrap();
        let mut out = Vec::new();
        decoder.feed(&[0x00], &mut out).unwrap();
        assert_eq!(decoder.feed(&[0x00], &mut out).unwrap(), 0);
        assert_eq!(out, b"a");
    }

    #[test]
    fn test_single_symbol_repeated() {
        let book = Codebook::from_data(b"z").unwrap();
        assert_eq!(decode(&[0, 0], 12, &book).unwrap(), vec![b'z'; 12]);
    }

    #[test]
    fn test_truncated() {
        let book = abc_book();
        let err = decode(&[0x00], 12, &book).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedStream {
                expected_bits: 12,
                available_bits: 8
            }
        ));
    }

    #[test]
    fn test_unmatched_bits() {
        // "1" alone only ever begins a two-bit code
        let book = Codebook::from_codes([(b'a', code("0")), (b'b', code("10"))]).unwrap();
        let err = decode(&[0b01100000], 3, &book).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptCodeTable(CodeTableError::UnmatchedBits {
                position: 1,
                window: 2,
                max_code_len: 2
            })
        ));
    }

    #[test]
    fn test_dangling_bits_at_end() {
        let book = abc_book();
        // "a" then a lone "1" that never completes
        let err = decode(&[0b01000000], 2, &book).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptCodeTable(CodeTableError::UnmatchedBits { position: 1, .. })
        ));
    }

    #[test]
    fn test_empty_codebook() {
        let book = Codebook::empty();
        assert!(decode(&[], 0, &book).unwrap().is_empty());
        assert!(matches!(
            Decoder::new(&book, 3),
            Err(Error::EmptyAlphabet)
        ));
    }
}
