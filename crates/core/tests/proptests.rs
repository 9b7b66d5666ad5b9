//! Property-based tests for the huffpack codec.
//!
//! These tests verify properties that must hold for every input:
//! - Compress then decompress restores the input exactly
//! - Derived codebooks are prefix-free and bijective
//! - A bit buffer holding K bits has exactly K / 8 full bytes
//! - Decoding in arbitrary chunks matches a single pass
//! - Table text round-trips any codebook

use proptest::prelude::*;

use huffpack_core::{
    bitbuf::BitBuffer,
    codebook::Codebook,
    decoder::Decoder,
    packed::{compress, decompress, PayloadHeader, HEADER_SIZE},
    table::{encode_table, parse_table, TableFormat},
};

/// Input bytes drawn from a small alphabet, so symbols repeat.
fn skewed_bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![4 => Just(b'e'), 2 => Just(b't'), 1 => any::<u8>()], 0..2000)
}

/// Runs of (value, bit count) to append.
fn bit_runs_strategy() -> impl Strategy<Value = Vec<(u128, usize)>> {
    prop::collection::vec((any::<u128>(), 0usize..=128), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Property: decompress(compress(x)) == x.
    #[test]
    fn prop_round_trip(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let compressed = compress(&data).unwrap();
        prop_assert_eq!(decompress(&compressed.packed, &compressed.codebook).unwrap(), data);
    }

    /// Property: round trip also holds for heavily skewed input.
    #[test]
    fn prop_round_trip_skewed(data in skewed_bytes_strategy()) {
        let compressed = compress(&data).unwrap();
        prop_assert_eq!(decompress(&compressed.packed, &compressed.codebook).unwrap(), data);
    }

    /// Property: no code is a prefix of another, and the inverse map agrees.
    #[test]
    fn prop_codebook_prefix_free(data in prop::collection::vec(any::<u8>(), 1..2048)) {
        let codebook = Codebook::from_data(&data).unwrap();
        prop_assert!(codebook.is_prefix_free());
        for (symbol, code) in codebook.iter() {
            prop_assert_eq!(codebook.symbol(&code), Some(symbol));
        }
        for &byte in &data {
            prop_assert!(codebook.code(byte).is_some());
        }
    }

    /// Property: the header records exactly the sum of code lengths.
    #[test]
    fn prop_header_bit_count(data in skewed_bytes_strategy()) {
        let compressed = compress(&data).unwrap();
        let header = PayloadHeader::parse(&compressed.packed).unwrap();
        let expected: u64 = data
            .iter()
            .map(|&b| compressed.codebook.code(b).unwrap().len() as u64)
            .sum();
        prop_assert_eq!(header.total_bits(), expected);
        prop_assert_eq!(
            compressed.packed.len() as u64,
            HEADER_SIZE as u64 + header.payload_len()
        );
    }

    /// Property: after appending K bits there are K / 8 full bytes and K % 8 partial bits.
    #[test]
    fn prop_bitbuf_counts(runs in bit_runs_strategy()) {
        let mut buf = BitBuffer::with_capacity(1);
        let mut total = 0usize;
        for &(value, count) in &runs {
            buf.append_bits(value, count).unwrap();
            total += count;
        }
        prop_assert_eq!(buf.num_bits(), total);
        prop_assert_eq!(buf.num_full_bytes(), total / 8);
        prop_assert_eq!(buf.partial_byte_bit_count(), total % 8);
        prop_assert_eq!(buf.to_padded_bytes().len(), total.div_ceil(8));
        prop_assert!(buf.capacity() > buf.num_full_bytes());
    }

    /// Property: appending raw bytes at any offset preserves every bit.
    #[test]
    fn prop_bitbuf_bytes_at_offset(
        prefix in 0usize..8,
        bytes in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut buf = BitBuffer::new();
        buf.append_bits(0, prefix).unwrap();
        buf.append_bytes(&bytes);

        let mut expected = "0".repeat(prefix);
        for b in &bytes {
            expected.push_str(&format!("{b:08b}"));
        }
        prop_assert_eq!(buf.bit_string(), expected);
    }

    /// Property: dropping the first n bits leaves exactly the rest.
    #[test]
    fn prop_bitbuf_discard_front(
        bits in "[01]{0,200}",
        count in 0usize..220,
    ) {
        let mut buf = BitBuffer::from_bit_str(&bits).unwrap();
        buf.discard_front(count);
        let expected = bits.get(count..).unwrap_or("");
        prop_assert_eq!(buf.bit_string(), expected);
    }

    /// Property: any chunking of the payload decodes identically.
    #[test]
    fn prop_chunked_decode(
        data in skewed_bytes_strategy(),
        chunk in 1usize..32,
    ) {
        let compressed = compress(&data).unwrap();
        let header = PayloadHeader::parse(&compressed.packed).unwrap();
        let payload = &compressed.packed[HEADER_SIZE..];

        let mut decoder = Decoder::new(&compressed.codebook, header.total_bits()).unwrap();
        let mut out = Vec::new();
        for piece in payload.chunks(chunk) {
            decoder.feed(piece, &mut out).unwrap();
        }
        decoder.finish().unwrap();
        prop_assert_eq!(out, data);
    }

    /// Property: the table text parses back to the same codebook.
    #[test]
    fn prop_table_round_trip(data in prop::collection::vec(any::<u8>(), 1..1024)) {
        let codebook = Codebook::from_data(&data).unwrap();
        let format = TableFormat::default();
        let text = encode_table(&codebook, &format);
        prop_assert_eq!(parse_table(&text, &format).unwrap(), codebook);
    }
}
