//! Sample file generation for `huffpack sample`.
//!
//! Generated data mixes sections whose byte distributions give Huffman
//! coding very different amounts to work with:
//! - Runs of a single byte (one-bit codes)
//! - English-like text with skewed letter frequencies
//! - Short repeating patterns over a handful of bytes
//! - Uniformly random bytes (close to 8 bits per symbol)
//!
//! The mix makes the effect of the codebook visible in the metrics.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::path::Path;

/// Section length upper bound.
const SECTION_BYTES: usize = 4096;

/// Rough English letter weights, most frequent first.
const TEXT_ALPHABET: &[u8] = b"  eeeeettttaaaooiinnsshhrrdlcumwfgypbvk.,\n";

/// Generate `size_bytes` of mixed-compressibility data, reproducible from `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = (size_bytes - data.len()).min(rng.gen_range(256..=SECTION_BYTES));

        match rng.gen_range(0..10u8) {
            // 20% runs
            0..=1 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(section));
            }

            // 40% skewed text
            2..=5 => {
                for _ in 0..section {
                    data.push(TEXT_ALPHABET[rng.gen_range(0..TEXT_ALPHABET.len())]);
                }
            }

            // 20% patterns
            6..=7 => {
                let pattern = generate_pattern(&mut rng);
                data.extend(pattern.iter().copied().cycle().take(section));
            }

            // 20% noise
            _ => {
                for _ in 0..section {
                    data.push(rng.gen());
                }
            }
        }
    }

    data
}

/// A short pattern drawn from a small random alphabet.
fn generate_pattern(rng: &mut ChaCha8Rng) -> Vec<u8> {
    let alphabet: Vec<u8> = (0..rng.gen_range(2..=6)).map(|_| rng.gen()).collect();
    let pattern_len = rng.gen_range(4..=32);
    (0..pattern_len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Write generated data to a file.
pub fn write_sample_file(path: &Path, seed: u64, size_bytes: usize) -> std::io::Result<()> {
    let data = generate_sample_data(seed, size_bytes);
    let mut file = std::fs::File::create(path)?;
    file.write_all(&data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sample_data() {
        let data = generate_sample_data(42, 1000);
        assert_eq!(data.len(), 1000);
    }

    #[test]
    fn test_determinism() {
        let data1 = generate_sample_data(12345, 5000);
        let data2 = generate_sample_data(12345, 5000);

        assert_eq!(data1, data2);
    }

    #[test]
    fn test_different_seeds() {
        let data1 = generate_sample_data(1, 1000);
        let data2 = generate_sample_data(2, 1000);

        assert_ne!(data1, data2);
    }

    #[test]
    fn test_various_sizes() {
        for size in [0, 1, 100, 1000, 10000, 100000] {
            let data = generate_sample_data(999, size);
            assert_eq!(data.len(), size);
        }
    }

    #[test]
    fn test_write_sample_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");

        write_sample_file(&path, 7, 2048).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), generate_sample_data(7, 2048));
    }
}
