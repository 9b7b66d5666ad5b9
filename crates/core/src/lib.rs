//! huffpack-core: byte-oriented Huffman compression
//!
//! This library provides the pieces of a static Huffman codec:
//! - Counts symbol frequencies and builds an optimal prefix-code tree
//! - Packs codes MSB-first behind a header that records the exact bit length
//! - Decodes the payload incrementally, in chunks of any size
//! - Reads and writes the code table as a separate interchange file
//!
//! # Architecture
//!
//! - `bitbuf`: Growable MSB-first bit buffer
//! - `code`: Fixed-capacity bit string for a single code
//! - `tree`: Frequency counting and code-tree construction
//! - `codebook`: Symbol↔code bijection
//! - `encoder` / `decoder`: Payload packing and incremental unpacking
//! - `packed`: Header format and whole-buffer pipelines
//! - `table`: Code table serialization
//! - `config`: Buffer sizes and table separators
//! - `metrics`: Per-run counters
//!
//! # Example
//! ```
//! use huffpack_core::packed::{compress, decompress};
//!
//! let compressed = compress(b"abracadabra").unwrap();
//! let restored = decompress(&compressed.packed, &compressed.codebook).unwrap();
//! assert_eq!(restored, b"abracadabra");
//! ```
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Deterministic**: Identical input always yields identical codes and bytes
//! - **Exact**: Decoding stops at the recorded bit count, never at padding

pub mod bitbuf;
pub mod code;
pub mod codebook;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod packed;
pub mod table;
pub mod tree;

// Re-export commonly used types
pub use bitbuf::BitBuffer;
pub use code::Code;
pub use codebook::Codebook;
pub use config::CodecConfig;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use tree::{CodeTree, FrequencyTable};
