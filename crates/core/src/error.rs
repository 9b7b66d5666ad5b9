//! Error types for huffpack.
//!
//! Every failure is reported as a structured error at the component boundary.
//! Nothing in the codec retries: bit-level corruption cannot be repaired
//! without redundancy, and the packed format carries none.

use thiserror::Error;

/// Top-level error type for all codec operations.
///
/// Each variant corresponds to a specific failure domain:
/// - Encoding: a symbol has no code in the mapping
/// - Decoding: the stream ends early, or the bits do not fit the code table
/// - Tree construction: no symbols to build a code from
/// - Bit buffer, header, and table parsing failures
/// - I/O: reading or writing the surrounding streams
#[derive(Debug, Error)]
pub enum Error {
    /// Encode-time: the symbol is absent from the code mapping
    #[error("symbol {symbol:#04x} has no code in the code table")]
    UnknownSymbol { symbol: u8 },

    /// Decode-time: input ended before the recorded bit count was satisfied
    #[error("stream truncated: header records {expected_bits} bits, only {available_bits} available")]
    TruncatedStream {
        expected_bits: u64,
        available_bits: u64,
    },

    /// The code table is malformed, or the data is not a valid encoding under it
    #[error("corrupt code table: {0}")]
    CorruptCodeTable(#[from] CodeTableError),

    /// Zero distinct symbols: no tree can be built
    #[error("empty alphabet: cannot build a code from zero symbols")]
    EmptyAlphabet,

    /// Bit buffer operation rejected its input
    #[error("bit buffer error: {0}")]
    BitBuffer(#[from] BitBufferError),

    /// Packed payload header is malformed
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// Stream I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Bit buffer errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitBufferError {
    /// More bits requested in a single append than a code can hold
    #[error("invalid bit count {count}: at most {max} bits per append")]
    InvalidBitCount { count: usize, max: usize },

    /// Textual bit string contained something other than '0' or '1'
    #[error("invalid character {found:?} at index {index} in bit string")]
    InvalidBitChar { index: usize, found: char },
}

/// Code table errors, from parsing the interchange format or from decoding
/// data that does not match the table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeTableError {
    /// Table text ended in the middle of a record
    #[error("unexpected end of table at byte {offset}")]
    UnexpectedEnd { offset: usize },

    /// Record is missing the delimiter after its symbol byte
    #[error("missing delimiter after symbol at byte {offset}")]
    MissingDelimiter { offset: usize },

    /// Record is missing its terminator after the code
    #[error("missing record terminator at byte {offset}")]
    MissingTerminator { offset: usize },

    /// Record has no code bits
    #[error("symbol {symbol:#04x} has an empty code")]
    EmptyCode { symbol: u8 },

    /// Code is longer than the supported maximum
    #[error("code for symbol {symbol:#04x} is {length} bits, maximum is {max}")]
    CodeTooLong {
        symbol: u8,
        length: usize,
        max: usize,
    },

    /// Same symbol appears in two records
    #[error("symbol {0:#04x} appears more than once")]
    DuplicateSymbol(u8),

    /// Two symbols share a code, or one code is a prefix of another
    #[error("code {prefix} of symbol {first:#04x} is a prefix of the code of symbol {second:#04x}")]
    NotPrefixFree { first: u8, second: u8, prefix: String },

    /// Decoding: the bit window outgrew every code without matching
    #[error("no code matches the {window} bits at bit {position} (longest code is {max_code_len} bits)")]
    UnmatchedBits {
        position: u64,
        window: usize,
        max_code_len: usize,
    },

    /// Table format constants are unusable
    #[error("invalid table format: {0}")]
    InvalidFormat(String),
}

/// Packed payload header errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Not enough bytes for a complete header
    #[error("header too short: need {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    /// Trailing bit count outside 0..=7
    #[error("trailing bit count {0} is out of range 0..=7")]
    InvalidTrailingBits(u32),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
