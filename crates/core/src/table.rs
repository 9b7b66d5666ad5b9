//! Code table interchange format.
//!
//! One record per symbol:
//!
//! ```text
//! <symbol-byte><DELIMITER><code-bits><TERMINATOR>
//! ```
//!
//! The symbol field is always exactly one raw byte, whatever its value
//! (including line feed and bytes that also occur in the delimiter or the
//! terminator). The code field holds only '0'/'1' characters and the
//! terminator may not begin with either, so the reader never has to guess
//! where a field ends. Records are written in ascending symbol order; readers
//! do not depend on it.
//!
//! # Example
//! ```
//! use huffpack_core::codebook::Codebook;
//! use huffpack_core::table::{encode_table, parse_table, TableFormat};
//!
//! let book = Codebook::from_data(b"aab").unwrap();
//! let format = TableFormat::default();
//!
//! let text = encode_table(&book, &format);
//! assert_eq!(text, b"a:1\nb:0\n");
//! assert_eq!(parse_table(&text, &format).unwrap(), book);
//! ```

use std::io::{Read, Write};

use crate::code::{Code, MAX_CODE_LEN};
use crate::codebook::Codebook;
use crate::error::{CodeTableError, Error, Result};

/// Default token between the symbol byte and its code.
pub const DEFAULT_DELIMITER: &str = ":";

/// Default token ending a record.
pub const DEFAULT_TERMINATOR: &str = "\n";

/// Separator tokens for the table format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFormat {
    delimiter: Vec<u8>,
    terminator: Vec<u8>,
}

impl TableFormat {
    /// # Errors
    /// Returns `CodeTableError::InvalidFormat` if either token is empty or the
    /// terminator begins with '0' or '1'.
    pub fn new(delimiter: &str, terminator: &str) -> Result<Self> {
        if delimiter.is_empty() {
            return Err(CodeTableError::InvalidFormat("delimiter is empty".into()).into());
        }
        if terminator.is_empty() {
            return Err(CodeTableError::InvalidFormat("terminator is empty".into()).into());
        }
        if terminator.starts_with(|c: char| c == '0' || c == '1') {
            return Err(CodeTableError::InvalidFormat(format!(
                "terminator {terminator:?} begins with a binary digit"
            ))
            .into());
        }
        Ok(Self {
            delimiter: delimiter.as_bytes().to_vec(),
            terminator: terminator.as_bytes().to_vec(),
        })
    }

    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    pub fn terminator(&self) -> &[u8] {
        &self.terminator
    }
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.as_bytes().to_vec(),
            terminator: DEFAULT_TERMINATOR.as_bytes().to_vec(),
        }
    }
}

/// Serialize `codebook` to table bytes.
pub fn encode_table(codebook: &Codebook, format: &TableFormat) -> Vec<u8> {
    let mut out = Vec::new();
    for (symbol, code) in codebook.iter() {
        out.push(symbol);
        out.extend_from_slice(&format.delimiter);
        out.extend_from_slice(code.to_string().as_bytes());
        out.extend_from_slice(&format.terminator);
    }
    out
}

/// Write `codebook` in table format.
pub fn write_table<W: Write>(writer: &mut W, codebook: &Codebook, format: &TableFormat) -> Result<()> {
    writer.write_all(&encode_table(codebook, format))?;
    Ok(())
}

/// Read a whole table from `reader`.
pub fn read_table<R: Read>(reader: &mut R, format: &TableFormat) -> Result<Codebook> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_table(&bytes, format)
}

/// Parse table bytes into a validated codebook.
///
/// # Errors
/// Any malformed record, duplicate symbol, over-long code, or non-prefix-free
/// code set is reported as `Error::CorruptCodeTable`.
pub fn parse_table(bytes: &[u8], format: &TableFormat) -> Result<Codebook> {
    let mut pairs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let symbol = bytes[pos];
        pos += 1;

        pos = expect_token(bytes, pos, &format.delimiter, |offset| {
            CodeTableError::MissingDelimiter { offset }
        })?;

        let start = pos;
        while pos < bytes.len() && matches!(bytes[pos], b'0' | b'1') {
            pos += 1;
        }
        let code = parse_code(symbol, &bytes[start..pos])?;

        pos = expect_token(bytes, pos, &format.terminator, |offset| {
            CodeTableError::MissingTerminator { offset }
        })?;

        pairs.push((symbol, code));
    }

    Codebook::from_codes(pairs)
}

/// Require `token` at `pos`; return the position after it.
fn expect_token(
    bytes: &[u8],
    pos: usize,
    token: &[u8],
    mismatch: impl FnOnce(usize) -> CodeTableError,
) -> Result<usize> {
    let rest = &bytes[pos.min(bytes.len())..];
    if rest.starts_with(token) {
        return Ok(pos + token.len());
    }
    if rest.len() < token.len() && token.starts_with(rest) {
        return Err(CodeTableError::UnexpectedEnd {
            offset: bytes.len(),
        }
        .into());
    }
    Err(Error::from(mismatch(pos)))
}

/// Parse a run of '0'/'1' bytes.
fn parse_code(symbol: u8, digits: &[u8]) -> Result<Code> {
    if digits.is_empty() {
        return Err(CodeTableError::EmptyCode { symbol }.into());
    }
    let too_long = CodeTableError::CodeTooLong {
        symbol,
        length: digits.len(),
        max: MAX_CODE_LEN,
    };
    if digits.len() > MAX_CODE_LEN {
        return Err(too_long.into());
    }
    let value = digits
        .iter()
        .fold(0u128, |acc, &d| (acc << 1) | u128::from(d == b'1'));
    Code::from_bits(value, digits.len()).ok_or_else(|| too_long.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(bits: &str) -> Code {
        bits.parse().unwrap()
    }

    fn parse_err(bytes: &[u8]) -> CodeTableError {
        match parse_table(bytes, &TableFormat::default()) {
            Err(Error::CorruptCodeTable(e)) => e,
            other => panic!("expected corrupt table, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_all_symbols() {
        let data: Vec<u8> = (0..=255u8).flat_map(|b| vec![b; b as usize % 7 + 1]).collect();
        let book = Codebook::from_data(&data).unwrap();
        let format = TableFormat::default();

        let text = encode_table(&book, &format);
        assert_eq!(parse_table(&text, &format).unwrap(), book);
    }

    #[test]
    fn test_line_feed_symbol_written_literally() {
        let book = Codebook::from_codes([(b'\n', code("0")), (b'x', code("1"))]).unwrap();
        let text = encode_table(&book, &TableFormat::default());
        assert_eq!(text, b"\n:0\nx:1\n");
        assert_eq!(parse_table(&text, &TableFormat::default()).unwrap(), book);
    }

    #[test]
    fn test_symbols_that_look_like_separators() {
        let book = Codebook::from_codes([
            (b':', code("00")),
            (b'0', code("01")),
            (b'1', code("10")),
            (b'\n', code("11")),
        ])
        .unwrap();
        let text = encode_table(&book, &TableFormat::default());
        assert_eq!(parse_table(&text, &TableFormat::default()).unwrap(), book);
    }

    #[test]
    fn test_multi_byte_tokens() {
        let format = TableFormat::new(":::DELIMITER:::", "::::::::::\n").unwrap();
        let book = Codebook::from_data(b"mississippi").unwrap();

        let mut out = Vec::new();
        write_table(&mut out, &book, &format).unwrap();
        let parsed = read_table(&mut out.as_slice(), &format).unwrap();
        assert_eq!(parsed, book);
    }

    #[test]
    fn test_empty_table() {
        let book = parse_table(b"", &TableFormat::default()).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_missing_delimiter() {
        assert_eq!(
            parse_err(b"a-01\n"),
            CodeTableError::MissingDelimiter { offset: 1 }
        );
    }

    #[test]
    fn test_missing_terminator() {
        assert_eq!(
            parse_err(b"a:01;b:1\n"),
            CodeTableError::MissingTerminator { offset: 4 }
        );
    }

    #[test]
    fn test_truncated_record() {
        assert_eq!(parse_err(b"a:0\nb"), CodeTableError::UnexpectedEnd { offset: 5 });
        assert_eq!(parse_err(b"a:01"), CodeTableError::UnexpectedEnd { offset: 4 });
    }

    #[test]
    fn test_empty_code() {
        assert_eq!(parse_err(b"a:\n"), CodeTableError::EmptyCode { symbol: b'a' });
    }

    #[test]
    fn test_code_too_long() {
        let mut text = b"a:".to_vec();
        text.extend(std::iter::repeat(b'1').take(MAX_CODE_LEN + 1));
        text.push(b'\n');
        assert!(matches!(
            parse_err(&text),
            CodeTableError::CodeTooLong { symbol: b'a', .. }
        ));
    }

    #[test]
    fn test_not_prefix_free() {
        assert!(matches!(
            parse_err(b"a:0\nb:01\n"),
            CodeTableError::NotPrefixFree { .. }
        ));
    }

    #[test]
    fn test_invalid_format() {
        assert!(TableFormat::new("", "\n").is_err());
        assert!(TableFormat::new(":", "").is_err());
        assert!(TableFormat::new(":", "1\n").is_err());
        assert!(TableFormat::new("0", ";").is_ok());
    }
}
