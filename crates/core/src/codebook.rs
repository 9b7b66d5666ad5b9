//! Symbol↔Code mapping derived from a code tree.
//!
//! A `Codebook` is immutable once built. The encoder reads it forward
//! (symbol → code) and the decoder reads the inverse (code → symbol).
//! Codebooks built from a tree are prefix-free by construction; codebooks
//! assembled from an external table go through `from_codes`, which checks.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::code::{Code, MAX_CODE_LEN};
use crate::error::{CodeTableError, Error, Result};
use crate::tree::{CodeTree, FrequencyTable};

/// Bijection between symbols and their prefix codes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Codebook {
    codes: BTreeMap<u8, Code>,
    symbols: HashMap<Code, u8>,
    max_code_len: usize,
}

impl Codebook {
    /// Codebook with no symbols; only valid for empty input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive the codebook from a built tree.
    pub fn from_tree(tree: &CodeTree) -> Result<Self> {
        let codes = tree.codes()?;
        let book = Self::assemble(codes);
        debug!(
            symbols = book.len(),
            max_code_len = book.max_code_len,
            "derived codebook"
        );
        Ok(book)
    }

    /// Build the tree for `freqs` and derive its codebook.
    ///
    /// # Errors
    /// Returns `Error::EmptyAlphabet` if every count is zero.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        Self::from_tree(&CodeTree::build(freqs)?)
    }

    /// Count `data` and derive its codebook.
    pub fn from_data(data: &[u8]) -> Result<Self> {
        Self::from_frequencies(&FrequencyTable::from_data(data))
    }

    /// Assemble a codebook from externally supplied pairs, checking that it
    /// is a bijection and prefix-free.
    ///
    /// # Errors
    /// - `CodeTableError::EmptyCode` for a zero-length code
    /// - `CodeTableError::DuplicateSymbol` if a symbol appears twice
    /// - `CodeTableError::NotPrefixFree` if one code is a prefix of (or equal to) another
    pub fn from_codes<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, Code)>,
    {
        let mut codes = BTreeMap::new();
        for (symbol, code) in pairs {
            if code.is_empty() {
                return Err(CodeTableError::EmptyCode { symbol }.into());
            }
            if codes.insert(symbol, code).is_some() {
                return Err(CodeTableError::DuplicateSymbol(symbol).into());
            }
        }

        // In lexicographic bit order a prefix sorts directly before its extensions
        let mut sorted: Vec<(u8, Code)> = codes.iter().map(|(&s, &c)| (s, c)).collect();
        sorted.sort_by_key(|(_, code)| (code.bits() << (MAX_CODE_LEN - code.len()), code.len()));
        for pair in sorted.windows(2) {
            let (first, a) = pair[0];
            let (second, b) = pair[1];
            if a.is_prefix_of(&b) {
                return Err(CodeTableError::NotPrefixFree {
                    first,
                    second,
                    prefix: a.to_string(),
                }
                .into());
            }
        }

        Ok(Self::assemble(codes))
    }

    fn assemble(codes: BTreeMap<u8, Code>) -> Self {
        let symbols = codes.iter().map(|(&s, &c)| (c, s)).collect();
        let max_code_len = codes.values().map(Code::len).max().unwrap_or(0);
        Self {
            codes,
            symbols,
            max_code_len,
        }
    }

    /// Code assigned to `symbol`.
    pub fn code(&self, symbol: u8) -> Option<Code> {
        self.codes.get(&symbol).copied()
    }

    /// Symbol whose code is exactly `code`.
    pub fn symbol(&self, code: &Code) -> Option<u8> {
        self.symbols.get(code).copied()
    }

    /// Length of the longest code (0 for an empty codebook).
    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes.iter().map(|(&s, &c)| (s, c))
    }

    /// Whether no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        self.codes.values().all(|a| {
            self.codes
                .values()
                .filter(|b| *b != a)
                .all(|b| !a.is_prefix_of(b))
        })
    }

    /// Exact number of bits `data` encodes to.
    ///
    /// # Errors
    /// Returns `Error::UnknownSymbol` for the first byte without a code.
    pub fn encoded_bit_len(&self, data: &[u8]) -> Result<u64> {
        let mut lens = [0u64; 256];
        for (symbol, code) in self.iter() {
            lens[symbol as usize] = code.len() as u64;
        }

        let mut total = 0u64;
        for &symbol in data {
            match lens[symbol as usize] {
                0 => return Err(Error::UnknownSymbol { symbol }),
                len => total += len,
            }
        }
        Ok(total)
    }
}
