//! Frequency counting and Huffman tree construction.
//!
//! The tree is built with a min-heap keyed on `(weight, order)`. Weight alone
//! does not decide which of several equal nodes pair up first, so every node
//! carries a secondary `order`: leaves use their symbol value, internal nodes
//! use `256 + creation index`. The result is identical on every run and
//! platform.
//!
//! # Example
//! ```
//! use huffpack_core::tree::{CodeTree, FrequencyTable};
//!
//! let mut counts = [0u64; 256];
//! counts[b'a' as usize] = 5;
//! counts[b'b' as usize] = 2;
//! counts[b'c' as usize] = 1;
//! counts[b'd' as usize] = 1;
//!
//! let tree = CodeTree::build(&FrequencyTable::from_counts(counts)).unwrap();
//! let codes = tree.codes().unwrap();
//!
//! assert_eq!(codes[&b'a'].to_string(), "1");
//! assert_eq!(codes[&b'b'].to_string(), "00");
//! assert_eq!(codes[&b'c'].to_string(), "010");
//! assert_eq!(codes[&b'd'].to_string(), "011");
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt::Write as _;

use tracing::debug;

use crate::code::{Code, MAX_CODE_LEN};
use crate::error::{CodeTableError, Error, Result};

/// Number of distinct byte values.
pub const ALPHABET_SIZE: usize = 256;

/// Occurrence count per symbol, built from a full pass over the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
        }
    }

    /// Count every byte of `data`.
    pub fn from_data(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.extend(data);
        table
    }

    pub fn from_counts(counts: [u64; ALPHABET_SIZE]) -> Self {
        Self { counts }
    }

    /// Add the bytes of `data` to the running counts.
    pub fn extend(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Symbols with a non-zero count and their counts, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Count divided by the total, for human inspection. Zero when empty.
    pub fn relative_frequency(&self, symbol: u8) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(symbol) as f64 / total as f64
        }
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A node of the code tree. Every internal node has exactly two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    /// Symbol of the leftmost leaf below this node.
    fn first_symbol(&self) -> u8 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { symbol, .. } => return *symbol,
                Node::Internal { left, .. } => node = left.as_ref(),
            }
        }
    }
}

/// Heap entry ordered by `(weight, order)` only.
struct Pending {
    weight: u64,
    order: u32,
    node: Node,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weight, self.order).cmp(&(other.weight, other.order))
    }
}

/// Binary prefix-code tree. Built once, immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTree {
    root: Node,
}

impl CodeTree {
    /// Build the tree for every symbol with a non-zero count.
    ///
    /// # Errors
    /// Returns `Error::EmptyAlphabet` if no symbol has a non-zero count.
    pub fn build(freqs: &FrequencyTable) -> Result<Self> {
        let mut heap: BinaryHeap<Reverse<Pending>> = freqs
            .iter()
            .map(|(symbol, weight)| {
                Reverse(Pending {
                    weight,
                    order: u32::from(symbol),
                    node: Node::Leaf { symbol, weight },
                })
            })
            .collect();

        let mut next_order = ALPHABET_SIZE as u32;
        let root = loop {
            let Reverse(first) = heap.pop().ok_or(Error::EmptyAlphabet)?;
            let Some(Reverse(second)) = heap.pop() else {
                break first.node;
            };

            // Lower entry becomes the left (0) branch
            let weight = first.weight.saturating_add(second.weight);
            heap.push(Reverse(Pending {
                weight,
                order: next_order,
                node: Node::Internal {
                    weight,
                    left: Box::new(first.node),
                    right: Box::new(second.node),
                },
            }));
            next_order += 1;
        };

        debug!(
            distinct = freqs.distinct(),
            total = freqs.total(),
            "built code tree"
        );
        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Derive each symbol's code as its root-to-leaf path (left = 0, right = 1).
    ///
    /// A tree that is a single leaf gives that symbol the one-bit code "0".
    ///
    /// # Errors
    /// Returns `CodeTableError::CodeTooLong` if a leaf is deeper than `MAX_CODE_LEN`.
    pub fn codes(&self) -> Result<BTreeMap<u8, Code>> {
        let mut codes = BTreeMap::new();

        if let Node::Leaf { symbol, .. } = self.root {
            codes.insert(symbol, Code::SINGLE_ZERO);
            return Ok(codes);
        }

        let mut stack = vec![(&self.root, Code::EMPTY)];
        while let Some((node, path)) = stack.pop() {
            match node {
                Node::Leaf { symbol, .. } => {
                    codes.insert(*symbol, path);
                }
                Node::Internal { left, right, .. } => {
                    let too_long = || CodeTableError::CodeTooLong {
                        symbol: node.first_symbol(),
                        length: path.len() + 1,
                        max: MAX_CODE_LEN,
                    };
                    stack.push((right.as_ref(), path.push(true).ok_or_else(too_long)?));
                    stack.push((left.as_ref(), path.push(false).ok_or_else(too_long)?));
                }
            }
        }
        Ok(codes)
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Internal { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }

    /// Indented text dump of the tree structure. Diagnostics only.
    pub fn render(&self) -> String {
        fn walk(out: &mut String, node: &Node, depth: usize, label: &str) {
            let indent = "  ".repeat(depth);
            match node {
                Node::Leaf { symbol, weight } => {
                    let _ = writeln!(
                        out,
                        "{indent}{label} leaf {:?} ({symbol}) [weight {weight}]",
                        *symbol as char
                    );
                }
                Node::Internal {
                    weight,
                    left,
                    right,
                } => {
                    let _ = writeln!(out, "{indent}{label} internal [weight {weight}]");
                    walk(out, left, depth + 1, "0");
                    walk(out, right, depth + 1, "1");
                }
            }
        }

        let mut out = String::new();
        walk(&mut out, &self.root, 0, "root");
        out
    }
}
