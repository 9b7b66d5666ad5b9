//! Codec configuration.
//!
//! Defaults reproduce the buffering cadence the packed format was designed
//! around: a 150-byte working buffer flushed once it holds 100 full bytes and
//! no partial byte is pending.

use crate::error::{Error, Result};
use crate::table::TableFormat;

/// Tunables for encoding, decoding, and the table format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Initial encoder buffer capacity in bytes
    pub buffer_capacity: usize,

    /// Full bytes the encoder buffers before flushing to the sink
    pub flush_threshold: usize,

    /// Bytes read per step when decoding from a stream
    pub read_chunk_bytes: usize,

    /// Code table separators
    pub table: TableFormat,
}

impl CodecConfig {
    pub const DEFAULT_BUFFER_CAPACITY: usize = 150;
    pub const DEFAULT_FLUSH_THRESHOLD: usize = 100;
    pub const DEFAULT_READ_CHUNK_BYTES: usize = 64;

    /// Check that the settings are usable together.
    ///
    /// # Errors
    /// Returns `Error::Config` if a size is zero or the flush threshold does
    /// not fit inside the buffer.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(Error::Config("buffer_capacity must be positive".into()));
        }
        if self.flush_threshold == 0 {
            return Err(Error::Config("flush_threshold must be positive".into()));
        }
        if self.flush_threshold >= self.buffer_capacity {
            return Err(Error::Config(format!(
                "flush_threshold ({}) must be smaller than buffer_capacity ({})",
                self.flush_threshold, self.buffer_capacity
            )));
        }
        if self.read_chunk_bytes == 0 {
            return Err(Error::Config("read_chunk_bytes must be positive".into()));
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: Self::DEFAULT_BUFFER_CAPACITY,
            flush_threshold: Self::DEFAULT_FLUSH_THRESHOLD,
            read_chunk_bytes: Self::DEFAULT_READ_CHUNK_BYTES,
            table: TableFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        CodecConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_sizes() {
        let base = CodecConfig::default();

        let config = CodecConfig {
            buffer_capacity: 0,
            ..base.clone()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = CodecConfig {
            flush_threshold: 150,
            ..base.clone()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = CodecConfig {
            read_chunk_bytes: 0,
            ..base
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
