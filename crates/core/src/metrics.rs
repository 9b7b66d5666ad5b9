//! Metrics for a single compress or decompress run.
//!
//! Single-threaded: the pipeline fills in the counters as each stage
//! finishes, then the CLI prints a summary or exports key=value text.

use std::time::{Duration, Instant};

use crate::codebook::Codebook;
use crate::encoder::EncodeSummary;

/// Which direction a run went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Compress,
    Decompress,
}

/// Counters and timing for one run.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub operation: Operation,

    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Sizes ===
    /// Uncompressed bytes (read when compressing, written when decompressing)
    pub input_bytes: u64,

    /// Packed bytes including the header
    pub output_bytes: u64,

    /// Serialized code table size
    pub table_bytes: u64,

    /// Exact payload length in bits
    pub payload_bits: u64,

    // === Codebook ===
    pub distinct_symbols: u64,
    pub max_code_len: u64,

    /// Intermediate encoder flushes
    pub flushes: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            output_bytes: 0,
            table_bytes: 0,
            payload_bits: 0,
            distinct_symbols: 0,
            max_code_len: 0,
            flushes: 0,
        }
    }

    /// Record the codebook shape.
    pub fn record_codebook(&mut self, codebook: &Codebook) {
        self.distinct_symbols = codebook.len() as u64;
        self.max_code_len = codebook.max_code_len() as u64;
    }

    /// Record what the encoder reported.
    pub fn record_encode(&mut self, summary: &EncodeSummary) {
        self.input_bytes = summary.symbols;
        self.output_bytes = summary.bytes_written;
        self.payload_bits = summary.header.total_bits();
        self.flushes = summary.flushes;
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Total duration (or elapsed so far if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Packed size over raw size, header included. 0.0 for empty input.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.output_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Average code length over the input.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.payload_bits as f64 / self.input_bytes as f64
        }
    }

    /// Uncompressed bytes per second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        let title = match self.operation {
            Operation::Compress => "Compression",
            Operation::Decompress => "Decompression",
        };

        println!("\n=== {title} Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("Raw:    {} bytes ({:.2} MiB)", self.input_bytes, self.input_bytes as f64 / 1024.0 / 1024.0);
        println!("Packed: {} bytes ({:.2} MiB)", self.output_bytes, self.output_bytes as f64 / 1024.0 / 1024.0);
        println!("Table:  {} bytes", self.table_bytes);
        println!("Ratio:  {:.1}%", self.compression_ratio() * 100.0);
        println!();

        println!("=== Codebook ===");
        println!("Distinct symbols: {}", self.distinct_symbols);
        println!("Longest code: {} bits", self.max_code_len);
        println!("Payload: {} bits ({:.3} bits/symbol)", self.payload_bits, self.bits_per_symbol());
        if self.operation == Operation::Compress {
            println!("Flushes: {}", self.flushes);
        }
        println!();

        println!("=== Performance ===");
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export metrics as key=value lines.
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             table_bytes={}\n\
             payload_bits={}\n\
             distinct_symbols={}\n\
             max_code_len={}\n\
             flushes={}\n\
             compression_ratio={:.4}\n\
             bits_per_symbol={:.4}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.table_bytes,
            self.payload_bits,
            self.distinct_symbols,
            self.max_code_len,
            self.flushes,
            self.compression_ratio(),
            self.bits_per_symbol(),
        )
    }
}
