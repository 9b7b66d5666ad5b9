//! Configuration for the huffpack application.
//!
//! Parses command-line arguments and resolves every path the run will touch,
//! so `--print-config` shows exactly which files are read and written.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use huffpack_core::config::CodecConfig;
use huffpack_core::table::{TableFormat, DEFAULT_DELIMITER, DEFAULT_TERMINATOR};
use tracing::Level;

/// Suffix appended to the input path to name the compressed file.
pub const COMPRESSED_SUFFIX: &str = "--compressed";

/// Suffix appended to name a restored file.
pub const DECOMPRESSED_SUFFIX: &str = "--decompressed";

/// Code table file name, placed beside the compressed file.
pub const DEFAULT_TABLE_FILE: &str = "encoding-file.txt";

#[derive(Parser, Debug)]
#[command(name = "huffpack")]
#[command(version)]
#[command(about = "Compress files with a per-file Huffman code table", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Print resolved configuration
    #[arg(long, global = true)]
    pub print_config: bool,

    /// Don't print metrics summary
    #[arg(long, global = true)]
    pub no_metrics: bool,

    /// Also write metrics as key=value lines to this file
    #[arg(long, global = true)]
    pub metrics_file: Option<PathBuf>,

    /// Token between a symbol and its code in the table file
    #[arg(long, global = true, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,

    /// Token ending each table record
    #[arg(long, global = true, default_value = DEFAULT_TERMINATOR)]
    pub terminator: String,

    /// Encoder buffer capacity in bytes
    #[arg(long, global = true, default_value_t = CodecConfig::DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,

    /// Full bytes buffered before each flush
    #[arg(long, global = true, default_value_t = CodecConfig::DEFAULT_FLUSH_THRESHOLD)]
    pub flush_threshold: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write <PATH>--compressed and its code table
    Compress {
        path: PathBuf,

        /// Compressed output (default: <PATH>--compressed)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Code table output (default: encoding-file.txt beside the output)
        #[arg(long)]
        table: Option<PathBuf>,
    },

    /// Restore a compressed file using its code table
    Decompress {
        path: PathBuf,

        table: PathBuf,

        /// Restored output (default: <PATH minus --compressed>--decompressed)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate a sample file with mixed compressibility
    Sample {
        path: PathBuf,

        /// Random seed for determinism
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Size in bytes
        #[arg(long, default_value = "65536")]
        size: usize,
    },
}

/// What a run does, with every path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Compress {
        input: PathBuf,
        output: PathBuf,
        table: PathBuf,
    },
    Decompress {
        input: PathBuf,
        table: PathBuf,
        output: PathBuf,
    },
    Sample {
        output: PathBuf,
        seed: u64,
        size: usize,
    },
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    /// Buffer sizes and table separators
    pub codec: CodecConfig,

    pub log_level: Level,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,

    /// Where to export metrics text, if anywhere
    pub metrics_file: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from the process arguments.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Resolve defaults from parsed arguments.
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let log_level = parse_level(&args.log_level)?;

        let codec = CodecConfig {
            buffer_capacity: args.buffer_capacity,
            flush_threshold: args.flush_threshold,
            table: TableFormat::new(&args.delimiter, &args.terminator)
                .context("invalid table format")?,
            ..CodecConfig::default()
        };
        codec.validate().context("invalid codec settings")?;

        let mode = match args.command {
            Command::Compress { path, out, table } => {
                let output = out.unwrap_or_else(|| with_suffix(&path, COMPRESSED_SUFFIX));
                let table = table.unwrap_or_else(|| sibling(&output, DEFAULT_TABLE_FILE));
                Mode::Compress {
                    input: path,
                    output,
                    table,
                }
            }
            Command::Decompress { path, table, out } => {
                let output = out.unwrap_or_else(|| decompressed_path(&path));
                Mode::Decompress {
                    input: path,
                    table,
                    output,
                }
            }
            Command::Sample { path, seed, size } => Mode::Sample {
                output: path,
                seed,
                size,
            },
        };

        Ok(Self {
            mode,
            codec,
            log_level,
            print_config: args.print_config,
            print_metrics: !args.no_metrics,
            metrics_file: args.metrics_file,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.mode {
            Mode::Compress {
                input,
                output,
                table,
            } => {
                println!("Mode:        compress");
                println!("Input file:  {}", input.display());
                println!("Output file: {}", output.display());
                println!("Table file:  {}", table.display());
            }
            Mode::Decompress {
                input,
                table,
                output,
            } => {
                println!("Mode:        decompress");
                println!("Input file:  {}", input.display());
                println!("Table file:  {}", table.display());
                println!("Output file: {}", output.display());
            }
            Mode::Sample { output, seed, size } => {
                println!("Mode:        sample");
                println!("Output file: {}", output.display());
                println!("Seed: {seed}");
                println!("Size: {size} bytes");
            }
        }
        println!();
        println!("=== Codec ===");
        println!("Buffer capacity: {} bytes", self.codec.buffer_capacity);
        println!("Flush threshold: {} bytes", self.codec.flush_threshold);
        println!("Read chunk: {} bytes", self.codec.read_chunk_bytes);
        println!(
            "Table separators: {:?} / {:?}",
            String::from_utf8_lossy(self.codec.table.delimiter()),
            String::from_utf8_lossy(self.codec.table.terminator())
        );
        println!("Log level: {}", self.log_level);
        if let Some(path) = &self.metrics_file {
            println!("Metrics file: {}", path.display());
        }
        println!();
    }
}

fn parse_level(level: &str) -> anyhow::Result<Level> {
    Ok(match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => bail!("unknown log level: {other}"),
    })
}

/// `path` with `suffix` appended to its final component.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn decompressed_path(compressed: &Path) -> PathBuf {
    with_suffix(strip_compressed_suffix(compressed), DECOMPRESSED_SUFFIX)
}

/// `path` without a trailing `--compressed`, compared byte for byte.
#[cfg(unix)]
fn strip_compressed_suffix(path: &Path) -> &Path {
    use std::os::unix::ffi::OsStrExt;

    match path.as_os_str().as_bytes().strip_suffix(COMPRESSED_SUFFIX.as_bytes()) {
        Some(base) => Path::new(OsStr::from_bytes(base)),
        None => path,
    }
}

/// Non-Unicode names keep their full name.
#[cfg(not(unix))]
fn strip_compressed_suffix(path: &Path) -> &Path {
    path.to_str()
        .and_then(|text| text.strip_suffix(COMPRESSED_SUFFIX))
        .map(|base| Path::new(OsStr::new(base)))
        .unwrap_or(path)
}
