//! huffpack: per-file Huffman compression
//!
//! ## Usage
//!
//! ```bash
//! # Writes notes.txt--compressed and encoding-file.txt
//! huffpack compress notes.txt
//!
//! # Writes notes.txt--decompressed
//! huffpack decompress notes.txt--compressed encoding-file.txt
//!
//! # Deterministic test input
//! huffpack sample corpus.bin --seed 7 --size 1048576
//! ```

mod config;
mod input_gen;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use huffpack_core::config::CodecConfig;
use huffpack_core::encoder::Encoder;
use huffpack_core::metrics::{Metrics, Operation};
use huffpack_core::packed::{codebook_for, decompress_from};
use huffpack_core::table::{encode_table, read_table};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use config::{Config, Mode};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    if config.print_config {
        config.print();
    }

    let metrics = match &config.mode {
        Mode::Compress {
            input,
            output,
            table,
        } => Some(compress_file(input, output, table, &config.codec)?),
        Mode::Decompress {
            input,
            table,
            output,
        } => Some(decompress_file(input, table, output, &config.codec)?),
        Mode::Sample { output, seed, size } => {
            info!("Generating sample: {} ({} bytes, seed {})", output.display(), size, seed);
            input_gen::write_sample_file(output, *seed, *size)
                .with_context(|| format!("failed to write {}", output.display()))?;
            None
        }
    };

    if let Some(metrics) = metrics {
        if config.print_metrics {
            metrics.print_summary();
        }
        if let Some(path) = &config.metrics_file {
            write_metrics(&metrics, path)?;
        }
    }
    Ok(())
}

fn write_metrics(metrics: &Metrics, path: &Path) -> anyhow::Result<()> {
    fs::write(path, metrics.export_text())
        .with_context(|| format!("failed to write metrics {}", path.display()))?;
    info!("Wrote metrics to {}", path.display());
    Ok(())
}

fn compress_file(
    input: &Path,
    output: &Path,
    table: &Path,
    codec: &CodecConfig,
) -> anyhow::Result<Metrics> {
    info!("Compressing: {}", input.display());
    let mut metrics = Metrics::new(Operation::Compress);

    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let codebook = codebook_for(&data)?;

    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let summary = Encoder::new(&codebook, codec)?
        .encode_to(&data, &mut writer)
        .with_context(|| format!("failed to write {}", output.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", output.display()))?;

    let table_bytes = encode_table(&codebook, &codec.table);
    fs::write(table, &table_bytes)
        .with_context(|| format!("failed to write code table {}", table.display()))?;

    metrics.record_codebook(&codebook);
    metrics.record_encode(&summary);
    metrics.table_bytes = table_bytes.len() as u64;
    metrics.complete();

    info!("Wrote {} and {}", output.display(), table.display());
    Ok(metrics)
}

fn decompress_file(
    input: &Path,
    table: &Path,
    output: &Path,
    codec: &CodecConfig,
) -> anyhow::Result<Metrics> {
    info!("Decompressing: {}", input.display());
    let mut metrics = Metrics::new(Operation::Decompress);

    let table_file =
        File::open(table).with_context(|| format!("failed to open code table {}", table.display()))?;
    let table_bytes = table_file
        .metadata()
        .with_context(|| format!("failed to read metadata for {}", table.display()))?
        .len();
    let codebook = read_table(&mut BufReader::new(table_file), &codec.table)
        .with_context(|| format!("failed to read code table {}", table.display()))?;

    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let packed_bytes = file
        .metadata()
        .with_context(|| format!("failed to read metadata for {}", input.display()))?
        .len();
    let data = decompress_from(&mut BufReader::new(file), &codebook, codec.read_chunk_bytes)
        .with_context(|| format!("failed to decompress {}", input.display()))?;

    fs::write(output, &data).with_context(|| format!("failed to write {}", output.display()))?;

    metrics.record_codebook(&codebook);
    metrics.input_bytes = data.len() as u64;
    metrics.output_bytes = packed_bytes;
    metrics.table_bytes = table_bytes;
    metrics.payload_bits = codebook.encoded_bit_len(&data)?;
    metrics.complete();

    info!("Wrote {}", output.display());
    Ok(metrics)
}
