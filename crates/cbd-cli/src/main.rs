//! `cbd` CLI: convert between CBD and JSON, CBOR or MessagePack, compare
//! sizes, inspect documents.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to CBD (stdin → stdout)
//! echo '{"name":"Alice","age":30}' | cbd encode > data.cbd
//!
//! # Encode from file to file
//! cbd encode -i data.json -o data.cbd
//!
//! # Decode CBD back to pretty-printed JSON
//! cbd decode -i data.cbd
//!
//! # Convert MessagePack to CBD, and CBD to CBOR
//! cbd encode --format msgpack -i data.msgpack -o data.cbd
//! cbd decode --format cbor -i data.cbd -o data.cbor
//!
//! # Compare JSON, CBOR, MessagePack and CBD sizes
//! cbd stats -i data.json
//!
//! # Show header and dictionary of a CBD document
//! cbd inspect -i data.cbd
//! ```
//!
//! Logging goes to stderr; `-v` raises the level, `RUST_LOG` overrides it.

mod formats;

use anyhow::{Context, Result};
use cbd_core::{DecodeOptions, EncodeOptions, Value};
use clap::{Parser, Subcommand};
use formats::Format;
use serde::Serialize;
use std::io::{self, Read, Write};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cbd", version, about = "CBD (Compact Binary Document) CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON (or CBOR, MessagePack) to CBD format
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Format of the input
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Maximum nesting depth of arrays and objects
        #[arg(long, default_value_t = cbd_core::format::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Decode CBD back to JSON (or CBOR, MessagePack) format
    Decode {
        /// Input CBD file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Format of the output
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Emit minified JSON instead of pretty-printed (JSON output only)
        #[arg(long)]
        compact: bool,
        /// Ignore bytes after the root value instead of failing
        #[arg(long)]
        lenient: bool,
        /// Maximum nesting depth of arrays and objects
        #[arg(long, default_value_t = cbd_core::format::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Show encoded sizes (JSON, CBOR, MessagePack, CBD) and the reduction over JSON
    Stats {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Format of the input
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the header and key dictionary of a CBD document
    Inspect {
        /// Input CBD file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

/// Encoded sizes of one document in each format.
#[derive(Debug, Serialize)]
struct SizeReport {
    json_bytes: usize,
    cbor_bytes: usize,
    msgpack_bytes: usize,
    cbd_bytes: usize,
    /// Percentage saved by CBD relative to minified JSON.
    reduction_percent: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Encode {
            input,
            format,
            output,
            max_depth,
        } => {
            let source = read_bytes(input.as_deref())?;
            let value = read_value(format, &source)?;
            let options = EncodeOptions::default().max_depth(max_depth);
            let bytes = cbd_core::serialize_with(&value, &options)
                .with_context(|| format!("Failed to encode {} to CBD", format.name()))?;
            info!(
                format = format.name(),
                input_bytes = source.len(),
                cbd_bytes = bytes.len(),
                "encoded"
            );
            write_output(output.as_deref(), &bytes)?;
        }
        Commands::Decode {
            input,
            format,
            output,
            compact,
            lenient,
            max_depth,
        } => {
            let bytes = read_bytes(input.as_deref())?;
            let options = DecodeOptions::default()
                .max_depth(max_depth)
                .strict(!lenient);
            let value = cbd_core::deserialize_with(&bytes, &options)
                .with_context(|| format!("Failed to decode CBD to {}", format.name()))?;
            let rendered = format
                .write_value(&value, !compact)
                .with_context(|| format!("Failed to write {} output", format.name()))?;
            info!(
                format = format.name(),
                cbd_bytes = bytes.len(),
                output_bytes = rendered.len(),
                "decoded"
            );
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Stats {
            input,
            format,
            json,
        } => {
            let source = read_bytes(input.as_deref())?;
            let value = read_value(format, &source)?;
            let report = size_report(&value)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("JSON size:         {} bytes", report.json_bytes);
                println!("CBOR size:         {} bytes", report.cbor_bytes);
                println!("MessagePack size:  {} bytes", report.msgpack_bytes);
                println!("CBD size:          {} bytes", report.cbd_bytes);
                println!("Reduction:         {:.1}%", report.reduction_percent);
            }
        }
        Commands::Inspect { input } => {
            let bytes = read_bytes(input.as_deref())?;
            let info = cbd_core::inspect(&bytes).context("Failed to read CBD header")?;
            println!("Magic:       0x{:04X}", info.header.magic);
            println!("Version:     {}", info.header.version);
            println!("Keys:        {}", info.header.dict_size);
            for (i, key) in info.keys.iter().enumerate() {
                println!("  {:>3}  {}", i + 1, key);
            }
            println!(
                "Body:        {} bytes at offset {}",
                info.body_len(),
                info.body_offset
            );
            println!("Total:       {} bytes", info.total_len);
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_value(format: Format, bytes: &[u8]) -> Result<Value> {
    format
        .read_value(bytes)
        .with_context(|| format!("Failed to parse {} input", format.name()))
}

fn size_report(value: &Value) -> Result<SizeReport> {
    let json_bytes = Format::Json.write_value(value, false)?.len();
    let cbor_bytes = Format::Cbor
        .write_value(value, false)
        .context("Failed to encode CBOR")?
        .len();
    let msgpack_bytes = Format::Msgpack
        .write_value(value, false)
        .context("Failed to encode MessagePack")?
        .len();
    let cbd_bytes = cbd_core::serialize(value)
        .context("Failed to encode CBD")?
        .len();
    let reduction_percent = if json_bytes > 0 {
        (1.0 - (cbd_bytes as f64 / json_bytes as f64)) * 100.0
    } else {
        0.0
    };
    debug!(json_bytes, cbor_bytes, msgpack_bytes, cbd_bytes, "size report");
    Ok(SizeReport {
        json_bytes,
        cbor_bytes,
        msgpack_bytes,
        cbd_bytes,
        reduction_percent,
    })
}

fn read_bytes(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {}", path)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content)
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
