//! CLI tool for replaying a binary event file into top-of-book text output.
//!
//! # Usage
//!
//! ```bash
//! # Replay with default modify handling
//! cargo run --release --bin replay_book -- \
//!     --input data/ticks.bin \
//!     --output data/book.csv
//!
//! # Time the apply step and save a JSON summary
//! cargo run --release --bin replay_book -- \
//!     data/ticks.bin data/book.csv --timing --summary data/summary.json
//! ```

use std::env;
use std::path::PathBuf;
use std::process;

use tob_reconstructor::{ModifyPolicy, ReplayConfig, Replayer};

/// Command-line arguments
struct Args {
    /// Binary event file
    input: PathBuf,
    /// Text output file
    output: PathBuf,
    /// Strip modified orders from their previous price level
    relocate_modifies: bool,
    /// Time the apply step
    timing: bool,
    /// Continue past a truncated or unreadable tail
    skip_invalid: bool,
    /// Optional JSON summary path
    summary: Option<PathBuf>,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut relocate_modifies = false;
    let mut timing = false;
    let mut skip_invalid = false;
    let mut summary: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" | "-i" => {
                i += 1;
                if i >= args.len() {
                    return Err("--input requires a path".to_string());
                }
                input = Some(PathBuf::from(&args[i]));
            }
            "--output" | "-o" => {
                i += 1;
                if i >= args.len() {
                    return Err("--output requires a path".to_string());
                }
                output = Some(PathBuf::from(&args[i]));
            }
            "--summary" | "-s" => {
                i += 1;
                if i >= args.len() {
                    return Err("--summary requires a path".to_string());
                }
                summary = Some(PathBuf::from(&args[i]));
            }
            "--relocate-modifies" => {
                relocate_modifies = true;
            }
            "--timing" | "-t" => {
                timing = true;
            }
            "--skip-invalid" => {
                skip_invalid = true;
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {arg}"));
            }
            arg => {
                // Positional arguments
                if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else if output.is_none() {
                    output = Some(PathBuf::from(arg));
                } else {
                    return Err(format!("Unknown argument: {arg}"));
                }
            }
        }
        i += 1;
    }

    let input = input.ok_or("Input path is required")?;
    let output = output.ok_or("Output path is required")?;

    Ok(Args {
        input,
        output,
        relocate_modifies,
        timing,
        skip_invalid,
        summary,
    })
}

fn print_help() {
    println!(
        r#"replay_book - rebuild best bid/ask after every order event

USAGE:
    replay_book [OPTIONS] --input <FILE> --output <FILE>
    replay_book [OPTIONS] <INPUT> <OUTPUT>

OPTIONS:
    -i, --input <FILE>       Binary event file (26-byte big-endian records)
    -o, --output <FILE>      Semicolon-delimited output file
    -s, --summary <FILE>     Write a JSON run summary
    -t, --timing             Report total and per-event apply time
        --relocate-modifies  Remove a modified order from its previous price level
        --skip-invalid       Continue past a truncated or unreadable input tail
    -h, --help               Print this help

Log level is controlled by RUST_LOG (default: info)."#
    );
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Parse arguments
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(1);
        }
    };

    let policy = if args.relocate_modifies {
        ModifyPolicy::Relocate
    } else {
        ModifyPolicy::Retain
    };

    let mut config = ReplayConfig::new(&args.input, &args.output)
        .with_modify_policy(policy)
        .with_timing(args.timing)
        .with_skip_invalid(args.skip_invalid);
    if let Some(path) = &args.summary {
        config = config.with_summary_path(path);
    }

    let summary = match Replayer::new(config).and_then(|replayer| replayer.run()) {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("Replay failed: {e}");
            process::exit(1);
        }
    };

    if let Some(timing) = &summary.timing {
        println!("Total time of building OB: {:.0} us", timing.total_us);
        println!("Avg time per tick: {:.4} us", timing.avg_us);
    }

    if summary.processor.unknown_actions > 0 || summary.processor.missing_side > 0 {
        log::warn!(
            "{} events with unknown action, {} without a side",
            summary.processor.unknown_actions,
            summary.processor.missing_side
        );
    }
}
