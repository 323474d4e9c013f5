/// MongoDB wire capture tool: dissect and check files of concatenated
/// wire protocol messages.
///
/// # Command overview
///
/// ```text
/// mongo-dissect <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print every message as a summary line and element tree
///   validate   Decode every message and fail on any diagnostic
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder events to stderr (RUST_LOG overrides)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                              |
/// |------|------------------------------------------------------|
/// | 0    | Success                                              |
/// | 1    | Error (I/O failure, framing error, failed validation) |
///
/// All error details and logs are written to stderr so stdout can be
/// piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_inspect;
mod cmd_validate;
mod render;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Dissect captured MongoDB wire protocol traffic.
#[derive(Parser)]
#[command(name = "mongo-dissect", version, about = "MongoDB wire protocol dissector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder events at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print each message in a capture file.
    Inspect(InspectArgs),
    /// Decode a capture file and report every diagnostic.
    Validate(ValidateArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `mongo-dissect inspect`.
///
/// The input is a file of back-to-back wire messages, each starting with
/// its own int32 length, as written by a TCP stream reassembler.
///
/// ```text
/// ┌─────────────┬─────────────────────────────────────────────────────┐
/// │ Flag        │ Effect                                              │
/// ├─────────────┼─────────────────────────────────────────────────────┤
/// │ --message N │ Show only the message at index N                    │
/// │ --show-hex  │ Include a 16-byte-per-line hex dump of each message │
/// │ --json      │ Print one JSON report instead of text               │
/// └─────────────┴─────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Capture file to read.
    pub file: PathBuf,

    /// Inspect only the message at this zero-based index.
    #[arg(long)]
    pub message: Option<usize>,

    /// Show a raw hex dump of each message.
    #[arg(long)]
    pub show_hex: bool,

    /// Emit a machine-readable JSON report on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `mongo-dissect validate`.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Capture file to validate.
    pub file: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
