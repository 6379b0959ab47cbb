//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "reclaim",
    version,
    about = "Normalize, validate and mask legacy records",
    long_about = "Normalize legacy CSV records against a declarative schema.\n\n\
                  Clean records, quarantined records, the issue log, audit events\n\
                  and batch metrics are written to the output directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow raw field values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process a legacy CSV file.
    Run(RunArgs),

    /// Validate a schema and configuration without processing records.
    Check(CheckArgs),

    /// Print the legacy -> target field mapping of a schema.
    Mappings(MappingsArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Legacy CSV file with a header row.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Schema file (.csv or .toml).
    #[arg(long, short = 's', value_name = "PATH")]
    pub schema: PathBuf,

    /// Pipeline configuration (TOML). Defaults apply when omitted.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output directory (default: <INPUT dir>/reclaim-output).
    #[arg(long = "output-dir", short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(long)]
    pub workers: Option<usize>,

    #[arg(long = "batch-size")]
    pub batch_size: Option<usize>,

    /// Whole-run deadline in seconds.
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Process and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    #[arg(long, short = 's', value_name = "PATH")]
    pub schema: PathBuf,

    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct MappingsArgs {
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
