//! CLI argument definitions for `minic`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use minic_core::Phase;
use minic_out::TranscriptFormat;

#[derive(Parser)]
#[command(
    name = "minic",
    version,
    about = "Phase-gated MiniC front-end",
    long_about = "Run MiniC source through lexical, syntax and semantic analysis.\n\n\
                  Each phase unlocks only after the previous one succeeds; any \
                  failure or edit sends the pipeline back to the start."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Pipeline configuration file binding analyzers to phases.
    #[arg(long, value_name = "PATH", env = "MINIC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a file, running phases in order until one fails.
    Run(RunArgs),

    /// Interactive session driven by `:` commands.
    Repl(ReplArgs),

    /// Serve the HTTP API.
    Serve(ServeArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// MiniC source file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Last phase to run.
    #[arg(long, value_name = "PHASE", default_value = "semantic", value_parser = parse_phase)]
    pub through: Phase,

    /// Transcript format.
    #[arg(long, value_name = "FORMAT", default_value = "plain", value_parser = parse_format)]
    pub format: TranscriptFormat,

    /// YAML file with transcript templates overriding the built-in ones.
    #[arg(long, value_name = "PATH")]
    pub templates: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ReplArgs {
    /// File to load before the first prompt.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, value_name = "ADDR", env = "MINIC_ADDR", default_value = minic_api::DEFAULT_ADDR)]
    pub addr: String,

    /// Sessions held open at once; creating more answers 503.
    #[arg(long, value_name = "N", env = "MINIC_MAX_SESSIONS", default_value_t = minic_api::DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_phase(raw: &str) -> Result<Phase, String> {
    raw.parse().map_err(|e: minic_core::UnknownPhase| e.to_string())
}

fn parse_format(raw: &str) -> Result<TranscriptFormat, String> {
    raw.parse()
}
