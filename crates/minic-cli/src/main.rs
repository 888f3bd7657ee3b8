//! MiniC command line.

use clap::Parser;
use minic_cli::commands::{load_analyzers, run_file, serve, transcripts};
use minic_cli::logging::{init_logging, LogConfig, LogFormat};
use minic_cli::repl::Repl;
use std::io::{self, IsTerminal};

mod cli;

use crate::cli::{Cli, Command, LogFormatArg};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match execute(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn execute(cli: Cli) -> anyhow::Result<i32> {
    let adapter = load_analyzers(cli.config.as_deref())?;
    match cli.command {
        Command::Run(args) => {
            let transcripts = transcripts(args.templates.as_deref())?;
            let report = run_file(adapter, &args.file, args.through, args.format, &transcripts)?;
            print!("{}", report.output);
            if !report.output.ends_with('\n') {
                println!();
            }
            Ok(if report.failed { 1 } else { 0 })
        }
        Command::Repl(args) => {
            let mut repl = Repl::new(adapter, transcripts(None)?);
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            if let Some(path) = args.file {
                repl.execute(minic_cli::repl::ReplCommand::Load(path), &mut input, &mut out)?;
            }
            repl.run(&mut input, &mut out)?;
            Ok(0)
        }
        Command::Serve(args) => {
            serve(adapter, &args.addr, args.max_sessions)?;
            Ok(0)
        }
    }
}

/// Explicit `-v`/`-q` wins over `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: io::stderr().is_terminal(),
    }
}
