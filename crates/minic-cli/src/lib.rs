//! Library half of the `minic` binary: subcommands, REPL and logging.
pub mod commands;
pub mod logging;
pub mod repl;
