mod cli;
mod commands;
mod config;
mod engine;
mod manifest;
mod progress;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ConnectionArgs};
use std::io;
use std::path::PathBuf;

/// Global context for the application
#[derive(Debug, Default)]
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Settings file override
    pub config: Option<PathBuf>,
    /// State file override
    pub state: Option<PathBuf>,
    pub connection: ConnectionArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        state: cli.state,
        connection: cli.connection,
    };

    match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, &args),
        Command::Refresh(args) => commands::refresh::run(&ctx, &args),
        Command::Diff(args) => commands::diff::run(&ctx, &args),
        Command::Destroy(args) => commands::destroy::run(&ctx, &args),
        Command::Show(args) => commands::show::run(&ctx, &args),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "brocade", &mut io::stdout());
            Ok(())
        }
    }
}
