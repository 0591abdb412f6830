mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the rendered leaderboard
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("limeboard=info".parse()?)
                .add_directive("limeboard_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(&cli)?;

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => commands::show::run(&config, cli.format, cli.output.as_deref(), !cli.no_color),
        Command::Check => commands::check::run(&config),
    }
}
