use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "limeboard")]
#[command(version, about = "Live leaderboard for LimeSurvey surveys")]
pub struct Cli {
    /// Configuration file (TOML); environment variables override its values
    #[arg(short, long, env = "LIMEBOARD_CONFIG", default_value = "limeboard.toml")]
    pub config: PathBuf,

    /// Survey id (overrides LIMESURVEY_SURVEY_ID)
    #[arg(long)]
    pub survey_id: Option<String>,

    /// Response column holding the nickname (overrides COLUMN_NICKNAME)
    #[arg(long)]
    pub nickname_column: Option<String>,

    /// Response column holding the score (overrides COLUMN_SCORE)
    #[arg(long)]
    pub score_column: Option<String>,

    /// Authentication plugin, e.g. AuthLDAP (overrides LIMESURVEY_AUTH_SOURCE)
    #[arg(long)]
    pub auth_source: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Text)]
    pub format: ExportFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable colored text output
    #[arg(long)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
pub enum Command {
    /// Fetch and print the leaderboard (default)
    Show,
    /// Check that the configured credentials can obtain a session key
    Check,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Text,
    Json,
    Html,
}
