//! Show command: fetch and render the leaderboard.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result, bail};
use limeboard::{
    BoardStatus, Config, EmptyReason, ExportFormat, HtmlExporter, JsonExporter, Limeboard,
    TextExporter,
};
use tracing::{error, warn};

use crate::cli;

/// Fetch the leaderboard and write it in the requested format
pub fn run(config: &Config, format: cli::ExportFormat, output: Option<&Path>, color: bool) -> Result<()> {
    let color = color && output.is_none() && std::io::stdout().is_terminal();
    let exporter: Box<dyn ExportFormat> = match format {
        cli::ExportFormat::Text => Box::new(TextExporter::new(color)),
        cli::ExportFormat::Json => Box::new(JsonExporter),
        cli::ExportFormat::Html => Box::new(HtmlExporter),
    };
    let display = &config.display;

    let fetched = config
        .resolve()
        .and_then(Limeboard::connect)
        .and_then(|board| board.fetch());

    match fetched {
        Ok(board) => {
            if board.status() == BoardStatus::Empty(EmptyReason::NoValidRows) {
                warn!(
                    "Responses found but none contain valid nickname/score data (check COLUMN_NICKNAME / COLUMN_SCORE)"
                );
            }
            write_output(output, &exporter.format_board(&board, display))
        }
        Err(e) => {
            error!("Leaderboard error ({}): {}", e.kind(), e);
            write_output(output, &exporter.format_error(&e, display))?;
            bail!("{}", e.user_message())
        }
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported to: {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
