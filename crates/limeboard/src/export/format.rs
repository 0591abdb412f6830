//! ExportFormat trait definition

use crate::config::DisplayConfig;
use crate::error::Error;
use crate::leaderboard::{Leaderboard, RankedEntry};

/// Trait for leaderboard output formats
///
/// Provides a common interface for the text, JSON and HTML renderers.
pub trait ExportFormat {
    /// Lines printed before the first entry
    fn header(&self, display: &DisplayConfig) -> Option<String>;

    /// Format a single ranked entry
    fn format_row(&self, ranked: RankedEntry<'_>, display: &DisplayConfig) -> String;

    /// Lines printed after the last entry
    fn footer(&self, _display: &DisplayConfig) -> Option<String> {
        None
    }

    /// Output for a leaderboard without entries. This is not an error state.
    fn format_empty(&self, board: &Leaderboard, display: &DisplayConfig) -> String;

    /// Output for a failed fetch
    fn format_error(&self, error: &Error, display: &DisplayConfig) -> String;

    /// Format a whole leaderboard
    fn format_board(&self, board: &Leaderboard, display: &DisplayConfig) -> String {
        if board.is_empty() {
            return self.format_empty(board, display);
        }

        let mut output = String::new();
        if let Some(header) = self.header(display) {
            output.push_str(&header);
            output.push('\n');
        }
        for ranked in board.ranked() {
            output.push_str(&self.format_row(ranked, display));
            output.push('\n');
        }
        if let Some(footer) = self.footer(display) {
            output.push_str(&footer);
            output.push('\n');
        }
        output
    }
}
