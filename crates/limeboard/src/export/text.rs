//! Plain text output for terminals

use owo_colors::OwoColorize;

use crate::config::DisplayConfig;
use crate::error::Error;
use crate::leaderboard::{Leaderboard, RankedEntry, unescape_html};

use super::format::ExportFormat;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter {
    /// Emit ANSI colors
    pub color: bool,
}

impl TextExporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl ExportFormat for TextExporter {
    fn header(&self, display: &DisplayConfig) -> Option<String> {
        let underline = "=".repeat(display.title.chars().count());
        if self.color {
            Some(format!("{}\n{}", display.title.bold(), underline))
        } else {
            Some(format!("{}\n{}", display.title, underline))
        }
    }

    fn format_row(&self, ranked: RankedEntry<'_>, display: &DisplayConfig) -> String {
        let nickname = unescape_html(&ranked.entry.nickname);
        let score = format!("{} {}", ranked.entry.score, display.points_suffix);
        if self.color && ranked.rank <= 3 {
            format!("{:>4}  {}  {}", ranked.medal(), nickname.bold(), score.yellow())
        } else if self.color {
            format!("{:>4}  {}  {}", ranked.medal(), nickname, score.cyan())
        } else {
            format!("{:>4}  {}  {}", ranked.medal(), nickname, score)
        }
    }

    fn format_empty(&self, _board: &Leaderboard, display: &DisplayConfig) -> String {
        format!("{}\n", display.no_scores_message)
    }

    fn format_error(&self, error: &Error, _display: &DisplayConfig) -> String {
        if self.color {
            format!("{}\n", error.user_message().red())
        } else {
            format!("{}\n", error.user_message())
        }
    }
}
