//! HTML fragment output.
//!
//! Produces the heading, search box, ranked list and status paragraphs of the
//! leaderboard page. Page chrome, styles and the filter script are left to
//! the embedding page.

use crate::config::DisplayConfig;
use crate::error::Error;
use crate::leaderboard::{Leaderboard, RankedEntry, escape_html};

use super::format::ExportFormat;

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExporter;

fn heading(display: &DisplayConfig) -> String {
    format!("<h1>{}</h1>", escape_html(&display.title))
}

impl ExportFormat for HtmlExporter {
    fn header(&self, display: &DisplayConfig) -> Option<String> {
        Some(format!(
            "{}\n<input type=\"text\" id=\"search\" placeholder=\"{}\" aria-label=\"Filter leaderboard by nickname\">\n<ol id=\"leaderboard\">",
            heading(display),
            escape_html(&display.search_placeholder)
        ))
    }

    fn format_row(&self, ranked: RankedEntry<'_>, display: &DisplayConfig) -> String {
        // nickname is escaped when the entry is built
        format!(
            "<li><span class=\"rank-medal\">{}</span><span class=\"nickname\">{}</span><span class=\"score\">{} {}</span></li>",
            ranked.medal(),
            ranked.entry.nickname,
            ranked.entry.score,
            escape_html(&display.points_suffix)
        )
    }

    fn footer(&self, display: &DisplayConfig) -> Option<String> {
        Some(format!(
            "</ol>\n<p id=\"no-results\" class=\"status-message\" style=\"display:none;\">{}</p>",
            escape_html(&display.no_results_message)
        ))
    }

    fn format_empty(&self, _board: &Leaderboard, display: &DisplayConfig) -> String {
        format!(
            "{}\n<p class=\"status-message\">{}</p>\n",
            heading(display),
            escape_html(&display.no_scores_message)
        )
    }

    fn format_error(&self, error: &Error, display: &DisplayConfig) -> String {
        format!(
            "{}\n<div class=\"status-message error-message\">{}</div>\n",
            heading(display),
            escape_html(&error.user_message())
        )
    }
}
