//! JSON export format implementation

use chrono::Local;
use serde_json::{Value as JsonValue, json};

use crate::config::DisplayConfig;
use crate::error::Error;
use crate::leaderboard::{BoardStatus, Leaderboard, RankedEntry};

use super::format::ExportFormat;

/// JSON exporter: one document per leaderboard
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

/// JSON object for one ranked entry
pub fn format_json_entry(ranked: RankedEntry<'_>) -> JsonValue {
    json!({
        "rank": ranked.rank,
        "medal": ranked.medal(),
        "nickname": ranked.entry.nickname,
        "score": ranked.entry.score,
    })
}

fn status_name(board: &Leaderboard) -> &'static str {
    match board.status() {
        BoardStatus::Ranked => "ranked",
        BoardStatus::Empty(reason) => reason.into(),
    }
}

impl ExportFormat for JsonExporter {
    fn header(&self, _display: &DisplayConfig) -> Option<String> {
        None
    }

    fn format_row(&self, ranked: RankedEntry<'_>, _display: &DisplayConfig) -> String {
        format_json_entry(ranked).to_string()
    }

    fn format_empty(&self, board: &Leaderboard, display: &DisplayConfig) -> String {
        self.format_board(board, display)
    }

    fn format_error(&self, error: &Error, display: &DisplayConfig) -> String {
        let document = json!({
            "title": display.title,
            "generated_at": Local::now().to_rfc3339(),
            "error": {
                "kind": error.kind().to_string(),
                "message": error.user_message(),
            },
        });
        format!("{}\n", document)
    }

    fn format_board(&self, board: &Leaderboard, display: &DisplayConfig) -> String {
        let entries: Vec<JsonValue> = board.ranked().map(format_json_entry).collect();
        let message = board.is_empty().then_some(&display.no_scores_message);
        let document = json!({
            "title": display.title,
            "generated_at": Local::now().to_rfc3339(),
            "status": status_name(board),
            "message": message,
            "entries": entries,
            "records_seen": board.records_seen,
            "skipped": board.skipped_rows + board.skipped_elements,
        });
        format!("{}\n", document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::build;
    use serde_json::json;

    #[test]
    fn test_json_document() {
        let records: Vec<_> = [
            json!({"n": "Bob", "s": 3}),
            json!({"n": "<Ann>", "s": "9"}),
            json!({"n": "", "s": 1}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        let board = build(&records, "n", "s");

        let output = JsonExporter.format_board(&board, &DisplayConfig::default());
        let document: JsonValue = serde_json::from_str(&output).unwrap();

        assert_eq!(document["status"], "ranked");
        assert_eq!(document["message"], JsonValue::Null);
        assert_eq!(document["skipped"], 1);
        assert_eq!(
            document["entries"],
            json!([
                {"rank": 1, "medal": "🥇", "nickname": "&lt;Ann&gt;", "score": 9},
                {"rank": 2, "medal": "🥈", "nickname": "Bob", "score": 3},
            ])
        );
        assert!(document["generated_at"].as_str().is_some());
    }

    #[test]
    fn test_json_empty_board() {
        let output = JsonExporter.format_board(&Leaderboard::default(), &DisplayConfig::default());
        let document: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(document["status"], "no_responses");
        assert_eq!(document["message"], "No valid scores to display yet.");
        assert_eq!(document["entries"], json!([]));
    }

    #[test]
    fn test_json_error() {
        let err = Error::Transport("connection refused".to_string());
        let output = JsonExporter.format_error(&err, &DisplayConfig::default());
        let document: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(document["error"]["kind"], "transport");
        assert!(document.get("entries").is_none());
    }
}
