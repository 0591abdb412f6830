//! Leaderboard construction from decoded survey records.

use serde::Serialize;
use serde_json::Value;
use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::decode::Record;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// Trimmed and HTML-escaped
    pub nickname: String,
    pub score: i64,
}

/// Why a leaderboard has no entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EmptyReason {
    /// The export contained no records at all
    NoResponses,
    /// Records existed but none had a usable nickname and score
    NoValidRows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    Ranked,
    Empty(EmptyReason),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    /// Records examined
    pub records_seen: usize,
    /// Records rejected for a missing nickname or non-numeric score
    pub skipped_rows: usize,
    /// Export elements dropped before they became records
    pub skipped_elements: usize,
}

impl Leaderboard {
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn status(&self) -> BoardStatus {
        if !self.entries.is_empty() {
            BoardStatus::Ranked
        } else if self.records_seen == 0 {
            BoardStatus::Empty(EmptyReason::NoResponses)
        } else {
            BoardStatus::Empty(EmptyReason::NoValidRows)
        }
    }

    /// Entries with their 1-based rank
    pub fn ranked(&self) -> impl Iterator<Item = RankedEntry<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| RankedEntry { rank: i + 1, entry })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry<'a> {
    pub rank: usize,
    pub entry: &'a LeaderboardEntry,
}

impl RankedEntry<'_> {
    /// Medal for the podium, `#n` for everyone else
    pub fn medal(&self) -> String {
        match self.rank {
            1..=3 => MEDALS[self.rank - 1].to_string(),
            n => format!("#{}", n),
        }
    }
}

/// Build a ranked leaderboard.
///
/// Records without a non-blank nickname or a numeric score are skipped.
/// Entries are ordered by descending score; the sort is stable so equal
/// scores keep their record order.
pub fn build(records: &[Record], nickname_column: &str, score_column: &str) -> Leaderboard {
    let mut entries: Vec<LeaderboardEntry> = records
        .iter()
        .filter_map(|record| {
            let nickname = record.get(nickname_column).and_then(nickname_of)?;
            let score = record.get(score_column).and_then(score_of)?;
            Some(LeaderboardEntry {
                nickname: escape_html(&nickname),
                score,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.score.cmp(&a.score));

    let skipped_rows = records.len() - entries.len();
    if skipped_rows > 0 {
        debug!(
            "Skipped {} of {} records without a valid '{}'/'{}' pair",
            skipped_rows,
            records.len(),
            nickname_column,
            score_column
        );
    }

    Leaderboard {
        entries,
        records_seen: records.len(),
        skipped_rows,
        skipped_elements: 0,
    }
}

fn nickname_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

/// Integer score from a JSON number or numeric string, truncated toward zero
fn score_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => parse_numeric(s.trim()),
        _ => None,
    }
}

fn parse_numeric(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    // f64 parsing also accepts "inf" and "NaN"
    let literal = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !literal {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f as i64)
}

/// Escape text for safe inclusion in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Reverse of [`escape_html`], for plain-text output
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}
