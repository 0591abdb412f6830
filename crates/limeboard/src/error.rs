use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Maximum number of characters of error detail shown to end users
const USER_DETAIL_LIMIT: usize = 150;

/// Failures while turning a remote payload into records.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected export payload shape: {0}")]
    UnexpectedPayload(String),

    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("json decode failed: {0}")]
    Json(serde_json::Error),

    #[error("unrecognised response format")]
    UnrecognisedFormat,

    #[error("invalid JSON-RPC response body: {0}")]
    ResponseBody(serde_json::Error),

    #[error("malformed JSON-RPC response: neither result nor error present")]
    MalformedResponse,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP status {status}: {excerpt}")]
    HttpStatus { status: u16, excerpt: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("API error: {message}")]
    Api { code: Option<i64>, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error taxonomy for callers that only need to branch on the class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    Transport,
    Decode,
    Api,
    Authentication,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Configuration(_) => FailureKind::Configuration,
            Error::Transport(_) | Error::HttpStatus { .. } => FailureKind::Transport,
            Error::Decode(_) => FailureKind::Decode,
            Error::Api { .. } => FailureKind::Api,
            Error::Authentication(_) => FailureKind::Authentication,
        }
    }

    /// Short message suitable for display to end users.
    ///
    /// Detail is cut to a bounded excerpt; the full error belongs in the log.
    pub fn user_message(&self) -> String {
        let detail = self.to_string();
        let (detail, cut) = truncate_chars(&detail, USER_DETAIL_LIMIT);
        let ellipsis = if cut { "..." } else { "" };
        match self.kind() {
            FailureKind::Configuration => format!("Configuration error. (Ref: {detail}{ellipsis})"),
            FailureKind::Authentication => format!(
                "Unable to obtain session key. Check credentials and auth source. (Msg: {detail}{ellipsis})"
            ),
            _ => format!(
                "Failed to retrieve/process data. Try again later. (Msg: {detail}{ellipsis})"
            ),
        }
    }
}

/// Cut `text` to at most `max` characters. The flag reports whether anything was dropped.
pub(crate) fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}
