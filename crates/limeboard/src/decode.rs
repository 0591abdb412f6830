//! Export payload decoding.
//!
//! `export_responses` returns a base64 string holding a JSON document. The
//! document is either `{"responses": ...}` with responses grouped by
//! response id, or a bare array of records. Both shapes are resolved here so
//! nothing downstream needs to know which one arrived.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{DecodeError, Result, truncate_chars};

/// One survey response: column code to scalar value
pub type Record = Map<String, Value>;

/// Characters of an unexpected payload kept in the error message
const PAYLOAD_EXCERPT_CHARS: usize = 300;

/// The two document shapes produced by `export_responses`
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPayload {
    /// `{"responses": groups}` where groups is an array or an object of record collections
    Grouped(Value),
    /// A bare array of records
    Flat(Vec<Value>),
}

impl ExportPayload {
    pub fn from_document(document: Value) -> Result<Self> {
        match document {
            Value::Object(mut object) => match object.remove("responses") {
                Some(groups @ (Value::Array(_) | Value::Object(_))) => Ok(Self::Grouped(groups)),
                _ => Err(DecodeError::UnrecognisedFormat.into()),
            },
            Value::Array(items) => Ok(Self::Flat(items)),
            _ => Err(DecodeError::UnrecognisedFormat.into()),
        }
    }

    /// Flatten into records, dropping elements that are not objects and
    /// groups that are not collections
    pub fn into_records(self) -> DecodedResponses {
        let mut decoded = DecodedResponses::default();
        match self {
            Self::Grouped(groups) => {
                for group in values_of(groups).unwrap_or_default() {
                    match values_of(group) {
                        Some(items) => items.into_iter().for_each(|item| decoded.push(item)),
                        None => decoded.skipped += 1,
                    }
                }
            }
            Self::Flat(items) => {
                for item in items {
                    decoded.push(item);
                }
            }
        }
        decoded
    }
}

/// Records recovered from an export, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedResponses {
    pub records: Vec<Record>,
    /// Elements dropped because they were not objects, plus scalar groups
    pub skipped: usize,
}

impl DecodedResponses {
    fn push(&mut self, item: Value) {
        match item {
            Value::Object(record) => self.records.push(record),
            _ => self.skipped += 1,
        }
    }
}

/// Children of an array or object in document order, `None` for scalars
fn values_of(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(object) => Some(object.into_iter().map(|(_, v)| v).collect()),
        _ => None,
    }
}

/// Decode the `result` of an `export_responses` call.
pub fn decode(export_result: Option<&Value>) -> Result<DecodedResponses> {
    let encoded = match export_result {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim(),
        other => return Err(unexpected_payload(other).into()),
    };

    let bytes = STANDARD.decode(encoded).map_err(DecodeError::Base64)?;
    let document: Value = serde_json::from_slice(&bytes).map_err(DecodeError::Json)?;

    let payload = ExportPayload::from_document(document)?;
    let shape = match payload {
        ExportPayload::Grouped(_) => "grouped",
        ExportPayload::Flat(_) => "flat",
    };
    let decoded = payload.into_records();

    debug!(
        "Decoded {} export: {} records",
        shape,
        decoded.records.len()
    );
    if decoded.skipped > 0 {
        warn!(
            "Dropped {} malformed elements while flattening export",
            decoded.skipped
        );
    }

    Ok(decoded)
}

fn unexpected_payload(value: Option<&Value>) -> DecodeError {
    let status = value
        .and_then(Value::as_object)
        .and_then(|o| o.get("status"))
        .and_then(Value::as_str);
    let detail = match (status, value) {
        (Some(status), _) => format!("status: {}", status),
        (None, Some(value)) => {
            let dump = value.to_string();
            truncate_chars(&dump, PAYLOAD_EXCERPT_CHARS).0.to_string()
        }
        (None, None) => "null".to_string(),
    };
    DecodeError::UnexpectedPayload(detail)
}
