//! JSON-RPC request and response envelopes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::{Map, Value};
use strum::{Display, IntoStaticStr};

use crate::error::{DecodeError, Error, Result};

pub const PROTOCOL_VERSION: &str = "2.0";

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a request id unique within this process
pub fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// RemoteControl methods used by the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Method {
    GetSessionKey,
    ExportResponses,
    ReleaseSessionKey,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: Method,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: Method, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            id: next_request_id(),
            method,
            params,
        }
    }
}

/// A successful JSON-RPC response.
///
/// Responses carrying an `error` never become an `RpcResponse`; they are
/// turned into [`Error::Api`] while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    pub id: Option<Value>,
    /// `None` when the remote returned `"result": null`
    pub result: Option<Value>,
}

impl RpcResponse {
    pub fn with_result(result: Value) -> Self {
        Self {
            id: None,
            result: Some(result).filter(|v| !v.is_null()),
        }
    }

    /// Parse a raw HTTP body into a response, classifying remote errors.
    pub fn from_body(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(DecodeError::ResponseBody)?;
        let Value::Object(mut object) = value else {
            return Err(DecodeError::MalformedResponse.into());
        };

        if let Some(error) = object.remove("error").filter(|e| !e.is_null()) {
            return Err(api_error(error));
        }

        let result = object
            .remove("result")
            .ok_or(DecodeError::MalformedResponse)?;

        Ok(Self {
            id: object.remove("id"),
            result: Some(result).filter(|v| !v.is_null()),
        })
    }

    /// Status text LimeSurvey places in `result` when a call fails softly,
    /// e.g. `{"status": "Invalid user name or password"}`
    pub fn status_message(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|o| o.get("status"))
            .and_then(Value::as_str)
    }
}

fn api_error(error: Value) -> Error {
    match error {
        Value::Object(object) => {
            let code = object.get("code").and_then(Value::as_i64);
            let message = object
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(object_without_code(&object)).to_string());
            Error::Api { code, message }
        }
        Value::String(message) => Error::Api {
            code: None,
            message,
        },
        other => Error::Api {
            code: None,
            message: other.to_string(),
        },
    }
}

fn object_without_code(object: &Map<String, Value>) -> Map<String, Value> {
    object
        .iter()
        .filter(|(k, _)| k.as_str() != "code")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
