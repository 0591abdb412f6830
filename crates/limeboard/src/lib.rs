//! # limeboard
//!
//! Live leaderboard for LimeSurvey surveys.
//!
//! This crate provides:
//! - A JSON-RPC transport for the RemoteControl 2 API
//! - Session key handling with guaranteed release
//! - Decoding of `export_responses` payloads (grouped or flat)
//! - Ranking of nickname/score pairs into a leaderboard
//! - Text, JSON and HTML renderers
//!
//! Every fetch is stateless: a new session key is acquired, used for one
//! export and released before [`Limeboard::fetch`] returns.

pub mod board;
pub mod config;
pub mod decode;
pub mod error;
pub mod export;
pub mod leaderboard;
pub mod prelude;
pub mod rpc;
pub mod session;

pub use board::{Limeboard, LimeboardConfig, LimeboardConfigBuilder};
pub use config::{Config, DisplayConfig};
pub use decode::{DecodedResponses, ExportPayload, Record, decode};
pub use error::{DecodeError, Error, FailureKind, Result};
pub use export::{ExportFormat, HtmlExporter, JsonExporter, TextExporter};
pub use leaderboard::{
    BoardStatus, EmptyReason, Leaderboard, LeaderboardEntry, RankedEntry, build, escape_html,
};
pub use rpc::{HttpTransport, Method, RpcRequest, RpcResponse, Transport, TransportConfig};
pub use session::{Credentials, Session, SessionManager};
