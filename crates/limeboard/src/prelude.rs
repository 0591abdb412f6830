//! Prelude module for convenient imports
//!
//! ```ignore
//! use limeboard::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Client types: `Limeboard`, `LimeboardConfig`, `Credentials`
//! - Configuration: `Config`, `DisplayConfig`
//! - Results: `Leaderboard`, `LeaderboardEntry`, `BoardStatus`
//! - Error handling: `Error`, `Result`

pub use crate::board::{Limeboard, LimeboardConfig};
pub use crate::config::{Config, DisplayConfig};
pub use crate::error::{Error, FailureKind, Result};
pub use crate::export::{ExportFormat, HtmlExporter, JsonExporter, TextExporter};
pub use crate::leaderboard::{BoardStatus, EmptyReason, Leaderboard, LeaderboardEntry};
pub use crate::rpc::{HttpTransport, Transport};
pub use crate::session::Credentials;
