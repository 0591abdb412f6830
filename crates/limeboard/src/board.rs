//! Leaderboard fetch orchestration.
//!
//! One fetch is one stateless cycle:
//! - acquire a session key
//! - export the survey responses
//! - decode and rank them
//! - release the session key (always, once acquired)
//!
//! ## Example
//!
//! ```ignore
//! use limeboard::{Credentials, Limeboard, LimeboardConfig};
//!
//! let config = LimeboardConfig::builder()
//!     .endpoint("https://survey.example.org/index.php/admin/remotecontrol")
//!     .credentials(Credentials::new("board", "secret"))
//!     .survey_id(123456)
//!     .nickname_column("nickname")
//!     .score_column("score")
//!     .build()?;
//!
//! let board = Limeboard::connect(config)?.fetch()?;
//! for ranked in board.ranked() {
//!     println!("{} {} {}", ranked.medal(), ranked.entry.nickname, ranked.entry.score);
//! }
//! ```

use serde_json::{Value, json};
use tracing::info;

use crate::decode::decode;
use crate::error::{Error, Result};
use crate::leaderboard::{self, BoardStatus, Leaderboard};
use crate::rpc::{
    HttpTransport, Method, RpcRequest, RpcResponse, Transport, TransportConfig, validate_endpoint,
};
use crate::session::{Credentials, Session, SessionManager};

/// Everything one leaderboard fetch needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimeboardConfig {
    /// Absolute URL of the RemoteControl JSON-RPC endpoint
    pub endpoint: String,
    pub credentials: Credentials,
    pub survey_id: u64,
    pub nickname_column: String,
    pub score_column: String,
    pub transport: TransportConfig,
}

impl LimeboardConfig {
    pub fn builder() -> LimeboardConfigBuilder {
        LimeboardConfigBuilder::default()
    }

    /// Distinct non-empty columns to export, or `None` to export every column
    pub fn export_fields(&self) -> Option<Vec<String>> {
        let mut fields: Vec<String> = Vec::new();
        for column in [&self.nickname_column, &self.score_column] {
            if !column.is_empty() && !fields.contains(column) {
                fields.push(column.clone());
            }
        }
        Some(fields).filter(|f| !f.is_empty())
    }

    /// Positional parameters of `export_responses`
    pub fn export_params(&self, session: &Session) -> Vec<Value> {
        vec![
            json!(session.key()),
            json!(self.survey_id),
            json!("json"), // document type
            Value::Null, // language: all
            json!("all"), // completion status
            json!("code"), // heading type
            json!("long"), // response type
            Value::Null, // from response id
            Value::Null, // to response id
            json!(self.export_fields()),
        ]
    }
}

/// Builder for LimeboardConfig
#[derive(Debug, Clone, Default)]
pub struct LimeboardConfigBuilder {
    endpoint: Option<String>,
    credentials: Option<Credentials>,
    survey_id: Option<u64>,
    nickname_column: Option<String>,
    score_column: Option<String>,
    transport: Option<TransportConfig>,
}

impl LimeboardConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn survey_id(mut self, survey_id: u64) -> Self {
        self.survey_id = Some(survey_id);
        self
    }

    pub fn nickname_column(mut self, column: impl Into<String>) -> Self {
        self.nickname_column = Some(column.into());
        self
    }

    pub fn score_column(mut self, column: impl Into<String>) -> Self {
        self.score_column = Some(column.into());
        self
    }

    /// Override the default 15s connect / 25s overall timeouts
    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the configuration, validating the endpoint URL
    pub fn build(self) -> Result<LimeboardConfig> {
        let endpoint = self.endpoint.ok_or_else(|| missing("endpoint"))?;
        validate_endpoint(&endpoint)?;

        Ok(LimeboardConfig {
            endpoint: endpoint.trim().to_string(),
            credentials: self.credentials.ok_or_else(|| missing("credentials"))?,
            survey_id: self.survey_id.ok_or_else(|| missing("survey_id"))?,
            nickname_column: self.nickname_column.ok_or_else(|| missing("nickname_column"))?,
            score_column: self.score_column.ok_or_else(|| missing("score_column"))?,
            transport: self.transport.unwrap_or_default(),
        })
    }
}

fn missing(name: &str) -> Error {
    Error::Configuration(format!("missing setting: {}", name))
}

/// Leaderboard client for one survey
pub struct Limeboard<T> {
    transport: T,
    config: LimeboardConfig,
}

impl Limeboard<HttpTransport> {
    /// Create a client talking HTTP(S) to the configured endpoint
    pub fn connect(config: LimeboardConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.endpoint, &config.transport)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> Limeboard<T> {
    pub fn with_transport(transport: T, config: LimeboardConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &LimeboardConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch, decode and rank the survey responses.
    ///
    /// An empty leaderboard is a successful result; see [`Leaderboard::status`].
    pub fn fetch(&self) -> Result<Leaderboard> {
        info!("Fetching leaderboard for survey {}", self.config.survey_id);

        let sessions = SessionManager::new(&self.transport, &self.config.credentials);
        let board = sessions.with_session(|session| {
            let export = self.export_responses(session)?;
            let decoded = decode(export.result.as_ref())?;
            let mut board = leaderboard::build(
                &decoded.records,
                &self.config.nickname_column,
                &self.config.score_column,
            );
            board.skipped_elements = decoded.skipped;
            Ok(board)
        })?;

        match board.status() {
            BoardStatus::Ranked => info!(
                "Leaderboard ready: {} entries from {} records ({} skipped)",
                board.len(),
                board.records_seen,
                board.skipped_rows + board.skipped_elements
            ),
            BoardStatus::Empty(reason) => info!("Leaderboard is empty ({})", reason),
        }

        Ok(board)
    }

    /// Acquire and release a session without exporting anything
    pub fn check_credentials(&self) -> Result<()> {
        SessionManager::new(&self.transport, &self.config.credentials).with_session(|_| Ok(()))?;
        info!("Credentials accepted by {}", self.config.endpoint);
        Ok(())
    }

    fn export_responses(&self, session: &Session) -> Result<RpcResponse> {
        let request = RpcRequest::new(Method::ExportResponses, self.config.export_params(session));
        self.transport.call(&request)
    }
}
