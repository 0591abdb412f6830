//! Configuration file and environment handling.
//!
//! Settings come from an optional TOML file and from environment variables,
//! the latter taking precedence:
//!
//! ```toml
//! [api]
//! url = "https://survey.example.org/index.php/admin/remotecontrol"
//! username = "leaderboard"
//! password = "..."
//! survey_id = 123456
//! auth_source = ""          # e.g. "AuthLDAP"
//!
//! [columns]
//! nickname = "nickname"
//! score = "score"
//!
//! [display]
//! title = "🏆 Live Leaderboard"
//! points_suffix = "points"
//!
//! [http]
//! connect_timeout_secs = 15
//! timeout_secs = 25
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::board::LimeboardConfig;
use crate::error::{Error, Result};
use crate::rpc::TransportConfig;
use crate::session::Credentials;

pub mod env {
    pub const API_URL: &str = "LIMESURVEY_API_URL";
    pub const USERNAME: &str = "LIMESURVEY_USERNAME";
    pub const PASSWORD: &str = "LIMESURVEY_PASSWORD";
    pub const SURVEY_ID: &str = "LIMESURVEY_SURVEY_ID";
    pub const AUTH_SOURCE: &str = "LIMESURVEY_AUTH_SOURCE";
    pub const COLUMN_NICKNAME: &str = "COLUMN_NICKNAME";
    pub const COLUMN_SCORE: &str = "COLUMN_SCORE";
    pub const TITLE: &str = "LEADERBOARD_TITLE";
    pub const SEARCH_PLACEHOLDER: &str = "SEARCH_PLACEHOLDER";
    pub const NO_RESULTS_MESSAGE: &str = "NO_RESULTS_MESSAGE";
    pub const NO_SCORES_MESSAGE: &str = "NO_SCORES_MESSAGE";
    pub const POINTS_SUFFIX: &str = "POINTS_SUFFIX";
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api: ApiSection,
    pub columns: ColumnsSection,
    pub display: DisplayConfig,
    pub http: HttpSection,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSection {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub survey_id: Option<SurveyIdSetting>,
    pub auth_source: Option<String>,
}

impl std::fmt::Debug for ApiSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSection")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("survey_id", &self.survey_id)
            .field("auth_source", &self.auth_source)
            .finish()
    }
}

/// Survey ids may be written as a TOML integer or string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SurveyIdSetting {
    Number(u64),
    Text(String),
}

impl SurveyIdSetting {
    fn parse(&self) -> Result<u64> {
        let id = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<u64>().ok(),
        };
        id.filter(|id| *id > 0).ok_or_else(|| {
            Error::Configuration(format!(
                "invalid setting {}: expected a positive integer survey id",
                env::SURVEY_ID
            ))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsSection {
    pub nickname: Option<String>,
    pub score: Option<String>,
}

/// User-facing strings of the rendered leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub title: String,
    pub search_placeholder: String,
    pub no_results_message: String,
    pub no_scores_message: String,
    pub points_suffix: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "🏆 Live Leaderboard".to_string(),
            search_placeholder: "Search by nickname...".to_string(),
            no_results_message: "No nickname found.".to_string(),
            no_scores_message: "No valid scores to display yet.".to_string(),
            points_suffix: "points".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        let defaults = TransportConfig::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

impl HttpSection {
    /// Transport timeouts, rejecting zero durations
    pub fn validated(&self) -> Result<TransportConfig> {
        for (name, secs) in [
            ("http.connect_timeout_secs", self.connect_timeout_secs),
            ("http.timeout_secs", self.timeout_secs),
        ] {
            if secs == 0 {
                return Err(Error::Configuration(format!(
                    "invalid setting {}: timeout must be at least 1 second",
                    name
                )));
            }
        }
        Ok(self.transport_config())
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Config {
    /// Load a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Override settings from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override settings from a key lookup. Unset keys leave values untouched.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overridden = Vec::new();
        let mut set = |key: &'static str, slot: &mut Option<String>| {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
                overridden.push(key);
            }
        };

        set(env::API_URL, &mut self.api.url);
        set(env::USERNAME, &mut self.api.username);
        set(env::PASSWORD, &mut self.api.password);
        set(env::AUTH_SOURCE, &mut self.api.auth_source);
        set(env::COLUMN_NICKNAME, &mut self.columns.nickname);
        set(env::COLUMN_SCORE, &mut self.columns.score);

        let mut survey_id = None;
        set(env::SURVEY_ID, &mut survey_id);
        if let Some(id) = survey_id {
            self.api.survey_id = Some(SurveyIdSetting::Text(id));
        }

        let display = &mut self.display;
        for (key, slot) in [
            (env::TITLE, &mut display.title),
            (env::SEARCH_PLACEHOLDER, &mut display.search_placeholder),
            (env::NO_RESULTS_MESSAGE, &mut display.no_results_message),
            (env::NO_SCORES_MESSAGE, &mut display.no_scores_message),
            (env::POINTS_SUFFIX, &mut display.points_suffix),
        ] {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = value;
                overridden.push(key);
            }
        }

        if !overridden.is_empty() {
            debug!("Settings from environment: {}", overridden.join(", "));
        }
    }

    /// Check required settings and produce the fetch configuration.
    ///
    /// Fails with [`Error::Configuration`] naming the first missing setting.
    pub fn resolve(&self) -> Result<LimeboardConfig> {
        let url = required(&self.api.url, env::API_URL)?;
        let username = required(&self.api.username, env::USERNAME)?;
        let password = self
            .api
            .password
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing(env::PASSWORD))?;
        let survey_id = self
            .api
            .survey_id
            .as_ref()
            .ok_or_else(|| missing(env::SURVEY_ID))?
            .parse()?;
        let nickname = required(&self.columns.nickname, env::COLUMN_NICKNAME)?;
        let score = required(&self.columns.score, env::COLUMN_SCORE)?;

        let mut credentials = Credentials::new(username, password);
        if let Some(source) = &self.api.auth_source {
            credentials = credentials.with_auth_source(source.as_str());
        }

        LimeboardConfig::builder()
            .endpoint(url)
            .credentials(credentials)
            .survey_id(survey_id)
            .nickname_column(nickname)
            .score_column(score)
            .transport(self.http.validated()?)
            .build()
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(name))
}

fn missing(name: &str) -> Error {
    Error::Configuration(format!("missing setting: {}", name))
}
