//! CLI command implementations.

pub mod check;
pub mod show;

use anyhow::{Context, Result};
use limeboard::Config;
use limeboard::config::SurveyIdSetting;
use tracing::{debug, info};

use crate::cli::Cli;

/// Build the configuration: file < environment < command line
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if cli.config.exists() {
        let config = Config::load(&cli.config)
            .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
        info!("Loaded config from {:?}", cli.config);
        config
    } else {
        debug!("No config file at {:?}, using environment only", cli.config);
        Config::default()
    };

    config.apply_env();

    if let Some(id) = &cli.survey_id {
        config.api.survey_id = Some(SurveyIdSetting::Text(id.clone()));
    }
    if let Some(column) = &cli.nickname_column {
        config.columns.nickname = Some(column.clone());
    }
    if let Some(column) = &cli.score_column {
        config.columns.score = Some(column.clone());
    }
    if let Some(source) = &cli.auth_source {
        config.api.auth_source = Some(source.clone());
    }

    Ok(config)
}
