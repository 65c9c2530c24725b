use std::path::Path;
use std::time::Duration;

use super::schema::{AlerterConfig, Config, DatabaseConfig};
use crate::threshold::ThresholdError;

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Validation(String),
    Threshold { check: String, error: ThresholdError },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::Threshold { check, error } => write!(f, "{check}: {error}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn load_from_file(path: &Path) -> Result<Config, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

pub fn load_from_str(yaml: &str) -> Result<Config, LoadError> {
    let cfg: Config = serde_yaml::from_str(yaml)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), LoadError> {
    let agent = &cfg.agent;
    if agent.directory.is_empty() {
        return Err(LoadError::Validation("agent.directory is required".into()));
    }
    if !agent.base_interval.is_finite() || agent.base_interval <= 0.0 {
        return Err(LoadError::Validation("agent.base_interval must be > 0".into()));
    }
    for (key, value) in [("timeout", agent.timeout), ("alert_timeout", agent.alert_timeout)] {
        if matches!(value, Some(v) if !v.is_finite() || v < 0.0) {
            return Err(LoadError::Validation(format!("agent.{key} must be >= 0")));
        }
    }
    for (key, value) in [
        ("base_interval", Some(agent.base_interval)),
        ("timeout", agent.timeout),
        ("alert_timeout", agent.alert_timeout),
    ] {
        if matches!(value, Some(v) if Duration::try_from_secs_f64(v).is_err()) {
            return Err(LoadError::Validation(format!("agent.{key} is too large")));
        }
    }

    if let DatabaseConfig::File { path } = &cfg.database {
        if path.is_empty() {
            return Err(LoadError::Validation("database.path must not be empty".into()));
        }
    }

    match &cfg.alerter {
        AlerterConfig::Slack { webhook_url, .. } if webhook_url.is_empty() => {
            return Err(LoadError::Validation(
                "alerter.webhook_url must not be empty".into(),
            ));
        }
        AlerterConfig::PagerDuty { token, service } if token.is_empty() || service.is_empty() => {
            return Err(LoadError::Validation(
                "alerter.token and alerter.service are required for pagerduty".into(),
            ));
        }
        _ => {}
    }
    Ok(())
}
