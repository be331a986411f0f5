//! Client configuration from .env files, environment variables, and YAML.
//!
//! Priority: YAML > environment variables > defaults. `.env` values are read
//! by loading them into the environment at startup via `dotenvy`.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default number of questions per MCQ round.
pub const DEFAULT_ROUND_QUESTION_COUNT: usize = 5;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws/interview";
const DEFAULT_JOB_ROLE: &str = "Software Engineer";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Orchestrator client configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Hiring backend REST base URL
    pub api_base_url: String,
    /// Interview agent WebSocket endpoint
    pub ws_url: String,
    /// Position the candidate pipeline is configured for
    pub job_role: String,
    /// Questions presented per MCQ round
    pub round_question_count: usize,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            job_role: DEFAULT_JOB_ROLE.to_string(),
            round_question_count: DEFAULT_ROUND_QUESTION_COUNT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Optional overrides loaded from a YAML file. All fields optional so partial
/// files work.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct YamlConfig {
    api_base_url: Option<String>,
    ws_url: Option<String>,
    job_role: Option<String>,
    round_question_count: Option<usize>,
    request_timeout_secs: Option<u64>,
}

impl OrchestratorConfig {
    /// Load from environment variables over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("ORCHESTRATOR_API_BASE_URL") {
            config.api_base_url = value;
        }
        if let Ok(value) = std::env::var("ORCHESTRATOR_WS_URL") {
            config.ws_url = value;
        }
        if let Ok(value) = std::env::var("ORCHESTRATOR_JOB_ROLE") {
            config.job_role = value;
        }
        if let Ok(value) = std::env::var("ORCHESTRATOR_ROUND_QUESTION_COUNT") {
            config.round_question_count = value
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("bad round question count: {value}")))?;
        }
        if let Ok(value) = std::env::var("ORCHESTRATOR_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = value
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("bad request timeout: {value}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file, with environment variables filling the gaps.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_env()?;
        let raw = std::fs::read_to_string(path)?;
        let yaml: YamlConfig = serde_yaml::from_str(&raw)?;

        if let Some(value) = yaml.api_base_url {
            config.api_base_url = value;
        }
        if let Some(value) = yaml.ws_url {
            config.ws_url = value;
        }
        if let Some(value) = yaml.job_role {
            config.job_role = value;
        }
        if let Some(value) = yaml.round_question_count {
            config.round_question_count = value;
        }
        if let Some(value) = yaml.request_timeout_secs {
            config.request_timeout_secs = value;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let api = url::Url::parse(&self.api_base_url)
            .map_err(|e| ConfigError::Invalid(format!("api_base_url: {e}")))?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be http(s), got {}",
                api.scheme()
            )));
        }

        let ws = url::Url::parse(&self.ws_url)
            .map_err(|e| ConfigError::Invalid(format!("ws_url: {e}")))?;
        if !matches!(ws.scheme(), "ws" | "wss") {
            return Err(ConfigError::Invalid(format!(
                "ws_url must be ws(s), got {}",
                ws.scheme()
            )));
        }

        if self.round_question_count == 0 {
            return Err(ConfigError::Invalid(
                "round_question_count must be at least 1".to_string(),
            ));
        }
        if self.job_role.trim().is_empty() {
            return Err(ConfigError::Invalid("job_role must not be empty".to_string()));
        }
        Ok(())
    }
}
