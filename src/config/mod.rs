// Configuration management module
// Settings are resolved from the environment once at startup and passed
// into the pipeline by reference; nothing reads the environment after that.


use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "2023-05-15";
pub const DEFAULT_TEXT_FIELD: &str = "reviewText";
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 10;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 8000;

/// Connection settings for the embedding deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub endpoint: Url,
    pub api_key: String,
    pub api_version: String,
    pub deployment: String,
}

/// Connection settings for the computer-vision API.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionConfig {
    pub endpoint: Url,
    pub subscription_key: String,
}

/// Per-run pipeline settings, provided on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub text_field: String,
    pub checkpoint_interval: usize,
    pub max_text_chars: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid URL in {0}: {1}")]
    InvalidUrl(&'static str, String),
    #[error("Invalid API key (cannot be empty)")]
    InvalidApiKey,
    #[error("Invalid subscription key (cannot be empty)")]
    InvalidSubscriptionKey,
    #[error("Invalid deployment identifier (cannot be empty)")]
    InvalidDeployment,
    #[error("Invalid checkpoint interval: {0} (must be at least 1)")]
    InvalidCheckpointInterval(usize),
    #[error("Invalid text length limit: {0} (must be at least 1)")]
    InvalidMaxTextChars(usize),
}

impl EmbeddingConfig {
    /// Resolve embedding service settings from the environment. Fails fast
    /// before any network activity when a required variable is missing.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = require_var("OPENAI_API_BASE")?;
        let endpoint = Url::parse(&endpoint)
            .map_err(|_| ConfigError::InvalidUrl("OPENAI_API_BASE", endpoint))?;

        let config = Self {
            endpoint,
            api_key: require_var("OPENAI_API_KEY")?,
            api_version: env::var("OPENAI_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            deployment: require_var("DEPLOYMENT_ID")?,
        };

        config.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidApiKey);
        }
        if self.deployment.trim().is_empty() {
            return Err(ConfigError::InvalidDeployment);
        }
        Ok(())
    }
}

impl VisionConfig {
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(
            &require_var("VISION_ENDPOINT")?,
            require_var("VISION_SUBSCRIPTION_KEY")?,
        )
    }

    #[inline]
    pub fn new(endpoint: &str, subscription_key: String) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|_| ConfigError::InvalidUrl("VISION_ENDPOINT", endpoint.to_string()))?;

        if subscription_key.trim().is_empty() {
            return Err(ConfigError::InvalidSubscriptionKey);
        }

        Ok(Self {
            endpoint,
            subscription_key,
        })
    }
}

impl PipelineConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::InvalidCheckpointInterval(
                self.checkpoint_interval,
            ));
        }
        if self.max_text_chars == 0 {
            return Err(ConfigError::InvalidMaxTextChars(self.max_text_chars));
        }
        Ok(())
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
