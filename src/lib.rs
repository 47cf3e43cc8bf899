use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisionflowError>;

#[derive(Error, Debug)]
pub enum VisionflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Embedding service error: {0}")]
    Service(String),

    #[error("Vision service error: {0}")]
    Vision(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod dataset;
pub mod embeddings;
pub mod http;
pub mod pipeline;
pub mod vision;
