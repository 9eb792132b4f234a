//! Error types

use thiserror::Error;

/// Errors raised by an audit sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink is closed")]
    Closed,

    #[error("Sink error: {0}")]
    Other(String),
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Errors surfaced by the audit API.
///
/// None of these ever reach the caller of an audited method; the hooks
/// swallow them after recording them through the fallback channel.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("A global audit engine is already installed")]
    AlreadyInstalled,
}

pub type Result<T> = std::result::Result<T, AuditError>;
