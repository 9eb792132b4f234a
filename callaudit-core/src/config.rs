//! Engine configuration
//!
//! Loaded from `CALLAUDIT_*` environment variables or a TOML document:
//!
//! ```toml
//! enabled = true
//! application_name = "billing"
//! sink = "file"
//! file = "/var/log/billing/audit.log"
//! error_file = "/var/log/billing/audit-error.log"
//! ```

use crate::ConfigError;
use crate::sink::{AUDIT_TARGET, ConsoleFormat, ERROR_TARGET};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CALLAUDIT_";

/// Kind of sink built by [`AuditEngine::from_config`](crate::AuditEngine::from_config)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// `tracing` events
    #[default]
    Tracing,
    /// The `log` facade
    Log,
    /// Timestamped stderr lines
    Console,
    /// Append-only file
    File,
}

impl SinkKind {
    /// Parse a sink name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tracing" => Some(SinkKind::Tracing),
            "log" => Some(SinkKind::Log),
            "console" | "stderr" => Some(SinkKind::Console),
            "file" => Some(SinkKind::File),
            _ => None,
        }
    }
}

/// Audit engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Master switch; a disabled engine emits nothing
    pub enabled: bool,

    /// Application name prefixed to every line as `[ name ] - `
    pub application_name: Option<String>,

    /// Sink for entry and return lines (and failure lines without `error_file`)
    pub sink: SinkKind,

    /// Audit file, required by [`SinkKind::File`]
    pub file: Option<PathBuf>,

    /// Dedicated file for failure lines
    pub error_file: Option<PathBuf>,

    /// `log` target for entry and return lines
    pub info_target: String,

    /// `log` target for failure lines
    pub error_target: String,

    /// Format of [`SinkKind::Console`]
    pub console_format: ConsoleFormat,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            application_name: None,
            sink: SinkKind::default(),
            file: None,
            error_file: None,
            info_target: AUDIT_TARGET.to_string(),
            error_target: ERROR_TARGET.to_string(),
            console_format: ConsoleFormat::default(),
        }
    }
}

impl AuditConfig {
    /// Configuration with every value at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `CALLAUDIT_*` environment variables.
    ///
    /// Recognized: `ENABLED`, `APP_NAME`, `SINK`, `FILE`, `ERROR_FILE`,
    /// `CONSOLE_FORMAT`, `INFO_TARGET`, `ERROR_TARGET`. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    /// Load configuration from a key lookup (keys without the prefix)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("ENABLED") {
            config.enabled = parse_bool(&value).ok_or_else(|| invalid("ENABLED", &value))?;
        }

        if let Some(value) = lookup("APP_NAME")
            && !value.is_empty()
        {
            config.application_name = Some(value);
        }

        if let Some(value) = lookup("SINK") {
            config.sink = SinkKind::parse(&value).ok_or_else(|| invalid("SINK", &value))?;
        }

        if let Some(value) = lookup("FILE") {
            config.file = Some(PathBuf::from(value));
        }

        if let Some(value) = lookup("ERROR_FILE") {
            config.error_file = Some(PathBuf::from(value));
        }

        if let Some(value) = lookup("CONSOLE_FORMAT") {
            config.console_format =
                ConsoleFormat::parse(&value).ok_or_else(|| invalid("CONSOLE_FORMAT", &value))?;
        }

        if let Some(value) = lookup("INFO_TARGET") {
            config.info_target = value;
        }

        if let Some(value) = lookup("ERROR_TARGET") {
            config.error_target = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set the master switch
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the application name
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Set the sink kind
    pub fn sink(mut self, sink: SinkKind) -> Self {
        self.sink = sink;
        self
    }

    /// Set the audit file
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Set the dedicated failure file
    pub fn error_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_file = Some(path.into());
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sink == SinkKind::File && self.file.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "file".to_string(),
                value: "a file sink needs a path".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, key),
        value: value.to_string(),
    }
}
