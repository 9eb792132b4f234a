//! Audit line destinations

use crate::{Severity, SinkError};
use parking_lot::Mutex;
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `tracing` target of entry and return lines
pub const AUDIT_TARGET: &str = "callaudit";

/// `tracing` target of failure lines
pub const ERROR_TARGET: &str = "callaudit::error";

/// Destination of formatted audit lines
pub trait AuditSink: Send + Sync {
    /// Write one line at the given severity
    fn emit(&self, severity: Severity, line: &str) -> Result<(), SinkError>;

    /// Flush any pending writes
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink emitting `tracing` events.
///
/// Entry and return lines go to [`AUDIT_TARGET`] at info level, failure lines
/// to [`ERROR_TARGET`] at error level, so a subscriber can route them apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a tracing sink
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingSink {
    fn emit(&self, severity: Severity, line: &str) -> Result<(), SinkError> {
        match severity {
            Severity::Info => tracing::info!(target: AUDIT_TARGET, "{}", line),
            Severity::Error => tracing::error!(target: ERROR_TARGET, "{}", line),
        }
        Ok(())
    }
}

/// Sink writing through the `log` facade
#[derive(Debug, Clone)]
pub struct FacadeSink {
    info_target: String,
    error_target: String,
}

impl FacadeSink {
    /// Create a facade sink with the default targets
    pub fn new() -> Self {
        Self::with_targets(AUDIT_TARGET, ERROR_TARGET)
    }

    /// Create a facade sink with custom targets
    pub fn with_targets(info_target: impl Into<String>, error_target: impl Into<String>) -> Self {
        Self {
            info_target: info_target.into(),
            error_target: error_target.into(),
        }
    }
}

impl Default for FacadeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for FacadeSink {
    fn emit(&self, severity: Severity, line: &str) -> Result<(), SinkError> {
        match severity {
            Severity::Info => log::info!(target: self.info_target.as_str(), "{}", line),
            Severity::Error => log::error!(target: self.error_target.as_str(), "{}", line),
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        log::logger().flush();
        Ok(())
    }
}

/// Output format of [`ConsoleSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// Date, time, padded level, line
    #[default]
    Pretty,
    /// Time, level initial, line
    Compact,
}

impl ConsoleFormat {
    /// Parse a format name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(ConsoleFormat::Pretty),
            "compact" => Some(ConsoleFormat::Compact),
            _ => None,
        }
    }
}

/// Sink writing timestamped lines to stderr
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    format: ConsoleFormat,
    timestamps: bool,
}

impl ConsoleSink {
    /// Create a console sink
    pub fn new(format: ConsoleFormat) -> Self {
        Self {
            format,
            timestamps: true,
        }
    }

    /// Enable or disable timestamps
    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    fn format_line(&self, severity: Severity, line: &str) -> String {
        let mut out = String::new();
        match self.format {
            ConsoleFormat::Pretty => {
                if self.timestamps {
                    let now = chrono::Local::now();
                    out.push_str(&now.format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
                }
                out.push_str(&format!("{:5} ", severity.as_str()));
            }
            ConsoleFormat::Compact => {
                if self.timestamps {
                    let now = chrono::Local::now();
                    out.push_str(&now.format("%H:%M:%S ").to_string());
                }
                out.push(severity.as_str().chars().next().unwrap_or('?'));
                out.push(' ');
            }
        }
        out.push_str(line);
        out
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(ConsoleFormat::default())
    }
}

impl AuditSink for ConsoleSink {
    fn emit(&self, severity: Severity, line: &str) -> Result<(), SinkError> {
        let formatted = self.format_line(severity, line);
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", formatted)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        std::io::stderr().flush()?;
        Ok(())
    }
}

/// File-based sink
///
/// Appends one line per event, prefixed with an RFC 3339 timestamp and the
/// severity. The file is opened on first write.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    /// Create a new file sink
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use callaudit_core::*;
    ///
    /// let sink = FileSink::new("audit.log");
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    /// Path written to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileSink {
    fn emit(&self, severity: Severity, line: &str) -> Result<(), SinkError> {
        let mut guard = self.file.lock();
        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            *guard = Some(file);
        }
        let file = guard.as_mut().ok_or(SinkError::Closed)?;

        let record = format!(
            "{} {:5} {}\n",
            chrono::Utc::now().to_rfc3339(),
            severity.as_str(),
            line
        );
        file.write_all(record.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        if let Some(file) = self.file.lock().as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Memory sink for testing
///
/// Stores emitted lines in memory; clones share the same storage.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl MemorySink {
    /// Create a new memory sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines with their severity
    pub fn records(&self) -> Vec<(Severity, String)> {
        self.lines.lock().clone()
    }

    /// All lines
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    /// Lines emitted at a given severity
    pub fn lines_at(&self, severity: Severity) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Number of stored lines
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Clear all lines
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl AuditSink for MemorySink {
    fn emit(&self, severity: Severity, line: &str) -> Result<(), SinkError> {
        self.lines.lock().push((severity, line.to_string()));
        Ok(())
    }
}

/// Multiple sink wrapper
///
/// Writes to every sink, even when an earlier one fails, and reports the
/// first error.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl MultiSink {
    /// Create an empty multi-sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    pub fn with_sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }
}

impl AuditSink for MultiSink {
    fn emit(&self, severity: Severity, line: &str) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.emit(severity, line) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn flush(&self) -> Result<(), SinkError> {
        for sink in &self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn emit(&self, severity: Severity, line: &str) -> Result<(), SinkError> {
        (**self).emit(severity, line)
    }

    fn flush(&self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
