//! Audit line structures

use crate::tags::tag_prefix;
use std::fmt;

/// Phase of an intercepted call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the call runs
    Entry,
    /// After the call returned normally
    Return,
    /// After the call failed
    Error,
}

/// Severity of an audit line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Entry and return lines
    Info,
    /// Failure lines
    Error,
}

impl Severity {
    /// Severity name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit line, built and flushed immediately
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Call phase
    pub phase: Phase,

    /// `<owner>.<method>`
    pub qualified_method_name: String,

    /// Application name, rendered as `[ name ] - ` before the tags
    pub application: Option<String>,

    /// Context tags in registration order
    pub prefix_tags: Vec<String>,

    /// Everything after the method name (`Arguments: ...`, `Returned: ...`, `Exception: ...`)
    pub body: String,
}

impl LogEvent {
    /// Create an event
    pub fn new(
        phase: Phase,
        qualified_method_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            qualified_method_name: qualified_method_name.into(),
            application: None,
            prefix_tags: Vec::new(),
            body: body.into(),
        }
    }

    /// Set the context tags
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.prefix_tags = tags;
        self
    }

    /// Set the application name
    pub fn application(mut self, application: Option<String>) -> Self {
        self.application = application;
        self
    }

    /// Severity the line is emitted at
    pub fn severity(&self) -> Severity {
        match self.phase {
            Phase::Error => Severity::Error,
            Phase::Entry | Phase::Return => Severity::Info,
        }
    }

    /// The formatted line
    ///
    /// # Examples
    ///
    /// ```
    /// use callaudit_core::*;
    ///
    /// let event = LogEvent::new(Phase::Return, "app::Service.find", "Returned: 42")
    ///     .tags(vec!["req-1".to_string()]);
    ///
    /// assert_eq!(event.line(), "[ req-1 ] Exiting <<< app::Service.find Returned: 42");
    /// ```
    pub fn line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(application) = &self.application {
            write!(f, "[ {} ] - ", application)?;
        }

        let marker = match self.phase {
            Phase::Entry => "Entering >>>",
            Phase::Return | Phase::Error => "Exiting <<<",
        };

        write!(
            f,
            "{}{} {} {}",
            tag_prefix(&self.prefix_tags),
            marker,
            self.qualified_method_name,
            self.body
        )
    }
}
