//! Failures observed at the error phase of an audited call

use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

/// A failure produced by the wrapped call: an error value or a panic.
///
/// The engine only reads it; the original error or panic payload always
/// travels back to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Type name of the error (`panic` for panics)
    pub type_name: String,

    /// Error message
    pub message: String,

    /// Stack frames, one entry per line of the error block
    pub frames: Vec<String>,
}

impl Failure {
    /// Create a failure without frames
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            frames: Vec::new(),
        }
    }

    /// Append a frame
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Append the current stack
    pub fn with_backtrace(mut self) -> Self {
        self.frames.extend(capture_frames());
        self
    }

    /// Failure from any displayable error value, with the current stack.
    pub fn from_display<E>(error: &E) -> Self
    where
        E: fmt::Display + ?Sized,
    {
        Self::new(std::any::type_name::<E>(), error.to_string()).with_backtrace()
    }

    /// Failure from an error, with the current stack followed by its source chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use callaudit_core::Failure;
    ///
    /// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    /// let failure = Failure::from_error(&error);
    ///
    /// assert_eq!(failure.type_name, "std::io::error::Error");
    /// assert_eq!(failure.message, "missing");
    /// ```
    pub fn from_error<E>(error: &E) -> Self
    where
        E: Error + ?Sized,
    {
        let mut failure = Self::from_display(error);
        let mut source = error.source();
        while let Some(cause) = source {
            failure.frames.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        failure
    }

    /// Failure from a panic payload, with the stack at the point it was caught.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        Self::new("panic", panic_message(payload)).with_backtrace()
    }
}

/// Message carried by a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

/// Current stack, one frame per entry, without the frames of the capture itself
fn capture_frames() -> Vec<String> {
    let trace = Backtrace::force_capture().to_string();
    let mut frames: Vec<String> = Vec::new();

    for line in trace.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Source locations follow their symbol on a separate line
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.push_str(" (");
                last.push_str(location);
                last.push(')');
            }
            continue;
        }

        let symbol = match line.split_once(": ") {
            Some((index, symbol)) if index.chars().all(|c| c.is_ascii_digit()) => symbol,
            _ => line,
        };
        frames.push(symbol.to_string());
    }

    let skip = frames
        .iter()
        .position(|frame| !is_capture_frame(frame))
        .unwrap_or(0);
    frames.drain(..skip);
    frames
}

fn is_capture_frame(frame: &str) -> bool {
    frame.starts_with("std::backtrace") || frame.starts_with("callaudit_core::failure")
}
