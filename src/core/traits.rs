//! Core traits for unirpc.
//!
//! The client reports what it is doing through [`Logger`] so that the
//! embedding service decides where the lines go.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Sink for the client's diagnostic output.
///
/// The client never fails because of logging; implementations must not
/// block for long since calls may be made while the connection lock is held.
///
/// # Example
///
/// ```
/// use std::fmt;
/// use unirpc::core::Logger;
///
/// struct Stderr;
///
/// impl Logger for Stderr {
///     fn debug(&self, args: fmt::Arguments<'_>) { eprintln!("DEBUG {args}"); }
///     fn info(&self, args: fmt::Arguments<'_>) { eprintln!("INFO {args}"); }
///     fn warn(&self, args: fmt::Arguments<'_>) { eprintln!("WARN {args}"); }
///     fn error(&self, args: fmt::Arguments<'_>) { eprintln!("ERROR {args}"); }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Fine-grained progress.
    fn debug(&self, args: fmt::Arguments<'_>);

    /// Lifecycle events.
    fn info(&self, args: fmt::Arguments<'_>);

    /// Recoverable failures, e.g. a transport error about to be retried.
    fn warn(&self, args: fmt::Arguments<'_>);

    /// Failures that end an operation.
    fn error(&self, args: fmt::Arguments<'_>);
}

/// Forwards to the `tracing` macros under the `unirpc` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "unirpc", "{}", args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "unirpc", "{}", args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(target: "unirpc", "{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(target: "unirpc", "{}", args);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _args: fmt::Arguments<'_>) {}
    fn info(&self, _args: fmt::Arguments<'_>) {}
    fn warn(&self, _args: fmt::Arguments<'_>) {}
    fn error(&self, _args: fmt::Arguments<'_>) {}
}

/// Severity of a captured log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// See [`Logger::debug`].
    Debug,
    /// See [`Logger::info`].
    Info,
    /// See [`Logger::warn`].
    Warn,
    /// See [`Logger::error`].
    Error,
}

/// Keeps every line in memory. Useful in tests and for surfacing recent
/// client activity in a health endpoint.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl MemoryLogger {
    /// Create an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines, oldest first.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Number of captured lines at `level`.
    pub fn count(&self, level: Level) -> usize {
        self.lines().iter().filter(|(l, _)| *l == level).count()
    }

    fn push(&self, level: Level, args: fmt::Arguments<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, args.to_string()));
        }
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Debug, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Info, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Warn, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Error, args);
    }
}
