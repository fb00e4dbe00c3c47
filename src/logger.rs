use std::cell::RefCell;
use std::rc::Rc;

/// Sink for everything the console reports back to the user.
///
/// Calls never fail and never return anything; a sink that cannot display a
/// message simply drops it.
pub trait Logger {
    fn info(&self, message: &str);

    fn error(&self, message: &str);

    /// The value produced by an evaluated line. Hosts usually render it in a
    /// distinct style.
    fn result(&self, message: &str) {
        self.info(message);
    }
}

/// Forwards console output to `tracing` events. Used when the host does not
/// supply its own sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "console", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "console", "{message}");
    }

    fn result(&self, message: &str) {
        tracing::info!(target: "console", result = true, "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Memory-backed logger that records every entry.
///
/// Useful for embedding hosts that render the log themselves, and for tests.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Rc<RefCell<Vec<LogEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: create a logger and return (logger, handle) so the caller
    /// can read the entries after handing the logger to the interpreter.
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<LogEntry>>>) {
        let logger = Self::new();
        let handle = logger.entries.clone();
        (logger, handle)
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries.borrow_mut().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }

    fn result(&self, message: &str) {
        self.push(LogLevel::Result, message);
    }
}
