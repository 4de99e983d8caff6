//! Logging channels used while building and running the launcher

use std::sync::Mutex;
use tracing::Level;

/// Four severity channels a run reports to
pub trait Log {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// Send a message to the channel matching `level`
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => self.error(message),
            Level::WARN => self.warn(message),
            Level::INFO => self.info(message),
            _ => self.debug(message),
        }
    }
}

/// Forwards every channel to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl Log for TracingLog {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "junit_platform_starter", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "junit_platform_starter", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "junit_platform_starter", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "junit_platform_starter", "{}", message);
    }
}

/// Keeps every message in memory, in order
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push((level, message.to_string()));
        }
    }

    /// All records so far
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Messages sent to one channel
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Log for MemoryLog {
    fn debug(&self, message: &str) {
        self.push(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::ERROR, message);
    }
}
