// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured log sink passed explicitly to every sync operation.

use log::Level;
use std::error::Error;
use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};

/// A log sink accepting a severity, a message and an optional cause.
pub trait SyncLogger: Send + Sync {
    /// Records one entry.
    fn log(&self, level: Level, message: &str, cause: Option<&(dyn Error + 'static)>);
}

/// Forwards entries to the [`log`] facade under the `ferrosync` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl SyncLogger for LogFacade {
    fn log(&self, level: Level, message: &str, cause: Option<&(dyn Error + 'static)>) {
        match cause {
            Some(cause) => log::log!(target: "ferrosync", level, "{message}: {}", render_chain(cause)),
            None => log::log!(target: "ferrosync", level, "{message}"),
        }
    }
}

/// Renders an error and its `source()` chain on one line.
pub fn render_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let _ = write!(rendered, " (caused by: {inner})");
        source = inner.source();
    }
    rendered
}

/// One entry captured by a [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity of the entry.
    pub level: Level,
    /// The message as supplied.
    pub message: String,
    /// The rendered cause chain, if any.
    pub cause: Option<String>,
}

/// Keeps every entry in memory; also forwards to the `log` facade.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    /// Creates an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of all recorded entries, oldest first.
    pub fn entries(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many entries were recorded at exactly `level`.
    pub fn count_at(&self, level: Level) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.level == level)
            .count()
    }

    /// Whether any message or cause contains `fragment`.
    pub fn contains(&self, fragment: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|record| {
                record.message.contains(fragment)
                    || record.cause.as_deref().is_some_and(|c| c.contains(fragment))
            })
    }
}

impl SyncLogger for MemoryLogger {
    fn log(&self, level: Level, message: &str, cause: Option<&(dyn Error + 'static)>) {
        LogFacade.log(level, message, cause);
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogRecord {
                level,
                message: message.to_string(),
                cause: cause.map(render_chain),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(Inner);
    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "outer")
        }
    }
    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "inner")
        }
    }
    impl Error for Inner {}
    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn memory_logger_records_cause_chain() {
        let logger = MemoryLogger::new();
        logger.log(Level::Warn, "dropped a category", Some(&Outer(Inner)));
        logger.log(Level::Info, "done", None);

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].cause.as_deref(), Some("outer (caused by: inner)"));
        assert_eq!(logger.count_at(Level::Warn), 1);
        assert!(logger.contains("inner"));
        assert!(!logger.contains("missing"));
    }
}
