use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

/// In-memory logger backing the status line
#[derive(Clone)]
pub struct AppLogger {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
    level: LevelFilter,
}

impl AppLogger {
    pub fn new(max_entries: usize, level: LevelFilter) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(max_entries))),
            max_entries,
            level,
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Most recent entry at info level or above
    pub fn latest(&self) -> Option<LogEntry> {
        self.entries()
            .iter()
            .rev()
            .find(|entry| entry.level <= Level::Info)
            .cloned()
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            message: record.args().to_string(),
        };

        let mut entries = self.entries();
        if entries.len() == self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record(logger: &AppLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_keeps_most_recent_entries() {
        let logger = AppLogger::new(2, LevelFilter::Info);
        record(&logger, Level::Info, "one");
        record(&logger, Level::Info, "two");
        record(&logger, Level::Warn, "three");

        assert_eq!(logger.entries().len(), 2);
        assert_eq!(logger.entries()[0].message, "two");
        assert_eq!(logger.latest().unwrap().message, "three");
    }

    #[test]
    fn test_status_skips_debug() {
        let logger = AppLogger::new(10, LevelFilter::Debug);
        record(&logger, Level::Info, "opened");
        record(&logger, Level::Debug, "cache hit");

        assert_eq!(logger.entries().len(), 2);
        assert_eq!(logger.latest().unwrap().message, "opened");
    }

    #[test]
    fn test_filters_below_level() {
        let logger = AppLogger::new(10, LevelFilter::Warn);
        record(&logger, Level::Info, "ignored");
        assert!(logger.latest().is_none());
    }
}
