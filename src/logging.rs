//! Global logger wiring. Library code logs through `slog_scope`; the
//! consuming binary decides the drain through `LoggerBuilder`

use std::sync::Mutex;

use once_cell::sync::OnceCell;
use slog::{Drain, Level};
use slog_scope::GlobalLoggerGuard;
use thiserror::Error;

pub struct LoggerBuilder {
    level: Level,
}

/// Keeps the global logger alive; drop it last
pub struct Logger(Level, GlobalLoggerGuard);

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log level {0:?}")]
    BadLevel(String),
}

impl LoggerBuilder {
    pub fn with_env() -> Result<Self, LogError> {
        let mut builder = Self::default();

        if let Ok(env) = std::env::var("COAST_LOG") {
            let level = env.parse().map_err(|_| LogError::BadLevel(env.clone()))?;
            builder = builder.level(level);
        }

        Ok(builder)
    }

    pub fn level(mut self, s: Level) -> Self {
        self.level = s;
        self
    }

    pub fn init(self) -> Logger {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::CompactFormat::new(decorator).build().fuse();
        let drain = drain.filter_level(self.level).fuse();
        let drain = slog_async::Async::new(drain)
            .thread_name("logging".to_owned())
            .chan_size(1024)
            .build_no_guard()
            .fuse();
        let logger = slog::Logger::root(drain, slog::o!());

        let global = slog_scope::set_global_logger(logger);
        Logger(self.level, global)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self { level: Level::Info }
    }
}

impl Logger {
    pub fn level(&self) -> Level {
        self.0
    }
}

static TEST_LOGGER: OnceCell<GlobalLoggerGuard> = OnceCell::new();

/// Global logger for unit tests
#[allow(dead_code)]
pub fn for_tests() {
    TEST_LOGGER.get_or_init(|| {
        let drain = slog_term::TermDecorator::new().stdout().build();
        let drain = slog_term::CompactFormat::new(drain).build();
        let drain = Mutex::new(drain).fuse();
        let logger = slog::Logger::root(drain, slog::o!());
        slog_scope::set_global_logger(logger)
    });
}
