use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

/// Debug topics understood by `--debug-filter`
pub const TOPICS: [&str; 5] = ["pool", "tank", "rocket", "input", "game"];

#[derive(Debug)]
struct TankArLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

impl TankArLogger {
    // Debug and trace records only pass when their target matches a filter topic
    fn topic_enabled(&self, metadata: &Metadata) -> bool {
        match &self.debug_filters {
            Some(filters) if metadata.level() >= log::Level::Debug => filters
                .iter()
                .any(|f| metadata.target() == f || metadata.target().starts_with(f.as_str())),
            _ => true,
        }
    }
}

impl log::Log for TankArLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && self.topic_enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m",
            log::Level::Warn => "\x1B[33m",
            log::Level::Info => "\x1B[32m",
            log::Level::Debug => "\x1B[36m",
            log::Level::Trace => "\x1B[35m",
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        let mut stdout = io::stdout().lock();
        // A closed stdout is not worth panicking over
        let _ = writeln!(
            stdout,
            "{timestamp} {level_color}{level:5}{reset} {target}: {message}",
            level = record.level(),
            target = record.target(),
            message = record.args()
        );
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: OnceLock<TankArLogger> = OnceLock::new();

/// Parses a comma-separated topic list, e.g. "pool,rocket".
pub fn parse_debug_filter(filter: &str) -> HashSet<String> {
    filter
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses a level name, falling back to `Info` for anything unknown.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Installs the logger with optional debug topic filters
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| TankArLogger {
        level,
        debug_filters: debug_filter.as_deref().map(parse_debug_filter),
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

// Topic macros. The `frame:` form prefixes the frame number.
#[macro_export]
macro_rules! debug_pool {
    (frame: $frame:expr, $($arg:tt)*) => {
        log::debug!(target: "pool", "[F{:05}] {}", $frame, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "pool", $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_tank {
    (frame: $frame:expr, $($arg:tt)*) => {
        log::debug!(target: "tank", "[F{:05}] {}", $frame, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "tank", $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_rocket {
    (frame: $frame:expr, $($arg:tt)*) => {
        log::debug!(target: "rocket", "[F{:05}] {}", $frame, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "rocket", $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_input {
    (frame: $frame:expr, $($arg:tt)*) => {
        log::debug!(target: "input", "[F{:05}] {}", $frame, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "input", $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_game {
    (frame: $frame:expr, $($arg:tt)*) => {
        log::debug!(target: "game", "[F{:05}] {}", $frame, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "game", $($arg)*)
    };
}
