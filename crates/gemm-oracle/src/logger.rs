use core::fmt::Display;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

/// Configuration of the oracle logger.
///
/// Note that multiple sinks can be enabled at the same time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or overwrite it (false). Defaults to true.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional crate-level logging configuration (e.g., info, debug, trace).
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    #[serde(default)]
    pub level: OracleLogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: OracleLogLevel::default(),
        }
    }
}

fn append_default() -> bool {
    true
}

/// Log levels using the `log` crate.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum LogCrateLevel {
    #[default]
    #[serde(rename = "info")]
    Info,

    #[serde(rename = "debug")]
    Debug,

    #[serde(rename = "trace")]
    Trace,
}

/// Verbosity of the oracle logger.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
pub enum OracleLogLevel {
    #[serde(rename = "disabled")]
    Disabled,

    /// Seed, host fallbacks, failures and the suite summary.
    #[default]
    #[serde(rename = "basic")]
    Basic,

    /// Everything in [Basic](OracleLogLevel::Basic), plus every executed case.
    #[serde(rename = "full")]
    Full,
}

/// Fans oracle messages out to the configured sinks.
#[derive(Debug)]
pub struct Logger {
    loggers: Vec<LoggerKind>,
    level: OracleLogLevel,
}

impl Logger {
    /// Creates a logger with the sinks of `config`.
    ///
    /// A log file that can't be opened is reported through the `log` crate and skipped.
    pub fn new(config: &LoggerConfig) -> Self {
        let mut loggers = Vec::new();

        if config.level == OracleLogLevel::Disabled {
            return Self::disabled();
        }

        if let Some(path) = &config.file {
            match FileLogger::new(path, config.append) {
                Ok(logger) => loggers.push(LoggerKind::File(logger)),
                Err(err) => log::warn!("Unable to open log file {path:?}: {err}"),
            }
        }

        if config.stdout {
            loggers.push(LoggerKind::Stdout);
        }

        if config.stderr {
            loggers.push(LoggerKind::Stderr);
        }

        if let Some(level) = config.log {
            loggers.push(LoggerKind::Log(level));
        }

        Self {
            loggers,
            level: config.level,
        }
    }

    /// A logger without any sink.
    pub fn disabled() -> Self {
        Self {
            loggers: Vec::new(),
            level: OracleLogLevel::Disabled,
        }
    }

    pub fn level(&self) -> OracleLogLevel {
        self.level
    }

    /// Logs a message shown from the [basic](OracleLogLevel::Basic) level.
    pub fn log_basic<S: Display>(&mut self, msg: &S) {
        if self.level >= OracleLogLevel::Basic {
            self.log(msg);
        }
    }

    /// Logs a message shown only at the [full](OracleLogLevel::Full) level.
    pub fn log_full<S: Display>(&mut self, msg: &S) {
        if self.level >= OracleLogLevel::Full {
            self.log(msg);
        }
    }

    fn log<S: Display>(&mut self, msg: &S) {
        match self.loggers.as_mut_slice() {
            [] => {}
            [logger] => logger.log(msg),
            loggers => {
                let msg = msg.to_string();
                for logger in loggers {
                    logger.log(&msg);
                }
            }
        }
    }
}

#[derive(Debug)]
enum LoggerKind {
    File(FileLogger),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

impl LoggerKind {
    fn log<S: Display>(&mut self, msg: &S) {
        match self {
            LoggerKind::File(file_logger) => file_logger.log(msg),
            LoggerKind::Stdout => println!("{msg}"),
            LoggerKind::Stderr => eprintln!("{msg}"),
            LoggerKind::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

#[derive(Debug)]
struct FileLogger {
    writer: BufWriter<File>,
}

impl FileLogger {
    fn new(path: &PathBuf, append: bool) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    // Logs a message to the file, flushing the buffer to ensure immediate write.
    fn log<S: Display>(&mut self, msg: &S) {
        let result = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());
        if let Err(err) = result {
            log::warn!("Unable to write oracle log: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(OracleLogLevel::Disabled < OracleLogLevel::Basic);
        assert!(OracleLogLevel::Basic < OracleLogLevel::Full);
    }

    #[test]
    fn file_sink_respects_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oracle.log");
        let config = LoggerConfig {
            file: Some(path.clone()),
            level: OracleLogLevel::Basic,
            ..Default::default()
        };

        let mut logger = Logger::new(&config);
        logger.log_basic(&"seed 42");
        logger.log_full(&"case passed");

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "seed 42\n");
    }

    #[test]
    fn overwrite_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oracle.log");
        std::fs::write(&path, "stale line\nanother stale line\n").unwrap();
        let config = LoggerConfig {
            file: Some(path.clone()),
            append: false,
            level: OracleLogLevel::Full,
            ..Default::default()
        };

        Logger::new(&config).log_full(&"fresh");

        assert_eq!(std::fs::read_to_string(path).unwrap(), "fresh\n");
    }

    #[test]
    fn disabled_level_ignores_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oracle.log");
        let config = LoggerConfig {
            file: Some(path.clone()),
            level: OracleLogLevel::Disabled,
            ..Default::default()
        };

        Logger::new(&config).log_basic(&"ignored");

        assert!(!path.exists());
    }

    #[test]
    fn parses_from_toml() {
        let config: LoggerConfig = toml::from_str(
            r#"
            stderr = true
            log = "debug"
            level = "full"
            "#,
        )
        .unwrap();

        assert!(config.stderr);
        assert!(config.append);
        assert_eq!(config.log, Some(LogCrateLevel::Debug));
        assert_eq!(config.level, OracleLogLevel::Full);
    }
}
