//! Logging bootstrap: translates [`LoggingConfig`](crate::config::LoggingConfig)
//! into a `tracing` subscriber.
//!
//! The original driver/format/level knobs are preserved, but the writer side
//! is necessarily reshaped around what a Rust process can portably open:
//!
//! - `file` writes to the configured path (or stdout if none given) through
//!   a non-blocking appender.
//! - `syslog` and `journald` are Linux-native sinks with no safe, dependency-light
//!   Rust equivalent in this workspace's stack; both fall back to stdout and
//!   log a one-time warning rather than silently behaving differently from
//!   what the operator configured.
//! - `windows` has no meaning on the platforms this daemon targets and also
//!   falls back to stdout with a warning.
//! - `none` installs a no-op subscriber: tracing events are dropped before
//!   formatting, not merely redirected.

use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::{LogDriver, LogFormat, LoggingConfig};
use crate::error::{Error, Result};

/// Holds resources the subscriber borrows for its lifetime (the non-blocking
/// appender's flush thread). Drop this only at process exit.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global `tracing` subscriber per `config`. Must be called
/// exactly once, before any other task is spawned.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = Level::from_str(&config.level.to_ascii_uppercase()).map_err(|e| {
        Error::InvalidLogLevel(config.level.clone(), e.to_string())
    })?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if config.driver == LogDriver::None {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
        return Ok(LoggingGuard { _file_guard: None });
    }

    let (writer, guard) = make_writer(config)?;

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(writer);

    match config.format {
        LogFormat::Json => {
            builder.json().with_current_span(false).init();
        }
        LogFormat::Text => {
            builder.init();
        }
    }

    Ok(LoggingGuard { _file_guard: guard })
}

fn make_writer(config: &LoggingConfig) -> Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    match config.driver {
        LogDriver::File => match &config.file {
            Some(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| Error::LogFile {
                        path: path.clone(),
                        source,
                    })?;
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                Ok((BoxMakeWriter::new(non_blocking), Some(guard)))
            }
            None => Ok((BoxMakeWriter::new(std::io::stdout), None)),
        },
        LogDriver::Syslog => {
            eprintln!("herald: log driver \"syslog\" is not supported on this build, falling back to stdout");
            Ok((BoxMakeWriter::new(std::io::stdout), None))
        }
        LogDriver::Journald => {
            eprintln!("herald: log driver \"journald\" is not supported on this build, falling back to stdout");
            Ok((BoxMakeWriter::new(std::io::stdout), None))
        }
        LogDriver::Windows => {
            eprintln!("herald: log driver \"windows\" has no effect on this platform, falling back to stdout");
            Ok((BoxMakeWriter::new(std::io::stdout), None))
        }
        LogDriver::None => unreachable!("handled in init"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_level() {
        let config = LoggingConfig {
            level: "not-a-level".to_string(),
            ..LoggingConfig::default()
        };
        let err = Level::from_str(&config.level.to_ascii_uppercase()).unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
