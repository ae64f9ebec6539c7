//! Tracing setup for the two ways the binary runs.
//!
//! While the sell dialog owns the terminal, events are written to a
//! per-session file under `{state}/logs/` so they never draw over the
//! alternate screen. `check` and `init-config` log to stderr.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Where log events go for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Session file, used while the dialog is on screen
    File(PathBuf),
    Stderr,
}

/// Keeps the file writer alive; dropping it flushes pending events
pub struct LoggingHandle {
    _guard: Option<WorkerGuard>,
    sink: LogSink,
}

impl LoggingHandle {
    /// The session log file, if anything was written to it
    pub fn session_log(&self) -> Option<&Path> {
        match &self.sink {
            LogSink::File(path) => path
                .metadata()
                .is_ok_and(|m| m.len() > 0)
                .then_some(path.as_path()),
            LogSink::Stderr => None,
        }
    }
}

/// Level filter to use: `--debug` wins over the configured level
fn resolve_level(config: &Config, debug_override: bool) -> String {
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

/// Log file name for a session started at `now`
fn log_file_name(now: DateTime<Utc>) -> String {
    format!("nft-sell-{}.log", now.format("%Y%m%dT%H%M%SZ"))
}

/// Pick the sink: a session file only when the dialog owns the terminal and
/// file logging is enabled
pub fn log_sink(config: &Config, dialog_on_screen: bool, now: DateTime<Utc>) -> LogSink {
    if dialog_on_screen && config.logging.to_file {
        LogSink::File(config.logs_path().join(log_file_name(now)))
    } else {
        LogSink::Stderr
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(
    config: &Config,
    dialog_on_screen: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(resolve_level(config, debug_override)));
    let sink = log_sink(config, dialog_on_screen, Utc::now());

    let (writer, guard, ansi) = match &sink {
        LogSink::File(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let name = path.file_name().unwrap_or_default();
            let (non_blocking, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        LogSink::Stderr => (BoxMakeWriter::new(std::io::stderr), None, true),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .init();

    Ok(LoggingHandle {
        _guard: guard,
        sink,
    })
}
