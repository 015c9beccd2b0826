//! Unified logging module for the RF ring gateway
//!
//! Console output goes to stderr in the bracketed level format
//! (`2025-12-02T00:50:44.809000Z [INFO] message`). When a log directory is
//! configured, the same events are also written to a daily rolling file.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::error::{Error, Result};

/// Environment variable that overrides the log directory.
pub const LOG_DIR_ENV: &str = "RF_RING_LOG_DIR";

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Custom event formatter that outputs: `timestamp [LEVEL] message`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Keeps the non-blocking file writers alive for the life of the process
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used as the file prefix and the default filter target
    pub service_name: String,
    /// Directory for daily log files; `None` logs to the console only
    pub log_dir: Option<PathBuf>,
    /// Console log level
    pub console_level: Level,
    /// Emit ANSI colours on the console
    pub enable_ansi: bool,
    /// Write JSON lines instead of the bracketed format to the log file
    pub enable_json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "rfring".to_string(),
            log_dir: None,
            console_level: Level::INFO,
            enable_ansi: true,
            enable_json: false,
        }
    }
}

/// Parse a log level string, falling back to INFO for anything unknown.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Resolve the log directory.
///
/// Priority: explicit argument > `RF_RING_LOG_DIR` > none (console only).
pub fn resolve_log_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(LOG_DIR_ENV).ok().map(PathBuf::from))
}

/// Build the filter string; `RUST_LOG` wins when set.
fn filter_directive(config: &LogConfig) -> String {
    match std::env::var("RUST_LOG") {
        Ok(env_str) if !env_str.trim().is_empty() => env_str,
        _ => config.console_level.as_str().to_lowercase(),
    }
}

/// Initialise the global subscriber from a [`LogConfig`].
pub fn init_with_config(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter_directive(&config))
        .map_err(|e| Error::Logging(format!("Invalid log filter: {}", e)))?;

    // stdout stays reserved for command output
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.enable_ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    let file_layer = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.service_name));
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
            match guards.lock() {
                Ok(mut guards) => guards.push(guard),
                Err(poisoned) => poisoned.into_inner().push(guard),
            }

            let layer = if config.enable_json {
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_level(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat)
                    .boxed()
            };
            Some(layer)
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(format!("Failed to install subscriber: {}", e)))?;

    match &config.log_dir {
        Some(dir) => tracing::debug!("Logging: {} @ {:?}", config.service_name, dir),
        None => tracing::debug!("Logging: {} (console only)", config.service_name),
    }

    Ok(())
}

/// Simple initialisation with a level string and console output only.
pub fn init(level: &str) -> Result<()> {
    init_with_config(LogConfig {
        console_level: parse_level(level),
        ..Default::default()
    })
}
