//!
//! src/logging.rs
//!
//! Initializes logger. Output goes to stderr so stdout stays
//! free for the JSON the binary prints.
//!

use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};
use tracing_error::ErrorLayer;
use tracing_appender::non_blocking;

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::PlaylistError;

/// Keeps the non-blocking writer flushing until dropped
pub struct LoggingGuard(tracing_appender::non_blocking::WorkerGuard);

fn filter_for(cfg: &LoggingConfig) -> Result<EnvFilter, PlaylistError> {
    let parsed = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(&cfg.filter_directives)
    };
    parsed.map_err(|e| PlaylistError::Config(format!("log filter: {e}")))
}

pub fn init_logging(cfg: &LoggingConfig) -> Result<LoggingGuard, PlaylistError> {
    let (writer, guard) = non_blocking(std::io::stderr());
    let filter = filter_for(cfg)?;

    let time = fmt::time::UtcTime::rfc_3339();
    let base = fmt::layer()
        .with_writer(writer)
        .with_timer(time)
        .with_ansi(cfg.with_ansi && cfg.format == LogFormat::Pretty)
        .with_target(cfg.include_target)
        .with_file(cfg.include_file_line)
        .with_line_number(cfg.include_file_line);

    let fmt_layer = match cfg.format {
        LogFormat::Json => base
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty => base.pretty().boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| PlaylistError::Config(format!("logging already initialized: {e}")))?;

    Ok( LoggingGuard(guard) )
}
