//! Logging infrastructure for the evidence pipeline.
//!
//! This module provides:
//! - Per-project loggers with file + console callback dual output
//! - Compact mode with progress filtering
//! - Tail buffer replay of external-tool output on failure
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use evid_core::logging::{JobLogger, LogConfig};
//!
//! // Create a project logger
//! let logger = JobLogger::new(
//!     "my_project",
//!     ".logs",
//!     LogConfig::default(),
//!     None,
//! ).unwrap();
//!
//! // Log messages at various levels
//! logger.phase("Convert");
//! logger.command("ffmpeg -i input.webm ...");
//! logger.success("Conversion complete");
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{ConsoleLogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
