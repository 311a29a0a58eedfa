//! Logging setup
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=stream_overlay=debug` - font loading, enable/disable, toast
//!   start/supersede/expiry and mouse-mode suppression changes
//! - `RUST_LOG=stream_overlay::overlay::slot=trace` - every publish, with
//!   whether an unclaimed surface was replaced
//! - `RUST_LOG=stream_overlay::overlay::manager=trace` - deferred toast
//!   expiry when the status line is busy
//! - `RUST_LOG=stream_overlay::config=info` - config load/save paths
//!
//! # Log Files
//!
//! Logs are written to `~/.config/stream-overlay/logs/stream-overlay.log`
//! with daily rotation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Console filter when RUST_LOG is unset: warnings from everything, plus
/// this crate's config and font messages
const DEFAULT_CONSOLE_FILTER: &str = "warn,stream_overlay=info";

/// File filter: this crate at debug, dependencies at info
const FILE_FILTER: &str = "info,stream_overlay=debug";

const LOG_FILE_NAME: &str = "stream-overlay.log";

fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER))
}

/// Initialize tracing subscriber with console and file logging
pub fn init() {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter());

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_NAME);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(FILE_FILTER)),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
