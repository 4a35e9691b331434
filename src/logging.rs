//! # Structured Logging Module
//!
//! Console logging via `tracing`, with optional JSON file output for
//! post-mortem debugging of lock contention and promotion ordering.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process.
///
/// Console output honours `RUST_LOG`; when `TURNERO_LOG_DIR` is set a JSON
/// file layer is added alongside it.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let default_filter = "turnero_core=info,tower_http=info";
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_filter)),
            );

        let registry = tracing_subscriber::registry().with(console_layer);

        if let Ok(log_dir) = std::env::var("TURNERO_LOG_DIR") {
            let log_dir = PathBuf::from(log_dir);
            if !log_dir.exists() {
                if let Err(e) = fs::create_dir_all(&log_dir) {
                    eprintln!("Could not create log directory: {e}");
                }
            }

            let filename = format!(
                "turnero.{}.{}.log",
                process::id(),
                Utc::now().format("%Y%m%d_%H%M%S")
            );
            let file_appender = tracing_appender::rolling::never(&log_dir, filename);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .json()
                .with_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(default_filter)),
                );

            if registry.with(file_layer).try_init().is_ok() {
                // Keep the writer guard alive for the process lifetime.
                std::mem::forget(guard);
            }
        } else if registry.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}
