//! Tracing subscriber setup
//!
//! Logs go to stderr, or to the file named in [`LoggingConfig::file`].
//! `RUST_LOG` takes precedence over the configured filter.

use std::sync::{Once, OnceLock};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.filter));

        if let Some(path) = &config.file {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("[asset-resolver] Failed to create log directory {:?}: {}", parent, e);
                }
            }

            match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => {
                    let (non_blocking, guard) = tracing_appender::non_blocking(file);
                    let _ = LOG_GUARD.set(guard);

                    let subscriber = tracing_subscriber::registry().with(filter).with(
                        fmt::layer()
                            .with_writer(non_blocking)
                            .with_ansi(false)
                            .with_target(true)
                            .with_file(true)
                            .with_line_number(true),
                    );
                    if tracing::subscriber::set_global_default(subscriber).is_ok() {
                        tracing::info!("Logging initialized, writing to {:?}", path);
                    }
                    return;
                }
                Err(e) => {
                    eprintln!("[asset-resolver] Failed to open log file {:?}: {}", path, e);
                }
            }
        }

        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true),
        );
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
