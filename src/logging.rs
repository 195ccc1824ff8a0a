//! Tracing setup.
//!
//! The terminal belongs to the ui, so log lines only go to a file. Without a
//! log file no fmt layer is installed and events are dropped.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tablescout::ScoutError;

/// Installs the global subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<(), ScoutError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ScoutError::Config(format!("log level '{level}': {e}")))?;

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| ScoutError::Config(format!("logging already initialised: {e}")))
}
