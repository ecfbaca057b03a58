//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level. A disabled
//! logging section silences output regardless of `RUST_LOG`.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::SimError;

/// Install the global tracing subscriber described by `config`.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the log file cannot be opened, or
/// [`SimError::Logging`] if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), SimError> {
    let filter = build_filter(config);

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);

    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| SimError::Logging {
        message: e.to_string(),
    })
}

/// Resolve the effective filter.
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if !config.enabled {
        return EnvFilter::new("off");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_filters_everything() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert_eq!(build_filter(&config).to_string(), "off");
    }
}
