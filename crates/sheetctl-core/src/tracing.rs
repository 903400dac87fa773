//! Tracing setup for sheetctl.
//!
//! The binary calls [`init_tracing`] once before doing anything else. Logs go
//! to stderr so that command output (spreadsheet ids, cell values) on stdout
//! stays pipeable.
//!
//! ```ignore
//! use sheetctl_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::cli())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to the `sheetctl` crates when RUST_LOG is not set
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Include file/line information
    pub include_location: bool,
    /// Include the module path
    pub include_target: bool,
    pub include_timestamp: bool,
    /// Custom env filter directive (overrides default_level if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::cli()
    }
}

impl TracingConfig {
    /// Quiet preset: only warnings and errors, no timestamps.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_target: false,
            include_timestamp: false,
            env_filter: None,
        }
    }

    /// Preset used with `--debug`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            include_target: true,
            ..Self::cli()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Builds the filter directive used when neither RUST_LOG nor a custom
    /// filter is set.
    fn default_directive(&self) -> String {
        let level = self.default_level.to_string().to_lowercase();
        format!("sheetctl={level},sheetctl_core={level},sheetctl_google={level},sheetctl_cli={level}")
    }
}

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` overrides the default level unless a custom filter was set.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if the
/// env filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = if let Some(ref filter) = config.env_filter {
        EnvFilter::try_new(filter)?
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default_directive()))
    };

    match config.output_format {
        TracingOutputFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target);

            let layer = if config.include_timestamp {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            };

            let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        TracingOutputFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_target(config.include_target),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
