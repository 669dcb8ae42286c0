//! Logging setup for applications using Tawsil.
//!
//! The container itself only emits `tracing` events; this module installs a
//! global `tracing-subscriber` so those events become visible.
//!
//! ```rust,no_run
//! use tawsil_support::logging::{self, LoggingConfig};
//!
//! // Honour TAWSIL_LOG, defaulting to "info"
//! logging::init(&LoggingConfig::from_env()).expect("logging already initialised");
//! ```

use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives, e.g. `tawsil_container=trace`.
pub const LOG_ENV_VAR: &str = "TAWSIL_LOG";

/// Directives used when nothing else is configured.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-field human readable lines.
    #[default]
    Full,
    /// Single-line abbreviated output.
    Compact,
}

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The filter directives could not be parsed.
    #[error("invalid log filter directives {directives:?}: {source}")]
    InvalidFilter {
        directives: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    pub directives: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directives: DEFAULT_DIRECTIVES.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Reads directives from [`LOG_ENV_VAR`], falling back to [`DEFAULT_DIRECTIVES`].
    pub fn from_env() -> Self {
        let directives = std::env::var(LOG_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string());

        Self {
            directives,
            ..Self::default()
        }
    }

    /// Sets the filter directives.
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = directives.into();
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Builds the `EnvFilter` described by this configuration.
    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.directives).map_err(|source| LoggingError::InvalidFilter {
            directives: self.directives.clone(),
            source,
        })
    }
}

/// Installs a global `fmt` subscriber for `config`.
///
/// # Errors
/// - [`LoggingError::InvalidFilter`] when the directives do not parse
/// - [`LoggingError::Install`] when a global subscriber already exists
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    }
    .map_err(LoggingError::Install)?;

    tracing::debug!(directives = %config.directives, format = ?config.format, "Logging initialised");
    Ok(())
}
