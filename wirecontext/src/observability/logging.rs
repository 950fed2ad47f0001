//! Subscriber setup for processes embedding wirecontext.

use crate::errors::{ContextError, Result};
use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `wirecontext=debug`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human readable text.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Builds the filter, preferring `RUST_LOG` when it is set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `level` is not a valid directive.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level)
            .map_err(|e| ContextError::invalid_config(format!("log level '{}': {e}", self.level)))
    }
}

/// Builds the subscriber described by `config` without installing it.
///
/// # Errors
///
/// Returns `InvalidConfig` for a bad filter.
pub fn build_subscriber(config: &LoggingConfig) -> Result<impl Subscriber + Send + Sync + 'static> {
    let filter = config.env_filter()?;
    let format = if config.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    Ok(tracing_subscriber::registry().with(format).with(filter))
}

/// Installs a global `tracing` subscriber.
///
/// # Errors
///
/// Returns `InvalidConfig` for a bad filter or if a subscriber is already
/// installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    build_subscriber(config)?
        .try_init()
        .map_err(|e| ContextError::invalid_config(format!("tracing subscriber: {e}")))
}
