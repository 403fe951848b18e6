//! `tracing`/`tracing-subscriber` initialisation, configured once at
//! startup and shared by every task thereafter.

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Output shape for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration, deserialized from `[logging]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive string, e.g. `"info"` or
    /// `"oddsaxiom=debug,info"`. Overridable at runtime via `RUST_LOG`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Install the global `tracing` subscriber. Idempotent-safe to call
    /// once at process startup; a second call would panic, so callers
    /// (only `main`) must call this exactly once.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
        match self.format {
            LogFormat::Pretty => subscriber.init(),
            LogFormat::Json => subscriber.json().init(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_logging_config_is_info_pretty() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }
}
