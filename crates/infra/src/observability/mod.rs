//! Logging setup
//!
//! `RUST_LOG` wins over the configured level when set. Initialization is
//! idempotent: a second call (or a subscriber installed by a test harness)
//! is left in place.

use tokenline_domain::{LoggingConfig, Result, TokenlineError};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// # Errors
/// Returns `TokenlineError::Config` if the configured level is not a valid
/// filter directive.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            TokenlineError::Config(format!("Invalid log level '{}': {}", config.level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.compact().try_init()
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_level() {
        let config = LoggingConfig { level: "tokenline=notalevel".into(), json: false };
        // RUST_LOG takes precedence, so only assert when it is unset.
        if std::env::var("RUST_LOG").is_err() {
            assert!(matches!(init_tracing(&config), Err(TokenlineError::Config(_))));
        }
    }

    #[test]
    fn second_init_is_harmless() {
        let config = LoggingConfig::default();
        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }
}
