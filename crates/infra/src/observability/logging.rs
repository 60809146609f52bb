//! Logging initialisation
//!
//! Installs a global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured level. Only the first successful call has an effect.

use bridgekit_domain::{ConfigError, LoggingConfig};
use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Install the global subscriber.
///
/// Returns `Ok(true)` when this call installed it and `Ok(false)` when a
/// subscriber was already in place.
///
/// # Errors
/// Returns `ConfigError::Invalid` if the configured level is not a valid
/// filter directive.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfigError> {
    if INSTALLED.get().is_some() {
        return Ok(false);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            ConfigError::Invalid(format!("invalid log level '{}': {e}", config.level))
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    // Either way a subscriber is now installed
    let _ = INSTALLED.set(());

    match result {
        Ok(()) => {
            tracing::debug!(level = %config.level, json = config.json, "logging initialised");
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_a_no_op() {
        let config = LoggingConfig { level: "debug".into(), json: true };

        init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
        assert!(!init_logging(&LoggingConfig::default()).unwrap());
    }
}
