//! Tracing subscriber setup.
//!
//! The filter comes from `RUST_LOG` when set, else from
//! [`LogConfig::filter`]. Installing a subscriber is process-global; a
//! second call finds one already set and reports `false` instead of failing.

use offerbook_types::{LogConfig, LogFormat, OfferbookError, Result};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Build the event filter for `config`.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| {
        OfferbookError::Configuration(format!("bad log filter {:?}: {e}", config.filter))
    })
}

/// Install the global subscriber. Returns `true` if this call installed it.
pub fn init_tracing(config: &LogConfig) -> Result<bool> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init(),
    }
    .is_ok();

    if installed {
        tracing::debug!(filter = %config.filter, format = ?config.format, "Tracing initialised");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_tolerated() {
        let config = LogConfig::default();
        // Another test may have installed one already; either way the
        // second call must not fail.
        init_tracing(&config).unwrap();
        let second = init_tracing(&config).unwrap();
        assert!(!second, "a subscriber was already installed");
    }

    #[test]
    fn filter_from_config() {
        let config = LogConfig {
            filter: "offerbook_core=debug,warn".into(),
            ..LogConfig::default()
        };
        assert!(env_filter(&config).is_ok());
    }
}
