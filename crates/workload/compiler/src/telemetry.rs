//! Tracing subscriber setup for compiler hosts.

use crate::config::LoggingConfig;
use crate::error::{CompilerError, CompilerResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the level filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(config: &LoggingConfig) -> CompilerResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| CompilerError::LoggingInit(format!("invalid level '{}': {}", config.level, e))),
    }
}

/// Install the global tracing subscriber.
///
/// Fails if the level directive is invalid or a subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> CompilerResult<()> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match (config.json, config.timestamps) {
        (true, _) => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        (false, true) => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        (false, false) => registry
            .with(tracing_subscriber::fmt::layer().without_time())
            .try_init(),
    };
    result.map_err(|e| CompilerError::LoggingInit(e.to_string()))
}
