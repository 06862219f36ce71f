// Logging module for structured logging using the tracing crate

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber is configured with:
/// - An `EnvFilter` built from `RUST_LOG` when set, else from `config.level`
/// - JSON formatting when `config.json` is true, human-readable otherwise
/// - Output to stdout
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber has already been installed.
///
/// # Examples
///
/// ```
/// use kagi::config::LoggingConfig;
/// use kagi::logging::init_subscriber;
///
/// init_subscriber(&LoggingConfig::default()).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::try_new(&config.level)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// Replace every character of a secret with `*`.
pub fn mask_secret(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

/// The secret itself when TRACE is enabled for this crate, its masked form otherwise.
pub fn reveal_secret(secret: &str) -> String {
    if tracing::enabled!(Level::TRACE) {
        secret.to_string()
    } else {
        mask_secret(secret)
    }
}
