//! # Structured Logging
//!
//! Subscriber setup plus the span macros used by handlers and repositories.

use crate::config::{Config, ObservabilityConfig};
use crate::errors::{MaityError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Fails if a subscriber
/// is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_logging {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| MaityError::config(format!("Failed to initialize logging: {}", e)))
}

/// Create a tracing span for request tracking
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for database operations
#[macro_export]
macro_rules! db_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Shorten a credential to a loggable prefix. Never log the full value.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}

/// Log configuration at startup
pub fn log_config_info(config: &Config) {
    tracing::info!(
        api_address = %config.api.socket_address(),
        database_url = %crate::storage::pool::sanitize_url(&config.database.url),
        cors_origins = ?config.api.cors_origins,
        cookie_name = %config.invite.cookie_name,
        cookie_domain = ?config.invite.cookie_domain,
        cookie_ttl_seconds = config.invite.cookie_ttl_seconds,
        response_mode = ?config.invite.response_mode,
        identity_base_url = %config.identity.base_url,
        "Maity invite service configuration"
    );
}
