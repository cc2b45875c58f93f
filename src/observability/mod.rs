//! # Observability Infrastructure
//!
//! Structured logging through `tracing` and counters through the `metrics`
//! facade. The binary installs the subscriber; metrics are recorded against
//! whatever recorder the host process installs (none by default).

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_config_info, redact_token};
pub use metrics::{describe_metrics, MetricsRecorder};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize logging and register metric descriptions.
pub fn init_observability(config: &ObservabilityConfig) -> Result<()> {
    init_logging(config)?;
    describe_metrics();

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        "Observability initialized"
    );

    Ok(())
}
