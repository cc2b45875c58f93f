//! # Configuration Management
//!
//! Environment-driven configuration for the invite service. Values come from
//! `MAITY_*` variables (a `.env` file is honoured by the binary) and are
//! validated before anything is started.

pub mod settings;

pub use settings::{
    ApiServerConfig, Config, DatabaseConfig, IdentityConfig, InviteConfig, ObservabilityConfig,
    ResponseMode, MAX_INVITE_COOKIE_TTL_SECONDS,
};
