//! # Maity invites
//!
//! The invite acceptance flow of the Maity platform as a standalone service:
//!
//! ```text
//! accept-invite ──► invite cookie ──► (OAuth sign-in) ──► finalize-invite
//!       │                                                      │
//!  InviteValidator                         IdentityResolver → InviteValidator
//!                                              → conditional member assignment
//!                                              → usage increment → redirect
//! ```
//!
//! Storage is PostgreSQL through SQLx; the identity provider is Supabase auth.
//! Both sit behind traits so the flow can run against in-process fakes.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod identity;
pub mod invite;
pub mod observability;
pub mod startup;
pub mod storage;

pub use config::Config;
pub use errors::{Error, MaityError, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
