//! # Storage and Persistence
//!
//! Postgres connectivity, embedded migrations and the repositories the
//! invite flow reads and writes through.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use migrations::{
    list_applied_migrations, run_migrations as run_db_migrations, validate_migrations,
    MigrationInfo,
};
pub use pool::{create_pool, get_pool_stats, DbPool, PoolStats};
pub use repositories::{
    InMemoryInviteLinkRepository, InMemoryMemberRepository, InviteLinkRepository,
    MemberRepository, SqlxInviteLinkRepository, SqlxMemberRepository,
};

use crate::db_span;
use crate::errors::{MaityError, Result};
use tracing::Instrument;

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    migrations::run_migrations(pool).await
}

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .instrument(db_span!("check_connection"))
        .await
        .map_err(|e| MaityError::database(e, "Database connectivity check failed"))?;

    Ok(())
}
