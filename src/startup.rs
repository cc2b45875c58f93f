//! Process wiring: the pool and HTTP clients are created here, once, and
//! handed to everything that needs them.

use std::sync::Arc;

use tracing::info;

use crate::api::{start_api_server, AppState};
use crate::config::Config;
use crate::errors::Result;
use crate::identity::SupabaseIdentityResolver;
use crate::observability::log_config_info;
use crate::storage::{
    check_connection, create_pool, get_pool_stats, DbPool, SqlxInviteLinkRepository,
    SqlxMemberRepository,
};

/// Build handler state over Postgres repositories and the Supabase resolver.
pub fn build_app_state(config: &Config, pool: DbPool) -> Result<AppState> {
    let identity = SupabaseIdentityResolver::new(&config.identity)?;

    AppState::new(
        &config.invite,
        Arc::new(identity),
        Arc::new(SqlxInviteLinkRepository::new(pool.clone())),
        Arc::new(SqlxMemberRepository::new(pool)),
    )
}

pub async fn run_server(config: Config) -> Result<()> {
    log_config_info(&config);

    let pool = create_pool(&config.database).await?;
    check_connection(&pool).await?;
    let stats = get_pool_stats(&pool);
    info!(pool_size = stats.size, pool_idle = stats.idle, "Database connection verified");

    let state = build_app_state(&config, pool.clone())?;
    let result = start_api_server(&config.api, state).await;

    pool.close().await;
    result
}
