//! # Database Migration Management
//!
//! SQL migrations are embedded in the binary at compile time and applied in
//! filename order. Each applied migration is recorded in `_maity_migrations`
//! together with a checksum of its content.

use crate::errors::{MaityError, Result};
use crate::storage::DbPool;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use tracing::{error, info, warn};

/// Embedded migrations, sorted by version.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20260101000001_create_invite_links",
        include_str!("../../migrations/20260101000001_create_invite_links.sql"),
    ),
    (
        "20260101000002_create_members",
        include_str!("../../migrations/20260101000002_create_members.sql"),
    ),
    (
        "20260101000003_add_invite_link_recipient_email",
        include_str!("../../migrations/20260101000003_add_invite_link_recipient_email.sql"),
    ),
];

/// Migration information structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationInfo {
    pub version: i64,
    pub description: String,
    pub installed_on: chrono::DateTime<chrono::Utc>,
    pub execution_time: i64,
    pub checksum: Vec<u8>,
}

/// Run all pending database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Starting database migration process");

    create_migration_table(pool).await?;
    let applied = get_applied_migration_versions(pool).await?;

    let mut migrations_run = 0;
    for (name, sql) in MIGRATIONS {
        let version = extract_version_from_filename(name)?;

        if applied.contains(&version) {
            info!(version = version, "Migration already applied: {}", name);
            continue;
        }

        info!(version = version, "Running migration: {}", name);
        let start_time = std::time::Instant::now();

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| MaityError::database(e, "Failed to start migration transaction"))?;

        sqlx::raw_sql(sql).execute(&mut *tx).await.map_err(|e| {
            error!(error = %e, migration = name, "Migration failed");
            MaityError::database(e, format!("Migration failed: {}", name))
        })?;

        let execution_time = start_time.elapsed().as_millis() as i64;
        sqlx::query(
            "INSERT INTO _maity_migrations (version, description, checksum, execution_time, installed_on) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(version)
        .bind(*name)
        .bind(calculate_checksum(sql))
        .bind(execution_time)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| MaityError::database(e, format!("Failed to record migration: {}", name)))?;

        tx.commit()
            .await
            .map_err(|e| MaityError::database(e, "Failed to commit migration transaction"))?;

        migrations_run += 1;
        info!(version = version, execution_time_ms = execution_time, "Migration completed: {}", name);
    }

    if migrations_run > 0 {
        info!(count = migrations_run, "Database migrations completed");
    } else {
        info!("No pending migrations");
    }

    Ok(())
}

async fn create_migration_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _maity_migrations (
            version BIGINT PRIMARY KEY,
            description TEXT NOT NULL,
            checksum BYTEA NOT NULL,
            execution_time BIGINT NOT NULL,
            installed_on TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#,
    )
    .execute(pool)
    .await
    .map_err(|e| MaityError::database(e, "Failed to create migration tracking table"))?;

    Ok(())
}

async fn get_applied_migration_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _maity_migrations ORDER BY version")
        .fetch_all(pool)
        .await;

    match rows {
        Ok(rows) => Ok(rows.into_iter().map(|row| row.get::<i64, _>("version")).collect()),
        Err(sqlx::Error::Database(db_err))
            if db_err.message().contains("relation \"_maity_migrations\" does not exist") =>
        {
            Ok(Vec::new())
        }
        Err(e) => Err(MaityError::database(e, "Failed to get applied migrations")),
    }
}

fn extract_version_from_filename(filename: &str) -> Result<i64> {
    let version_str = filename.split('_').next().ok_or_else(|| {
        MaityError::validation(format!("Invalid migration filename: {}", filename))
    })?;

    version_str
        .parse::<i64>()
        .map_err(|_| MaityError::validation(format!("Invalid version in filename: {}", filename)))
}

fn calculate_checksum(content: &str) -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish().to_le_bytes().to_vec()
}

/// Check that exactly the embedded migrations are applied.
pub async fn validate_migrations(pool: &DbPool) -> Result<bool> {
    let applied = get_applied_migration_versions(pool).await?;
    let expected = MIGRATIONS
        .iter()
        .map(|(name, _)| extract_version_from_filename(name))
        .collect::<Result<Vec<_>>>()?;

    for version in &expected {
        if !applied.contains(version) {
            warn!(version = version, "Missing migration");
            return Ok(false);
        }
    }

    for version in &applied {
        if !expected.contains(version) {
            warn!(version = version, "Unexpected migration found");
            return Ok(false);
        }
    }

    Ok(true)
}

/// List all applied migrations
pub async fn list_applied_migrations(pool: &DbPool) -> Result<Vec<MigrationInfo>> {
    let rows = sqlx::query(
        "SELECT version, description, checksum, execution_time, installed_on FROM _maity_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| MaityError::database(e, "Failed to list applied migrations"))?;

    Ok(rows
        .into_iter()
        .map(|row| MigrationInfo {
            version: row.get("version"),
            description: row.get("description"),
            installed_on: row.get("installed_on"),
            execution_time: row.get("execution_time"),
            checksum: row.get("checksum"),
        })
        .collect())
}
