//! Invite link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

use crate::domain::{CompanyId, InviteAudience, InviteLink, InviteLinkId};
use crate::errors::{MaityError, Result};
use crate::storage::DbPool;

/// Database row for invite links.
#[derive(Debug, Clone, FromRow)]
struct InviteLinkRow {
    pub id: String,
    pub token: String,
    pub company_id: String,
    pub audience: String,
    pub is_revoked: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub email: Option<String>,
}

impl TryFrom<InviteLinkRow> for InviteLink {
    type Error = MaityError;

    fn try_from(row: InviteLinkRow) -> Result<Self> {
        let audience = InviteAudience::from_str(&row.audience).map_err(|e| {
            MaityError::validation(format!("Invalid invite audience '{}': {}", row.audience, e))
        })?;

        Ok(InviteLink {
            id: InviteLinkId::from_string(row.id),
            token: row.token,
            company_id: CompanyId::from_string(row.company_id),
            audience,
            is_revoked: row.is_revoked,
            expires_at: row.expires_at,
            max_uses: row.max_uses,
            used_count: row.used_count,
            email: row.email,
        })
    }
}

/// Repository trait for invite link operations.
#[async_trait]
pub trait InviteLinkRepository: Send + Sync {
    /// Exact-match lookup by token.
    async fn find_by_token(&self, token: &str) -> Result<Option<InviteLink>>;

    /// Add one to `used_count`. Atomic in the store; never read-modify-write.
    async fn increment_used_count(&self, id: &InviteLinkId) -> Result<()>;
}

/// SQLx-based invite link repository implementation.
#[derive(Debug, Clone)]
pub struct SqlxInviteLinkRepository {
    pool: DbPool,
}

impl SqlxInviteLinkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a link. Invite creation belongs to the admin tooling; this is
    /// used for seeding and tests.
    #[instrument(skip(self, link), fields(invite_link_id = %link.id, company_id = %link.company_id))]
    pub async fn create(&self, link: &InviteLink) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO invite_links
                (id, token, company_id, audience, is_revoked, expires_at, max_uses, used_count, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(link.id.as_str())
        .bind(&link.token)
        .bind(link.company_id.as_str())
        .bind(link.audience.as_str())
        .bind(link.is_revoked)
        .bind(link.expires_at)
        .bind(link.max_uses)
        .bind(link.used_count)
        .bind(link.email.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| MaityError::database(e, "Failed to create invite link"))?;

        Ok(())
    }
}

#[async_trait]
impl InviteLinkRepository for SqlxInviteLinkRepository {
    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<InviteLink>> {
        let row = sqlx::query_as::<_, InviteLinkRow>(
            r#"
            SELECT id, token, company_id, audience, is_revoked, expires_at, max_uses, used_count,
                   email
            FROM invite_links
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MaityError::database(e, "Failed to look up invite link"))?;

        row.map(InviteLink::try_from).transpose()
    }

    #[instrument(skip(self), fields(invite_link_id = %id))]
    async fn increment_used_count(&self, id: &InviteLinkId) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE invite_links
            SET used_count = used_count + 1, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| MaityError::database(e, "Failed to increment invite usage"))?;

        if result.rows_affected() == 0 {
            return Err(MaityError::internal(format!("Invite link '{}' disappeared", id)));
        }

        Ok(())
    }
}
