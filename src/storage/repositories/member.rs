//! Member repository: the one write the invite flow makes on users.

use async_trait::async_trait;
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

use crate::domain::{AuthId, CompanyId, InviteAudience, Member};
use crate::errors::{MaityError, Result};
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct MemberRow {
    pub auth_id: String,
    pub company_id: Option<String>,
    pub role: Option<String>,
}

impl TryFrom<MemberRow> for Member {
    type Error = MaityError;

    fn try_from(row: MemberRow) -> Result<Self> {
        let role = row
            .role
            .as_deref()
            .map(InviteAudience::from_str)
            .transpose()
            .map_err(|e| MaityError::validation(format!("Invalid member role: {}", e)))?;

        Ok(Member {
            auth_id: AuthId::from_string(row.auth_id),
            company_id: row.company_id.map(CompanyId::from_string),
            role,
        })
    }
}

/// Repository trait for member operations.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_auth_id(&self, auth_id: &AuthId) -> Result<Option<Member>>;

    /// Conditional update: link the member to `company_id` only while the
    /// member has no company. Returns `true` when this call made the link,
    /// `false` when another writer got there first.
    async fn assign_company_if_unassigned(
        &self,
        auth_id: &AuthId,
        company_id: &CompanyId,
        role: InviteAudience,
    ) -> Result<bool>;
}

/// SQLx-based member repository implementation.
#[derive(Debug, Clone)]
pub struct SqlxMemberRepository {
    pool: DbPool,
}

impl SqlxMemberRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Provision a member row. Sign-up owns this in production.
    #[instrument(skip(self), fields(auth_id = %auth_id))]
    pub async fn create(&self, auth_id: &AuthId) -> Result<Member> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO members (auth_id)
            VALUES ($1)
            RETURNING auth_id, company_id, role
            "#,
        )
        .bind(auth_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MaityError::database(e, "Failed to create member"))?;

        Member::try_from(row)
    }
}

#[async_trait]
impl MemberRepository for SqlxMemberRepository {
    #[instrument(skip(self), fields(auth_id = %auth_id))]
    async fn find_by_auth_id(&self, auth_id: &AuthId) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT auth_id, company_id, role FROM members WHERE auth_id = $1",
        )
        .bind(auth_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MaityError::database(e, "Failed to load member"))?;

        row.map(Member::try_from).transpose()
    }

    #[instrument(skip(self), fields(auth_id = %auth_id, company_id = %company_id, role = %role))]
    async fn assign_company_if_unassigned(
        &self,
        auth_id: &AuthId,
        company_id: &CompanyId,
        role: InviteAudience,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET company_id = $2, role = $3, updated_at = NOW()
            WHERE auth_id = $1 AND company_id IS NULL
            "#,
        )
        .bind(auth_id.as_str())
        .bind(company_id.as_str())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| MaityError::database(e, "Failed to assign member company"))?;

        Ok(result.rows_affected() == 1)
    }
}
