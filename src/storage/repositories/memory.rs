//! In-process repositories backed by `DashMap`.
//!
//! Each conditional write holds the shard lock for the affected key, which
//! gives the same single-winner semantics as the SQL `WHERE ... IS NULL`
//! update. Used by the test suites and for running the API without Postgres.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{AuthId, CompanyId, InviteAudience, InviteLink, InviteLinkId, Member};
use crate::errors::{MaityError, Result};
use crate::storage::repositories::{InviteLinkRepository, MemberRepository};

#[derive(Debug, Default)]
pub struct InMemoryInviteLinkRepository {
    // keyed by token; ids are unique per token
    links: DashMap<String, InviteLink>,
}

impl InMemoryInviteLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, link: InviteLink) {
        self.links.insert(link.token.clone(), link);
    }

    pub fn get(&self, token: &str) -> Option<InviteLink> {
        self.links.get(token).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl InviteLinkRepository for InMemoryInviteLinkRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<InviteLink>> {
        Ok(self.get(token))
    }

    async fn increment_used_count(&self, id: &InviteLinkId) -> Result<()> {
        let mut entry = self
            .links
            .iter_mut()
            .find(|entry| &entry.value().id == id)
            .ok_or_else(|| MaityError::internal(format!("Invite link '{}' disappeared", id)))?;
        entry.value_mut().used_count += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMemberRepository {
    members: DashMap<AuthId, Member>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, member: Member) {
        self.members.insert(member.auth_id.clone(), member);
    }

    pub fn get(&self, auth_id: &AuthId) -> Option<Member> {
        self.members.get(auth_id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn find_by_auth_id(&self, auth_id: &AuthId) -> Result<Option<Member>> {
        Ok(self.get(auth_id))
    }

    async fn assign_company_if_unassigned(
        &self,
        auth_id: &AuthId,
        company_id: &CompanyId,
        role: InviteAudience,
    ) -> Result<bool> {
        let Some(mut entry) = self.members.get_mut(auth_id) else {
            return Ok(false);
        };

        let member = entry.value_mut();
        if member.company_id.is_some() {
            return Ok(false);
        }

        member.company_id = Some(company_id.clone());
        member.role = Some(role);
        Ok(true)
    }
}
