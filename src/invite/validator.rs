//! Invite validation: look a token up and decide whether it may still be used.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::domain::{CompanyId, InviteAudience, InviteLink, InviteLinkId};
use crate::invite::error::{InviteError, InviteResult};
use crate::observability::redact_token;
use crate::storage::InviteLinkRepository;

/// An invite that passed every check at the time it was read.
///
/// The read is advisory. The finalizer's conditional write is what actually
/// decides whether a member gets linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInvite {
    link: InviteLink,
}

impl ValidInvite {
    pub fn id(&self) -> &InviteLinkId {
        &self.link.id
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.link.company_id
    }

    pub fn audience(&self) -> InviteAudience {
        self.link.audience
    }

    pub fn admits_email(&self, email: Option<&str>) -> bool {
        self.link.admits_email(email)
    }
}

/// Check a loaded link against the clock. Revoked beats expired, expired beats
/// exhausted.
pub fn evaluate(link: &InviteLink, now: DateTime<Utc>) -> InviteResult<()> {
    if link.is_revoked {
        return Err(InviteError::Revoked);
    }
    if link.is_expired_at(now) {
        return Err(InviteError::Expired);
    }
    if link.is_exhausted() {
        return Err(InviteError::Exhausted);
    }
    Ok(())
}

/// Read-only validator over the invite link store.
#[derive(Clone)]
pub struct InviteValidator {
    links: Arc<dyn InviteLinkRepository>,
}

impl std::fmt::Debug for InviteValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InviteValidator").finish_non_exhaustive()
    }
}

impl InviteValidator {
    pub fn new(links: Arc<dyn InviteLinkRepository>) -> Self {
        Self { links }
    }

    pub async fn validate(&self, token: &str) -> InviteResult<ValidInvite> {
        self.validate_at(token, Utc::now()).await
    }

    #[instrument(skip(self, token), fields(token = %redact_token(token)))]
    pub async fn validate_at(&self, token: &str, now: DateTime<Utc>) -> InviteResult<ValidInvite> {
        if token.trim().is_empty() {
            return Err(InviteError::MissingToken);
        }

        let link = match self.links.find_by_token(token).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                info!("invite token not found");
                return Err(InviteError::InvalidToken);
            }
            Err(e) => {
                // Reported to the caller exactly like an unknown token.
                warn!(error = %e, "invite lookup failed");
                return Err(InviteError::InvalidToken);
            }
        };

        evaluate(&link, now)?;

        info!(
            invite_id = %link.id,
            company_id = %link.company_id,
            audience = %link.audience,
            "invite is valid"
        );
        Ok(ValidInvite { link })
    }
}
