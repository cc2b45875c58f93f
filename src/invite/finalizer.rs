//! Invite finalization: link an authenticated user to the invite's company.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::domain::InviteAudience;
use crate::identity::{AuthIdentity, IdentityResolver};
use crate::invite::error::{InviteError, InviteResult};
use crate::invite::redirect::RedirectPolicy;
use crate::invite::validator::InviteValidator;
use crate::observability::MetricsRecorder;
use crate::storage::{InviteLinkRepository, MemberRepository};

/// What a successful finalize reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeOutcome {
    /// `false` when the member already belonged to a company.
    pub assigned: bool,
    pub audience: InviteAudience,
    pub redirect: String,
}

#[derive(Clone)]
pub struct InviteFinalizer {
    identity: Arc<dyn IdentityResolver>,
    validator: InviteValidator,
    links: Arc<dyn InviteLinkRepository>,
    members: Arc<dyn MemberRepository>,
    redirects: RedirectPolicy,
    metrics: MetricsRecorder,
}

impl std::fmt::Debug for InviteFinalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InviteFinalizer").field("redirects", &self.redirects).finish_non_exhaustive()
    }
}

impl InviteFinalizer {
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        links: Arc<dyn InviteLinkRepository>,
        members: Arc<dyn MemberRepository>,
        redirects: RedirectPolicy,
    ) -> Self {
        Self {
            identity,
            validator: InviteValidator::new(links.clone()),
            links,
            members,
            redirects,
            metrics: MetricsRecorder::new(),
        }
    }

    /// Resolve the caller, re-check the invite and assign the member.
    ///
    /// Safe to call repeatedly: a member that already has a company is left
    /// untouched and the usage counter is not bumped again. Clearing the
    /// invite cookie is left to the HTTP layer.
    #[instrument(skip_all, fields(auth_id = tracing::field::Empty))]
    pub async fn finalize(
        &self,
        bearer_token: &str,
        invite_token: &str,
    ) -> InviteResult<FinalizeOutcome> {
        let identity = self.identity.resolve(bearer_token).await.map_err(|e| {
            info!(error = %e, "identity resolution failed");
            InviteError::Unauthenticated
        })?;
        let AuthIdentity { auth_id, email } = identity;
        tracing::Span::current().record("auth_id", tracing::field::display(&auth_id));

        let invite = self.validator.validate(invite_token).await?;
        if !invite.admits_email(email.as_deref()) {
            return Err(InviteError::EmailMismatch);
        }
        let audience = invite.audience();
        let redirect = self.redirects.destination(audience).to_string();

        let member = self
            .members
            .find_by_auth_id(&auth_id)
            .await
            .map_err(InviteError::Store)?
            .ok_or(InviteError::MemberNotFound)?;

        if member.is_assigned() {
            info!(
                auth_id = %auth_id,
                company_id = ?member.company_id,
                "member already assigned, skipping"
            );
            self.metrics.record_invite_finalized(false, audience.as_str());
            return Ok(FinalizeOutcome { assigned: false, audience, redirect });
        }

        let assigned = self
            .members
            .assign_company_if_unassigned(&auth_id, invite.company_id(), audience)
            .await
            .map_err(InviteError::AssignmentFailed)?;

        if !assigned {
            // Lost the race to a concurrent finalize for the same member.
            info!(auth_id = %auth_id, "member assigned by a concurrent request");
            self.metrics.record_invite_finalized(false, audience.as_str());
            return Ok(FinalizeOutcome { assigned: false, audience, redirect });
        }

        if let Err(e) = self.links.increment_used_count(invite.id()).await {
            error!(
                error = %e,
                invite_id = %invite.id(),
                auth_id = %auth_id,
                "member assigned but invite usage increment failed"
            );
            self.metrics.record_usage_increment_failure();
        }

        info!(
            auth_id = %auth_id,
            company_id = %invite.company_id(),
            invite_id = %invite.id(),
            audience = %audience,
            "member linked to company"
        );
        self.metrics.record_invite_finalized(true, audience.as_str());

        Ok(FinalizeOutcome { assigned: true, audience, redirect })
    }
}
