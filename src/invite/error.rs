//! Failure taxonomy for accept-invite and finalize-invite.

use thiserror::Error;

use crate::errors::MaityError;

/// Why an invite operation did not go through.
///
/// Every variant except [`InviteError::Store`] is part of the client-visible
/// contract and carries a stable machine code (see [`InviteError::code`]).
#[derive(Debug, Error)]
pub enum InviteError {
    #[error("invite token is missing")]
    MissingToken,

    /// Unknown token, or the lookup itself failed. Callers see the same code
    /// for both.
    #[error("invite token is not valid")]
    InvalidToken,

    #[error("invite has been revoked")]
    Revoked,

    #[error("invite has expired")]
    Expired,

    #[error("invite has reached its maximum number of uses")]
    Exhausted,

    /// The invite names a recipient and the caller is someone else.
    #[error("invite email does not match the authenticated user")]
    EmailMismatch,

    #[error("caller could not be authenticated")]
    Unauthenticated,

    #[error("no member record exists for the authenticated user")]
    MemberNotFound,

    #[error("failed to assign the member to the organization")]
    AssignmentFailed(#[source] MaityError),

    /// Store failure outside the taxonomy (e.g. loading the member row).
    #[error("invite store unavailable")]
    Store(#[source] MaityError),
}

impl InviteError {
    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            InviteError::MissingToken => "MISSING_TOKEN",
            InviteError::InvalidToken => "INVALID_TOKEN",
            InviteError::Revoked => "REVOKED",
            InviteError::Expired => "EXPIRED",
            InviteError::Exhausted => "EXHAUSTED",
            InviteError::EmailMismatch => "EMAIL_MISMATCH",
            InviteError::Unauthenticated => "UNAUTHENTICATED",
            InviteError::MemberNotFound => "MEMBER_NOT_FOUND",
            InviteError::AssignmentFailed(_) => "ASSIGNMENT_FAILED",
            InviteError::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// True for failures that point at upstream provisioning or store
    /// inconsistency rather than ordinary user input.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            InviteError::MemberNotFound | InviteError::AssignmentFailed(_) | InviteError::Store(_)
        )
    }

    /// Emit the failure at the severity its family calls for.
    pub fn log(&self, operation: &'static str) {
        if self.is_server_fault() {
            tracing::error!(operation, code = self.code(), error = ?self, "invite operation failed");
        } else {
            tracing::info!(operation, code = self.code(), "invite rejected");
        }
    }
}

/// Result of checking an invite, before any write.
pub type InviteResult<T> = std::result::Result<T, InviteError>;
