//! Invite link records and the audience they grant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{CompanyId, InviteLinkId};

/// Who an invite is for. Decides the member's initial role and landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InviteAudience {
    Standard,
    Admin,
}

impl InviteAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteAudience::Standard => "STANDARD",
            InviteAudience::Admin => "ADMIN",
        }
    }
}

impl Display for InviteAudience {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InviteAudience {
    type Err = AudienceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STANDARD" => Ok(InviteAudience::Standard),
            "ADMIN" => Ok(InviteAudience::Admin),
            other => Err(AudienceParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid invite audience: {0}")]
pub struct AudienceParseError(pub String);

/// Stored invite link. The `token` is the only handle callers ever present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteLink {
    pub id: InviteLinkId,
    pub token: String,
    pub company_id: CompanyId,
    pub audience: InviteAudience,
    pub is_revoked: bool,
    /// `None` means the link never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// `None` means unlimited uses.
    pub max_uses: Option<i32>,
    pub used_count: i32,
    /// Recipient restriction. `None` means anyone holding the token.
    #[serde(default)]
    pub email: Option<String>,
}

impl InviteLink {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max_uses| self.used_count >= max_uses)
    }

    /// Whether `email` may use this invite. Unrestricted invites admit any
    /// caller; restricted ones need a case-insensitive match.
    pub fn admits_email(&self, email: Option<&str>) -> bool {
        match (&self.email, email) {
            (None, _) => true,
            (Some(expected), Some(actual)) => expected.trim().eq_ignore_ascii_case(actual.trim()),
            (Some(_), None) => false,
        }
    }
}
