//! Session identity resolution: bearer credential in, authenticated user out.
//!
//! The auth provider owns sessions. This crate only asks it who a bearer
//! token belongs to.

pub mod supabase;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AuthId;

pub use supabase::SupabaseIdentityResolver;

/// The user a bearer token resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub auth_id: AuthId,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("missing bearer token")]
    MissingBearer,

    #[error("malformed authorization header")]
    MalformedBearer,

    /// The provider answered and said no.
    #[error("bearer token rejected by identity provider")]
    Rejected,

    /// The provider could not be asked, or answered with something unusable.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, IdentityError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty());
    let Some(header) = header else {
        return Err(IdentityError::MissingBearer);
    };

    let (scheme, token) = header.split_once(' ').ok_or(IdentityError::MalformedBearer)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(IdentityError::MalformedBearer);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(IdentityError::MalformedBearer);
    }
    Ok(token)
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, bearer_token: &str) -> Result<AuthIdentity, IdentityError>;
}

/// Fixed token-to-identity table, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    identities: HashMap<String, AuthIdentity>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, bearer_token: impl Into<String>, auth_id: AuthId) -> Self {
        self.identities.insert(bearer_token.into(), AuthIdentity { auth_id, email: None });
        self
    }

    pub fn with_email_identity(
        mut self,
        bearer_token: impl Into<String>,
        auth_id: AuthId,
        email: impl Into<String>,
    ) -> Self {
        let identity = AuthIdentity { auth_id, email: Some(email.into()) };
        self.identities.insert(bearer_token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, bearer_token: &str) -> Result<AuthIdentity, IdentityError> {
        self.identities.get(bearer_token).cloned().ok_or(IdentityError::Rejected)
    }
}
