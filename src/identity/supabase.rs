//! Identity resolver backed by the Supabase auth `user` endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::IdentityConfig;
use crate::domain::AuthId;
use crate::errors::{MaityError, Result};
use crate::identity::{AuthIdentity, IdentityError, IdentityResolver};

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Calls `GET {base_url}/auth/v1/user` with the caller's bearer token.
#[derive(Debug, Clone)]
pub struct SupabaseIdentityResolver {
    client: reqwest::Client,
    user_url: String,
    api_key: String,
}

impl SupabaseIdentityResolver {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| MaityError::config(format!("Failed to build identity client: {}", e)))?;

        Ok(Self {
            client,
            user_url: format!("{}/auth/v1/user", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityResolver for SupabaseIdentityResolver {
    #[instrument(skip(self, bearer_token), fields(url = %self.user_url))]
    async fn resolve(&self, bearer_token: &str) -> std::result::Result<AuthIdentity, IdentityError> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "identity provider request failed");
                IdentityError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(status = status.as_u16(), "bearer token rejected");
            return Err(IdentityError::Rejected);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "identity provider returned an error");
            return Err(IdentityError::Unavailable(format!("unexpected status {}", status)));
        }

        let user: UserResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "identity provider returned an unreadable body");
            IdentityError::Unavailable(e.to_string())
        })?;

        if user.id.is_empty() {
            return Err(IdentityError::Unavailable("user id missing from response".to_string()));
        }

        Ok(AuthIdentity { auth_id: AuthId::from_string(user.id), email: user.email })
    }
}
