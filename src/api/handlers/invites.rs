//! accept-invite and finalize-invite.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::config::ResponseMode;
use crate::identity::parse_bearer;
use crate::invite::{is_valid_value, to_header, FinalizeOutcome, InviteError};
use crate::observability::redact_token;

#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Query of a shared invite link, `?invite=<token>`. `?token=` is also
/// accepted.
#[derive(Debug, Deserialize)]
pub struct AcceptInviteQuery {
    #[serde(default, alias = "token")]
    pub invite: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AcceptInviteResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct FinalizeInviteResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: FinalizeOutcome,
}

/// A response that also carries one `Set-Cookie` header.
pub struct WithCookie<R> {
    inner: R,
    cookie: Cookie<'static>,
}

impl<R: IntoResponse> IntoResponse for WithCookie<R> {
    fn into_response(self) -> Response {
        let mut response = self.inner.into_response();
        match HeaderValue::from_str(&to_header(&self.cookie)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
                response
            }
            Err(e) => {
                error!(error = %e, cookie = %self.cookie.name(), "Failed to encode Set-Cookie header");
                ApiError::Internal("cookie encoding failed".to_string()).into_response()
            }
        }
    }
}

/// `POST /accept-invite` with `{ "token": "..." }`.
pub async fn accept_invite_handler(
    State(state): State<AppState>,
    payload: Result<Json<AcceptInviteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    // An unreadable body carries no token.
    let token = payload.ok().and_then(|Json(body)| body.token);
    accept_invite(&state, token).await
}

/// `GET /accept-invite?invite=...`, for invite links opened in a browser.
pub async fn accept_invite_query_handler(
    State(state): State<AppState>,
    query: Result<Query<AcceptInviteQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let token = query.ok().and_then(|Query(query)| query.invite);
    accept_invite(&state, token).await
}

#[instrument(skip_all, fields(mode = ?state.response_mode))]
async fn accept_invite(state: &AppState, token: Option<String>) -> Result<Response, ApiError> {
    let result = accept_invite_inner(state, token).await;
    if let Err(ApiError::Invite(err)) = &result {
        err.log("accept-invite");
        state.metrics.record_invite_rejected("accept-invite", err.code());
    }
    result
}

async fn accept_invite_inner(state: &AppState, token: Option<String>) -> Result<Response, ApiError> {
    let token = token.map(|t| t.trim().to_string()).unwrap_or_default();
    if token.is_empty() {
        return Err(InviteError::MissingToken.into());
    }
    if !is_valid_value(&token) {
        return Err(InviteError::InvalidToken.into());
    }

    match state.response_mode {
        ResponseMode::Json => {
            info!(token = %redact_token(&token), "invite cookie issued");
            state.metrics.record_invite_accepted("json");
            Ok(WithCookie {
                inner: (StatusCode::OK, Json(AcceptInviteResponse { success: true })),
                cookie: state.cookie.set(&token),
            }
            .into_response())
        }
        ResponseMode::Redirect => {
            let invite = state.validator.validate(&token).await?;
            info!(
                token = %redact_token(&token),
                company_id = %invite.company_id(),
                "invite validated, redirecting to sign-in"
            );
            state.metrics.record_invite_accepted("redirect");

            let location = HeaderValue::from_str(&state.auth_page_url)
                .map_err(|e| ApiError::Internal(format!("invalid auth page URL: {}", e)))?;
            Ok(WithCookie {
                inner: (StatusCode::FOUND, [(header::LOCATION, location)]),
                cookie: state.cookie.set(&token),
            }
            .into_response())
        }
    }
}

/// `POST /finalize-invite`, bearer token in `Authorization`, invite token in
/// the cookie set by accept-invite.
#[instrument(skip_all)]
pub async fn finalize_invite_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let result = finalize_invite(&state, &headers, &jar).await;
    if let Err(err) = &result {
        err.log("finalize-invite");
        state.metrics.record_invite_rejected("finalize-invite", err.code());
    }

    let outcome = result?;
    Ok(WithCookie {
        inner: (StatusCode::OK, Json(FinalizeInviteResponse { success: true, outcome })),
        cookie: state.cookie.clear(),
    }
    .into_response())
}

async fn finalize_invite(
    state: &AppState,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Result<FinalizeOutcome, InviteError> {
    let authorization = headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok());
    let bearer = parse_bearer(authorization).map_err(|e| {
        info!(error = %e, "finalize-invite without usable bearer token");
        InviteError::Unauthenticated
    })?;

    let invite_token = state.cookie.read(jar).unwrap_or_default();
    state.finalizer.finalize(bearer, &invite_token).await
}
