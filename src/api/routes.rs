use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{InviteConfig, ResponseMode};
use crate::errors::{MaityError, Result};
use crate::identity::IdentityResolver;
use crate::invite::{InviteCookie, InviteFinalizer, InviteValidator, RedirectPolicy};
use crate::observability::MetricsRecorder;
use crate::request_span;
use crate::storage::{InviteLinkRepository, MemberRepository};

use super::handlers::{
    accept_invite_handler, accept_invite_query_handler, finalize_invite_handler, health_handler,
};

/// Everything the handlers need, built once at startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub validator: InviteValidator,
    pub finalizer: InviteFinalizer,
    pub cookie: InviteCookie,
    pub response_mode: ResponseMode,
    pub auth_page_url: Arc<str>,
    pub metrics: MetricsRecorder,
}

impl AppState {
    pub fn new(
        config: &InviteConfig,
        identity: Arc<dyn IdentityResolver>,
        links: Arc<dyn InviteLinkRepository>,
        members: Arc<dyn MemberRepository>,
    ) -> Result<Self> {
        let cookie = InviteCookie::from_config(config)
            .map_err(|e| MaityError::config(format!("Invalid invite cookie settings: {}", e)))?;

        Ok(Self {
            validator: InviteValidator::new(links.clone()),
            finalizer: InviteFinalizer::new(
                identity,
                links,
                members,
                RedirectPolicy::from_config(config),
            ),
            cookie,
            response_mode: config.response_mode,
            auth_page_url: Arc::from(config.auth_page_url.as_str()),
            metrics: MetricsRecorder::new(),
        })
    }
}

pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/accept-invite", post(accept_invite_handler).get(accept_invite_query_handler))
        .route("/finalize-invite", post(finalize_invite_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            request_span!(request.method(), request.uri().path())
        }));

    match cors_layer(cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Credentialed CORS for the configured origins. No origins means no CORS
/// headers at all (same-origin only).
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}
