use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use maity_invites::{
    api::{build_router, AppState},
    config::{InviteConfig, ResponseMode},
    domain::{AuthId, CompanyId, InviteAudience, InviteLink, InviteLinkId, Member},
    identity::StaticIdentityResolver,
    storage::{InMemoryInviteLinkRepository, InMemoryMemberRepository},
};
use serde_json::Value;
use tower::ServiceExt;

pub const COOKIE_DOMAIN: &str = "maity.com.mx";
pub const ALLOWED_ORIGIN: &str = "https://app.maity.com.mx";

/// Bearer token that resolves to a provisioned, unassigned member.
pub const NEW_USER_BEARER: &str = "bearer-new-user";
pub const NEW_USER_ID: &str = "auth-new-user";
/// Bearer token that resolves to an identity with no member row.
pub const GHOST_BEARER: &str = "bearer-ghost";

pub struct TestApp {
    router: Router,
    pub links: Arc<InMemoryInviteLinkRepository>,
    pub members: Arc<InMemoryMemberRepository>,
}

impl TestApp {
    pub fn new(mode: ResponseMode) -> Self {
        let config = InviteConfig {
            cookie_domain: Some(COOKIE_DOMAIN.to_string()),
            response_mode: mode,
            auth_page_url: "/auth".to_string(),
            ..Default::default()
        };

        let links = Arc::new(InMemoryInviteLinkRepository::new());
        let members = Arc::new(InMemoryMemberRepository::new());
        members.insert(Member::new(AuthId::from(NEW_USER_ID)));

        let identity = StaticIdentityResolver::new()
            .with_identity(NEW_USER_BEARER, AuthId::from(NEW_USER_ID))
            .with_identity(GHOST_BEARER, AuthId::from("auth-ghost"));

        let state = AppState::new(&config, Arc::new(identity), links.clone(), members.clone())
            .expect("build app state");
        let router = build_router(state, &[ALLOWED_ORIGIN.to_string()]);

        Self { router, links, members }
    }

    pub fn seed_invite(&self, token: &str, audience: InviteAudience, max_uses: Option<i32>) {
        self.links.insert(InviteLink {
            id: InviteLinkId::from_string(format!("link-{token}")),
            token: token.to_string(),
            company_id: CompanyId::from("company-acme"),
            audience,
            is_revoked: false,
            expires_at: None,
            max_uses,
            used_count: 0,
            email: None,
        });
    }

    pub fn seed_link(&self, link: InviteLink) {
        self.links.insert(link);
    }

    pub fn used_count(&self, token: &str) -> i32 {
        self.links.get(token).expect("invite exists").used_count
    }

    pub fn member(&self, auth_id: &str) -> Member {
        self.members.get(&AuthId::from(auth_id)).expect("member exists")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("request")
    }

    pub async fn accept_json(&self, token: &str) -> Response<Body> {
        let body = serde_json::json!({ "token": token });
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/accept-invite")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
                .expect("build request"),
        )
        .await
    }

    pub async fn finalize(&self, bearer: Option<&str>, invite_token: Option<&str>) -> Response<Body> {
        let cookie = invite_token.map(|token| format!("invite_token={}", token));
        self.finalize_with_cookie_header(bearer, cookie).await
    }

    /// Finalize the way a browser would after `accepted`: the `name=value`
    /// pair of its `Set-Cookie` header is sent back verbatim.
    pub async fn finalize_after(&self, bearer: &str, accepted: &Response<Body>) -> Response<Body> {
        let set_cookie = accepted
            .headers()
            .get(header::SET_COOKIE)
            .expect("accept sets a cookie")
            .to_str()
            .expect("ascii set-cookie");
        let pair = set_cookie.split(';').next().expect("name=value").to_string();
        self.finalize_with_cookie_header(Some(bearer), Some(pair)).await
    }

    async fn finalize_with_cookie_header(
        &self,
        bearer: Option<&str>,
        cookie: Option<String>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(Method::POST).uri("/finalize-invite");
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("build request")).await
    }
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

pub fn set_cookies(response: &Response<Body>) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| {
            let raw = value.to_str().expect("ascii set-cookie").to_string();
            Cookie::parse_encoded(raw).expect("parse set-cookie")
        })
        .collect()
}
