use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use maity_invites::{config::ResponseMode, domain::InviteAudience};

use crate::support::{read_json, set_cookies, TestApp, COOKIE_DOMAIN};

#[tokio::test]
async fn health_is_ok() {
    let app = TestApp::new(ResponseMode::Json);
    let response = app
        .send(Request::builder().uri("/health").body(Body::empty()).expect("build request"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "ok");
}

#[tokio::test]
async fn accept_sets_secure_invite_cookie() {
    let app = TestApp::new(ResponseMode::Json);
    let response = app.accept_json("T1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);

    let cookie = &cookies[0];
    assert_eq!(cookie.name(), "invite_token");
    assert_eq!(cookie.value(), "T1");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(axum_extra::extract::cookie::SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.domain(), Some(COOKIE_DOMAIN));
    let max_age = cookie.max_age().expect("max-age set").whole_seconds();
    assert!(max_age > 0 && max_age <= 1800);

    assert_eq!(read_json(response).await, serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn accept_in_json_mode_defers_token_check() {
    // Unknown tokens are only rejected at finalize.
    let app = TestApp::new(ResponseMode::Json);
    let response = app.accept_json("not-a-real-invite").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookies(&response).len(), 1);
}

#[tokio::test]
async fn accept_without_token_is_rejected() {
    let app = TestApp::new(ResponseMode::Json);

    for body in [r#"{}"#, r#"{"token": ""}"#, r#"{"token": "   "}"#, "not json"] {
        let response = app
            .send(
                Request::builder()
                    .method(Method::POST)
                    .uri("/accept-invite")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("build request"),
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert!(set_cookies(&response).is_empty());
        let json = read_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "MISSING_TOKEN");
    }
}

#[tokio::test]
async fn accept_rejects_token_that_cannot_be_a_cookie_value() {
    let app = TestApp::new(ResponseMode::Json);
    let response = app.accept_json("abc; Domain=evil.example").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(read_json(response).await["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn accept_via_query_string() {
    let app = TestApp::new(ResponseMode::Json);
    let response = app
        .send(
            Request::builder()
                .uri("/accept-invite?token=T-query")
                .body(Body::empty())
                .expect("build request"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookies(&response)[0].value(), "T-query");
}

#[tokio::test]
async fn shared_invite_link_is_accepted() {
    let app = TestApp::new(ResponseMode::Redirect);
    app.seed_invite("T1", InviteAudience::Standard, None);

    let response = app
        .send(
            Request::builder()
                .uri("/accept-invite?invite=T1")
                .body(Body::empty())
                .expect("build request"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/auth");
    assert_eq!(set_cookies(&response)[0].value(), "T1");
}

#[tokio::test]
async fn query_without_token_is_missing() {
    let app = TestApp::new(ResponseMode::Json);

    for uri in ["/accept-invite", "/accept-invite?invite=", "/accept-invite?other=T1"] {
        let response = app
            .send(Request::builder().uri(uri).body(Body::empty()).expect("build request"))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(read_json(response).await["error"], "MISSING_TOKEN");
    }
}

#[tokio::test]
async fn redirect_mode_validates_then_redirects() {
    let app = TestApp::new(ResponseMode::Redirect);
    app.seed_invite("T1", InviteAudience::Standard, Some(1));

    let response = app.accept_json("T1").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).expect("location"), "/auth");
    assert_eq!(set_cookies(&response)[0].value(), "T1");
}

#[tokio::test]
async fn redirect_mode_rejects_unknown_token_without_cookie() {
    let app = TestApp::new(ResponseMode::Redirect);
    let response = app.accept_json("missing").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(read_json(response).await["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn redirect_mode_reports_revoked_before_expired() {
    let app = TestApp::new(ResponseMode::Redirect);
    app.seed_invite("T1", InviteAudience::Standard, Some(1));
    let mut link = app.links.get("T1").expect("seeded");
    link.is_revoked = true;
    link.expires_at = Some(chrono::Utc::now() - chrono::Duration::days(1));
    link.used_count = 1;
    app.seed_link(link);

    let response = app.accept_json("T1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(read_json(response).await["error"], "REVOKED");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin_with_credentials() {
    let app = TestApp::new(ResponseMode::Json);
    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/finalize-invite")
                .header(header::ORIGIN, crate::support::ALLOWED_ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .expect("build request"),
        )
        .await;

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).expect("allow-origin"),
        crate::support::ALLOWED_ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).expect("allow-credentials"),
        "true"
    );
}

#[tokio::test]
async fn cors_ignores_unknown_origin() {
    let app = TestApp::new(ResponseMode::Json);
    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/finalize-invite")
                .header(header::ORIGIN, "https://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .expect("build request"),
        )
        .await;

    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
