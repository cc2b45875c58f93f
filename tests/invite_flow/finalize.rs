use axum::http::StatusCode;
use maity_invites::{
    config::ResponseMode,
    domain::{CompanyId, InviteAudience},
};
use serde_json::json;

use crate::support::{read_json, set_cookies, TestApp, GHOST_BEARER, NEW_USER_BEARER, NEW_USER_ID};

#[tokio::test]
async fn accept_then_finalize_links_member_and_clears_cookie() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("T1", InviteAudience::Standard, Some(1));

    let accepted = app.accept_json("T1").await;
    let set = set_cookies(&accepted).pop().expect("invite cookie");

    let response = app.finalize_after(NEW_USER_BEARER, &accepted).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cleared = set_cookies(&response).pop().expect("clearing cookie");
    assert_eq!(cleared.name(), set.name());
    assert_eq!(cleared.value(), "");
    assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
    assert_eq!(cleared.domain(), set.domain());
    assert_eq!(cleared.path(), set.path());

    assert_eq!(
        read_json(response).await,
        json!({
            "success": true,
            "assigned": true,
            "audience": "STANDARD",
            "redirect": "/app/dashboard"
        })
    );

    let member = app.member(NEW_USER_ID);
    assert_eq!(member.company_id, Some(CompanyId::from("company-acme")));
    assert_eq!(member.role, Some(InviteAudience::Standard));
    assert_eq!(app.used_count("T1"), 1);
}

#[tokio::test]
async fn token_with_reserved_characters_survives_the_cookie() {
    for token in ["abc%41", "a=b&c+d/e?f", "x%2Fy!$'()*:@[]^`{|}~"] {
        let app = TestApp::new(ResponseMode::Json);
        app.seed_invite(token, InviteAudience::Standard, None);

        let accepted = app.accept_json(token).await;
        assert_eq!(accepted.status(), StatusCode::OK, "token: {token}");
        assert_eq!(set_cookies(&accepted)[0].value(), token);

        let response = app.finalize_after(NEW_USER_BEARER, &accepted).await;
        assert_eq!(response.status(), StatusCode::OK, "token: {token}");
        assert_eq!(read_json(response).await["assigned"], true);
        assert_eq!(app.used_count(token), 1);
    }
}

#[tokio::test]
async fn recipient_restricted_invite_rejects_other_user() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("T1", InviteAudience::Standard, None);
    let mut link = app.links.get("T1").expect("seeded");
    link.email = Some("someone-else@example.com".to_string());
    app.seed_link(link);

    let response = app.finalize(Some(NEW_USER_BEARER), Some("T1")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(read_json(response).await["error"], "EMAIL_MISMATCH");
    assert!(!app.member(NEW_USER_ID).is_assigned());
    assert_eq!(app.used_count("T1"), 0);
}

#[tokio::test]
async fn finalize_is_idempotent() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("T1", InviteAudience::Standard, None);

    let first = read_json(app.finalize(Some(NEW_USER_BEARER), Some("T1")).await).await;
    let second = read_json(app.finalize(Some(NEW_USER_BEARER), Some("T1")).await).await;

    assert_eq!(first["assigned"], true);
    assert_eq!(second["assigned"], false);
    assert_eq!(second["success"], true);
    assert_eq!(app.used_count("T1"), 1);
}

#[tokio::test]
async fn single_use_invite_is_exhausted_after_use() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("T1", InviteAudience::Standard, Some(1));

    let first = app.finalize(Some(NEW_USER_BEARER), Some("T1")).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.finalize(Some(NEW_USER_BEARER), Some("T1")).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&second).is_empty());
    assert_eq!(read_json(second).await["error"], "EXHAUSTED");
}

#[tokio::test]
async fn concurrent_finalize_assigns_exactly_once() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("T1", InviteAudience::Standard, None);

    let (a, b) = tokio::join!(
        app.finalize(Some(NEW_USER_BEARER), Some("T1")),
        app.finalize(Some(NEW_USER_BEARER), Some("T1"))
    );
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);

    let a = read_json(a).await;
    let b = read_json(b).await;
    let assigned = [&a, &b].iter().filter(|body| body["assigned"] == true).count();

    assert_eq!(assigned, 1);
    assert_eq!(app.used_count("T1"), 1);
}

#[tokio::test]
async fn admin_invite_redirects_to_admin_dashboard() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("ADM", InviteAudience::Admin, None);

    let body = read_json(app.finalize(Some(NEW_USER_BEARER), Some("ADM")).await).await;
    assert_eq!(body["audience"], "ADMIN");
    assert_eq!(body["redirect"], "/admin/dashboard");
    assert_eq!(app.member(NEW_USER_ID).role, Some(InviteAudience::Admin));
}

#[tokio::test]
async fn finalize_without_bearer_is_unauthenticated() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("T1", InviteAudience::Standard, None);

    let response = app.finalize(None, Some("T1")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(read_json(response).await["error"], "UNAUTHENTICATED");

    let response = app.finalize(Some("not-a-session"), Some("T1")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.used_count("T1"), 0);
}

#[tokio::test]
async fn finalize_without_cookie_is_missing_token() {
    let app = TestApp::new(ResponseMode::Json);

    let response = app.finalize(Some(NEW_USER_BEARER), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "MISSING_TOKEN");
}

#[tokio::test]
async fn finalize_with_unknown_invite_is_invalid() {
    let app = TestApp::new(ResponseMode::Json);

    let response = app.finalize(Some(NEW_USER_BEARER), Some("nope")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "INVALID_TOKEN");
    assert!(!app.member(NEW_USER_ID).is_assigned());
}

#[tokio::test]
async fn finalize_for_unprovisioned_user_reports_member_not_found() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("T1", InviteAudience::Standard, None);

    let response = app.finalize(Some(GHOST_BEARER), Some("T1")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "MEMBER_NOT_FOUND");
    assert_eq!(app.used_count("T1"), 0);
}

#[tokio::test]
async fn finalize_with_expired_invite() {
    let app = TestApp::new(ResponseMode::Json);
    app.seed_invite("T1", InviteAudience::Standard, None);
    let mut link = app.links.get("T1").expect("seeded");
    link.expires_at = Some(chrono::Utc::now() - chrono::Duration::minutes(5));
    app.seed_link(link);

    let response = app.finalize(Some(NEW_USER_BEARER), Some("T1")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "EXPIRED");
    assert!(!app.member(NEW_USER_ID).is_assigned());
}
