use std::time::Duration;

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use serde_json::{Value, json};

use rahala_access::config::Redirects;
use rahala_access::domain::types::RetryPolicy;
use rahala_access::route_table::back_office_routes;
use rahala_access::router::build_router;
use rahala_access::state::AppState;
use rahala_domain::permission;
use rahala_domain::role::Role;
use rahala_testing::profile::ProfileFixture;

use crate::helpers::{
    ADMIN_SECRET, ADMIN_UID, MockIdentityProvider, MockProfileRepo, MockSessionCache,
    TestRegistry, test_registry,
};

type TestState = AppState<MockIdentityProvider, MockProfileRepo, MockSessionCache>;

fn agent() -> ProfileFixture {
    ProfileFixture::new("u-agent")
        .email("agent@example.com")
        .role(Role::BookingAgent)
        .permissions([permission::VIEW_BOOKINGS, permission::MANAGE_BOOKINGS])
}

fn staff_repo() -> MockProfileRepo {
    MockProfileRepo::new(vec![ProfileFixture::admin(ADMIN_UID).build(), agent().build()])
}

fn registry(profiles: &MockProfileRepo) -> TestRegistry {
    test_registry(
        profiles,
        || MockIdentityProvider::with_account("agent@example.com", "pw", "u-agent"),
        RetryPolicy::new(10, Duration::from_millis(100)),
    )
}

fn app(profiles: MockProfileRepo) -> (TestState, TestServer) {
    let state = AppState::new(
        registry(&profiles),
        profiles,
        back_office_routes(),
        Redirects::default(),
    );
    let server = TestServer::new(build_router(state.clone())).unwrap();
    (state, server)
}

/// Signs in on a new session and waits out the provider's echo of it.
async fn sign_in(
    state: &TestState,
    server: &TestServer,
    identifier: &str,
    secret: &str,
) -> Cookie<'static> {
    let resp = server
        .post("/auth/session")
        .json(&json!({ "identifier": identifier, "secret": secret }))
        .await;
    resp.assert_status(StatusCode::OK);
    let cookie = resp.cookie("rahala_session");

    tokio::time::sleep(Duration::from_millis(10)).await;
    let store = state.sessions.get(cookie.value()).await.unwrap();
    store.settled().await;
    cookie
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_checks() {
    let (_, server) = app(staff_repo());
    server.get("/healthz").await.assert_status(StatusCode::OK);
    server.get("/readyz").await.assert_status(StatusCode::OK);
}

// ── Session ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_in_with_alias_and_report_own_session() {
    let (_, server) = app(staff_repo());

    let resp = server
        .post("/auth/session")
        .json(&json!({ "identifier": "1000", "secret": ADMIN_SECRET }))
        .await;
    resp.assert_status(StatusCode::OK);
    let body: Value = resp.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["isAdmin"], true);
    let cookie = resp.cookie("rahala_session");
    assert_eq!(cookie.http_only(), Some(true));

    let session: Value = server.get("/auth/session").add_cookie(cookie).await.json();
    assert_eq!(session["status"], "authenticated");
    assert_eq!(session["user"]["id"], ADMIN_UID);
}

#[tokio::test]
async fn should_return_classified_error_body_without_opening_session() {
    let (state, server) = app(staff_repo());

    let resp = server
        .post("/auth/session")
        .json(&json!({ "identifier": " ", "secret": "pw" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "EMPTY_IDENTIFIER");
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));

    let resp = server
        .post("/auth/session")
        .json(&json!({ "identifier": "1000", "secret": "wrong" }))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert!(state.sessions.is_empty().await);
}

#[tokio::test]
async fn should_sign_out_and_close_session() {
    let (state, server) = app(staff_repo());
    let cookie = sign_in(&state, &server, "agent@example.com", "pw").await;
    assert_eq!(state.sessions.len().await, 1);

    server
        .delete("/auth/session")
        .add_cookie(cookie.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let session: Value = server.get("/auth/session").add_cookie(cookie).await.json();
    assert_eq!(session["status"], "anonymous");
    assert_eq!(session["user"], Value::Null);
    assert!(state.sessions.is_empty().await);
}

#[tokio::test]
async fn should_answer_permission_and_section_checks_for_caller() {
    let (state, server) = app(staff_repo());
    let cookie = sign_in(&state, &server, "agent@example.com", "pw").await;

    let check = |path: &'static str| {
        let request = server.get(path).add_cookie(cookie.clone());
        async move { request.await.json::<Value>()["allowed"].clone() }
    };
    assert_eq!(check("/auth/permissions/manage_bookings").await, true);
    assert_eq!(check("/auth/permissions/manage_users").await, false);
    assert_eq!(check("/auth/sections/bookings").await, true);
    assert_eq!(check("/auth/sections/admin").await, false);

    let anonymous: Value = server.get("/auth/permissions/manage_bookings").await.json();
    assert_eq!(anonymous["allowed"], false);
}

// ── Isolation between callers ────────────────────────────────────────────────

#[tokio::test]
async fn should_not_share_identity_with_callers_without_session() {
    let (state, server) = app(staff_repo());
    let admin = sign_in(&state, &server, "admin", ADMIN_SECRET).await;

    let session: Value = server.get("/auth/session").await.json();
    assert_eq!(session["status"], "anonymous");
    assert_eq!(session["user"], Value::Null);

    let resp = server
        .post("/profiles")
        .json(&json!({ "name": "Intruder", "role": "employee" }))
        .await;
    resp.assert_status(StatusCode::SEE_OTHER);
    assert!(resp.header("location").to_str().unwrap().starts_with("/login?from="));

    let body: Value = server
        .post("/access/evaluate")
        .json(&json!({ "path": "/users" }))
        .await
        .json();
    assert_eq!(body["decision"], "redirect_to_sign_in");

    let forged: Value = server
        .get("/auth/session")
        .add_cookie(Cookie::new("rahala_session", "not-a-session"))
        .await
        .json();
    assert_eq!(forged["status"], "anonymous");

    let session: Value = server.get("/auth/session").add_cookie(admin).await.json();
    assert_eq!(session["user"]["id"], ADMIN_UID);
}

#[tokio::test]
async fn should_keep_signed_in_callers_when_others_submit_blank_form() {
    let (state, server) = app(staff_repo());
    let admin = sign_in(&state, &server, "admin", ADMIN_SECRET).await;

    server
        .post("/auth/session")
        .json(&json!({ "identifier": "", "secret": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .post("/auth/session")
        .add_cookie(admin.clone())
        .json(&json!({ "identifier": "", "secret": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let session: Value = server.get("/auth/session").add_cookie(admin).await.json();
    assert_eq!(session["status"], "authenticated");
    assert_eq!(session["error"], Value::Null);
}

// ── Route guard ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_ask_client_to_wait_while_session_resolves() {
    // No administrator profile yet: signing in provisions one, and the fresh
    // row stays invisible for a few reads.
    let profiles = MockProfileRepo::new(vec![agent().build()]).visibility_lag(3);
    let (state, server) = app(profiles);
    let cookie = sign_in(&state, &server, "agent@example.com", "pw").await;

    let slow_sign_in = async {
        server
            .post("/auth/session")
            .add_cookie(cookie.clone())
            .json(&json!({ "identifier": "admin", "secret": ADMIN_SECRET }))
            .await
    };
    let while_loading = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        let decision: Value = server
            .post("/access/evaluate")
            .add_cookie(cookie.clone())
            .json(&json!({ "path": "/bookings" }))
            .await
            .json();
        let guarded = server
            .post("/profiles")
            .add_cookie(cookie.clone())
            .json(&json!({ "name": "New", "role": "employee" }))
            .await;
        (decision, guarded)
    };
    let (signed_in, (decision, guarded)) = tokio::join!(slow_sign_in, while_loading);

    assert_eq!(decision["decision"], "wait");
    guarded.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(guarded.header("retry-after"), "1");
    signed_in.assert_status(StatusCode::OK);
    assert_eq!(signed_in.json::<Value>()["user"]["id"], ADMIN_UID);
}

#[tokio::test]
async fn should_send_anonymous_navigation_to_sign_in() {
    let (_, server) = app(staff_repo());

    let body: Value = server
        .post("/access/evaluate")
        .json(&json!({ "path": "/customers/42" }))
        .await
        .json();
    assert_eq!(body["decision"], "redirect_to_sign_in");
    assert_eq!(body["from"], "/customers/42");
    assert!(body["location"].as_str().unwrap().starts_with("/login?from="));

    let resp = server
        .post("/profiles")
        .json(&json!({ "name": "New", "role": "employee" }))
        .await;
    resp.assert_status(StatusCode::SEE_OTHER);
    assert!(resp.header("location").to_str().unwrap().starts_with("/login?from="));
}

#[tokio::test]
async fn should_send_unauthorized_navigation_to_landing_with_notice() {
    let (state, server) = app(staff_repo());
    let cookie = sign_in(&state, &server, "agent@example.com", "pw").await;

    let body: Value = server
        .post("/access/evaluate")
        .add_cookie(cookie.clone())
        .json(&json!({ "path": "/admin/users" }))
        .await
        .json();
    assert_eq!(body["decision"], "redirect_to_landing");
    assert_eq!(body["notice"], "not_authorized");
    assert_eq!(body["location"], "/");

    let resp = server
        .post("/profiles")
        .add_cookie(cookie)
        .json(&json!({ "name": "New", "role": "employee" }))
        .await;
    resp.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), "/");
    assert_eq!(resp.cookie("rahala_notice").value(), "not_authorized");
}

#[tokio::test]
async fn should_render_permitted_navigation() {
    let (state, server) = app(staff_repo());
    let cookie = sign_in(&state, &server, "agent@example.com", "pw").await;

    let body: Value = server
        .post("/access/evaluate")
        .add_cookie(cookie)
        .json(&json!({ "path": "/bookings/new" }))
        .await
        .json();
    assert_eq!(body["decision"], "render");
    assert!(body.get("location").is_none());
}

// ── Profiles ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_profile_as_administrator() {
    let profiles = staff_repo();
    let handle = profiles.profiles_handle();
    let (state, server) = app(profiles);
    let cookie = sign_in(&state, &server, "admin", ADMIN_SECRET).await;

    let resp = server
        .post("/profiles")
        .add_cookie(cookie)
        .json(&json!({
            "name": "  Nadia  ",
            "email": "nadia@agency.test",
            "role": "accountant",
            "permissions": "view_invoices",
            "employeeNumber": "2040"
        }))
        .await;

    resp.assert_status(StatusCode::CREATED);
    let body: Value = resp.json();
    assert_eq!(body["name"], "Nadia");
    assert_eq!(body["active"], true);
    assert_eq!(body["permissions"], json!(["view_invoices"]));
    assert_eq!(handle.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn should_refuse_second_administrator_before_writing() {
    let profiles = staff_repo();
    let handle = profiles.profiles_handle();
    let (state, server) = app(profiles);
    let cookie = sign_in(&state, &server, "admin", ADMIN_SECRET).await;

    let resp = server
        .post("/profiles")
        .add_cookie(cookie)
        .json(&json!({ "name": "Second", "role": "admin" }))
        .await;

    resp.assert_status(StatusCode::CONFLICT);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "SINGLETON_ROLE_TAKEN");
    assert_eq!(body["error"], "لا يمكن إنشاء أكثر من حساب مدير نظام واحد");
    assert_eq!(handle.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn should_allow_first_general_manager() {
    let (state, server) = app(staff_repo());
    let cookie = sign_in(&state, &server, "admin", ADMIN_SECRET).await;

    server
        .post("/profiles")
        .add_cookie(cookie.clone())
        .json(&json!({ "name": "GM", "role": "general_manager", "authUid": "u-gm" }))
        .await
        .assert_status(StatusCode::CREATED);

    let resp = server
        .post("/profiles")
        .add_cookie(cookie)
        .json(&json!({ "name": "GM 2", "role": "general_manager" }))
        .await;
    resp.assert_status(StatusCode::CONFLICT);
}
