//! HTTP surface tests
//!
//! Run with: cargo test --features server

#![cfg(feature = "server")]

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use college_rbac::constants::*;
use college_rbac::server::{router, AppState};
use college_rbac::*;

fn setup() -> (Arc<MemoryStore>, Arc<MemoryAuditSink>, Router) {
    let store = Arc::new(MemoryStore::new());
    store.set_user_role("stu", Role::Student).unwrap();
    store.set_user_role("fac", Role::Faculty).unwrap();
    store.set_user_role("root", Role::SuperAdmin).unwrap();
    let audit = Arc::new(MemoryAuditSink::new());
    let state = AppState::new(Arc::new(Policy::builtin()), store.clone(), audit.clone());
    (store, audit, router(state))
}

async fn send(app: Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .header("user-agent", "rbac-tests");
    if let Some(u) = user {
        req = req.header(PRINCIPAL_HEADER, u);
    }
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, _, app) = setup();
    let (status, body) = send(app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn catalog_listing_and_lookup() {
    let (_, _, app) = setup();
    let (status, body) = send(app.clone(), "GET", "/permissions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), catalog::list_permissions().len());

    let (status, body) = send(app.clone(), "GET", "/permissions/fees:pay", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["display_name"], "Pay Fees");

    let (status, _) = send(app, "GET", "/permissions/fees:waive", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_permissions_rejects_unknown_role() {
    let (_, _, app) = setup();
    let (status, body) = send(app.clone(), "GET", "/roles/FACULTY/permissions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let perms: BTreeSet<String> = serde_json::from_value(body["data"]["permissions"].clone()).unwrap();
    assert!(perms.contains(ASSIGNMENTS_GRADE) && perms.contains(ASSIGNMENTS_READ));

    let (status, _) = send(app, "GET", "/roles/DEAN/permissions", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_requires_principal() {
    let (_, _, app) = setup();
    let (status, _) = send(app.clone(), "GET", "/me/permissions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(app.clone(), "GET", "/me/permissions", Some("fac"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "FACULTY");

    let policy = Policy::builtin();
    let grants = policy.grants();
    let expected: Vec<String> = grants
        .default_permissions_for(Role::Faculty)
        .unwrap()
        .union(grants.default_permissions_for(Role::Student).unwrap())
        .cloned()
        .collect();
    let got: Vec<String> = serde_json::from_value(body["data"]["permissions"].clone()).unwrap();
    assert_eq!(got, expected);

    // unknown principal: empty set, not an error
    let (status, body) = send(app.clone(), "GET", "/me/permissions", Some("ghost"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], Value::Null);
    assert_eq!(body["data"]["permissions"], json!([]));

    // a blank header is no principal at all
    let (status, _) = send(app, "GET", "/me/permissions", Some("  "), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_follows_role_change() {
    let (store, _, app) = setup();
    store.set_user_role("fac", Role::Admin).unwrap();
    let (_, body) = send(app, "GET", "/me/permissions", Some("fac"), None).await;
    assert_eq!(body["data"]["role"], "ADMIN");
    let got: BTreeSet<String> = serde_json::from_value(body["data"]["permissions"].clone()).unwrap();
    assert!(got.contains(USERS_WRITE));
}

#[tokio::test]
async fn check_any_and_all() {
    let (_, _, app) = setup();
    let perms = json!([USERS_WRITE, FEES_PAY]);

    let (_, body) = send(app.clone(), "POST", "/check", Some("stu"), Some(json!({ "permissions": perms.clone(), "mode": "any" }))).await;
    assert_eq!(body["data"]["allowed"], true);

    let (_, body) = send(app.clone(), "POST", "/check", Some("stu"), Some(json!({ "permissions": perms }))).await;
    assert_eq!(body["data"]["allowed"], false);

    let (_, body) = send(app, "POST", "/check", Some("stu"), Some(json!({ "permissions": [], "mode": "any" }))).await;
    assert_eq!(body["data"]["allowed"], false);
}

#[tokio::test]
async fn check_role_is_inheritance_aware() {
    let (_, _, app) = setup();
    let (_, body) = send(app.clone(), "POST", "/check-role", Some("fac"), Some(json!({ "roles": ["STUDENT"] }))).await;
    assert_eq!(body["data"]["allowed"], true);
    let (_, body) = send(app, "POST", "/check-role", Some("fac"), Some(json!({ "roles": ["ADMIN"] }))).await;
    assert_eq!(body["data"]["allowed"], false);
}

#[tokio::test]
async fn grant_management_requires_users_roles() {
    let (store, audit, app) = setup();
    let grant = json!({ "role": "STUDENT", "permission": FEES_WRITE });

    let (status, body) = send(app.clone(), "POST", "/grants", Some("fac"), Some(grant.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert!(store.grants_for(&[Role::Student]).unwrap().is_empty());

    let (status, body) = send(app.clone(), "POST", "/grants", Some("root"), Some(grant.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["changed"], true);
    let entries = audit.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Create);
    assert_eq!(entries[0].ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(entries[0].user_agent.as_deref(), Some("rbac-tests"));

    // the student now holds the custom grant
    let (_, body) = send(app.clone(), "POST", "/check", Some("stu"), Some(json!({ "permissions": [FEES_WRITE] }))).await;
    assert_eq!(body["data"]["allowed"], true);

    let (_, body) = send(app.clone(), "GET", "/grants", Some("root"), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(app.clone(), "DELETE", "/grants", Some("root"), Some(grant)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = audit.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].action, AuditAction::Delete);

    let (_, body) = send(app, "POST", "/check", Some("stu"), Some(json!({ "permissions": [FEES_WRITE] }))).await;
    assert_eq!(body["data"]["allowed"], false);
}

#[tokio::test]
async fn grant_of_unknown_permission_is_not_found() {
    let (_, audit, app) = setup();
    let (status, _) = send(app, "POST", "/grants", Some("root"), Some(json!({ "role": "STUDENT", "permission": "fees:waive" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(audit.entries().unwrap().is_empty());
}
