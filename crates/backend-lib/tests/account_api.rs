// crates/backend-lib/tests/account_api.rs
//! End-to-end tests of the account API over the router.
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use petmarket_backend_lib::{config::Settings, router, storage::MemoryStore, AppState};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(store, Settings::default()).unwrap());
    router::create_router(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn error_code(body: &serde_json::Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

#[tokio::test]
async fn test_register_login_authenticate() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/register",
            serde_json::json!({
                "name": "Ana",
                "email": "a@x.com",
                "password": "Secret1!",
                "role": "USER",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let profile = body_json(response).await;
    assert_eq!(profile["email"], "a@x.com");
    assert_eq!(profile["role"], "USER");
    // the password never appears in a response
    assert!(profile.get("password").is_none());
    assert!(profile.get("passwordHash").is_none());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/login",
            serde_json::json!({ "email": "a@x.com", "password": "Secret1!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pair = body_json(response).await;
    let access = pair["accessToken"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/accounts/me", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let identity = body_json(response).await;
    assert_eq!(identity["email"], "a@x.com");
    assert_eq!(identity["role"], "USER");
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let app = test_app();
    let body = serde_json::json!({
        "name": "Ana",
        "email": "a@x.com",
        "password": "Secret1!",
    });

    let first = app
        .clone()
        .oneshot(json_request("POST", "/api/accounts/register", body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(json_request("POST", "/api/accounts/register", body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(&body_json(second).await), "ACCT_001");
}

#[tokio::test]
async fn test_register_rejects_unknown_role() {
    let app = test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/accounts/register",
            serde_json::json!({
                "name": "Ana",
                "email": "a@x.com",
                "password": "Secret1!",
                "role": "SUPERUSER",
            }),
        ))
        .await
        .unwrap();
    // rejected at the deserialization boundary
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_failures_share_one_code() {
    let app = test_app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/register",
            serde_json::json!({
                "name": "Ana",
                "email": "a@x.com",
                "password": "Secret1!",
            }),
        ))
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/login",
            serde_json::json!({ "email": "a@x.com", "password": "Wrong1!pw" }),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/login",
            serde_json::json!({ "email": "ghost@x.com", "password": "Secret1!" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_email).await;
    assert_eq!(error_code(&a), "AUTH_001");
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_refresh_rotation_over_http() {
    let app = test_app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/register",
            serde_json::json!({
                "name": "Ana",
                "email": "a@x.com",
                "password": "Secret1!",
            }),
        ))
        .await
        .unwrap();
    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/login",
            serde_json::json!({ "email": "a@x.com", "password": "Secret1!" }),
        ))
        .await
        .unwrap();
    let pair = body_json(login).await;
    let refresh_token = pair["refreshToken"].as_str().unwrap().to_string();

    let rotated = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/refresh",
            serde_json::json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(rotated.status(), StatusCode::OK);

    // replaying the rotated-out token fails
    let replay = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/refresh",
            serde_json::json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body_json(replay).await), "SESSION_002");
}

#[tokio::test]
async fn test_logout_then_refresh_is_revoked() {
    let app = test_app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/register",
            serde_json::json!({
                "name": "Ana",
                "email": "a@x.com",
                "password": "Secret1!",
            }),
        ))
        .await
        .unwrap();
    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/login",
            serde_json::json!({ "email": "a@x.com", "password": "Secret1!" }),
        ))
        .await
        .unwrap();
    let pair = body_json(login).await;
    let access = pair["accessToken"].as_str().unwrap().to_string();
    let refresh_token = pair["refreshToken"].as_str().unwrap().to_string();

    let logout = app
        .clone()
        .oneshot(bearer_request("POST", "/api/accounts/logout", &access))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    let refresh = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/refresh",
            serde_json::json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body_json(refresh).await), "SESSION_001");

    // the access token itself stays valid until expiry; only refresh is
    // storage-checked
    let me = app
        .clone()
        .oneshot(bearer_request("GET", "/api/accounts/me", &access))
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_reject_bad_tokens() {
    let app = test_app();

    // no token at all
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/accounts/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body_json(response).await), "TOKEN_001");

    // garbage token
    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/accounts/me", "garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body_json(response).await), "TOKEN_001");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = test_app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/register",
            serde_json::json!({
                "name": "Ana",
                "email": "a@x.com",
                "password": "Secret1!",
            }),
        ))
        .await
        .unwrap();
    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/login",
            serde_json::json!({ "email": "a@x.com", "password": "Secret1!" }),
        ))
        .await
        .unwrap();
    let pair = body_json(login).await;
    let access = pair["accessToken"].as_str().unwrap().to_string();
    let refresh_token = pair["refreshToken"].as_str().unwrap().to_string();

    // refresh token presented as a bearer credential
    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/accounts/me", &refresh_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body_json(response).await), "TOKEN_004");

    // access token presented for refresh
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/accounts/refresh",
            serde_json::json!({ "refreshToken": access }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body_json(response).await), "TOKEN_004");
}
