mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use catalog_service::infrastructure::connection::ConnectionState;
use catalog_service::routes::router;
use common::*;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (TestServer, MockServer) {
    let provider = identity_provider(jwks(vec![rsa_jwk("key-a", KEY_A_N)]), 0..=1).await;
    let state = create_test_state(
        &provider,
        Arc::new(InMemoryCatalog::default()),
        ConnectionState::Ready,
    );
    (TestServer::new(router(state)).unwrap(), provider)
}

#[tokio::test]
async fn test_valid_token_returns_claims() {
    let (server, _provider) = setup().await;
    let token = sign("key-a", KEY_A_PEM, &valid_claims("user-1"));

    let response = server.get("/api/me").authorization_bearer(&token).await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["subject"], "user-1");
    assert_eq!(json["email"], "user-1@example.com");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (server, _provider) = setup().await;

    let response = server.get("/api/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (server, _provider) = setup().await;

    let response = server
        .get("/api/me")
        .authorization_bearer("not-a-token")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
}

#[tokio::test]
async fn test_unknown_kid_is_unauthorized() {
    let (server, _provider) = setup().await;
    let token = sign("key-b", KEY_B_PEM, &valid_claims("user-1"));

    let response = server.get("/api/me").authorization_bearer(&token).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forged_signature_is_unauthorized() {
    let (server, _provider) = setup().await;
    let token = sign("key-a", KEY_B_PEM, &valid_claims("user-1"));

    let response = server.get("/api/me").authorization_bearer(&token).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let (server, _provider) = setup().await;
    let token = sign("key-a", KEY_A_PEM, &claims_at("user-1", -30_000, -20_000));

    let response = server.get("/api/me").authorization_bearer(&token).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejections_are_indistinguishable() {
    let (server, _provider) = setup().await;
    let expired = sign("key-a", KEY_A_PEM, &claims_at("user-1", -30_000, -20_000));
    let unknown = sign("key-b", KEY_B_PEM, &valid_claims("user-1"));

    let missing = server.get("/api/me").await.json::<Value>();
    let expired = server
        .get("/api/me")
        .authorization_bearer(&expired)
        .await
        .json::<Value>();
    let unknown = server
        .get("/api/me")
        .authorization_bearer(&unknown)
        .await
        .json::<Value>();

    assert_eq!(missing, expired);
    assert_eq!(missing, unknown);
}

#[tokio::test]
async fn test_identity_provider_down_is_unauthorized() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&provider)
        .await;
    let state = create_test_state(
        &provider,
        Arc::new(InMemoryCatalog::default()),
        ConnectionState::Ready,
    );
    let server = TestServer::new(router(state)).unwrap();
    let token = sign("key-a", KEY_A_PEM, &valid_claims("user-1"));

    let response = server.get("/api/me").authorization_bearer(&token).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_key_set_is_fetched_once() {
    let provider = identity_provider(jwks(vec![rsa_jwk("key-a", KEY_A_N)]), 1).await;
    let state = create_test_state(
        &provider,
        Arc::new(InMemoryCatalog::default()),
        ConnectionState::Ready,
    );
    let server = TestServer::new(router(state)).unwrap();

    for subject in ["user-1", "user-2", "user-3"] {
        let token = sign("key-a", KEY_A_PEM, &valid_claims(subject));
        server
            .get("/api/me")
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }
}

#[tokio::test]
async fn test_rotated_key_is_not_trusted_before_refresh() {
    let provider = identity_provider(jwks(vec![rsa_jwk("key-a", KEY_A_N)]), 1).await;
    let state = create_test_state(
        &provider,
        Arc::new(InMemoryCatalog::default()),
        ConnectionState::Ready,
    );
    let server = TestServer::new(router(state)).unwrap();

    let token_a = sign("key-a", KEY_A_PEM, &valid_claims("user-1"));
    server
        .get("/api/me")
        .authorization_bearer(&token_a)
        .await
        .assert_status_ok();

    let token_b = sign("key-b", KEY_B_PEM, &valid_claims("user-1"));
    server
        .get("/api/me")
        .authorization_bearer(&token_b)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
