mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use catalog_service::infrastructure::connection::ConnectionState;
use catalog_service::routes::router;
use common::*;
use serde_json::Value;

struct Harness {
    server: TestServer,
    catalog: Arc<InMemoryCatalog>,
    token: String,
    _provider: wiremock::MockServer,
}

async fn setup(database: ConnectionState) -> Harness {
    let provider = identity_provider(jwks(vec![rsa_jwk("key-a", KEY_A_N)]), 0..=1).await;
    let catalog = Arc::new(InMemoryCatalog::default().with_company(7, 25));
    let state = create_test_state(&provider, catalog.clone(), database);

    Harness {
        server: TestServer::new(router(state)).unwrap(),
        catalog,
        token: sign("key-a", KEY_A_PEM, &valid_claims("user-1")),
        _provider: provider,
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let h = setup(ConnectionState::Ready).await;

    let response = h.server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["postgres"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}

#[tokio::test]
async fn test_health_reports_failed_dependency() {
    let h = setup(ConnectionState::Failed(3)).await;

    let response = h.server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["postgres"]["status"], "error");
}

#[tokio::test]
async fn test_products_require_token() {
    let h = setup(ConnectionState::Ready).await;

    let response = h.server.get("/api/companies/7/products").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(h.catalog.loads(), 0);
}

#[tokio::test]
async fn test_products_first_page_defaults() {
    let h = setup(ConnectionState::Ready).await;

    let response = h
        .server
        .get("/api/companies/7/products")
        .authorization_bearer(&h.token)
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 10);
    assert_eq!(json["pagination"]["total"], 25);
    assert_eq!(json["pagination"]["last_page"], 3);
    assert_eq!(json["pagination"]["prev_page"], Value::Null);
    assert_eq!(json["pagination"]["next_page"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 10);
    assert_eq!(json["items"][0]["id"], 1);
}

#[tokio::test]
async fn test_pages_share_one_load() {
    let h = setup(ConnectionState::Ready).await;

    for page in 1..=3 {
        h.server
            .get(&format!("/api/companies/7/products?page={}&limit=10", page))
            .authorization_bearer(&h.token)
            .await
            .assert_status_ok();
    }

    let last = h
        .server
        .get("/api/companies/7/products?page=3&limit=10")
        .authorization_bearer(&h.token)
        .await
        .json::<Value>();

    assert_eq!(last["items"].as_array().unwrap().len(), 5);
    assert_eq!(last["items"][0]["id"], 21);
    assert_eq!(last["pagination"]["next_page"], Value::Null);
    assert_eq!(h.catalog.loads(), 1);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let h = setup(ConnectionState::Ready).await;

    let response = h
        .server
        .get("/api/companies/7/products?page=9&limit=10")
        .authorization_bearer(&h.token)
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert!(json["items"].as_array().unwrap().is_empty());
    assert_eq!(json["pagination"]["total"], 25);
}

#[tokio::test]
async fn test_invalid_limit_is_bad_request() {
    let h = setup(ConnectionState::Ready).await;

    for query in ["limit=0", "limit=101", "page=0"] {
        h.server
            .get(&format!("/api/companies/7/products?{}", query))
            .authorization_bearer(&h.token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    assert_eq!(h.catalog.loads(), 0);
}

#[tokio::test]
async fn test_unknown_company_is_not_found() {
    let h = setup(ConnectionState::Ready).await;

    let response = h
        .server
        .get("/api/companies/99/products")
        .authorization_bearer(&h.token)
        .await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}
