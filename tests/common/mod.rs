#![allow(dead_code)]

use async_trait::async_trait;
use catalog_service::application::services::{
    CacheAsideReader, CatalogService, TokenVerifier, VerifierConfig,
};
use catalog_service::domain::entities::ProductSummary;
use catalog_service::domain::repositories::CatalogReader;
use catalog_service::error::AppError;
use catalog_service::infrastructure::cache::{KeyCache, MemoryCache};
use catalog_service::infrastructure::connection::{ConnectionState, DependencyStatus};
use catalog_service::infrastructure::identity::{HttpKeySetFetcher, JwksFetcherConfig};
use catalog_service::state::AppState;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

pub const KEY_A_PEM: &[u8] = include_bytes!("../fixtures/signing_key_a.pem");
pub const KEY_B_PEM: &[u8] = include_bytes!("../fixtures/signing_key_b.pem");

pub const KEY_A_N: &str = "l9kM0kIgCnlhpU8uFVYSIgK1slMVSeZRa5AuHwZ78mIuOiCrvIQmq2L7TWeT7nl_QETTqnYfC4e88W9pzkXfeGSQldtjS2yYbIkTFHY0Vi2DE-TsogHIcJSb4eF2VWbgdX-DRoeFOssePoh7AdGw8VrgT4Vx1Hqv7r1f7LHI6croA-vJkgkvylxLJklmKGoy0EC9v1VT2fE4f-h33TENdm0bU0UqNZVMQCFKcEnZQrf8nANWLrcratj6qPny-PmwbYmF5l1M_Rf5mOA3asFRiezRrRkpu8e_vs3SMsLmdhrGiA_e9uveZHWvNNq7O3kNV5TdgOodlp3SPnp76ZA-DQ";
pub const KEY_B_N: &str = "5h012eFejTMd1lOvFqJG_49B4q0oY6lx3GQ-EiGkXCC8wZpQjiRZ2wnCd8HphnqKwTWiJ44uc_C_26uaJiKzypPQSZK0A10hEDHfsSvVI7wt40DA7ulQNTXswEHtEPcf-sWbGuDICJ7mfn0XNKLf3qs7eq1qwALTmmrsYaVcrkmvalm9i1Qau2ZsBHuZQz4dhbzI81mIjplVXoNBF02L46MFhqr5Ox23IfhTt2z1g41klAEf4iVFREty65T1QiBZFXpKq1x-2UODnDvZ9-_9U2vVJ0YsKTIFvBnWtG9fWCQZ0nOdr-tgtTDKgXiQ8kSLnq0Rnjsf6o4f-_4N4RmUkw";

pub const JWKS_PATH: &str = "/.well-known/jwks.json";
pub const ISSUER: &str = "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_test";

/// RSA signing key as published in a JWKS document.
pub fn rsa_jwk(kid: &str, n: &str) -> Value {
    json!({
        "kid": kid,
        "kty": "RSA",
        "alg": "RS256",
        "use": "sig",
        "n": n,
        "e": "AQAB",
    })
}

pub fn jwks(keys: Vec<Value>) -> Value {
    json!({ "keys": keys })
}

/// Standard claims valid for an hour from now.
pub fn valid_claims(subject: &str) -> Value {
    claims_at(subject, 0, 3600)
}

pub fn claims_at(subject: &str, iat_offset: i64, exp_offset: i64) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "sub": subject,
        "email": format!("{}@example.com", subject),
        "iss": ISSUER,
        "iat": now + iat_offset,
        "exp": now + exp_offset,
    })
}

pub fn sign(kid: &str, pem: &[u8], claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(&header, claims, &EncodingKey::from_rsa_pem(pem).unwrap()).unwrap()
}

/// Starts a mock identity provider publishing `body`, expecting `expected_calls` fetches.
pub async fn identity_provider(body: Value, expected_calls: impl Into<Times>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

pub fn jwks_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}{}", server.uri(), JWKS_PATH)).unwrap()
}

pub fn fetcher(server: &MockServer) -> HttpKeySetFetcher {
    HttpKeySetFetcher::new(JwksFetcherConfig::new(jwks_url(server))).unwrap()
}

pub fn verifier_config() -> VerifierConfig {
    VerifierConfig {
        issuer: Some(ISSUER.to_string()),
        ..VerifierConfig::default()
    }
}

/// In-memory catalog that counts loads.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: HashMap<i64, Vec<ProductSummary>>,
    loads: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn with_company(mut self, company_id: i64, count: i64) -> Self {
        let products = (1..=count)
            .map(|id| ProductSummary {
                id,
                company_id,
                name: format!("Product {}", id),
                price_cents: id * 100,
                created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            })
            .collect();
        self.products.insert(company_id, products);
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn list_products(&self, company_id: i64) -> Result<Vec<ProductSummary>, AppError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.get(&company_id).cloned().unwrap_or_default())
    }

    async fn company_exists(&self, company_id: i64) -> Result<bool, AppError> {
        Ok(self.products.contains_key(&company_id))
    }
}

/// Dependency stuck in a fixed state.
pub struct FixedDependency {
    pub name: &'static str,
    pub state: ConnectionState,
}

impl DependencyStatus for FixedDependency {
    fn dependency(&self) -> &'static str {
        self.name
    }

    fn state(&self) -> ConnectionState {
        self.state
    }
}

pub fn create_test_state(
    server: &MockServer,
    catalog: Arc<InMemoryCatalog>,
    database: ConnectionState,
) -> AppState {
    let cache = KeyCache::new(Arc::new(MemoryCache::new()));

    let verifier = Arc::new(TokenVerifier::new(
        cache.clone(),
        Arc::new(fetcher(server)),
        verifier_config(),
    ));

    let catalog_service = Arc::new(CatalogService::new(
        catalog,
        CacheAsideReader::new(cache.clone(), 10_000),
        30,
    ));

    let dependencies: Vec<Arc<dyn DependencyStatus>> = vec![Arc::new(FixedDependency {
        name: "postgres",
        state: database,
    })];

    AppState::new(verifier, catalog_service, cache, dependencies)
}
