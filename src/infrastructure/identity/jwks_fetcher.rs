//! Identity-provider key set retrieval.
//!
//! [`HttpKeySetFetcher`] performs a single unauthenticated GET against the
//! provider's JWKS document and parses it into [`KeySet`]. It never retries;
//! retry policy belongs to the caller.
//!
//! # Parsing rules
//!
//! - keys published with `"use": "enc"` are skipped
//! - every remaining key must carry a `kid`, a supported `kty` and the
//!   base64url components that `kty` requires
//! - when `alg` is absent it is inferred from `kty` (and `crv` for curves)
//! - a single malformed signing key rejects the whole document, since sets
//!   are cached and replaced as a unit
//! - an empty `keys` array is a valid, empty set

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::domain::entities::{KeyMaterial, KeyRecord, KeySet};

/// Errors returned by [`KeySetFetcher::fetch_key_set`].
#[derive(Debug, Error)]
pub enum KeySetError {
    /// The endpoint could not be reached, timed out or answered non-2xx.
    #[error("Identity provider unavailable: {0}")]
    RemoteUnavailable(String),

    /// The response body is not a well-formed key set.
    #[error("Malformed key set: {0}")]
    MalformedKeySet(String),
}

/// Source of the identity provider's current signing keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    /// Fetches and parses the full key set.
    ///
    /// # Errors
    ///
    /// - [`KeySetError::RemoteUnavailable`] on network failure or non-success status
    /// - [`KeySetError::MalformedKeySet`] when the body cannot be parsed
    async fn fetch_key_set(&self) -> Result<KeySet, KeySetError>;
}

/// Builds the JWKS URI of a Cognito-style user pool.
pub fn pool_jwks_url(region: &str, pool_id: &str) -> String {
    format!("{}/.well-known/jwks.json", pool_issuer(region, pool_id))
}

/// Builds the `iss` value tokens of a Cognito-style user pool carry.
pub fn pool_issuer(region: &str, pool_id: &str) -> String {
    format!("https://cognito-idp.{}.amazonaws.com/{}", region, pool_id)
}

/// Settings for [`HttpKeySetFetcher`].
#[derive(Debug, Clone)]
pub struct JwksFetcherConfig {
    pub url: Url,
    pub request_timeout: Duration,
    pub max_response_size: usize,
}

impl JwksFetcherConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            request_timeout: Duration::from_secs(10),
            max_response_size: 1024 * 1024,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }
}

/// Fetches the key set over HTTP(S) with `reqwest`.
pub struct HttpKeySetFetcher {
    http_client: reqwest::Client,
    config: JwksFetcherConfig,
}

impl HttpKeySetFetcher {
    /// Creates a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`KeySetError::RemoteUnavailable`] if the HTTP client cannot be built.
    pub fn new(config: JwksFetcherConfig) -> Result<Self, KeySetError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                KeySetError::RemoteUnavailable(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn url(&self) -> &Url {
        &self.config.url
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch_key_set(&self) -> Result<KeySet, KeySetError> {
        let url = &self.config.url;
        debug!("Fetching JWKS from {}", url);

        let response = self
            .http_client
            .get(url.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to fetch JWKS from {}: {}", url, e);
                metrics::counter!("key_set_fetches_total", "outcome" => "unavailable").increment(1);
                KeySetError::RemoteUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            metrics::counter!("key_set_fetches_total", "outcome" => "unavailable").increment(1);
            return Err(KeySetError::RemoteUnavailable(format!(
                "{} answered HTTP {}",
                url,
                status.as_u16()
            )));
        }

        let max = self.config.max_response_size;
        if let Some(len) = response.content_length()
            && len as usize > max
        {
            metrics::counter!("key_set_fetches_total", "outcome" => "malformed").increment(1);
            return Err(KeySetError::MalformedKeySet(format!(
                "response exceeds maximum size of {} bytes",
                max
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            metrics::counter!("key_set_fetches_total", "outcome" => "unavailable").increment(1);
            KeySetError::RemoteUnavailable(format!("failed to read body: {}", e))
        })?;

        if body.len() > max {
            metrics::counter!("key_set_fetches_total", "outcome" => "malformed").increment(1);
            return Err(KeySetError::MalformedKeySet(format!(
                "response exceeds maximum size of {} bytes",
                max
            )));
        }

        let key_set = parse_key_set(&body).inspect_err(|e| {
            warn!("Failed to parse JWKS from {}: {}", url, e);
            metrics::counter!("key_set_fetches_total", "outcome" => "malformed").increment(1);
        })?;

        debug!("Fetched signing keys {:?} from {}", key_set.kids(), url);
        metrics::counter!("key_set_fetches_total", "outcome" => "ok").increment(1);
        Ok(key_set)
    }
}

#[derive(Deserialize)]
struct RawKeySet {
    keys: Vec<RawJwk>,
}

#[derive(Deserialize)]
struct RawJwk {
    kid: Option<String>,
    kty: Option<String>,
    alg: Option<String>,
    #[serde(rename = "use")]
    usage: Option<String>,
    n: Option<String>,
    e: Option<String>,
    crv: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

/// Parses a JWKS document into a [`KeySet`].
///
/// # Errors
///
/// Returns [`KeySetError::MalformedKeySet`] when the document or any signing
/// key in it is not well formed.
pub fn parse_key_set(body: &[u8]) -> Result<KeySet, KeySetError> {
    let raw: RawKeySet = serde_json::from_slice(body)
        .map_err(|e| KeySetError::MalformedKeySet(format!("invalid JWKS document: {}", e)))?;

    let mut keys = Vec::with_capacity(raw.keys.len());
    for (index, jwk) in raw.keys.into_iter().enumerate() {
        if jwk.usage.as_deref() == Some("enc") {
            continue;
        }
        let record = parse_key(jwk)
            .map_err(|reason| KeySetError::MalformedKeySet(format!("key #{}: {}", index, reason)))?;
        keys.push(record);
    }

    Ok(KeySet::new(keys))
}

fn parse_key(jwk: RawJwk) -> Result<KeyRecord, String> {
    let kid = jwk
        .kid
        .filter(|kid| !kid.is_empty())
        .ok_or_else(|| "missing kid".to_string())?;

    let kty = jwk.kty.ok_or_else(|| format!("{}: missing kty", kid))?;

    let material = match kty.as_str() {
        "RSA" => KeyMaterial::Rsa {
            n: component(&kid, "n", jwk.n)?,
            e: component(&kid, "e", jwk.e)?,
        },
        "EC" => KeyMaterial::Ec {
            crv: jwk.crv.ok_or_else(|| format!("{}: missing crv", kid))?,
            x: component(&kid, "x", jwk.x)?,
            y: component(&kid, "y", jwk.y)?,
        },
        "OKP" => KeyMaterial::Okp {
            crv: jwk.crv.ok_or_else(|| format!("{}: missing crv", kid))?,
            x: component(&kid, "x", jwk.x)?,
        },
        other => return Err(format!("{}: unsupported kty {}", kid, other)),
    };

    let algorithm = match jwk.alg {
        Some(alg) => Algorithm::from_str(&alg).map_err(|_| format!("{}: unsupported alg {}", kid, alg))?,
        None => default_algorithm(&material).ok_or_else(|| format!("{}: cannot infer alg", kid))?,
    };

    if !algorithm_fits(algorithm, &material) {
        return Err(format!("{}: alg {:?} does not match key type {}", kid, algorithm, kty));
    }

    Ok(KeyRecord {
        kid,
        algorithm,
        material,
    })
}

/// Requires a base64url component and checks it decodes.
fn component(kid: &str, name: &str, value: Option<String>) -> Result<String, String> {
    let value = value.ok_or_else(|| format!("{}: missing {}", kid, name))?;
    URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|_| format!("{}: {} is not base64url", kid, name))?;
    Ok(value)
}

fn default_algorithm(material: &KeyMaterial) -> Option<Algorithm> {
    match material {
        KeyMaterial::Rsa { .. } => Some(Algorithm::RS256),
        KeyMaterial::Ec { crv, .. } => match crv.as_str() {
            "P-256" => Some(Algorithm::ES256),
            "P-384" => Some(Algorithm::ES384),
            _ => None,
        },
        KeyMaterial::Okp { crv, .. } if crv == "Ed25519" => Some(Algorithm::EdDSA),
        KeyMaterial::Okp { .. } => None,
    }
}

fn algorithm_fits(algorithm: Algorithm, material: &KeyMaterial) -> bool {
    use Algorithm::*;
    match material {
        KeyMaterial::Rsa { .. } => matches!(algorithm, RS256 | RS384 | RS512 | PS256 | PS384 | PS512),
        KeyMaterial::Ec { .. } => matches!(algorithm, ES256 | ES384),
        KeyMaterial::Okp { .. } => matches!(algorithm, EdDSA),
    }
}
