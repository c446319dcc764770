//! Bearer token verification against the identity provider's rotating key set.
//!
//! Each call runs strictly in order:
//!
//! 1. reject an absent token
//! 2. decode the unverified header and read `kid`
//! 3. resolve `kid` from the cached key set, fetching the whole set on a miss
//! 4. check signature, `exp`/`iat` (with clock tolerance) and issuer
//! 5. return [`VerifiedClaims`]
//!
//! The key set is cached as one entry. A `kid` missing from a still-fresh
//! entry is rejected without refetching, so a newly rotated key is accepted
//! only after the entry expires. Lower `keys_ttl_seconds` to shorten that delay.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Validation, decode, decode_header};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::entities::{KeyRecord, KeySet, VerifiedClaims};
use crate::infrastructure::cache::KeyCache;
use crate::infrastructure::identity::{KeySetError, KeySetFetcher};

/// Cache key under which the whole signing-key set is stored.
pub const SIGNING_KEYS_CACHE_KEY: &str = "signing-keys";

/// Why a token was rejected.
///
/// Every variant is reported to clients as the same `401 Unauthorized`.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no bearer token supplied")]
    MissingToken,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("no signing key with kid {0}")]
    UnknownSigningKey(String),

    #[error("signature rejected: {0}")]
    SignatureInvalid(String),

    #[error("token outside its validity window")]
    TokenExpired,

    #[error("identity provider unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("malformed key set: {0}")]
    MalformedKeySet(String),
}

impl VerifyError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::MissingToken => "missing_token",
            VerifyError::MalformedToken(_) => "malformed_token",
            VerifyError::UnknownSigningKey(_) => "unknown_signing_key",
            VerifyError::SignatureInvalid(_) => "signature_invalid",
            VerifyError::TokenExpired => "token_expired",
            VerifyError::RemoteUnavailable(_) => "remote_unavailable",
            VerifyError::MalformedKeySet(_) => "malformed_key_set",
        }
    }

    /// `true` for failures operators must look at (key set unreachable or broken),
    /// as opposed to a bad token from the caller.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            VerifyError::RemoteUnavailable(_) | VerifyError::MalformedKeySet(_)
        )
    }
}

impl From<KeySetError> for VerifyError {
    fn from(e: KeySetError) -> Self {
        match e {
            KeySetError::RemoteUnavailable(reason) => VerifyError::RemoteUnavailable(reason),
            KeySetError::MalformedKeySet(reason) => VerifyError::MalformedKeySet(reason),
        }
    }
}

/// Upper bound on the clock tolerance; larger values are clamped.
pub const MAX_CLOCK_TOLERANCE_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Tunables for [`TokenVerifier`].
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Freshness window of the cached key set.
    pub keys_ttl_seconds: u64,
    /// Leeway applied to `exp` and `iat`, at most [`MAX_CLOCK_TOLERANCE_SECONDS`].
    pub clock_tolerance_seconds: u64,
    /// Required `iss` value; `None` skips the issuer check.
    pub issuer: Option<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            keys_ttl_seconds: 3 * 60 * 60,
            clock_tolerance_seconds: 5 * 60 * 60,
            issuer: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    #[serde(rename = "cognito:username")]
    username: Option<String>,
    iat: i64,
    exp: i64,
}

/// Verifies bearer tokens; shared by all request tasks.
pub struct TokenVerifier {
    cache: KeyCache,
    fetcher: Arc<dyn KeySetFetcher>,
    config: VerifierConfig,
}

impl TokenVerifier {
    pub fn new(cache: KeyCache, fetcher: Arc<dyn KeySetFetcher>, mut config: VerifierConfig) -> Self {
        config.clock_tolerance_seconds = config
            .clock_tolerance_seconds
            .min(MAX_CLOCK_TOLERANCE_SECONDS);

        Self {
            cache,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verifies `token` and extracts its claims.
    ///
    /// # Errors
    ///
    /// Returns the [`VerifyError`] of the first step that rejects the token.
    /// A key-set fetch failure fails this call immediately; it is not retried.
    pub async fn verify(&self, token: Option<&str>) -> Result<VerifiedClaims, VerifyError> {
        let result = self.run(token).await;

        let outcome = match &result {
            Ok(_) => "valid",
            Err(e) => e.kind(),
        };
        metrics::counter!("token_verifications_total", "outcome" => outcome).increment(1);

        result
    }

    async fn run(&self, token: Option<&str>) -> Result<VerifiedClaims, VerifyError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(VerifyError::MissingToken)?;

        let kid = header_kid(token)?;
        let key = self.resolve_key(&kid).await?;
        let claims = self.check(token, &key)?;

        debug!("Token verified for subject {} (kid {})", claims.subject, kid);
        Ok(claims)
    }

    /// Finds `kid` in the cached key set, fetching and caching the set on a miss.
    async fn resolve_key(&self, kid: &str) -> Result<KeyRecord, VerifyError> {
        if let Some(key_set) = self.cache.get::<KeySet>(SIGNING_KEYS_CACHE_KEY).await {
            return key_set
                .find(kid)
                .cloned()
                .ok_or_else(|| VerifyError::UnknownSigningKey(kid.to_string()));
        }

        let key_set = self.fetcher.fetch_key_set().await?;

        if let Err(e) = self
            .cache
            .set(SIGNING_KEYS_CACHE_KEY, &key_set, self.config.keys_ttl_seconds)
            .await
        {
            warn!("Failed to cache signing keys: {}", e);
        }

        key_set
            .find(kid)
            .cloned()
            .ok_or_else(|| VerifyError::UnknownSigningKey(kid.to_string()))
    }

    fn check(&self, token: &str, key: &KeyRecord) -> Result<VerifiedClaims, VerifyError> {
        let decoding_key = key
            .decoding_key()
            .map_err(|e| VerifyError::MalformedKeySet(format!("key {}: {}", key.kid, e)))?;

        let tolerance = self.config.clock_tolerance_seconds;

        let mut validation = Validation::new(key.algorithm);
        validation.leeway = tolerance;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => VerifyError::TokenExpired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::MissingRequiredClaim(_) => VerifyError::MalformedToken(e.to_string()),
                _ => VerifyError::SignatureInvalid(e.to_string()),
            }
        })?;

        let claims = data.claims;

        // jsonwebtoken does not look at iat
        let tolerance = i64::try_from(tolerance).unwrap_or(i64::MAX);
        if claims.iat > Utc::now().timestamp().saturating_add(tolerance) {
            return Err(VerifyError::TokenExpired);
        }

        Ok(VerifiedClaims {
            subject: claims.sub,
            email: claims.email,
            name: claims.name.or(claims.username),
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

/// Reads `kid` from the protected header without verifying anything.
fn header_kid(token: &str) -> Result<String, VerifyError> {
    if token.split('.').count() != 3 {
        return Err(VerifyError::MalformedToken(
            "expected three dot-separated segments".to_string(),
        ));
    }

    let header = decode_header(token).map_err(|e| VerifyError::MalformedToken(e.to_string()))?;

    header
        .kid
        .filter(|kid| !kid.is_empty())
        .ok_or_else(|| VerifyError::MalformedToken("header has no kid".to_string()))
}
