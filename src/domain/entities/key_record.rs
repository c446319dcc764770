//! Signing-key records published by the identity provider.

use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Serialize};

/// Public key material in its native JWK encoding (base64url components).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum KeyMaterial {
    #[serde(rename = "RSA")]
    Rsa { n: String, e: String },
    #[serde(rename = "EC")]
    Ec { crv: String, x: String, y: String },
    #[serde(rename = "OKP")]
    Okp { crv: String, x: String },
}

impl KeyMaterial {
    /// JWK `kty` value.
    pub fn key_type(&self) -> &'static str {
        match self {
            KeyMaterial::Rsa { .. } => "RSA",
            KeyMaterial::Ec { .. } => "EC",
            KeyMaterial::Okp { .. } => "OKP",
        }
    }
}

/// A single verification key from the identity provider's key set.
///
/// Records are immutable once fetched. A refetch replaces the whole
/// [`KeySet`]; individual records are never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub kid: String,
    pub algorithm: Algorithm,
    pub material: KeyMaterial,
}

impl KeyRecord {
    /// Builds the `jsonwebtoken` decoding key for this record.
    ///
    /// # Errors
    ///
    /// Returns the underlying `jsonwebtoken` error when the components are not
    /// valid base64url or do not form a usable key.
    pub fn decoding_key(&self) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
        match &self.material {
            KeyMaterial::Rsa { n, e } => DecodingKey::from_rsa_components(n, e),
            KeyMaterial::Ec { x, y, .. } => DecodingKey::from_ec_components(x, y),
            KeyMaterial::Okp { x, .. } => DecodingKey::from_ed_components(x),
        }
    }
}

/// Ordered set of signing keys, as fetched in one round trip.
///
/// Cached as a single unit so a rotation is picked up only when the whole
/// entry is refetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    pub keys: Vec<KeyRecord>,
}

impl KeySet {
    pub fn new(keys: Vec<KeyRecord>) -> Self {
        Self { keys }
    }

    /// Finds the record with the given key id.
    pub fn find(&self, kid: &str) -> Option<&KeyRecord> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key ids in publication order.
    pub fn kids(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.kid.as_str()).collect()
    }
}
