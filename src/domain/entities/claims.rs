//! Identity claims extracted from a verified bearer token.

use serde::{Deserialize, Serialize};

/// Claims of a token whose signature and validity window have been checked.
///
/// Lives for a single request and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaims {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub issued_at: i64,
    pub expires_at: i64,
}
