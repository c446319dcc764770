use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read model of a catalog product as served by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}
