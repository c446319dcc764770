//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod me;
pub mod products;

pub use health::health_handler;
pub use me::me_handler;
pub use products::product_list_handler;
