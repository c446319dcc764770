//! Identity-provider integration: signing-key set retrieval.

mod jwks_fetcher;

pub use jwks_fetcher::{
    HttpKeySetFetcher, JwksFetcherConfig, KeySetError, KeySetFetcher, parse_key_set, pool_issuer,
    pool_jwks_url,
};

#[cfg(test)]
pub use jwks_fetcher::MockKeySetFetcher;
