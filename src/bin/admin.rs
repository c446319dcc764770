//! CLI administration tool for catalog-service.
//!
//! Inspects the identity provider's signing keys, verifies tokens offline
//! from the service and checks store connectivity, using the same
//! environment as the server.
//!
//! # Usage
//!
//! ```bash
//! # Show the key set currently published by the identity provider
//! cargo run --bin admin -- keys fetch
//!
//! # Drop the cached key set so the service refetches on the next request
//! cargo run --bin admin -- keys flush
//!
//! # Verify a bearer token and print its claims
//! cargo run --bin admin -- token verify eyJraWQiOi...
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see `catalog_service::config`.

use catalog_service::application::services::{SIGNING_KEYS_CACHE_KEY, TokenVerifier};
use catalog_service::config::{self, Config, mask_connection_string};
use catalog_service::infrastructure::cache::{
    CacheService, DEFAULT_KEY_PREFIX, KeyCache, NullCache, RedisCache,
};
use catalog_service::infrastructure::connection::{
    CacheSupervisor, DatabaseSupervisor, PgConnector, RedisConnector,
};
use catalog_service::infrastructure::identity::{
    HttpKeySetFetcher, JwksFetcherConfig, KeySetFetcher,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// CLI tool for operating catalog-service.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Signing-key set operations
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Bearer token operations
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Signing-key subcommands.
#[derive(Subcommand)]
enum KeysAction {
    /// Fetch and list the published key set
    Fetch,

    /// Remove the cached key set from Redis
    Flush {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Verify a token and print its claims
    Verify {
        /// Raw JWT (without the `Bearer ` prefix)
        token: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Keys { action } => handle_keys_action(action, &config).await?,
        Commands::Token { action } => handle_token_action(action, &config).await?,
        Commands::Db { action } => handle_db_action(action, &config).await?,
    }

    Ok(())
}

fn build_fetcher(config: &Config) -> Result<HttpKeySetFetcher> {
    let url = Url::parse(&config.jwks_url).context("Invalid JWKS_URL")?;
    let fetcher = HttpKeySetFetcher::new(
        JwksFetcherConfig::new(url)
            .with_request_timeout(Duration::from_secs(config.jwks_timeout_seconds)),
    )?;
    Ok(fetcher)
}

/// Dispatches signing-key commands.
async fn handle_keys_action(action: KeysAction, config: &Config) -> Result<()> {
    match action {
        KeysAction::Fetch => fetch_keys(config).await,
        KeysAction::Flush { yes } => flush_keys(config, yes).await,
    }
}

/// Lists every key of the published set.
///
/// # Output Format
///
/// ```text
/// 🔑 Signing keys from https://cognito-idp.../jwks.json
///
///   Kid                                          Algorithm  Type
///   ──────────────────────────────────────────────────────────────
///   1a2b3c...                                    RS256      RSA
/// ```
async fn fetch_keys(config: &Config) -> Result<()> {
    println!(
        "{} {}",
        "🔑 Signing keys from".bright_blue().bold(),
        config.jwks_url.bright_white()
    );
    println!();

    let key_set = build_fetcher(config)?
        .fetch_key_set()
        .await
        .context("Failed to fetch key set")?;

    if key_set.is_empty() {
        println!("{}", "  The identity provider publishes no signing keys".yellow());
        return Ok(());
    }

    println!(
        "  {:<44} {:<10} {:<5}",
        "Kid".bright_white().bold(),
        "Algorithm".bright_white().bold(),
        "Type".bright_white().bold()
    );
    println!("  {}", "─".repeat(62).bright_black());

    for key in &key_set.keys {
        println!(
            "  {:<44} {:<10} {}",
            key.kid.cyan(),
            format!("{:?}", key.algorithm).bright_white(),
            key.material.key_type().bright_black()
        );
    }

    println!();
    println!(
        "  Total: {}",
        key_set.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deletes the cached key set so the service refetches it on the next request.
async fn flush_keys(config: &Config, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Flush cached signing keys".bright_blue().bold());
    println!();

    let redis_url = config
        .redis_url
        .as_ref()
        .context("Redis is not configured; each service process holds its own in-memory key cache")?;

    println!("  Redis: {}", mask_connection_string(redis_url).cyan());
    println!(
        "  Key:   {}{}",
        DEFAULT_KEY_PREFIX.cyan(),
        SIGNING_KEYS_CACHE_KEY.cyan()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Flush the cached key set?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let supervisor = CacheSupervisor::new(RedisConnector::new(redis_url.clone()), config.retry_policy());
    let result = async {
        let manager = supervisor.connect().await?;
        let cache = KeyCache::new(Arc::new(RedisCache::new(manager, DEFAULT_KEY_PREFIX)));
        cache
            .invalidate(SIGNING_KEYS_CACHE_KEY)
            .await
            .context("Failed to delete cached key set")
    }
    .await;
    supervisor.disconnect().await;
    result?;

    println!("{}", "✅ Cached key set flushed".green().bold());
    println!();

    Ok(())
}

/// Dispatches token commands.
async fn handle_token_action(action: TokenAction, config: &Config) -> Result<()> {
    match action {
        TokenAction::Verify { token } => verify_token(config, &token).await,
    }
}

/// Verifies a token with a fresh key set and prints the outcome.
async fn verify_token(config: &Config, token: &str) -> Result<()> {
    println!("{}", "🔍 Verifying token...".bright_blue());
    println!();

    let store: Arc<dyn CacheService> = Arc::new(NullCache::new());
    let verifier = TokenVerifier::new(
        KeyCache::new(store),
        Arc::new(build_fetcher(config)?),
        config.verifier_config(),
    );

    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    match verifier.verify(Some(token)).await {
        Ok(claims) => {
            println!("{}", "✅ Token is valid".green().bold());
            println!();
            println!("  Subject: {}", claims.subject.cyan());
            if let Some(email) = &claims.email {
                println!("  Email:   {}", email.cyan());
            }
            if let Some(name) = &claims.name {
                println!("  Name:    {}", name.cyan());
            }
            println!("  Issued:  {}", format_timestamp(claims.issued_at).bright_black());
            println!("  Expires: {}", format_timestamp(claims.expires_at).bright_black());
            println!();
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "❌ Token rejected:".red().bold(), e.kind().red());
            println!("  {}", e.to_string().bright_black());
            println!();
            anyhow::bail!("token rejected ({})", e.kind())
        }
    }
}

fn format_timestamp(seconds: i64) -> String {
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());
            println!(
                "  Database: {}",
                mask_connection_string(&config.database_url).cyan()
            );

            let supervisor = DatabaseSupervisor::new(
                PgConnector::new(
                    config.database_url.clone(),
                    1,
                    Duration::from_secs(config.db_connect_timeout),
                ),
                config.retry_policy(),
            );

            let result = async {
                let pool = supervisor.connect().await?;
                let products: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM products WHERE deleted_at IS NULL",
                )
                .fetch_one(&pool)
                .await
                .context("Catalog tables are not readable")?;
                anyhow::Ok(products)
            }
            .await;
            supervisor.disconnect().await;
            let products = result?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!(
                "  Products: {}",
                products.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}
