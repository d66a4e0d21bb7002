//! SPA Auth Wiring Demo
//!
//! Builds an auth client the way a single-page app does at startup: load the
//! config, create the session store and crypto helpers, hand all three to the
//! client, then exercise them.
//!
//! Features:
//! - Config from --config, or the user config dir (spa-auth/config.json)
//! - Prints the derived identity provider endpoints
//! - Generates a `state` value and a PKCE-style verifier/challenge pair
//! - Optionally validates an ID token against a JWKS file
//!
//! Run with:
//!   cargo run -p spa-auth-wiring-demo -- --config demos/auth-wiring/config.example.json
//!
//! Set RUST_LOG=spa_auth=trace to see every store access.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use console::style;
use jsonwebtoken::jwk::JwkSet;
use spa_auth::{
    AuthClient, AuthClientConfig, CryptoUtils, DefaultCryptoUtils, MemorySessionStorage,
    SessionStorage, SessionStore, Store,
};

/// Auth client wiring demo
#[derive(Parser, Debug)]
#[command(name = "spa-auth-wiring-demo")]
#[command(about = "Wire a session store and crypto helpers into an auth client")]
struct Args {
    /// Path to a JSON config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// ID token to validate (requires --jwks)
    #[arg(long, requires = "jwks")]
    id_token: Option<String>,

    /// Path to a JSON Web Key Set file
    #[arg(long)]
    jwks: Option<PathBuf>,

    /// Session storage quota in bytes
    #[arg(long)]
    quota: Option<usize>,
}

/// Default config file location
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spa-auth")
        .join("config.json")
}

fn heading(text: &str) {
    println!("\n{}", style(text).bold().cyan());
}

fn field(name: &str, value: impl std::fmt::Display) {
    println!("  {:<24} {}", style(name).dim(), value);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("spa_auth=debug,warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = AuthClientConfig::from_file(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    // The app owns both collaborators and decides how long they live
    let storage = match args.quota {
        Some(quota) => MemorySessionStorage::with_quota(quota),
        None => MemorySessionStorage::new(),
    };
    let store: Arc<dyn Store> = Arc::new(SessionStore::new(storage.clone()));
    let crypto: Arc<dyn CryptoUtils> = Arc::new(DefaultCryptoUtils::new());

    let client = AuthClient::initialize(config, store, crypto.clone()).await?;

    heading("Endpoints");
    let endpoints = client.endpoints();
    field("authorize", &endpoints.authorization_endpoint);
    field("token", &endpoints.token_endpoint);
    field("jwks", &endpoints.jwks_uri);
    field("userinfo", &endpoints.userinfo_endpoint);
    field("logout", &endpoints.end_session_endpoint);
    field("issuer", &endpoints.issuer);
    field("scope", client.config().scope_string());
    field("pkce", client.config().enable_pkce);

    heading("Sign-in request values");
    let state = client.generate_state().await?;
    field("state", &state);
    if client.config().enable_pkce {
        let verifier = crypto.base64url_encode(&crypto.generate_random_bytes(32));
        let challenge = crypto.base64url_encode(&crypto.hash_sha256(verifier.as_bytes()).await);
        field("code_verifier", &verifier);
        field("code_challenge", &challenge);
        field("code_challenge_method", "S256");
    }
    field("state round-trip", client.check_state(&state).await?);

    if let (Some(id_token), Some(jwks_path)) = (args.id_token, args.jwks) {
        heading("ID token");
        let raw = std::fs::read_to_string(&jwks_path)
            .with_context(|| format!("reading {}", jwks_path.display()))?;
        let jwks: JwkSet = serde_json::from_str(&raw)?;

        match client.validate_id_token(&id_token, &jwks).await {
            Ok(claims) => {
                field("result", style("valid").green());
                for (name, value) in &claims {
                    field(name, value);
                }
            }
            Err(e) => field("result", style(e).red()),
        }
    }

    heading("Session storage");
    field("items", storage.len()?);
    field("bytes", storage.used_bytes()?);
    if let Some(quota) = storage.quota() {
        field("quota", quota);
    }

    client.clear_session().await?;
    field("after clear", storage.len()?);

    Ok(())
}
