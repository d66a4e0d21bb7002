//! # SPA Auth
//!
//! Storage and crypto plumbing for an OpenID Connect client running in a
//! single-page application. Async/await, strong typing, executor-agnostic.
//!
//! ## Quick Start
//!
//! Build the collaborators once and hand them to [`AuthClient::initialize`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use spa_auth::{
//!     AuthClient, AuthClientConfig, CryptoUtils, DefaultCryptoUtils, MemorySessionStorage,
//!     SessionStore, Store,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthClientConfig::builder()
//!         .sign_in_redirect_url("http://localhost:5173/")
//!         .sign_out_redirect_url("http://localhost:5173/")
//!         .client_id("my-client-id")
//!         .base_url("https://api.asgardeo.io/t/my-org")
//!         .enable_pkce(false)
//!         .scope(vec!["openid".to_string(), "profile".to_string()])
//!         .build();
//!
//!     let store: Arc<dyn Store> = Arc::new(SessionStore::new(MemorySessionStorage::new()));
//!     let crypto: Arc<dyn CryptoUtils> = Arc::new(DefaultCryptoUtils::new());
//!
//!     let client = AuthClient::initialize(config, store, crypto).await?;
//!     println!("Authorize at {}", client.endpoints().authorization_endpoint);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Pieces
//!
//! ### 1. Session-backed [`Store`]
//!
//! [`SessionStore`] adapts any [`SessionStorage`] facility to the async
//! [`Store`] contract. Values live for the session and are never persisted.
//!
//! ### 2. [`CryptoUtils`]
//!
//! base64url, SHA-256, secure random bytes and JWT verification. The default
//! implementation is [`DefaultCryptoUtils`]; a free [`crypto::verify_jwt`]
//! runs the same checks and reports every failure as
//! [`AuthError::Verification`].
//!
//! ### 3. [`AuthClient`]
//!
//! Validates the [`AuthClientConfig`], persists it through the
//! [`DataLayer`] and exposes session, temporary data and ID token
//! validation on top of the injected store and crypto.
//!
//! ## Architecture
//!
//! - [`config`]: Client configuration and derived endpoints
//! - [`store`]: Store contract and the session-backed store
//! - [`crypto`]: Crypto capability trait and default implementation
//! - [`data_layer`]: Namespaced records kept in the store
//! - [`client`]: The auth client wiring
//! - [`error`]: Error types and handling
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tracing events are always emitted but are zero-cost when no subscriber is attached.
//! Tokens are never logged in full. To see logs, attach a tracing subscriber in
//! your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, AuthError>`](Result):
//!
//! ```no_run
//! # use spa_auth::{AuthClient, AuthError};
//! # use jsonwebtoken::jwk::JwkSet;
//! # async fn example(client: AuthClient, id_token: &str, jwks: JwkSet) {
//! match client.validate_id_token(id_token, &jwks).await {
//!     Ok(claims) => println!("Signed in as {:?}", claims.get("sub")),
//!     Err(e) if e.is_verification_failure() => eprintln!("Rejected ID token: {e}"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! # }
//! ```
//!
//! ## Requirements
//!
//! - Rust 1.85.0 or later

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod crypto;
pub mod data_layer;
pub mod error;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use client::{AuthClient, AuthClientBuilder};
pub use config::{AuthClientConfig, DEFAULT_CLOCK_TOLERANCE, MAX_CLOCK_TOLERANCE, OidcEndpoints};
pub use crypto::{Claims, CryptoUtils, DefaultCryptoUtils, JwtVerifyOptions, verify_jwt};
pub use data_layer::{DataLayer, Namespace, SessionData};
pub use error::{AuthError, Result};
pub use store::{MemorySessionStorage, SessionStorage, SessionStore, Store};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
