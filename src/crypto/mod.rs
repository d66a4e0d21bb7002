//! Cryptographic capabilities required by the auth client
//!
//! The client never calls a crypto library directly. It goes through the
//! [`CryptoUtils`] trait, so an application can swap in a platform-specific
//! implementation. [`DefaultCryptoUtils`] covers the usual case with `sha2`,
//! `rand`, `base64` and `jsonwebtoken`.
//!
//! # Example
//!
//! ```
//! use spa_auth::crypto::{CryptoUtils, DefaultCryptoUtils};
//!
//! # async fn example() -> spa_auth::Result<()> {
//! let crypto = DefaultCryptoUtils::new();
//! let verifier = crypto.base64url_encode(&crypto.generate_random_bytes(32));
//! let challenge = crypto.base64url_encode(&crypto.hash_sha256(verifier.as_bytes()).await);
//! assert_eq!(challenge.len(), 43);
//! # Ok(())
//! # }
//! ```

pub mod base64url;
pub mod jwt;
pub mod native;

use async_trait::async_trait;
use jsonwebtoken::jwk::Jwk;

use crate::error::Result;

/// Crypto capability trait required by the auth client
#[async_trait]
pub trait CryptoUtils: Send + Sync {
    /// Encode bytes as unpadded base64url
    fn base64url_encode(&self, value: &[u8]) -> String;

    /// Decode base64url (padded or not) into bytes
    ///
    /// # Errors
    /// Returns `AuthError::Base64` on malformed input
    fn base64url_decode(&self, value: &str) -> Result<Vec<u8>>;

    /// SHA-256 digest of `data`
    async fn hash_sha256(&self, data: &[u8]) -> Vec<u8>;

    /// Exactly `length` bytes from a cryptographically secure source
    fn generate_random_bytes(&self, length: usize) -> Vec<u8>;

    /// Verify a JWT and return its claims
    ///
    /// # Arguments
    ///
    /// * `id_token` - Compact-serialized token
    /// * `jwk` - Public key (or shared secret) the token must be signed with
    /// * `algorithms` - Allowed signature algorithms
    /// * `client_id` - Expected audience
    /// * `issuer` - Expected issuer
    /// * `subject` - Expected subject
    /// * `clock_tolerance` - Leeway in seconds for `exp` and `nbf`
    ///
    /// # Errors
    /// Returns an error if the token must not be trusted
    #[allow(clippy::too_many_arguments)]
    async fn verify_jwt(
        &self,
        id_token: &str,
        jwk: &Jwk,
        algorithms: &[String],
        client_id: &str,
        issuer: &str,
        subject: &str,
        clock_tolerance: u64,
    ) -> Result<jwt::Claims>;
}

// Blanket implementation for boxed trait objects
#[async_trait]
impl CryptoUtils for Box<dyn CryptoUtils> {
    fn base64url_encode(&self, value: &[u8]) -> String {
        (**self).base64url_encode(value)
    }

    fn base64url_decode(&self, value: &str) -> Result<Vec<u8>> {
        (**self).base64url_decode(value)
    }

    async fn hash_sha256(&self, data: &[u8]) -> Vec<u8> {
        (**self).hash_sha256(data).await
    }

    fn generate_random_bytes(&self, length: usize) -> Vec<u8> {
        (**self).generate_random_bytes(length)
    }

    #[allow(clippy::too_many_arguments)]
    async fn verify_jwt(
        &self,
        id_token: &str,
        jwk: &Jwk,
        algorithms: &[String],
        client_id: &str,
        issuer: &str,
        subject: &str,
        clock_tolerance: u64,
    ) -> Result<jwt::Claims> {
        (**self)
            .verify_jwt(
                id_token,
                jwk,
                algorithms,
                client_id,
                issuer,
                subject,
                clock_tolerance,
            )
            .await
    }
}

pub use jwt::{Claims, JwtVerifyOptions, verify_jwt};
pub use native::DefaultCryptoUtils;
