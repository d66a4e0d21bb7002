//! Default [`CryptoUtils`] implementation

use async_trait::async_trait;
use jsonwebtoken::jwk::Jwk;
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::CryptoUtils;
use super::base64url::{base64url_decode, base64url_encode};
use super::jwt::{self, Claims, JwtVerifyOptions};
use crate::error::Result;

/// Crypto helpers backed by `sha2`, `rand`, `base64` and `jsonwebtoken`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCryptoUtils;

impl DefaultCryptoUtils {
    /// Create the helper
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CryptoUtils for DefaultCryptoUtils {
    fn base64url_encode(&self, value: &[u8]) -> String {
        base64url_encode(value)
    }

    fn base64url_decode(&self, value: &str) -> Result<Vec<u8>> {
        base64url_decode(value)
    }

    async fn hash_sha256(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    fn generate_random_bytes(&self, length: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; length];
        rand::rng().fill_bytes(&mut bytes);
        bytes
    }

    async fn verify_jwt(
        &self,
        id_token: &str,
        jwk: &Jwk,
        algorithms: &[String],
        client_id: &str,
        issuer: &str,
        subject: &str,
        clock_tolerance: u64,
    ) -> Result<Claims> {
        let options = JwtVerifyOptions {
            algorithms: algorithms.to_vec(),
            audience: client_id.to_string(),
            issuer: issuer.to_string(),
            subject: subject.to_string(),
            clock_tolerance,
        };

        let claims = jwt::verify_with_jwk(id_token, jwk, &options).inspect_err(|e| {
            tracing::warn!(error = %e, issuer, "JWT verification failed");
        })?;
        tracing::debug!(subject, claims = claims.len(), "JWT verified");
        Ok(claims)
    }
}
