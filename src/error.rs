//! Error types for the SPA auth adapter

use thiserror::Error;

/// Main error type for the SPA auth adapter
#[derive(Error, Debug)]
pub enum AuthError {
    /// The session storage facility rejected an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// The session storage facility ran out of room
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded {
        /// Bytes the session would hold after the write
        needed: usize,
        /// Configured quota in bytes
        quota: usize,
    },

    /// Input was not valid base64url
    #[error("Base64url decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// JSON encode or decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key material could not be imported
    #[error("Invalid JWK: {0}")]
    InvalidJwk(String),

    /// Algorithm name is not a known JWS algorithm
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The JWT library rejected the token
    #[error("{0}")]
    JwtVerification(#[from] jsonwebtoken::errors::Error),

    /// Verification failure re-wrapped by [`crate::crypto::verify_jwt`]
    #[error("JWT verification failed: {0}")]
    Verification(String),

    /// No key in the supplied key set matches the token
    #[error("No matching key found for kid {kid:?}")]
    KeyNotFound {
        /// Key ID from the token header
        kid: Option<String>,
    },

    /// Token is not three dot-separated segments with a JSON payload
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SPA auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a quota exceeded error
    #[must_use]
    pub fn quota_exceeded(needed: usize, quota: usize) -> Self {
        Self::QuotaExceeded { needed, quota }
    }

    /// Create an invalid JWK error
    pub fn invalid_jwk(msg: impl Into<String>) -> Self {
        Self::InvalidJwk(msg.into())
    }

    /// Create an unsupported algorithm error
    pub fn unsupported_algorithm(alg: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(alg.into())
    }

    /// Create a key not found error
    #[must_use]
    pub fn key_not_found(kid: Option<String>) -> Self {
        Self::KeyNotFound { kid }
    }

    /// Create a malformed token error
    pub fn malformed_token(msg: impl Into<String>) -> Self {
        Self::MalformedToken(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether this error means the token must be treated as untrusted
    #[must_use]
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::JwtVerification(_)
                | Self::Verification(_)
                | Self::KeyNotFound { .. }
                | Self::MalformedToken(_)
                | Self::InvalidJwk(_)
                | Self::UnsupportedAlgorithm(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_message_prefix() {
        let err = AuthError::Verification("InvalidSignature".to_string());
        assert_eq!(err.to_string(), "JWT verification failed: InvalidSignature");
    }

    #[test]
    fn test_quota_exceeded_display() {
        let err = AuthError::quota_exceeded(120, 100);
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded: 120 bytes needed, 100 bytes allowed"
        );
    }

    #[test]
    fn test_is_verification_failure() {
        assert!(AuthError::key_not_found(Some("k1".into())).is_verification_failure());
        assert!(AuthError::malformed_token("two segments").is_verification_failure());
        assert!(!AuthError::storage("disk full").is_verification_failure());
        assert!(!AuthError::invalid_config("no client id").is_verification_failure());
    }
}
