//! Auth client wiring
//!
//! [`AuthClient`] is the object an application builds once at startup. It
//! receives the configuration, a [`Store`] and a [`CryptoUtils`] explicitly,
//! so the application decides their lifetime:
//!
//! ```text
//!   AuthClientConfig ──┐
//!   Arc<dyn Store> ────┼──► AuthClient::initialize() ──► DataLayer (config, endpoints)
//!   Arc<dyn CryptoUtils>┘          │
//!                                  ├─► session data / temporary data
//!                                  └─► ID token validation (CryptoUtils::verify_jwt)
//! ```
//!
//! The client does not talk to the identity provider. Tokens and key sets are
//! handed to it by whoever performed the exchange.

use std::sync::Arc;

use jsonwebtoken::jwk::JwkSet;
use serde_json::Value;

use crate::config::{AuthClientConfig, OidcEndpoints};
use crate::crypto::jwt::{self, Claims};
use crate::crypto::{CryptoUtils, DefaultCryptoUtils};
use crate::data_layer::{DataLayer, Namespace, SessionData};
use crate::error::{AuthError, Result};
use crate::store::{MemorySessionStorage, SessionStore, Store};
use crate::utils::{redact, split_compact_jwt};

/// Temporary-data key holding the pending `state` parameter
pub const STATE_KEY: &str = "state";

/// Random bytes behind a generated `state` value
const STATE_BYTES: usize = 32;

/// Builder for [`AuthClient`]
#[derive(Default)]
pub struct AuthClientBuilder {
    config: Option<AuthClientConfig>,
    store: Option<Arc<dyn Store>>,
    crypto: Option<Arc<dyn CryptoUtils>>,
    instance_id: u32,
}

impl AuthClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client configuration (required)
    #[must_use]
    pub fn config(mut self, config: AuthClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the store (default: a fresh in-memory session)
    #[must_use]
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the crypto helper (default: [`DefaultCryptoUtils`])
    #[must_use]
    pub fn crypto(mut self, crypto: Arc<dyn CryptoUtils>) -> Self {
        self.crypto = Some(crypto);
        self
    }

    /// Set the instance number used to namespace stored records (default: 0)
    #[must_use]
    pub fn instance_id(mut self, instance_id: u32) -> Self {
        self.instance_id = instance_id;
        self
    }

    /// Validate the config, persist it and return the client
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfig` if no config was set or it fails
    /// validation, or the store's error if persisting fails.
    pub async fn initialize(self) -> Result<AuthClient> {
        let config = self
            .config
            .ok_or_else(|| AuthError::invalid_config("no configuration supplied"))?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(SessionStore::new(MemorySessionStorage::new())));
        let crypto = self
            .crypto
            .unwrap_or_else(|| Arc::new(DefaultCryptoUtils::new()));

        AuthClient::initialize_instance(config, store, crypto, self.instance_id).await
    }
}

/// Authentication client for a single-page application
#[derive(Clone)]
pub struct AuthClient {
    config: AuthClientConfig,
    endpoints: OidcEndpoints,
    store: Arc<dyn Store>,
    crypto: Arc<dyn CryptoUtils>,
    data_layer: DataLayer,
    instance_id: u32,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints)
            .field("instance_id", &self.instance_id)
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    /// Create a builder for custom wiring
    #[must_use]
    pub fn builder() -> AuthClientBuilder {
        AuthClientBuilder::new()
    }

    /// Initialize a client with instance number 0
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfig` if the config fails validation, or
    /// the store's error if persisting it fails.
    pub async fn initialize(
        config: AuthClientConfig,
        store: Arc<dyn Store>,
        crypto: Arc<dyn CryptoUtils>,
    ) -> Result<Self> {
        Self::initialize_instance(config, store, crypto, 0).await
    }

    async fn initialize_instance(
        config: AuthClientConfig,
        store: Arc<dyn Store>,
        crypto: Arc<dyn CryptoUtils>,
        instance_id: u32,
    ) -> Result<Self> {
        config.validate()?;

        let endpoints = config.endpoints();
        let data_layer = DataLayer::new(store.clone(), instance_id, config.client_id.clone());
        data_layer.set_config_data(&config).await?;
        data_layer.set_oidc_provider_meta_data(&endpoints).await?;

        tracing::debug!(
            client_id = %config.client_id,
            base_url = %config.base_url,
            pkce = config.enable_pkce,
            instance_id,
            "Auth client initialized"
        );

        Ok(Self {
            config,
            endpoints,
            store,
            crypto,
            data_layer,
            instance_id,
        })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &AuthClientConfig {
        &self.config
    }

    /// Get the identity provider endpoints
    #[must_use]
    pub fn endpoints(&self) -> &OidcEndpoints {
        &self.endpoints
    }

    /// Get the store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Get the crypto helper
    #[must_use]
    pub fn crypto(&self) -> &Arc<dyn CryptoUtils> {
        &self.crypto
    }

    /// Get the data layer for this instance
    #[must_use]
    pub fn data_layer(&self) -> &DataLayer {
        &self.data_layer
    }

    /// Instance number used to namespace stored records
    #[must_use]
    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    /// Save the signed-in user's tokens
    ///
    /// # Errors
    ///
    /// Returns store or JSON errors.
    pub async fn set_session_data(&self, session: &SessionData) -> Result<()> {
        tracing::debug!(
            access_token = %redact(&session.access_token),
            expires_in = ?session.expires_in,
            "Storing session data"
        );
        self.data_layer.set_session_data(session).await
    }

    /// Load the signed-in user's tokens
    ///
    /// # Errors
    ///
    /// Returns store or JSON errors.
    pub async fn session_data(&self) -> Result<Option<SessionData>> {
        self.data_layer.session_data().await
    }

    /// Current access token, if one is stored
    ///
    /// # Errors
    ///
    /// Returns store or JSON errors.
    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.session_data().await?.map(|s| s.access_token))
    }

    /// Check if a non-expired access token is stored
    pub async fn is_authenticated(&self) -> bool {
        match self.session_data().await {
            Ok(Some(session)) => !session.access_token.is_empty() && !session.is_expired(),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read session data");
                false
            }
        }
    }

    /// Forget the signed-in user and any in-flight values
    ///
    /// # Errors
    ///
    /// Returns the store's error if a removal fails.
    pub async fn clear_session(&self) -> Result<()> {
        self.data_layer.remove(Namespace::SessionData).await?;
        self.data_layer.remove(Namespace::TemporaryData).await?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    /// Set one temporary value
    ///
    /// # Errors
    ///
    /// Returns store or JSON errors.
    pub async fn set_temporary_data(&self, key: &str, value: Value) -> Result<()> {
        self.data_layer.set_temporary_data_parameter(key, value).await
    }

    /// Get one temporary value
    ///
    /// # Errors
    ///
    /// Returns store or JSON errors.
    pub async fn temporary_data(&self, key: &str) -> Result<Option<Value>> {
        self.data_layer.temporary_data_parameter(key).await
    }

    /// Generate a fresh `state` value and remember it
    ///
    /// # Errors
    ///
    /// Returns store or JSON errors.
    pub async fn generate_state(&self) -> Result<String> {
        let state = self
            .crypto
            .base64url_encode(&self.crypto.generate_random_bytes(STATE_BYTES));
        self.set_temporary_data(STATE_KEY, Value::String(state.clone()))
            .await?;
        Ok(state)
    }

    /// Compare `received` with the remembered `state` and forget it
    ///
    /// Returns `false` when nothing was remembered or the values differ.
    ///
    /// # Errors
    ///
    /// Returns store or JSON errors.
    pub async fn check_state(&self, received: &str) -> Result<bool> {
        let expected = self.temporary_data(STATE_KEY).await?;
        self.data_layer
            .remove_temporary_data_parameter(STATE_KEY)
            .await?;
        Ok(matches!(expected, Some(Value::String(ref s)) if s == received))
    }

    /// Decode the payload of an ID token without verifying it
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedToken` if the token is not a compact JWT
    /// with a JSON object payload.
    pub fn decode_id_token_payload(&self, id_token: &str) -> Result<Claims> {
        let (_, payload, _) = split_compact_jwt(id_token)
            .ok_or_else(|| AuthError::malformed_token("expected three dot-separated segments"))?;
        let bytes = self
            .crypto
            .base64url_decode(payload)
            .map_err(|e| AuthError::malformed_token(format!("payload: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::malformed_token(format!("payload: {e}")))
    }

    /// Verify an ID token against the provider's key set
    ///
    /// The key is chosen by the token's `kid`. The audience is the client ID,
    /// the issuer comes from [`OidcEndpoints::issuer`], and the subject is
    /// the token's own `sub`. When ID token validation is disabled in the
    /// config the payload is decoded without any check.
    ///
    /// # Errors
    ///
    /// Returns an error for which [`AuthError::is_verification_failure`] holds
    /// if the token must not be trusted.
    pub async fn validate_id_token(&self, id_token: &str, jwks: &JwkSet) -> Result<Claims> {
        let payload = self.decode_id_token_payload(id_token)?;
        if !self.config.validate_id_token {
            tracing::debug!("ID token validation disabled, returning unverified claims");
            return Ok(payload);
        }

        let subject = payload
            .get("sub")
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::malformed_token("missing sub claim"))?;

        let header = jwt::decode_header(id_token)?;
        let jwk = jwt::select_jwk(jwks, header.kid.as_deref())?;

        tracing::debug!(
            id_token = %redact(id_token),
            kid = ?header.kid,
            "Validating ID token"
        );

        self.crypto
            .verify_jwt(
                id_token,
                jwk,
                &self.config.id_token_signing_algorithms,
                &self.config.client_id,
                &self.endpoints.issuer,
                subject,
                self.config.clock_tolerance,
            )
            .await
    }
}
