//! Namespaced JSON records kept in the [`Store`]
//!
//! Each client instance owns four records, one per [`Namespace`], stored under
//! `"<namespace>-instance_<n>-<clientID>"`. Two clients with different
//! instance numbers or client IDs can share one store without clashing.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{AuthClientConfig, OidcEndpoints};
use crate::error::Result;
use crate::store::Store;

/// Seconds before expiry at which an access token is treated as expired
pub const EXPIRY_BUFFER_SECS: u64 = 60;

/// Record kinds kept per client instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// The client configuration
    ConfigData,
    /// Identity provider endpoints
    OidcProviderMetaData,
    /// Tokens of the signed-in user
    SessionData,
    /// In-flight values such as the `state` parameter
    TemporaryData,
}

impl Namespace {
    /// Key prefix for this namespace
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::ConfigData => "config_data",
            Namespace::OidcProviderMetaData => "oidc_provider_meta_data",
            Namespace::SessionData => "session_data",
            Namespace::TemporaryData => "temporary_data",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Tokens of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Access token for API calls
    pub access_token: String,

    /// ID token issued with the access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Refresh token for obtaining new access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Scopes granted to the access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Lifetime of the access token in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Unix timestamp when the tokens were stored
    pub created_at: u64,
}

impl SessionData {
    /// Create session data stamped with the current time
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: None,
            refresh_token: None,
            token_type: default_token_type(),
            scope: None,
            expires_in,
            created_at: now_secs(),
        }
    }

    /// Attach an ID token
    #[must_use]
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// Attach a refresh token
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Attach the granted scope string
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Unix timestamp when the access token expires, if known
    ///
    /// Saturates at `u64::MAX`, so an oversized lifetime reads as never
    /// expiring.
    #[must_use]
    pub fn expires_at(&self) -> Option<u64> {
        self.expires_in.map(|secs| self.created_at.saturating_add(secs))
    }

    /// Check if the access token is expired (with 60 second buffer)
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let deadline = now_secs().saturating_add(EXPIRY_BUFFER_SECS);
        self.expires_at()
            .is_some_and(|expires_at| deadline >= expires_at)
    }

    /// Get the Authorization header value
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Get remaining validity duration, if known
    #[must_use]
    pub fn remaining_validity(&self) -> Option<Duration> {
        let now = now_secs();
        self.expires_at()
            .filter(|&expires_at| expires_at > now)
            .map(|expires_at| Duration::from_secs(expires_at - now))
    }
}

/// Typed access to one client instance's records
#[derive(Clone)]
pub struct DataLayer {
    store: Arc<dyn Store>,
    instance_id: u32,
    client_id: String,
}

impl std::fmt::Debug for DataLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLayer")
            .field("instance_id", &self.instance_id)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl DataLayer {
    /// Create a data layer for one client instance
    pub fn new(store: Arc<dyn Store>, instance_id: u32, client_id: impl Into<String>) -> Self {
        Self {
            store,
            instance_id,
            client_id: client_id.into(),
        }
    }

    /// Store key for `namespace`
    #[must_use]
    pub fn key(&self, namespace: Namespace) -> String {
        format!(
            "{namespace}-instance_{}-{}",
            self.instance_id, self.client_id
        )
    }

    async fn read<T: DeserializeOwned>(&self, namespace: Namespace) -> Result<Option<T>> {
        match self.store.get_data(&self.key(namespace)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize>(&self, namespace: Namespace, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set_data(&self.key(namespace), &raw).await
    }

    /// Remove the record for `namespace`
    ///
    /// # Errors
    /// Returns the store's error if the removal fails.
    pub async fn remove(&self, namespace: Namespace) -> Result<()> {
        self.store.remove_data(&self.key(namespace)).await
    }

    /// Save the client configuration
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn set_config_data(&self, config: &AuthClientConfig) -> Result<()> {
        self.write(Namespace::ConfigData, config).await
    }

    /// Load the client configuration
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn config_data(&self) -> Result<Option<AuthClientConfig>> {
        self.read(Namespace::ConfigData).await
    }

    /// Save the identity provider endpoints
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn set_oidc_provider_meta_data(&self, endpoints: &OidcEndpoints) -> Result<()> {
        self.write(Namespace::OidcProviderMetaData, endpoints).await
    }

    /// Load the identity provider endpoints
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn oidc_provider_meta_data(&self) -> Result<Option<OidcEndpoints>> {
        self.read(Namespace::OidcProviderMetaData).await
    }

    /// Save the signed-in user's tokens
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn set_session_data(&self, session: &SessionData) -> Result<()> {
        self.write(Namespace::SessionData, session).await
    }

    /// Load the signed-in user's tokens
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn session_data(&self) -> Result<Option<SessionData>> {
        self.read(Namespace::SessionData).await
    }

    /// All temporary values
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn temporary_data(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        Ok(self
            .read::<serde_json::Map<String, serde_json::Value>>(Namespace::TemporaryData)
            .await?
            .unwrap_or_default())
    }

    /// One temporary value
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn temporary_data_parameter(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.temporary_data().await?.remove(key))
    }

    /// Set one temporary value, keeping the others
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn set_temporary_data_parameter(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<()> {
        let mut data = self.temporary_data().await?;
        data.insert(key.to_string(), value);
        self.write(Namespace::TemporaryData, &data).await
    }

    /// Remove one temporary value, keeping the others
    ///
    /// # Errors
    /// Returns store or JSON errors.
    pub async fn remove_temporary_data_parameter(&self, key: &str) -> Result<()> {
        let mut data = self.temporary_data().await?;
        if data.remove(key).is_some() {
            self.write(Namespace::TemporaryData, &data).await?;
        }
        Ok(())
    }
}
