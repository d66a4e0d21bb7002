//! Auth client configuration
//!
//! [`AuthClientConfig`] is built once at startup, either with its builder or
//! from a JSON document that uses the camelCase field names identity
//! providers publish in their SPA quick-starts:
//!
//! ```json
//! {
//!   "signInRedirectURL": "http://localhost:5173/",
//!   "signOutRedirectURL": "http://localhost:5173/",
//!   "clientID": "my-client-id",
//!   "baseUrl": "https://api.asgardeo.io/t/my-org",
//!   "enablePKCE": false,
//!   "scope": ["openid", "profile"]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use url::Url;

use crate::error::{AuthError, Result};

/// Default leeway, in seconds, when checking token time claims
pub const DEFAULT_CLOCK_TOLERANCE: u64 = 300;

/// Largest accepted leeway, in seconds (one day)
pub const MAX_CLOCK_TOLERANCE: u64 = 86_400;

const AUTHORIZE_PATH: &str = "/oauth2/authorize";
const TOKEN_PATH: &str = "/oauth2/token";
const JWKS_PATH: &str = "/oauth2/jwks";
const USERINFO_PATH: &str = "/oauth2/userinfo";
const REVOKE_PATH: &str = "/oauth2/revoke";
const LOGOUT_PATH: &str = "/oidc/logout";

fn default_true() -> bool {
    true
}

fn default_scope() -> Vec<String> {
    vec!["openid".to_string()]
}

fn default_clock_tolerance() -> u64 {
    DEFAULT_CLOCK_TOLERANCE
}

fn default_algorithms() -> Vec<String> {
    vec!["RS256".to_string()]
}

/// Static configuration handed to the auth client at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for AuthClientConfig"),
    builder_type(doc = "Builder for AuthClientConfig", vis = "pub"),
    build_method(doc = "Build the AuthClientConfig")
)]
pub struct AuthClientConfig {
    /// Where the identity provider sends the user after sign-in
    #[serde(rename = "signInRedirectURL")]
    #[builder(setter(into))]
    pub sign_in_redirect_url: String,

    /// Where the identity provider sends the user after sign-out
    #[serde(rename = "signOutRedirectURL")]
    #[builder(setter(into))]
    pub sign_out_redirect_url: String,

    /// OAuth client identifier
    #[serde(rename = "clientID")]
    #[builder(setter(into))]
    pub client_id: String,

    /// Base URL of the identity provider tenant
    #[serde(rename = "baseUrl")]
    #[builder(setter(into))]
    pub base_url: String,

    /// Whether the authorization code flow uses PKCE
    #[serde(rename = "enablePKCE", default = "default_true")]
    #[builder(default = true)]
    pub enable_pkce: bool,

    /// Requested scopes
    #[serde(default = "default_scope")]
    #[builder(default = default_scope(), setter(into))]
    pub scope: Vec<String>,

    /// Leeway in seconds when checking `exp` and `nbf`
    #[serde(rename = "clockTolerance", default = "default_clock_tolerance")]
    #[builder(default = DEFAULT_CLOCK_TOLERANCE)]
    pub clock_tolerance: u64,

    /// Whether ID tokens are verified before their claims are trusted
    #[serde(rename = "validateIDToken", default = "default_true")]
    #[builder(default = true)]
    pub validate_id_token: bool,

    /// Signature algorithms accepted for ID tokens
    #[serde(rename = "idTokenSigningAlgorithms", default = "default_algorithms")]
    #[builder(default = default_algorithms(), setter(into))]
    pub id_token_signing_algorithms: Vec<String>,

    /// Expected `iss` claim; defaults to the token endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub issuer: Option<String>,
}

impl AuthClientConfig {
    /// Parse a config from JSON
    ///
    /// # Errors
    /// Returns `AuthError::Json` if the document does not match.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    /// Returns I/O or JSON errors if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check that the config can drive a client
    ///
    /// # Errors
    /// Returns `AuthError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::invalid_config("clientID must not be empty"));
        }
        check_http_url("baseUrl", &self.base_url)?;
        check_http_url("signInRedirectURL", &self.sign_in_redirect_url)?;
        check_http_url("signOutRedirectURL", &self.sign_out_redirect_url)?;
        if self.scope.iter().all(|s| s.trim().is_empty()) {
            return Err(AuthError::invalid_config("scope must name at least one scope"));
        }
        if self.id_token_signing_algorithms.is_empty() {
            return Err(AuthError::invalid_config(
                "idTokenSigningAlgorithms must not be empty",
            ));
        }
        if self.clock_tolerance > MAX_CLOCK_TOLERANCE {
            return Err(AuthError::invalid_config(format!(
                "clockTolerance must be at most {MAX_CLOCK_TOLERANCE} seconds, got {}",
                self.clock_tolerance
            )));
        }
        if let Some(issuer) = &self.issuer {
            if issuer.trim().is_empty() {
                return Err(AuthError::invalid_config("issuer must not be empty"));
            }
        }
        Ok(())
    }

    /// Space-separated scope string as sent to the identity provider
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scope.join(" ")
    }

    /// Endpoints derived from the base URL
    #[must_use]
    pub fn endpoints(&self) -> OidcEndpoints {
        let base = self.base_url.trim_end_matches('/');
        let token_endpoint = format!("{base}{TOKEN_PATH}");
        OidcEndpoints {
            authorization_endpoint: format!("{base}{AUTHORIZE_PATH}"),
            issuer: self
                .issuer
                .clone()
                .unwrap_or_else(|| token_endpoint.clone()),
            token_endpoint,
            jwks_uri: format!("{base}{JWKS_PATH}"),
            userinfo_endpoint: format!("{base}{USERINFO_PATH}"),
            revocation_endpoint: format!("{base}{REVOKE_PATH}"),
            end_session_endpoint: format!("{base}{LOGOUT_PATH}"),
        }
    }
}

fn check_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| AuthError::invalid_config(format!("{field} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AuthError::invalid_config(format!(
            "{field} must use http or https, not {other}"
        ))),
    }
}

/// Identity provider endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcEndpoints {
    /// Authorization endpoint
    pub authorization_endpoint: String,
    /// Token endpoint
    pub token_endpoint: String,
    /// JSON Web Key Set document
    pub jwks_uri: String,
    /// User info endpoint
    pub userinfo_endpoint: String,
    /// Token revocation endpoint
    pub revocation_endpoint: String,
    /// RP-initiated logout endpoint
    pub end_session_endpoint: String,
    /// Expected `iss` claim of ID tokens
    pub issuer: String,
}
