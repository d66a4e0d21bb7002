//! JWT verification on top of `jsonwebtoken`
//!
//! Signature checking and claim validation are done by the library; this
//! module only turns a JWK and a set of expectations into a
//! [`DecodingKey`] and a [`Validation`].

use std::str::FromStr;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::config::MAX_CLOCK_TOLERANCE;
use crate::error::{AuthError, Result};

/// Claim set of a verified token, keyed by claim name
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Expectations a token must meet to be accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for JwtVerifyOptions"),
    builder_type(doc = "Builder for JwtVerifyOptions", vis = "pub"),
    build_method(doc = "Build the JwtVerifyOptions")
)]
#[serde(rename_all = "camelCase")]
pub struct JwtVerifyOptions {
    /// Allowed signature algorithms (e.g. `"RS256"`)
    #[builder(setter(into))]
    pub algorithms: Vec<String>,

    /// Expected `aud` claim
    #[builder(setter(into))]
    pub audience: String,

    /// Expected `iss` claim
    #[builder(setter(into))]
    pub issuer: String,

    /// Expected `sub` claim
    #[builder(setter(into))]
    pub subject: String,

    /// Leeway in seconds when checking `exp` and `nbf`, at most
    /// [`MAX_CLOCK_TOLERANCE`]
    #[builder(default)]
    pub clock_tolerance: u64,
}

/// Parse algorithm names into `jsonwebtoken` algorithms
///
/// # Errors
/// Returns `AuthError::UnsupportedAlgorithm` for an empty list or an unknown
/// name.
pub fn parse_algorithms(names: &[String]) -> Result<Vec<Algorithm>> {
    if names.is_empty() {
        return Err(AuthError::unsupported_algorithm("no algorithms allowed"));
    }
    names
        .iter()
        .map(|name| {
            Algorithm::from_str(name).map_err(|_| AuthError::unsupported_algorithm(name))
        })
        .collect()
}

/// Import a JWK into a key the verifier accepts
///
/// If the JWK pins an algorithm it must be `alg`.
///
/// # Errors
/// Returns `AuthError::InvalidJwk` if the key cannot be used with `alg`.
pub fn import_jwk(jwk: &Jwk, alg: Algorithm) -> Result<DecodingKey> {
    if let Some(pinned) = jwk.common.key_algorithm {
        let pinned = format!("{pinned:?}");
        if pinned != format!("{alg:?}") {
            return Err(AuthError::invalid_jwk(format!(
                "key is pinned to {pinned}, not {alg:?}"
            )));
        }
    }
    DecodingKey::from_jwk(jwk).map_err(|e| AuthError::invalid_jwk(e.to_string()))
}

/// Verify `token` against `jwk` and return its claims
///
/// The token header's `alg` must be in the allow-list; the key is imported
/// for that algorithm. A clock tolerance above [`MAX_CLOCK_TOLERANCE`] is
/// `AuthError::InvalidConfig`. Other failures are reported as the library
/// raised them.
pub(crate) fn verify_with_jwk(
    token: &str,
    jwk: &Jwk,
    options: &JwtVerifyOptions,
) -> Result<Claims> {
    if options.clock_tolerance > MAX_CLOCK_TOLERANCE {
        return Err(AuthError::invalid_config(format!(
            "clock tolerance must be at most {MAX_CLOCK_TOLERANCE} seconds, got {}",
            options.clock_tolerance
        )));
    }
    let allowed = parse_algorithms(&options.algorithms)?;
    let header = decode_header(token)?;
    if !allowed.contains(&header.alg) {
        return Err(jsonwebtoken::errors::Error::from(ErrorKind::InvalidAlgorithm).into());
    }
    let key = import_jwk(jwk, header.alg)?;

    let mut validation = Validation::new(header.alg);
    validation.leeway = options.clock_tolerance;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.set_audience(&[options.audience.as_str()]);
    validation.set_issuer(&[options.issuer.as_str()]);
    validation.sub = Some(options.subject.clone());
    validation.set_required_spec_claims(&["aud", "iss", "sub"]);

    let data = jsonwebtoken::decode::<Claims>(token, &key, &validation)?;
    Ok(data.claims)
}

/// Verify a JWT, wrapping any failure into a single message
///
/// Same checks as [`crate::crypto::CryptoUtils::verify_jwt`]; every error
/// becomes `AuthError::Verification` carrying the underlying message.
///
/// # Errors
/// Returns `AuthError::Verification` if the token is not trusted.
pub async fn verify_jwt(token: &str, jwk: &Jwk, options: &JwtVerifyOptions) -> Result<Claims> {
    verify_with_jwk(token, jwk, options).map_err(|e| {
        tracing::warn!(error = %e, "JWT verification failed");
        AuthError::Verification(e.to_string())
    })
}

/// Read the token header without verifying anything
///
/// # Errors
/// Returns `AuthError::MalformedToken` if the header cannot be decoded.
pub fn decode_header(token: &str) -> Result<Header> {
    jsonwebtoken::decode_header(token).map_err(|e| AuthError::malformed_token(e.to_string()))
}

/// Pick the key for `kid`, or the only key when no `kid` is given
///
/// # Errors
/// Returns `AuthError::KeyNotFound` if nothing matches.
pub fn select_jwk<'a>(jwks: &'a JwkSet, kid: Option<&str>) -> Result<&'a Jwk> {
    let found = match kid {
        Some(kid) => jwks.find(kid),
        None if jwks.keys.len() == 1 => jwks.keys.first(),
        None => None,
    };
    found.ok_or_else(|| AuthError::key_not_found(kid.map(String::from)))
}
