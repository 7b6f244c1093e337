//! OpenID Connect provider plumbing: discovery, JWKS, ID-token
//! verification, and the token endpoint response shape.
//!
//! Endpoints are never hardcoded; each realm's base URL is resolved
//! through its published discovery document, so a realm is fully
//! described by one URL.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use url::Url;

use crate::error::AuthError;

/// Subset of the OIDC discovery document this CLI consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer identifier, matched against ID-token `iss` claims.
    pub issuer: String,
    /// Authorization endpoint the browser is sent to.
    pub authorization_endpoint: String,
    /// Token endpoint for code exchange and refresh grants.
    pub token_endpoint: String,
    /// Published signing keys.
    pub jwks_uri: String,
    /// RP-initiated logout endpoint, when the provider offers one.
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

/// Response body of the token endpoint for every grant type we use.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// One key from the provider's JWKS.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default, rename = "use")]
    pub use_: Option<String>,
    /// RSA modulus, base64url.
    #[serde(default)]
    pub n: Option<String>,
    /// RSA exponent, base64url.
    #[serde(default)]
    pub e: Option<String>,
}

/// The provider's published key set.
#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find the signing key for `kid`, or the first RSA signing key when
    /// the token header carries none.
    pub fn find(&self, kid: Option<&str>) -> Option<&Jwk> {
        match kid {
            Some(kid) => self.keys.iter().find(|k| k.kid.as_deref() == Some(kid)),
            None => self
                .keys
                .iter()
                .find(|k| k.kty == "RSA" && k.use_.as_deref() != Some("enc")),
        }
    }
}

/// ID-token claims validated during login.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub exp: i64,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
}

/// Fetch the discovery document published under `auth_url`.
pub async fn discover(
    http: &reqwest::Client,
    auth_url: &Url,
) -> Result<ProviderMetadata, AuthError> {
    let discovery_url = format!(
        "{}/.well-known/openid-configuration",
        auth_url.as_str().trim_end_matches('/')
    );
    tracing::debug!(url = %discovery_url, "fetching provider metadata");

    let response = http
        .get(&discovery_url)
        .send()
        .await
        .map_err(|err| AuthError::Discovery {
            url: discovery_url.clone(),
            reason: err.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(AuthError::Discovery {
            url: discovery_url,
            reason: format!("HTTP {}", response.status()),
        });
    }

    response
        .json::<ProviderMetadata>()
        .await
        .map_err(|err| AuthError::Discovery {
            url: discovery_url,
            reason: err.to_string(),
        })
}

/// Fetch the provider's key set.
pub async fn fetch_jwks(http: &reqwest::Client, jwks_uri: &str) -> Result<JwkSet, AuthError> {
    let response = http
        .get(jwks_uri)
        .send()
        .await
        .map_err(|err| AuthError::VerificationFailed(format!("JWKS fetch: {err}")))?;

    if !response.status().is_success() {
        return Err(AuthError::VerificationFailed(format!(
            "JWKS fetch: HTTP {}",
            response.status()
        )));
    }

    response
        .json::<JwkSet>()
        .await
        .map_err(|err| AuthError::VerificationFailed(format!("JWKS parse: {err}")))
}

/// Verify `raw_id_token` against the realm's key set and expected
/// issuer/audience, returning its claims.
pub fn verify_id_token(
    jwks: &JwkSet,
    issuer: &str,
    client_id: &str,
    raw_id_token: &str,
) -> Result<IdTokenClaims, AuthError> {
    let header = jsonwebtoken::decode_header(raw_id_token)
        .map_err(|err| AuthError::VerificationFailed(format!("token header: {err}")))?;

    let jwk = jwks
        .find(header.kid.as_deref())
        .ok_or_else(|| AuthError::VerificationFailed("no matching signing key".to_string()))?;

    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        return Err(AuthError::VerificationFailed(
            "signing key is not an RSA key".to_string(),
        ));
    };
    let key = DecodingKey::from_rsa_components(n, e)
        .map_err(|err| AuthError::VerificationFailed(format!("signing key: {err}")))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[client_id]);

    let data = jsonwebtoken::decode::<IdTokenClaims>(raw_id_token, &key, &validation)
        .map_err(|err| AuthError::VerificationFailed(err.to_string()))?;

    Ok(data.claims)
}
