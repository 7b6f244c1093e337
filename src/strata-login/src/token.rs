//! Bearer token inspection.
//!
//! Decodes the claims segment of a JWT without verifying its signature.
//! This is display plumbing only — `whoami` and the login confirmation
//! page use it to surface a username. Signature verification happens
//! exclusively for ID tokens during login, against the provider's
//! published keys.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;

use crate::error::AuthError;

/// Claim holding the human-readable account name.
pub const USERNAME_CLAIM: &str = "preferred_username";

/// Claims decoded from a bearer token, unverified.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    claims: serde_json::Map<String, Value>,
}

impl ParsedToken {
    /// Look up a claim by name. Absence is not an error.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Look up a string claim by name.
    pub fn string_claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }
}

/// Decode the claims segment of `raw` without verifying the signature.
pub fn parse(raw: &str) -> Result<ParsedToken, AuthError> {
    let mut segments = raw.split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        return Err(AuthError::MalformedToken);
    };

    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;
    let claims: serde_json::Map<String, Value> =
        serde_json::from_slice(&decoded).map_err(|_| AuthError::MalformedToken)?;

    Ok(ParsedToken { claims })
}

/// Best-effort username from a bearer token. `None` when the token is
/// unparseable or carries no username claim; callers degrade their
/// output instead of failing.
pub fn username(raw: &str) -> Option<String> {
    let parsed = parse(raw).ok()?;
    parsed.string_claim(USERNAME_CLAIM).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an unsigned JWT around the given claims JSON.
    fn fake_token(claims: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.as_bytes());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn test_parse_extracts_claims() {
        let token = fake_token(r#"{"preferred_username":"jdoe","org_id":"13"}"#);
        let parsed = parse(&token).unwrap();
        assert_eq!(parsed.string_claim("preferred_username"), Some("jdoe"));
        assert_eq!(parsed.claim("org_id"), Some(&Value::from("13")));
        assert_eq!(parsed.claim("missing"), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse("nonsense"), Err(AuthError::MalformedToken)));
        assert!(matches!(
            parse("only-one-segment."),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(
            parse("a.!!!not-base64!!!.c"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn test_parse_rejects_non_object_payload() {
        let token = fake_token(r#"["not","an","object"]"#);
        assert!(matches!(parse(&token), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_username_degrades_to_none() {
        assert_eq!(username("garbage"), None);

        let token = fake_token(r#"{"sub":"abc"}"#);
        assert_eq!(username(&token), None);

        let token = fake_token(r#"{"preferred_username":"jdoe"}"#);
        assert_eq!(username(&token), Some("jdoe".to_string()));
    }
}
