//! Built-in endpoints and URL alias resolution.

use anyhow::{Context, bail};
use url::Url;

/// OpenID client identifier for the interactive flow.
pub const CLIENT_ID: &str = "strata-cli";

/// Client identifier used when logging in with an offline token.
pub const OFFLINE_TOKEN_CLIENT_ID: &str = "strata-cloud-services";

/// Scopes requested when `--scope` is not given.
pub const DEFAULT_SCOPES: &[&str] = &["openid"];

/// Where users obtain an offline token.
pub const OFFLINE_TOKEN_URL: &str = "https://console.strata.cloud/account/token";

pub const PRODUCTION_API_URL: &str = "https://api.strata.cloud";
pub const STAGING_API_URL: &str = "https://api.stage.strata.cloud";

pub const PRODUCTION_AUTH_URL: &str = "https://sso.strata.cloud/realms/external";

pub const PRODUCTION_SECONDARY_AUTH_URL: &str =
    "https://identity.api.strata.cloud/realms/strata-services";
pub const STAGING_SECONDARY_AUTH_URL: &str =
    "https://identity.api.stage.strata.cloud/realms/strata-services";

/// Redirect paths registered with the providers.
pub const PRIMARY_CALLBACK_PATH: &str = "sso-callback";
pub const SECONDARY_CALLBACK_PATH: &str = "secondary-sso-callback";

/// Resolve `--api-gateway`, which accepts an alias or a full URL.
pub fn resolve_api_gateway(value: &str) -> anyhow::Result<Url> {
    let resolved = match value {
        "production" | "prod" | "prd" => PRODUCTION_API_URL,
        "staging" | "stage" | "stg" => STAGING_API_URL,
        other => other,
    };
    parse_http_url("API gateway", resolved)
}

/// Resolve `--auth-url`. The staging environment shares the production
/// identity provider.
pub fn resolve_auth_url(value: &str) -> anyhow::Result<Url> {
    let resolved = match value {
        "production" | "prod" | "prd" | "staging" | "stage" | "stg" => PRODUCTION_AUTH_URL,
        other => other,
    };
    parse_http_url("auth", resolved)
}

/// Resolve `--secondary-auth-url`.
pub fn resolve_secondary_auth_url(value: &str) -> anyhow::Result<Url> {
    let resolved = match value {
        "production" | "prod" | "prd" => PRODUCTION_SECONDARY_AUTH_URL,
        "staging" | "stage" | "stg" => STAGING_SECONDARY_AUTH_URL,
        other => other,
    };
    parse_http_url("secondary auth", resolved)
}

fn parse_http_url(name: &str, value: &str) -> anyhow::Result<Url> {
    let url = Url::parse(value).with_context(|| format!("invalid {name} URL '{value}'"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("{name} URL '{value}' must use http or https");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aliases_resolve_to_built_in_urls() {
        assert_eq!(
            resolve_api_gateway("prod").unwrap().as_str(),
            format!("{PRODUCTION_API_URL}/")
        );
        assert_eq!(
            resolve_api_gateway("stg").unwrap().as_str(),
            format!("{STAGING_API_URL}/")
        );
        assert_eq!(
            resolve_secondary_auth_url("staging").unwrap().as_str(),
            STAGING_SECONDARY_AUTH_URL
        );
    }

    #[test]
    fn test_staging_auth_alias_uses_production_sso() {
        assert_eq!(
            resolve_auth_url("staging").unwrap(),
            resolve_auth_url("production").unwrap()
        );
    }

    #[test]
    fn test_full_urls_pass_through() {
        let url = resolve_api_gateway("https://api.example.test:8443").unwrap();
        assert_eq!(url.host_str(), Some("api.example.test"));
    }

    #[test]
    fn test_non_http_schemes_are_rejected() {
        assert!(resolve_api_gateway("ftp://api.example.test").is_err());
        assert!(resolve_auth_url("not a url").is_err());
    }
}
