//! Identity provider trait and types.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{config_error, Error};
use crate::pkce::CodeChallenge;

mod http;

pub use http::HttpIdentityProvider;

/// Upstream OAuth providers the identity provider can delegate sign-in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    Github,
    Azure,
    Apple,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Github => "github",
            ProviderKind::Azure => "azure",
            ProviderKind::Apple => "apple",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "github" => Ok(ProviderKind::Github),
            "azure" => Ok(ProviderKind::Azure),
            "apple" => Ok(ProviderKind::Apple),
            other => Err(config_error(&format!("Unsupported OAuth provider: {other}"))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens issued by a successful code exchange.
#[derive(Debug)]
pub struct TokenGrant {
    pub access_token: SecretString,
    /// Kept in a cookie only; sessions are never renewed with it.
    pub refresh_token: SecretString,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    pub token_type: String,
}

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider's stable user identifier.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Capability to talk to the identity provider.
///
/// There is deliberately no refresh or revoke operation: sessions end when the
/// access token expires or the cookies are cleared.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the URL the browser is sent to in order to sign in.
    ///
    /// # Arguments
    ///
    /// * `provider` - Upstream OAuth provider to delegate to
    /// * `redirect_to` - Absolute URL of this application's callback
    /// * `challenge` - PKCE code challenge bound to this attempt
    fn authorization_url(
        &self,
        provider: ProviderKind,
        redirect_to: &str,
        challenge: &CodeChallenge,
    ) -> String;

    /// Exchange a single-use authorization code and its PKCE verifier for tokens.
    async fn exchange_code(&self, auth_code: &str, code_verifier: &str)
        -> Result<TokenGrant, Error>;

    /// Resolve the user behind an access token.
    async fn get_user(&self, access_token: &str) -> Result<Identity, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_provider_kind_parses_case_insensitively() {
        assert_eq!("Google".parse::<ProviderKind>().ok(), Some(ProviderKind::Google));
        assert_eq!(" github ".parse::<ProviderKind>().ok(), Some(ProviderKind::Github));
    }

    #[test]
    fn test_unknown_provider_is_a_config_error() {
        let err = "myspace".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Config);
    }

    #[test]
    fn test_identity_email_is_optional() {
        let identity: Identity = serde_json::from_str(r#"{"id":"u-1"}"#).unwrap();
        assert_eq!(identity.id, "u-1");
        assert!(identity.email.is_none());
    }
}
