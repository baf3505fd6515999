//! Identity provider reached over its REST surface.

use async_trait::async_trait;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Identity, IdentityProvider, ProviderKind, TokenGrant};
use crate::error::{config_error, exchange_error, session_error, Error, SessionErrorKind};
use crate::pkce::{CodeChallenge, CHALLENGE_METHOD};

const AUTHORIZE_PATH: &str = "/auth/v1/authorize";
const TOKEN_PATH: &str = "/auth/v1/token";
const USER_PATH: &str = "/auth/v1/user";

#[derive(Serialize)]
struct PkceTokenRequest<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default = "default_token_type")]
    token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Identity provider client authenticated with the project's public API key.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
}

impl HttpIdentityProvider {
    /// Create a client for the identity provider at `base_url`.
    ///
    /// Fails with a configuration error when the URL does not parse or the key is empty.
    pub fn new(base_url: &str, anon_key: SecretString) -> Result<Self, Error> {
        let base_url = Url::parse(base_url).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::ErrorKind::Config,
        })?;

        if anon_key.expose_secret().trim().is_empty() {
            return Err(config_error("Identity provider API key is empty"));
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(format!("caption-vote-auth/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            anon_key,
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    fn authorization_url(
        &self,
        provider: ProviderKind,
        redirect_to: &str,
        challenge: &CodeChallenge,
    ) -> String {
        let mut url = self.endpoint(AUTHORIZE_PATH);
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", challenge.as_str())
            .append_pair("code_challenge_method", CHALLENGE_METHOD);
        url.to_string()
    }

    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<TokenGrant, Error> {
        let mut url = self.endpoint(TOKEN_PATH);
        url.query_pairs_mut().append_pair("grant_type", "pkce");

        debug!("Exchanging authorization code for a session");

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.expose_secret())
            .json(&PkceTokenRequest {
                auth_code,
                code_verifier,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Token exchange request failed: {:?}", e);
                exchange_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Identity provider rejected the token exchange ({status}): {error_text}");
            return Err(exchange_error(format!(
                "token endpoint returned {status}"
            )));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse token response: {:?}", e);
            exchange_error(e)
        })?;

        info!("Exchanged authorization code for a session");

        Ok(TokenGrant {
            access_token: SecretString::new(tokens.access_token),
            refresh_token: SecretString::new(tokens.refresh_token),
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<Identity, Error> {
        let response = self
            .client
            .get(self.endpoint(USER_PATH))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach identity provider for user lookup: {:?}", e);
                Error::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!("User lookup returned {status}; treating session as expired");
            return Err(session_error(SessionErrorKind::Expired));
        }

        response.json::<Identity>().await.map_err(|e| {
            warn!("Failed to parse user response: {:?}", e);
            Error::from(e)
        })
    }
}
