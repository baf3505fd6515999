use log::*;
use secrecy::ExposeSecret;

use super::{Authenticator, PROTECTED_PATH};
use crate::error::{exchange_error, protocol_error, Error, ProtocolErrorKind};
use crate::session_store::{
    SessionStore, ACCESS_TOKEN_COOKIE, CODE_VERIFIER_COOKIE, REFRESH_TOKEN_COOKIE,
    REFRESH_TOKEN_MAX_AGE_SECS,
};

impl Authenticator {
    /// Complete a sign-in attempt with the authorization code the provider sent back.
    ///
    /// Preconditions are checked in order (configuration, code, verifier cookie)
    /// and none of them triggers a network call. On success the session cookies
    /// are written, the verifier cookie is deleted and the protected area URL is
    /// returned. Authorization codes are single use, so replaying a callback
    /// fails at the provider.
    pub async fn complete_login(
        &self,
        code: Option<&str>,
        store: &mut impl SessionStore,
    ) -> Result<String, Error> {
        let identity = self.identity()?;

        let code = code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| protocol_error(ProtocolErrorKind::MissingCode))?;

        let verifier = store
            .get(CODE_VERIFIER_COOKIE)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| protocol_error(ProtocolErrorKind::MissingVerifier))?;

        let tokens = identity
            .exchange_code(code, &verifier)
            .await
            .map_err(|e| {
                warn!("Sign-in callback could not exchange the authorization code: {e}");
                exchange_error(e)
            })?;

        store.set(
            ACCESS_TOKEN_COOKIE,
            tokens.access_token.expose_secret(),
            self.cookie_options(tokens.expires_in),
        );
        store.set(
            REFRESH_TOKEN_COOKIE,
            tokens.refresh_token.expose_secret(),
            self.cookie_options(REFRESH_TOKEN_MAX_AGE_SECS),
        );
        store.delete(CODE_VERIFIER_COOKIE);

        info!("Sign-in completed; session expires in {}s", tokens.expires_in);
        Ok(self.site_path(PROTECTED_PATH))
    }
}
