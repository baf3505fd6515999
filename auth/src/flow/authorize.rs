use log::*;

use super::{Authenticator, CALLBACK_PATH};
use crate::error::Error;
use crate::pkce::CodeVerifier;
use crate::session_store::{SessionStore, CODE_VERIFIER_COOKIE, CODE_VERIFIER_MAX_AGE_SECS};

impl Authenticator {
    /// Start a sign-in attempt.
    ///
    /// Stores a fresh PKCE verifier in the `code-verifier` cookie and returns the
    /// identity provider URL the browser should be redirected to. A newer attempt
    /// from the same browser overwrites the verifier of an older one.
    pub fn login(&self, store: &mut impl SessionStore) -> Result<String, Error> {
        let identity = self.identity()?;

        let verifier = CodeVerifier::generate();
        let challenge = verifier.challenge();
        let redirect_to = self.site_path(CALLBACK_PATH);

        let url = identity.authorization_url(self.settings.provider, &redirect_to, &challenge);

        store.set(
            CODE_VERIFIER_COOKIE,
            verifier.as_str(),
            self.cookie_options(CODE_VERIFIER_MAX_AGE_SECS),
        );

        info!(
            "Redirecting browser to {} sign-in",
            self.settings.provider.as_str()
        );
        Ok(url)
    }
}
