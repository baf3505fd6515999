use log::*;

use super::Authenticator;
use crate::error::{session_error, Error, ErrorKind, SessionErrorKind};
use crate::identity::Identity;
use crate::session_store::{SessionStore, ACCESS_TOKEN_COOKIE};

/// The access token sent with this request, if any.
pub fn access_token(store: &impl SessionStore) -> Option<String> {
    store.get(ACCESS_TOKEN_COOKIE).filter(|t| !t.is_empty())
}

impl Authenticator {
    /// Resolve the signed-in user for a protected request.
    ///
    /// No cookie means [`SessionErrorKind::NotSignedIn`] without contacting the
    /// provider. Any failed lookup, whether the token was rejected or the
    /// provider could not be reached, means [`SessionErrorKind::Expired`].
    /// Nothing is cached: every call is one round-trip to the provider.
    pub async fn current_user(&self, store: &impl SessionStore) -> Result<Identity, Error> {
        let identity = self.identity()?;

        let token = access_token(store)
            .ok_or_else(|| session_error(SessionErrorKind::NotSignedIn))?;

        identity.get_user(&token).await.map_err(|e| match e.error_kind {
            ErrorKind::Session(SessionErrorKind::Expired) => e,
            _ => {
                debug!("User lookup failed, treating session as expired: {e}");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Session(SessionErrorKind::Expired),
                }
            }
        })
    }
}
