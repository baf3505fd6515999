use log::*;

use super::Authenticator;
use crate::session_store::{SessionStore, SESSION_COOKIES};

impl Authenticator {
    /// Clear every session cookie and return the home page URL.
    ///
    /// Tokens are not revoked at the provider and stay valid there until they expire.
    pub fn logout(&self, store: &mut impl SessionStore) -> String {
        for name in SESSION_COOKIES {
            store.delete(name);
        }

        info!("Session cookies cleared");
        self.site_path("/")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::*;
    use crate::session_store::{
        MemorySessionStore, SessionStore, ACCESS_TOKEN_COOKIE, SESSION_COOKIES,
    };

    #[test]
    fn test_logout_clears_all_cookies_when_only_some_present() {
        let authenticator = authenticator(Arc::new(FakeIdentityProvider::default()));
        let mut store = MemorySessionStore::with_cookies([(ACCESS_TOKEN_COOKIE, "A")]);

        let location = authenticator.logout(&mut store);

        assert_eq!(location, "http://localhost:3000/");
        for name in SESSION_COOKIES {
            assert!(store.was_deleted(name), "{name} should be deleted");
            assert!(store.get(name).is_none());
        }
    }

    #[test]
    fn test_logout_works_without_configuration() {
        let mut store = MemorySessionStore::new();
        let location = unconfigured().logout(&mut store);
        assert_eq!(location, "http://localhost:3000/");
    }
}
