//! Cookie-backed session state.
//!
//! Handlers never touch HTTP cookies directly: they are handed a [`SessionStore`]
//! so the flow can run against a real cookie jar or an in-memory map.

use std::collections::{HashMap, HashSet};

/// Holds the short-lived access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access-token";
/// Holds the refresh token. Stored, never used for renewal.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh-token";
/// Holds the PKCE verifier between the login redirect and the callback.
pub const CODE_VERIFIER_COOKIE: &str = "code-verifier";

/// Every cookie the sign-in flow may write.
pub const SESSION_COOKIES: [&str; 3] = [
    ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
    CODE_VERIFIER_COOKIE,
];

/// Ten minutes to finish signing in with the provider.
pub const CODE_VERIFIER_MAX_AGE_SECS: i64 = 60 * 10;
/// Thirty days.
pub const REFRESH_TOKEN_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

/// Attributes applied when a cookie is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age_secs: i64,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: &'static str,
}

impl CookieOptions {
    /// httpOnly, SameSite=Lax, path `/`; `secure` only where the site is served over TLS.
    pub fn session(max_age_secs: i64, secure: bool) -> Self {
        Self {
            max_age_secs,
            http_only: true,
            secure,
            same_site: SameSite::Lax,
            path: "/",
        }
    }
}

/// Capability to read and write the browser's session cookies.
pub trait SessionStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&mut self, name: &str, value: &str, options: CookieOptions);

    /// Removes the cookie in the browser whether or not it was sent with the request.
    fn delete(&mut self, name: &str);
}

/// In-memory store that records every write, for tests and non-HTTP callers.
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    values: HashMap<String, (String, Option<CookieOptions>)>,
    deleted: HashSet<String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding cookies as if the browser had sent them.
    pub fn with_cookies<'a>(cookies: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = cookies
            .into_iter()
            .map(|(name, value)| (name.to_string(), (value.to_string(), None)))
            .collect();
        Self {
            values,
            deleted: HashSet::new(),
        }
    }

    /// Options of a cookie written during this request.
    pub fn options(&self, name: &str) -> Option<CookieOptions> {
        self.values.get(name).and_then(|(_, options)| *options)
    }

    pub fn was_deleted(&self, name: &str) -> bool {
        self.deleted.contains(name)
    }

    /// True when the cookie was written, not just received.
    pub fn was_set(&self, name: &str) -> bool {
        self.options(name).is_some()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).map(|(value, _)| value.clone())
    }

    fn set(&mut self, name: &str, value: &str, options: CookieOptions) {
        self.deleted.remove(name);
        self.values
            .insert(name.to_string(), (value.to_string(), Some(options)));
    }

    fn delete(&mut self, name: &str) {
        self.values.remove(name);
        self.deleted.insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_distinguishes_received_from_written() {
        let mut store = MemorySessionStore::with_cookies([(ACCESS_TOKEN_COOKIE, "token")]);
        assert_eq!(store.get(ACCESS_TOKEN_COOKIE).as_deref(), Some("token"));
        assert!(!store.was_set(ACCESS_TOKEN_COOKIE));

        store.set(
            REFRESH_TOKEN_COOKIE,
            "refresh",
            CookieOptions::session(REFRESH_TOKEN_MAX_AGE_SECS, false),
        );
        assert!(store.was_set(REFRESH_TOKEN_COOKIE));
    }

    #[test]
    fn test_delete_of_absent_cookie_is_recorded() {
        let mut store = MemorySessionStore::new();
        store.delete(CODE_VERIFIER_COOKIE);
        assert!(store.was_deleted(CODE_VERIFIER_COOKIE));
        assert!(store.get(CODE_VERIFIER_COOKIE).is_none());
    }

    #[test]
    fn test_session_options_are_http_only_lax_root() {
        let options = CookieOptions::session(600, true);
        assert!(options.http_only);
        assert!(options.secure);
        assert_eq!(options.same_site, SameSite::Lax);
        assert_eq!(options.path, "/");
        assert_eq!(options.max_age_secs, 600);
    }
}
