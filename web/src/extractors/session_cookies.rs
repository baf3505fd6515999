use std::convert::Infallible;

use auth::session_store::{self, CookieOptions, SessionStore};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use log::*;

/// The browser's cookies as a [`SessionStore`].
///
/// Handlers mutate the store and then return [`SessionCookies::into_jar`] as part of
/// the response so every write becomes a `Set-Cookie` header.
#[derive(Debug, Default)]
pub(crate) struct SessionCookies {
    jar: CookieJar,
}

impl SessionCookies {
    pub(crate) fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    pub(crate) fn into_jar(self) -> CookieJar {
        self.jar
    }

    fn update(&mut self, cookie: Cookie<'static>) {
        let jar = std::mem::take(&mut self.jar);
        self.jar = jar.add(cookie);
    }
}

impl<S> FromRequestParts<S> for SessionCookies
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        Ok(Self::new(jar))
    }
}

impl SessionStore for SessionCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.jar.get(name).map(|cookie| cookie.value().to_string())
    }

    fn set(&mut self, name: &str, value: &str, options: CookieOptions) {
        trace!("Setting cookie {name}");
        let cookie = Cookie::build((name.to_string(), value.to_string()))
            .http_only(options.http_only)
            .secure(options.secure)
            .same_site(same_site(options.same_site))
            .path(options.path)
            .max_age(time::Duration::seconds(options.max_age_secs))
            .build();
        self.update(cookie);
    }

    // `CookieJar::remove` only emits a removal for cookies the browser sent, so an
    // expired cookie is added instead.
    fn delete(&mut self, name: &str) {
        trace!("Removing cookie {name}");
        let mut cookie = Cookie::build((name.to_string(), String::new()))
            .path("/")
            .build();
        cookie.make_removal();
        self.update(cookie);
    }
}

fn same_site(value: session_store::SameSite) -> SameSite {
    match value {
        session_store::SameSite::Strict => SameSite::Strict,
        session_store::SameSite::Lax => SameSite::Lax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::session_store::{ACCESS_TOKEN_COOKIE, CODE_VERIFIER_COOKIE};
    use axum::http::{header, HeaderMap, HeaderValue};

    fn jar_with(cookie_header: &'static str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(cookie_header));
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_reads_request_cookies() {
        let store = SessionCookies::new(jar_with("access-token=abc; other=1"));
        assert_eq!(store.get(ACCESS_TOKEN_COOKIE).as_deref(), Some("abc"));
        assert_eq!(store.get(CODE_VERIFIER_COOKIE), None);
    }

    #[test]
    fn test_set_applies_cookie_attributes() {
        let mut store = SessionCookies::default();
        store.set(
            ACCESS_TOKEN_COOKIE,
            "token",
            CookieOptions::session(3600, true),
        );

        let jar = store.into_jar();
        let cookie = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
    }

    #[test]
    fn test_delete_emits_removal_even_when_not_sent() {
        let mut store = SessionCookies::default();
        store.delete(CODE_VERIFIER_COOKIE);

        let jar = store.into_jar();
        let cookie = jar.get(CODE_VERIFIER_COOKIE).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
