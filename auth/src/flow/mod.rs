//! The browser sign-in flow.
//!
//! Each step lives in its own module as an `impl Authenticator` block:
//! [`authorize`] starts an attempt, [`callback`] completes it, [`session`]
//! reads the session on protected requests and [`logout`] ends it.

use std::sync::Arc;

use crate::error::{config_error, Error, Reason};
use crate::identity::{IdentityProvider, ProviderKind};
use crate::session_store::CookieOptions;

mod authorize;
mod callback;
mod logout;
mod session;

pub use session::access_token;

/// Path of the callback route the identity provider redirects back to.
pub const CALLBACK_PATH: &str = "/auth/callback";
/// Path of the area a signed-in user lands on.
pub const PROTECTED_PATH: &str = "/protected";
/// Path of the page rendering [`Reason`] codes.
pub const ERROR_PATH: &str = "/auth/error";

/// Values the flow needs besides the identity provider itself.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Public URL of this application, without a trailing slash.
    pub site_url: String,
    pub provider: ProviderKind,
    /// Set the `Secure` attribute on every cookie written.
    pub secure_cookies: bool,
}

/// Runs the sign-in flow against one identity provider.
///
/// `identity` is `None` when the provider was not configured at startup; every
/// step that needs it then fails with a configuration error.
#[derive(Clone)]
pub struct Authenticator {
    settings: Settings,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl Authenticator {
    pub fn new(settings: Settings, identity: Option<Arc<dyn IdentityProvider>>) -> Self {
        Self { settings, identity }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_configured(&self) -> bool {
        self.identity.is_some()
    }

    /// Absolute URL for a path on this site.
    pub fn site_path(&self, path: &str) -> String {
        format!("{}{}", self.settings.site_url, path)
    }

    /// Where the browser is sent when a step fails.
    pub fn error_url(&self, error: &Error) -> String {
        self.reason_url(error.reason())
    }

    pub fn reason_url(&self, reason: Reason) -> String {
        format!("{}?reason={}", self.site_path(ERROR_PATH), reason.as_str())
    }

    fn identity(&self) -> Result<&dyn IdentityProvider, Error> {
        self.identity
            .as_deref()
            .ok_or_else(|| config_error("Identity provider URL or API key is not configured"))
    }

    fn cookie_options(&self, max_age_secs: i64) -> CookieOptions {
        CookieOptions::session(max_age_secs, self.settings.secure_cookies)
    }
}
