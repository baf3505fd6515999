//! # auth
//!
//! Browser sign-in against a hosted identity provider using the OAuth 2.0
//! authorization code flow with PKCE, with the resulting session kept in cookies.
//!
//! ## Architecture
//!
//! - [`pkce`]: code verifier generation and S256 challenge derivation
//! - [`session_store`]: the cookie capability every handler is given
//! - [`identity`]: the identity provider capability and its HTTP implementation
//! - [`flow`]: the login redirect, callback exchange, session reader and logout
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth::{flow::{Authenticator, Settings}, identity::HttpIdentityProvider};
//!
//! let identity = HttpIdentityProvider::new(&base_url, anon_key)?;
//! let authenticator = Authenticator::new(settings, Some(Arc::new(identity)));
//! let location = authenticator.login(&mut cookies)?;
//! ```

pub mod error;
pub mod flow;
pub mod identity;
pub mod pkce;
pub mod session_store;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Reason};
