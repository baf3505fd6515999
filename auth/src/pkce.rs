//! PKCE (Proof Key for Code Exchange) support for OAuth 2.0.
//!
//! Implements RFC 7636 for securing authorization code flows in public clients.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Value of the `code_challenge_method` parameter expected by the identity provider.
pub const CHALLENGE_METHOD: &str = "s256";

/// PKCE code verifier (random string). Its `Debug` output is redacted.
#[derive(Debug)]
pub struct CodeVerifier(SecretString);

impl CodeVerifier {
    /// Generate a new random PKCE verifier.
    ///
    /// 32 random bytes, base64url encoded without padding (43 characters).
    pub fn generate() -> Self {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        let verifier = URL_SAFE_NO_PAD.encode(random_bytes);
        Self(SecretString::new(verifier))
    }

    /// Wrap a verifier read back from the browser.
    pub fn from_string(verifier: String) -> Self {
        Self(SecretString::new(verifier))
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }

    /// Generate the corresponding code challenge.
    pub fn challenge(&self) -> CodeChallenge {
        CodeChallenge::derive(self)
    }
}

/// PKCE code challenge (SHA256 hash of verifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChallenge(String);

impl CodeChallenge {
    /// Create a code challenge from a verifier.
    ///
    /// Uses SHA256 hashing and base64url encoding as per RFC 7636.
    pub fn derive(verifier: &CodeVerifier) -> Self {
        let hash = Sha256::digest(verifier.as_str().as_bytes());
        Self(URL_SAFE_NO_PAD.encode(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
