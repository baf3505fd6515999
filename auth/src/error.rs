//! Error types for the `auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in the sign-in flow.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// Identity provider URL or key is not configured.
    Config,
    /// The browser arrived without the state the flow requires.
    Protocol(ProtocolErrorKind),
    /// The identity provider refused the code/verifier pair.
    Exchange,
    /// No usable session for the current request.
    Session(SessionErrorKind),
    Http(HttpErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum ProtocolErrorKind {
    MissingCode,
    MissingVerifier,
}

/// The two negative outcomes of reading a session.
#[derive(Debug, PartialEq)]
pub enum SessionErrorKind {
    NotSignedIn,
    /// Covers revoked and expired tokens as well as an unreachable provider.
    Expired,
}

#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

/// Machine-readable reason carried to the authentication error page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    MissingEnv,
    MissingCode,
    MissingVerifier,
    TokenExchange,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::MissingEnv => "missing-env",
            Reason::MissingCode => "missing-code",
            Reason::MissingVerifier => "missing-verifier",
            Reason::TokenExchange => "token-exchange",
        }
    }

    /// Parse a reason code from the error page query string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "missing-env" => Some(Reason::MissingEnv),
            "missing-code" => Some(Reason::MissingCode),
            "missing-verifier" => Some(Reason::MissingVerifier),
            "token-exchange" => Some(Reason::TokenExchange),
            _ => None,
        }
    }

    /// Human readable message shown on the error page.
    pub fn message(&self) -> &'static str {
        match self {
            Reason::MissingEnv => "Identity provider configuration is missing.",
            Reason::MissingCode => "The OAuth provider did not return a code.",
            Reason::MissingVerifier => "The PKCE verifier cookie is missing or expired.",
            Reason::TokenExchange => {
                "The identity provider could not exchange the auth code for a session."
            }
        }
    }
}

impl From<&ErrorKind> for Reason {
    // Anything that is not a configuration or browser-state problem is reported
    // as a failed exchange without further detail.
    fn from(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::Config => Reason::MissingEnv,
            ErrorKind::Protocol(ProtocolErrorKind::MissingCode) => Reason::MissingCode,
            ErrorKind::Protocol(ProtocolErrorKind::MissingVerifier) => Reason::MissingVerifier,
            _ => Reason::TokenExchange,
        }
    }
}

impl SessionErrorKind {
    /// Message shown to the user in place of protected content.
    pub fn message(&self) -> &'static str {
        match self {
            SessionErrorKind::NotSignedIn => {
                "You must sign in to upload images, generate captions, and vote."
            }
            SessionErrorKind::Expired => "Session expired. Please sign in again.",
        }
    }
}

impl Error {
    pub fn reason(&self) -> Reason {
        Reason::from(&self.error_kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config => write!(f, "Auth error: identity provider is not configured"),
            ErrorKind::Protocol(kind) => write!(f, "Auth protocol error: {:?}", kind),
            ErrorKind::Exchange => write!(f, "Auth error: token exchange failed"),
            ErrorKind::Session(kind) => write!(f, "Session error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config,
    }
}

/// Helper function to create protocol errors.
pub fn protocol_error(kind: ProtocolErrorKind) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Protocol(kind),
    }
}

/// Helper function to create session errors.
pub fn session_error(kind: SessionErrorKind) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Session(kind),
    }
}

/// Wraps any failure of the code exchange, keeping the cause only as a source.
pub fn exchange_error(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Error {
    Error {
        source: Some(source.into()),
        error_kind: ErrorKind::Exchange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_round_trip_through_from_code() {
        for reason in [
            Reason::MissingEnv,
            Reason::MissingCode,
            Reason::MissingVerifier,
            Reason::TokenExchange,
        ] {
            assert_eq!(Reason::from_code(reason.as_str()), Some(reason));
        }
        assert_eq!(Reason::from_code("teapot"), None);
    }

    #[test]
    fn test_error_kinds_map_to_reasons() {
        assert_eq!(config_error("missing").reason(), Reason::MissingEnv);
        assert_eq!(
            protocol_error(ProtocolErrorKind::MissingCode).reason(),
            Reason::MissingCode
        );
        assert_eq!(
            protocol_error(ProtocolErrorKind::MissingVerifier).reason(),
            Reason::MissingVerifier
        );
        assert_eq!(exchange_error("rejected").reason(), Reason::TokenExchange);
        let http = Error {
            source: None,
            error_kind: ErrorKind::Http(HttpErrorKind::Network),
        };
        assert_eq!(http.reason(), Reason::TokenExchange);
    }

    #[test]
    fn test_session_messages_are_distinct() {
        assert_ne!(
            SessionErrorKind::NotSignedIn.message(),
            SessionErrorKind::Expired.message()
        );
    }
}
