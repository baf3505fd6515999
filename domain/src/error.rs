//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in the services it calls. The `source` field is used to hold the original error
/// that caused the domain error. Ultimately the various `error_kind`s are used
/// by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// Required configuration (backend URL or key) is absent.
    Config,
    /// Caller supplied input that fails validation; the message is user facing.
    Invalid(String),
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// A remote service answered with a non-success status.
    Upstream { status: u16, body: String },
    Other(String),
}

impl Error {
    pub fn config() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }

    pub fn invalid(message: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Invalid(message.to_string())),
        }
    }

    pub fn upstream(status: reqwest::StatusCode, body: String) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Upstream {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Config) => {
                write!(f, "Missing data store environment variables.")
            }
            DomainErrorKind::Internal(InternalErrorKind::Invalid(message)) => {
                write!(f, "{message}")
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(message)) => {
                write!(f, "{message}")
            }
            DomainErrorKind::External(ExternalErrorKind::Network) => match &self.source {
                Some(source) => write!(f, "Network error: {source}"),
                None => write!(f, "Network error"),
            },
            DomainErrorKind::External(ExternalErrorKind::Upstream { status, body }) => {
                write!(f, "Upstream request failed ({status}): {body}")
            }
            DomainErrorKind::External(ExternalErrorKind::Other(message)) => {
                write!(f, "{message}")
            }
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
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display_includes_status_and_body() {
        let err = Error::upstream(reqwest::StatusCode::NOT_FOUND, "no such table".to_string());
        assert_eq!(
            err.to_string(),
            "Upstream request failed (404): no such table"
        );
    }

    #[test]
    fn test_invalid_error_display_is_the_message() {
        let err = Error::invalid("Score must be a number between 1 and 5.");
        assert_eq!(err.to_string(), "Score must be a number between 1 and 5.");
    }
}
