use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned by the JSON API routes. Each renders as `{"error": message}`.
///
/// Browser-facing routes (sign-in redirects and pages) never produce this type:
/// they turn their failures into redirects or inline messages.
#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// 400 with a message for the user.
    Input(String),
    /// 401 with a message for the user.
    Auth(String),
    /// 413 with a message for the user.
    TooLarge(String),
    /// An upstream status passed through with a message.
    Upstream { status: u16, message: String },
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::Domain(err) => write!(fmt, "{err}"),
            Error::Web(WebErrorKind::Input(message))
            | Error::Web(WebErrorKind::Auth(message))
            | Error::Web(WebErrorKind::TooLarge(message))
            | Error::Web(WebErrorKind::Upstream { message, .. }) => write!(fmt, "{message}"),
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Domain(err) => match &err.error_kind {
                DomainErrorKind::Internal(InternalErrorKind::Invalid(_)) => StatusCode::BAD_REQUEST,
                DomainErrorKind::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                DomainErrorKind::External(ExternalErrorKind::Network)
                | DomainErrorKind::External(ExternalErrorKind::Upstream { .. })
                | DomainErrorKind::External(ExternalErrorKind::Other(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Error::Web(WebErrorKind::Input(_)) => StatusCode::BAD_REQUEST,
            Error::Web(WebErrorKind::Auth(_)) => StatusCode::UNAUTHORIZED,
            Error::Web(WebErrorKind::TooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Web(WebErrorKind::Upstream { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {self:?}");
        } else {
            debug!("Request rejected ({status}): {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<DomainError> for Error {
    fn from(err: DomainError) -> Self {
        Error::Domain(err)
    }
}
