//! Browser sign-in routes.
//!
//! None of these routes fail with an error status: every failure becomes a
//! redirect to the authentication error page carrying a reason code.

use crate::extractors::session_cookies::SessionCookies;
use crate::{pages, AppState};

use auth::Reason;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use log::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorParams {
    pub reason: Option<String>,
}

/// GET /auth/login
///
/// Starts a sign-in attempt by redirecting to the identity provider.
#[utoipa::path(
    get,
    path = "/auth/login",
    responses(
        (status = 307, description = "Redirect to the identity provider, setting the code-verifier cookie"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    mut cookies: SessionCookies,
) -> impl IntoResponse {
    let location = match app_state.authenticator.login(&mut cookies) {
        Ok(url) => url,
        Err(e) => {
            warn!("Sign-in could not start: {e}");
            app_state.authenticator.error_url(&e)
        }
    };
    (cookies.into_jar(), Redirect::temporary(&location))
}

/// GET /auth/callback
///
/// Completes a sign-in attempt. The identity provider redirects here with `code`.
#[utoipa::path(
    get,
    path = "/auth/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from the identity provider"),
    ),
    responses(
        (status = 307, description = "Redirect to /protected with session cookies, or to /auth/error"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackParams>,
    mut cookies: SessionCookies,
) -> impl IntoResponse {
    let location = match app_state
        .authenticator
        .complete_login(params.code.as_deref(), &mut cookies)
        .await
    {
        Ok(url) => url,
        Err(e) => {
            warn!("Sign-in callback failed ({}): {e}", e.reason().as_str());
            app_state.authenticator.error_url(&e)
        }
    };
    (cookies.into_jar(), Redirect::temporary(&location))
}

/// GET /auth/logout
///
/// Clears the session cookies. Tokens are not revoked at the provider.
#[utoipa::path(
    get,
    path = "/auth/logout",
    responses(
        (status = 307, description = "Redirect home with all session cookies removed"),
    )
)]
pub async fn logout(
    State(app_state): State<AppState>,
    mut cookies: SessionCookies,
) -> impl IntoResponse {
    let location = app_state.authenticator.logout(&mut cookies);
    (cookies.into_jar(), Redirect::temporary(&location))
}

/// GET /auth/error
#[utoipa::path(
    get,
    path = "/auth/error",
    params(
        ("reason" = Option<String>, Query, description = "missing-env, missing-code, missing-verifier or token-exchange"),
    ),
    responses(
        (status = 200, description = "Authentication error page", body = String, content_type = "text/html"),
    )
)]
pub async fn error_page(
    State(app_state): State<AppState>,
    Query(params): Query<ErrorParams>,
) -> Html<String> {
    let message = params
        .reason
        .as_deref()
        .and_then(Reason::from_code)
        .map(|reason| reason.message())
        .unwrap_or("Unknown authentication error.");

    pages::auth_error(message, &app_state.authenticator.site_path("/"))
}
