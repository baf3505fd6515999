use crate::extractors::session_cookies::SessionCookies;
use crate::{pages, AppState};

use auth::ErrorKind;
use axum::extract::State;
use axum::response::Html;
use domain::table_rows::{self, TableQuery};
use log::*;

/// GET /
///
/// Renders the configured table, or a configuration error when it cannot be read.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Table rows or a configuration error", body = String, content_type = "text/html"),
    )
)]
pub async fn home(State(app_state): State<AppState>) -> Html<String> {
    let query = TableQuery::from(&app_state.config);

    let store = match app_state.data_store() {
        Ok(store) => store,
        Err(e) => return pages::configuration_error(&e.to_string()),
    };

    match table_rows::fetch_table_rows(store, &query).await {
        Ok(table) => pages::home(&query.table, &table),
        Err(e) => {
            warn!("Home page could not read table {}: {e}", query.table);
            pages::configuration_error(&format!(
                "{e}. Set SUPABASE_TABLE to an existing table (for example: images or communities)."
            ))
        }
    }
}

/// GET /protected
///
/// The signed-in area. Without a usable session it explains why and offers sign-in.
#[utoipa::path(
    get,
    path = "/protected",
    responses(
        (status = 200, description = "Signed-in area or sign-in prompt", body = String, content_type = "text/html"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn protected(
    State(app_state): State<AppState>,
    cookies: SessionCookies,
) -> Html<String> {
    match app_state.authenticator.current_user(&cookies).await {
        Ok(identity) => pages::protected(identity.email.as_deref()),
        Err(e) => {
            let message = match &e.error_kind {
                ErrorKind::Config => "Missing identity provider configuration.",
                ErrorKind::Session(kind) => kind.message(),
                _ => "Session expired. Please sign in again.",
            };
            pages::sign_in_required(message)
        }
    }
}
