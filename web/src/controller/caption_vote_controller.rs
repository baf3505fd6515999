use crate::error::WebErrorKind;
use crate::extractors::session_cookies::SessionCookies;
use crate::{AppState, Error};

use auth::flow::access_token;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::caption_vote::{self, VotePayload, VoteTable};
use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind};
use log::*;
use serde_json::json;

/// POST /api/caption-votes
///
/// Records a 1 to 5 score for a caption as the signed-in user. Both fields of
/// `{"captionId", "score"}` may be numbers or numeric strings.
#[utoipa::path(
    post,
    path = "/api/caption-votes",
    request_body(content = String, content_type = "application/json", description = "{\"captionId\": 12, \"score\": 4}"),
    responses(
        (status = 201, description = "{\"row\": stored row | null}"),
        (status = 400, description = "Invalid vote or rejected insert"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Data store not configured"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    cookies: SessionCookies,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    let store = app_state.data_store()?;

    let payload: VotePayload = serde_json::from_slice(&body).map_err(|e| {
        debug!("Vote body is not valid JSON: {e}");
        Error::Web(WebErrorKind::Input(
            "Request body must be a JSON object.".to_string(),
        ))
    })?;
    let vote = payload.validate()?;

    let token = access_token(&cookies)
        .ok_or_else(|| Error::Web(WebErrorKind::Auth("You must sign in first.".to_string())))?;

    let row = caption_vote::insert_vote(store, &VoteTable::from(&app_state.config), &vote, &token)
        .await
        .map_err(insert_failed)?;

    Ok((StatusCode::CREATED, Json(json!({ "row": row }))))
}

fn insert_failed(err: DomainError) -> Error {
    if let DomainErrorKind::External(ExternalErrorKind::Upstream { status, body }) = &err.error_kind
    {
        return Error::Web(WebErrorKind::Input(format!(
            "Insert failed ({status}): {body}"
        )));
    }
    Error::from(err)
}
