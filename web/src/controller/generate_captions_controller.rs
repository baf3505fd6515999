use crate::error::WebErrorKind;
use crate::extractors::session_cookies::SessionCookies;
use crate::{AppState, Error};

use auth::flow::access_token;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::gateway::caption_pipeline::{is_supported_content_type, PipelineError};
use log::*;

/// Largest accepted upload.
pub(crate) const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MISSING_IMAGE: &str = "Missing image file.";
const IMAGE_TOO_LARGE: &str = "Image must be 10 MB or smaller.";

struct Upload {
    content_type: String,
    bytes: Vec<u8>,
}

/// POST /api/generate-captions
///
/// Sends the uploaded `image` through the captioning pipeline as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/generate-captions",
    request_body(content = String, content_type = "multipart/form-data", description = "Form with an `image` file field"),
    responses(
        (status = 200, description = "{imageId, captions, raw}"),
        (status = 400, description = "Missing or unsupported image"),
        (status = 401, description = "Not signed in"),
        (status = 413, description = "Image larger than 10 MB"),
        (status = 500, description = "Pipeline unreachable"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn generate(
    State(app_state): State<AppState>,
    cookies: SessionCookies,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, Error> {
    let token = access_token(&cookies)
        .ok_or_else(|| Error::Web(WebErrorKind::Auth("Not signed in.".to_string())))?;

    let multipart = multipart.map_err(|e| {
        debug!("Caption request is not a multipart form: {e}");
        input_error(MISSING_IMAGE)
    })?;
    let upload = read_image(multipart).await?;

    if !is_supported_content_type(&upload.content_type) {
        let shown = if upload.content_type.is_empty() {
            "unknown"
        } else {
            upload.content_type.as_str()
        };
        return Err(input_error(&format!("Unsupported image type: {shown}")));
    }

    let generated = app_state
        .caption_pipeline
        .generate(&token, &upload.content_type, upload.bytes)
        .await
        .map_err(|e| match e {
            PipelineError::Step(failure) => Error::Web(WebErrorKind::Upstream {
                status: failure.status,
                message: failure.message,
            }),
            PipelineError::Other(err) => Error::from(err),
        })?;

    Ok(Json(generated))
}

/// Find the first file field named `image`.
async fn read_image(mut multipart: Multipart) -> Result<Upload, Error> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| read_failed("Malformed multipart body", e))?;
        let Some(field) = field else {
            return Err(input_error(MISSING_IMAGE));
        };

        if field.name() != Some("image") || field.file_name().is_none() {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| read_failed("Could not read uploaded image", e))?;

        return Ok(Upload {
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

/// Reading past the body limit is reported as such; anything else means no usable image.
fn read_failed(context: &str, err: MultipartError) -> Error {
    debug!("{context}: {err}");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::Web(WebErrorKind::TooLarge(IMAGE_TOO_LARGE.to_string()))
    } else {
        input_error(MISSING_IMAGE)
    }
}

fn input_error(message: &str) -> Error {
    Error::Web(WebErrorKind::Input(message.to_string()))
}
