//! Captioning pipeline API client.
//!
//! Generating captions for an uploaded image takes four calls: request a
//! presigned upload URL, PUT the bytes there, register the resulting CDN URL
//! as an image, then ask for captions for that image.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignedUrlRequest<'a> {
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlResponse {
    pub presigned_url: String,
    pub cdn_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterImageRequest<'a> {
    image_url: &'a str,
    is_common_use: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterImageResponse {
    pub image_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateCaptionsRequest<'a> {
    image_id: &'a str,
}

/// Outcome of a full pipeline run.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCaptions {
    pub image_id: String,
    /// Object entries of the payload when it is an array, otherwise empty.
    pub captions: Vec<Value>,
    /// The pipeline's response exactly as received.
    pub raw: Value,
}

/// A pipeline step answered with a non-success status.
#[derive(Debug, PartialEq)]
pub struct StepFailure {
    pub step: u8,
    pub status: u16,
    pub message: String,
}

/// Error from a pipeline run: either a failed step or a transport problem.
#[derive(Debug)]
pub enum PipelineError {
    Step(StepFailure),
    Other(Error),
}

impl From<Error> for PipelineError {
    fn from(err: Error) -> Self {
        PipelineError::Other(err)
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Other(err.into())
    }
}

/// Image content types the pipeline accepts.
pub const SUPPORTED_CONTENT_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/heic",
];

pub fn is_supported_content_type(content_type: &str) -> bool {
    SUPPORTED_CONTENT_TYPES.contains(&content_type)
}

pub struct CaptionPipelineClient {
    client: reqwest::Client,
    base_url: String,
}

impl CaptionPipelineClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run all four steps for one image on behalf of the signed-in user.
    pub async fn generate(
        &self,
        access_token: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<GeneratedCaptions, PipelineError> {
        let presigned: PresignedUrlResponse = self
            .post_step(
                1,
                "/pipeline/generate-presigned-url",
                access_token,
                &PresignedUrlRequest { content_type },
                "could not generate presigned URL",
            )
            .await?
            .json()
            .await?;

        debug!("Uploading {} bytes of {content_type}", bytes.len());
        let upload = self
            .client
            .put(&presigned.presigned_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        check_step(2, upload, "could not upload file bytes").await?;

        let registered: RegisterImageResponse = self
            .post_step(
                3,
                "/pipeline/upload-image-from-url",
                access_token,
                &RegisterImageRequest {
                    image_url: &presigned.cdn_url,
                    is_common_use: false,
                },
                "could not register image URL",
            )
            .await?
            .json()
            .await?;

        let raw: Value = self
            .post_step(
                4,
                "/pipeline/generate-captions",
                access_token,
                &GenerateCaptionsRequest {
                    image_id: &registered.image_id,
                },
                "could not generate captions",
            )
            .await?
            .json()
            .await?;

        let captions = match &raw {
            Value::Array(items) => items.iter().filter(|v| v.is_object()).cloned().collect(),
            _ => Vec::new(),
        };

        info!(
            "Generated {} caption(s) for image {}",
            captions.len(),
            registered.image_id
        );

        Ok(GeneratedCaptions {
            image_id: registered.image_id,
            captions,
            raw,
        })
    }

    async fn post_step<T: Serialize>(
        &self,
        step: u8,
        path: &str,
        access_token: &str,
        body: &T,
        default_message: &str,
    ) -> Result<reqwest::Response, PipelineError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Caption pipeline step {step} request failed: {e:?}");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        check_step(step, response, default_message).await
    }
}

async fn check_step(
    step: u8,
    response: reqwest::Response,
    default_message: &str,
) -> Result<reqwest::Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    warn!("Caption pipeline step {step} failed: {status} - {text}");
    let detail = if text.is_empty() {
        default_message.to_string()
    } else {
        text
    };

    Err(PipelineError::Step(StepFailure {
        step,
        status: status.as_u16(),
        message: format!("Step {step} failed: {detail}"),
    }))
}
