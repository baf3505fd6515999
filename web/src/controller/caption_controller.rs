use crate::{AppState, Error};

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::caption::{self, CaptionFeedConfig};
use serde_json::json;

/// GET /api/captions/random
///
/// One public caption chosen at random, or `null` when there are none.
#[utoipa::path(
    get,
    path = "/api/captions/random",
    responses(
        (status = 200, description = "{\"caption\": {id, text, imageUrl} | null}"),
        (status = 500, description = "Data store unavailable or misconfigured"),
    )
)]
pub async fn random(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let store = app_state.data_store()?;
    let cards =
        caption::fetch_caption_cards(store, &CaptionFeedConfig::from(&app_state.config)).await?;

    Ok(Json(json!({ "caption": caption::random_caption(&cards) })))
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::test_support::{app_state, unconfigured_state};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn get_random(app: Router) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/captions/random")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_random_caption_with_image() {
        let mut server = Server::new_async().await;
        let _captions = server
            .mock("GET", "/rest/v1/captions")
            .match_query(Matcher::UrlEncoded("is_public".into(), "eq.true".into()))
            .with_body(r#"[{"id":5,"content":"a cat in a hat","image_id":"img-1"}]"#)
            .create_async()
            .await;
        let _images = server
            .mock("GET", "/rest/v1/images")
            .match_query(Matcher::UrlEncoded("id".into(), "in.(img-1)".into()))
            .with_body(r#"[{"id":"img-1","url":"https://cdn/img-1.png"}]"#)
            .create_async()
            .await;

        let (status, body) = get_random(define_routes(app_state(&server.url()))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"caption": {"id": "5", "text": "a cat in a hat", "imageUrl": "https://cdn/img-1.png"}})
        );
    }

    #[tokio::test]
    async fn test_random_caption_of_empty_feed_is_null() {
        let mut server = Server::new_async().await;
        let _captions = server
            .mock("GET", "/rest/v1/captions")
            .match_query(Matcher::Any)
            .with_body("[]")
            .create_async()
            .await;

        let (status, body) = get_random(define_routes(app_state(&server.url()))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"caption": null}));
    }

    #[tokio::test]
    async fn test_random_caption_failure_is_server_error() {
        let mut server = Server::new_async().await;
        let _captions = server
            .mock("GET", "/rest/v1/captions")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let (status, body) = get_random(define_routes(app_state(&server.url()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Upstream request failed (500): boom"}));
    }

    #[tokio::test]
    async fn test_random_caption_without_configuration() {
        let (status, body) = get_random(define_routes(unconfigured_state())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Missing data store environment variables."}));
    }
}
