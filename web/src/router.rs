use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::controller::{
    auth_controller, caption_controller, caption_vote_controller,
    generate_captions_controller::{self, MAX_UPLOAD_BYTES},
    health_check_controller, page_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Caption Vote API"
        ),
        paths(
            auth_controller::login,
            auth_controller::callback,
            auth_controller::logout,
            auth_controller::error_page,
            caption_controller::random,
            caption_vote_controller::create,
            generate_captions_controller::generate,
            health_check_controller::health_check,
            page_controller::home,
            page_controller::protected,
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "caption_vote", description = "Sign in, generate image captions and vote on them")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// The session is carried in the access-token cookie written by the sign-in callback.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "access-token",
                "Access token set by /auth/callback after a successful sign-in",
            ))),
        )
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(page_routes(app_state.clone()))
        .merge(auth_routes(app_state.clone()))
        .merge(caption_routes(app_state.clone()))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn page_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(page_controller::home))
        .route("/protected", get(page_controller::protected))
        .with_state(app_state)
}

/// Routes for the browser sign-in flow
fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/login", get(auth_controller::login))
        .route("/auth/callback", get(auth_controller::callback))
        .route("/auth/logout", get(auth_controller::logout))
        .route("/auth/error", get(auth_controller::error_page))
        .with_state(app_state)
}

fn caption_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/captions/random", get(caption_controller::random))
        .route("/api/caption-votes", post(caption_vote_controller::create))
        .route(
            "/api/generate-captions",
            post(generate_captions_controller::generate)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::unconfigured_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/protected",
            "/auth/login",
            "/auth/callback",
            "/auth/logout",
            "/auth/error",
            "/api/captions/random",
            "/api/caption-votes",
            "/api/generate-captions",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is not documented");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = define_routes(unconfigured_state())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rapidoc_is_served() {
        let response = define_routes(unconfigured_state())
            .oneshot(Request::builder().uri("/rapidoc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
