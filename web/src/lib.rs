use std::sync::Arc;

use auth::flow::{Authenticator, Settings};
use auth::identity::{HttpIdentityProvider, IdentityProvider, ProviderKind};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use domain::gateway::caption_pipeline::CaptionPipelineClient;
use domain::{DataStore, RestDataStore};
use log::*;
use secrecy::SecretString;
use service::config::Config;
use tower_http::cors::CorsLayer;

pub use self::error::{Error, Result, WebErrorKind};

mod controller;
mod error;
mod extractors;
mod pages;
mod router;

/// Everything a handler needs, built once at startup.
///
/// Missing backend configuration does not stop the server: `data_store` is `None`
/// and the authenticator has no identity provider, so the affected routes answer
/// with configuration errors instead.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub authenticator: Authenticator,
    pub data_store: Option<Arc<dyn DataStore>>,
    pub caption_pipeline: Arc<CaptionPipelineClient>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Authenticator,
        data_store: Option<Arc<dyn DataStore>>,
        caption_pipeline: Arc<CaptionPipelineClient>,
    ) -> Self {
        Self {
            config,
            authenticator,
            data_store,
            caption_pipeline,
        }
    }

    /// Build every client from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let provider = match config.oauth_provider.parse::<ProviderKind>() {
            Ok(provider) => provider,
            Err(e) => {
                warn!("{e}, falling back to {}", ProviderKind::Google);
                ProviderKind::Google
            }
        };

        let settings = Settings {
            site_url: config.site_url(),
            provider,
            secure_cookies: config.is_production(),
        };

        let identity: Option<Arc<dyn IdentityProvider>> =
            match (config.supabase_url(), config.supabase_anon_key()) {
                (Some(url), Some(key)) => {
                    match HttpIdentityProvider::new(&url, SecretString::new(key)) {
                        Ok(provider) => Some(Arc::new(provider)),
                        Err(e) => {
                            error!("Identity provider could not be configured: {e}");
                            None
                        }
                    }
                }
                _ => {
                    error!("Identity provider URL or API key is missing; sign-in is disabled");
                    None
                }
            };

        let data_store: Option<Arc<dyn DataStore>> = match RestDataStore::from_config(&config) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!("Data store is unavailable: {e}");
                None
            }
        };

        let caption_pipeline = Arc::new(CaptionPipelineClient::new(config.caption_api_base())?);

        Ok(Self::new(
            config,
            Authenticator::new(settings, identity),
            data_store,
            caption_pipeline,
        ))
    }

    /// The data store, or the configuration error every caller reports when it is absent.
    pub fn data_store(&self) -> Result<&dyn DataStore> {
        self.data_store
            .as_deref()
            .ok_or_else(|| Error::from(domain::error::Error::config()))
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{host}:{}", app_state.config.port);
    let listener = tokio::net::TcpListener::bind(&server_url).await?;

    let cors_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid allowed origin {origin}: {e}");
                None
            }
        })
        .collect();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_origin(cors_origins);

    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(
        listener,
        router::define_routes(app_state).layer(cors_layer),
    )
    .await
}
