//! Voicelink server library logic.

pub mod api_token;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use voicelink_voice::CredentialIssuer;

/// Application state shared across all request handlers.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Credential issuer. `None` when LiveKit is not configured, in which
    /// case token requests fail with the generic error response.
    pub issuer: Option<Arc<CredentialIssuer>>,
    /// Directory with the built web client, if any.
    pub client_dir: Option<String>,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(issuer: CredentialIssuer) -> Self {
        Self {
            issuer: Some(Arc::new(issuer)),
            ..Self::default()
        }
    }
}

/// Maximum request body size (64 KiB). The API only takes query parameters.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Initializes the global tracing subscriber.
///
/// Falls back to `info` if `level` is not a valid filter directive.
pub fn init_tracing(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route(
            "/api/generate-token",
            get(api_token::generate_token_handler),
        )
        .route("/generate-token", get(api_token::generate_token_handler))
        .route(
            "/api/client-config",
            get(api_token::client_config_handler),
        );

    // Serve the web client if the directory holds a build.
    let router = match state.client_dir.as_deref() {
        Some(dir) if std::path::Path::new(dir).join("index.html").exists() => {
            tracing::info!(path = %dir, "serving client static files");
            let index = std::path::Path::new(dir).join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        Some(dir) => {
            tracing::info!(path = %dir, "client directory not found, skipping static file serving");
            router
        }
        None => router,
    };

    let cors = cors_layer(&state.cors_origins);

    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(Arc::new(state)))
}
