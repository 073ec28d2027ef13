//! Token endpoint: provisions a room and returns a credential for it.

use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use voicelink_types::{ErrorBody, Identity, RoomDetails, TypeError};
use voicelink_voice::VoiceError;

/// Message returned for every failure. Details stay in the server log.
pub const GENERIC_FAILURE: &str = "Failed to generate token";

/// Query parameters for `GET /api/generate-token`.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Response body for `GET /api/client-config`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientConfigResponse {
    /// URL the browser should open its LiveKit session against.
    #[serde(rename = "serverUrl")]
    pub server_url: String,
}

/// Errors raised while issuing a credential.
///
/// Every variant renders as the same `500` response; the variant and its
/// detail are only written to the log.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("LiveKit credentials are not set")]
    Configuration,
    #[error("User ID is required: {0}")]
    Validation(String),
    #[error("upstream failure: {0}")]
    Upstream(#[from] VoiceError),
}

impl From<TypeError> for IssueError {
    fn from(e: TypeError) -> Self {
        IssueError::Validation(e.to_string())
    }
}

impl IntoResponse for IssueError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "error generating token");

        let body = Json(ErrorBody {
            error: GENERIC_FAILURE.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Handler for `GET /api/generate-token?userId=...`.
pub async fn generate_token_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<RoomDetails>, IssueError> {
    let issuer = state.issuer.as_ref().ok_or(IssueError::Configuration)?;

    let Query(query) = query.map_err(|e| IssueError::Validation(e.body_text()))?;
    let identity = Identity::new(query.user_id.unwrap_or_default())?;

    let details = issuer.issue(&identity).await?;
    Ok(Json(details))
}

/// Handler for `GET /api/client-config`.
pub async fn client_config_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ClientConfigResponse>, StatusCode> {
    let issuer = state
        .issuer
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(ClientConfigResponse {
        server_url: issuer.public_url().to_string(),
    }))
}
