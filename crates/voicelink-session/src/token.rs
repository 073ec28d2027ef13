//! Credential fetching.

use crate::error::SessionError;
use async_trait::async_trait;
use tracing::debug;
use voicelink_types::{Identity, RoomDetails};

/// Source of room credentials.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Requests a fresh room and credential for `identity`.
    async fn fetch(&self, identity: &Identity) -> Result<RoomDetails, SessionError>;
}

/// Fetches credentials from the Voicelink token endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTokenSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch(&self, identity: &Identity) -> Result<RoomDetails, SessionError> {
        let url = reqwest::Url::parse_with_params(&self.endpoint, &[("userId", identity.as_str())])
            .map_err(|e| SessionError::Config(format!("invalid token endpoint: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "token endpoint returned failure");
            return Err(SessionError::Status(status.as_u16()));
        }

        response
            .json::<RoomDetails>()
            .await
            .map_err(|e| SessionError::Decode(e.to_string()))
    }
}
