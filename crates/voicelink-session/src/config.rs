//! Client configuration.

use crate::error::SessionError;
use serde::Deserialize;

/// Environment variable with the browser-facing LiveKit URL.
pub const ENV_PUBLIC_LIVEKIT_URL: &str = "VOICELINK_PUBLIC_LIVEKIT_URL";
/// Environment variable with the token endpoint URL.
pub const ENV_TOKEN_ENDPOINT: &str = "VOICELINK_TOKEN_ENDPOINT";

const DEFAULT_TOKEN_ENDPOINT: &str = "http://127.0.0.1:3000/api/generate-token";

/// Where the client fetches credentials and where it opens sessions.
///
/// `server_url` is the public signalling URL and is usually different from
/// the URL the issuer uses for room provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    pub token_endpoint: String,
}

#[derive(Deserialize)]
struct ClientConfigBody {
    #[serde(rename = "serverUrl")]
    server_url: String,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, token_endpoint: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token_endpoint: token_endpoint.into(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if the public server URL is not set.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::from_env`], but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup(ENV_PUBLIC_LIVEKIT_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SessionError::Config(format!("{ENV_PUBLIC_LIVEKIT_URL} is not set")))?;
        let token_endpoint = lookup(ENV_TOKEN_ENDPOINT)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string());

        Ok(Self::new(server_url, token_endpoint))
    }

    /// Asks a Voicelink server for its public LiveKit URL.
    ///
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub async fn discover(client: &reqwest::Client, base_url: &str) -> Result<Self, SessionError> {
        let base = base_url.trim_end_matches('/');
        let response = client
            .get(format!("{base}/api/client-config"))
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::Status(response.status().as_u16()));
        }

        let body: ClientConfigBody = response
            .json()
            .await
            .map_err(|e| SessionError::Decode(e.to_string()))?;

        Ok(Self::new(body.server_url, format!("{base}/api/generate-token")))
    }
}
