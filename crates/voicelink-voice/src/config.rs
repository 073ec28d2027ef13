use crate::error::VoiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the LiveKit server URL.
pub const ENV_LIVEKIT_URL: &str = "LIVEKIT_URL";
/// Environment variable holding the LiveKit API key.
pub const ENV_LIVEKIT_API_KEY: &str = "LIVEKIT_API_KEY";
/// Environment variable holding the LiveKit API secret.
pub const ENV_LIVEKIT_API_SECRET: &str = "LIVEKIT_API_SECRET";

fn default_token_ttl_seconds() -> u64 {
    3600
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    /// Server URL used for room provisioning (control API).
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// Browser-facing URL handed to clients. Empty means "same as `url`".
    #[serde(default)]
    pub public_url: String,
    /// JWT token TTL in seconds for LiveKit join tokens. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
    /// Display name attached to minted tokens. Falls back to the identity.
    #[serde(default)]
    pub participant_name: Option<String>,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            public_url: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
            participant_name: None,
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("public_url", &self.public_url)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("participant_name", &self.participant_name)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    /// Reads the three platform credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Config` naming the first variable that is unset
    /// or empty.
    pub fn from_env() -> Result<Self, VoiceError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`LiveKitConfig::from_env`], but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VoiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::new(
            lookup(ENV_LIVEKIT_URL).unwrap_or_default(),
            lookup(ENV_LIVEKIT_API_KEY).unwrap_or_default(),
            lookup(ENV_LIVEKIT_API_SECRET).unwrap_or_default(),
        );
        config.validate()?;
        Ok(config)
    }

    /// Checks that the URL, key, and secret are all present.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Config` naming the first missing value.
    pub fn validate(&self) -> Result<(), VoiceError> {
        let required = [
            (ENV_LIVEKIT_URL, &self.url),
            (ENV_LIVEKIT_API_KEY, &self.api_key),
            (ENV_LIVEKIT_API_SECRET, &self.api_secret),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(VoiceError::Config(format!("{name} is not set")));
            }
        }
        if self.token_ttl_seconds == 0 {
            return Err(VoiceError::Config(
                "token_ttl_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// URL for server-to-server control calls.
    ///
    /// Deployments usually configure the `ws(s)://` signalling URL; the room
    /// service speaks plain HTTP(S) on the same host.
    pub fn control_url(&self) -> String {
        if let Some(rest) = self.url.strip_prefix("wss://") {
            format!("https://{rest}")
        } else if let Some(rest) = self.url.strip_prefix("ws://") {
            format!("http://{rest}")
        } else {
            self.url.clone()
        }
    }
}
