//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use voicelink_voice::{
    LiveKitConfig, VoiceError, ENV_LIVEKIT_API_KEY, ENV_LIVEKIT_API_SECRET, ENV_LIVEKIT_URL,
};

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LiveKit credentials and token settings.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cross-origin settings for browser clients.
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the built web client. Served as a fallback when it
    /// contains an `index.html`.
    #[serde(default)]
    pub client_dir: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "voicelink_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] VoiceError),
}

impl Config {
    /// Checks everything the server needs before it starts serving.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if any LiveKit credential is missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.livekit.validate()?;
        Ok(())
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `VOICELINK_HOST` overrides `server.host`
/// - `VOICELINK_PORT` overrides `server.port`
/// - `VOICELINK_CLIENT_DIR` overrides `server.client_dir`
/// - `VOICELINK_LOG_LEVEL` overrides `logging.level`
/// - `VOICELINK_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `VOICELINK_CORS_ORIGINS` overrides `cors.allowed_origins` (comma separated)
/// - `LIVEKIT_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET` override the
///   `livekit` credentials
/// - `VOICELINK_LIVEKIT_PUBLIC_URL` overrides `livekit.public_url`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// Like [`load_config`], but reads environment variables through `env`.
pub fn load_config_with<F>(path: Option<&str>, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Some(host) = env("VOICELINK_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = env("VOICELINK_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(dir) = env("VOICELINK_CLIENT_DIR") {
        config.server.client_dir = Some(dir);
    }
    if let Some(level) = env("VOICELINK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = env("VOICELINK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(origins) = env("VOICELINK_CORS_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(url) = env(ENV_LIVEKIT_URL) {
        config.livekit.url = url;
    }
    if let Some(key) = env(ENV_LIVEKIT_API_KEY) {
        config.livekit.api_key = key;
    }
    if let Some(secret) = env(ENV_LIVEKIT_API_SECRET) {
        config.livekit.api_secret = secret;
    }
    if let Some(public_url) = env("VOICELINK_LIVEKIT_PUBLIC_URL") {
        config.livekit.public_url = public_url;
    }

    Ok(config)
}
