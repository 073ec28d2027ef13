use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use async_trait::async_trait;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_api::services::room::{CreateRoomOptions, RoomClient};
use std::time::Duration;
use tracing::debug;
use voicelink_types::{Identity, RoomName, VoiceGrant};

/// A room that now exists on the managed platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedRoom {
    pub name: RoomName,
    /// Platform-assigned room SID.
    pub sid: String,
}

/// Creates rooms on the managed platform.
///
/// The issuer only needs this one control-plane call, which keeps the
/// network side swappable in tests.
#[async_trait]
pub trait RoomProvisioner: Send + Sync {
    async fn create_room(&self, name: &RoomName) -> Result<ProvisionedRoom, VoiceError>;
}

#[derive(Debug, Clone)]
pub struct VoiceService {
    config: LiveKitConfig,
}

impl VoiceService {
    /// Builds the service from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Config` if the URL, key, or secret is missing.
    pub fn new(config: LiveKitConfig) -> Result<Self, VoiceError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn get_url(&self) -> &str {
        &self.config.url
    }

    /// Returns the browser-facing URL. Falls back to the internal URL if no
    /// public URL is configured.
    pub fn get_public_url(&self) -> &str {
        if self.config.public_url.is_empty() {
            &self.config.url
        } else {
            &self.config.public_url
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.config.token_ttl_seconds)
    }

    /// Mints a join token for `identity`, scoped to `grant.room`.
    pub fn generate_join_token(
        &self,
        identity: &Identity,
        grant: &VoiceGrant,
    ) -> Result<String, VoiceError> {
        let name = self
            .config
            .participant_name
            .as_deref()
            .unwrap_or(identity.as_str());

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(identity.as_str())
            .with_name(name)
            .with_grants(video_grants(grant))
            .with_ttl(self.token_ttl());

        token.to_jwt().map_err(VoiceError::Token)
    }
}

#[async_trait]
impl RoomProvisioner for VoiceService {
    async fn create_room(&self, name: &RoomName) -> Result<ProvisionedRoom, VoiceError> {
        // One client per call: the issuer holds no pooled control connection.
        let room_client = RoomClient::with_api_key(
            &self.config.control_url(),
            &self.config.api_key,
            &self.config.api_secret,
        );

        let room = room_client
            .create_room(name.as_str(), CreateRoomOptions::default())
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))?;

        debug!(room = %name, sid = %room.sid, "provisioned LiveKit room");

        Ok(ProvisionedRoom {
            name: name.clone(),
            sid: room.sid,
        })
    }
}

fn video_grants(grant: &VoiceGrant) -> VideoGrants {
    VideoGrants {
        room: grant.room.as_str().to_string(),
        room_join: grant.room_join,
        can_publish: grant.can_publish,
        can_publish_data: grant.can_publish_data,
        can_subscribe: grant.can_subscribe,
        can_update_own_metadata: grant.can_update_own_metadata,
        ..Default::default()
    }
}
