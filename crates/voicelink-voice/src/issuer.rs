use crate::error::VoiceError;
use crate::service::{RoomProvisioner, VoiceService};
use std::sync::Arc;
use tracing::info;
use voicelink_types::{Identity, RoomDetails, RoomName, VoiceGrant};

/// Provisions a fresh room and mints a credential for it.
///
/// Every call creates a new room: there is no reuse of rooms or tokens
/// across requests, even for the same identity.
#[derive(Clone)]
pub struct CredentialIssuer {
    service: VoiceService,
    rooms: Arc<dyn RoomProvisioner>,
}

impl std::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl CredentialIssuer {
    /// Issuer that provisions rooms through the LiveKit room service.
    pub fn new(service: VoiceService) -> Self {
        let rooms = Arc::new(service.clone());
        Self { service, rooms }
    }

    /// Issuer that provisions rooms through `rooms` and signs with `service`.
    pub fn with_provisioner(service: VoiceService, rooms: Arc<dyn RoomProvisioner>) -> Self {
        Self { service, rooms }
    }

    pub fn public_url(&self) -> &str {
        self.service.get_public_url()
    }

    /// Creates a room for `identity` and returns a token scoped to it.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::RoomService` if the platform refuses or cannot be
    /// reached, and `VoiceError::Token` if signing fails.
    pub async fn issue(&self, identity: &Identity) -> Result<RoomDetails, VoiceError> {
        let room_name = RoomName::generate();
        let room = self.rooms.create_room(&room_name).await?;

        let grant = VoiceGrant::full_access(room.name.clone());
        let token = self.service.generate_join_token(identity, &grant)?;

        info!(identity = %identity, room = %room.name, "issued room credential");

        Ok(RoomDetails {
            token,
            room_name: room.name,
        })
    }
}
