//! LiveKit integration for Voicelink.
//!
//! Wraps the LiveKit server API: room provisioning through the room
//! service and HS256 join-token minting. [`CredentialIssuer`] combines the
//! two into the single operation the token endpoint exposes.
//!
//! Media transport, codecs, and agent turn-taking all live on the LiveKit
//! side; nothing in this crate touches audio.

pub mod config;
pub mod error;
pub mod issuer;
pub mod service;

pub use config::{LiveKitConfig, ENV_LIVEKIT_API_KEY, ENV_LIVEKIT_API_SECRET, ENV_LIVEKIT_URL};
pub use error::VoiceError;
pub use issuer::CredentialIssuer;
pub use service::{ProvisionedRoom, RoomProvisioner, VoiceService};
