//! Shared types for the Voicelink workspace.
//!
//! This crate holds the vocabulary that both sides of the token exchange
//! agree on: the caller's [`Identity`], the generated [`RoomName`], the
//! fixed [`VoiceGrant`] attached to every credential, and the JSON bodies
//! returned by the token endpoint.
//!
//! The server (`voicelink-server`) and the client-side session controller
//! (`voicelink-session`) depend on these definitions; nothing here performs
//! I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

mod voice;
pub use voice::{AgentState, ConnectionState, VoiceGrant};

/// Errors produced when constructing validated domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The identity string was missing or empty.
    #[error("identity must not be empty")]
    EmptyIdentity,
}

/// Opaque identifier for the end user of a session.
///
/// The identity is not authenticated. It only has to be non-empty, since
/// the platform rejects join tokens with an empty subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Validates and wraps an identity string.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::EmptyIdentity`] if `value` is empty. Any other
    /// string, whitespace included, is accepted as given.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TypeError::EmptyIdentity);
        }
        Ok(Self(value))
    }

    /// Identity of the form `user-NNNNN` used for anonymous sessions.
    pub fn numbered_user(n: u32) -> Self {
        Self(format!("user-{n:05}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a room on the managed platform.
///
/// Rooms are created fresh for every credential request and are never
/// tracked locally after issuance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Generates a new room name from a random (v4) UUID.
    ///
    /// The UUID is drawn from the OS random source, so collisions between
    /// generated names are negligible.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is a canonical hyphenated UUID.
    pub fn is_uuid(&self) -> bool {
        self.0.len() == 36 && Uuid::try_parse(&self.0).is_ok()
    }
}

impl From<String> for RoomName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Successful response body of the token endpoint.
///
/// Also the data held by a connected session: the credential and the room
/// it was minted for.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetails {
    /// Signed access token for the room.
    pub token: String,
    /// The room the token authorizes.
    #[serde(rename = "roomName")]
    pub room_name: RoomName,
}

impl fmt::Debug for RoomDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomDetails")
            .field("token", &"[REDACTED]")
            .field("room_name", &self.room_name)
            .finish()
    }
}

/// Failure response body of the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rejects_only_empty() {
        assert_eq!(Identity::new(""), Err(TypeError::EmptyIdentity));
        assert_eq!(Identity::new("user-1").unwrap().as_str(), "user-1");
    }

    #[test]
    fn whitespace_identity_is_kept_verbatim() {
        assert_eq!(Identity::new(" ").unwrap().as_str(), " ");
    }

    #[test]
    fn numbered_user_is_zero_padded() {
        assert_eq!(Identity::numbered_user(42).as_str(), "user-00042");
    }

    #[test]
    fn identity_deserialize_validates() {
        let ok: Identity = serde_json::from_str("\"user-42\"").unwrap();
        assert_eq!(ok.as_str(), "user-42");
        assert!(serde_json::from_str::<Identity>("\"\"").is_err());
    }

    #[test]
    fn generated_room_names_are_uuids() {
        let room = RoomName::generate();
        assert!(room.is_uuid(), "{room} should be a UUID");
        assert_eq!(room.as_str(), room.as_str().to_lowercase());
    }

    #[test]
    fn generated_room_names_are_distinct() {
        let names: std::collections::HashSet<_> = (0..1000).map(|_| RoomName::generate()).collect();
        assert_eq!(names.len(), 1000);
    }

    #[test]
    fn non_uuid_room_name_detected() {
        assert!(!RoomName::from("lobby".to_string()).is_uuid());
    }

    #[test]
    fn room_details_wire_format() {
        let details = RoomDetails {
            token: "abc".to_string(),
            room_name: RoomName::from("room-1".to_string()),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["token"], "abc");
        assert_eq!(json["roomName"], "room-1");
    }

    #[test]
    fn room_details_debug_redacts_token() {
        let details = RoomDetails {
            token: "secret-jwt".to_string(),
            room_name: RoomName::from("room-1".to_string()),
        };
        let rendered = format!("{details:?}");
        assert!(!rendered.contains("secret-jwt"));
        assert!(rendered.contains("room-1"));
    }
}
