//! Grant and session-state definitions.
//!
//! `VoiceGrant` is the capability record attached to every credential. The
//! system only issues one shape of grant, so there is no builder or partial
//! constructor: [`VoiceGrant::full_access`] is the single entry point.

use crate::RoomName;
use serde::{Deserialize, Serialize};

/// Capabilities granted to a participant for a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceGrant {
    /// The room this grant is scoped to.
    pub room: RoomName,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_publish_data: bool,
    pub can_subscribe: bool,
    pub can_update_own_metadata: bool,
}

impl VoiceGrant {
    /// Grants join, publish (audio and data), subscribe, and metadata
    /// updates for `room`.
    pub fn full_access(room: RoomName) -> Self {
        Self {
            room,
            room_join: true,
            can_publish: true,
            can_publish_data: true,
            can_subscribe: true,
            can_update_own_metadata: true,
        }
    }
}

/// State of the voice agent as reported by the platform SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    #[default]
    Disconnected,
    Connecting,
    Initializing,
    Listening,
    Thinking,
    Speaking,
}

impl AgentState {
    /// Label shown under the voice-activity visualizer.
    pub fn activity_label(self) -> &'static str {
        match self {
            AgentState::Speaking => "Agent is speaking...",
            _ => "Listening...",
        }
    }
}

/// Connection state of the local participant's room session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
            ConnectionState::Reconnecting => "Reconnecting",
        }
    }

    /// Transient notice for the connection toast. Only transitional and
    /// lost states raise one.
    pub fn toast(self) -> Option<&'static str> {
        match self {
            ConnectionState::Connecting => Some("Connecting"),
            ConnectionState::Reconnecting => Some("Reconnecting"),
            ConnectionState::Disconnected => Some("Disconnected"),
            ConnectionState::Connected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_access_sets_every_flag() {
        let room = RoomName::generate();
        let grant = VoiceGrant::full_access(room.clone());
        assert_eq!(grant.room, room);
        assert!(grant.room_join);
        assert!(grant.can_publish);
        assert!(grant.can_publish_data);
        assert!(grant.can_subscribe);
        assert!(grant.can_update_own_metadata);
    }

    #[test]
    fn grant_serializes_camel_case() {
        let grant = VoiceGrant::full_access(RoomName::from("r".to_string()));
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(json["roomJoin"], true);
        assert_eq!(json["canPublishData"], true);
        assert_eq!(json["canUpdateOwnMetadata"], true);
    }

    #[test]
    fn only_speaking_shows_speaking_label() {
        assert_eq!(AgentState::Speaking.activity_label(), "Agent is speaking...");
        for state in [
            AgentState::Disconnected,
            AgentState::Connecting,
            AgentState::Initializing,
            AgentState::Listening,
            AgentState::Thinking,
        ] {
            assert_eq!(state.activity_label(), "Listening...");
        }
    }

    #[test]
    fn toast_hides_once_connected() {
        assert_eq!(ConnectionState::Reconnecting.toast(), Some("Reconnecting"));
        assert_eq!(ConnectionState::Disconnected.toast(), Some("Disconnected"));
        assert_eq!(ConnectionState::Connected.toast(), None);
    }

    #[test]
    fn agent_state_parses_sdk_strings() {
        let state: AgentState = serde_json::from_str("\"speaking\"").unwrap();
        assert_eq!(state, AgentState::Speaking);
    }
}
