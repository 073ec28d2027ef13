//! Boundary to the platform's client SDK.
//!
//! The SDK owns signalling, media transport, and audio rendering. This
//! module only describes what the controller hands it and what it reports
//! back.

use crate::error::SessionError;
use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;
use voicelink_types::{AgentState, ConnectionState};

/// Parameters for opening a room session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub server_url: String,
    pub token: String,
    /// Publish microphone audio.
    pub audio: bool,
    /// Publish camera video.
    pub video: bool,
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("server_url", &self.server_url)
            .field("token", &"[REDACTED]")
            .field("audio", &self.audio)
            .field("video", &self.video)
            .finish()
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The user left.
    ClientInitiated,
    /// The transport dropped and could not recover.
    NetworkLost,
    /// The remote side closed the room.
    RemoteHangup,
    Unknown,
}

/// Events reported by an open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectionStateChanged(ConnectionState),
    AgentStateChanged(AgentState),
    /// The agent's audio track was published or removed. Carries the track
    /// SID the visualizer subscribes to.
    AgentTrackChanged(Option<String>),
    /// A local media device (microphone, speaker) failed.
    DeviceFailure(String),
    Disconnected(DisconnectReason),
}

/// Opens room sessions.
#[async_trait]
pub trait RoomConnector: Send + Sync {
    /// Joins the room authorized by `options.token`.
    ///
    /// The session reports its lifecycle on `events` until it is closed.
    /// Each call gets its own channel; dropping the sender without a
    /// `Disconnected` event is treated as an unexplained disconnect.
    async fn connect(
        &self,
        options: SessionOptions,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Result<Box<dyn VoiceSession>, SessionError>;
}

/// A live room session.
#[async_trait]
pub trait VoiceSession: Send {
    /// Mutes or unmutes the published microphone track.
    async fn set_microphone_enabled(&mut self, enabled: bool) -> Result<(), SessionError>;

    /// Leaves the room and releases local devices.
    async fn close(&mut self);
}
