//! Client-side session state machine.
//!
//! ```text
//!            connect                 fetch ok
//!   Idle ─────────────▶ Requesting ─────────────▶ Connected
//!    ▲                     │                          │
//!    │      fetch failed   │   device failure /       │
//!    └─────────────────────┴───── disconnected ◀──────┘
//! ```
//!
//! The error shown after a failure is an attribute of `Idle`, not a state
//! of its own. Every connect produces a new room and credential; nothing is
//! reused after a session ends.

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::sdk::{SessionEvent, SessionOptions};
use crate::token::TokenSource;
use rand::Rng;
use tracing::{debug, error, info, warn};
use voicelink_types::{AgentState, ConnectionState, Identity, RoomDetails};

/// Prompt shown next to the connect affordance.
pub const CONNECT_PROMPT: &str = "Connect to our AI Voice Assistant for a conversation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle {
        /// Message from the last failed attempt, if any.
        error: Option<String>,
    },
    Requesting,
    Connected {
        details: RoomDetails,
        connection: ConnectionState,
        agent: AgentState,
        /// SID of the agent's audio track, once published.
        agent_track: Option<String>,
        microphone: bool,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle { error: None }
    }
}

/// What the UI should render for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    PreConnect {
        prompt: &'static str,
        connect_enabled: bool,
        error: Option<String>,
    },
    InCall {
        room_name: String,
        connection_state: ConnectionState,
        activity_label: &'static str,
        /// Source for the voice-activity visualizer.
        agent_track: Option<String>,
        mic_enabled: bool,
        /// Connection toast, shown while connecting, reconnecting, or lost.
        toast: Option<&'static str>,
    },
}

#[derive(Debug)]
pub struct SessionController {
    identity: Identity,
    state: SessionState,
}

impl SessionController {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            state: SessionState::default(),
        }
    }

    /// Controller with a generated `user-NNNNN` identity, kept for its lifetime.
    pub fn with_random_identity() -> Self {
        Self::new(random_identity())
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected { .. })
    }

    pub fn room_details(&self) -> Option<&RoomDetails> {
        match &self.state {
            SessionState::Connected { details, .. } => Some(details),
            _ => None,
        }
    }

    /// Starts a connect attempt.
    ///
    /// Returns the identity to fetch a credential for, or `None` if a
    /// request is already in flight or a session is open.
    pub fn begin_connect(&mut self) -> Option<Identity> {
        match self.state {
            SessionState::Idle { .. } => {
                debug!(identity = %self.identity, "requesting credential");
                self.state = SessionState::Requesting;
                Some(self.identity.clone())
            }
            _ => {
                debug!("connect ignored, request or session already active");
                None
            }
        }
    }

    /// Applies the outcome of the credential fetch started by
    /// [`SessionController::begin_connect`].
    ///
    /// Results that arrive outside `Requesting` are dropped.
    pub fn complete_connect(&mut self, result: Result<RoomDetails, SessionError>) {
        if self.state != SessionState::Requesting {
            warn!("dropping credential result, no request in flight");
            return;
        }

        self.state = match result {
            Ok(details) => {
                info!(room = %details.room_name, "credential received");
                SessionState::Connected {
                    details,
                    connection: ConnectionState::Connecting,
                    agent: AgentState::default(),
                    agent_track: None,
                    microphone: true,
                }
            }
            Err(e) => {
                warn!(error = %e, "credential request failed");
                SessionState::Idle {
                    error: Some(e.to_string()),
                }
            }
        };
    }

    /// Fetches a credential from `source` and applies the result.
    ///
    /// Returns `false` without fetching if a connect is already under way.
    pub async fn connect<T>(&mut self, source: &T) -> bool
    where
        T: TokenSource + ?Sized,
    {
        let Some(identity) = self.begin_connect() else {
            return false;
        };
        let result = source.fetch(&identity).await;
        self.complete_connect(result);
        true
    }

    /// Records that the SDK could not open the session.
    pub fn connect_failed(&mut self, e: SessionError) {
        if self.is_connected() {
            warn!(error = %e, "session could not be opened");
            self.state = SessionState::Idle {
                error: Some(e.to_string()),
            };
        }
    }

    /// Applies an event reported by the open session.
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        let SessionState::Connected {
            connection,
            agent,
            agent_track,
            ..
        } = &mut self.state
        else {
            debug!(?event, "session event ignored while not connected");
            return;
        };

        match event {
            SessionEvent::ConnectionStateChanged(state) => *connection = state,
            SessionEvent::AgentStateChanged(state) => *agent = state,
            SessionEvent::AgentTrackChanged(track) => *agent_track = track,
            SessionEvent::DeviceFailure(detail) => {
                error!(detail = %detail, "device failure");
                self.state = SessionState::Idle {
                    error: Some(SessionError::Device(detail).to_string()),
                };
            }
            SessionEvent::Disconnected(reason) => {
                info!(?reason, "session disconnected");
                self.state = SessionState::Idle { error: None };
            }
        }
    }

    /// Microphone state a toggle would switch to, or `None` outside a call.
    pub fn microphone_toggle(&self) -> Option<bool> {
        match self.state {
            SessionState::Connected { microphone, .. } => Some(!microphone),
            _ => None,
        }
    }

    /// Records the microphone state the open session confirmed.
    pub fn set_microphone_enabled(&mut self, enabled: bool) {
        if let SessionState::Connected { microphone, .. } = &mut self.state {
            debug!(enabled, "microphone toggled");
            *microphone = enabled;
        }
    }

    /// Options for opening the SDK session, while connected.
    pub fn session_options(&self, config: &ClientConfig) -> Option<SessionOptions> {
        self.room_details().map(|details| SessionOptions {
            server_url: config.server_url.clone(),
            token: details.token.clone(),
            audio: true,
            video: false,
        })
    }

    pub fn view(&self) -> View {
        match &self.state {
            SessionState::Idle { error } => View::PreConnect {
                prompt: CONNECT_PROMPT,
                connect_enabled: true,
                error: error.clone(),
            },
            SessionState::Requesting => View::PreConnect {
                prompt: CONNECT_PROMPT,
                connect_enabled: false,
                error: None,
            },
            SessionState::Connected {
                details,
                connection,
                agent,
                agent_track,
                microphone,
            } => View::InCall {
                room_name: details.room_name.to_string(),
                connection_state: *connection,
                activity_label: agent.activity_label(),
                agent_track: agent_track.clone(),
                mic_enabled: *microphone,
                toast: connection.toast(),
            },
        }
    }
}

fn random_identity() -> Identity {
    Identity::numbered_user(rand::thread_rng().gen_range(0..100_000))
}
