//! Event loop that drives a [`SessionController`].
//!
//! UI actions, credential results, and SDK events all arrive on channels
//! and are applied one at a time by a single task, so the controller is
//! never mutated concurrently. The rendered [`View`] is published on a
//! `watch` channel after every step.
//!
//! Every opened session reports on its own channel, and the receiver is
//! dropped when the session is torn down. A late event from a closed
//! session therefore never reaches the controller.

use crate::config::ClientConfig;
use crate::controller::{SessionController, View};
use crate::error::SessionError;
use crate::sdk::{DisconnectReason, RoomConnector, SessionEvent, VoiceSession};
use crate::token::TokenSource;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use voicelink_types::RoomDetails;

/// User actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Connect,
    Disconnect,
    ToggleMicrophone,
}

/// Handle for the UI side: sends actions and observes the view.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    view_rx: watch::Receiver<View>,
}

impl DriverHandle {
    /// Requests a connect. Ignored by the driver while a request or session
    /// is active.
    pub fn connect(&self) -> bool {
        self.ui_tx.send(UiEvent::Connect).is_ok()
    }

    pub fn disconnect(&self) -> bool {
        self.ui_tx.send(UiEvent::Disconnect).is_ok()
    }

    /// Mutes or unmutes the microphone of the open session.
    pub fn toggle_microphone(&self) -> bool {
        self.ui_tx.send(UiEvent::ToggleMicrophone).is_ok()
    }

    pub fn view(&self) -> View {
        self.view_rx.borrow().clone()
    }

    /// Waits until the published view satisfies `predicate`.
    ///
    /// Returns `None` if the driver stopped first.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<View>
    where
        F: FnMut(&View) -> bool,
    {
        self.view_rx
            .wait_for(predicate)
            .await
            .ok()
            .map(|view| view.clone())
    }
}

/// The open session and the receiving end of its event channel.
struct OpenSession {
    session: Box<dyn VoiceSession>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl OpenSession {
    async fn close(mut self) {
        self.events.close();
        self.session.close().await;
    }
}

pub struct SessionDriver {
    controller: SessionController,
    config: ClientConfig,
    tokens: Arc<dyn TokenSource>,
    connector: Arc<dyn RoomConnector>,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    view_tx: watch::Sender<View>,
}

impl SessionDriver {
    pub fn new(
        controller: SessionController,
        config: ClientConfig,
        tokens: Arc<dyn TokenSource>,
        connector: Arc<dyn RoomConnector>,
    ) -> (Self, DriverHandle) {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(controller.view());

        let driver = Self {
            controller,
            config,
            tokens,
            connector,
            ui_rx,
            view_tx,
        };
        (driver, DriverHandle { ui_tx, view_rx })
    }

    /// Runs until every [`DriverHandle`] is dropped. Closes any open
    /// session on the way out.
    pub async fn run(mut self) {
        let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<Result<RoomDetails, SessionError>>();
        let mut open: Option<OpenSession> = None;

        loop {
            tokio::select! {
                ui = self.ui_rx.recv() => match ui {
                    Some(UiEvent::Connect) => {
                        if let Some(identity) = self.controller.begin_connect() {
                            let tokens = Arc::clone(&self.tokens);
                            let tx = fetch_tx.clone();
                            tokio::spawn(async move {
                                let result = tokens.fetch(&identity).await;
                                let _ = tx.send(result);
                            });
                        }
                    }
                    Some(UiEvent::Disconnect) => {
                        if let Some(session) = open.take() {
                            session.close().await;
                        }
                        self.controller
                            .handle_session_event(SessionEvent::Disconnected(DisconnectReason::ClientInitiated));
                    }
                    Some(UiEvent::ToggleMicrophone) => self.toggle_microphone(open.as_mut()).await,
                    None => break,
                },
                Some(result) = fetch_rx.recv() => {
                    self.controller.complete_connect(result);
                    if let Some(options) = self.controller.session_options(&self.config) {
                        debug!(?options, "opening session");
                        let (events_tx, events) = mpsc::unbounded_channel();
                        match self.connector.connect(options, events_tx).await {
                            Ok(session) => open = Some(OpenSession { session, events }),
                            Err(e) => self.controller.connect_failed(e),
                        }
                    }
                }
                event = next_event(open.as_mut()) => match event {
                    Some(event) => self.controller.handle_session_event(event),
                    None => {
                        warn!("session event channel closed without a disconnect");
                        self.controller
                            .handle_session_event(SessionEvent::Disconnected(DisconnectReason::Unknown));
                    }
                },
            }

            if !self.controller.is_connected() {
                if let Some(session) = open.take() {
                    session.close().await;
                }
            }
            self.view_tx.send_replace(self.controller.view());
        }

        if let Some(session) = open.take() {
            session.close().await;
        }
        info!("session driver stopped");
    }

    async fn toggle_microphone(&mut self, open: Option<&mut OpenSession>) {
        let (Some(enabled), Some(open)) = (self.controller.microphone_toggle(), open) else {
            debug!("microphone toggle ignored, no open session");
            return;
        };
        match open.session.set_microphone_enabled(enabled).await {
            Ok(()) => self.controller.set_microphone_enabled(enabled),
            Err(e) => self
                .controller
                .handle_session_event(SessionEvent::DeviceFailure(e.to_string())),
        }
    }
}

/// Next event of the open session. Pending forever when none is open.
async fn next_event(open: Option<&mut OpenSession>) -> Option<SessionEvent> {
    match open {
        Some(open) => open.events.recv().await,
        None => std::future::pending().await,
    }
}
