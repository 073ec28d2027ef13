//! Client-side session control for the Voicelink voice assistant.
//!
//! A [`SessionController`] owns the only piece of client state: whether the
//! user is idle, waiting for a credential, or in a call. It fetches a
//! credential from the Voicelink server through a [`TokenSource`], hands it
//! to the platform SDK through a [`RoomConnector`], and turns the SDK's
//! lifecycle events back into state transitions. [`SessionDriver`] runs the
//! controller as an event loop for interactive front ends.
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = ClientConfig::from_env()?;
//! let tokens = Arc::new(HttpTokenSource::new(&config.token_endpoint));
//! let (driver, mut handle) =
//!     SessionDriver::new(SessionController::with_random_identity(), config, tokens, connector);
//! tokio::spawn(driver.run());
//!
//! handle.connect();
//! handle.wait_for(|view| matches!(view, View::InCall { .. })).await;
//! ```

pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod sdk;
pub mod token;


pub use config::ClientConfig;
pub use controller::{SessionController, SessionState, View, CONNECT_PROMPT};
pub use driver::{DriverHandle, SessionDriver, UiEvent};
pub use error::SessionError;
pub use sdk::{DisconnectReason, RoomConnector, SessionEvent, SessionOptions, VoiceSession};
pub use token::{HttpTokenSource, TokenSource};
