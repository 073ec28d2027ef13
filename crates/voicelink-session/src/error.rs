//! Client-side error types.

/// Errors surfaced to the user by the session controller.
///
/// None of these are fatal: the controller returns to idle with the
/// message shown next to the connect affordance, and the user may retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The token request could not be sent or no response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// The token endpoint answered with a non-success status.
    #[error("Failed to fetch token")]
    Status(u16),

    /// The token endpoint answered with an unreadable body.
    #[error("Invalid token response: {0}")]
    Decode(String),

    /// A local media device failed during the session.
    #[error("Device failure")]
    Device(String),

    /// The SDK could not open the session.
    #[error("Failed to join room: {0}")]
    Connect(String),

    /// Client configuration is incomplete.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}
