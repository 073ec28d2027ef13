//! Voicelink server binary.
//!
//! Loads configuration, validates the LiveKit credentials once, and serves
//! the token endpoint with structured logging and graceful shutdown on
//! SIGTERM/SIGINT.

use std::net::SocketAddr;
use tokio::net::TcpListener;
use voicelink_server::{app, config, init_tracing, AppState};
use voicelink_voice::{CredentialIssuer, VoiceService};

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("VOICELINK_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the server cannot start without valid config");

    init_tracing(&config.logging);

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "refusing to start");
        std::process::exit(1);
    }

    let voice_service = VoiceService::new(config.livekit.clone())
        .expect("LiveKit configuration was validated above");
    tracing::info!(
        url = voice_service.get_url(),
        public_url = voice_service.get_public_url(),
        "LiveKit credential issuer ready"
    );

    let state = AppState {
        client_dir: config.server.client_dir.clone(),
        cors_origins: config.cors.allowed_origins.clone(),
        ..AppState::new(CredentialIssuer::new(voice_service))
    };

    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting voicelink server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("voicelink server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
