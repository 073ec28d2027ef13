use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use voicelink_types::{Identity, RoomName, VoiceGrant};
use voicelink_voice::{
    CredentialIssuer, LiveKitConfig, ProvisionedRoom, RoomProvisioner, VoiceError, VoiceService,
};

const DEFAULT_URL: &str = "ws://localhost:7880";
const DEFAULT_KEY: &str = "devkey";
const DEFAULT_SECRET: &str = "devsecret-that-is-long-enough-for-hs256";

#[derive(Debug, serde::Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    #[serde(default)]
    name: String,
    exp: u64,
    video: VideoClaims,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoClaims {
    #[serde(default)]
    room: String,
    #[serde(default)]
    room_join: bool,
    #[serde(default)]
    can_publish: bool,
    #[serde(default)]
    can_publish_data: bool,
    #[serde(default)]
    can_subscribe: bool,
    #[serde(default)]
    can_update_own_metadata: bool,
}

fn decode(token: &str) -> Claims {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let validation = Validation::new(Algorithm::HS256);
    let key = DecodingKey::from_secret(DEFAULT_SECRET.as_bytes());
    decode::<Claims>(token, &key, &validation)
        .expect("Failed to decode token")
        .claims
}

fn service() -> VoiceService {
    VoiceService::new(LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET))
        .expect("valid config")
}

/// Records created rooms instead of calling LiveKit.
#[derive(Default)]
struct RecordingProvisioner {
    calls: AtomicUsize,
}

#[async_trait]
impl RoomProvisioner for RecordingProvisioner {
    async fn create_room(&self, name: &RoomName) -> Result<ProvisionedRoom, VoiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProvisionedRoom {
            name: name.clone(),
            sid: format!("RM_{n}"),
        })
    }
}

struct RefusingProvisioner;

#[async_trait]
impl RoomProvisioner for RefusingProvisioner {
    async fn create_room(&self, _name: &RoomName) -> Result<ProvisionedRoom, VoiceError> {
        Err(VoiceError::RoomService("twirp error unauthenticated".to_string()))
    }
}

#[test]
fn test_token_permissions() {
    let identity = Identity::new("user-perm").unwrap();
    let room = RoomName::generate();
    let token = service()
        .generate_join_token(&identity, &VoiceGrant::full_access(room.clone()))
        .expect("Failed to generate token");

    let claims = decode(&token);
    assert_eq!(claims.sub, "user-perm");
    assert_eq!(claims.iss, DEFAULT_KEY);
    assert_eq!(claims.video.room, room.as_str());
    assert!(claims.video.room_join, "roomJoin should be true");
    assert!(claims.video.can_publish, "canPublish should be true");
    assert!(claims.video.can_publish_data, "canPublishData should be true");
    assert!(claims.video.can_subscribe, "canSubscribe should be true");
    assert!(
        claims.video.can_update_own_metadata,
        "canUpdateOwnMetadata should be true"
    );
}

#[test]
fn test_token_name_defaults_to_identity() {
    let identity = Identity::new("user-77").unwrap();
    let token = service()
        .generate_join_token(&identity, &VoiceGrant::full_access(RoomName::generate()))
        .unwrap();
    assert_eq!(decode(&token).name, "user-77");
}

#[test]
fn test_token_uses_configured_name_and_ttl() {
    let mut config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    config.participant_name = Some("test".to_string());
    config.token_ttl_seconds = 600;
    let service = VoiceService::new(config).unwrap();

    let identity = Identity::new("user-1").unwrap();
    let token = service
        .generate_join_token(&identity, &VoiceGrant::full_access(RoomName::generate()))
        .unwrap();
    let claims = decode(&token);
    assert_eq!(claims.name, "test");

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    assert!(claims.exp <= now + 600 + 5);
    assert!(claims.exp >= now + 600 - 60);
}

#[test]
fn test_from_lookup_requires_all_three_values() {
    let full: HashMap<&str, &str> = [
        ("LIVEKIT_URL", DEFAULT_URL),
        ("LIVEKIT_API_KEY", DEFAULT_KEY),
        ("LIVEKIT_API_SECRET", DEFAULT_SECRET),
    ]
    .into_iter()
    .collect();

    let config = LiveKitConfig::from_lookup(|k| full.get(k).map(|v| v.to_string()))
        .expect("complete environment should validate");
    assert_eq!(config.url, DEFAULT_URL);

    for missing in ["LIVEKIT_URL", "LIVEKIT_API_KEY", "LIVEKIT_API_SECRET"] {
        let err = LiveKitConfig::from_lookup(|k| {
            if k == missing {
                None
            } else {
                full.get(k).map(|v| v.to_string())
            }
        })
        .expect_err("missing value should fail");
        match err {
            VoiceError::Config(msg) => assert!(msg.contains(missing), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn test_empty_values_count_as_missing() {
    let err = LiveKitConfig::new(DEFAULT_URL, "  ", DEFAULT_SECRET)
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("LIVEKIT_API_KEY"));
}

#[test]
fn test_debug_redacts_secret() {
    let config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    let rendered = format!("{config:?}");
    assert!(!rendered.contains(DEFAULT_SECRET));
    assert!(rendered.contains("[REDACTED]"));
}

#[test]
fn test_control_url_rewrites_websocket_schemes() {
    let mut config = LiveKitConfig::new("wss://example.livekit.cloud", DEFAULT_KEY, DEFAULT_SECRET);
    assert_eq!(config.control_url(), "https://example.livekit.cloud");
    config.url = "ws://localhost:7880".to_string();
    assert_eq!(config.control_url(), "http://localhost:7880");
    config.url = "https://already.http".to_string();
    assert_eq!(config.control_url(), "https://already.http");
}

#[test]
fn test_public_url_falls_back_to_url() {
    assert_eq!(service().get_public_url(), DEFAULT_URL);

    let mut config = LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET);
    config.public_url = "wss://public.example".to_string();
    let service = VoiceService::new(config).unwrap();
    assert_eq!(service.get_public_url(), "wss://public.example");
}

#[test]
fn test_livekit_config_toml() {
    let toml_str = r#"
        url = "ws://localhost:7880"
        api_key = "key"
        api_secret = "secret"
        participant_name = "assistant-user"
    "#;

    let config: LiveKitConfig = toml::from_str(toml_str).expect("parse TOML");
    assert_eq!(config.token_ttl_seconds, 3600);
    assert_eq!(config.participant_name.as_deref(), Some("assistant-user"));
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn test_issuer_mints_fresh_room_per_call() {
    let rooms = Arc::new(RecordingProvisioner::default());
    let issuer = CredentialIssuer::with_provisioner(service(), rooms.clone());
    let identity = Identity::new("user-1").unwrap();

    let first = issuer.issue(&identity).await.unwrap();
    let second = issuer.issue(&identity).await.unwrap();

    assert_ne!(first.room_name, second.room_name);
    assert_ne!(first.token, second.token);
    assert!(first.room_name.is_uuid());
    assert_eq!(rooms.calls.load(Ordering::SeqCst), 2);
    assert_eq!(decode(&second.token).video.room, second.room_name.as_str());
}

#[tokio::test]
async fn test_issuer_propagates_provisioning_failure() {
    let issuer = CredentialIssuer::with_provisioner(service(), Arc::new(RefusingProvisioner));
    let identity = Identity::new("user-1").unwrap();

    match issuer.issue(&identity).await {
        Err(VoiceError::RoomService(msg)) => assert!(msg.contains("unauthenticated")),
        other => panic!("expected room service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_room_against_local_server() {
    // Runs against a local LiveKit dev server when one is available.
    let url = std::env::var("LIVEKIT_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let service = VoiceService::new(LiveKitConfig::new(&url, "devkey", "secret")).unwrap();
    let name = RoomName::generate();

    match service.create_room(&name).await {
        Ok(room) => assert_eq!(room.name, name),
        Err(e) => {
            // No sidecar in this environment; any error must surface as a
            // room service failure rather than being swallowed.
            assert!(matches!(e, VoiceError::RoomService(_)), "{e:?}");
        }
    }
}
