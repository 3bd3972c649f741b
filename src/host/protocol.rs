//! obs-websocket v5 message types.
//!
//! Every frame is a JSON object `{"op": <opcode>, "d": <payload>}`.

use super::HostEvent;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// RPC version negotiated in `Identify`.
pub const RPC_VERSION: u32 = 1;

pub mod op {
    pub const HELLO: u8 = 0;
    pub const IDENTIFY: u8 = 1;
    pub const IDENTIFIED: u8 = 2;
    pub const EVENT: u8 = 5;
    pub const REQUEST: u8 = 6;
    pub const REQUEST_RESPONSE: u8 = 7;
}

/// Event subscription bits.
pub mod subscription {
    pub const GENERAL: u32 = 1 << 0;
    pub const OUTPUTS: u32 = 1 << 6;
}

const OUTPUT_STARTED: &str = "OBS_WEBSOCKET_OUTPUT_STARTED";
const OUTPUT_STOPPED: &str = "OBS_WEBSOCKET_OUTPUT_STOPPED";

#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    #[serde(default)]
    pub obs_web_socket_version: Option<String>,
    pub rpc_version: u32,
    #[serde(default)]
    pub authentication: Option<AuthChallenge>,
}

#[derive(Debug, Deserialize)]
pub struct AuthChallenge {
    pub challenge: String,
    pub salt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    pub rpc_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    pub event_subscriptions: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<'a> {
    pub request_type: &'a str,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub request_type: String,
    pub request_id: String,
    pub request_status: RequestStatus,
    #[serde(default)]
    pub response_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RequestStatus {
    pub result: bool,
    pub code: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_type: String,
    #[serde(default)]
    pub event_data: Option<Value>,
}

// Response payloads

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProgramScene {
    pub current_program_scene_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneItemList {
    pub scene_items: Vec<SceneItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneItem {
    pub scene_item_id: i64,
    pub source_name: String,
    /// Absent for nested scenes and groups.
    #[serde(default)]
    pub input_kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneItemTransformResponse {
    pub scene_item_transform: SceneItemTransform,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneItemTransform {
    pub source_width: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputStatus {
    pub output_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileList {
    pub current_profile_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastReplay {
    pub saved_replay_path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplayStateChanged {
    output_state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaySaved {
    #[serde(default)]
    saved_replay_path: Option<String>,
}

/// Wrap a payload into a frame.
pub fn encode<T: Serialize>(opcode: u8, payload: &T) -> Result<String, serde_json::Error> {
    let d = serde_json::to_value(payload)?;
    Ok(json!({ "op": opcode, "d": d }).to_string())
}

/// Authentication string for an `Identify` message.
///
/// `base64(sha256(base64(sha256(password + salt)) + challenge))`
pub fn auth_string(password: &str, salt: &str, challenge: &str) -> String {
    let secret = STANDARD.encode(Sha256::digest(format!("{password}{salt}").as_bytes()));
    STANDARD.encode(Sha256::digest(format!("{secret}{challenge}").as_bytes()))
}

/// Map a host event onto the lifecycle events the controller handles.
///
/// Returns `None` for events the controller does not care about, including
/// the intermediate starting/stopping states of the replay buffer.
pub fn decode_event(event: Event) -> Option<HostEvent> {
    let data = event.event_data.unwrap_or(Value::Null);
    match event.event_type.as_str() {
        "ReplayBufferStateChanged" => {
            let changed: ReplayStateChanged = serde_json::from_value(data).ok()?;
            match changed.output_state.as_str() {
                OUTPUT_STARTED => Some(HostEvent::ReplayStarted),
                OUTPUT_STOPPED => Some(HostEvent::ReplayStopped),
                _ => None,
            }
        }
        "ReplayBufferSaved" => {
            let saved: ReplaySaved = serde_json::from_value(data).unwrap_or(ReplaySaved {
                saved_replay_path: None,
            });
            Some(HostEvent::ReplaySaved {
                path: saved.saved_replay_path.filter(|p| !p.is_empty()),
            })
        }
        "ExitStarted" => Some(HostEvent::Exiting),
        _ => None,
    }
}
