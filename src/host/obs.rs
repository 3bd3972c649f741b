//! Blocking obs-websocket v5 client.
//!
//! The client owns one WebSocket connection. Requests block until the matching
//! response arrives; events received in the meantime are queued and handed out
//! by [`ObsClient::next_event`].

use super::protocol::{
    self, op, subscription, CurrentProgramScene, Envelope, Hello, Identify, LastReplay,
    OutputStatus, ProfileList, Request, RequestResponse, SceneItemList,
    SceneItemTransformResponse, RPC_VERSION,
};
use super::{BufferControl, CaptureSource, HostError, HostEvent, ProfileControl, SceneQuery};
use crate::constants::{EVENT_WAIT_SLICE, REQUEST_TIMEOUT};
use log::{debug, info};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Instant;
use tungstenite::{Message, WebSocket};
use url::Url;

pub struct ObsClient {
    socket: WebSocket<TcpStream>,
    next_request_id: u64,
    pending_events: VecDeque<HostEvent>,
}

impl ObsClient {
    /// Connect to `url` and complete the identify handshake.
    pub fn connect(url: &str, password: Option<&str>) -> Result<Self, HostError> {
        let connect_err = |reason: String| HostError::Connect {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| connect_err(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| connect_err("missing host".into()))?;
        let port = parsed.port_or_known_default().unwrap_or(4455);

        let stream = TcpStream::connect((host, port)).map_err(|e| connect_err(e.to_string()))?;
        stream.set_read_timeout(Some(REQUEST_TIMEOUT))?;
        stream.set_nodelay(true)?;

        let (socket, _response) =
            tungstenite::client(url, stream).map_err(|e| connect_err(e.to_string()))?;

        let mut client = Self {
            socket,
            next_request_id: 0,
            pending_events: VecDeque::new(),
        };
        client.identify(password)?;
        client.socket.get_ref().set_read_timeout(Some(EVENT_WAIT_SLICE))?;

        info!("Connected to OBS at {url}");
        Ok(client)
    }

    fn identify(&mut self, password: Option<&str>) -> Result<(), HostError> {
        let hello: Hello = self.expect_op(op::HELLO, "Hello")?;
        debug!(
            "OBS hello: obs-websocket {} rpc {}",
            hello.obs_web_socket_version.as_deref().unwrap_or("unknown"),
            hello.rpc_version
        );

        let authentication = match (hello.authentication, password) {
            (Some(challenge), Some(password)) => Some(protocol::auth_string(
                password,
                &challenge.salt,
                &challenge.challenge,
            )),
            (Some(_), None) => return Err(HostError::AuthRequired),
            (None, _) => None,
        };

        self.send(
            op::IDENTIFY,
            &Identify {
                rpc_version: RPC_VERSION,
                authentication,
                event_subscriptions: subscription::GENERAL | subscription::OUTPUTS,
            },
        )?;

        let _identified: Value = self.expect_op(op::IDENTIFIED, "Identified")?;
        Ok(())
    }

    /// Next queued or incoming event, waiting at most one read slice.
    pub fn next_event(&mut self) -> Result<Option<HostEvent>, HostError> {
        if let Some(event) = self.pending_events.pop_front() {
            return Ok(Some(event));
        }

        let Some(envelope) = self.read_envelope()? else {
            return Ok(None);
        };
        match envelope.op {
            op::EVENT => Ok(protocol::decode_event(serde_json::from_value(envelope.d)?)),
            other => {
                debug!("Ignoring unsolicited message with op {other}");
                Ok(None)
            }
        }
    }

    /// Close the connection politely.
    pub fn close(mut self) {
        if let Err(e) = self.socket.close(None) {
            debug!("Error closing OBS connection: {e}");
        }
    }

    fn send<T: Serialize>(&mut self, opcode: u8, payload: &T) -> Result<(), HostError> {
        let frame = protocol::encode(opcode, payload)?;
        self.socket.send(Message::text(frame))?;
        Ok(())
    }

    /// Read one frame. `Ok(None)` on read timeout or a non-text frame.
    fn read_envelope(&mut self) -> Result<Option<Envelope>, HostError> {
        match self.socket.read() {
            Ok(Message::Text(text)) => Ok(Some(serde_json::from_str(text.as_str())?)),
            Ok(Message::Close(frame)) => Err(HostError::Closed(
                frame
                    .map(|f| format!("{} {}", u16::from(f.code), f.reason.as_str()))
                    .unwrap_or_else(|| "no close frame".to_string()),
            )),
            Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {
                Ok(None)
            }
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn expect_op<T: DeserializeOwned>(&mut self, opcode: u8, what: &'static str) -> Result<T, HostError> {
        let deadline = Instant::now() + REQUEST_TIMEOUT;
        while Instant::now() < deadline {
            let Some(envelope) = self.read_envelope()? else {
                continue;
            };
            if envelope.op == opcode {
                return Ok(serde_json::from_value(envelope.d)?);
            }
            return Err(HostError::Protocol(format!(
                "expected {what} (op {opcode}), got op {}",
                envelope.op
            )));
        }
        Err(HostError::Timeout(what))
    }

    fn request<T: DeserializeOwned>(
        &mut self,
        request_type: &'static str,
        request_data: Option<Value>,
    ) -> Result<T, HostError> {
        self.next_request_id += 1;
        let request_id = self.next_request_id.to_string();
        self.send(
            op::REQUEST,
            &Request {
                request_type,
                request_id: request_id.clone(),
                request_data,
            },
        )?;

        let deadline = Instant::now() + REQUEST_TIMEOUT;
        while Instant::now() < deadline {
            let Some(envelope) = self.read_envelope()? else {
                continue;
            };
            match envelope.op {
                op::REQUEST_RESPONSE => {
                    let response: RequestResponse = serde_json::from_value(envelope.d)?;
                    if response.request_id != request_id {
                        debug!(
                            "Dropping stale response to {} ({})",
                            response.request_type, response.request_id
                        );
                        continue;
                    }
                    if !response.request_status.result {
                        return Err(HostError::Request {
                            request_type: request_type.to_string(),
                            code: response.request_status.code,
                            comment: response.request_status.comment.unwrap_or_default(),
                        });
                    }
                    return Ok(serde_json::from_value(
                        response.response_data.unwrap_or(Value::Null),
                    )?);
                }
                op::EVENT => {
                    if let Some(event) = protocol::decode_event(serde_json::from_value(envelope.d)?) {
                        self.pending_events.push_back(event);
                    }
                }
                other => debug!("Ignoring message with op {other} while waiting for {request_type}"),
            }
        }
        Err(HostError::Timeout(request_type))
    }
}

impl SceneQuery for ObsClient {
    fn current_scene(&mut self) -> Result<String, HostError> {
        let scene: CurrentProgramScene = self.request("GetCurrentProgramScene", None)?;
        Ok(scene.current_program_scene_name)
    }

    fn capture_sources(&mut self, scene: &str, kind: &str) -> Result<Vec<CaptureSource>, HostError> {
        let list: SceneItemList =
            self.request("GetSceneItemList", Some(json!({ "sceneName": scene })))?;
        Ok(list
            .scene_items
            .into_iter()
            .filter(|item| item.input_kind.as_deref() == Some(kind))
            .map(|item| CaptureSource {
                name: item.source_name,
                item_id: item.scene_item_id,
            })
            .collect())
    }

    fn source_width(&mut self, scene: &str, source: &CaptureSource) -> Result<f64, HostError> {
        let transform: SceneItemTransformResponse = self.request(
            "GetSceneItemTransform",
            Some(json!({ "sceneName": scene, "sceneItemId": source.item_id })),
        )?;
        Ok(transform.scene_item_transform.source_width)
    }
}

impl BufferControl for ObsClient {
    fn is_buffer_active(&mut self) -> Result<bool, HostError> {
        let status: OutputStatus = self.request("GetReplayBufferStatus", None)?;
        Ok(status.output_active)
    }

    fn start_buffer(&mut self) -> Result<(), HostError> {
        let _: IgnoredAny = self.request("StartReplayBuffer", None)?;
        Ok(())
    }

    fn stop_buffer(&mut self) -> Result<(), HostError> {
        let _: IgnoredAny = self.request("StopReplayBuffer", None)?;
        Ok(())
    }

    fn last_replay_path(&mut self) -> Result<Option<String>, HostError> {
        let last: LastReplay = self.request("GetLastReplayBufferReplay", None)?;
        Ok(Some(last.saved_replay_path).filter(|p| !p.is_empty()))
    }
}

impl ProfileControl for ObsClient {
    fn current_profile(&mut self) -> Result<String, HostError> {
        let list: ProfileList = self.request("GetProfileList", None)?;
        Ok(list.current_profile_name)
    }

    fn set_profile(&mut self, name: &str) -> Result<(), HostError> {
        let _: IgnoredAny =
            self.request("SetCurrentProfile", Some(json!({ "profileName": name })))?;
        Ok(())
    }
}
