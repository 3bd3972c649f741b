//! Host-side collaborators: what the controller asks of the recording application.
//!
//! The controller only talks to the host through these traits. The
//! obs-websocket client in [`obs`] implements them for a running OBS instance;
//! tests use in-memory fakes.

pub mod obs;
pub mod protocol;

use std::io;
use thiserror::Error;

/// A capture source found in a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSource {
    pub name: String,
    /// Host identifier of the scene item wrapping the source.
    pub item_id: i64,
}

/// Buffer lifecycle events delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ReplayStarted,
    ReplayStopped,
    /// A replay was written; the host may include the file path.
    ReplaySaved { path: Option<String> },
    /// The host is shutting down.
    Exiting,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Host requires a password but none is configured")]
    AuthRequired,

    #[error("{request_type} failed with code {code}: {comment}")]
    Request {
        request_type: String,
        code: i64,
        comment: String,
    },

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("Connection closed: {0}")]
    Closed(String),
}

impl HostError {
    /// Whether the connection is unusable and must be re-established.
    pub fn is_disconnect(&self) -> bool {
        match self {
            HostError::Closed(_) | HostError::Io(_) | HostError::Connect { .. } => true,
            HostError::WebSocket(e) => matches!(
                e,
                tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::AlreadyClosed
                    | tungstenite::Error::Io(_)
            ),
            HostError::Json(_)
            | HostError::Protocol(_)
            | HostError::AuthRequired
            | HostError::Request { .. }
            | HostError::Timeout(_) => false,
        }
    }
}

/// Scene and source queries.
pub trait SceneQuery {
    /// Name of the scene currently on program output.
    fn current_scene(&mut self) -> Result<String, HostError>;

    /// Sources of input kind `kind` in `scene`, in host enumeration order.
    fn capture_sources(&mut self, scene: &str, kind: &str) -> Result<Vec<CaptureSource>, HostError>;

    /// Output width of `source`; zero while nothing is captured.
    fn source_width(&mut self, scene: &str, source: &CaptureSource) -> Result<f64, HostError>;
}

/// Replay buffer control.
pub trait BufferControl {
    fn is_buffer_active(&mut self) -> Result<bool, HostError>;
    fn start_buffer(&mut self) -> Result<(), HostError>;
    fn stop_buffer(&mut self) -> Result<(), HostError>;

    /// Path of the most recently saved replay, if the host knows one.
    fn last_replay_path(&mut self) -> Result<Option<String>, HostError>;
}

/// Settings profile control.
pub trait ProfileControl {
    fn current_profile(&mut self) -> Result<String, HostError>;
    fn set_profile(&mut self, name: &str) -> Result<(), HostError>;
}

/// Everything the controller needs from the host.
pub trait Host: SceneQuery + BufferControl + ProfileControl {}

impl<T: SceneQuery + BufferControl + ProfileControl> Host for T {}
