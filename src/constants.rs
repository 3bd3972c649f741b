// src/constants.rs

use std::time::Duration;

/// Default poll interval in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: f64 = 10.0;

/// Poll interval bounds in seconds.
pub const MIN_REFRESH_INTERVAL_SECS: f64 = 1.0;
pub const MAX_REFRESH_INTERVAL_SECS: f64 = 20.0;

/// Default time a toast stays on screen, in seconds.
pub const DEFAULT_TOAST_DURATION_SECS: f64 = 1.5;

/// Toast duration bounds in seconds.
pub const MIN_TOAST_DURATION_SECS: f64 = 0.5;
pub const MAX_TOAST_DURATION_SECS: f64 = 5.0;

/// Started toasts stay up longer than the others.
pub const STARTED_TOAST_LINGER_FACTOR: f64 = 1.5;

/// Default obs-websocket endpoint.
pub const DEFAULT_OBS_URL: &str = "ws://127.0.0.1:4455";

/// Input kind of the capture source that drives the replay buffer.
pub const GAME_CAPTURE_KIND: &str = "game_capture";

/// Folder created next to the recording directory for sorted replays.
pub const REPLAYS_DIR: &str = "Replays";

/// Folder name used when no application name can be resolved.
pub const FALLBACK_APP_NAME: &str = "Other";

/// Application name shown in desktop notifications.
pub const NOTIFICATION_APP_NAME: &str = "AutoReplay";

/// Delay between host reconnect attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Longest a service loop iteration blocks waiting for host events.
pub const EVENT_WAIT_SLICE: Duration = Duration::from_millis(250);

/// Timeout for a single host request round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
