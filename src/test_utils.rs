//! Shared test utilities for AutoReplay.
//!
//! Database setup plus in-memory fakes for every controller collaborator.

#![cfg(test)]

use crate::db::{migrations, Database};
use crate::host::{BufferControl, CaptureSource, HostError, ProfileControl, SceneQuery};
use crate::notify::{NotificationSink, Toast};
use crate::platform::ForegroundAppResolver;
use crate::relocator::FileMover;
use crate::sanitize::{sanitize_app_name, SanitizePolicy};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// State-changing calls made against a [`FakeHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    StartBuffer,
    StopBuffer,
    SetProfile(String),
}

/// In-memory host with one program scene.
#[derive(Debug)]
pub struct FakeHost {
    pub scene: String,
    pub sources: Vec<CaptureSource>,
    pub widths: HashMap<i64, f64>,
    pub active: bool,
    /// Whether start/stop take effect immediately. Off simulates a slow host.
    pub applies_commands: bool,
    /// Fail `StartReplayBuffer` the way OBS does when the replay buffer is disabled.
    pub rejects_start: bool,
    pub profile: String,
    pub last_replay: Option<String>,
    pub calls: Vec<HostCall>,
}

impl FakeHost {
    pub fn new(scene: &str) -> Self {
        Self {
            scene: scene.to_string(),
            sources: Vec::new(),
            widths: HashMap::new(),
            active: false,
            applies_commands: true,
            rejects_start: false,
            profile: "Default".to_string(),
            last_replay: None,
            calls: Vec::new(),
        }
    }

    pub fn with_source(mut self, name: &str, item_id: i64, width: f64) -> Self {
        self.sources.push(CaptureSource {
            name: name.to_string(),
            item_id,
        });
        self.widths.insert(item_id, width);
        self
    }

    pub fn set_width(&mut self, item_id: i64, width: f64) {
        self.widths.insert(item_id, width);
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl SceneQuery for FakeHost {
    fn current_scene(&mut self) -> Result<String, HostError> {
        Ok(self.scene.clone())
    }

    fn capture_sources(&mut self, scene: &str, _kind: &str) -> Result<Vec<CaptureSource>, HostError> {
        if scene == self.scene {
            Ok(self.sources.clone())
        } else {
            Err(HostError::Request {
                request_type: "GetSceneItemList".to_string(),
                code: 600,
                comment: format!("No source was found by the name of `{scene}`."),
            })
        }
    }

    fn source_width(&mut self, _scene: &str, source: &CaptureSource) -> Result<f64, HostError> {
        self.widths
            .get(&source.item_id)
            .copied()
            .ok_or_else(|| HostError::Request {
                request_type: "GetSceneItemTransform".to_string(),
                code: 600,
                comment: "No scene item was found".to_string(),
            })
    }
}

impl BufferControl for FakeHost {
    fn is_buffer_active(&mut self) -> Result<bool, HostError> {
        Ok(self.active)
    }

    fn start_buffer(&mut self) -> Result<(), HostError> {
        self.calls.push(HostCall::StartBuffer);
        if self.rejects_start {
            return Err(HostError::Request {
                request_type: "StartReplayBuffer".to_string(),
                code: 604,
                comment: "Replay buffer is not available.".to_string(),
            });
        }
        if self.applies_commands {
            self.active = true;
        }
        Ok(())
    }

    fn stop_buffer(&mut self) -> Result<(), HostError> {
        self.calls.push(HostCall::StopBuffer);
        if self.applies_commands {
            self.active = false;
        }
        Ok(())
    }

    fn last_replay_path(&mut self) -> Result<Option<String>, HostError> {
        Ok(self.last_replay.clone())
    }
}

impl ProfileControl for FakeHost {
    fn current_profile(&mut self) -> Result<String, HostError> {
        Ok(self.profile.clone())
    }

    fn set_profile(&mut self, name: &str) -> Result<(), HostError> {
        self.calls.push(HostCall::SetProfile(name.to_string()));
        self.profile = name.to_string();
        Ok(())
    }
}

/// Records every toast shown.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub toasts: Rc<RefCell<Vec<Toast>>>,
}

impl NotificationSink for RecordingNotifier {
    fn show(&mut self, toast: &Toast) {
        self.toasts.borrow_mut().push(toast.clone());
    }

    fn clear(&mut self) {}
}

/// Records moves; fails every move when `fail` is set.
#[derive(Debug, Default)]
pub struct FakeMover {
    pub moves: Rc<RefCell<Vec<(PathBuf, PathBuf)>>>,
    pub fail: bool,
}

impl FileMover for FakeMover {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "source missing"));
        }
        self.moves
            .borrow_mut()
            .push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }
}

/// Resolves whatever raw name is currently stored, sanitized like the real resolver.
#[derive(Debug, Default)]
pub struct FixedResolver {
    pub name: Rc<RefCell<String>>,
}

impl ForegroundAppResolver for FixedResolver {
    fn foreground_app_name(&self, policy: SanitizePolicy) -> String {
        sanitize_app_name(&self.name.borrow(), policy)
    }
}
