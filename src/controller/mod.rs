//! Replay buffer automation: the poll step, host event handlers and the
//! user-triggered status actions.

use crate::constants::{GAME_CAPTURE_KIND, STARTED_TOAST_LINGER_FACTOR};
use crate::error::AppError;
use crate::host::{Host, HostError, HostEvent};
use crate::models::Settings;
use crate::notify::{NotificationSink, Toast};
use crate::platform::ForegroundAppResolver;
use crate::relocator::{relocate, FileMover, RelocateError};
use crate::session::SessionState;
use log::{debug, error, info, warn};
use std::time::SystemTime;

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Clipping is off and the buffer is not running.
    Disabled,
    /// The program scene is not the configured one.
    SceneMismatch,
    NoCaptureSource,
    Started,
    Stopped,
    /// A start or stop was issued and the host has not confirmed it yet.
    Pending,
    Unchanged,
}

/// A buffer command waiting for the host to catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingCommand {
    Start,
    Stop,
}

pub struct AutoReplayController {
    settings: Settings,
    session: SessionState,
    pending: Option<PendingCommand>,
    notifier: Box<dyn NotificationSink>,
    mover: Box<dyn FileMover>,
    resolver: Box<dyn ForegroundAppResolver>,
    clock: fn() -> SystemTime,
}

impl AutoReplayController {
    pub fn new(
        settings: Settings,
        notifier: Box<dyn NotificationSink>,
        mover: Box<dyn FileMover>,
        resolver: Box<dyn ForegroundAppResolver>,
    ) -> Self {
        Self {
            settings,
            session: SessionState::default(),
            pending: None,
            notifier,
            mover,
            resolver,
            clock: SystemTime::now,
        }
    }

    /// Replace the time source used for session durations.
    pub fn with_clock(mut self, clock: fn() -> SystemTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Forget everything tied to the current host connection.
    pub fn disconnected(&mut self) {
        self.session = SessionState::default();
        self.pending = None;
    }

    /// One poll step. Lookup failures are returned; [`Self::tick`] logs them.
    pub fn poll(&mut self, host: &mut dyn Host) -> Result<PollOutcome, HostError> {
        let active = host.is_buffer_active()?;
        self.settle_pending(active);

        if !self.settings.enabled {
            return if active {
                info!("Clipping disabled, stopping replay buffer");
                self.stop(host)
            } else {
                Ok(PollOutcome::Disabled)
            };
        }

        let scene = host.current_scene()?;
        if let Some(target) = self.settings.scene.as_deref() {
            if target != scene {
                debug!("Program scene '{scene}' is not '{target}'");
                return Ok(PollOutcome::SceneMismatch);
            }
        }

        let sources = host.capture_sources(&scene, GAME_CAPTURE_KIND)?;
        let Some(source) = sources.last() else {
            warn!("Could not find game capture source in current scene");
            return Ok(PollOutcome::NoCaptureSource);
        };

        let width = host.source_width(&scene, source)?;
        let capturing = width > 0.0;
        debug!("Capture source '{}' width {width}", source.name);

        match (capturing, active) {
            (true, false) => self.start(host),
            (false, true) => self.stop(host),
            (true, true) | (false, false) => Ok(PollOutcome::Unchanged),
        }
    }

    /// Poll and log the result. Never fails.
    pub fn tick(&mut self, host: &mut dyn Host) -> Option<PollOutcome> {
        match self.poll(host) {
            Ok(outcome) => {
                debug!("Poll: {outcome:?}");
                Some(outcome)
            }
            Err(e) => {
                warn!("Poll skipped: {e}");
                None
            }
        }
    }

    fn settle_pending(&mut self, active: bool) {
        match (self.pending, active) {
            (Some(PendingCommand::Start), true) | (Some(PendingCommand::Stop), false) => {
                self.pending = None;
            }
            (Some(PendingCommand::Start), false) | (Some(PendingCommand::Stop), true) | (None, _) => {}
        }
    }

    fn start(&mut self, host: &mut dyn Host) -> Result<PollOutcome, HostError> {
        if self.pending == Some(PendingCommand::Start) {
            return Ok(PollOutcome::Pending);
        }

        // A remembered profile means we already switched and never switched back
        if let (Some(profile), None) =
            (self.settings.profile.clone(), &self.session.previous_profile)
        {
            let previous = host.current_profile()?;
            info!("Switching profile from '{previous}' to '{profile}'");
            host.set_profile(&profile)?;
            self.session.previous_profile = Some(previous);
        }

        if let Err(e) = host.start_buffer() {
            self.restore_profile(host);
            return Err(e);
        }
        self.pending = Some(PendingCommand::Start);
        info!("Starting replay buffer");
        Ok(PollOutcome::Started)
    }

    /// Switch back after a failed start. On failure the profile stays remembered.
    fn restore_profile(&mut self, host: &mut dyn Host) {
        let Some(previous) = self.session.previous_profile.clone() else {
            return;
        };
        match host.set_profile(&previous) {
            Ok(()) => {
                info!("Start failed, restored profile '{previous}'");
                self.session.previous_profile = None;
            }
            Err(e) => warn!("Could not restore profile '{previous}': {e}"),
        }
    }

    fn stop(&mut self, host: &mut dyn Host) -> Result<PollOutcome, HostError> {
        if self.pending == Some(PendingCommand::Stop) {
            return Ok(PollOutcome::Pending);
        }

        host.stop_buffer()?;
        self.pending = Some(PendingCommand::Stop);
        info!("Stopping replay buffer");

        if let Some(previous) = self.session.previous_profile.clone() {
            info!("Restoring profile '{previous}'");
            host.set_profile(&previous)?;
            self.session.previous_profile = None;
        }
        Ok(PollOutcome::Stopped)
    }

    /// React to a buffer lifecycle event.
    pub fn handle_event(&mut self, host: &mut dyn Host, event: HostEvent) -> Result<(), AppError> {
        match event {
            HostEvent::ReplayStarted => {
                self.pending = None;
                self.on_started();
                Ok(())
            }
            HostEvent::ReplayStopped => {
                self.pending = None;
                self.on_stopped();
                Ok(())
            }
            HostEvent::ReplaySaved { path } => self.on_saved(host, path),
            HostEvent::Exiting => {
                info!("OBS is shutting down");
                Ok(())
            }
        }
    }

    fn on_started(&mut self) {
        let app = self.resolver.foreground_app_name(self.settings.sanitize_policy);
        info!("Replay buffer started, playing {app}");

        let toast = Toast::new("Started Replay Buffer")
            .with_body(Some(format!("Playing {app}")))
            .lingering(
                self.settings
                    .toast_duration()
                    .mul_f64(STARTED_TOAST_LINGER_FACTOR),
            );
        self.session.begin(app, (self.clock)());
        self.notifier.show(&toast);
    }

    fn on_stopped(&mut self) {
        let summary = self.session.summary((self.clock)());
        info!(
            "Replay buffer stopped ({})",
            summary.as_deref().unwrap_or("no session")
        );

        self.notifier
            .show(&Toast::new("Stopped Replay Buffer").with_body(summary));
        self.session.clear();
    }

    fn on_saved(&mut self, host: &mut dyn Host, path: Option<String>) -> Result<(), AppError> {
        let path = match path {
            Some(path) => path,
            None => host
                .last_replay_path()?
                .ok_or(RelocateError::NoReplayPath)?,
        };

        let notify = self.settings.notify_on_save;
        let linger = self.settings.toast_duration();
        if notify {
            self.notifier
                .show(&Toast::new("Saving Replay...").lingering(linger));
        }

        let app = match self.session.app_name.clone() {
            Some(app) => app,
            None => {
                let app = self.resolver.foreground_app_name(self.settings.sanitize_policy);
                self.session.app_name = Some(app.clone());
                app
            }
        };

        let relocation = relocate(self.mover.as_ref(), &path, &app).inspect_err(|e| {
            error!("Replay left at '{path}': {e}");
        })?;

        if notify {
            self.notifier.show(
                &Toast::new("Saved Replay")
                    .with_body(Some(format!("Saved in {}", relocation.folder)))
                    .lingering(linger),
            );
        }
        Ok(())
    }

    /// `Playing <app> | Session Duration: <d>` and the shorter variants.
    fn playing_summary(&self) -> Option<String> {
        let summary = self.session.summary((self.clock)())?;
        Some(match self.session.app_name {
            Some(_) => format!("Playing {summary}"),
            None => summary,
        })
    }

    /// Toast whether the buffer is running, and for what.
    pub fn check_status(&mut self, host: &mut dyn Host) -> Result<bool, HostError> {
        let active = host.is_buffer_active()?;
        let toast = if active {
            Toast::new("Replay Buffer is Currently Active").with_body(self.playing_summary())
        } else {
            Toast::new("Replay Buffer is Not Active")
        };
        self.notifier
            .show(&toast.lingering(self.settings.toast_duration()));
        Ok(active)
    }

    /// Re-resolve the foreground application for a running session.
    pub fn update_game(&mut self, host: &mut dyn Host) -> Result<bool, HostError> {
        if !host.is_buffer_active()? {
            debug!("Replay buffer not active, nothing to update");
            return Ok(false);
        }

        let app = self.resolver.foreground_app_name(self.settings.sanitize_policy);
        info!("Now playing {app}");
        self.session.app_name = Some(app);

        let toast = Toast::new("Replay Buffer is Currently Active")
            .with_body(self.playing_summary())
            .lingering(self.settings.toast_duration());
        self.notifier.show(&toast);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Toast;
    use crate::sanitize::SanitizePolicy;
    use crate::test_utils::{FakeHost, FakeMover, FixedResolver, HostCall, RecordingNotifier};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::{Duration, UNIX_EPOCH};

    const NOW_SECS: u64 = 1_700_000_000;

    fn fixed_now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(NOW_SECS)
    }

    struct Harness {
        controller: AutoReplayController,
        toasts: Rc<RefCell<Vec<Toast>>>,
        moves: Rc<RefCell<Vec<(PathBuf, PathBuf)>>>,
        app: Rc<RefCell<String>>,
    }

    fn harness_with(settings: Settings, mover_fails: bool) -> Harness {
        let notifier = RecordingNotifier::default();
        let mover = FakeMover {
            fail: mover_fails,
            ..FakeMover::default()
        };
        let resolver = FixedResolver::default();
        *resolver.name.borrow_mut() = "Valorant".to_string();

        let toasts = Rc::clone(&notifier.toasts);
        let moves = Rc::clone(&mover.moves);
        let app = Rc::clone(&resolver.name);

        let controller = AutoReplayController::new(
            settings,
            Box::new(notifier),
            Box::new(mover),
            Box::new(resolver),
        )
        .with_clock(fixed_now);

        Harness {
            controller,
            toasts,
            moves,
            app,
        }
    }

    fn harness() -> Harness {
        harness_with(Settings::default(), false)
    }

    fn titles(toasts: &Rc<RefCell<Vec<Toast>>>) -> Vec<String> {
        toasts.borrow().iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_starts_when_capture_has_width() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);

        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Started);
        assert!(host.active);
        assert_eq!(host.calls, vec![HostCall::StartBuffer]);
    }

    #[test]
    fn test_stops_when_capture_width_drops_to_zero() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);
        h.controller.poll(&mut host).unwrap();

        host.set_width(1, 0.0);
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Stopped);
        assert!(!host.active);
        assert_eq!(host.count(&HostCall::StopBuffer), 1);
    }

    #[test]
    fn test_unchanged_while_state_matches() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 0.0);
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Unchanged);

        host.set_width(1, 1280.0);
        h.controller.poll(&mut host).unwrap();
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Unchanged);
        assert_eq!(host.count(&HostCall::StartBuffer), 1);
    }

    #[test]
    fn test_other_scene_never_starts_or_stops() {
        let settings = Settings {
            scene: Some("Gaming".to_string()),
            ..Settings::default()
        };
        let mut h = harness_with(settings, false);

        for (width, active) in [(1920.0, false), (0.0, true), (1920.0, true), (0.0, false)] {
            let mut host = FakeHost::new("Just Chatting").with_source("Game Capture", 1, width);
            host.active = active;
            assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::SceneMismatch);
            assert!(host.calls.is_empty());
        }
    }

    #[test]
    fn test_configured_scene_matches() {
        let settings = Settings {
            scene: Some("Gaming".to_string()),
            ..Settings::default()
        };
        let mut h = harness_with(settings, false);
        let mut host = FakeHost::new("Gaming").with_source("Game Capture", 1, 1920.0);
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Started);
    }

    #[test]
    fn test_last_capture_source_wins() {
        let mut h = harness();
        let mut host = FakeHost::new("Game")
            .with_source("Old Capture", 1, 1920.0)
            .with_source("New Capture", 2, 0.0);

        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Unchanged);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_missing_capture_source_is_noop() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");
        host.active = true;

        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::NoCaptureSource);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_lookup_failure_is_logged_not_fatal() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);
        host.widths.clear();

        assert!(h.controller.poll(&mut host).is_err());
        assert_eq!(h.controller.tick(&mut host), None);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_start_is_not_repeated_until_host_confirms() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);
        host.applies_commands = false;

        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Started);
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Pending);
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Pending);
        assert_eq!(host.count(&HostCall::StartBuffer), 1);

        // The started event releases the guard
        h.controller
            .handle_event(&mut host, HostEvent::ReplayStarted)
            .unwrap();
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Started);
        assert_eq!(host.count(&HostCall::StartBuffer), 2);
    }

    #[test]
    fn test_stop_is_not_repeated_until_host_confirms() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 0.0);
        host.active = true;
        host.applies_commands = false;

        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Stopped);
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Pending);
        assert_eq!(host.count(&HostCall::StopBuffer), 1);
    }

    #[test]
    fn test_start_never_issued_twice_without_stop() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 0.0);

        for width in [1920.0, 1920.0, 0.0, 0.0, 1280.0, 1280.0, 0.0, 1920.0] {
            host.set_width(1, width);
            h.controller.poll(&mut host).unwrap();
        }

        let mut last = None;
        for call in &host.calls {
            assert_ne!(
                (last, call),
                (Some(&HostCall::StartBuffer), &HostCall::StartBuffer)
            );
            last = Some(call);
        }
        assert_eq!(host.count(&HostCall::StartBuffer), 3);
    }

    #[test]
    fn test_profile_switched_and_restored() {
        let settings = Settings {
            profile: Some("Clipping".to_string()),
            ..Settings::default()
        };
        let mut h = harness_with(settings, false);
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);

        h.controller.poll(&mut host).unwrap();
        assert_eq!(host.profile, "Clipping");
        assert_eq!(h.controller.session().previous_profile.as_deref(), Some("Default"));

        host.set_width(1, 0.0);
        h.controller.poll(&mut host).unwrap();
        assert_eq!(host.profile, "Default");
        assert_eq!(h.controller.session().previous_profile, None);
        assert_eq!(
            host.calls,
            vec![
                HostCall::SetProfile("Clipping".to_string()),
                HostCall::StartBuffer,
                HostCall::StopBuffer,
                HostCall::SetProfile("Default".to_string()),
            ]
        );
    }

    #[test]
    fn test_rejected_start_restores_profile() {
        let settings = Settings {
            profile: Some("Clipping".to_string()),
            ..Settings::default()
        };
        let mut h = harness_with(settings, false);
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);
        host.rejects_start = true;

        assert_eq!(h.controller.tick(&mut host), None);
        assert_eq!(h.controller.tick(&mut host), None);

        assert_eq!(host.profile, "Default");
        assert_eq!(h.controller.session().previous_profile, None);
        assert_eq!(host.count(&HostCall::SetProfile("Default".to_string())), 2);

        host.rejects_start = false;
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Started);
        assert_eq!(host.profile, "Clipping");
        assert_eq!(h.controller.session().previous_profile.as_deref(), Some("Default"));
    }

    #[test]
    fn test_remembered_profile_is_not_overwritten() {
        let settings = Settings {
            profile: Some("Clipping".to_string()),
            ..Settings::default()
        };
        let mut h = harness_with(settings, false);
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);
        host.profile = "Clipping".to_string();
        h.controller.session.previous_profile = Some("Default".to_string());

        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Started);
        assert_eq!(h.controller.session().previous_profile.as_deref(), Some("Default"));
        assert_eq!(host.calls, vec![HostCall::StartBuffer]);
    }

    #[test]
    fn test_scene_names_match_exactly() {
        let settings = Settings {
            scene: Some(" Gaming ".to_string()),
            ..Settings::default()
        };
        let mut h = harness_with(settings, false);

        let mut trimmed = FakeHost::new("Gaming").with_source("Game Capture", 1, 1920.0);
        assert_eq!(h.controller.poll(&mut trimmed).unwrap(), PollOutcome::SceneMismatch);

        let mut spaced = FakeHost::new(" Gaming ").with_source("Game Capture", 1, 1920.0);
        assert_eq!(h.controller.poll(&mut spaced).unwrap(), PollOutcome::Started);
    }

    #[test]
    fn test_disabled_stops_active_buffer_and_restores_profile() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);
        host.active = true;
        h.controller.session.previous_profile = Some("Streaming".to_string());

        let mut settings = h.controller.settings().clone();
        settings.enabled = false;
        h.controller.set_settings(settings);

        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Stopped);
        assert!(!host.active);
        assert_eq!(host.profile, "Streaming");
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Disabled);
    }

    #[test]
    fn test_started_event_records_session_and_toasts() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");

        h.controller
            .handle_event(&mut host, HostEvent::ReplayStarted)
            .unwrap();

        assert_eq!(h.controller.session().app_name.as_deref(), Some("Valorant"));
        assert_eq!(h.controller.session().started_at, Some(fixed_now()));

        let toasts = h.toasts.borrow();
        let toast = toasts.first().unwrap();
        assert_eq!(toast.title, "Started Replay Buffer");
        assert_eq!(toast.body.as_deref(), Some("Playing Valorant"));
        assert_eq!(toast.linger, Some(Duration::from_secs_f64(2.25)));
    }

    #[test]
    fn test_stopped_event_reports_duration_and_clears_session() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");
        h.controller.session.app_name = Some("Valorant".to_string());
        h.controller.session.started_at = Some(fixed_now() - Duration::from_secs(3_723));

        h.controller
            .handle_event(&mut host, HostEvent::ReplayStopped)
            .unwrap();

        let toasts = h.toasts.borrow();
        let toast = toasts.first().unwrap();
        assert_eq!(toast.title, "Stopped Replay Buffer");
        assert_eq!(toast.body.as_deref(), Some("Valorant | Session Duration: 1:02:03"));
        assert_eq!(h.controller.session().app_name, None);
        assert_eq!(h.controller.session().started_at, None);
    }

    #[test]
    fn test_stopped_event_without_session() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");

        h.controller
            .handle_event(&mut host, HostEvent::ReplayStopped)
            .unwrap();
        h.controller
            .handle_event(&mut host, HostEvent::ReplayStopped)
            .unwrap();

        assert_eq!(titles(&h.toasts), vec!["Stopped Replay Buffer", "Stopped Replay Buffer"]);
        assert!(h.toasts.borrow().iter().all(|t| t.body.is_none()));
        assert_eq!(*h.controller.session(), SessionState::default());
    }

    #[test]
    fn test_saved_event_moves_into_app_folder() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");
        h.controller.session.app_name = Some("Minecraft".to_string());

        h.controller
            .handle_event(
                &mut host,
                HostEvent::ReplaySaved {
                    path: Some("C:/Recordings/clip1.mp4".to_string()),
                },
            )
            .unwrap();

        assert_eq!(
            *h.moves.borrow(),
            vec![(
                PathBuf::from("C:/Recordings/clip1.mp4"),
                PathBuf::from("C:/Recordings/Replays/Minecraft/clip1.mp4")
            )]
        );
        let toasts = h.toasts.borrow();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts.first().unwrap().title, "Saving Replay...");
        let saved = toasts.get(1).unwrap();
        assert_eq!(saved.title, "Saved Replay");
        assert_eq!(saved.body.as_deref(), Some("Saved in /Replays/Minecraft/"));
    }

    #[test]
    fn test_saved_event_resolves_app_when_unknown() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");
        host.last_replay = Some("C:/Recordings/clip1.mp4".to_string());

        h.controller
            .handle_event(&mut host, HostEvent::ReplaySaved { path: None })
            .unwrap();

        assert_eq!(h.controller.session().app_name.as_deref(), Some("Valorant"));
        assert_eq!(
            h.moves.borrow().first().map(|(_, to)| to.clone()),
            Some(PathBuf::from("C:/Recordings/Replays/Valorant/clip1.mp4"))
        );
    }

    #[test]
    fn test_saved_event_quiet_when_notifications_off() {
        let settings = Settings {
            notify_on_save: false,
            ..Settings::default()
        };
        let mut h = harness_with(settings, false);
        let mut host = FakeHost::new("Game");

        h.controller
            .handle_event(
                &mut host,
                HostEvent::ReplaySaved {
                    path: Some("/videos/clip.mkv".to_string()),
                },
            )
            .unwrap();

        assert!(h.toasts.borrow().is_empty());
        assert_eq!(h.moves.borrow().len(), 1);
    }

    #[test]
    fn test_saved_event_move_failure_propagates() {
        let mut h = harness_with(Settings::default(), true);
        let mut host = FakeHost::new("Game");

        let err = h
            .controller
            .handle_event(
                &mut host,
                HostEvent::ReplaySaved {
                    path: Some("/videos/clip.mkv".to_string()),
                },
            )
            .unwrap_err();

        assert!(matches!(err, AppError::Relocate(RelocateError::Move { .. })));
        assert_eq!(titles(&h.toasts), vec!["Saving Replay..."]);
    }

    #[test]
    fn test_saved_event_without_any_path_fails() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");

        let err = h
            .controller
            .handle_event(&mut host, HostEvent::ReplaySaved { path: None })
            .unwrap_err();
        assert!(matches!(err, AppError::Relocate(RelocateError::NoReplayPath)));
    }

    #[test]
    fn test_check_status_active_and_inactive() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");

        assert!(!h.controller.check_status(&mut host).unwrap());

        host.active = true;
        h.controller.session.app_name = Some("Valorant".to_string());
        h.controller.session.started_at = Some(fixed_now() - Duration::from_secs(65));
        assert!(h.controller.check_status(&mut host).unwrap());

        h.controller.session.app_name = None;
        h.controller.check_status(&mut host).unwrap();

        let toasts = h.toasts.borrow();
        let bodies: Vec<_> = toasts.iter().map(|t| t.body.clone()).collect();
        assert_eq!(
            titles(&h.toasts),
            vec![
                "Replay Buffer is Not Active",
                "Replay Buffer is Currently Active",
                "Replay Buffer is Currently Active",
            ]
        );
        assert_eq!(
            bodies,
            vec![
                None,
                Some("Playing Valorant | Session Duration: 0:01:05".to_string()),
                Some("Session Duration: 0:01:05".to_string()),
            ]
        );
    }

    #[test]
    fn test_update_game_only_while_active() {
        let mut h = harness();
        let mut host = FakeHost::new("Game");

        assert!(!h.controller.update_game(&mut host).unwrap());
        assert!(h.toasts.borrow().is_empty());

        host.active = true;
        h.controller.session.app_name = Some("Valorant".to_string());
        *h.app.borrow_mut() = "Rocket League!".to_string();
        assert!(h.controller.update_game(&mut host).unwrap());

        assert_eq!(h.controller.session().app_name.as_deref(), Some("Rocket League"));
        let toasts = h.toasts.borrow();
        assert_eq!(toasts.first().unwrap().body.as_deref(), Some("Playing Rocket League"));
    }

    #[test]
    fn test_resolved_names_follow_sanitize_policy() {
        let settings = Settings {
            sanitize_policy: SanitizePolicy::PathSafe,
            ..Settings::default()
        };
        let mut h = harness_with(settings, false);
        *h.app.borrow_mut() = "Counter-Strike: 2".to_string();
        let mut host = FakeHost::new("Game");

        h.controller
            .handle_event(&mut host, HostEvent::ReplayStarted)
            .unwrap();
        assert_eq!(h.controller.session().app_name.as_deref(), Some("Counter-Strike 2"));
    }

    #[test]
    fn test_disconnect_resets_session_and_guard() {
        let mut h = harness();
        let mut host = FakeHost::new("Game").with_source("Game Capture", 1, 1920.0);
        host.applies_commands = false;
        h.controller.poll(&mut host).unwrap();
        h.controller.session.app_name = Some("Valorant".to_string());

        h.controller.disconnected();

        assert_eq!(*h.controller.session(), SessionState::default());
        assert_eq!(h.controller.poll(&mut host).unwrap(), PollOutcome::Started);
    }
}
