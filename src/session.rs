use std::time::{Duration, SystemTime};

/// State of the current replay buffer session.
///
/// `app_name` and `started_at` are only set while the host reports the buffer
/// as active. `previous_profile` is set only when the controller switched
/// profiles on start and still has to switch back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub app_name: Option<String>,
    pub started_at: Option<SystemTime>,
    pub previous_profile: Option<String>,
}

impl SessionState {
    /// Record a newly started session.
    pub fn begin(&mut self, app_name: String, now: SystemTime) {
        self.app_name = Some(app_name);
        self.started_at = Some(now);
    }

    /// Forget the application and start time. The remembered profile is left
    /// alone; it is cleared when it is restored.
    pub fn clear(&mut self) {
        self.app_name = None;
        self.started_at = None;
    }

    /// Time since the session started, if a start time is known.
    pub fn elapsed(&self, now: SystemTime) -> Option<Duration> {
        self.started_at
            .map(|start| now.duration_since(start).unwrap_or_default())
    }

    /// `"<app> | Session Duration: <d>"`, `"<app>"`, `"Session Duration: <d>"`
    /// or `None`, depending on what is known.
    pub fn summary(&self, now: SystemTime) -> Option<String> {
        let duration = self.elapsed(now).map(format_session_duration);
        match (&self.app_name, duration) {
            (Some(app), Some(duration)) => Some(format!("{app} | Session Duration: {duration}")),
            (Some(app), None) => Some(app.clone()),
            (None, Some(duration)) => Some(format!("Session Duration: {duration}")),
            (None, None) => None,
        }
    }
}

/// Format a session length as `h:mm:ss`, prefixed with `N day(s), ` past 24 hours.
/// Sub-second precision is dropped.
pub fn format_session_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let clock = format!("{hours}:{minutes:02}:{seconds:02}");
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}
