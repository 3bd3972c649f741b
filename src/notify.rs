//! Desktop toasts.

use crate::constants::NOTIFICATION_APP_NAME;
use log::{info, warn};
use std::thread;
use std::time::Duration;

/// A toast with a title and an optional second line.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub title: String,
    pub body: Option<String>,
    /// Keep the toast up this long before returning, then clear it.
    pub linger: Option<Duration>,
}

impl Toast {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: None,
            linger: None,
        }
    }

    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }

    pub fn lingering(mut self, duration: Duration) -> Self {
        self.linger = Some(duration);
        self
    }
}

/// Where toasts go. Any previous toast is cleared before a new one is shown.
pub trait NotificationSink {
    fn show(&mut self, toast: &Toast);
    fn clear(&mut self);
}

/// Native desktop notifications.
pub struct DesktopNotifier {
    #[cfg(all(unix, not(target_os = "macos")))]
    current: Option<notify_rust::NotificationHandle>,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            #[cfg(all(unix, not(target_os = "macos")))]
            current: None,
        }
    }

    fn build(toast: &Toast) -> notify_rust::Notification {
        let mut notification = notify_rust::Notification::new();
        notification
            .appname(NOTIFICATION_APP_NAME)
            .summary(&toast.title)
            .body(toast.body.as_deref().unwrap_or_default());
        if let Some(linger) = toast.linger {
            let millis = u32::try_from(linger.as_millis()).unwrap_or(u32::MAX);
            notification.timeout(notify_rust::Timeout::Milliseconds(millis));
        }
        notification
    }
}

impl NotificationSink for DesktopNotifier {
    #[cfg(all(unix, not(target_os = "macos")))]
    fn show(&mut self, toast: &Toast) {
        self.clear();
        match Self::build(toast).show() {
            Ok(handle) => self.current = Some(handle),
            Err(e) => warn!("Failed to show notification '{}': {e}", toast.title),
        }
        if let Some(linger) = toast.linger {
            thread::sleep(linger);
            self.clear();
        }
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn clear(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.close();
        }
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn show(&mut self, toast: &Toast) {
        if let Err(e) = Self::build(toast).show() {
            warn!("Failed to show notification '{}': {e}", toast.title);
        }
        if let Some(linger) = toast.linger {
            thread::sleep(linger);
        }
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn clear(&mut self) {}
}

/// Writes toasts to the log instead of the desktop.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn show(&mut self, toast: &Toast) {
        match &toast.body {
            Some(body) => info!("{}: {body}", toast.title),
            None => info!("{}", toast.title),
        }
    }

    fn clear(&mut self) {}
}
