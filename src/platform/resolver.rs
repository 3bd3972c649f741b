use super::{ForegroundAppResolver, ForegroundProbe, ForegroundProcess};
use crate::constants::FALLBACK_APP_NAME;
use crate::sanitize::{executable_display_name, sanitize_app_name, SanitizePolicy};
use log::debug;

/// Turns the foreground process into a folder name.
///
/// Prefers the descriptive name, then the executable's file name with `.exe`
/// and dots stripped, then the OS process name.
pub struct AppNameResolver<P> {
    probe: P,
}

impl<P: ForegroundProbe> AppNameResolver<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    fn raw_name(process: ForegroundProcess) -> Option<String> {
        let description = process
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description.is_some() {
            return description;
        }

        process
            .executable
            .as_deref()
            .and_then(|exe| exe.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .or(process.process_name)
            .map(|name| executable_display_name(&name))
            .filter(|name| !name.is_empty())
    }
}

impl<P: ForegroundProbe> ForegroundAppResolver for AppNameResolver<P> {
    fn foreground_app_name(&self, policy: SanitizePolicy) -> String {
        let Some(process) = self.probe.foreground_process() else {
            debug!("No foreground process, using '{FALLBACK_APP_NAME}'");
            return FALLBACK_APP_NAME.to_string();
        };

        let pid = process.pid;
        match Self::raw_name(process) {
            Some(name) => {
                let sanitized = sanitize_app_name(&name, policy);
                debug!("Foreground process {pid} resolved to '{sanitized}' ({name})");
                sanitized
            }
            None => FALLBACK_APP_NAME.to_string(),
        }
    }
}
