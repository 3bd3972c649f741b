#![allow(unsafe_code, reason = "AppKit accessors are unsafe in objc2-app-kit")]

use super::{process_details, ForegroundProbe, ForegroundProcess};
use objc2_app_kit::NSWorkspace;

/// Frontmost application from `NSWorkspace`.
#[derive(Debug, Default)]
pub struct MacOSProbe;

impl MacOSProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ForegroundProbe for MacOSProbe {
    fn foreground_process(&self) -> Option<ForegroundProcess> {
        // SAFETY: shared workspace and running application are immutable
        // snapshots owned by AppKit; we only read from them.
        let (pid, description) = unsafe {
            let app = NSWorkspace::sharedWorkspace().frontmostApplication()?;
            let pid = u32::try_from(app.processIdentifier()).ok()?;
            (pid, app.localizedName().map(|name| name.to_string()))
        };
        let (executable, process_name) = process_details(pid);

        Some(ForegroundProcess {
            pid,
            description,
            executable,
            process_name,
        })
    }
}
