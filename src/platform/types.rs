use crate::sanitize::SanitizePolicy;
use std::path::PathBuf;

/// The process owning the foreground window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForegroundProcess {
    pub pid: u32,
    /// Human-readable name from executable or window metadata.
    pub description: Option<String>,
    pub executable: Option<PathBuf>,
    /// Process name as reported by the OS, used when the executable path is unreadable.
    pub process_name: Option<String>,
}

/// OS query for the foreground window's process.
pub trait ForegroundProbe {
    fn foreground_process(&self) -> Option<ForegroundProcess>;
}

/// Resolves the application in the foreground to a folder-safe name.
pub trait ForegroundAppResolver {
    /// Never empty; `"Other"` when nothing can be resolved.
    fn foreground_app_name(&self, policy: SanitizePolicy) -> String;
}
