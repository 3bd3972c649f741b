pub mod resolver;
pub mod types;

pub use resolver::AppNameResolver;
pub use types::{ForegroundAppResolver, ForegroundProbe, ForegroundProcess};

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(windows)]
pub mod windows;

#[cfg(target_os = "macos")]
pub use macos::MacOSProbe as NativeProbe;

#[cfg(target_os = "linux")]
pub use linux::LinuxProbe as NativeProbe;

#[cfg(windows)]
pub use windows::WindowsProbe as NativeProbe;

#[cfg(any(target_os = "macos", target_os = "linux", windows))]
use std::path::PathBuf;
#[cfg(any(target_os = "macos", target_os = "linux", windows))]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Executable path and process name for `pid`.
#[cfg(any(target_os = "macos", target_os = "linux", windows))]
pub fn process_details(pid: u32) -> (Option<PathBuf>, Option<String>) {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    match system.process(pid) {
        Some(process) => (
            process.exe().map(PathBuf::from),
            Some(process.name().to_string_lossy().into_owned()).filter(|n| !n.is_empty()),
        ),
        None => (None, None),
    }
}

// Stub for platforms without foreground window support
#[cfg(not(any(target_os = "macos", target_os = "linux", windows)))]
#[derive(Debug, Default)]
pub struct NativeProbe;

#[cfg(not(any(target_os = "macos", target_os = "linux", windows)))]
impl ForegroundProbe for NativeProbe {
    fn foreground_process(&self) -> Option<ForegroundProcess> {
        None
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux", windows)))]
impl NativeProbe {
    pub fn new() -> Self {
        Self
    }
}
