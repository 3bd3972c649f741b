use super::{process_details, ForegroundProbe, ForegroundProcess};
use log::warn;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};

/// Foreground process lookup through EWMH hints on X11.
///
/// The window class stands in for the executable description. Under Wayland
/// or without a display every lookup returns `None`.
pub struct LinuxProbe {
    conn: Option<x11rb::rust_connection::RustConnection>,
    root: Window,
}

impl Default for LinuxProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxProbe {
    pub fn new() -> Self {
        match x11rb::connect(None) {
            Ok((conn, screen_num)) => {
                let Some(root) = conn.setup().roots.get(screen_num).map(|s| s.root) else {
                    warn!(
                        "Invalid screen number {screen_num} ({} screens available). Foreground lookup disabled.",
                        conn.setup().roots.len()
                    );
                    return Self { conn: None, root: 0 };
                };
                Self {
                    conn: Some(conn),
                    root,
                }
            }
            Err(e) => {
                warn!("Failed to connect to X server: {e}. Foreground lookup disabled.");
                Self { conn: None, root: 0 }
            }
        }
    }

    fn get_atom(&self, name: &str) -> Option<u32> {
        self.conn
            .as_ref()?
            .intern_atom(false, name.as_bytes())
            .ok()?
            .reply()
            .ok()
            .map(|r| r.atom)
    }

    #[allow(clippy::let_and_return, reason = "the binding ends the borrow of `reply` before it drops")]
    fn get_cardinal(&self, window: Window, atom: u32, kind: AtomEnum) -> Option<u32> {
        let reply = self
            .conn
            .as_ref()?
            .get_property(false, window, atom, kind, 0, 1)
            .ok()?
            .reply()
            .ok()?;
        let first = reply.value32()?.next();
        first
    }

    fn get_active_window_id(&self) -> Option<Window> {
        let atom = self.get_atom("_NET_ACTIVE_WINDOW")?;
        self.get_cardinal(self.root, atom, AtomEnum::WINDOW)
            .filter(|&window| window != 0)
    }

    fn get_window_pid(&self, window: Window) -> Option<u32> {
        let atom = self.get_atom("_NET_WM_PID")?;
        self.get_cardinal(window, atom, AtomEnum::CARDINAL)
    }

    /// Class part of `WM_CLASS`, e.g. `Steam` from `steam\0Steam\0`.
    fn get_window_class(&self, window: Window) -> Option<String> {
        let reply = self
            .conn
            .as_ref()?
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
            .ok()?
            .reply()
            .ok()?;

        let value = String::from_utf8_lossy(&reply.value).into_owned();
        let mut parts = value.split('\0').filter(|s| !s.is_empty());
        let instance = parts.next();
        parts.next().or(instance).map(str::to_string)
    }
}

impl ForegroundProbe for LinuxProbe {
    fn foreground_process(&self) -> Option<ForegroundProcess> {
        let window = self.get_active_window_id()?;
        let pid = self.get_window_pid(window)?;
        let (executable, process_name) = process_details(pid);

        Some(ForegroundProcess {
            pid,
            description: self.get_window_class(window),
            executable,
            process_name,
        })
    }
}
