use super::{ActiveWindow, ForegroundProbe};
use crate::error::AppError;
use std::fs;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};

/// Reads the focused window through EWMH properties on the X root window
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
                    log::warn!(
                        "Invalid screen number {screen_num} ({} screens available). Window tracking disabled.",
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
                // Wayland and headless sessions end up here; every probe then fails soft
                log::warn!("Failed to connect to X server: {e}. Window tracking disabled.");
                Self { conn: None, root: 0 }
            }
        }
    }

    fn connection(&self) -> Result<&x11rb::rust_connection::RustConnection, AppError> {
        self.conn
            .as_ref()
            .ok_or_else(|| AppError::Probe("no X server connection".into()))
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

    fn get_window_property(&self, window: Window, atom: u32) -> Option<String> {
        let reply = self
            .conn
            .as_ref()?
            .get_property(false, window, atom, AtomEnum::ANY, 0, 1024)
            .ok()?
            .reply()
            .ok()?;

        if reply.value.is_empty() {
            return None;
        }

        String::from_utf8(reply.value).ok()
    }

    fn get_cardinal_property(&self, window: Window, atom: u32, kind: AtomEnum) -> Option<u32> {
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

    fn get_active_window_id(&self) -> Result<Option<Window>, AppError> {
        self.connection()?;
        let atom = self
            .get_atom("_NET_ACTIVE_WINDOW")
            .ok_or_else(|| AppError::Probe("window manager does not expose _NET_ACTIVE_WINDOW".into()))?;

        // Window 0 means nothing is focused
        Ok(self
            .get_cardinal_property(self.root, atom, AtomEnum::WINDOW)
            .filter(|&id| id != 0))
    }

    fn get_title(&self, window: Window) -> String {
        self.get_atom("_NET_WM_NAME")
            .and_then(|atom| self.get_window_property(window, atom))
            .or_else(|| self.get_window_property(window, AtomEnum::WM_NAME.into()))
            .unwrap_or_default()
    }

    fn get_exe_path(&self, window: Window) -> Option<String> {
        let atom = self.get_atom("_NET_WM_PID")?;
        let pid = self.get_cardinal_property(window, atom, AtomEnum::CARDINAL)?;
        let exe = fs::read_link(format!("/proc/{pid}/exe")).ok()?;
        Some(exe.to_string_lossy().into_owned())
    }
}

/// WM_CLASS holds "instance\0Class\0"; the class is the friendlier display name
fn app_name_from_wm_class(raw: &str) -> Option<String> {
    let mut parts = raw.split('\0').filter(|part| !part.is_empty());
    let instance = parts.next();
    parts.next().or(instance).map(str::to_string)
}

impl ForegroundProbe for LinuxProbe {
    fn active_window(&self) -> Result<Option<ActiveWindow>, AppError> {
        let Some(window_id) = self.get_active_window_id()? else {
            return Ok(None);
        };

        let app_name = self
            .get_window_property(window_id, AtomEnum::WM_CLASS.into())
            .and_then(|raw| app_name_from_wm_class(&raw))
            .unwrap_or_default();

        let window_title = self.get_title(window_id);
        let exe_path = self.get_exe_path(window_id).unwrap_or_else(|| app_name.clone());

        Ok(Some(ActiveWindow {
            app_name,
            window_title,
            exe_path,
        }))
    }
}
