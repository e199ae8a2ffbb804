use crate::error::AppError;
use serde::Serialize;

/// Identity of the window currently holding input focus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveWindow {
    pub app_name: String,
    pub window_title: String,
    /// Executable path or another per-application key that stays stable across titles
    pub exe_path: String,
}

impl ActiveWindow {
    /// Key used to decide whether focus moved to a different application
    pub fn identity(&self) -> &str {
        if self.exe_path.is_empty() {
            &self.app_name
        } else {
            &self.exe_path
        }
    }
}

pub trait ForegroundProbe: Send + Sync {
    /// The current foreground window, or `None` when no window has focus
    fn active_window(&self) -> Result<Option<ActiveWindow>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_prefers_exe_path() {
        let window = ActiveWindow {
            app_name: "Firefox".into(),
            window_title: "Docs".into(),
            exe_path: "/usr/lib/firefox/firefox".into(),
        };
        assert_eq!(window.identity(), "/usr/lib/firefox/firefox");
    }

    #[test]
    fn test_identity_falls_back_to_app_name() {
        let window = ActiveWindow {
            app_name: "Firefox".into(),
            ..ActiveWindow::default()
        };
        assert_eq!(window.identity(), "Firefox");
    }
}
