pub mod types;

pub use types::{ActiveWindow, ForegroundProbe};

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::LinuxProbe as NativeProbe;

/// Placeholder for platforms without a probe; never reports a window
#[cfg(not(target_os = "linux"))]
pub struct NativeProbe;

#[cfg(not(target_os = "linux"))]
impl ForegroundProbe for NativeProbe {
    fn active_window(&self) -> Result<Option<ActiveWindow>, crate::error::AppError> {
        Ok(None)
    }
}

#[cfg(not(target_os = "linux"))]
impl NativeProbe {
    pub fn new() -> Self {
        log::warn!("Foreground window probing is not supported on this platform");
        Self
    }
}

#[cfg(not(target_os = "linux"))]
impl Default for NativeProbe {
    fn default() -> Self {
        Self::new()
    }
}
