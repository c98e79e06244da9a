use crate::domain::error::{RigError, RigResult};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::warn;

/// Raw-mode guard.
///
/// Raw mode delivers single keystrokes immediately, without line buffering
/// or echo. The prior terminal mode is restored exactly once, on
/// [`restore`](Self::restore) or on drop, whichever comes first.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn enter() -> RigResult<Self> {
        enable_raw_mode().map_err(|e| RigError::Terminal(e.to_string()))?;
        Ok(Self { active: true })
    }

    pub fn restore(&mut self) {
        if self.active {
            self.active = false;
            if let Err(e) = disable_raw_mode() {
                warn!("failed to restore terminal mode: {}", e);
            }
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
