//! Mouse-mode banner suppression
//!
//! While a persistent mouse-mode banner is pinned to the status line, toast
//! requests are parked here instead of being rendered. Only the most recent
//! one is kept.

use super::BoundedText;

#[derive(Debug, Clone, Default)]
pub struct MouseModeSuppression {
    active: bool,
    pending: BoundedText,
}

impl MouseModeSuppression {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activating keeps any pending text; deactivating discards it.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.pending.clear();
        }
    }

    /// Park `text` if suppression is active. Returns `true` if it was captured.
    pub fn capture(&mut self, text: &str) -> bool {
        if !self.active {
            return false;
        }
        self.pending.set(text);
        true
    }

    pub fn pending(&self) -> &str {
        self.pending.as_str()
    }

    /// Remove and return the pending text if suppression is active and
    /// something was captured.
    pub fn take_pending(&mut self) -> Option<String> {
        if !self.active || self.pending.is_empty() {
            return None;
        }
        let text = self.pending.as_str().to_owned();
        self.pending.clear();
        Some(text)
    }
}
