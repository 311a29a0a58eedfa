//! Toast notification state machine
//!
//! Only the start stamp and duration are stored. Fade-in, steady display and
//! fade-out are all derived from elapsed time by [`toast_frame`], which is
//! pure; the expiry side effects live in `OverlayManager::tick`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Rgba;

/// Severity of a toast, which fixes its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastType {
    #[default]
    Info,
    Warning,
    Error,
}

/// Coalescing key: same-category toasts refresh, others interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastCategory {
    #[default]
    None,
    CaptureKeys,
    GamepadMouse,
    ConnectionStatus,
}

/// Color for a toast type (fixed palette)
pub const fn toast_color(kind: ToastType) -> Rgba {
    match kind {
        ToastType::Info => Rgba::rgb(0xFF, 0xFF, 0xFF),
        ToastType::Warning => Rgba::rgb(0xFF, 0xD7, 0x00),
        ToastType::Error => Rgba::rgb(0xFF, 0x45, 0x45),
    }
}

/// Color used when a suppressed mouse-mode banner is revealed
pub const MOUSE_MODE_BANNER_COLOR: Rgba = Rgba::rgb(0xCC, 0x00, 0x00);

/// Fade and display timings, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastTiming {
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    pub display_ms: u64,
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self {
            fade_in_ms: 250,
            fade_out_ms: 500,
            display_ms: 2500,
        }
    }
}

impl ToastTiming {
    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }
}

/// Visible phase of an active toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    FadeIn,
    Steady,
    FadeOut,
    Expired,
}

/// Phase and opacity of a toast at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToastFrame {
    pub phase: ToastPhase,
    pub opacity: f32,
}

/// Compute the toast phase and opacity after `elapsed` of a `duration`-long toast.
pub fn toast_frame(elapsed: Duration, duration: Duration, timing: &ToastTiming) -> ToastFrame {
    if elapsed >= duration {
        return ToastFrame {
            phase: ToastPhase::Expired,
            opacity: 0.0,
        };
    }

    let fade_in = timing.fade_in();
    if elapsed < fade_in {
        return ToastFrame {
            phase: ToastPhase::FadeIn,
            opacity: elapsed.as_secs_f32() / fade_in.as_secs_f32(),
        };
    }

    let fade_out = timing.fade_out();
    let fade_out_start = duration.saturating_sub(fade_out);
    if elapsed > fade_out_start {
        let fade_elapsed = elapsed - fade_out_start;
        let opacity = 1.0 - fade_elapsed.as_secs_f32() / fade_out.as_secs_f32();
        return ToastFrame {
            phase: ToastPhase::FadeOut,
            opacity: opacity.max(0.0),
        };
    }

    ToastFrame {
        phase: ToastPhase::Steady,
        opacity: 1.0,
    }
}

/// Bookkeeping for the single active toast
#[derive(Debug, Clone, Default)]
pub struct ToastState {
    active: bool,
    category: ToastCategory,
    kind: ToastType,
    started_at: Duration,
    duration: Duration,
}

impl ToastState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn category(&self) -> ToastCategory {
        self.category
    }

    pub fn kind(&self) -> ToastType {
        self.kind
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether a toast of `category` should refresh the current one in place
    pub fn coalesces_with(&self, category: ToastCategory) -> bool {
        self.active && self.category == category
    }

    /// Same-category update: new type and a restarted timer. The stored
    /// duration is left as is.
    pub fn refresh(&mut self, kind: ToastType, now: Duration) {
        self.kind = kind;
        self.started_at = now;
    }

    /// Start a new toast, abandoning whatever was showing
    pub fn start(
        &mut self,
        kind: ToastType,
        category: ToastCategory,
        now: Duration,
        duration: Duration,
    ) {
        self.kind = kind;
        self.category = category;
        self.started_at = now;
        self.duration = duration;
        self.active = true;
    }

    /// Frame at `now`, or `None` while no toast is active
    pub fn frame(&self, now: Duration, timing: &ToastTiming) -> Option<ToastFrame> {
        self.active.then(|| {
            toast_frame(
                now.saturating_sub(self.started_at),
                self.duration,
                timing,
            )
        })
    }

    /// Deactivate and reset the category
    pub fn expire(&mut self) {
        self.active = false;
        self.category = ToastCategory::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(ms: u64) -> ToastFrame {
        toast_frame(
            Duration::from_millis(ms),
            Duration::from_millis(2500),
            &ToastTiming::default(),
        )
    }

    #[test]
    fn test_opacity_curve() {
        assert_eq!(frame_at(0).opacity, 0.0);
        assert_eq!(frame_at(0).phase, ToastPhase::FadeIn);
        assert_eq!(frame_at(125).opacity, 0.5);
        assert_eq!(frame_at(250).opacity, 1.0);
        assert_eq!(frame_at(1000).opacity, 1.0);
        assert_eq!(frame_at(1000).phase, ToastPhase::Steady);
        // the fade-out window starts strictly after duration - fade_out
        assert_eq!(frame_at(2000).phase, ToastPhase::Steady);
        assert_eq!(frame_at(2250).opacity, 0.5);
        assert_eq!(frame_at(2250).phase, ToastPhase::FadeOut);
        assert!((frame_at(2300).opacity - 0.4).abs() < 1e-6);
        assert_eq!(frame_at(2500).phase, ToastPhase::Expired);
        assert_eq!(frame_at(2500).opacity, 0.0);
        assert_eq!(frame_at(9000).opacity, 0.0);
    }

    #[test]
    fn test_short_duration_fade_out_never_negative() {
        let frame = toast_frame(
            Duration::from_millis(300),
            Duration::from_millis(400),
            &ToastTiming::default(),
        );
        assert_eq!(frame.phase, ToastPhase::FadeOut);
        assert!(frame.opacity >= 0.0);
    }

    #[test]
    fn test_palette() {
        assert_eq!(toast_color(ToastType::Info), Rgba::rgb(0xFF, 0xFF, 0xFF));
        assert_eq!(toast_color(ToastType::Warning), Rgba::rgb(0xFF, 0xD7, 0x00));
        assert_eq!(toast_color(ToastType::Error), Rgba::rgb(0xFF, 0x45, 0x45));
    }

    #[test]
    fn test_state_refresh_keeps_duration() {
        let mut state = ToastState::default();
        state.start(
            ToastType::Info,
            ToastCategory::ConnectionStatus,
            Duration::from_millis(100),
            Duration::from_millis(2500),
        );
        assert!(state.coalesces_with(ToastCategory::ConnectionStatus));
        assert!(!state.coalesces_with(ToastCategory::CaptureKeys));

        state.refresh(ToastType::Error, Duration::from_millis(900));
        assert_eq!(state.started_at(), Duration::from_millis(900));
        assert_eq!(state.duration(), Duration::from_millis(2500));
        assert_eq!(state.kind(), ToastType::Error);

        state.expire();
        assert!(!state.is_active());
        assert_eq!(state.category(), ToastCategory::None);
        assert!(state.frame(Duration::from_secs(1), &ToastTiming::default()).is_none());
    }
}
