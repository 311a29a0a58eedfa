//! Overlay and toast compositing engine
//!
//! Producer threads push text into per-type slots; the engine rasterizes it
//! into immutable surfaces and hands them to the render thread through a
//! single atomic exchange per slot. Toast notifications and the mouse-mode
//! banner are layered on top of the [`OverlayType::StatusUpdate`] slot.
//!
//! ```text
//! producer ──update/show_toast──▶ slot ──publish──▶ ArcSwapOption ──claim──▶ renderer
//!                                   │                                   ▲
//!                                   └──── notify_overlay_updated ───────┘
//! ```

pub mod clock;
pub mod color;
pub mod compositor;
pub mod font;
pub mod manager;
pub mod raster;
pub mod slot;
pub mod suppression;
pub mod surface;
pub mod text;
pub mod toast;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use color::Rgba;
pub use compositor::{OverlayAnchor, OverlayCompositor, OverlaySignal};
pub use font::{EmbeddedFont, FontDirectory, FontProvider};
pub use manager::{OverlayManager, OverlayRenderer};
pub use raster::{FontdueRasterizer, TextRasterizer};
pub use surface::OverlaySurface;
pub use text::BoundedText;
pub use toast::{ToastCategory, ToastFrame, ToastPhase, ToastTiming, ToastType};

/// Capacity of every overlay text buffer in bytes, terminator included
pub const TEXT_CAPACITY: usize = 1024;

/// Word-wrap width used when rasterizing overlay text, in pixels
pub const WRAP_WIDTH: u32 = 1024;

/// Independent overlay layers, each backed by its own slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayType {
    /// Stream statistics (decoder, network, frame pacing)
    Debug,
    /// Status line; also carries toasts and the mouse-mode banner
    StatusUpdate,
}

impl OverlayType {
    /// Number of overlay types (and slots)
    pub const COUNT: usize = 2;

    /// All overlay types in slot order
    pub const ALL: [OverlayType; Self::COUNT] = [OverlayType::Debug, OverlayType::StatusUpdate];

    /// Slot index for this type
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            OverlayType::Debug => 0,
            OverlayType::StatusUpdate => 1,
        }
    }

    /// Short lowercase name, used in log lines
    pub const fn name(self) -> &'static str {
        match self {
            OverlayType::Debug => "debug",
            OverlayType::StatusUpdate => "status_update",
        }
    }
}
