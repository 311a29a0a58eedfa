//! Stream overlay - text overlays and toast notifications for video streams
//!
//! Producer threads (input, connection monitoring, stats sampling) publish
//! text; the render loop composites the latest rasterized surfaces on top of
//! every video frame without ever waiting on a producer.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod overlay;
pub mod tracing;

// Re-export commonly used types
pub use config::{OverlayConfig, OverlayStyle};
pub use overlay::{
    OverlayCompositor, OverlayManager, OverlayRenderer, OverlaySurface, OverlayType,
    ToastCategory, ToastType,
};
