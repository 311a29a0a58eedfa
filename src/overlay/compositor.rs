//! Renderer-side compositing of overlay surfaces
//!
//! This is the consumer half of the hand-off: [`OverlaySignal`] is the
//! notification sink registered with the manager, and [`OverlayCompositor`]
//! claims surfaces once per frame, keeps the last one it received for each
//! layer, and alpha-blends the layers onto an ARGB video frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::manager::{OverlayManager, OverlayRenderer};
use super::raster::TextRasterizer;
use super::{OverlaySurface, OverlayType};

/// Position anchor for overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAnchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

/// Where and how a layer is drawn
#[derive(Debug, Clone)]
pub struct LayerPlacement {
    /// Where the layer is anchored on screen
    pub anchor: OverlayAnchor,
    /// Margin from viewport edge in pixels
    pub margin: usize,
    /// Padding between backdrop edge and text in pixels
    pub padding: usize,
    /// Backdrop color in ARGB format, if any
    pub background: Option<u32>,
}

impl LayerPlacement {
    pub fn new(anchor: OverlayAnchor) -> Self {
        Self {
            anchor,
            margin: 10,
            padding: 0,
            background: None,
        }
    }

    /// Set the margin (builder pattern)
    pub fn with_margin(mut self, margin: usize) -> Self {
        self.margin = margin;
        self
    }

    /// Set a translucent backdrop with padding around the text (builder pattern)
    pub fn with_background(mut self, background: u32, padding: usize) -> Self {
        self.background = Some(background);
        self.padding = padding;
        self
    }

    /// Calculate screen position for content of the given size
    pub fn compute_bounds(
        &self,
        content_width: usize,
        content_height: usize,
        viewport_width: usize,
        viewport_height: usize,
    ) -> OverlayBounds {
        let width = content_width + self.padding * 2;
        let height = content_height + self.padding * 2;

        let x = match self.anchor {
            OverlayAnchor::TopLeft | OverlayAnchor::BottomLeft => self.margin,
            OverlayAnchor::TopRight | OverlayAnchor::BottomRight => {
                viewport_width.saturating_sub(width + self.margin)
            }
            OverlayAnchor::Center => viewport_width.saturating_sub(width) / 2,
        };

        let y = match self.anchor {
            OverlayAnchor::TopLeft | OverlayAnchor::TopRight => self.margin,
            OverlayAnchor::BottomLeft | OverlayAnchor::BottomRight => {
                viewport_height.saturating_sub(height + self.margin)
            }
            OverlayAnchor::Center => viewport_height.saturating_sub(height) / 2,
        };

        OverlayBounds {
            x,
            y,
            width,
            height,
        }
    }
}

/// Computed overlay bounds (screen coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayBounds {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl OverlayBounds {
    /// Get the right edge X coordinate
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Get the bottom edge Y coordinate
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }
}

/// Blend a source pixel (with alpha) onto a destination pixel
///
/// Both colors are in ARGB format. The source alpha determines
/// the blend ratio.
#[inline]
pub fn blend_pixel(src: u32, dst: u32) -> u32 {
    let alpha = (src >> 24) & 0xFF;
    if alpha == 0 {
        return dst;
    }
    if alpha == 255 {
        return src | 0xFF000000;
    }

    let inv_alpha = 255 - alpha;

    let r = ((((src >> 16) & 0xFF) * alpha + ((dst >> 16) & 0xFF) * inv_alpha) / 255) & 0xFF;
    let g = ((((src >> 8) & 0xFF) * alpha + ((dst >> 8) & 0xFF) * inv_alpha) / 255) & 0xFF;
    let b = (((src & 0xFF) * alpha + (dst & 0xFF) * inv_alpha) / 255) & 0xFF;

    0xFF000000 | (r << 16) | (g << 8) | b
}

/// Scale the alpha channel of an ARGB pixel by `opacity` (0.0..=1.0)
#[inline]
pub fn fade_pixel(src: u32, opacity: f32) -> u32 {
    let alpha = ((src >> 24) as f32 * opacity.clamp(0.0, 1.0)).round() as u32;
    (alpha << 24) | (src & 0x00FF_FFFF)
}

/// Blend a rectangle of solid color over the frame
pub fn render_overlay_background(
    buffer: &mut [u32],
    bounds: &OverlayBounds,
    background: u32,
    buffer_width: usize,
    buffer_height: usize,
) {
    let y_end = bounds.bottom().min(buffer_height);
    let x_end = bounds.right().min(buffer_width);

    for py in bounds.y..y_end {
        for px in bounds.x..x_end {
            let idx = py * buffer_width + px;
            if idx < buffer.len() {
                buffer[idx] = blend_pixel(background, buffer[idx]);
            }
        }
    }
}

/// Blend a surface onto the frame with its top-left corner at (x, y)
pub fn blit_surface(
    buffer: &mut [u32],
    surface: &OverlaySurface,
    x: usize,
    y: usize,
    opacity: f32,
    buffer_width: usize,
    buffer_height: usize,
) {
    let y_end = (y + surface.height()).min(buffer_height);
    let x_end = (x + surface.width()).min(buffer_width);

    for py in y..y_end {
        for px in x..x_end {
            let idx = py * buffer_width + px;
            if idx >= buffer.len() {
                continue;
            }
            let src = surface.pixel(px - x, py - y);
            if src >> 24 == 0 {
                continue;
            }
            buffer[idx] = blend_pixel(fade_pixel(src, opacity), buffer[idx]);
        }
    }
}

/// Notification sink that records which layers have pending updates
#[derive(Debug, Default)]
pub struct OverlaySignal {
    pending: [AtomicBool; OverlayType::COUNT],
}

impl OverlaySignal {
    /// Whether `ty` was updated since the last call, clearing the flag
    pub fn take_pending(&self, ty: OverlayType) -> bool {
        self.pending[ty.index()].swap(false, Ordering::AcqRel)
    }
}

impl OverlayRenderer for OverlaySignal {
    fn notify_overlay_updated(&self, ty: OverlayType) {
        self.pending[ty.index()].store(true, Ordering::Release);
    }
}

/// Per-frame state returned by [`OverlayCompositor::update`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOverlays {
    /// Toast opacity for this frame
    pub toast_opacity: f32,
    /// Whether any layer changed since the previous frame
    pub changed: bool,
}

/// Renderer-side owner of the last composited surface per layer
pub struct OverlayCompositor {
    signal: Arc<OverlaySignal>,
    layers: [Option<Arc<OverlaySurface>>; OverlayType::COUNT],
    placements: [LayerPlacement; OverlayType::COUNT],
}

impl Default for OverlayCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayCompositor {
    /// Debug stats top-left, status line bottom-left, both on a dark backdrop
    pub fn new() -> Self {
        Self {
            signal: Arc::new(OverlaySignal::default()),
            layers: [None, None],
            placements: [
                LayerPlacement::new(OverlayAnchor::TopLeft).with_background(0xA0202020, 6),
                LayerPlacement::new(OverlayAnchor::BottomLeft).with_background(0xA0202020, 6),
            ],
        }
    }

    /// Override where a layer is drawn (builder pattern)
    pub fn with_placement(mut self, ty: OverlayType, placement: LayerPlacement) -> Self {
        self.placements[ty.index()] = placement;
        self
    }

    pub fn signal(&self) -> Arc<OverlaySignal> {
        Arc::clone(&self.signal)
    }

    /// Register this compositor's signal as the manager's renderer
    pub fn attach<R: TextRasterizer>(&self, manager: &OverlayManager<R>) {
        manager.set_renderer(Some(self.signal() as Arc<dyn OverlayRenderer>));
    }

    /// Surface currently shown for a layer
    pub fn layer(&self, ty: OverlayType) -> Option<&Arc<OverlaySurface>> {
        self.layers[ty.index()].as_ref()
    }

    /// Pull this frame's overlay state from the manager
    pub fn update<R: TextRasterizer>(&mut self, manager: &OverlayManager<R>) -> FrameOverlays {
        let toast_opacity = manager.tick();
        let mut changed = false;

        for ty in OverlayType::ALL {
            changed |= self.signal.take_pending(ty);

            let layer = &mut self.layers[ty.index()];
            if let Some(surface) = manager.claim_updated_surface(ty) {
                *layer = Some(surface);
                changed = true;
            }
            if !manager.is_overlay_enabled(ty) && layer.is_some() {
                *layer = None;
                changed = true;
            }
        }

        FrameOverlays {
            toast_opacity,
            changed,
        }
    }

    /// Blend every visible layer onto `buffer`
    pub fn composite(
        &self,
        buffer: &mut [u32],
        buffer_width: usize,
        buffer_height: usize,
        toast_opacity: f32,
    ) {
        for ty in OverlayType::ALL {
            let Some(surface) = &self.layers[ty.index()] else {
                continue;
            };
            let opacity = match ty {
                OverlayType::StatusUpdate => toast_opacity,
                OverlayType::Debug => 1.0,
            };
            if opacity <= 0.0 {
                continue;
            }

            let placement = &self.placements[ty.index()];
            let bounds = placement.compute_bounds(
                surface.width(),
                surface.height(),
                buffer_width,
                buffer_height,
            );
            if let Some(background) = placement.background {
                render_overlay_background(
                    buffer,
                    &bounds,
                    fade_pixel(background, opacity),
                    buffer_width,
                    buffer_height,
                );
            }
            blit_surface(
                buffer,
                surface,
                bounds.x + placement.padding,
                bounds.y + placement.padding,
                opacity,
                buffer_width,
                buffer_height,
            );
        }
    }

    /// [`update`](Self::update) followed by [`composite`](Self::composite)
    pub fn render_frame<R: TextRasterizer>(
        &mut self,
        manager: &OverlayManager<R>,
        buffer: &mut [u32],
        buffer_width: usize,
        buffer_height: usize,
    ) -> FrameOverlays {
        let frame = self.update(manager);
        self.composite(buffer, buffer_width, buffer_height, frame.toast_opacity);
        frame
    }
}
