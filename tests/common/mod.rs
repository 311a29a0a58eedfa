//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use stream_overlay::overlay::{
    EmbeddedFont, ManualClock, OverlayManager, OverlayRenderer, OverlaySurface, OverlayType, Rgba,
    TextRasterizer,
};
use stream_overlay::OverlayConfig;

pub const FONT_NAME: &str = "ModeSeven.ttf";

/// Font bytes the stub rasterizer refuses to load
pub const CORRUPT_FONT: &[u8] = b"corrupt";

/// Text starting with this prefix is rendered after `render_delay_ms`
pub const SLOW_PREFIX: &str = "slow";

/// Face handed out by [`StubRasterizer`]
pub struct StubFace {
    pub size_px: u32,
}

/// Deterministic rasterizer: each byte of text becomes a `size/2 x size`
/// block of solid color, each line one row of blocks.
#[derive(Default)]
pub struct StubRasterizer {
    pub faces_loaded: Arc<AtomicUsize>,
    pub surfaces_rendered: Arc<AtomicUsize>,
    pub render_delay_ms: Arc<AtomicU64>,
    pub slow_renders_started: Arc<AtomicUsize>,
}

impl TextRasterizer for StubRasterizer {
    type Face = StubFace;

    fn load_face(&self, data: &[u8], size_px: u32) -> anyhow::Result<StubFace> {
        if data == CORRUPT_FONT {
            anyhow::bail!("not a font");
        }
        self.faces_loaded.fetch_add(1, Ordering::SeqCst);
        Ok(StubFace { size_px })
    }

    fn render(
        &self,
        face: &mut StubFace,
        text: &str,
        color: Rgba,
        _wrap_width: u32,
    ) -> anyhow::Result<OverlaySurface> {
        if text.starts_with(SLOW_PREFIX) {
            self.slow_renders_started.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(
                self.render_delay_ms.load(Ordering::SeqCst),
            ));
        }
        let cell = (face.size_px / 2).max(1) as usize;
        let columns = text.lines().map(str::len).max().unwrap_or(0).max(1);
        let rows = text.lines().count().max(1);
        let (width, height) = (columns * cell, rows * cell * 2);
        self.surfaces_rendered.fetch_add(1, Ordering::SeqCst);
        Ok(OverlaySurface::new(
            width,
            height,
            vec![color.to_argb_u32(); width * height],
            text,
            color,
        ))
    }
}

/// Renderer sink that records every notification
#[derive(Default)]
pub struct RecordingRenderer {
    notifications: Mutex<Vec<OverlayType>>,
}

impl RecordingRenderer {
    pub fn count(&self, ty: OverlayType) -> usize {
        self.notifications.lock().iter().filter(|&&t| t == ty).count()
    }

    pub fn clear(&self) {
        self.notifications.lock().clear();
    }
}

impl OverlayRenderer for RecordingRenderer {
    fn notify_overlay_updated(&self, ty: OverlayType) {
        self.notifications.lock().push(ty);
    }
}

pub struct Harness {
    pub manager: Arc<OverlayManager<StubRasterizer>>,
    pub clock: Arc<ManualClock>,
    pub renderer: Arc<RecordingRenderer>,
    pub faces_loaded: Arc<AtomicUsize>,
    pub surfaces_rendered: Arc<AtomicUsize>,
    pub render_delay_ms: Arc<AtomicU64>,
    pub slow_renders_started: Arc<AtomicUsize>,
}

impl Harness {
    pub fn advance_ms(&self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
    }

    pub fn claim(&self, ty: OverlayType) -> Option<Arc<OverlaySurface>> {
        self.manager.claim_updated_surface(ty)
    }
}

/// Manager with a stub rasterizer, manual clock and recording renderer
pub fn harness() -> Harness {
    harness_with_font(Some(b"font-bytes".to_vec()))
}

/// Like [`harness`], with explicit font bytes (`None` = font unavailable)
pub fn harness_with_font(font: Option<Vec<u8>>) -> Harness {
    let fonts = EmbeddedFont::new(FONT_NAME, font.unwrap_or_default());
    let rasterizer = StubRasterizer::default();
    let faces_loaded = Arc::clone(&rasterizer.faces_loaded);
    let surfaces_rendered = Arc::clone(&rasterizer.surfaces_rendered);
    let render_delay_ms = Arc::clone(&rasterizer.render_delay_ms);
    let slow_renders_started = Arc::clone(&rasterizer.slow_renders_started);
    let clock = Arc::new(ManualClock::new());

    let manager = Arc::new(OverlayManager::with_clock(
        &OverlayConfig::default(),
        &fonts,
        rasterizer,
        clock.clone(),
    ));
    let renderer = Arc::new(RecordingRenderer::default());
    manager.set_renderer(Some(renderer.clone()));

    Harness {
        manager,
        clock,
        renderer,
        faces_loaded,
        surfaces_rendered,
        render_delay_ms,
        slow_renders_started,
    }
}
