//! The overlay engine
//!
//! [`OverlayManager`] is constructed once per streaming session and shared
//! (usually behind an `Arc`) between producer threads and the render loop.
//!
//! Producer API: [`update_overlay_text`](OverlayManager::update_overlay_text),
//! [`set_overlay_state`](OverlayManager::set_overlay_state),
//! [`show_toast`](OverlayManager::show_toast),
//! [`set_mouse_mode_overlay_active`](OverlayManager::set_mouse_mode_overlay_active).
//!
//! Render-loop API, called once per frame and never blocking:
//! [`claim_updated_surface`](OverlayManager::claim_updated_surface),
//! [`tick`](OverlayManager::tick),
//! [`is_overlay_enabled`](OverlayManager::is_overlay_enabled),
//! [`overlay_color`](OverlayManager::overlay_color).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::clock::{Clock, MonotonicClock};
use super::raster::{FontdueRasterizer, TextRasterizer};
use super::slot::{OverlaySlot, RasterContext, Superseded};
use super::suppression::MouseModeSuppression;
use super::toast::{
    toast_color, ToastCategory, ToastFrame, ToastPhase, ToastState, ToastTiming, ToastType,
    MOUSE_MODE_BANNER_COLOR,
};
use super::{FontProvider, OverlaySurface, OverlayType, Rgba, TEXT_CAPACITY};
use crate::config::OverlayConfig;

/// Notification sink implemented by the video compositor
///
/// Called synchronously on whichever thread published, after the new surface
/// is in place. Implementations should only record that an update is
/// pending; they must not call back into the manager's producer API.
pub trait OverlayRenderer: Send + Sync {
    fn notify_overlay_updated(&self, ty: OverlayType);
}

#[derive(Debug, Default)]
struct ToastBook {
    toast: ToastState,
    suppression: MouseModeSuppression,
}

pub struct OverlayManager<R: TextRasterizer = FontdueRasterizer> {
    slots: [OverlaySlot<R::Face>; OverlayType::COUNT],
    rasterizer: R,
    font_data: Option<Arc<[u8]>>,
    wrap_width: u32,
    timing: ToastTiming,
    clock: Arc<dyn Clock>,
    renderer: RwLock<Option<Arc<dyn OverlayRenderer>>>,
    toast: Mutex<ToastBook>,
    last_opacity: AtomicU32,
}

impl OverlayManager<FontdueRasterizer> {
    /// Engine with the fontdue rasterizer and a wall clock
    pub fn with_config(config: &OverlayConfig, fonts: &dyn FontProvider) -> Self {
        Self::new(config, fonts, FontdueRasterizer)
    }
}

impl<R: TextRasterizer> OverlayManager<R> {
    pub fn new(config: &OverlayConfig, fonts: &dyn FontProvider, rasterizer: R) -> Self {
        Self::with_clock(config, fonts, rasterizer, Arc::new(MonotonicClock::new()))
    }

    /// Font bytes are fetched here, once, and kept for the engine's lifetime.
    pub fn with_clock(
        config: &OverlayConfig,
        fonts: &dyn FontProvider,
        rasterizer: R,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let font_data = fonts.load(&config.font_name);
        if font_data.is_none() {
            tracing::warn!(
                "Overlay font {} unavailable; overlays will not be rendered",
                config.font_name
            );
        }

        let slots = OverlayType::ALL.map(|ty| {
            let style = config.style(ty);
            OverlaySlot::new(ty, style.font_size, style.color)
        });

        Self {
            slots,
            rasterizer,
            font_data,
            wrap_width: config.wrap_width,
            timing: config.toast,
            clock,
            renderer: RwLock::new(None),
            toast: Mutex::new(ToastBook::default()),
            last_opacity: AtomicU32::new(1.0f32.to_bits()),
        }
    }

    #[inline]
    fn slot(&self, ty: OverlayType) -> &OverlaySlot<R::Face> {
        &self.slots[ty.index()]
    }

    fn raster_context(&self) -> RasterContext<'_, R> {
        RasterContext {
            rasterizer: &self.rasterizer,
            font_data: self.font_data.as_deref(),
            wrap_width: self.wrap_width,
        }
    }

    /// Notify the renderer of a publish, then release the displaced surface.
    fn finish(&self, ty: OverlayType, published: Option<Superseded>) {
        let Some(Superseded(previous)) = published else {
            return;
        };
        let renderer = self.renderer.read().clone();
        if let Some(renderer) = renderer {
            renderer.notify_overlay_updated(ty);
        }
        drop(previous);
    }

    /// Attach or detach the notification sink
    pub fn set_renderer(&self, renderer: Option<Arc<dyn OverlayRenderer>>) {
        *self.renderer.write() = renderer;
    }

    /// Whether the font bytes were available at construction
    pub fn has_font_data(&self) -> bool {
        self.font_data.is_some()
    }

    pub fn toast_timing(&self) -> &ToastTiming {
        &self.timing
    }

    // ------------------------------------------------------------------
    // Slot store
    // ------------------------------------------------------------------

    pub fn is_overlay_enabled(&self, ty: OverlayType) -> bool {
        self.slot(ty).is_enabled()
    }

    pub fn overlay_color(&self, ty: OverlayType) -> Rgba {
        self.slot(ty).color()
    }

    pub fn overlay_font_size(&self, ty: OverlayType) -> u32 {
        self.slot(ty).font_size()
    }

    /// Text buffer capacity in bytes, terminator included
    pub fn max_text_length(&self) -> usize {
        TEXT_CAPACITY
    }

    /// Current text of a slot. Takes the producer lock; not for the render loop.
    pub fn overlay_text(&self, ty: OverlayType) -> String {
        self.slot(ty).text()
    }

    /// Number of publishes a slot has gone through
    pub fn publish_count(&self, ty: OverlayType) -> u64 {
        self.slot(ty).publish_count()
    }

    /// Replace the text of a slot. Rendered right away if the slot is
    /// enabled, otherwise kept until it is.
    pub fn update_overlay_text(&self, ty: OverlayType, text: &str) {
        let published = self.slot(ty).update_text(&self.raster_context(), text);
        self.finish(ty, published);
    }

    /// Enable or disable a slot. Disabling clears its text and publishes an
    /// empty surface so the renderer drops the layer.
    pub fn set_overlay_state(&self, ty: OverlayType, enabled: bool) {
        let published = self.slot(ty).set_enabled(&self.raster_context(), enabled);
        if published.is_some() {
            let state = if enabled { "enabled" } else { "disabled" };
            tracing::debug!("{} overlay {}", ty.name(), state);
        }
        self.finish(ty, published);
    }

    /// Take the surface published since the last claim, if any. The caller
    /// owns the returned surface.
    #[inline]
    pub fn claim_updated_surface(&self, ty: OverlayType) -> Option<Arc<OverlaySurface>> {
        self.slot(ty).claim()
    }

    // ------------------------------------------------------------------
    // Toasts
    // ------------------------------------------------------------------

    /// Show a toast on the status line.
    ///
    /// While the mouse-mode banner is pinned the text is parked instead. A
    /// toast of the active category refreshes in place and restarts its
    /// timer; any other category takes over immediately.
    pub fn show_toast(&self, kind: ToastType, category: ToastCategory, text: &str) {
        let mut book = self.toast.lock();
        if book.suppression.capture(text) {
            tracing::debug!("Toast {:?} parked behind mouse-mode banner", category);
            return;
        }

        let now = self.clock.now();
        if book.toast.coalesces_with(category) {
            book.toast.refresh(kind, now);
        } else {
            if book.toast.is_active() {
                tracing::debug!(
                    "Toast {:?} superseded by {:?}",
                    book.toast.category(),
                    category
                );
            }
            book.toast.start(kind, category, now, self.timing.display());
        }

        let published = self.slot(OverlayType::StatusUpdate).show(
            &self.raster_context(),
            text,
            toast_color(kind),
        );
        drop(book);
        self.finish(OverlayType::StatusUpdate, published);
    }

    /// Advance the toast state machine and return this frame's opacity.
    ///
    /// This is the only place expiry happens: once the display time is up the
    /// status line is disabled, a parked mouse-mode banner (if any) is
    /// revealed, and 0.0 is returned for the frame. With no active toast the
    /// result is 1.0. If a producer holds the toast lock, the previous
    /// frame's value is returned instead of waiting; if one is rasterizing
    /// the status line, expiry is retried on the next frame.
    pub fn tick(&self) -> f32 {
        let Some(mut book) = self.toast.try_lock() else {
            return f32::from_bits(self.last_opacity.load(Ordering::Acquire));
        };

        let frame = book.toast.frame(self.clock.now(), &self.timing);
        let opacity = match frame {
            None => 1.0,
            Some(ToastFrame {
                phase: ToastPhase::Expired,
                ..
            }) => {
                let Some(mut status) = self.slot(OverlayType::StatusUpdate).try_acquire() else {
                    tracing::trace!("Status overlay busy; toast expiry deferred to next frame");
                    drop(book);
                    self.last_opacity.store(0.0f32.to_bits(), Ordering::Release);
                    return 0.0;
                };

                tracing::debug!("Toast {:?} expired", book.toast.category());
                book.toast.expire();

                let cx = self.raster_context();
                let disabled = status.set_enabled(&cx, false);
                let revealed = book
                    .suppression
                    .take_pending()
                    .and_then(|text| status.show(&cx, &text, MOUSE_MODE_BANNER_COLOR));
                drop(status);
                drop(book);

                self.finish(OverlayType::StatusUpdate, disabled);
                self.finish(OverlayType::StatusUpdate, revealed);
                0.0
            }
            Some(frame) => frame.opacity,
        };

        self.last_opacity.store(opacity.to_bits(), Ordering::Release);
        opacity
    }

    /// Current toast frame without applying expiry, or `None` if no toast
    /// is active
    pub fn toast_frame(&self) -> Option<ToastFrame> {
        self.toast.lock().toast.frame(self.clock.now(), &self.timing)
    }

    pub fn is_toast_active(&self) -> bool {
        self.toast.lock().toast.is_active()
    }

    pub fn toast_category(&self) -> ToastCategory {
        self.toast.lock().toast.category()
    }

    pub fn toast_type(&self) -> ToastType {
        self.toast.lock().toast.kind()
    }

    /// Palette color of the current toast type
    pub fn toast_color(&self) -> Rgba {
        toast_color(self.toast_type())
    }

    // ------------------------------------------------------------------
    // Mouse-mode suppression
    // ------------------------------------------------------------------

    /// Pin or unpin the mouse-mode banner. Unpinning discards any parked toast.
    pub fn set_mouse_mode_overlay_active(&self, active: bool) {
        let mut book = self.toast.lock();
        if book.suppression.is_active() != active {
            tracing::debug!("Mouse-mode overlay suppression {}", if active { "on" } else { "off" });
        }
        book.suppression.set_active(active);
    }

    pub fn is_mouse_mode_overlay_active(&self) -> bool {
        self.toast.lock().suppression.is_active()
    }

    /// Toast text parked behind the mouse-mode banner
    pub fn pending_mouse_mode_text(&self) -> String {
        self.toast.lock().suppression.pending().to_owned()
    }
}
