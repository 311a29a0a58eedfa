//! Per-type overlay slot
//!
//! Each slot has two sides:
//!
//! - Producer side: text buffer and lazily created font face behind a mutex.
//!   Holding it serializes publishes for this type, including first-use
//!   creation of the face.
//! - Renderer side: `enabled`/`color` atomics and the published surface in an
//!   [`ArcSwapOption`]. Claiming swaps the surface out for `None`, so whoever
//!   gets the `Arc` back from a swap owns that surface.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, MutexGuard};

use super::raster::TextRasterizer;
use super::{BoundedText, OverlaySurface, OverlayType, Rgba, TEXT_CAPACITY};

/// Everything a publish needs besides the slot itself
pub struct RasterContext<'a, R: TextRasterizer> {
    pub rasterizer: &'a R,
    pub font_data: Option<&'a [u8]>,
    pub wrap_width: u32,
}

/// Surface displaced by a publish. Dropping it frees the surface, which is
/// the publisher's job once the renderer has been notified.
#[must_use]
pub struct Superseded(pub Option<Arc<OverlaySurface>>);

enum FaceState<F> {
    Unloaded,
    Ready(F),
    Failed,
}

struct SlotInner<F> {
    text: BoundedText,
    face: FaceState<F>,
}

/// Producer side of a slot taken with `try_lock`, for callers that must not
/// wait on a producer that is rasterizing
pub struct SlotGuard<'s, F> {
    slot: &'s OverlaySlot<F>,
    inner: MutexGuard<'s, SlotInner<F>>,
}

impl<F: Send> SlotGuard<'_, F> {
    /// See [`OverlaySlot::set_enabled`]
    pub fn set_enabled<R>(
        &mut self,
        cx: &RasterContext<'_, R>,
        enabled: bool,
    ) -> Option<Superseded>
    where
        R: TextRasterizer<Face = F>,
    {
        self.slot.set_enabled_locked(&mut self.inner, cx, enabled)
    }

    /// See [`OverlaySlot::show`]
    pub fn show<R>(
        &mut self,
        cx: &RasterContext<'_, R>,
        text: &str,
        color: Rgba,
    ) -> Option<Superseded>
    where
        R: TextRasterizer<Face = F>,
    {
        self.slot.show_locked(&mut self.inner, cx, text, color)
    }
}

pub struct OverlaySlot<F> {
    ty: OverlayType,
    font_size: u32,
    enabled: AtomicBool,
    color: AtomicU32,
    publishes: AtomicU64,
    inner: Mutex<SlotInner<F>>,
    surface: ArcSwapOption<OverlaySurface>,
}

impl<F: Send> OverlaySlot<F> {
    pub fn new(ty: OverlayType, font_size: u32, color: Rgba) -> Self {
        Self {
            ty,
            font_size,
            enabled: AtomicBool::new(false),
            color: AtomicU32::new(color.to_argb_u32()),
            publishes: AtomicU64::new(0),
            inner: Mutex::new(SlotInner {
                text: BoundedText::new(TEXT_CAPACITY),
                face: FaceState::Unloaded,
            }),
            surface: ArcSwapOption::empty(),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    #[inline]
    pub fn color(&self) -> Rgba {
        Rgba::from_argb_u32(self.color.load(Ordering::Acquire))
    }

    #[inline]
    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Number of publishes so far
    pub fn publish_count(&self) -> u64 {
        self.publishes.load(Ordering::Acquire)
    }

    pub fn text(&self) -> String {
        self.inner.lock().text.as_str().to_owned()
    }

    /// Take ownership of the published surface, leaving the slot empty
    #[inline]
    pub fn claim(&self) -> Option<Arc<OverlaySurface>> {
        self.surface.swap(None)
    }

    /// Replace the text; publishes only while enabled.
    pub fn update_text<R>(&self, cx: &RasterContext<'_, R>, text: &str) -> Option<Superseded>
    where
        R: TextRasterizer<Face = F>,
    {
        let mut inner = self.inner.lock();
        if inner.text.set(text) {
            tracing::trace!(
                "{} overlay text truncated to {} bytes",
                self.ty.name(),
                inner.text.len()
            );
        }
        if !self.is_enabled() {
            return None;
        }
        self.publish(&mut inner, cx)
    }

    /// Enable or disable the layer. No-op if unchanged; disabling clears the text.
    pub fn set_enabled<R>(&self, cx: &RasterContext<'_, R>, enabled: bool) -> Option<Superseded>
    where
        R: TextRasterizer<Face = F>,
    {
        self.set_enabled_locked(&mut self.inner.lock(), cx, enabled)
    }

    /// Set text and color together and force the layer on
    pub fn show<R>(&self, cx: &RasterContext<'_, R>, text: &str, color: Rgba) -> Option<Superseded>
    where
        R: TextRasterizer<Face = F>,
    {
        self.show_locked(&mut self.inner.lock(), cx, text, color)
    }

    /// Producer side without blocking, or `None` while another thread holds it
    pub fn try_acquire(&self) -> Option<SlotGuard<'_, F>> {
        self.inner
            .try_lock()
            .map(|inner| SlotGuard { slot: self, inner })
    }

    fn set_enabled_locked<R>(
        &self,
        inner: &mut SlotInner<F>,
        cx: &RasterContext<'_, R>,
        enabled: bool,
    ) -> Option<Superseded>
    where
        R: TextRasterizer<Face = F>,
    {
        if self.is_enabled() == enabled {
            return None;
        }
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            inner.text.clear();
        }
        self.publish(inner, cx)
    }

    fn show_locked<R>(
        &self,
        inner: &mut SlotInner<F>,
        cx: &RasterContext<'_, R>,
        text: &str,
        color: Rgba,
    ) -> Option<Superseded>
    where
        R: TextRasterizer<Face = F>,
    {
        inner.text.set(text);
        self.color.store(color.to_argb_u32(), Ordering::Release);
        self.enabled.store(true, Ordering::Release);
        self.publish(inner, cx)
    }

    /// Rasterize current state and swap it in. Returns `None` when nothing
    /// was published because the font could not be loaded.
    fn publish<R>(&self, inner: &mut SlotInner<F>, cx: &RasterContext<'_, R>) -> Option<Superseded>
    where
        R: TextRasterizer<Face = F>,
    {
        let SlotInner { text, face } = inner;
        let next = if !self.is_enabled() || text.is_empty() {
            None
        } else {
            let face = self.face(face, cx)?;
            match cx
                .rasterizer
                .render(face, text.as_str(), self.color(), cx.wrap_width)
            {
                Ok(surface) => Some(Arc::new(surface)),
                Err(e) => {
                    tracing::debug!("Failed to rasterize {} overlay: {}", self.ty.name(), e);
                    None
                }
            }
        };

        let previous = self.surface.swap(next);
        self.publishes.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(
            "Published {} overlay (replaced unclaimed: {})",
            self.ty.name(),
            previous.is_some()
        );
        Some(Superseded(previous))
    }

    /// Face for this slot, created on first use. A failed load is latched so
    /// it is reported once and never retried.
    fn face<'f, R>(
        &self,
        face: &'f mut FaceState<F>,
        cx: &RasterContext<'_, R>,
    ) -> Option<&'f mut F>
    where
        R: TextRasterizer<Face = F>,
    {
        if let FaceState::Unloaded = face {
            *face = match cx.font_data {
                None => {
                    tracing::debug!("No font data for {} overlay", self.ty.name());
                    FaceState::Failed
                }
                Some(data) => match cx.rasterizer.load_face(data, self.font_size) {
                    Ok(loaded) => {
                        tracing::debug!(
                            "Created {}px face for {} overlay",
                            self.font_size,
                            self.ty.name()
                        );
                        FaceState::Ready(loaded)
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to create font for {} overlay: {:#}",
                            self.ty.name(),
                            e
                        );
                        FaceState::Failed
                    }
                },
            };
        }

        match face {
            FaceState::Ready(loaded) => Some(loaded),
            FaceState::Unloaded | FaceState::Failed => None,
        }
    }
}
