//! Overlay slot store tests
//!
//! Enable/disable lifecycle, text buffering, claim semantics and font
//! failure handling.

mod common;

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use common::{harness, harness_with_font, CORRUPT_FONT};
use stream_overlay::overlay::{EmbeddedFont, OverlayManager, OverlayType, Rgba, TEXT_CAPACITY};
use stream_overlay::OverlayConfig;

const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

// ========================================================================
// Accessors
// ========================================================================

#[test]
fn test_default_styles() {
    let h = harness();
    assert_eq!(h.manager.overlay_font_size(OverlayType::Debug), 20);
    assert_eq!(h.manager.overlay_font_size(OverlayType::StatusUpdate), 28);
    assert_eq!(h.manager.overlay_color(OverlayType::Debug), Rgba::WHITE);
    assert_eq!(h.manager.max_text_length(), TEXT_CAPACITY);
    for ty in OverlayType::ALL {
        assert!(!h.manager.is_overlay_enabled(ty));
        assert!(h.claim(ty).is_none());
    }
}

// ========================================================================
// update_overlay_text
// ========================================================================

#[test]
fn test_update_while_disabled_only_buffers_text() {
    let h = harness();
    h.manager.update_overlay_text(OverlayType::Debug, "fps: 60");

    assert_eq!(h.manager.overlay_text(OverlayType::Debug), "fps: 60");
    assert!(h.claim(OverlayType::Debug).is_none());
    assert_eq!(h.renderer.count(OverlayType::Debug), 0);
    assert_eq!(h.faces_loaded.load(Ordering::SeqCst), 0);
}

#[test]
fn test_enable_renders_buffered_text() {
    let h = harness();
    h.manager.update_overlay_text(OverlayType::Debug, "fps: 60");
    h.manager.set_overlay_state(OverlayType::Debug, true);

    let surface = h.claim(OverlayType::Debug).expect("surface after enable");
    assert_eq!(surface.text(), "fps: 60");
    assert_eq!(surface.color(), Rgba::WHITE);
    assert_eq!(h.renderer.count(OverlayType::Debug), 1);
}

#[test]
fn test_update_while_enabled_publishes_and_notifies() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.renderer.clear();

    h.manager.update_overlay_text(OverlayType::Debug, "fps: 59");
    assert_eq!(h.renderer.count(OverlayType::Debug), 1);
    assert_eq!(h.claim(OverlayType::Debug).unwrap().text(), "fps: 59");
}

#[test]
fn test_enabled_with_empty_text_publishes_no_surface() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);

    assert_eq!(h.renderer.count(OverlayType::Debug), 1);
    assert!(h.claim(OverlayType::Debug).is_none());
}

#[test]
fn test_slots_are_independent() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, "stats");

    assert!(!h.manager.is_overlay_enabled(OverlayType::StatusUpdate));
    assert!(h.claim(OverlayType::StatusUpdate).is_none());
    assert_eq!(h.renderer.count(OverlayType::StatusUpdate), 0);
    assert!(h.claim(OverlayType::Debug).is_some());
}

// ========================================================================
// claim_updated_surface
// ========================================================================

#[test]
fn test_claim_returns_surface_once_per_publish() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, "a");

    assert!(h.claim(OverlayType::Debug).is_some());
    assert!(h.claim(OverlayType::Debug).is_none());

    h.manager.update_overlay_text(OverlayType::Debug, "b");
    assert_eq!(h.claim(OverlayType::Debug).unwrap().text(), "b");
    assert!(h.claim(OverlayType::Debug).is_none());
}

#[test]
fn test_unclaimed_surface_is_superseded_by_latest() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);
    for i in 0..10 {
        h.manager.update_overlay_text(OverlayType::Debug, &format!("frame {}", i));
    }

    let surface = h.claim(OverlayType::Debug).unwrap();
    assert_eq!(surface.text(), "frame 9");
    // the claimer is the sole owner; superseded surfaces were released
    assert_eq!(std::sync::Arc::strong_count(&surface), 1);
    assert_eq!(h.surfaces_rendered.load(Ordering::SeqCst), 10);
}

// ========================================================================
// set_overlay_state
// ========================================================================

#[test]
fn test_set_state_unchanged_is_noop() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, false);
    assert_eq!(h.manager.publish_count(OverlayType::Debug), 0);

    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.set_overlay_state(OverlayType::Debug, true);
    assert_eq!(h.manager.publish_count(OverlayType::Debug), 1);
    assert_eq!(h.renderer.count(OverlayType::Debug), 1);
}

#[test]
fn test_disable_publishes_exactly_one_empty_surface() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, "some long stats text");
    h.renderer.clear();
    let before = h.manager.publish_count(OverlayType::Debug);

    h.manager.set_overlay_state(OverlayType::Debug, false);

    assert_eq!(h.manager.publish_count(OverlayType::Debug), before + 1);
    assert_eq!(h.renderer.count(OverlayType::Debug), 1);
    assert_eq!(h.manager.overlay_text(OverlayType::Debug), "");
    // the unclaimed text surface was replaced by "no surface"
    assert!(h.claim(OverlayType::Debug).is_none());
    assert!(!h.manager.is_overlay_enabled(OverlayType::Debug));
}

#[test]
fn test_reenable_after_disable_has_empty_text() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, "old");
    h.manager.set_overlay_state(OverlayType::Debug, false);
    h.manager.set_overlay_state(OverlayType::Debug, true);

    assert!(h.claim(OverlayType::Debug).is_none());
    assert_eq!(h.manager.overlay_text(OverlayType::Debug), "");
}

// ========================================================================
// Text capacity
// ========================================================================

#[test]
fn test_text_truncation_around_capacity() {
    let h = harness();
    let max = h.manager.max_text_length() - 1;

    for len in [max - 1, max, max + 1, max + 2] {
        let text = "x".repeat(len);
        h.manager.update_overlay_text(OverlayType::Debug, &text);
        let stored = h.manager.overlay_text(OverlayType::Debug);
        assert_eq!(stored.len(), len.min(max), "input length {}", len);
        assert!(text.starts_with(&stored));
    }
}

#[test]
fn test_truncated_text_is_what_gets_rendered() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, &"y".repeat(TEXT_CAPACITY * 2));

    let surface = h.claim(OverlayType::Debug).unwrap();
    assert_eq!(surface.text().len(), TEXT_CAPACITY - 1);
}

// ========================================================================
// Font handling
// ========================================================================

#[test]
fn test_font_face_created_once_per_type() {
    let h = harness();
    h.manager.set_overlay_state(OverlayType::Debug, true);
    for i in 0..5 {
        h.manager.update_overlay_text(OverlayType::Debug, &i.to_string());
    }
    assert_eq!(h.faces_loaded.load(Ordering::SeqCst), 1);

    h.manager.set_overlay_state(OverlayType::StatusUpdate, true);
    h.manager.update_overlay_text(OverlayType::StatusUpdate, "status");
    assert_eq!(h.faces_loaded.load(Ordering::SeqCst), 2);
}

#[test]
fn test_missing_font_leaves_overlay_unrendered() {
    let h = harness_with_font(None);
    assert!(!h.manager.has_font_data());

    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, "stats");
    h.manager.update_overlay_text(OverlayType::Debug, "stats again");

    assert!(h.claim(OverlayType::Debug).is_none());
    assert_eq!(h.surfaces_rendered.load(Ordering::SeqCst), 0);
    // state still tracks even though nothing can be drawn
    assert!(h.manager.is_overlay_enabled(OverlayType::Debug));
    assert_eq!(h.manager.overlay_text(OverlayType::Debug), "stats again");
}

/// Log sink collecting formatted events in memory
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_missing_font_warns_once() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let h = harness_with_font(None);
        for ty in OverlayType::ALL {
            h.manager.set_overlay_state(ty, true);
            h.manager.update_overlay_text(ty, "stats");
            h.manager.update_overlay_text(ty, "more stats");
        }
    });

    let output = String::from_utf8(logs.0.lock().clone()).unwrap();
    assert_eq!(output.lines().filter(|l| l.contains("WARN")).count(), 1, "{}", output);
}

#[test]
fn test_corrupt_font_is_not_retried() {
    let h = harness_with_font(Some(CORRUPT_FONT.to_vec()));
    assert!(h.manager.has_font_data());

    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, "a");
    h.manager.update_overlay_text(OverlayType::Debug, "b");

    assert!(h.claim(OverlayType::Debug).is_none());
    assert_eq!(h.faces_loaded.load(Ordering::SeqCst), 0);
    assert_eq!(h.surfaces_rendered.load(Ordering::SeqCst), 0);
}

#[test]
fn test_disable_still_publishes_without_font() {
    let h = harness_with_font(None);
    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, "stats");
    h.renderer.clear();

    h.manager.set_overlay_state(OverlayType::Debug, false);
    assert_eq!(h.renderer.count(OverlayType::Debug), 1);
    assert_eq!(h.manager.overlay_text(OverlayType::Debug), "");
}

#[test]
fn test_bundled_font_renders_wrapped_surfaces() {
    let config = OverlayConfig::default();
    let font = EmbeddedFont::new(config.font_name.clone(), BUNDLED_FONT.to_vec());
    let manager = OverlayManager::with_config(&config, &font);

    manager.set_overlay_state(OverlayType::StatusUpdate, true);
    let text = "Mouse capture is active. Press Ctrl+Alt+Shift+M to release it. ".repeat(6);
    manager.update_overlay_text(OverlayType::StatusUpdate, &text);

    let surface = manager
        .claim_updated_surface(OverlayType::StatusUpdate)
        .unwrap();
    assert!(surface.width() <= config.wrap_width as usize);
    assert!(surface.height() > 2 * config.status_update.font_size as usize);
    assert!(surface.covered_pixels() > 0);
    assert_eq!(surface.text(), text);
}

// ========================================================================
// Renderer attachment
// ========================================================================

#[test]
fn test_publishes_before_renderer_attached_are_still_claimable() {
    let h = harness();
    h.manager.set_renderer(None);

    h.manager.set_overlay_state(OverlayType::Debug, true);
    h.manager.update_overlay_text(OverlayType::Debug, "early");
    assert_eq!(h.renderer.count(OverlayType::Debug), 0);

    h.manager.set_renderer(Some(h.renderer.clone()));
    assert_eq!(h.claim(OverlayType::Debug).unwrap().text(), "early");
}
