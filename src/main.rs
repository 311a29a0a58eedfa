//! Headless overlay demo
//!
//! Usage:
//!   cargo run -- --font assets/DejaVuSansMono.ttf --frames 300 --out frame.png

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use stream_overlay::cli::{CliArgs, DemoConfig};
use stream_overlay::overlay::{OverlayCompositor, OverlayManager, OverlayType};
use stream_overlay::{OverlayConfig, ToastCategory, ToastType};

/// Shared between the render loop and producers
struct DemoState {
    stop: AtomicBool,
    frames_rendered: AtomicU64,
}

/// Sleep in small steps so producers notice shutdown quickly.
/// Returns false once the demo is stopping.
fn pause(state: &DemoState, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        if state.stop.load(Ordering::Relaxed) {
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
    !state.stop.load(Ordering::Relaxed)
}

fn spawn_stats_producer(
    manager: Arc<OverlayManager>,
    state: Arc<DemoState>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        manager.set_overlay_state(OverlayType::Debug, true);
        let started = Instant::now();
        while pause(&state, Duration::from_millis(250)) {
            let frames = state.frames_rendered.load(Ordering::Relaxed);
            let secs = started.elapsed().as_secs_f64().max(0.001);
            let text = format!(
                "Video stream: 1280x720 {:.2} FPS\nFrames rendered: {}\nNetwork latency: 12 ms (variance: 1 ms)",
                frames as f64 / secs,
                frames
            );
            manager.update_overlay_text(OverlayType::Debug, &text);
        }
    })
}

fn spawn_status_producer(
    manager: Arc<OverlayManager>,
    state: Arc<DemoState>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        manager.show_toast(ToastType::Info, ToastCategory::ConnectionStatus, "Connecting...");
        if !pause(&state, Duration::from_millis(600)) {
            return;
        }
        manager.show_toast(
            ToastType::Info,
            ToastCategory::ConnectionStatus,
            "Connection established",
        );
        if !pause(&state, Duration::from_millis(900)) {
            return;
        }
        manager.show_toast(
            ToastType::Warning,
            ToastCategory::CaptureKeys,
            "Press Ctrl+Alt+Shift+Z to release the keyboard",
        );
        if !pause(&state, Duration::from_millis(400)) {
            return;
        }

        // Parked until the capture-keys toast expires, then revealed
        manager.set_mouse_mode_overlay_active(true);
        manager.show_toast(
            ToastType::Info,
            ToastCategory::GamepadMouse,
            "Gamepad mouse mode active\nPress Start to exit",
        );
        if !pause(&state, Duration::from_millis(3000)) {
            return;
        }

        manager.set_mouse_mode_overlay_active(false);
        manager.set_overlay_state(OverlayType::StatusUpdate, false);
    })
}

/// Fill the frame with a moving gradient standing in for decoded video
fn paint_video_frame(buffer: &mut [u32], width: usize, frame: u64) {
    let shift = (frame % 256) as usize;
    for (i, pixel) in buffer.iter_mut().enumerate() {
        let x = i % width;
        let y = i / width;
        let r = ((x + shift) % 256) as u32;
        let g = ((y + shift / 2) % 256) as u32;
        let b = 0x40;
        *pixel = 0xFF000000 | (r << 16) | (g << 8) | b;
    }
}

fn save_png(buffer: &[u32], width: u32, height: u32, path: &Path) -> Result<()> {
    // Convert ARGB (0xAARRGGBB) to RGBA bytes
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for &pixel in buffer {
        rgba.push(((pixel >> 16) & 0xFF) as u8);
        rgba.push(((pixel >> 8) & 0xFF) as u8);
        rgba.push((pixel & 0xFF) as u8);
        rgba.push(((pixel >> 24) & 0xFF) as u8);
    }

    let img = image::ImageBuffer::<image::Rgba<u8>, Vec<u8>>::from_raw(width, height, rgba)
        .context("failed to create image buffer")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    img.save(path)
        .with_context(|| format!("saving PNG to {}", path.display()))?;

    Ok(())
}

fn build_manager(demo: &DemoConfig) -> Result<OverlayManager> {
    let mut config = match &demo.config {
        Some(path) => OverlayConfig::load_from(path),
        None => OverlayConfig::load(),
    };

    if let Some(font) = &demo.font {
        let font = std::fs::canonicalize(font)
            .with_context(|| format!("resolving font path {}", font.display()))?;
        config.font_name = font.to_string_lossy().into_owned();
    }

    let font = config.resolve_font();
    if !font.is_available() {
        eprintln!(
            "Warning: font {} not found; overlays will be blank (searched {:?})",
            font.name(),
            config.font_provider().dirs()
        );
    }

    Ok(OverlayManager::with_config(&config, &font))
}

fn main() -> Result<()> {
    stream_overlay::tracing::init();

    let demo = CliArgs::parse()
        .into_config()
        .map_err(|e| anyhow::anyhow!(e))?;

    let manager = Arc::new(build_manager(&demo)?);
    let mut compositor = OverlayCompositor::new();
    compositor.attach(&*manager);

    let state = Arc::new(DemoState {
        stop: AtomicBool::new(false),
        frames_rendered: AtomicU64::new(0),
    });
    let producers = [
        spawn_stats_producer(Arc::clone(&manager), Arc::clone(&state)),
        spawn_status_producer(Arc::clone(&manager), Arc::clone(&state)),
    ];

    let frame_interval = Duration::from_secs_f64(1.0 / demo.fps as f64);
    let mut buffer = vec![0u32; demo.width * demo.height];
    let mut changed_frames = 0u32;

    for frame in 0..demo.frames {
        let frame_start = Instant::now();

        paint_video_frame(&mut buffer, demo.width, frame as u64);
        let overlays = compositor.render_frame(&*manager, &mut buffer, demo.width, demo.height);
        if overlays.changed {
            changed_frames += 1;
        }
        state.frames_rendered.fetch_add(1, Ordering::Relaxed);

        if let Some(remaining) = frame_interval.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    state.stop.store(true, Ordering::Relaxed);
    for producer in producers {
        if producer.join().is_err() {
            tracing::error!("Producer thread panicked");
        }
    }

    eprintln!(
        "Rendered {} frames ({} with overlay changes)",
        demo.frames, changed_frames
    );

    if let Some(out) = &demo.out {
        save_png(&buffer, demo.width as u32, demo.height as u32, out)?;
        eprintln!("Saved last frame to {}", out.display());
    }

    Ok(())
}
