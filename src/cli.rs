//! Command-line argument parsing for the overlay demo
//!
//! The demo drives the engine headlessly: producer threads feed it stats,
//! toasts and a mouse-mode banner while a render loop composites a synthetic
//! video frame at a fixed rate.

use clap::Parser;
use std::path::PathBuf;

/// Headless overlay compositing demo
#[derive(Parser, Debug)]
#[command(name = "stream-overlay", version, about = "Overlay and toast compositing demo")]
pub struct CliArgs {
    /// Font file to rasterize with (overrides the configured font)
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of frames to render
    #[arg(long, default_value_t = 240)]
    pub frames: u32,

    /// Render loop rate
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Frame width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Write the last composited frame to this PNG
    #[arg(long, value_name = "PNG")]
    pub out: Option<PathBuf>,
}

/// Validated demo settings
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub font: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub frames: u32,
    pub fps: u32,
    pub width: usize,
    pub height: usize,
    pub out: Option<PathBuf>,
}

impl CliArgs {
    /// Convert parsed CLI args into demo settings
    pub fn into_config(self) -> Result<DemoConfig, String> {
        if self.fps == 0 {
            return Err("--fps must be at least 1".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "frame size must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        if let Some(font) = &self.font {
            if !font.is_file() {
                return Err(format!("font file not found: {}", font.display()));
            }
        }

        Ok(DemoConfig {
            font: self.font,
            config: self.config,
            frames: self.frames,
            fps: self.fps,
            width: self.width as usize,
            height: self.height as usize,
            out: self.out,
        })
    }
}
