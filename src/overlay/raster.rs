//! Text rasterization into overlay surfaces
//!
//! [`TextRasterizer`] is the seam between the engine and the font library.
//! The engine only ever asks for two things: build a face from font bytes at
//! a pixel size, and render wrapped text with that face into a fresh
//! [`OverlaySurface`].

use std::collections::HashMap;

use anyhow::Result;
use fontdue::{Font, FontSettings, Metrics};

use super::{OverlaySurface, Rgba};

/// Font library binding used by the overlay engine
pub trait TextRasterizer: Send + Sync {
    /// A loaded font at a fixed pixel size. Owned by exactly one slot.
    type Face: Send;

    /// Build a face from raw font file bytes.
    fn load_face(&self, data: &[u8], size_px: u32) -> Result<Self::Face>;

    /// Render `text` wrapped at `wrap_width` pixels. Explicit `\n` always
    /// starts a new line.
    fn render(
        &self,
        face: &mut Self::Face,
        text: &str,
        color: Rgba,
        wrap_width: u32,
    ) -> Result<OverlaySurface>;
}

type GlyphCache = HashMap<char, (Metrics, Vec<u8>)>;

/// A fontdue font at one pixel size, with its own glyph cache
pub struct FontdueFace {
    font: Font,
    font_size: f32,
    ascent: f32,
    line_height: usize,
    glyph_cache: GlyphCache,
}

impl FontdueFace {
    /// Line height in pixels
    pub fn line_height(&self) -> usize {
        self.line_height
    }

    /// Number of glyphs rasterized so far
    pub fn glyph_cache_size(&self) -> usize {
        self.glyph_cache.len()
    }

    fn glyph(&mut self, ch: char) -> &(Metrics, Vec<u8>) {
        let font = &self.font;
        let font_size = self.font_size;
        self.glyph_cache
            .entry(ch)
            .or_insert_with(|| font.rasterize(ch, font_size))
    }

    fn advance(&mut self, ch: char) -> f32 {
        self.glyph(ch).0.advance_width
    }

    /// Measure text width in pixels
    pub fn measure_width(&mut self, text: &str) -> f32 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }

    /// Greedy word wrap. Words wider than `max_width` are broken by character.
    pub fn wrap_lines(&mut self, text: &str, max_width: f32) -> Vec<String> {
        let space_width = self.advance(' ');
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let paragraph = paragraph.trim_end_matches('\r');
            let mut line = String::new();
            let mut line_width = 0.0;

            for word in paragraph.split(' ') {
                let word_width = self.measure_width(word);
                let sep = if line.is_empty() { 0.0 } else { space_width };
                if line_width + sep + word_width <= max_width {
                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(word);
                    line_width += sep + word_width;
                    continue;
                }

                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }

                for ch in word.chars() {
                    let w = self.advance(ch);
                    if line_width + w > max_width && !line.is_empty() {
                        lines.push(std::mem::take(&mut line));
                        line_width = 0.0;
                    }
                    line.push(ch);
                    line_width += w;
                }
            }

            lines.push(line);
        }

        lines
    }

    /// Draw one line of glyphs into `pixels` with its top edge at `y`
    fn draw_line(&mut self, pixels: &mut [u32], width: usize, y: usize, line: &str, color: Rgba) {
        let mut current_x = 0.0f32;
        let baseline = y as f32 + self.ascent;
        let height = pixels.len() / width.max(1);
        let rgb = color.to_argb_u32() & 0x00FF_FFFF;

        for ch in line.chars() {
            let (metrics, bitmap) = self.glyph(ch);
            let glyph_top = baseline - metrics.height as f32 - metrics.ymin as f32;

            for bitmap_y in 0..metrics.height {
                for bitmap_x in 0..metrics.width {
                    let coverage = bitmap[bitmap_y * metrics.width + bitmap_x];
                    if coverage == 0 {
                        continue;
                    }
                    let px = current_x as isize + bitmap_x as isize + metrics.xmin as isize;
                    let py = (glyph_top + bitmap_y as f32) as isize;
                    if px < 0 || py < 0 {
                        continue;
                    }
                    let (px, py) = (px as usize, py as usize);
                    if px >= width || py >= height {
                        continue;
                    }

                    let alpha = (coverage as u32 * color.a as u32) / 255;
                    let idx = py * width + px;
                    if alpha > pixels[idx] >> 24 {
                        pixels[idx] = (alpha << 24) | rgb;
                    }
                }
            }

            current_x += metrics.advance_width;
        }
    }
}

/// [`TextRasterizer`] backed by fontdue
#[derive(Debug, Clone, Copy, Default)]
pub struct FontdueRasterizer;

impl TextRasterizer for FontdueRasterizer {
    type Face = FontdueFace;

    fn load_face(&self, data: &[u8], size_px: u32) -> Result<FontdueFace> {
        let font_size = size_px.max(1) as f32;
        let font = Font::from_bytes(
            data,
            FontSettings {
                scale: font_size,
                ..FontSettings::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to load font: {}", e))?;

        let (ascent, line_height) = match font.horizontal_line_metrics(font_size) {
            Some(metrics) => (metrics.ascent, metrics.new_line_size.ceil() as usize),
            None => (font_size, (font_size * 1.2).ceil() as usize),
        };

        Ok(FontdueFace {
            font,
            font_size,
            ascent,
            line_height: line_height.max(1),
            glyph_cache: GlyphCache::new(),
        })
    }

    fn render(
        &self,
        face: &mut FontdueFace,
        text: &str,
        color: Rgba,
        wrap_width: u32,
    ) -> Result<OverlaySurface> {
        let lines = face.wrap_lines(text, wrap_width as f32);
        let width = lines
            .iter()
            .map(|line| face.measure_width(line).ceil() as usize)
            .max()
            .unwrap_or(0)
            .max(1);
        let height = lines.len() * face.line_height;
        if height == 0 {
            anyhow::bail!("nothing to render");
        }

        let mut pixels = vec![0u32; width * height];
        for (i, line) in lines.iter().enumerate() {
            face.draw_line(&mut pixels, width, i * face.line_height, line, color);
        }

        Ok(OverlaySurface::new(width, height, pixels, text, color))
    }
}
