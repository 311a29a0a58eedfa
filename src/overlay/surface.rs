//! Rasterized overlay surfaces
//!
//! A surface is built once by a rasterizer and never mutated afterwards, so
//! handing out `Arc<OverlaySurface>` across threads can never expose a
//! half-written image.

use super::Rgba;

/// Immutable ARGB (0xAARRGGBB, straight alpha) image of one overlay's text
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySurface {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    text: String,
    color: Rgba,
}

impl OverlaySurface {
    /// Wrap a finished pixel buffer.
    ///
    /// `pixels` must hold exactly `width * height` entries; a short buffer is
    /// padded with transparent pixels and a long one is cut.
    pub fn new(width: usize, height: usize, mut pixels: Vec<u32>, text: &str, color: Rgba) -> Self {
        pixels.resize(width * height, 0);
        Self {
            width,
            height,
            pixels,
            text: text.to_owned(),
            color,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at (x, y), or fully transparent when out of bounds
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            0
        }
    }

    /// Text this surface was rasterized from
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Color this surface was rasterized with
    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Number of pixels with non-zero coverage
    pub fn covered_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&p| p >> 24 != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_buffer_length() {
        let surface = OverlaySurface::new(2, 2, vec![0xFF00_0000], "x", Rgba::WHITE);
        assert_eq!(surface.pixels().len(), 4);
        assert_eq!(surface.covered_pixels(), 1);
    }

    #[test]
    fn test_pixel_out_of_bounds_is_transparent() {
        let surface = OverlaySurface::new(1, 1, vec![0xFFFF_FFFF], "x", Rgba::WHITE);
        assert_eq!(surface.pixel(0, 0), 0xFFFF_FFFF);
        assert_eq!(surface.pixel(5, 0), 0);
    }
}
