//! Pixel grids: the mutable `PixelBuffer` and the immutable `RasterImage`.
//!
//! Both store pixels row-major with the origin at the bottom-left, matching
//! the normalized texture-coordinate space used by the canvas. PNG stores
//! rows top-down, so encode/decode flip rows at the boundary.

use crate::color::Rgba;

/// A mutable width x height grid of colors.
///
/// Created once at a fixed size and mutated in place; never resized.
#[derive(Clone)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    /// Flat pixel data, row-major, row 0 at the bottom.
    data: Vec<Rgba>,
}

impl PixelBuffer {
    /// Create a new buffer filled with the given color.
    pub fn new(width: usize, height: usize, fill: Rgba) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Set the pixel at (x, y).
    ///
    /// Does nothing if coordinates are out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = color;
        }
    }

    /// Get the pixel at (x, y).
    ///
    /// Returns transparent black if out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            Rgba::TRANSPARENT
        }
    }

    /// Fill the entire buffer with a color.
    pub fn fill(&mut self, color: Rgba) {
        self.data.fill(color);
    }

    /// All pixels, row-major from the bottom row up.
    pub fn pixels(&self) -> &[Rgba] {
        &self.data
    }
}

/// An immutable width x height grid of colors.
///
/// A finished layer source: either a snapshot of a `PixelBuffer` or a
/// decoded PNG. Dimensions are fixed at creation.
#[derive(Clone, Debug)]
pub struct RasterImage {
    width: usize,
    height: usize,
    data: Vec<Rgba>,
}

impl RasterImage {
    /// Create an image from raw pixels (row-major, bottom row first).
    ///
    /// `pixels` length must be `width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgba>) -> Self {
        assert_eq!(pixels.len(), width * height, "pixel count mismatch");
        Self {
            width,
            height,
            data: pixels,
        }
    }

    /// Snapshot a pixel buffer into an immutable image.
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
            data: buffer.pixels().to_vec(),
        }
    }

    /// Decode a PNG byte stream.
    ///
    /// PNG rows are stored top-down; they are flipped into the bottom-left
    /// origin convention here.
    pub fn from_png_bytes(bytes: &[u8]) -> image::ImageResult<Self> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = (decoded.width() as usize, decoded.height() as usize);
        let mut data = vec![Rgba::TRANSPARENT; width * height];
        for y in 0..height {
            let src_y = height - 1 - y;
            for x in 0..width {
                data[y * width + x] = Rgba::from(decoded.get_pixel(x as u32, src_y as u32).0);
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Load a PNG file from disk.
    pub fn load_png<P: AsRef<std::path::Path>>(path: P) -> image::ImageResult<Self> {
        let bytes = std::fs::read(path).map_err(image::ImageError::IoError)?;
        Self::from_png_bytes(&bytes)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Get the pixel at (x, y).
    ///
    /// Returns transparent black if out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            Rgba::TRANSPARENT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buf = PixelBuffer::new(4, 3, Rgba::WHITE);
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 3);
        assert!(buf.pixels().iter().all(|&p| p == Rgba::WHITE));
    }

    #[test]
    fn test_set_get() {
        let mut buf = PixelBuffer::new(4, 4, Rgba::TRANSPARENT);
        buf.set(1, 2, Rgba::BLACK);
        assert_eq!(buf.get(1, 2), Rgba::BLACK);
        assert_eq!(buf.get(0, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buf = PixelBuffer::new(4, 4, Rgba::WHITE);
        buf.set(10, 10, Rgba::BLACK); // silently clipped
        assert_eq!(buf.get(10, 10), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_fill() {
        let mut buf = PixelBuffer::new(2, 2, Rgba::WHITE);
        buf.fill(Rgba::BLACK);
        assert!(buf.pixels().iter().all(|&p| p == Rgba::BLACK));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut buf = PixelBuffer::new(2, 2, Rgba::WHITE);
        let image = RasterImage::from_buffer(&buf);
        buf.set(0, 0, Rgba::BLACK);
        assert_eq!(image.get(0, 0), Rgba::WHITE);
        assert_eq!(buf.get(0, 0), Rgba::BLACK);
    }

    #[test]
    #[should_panic(expected = "pixel count mismatch")]
    fn test_from_pixels_length_checked() {
        RasterImage::from_pixels(2, 2, vec![Rgba::WHITE; 3]);
    }
}
