//! Interactive raster paint canvas.
//!
//! Owns a fixed-size mutable pixel buffer and exposes point/line drawing
//! with a square brush footprint, clearing to a background color, and
//! lossless PNG export. Coordinates arrive normalized in [0,1]x[0,1] with
//! the origin at the bottom-left.

use bevy::prelude::*;
use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};

use crate::color::Rgba;
use crate::line;
use crate::raster::{PixelBuffer, RasterImage};
use crate::tool::ToolKind;

/// Default side length of the square brush footprint.
pub const DEFAULT_BRUSH_SIZE: usize = 1;

/// Mutable paint surface with brush state.
#[derive(Resource)]
pub struct RasterCanvas {
    pixels: PixelBuffer,
    background: Rgba,
    brush_color: Rgba,
    brush_size: usize,
}

impl RasterCanvas {
    /// Allocate a canvas of the given size, filled with `background`.
    ///
    /// The buffer dimensions are fixed for the canvas's lifetime.
    pub fn new(width: usize, height: usize, background: Rgba) -> Self {
        assert!(width > 0 && height > 0, "canvas dimensions must be positive");
        Self {
            pixels: PixelBuffer::new(width, height, background),
            background,
            brush_color: Rgba::BLACK,
            brush_size: DEFAULT_BRUSH_SIZE,
        }
    }

    /// Width of the pixel buffer.
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    /// Height of the pixel buffer.
    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    /// The configured background color.
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// The active brush color.
    pub fn brush_color(&self) -> Rgba {
        self.brush_color
    }

    /// Side length of the square brush footprint.
    pub fn brush_size(&self) -> usize {
        self.brush_size
    }

    /// Get the pixel at (x, y). Transparent black if out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels.get(x, y)
    }

    /// Set the active draw color for subsequent brush operations.
    ///
    /// Does not affect the eraser (which always draws the background color)
    /// or pixels already drawn.
    pub fn set_brush_color(&mut self, color: Rgba) {
        self.brush_color = color;
    }

    /// Set the brush footprint side length. Clamped to a minimum of 1.
    pub fn set_brush_size(&mut self, size: usize) {
        self.brush_size = size.max(1);
    }

    /// Reset every pixel to the background color. Idempotent.
    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    /// Draw one brush footprint at a normalized coordinate.
    ///
    /// The coordinate maps to pixel center `(floor(u*w), floor(v*h))`. The
    /// footprint start is `center - brush_size / 2` on each axis, so odd
    /// sizes are exactly centered and even sizes bias toward the lower
    /// left. Out-of-bounds cells are silently clipped.
    pub fn draw_point(&mut self, uv: Vec2, tool: ToolKind) {
        let (cx, cy) = self.pixel_coord(uv);
        let color = self.effective_color(tool);
        self.stamp(cx, cy, color);
    }

    /// Draw a Bresenham line between two normalized coordinates, stamping
    /// the brush footprint at every step including both endpoints.
    ///
    /// When start equals end exactly one footprint is drawn.
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, tool: ToolKind) {
        let (x0, y0) = self.pixel_coord(start);
        let (x1, y1) = self.pixel_coord(end);
        let color = self.effective_color(tool);
        line::walk(x0, y0, x1, y1, |x, y| self.stamp(x, y, color));
    }

    /// Snapshot the current buffer into an immutable image.
    pub fn snapshot(&self) -> RasterImage {
        RasterImage::from_buffer(&self.pixels)
    }

    /// Encode the current buffer as PNG bytes (lossless RGBA, exact pixel
    /// round-trip including alpha).
    pub fn export_png(&self) -> io::Result<Vec<u8>> {
        use image::codecs::png::PngEncoder;
        use image::ImageEncoder;

        let (width, height) = (self.width(), self.height());
        // PNG rows run top-down; the buffer's row 0 is the bottom.
        let mut raw = Vec::with_capacity(width * height * 4);
        for row in 0..height {
            let y = height - 1 - row;
            for x in 0..width {
                raw.extend_from_slice(&self.pixels.get(x, y).to_array());
            }
        }

        let mut png_bytes = Vec::new();
        let encoder = PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                &raw,
                width as u32,
                height as u32,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        Ok(png_bytes)
    }

    /// Write the buffer as `PaintedTexture_<YYYY-MM-DD_HH-mm-ss>.png` into
    /// `dir`, creating the directory if absent. Returns the written path.
    pub fn save_timestamped(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let name = format!(
            "PaintedTexture_{}.png",
            Local::now().format("%Y-%m-%d_%H-%M-%S")
        );
        let path = dir.join(name);
        std::fs::write(&path, self.export_png()?)?;
        info!("saved painted texture to {}", path.display());
        Ok(path)
    }

    /// The color a tool actually writes: the eraser always writes the
    /// background, everything else writes the brush color.
    fn effective_color(&self, tool: ToolKind) -> Rgba {
        match tool {
            ToolKind::Eraser => self.background,
            ToolKind::Brush | ToolKind::Line => self.brush_color,
        }
    }

    fn pixel_coord(&self, uv: Vec2) -> (i32, i32) {
        (
            (uv.x * self.width() as f32).floor() as i32,
            (uv.y * self.height() as f32).floor() as i32,
        )
    }

    /// Write one square brush footprint centered on a pixel coordinate.
    fn stamp(&mut self, center_x: i32, center_y: i32, color: Rgba) {
        let half = (self.brush_size / 2) as i32;
        let start_x = center_x - half;
        let start_y = center_y - half;
        for dy in 0..self.brush_size as i32 {
            for dx in 0..self.brush_size as i32 {
                let (px, py) = (start_x + dx, start_y + dy);
                if px >= 0 && py >= 0 {
                    self.pixels.set(px as usize, py as usize, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colored_pixels(canvas: &RasterCanvas, color: Rgba) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.pixel(x, y) == color {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_initialized_to_background() {
        let canvas = RasterCanvas::new(8, 8, Rgba::WHITE);
        assert_eq!(canvas.pixel(0, 0), Rgba::WHITE);
        assert_eq!(canvas.pixel(7, 7), Rgba::WHITE);
    }

    #[test]
    fn test_size_one_brush_colors_one_pixel() {
        let mut canvas = RasterCanvas::new(8, 8, Rgba::WHITE);
        canvas.set_brush_color(Rgba::BLACK);
        // (0.5, 0.5) on an 8x8 buffer lands on pixel (4, 4)
        canvas.draw_point(Vec2::new(0.5, 0.5), ToolKind::Brush);
        assert_eq!(colored_pixels(&canvas, Rgba::BLACK), vec![(4, 4)]);
    }

    #[test]
    fn test_odd_brush_footprint_centered() {
        let mut canvas = RasterCanvas::new(9, 9, Rgba::WHITE);
        canvas.set_brush_color(Rgba::BLACK);
        canvas.set_brush_size(3);
        canvas.draw_point(Vec2::new(0.5, 0.5), ToolKind::Brush); // center (4, 4)
        let painted = colored_pixels(&canvas, Rgba::BLACK);
        assert_eq!(painted.len(), 9);
        assert!(painted.contains(&(3, 3)));
        assert!(painted.contains(&(5, 5)));
        assert!(!painted.contains(&(2, 4)));
    }

    #[test]
    fn test_even_brush_biased_lower_left() {
        let mut canvas = RasterCanvas::new(8, 8, Rgba::WHITE);
        canvas.set_brush_color(Rgba::BLACK);
        canvas.set_brush_size(2);
        canvas.draw_point(Vec2::new(0.5, 0.5), ToolKind::Brush); // center (4, 4)
        let painted = colored_pixels(&canvas, Rgba::BLACK);
        assert_eq!(painted, vec![(3, 3), (4, 3), (3, 4), (4, 4)]);
    }

    #[test]
    fn test_footprint_clipped_at_corner() {
        let mut canvas = RasterCanvas::new(8, 8, Rgba::WHITE);
        canvas.set_brush_color(Rgba::BLACK);
        canvas.set_brush_size(3);
        canvas.draw_point(Vec2::new(0.0, 0.0), ToolKind::Brush); // center (0, 0)
        let painted = colored_pixels(&canvas, Rgba::BLACK);
        assert_eq!(painted, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_eraser_writes_background() {
        let mut canvas = RasterCanvas::new(8, 8, Rgba::WHITE);
        canvas.set_brush_color(Rgba::BLACK);
        canvas.draw_point(Vec2::new(0.5, 0.5), ToolKind::Brush);
        canvas.draw_point(Vec2::new(0.5, 0.5), ToolKind::Eraser);
        assert!(colored_pixels(&canvas, Rgba::BLACK).is_empty());
        assert_eq!(canvas.pixel(4, 4), Rgba::WHITE);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut canvas = RasterCanvas::new(4, 4, Rgba::WHITE);
        canvas.set_brush_color(Rgba::BLACK);
        canvas.draw_point(Vec2::new(0.2, 0.2), ToolKind::Brush);
        canvas.clear();
        assert!(colored_pixels(&canvas, Rgba::BLACK).is_empty());
        canvas.clear();
        assert!(colored_pixels(&canvas, Rgba::WHITE).len() == 16);
    }

    #[test]
    fn test_diagonal_line_connected() {
        let mut canvas = RasterCanvas::new(10, 10, Rgba::WHITE);
        canvas.set_brush_color(Rgba::BLACK);
        canvas.draw_line(Vec2::ZERO, Vec2::ONE, ToolKind::Line);
        let painted = colored_pixels(&canvas, Rgba::BLACK);
        // (1.0, 1.0) maps to the clipped corner just past (9, 9); the
        // in-bounds path is the exact diagonal.
        assert_eq!(painted.len(), 10);
        for i in 0..10 {
            assert!(painted.contains(&(i, i)));
        }
    }

    #[test]
    fn test_degenerate_line_equals_point() {
        let mut a = RasterCanvas::new(8, 8, Rgba::WHITE);
        let mut b = RasterCanvas::new(8, 8, Rgba::WHITE);
        a.set_brush_color(Rgba::BLACK);
        b.set_brush_color(Rgba::BLACK);
        let p = Vec2::new(0.3, 0.6);
        a.draw_line(p, p, ToolKind::Line);
        b.draw_point(p, ToolKind::Brush);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(a.pixel(x, y), b.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_png_round_trip() {
        use crate::raster::RasterImage;

        let mut canvas = RasterCanvas::new(5, 3, Rgba::new(0, 0, 0, 0));
        canvas.set_brush_color(Rgba::new(255, 10, 20, 200));
        canvas.draw_point(Vec2::new(0.1, 0.1), ToolKind::Brush);
        canvas.draw_point(Vec2::new(0.9, 0.9), ToolKind::Brush);

        let bytes = canvas.export_png().unwrap();
        let decoded = RasterImage::from_png_bytes(&bytes).unwrap();
        assert_eq!(decoded.width(), 5);
        assert_eq!(decoded.height(), 3);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(decoded.get(x, y), canvas.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_save_timestamped_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("SavedImages");
        let canvas = RasterCanvas::new(4, 4, Rgba::WHITE);

        let path = canvas.save_timestamped(&target).unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("PaintedTexture_"));
        assert!(name.ends_with(".png"));

        let bytes = std::fs::read(&path).unwrap();
        let decoded = crate::raster::RasterImage::from_png_bytes(&bytes).unwrap();
        assert_eq!(decoded.get(0, 0), Rgba::WHITE);
    }
}
