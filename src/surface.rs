//! Drawing surface abstraction for panel rendering.
//!
//! A surface is a 2D raster target with settable pixel dimensions and a
//! settable device-to-logical transform: drawing coordinates are logical
//! units, multiplied by the transform to reach device pixels. Text cannot be
//! rasterized into terminal cells, so the pixel implementation keeps drawn
//! text as an overlay list for the presentation layer to place.

use image::RgbaImage;

pub type Rgba8 = [u8; 4];

pub trait DrawingSurface {
    /// Reallocates the backing raster. Resets previously drawn content.
    fn set_pixel_size(&mut self, width: u32, height: u32);

    fn pixel_size(&self) -> (u32, u32);

    /// Sets the horizontal/vertical logical-to-pixel scale.
    fn set_transform(&mut self, sx: f32, sy: f32);

    fn transform(&self) -> (f32, f32);

    /// Clears the raster and any text overlay.
    fn clear(&mut self);

    /// Fills a rectangle given in logical units.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba8);

    /// Draws a line of text centered at a logical position.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba8);

    /// Blits an already-scaled RGBA raster at the surface origin.
    fn put_raster(&mut self, rgba: &[u8], width: u32, height: u32);
}

/// A text item recorded by [`PixelSurface::draw_text`], in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Rgba8,
}

/// RGBA pixel buffer surface backing one reader panel.
#[derive(Debug)]
pub struct PixelSurface {
    pixels: RgbaImage,
    transform: Option<(f32, f32)>,
    texts: Vec<TextItem>,
}

impl Default for PixelSurface {
    fn default() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
            transform: None,
            texts: Vec::new(),
        }
    }
}

impl PixelSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn texts(&self) -> &[TextItem] {
        &self.texts
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }

    /// Copy of the raster for handing to the terminal image protocol.
    pub fn to_image(&self) -> image::DynamicImage {
        image::DynamicImage::ImageRgba8(self.pixels.clone())
    }

    fn scale(&self) -> (f32, f32) {
        self.transform.unwrap_or((1.0, 1.0))
    }
}

impl DrawingSurface for PixelSurface {
    fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
        self.texts.clear();
    }

    fn pixel_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn set_transform(&mut self, sx: f32, sy: f32) {
        self.transform = Some((sx, sy));
    }

    fn transform(&self) -> (f32, f32) {
        self.scale()
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = image::Rgba([0, 0, 0, 0]);
        }
        self.texts.clear();
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba8) {
        let (sx, sy) = self.scale();
        let (pw, ph) = self.pixels.dimensions();
        let x0 = ((x * sx).max(0.0) as u32).min(pw);
        let y0 = ((y * sy).max(0.0) as u32).min(ph);
        let x1 = (((x + width) * sx).max(0.0) as u32).min(pw);
        let y1 = (((y + height) * sy).max(0.0) as u32).min(ph);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels.put_pixel(px, py, image::Rgba(color));
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba8) {
        let (sx, sy) = self.scale();
        self.texts.push(TextItem {
            content: text.to_string(),
            x: x * sx,
            y: y * sy,
            size: size * sy,
            color,
        });
    }

    fn put_raster(&mut self, rgba: &[u8], width: u32, height: u32) {
        let (pw, ph) = self.pixels.dimensions();
        let copy_w = width.min(pw);
        let copy_h = height.min(ph);
        for py in 0..copy_h {
            for px in 0..copy_w {
                let idx = ((py * width + px) * 4) as usize;
                if idx + 3 < rgba.len() {
                    let pixel = [rgba[idx], rgba[idx + 1], rgba[idx + 2], rgba[idx + 3]];
                    self.pixels.put_pixel(px, py, image::Rgba(pixel));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_honors_transform() {
        let mut surface = PixelSurface::new();
        surface.set_pixel_size(10, 10);
        surface.set_transform(2.0, 2.0);
        surface.fill_rect(0.0, 0.0, 3.0, 2.0, [255, 0, 0, 255]);

        assert_eq!(surface.pixels().get_pixel(5, 3).0, [255, 0, 0, 255]);
        assert_eq!(surface.pixels().get_pixel(6, 3).0, [0, 0, 0, 0]);
        assert_eq!(surface.pixels().get_pixel(5, 4).0, [0, 0, 0, 0]);
    }

    #[test]
    fn draw_text_records_device_coordinates() {
        let mut surface = PixelSurface::new();
        surface.set_pixel_size(100, 100);
        surface.set_transform(0.5, 0.25);
        surface.draw_text("The End", 100.0, 40.0, 72.0, [0, 0, 0, 255]);

        let item = &surface.texts()[0];
        assert_eq!(item.x, 50.0);
        assert_eq!(item.y, 10.0);
        assert_eq!(item.size, 18.0);
    }

    #[test]
    fn set_pixel_size_resets_content() {
        let mut surface = PixelSurface::new();
        surface.set_pixel_size(4, 4);
        surface.draw_text("x", 0.0, 0.0, 1.0, [0, 0, 0, 255]);
        surface.set_pixel_size(8, 8);
        assert!(surface.texts().is_empty());
        assert_eq!(surface.pixel_size(), (8, 8));
    }
}
