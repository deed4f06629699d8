//! Shared fakes for unit and integration tests. Compiled only for tests or
//! with the `test-utils` feature, mirroring how the dev-dependency on this
//! crate re-enables them from `tests/`.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use crate::document::{DocumentHandle, PageHandle};
use crate::errors::{PageError, RenderError};
use crate::surface::{DrawingSurface, Rgba8};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCall {
    pub page: u32,
    pub scale: f32,
}

/// Scripted document: fixed page sizes, optional per-page failures, and a
/// log of every draw that reached a surface.
pub struct FakeDocument {
    pages: Vec<(f32, f32)>,
    failing_fetch: HashSet<u32>,
    failing_render: HashSet<u32>,
    render_log: Rc<RefCell<Vec<RenderCall>>>,
}

impl FakeDocument {
    pub fn with_pages(sizes: &[(f32, f32)]) -> Self {
        Self {
            pages: sizes.to_vec(),
            failing_fetch: HashSet::new(),
            failing_render: HashSet::new(),
            render_log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Makes fetching `page` fail with a `PageError`.
    pub fn fail_page(&mut self, page: u32) {
        self.failing_fetch.insert(page);
    }

    /// Makes drawing `page` fail with a `RenderError` after a successful fetch.
    pub fn fail_render(&mut self, page: u32) {
        self.failing_render.insert(page);
    }

    pub fn render_log(&self) -> Vec<RenderCall> {
        self.render_log.borrow().clone()
    }
}

impl DocumentHandle for FakeDocument {
    type Page = FakePage;

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&mut self, number: u32) -> Result<FakePage, PageError> {
        let total = self.page_count();
        if number < 1 || number > total {
            return Err(PageError::OutOfRange {
                page: number,
                total,
            });
        }
        if self.failing_fetch.contains(&number) {
            return Err(PageError::Unreadable {
                page: number,
                reason: "scripted fetch failure".to_string(),
            });
        }
        Ok(FakePage {
            number,
            size: self.pages[(number - 1) as usize],
            fail_render: self.failing_render.contains(&number),
            log: Rc::clone(&self.render_log),
        })
    }
}

pub struct FakePage {
    number: u32,
    size: (f32, f32),
    fail_render: bool,
    log: Rc<RefCell<Vec<RenderCall>>>,
}

impl PageHandle for FakePage {
    fn natural_size(&self) -> (f32, f32) {
        self.size
    }

    fn render_into(&self, surface: &mut dyn DrawingSurface, scale: f32) -> Result<(), RenderError> {
        if self.fail_render {
            return Err(RenderError::Decode {
                page: self.number,
                reason: "scripted render failure".to_string(),
            });
        }
        let (sx, sy) = surface.transform();
        let width = ((self.size.0 * scale * sx) as u32).max(1);
        let height = ((self.size.1 * scale * sy) as u32).max(1);
        let raster = vec![0xffu8; (width * height * 4) as usize];
        surface.put_raster(&raster, width, height);
        self.log.borrow_mut().push(RenderCall {
            page: self.number,
            scale,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear,
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba8,
    },
    Text {
        content: String,
        x: f32,
        y: f32,
        size: f32,
        color: Rgba8,
    },
    Raster {
        width: u32,
        height: u32,
    },
}

/// Surface that records every call instead of rasterizing.
#[derive(Debug)]
pub struct RecordingSurface {
    pub pixel_size: (u32, u32),
    pub transform: (f32, f32),
    pub ops: Vec<SurfaceOp>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            pixel_size: (0, 0),
            transform: (1.0, 1.0),
            ops: Vec::new(),
        }
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.pixel_size = (width, height);
        self.ops.clear();
    }

    fn pixel_size(&self) -> (u32, u32) {
        self.pixel_size
    }

    fn set_transform(&mut self, sx: f32, sy: f32) {
        self.transform = (sx, sy);
    }

    fn transform(&self) -> (f32, f32) {
        self.transform
    }

    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba8) {
        self.ops.push(SurfaceOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba8) {
        self.ops.push(SurfaceOp::Text {
            content: text.to_string(),
            x,
            y,
            size,
            color,
        });
    }

    fn put_raster(&mut self, _rgba: &[u8], width: u32, height: u32) {
        self.ops.push(SurfaceOp::Raster { width, height });
    }
}

/// Writes a CBZ archive of solid-color PNG pages with the given dimensions.
pub fn write_cbz_fixture(path: &Path, pages: &[(u32, u32)]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();

    for (index, (width, height)) in pages.iter().enumerate() {
        let image = image::RgbaImage::from_pixel(
            *width,
            *height,
            image::Rgba([40, 40, 80, 255]),
        );
        let mut encoded = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut encoded, image::ImageFormat::Png)
            .map_err(std::io::Error::other)?;

        writer
            .start_file(format!("page_{:03}.png", index + 1), options)
            .map_err(std::io::Error::other)?;
        writer.write_all(encoded.get_ref())?;
    }

    writer.finish().map_err(std::io::Error::other)?;
    Ok(())
}
