//! CBZ document source: a zip archive of page images, pages ordered by
//! entry name.

use std::fs::File;
use std::io::{BufReader, Read};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use fast_image_resize as fr;
use log::debug;
use zip::ZipArchive;

use crate::document::{DocumentHandle, DocumentSource, PageHandle};
use crate::errors::{LoadError, PageError, RenderError};
use crate::surface::DrawingSurface;

const PAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

fn is_page_entry(name: &str) -> bool {
    if name.starts_with("__MACOSX") {
        return false;
    }
    let file_name = name.rsplit('/').next().unwrap_or(name);
    if file_name.starts_with('.') {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Opens CBZ archives, resolving relative locators against a base directory
/// (normally the catalog file's directory).
pub struct CbzSource {
    base_dir: PathBuf,
}

impl CbzSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl DocumentSource for CbzSource {
    type Handle = CbzDocument;

    fn open(&self, locator: &str) -> Result<CbzDocument, LoadError> {
        CbzDocument::open(&self.base_dir.join(locator))
    }
}

#[derive(Debug)]
pub struct CbzDocument {
    archive: ZipArchive<BufReader<File>>,
    page_names: Vec<String>,
}

impl CbzDocument {
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| LoadError::Archive(e.to_string()))?;

        let mut page_names = Vec::new();
        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| LoadError::Archive(e.to_string()))?;
            if entry.is_file() && is_page_entry(entry.name()) {
                page_names.push(entry.name().to_string());
            }
        }
        page_names.sort();

        if page_names.is_empty() {
            return Err(LoadError::NoPages);
        }
        debug!(
            "opened {} with {} pages",
            path.display(),
            page_names.len()
        );

        Ok(Self {
            archive,
            page_names,
        })
    }
}

impl DocumentHandle for CbzDocument {
    type Page = CbzPage;

    fn page_count(&self) -> u32 {
        self.page_names.len() as u32
    }

    fn page(&mut self, number: u32) -> Result<CbzPage, PageError> {
        let total = self.page_count();
        if number < 1 || number > total {
            return Err(PageError::OutOfRange {
                page: number,
                total,
            });
        }

        let name = self.page_names[(number - 1) as usize].clone();
        let mut entry = self
            .archive
            .by_name(&name)
            .map_err(|e| PageError::Unreadable {
                page: number,
                reason: e.to_string(),
            })?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| PageError::Unreadable {
                page: number,
                reason: e.to_string(),
            })?;

        // Dimensions come from the header bytes; the full decode waits until
        // the page is actually drawn.
        let dims = imagesize::blob_size(&data).map_err(|e| PageError::BadDimensions {
            page: number,
            reason: e.to_string(),
        })?;

        Ok(CbzPage {
            number,
            data,
            width: dims.width as u32,
            height: dims.height as u32,
        })
    }
}

pub struct CbzPage {
    number: u32,
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PageHandle for CbzPage {
    fn natural_size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    fn render_into(&self, surface: &mut dyn DrawingSurface, scale: f32) -> Result<(), RenderError> {
        let decoded = image::load_from_memory(&self.data).map_err(|e| RenderError::Decode {
            page: self.number,
            reason: e.to_string(),
        })?;
        let rgba = decoded.to_rgba8();

        let (sx, sy) = surface.transform();
        let target_w = (((self.width as f32) * scale * sx).floor() as u32).max(1);
        let target_h = (((self.height as f32) * scale * sy).floor() as u32).max(1);

        let raster = resample(rgba, target_w, target_h)?;
        surface.put_raster(&raster, target_w, target_h);
        Ok(())
    }
}

fn nonzero(value: u32) -> Result<NonZeroU32, RenderError> {
    NonZeroU32::new(value).ok_or_else(|| RenderError::Scale("zero-sized raster".to_string()))
}

fn resample(src: image::RgbaImage, dst_w: u32, dst_h: u32) -> Result<Vec<u8>, RenderError> {
    let (src_w, src_h) = src.dimensions();
    if (src_w, src_h) == (dst_w, dst_h) {
        return Ok(src.into_raw());
    }

    let src_image = fr::Image::from_vec_u8(
        nonzero(src_w)?,
        nonzero(src_h)?,
        src.into_raw(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| RenderError::Scale(e.to_string()))?;
    let mut dst_image = fr::Image::new(nonzero(dst_w)?, nonzero(dst_h)?, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new(fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| RenderError::Scale(e.to_string()))?;

    Ok(dst_image.buffer().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_entry_filter_accepts_images_only() {
        assert!(is_page_entry("chapter1/page_001.png"));
        assert!(is_page_entry("PAGE_002.JPG"));
        assert!(!is_page_entry("ComicInfo.xml"));
        assert!(!is_page_entry("__MACOSX/page_001.png"));
        assert!(!is_page_entry("chapter1/.hidden.png"));
        assert!(!is_page_entry("cover"));
    }
}
