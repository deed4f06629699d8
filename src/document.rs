//! Document collaborator interfaces.
//!
//! The reader core never names a concrete format; it drives these traits.
//! Page numbers are 1-based, matching what the pager shows the user.

use crate::errors::{LoadError, PageError, RenderError};
use crate::surface::DrawingSurface;

pub trait DocumentSource {
    type Handle: DocumentHandle;

    fn open(&self, locator: &str) -> Result<Self::Handle, LoadError>;
}

pub trait DocumentHandle {
    type Page: PageHandle;

    fn page_count(&self) -> u32;

    fn page(&mut self, number: u32) -> Result<Self::Page, PageError>;
}

pub trait PageHandle {
    /// Natural (unscaled) page dimensions in logical units.
    fn natural_size(&self) -> (f32, f32);

    /// Draws the page into `surface` at the given scale. The surface's
    /// transform has already been set; implementations multiply by it to
    /// reach device pixels.
    fn render_into(&self, surface: &mut dyn DrawingSurface, scale: f32) -> Result<(), RenderError>;
}
