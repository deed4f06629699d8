//! Viewport measurement collaborator.
//!
//! The core polls these accessors; it never touches the UI tree. All values
//! are logical pixels (terminal hosts convert cells via the font size).

pub trait ViewportMetrics {
    /// Full window dimensions.
    fn window_size(&self) -> (f32, f32);

    /// Measured size of the stage container holding the spread. Can lag the
    /// window size before layout settles.
    fn stage_size(&self) -> (f32, f32);

    /// Heights of the chrome above and below the stage: (top bar, pager).
    fn chrome_heights(&self) -> (f32, f32);

    /// Horizontal gap between the two panels of a double spread.
    fn panel_gap(&self) -> f32;

    fn device_pixel_ratio(&self) -> f32;
}

/// Plain-value metrics, refreshed by the host before each render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedViewport {
    pub window: (f32, f32),
    pub stage: (f32, f32),
    pub top_bar_height: f32,
    pub pager_height: f32,
    pub panel_gap: f32,
    pub device_pixel_ratio: f32,
}

impl Default for FixedViewport {
    fn default() -> Self {
        Self {
            window: (1280.0, 800.0),
            stage: (1280.0, 720.0),
            top_bar_height: 48.0,
            pager_height: 32.0,
            panel_gap: 16.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl ViewportMetrics for FixedViewport {
    fn window_size(&self) -> (f32, f32) {
        self.window
    }

    fn stage_size(&self) -> (f32, f32) {
        self.stage
    }

    fn chrome_heights(&self) -> (f32, f32) {
        (self.top_bar_height, self.pager_height)
    }

    fn panel_gap(&self) -> f32 {
        self.panel_gap
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }
}
