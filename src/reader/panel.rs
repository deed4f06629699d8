//! Panel rendering: fit math, left/right page placement, and the
//! end-of-content card.

use log::trace;

use crate::document::{DocumentHandle, PageHandle};
use crate::errors::RenderError;
use crate::surface::{DrawingSurface, Rgba8};
use crate::viewport::ViewportMetrics;

use super::{Direction, Spread, SpreadKind};

/// Floor for the final render scale; keeps a degenerate fit box from
/// producing a zero or negative raster.
pub const MIN_RENDER_SCALE: f32 = 0.01;

const STAGE_PADDING_X: f32 = 16.0;
const STAGE_PADDING_Y: f32 = 16.0;

/// Design box of the end-of-content card; scaled like page content.
pub const END_CARD_WIDTH: f32 = 900.0;
pub const END_CARD_HEIGHT: f32 = 1300.0;
pub const END_CARD_TITLE: &str = "To Be Continued...";
pub const END_CARD_SUBTITLE: &str = "Continue reading in Volume 2";

const END_CARD_BG: Rgba8 = [0xdb, 0xd6, 0xde, 0xff];
const END_CARD_TITLE_COLOR: Rgba8 = [0x4e, 0x1a, 0x8a, 0xff];
const END_CARD_SUBTITLE_COLOR: Rgba8 = [0x7f, 0x2b, 0xff, 0xff];

pub const NO_PAGE_TEXT: &str = "No page";
pub const LOAD_FAILED_TEXT: &str = "Document could not be loaded.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelContent {
    Page(u32),
    Absent,
    EndCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadLayout {
    Single,
    Double,
}

/// What ended up in a panel after a render, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    /// Panel is not part of the current spread at all.
    Hidden,
    /// Panel shows a textual fallback instead of raster content.
    Placeholder(&'static str),
    /// Panel holds rendered content at the given logical size.
    Content { width: u32, height: u32 },
}

/// Per-panel space available for fitting, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBox {
    pub width: f32,
    pub height: f32,
}

/// Which content goes into which physical panel for one spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPlan {
    pub layout: SpreadLayout,
    pub left: PanelContent,
    pub right: PanelContent,
}

/// The two drawing surfaces of the spread stage.
#[derive(Debug, Default)]
pub struct SpreadPanels<S> {
    pub left: S,
    pub right: S,
}

/// Result of rendering one spread, mirroring the plan panel by panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadView {
    pub layout: SpreadLayout,
    pub left: PanelState,
    pub right: PanelState,
}

/// Decides left/right placement for a spread under a reading direction.
/// Under RTL the higher-numbered page of a pair is drawn on the left.
pub fn plan_spread(spread: &Spread, direction: Direction) -> RenderPlan {
    match spread.kind {
        SpreadKind::End => RenderPlan {
            layout: SpreadLayout::Single,
            left: PanelContent::EndCard,
            right: PanelContent::Absent,
        },
        SpreadKind::LoadFailed => RenderPlan {
            layout: SpreadLayout::Single,
            left: PanelContent::Absent,
            right: PanelContent::Absent,
        },
        SpreadKind::Cover => RenderPlan {
            layout: SpreadLayout::Single,
            left: spread
                .first_page()
                .map_or(PanelContent::Absent, PanelContent::Page),
            right: PanelContent::Absent,
        },
        SpreadKind::Pair => match (spread.first_page(), spread.second_page()) {
            (Some(first), Some(second)) => {
                let (left, right) = match direction {
                    Direction::Ltr => (first, second),
                    Direction::Rtl => (second, first),
                };
                RenderPlan {
                    layout: SpreadLayout::Double,
                    left: PanelContent::Page(left),
                    right: PanelContent::Page(right),
                }
            }
            (Some(first), None) => RenderPlan {
                layout: SpreadLayout::Single,
                left: PanelContent::Page(first),
                right: PanelContent::Absent,
            },
            _ => RenderPlan {
                layout: SpreadLayout::Single,
                left: PanelContent::Absent,
                right: PanelContent::Absent,
            },
        },
    }
}

/// Measures the space one panel may occupy.
///
/// Takes the larger of the measured stage size and the size derived from the
/// window minus chrome: right after a layout change the stage measurement
/// can still report the pre-change size and would under-fit the page.
pub fn measure_fit_box<V: ViewportMetrics>(viewport: &V, layout: SpreadLayout) -> FitBox {
    let (stage_w, stage_h) = viewport.stage_size();
    let stage_inner_w = (stage_w - STAGE_PADDING_X).max(1.0);
    let stage_inner_h = (stage_h - STAGE_PADDING_Y).max(1.0);

    let (window_w, window_h) = viewport.window_size();
    let (top_bar, pager) = viewport.chrome_heights();
    let window_inner_w = (window_w - STAGE_PADDING_X).max(1.0);
    let window_inner_h = (window_h - top_bar - pager - STAGE_PADDING_Y).max(1.0);

    let inner_w = stage_inner_w.max(window_inner_w);
    let inner_h = stage_inner_h.max(window_inner_h);

    let width = match layout {
        SpreadLayout::Single => inner_w,
        SpreadLayout::Double => ((inner_w - viewport.panel_gap()) / 2.0).max(1.0),
    };

    FitBox {
        width,
        height: inner_h,
    }
}

/// Scale at which content of the given natural size exactly fits the box.
pub fn fit_scale(fit: FitBox, natural_width: f32, natural_height: f32) -> f32 {
    (fit.width / natural_width).min(fit.height / natural_height)
}

/// Final render scale: fit, then user zoom, floored at [`MIN_RENDER_SCALE`].
pub fn render_scale(fit: FitBox, natural_width: f32, natural_height: f32, zoom: f32) -> f32 {
    (fit_scale(fit, natural_width, natural_height) * zoom).max(MIN_RENDER_SCALE)
}

/// Renders one panel's content into its surface.
pub fn render_panel<D, S>(
    document: &mut D,
    surface: &mut S,
    content: PanelContent,
    fit: FitBox,
    zoom: f32,
    device_pixel_ratio: f32,
) -> Result<PanelState, RenderError>
where
    D: DocumentHandle,
    S: DrawingSurface,
{
    match content {
        PanelContent::Absent => {
            surface.set_pixel_size(0, 0);
            Ok(PanelState::Placeholder(NO_PAGE_TEXT))
        }
        PanelContent::EndCard => Ok(render_end_card(surface, fit, zoom, device_pixel_ratio)),
        PanelContent::Page(number) => {
            let page = document.page(number)?;
            let (natural_w, natural_h) = page.natural_size();
            let scale = render_scale(fit, natural_w, natural_h, zoom);
            let logical_w = (natural_w * scale).floor().max(1.0);
            let logical_h = (natural_h * scale).floor().max(1.0);
            trace!(
                "panel render: page {number} natural {natural_w}x{natural_h} scale {scale:.3}"
            );

            surface.set_pixel_size(
                (logical_w * device_pixel_ratio).floor() as u32,
                (logical_h * device_pixel_ratio).floor() as u32,
            );
            surface.set_transform(device_pixel_ratio, device_pixel_ratio);
            surface.clear();
            page.render_into(surface, scale)?;

            Ok(PanelState::Content {
                width: logical_w as u32,
                height: logical_h as u32,
            })
        }
    }
}

/// Draws the fixed-aspect end-of-content card, scaled by the same
/// fit-then-zoom rule as page content.
fn render_end_card<S: DrawingSurface>(
    surface: &mut S,
    fit: FitBox,
    zoom: f32,
    device_pixel_ratio: f32,
) -> PanelState {
    let card_fit = fit_scale(fit, END_CARD_WIDTH, END_CARD_HEIGHT);
    let display_w = (END_CARD_WIDTH * card_fit * zoom).floor().max(1.0);
    let display_h = (END_CARD_HEIGHT * card_fit * zoom).floor().max(1.0);

    surface.set_pixel_size(
        (display_w * device_pixel_ratio).floor() as u32,
        (display_h * device_pixel_ratio).floor() as u32,
    );
    surface.set_transform(
        device_pixel_ratio * display_w / END_CARD_WIDTH,
        device_pixel_ratio * display_h / END_CARD_HEIGHT,
    );
    surface.clear();
    surface.fill_rect(0.0, 0.0, END_CARD_WIDTH, END_CARD_HEIGHT, END_CARD_BG);
    surface.draw_text(
        END_CARD_TITLE,
        END_CARD_WIDTH / 2.0,
        END_CARD_HEIGHT / 2.0 - 40.0,
        72.0,
        END_CARD_TITLE_COLOR,
    );
    surface.draw_text(
        END_CARD_SUBTITLE,
        END_CARD_WIDTH / 2.0,
        END_CARD_HEIGHT / 2.0 + 70.0,
        36.0,
        END_CARD_SUBTITLE_COLOR,
    );

    PanelState::Content {
        width: display_w as u32,
        height: display_h as u32,
    }
}

/// Renders a whole spread into the two panel surfaces.
///
/// Any page fetch or draw failure aborts the spread and propagates; the
/// caller surfaces it and still reports completion to the scheduler so the
/// trampoline keeps draining.
pub fn render_spread<D, S, V>(
    document: &mut D,
    panels: &mut SpreadPanels<S>,
    viewport: &V,
    spread: &Spread,
    direction: Direction,
    zoom: f32,
) -> Result<SpreadView, RenderError>
where
    D: DocumentHandle,
    S: DrawingSurface,
    V: ViewportMetrics,
{
    let plan = plan_spread(spread, direction);
    let fit = measure_fit_box(viewport, plan.layout);
    let dpr = viewport.device_pixel_ratio();

    let left = render_panel(document, &mut panels.left, plan.left, fit, zoom, dpr)?;
    let right = match plan.layout {
        SpreadLayout::Double => render_panel(document, &mut panels.right, plan.right, fit, zoom, dpr)?,
        SpreadLayout::Single => {
            panels.right.set_pixel_size(0, 0);
            PanelState::Hidden
        }
    };

    Ok(SpreadView {
        layout: plan.layout,
        left,
        right,
    })
}
