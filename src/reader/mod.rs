mod navigation;
mod pager;
mod panel;
mod scheduler;
mod spread;

pub use pager::PagerView;
pub use panel::{
    END_CARD_SUBTITLE, END_CARD_TITLE, FitBox, LOAD_FAILED_TEXT, MIN_RENDER_SCALE, NO_PAGE_TEXT,
    PanelContent, PanelState, RenderPlan, SpreadLayout, SpreadPanels, SpreadView, fit_scale,
    measure_fit_box, plan_spread, render_panel, render_scale, render_spread,
};
pub use scheduler::{RenderPass, RenderScheduler};
pub use spread::{Spread, SpreadKind, partition};

use log::debug;

/// Tunables the reading session is parameterized on. Loaded from settings;
/// the defaults match the stock reader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReaderConfig {
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    /// Window width below which the layout collapses to one page per spread.
    pub single_page_breakpoint: f32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.4,
            zoom_max: 2.0,
            zoom_step: 0.1,
            single_page_breakpoint: 900.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Ltr => Direction::Rtl,
            Direction::Rtl => Direction::Ltr,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Ltr => "LTR",
            Direction::Rtl => "RTL",
        }
    }
}

/// One open document's reading state: the spread partition, the position in
/// it, zoom, reading direction, and the render scheduler. Created when a
/// document finishes loading and dropped when the reader closes or a new
/// document replaces it.
pub struct ReaderSession {
    config: ReaderConfig,
    total_pages: u32,
    single_page_mode: bool,
    direction: Direction,
    zoom: f32,
    spreads: Vec<Spread>,
    current_spread: usize,
    scheduler: RenderScheduler,
    load_failed: bool,
}

impl ReaderSession {
    pub fn new(
        total_pages: u32,
        direction: Direction,
        single_page_mode: bool,
        config: ReaderConfig,
    ) -> Self {
        let spreads = partition(total_pages, single_page_mode);
        debug!(
            "reader session: {total_pages} pages, {} spreads, direction {}",
            spreads.len(),
            direction.label()
        );
        Self {
            config,
            total_pages,
            single_page_mode,
            direction,
            zoom: 1.0,
            spreads,
            current_spread: 0,
            scheduler: RenderScheduler::new(),
            load_failed: false,
        }
    }

    /// Session standing in for a document that failed to open: one synthetic
    /// spread, no navigation until a new load replaces it.
    pub fn after_load_failure(direction: Direction, config: ReaderConfig) -> Self {
        Self {
            config,
            total_pages: 0,
            single_page_mode: false,
            direction,
            zoom: 1.0,
            spreads: vec![Spread::load_failed()],
            current_spread: 0,
            scheduler: RenderScheduler::new(),
            load_failed: true,
        }
    }

    pub fn is_load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn current_spread(&self) -> usize {
        self.current_spread
    }

    pub fn total_spreads(&self) -> usize {
        self.spreads.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn single_page_mode(&self) -> bool {
        self.single_page_mode
    }

    pub fn spreads(&self) -> &[Spread] {
        &self.spreads
    }

    pub fn spread_at(&self, index: usize) -> Option<&Spread> {
        self.spreads.get(index)
    }

    /// First concrete page of the current spread; absent on the end marker.
    pub fn anchor_page(&self) -> Option<u32> {
        self.spreads
            .get(self.current_spread)
            .and_then(Spread::first_page)
    }

    /// First spread containing `page`; falls back to the first spread when
    /// the page is absent or not found.
    pub fn spread_index_for_page(spreads: &[Spread], page: Option<u32>) -> usize {
        page.and_then(|p| spreads.iter().position(|spread| spread.contains(p)))
            .unwrap_or(0)
    }

    pub(crate) fn clamp_spread(&self, index: usize) -> usize {
        index.min(self.spreads.len().saturating_sub(1))
    }

    /// Recomputes the partition after a layout field changed, relocating
    /// `current_spread` to the spread holding `anchor`. The anchor must be
    /// captured before the triggering field was mutated.
    pub(crate) fn rebuild_spreads(&mut self, anchor: Option<u32>) {
        if self.load_failed {
            return;
        }
        self.spreads = partition(self.total_pages, self.single_page_mode);
        self.current_spread = self.clamp_spread(Self::spread_index_for_page(&self.spreads, anchor));
    }

    pub fn request_render(&mut self, index: usize) -> Option<RenderPass> {
        self.scheduler.request(index)
    }

    /// Reports the executing render finished (in success or failure) and
    /// returns the next pass if a newer request was coalesced meanwhile.
    pub fn complete_render(&mut self) -> Option<RenderPass> {
        self.scheduler.complete()
    }

    pub fn render_in_flight(&self) -> bool {
        self.scheduler.is_in_flight()
    }

    pub fn pending_spread(&self) -> Option<usize> {
        self.scheduler.pending_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(total_pages: u32) -> ReaderSession {
        ReaderSession::new(
            total_pages,
            Direction::Ltr,
            false,
            ReaderConfig::default(),
        )
    }

    #[test]
    fn anchor_is_first_concrete_page_of_current_spread() {
        let mut s = session(7);
        assert_eq!(s.anchor_page(), Some(1));

        let pass = s.go_next();
        assert!(pass.is_some());
        let _ = s.complete_render();
        assert_eq!(s.anchor_page(), Some(2));
    }

    #[test]
    fn anchor_is_absent_on_end_spread() {
        let mut s = session(1);
        let _ = s.go_next();
        assert_eq!(s.current_spread(), 1);
        assert_eq!(s.anchor_page(), None);
    }

    #[test]
    fn unknown_page_resolves_to_first_spread() {
        let spreads = partition(7, false);
        assert_eq!(ReaderSession::spread_index_for_page(&spreads, Some(99)), 0);
        assert_eq!(ReaderSession::spread_index_for_page(&spreads, None), 0);
        assert_eq!(ReaderSession::spread_index_for_page(&spreads, Some(5)), 2);
    }

    #[test]
    fn failed_session_has_single_spread_and_no_anchor() {
        let s = ReaderSession::after_load_failure(Direction::Rtl, ReaderConfig::default());
        assert!(s.is_load_failed());
        assert_eq!(s.total_spreads(), 1);
        assert_eq!(s.anchor_page(), None);
        assert_eq!(s.spreads()[0].kind, SpreadKind::LoadFailed);
    }
}
