//! Navigation intents: spread movement, zoom, direction, viewport changes.
//!
//! Every operation that changes visible content issues exactly one render
//! request through the scheduler and returns the admitted pass (or `None`
//! when the intent was a no-op or the request was coalesced behind an
//! executing render). The caller executes returned passes and reports back
//! via [`ReaderSession::complete_render`].

use log::debug;

use super::{Direction, ReaderSession, scheduler::RenderPass};

impl ReaderSession {
    /// Advances one spread. No-op at the last spread: the index is left
    /// unchanged and no render is requested.
    pub fn go_next(&mut self) -> Option<RenderPass> {
        let next = self.clamp_spread(self.current_spread().saturating_add(1));
        self.move_to(next)
    }

    /// Goes back one spread. No-op at the first spread.
    pub fn go_prev(&mut self) -> Option<RenderPass> {
        let prev = self.current_spread().saturating_sub(1);
        self.move_to(prev)
    }

    fn move_to(&mut self, index: usize) -> Option<RenderPass> {
        if index == self.current_spread {
            return None;
        }
        self.current_spread = index;
        self.request_render(index)
    }

    /// Physical left button/key. Which way it pages depends on the reading
    /// direction: in RTL the story advances leftwards.
    pub fn press_left(&mut self) -> Option<RenderPass> {
        match self.direction() {
            Direction::Ltr => self.go_prev(),
            Direction::Rtl => self.go_next(),
        }
    }

    /// Physical right button/key, mirror of [`Self::press_left`].
    pub fn press_right(&mut self) -> Option<RenderPass> {
        match self.direction() {
            Direction::Ltr => self.go_next(),
            Direction::Rtl => self.go_prev(),
        }
    }

    pub fn zoom_in(&mut self) -> Option<RenderPass> {
        let step = self.config().zoom_step;
        self.set_zoom(step)
    }

    pub fn zoom_out(&mut self) -> Option<RenderPass> {
        let step = self.config().zoom_step;
        self.set_zoom(-step)
    }

    /// Adjusts zoom by `delta`, clamped to the configured range. Requests a
    /// render only when the effective zoom actually changed.
    pub fn set_zoom(&mut self, delta: f32) -> Option<RenderPass> {
        if self.is_load_failed() {
            return None;
        }
        let next = (self.zoom + delta).clamp(self.config.zoom_min, self.config.zoom_max);
        if (next - self.zoom).abs() < f32::EPSILON {
            return None;
        }
        self.zoom = next;
        self.request_render(self.current_spread)
    }

    /// Flips the reading direction, re-partitioning while keeping the view
    /// anchored to the same page.
    pub fn toggle_direction(&mut self) -> Option<RenderPass> {
        if self.is_load_failed() {
            return None;
        }
        let anchor = self.anchor_page();
        self.direction = self.direction.toggled();
        debug!("reading direction -> {}", self.direction.label());
        self.rebuild_spreads(anchor);
        self.request_render(self.current_spread)
    }

    /// Re-checks the single-page breakpoint after the window changed size.
    /// Crossing the breakpoint re-partitions with anchor preservation; a
    /// render is requested either way since the fit box changed.
    pub fn on_viewport_change(&mut self, window_width: f32) -> Option<RenderPass> {
        let next_single = window_width < self.config.single_page_breakpoint;
        if next_single != self.single_page_mode && !self.is_load_failed() {
            let anchor = self.anchor_page();
            debug!("breakpoint crossed at width {window_width}: single_page_mode -> {next_single}");
            self.single_page_mode = next_single;
            self.rebuild_spreads(anchor);
        }
        self.request_render(self.current_spread)
    }
}
