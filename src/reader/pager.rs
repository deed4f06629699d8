//! Pager view-model: the strip of navigation chrome under the stage.

use super::{Direction, ReaderSession};

/// Everything the pager widget needs, computed from the session. The labels
/// follow the reading direction: under RTL the left button advances the
/// story, so it reads "Next".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerView {
    pub indicator: String,
    pub zoom_label: String,
    pub direction_label: &'static str,
    pub left_label: &'static str,
    pub right_label: &'static str,
    pub left_enabled: bool,
    pub right_enabled: bool,
}

impl PagerView {
    pub fn for_session(session: &ReaderSession) -> Self {
        let total = session.total_spreads();
        let index = session.current_spread();
        let at_start = index == 0;
        let at_end = index + 1 >= total;

        let (left_label, right_label, left_enabled, right_enabled) = match session.direction() {
            Direction::Ltr => ("Previous", "Next", !at_start, !at_end),
            Direction::Rtl => ("Next", "Previous", !at_end, !at_start),
        };

        Self {
            indicator: format!("{} / {}", index + 1, total),
            zoom_label: format!("{}%", (session.zoom() * 100.0).round() as u32),
            direction_label: session.direction().label(),
            left_label,
            right_label,
            left_enabled,
            right_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReaderConfig;

    fn session(direction: Direction) -> ReaderSession {
        ReaderSession::new(7, direction, false, ReaderConfig::default())
    }

    #[test]
    fn indicator_counts_spreads_not_pages() {
        let s = session(Direction::Ltr);
        let pager = PagerView::for_session(&s);
        // 7 pages double mode: cover + 3 pairs + end.
        assert_eq!(pager.indicator, "1 / 5");
    }

    #[test]
    fn ltr_disables_previous_at_the_start() {
        let s = session(Direction::Ltr);
        let pager = PagerView::for_session(&s);
        assert_eq!(pager.left_label, "Previous");
        assert!(!pager.left_enabled);
        assert!(pager.right_enabled);
    }

    #[test]
    fn rtl_swaps_labels_and_enablement() {
        let s = session(Direction::Rtl);
        let pager = PagerView::for_session(&s);
        assert_eq!(pager.left_label, "Next");
        assert_eq!(pager.right_label, "Previous");
        assert!(pager.left_enabled);
        assert!(!pager.right_enabled);
    }

    #[test]
    fn rtl_at_the_end_disables_the_left_button() {
        let mut s = session(Direction::Rtl);
        while s.current_spread() + 1 < s.total_spreads() {
            let pass = s.go_next();
            assert!(pass.is_some());
            let _ = s.complete_render();
        }
        let pager = PagerView::for_session(&s);
        assert!(!pager.left_enabled);
        assert!(pager.right_enabled);
    }

    #[test]
    fn zoom_label_is_rounded_percent() {
        let mut s = session(Direction::Ltr);
        let pass = s.zoom_in();
        assert!(pass.is_some());
        let _ = s.complete_render();
        let pager = PagerView::for_session(&s);
        assert_eq!(pager.zoom_label, "110%");
    }
}
