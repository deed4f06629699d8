//! Single-flight render scheduling.
//!
//! At most one render executes at a time, plus at most one pending index.
//! A request made while a render is executing overwrites any earlier pending
//! index (last writer wins) and returns without starting work. Completing the
//! executing render drains the pending slot by immediately starting the
//! latest index, so the surface always converges on the freshest request
//! while intermediate ones are dropped.
//!
//! The asynchronous boundary is explicit and two-phase: `request` either
//! hands back a [`RenderPass`] the caller must execute, or coalesces; after
//! executing a pass — whether the render succeeded or failed — the caller
//! reports back via `complete`, which may hand out the next pass.

use log::trace;

/// Token for a render the scheduler has admitted for execution.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an admitted render must be executed and then completed"]
pub struct RenderPass {
    index: usize,
}

impl RenderPass {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    in_flight: bool,
    pending: Option<usize>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a render of `index`. Returns the pass to execute now, or
    /// `None` if a render is already executing (the index is parked in the
    /// pending slot, replacing any previous value).
    pub fn request(&mut self, index: usize) -> Option<RenderPass> {
        if self.in_flight {
            trace!("render in flight, coalescing request for spread {index}");
            self.pending = Some(index);
            return None;
        }

        self.in_flight = true;
        Some(RenderPass { index })
    }

    /// Marks the executing render finished, successfully or not, and admits
    /// the latest pending index if one accumulated in the meantime.
    pub fn complete(&mut self) -> Option<RenderPass> {
        self.in_flight = false;
        match self.pending.take() {
            Some(index) => self.request(index),
            None => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn pending_index(&self) -> Option<usize> {
        self.pending
    }

    /// Forgets all scheduled work. Used when a new document replaces the
    /// session mid-flight.
    pub fn reset(&mut self) {
        self.in_flight = false;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_request_starts_immediately() {
        let mut scheduler = RenderScheduler::new();
        let pass = scheduler.request(3).expect("should start");
        assert_eq!(pass.index(), 3);
        assert!(scheduler.is_in_flight());
        assert_eq!(scheduler.pending_index(), None);
    }

    #[test]
    fn requests_during_flight_coalesce_to_the_latest() {
        let mut scheduler = RenderScheduler::new();
        let first = scheduler.request(0).unwrap();
        assert_eq!(first.index(), 0);

        assert!(scheduler.request(1).is_none());
        assert!(scheduler.request(2).is_none());
        assert!(scheduler.request(5).is_none());
        assert_eq!(scheduler.pending_index(), Some(5));

        let next = scheduler.complete().expect("pending should start");
        assert_eq!(next.index(), 5);
        assert!(scheduler.complete().is_none());
        assert!(!scheduler.is_in_flight());
    }

    #[test]
    fn n_requests_yield_at_most_two_executions() {
        let mut scheduler = RenderScheduler::new();
        let mut executed = 0;

        let mut pass = scheduler.request(0);
        for i in 1..50 {
            let coalesced = scheduler.request(i);
            assert!(coalesced.is_none());
        }
        while let Some(p) = pass.take() {
            let _ = p.index();
            executed += 1;
            pass = scheduler.complete();
        }

        assert_eq!(executed, 2);
    }

    #[test]
    fn completion_after_failure_still_drains_pending() {
        let mut scheduler = RenderScheduler::new();
        let _pass = scheduler.request(1).unwrap();
        assert!(scheduler.request(2).is_none());

        // The executing render failed; complete is called all the same.
        let retried = scheduler.complete().unwrap();
        assert_eq!(retried.index(), 2);
    }

    #[test]
    fn reset_clears_all_state() {
        let mut scheduler = RenderScheduler::new();
        let _pass = scheduler.request(1).unwrap();
        assert!(scheduler.request(4).is_none());

        scheduler.reset();
        assert!(!scheduler.is_in_flight());
        assert_eq!(scheduler.pending_index(), None);

        let pass = scheduler.request(0).unwrap();
        assert_eq!(pass.index(), 0);
    }
}
