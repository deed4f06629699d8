//! Terminal event polling behind a trait so the app loop runs in tests
//! without a real terminal.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};

pub trait EventSource {
    /// Next terminal event, or `None` if the timeout elapsed quietly.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

pub struct KeyboardEventSource;

impl EventSource for KeyboardEventSource {
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Scripted event source for tests: plays back a fixed sequence, then
/// reports quiet polls.
#[cfg(any(test, feature = "test-utils"))]
pub struct ScriptedEventSource {
    events: std::collections::VecDeque<Event>,
}

#[cfg(any(test, feature = "test-utils"))]
impl ScriptedEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl EventSource for ScriptedEventSource {
    fn poll_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
        Ok(self.events.pop_front())
    }
}
