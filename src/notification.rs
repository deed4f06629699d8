//! User-facing banners: transient info/warning/error messages plus
//! persistent errors that survive until explicitly cleared.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    created: Instant,
    ttl: Option<Duration>,
}

impl Notification {
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.duration_since(self.created) >= ttl)
    }
}

#[derive(Debug, Default)]
pub struct NotificationManager {
    current: Option<Notification>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_info(&mut self, message: impl Into<String>) {
        self.show(Severity::Info, message, Some(Duration::from_secs(3)));
    }

    pub fn show_warning(&mut self, message: impl Into<String>) {
        self.show(Severity::Warning, message, Some(Duration::from_secs(5)));
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.show(Severity::Error, message, Some(Duration::from_secs(8)));
    }

    /// Error without a deadline; stays up until [`Self::clear`].
    pub fn show_persistent_error(&mut self, message: impl Into<String>) {
        self.show(Severity::Error, message, None);
    }

    fn show(&mut self, severity: Severity, message: impl Into<String>, ttl: Option<Duration>) {
        self.current = Some(Notification {
            severity,
            message: message.into(),
            created: Instant::now(),
            ttl,
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Current banner, dropping it first if its time ran out.
    pub fn current(&mut self) -> Option<&Notification> {
        let now = Instant::now();
        if self
            .current
            .as_ref()
            .is_some_and(|n| n.is_expired(now))
        {
            self.current = None;
        }
        self.current.as_ref()
    }
}
