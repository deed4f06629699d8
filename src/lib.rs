// Export modules for use in tests
pub mod catalog;
pub mod cbz;
pub mod detail;
pub mod document;
pub mod errors;
pub mod event_source;
pub mod main_app;
pub mod notification;
pub mod panic_handler;
pub mod reader;
pub mod settings;
pub mod surface;
pub mod viewport;
// Test utilities - only available when test-utils feature is enabled or during tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use reader::{
    Direction, PagerView, ReaderConfig, ReaderSession, RenderScheduler, Spread, SpreadKind,
    partition,
};

// Re-export main app components
pub use main_app::{App, View, run_app_with_event_source};
