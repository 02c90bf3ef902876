//! Progress reporting
//!
//! Table builds can be long-running; the builder notifies a sink with a
//! stage string before a build and with (current, total) row counts during
//! row emission. The sink is a pure notification target and never a control
//! input: implementations must not block, and correctness never depends on
//! one being attached.

/// Notification sink for long-running builds.
pub trait ProgressSink {
    /// Called once before a table build with a human-readable stage name.
    fn stage(&mut self, _text: &str) {}

    /// Called during row emission with the current and total row counts.
    fn rows(&mut self, _current: u64, _total: u64) {}
}

/// Sink that discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {}
