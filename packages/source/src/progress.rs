//! Progress reporting for long-running fetches.
//!
//! [`ProgressCallback`] decouples fetch progress from any particular
//! rendering backend. The `indicatif`-backed implementation lives in
//! `county_compass_cli_utils`; [`NullProgress`] silences everything for
//! tests and library callers.

use std::sync::Arc;

/// Callback surface for long-running operations.
///
/// Implementations must be `Send + Sync` since fetchers share them
/// across concurrent requests behind an [`Arc`].
pub trait ProgressCallback: Send + Sync {
    /// Announces the expected total units of work.
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Replaces the message shown alongside the indicator.
    fn set_message(&self, msg: String);

    /// Marks the operation complete with a closing message.
    fn finish(&self, msg: String);
}

/// Ignores every progress update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
