//! Progress and diagnostic sink handed to every import step.

use tracing::{debug, error, info, warn};

/// Callbacks invoked by the generators while they run.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: counting errors
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct ErrorCounter { errors: usize }
///
/// impl ImportProgress for ErrorCounter {
///     fn error(&mut self, _msg: &str) {
///         self.errors += 1;
///     }
/// }
/// ```
pub trait ImportProgress {
    /// A named import step has started.
    fn set_step(&mut self, _step: &str) {}

    /// Informational progress message.
    fn info(&mut self, _msg: &str) {}

    /// Something was accepted in a degraded way (sparse level, forced level).
    fn warning(&mut self, _msg: &str) {}

    /// A record was dropped or a step failed.
    fn error(&mut self, _msg: &str) {}

    /// Verbose per-type statistics.
    fn debug(&mut self, _msg: &str) {}

    /// `current` of `total` work units done within the running step.
    fn set_progress(&mut self, _current: u64, _total: u64) {}
}

/// An [`ImportProgress`] that does nothing.
pub struct NoopProgress;

impl ImportProgress for NoopProgress {}

/// Forwards every callback to `tracing` under the `geodb::import` target.
#[derive(Default)]
pub struct TracingProgress {
    step: String,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the step last passed to [`ImportProgress::set_step`].
    pub fn step(&self) -> &str {
        &self.step
    }
}

impl ImportProgress for TracingProgress {
    fn set_step(&mut self, step: &str) {
        self.step = step.to_owned();
        info!(target: "geodb::import", step, "step started");
    }

    fn info(&mut self, msg: &str) {
        info!(target: "geodb::import", step = %self.step, "{msg}");
    }

    fn warning(&mut self, msg: &str) {
        warn!(target: "geodb::import", step = %self.step, "{msg}");
    }

    fn error(&mut self, msg: &str) {
        error!(target: "geodb::import", step = %self.step, "{msg}");
    }

    fn debug(&mut self, msg: &str) {
        debug!(target: "geodb::import", step = %self.step, "{msg}");
    }

    fn set_progress(&mut self, current: u64, total: u64) {
        debug!(target: "geodb::import", step = %self.step, current, total, "progress");
    }
}
