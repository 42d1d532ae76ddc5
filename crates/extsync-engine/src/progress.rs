//! Progress reporting seam

/// Receives step notifications while a sync runs
pub trait ProgressReporter: Send + Sync {
    /// One sub-step of item `current` out of `total`
    fn show_step(&self, message: &str, current: usize, total: usize);

    /// Run finished; remove any progress display
    fn clear(&self);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn show_step(&self, _message: &str, _current: usize, _total: usize) {}

    fn clear(&self) {}
}
