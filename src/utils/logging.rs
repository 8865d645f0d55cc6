use log::{log_enabled, warn, Level};
use std::time::Instant;

/// Simple scoped timer for profiling critical sections.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            let elapsed = self.start.elapsed();
            log::trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}

/// Emits a warning when the max-velocity diagnostic stops being finite.
///
/// Returns `true` when a warning was logged.
pub fn warn_if_diverged(step: u64, max_velocity_sq: f32) -> bool {
    if max_velocity_sq.is_finite() {
        return false;
    }
    warn!("step {step}: max squared velocity is {max_velocity_sq}, simulation diverged");
    true
}
