use std::time::Instant;

/// Logs the elapsed time for a step phase when dropped.
///
/// Emits at `trace` level so per-phase timings stay out of the way unless a
/// consumer opts in.
pub struct ScopedTimer {
    label: &'static str,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::trace!(
            "{}: {:.3} ms",
            self.label,
            self.start.elapsed().as_secs_f64() * 1000.0
        );
    }
}
