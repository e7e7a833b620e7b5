//! Limits on the blocking rotate loop

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc
};
use std::time::{Duration, Instant};

// Internal
use super::HeadingDriveError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bounds on how long `Headingable::rotate` may spin for.
///
/// The default (`RotateLimit::unbounded()`) places no bound on the loop, so
/// a controller that never settles will spin forever. Any combination of a
/// timeout, a cycle budget and a cancellation flag can be added.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use drive_lib::heading_drive::RotateLimit;
///
/// let limit = RotateLimit::unbounded()
///     .with_timeout(Duration::from_secs(3))
///     .with_max_ticks(500);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RotateLimit {
    timeout: Option<Duration>,
    max_ticks: Option<usize>,
    cancel: Option<Arc<AtomicBool>>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RotateLimit {
    /// No limit, `rotate` spins until the heading settles.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Give up once `timeout` has elapsed since `rotate` was called.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Give up after `max_ticks` control cycles.
    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Give up as soon as `cancel` is set. The flag is polled once per
    /// control cycle.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn max_ticks(&self) -> Option<usize> {
        self.max_ticks
    }

    /// Mark the start of a rotation.
    pub(crate) fn start(&self) -> Instant {
        Instant::now()
    }

    /// Check whether another control cycle may run, given the number of
    /// cycles already run.
    pub(crate) fn check(&self, start: &Instant, ticks: usize) -> Result<(), HeadingDriveError> {
        if let Some(ref cancel) = self.cancel {
            if cancel.load(Ordering::Relaxed) {
                return Err(HeadingDriveError::RotateCancelled(ticks))
            }
        }

        if let Some(max) = self.max_ticks {
            if ticks >= max {
                return Err(HeadingDriveError::RotateTickLimit(max))
            }
        }

        if let Some(timeout) = self.timeout {
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(HeadingDriveError::RotateTimeout { timeout, elapsed })
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unbounded_never_trips() {
        let limit = RotateLimit::unbounded();
        let start = limit.start();
        assert!(limit.check(&start, usize::MAX).is_ok());
    }

    #[test]
    fn test_tick_budget() {
        let limit = RotateLimit::unbounded().with_max_ticks(3);
        let start = limit.start();
        assert!(limit.check(&start, 2).is_ok());
        assert_eq!(limit.check(&start, 3), Err(HeadingDriveError::RotateTickLimit(3)));
    }

    #[test]
    fn test_cancel_flag() {
        let cancel = Arc::new(AtomicBool::new(false));
        let limit = RotateLimit::unbounded().with_cancel(cancel.clone());
        let start = limit.start();
        assert!(limit.check(&start, 0).is_ok());

        cancel.store(true, Ordering::Relaxed);
        assert_eq!(limit.check(&start, 7), Err(HeadingDriveError::RotateCancelled(7)));
    }

    #[test]
    fn test_zero_timeout() {
        let limit = RotateLimit::unbounded().with_timeout(Duration::from_secs(0));
        let start = limit.start();
        match limit.check(&start, 0) {
            Err(HeadingDriveError::RotateTimeout { timeout, .. }) =>
                assert_eq!(timeout, Duration::from_secs(0)),
            r => panic!("Expected a timeout, got {:?}", r)
        }
    }
}
