//! Back-off pacing for a failing accept loop.

use std::time::Duration;

/// Exponential back-off applied when `accept()` fails.
///
/// The first retry waits `initial_delay`; each consecutive failure doubles
/// the wait up to `max_delay`. A successful accept starts over.
///
/// # Default Values
/// - `initial_delay`: 10 milliseconds
/// - `max_delay`: 1 second
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Wait after the first consecutive failure.
    pub initial_delay: Duration,
    /// Ceiling for the wait.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffConfig {
    /// Raise both delays to at least 1 ms and order them.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use labwire::server::BackoffConfig;
    ///
    /// let cfg = BackoffConfig {
    ///     initial_delay: Duration::ZERO,
    ///     max_delay: Duration::ZERO,
    /// }
    /// .normalized();
    /// assert_eq!(cfg.initial_delay, Duration::from_millis(1));
    /// assert_eq!(cfg.max_delay, Duration::from_millis(1));
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.initial_delay = self.initial_delay.max(Duration::from_millis(1));
        self.max_delay = self.max_delay.max(Duration::from_millis(1));
        if self.initial_delay > self.max_delay {
            std::mem::swap(&mut self.initial_delay, &mut self.max_delay);
        }
        self
    }

    /// Wait to use after a failure that followed a wait of `current`.
    #[must_use]
    pub fn next_delay(&self, current: Duration) -> Duration { current.saturating_mul(2).min(self.max_delay) }
}
