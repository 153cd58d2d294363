//! Retransmission policy applied when the peer answers `NAK`.

use std::time::Duration;

/// Bounds and pacing for retransmitting a rejected frame.
///
/// The delay before the first retransmission is `initial_delay`; each
/// further consecutive retransmission of the same frame doubles it, capped
/// at `max_delay`. `max_retries` of `None` retries forever.
///
/// # Default Values
/// - `max_retries`: 6
/// - `initial_delay`: zero
/// - `max_delay`: 1 second
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive retransmissions of one frame before the cycle aborts.
    pub max_retries: Option<u32>,
    /// Pause before the first retransmission.
    pub initial_delay: Duration,
    /// Upper bound on the pause between retransmissions.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Some(6),
            initial_delay: Duration::ZERO,
            max_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Retry without limit and without delay.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Ensure `initial_delay <= max_delay`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use labwire::session::RetryPolicy;
    ///
    /// let policy = RetryPolicy {
    ///     max_retries: Some(3),
    ///     initial_delay: Duration::from_millis(50),
    ///     max_delay: Duration::from_millis(10),
    /// }
    /// .normalized();
    /// assert_eq!(policy.initial_delay, Duration::from_millis(10));
    /// assert_eq!(policy.max_delay, Duration::from_millis(50));
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.initial_delay > self.max_delay {
            std::mem::swap(&mut self.initial_delay, &mut self.max_delay);
        }
        self
    }

    /// Whether another retransmission is allowed after `attempts` so far.
    #[must_use]
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_retries.is_none_or(|max| attempts < max)
    }

    /// Pause before retransmission number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.initial_delay.is_zero() || attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn default_allows_six_retries(#[case] attempts: u32, #[case] allowed: bool) {
        assert_eq!(RetryPolicy::default().allows(attempts), allowed);
    }

    #[test]
    fn unbounded_never_gives_up() {
        assert!(RetryPolicy::unbounded().allows(u32::MAX));
    }

    #[test]
    fn delay_doubles_until_capped() {
        let policy = RetryPolicy {
            max_retries: None,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(350));
        assert_eq!(policy.delay_for(40), Duration::from_millis(350));
    }

    #[test]
    fn zero_initial_delay_never_sleeps() {
        assert_eq!(RetryPolicy::default().delay_for(5), Duration::ZERO);
    }
}
