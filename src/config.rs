//! Link configuration.
//!
//! [`LinkConfig`] gathers the knobs shared by both transfer roles: chunk
//! size, frame-number modulus, timeouts and the retransmission policy.
//! Values are set with builder-style methods and sanitised on the way in.

use std::{num::NonZeroUsize, time::Duration};

use crate::{
    frame::link_codec::DEFAULT_MAX_FRAME_LENGTH,
    sequence::DEFAULT_MODULUS,
    session::RetryPolicy,
};

/// Default number of characters carried by one frame.
pub const DEFAULT_MAX_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(n) => n,
    None => unreachable!(),
};

/// Settings for one end of the link.
///
/// # Examples
///
/// ```
/// use std::{num::NonZeroUsize, time::Duration};
///
/// use labwire::config::LinkConfig;
///
/// let config = LinkConfig::default()
///     .max_chunk_size(NonZeroUsize::new(64).expect("non-zero"))
///     .ack_timeout(Duration::from_secs(5));
/// assert_eq!(config.chunk_size().get(), 64);
/// assert_eq!(config.modulus(), 8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    max_chunk_size: NonZeroUsize,
    sequence_modulus: u8,
    ack_timeout: Duration,
    receive_timeout: Duration,
    retry: RetryPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            sequence_modulus: DEFAULT_MODULUS,
            ack_timeout: Duration::from_secs(15),
            receive_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl LinkConfig {
    /// Set the number of characters per frame payload.
    #[must_use]
    pub fn max_chunk_size(mut self, size: NonZeroUsize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Set the frame-number modulus, clamped to `2..=10`.
    #[must_use]
    pub fn sequence_modulus(mut self, modulus: u8) -> Self {
        self.sequence_modulus = modulus.clamp(2, 10);
        self
    }

    /// Set how long an initiator waits for `ACK`/`NAK`.
    #[must_use]
    pub fn ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Set how long a responder waits for the next frame inside an open
    /// cycle.
    #[must_use]
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Set the retransmission policy.
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy.normalized();
        self
    }

    /// Characters per frame payload.
    #[must_use]
    pub const fn chunk_size(&self) -> NonZeroUsize { self.max_chunk_size }

    /// Frame-number modulus.
    #[must_use]
    pub const fn modulus(&self) -> u8 { self.sequence_modulus }

    /// Initiator acknowledgement timeout.
    #[must_use]
    pub const fn ack_wait(&self) -> Duration { self.ack_timeout }

    /// Responder in-cycle timeout.
    #[must_use]
    pub const fn receive_wait(&self) -> Duration { self.receive_timeout }

    /// Retransmission policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy { self.retry }

    /// Cap on buffered bytes for a frame still missing its LF.
    ///
    /// Leaves room for the frame overhead on top of a full chunk; never
    /// below [`DEFAULT_MAX_FRAME_LENGTH`].
    #[must_use]
    pub fn max_frame_length(&self) -> usize {
        (self.max_chunk_size.get() + 16).max(DEFAULT_MAX_FRAME_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_wire_conventions() {
        let config = LinkConfig::default();
        assert_eq!(config.chunk_size().get(), 50);
        assert_eq!(config.modulus(), 8);
        assert_eq!(config.retry_policy().max_retries, Some(6));
    }

    #[test]
    fn modulus_is_clamped_to_one_digit() {
        assert_eq!(LinkConfig::default().sequence_modulus(12).modulus(), 10);
        assert_eq!(LinkConfig::default().sequence_modulus(0).modulus(), 2);
    }

    #[test]
    fn frame_length_cap_grows_with_chunk_size() {
        let big = NonZeroUsize::new(4096).expect("non-zero");
        assert_eq!(LinkConfig::default().max_chunk_size(big).max_frame_length(), 4112);
        assert_eq!(LinkConfig::default().max_frame_length(), DEFAULT_MAX_FRAME_LENGTH);
    }
}
