//! Random frame corruption for exercising a peer's rejection path.
//!
//! When enabled, each outgoing frame independently may carry the wrong frame
//! number (`9`, never valid with the default modulus) and may carry the
//! checksum `FF` in place of the real one. The wrong frame number is applied
//! before the checksum is computed, so only the number is wrong.

use bytes::{Bytes, BytesMut};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::warn;

/// Frame number written by a corrupted frame.
pub const BOGUS_SEQUENCE: u8 = b'9';
/// Checksum digits written by a corrupted frame.
pub const BOGUS_CHECKSUM: [u8; 2] = *b"FF";

/// Source of random frame faults.
#[derive(Clone, Debug)]
pub struct FaultInjector {
    rng: StdRng,
    probability: f64,
}

impl FaultInjector {
    /// Corrupt each aspect of a frame with `probability`, seeded from the OS.
    #[must_use]
    pub fn new(probability: f64) -> Self { Self::with_rng(StdRng::from_entropy(), probability) }

    /// Reproducible injector for tests.
    #[must_use]
    pub fn seeded(seed: u64, probability: f64) -> Self { Self::with_rng(StdRng::seed_from_u64(seed), probability) }

    fn with_rng(rng: StdRng, probability: f64) -> Self {
        let probability = if probability.is_nan() { 0.0 } else { probability.clamp(0.0, 1.0) };
        Self { rng, probability }
    }

    /// Either `digit` or [`BOGUS_SEQUENCE`].
    pub fn sequence_digit(&mut self, digit: u8) -> u8 {
        if self.rng.gen_bool(self.probability) {
            warn!(
                actual = %char::from(digit),
                "simulation: sending wrong frame number"
            );
            BOGUS_SEQUENCE
        } else {
            digit
        }
    }

    /// Either `frame` or a copy carrying [`BOGUS_CHECKSUM`].
    pub fn checksum(&mut self, frame: Bytes) -> Bytes {
        if frame.len() < 4 || !self.rng.gen_bool(self.probability) {
            return frame;
        }
        let mut corrupted = BytesMut::from(frame.as_ref());
        let at = corrupted.len() - 4;
        corrupted[at..at + 2].copy_from_slice(&BOGUS_CHECKSUM);
        warn!("simulation: sending wrong checksum");
        corrupted.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Terminator, encode_frame, validate_checksum};

    #[test]
    fn certain_faults_always_apply() {
        let mut faults = FaultInjector::seeded(7, 1.0);
        assert_eq!(faults.sequence_digit(b'1'), BOGUS_SEQUENCE);
        let frame = faults.checksum(encode_frame(b'1', b"Halo Dunia", false));
        assert_eq!(&frame[frame.len() - 4..frame.len() - 2], b"FF");
        assert!(!validate_checksum(&frame, Terminator::Final));
    }

    #[test]
    fn zero_probability_never_corrupts() {
        let mut faults = FaultInjector::seeded(7, 0.0);
        let frame = encode_frame(b'3', b"Hello", true);
        for _ in 0..32 {
            assert_eq!(faults.sequence_digit(b'3'), b'3');
            assert_eq!(faults.checksum(frame.clone()), frame);
        }
    }

    #[test]
    fn out_of_range_probability_is_clamped() {
        let mut faults = FaultInjector::seeded(1, 4.0);
        assert_eq!(faults.sequence_digit(b'2'), BOGUS_SEQUENCE);
        let mut faults = FaultInjector::seeded(1, f64::NAN);
        assert_eq!(faults.sequence_digit(b'2'), b'2');
    }
}
