//! Wrapping frame numbers.
//!
//! Both ends count frames independently, starting at 1 for the first frame
//! of a transfer cycle and wrapping at the configured modulus (8 by
//! default, so `7 -> 0`).

use derive_more::Display;

/// Default number of distinct frame numbers.
pub const DEFAULT_MODULUS: u8 = 8;
/// Frame number carried by the first frame of every cycle.
pub const INITIAL_SEQUENCE: u8 = 1;

/// Frame number counter with wrap-around in both directions.
///
/// # Examples
///
/// ```
/// use labwire::sequence::SequenceCounter;
///
/// let mut seq = SequenceCounter::new(8);
/// assert_eq!(seq.get(), 1);
/// for _ in 0..6 {
///     seq.advance();
/// }
/// assert_eq!(seq.get(), 7);
/// seq.advance();
/// assert_eq!(seq.get(), 0);
/// seq.retreat();
/// assert_eq!(seq.get(), 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[display("{value}")]
pub struct SequenceCounter {
    value: u8,
    modulus: u8,
}

impl SequenceCounter {
    /// Create a counter at [`INITIAL_SEQUENCE`].
    ///
    /// `modulus` is clamped to `2..=10` so the number always fits a single
    /// ASCII digit.
    #[must_use]
    pub fn new(modulus: u8) -> Self {
        let modulus = modulus.clamp(2, 10);
        Self {
            value: INITIAL_SEQUENCE % modulus,
            modulus,
        }
    }

    /// Current frame number.
    #[must_use]
    pub const fn get(self) -> u8 { self.value }

    /// Configured modulus.
    #[must_use]
    pub const fn modulus(self) -> u8 { self.modulus }

    /// ASCII digit carried on the wire.
    #[must_use]
    pub const fn digit(self) -> u8 { b'0' + self.value }

    /// Whether `digit` is the ASCII rendering of the current number.
    #[must_use]
    pub const fn matches_digit(self, digit: u8) -> bool { digit == self.digit() }

    /// Move to the next number, wrapping to 0.
    pub fn advance(&mut self) { self.value = (self.value + 1) % self.modulus; }

    /// Move to the previous number, wrapping to `modulus - 1`.
    pub fn retreat(&mut self) {
        self.value = if self.value == 0 {
            self.modulus - 1
        } else {
            self.value - 1
        };
    }

    /// Return to [`INITIAL_SEQUENCE`].
    pub fn reset(&mut self) { *self = Self::new(self.modulus); }
}

impl Default for SequenceCounter {
    fn default() -> Self { Self::new(DEFAULT_MODULUS) }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn seven_wraps_to_zero_never_eight() {
        let mut seq = SequenceCounter::default();
        let seen: Vec<u8> = (0..9)
            .map(|_| {
                let v = seq.get();
                seq.advance();
                v
            })
            .collect();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 0, 1]);
    }

    #[test]
    fn zero_retreats_to_seven() {
        let mut seq = SequenceCounter::default();
        seq.retreat();
        assert_eq!(seq.get(), 0);
        seq.retreat();
        assert_eq!(seq.get(), 7);
    }

    #[rstest]
    #[case(0, 2)]
    #[case(1, 2)]
    #[case(8, 8)]
    #[case(42, 10)]
    fn modulus_is_clamped(#[case] requested: u8, #[case] effective: u8) {
        assert_eq!(SequenceCounter::new(requested).modulus(), effective);
    }

    #[test]
    fn digit_is_ascii() {
        let mut seq = SequenceCounter::default();
        assert_eq!(seq.digit(), b'1');
        assert!(seq.matches_digit(b'1'));
        seq.reset();
        assert_eq!(seq.get(), 1);
    }
}
