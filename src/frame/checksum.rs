//! Modulo-256 frame checksum.

use std::fmt;

use super::{FrameError, Terminator};
use crate::control::STX;

/// Low eight bits of the byte sum over a frame's checked region.
///
/// Renders as two uppercase hexadecimal digits, leading zero preserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Checksum(u8);

impl Checksum {
    /// Wrap a raw checksum value.
    #[must_use]
    pub const fn new(value: u8) -> Self { Self(value) }

    /// Raw checksum value.
    #[must_use]
    pub const fn get(self) -> u8 { self.0 }

    /// The two ASCII hex digits carried on the wire.
    #[must_use]
    pub const fn to_hex(self) -> [u8; 2] {
        const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
        [DIGITS[(self.0 >> 4) as usize], DIGITS[(self.0 & 0x0F) as usize]]
    }

    /// Compare against two received characters, ignoring ASCII case.
    #[must_use]
    pub fn matches(self, received: &[u8]) -> bool { received.eq_ignore_ascii_case(&self.to_hex()) }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:02X}", self.0) }
}

/// Compute the checksum of `bytes` for the given terminator.
///
/// The checked region runs from the byte after the first `STX` through the
/// last occurrence of the terminator, inclusive.
///
/// # Errors
///
/// Returns [`FrameError::MissingStart`] without an `STX`,
/// [`FrameError::MissingTerminator`] without the terminator, and
/// [`FrameError::TerminatorBeforeStart`] if the terminator does not follow
/// the start marker.
///
/// # Examples
///
/// ```
/// use labwire::frame::{Terminator, checksum};
///
/// let sum = checksum(b"\x021A\x17", Terminator::Continuation).expect("well formed");
/// assert_eq!(sum.to_string(), "89");
/// ```
pub fn checksum(bytes: &[u8], terminator: Terminator) -> Result<Checksum, FrameError> {
    let start = bytes
        .iter()
        .position(|&b| b == STX)
        .ok_or(FrameError::MissingStart)?;
    let end = bytes
        .iter()
        .rposition(|&b| b == terminator.byte())
        .ok_or(FrameError::MissingTerminator(terminator))?;
    if end <= start {
        return Err(FrameError::TerminatorBeforeStart);
    }

    let sum = bytes[start + 1..=end]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    Ok(Checksum(sum))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::control::{CR, ETB, ETX};

    #[test]
    fn sums_from_after_stx_through_terminator() {
        // '1' (0x31) + 'A' (0x41) + CR (0x0D) + ETX (0x03) = 0x82
        let frame = [STX, b'1', b'A', CR, ETX];
        let sum = checksum(&frame, Terminator::Final).expect("checksum");
        assert_eq!(sum.get(), 0x82);
        assert_eq!(sum.to_hex(), *b"82");
    }

    #[test]
    fn keeps_leading_zero() {
        assert_eq!(Checksum::new(0x0A).to_string(), "0A");
        assert_eq!(Checksum::new(0x0A).to_hex(), *b"0A");
    }

    #[test]
    fn wraps_modulo_256() {
        let mut frame = vec![STX];
        frame.extend(std::iter::repeat_n(0xFF, 3));
        frame.push(ETB);
        // 3 * 0xFF + 0x17 = 0x314 -> 0x14
        assert_eq!(
            checksum(&frame, Terminator::Continuation)
                .expect("checksum")
                .get(),
            0x14
        );
    }

    #[rstest]
    #[case(&[b'1', ETX], FrameError::MissingStart)]
    #[case(&[STX, b'1'], FrameError::MissingTerminator(Terminator::Final))]
    #[case(&[ETX, STX, b'1'], FrameError::TerminatorBeforeStart)]
    fn rejects_malformed_regions(#[case] bytes: &[u8], #[case] expected: FrameError) {
        assert_eq!(checksum(bytes, Terminator::Final), Err(expected));
    }

    #[test]
    fn received_comparison_ignores_case() {
        let sum = Checksum::new(0xAB);
        assert!(sum.matches(b"ab"));
        assert!(sum.matches(b"AB"));
        assert!(!sum.matches(b"BA"));
    }

    proptest! {
        #[test]
        fn checksum_is_stable_two_hex_digits(body in proptest::collection::vec(any::<u8>(), 0..128)) {
            let mut frame = vec![STX];
            frame.extend(body);
            frame.push(ETX);
            let first = checksum(&frame, Terminator::Final).expect("checksum");
            let second = checksum(&frame, Terminator::Final).expect("checksum");
            prop_assert_eq!(first, second);
            let hex = first.to_string();
            prop_assert_eq!(hex.len(), 2);
            prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }
}
