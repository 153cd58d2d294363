//! Building and taking apart single frames.
//!
//! All offsets are measured from the end of the frame: the trailer, the
//! checksum digits and the terminator sit at fixed positions regardless of
//! the payload length.

use bytes::{BufMut, Bytes, BytesMut};

use super::{FrameError, Terminator, checksum};
use crate::control::{CR, STX, TRAILER, from_latin1};

/// Bytes after the terminator: two checksum digits and the trailer.
const TAIL_LEN: usize = 4;
/// `STX` plus the frame number.
const HEAD_LEN: usize = 2;

/// Smallest legal frame for `terminator` (empty payload).
#[must_use]
pub const fn min_frame_len(terminator: Terminator) -> usize {
    match terminator {
        Terminator::Final => HEAD_LEN + 2 + TAIL_LEN,
        Terminator::Continuation => HEAD_LEN + 1 + TAIL_LEN,
    }
}

/// Build a frame around `payload`.
///
/// Final frames carry `CR ETX`, continuation frames a bare `ETB`. The
/// checksum is computed from the bytes just written, never cached.
///
/// # Examples
///
/// ```
/// use labwire::frame::encode_frame;
///
/// let frame = encode_frame(b'1', b"L|1|N", false);
/// assert_eq!(&frame[..], b"\x021L|1|N\r\x0304\r\n");
/// ```
#[must_use]
pub fn encode_frame(sequence_digit: u8, payload: &[u8], continuation: bool) -> Bytes {
    let terminator = if continuation {
        Terminator::Continuation
    } else {
        Terminator::Final
    };
    let mut buf = BytesMut::with_capacity(payload.len() + min_frame_len(terminator));
    buf.put_u8(STX);
    buf.put_u8(sequence_digit);
    buf.extend_from_slice(payload);
    if !continuation {
        buf.put_u8(CR);
    }
    buf.put_u8(terminator.byte());

    let sum = checksum_region(&buf, terminator);
    buf.extend_from_slice(&sum);
    buf.extend_from_slice(&TRAILER);
    buf.freeze()
}

// The buffer was just assembled with STX first and the terminator last, so
// the region is always well formed.
fn checksum_region(buf: &[u8], terminator: Terminator) -> [u8; 2] {
    let sum = buf[1..]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    debug_assert_eq!(buf.last().copied(), Some(terminator.byte()));
    super::Checksum::new(sum).to_hex()
}

/// Classify the terminator at its fixed offset from the end of `frame`.
///
/// # Errors
///
/// Returns [`FrameError::MissingStart`] if the frame does not begin with
/// `STX`, [`FrameError::TooShort`] if it cannot hold a terminator, and
/// [`FrameError::UnknownTerminator`] if neither `ETX` nor `ETB` sits at the
/// terminator offset.
pub fn terminator_at(frame: &[u8]) -> Result<Terminator, FrameError> {
    if frame.first() != Some(&STX) {
        return Err(FrameError::MissingStart);
    }
    let min = min_frame_len(Terminator::Continuation);
    if frame.len() < min {
        return Err(FrameError::TooShort {
            len: frame.len(),
            min,
        });
    }
    let found = frame[frame.len() - TAIL_LEN - 1];
    Terminator::from_byte(found).ok_or(FrameError::UnknownTerminator { found })
}

/// Borrow the payload bytes of `frame`, which must carry `expected`.
///
/// # Errors
///
/// Returns a [`FrameError`] if the frame is shorter than the minimum for
/// `expected`, does not start with `STX`, carries the other terminator, or
/// (for final frames) lacks the CR before `ETX`.
pub fn extract_payload(frame: &[u8], expected: Terminator) -> Result<&[u8], FrameError> {
    if frame.first() != Some(&STX) {
        return Err(FrameError::MissingStart);
    }
    let min = min_frame_len(expected);
    if frame.len() < min {
        return Err(FrameError::TooShort {
            len: frame.len(),
            min,
        });
    }

    let term_at = frame.len() - TAIL_LEN - 1;
    let found = frame[term_at];
    match Terminator::from_byte(found) {
        Some(t) if t == expected => {}
        Some(t) => {
            return Err(FrameError::UnexpectedTerminator {
                expected,
                found: t,
            });
        }
        None => return Err(FrameError::UnknownTerminator { found }),
    }

    let end = match expected {
        Terminator::Final => {
            if frame[term_at - 1] != CR {
                return Err(FrameError::MissingFieldSeparator);
            }
            term_at - 1
        }
        Terminator::Continuation => term_at,
    };
    Ok(&frame[HEAD_LEN..end])
}

/// Extract the payload of `frame` as Latin-1 text.
///
/// # Errors
///
/// See [`extract_payload`].
pub fn extract_text(frame: &[u8], expected: Terminator) -> Result<String, FrameError> {
    extract_payload(frame, expected).map(from_latin1)
}

/// Check the trailer and the transmitted checksum of `frame`.
///
/// # Errors
///
/// Returns [`FrameError::BadTrailer`] if the frame does not end in CR LF,
/// any error from [`checksum`](super::checksum()) for a malformed region, and
/// [`FrameError::ChecksumMismatch`] when the digits differ.
pub fn verify_checksum(frame: &[u8], terminator: Terminator) -> Result<(), FrameError> {
    if frame.len() < TAIL_LEN + 1 || !frame.ends_with(&TRAILER) {
        return Err(FrameError::BadTrailer);
    }
    let digits_at = frame.len() - TAIL_LEN;
    let received = &frame[digits_at..digits_at + 2];
    let computed = checksum(frame, terminator)?;
    if computed.matches(received) {
        Ok(())
    } else {
        Err(FrameError::ChecksumMismatch {
            computed,
            received: from_latin1(received),
        })
    }
}

/// Boolean form of [`verify_checksum`].
#[must_use]
pub fn validate_checksum(frame: &[u8], terminator: Terminator) -> bool {
    verify_checksum(frame, terminator).is_ok()
}
