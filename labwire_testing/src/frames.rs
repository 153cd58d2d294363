//! Hand-built wire bytes.

use labwire::{
    control::{ACK, ENQ, EOT, NAK},
    frame::encode_frame,
};

fn digit(number: u8) -> u8 { b'0' + number % 10 }

/// A frame closing its line, numbered `number`.
#[must_use]
pub fn final_frame(number: u8, text: &str) -> Vec<u8> { encode_frame(digit(number), text.as_bytes(), false).to_vec() }

/// A frame continued by the next one, numbered `number`.
#[must_use]
pub fn continuation_frame(number: u8, text: &str) -> Vec<u8> {
    encode_frame(digit(number), text.as_bytes(), true).to_vec()
}

/// Replace the two checksum digits of `frame`.
///
/// # Panics
///
/// Panics if `frame` is too short to hold a trailer.
#[must_use]
pub fn with_checksum(mut frame: Vec<u8>, digits: [u8; 2]) -> Vec<u8> {
    let at = frame.len().checked_sub(4).expect("frame has a trailer");
    frame[at..at + 2].copy_from_slice(&digits);
    frame
}

#[must_use]
pub fn enq() -> Vec<u8> { vec![ENQ] }

#[must_use]
pub fn ack() -> Vec<u8> { vec![ACK] }

#[must_use]
pub fn nak() -> Vec<u8> { vec![NAK] }

#[must_use]
pub fn eot() -> Vec<u8> { vec![EOT] }
