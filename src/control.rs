//! Wire control bytes and text helpers shared by every layer.
//!
//! The link speaks single-byte handshakes (`ENQ`, `ACK`, `NAK`, `EOT`) and
//! wraps text in `STX … ETX`/`ETB` frames. Payload text is carried as
//! Latin-1 so one character always occupies one byte on the wire.

use std::fmt::Write as _;

/// Start of text; opens every frame.
pub const STX: u8 = 0x02;
/// End of text; terminates the final frame of a logical line.
pub const ETX: u8 = 0x03;
/// End of transmission; closes a transfer cycle.
pub const EOT: u8 = 0x04;
/// Enquiry; opens a transfer cycle.
pub const ENQ: u8 = 0x05;
/// Positive acknowledgement.
pub const ACK: u8 = 0x06;
/// Line feed; second byte of every frame trailer.
pub const LF: u8 = 0x0A;
/// Carriage return; field separator before `ETX` and first trailer byte.
pub const CR: u8 = 0x0D;
/// Negative acknowledgement.
pub const NAK: u8 = 0x15;
/// End of transmission block; terminates a continuation frame.
pub const ETB: u8 = 0x17;

/// Fixed two-byte trailer closing every frame.
pub const TRAILER: [u8; 2] = [CR, LF];

/// Returns `true` for the single-byte handshakes that never occur inside a
/// frame.
#[must_use]
pub const fn is_handshake(byte: u8) -> bool { matches!(byte, ENQ | ACK | NAK | EOT) }

/// Human-readable name of a control byte, if it has one.
#[must_use]
pub const fn control_name(byte: u8) -> Option<&'static str> {
    Some(match byte {
        STX => "STX",
        ETX => "ETX",
        EOT => "EOT",
        ENQ => "ENQ",
        ACK => "ACK",
        LF => "LF",
        CR => "CR",
        NAK => "NAK",
        ETB => "ETB",
        _ => return None,
    })
}

/// Render raw wire bytes with control bytes spelled out, e.g.
/// `<STX>1H|\^&<CR><ETX>4F<CR><LF>`.
///
/// ```
/// use labwire::control::escape;
///
/// assert_eq!(escape(b"\x021abc\x17C1\r\n"), "<STX>1abc<ETB>C1<CR><LF>");
/// ```
#[must_use]
pub fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 16);
    for &byte in bytes {
        match control_name(byte) {
            Some(name) => {
                out.push('<');
                out.push_str(name);
                out.push('>');
            }
            None if byte.is_ascii_graphic() || byte == b' ' => out.push(char::from(byte)),
            None => {
                let _ = write!(out, "<{byte:#04x}>");
            }
        }
    }
    out
}

/// Map text onto Latin-1 bytes. Characters outside Latin-1 become `?`.
#[must_use]
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Decode Latin-1 bytes into text; every byte maps to exactly one `char`.
#[must_use]
pub fn from_latin1(bytes: &[u8]) -> String { bytes.iter().map(|&b| char::from(b)).collect() }
