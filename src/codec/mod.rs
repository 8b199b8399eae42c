//! Byte/text codec.
//!
//! Converts raw payload bytes to human-readable text in two modes:
//!
//! - **ASCII**: printable characters as-is, tab/CR/LF kept, `.` for
//!   everything else
//! - **Hex**: two uppercase hex digits per byte, single-space separated
//!
//! Encoding is total: every byte sequence, including the empty one, has a
//! rendering. Only hex text can be decoded back into bytes.

pub mod styled;

pub use styled::{Fragment, StyledText};

use crate::core::{DataMode, TextStyle};
use crate::error::{CodecError, Result};
use std::fmt::Write;

/// Placeholder glyph for bytes with no printable ASCII form.
pub const PLACEHOLDER: char = '.';

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Maps one byte to its ASCII-mode glyph.
#[must_use]
pub const fn ascii_glyph(byte: u8) -> char {
    match byte {
        b'\t' | b'\n' | b'\r' | 0x20..=0x7E => byte as char,
        _ => PLACEHOLDER,
    }
}

/// Renders bytes in ASCII mode.
///
/// # Examples
///
/// ```
/// use uart_log::codec::ascii_text;
///
/// assert_eq!(ascii_text(b"OK\r\n"), "OK\r\n");
/// assert_eq!(ascii_text(&[0x00, 0x41, 0xFF]), ".A.");
/// ```
#[must_use]
pub fn ascii_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| ascii_glyph(b)).collect()
}

/// Renders bytes in hex mode.
///
/// # Examples
///
/// ```
/// use uart_log::codec::hex_text;
///
/// assert_eq!(hex_text(&[0x41, 0x42, 0x0A]), "41 42 0A");
/// assert_eq!(hex_text(&[]), "");
/// ```
#[must_use]
pub fn hex_text(bytes: &[u8]) -> String {
    hex_text_wrapped(bytes, None)
}

/// Renders bytes in hex mode, breaking the line every `line_width` bytes.
///
/// A `line_width` of `None` or `Some(0)` disables wrapping.
#[must_use]
pub fn hex_text_wrapped(bytes: &[u8], line_width: Option<usize>) -> String {
    let width = line_width.filter(|&w| w > 0);
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, &byte) in bytes.iter().enumerate() {
        if i > 0 {
            let at_line_end = width.is_some_and(|w| i % w == 0);
            out.push(if at_line_end { '\n' } else { ' ' });
        }
        out.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
        out.push(char::from(HEX_DIGITS[usize::from(byte & 0x0F)]));
    }
    out
}

/// Renders bytes in the given mode without styling.
#[must_use]
pub fn to_text(bytes: &[u8], mode: DataMode) -> String {
    match mode {
        DataMode::Ascii => ascii_text(bytes),
        DataMode::Hex => hex_text(bytes),
    }
}

/// Renders bytes as a styled fragment.
///
/// Empty input yields empty text.
#[must_use]
pub fn encode(bytes: &[u8], mode: DataMode, style: TextStyle) -> StyledText {
    StyledText::styled(&to_text(bytes, mode), style)
}

/// Renders bytes as a styled fragment, wrapping hex output every
/// `line_width` bytes. ASCII output is never wrapped.
#[must_use]
pub fn encode_wrapped(
    bytes: &[u8],
    mode: DataMode,
    style: TextStyle,
    line_width: Option<usize>,
) -> StyledText {
    match mode {
        DataMode::Ascii => encode(bytes, mode, style),
        DataMode::Hex => StyledText::styled(&hex_text_wrapped(bytes, line_width), style),
    }
}

/// Parses hex text back into bytes.
///
/// Tokens are separated by any whitespace and must be exactly two hex
/// digits (either case). Empty or all-whitespace input decodes to no bytes.
///
/// # Errors
///
/// Returns [`CodecError::InvalidHex`] for the first malformed token.
///
/// # Examples
///
/// ```
/// use uart_log::codec::decode_hex;
///
/// assert_eq!(decode_hex("41 42\n0a").unwrap(), vec![0x41, 0x42, 0x0A]);
/// assert!(decode_hex("4").is_err());
/// ```
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, token)| -> Result<u8> {
            let well_formed = token.len() == 2 && token.bytes().all(|b| b.is_ascii_hexdigit());
            let byte = well_formed
                .then(|| u8::from_str_radix(token, 16).ok())
                .flatten();
            byte.ok_or_else(|| {
                CodecError::InvalidHex {
                    token: token.to_string(),
                    position,
                }
                .into()
            })
        })
        .collect()
}

/// Writes a human-readable dump of bytes, hex and ASCII side by side,
/// `width` bytes per line.
///
/// Used by the CLI `encode` command to show both modes at once.
#[must_use]
pub fn dump(bytes: &[u8], width: usize) -> String {
    let width = width.max(1);
    let mut out = String::new();
    for (line, row) in bytes.chunks(width).enumerate() {
        let hex = hex_text(row);
        let _ = writeln!(
            out,
            "{:08X}  {:<pad$}  {}",
            line * width,
            hex,
            escape_line_breaks(&ascii_text(row)),
            pad = width * 3 - 1
        );
    }
    out
}

/// Replaces CR, LF and tab with their two-character escapes.
///
/// A literal backslash is doubled so an escaped line break never reads
/// the same as the two bytes `\` `n`.
#[must_use]
pub fn escape_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
