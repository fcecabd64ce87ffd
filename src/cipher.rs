//! Substitution between hex digits and the instrument's symbol alphabet.

use crate::constants::SYMBOLS;
use crate::error::{Error, Result};

const HEX_DIGITS: [u8; 16] = *b"0123456789ABCDEF";

/// Map one uppercase hex digit to its device symbol.
pub fn encode_digit(digit: char) -> Option<char> {
    HEX_DIGITS
        .iter()
        .position(|&d| d as char == digit)
        .map(|i| SYMBOLS[i] as char)
}

/// Map one device symbol back to its uppercase hex digit.
pub fn decode_char(symbol: char) -> Option<char> {
    SYMBOLS
        .iter()
        .position(|&s| s as char == symbol)
        .map(|i| HEX_DIGITS[i] as char)
}

/// Format `value` as `digits` zero-padded uppercase hex digits, in device symbols.
///
/// Values that need more than `digits` digits are rejected rather than truncated.
pub fn encode_hex(value: u32, digits: usize) -> Result<String> {
    let hex = format!("{:0width$X}", value, width = digits);
    if hex.len() > digits {
        return Err(Error::Encoding { value, digits });
    }
    hex.chars()
        .map(|c| encode_digit(c).ok_or(Error::Encoding { value, digits }))
        .collect()
}

/// Decode a device symbol string of any length into uppercase hex digits.
pub fn decode_hex(symbols: &str) -> Result<String> {
    symbols
        .chars()
        .map(|c| decode_char(c).ok_or(Error::Decoding(c)))
        .collect()
}
