//! Base-42 big-integer encoding used for free text (71 bits / 13 chars)
//! and the c58 field used by compound-callsign messages (58 bits / 10 chars).

use alloc::format;
use alloc::string::String;

use crate::error::Error;
use crate::message::constants::CHARSET_BASE42;

const BASE: u64 = 42;

/// Encode up to 10 characters into a 58-bit value.
pub fn encode_text_c58(text: &str) -> Result<u64, Error> {
    if text.len() > 10 {
        return Err(Error::MessageTooLong { len: text.len() });
    }
    let padded = format!("{text:>10}");

    let mut acc: u64 = 0;
    for ch in padded.bytes() {
        let idx = CHARSET_BASE42.iter().position(|&c| c == ch).ok_or(Error::InvalidCharacter)?;
        acc = acc * BASE + idx as u64;
    }
    Ok(acc)
}

/// Inverse of [`encode_text_c58`].
pub fn decode_text_c58(value: u64) -> Result<String, Error> {
    let mut acc = value;
    let mut result = String::with_capacity(10);
    for _ in 0..10 {
        let remainder = (acc % BASE) as usize;
        result.push(CHARSET_BASE42[remainder] as char);
        acc /= BASE;
    }
    Ok(result.chars().rev().collect())
}

/// Encode up to 13 characters into 71 bits, stored as 9 big-endian bytes
/// (the top bit of the first byte is always clear).
pub fn encode_free_text(text: &str) -> Result<[u8; 9], Error> {
    if text.len() > 13 {
        return Err(Error::MessageTooLong { len: text.len() });
    }
    let padded = format!("{text:>13}");

    let mut acc = [0u8; 9];
    for ch in padded.bytes() {
        let idx = CHARSET_BASE42.iter().position(|&c| c == ch).ok_or(Error::InvalidCharacter)?;
        multiply_add(&mut acc, BASE, idx as u64);
    }
    acc[0] &= 0x7F;
    Ok(acc)
}

/// Inverse of [`encode_free_text`].
pub fn decode_free_text(bits: &[u8; 9]) -> Result<String, Error> {
    let mut acc = *bits;
    acc[0] &= 0x7F;

    let mut result = String::with_capacity(13);
    for _ in 0..13 {
        let remainder = divide_inplace(&mut acc, BASE);
        result.push(CHARSET_BASE42[remainder as usize] as char);
    }
    Ok(result.chars().rev().collect())
}

fn multiply_add(acc: &mut [u8; 9], multiplier: u64, addend: u64) {
    let mut carry = addend;
    for i in (0..9).rev() {
        let val = (acc[i] as u64) * multiplier + carry;
        acc[i] = (val & 0xFF) as u8;
        carry = val >> 8;
    }
}

fn divide_inplace(acc: &mut [u8; 9], divisor: u64) -> u64 {
    let mut remainder = 0u64;
    for byte in acc.iter_mut() {
        let val = (remainder << 8) | (*byte as u64);
        *byte = (val / divisor) as u8;
        remainder = val % divisor;
    }
    remainder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_round_trips() {
        for text in ["TNX BOB 73 GL", "HELLO WORLD", ""] {
            let encoded = encode_free_text(text).unwrap();
            let decoded = decode_free_text(&encoded).unwrap();
            assert_eq!(decoded.trim_start(), text);
        }
    }

    #[test]
    fn rejects_text_over_13_chars() {
        assert!(encode_free_text("THIS IS WAY TOO LONG").is_err());
    }

    #[test]
    fn rejects_unsupported_characters() {
        assert!(encode_free_text("lowercase").is_err());
    }

    #[test]
    fn c58_round_trips() {
        for text in ["KH7Z", "K1ABC", ""] {
            let encoded = encode_text_c58(text).unwrap();
            let decoded = decode_text_c58(encoded).unwrap();
            assert_eq!(decoded.trim_start(), text);
        }
    }
}
