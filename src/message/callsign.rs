//! WSJT-X pack28/unpack28: packing a callsign (or CQ token) into a 28-bit
//! value, and the base-38 callsign hash used when a call doesn't fit.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::{Error, InvalidCallsignSnafu};
use crate::message::constants::{CHARSET_A1, CHARSET_A2, CHARSET_A3, CHARSET_A4, CHARSET_BASE38, MAX22, NTOKENS};
use snafu::ensure;

/// Reverse [`pack_callsign`] for the token/basecall ranges. Callers must
/// check the hashed range (`NTOKENS..NTOKENS+MAX22`) separately since that
/// requires a [`crate::message::callsign_cache::CallsignHashCache`] lookup.
pub fn unpack_callsign(n28: u32) -> Result<String, Error> {
    if n28 == 0 {
        return Ok("DE".to_string());
    }
    if n28 == 1 {
        return Ok("QRZ".to_string());
    }
    if n28 == 2 {
        return Ok("CQ".to_string());
    }

    if n28 >= 3 && n28 < NTOKENS {
        if n28 <= 1002 {
            return Ok(format!("CQ {:03}", n28 - 3));
        }

        let value = n28 - 1003;
        if value <= 26 {
            let ch = char::from_u32('A' as u32 + value - 1).unwrap();
            return Ok(format!("CQ {ch}"));
        }

        let max_2letter = 27 + 27 * 26;
        let max_3letter = max_2letter + 27 * 27 * 26;
        let len = if value < max_2letter {
            2
        } else if value < max_3letter {
            3
        } else {
            4
        };

        let mut chars = Vec::new();
        let mut remaining = value;
        for i in (0..len).rev() {
            let divisor = 27u32.pow(i);
            let idx = remaining / divisor;
            remaining %= divisor;
            if idx == 0 {
                chars.push(' ');
            } else if idx <= 26 {
                chars.push(char::from_u32('A' as u32 + idx - 1).unwrap());
            } else {
                return InvalidCallsignSnafu {
                    callsign: format!("n28={n28}"),
                }
                .fail();
            }
        }
        let suffix: String = chars.iter().collect();
        return Ok(format!("CQ {}", suffix.trim_start()));
    }

    if n28 >= NTOKENS + MAX22 {
        let n = n28 - NTOKENS - MAX22;

        let base = 36 * 10 * 27 * 27 * 27;
        let i1 = (n / base) as usize;
        let mut remainder = n % base;

        let base = 10 * 27 * 27 * 27;
        let i2 = (remainder / base) as usize;
        remainder %= base;

        let base = 27 * 27 * 27;
        let i3 = (remainder / base) as usize;
        remainder %= base;

        let base = 27 * 27;
        let i4 = (remainder / base) as usize;
        remainder %= base;

        let i5 = (remainder / 27) as usize;
        let i6 = (remainder % 27) as usize;

        ensure!(
            i1 < CHARSET_A1.len()
                && i2 < CHARSET_A2.len()
                && i3 < CHARSET_A3.len()
                && i4 < CHARSET_A4.len()
                && i5 < CHARSET_A4.len()
                && i6 < CHARSET_A4.len(),
            InvalidCallsignSnafu {
                callsign: format!("n28={n28}")
            }
        );

        let c1 = CHARSET_A1.chars().nth(i1).unwrap();
        let c2 = CHARSET_A2.chars().nth(i2).unwrap();
        let c3 = CHARSET_A3.chars().nth(i3).unwrap();
        let c4 = CHARSET_A4.chars().nth(i4).unwrap();
        let c5 = CHARSET_A4.chars().nth(i5).unwrap();
        let c6 = CHARSET_A4.chars().nth(i6).unwrap();

        let callsign_6 = format!("{c1}{c2}{c3}{c4}{c5}{c6}");
        return Ok(callsign_6.trim().to_string());
    }

    InvalidCallsignSnafu {
        callsign: format!("n28={n28}"),
    }
    .fail()
}

/// `ihashcall` from WSJT-X: base-38 accumulate the callsign (padded to 11
/// chars), multiply by the fixed magic constant, take the high `m` bits.
fn ihashcall(callsign: &str, m: u32) -> u32 {
    let mut c11 = callsign.to_uppercase();
    while c11.len() < 11 {
        c11.push(' ');
    }
    c11.truncate(11);

    let mut n8: u64 = 0;
    for ch in c11.chars() {
        let j = CHARSET_BASE38.iter().position(|&c| c == ch as u8).unwrap_or(0) as u64;
        n8 = 38 * n8 + j;
    }

    let result = n8.wrapping_mul(47_055_833_459u64);
    let shifted = result >> (64 - m);
    (shifted & ((1u64 << m) - 1)) as u32
}

pub fn hash10(callsign: &str) -> u16 {
    ihashcall(callsign, 10) as u16
}

pub fn hash12(callsign: &str) -> u16 {
    ihashcall(callsign, 12) as u16
}

pub fn hash22(callsign: &str) -> u32 {
    ihashcall(callsign, 22)
}

/// Pack a callsign (or `CQ`/`CQ nnn`/`CQ ABCD`/`DE`/`QRZ`/`<hash call>`)
/// into its 28-bit value.
pub fn pack_callsign(callsign: &str) -> Result<u32, Error> {
    if callsign == "DE" {
        return Ok(0);
    }
    if callsign == "QRZ" {
        return Ok(1);
    }
    if callsign == "CQ" {
        return Ok(2);
    }

    if let Some(suffix) = callsign.strip_prefix("CQ ") {
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            let n: u32 = suffix
                .parse()
                .map_err(|_| Error::InvalidCallsign { callsign: callsign.into() })?;
            ensure!(n <= 999, InvalidCallsignSnafu { callsign });
            return Ok(3 + n);
        }

        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_alphabetic()) {
            let upper = suffix.to_uppercase();
            let len = upper.len();
            ensure!((1..=4).contains(&len), InvalidCallsignSnafu { callsign });

            let mut value = 0u32;
            for (i, ch) in upper.chars().enumerate() {
                let idx = (ch as u32) - ('A' as u32) + 1;
                value += idx * 27u32.pow((len - 1 - i) as u32);
            }
            return Ok(1003 + value);
        }

        return InvalidCallsignSnafu { callsign }.fail();
    }

    if let Some(inner) = callsign.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        return Ok(NTOKENS + hash22(inner));
    }

    let mut base_call = callsign;
    if callsign.contains('/') {
        let parts: Vec<&str> = callsign.split('/').collect();
        ensure!(parts.len() == 2, InvalidCallsignSnafu { callsign });
        base_call = if matches!(parts[1], "P" | "R" | "p" | "r") {
            parts[0]
        } else {
            parts[1]
        };
    }

    let call = base_call.to_uppercase();
    let chars: Vec<char> = call.chars().collect();
    let n = chars.len();
    ensure!((3..=6).contains(&n), InvalidCallsignSnafu { callsign });

    let iarea = (1..n)
        .rev()
        .find(|&i| chars[i].is_ascii_digit())
        .filter(|&pos| (1..=2).contains(&pos))
        .ok_or_else(|| Error::InvalidCallsign { callsign: callsign.into() })?;

    let npdig = chars[..iarea].iter().filter(|c| c.is_ascii_digit()).count();
    let nplet = chars[..iarea].iter().filter(|c| c.is_ascii_alphabetic()).count();
    let nslet = chars[iarea + 1..].iter().filter(|c| c.is_ascii_alphabetic()).count();
    ensure!(nplet > 0 && npdig < iarea && nslet <= 3, InvalidCallsignSnafu { callsign });

    let callsign_6 = if iarea == 1 {
        format!(" {call:<5}")
    } else {
        format!("{call:<6}")
    };
    let c6: Vec<char> = callsign_6.chars().collect();

    let i1 = CHARSET_A1.find(c6[0]).ok_or_else(|| Error::InvalidCallsign { callsign: callsign.into() })?;
    let i2 = CHARSET_A2.find(c6[1]).ok_or_else(|| Error::InvalidCallsign { callsign: callsign.into() })?;
    let i3 = CHARSET_A3.find(c6[2]).ok_or_else(|| Error::InvalidCallsign { callsign: callsign.into() })?;
    let i4 = CHARSET_A4.find(c6[3]).ok_or_else(|| Error::InvalidCallsign { callsign: callsign.into() })?;
    let i5 = CHARSET_A4.find(c6[4]).ok_or_else(|| Error::InvalidCallsign { callsign: callsign.into() })?;
    let i6 = CHARSET_A4.find(c6[5]).ok_or_else(|| Error::InvalidCallsign { callsign: callsign.into() })?;

    let n28 = 36 * 10 * 27 * 27 * 27 * (i1 as u32)
        + 10 * 27 * 27 * 27 * (i2 as u32)
        + 27 * 27 * 27 * (i3 as u32)
        + 27 * 27 * (i4 as u32)
        + 27 * (i5 as u32)
        + (i6 as u32)
        + NTOKENS
        + MAX22;

    Ok(n28 & ((1 << 28) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn rejects_calls_without_digit() {
        assert!(pack_callsign("ABC").is_err());
        assert!(pack_callsign("AB1CDEF").is_err());
        assert!(pack_callsign("A1BCDE").is_err());
    }

    #[test]
    fn angle_bracket_hash_round_trips_through_cache() {
        assert!(pack_callsign("<WB2000XYZ>").is_ok());
        assert!(pack_callsign("WB2000XYZ").is_err());
    }

    #[rstest]
    #[case::cq("CQ", 0b10)]
    #[case::de("DE", 0)]
    #[case::qrz("QRZ", 1)]
    #[case::cq_000("CQ 000", 0b11)]
    #[case::cq_313("CQ 313", 0b100111100)]
    #[case::cq_a("CQ A", 0b1111101100)]
    #[case::cq_sota("CQ SOTA", 0b1011110010110011000)]
    #[case::n0ypr("N0YPR", 0b101001001101100111001101)]
    #[case::k1jt("K1JT", 0b100110111111100110111001)]
    #[case::w1abc("W1ABC", 0b101111111110100010011101)]
    #[case::ka1abc("KA1ABC", 0b1001010111000110010100100001)]
    #[case::aa0aaa("AA0AAA", 0b101001000101101111111110001)]
    fn encode_decode_round_trips(#[case] callsign: &str, #[case] expected_n28: u32) {
        let encoded = pack_callsign(callsign).unwrap();
        assert_eq!(encoded, expected_n28, "encoding {callsign}");
        let decoded = unpack_callsign(expected_n28).unwrap();
        assert_eq!(decoded, callsign.to_uppercase());
    }

    #[rstest]
    #[case("KH1/KH7Z", "KH7Z")]
    #[case("W1/K1ABC", "K1ABC")]
    #[case("K1ABC/P", "K1ABC")]
    #[case("N0YPR/R", "N0YPR")]
    fn slash_callsigns_pack_the_base_call(#[case] slash_call: &str, #[case] base_call: &str) {
        let encoded = pack_callsign(slash_call).unwrap();
        let decoded = unpack_callsign(encoded).unwrap();
        assert_eq!(decoded, base_call);
    }

    #[test]
    fn hash_widths_are_prefixes_of_each_other() {
        let h22 = hash22("KH1/KH7Z");
        let h12 = hash12("KH1/KH7Z");
        let h10 = hash10("KH1/KH7Z");
        assert_eq!((h22 >> 10) as u16, h12);
        assert_eq!((h22 >> 12) as u16, h10);
    }
}
