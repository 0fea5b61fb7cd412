//! Text classification: turn a human-readable message string into a
//! [`Message`], the form [`crate::message::encode`] knows how to pack.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::Error;
use crate::message::types::Message;

/// Strip a single trailing `/R` or `/P` suffix. Combining both is rejected:
/// if what's left after stripping still ends in a recognized suffix, the
/// callsign is returned unstripped, which carries the extra slash into
/// `pack_callsign`'s compound-call split and fails its `parts.len() == 2`
/// check there.
fn parse_suffix(callsign: &str) -> (String, bool, u8) {
    if let Some(base) = callsign.strip_suffix("/R") {
        if base.ends_with("/R") || base.ends_with("/P") {
            return (callsign.to_string(), false, 1);
        }
        (base.to_string(), true, 1)
    } else if let Some(base) = callsign.strip_suffix("/P") {
        if base.ends_with("/R") || base.ends_with("/P") {
            return (callsign.to_string(), false, 1);
        }
        (base.to_string(), true, 2)
    } else {
        (callsign.to_string(), false, 1)
    }
}

fn is_valid_callsign_token(callsign: &str) -> bool {
    callsign == "CQ"
        || callsign == "DE"
        || callsign == "QRZ"
        || callsign.starts_with("CQ ")
        || (callsign.starts_with('<') && callsign.ends_with('>'))
        || crate::message::callsign::pack_callsign(callsign).is_ok()
}

/// Classify `text` into a [`Message`]. Unrecognized text that still fits
/// the free-text alphabet falls back to `FreeText`; anything the parser
/// can't make sense of returns `Message::Invalid`.
pub fn parse_message(text: &str) -> Result<Message, Error> {
    let trimmed = text.trim();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    match parts.len() {
        2 => parse_two_word(&parts),
        3 => parse_three_word(&parts),
        4 => parse_four_word(&parts),
        _ => parse_fallback(trimmed),
    }
}

fn parse_two_word(parts: &[&str]) -> Result<Message, Error> {
    let call_to = parts[0].to_uppercase();
    let call_de = parts[1].to_uppercase();
    let (base_to, suffix_to, _) = parse_suffix(&call_to);
    let (base_de, suffix_de, _) = parse_suffix(&call_de);

    if !is_valid_callsign_token(&base_to) || !is_valid_callsign_token(&base_de) {
        return parse_fallback(&format!("{call_to} {call_de}"));
    }

    Ok(Message::Standard {
        call_to: base_to,
        call_de: base_de,
        call_to_suffix: suffix_to,
        call_de_suffix: suffix_de,
        ack: false,
        extra: String::new(),
        i3: 1,
    })
}

fn parse_three_word(parts: &[&str]) -> Result<Message, Error> {
    let call_to = parts[0].to_uppercase();
    let call_de = parts[1].to_uppercase();
    let extra = parts[2].to_uppercase();

    let (base_to, suffix_to, itype_to) = parse_suffix(&call_to);
    let (base_de, suffix_de, itype_de) = parse_suffix(&call_de);

    if !is_valid_callsign_token(&base_to) || !is_valid_callsign_token(&base_de) {
        return parse_fallback(&format!("{call_to} {call_de} {extra}"));
    }

    let (ack, final_extra) = if let Some(stripped) = extra.strip_prefix('R') {
        if stripped.starts_with('+') || stripped.starts_with('-') {
            (true, stripped.to_string())
        } else {
            (false, extra)
        }
    } else {
        (false, extra)
    };

    let i3 = if itype_to == 2 || itype_de == 2 { 2 } else { 1 };

    Ok(Message::Standard {
        call_to: base_to,
        call_de: base_de,
        call_to_suffix: suffix_to,
        call_de_suffix: suffix_de,
        ack,
        extra: final_extra,
        i3,
    })
}

fn parse_four_word(parts: &[&str]) -> Result<Message, Error> {
    if parts[2].eq_ignore_ascii_case("R") {
        let call_to = parts[0].to_uppercase();
        let call_de = parts[1].to_uppercase();
        let extra = parts[3].to_uppercase();
        let (base_to, suffix_to, itype_to) = parse_suffix(&call_to);
        let (base_de, suffix_de, itype_de) = parse_suffix(&call_de);

        if is_valid_callsign_token(&base_to) && is_valid_callsign_token(&base_de) {
            let i3 = if itype_to == 2 || itype_de == 2 { 2 } else { 1 };
            return Ok(Message::Standard {
                call_to: base_to,
                call_de: base_de,
                call_to_suffix: suffix_to,
                call_de_suffix: suffix_de,
                ack: true,
                extra,
                i3,
            });
        }
    }

    // "CQ <modifier> CALL GRID"
    if parts[0].eq_ignore_ascii_case("CQ") {
        let call_to = format!("CQ {}", parts[1].to_uppercase());
        let call_de = parts[2].to_uppercase();
        let extra = parts[3].to_uppercase();
        let (base_de, suffix_de, itype_de) = parse_suffix(&call_de);
        if is_valid_callsign_token(&base_de) {
            let i3 = if itype_de == 2 { 2 } else { 1 };
            return Ok(Message::Standard {
                call_to,
                call_de: base_de,
                call_to_suffix: false,
                call_de_suffix: suffix_de,
                ack: false,
                extra,
                i3,
            });
        }
    }

    parse_fallback(&parts.join(" "))
}

fn parse_fallback(trimmed: &str) -> Result<Message, Error> {
    if trimmed.len() <= 18 && !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        let hex_string = format!("{:0>18}", trimmed.to_uppercase());
        let mut bytes9 = [0u8; 9];
        // 71 bits packed MSB-first into 9 bytes, mirroring encode_free_text's layout.
        let value = u128::from_str_radix(&hex_string, 16).map_err(|_| Error::InvalidCharacter)?;
        let masked = value & ((1u128 << 71) - 1);
        let be = masked.to_be_bytes();
        bytes9.copy_from_slice(&be[be.len() - 9..]);
        return Ok(Message::Telemetry { bytes9 });
    }

    if trimmed.len() <= 13 {
        const CHARSET: &str = " 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ+-./?";
        let upper = trimmed.to_uppercase();
        if upper.chars().all(|c| CHARSET.contains(c)) {
            return Ok(Message::FreeText { text: upper });
        }
    }

    Ok(Message::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cq_with_grid() {
        let msg = parse_message("CQ N0YPR DM42").unwrap();
        assert_eq!(
            msg,
            Message::Standard {
                call_to: "CQ".into(),
                call_de: "N0YPR".into(),
                call_to_suffix: false,
                call_de_suffix: false,
                ack: false,
                extra: "DM42".into(),
                i3: 1,
            }
        );
    }

    #[test]
    fn parses_directed_cq() {
        let msg = parse_message("CQ SOTA N0YPR DM42").unwrap();
        assert_eq!(
            msg,
            Message::Standard {
                call_to: "CQ SOTA".into(),
                call_de: "N0YPR".into(),
                call_to_suffix: false,
                call_de_suffix: false,
                ack: false,
                extra: "DM42".into(),
                i3: 1,
            }
        );
    }

    #[test]
    fn parses_portable_suffix_as_i3_2() {
        let msg = parse_message("CQ G4ABC/P IO91").unwrap();
        assert!(matches!(msg, Message::Standard { i3: 2, .. }));
    }

    #[test]
    fn parses_rover_suffix_as_i3_1() {
        let msg = parse_message("CQ N0YPR/R DM42").unwrap();
        assert!(matches!(msg, Message::Standard { i3: 1, call_de_suffix: true, .. }));
    }

    #[test]
    fn rejects_combined_suffixes() {
        let msg = parse_message("CQ N0YPR/R/P DM42").unwrap();
        assert_eq!(msg, Message::Invalid);
    }

    #[test]
    fn parses_free_text_fallback() {
        let msg = parse_message("TNX BOB 73 GL").unwrap();
        assert_eq!(msg, Message::FreeText { text: "TNX BOB 73 GL".into() });
    }
}
