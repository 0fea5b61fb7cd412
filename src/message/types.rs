use alloc::string::String;
use alloc::vec::Vec;

/// Parsed form of the 77-bit payload. `i3`/`n3` select the variant on the
/// wire; `NonStandard` is the deliberate fallback for message types this
/// codec does not interpret structurally.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Type 1 (i3=1, plain or `/R`) or Type 2 (i3=2, `/P`) standard QSO
    /// message: two callsigns plus a grid, report, or acknowledgment.
    Standard {
        call_to: String,
        call_de: String,
        call_to_suffix: bool,
        call_de_suffix: bool,
        ack: bool,
        extra: String,
        i3: u8,
    },
    /// Type 0, n3=0: arbitrary free text, up to 13 characters.
    FreeText { text: String },
    /// Type 0, n3=5: 71 bits of telemetry, carried as 9 raw bytes.
    Telemetry { bytes9: [u8; 9] },
    /// Any i3/n3 combination this codec doesn't structurally decode
    /// (contest exchanges, DXpedition, field day, WSPR). `raw` is the
    /// full 77-bit payload for callers that want to inspect it further.
    NonStandard { i3: u8, n3: u8, raw: Vec<u8> },
    /// Payload that parsed but whose fields don't form a valid message
    /// (e.g. an unrecognized callsign token).
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_message_is_constructible() {
        let msg = Message::Standard {
            call_to: "CQ".into(),
            call_de: "N0YPR".into(),
            call_to_suffix: false,
            call_de_suffix: true,
            ack: false,
            extra: "DM42".into(),
            i3: 1,
        };
        assert!(matches!(msg, Message::Standard { .. }));
    }
}
