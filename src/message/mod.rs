//! The 77-bit message codec: human-readable text in, `PayloadBits` out,
//! and back. Callsigns that don't fit the 28-bit packed form round-trip
//! through a [`CallsignHashCache`] shared across a decode session.

pub mod callsign;
pub mod callsign_cache;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod grid;
pub mod parser;
pub mod text_encoding;
pub mod types;

pub use callsign_cache::CallsignHashCache;
pub use decode::message_unpack;
pub use encode::message_pack;
pub use parser::parse_message;
pub use types::Message;

use bitvec::prelude::*;

use crate::error::Error;

/// Parse `text` and pack it into a 77-bit payload in one step.
pub fn message_encode(text: &str, output: &mut BitSlice<u8, Msb0>, cache: &mut CallsignHashCache) -> Result<(), Error> {
    let message = parser::parse_message(text)?;
    encode::message_pack(&message, output, Some(cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_encode_decode_round_trip() {
        let mut cache = CallsignHashCache::new();
        let mut storage = bitvec![u8, Msb0; 0; 77];
        message_encode("CQ N0YPR DM42", &mut storage, &mut cache).unwrap();
        let decoded = message_unpack(&storage, Some(&cache)).unwrap();
        assert_eq!(
            decoded,
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
}
