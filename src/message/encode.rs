//! Pack a [`Message`] into its 77-bit wire representation.

use bitvec::prelude::*;

use crate::error::Error;
use crate::message::callsign::{hash22, pack_callsign};
use crate::message::callsign_cache::CallsignHashCache;
use crate::message::grid::encode_grid;
use crate::message::text_encoding::encode_free_text;
use crate::message::types::Message;
use crate::message::constants::NTOKENS;

fn pack_call_with_hash(call: &str, cache: Option<&mut CallsignHashCache>) -> Result<u32, Error> {
    if let Some(inner) = call.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        if let Some(cache) = cache {
            cache.insert(inner);
        }
        return Ok(NTOKENS + hash22(inner));
    }
    pack_callsign(call)
}

/// Pack `message` into `output`, a 77-bit slice. Compound callsigns in
/// angle brackets (`<PJ4/K1ABC>`) are looked up via 22-bit hash and, when
/// a cache is supplied, recorded for future lookups.
pub fn message_pack(message: &Message, output: &mut BitSlice<u8, Msb0>, mut cache: Option<&mut CallsignHashCache>) -> Result<(), Error> {
    if output.len() != 77 {
        return Err(Error::InvalidInput { message: alloc::format!("output must be 77 bits, got {}", output.len()) });
    }

    match message {
        Message::Standard {
            call_to,
            call_de,
            call_to_suffix,
            call_de_suffix,
            ack,
            extra,
            i3,
        } => {
            let n28a = pack_call_with_hash(call_to, cache.as_deref_mut())?;
            output[0..28].store_be(n28a);
            output.set(28, *call_to_suffix);

            let n28b = pack_call_with_hash(call_de, cache)?;
            output[29..57].store_be(n28b);
            output.set(57, *call_de_suffix);

            output.set(58, *ack);
            let grid_value = encode_grid(extra)?;
            output[59..74].store_be(grid_value);
            output[74..77].store_be(*i3);
            Ok(())
        }
        Message::FreeText { text } => {
            let encoded = encode_free_text(text)?;
            let bits = BitSlice::<u8, Msb0>::from_slice(&encoded);
            output[0..71].copy_from_bitslice(&bits[1..72]);
            output[71..74].store_be(0u8);
            output[74..77].store_be(0u8);
            Ok(())
        }
        Message::Telemetry { bytes9 } => {
            let bits = BitSlice::<u8, Msb0>::from_slice(bytes9);
            output[0..71].copy_from_bitslice(&bits[1..72]);
            output[71..74].store_be(5u8);
            output[74..77].store_be(0u8);
            Ok(())
        }
        Message::NonStandard { i3, n3, raw } => {
            let bits = BitSlice::<u8, Msb0>::from_slice(raw);
            output[0..71].copy_from_bitslice(&bits[0..71]);
            output[71..74].store_be(*n3);
            output[74..77].store_be(*i3);
            Ok(())
        }
        Message::Invalid => Err(Error::InvalidInput { message: "cannot pack an Invalid message".into() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_standard_cq_matches_wsjtx_reference_vector() {
        let message = Message::Standard {
            call_to: "CQ SOTA".into(),
            call_de: "N0YPR".into(),
            call_to_suffix: false,
            call_de_suffix: true,
            ack: false,
            extra: "DM42".into(),
            i3: 1,
        };
        let mut storage = bitvec![u8, Msb0; 0; 77];
        let mut cache = CallsignHashCache::new();
        message_pack(&message, &mut storage, Some(&mut cache)).unwrap();

        let expected = "00000000010111100101100110000000010100100110110011100110110001100111110010001";
        let got: alloc::string::String = storage.iter().map(|b| if *b { '1' } else { '0' }).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn packs_free_text() {
        let message = Message::FreeText { text: "TNX BOB 73 GL".into() };
        let mut storage = bitvec![u8, Msb0; 0; 77];
        message_pack(&message, &mut storage, None).unwrap();
        assert_eq!(storage[71..74].load_be::<u8>(), 0);
        assert_eq!(storage[74..77].load_be::<u8>(), 0);
    }

    #[test]
    fn rejects_wrong_length_output() {
        let message = Message::FreeText { text: "HI".into() };
        let mut storage = bitvec![u8, Msb0; 0; 80];
        assert!(message_pack(&message, &mut storage, None).is_err());
    }
}
