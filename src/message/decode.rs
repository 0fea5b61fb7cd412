//! Unpack the 77-bit wire representation back into a [`Message`].

use alloc::vec::Vec;
use bitvec::prelude::*;

use crate::error::Error;
use crate::message::callsign::unpack_callsign;
use crate::message::callsign_cache::CallsignHashCache;
use crate::message::constants::{MAX22, NTOKENS};
use crate::message::grid::decode_grid;
use crate::message::text_encoding::decode_free_text as decode_free_text_bits;
use crate::message::types::Message;

fn unpack_call_with_hash(n28: u32, cache: Option<&CallsignHashCache>) -> Result<alloc::string::String, Error> {
    if n28 >= NTOKENS && n28 < NTOKENS + MAX22 {
        let ihash = n28 - NTOKENS;
        let resolved = cache.and_then(|c| c.lookup_22bit(ihash)).map(alloc::string::ToString::to_string);
        return Ok(resolved.unwrap_or_else(|| alloc::format!("<...{ihash:06X}>")));
    }
    unpack_callsign(n28)
}

/// Unpack a 77-bit `PayloadBits` slice into a [`Message`]. `i3 ∈ {3,4,5}`
/// and unrecognized `i3=0` subtypes fall back to [`Message::NonStandard`]
/// rather than guessing at a structural decode.
pub fn message_unpack(bits: &BitSlice<u8, Msb0>, cache: Option<&CallsignHashCache>) -> Result<Message, Error> {
    if bits.len() != 77 {
        return Err(Error::InvalidInput { message: alloc::format!("input must be 77 bits, got {}", bits.len()) });
    }

    let i3: u8 = bits[74..77].load_be();
    let n3: u8 = bits[71..74].load_be();

    match (i3, n3) {
        (1, _) | (2, _) => decode_standard(bits, i3, cache),
        (0, 0) => decode_free_text_message(bits),
        (0, 5) => decode_telemetry(bits),
        _ => Ok(Message::NonStandard { i3, n3, raw: bits.to_bitvec().into_vec() }),
    }
}

fn decode_standard(bits: &BitSlice<u8, Msb0>, i3: u8, cache: Option<&CallsignHashCache>) -> Result<Message, Error> {
    let n28a: u32 = bits[0..28].load_be();
    let call_to = unpack_call_with_hash(n28a, cache)?;
    let call_to_suffix = bits[28];

    let n28b: u32 = bits[29..57].load_be();
    let call_de = unpack_call_with_hash(n28b, cache)?;
    let call_de_suffix = bits[57];

    let ack = bits[58];
    let grid_value: u16 = bits[59..74].load_be();
    let extra = decode_grid(grid_value)?;

    Ok(Message::Standard {
        call_to,
        call_de,
        call_to_suffix,
        call_de_suffix,
        ack,
        extra,
        i3,
    })
}

fn decode_free_text_message(bits: &BitSlice<u8, Msb0>) -> Result<Message, Error> {
    let mut bytes9 = [0u8; 9];
    {
        let dest = BitSlice::<u8, Msb0>::from_slice_mut(&mut bytes9);
        dest[1..72].copy_from_bitslice(&bits[0..71]);
    }
    let text = decode_free_text_bits(&bytes9)?;
    Ok(Message::FreeText { text: text.trim_end().into() })
}

fn decode_telemetry(bits: &BitSlice<u8, Msb0>) -> Result<Message, Error> {
    let mut bytes9 = [0u8; 9];
    {
        let dest = BitSlice::<u8, Msb0>::from_slice_mut(&mut bytes9);
        dest[1..72].copy_from_bitslice(&bits[0..71]);
    }
    Ok(Message::Telemetry { bytes9 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::encode::message_pack;

    #[test]
    fn unpacks_wsjtx_reference_vector() {
        let bits_str = "00000000010111100101100110000000010100100110110011100110110001100111110010001";
        let mut storage = bitvec![u8, Msb0; 0; 77];
        for (i, c) in bits_str.chars().enumerate() {
            storage.set(i, c == '1');
        }
        let message = message_unpack(&storage, None).unwrap();
        assert_eq!(
            message,
            Message::Standard {
                call_to: "CQ SOTA".into(),
                call_de: "N0YPR".into(),
                call_to_suffix: false,
                call_de_suffix: true,
                ack: false,
                extra: "DM42".into(),
                i3: 1,
            }
        );
    }

    #[test]
    fn pack_unpack_round_trips_free_text() {
        let message = Message::FreeText { text: "HELLO WORLD".into() };
        let mut storage = bitvec![u8, Msb0; 0; 77];
        message_pack(&message, &mut storage, None).unwrap();
        let decoded = message_unpack(&storage, None).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn unrecognized_type_falls_back_to_nonstandard() {
        let mut storage = bitvec![u8, Msb0; 0; 77];
        storage[74..77].store_be(3u8);
        let decoded = message_unpack(&storage, None).unwrap();
        assert!(matches!(decoded, Message::NonStandard { i3: 3, .. }));
    }

    #[test]
    fn rejects_wrong_length_input() {
        let storage = bitvec![u8, Msb0; 0; 50];
        assert!(message_unpack(&storage, None).is_err());
    }
}
