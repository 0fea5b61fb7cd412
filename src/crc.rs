//! CRC-14 over the 77-bit payload (WSJT-X FT4/FT8 convention: zero-extend
//! from 77 to 82 bits, MSB-first, before running the CRC).

use crate::constants::{CRC_POLYNOMIAL, Mode, FT4_XOR_MASK, PAYLOAD_BITS};
use bitvec::prelude::*;
use crc::{Algorithm, Crc};

const CRC_FT: Algorithm<u16> = Algorithm {
    width: 14,
    poly: CRC_POLYNOMIAL,
    init: 0x0,
    refin: false,
    refout: false,
    xorout: 0x0,
    check: 0x0,
    residue: 0x0,
};

const FT_CRC: Crc<u16> = Crc::<u16>::new(&CRC_FT);

/// Compute CRC-14 over `bits`, zero-extended to a multiple of 8 bits for
/// byte packing. `bits` is normally the 77 payload bits.
pub fn crc14(bits: &BitSlice<u8, Msb0>) -> u16 {
    let nbits = bits.len();
    let mut msg: u128 = 0;
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            msg |= 1u128 << (nbits - 1 - i);
        }
    }
    let pad = (8 - (nbits + 5) % 8) % 8;
    let padded = msg << (5 + pad);
    let total_bits = nbits + 5 + pad;
    let nbytes = total_bits / 8;
    let msg_bytes = padded.to_be_bytes();
    let trimmed = &msg_bytes[msg_bytes.len() - nbytes..];
    FT_CRC.checksum(trimmed)
}

/// XOR the first 77 bits of `bits` with FT4's fixed whitening mask,
/// in place. The operation is its own inverse, so the same function
/// applies and undoes the mask.
fn apply_ft4_mask(bits: &mut BitSlice<u8, Msb0>) {
    debug_assert_eq!(bits.len(), PAYLOAD_BITS);
    let mask = BitSlice::<u8, Msb0>::from_slice(&FT4_XOR_MASK);
    for i in 0..PAYLOAD_BITS {
        let masked = bits[i] ^ mask[i];
        bits.set(i, masked);
    }
}

/// Append the CRC-14 of the first 77 bits of `payload` to produce the
/// 91-bit PayloadWithCrc. For `Mode::Ft4`, `payload` is XORed with the
/// fixed whitening mask before the CRC is computed, and the masked bits
/// (not the original payload) are what's stored in the result — this
/// matches what's actually transmitted on the air.
pub fn crc_append(mode: Mode, payload: &BitSlice<u8, Msb0>) -> BitVec<u8, Msb0> {
    debug_assert_eq!(payload.len(), PAYLOAD_BITS);
    let mut masked = payload.to_bitvec();
    if mode == Mode::Ft4 {
        apply_ft4_mask(&mut masked);
    }
    let crc = crc14(&masked);
    let mut out = BitVec::<u8, Msb0>::with_capacity(91);
    out.extend_from_bitslice(&masked);
    for i in (0..14).rev() {
        out.push((crc >> i) & 1 != 0);
    }
    out
}

/// Undo the FT4 whitening mask on a 77-bit payload recovered from a
/// checked PayloadWithCrc. A no-op for FT8.
pub fn unmask_payload(mode: Mode, payload: &mut BitSlice<u8, Msb0>) {
    if mode == Mode::Ft4 {
        apply_ft4_mask(payload);
    }
}

/// Verify the CRC-14 stored in bits 77..91 of a 91-bit PayloadWithCrc.
pub fn crc_check(bits: &BitSlice<u8, Msb0>) -> bool {
    if bits.len() < 91 {
        return false;
    }
    let calculated = crc14(&bits[..77]);
    let received: u16 = bits[77..91].load_be();
    calculated == received
}
