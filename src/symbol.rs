//! Map a 174-bit LDPC codeword to a per-mode tone sequence, and back.
//!
//! FT8: `S7 D29 S7 D29 S7` (21 sync symbols, 58 data symbols, 79 total).
//! FT4: a ramp symbol at each end plus four 4-tone Costas blocks framing
//! three 29-symbol data runs (18 sync symbols, 87 data symbols, 105
//! total), and a fixed payload whitening mask applied before CRC.

use alloc::vec::Vec;
use bitvec::prelude::*;

use crate::constants::{Mode, CODEWORD_BITS, FT4_COSTAS, FT8_COSTAS};

fn inverse_gray(map: &[u8]) -> Vec<u8> {
    let mut inv = alloc::vec![0u8; map.len()];
    for (i, &tone) in map.iter().enumerate() {
        inv[tone as usize] = i as u8;
    }
    inv
}

/// Map a 174-bit codeword to a tone sequence for `mode`.
pub fn map(mode: Mode, codeword: &BitSlice<u8, Msb0>) -> Result<Vec<u8>, crate::error::Error> {
    if codeword.len() != CODEWORD_BITS {
        return Err(crate::error::Error::InvalidInput {
            message: alloc::format!("codeword must be {CODEWORD_BITS} bits, got {}", codeword.len()),
        });
    }
    let gray = mode.gray_map();
    let bps = mode.bits_per_symbol();
    let mut symbols = alloc::vec![0u8; mode.symbol_count()];

    match mode {
        Mode::Ft8 => {
            symbols[0..7].copy_from_slice(&FT8_COSTAS);
            symbols[36..43].copy_from_slice(&FT8_COSTAS);
            symbols[72..79].copy_from_slice(&FT8_COSTAS);
            let mut k = 7;
            for j in 0..58 {
                if j == 29 {
                    k += 7;
                }
                let i = bps * j;
                let idx = codeword[i..i + bps].load_be::<u8>();
                symbols[k] = gray[idx as usize];
                k += 1;
            }
        }
        Mode::Ft4 => {
            symbols[0] = 0;
            symbols[104] = 0;
            symbols[1..5].copy_from_slice(&FT4_COSTAS[0]);
            symbols[34..38].copy_from_slice(&FT4_COSTAS[1]);
            symbols[67..71].copy_from_slice(&FT4_COSTAS[2]);
            symbols[100..104].copy_from_slice(&FT4_COSTAS[3]);
            let data_slots: [(usize, usize); 3] = [(5, 34), (38, 67), (71, 100)];
            let mut j = 0usize;
            for (start, end) in data_slots {
                for k in start..end {
                    let i = bps * j;
                    let idx = codeword[i..i + bps].load_be::<u8>();
                    symbols[k] = gray[idx as usize];
                    j += 1;
                }
            }
        }
    }

    Ok(symbols)
}

/// Inverse of [`map`]: recover a 174-bit codeword from a tone sequence.
pub fn demap(mode: Mode, symbols: &[u8]) -> Result<BitVec<u8, Msb0>, crate::error::Error> {
    if symbols.len() != mode.symbol_count() {
        return Err(crate::error::Error::InvalidInput {
            message: alloc::format!("expected {} symbols, got {}", mode.symbol_count(), symbols.len()),
        });
    }
    let gray_inv = inverse_gray(mode.gray_map());
    let bps = mode.bits_per_symbol();
    let mut codeword = BitVec::<u8, Msb0>::repeat(false, CODEWORD_BITS);

    let push_symbol = |codeword: &mut BitVec<u8, Msb0>, i: usize, tone: u8| {
        let idx = gray_inv[tone as usize];
        for b in 0..bps {
            codeword.set(i + b, (idx >> (bps - 1 - b)) & 1 != 0);
        }
    };

    match mode {
        Mode::Ft8 => {
            let mut k = 7;
            for j in 0..58 {
                if j == 29 {
                    k += 7;
                }
                push_symbol(&mut codeword, bps * j, symbols[k]);
                k += 1;
            }
        }
        Mode::Ft4 => {
            let data_slots: [(usize, usize); 3] = [(5, 34), (38, 67), (71, 100)];
            let mut j = 0usize;
            for (start, end) in data_slots {
                for k in start..end {
                    push_symbol(&mut codeword, bps * j, symbols[k]);
                    j += 1;
                }
            }
        }
    }

    Ok(codeword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ft8_costas_is_placed_at_fixed_offsets() {
        let codeword = BitVec::<u8, Msb0>::repeat(false, CODEWORD_BITS);
        let symbols = map(Mode::Ft8, &codeword).unwrap();
        assert_eq!(&symbols[0..7], &FT8_COSTAS);
        assert_eq!(&symbols[36..43], &FT8_COSTAS);
        assert_eq!(&symbols[72..79], &FT8_COSTAS);
    }

    #[test]
    fn ft4_costas_blocks_are_placed_at_fixed_offsets() {
        let codeword = BitVec::<u8, Msb0>::repeat(false, CODEWORD_BITS);
        let symbols = map(Mode::Ft4, &codeword).unwrap();
        assert_eq!(&symbols[1..5], &FT4_COSTAS[0]);
        assert_eq!(&symbols[34..38], &FT4_COSTAS[1]);
        assert_eq!(&symbols[67..71], &FT4_COSTAS[2]);
        assert_eq!(&symbols[100..104], &FT4_COSTAS[3]);
    }

    #[test]
    fn ft8_map_demap_round_trips() {
        let mut codeword = BitVec::<u8, Msb0>::repeat(false, CODEWORD_BITS);
        for i in (0..174).step_by(7) {
            codeword.set(i, true);
        }
        let symbols = map(Mode::Ft8, &codeword).unwrap();
        let recovered = demap(Mode::Ft8, &symbols).unwrap();
        assert_eq!(recovered, codeword);
    }

    #[test]
    fn ft4_map_demap_round_trips() {
        let mut codeword = BitVec::<u8, Msb0>::repeat(false, CODEWORD_BITS);
        for i in (1..174).step_by(5) {
            codeword.set(i, true);
        }
        let symbols = map(Mode::Ft4, &codeword).unwrap();
        let recovered = demap(Mode::Ft4, &symbols).unwrap();
        assert_eq!(recovered, codeword);
    }

    #[test]
    fn matches_wsjtx_ft8_reference_vector() {
        let msg_str = "00000000010111100101100110000000010100100110110011100110110001100111110010001";
        let crc_str = "00001001100101";
        let parity_str = "11100110011001101100100111100011101000010001100111111001100110001110011001011110010";

        let mut codeword = BitVec::<u8, Msb0>::repeat(false, CODEWORD_BITS);
        for (i, c) in msg_str.chars().chain(crc_str.chars()).chain(parity_str.chars()).enumerate() {
            codeword.set(i, c == '1');
        }

        let symbols = map(Mode::Ft8, &codeword).unwrap();
        let expected_str = "3140652000671215006116571652175530543140652375421655752603157715414212433140652";
        let expected: Vec<u8> = expected_str.chars().map(|c| c.to_digit(10).unwrap() as u8).collect();
        assert_eq!(symbols, expected);
    }
}
