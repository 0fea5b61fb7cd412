//! (174,91) LDPC channel code: systematic encode from a fixed generator
//! matrix, and belief-propagation (sum-product) decode from soft LLRs.
//!
//! The generator matrix below is WSJT-X's `ldpc_174_91_c` data, stored as
//! 83 rows of 23 hex digits (91 bits each, zero padded). The parity-check
//! matrix used for decoding is derived from it rather than transcribed as
//! a second hardcoded table: for a systematic code `codeword = [m | m*G]`,
//! the relation `H = [G | I_83]` holds by construction, so decode operates
//! against exactly the same data the encoder is tested against. This
//! trades the real code's column-weight-3 sparsity (each of the 174
//! columns in the production WSJT-X parity-check matrix touches only 3 of
//! the 83 checks) for a denser graph with no spurious edges; the
//! round-trip invariant (encode then decode recovers the same codeword
//! with zero syndrome errors) holds regardless, since it only depends on
//! `G * H^T = 0`, not sparsity. Convergence under channel noise is weaker
//! than the production matrix would give.

use alloc::vec;
use alloc::vec::Vec;
use bitvec::prelude::*;
use once_cell::sync::Lazy;

use crate::constants::{LDPC_K, LDPC_M, LDPC_N};

const K: usize = LDPC_K;
const M: usize = LDPC_M;
const N: usize = LDPC_N;

const GENERATOR_MATRIX_HEX: [&str; 83] = [
    "8329ce11bf31eaf509f27fc",
    "761c264e25c259335493132",
    "dc265902fb277c6410a1bdc",
    "1b3f417858cd2dd33ec7f62",
    "09fda4fee04195fd034783a",
    "077cccc11b8873ed5c3d48a",
    "29b62afe3ca036f4fe1a9da",
    "6054faf5f35d96d3b0c8c3e",
    "e20798e4310eed27884ae90",
    "775c9c08e80e26ddae56318",
    "b0b811028c2bf997213487c",
    "18a0c9231fc60adf5c5ea32",
    "76471e8302a0721e01b12b8",
    "ffbccb80ca8341fafb47b2e",
    "66a72a158f9325a2bf67170",
    "c4243689fe85b1c51363a18",
    "0dff739414d1a1b34b1c270",
    "15b48830636c8b99894972e",
    "29a89c0d3de81d665489b0e",
    "4f126f37fa51cbe61bd6b94",
    "99c47239d0d97d3c84e0940",
    "1919b75119765621bb4f1e8",
    "09db12d731faee0b86df6b8",
    "488fc33df43fbdeea4eafb4",
    "827423ee40b675f756eb5fe",
    "abe197c484cb74757144a9a",
    "2b500e4bc0ec5a6d2bdbdd0",
    "c474aa53d70218761669360",
    "8eba1a13db3390bd6718cec",
    "753844673a27782cc42012e",
    "06ff83a145c37035a5c1268",
    "3b37417858cc2dd33ec3f62",
    "9a4a5a28ee17ca9c324842c",
    "bc29f465309c977e89610a4",
    "2663ae6ddf8b5ce2bb29488",
    "46f231efe457034c1814418",
    "3fb2ce85abe9b0c72e06fbe",
    "de87481f282c153971a0a2e",
    "5d926b6dd71f085181a4e12",
    "66ab79d4b29ee6e69509e56",
    "958148682d748a38dd68baa",
    "b8ce020cf069c32a723ab14",
    "f4331d6d461607e95752746",
    "6da23ba424b9596133cf9c8",
    "a636bcbc7b30c5fbeae67fe",
    "5cb0d86a07df654a9089a20",
    "f11f106848780fc9ecdd80a",
    "1fbb5364fb8d2c9d730d5ba",
    "fcb86bc70a50c9d02a5d034",
    "a534433029eac15f322e34c",
    "c989d9c7c3d3b8c55d75130",
    "7bb38b2f0186d46643ae962",
    "2644ebadeb44b9467d1f42c",
    "608cc857594bfbb55d69600",
    "dbf3c4c3802de32c02eaf10",
    "a1b7ad9437fba48e54c94e6",
    "3e937c2bfb22ba2baf55ee8",
    "9a8bad1a00cd9ba073955b0",
    "c1edb5e4d34f5a7cb17d8f4",
    "eb27bc7c9d21ba6e44f83a4",
    "74c3fa78bc55c1636abce0c",
    "f7ee78f1a3437c0b7392a4c",
    "ee32ee4f0a60f5cc1a47df6",
    "7e93e2a38e7a9061faf696e",
    "b8ab834cdf925f383a29e70",
    "0fe6d14bcf7e0b9fce274fc",
    "a20b1354dde2a0d075c4d54",
    "7cecc6cfee4a507c54f0208",
    "1f9a1cff2f467b3eb46434c",
    "21bf5672bbe1d0a0b8de50e",
    "194a77c23d6fe008b76a7b0",
    "34c6b1e9e0b3c90abf1f3f8",
    "e81654412c20d6b4e13e64e",
    "b6fe94ea85f217bb9bac102",
    "6dac71725f189d7fc04fd94",
    "d28c4d1a25b7033e50e2dca",
    "7491de4fcbf35b15bf0cf5e",
    "4a6f0a7c6accdb3aa243e8c",
    "2487e56ca5c5f4d0734f56a",
    "2e7870ba990471e0843eb92",
    "9b8ef3cb9bb98eb32a6d6fa",
    "f1a17ab0def05dac02ab1b0",
    "c9e4a5e6f9a5a70c3deee96",
    "44eb4d0dbcd40eaf0e6f0c0",
];

fn get_generator_bit(row: usize, col: usize) -> u8 {
    if row >= M || col >= K {
        return 0;
    }
    let hex_str = GENERATOR_MATRIX_HEX[row];
    let hex_idx = col / 4;
    let bit_pos = col % 4;
    if hex_idx >= hex_str.len() || (hex_idx == 22 && bit_pos >= 3) {
        return 0;
    }
    let hex_char = hex_str.as_bytes()[hex_idx] as char;
    let digit = match hex_char {
        '0'..='9' => (hex_char as u8) - b'0',
        'a'..='f' => (hex_char as u8) - b'a' + 10,
        'A'..='F' => (hex_char as u8) - b'A' + 10,
        _ => 0,
    };
    ((digit >> (3 - bit_pos)) & 1) as u8
}

/// Systematic LDPC(174,91) encode: copy the message into the low 91 bits
/// and compute the 83 parity bits as `p_i = parity(message & G[i])`.
pub fn ldpc_encode(message: &BitSlice<u8, Msb0>, codeword: &mut BitSlice<u8, Msb0>) {
    assert_eq!(message.len(), K, "message must be {K} bits");
    assert_eq!(codeword.len(), N, "codeword must be {N} bits");

    codeword[..K].copy_from_bitslice(message);
    for i in 0..M {
        let mut parity = false;
        for j in 0..K {
            parity ^= message[j] & (get_generator_bit(i, j) != 0);
        }
        codeword.set(K + i, parity);
    }
}

/// Sparse parity-check graph: for each check, the variable indices it
/// touches; for each variable, the checks it participates in.
struct ParityGraph {
    check_to_vars: Vec<Vec<usize>>,
    var_to_checks: Vec<Vec<usize>>,
}

static GRAPH: Lazy<ParityGraph> = Lazy::new(build_graph);

// Column weight here is `popcount` of each generator row's relevant bits,
// not the production matrix's fixed 3 — measured min=30/max=52/avg≈42
// across the 91 message-bit columns. Every check a variable participates
// in passes it a message built from ~40 others instead of 2, so belief
// propagation converges on a narrower class of error patterns than WSJT-X's
// real sparse matrix would; see the module doc comment for why this graph
// is derived from `GENERATOR_MATRIX_HEX` rather than a transcribed table.
fn build_graph() -> ParityGraph {
    let mut check_to_vars = vec![Vec::new(); M];
    let mut var_to_checks = vec![Vec::new(); N];
    for check in 0..M {
        for j in 0..K {
            if get_generator_bit(check, j) != 0 {
                check_to_vars[check].push(j);
                var_to_checks[j].push(check);
            }
        }
        let parity_var = K + check;
        check_to_vars[check].push(parity_var);
        var_to_checks[parity_var].push(check);
    }
    ParityGraph {
        check_to_vars,
        var_to_checks,
    }
}

fn clamp(x: f32, bound: f32) -> f32 {
    x.max(-bound).min(bound)
}

/// Belief-propagation decode of `llr` (length 174, positive => bit 0 more
/// likely) returning the most probable codeword and its syndrome error
/// count. Per the sign convention, `errors == 0` is the only success case.
pub fn ldpc_decode(llr: &[f32], max_iterations: usize) -> (BitVec<u8, Msb0>, usize) {
    assert_eq!(llr.len(), N);
    let graph = &*GRAPH;

    // m[j][k] / e[j][k]: messages on the k-th edge of check j, in the
    // order check_to_vars[j] lists variables.
    let mut m: Vec<Vec<f32>> = graph
        .check_to_vars
        .iter()
        .map(|vars| vars.iter().map(|&v| llr[v]).collect())
        .collect();
    let mut e: Vec<Vec<f32>> = graph.check_to_vars.iter().map(|vars| vec![0.0; vars.len()]).collect();

    let mut best_codeword = BitVec::<u8, Msb0>::repeat(false, N);
    let mut best_errors = N;

    for _iter in 0..max_iterations.max(1) {
        // Step 1: check-to-variable messages.
        for j in 0..M {
            let vars = &graph.check_to_vars[j];
            for (k, _) in vars.iter().enumerate() {
                let mut a = 1.0f32;
                for (k2, _) in vars.iter().enumerate() {
                    if k2 != k {
                        a *= -((clamp(m[j][k2], 20.0) / 2.0).tanh());
                    }
                }
                let a = clamp(a, 0.999_999);
                e[j][k] = -2.0 * a.atanh();
            }
        }

        // Step 2: hard decision per variable from channel LLR + incoming checks.
        let mut bits = BitVec::<u8, Msb0>::repeat(false, N);
        let mut total = vec![0.0f32; N];
        for j in 0..M {
            for (k, &v) in graph.check_to_vars[j].iter().enumerate() {
                total[v] += e[j][k];
            }
        }
        for v in 0..N {
            bits.set(v, (llr[v] + total[v]) <= 0.0);
        }

        // Step 3: syndrome check.
        let mut errors = 0;
        for j in 0..M {
            let parity = graph.check_to_vars[j].iter().fold(false, |acc, &v| acc ^ bits[v]);
            if parity {
                errors += 1;
            }
        }
        if errors < best_errors {
            best_errors = errors;
            best_codeword = bits;
        }
        if errors == 0 {
            break;
        }

        // Step 4: variable-to-check messages for next iteration.
        for j in 0..M {
            for (k, &v) in graph.check_to_vars[j].iter().enumerate() {
                let sum_other: f32 = graph.var_to_checks[v]
                    .iter()
                    .filter(|&&j2| j2 != j)
                    .map(|&j2| {
                        let idx = graph.check_to_vars[j2].iter().position(|&vv| vv == v).unwrap();
                        e[j2][idx]
                    })
                    .sum();
                m[j][k] = llr[v] + sum_other;
            }
        }
    }

    (best_codeword, best_errors)
}
