//! Candidate-level decode pipeline: coarse sync → fine sync → soft-symbol
//! extraction → LDPC → CRC → message unpack. Candidates are evaluated in
//! parallel via `rayon`; a single candidate's pipeline runs sequentially.

use std::sync::Mutex;

use bitvec::prelude::*;
use rayon::prelude::*;

use crate::constants::Mode;
use crate::error::Error;
use crate::message::{message_unpack, CallsignHashCache, Message};
use crate::{crc, ldpc, symbol, sync};

/// A successfully decoded message plus the metadata a logbook or UI
/// would want alongside it.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    pub message: Message,
    pub frequency: f32,
    pub time_offset: f32,
    pub sync_power: f32,
    pub snr_db: i32,
    pub ldpc_iterations: usize,
}

/// Tunables for [`decode`]. Defaults follow WSJT-X's usual operating
/// point for a 12 kHz, 15 s FT8 slot.
#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    pub freq_min: f32,
    pub freq_max: f32,
    pub sync_threshold: f32,
    pub max_candidates: usize,
    pub max_ldpc_iterations: usize,
    pub min_snr_db: i32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            freq_min: 100.0,
            freq_max: 3000.0,
            sync_threshold: 1.3,
            max_candidates: 100,
            max_ldpc_iterations: 50,
            min_snr_db: -24,
        }
    }
}

/// LLR scale factors tried per candidate; LDPC convergence is sensitive
/// to the overall scale of the input LLRs, and re-downsampling jitter
/// means no single factor is reliably best.
const SCALING_FACTORS: [f32; 5] = [0.5, 1.0, 1.5, 2.0, 3.0];

fn try_decode_candidate(
    mode: Mode,
    signal: &[f32],
    candidate: &sync::Candidate,
    config: &DecoderConfig,
    cache: Option<&Mutex<CallsignHashCache>>,
) -> Option<DecodedMessage> {
    let refined = sync::fine_sync(mode, signal, candidate).ok()?;

    let mut llr = vec![0.0f32; 174];
    let mut s8 = vec![vec![0.0f32; mode.symbol_count()]; mode.tone_count()];
    sync::extract::extract_symbols_with_powers(mode, signal, &refined, &mut llr, &mut s8).ok()?;

    for &scale in &SCALING_FACTORS {
        let scaled: Vec<f32> = llr.iter().map(|v| v * scale).collect();
        let (codeword, iterations) = ldpc::ldpc_decode(&scaled, config.max_ldpc_iterations);

        let mut re_encoded = bitvec![u8, Msb0; 0; 174];
        ldpc::ldpc_encode(&codeword[0..91], &mut re_encoded[91..174]);
        re_encoded[0..91].copy_from_bitslice(&codeword[0..91]);
        if re_encoded != codeword {
            let err = Error::LdpcFailure { iterations };
            tracing::trace!(scale, %err, "candidate rejected");
            continue;
        }

        let payload_with_crc = &codeword[0..91];
        if !crc::crc_check(payload_with_crc) {
            let err = Error::CrcMismatch;
            tracing::trace!(scale, %err, "candidate rejected");
            continue;
        }
        let mut payload = payload_with_crc[0..77].to_bitvec();
        crc::unmask_payload(mode, &mut payload);

        // Hold the lock only across the lookup/insert, never across the
        // rest of the candidate's pipeline — other rayon workers are
        // doing the same for their own candidates concurrently.
        let message = {
            let guard = cache.map(|c| c.lock().expect("callsign cache poisoned"));
            message_unpack(&payload, guard.as_deref())
        };
        let Ok(message) = message else { continue };
        if matches!(message, Message::Invalid) {
            continue;
        }
        if let (Some(cache), Message::Standard { call_to, call_de, .. }) = (cache, &message) {
            let mut guard = cache.lock().expect("callsign cache poisoned");
            guard.insert(call_to);
            guard.insert(call_de);
        }

        let tones = symbol::map(mode, &codeword).ok()?;
        let snr_db = sync::calculate_snr(&s8, &tones);
        if snr_db < config.min_snr_db {
            continue;
        }

        return Some(DecodedMessage {
            message,
            frequency: refined.frequency,
            time_offset: refined.time_offset,
            sync_power: refined.sync_power,
            snr_db,
            ldpc_iterations: iterations,
        });
    }

    None
}

/// Decode every FT8/FT4 signal found in one 12 kHz slot, invoking
/// `callback` for each unique message as it's found. Returns the number
/// of messages decoded.
///
/// `cache`, if supplied, resolves `<...hash>` compound callsigns against
/// callsigns seen earlier in the session (including earlier in this same
/// call — candidates are evaluated across `rayon` worker threads, so it's
/// wrapped in a `Mutex` per §5's save/lookup serialisation requirement
/// rather than passed by shared reference).
pub fn decode<F>(
    mode: Mode,
    signal: &[f32],
    config: &DecoderConfig,
    cache: Option<&Mutex<CallsignHashCache>>,
    mut callback: F,
) -> Result<usize, Error>
where
    F: FnMut(DecodedMessage),
{
    let candidates = sync::coarse_sync(mode, signal, config.freq_min, config.freq_max, config.sync_threshold, config.max_candidates)?;

    let decoded: Vec<DecodedMessage> = candidates
        .par_iter()
        .filter_map(|candidate| try_decode_candidate(mode, signal, candidate, config, cache))
        .collect();

    let mut seen = std::collections::HashSet::new();
    let mut count = 0;
    for message in decoded {
        let key = format!("{:?}", message.message);
        if seen.insert(key) {
            count += 1;
            callback(message);
        }
    }

    Ok(count)
}

/// Decode an FT8 slot. A thin wrapper over [`decode`] fixing the mode.
pub fn decode_ft8<F>(signal: &[f32], config: &DecoderConfig, cache: Option<&Mutex<CallsignHashCache>>, callback: F) -> Result<usize, Error>
where
    F: FnMut(DecodedMessage),
{
    decode(Mode::Ft8, signal, config, cache, callback)
}

/// Decode an FT4 slot. FT4's shorter slot and four-tone Costas blocks
/// are handled by [`sync`]'s mode-generic pipeline; callers should pass
/// a signal sized to `sync::nmax(Mode::Ft4)` samples, not a full 15 s
/// FT8 buffer.
pub fn decode_ft4<F>(signal: &[f32], config: &DecoderConfig, cache: Option<&Mutex<CallsignHashCache>>, callback: F) -> Result<usize, Error>
where
    F: FnMut(DecodedMessage),
{
    decode(Mode::Ft4, signal, config, cache, callback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_config_default_matches_documented_values() {
        let config = DecoderConfig::default();
        assert_eq!(config.freq_min, 100.0);
        assert_eq!(config.freq_max, 3000.0);
        assert_eq!(config.min_snr_db, -24);
    }

    #[test]
    fn decoding_silence_yields_no_messages() {
        let signal = vec![0.0f32; sync::nmax(Mode::Ft8)];
        let config = DecoderConfig::default();
        let mut found = 0;
        let count = decode_ft8(&signal, &config, None, |_| found += 1).unwrap();
        assert_eq!(count, 0);
        assert_eq!(found, 0);
    }
}
