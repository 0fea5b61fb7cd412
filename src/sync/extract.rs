//! Soft-symbol extraction: turn a synced candidate into 174 LDPC log-
//! likelihood ratios, using a per-symbol max-difference approximation of
//! the log-sum-exp LLR.

use super::downsample::downsample_200hz;
use super::fft::fft_real;
use super::{nmax, nsps, Candidate};
use crate::constants::Mode;
use crate::error::Error;

const NFFT_OUT: usize = 4096;
const NFFT_SYM: usize = 32;

/// Data-symbol runs (half-open symbol index ranges) carrying the 174
/// codeword bits; everything else in the slot is Costas sync or ramp.
fn data_runs(mode: Mode) -> Vec<(usize, usize)> {
    match mode {
        Mode::Ft8 => vec![(7, 36), (43, 72)],
        Mode::Ft4 => vec![(5, 34), (38, 67), (71, 100)],
    }
}

fn inverse_gray_map(mode: Mode) -> Vec<u8> {
    let gray = mode.gray_map();
    let mut inv = vec![0u8; gray.len()];
    for (index, &tone) in gray.iter().enumerate() {
        inv[tone as usize] = index as u8;
    }
    inv
}

/// Extract 174 LLRs for `candidate` against `mode`'s tone layout.
pub fn extract_symbols(mode: Mode, signal: &[f32], candidate: &Candidate, llr: &mut [f32]) -> Result<(), Error> {
    let mut s8 = vec![vec![0.0f32; mode.symbol_count()]; mode.tone_count()];
    extract_symbols_with_powers(mode, signal, candidate, llr, &mut s8)
}

/// Extract LLRs and also return the per-tone, per-symbol power array
/// (needed for SNR estimation).
pub fn extract_symbols_with_powers(
    mode: Mode,
    signal: &[f32],
    candidate: &Candidate,
    llr: &mut [f32],
    s8: &mut Vec<Vec<f32>>,
) -> Result<(), Error> {
    if llr.len() < 174 {
        return Err(Error::InvalidInput { message: "LLR buffer too small".into() });
    }

    let nmax = nmax(mode);
    let nsps_full = nsps(mode);
    let nn = mode.symbol_count();
    let tone_count = mode.tone_count();
    let bits_per_symbol = mode.bits_per_symbol();
    let inv_gray = inverse_gray_map(mode);

    let mut cd = vec![(0.0f32, 0.0f32); NFFT_OUT];
    let actual_sample_rate = downsample_200hz(signal, candidate.frequency, &mut cd, nmax, nsps_full)?;
    let nsps_down = (actual_sample_rate * mode.symbol_period_s()).round() as usize;
    let start_offset = (candidate.time_offset * actual_sample_rate) as i32;

    *s8 = vec![vec![0.0f32; nn]; tone_count];

    let mut sym_real = [0.0f32; NFFT_SYM];
    let mut sym_imag = [0.0f32; NFFT_SYM];

    for k in 0..nn {
        let i1 = start_offset + (k as i32) * (nsps_down as i32);
        if i1 < 0 || (i1 as usize + nsps_down) > cd.len() {
            continue;
        }

        for j in 0..NFFT_SYM {
            sym_real[j] = 0.0;
            sym_imag[j] = 0.0;
        }
        for j in 0..nsps_down.min(NFFT_SYM) {
            let idx = i1 as usize + j;
            sym_real[j] = cd[idx].0;
            sym_imag[j] = cd[idx].1;
        }

        fft_real(&mut sym_real, &mut sym_imag, NFFT_SYM)?;

        for tone in 0..tone_count {
            let re = sym_real[tone];
            let im = sym_imag[tone];
            s8[tone][k] = (re * re + im * im).sqrt();
        }
    }

    let mut bit_idx = 0;
    for (start, end) in data_runs(mode) {
        for ks in start..end {
            if bit_idx >= 174 {
                break;
            }
            let mut per_index = vec![0.0f32; tone_count];
            for tone in 0..tone_count {
                per_index[inv_gray[tone] as usize] = s8[tone][ks];
            }

            for bit in 0..bits_per_symbol {
                if bit_idx >= 174 {
                    break;
                }
                let bit_pos = bits_per_symbol - 1 - bit;
                let mut max1 = f32::MIN;
                let mut max0 = f32::MIN;
                for (index, &mag) in per_index.iter().enumerate() {
                    if (index >> bit_pos) & 1 == 1 {
                        max1 = max1.max(mag);
                    } else {
                        max0 = max0.max(mag);
                    }
                }
                llr[bit_idx] = max1 - max0;
                bit_idx += 1;
            }
        }
    }

    normalize_llr(&mut llr[0..174]);

    tracing::trace!(freq = candidate.frequency, dt = candidate.time_offset, "extracted symbols");
    Ok(())
}

fn normalize_llr(llr: &mut [f32]) {
    let n = llr.len() as f32;
    let mean_sq: f32 = llr.iter().map(|x| x * x).sum::<f32>() / n;
    let mean: f32 = llr.iter().sum::<f32>() / n;
    let variance = mean_sq - mean * mean;
    let std_dev = if variance > 0.0 { variance.sqrt() } else { mean_sq.sqrt() };
    if std_dev > 0.0 {
        for v in llr.iter_mut() {
            *v = *v / std_dev * 2.83;
        }
    }
}

/// Estimate per-decode SNR from decoded tone powers: compare the power
/// at each decoded tone against the power at its Costas-opposite tone,
/// clamped to a plausible range.
pub fn calculate_snr(s8: &[Vec<f32>], tones: &[u8]) -> i32 {
    let tone_count = s8.len();
    if tone_count < 2 {
        return -24;
    }

    let mut xsig = 0.0f64;
    let mut xnoi = 0.0f64;
    for (i, &tone) in tones.iter().enumerate() {
        let tone = tone as usize;
        if tone >= tone_count {
            continue;
        }
        let off_tone = (tone + tone_count / 2) % tone_count;
        xsig += (s8[tone][i] as f64).powi(2);
        xnoi += (s8[off_tone][i] as f64).powi(2);
    }

    let snr = if xnoi > 1e-12 && xsig > xnoi {
        let arg = xsig / xnoi - 1.0;
        if arg > 0.1 { 10.0 * arg.log10() - 27.0 } else { -24.0 }
    } else {
        -24.0
    };

    snr.clamp(-24.0, 30.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_symbols_on_silence_produces_174_llrs() {
        let signal = vec![0.0f32; nmax(Mode::Ft8)];
        let candidate = Candidate { frequency: 1500.0, time_offset: 0.5, sync_power: 1.0, baseline_noise: 1e-10 };
        let mut llr = vec![0.0f32; 174];
        extract_symbols(Mode::Ft8, &signal, &candidate, &mut llr).unwrap();
        assert_eq!(llr.len(), 174);
    }

    #[test]
    fn data_runs_cover_174_bits_for_both_modes() {
        for mode in [Mode::Ft8, Mode::Ft4] {
            let symbols: usize = data_runs(mode).iter().map(|(a, b)| b - a).sum();
            assert_eq!(symbols * mode.bits_per_symbol(), 174);
        }
    }

    #[test]
    fn calculate_snr_is_clamped() {
        let s8 = vec![vec![0.0f32; 79]; 8];
        let tones = [0u8; 79];
        let snr = calculate_snr(&s8, &tones);
        assert!(snr >= -24 && snr <= 30);
    }
}
