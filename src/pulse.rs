//! Gaussian pulse shaping (GFSK) and baseband waveform synthesis.
//!
//! Produces a phase-continuous audio waveform from a tone sequence: a
//! Gaussian-smoothed frequency-increment buffer is integrated into phase,
//! wrapped to `[-pi, pi]`, and `sin` of the result is emitted. A
//! raised-cosine envelope tapers the first and last `Nspsym/8` samples.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

use crate::constants::SAMPLE_RATE_HZ;
use crate::error::Error;

/// `Nspsym = round(fs * Tsym)`.
pub fn samples_per_symbol(sample_rate: f32, symbol_period_s: f32) -> usize {
    libm::roundf(sample_rate * symbol_period_s) as usize
}

fn gfsk_pulse(bt: f32, t: f32) -> f32 {
    use core::f32::consts::PI;
    let c = PI * libm::sqrtf(2.0 / libm::logf(2.0));
    let arg1 = c * bt * (t + 0.5);
    let arg2 = c * bt * (t - 0.5);
    0.5 * (libm::erff(arg1) - libm::erff(arg2))
}

/// Precompute the length-`3*nsps` Gaussian pulse for bandwidth-time
/// product `bt`, reusable across waveform generations at the same rate.
pub fn compute_pulse(bt: f32, nsps: usize) -> Vec<f32> {
    let mut pulse = vec![0.0f32; 3 * nsps];
    for (i, p) in pulse.iter_mut().enumerate() {
        let tt = (i as f32 - 1.5 * nsps as f32) / nsps as f32;
        *p = gfsk_pulse(bt, tt);
    }
    pulse
}

/// Synthesize a GFSK baseband waveform from a tone sequence.
///
/// `tones[i]` is the 0-based tone index for symbol `i` (so for an 8-FSK
/// mode, `tones` are already in `0..8`). `f0` is the base (tone-0)
/// frequency in Hz.
pub fn synthesize_gfsk(
    tones: &[u8],
    f0: f32,
    bt: f32,
    sample_rate: f32,
    nsps: usize,
) -> Result<Vec<f32>, Error> {
    if tones.is_empty() {
        return Err(Error::InvalidInput {
            message: alloc::string::String::from("tone sequence must not be empty"),
        });
    }
    use core::f32::consts::PI;

    let pulse = compute_pulse(bt, nsps);
    let nsym = tones.len();
    let nwave = nsym * nsps;
    let twopi = 2.0 * PI;
    let dt = 1.0 / sample_rate;
    let hmod = 1.0_f32;

    let dphi_len = (nsym + 2) * nsps;
    let mut dphi = vec![0.0f32; dphi_len];
    let dphi_peak = twopi * hmod / nsps as f32;
    let pulse_len = pulse.len();

    for j in 0..nsym {
        let ib = j * nsps;
        for (k, &p) in pulse.iter().enumerate() {
            if ib + k < dphi_len {
                dphi[ib + k] += dphi_peak * p * tones[j] as f32;
            }
        }
    }

    // Duplicate the first/last symbols into the leading/trailing windows
    // so the pulse shaping stays valid at the boundaries.
    for k in 0..(2 * nsps).min(dphi_len) {
        if nsps + k < pulse_len {
            dphi[k] += dphi_peak * tones[0] as f32 * pulse[nsps + k];
        }
    }
    let last_start = nsym * nsps;
    for k in 0..(2 * nsps).min(dphi_len - last_start) {
        if k < pulse_len {
            dphi[last_start + k] += dphi_peak * tones[nsym - 1] as f32 * pulse[k];
        }
    }

    let f0_dphi = twopi * f0 * dt;
    for d in dphi.iter_mut() {
        *d += f0_dphi;
    }

    let mut waveform = vec![0.0f32; nwave];
    let mut phi = 0.0f32;
    for (k, sample) in waveform.iter_mut().enumerate() {
        let j = nsps + k;
        *sample = libm::sinf(phi);
        phi += dphi[j];
        // Wrap to [-pi, pi].
        phi -= twopi * libm::floorf((phi + PI) / twopi);
    }

    let nramp = nsps / 8;
    for i in 0..nramp {
        let envelope = (1.0 - libm::cosf(twopi * i as f32 / (2.0 * nramp as f32))) / 2.0;
        waveform[i] *= envelope;
    }
    let k1 = nsym * nsps - nramp;
    for i in 0..nramp {
        let envelope = (1.0 + libm::cosf(twopi * i as f32 / (2.0 * nramp as f32))) / 2.0;
        if k1 + i < waveform.len() {
            waveform[k1 + i] *= envelope;
        }
    }

    Ok(waveform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Mode;

    #[test]
    fn pulse_integrates_to_roughly_one() {
        let pulse = compute_pulse(2.0, 1920);
        let sum: f32 = pulse.iter().sum();
        assert!((sum - 1920.0).abs() / 1920.0 < 0.05, "sum={sum}");
    }

    #[test]
    fn pulse_is_symmetric() {
        let pulse = compute_pulse(2.0, 100);
        let n = pulse.len();
        for i in 0..n {
            assert!((pulse[i] - pulse[n - 1 - i]).abs() < 1e-4);
        }
    }

    #[test]
    fn waveform_has_expected_length() {
        let tones = [0u8; 79];
        let nsps = samples_per_symbol(SAMPLE_RATE_HZ, Mode::Ft8.symbol_period_s());
        let wave = synthesize_gfsk(&tones, 1500.0, 2.0, SAMPLE_RATE_HZ, nsps).unwrap();
        assert_eq!(wave.len(), 79 * nsps);
    }

    #[test]
    fn waveform_rms_is_in_unit_range() {
        let mut tones = [0u8; 79];
        for (i, t) in tones.iter_mut().enumerate() {
            *t = (i % 8) as u8;
        }
        let nsps = samples_per_symbol(SAMPLE_RATE_HZ, Mode::Ft8.symbol_period_s());
        let wave = synthesize_gfsk(&tones, 1500.0, 2.0, SAMPLE_RATE_HZ, nsps).unwrap();
        let rms = (wave.iter().map(|s| s * s).sum::<f32>() / wave.len() as f32).sqrt();
        assert!(rms > 0.0 && rms <= 1.0);
    }

    #[test]
    fn envelope_tapers_to_near_zero_at_boundaries() {
        let tones = [3u8; 79];
        let nsps = samples_per_symbol(SAMPLE_RATE_HZ, Mode::Ft8.symbol_period_s());
        let wave = synthesize_gfsk(&tones, 1500.0, 2.0, SAMPLE_RATE_HZ, nsps).unwrap();
        assert!(wave[0].abs() < 0.05);
        assert!(wave[wave.len() - 1].abs() < 0.05);
    }

    #[test]
    fn ft4_waveform_length_matches_mode() {
        let tones = [0u8; 105];
        let nsps = samples_per_symbol(SAMPLE_RATE_HZ, Mode::Ft4.symbol_period_s());
        let wave = synthesize_gfsk(&tones, 1500.0, 1.0, SAMPLE_RATE_HZ, nsps).unwrap();
        assert_eq!(wave.len(), 105 * nsps);
    }
}
