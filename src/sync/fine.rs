//! Fine synchronization: refine a coarse candidate's frequency and
//! timing by correlating against the Costas pattern on a downsampled,
//! baseband-centered copy of the signal.

use super::downsample::downsample_200hz;
use super::{costas_blocks, nmax, nsps, Candidate};
use crate::constants::Mode;
use crate::error::Error;

const NFFT_OUT: usize = 4096;

/// Correlation power between `cd` (downsampled baseband) and `mode`'s
/// Costas pattern at a candidate time offset, in downsampled samples.
pub fn sync_downsampled(mode: Mode, cd: &[(f32, f32)], time_offset: i32, sample_rate: f32) -> f32 {
    let nsps_down = (sample_rate * mode.symbol_period_s()).round() as usize;
    let tone_spacing = mode.tone_spacing_hz();
    let blocks = costas_blocks(mode);

    let mut sync = 0.0f32;
    let mut valid = 0u32;
    let mut total = 0u32;

    for (block_offset, pattern) in &blocks {
        for (k, &tone) in pattern.iter().enumerate() {
            total += 1;
            let symbol_idx = block_offset + k;
            let i1 = time_offset + (symbol_idx as i32) * (nsps_down as i32);
            if i1 < 0 || (i1 as usize + nsps_down) > cd.len() {
                continue;
            }

            let tone_freq_hz = tone as f32 * tone_spacing;
            let dphi = 2.0 * core::f32::consts::PI * tone_freq_hz / sample_rate;
            let mut phi = 0.0f32;
            let mut z = (0.0f32, 0.0f32);
            for j in 0..nsps_down {
                let (wr, wi) = (f32::cos(phi), f32::sin(phi));
                let (sr, si) = cd[i1 as usize + j];
                z.0 += sr * wr + si * wi;
                z.1 += si * wr - sr * wi;
                phi += dphi;
            }
            sync += z.0 * z.0 + z.1 * z.1;
            valid += 1;
        }
    }

    if valid > 0 {
        sync * total as f32 / valid as f32
    } else {
        sync
    }
}

/// Refine `candidate`'s frequency and timing by downsampling to baseband
/// and searching a small window around the coarse estimate. The coarse
/// `sync_power` is preserved for candidate ranking; fine sync only
/// adjusts frequency and time.
pub fn fine_sync(mode: Mode, signal: &[f32], candidate: &Candidate) -> Result<Candidate, Error> {
    let nmax = nmax(mode);
    let nsps = nsps(mode);

    let mut cd = vec![(0.0f32, 0.0f32); NFFT_OUT];
    let actual_sample_rate = downsample_200hz(signal, candidate.frequency, &mut cd, nmax, nsps)?;

    let initial_offset = ((candidate.time_offset + 0.5) * actual_sample_rate) as i32;

    let mut best_time = initial_offset;
    let mut best_sync = 0.0f32;
    for dt in -10..=10 {
        let t_offset = initial_offset + dt;
        let sync = sync_downsampled(mode, &cd, t_offset, actual_sample_rate);
        if sync > best_sync {
            best_sync = sync;
            best_time = t_offset;
        }
    }

    let mut best_freq = candidate.frequency;
    for df in -5..=5 {
        let test_freq = candidate.frequency + df as f32 * 0.5;
        let mut cd_test = vec![(0.0f32, 0.0f32); NFFT_OUT];
        let Ok(test_rate) = downsample_200hz(signal, test_freq, &mut cd_test, nmax, nsps) else { continue };
        let sync = sync_downsampled(mode, &cd_test, best_time, test_rate);
        if sync > best_sync {
            best_sync = sync;
            best_freq = test_freq;
        }
    }

    let final_sample_rate = downsample_200hz(signal, best_freq, &mut cd, nmax, nsps)?;
    let mut final_best_time = best_time;
    let mut final_best_sync = 0.0f32;
    for dt in -4..=4 {
        let t_offset = best_time + dt;
        let sync = sync_downsampled(mode, &cd, t_offset, final_sample_rate);
        if sync > final_best_sync {
            final_best_sync = sync;
            final_best_time = t_offset;
        }
    }
    best_time = final_best_time;

    let refined_time = best_time as f32 / final_sample_rate;

    tracing::trace!(freq_in = candidate.frequency, freq_out = best_freq, dt_out = refined_time, "fine sync refined candidate");

    Ok(Candidate {
        frequency: best_freq,
        time_offset: refined_time,
        sync_power: candidate.sync_power,
        baseline_noise: candidate.baseline_noise,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fine_sync_preserves_coarse_sync_power() {
        let signal = vec![0.0f32; nmax(Mode::Ft8)];
        let candidate = Candidate { frequency: 1500.0, time_offset: 0.0, sync_power: 3.5, baseline_noise: 1e-10 };
        let refined = fine_sync(Mode::Ft8, &signal, &candidate).unwrap();
        assert_eq!(refined.sync_power, 3.5);
    }
}
