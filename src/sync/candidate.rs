//! Candidate signal detection and ranking.

use super::{compute_baseline, compute_spectra, compute_sync2d};
use super::{nhsym, nstep, COARSE_LAG, MAX_LAG, NFFT1, NH1, SAMPLE_RATE};
use crate::constants::Mode;
use crate::error::Error;

/// A candidate signal found during coarse sync: a `(time, frequency)`
/// cell with a sync score above threshold.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// Center frequency in Hz.
    pub frequency: f32,
    /// Time offset in seconds from the start of the slot.
    pub time_offset: f32,
    /// Sync quality metric (higher is better), normalized to a relative scale.
    pub sync_power: f32,
    /// Baseline noise power at this frequency (linear scale).
    pub baseline_noise: f32,
}

/// Find peaks in the 2D sync correlation matrix and rank them by quality.
pub fn find_candidates(
    mode: Mode,
    sync2d: &[Vec<f32>],
    ia: usize,
    ib: usize,
    sync_min: f32,
    max_candidates: usize,
    avg_spectrum: &[f32],
) -> Vec<Candidate> {
    let df = SAMPLE_RATE / NFFT1 as f32;
    let tstep = nstep(mode) as f32 / SAMPLE_RATE;

    let mut candidates = Vec::new();

    for i in ia..=ib {
        let mut best_lag = 0i32;
        let mut best_sync = 0.0f32;
        for lag in -COARSE_LAG..=COARSE_LAG {
            let sync_idx = (lag + MAX_LAG) as usize;
            if let Some(row) = sync2d.get(i) {
                if let Some(&sync_val) = row.get(sync_idx) {
                    if sync_val > best_sync {
                        best_sync = sync_val;
                        best_lag = lag;
                    }
                }
            }
        }

        let mut best_lag2 = 0i32;
        let mut best_sync2 = 0.0f32;
        for lag in -MAX_LAG..=MAX_LAG {
            let sync_idx = (lag + MAX_LAG) as usize;
            if let Some(row) = sync2d.get(i) {
                if let Some(&sync_val) = row.get(sync_idx) {
                    if sync_val > best_sync2 {
                        best_sync2 = sync_val;
                        best_lag2 = lag;
                    }
                }
            }
        }

        let baseline_noise = avg_spectrum.get(i).copied().unwrap_or(1e-30).max(1e-30);

        if best_sync > 0.0 {
            candidates.push(Candidate {
                frequency: i as f32 * df,
                time_offset: (best_lag as f32 - 0.5) * tstep,
                sync_power: best_sync,
                baseline_noise,
            });
        }
        if best_lag2 != best_lag && best_sync2 > 0.0 {
            candidates.push(Candidate {
                frequency: i as f32 * df,
                time_offset: (best_lag2 as f32 - 0.5) * tstep,
                sync_power: best_sync2,
                baseline_noise,
            });
        }
    }

    if !candidates.is_empty() {
        let mut sync_values: Vec<f32> = candidates.iter().map(|c| c.sync_power).collect();
        sync_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
        let percentile_idx = (sync_values.len() as f32 * 0.4) as usize;
        let baseline = sync_values[percentile_idx.min(sync_values.len() - 1)];
        if baseline > 0.0 {
            for cand in &mut candidates {
                cand.sync_power /= baseline;
            }
        }
    }

    let mut filtered: Vec<Candidate> = Vec::new();
    for cand in &candidates {
        let is_dupe = filtered.iter().any(|existing: &Candidate| {
            (cand.frequency - existing.frequency).abs() < 4.0 && (cand.time_offset - existing.time_offset).abs() < 0.04
        });
        if !is_dupe && cand.sync_power >= sync_min {
            filtered.push(*cand);
        }
    }

    filtered.sort_by(|a, b| b.sync_power.partial_cmp(&a.sync_power).unwrap_or(core::cmp::Ordering::Equal));
    filtered.truncate(max_candidates);
    filtered
}

/// Run coarse synchronization over `signal`: build the spectrogram,
/// correlate against `mode`'s Costas pattern, and return ranked candidates.
pub fn coarse_sync(
    mode: Mode,
    signal: &[f32],
    freq_min: f32,
    freq_max: f32,
    sync_min: f32,
    max_candidates: usize,
) -> Result<Vec<Candidate>, Error> {
    let mut spectra = vec![vec![0.0f32; nhsym(mode)]; NH1];
    let avg_spectrum = compute_spectra(mode, signal, &mut spectra)?;

    let baseline_db = compute_baseline(&avg_spectrum, freq_min, freq_max);
    let baseline_linear: Vec<f32> = baseline_db.iter().map(|&db| 10.0f32.powf(0.1 * (db - 40.0))).collect();

    let mut sync2d = Vec::new();
    let (ia, ib) = compute_sync2d(mode, &spectra, freq_min, freq_max, &mut sync2d)?;

    Ok(find_candidates(mode, &sync2d, ia, ib, sync_min, max_candidates, &baseline_linear))
}
