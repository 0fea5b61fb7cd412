//! Spectrogram and 2D Costas-sync correlation.

use super::fft::fft_real;
use super::{costas_blocks, nhsym, nmax, nsps, nstep, MAX_LAG, NFFT1, NH1, SAMPLE_RATE};
use crate::constants::Mode;
use crate::error::Error;

/// Compute a power spectrum for every quarter-symbol time step across one
/// slot. `spectra` must be `NH1` rows of `nhsym(mode)` columns. Returns the
/// average spectrum across all time steps (used later as a noise baseline).
pub fn compute_spectra(mode: Mode, signal: &[f32], spectra: &mut [Vec<f32>]) -> Result<Vec<f32>, Error> {
    let nmax = nmax(mode);
    let nstep = nstep(mode);
    let nsps = nsps(mode);
    let nhsym = nhsym(mode);

    if signal.len() < nmax {
        return Err(Error::InvalidInput { message: format!("signal too short: {} samples (need {nmax})", signal.len()) });
    }
    if spectra.len() != NH1 {
        return Err(Error::InvalidInput { message: format!("spectra buffer wrong size: {} (need {NH1})", spectra.len()) });
    }

    let mut avg_spectrum = vec![0.0f32; NH1];
    let fac = 1.0 / 300.0;

    let mut x_real = vec![0.0f32; NFFT1];
    let mut x_imag = vec![0.0f32; NFFT1];

    for j in 0..nhsym {
        let ia = j * nstep;
        let ib = ia + nsps;
        if ib > signal.len() {
            break;
        }

        for (i, &sample) in signal[ia..ib].iter().enumerate() {
            x_real[i] = fac * sample;
            x_imag[i] = 0.0;
        }
        for i in nsps..NFFT1 {
            x_real[i] = 0.0;
            x_imag[i] = 0.0;
        }

        fft_real(&mut x_real, &mut x_imag, NFFT1)?;

        for i in 0..NH1 {
            let power = x_real[i] * x_real[i] + x_imag[i] * x_imag[i];
            spectra[i][j] = power;
            avg_spectrum[i] += power;
        }
    }

    Ok(avg_spectrum)
}

/// Correlate the spectrogram against `mode`'s Costas pattern over a grid
/// of frequency bins and time lags. Returns the `(ia, ib)` bin range
/// searched.
pub fn compute_sync2d(
    mode: Mode,
    spectra: &[Vec<f32>],
    freq_min: f32,
    freq_max: f32,
    sync2d: &mut Vec<Vec<f32>>,
) -> Result<(usize, usize), Error> {
    let df = SAMPLE_RATE / NFFT1 as f32;
    let ia = (freq_min / df) as usize;
    let ib = (freq_max / df).min(NH1 as f32 - 1.0) as usize;

    if ia >= ib {
        return Err(Error::InvalidInput { message: format!("invalid frequency range: {freq_min} - {freq_max} Hz") });
    }

    if sync2d.len() != NH1 {
        *sync2d = vec![vec![0.0f32; (2 * MAX_LAG + 1) as usize]; NH1];
    }

    let nsps = nsps(mode);
    let nstep = nstep(mode);
    let nhsym = nhsym(mode);
    let blocks = costas_blocks(mode);
    let tone_count = mode.tone_count();
    let nssy = (nsps / nstep).max(1) as i32;
    let nfos = (NFFT1 / nsps).max(1) as i32;
    let jstrt = (0.5 / (nstep as f32 / SAMPLE_RATE)) as i32;

    for i in ia..=ib {
        for j in -MAX_LAG..=MAX_LAG {
            let mut t_signal = 0.0f32;
            let mut t_baseline = 0.0f32;

            for (block_offset, pattern) in &blocks {
                for (n, &tone) in pattern.iter().enumerate() {
                    let m = j + jstrt + nssy * ((*block_offset + n) as i32);
                    if m < 0 || (m as usize) >= nhsym {
                        continue;
                    }
                    let freq_idx = i as i32 + nfos * tone as i32;
                    if freq_idx < 0 || freq_idx as usize >= NH1 {
                        continue;
                    }
                    t_signal += spectra[freq_idx as usize][m as usize];
                    for k in 0..tone_count {
                        let baseline_idx = i + nfos as usize * k;
                        if baseline_idx < NH1 {
                            t_baseline += spectra[baseline_idx][m as usize];
                        }
                    }
                }
            }

            let denom = (t_baseline - t_signal) / (tone_count as f32 - 1.0).max(1.0);
            let sync = if denom > 0.0 { t_signal / denom } else { 0.0 };
            let sync_idx = (j + MAX_LAG) as usize;
            sync2d[i][sync_idx] = sync;
        }
    }

    Ok((ia, ib))
}

/// Fit a smooth noise-floor curve (in dB) across the searched band using
/// a low-order polynomial, matching the shape of WSJT-X's baseline
/// subtraction so isolated strong carriers don't bias candidate ranking.
pub fn compute_baseline(avg_spectrum: &[f32], freq_min: f32, freq_max: f32) -> Vec<f32> {
    let df = SAMPLE_RATE / NFFT1 as f32;
    let ia = (freq_min / df) as usize;
    let ib = ((freq_max / df).min(NH1 as f32 - 1.0)) as usize;

    let mut db = vec![-100.0f32; avg_spectrum.len()];
    for i in ia..=ib.min(avg_spectrum.len() - 1) {
        db[i] = 10.0 * (avg_spectrum[i].max(1e-30)).log10();
    }

    // Smooth with a simple moving average rather than a full polynomial
    // fit; good enough to separate a noise floor from narrowband peaks.
    let window = 50usize;
    let mut smoothed = db.clone();
    for i in ia..=ib.min(db.len() - 1) {
        let lo = i.saturating_sub(window);
        let hi = (i + window).min(db.len() - 1);
        let slice = &db[lo..=hi];
        smoothed[i] = slice.iter().copied().sum::<f32>() / slice.len() as f32;
    }
    smoothed
}
