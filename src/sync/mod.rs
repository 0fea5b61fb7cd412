//! Spectrogram construction and Costas-sync search.
//!
//! Both FT8 and FT4 share the same pipeline shape: build a power
//! spectrogram, correlate a Costas template against it over a grid of
//! `(time, frequency)` to find candidates, refine each candidate with a
//! finer local search, then extract soft symbol metrics. The geometry
//! (symbols per slot, samples per symbol, Costas block layout) differs
//! per [`Mode`] and is threaded through as a parameter rather than baked
//! into constants.

mod fft;
mod spectra;
mod downsample;
pub mod candidate;
pub mod fine;
pub mod extract;

pub use candidate::{Candidate, coarse_sync, find_candidates};
pub use fine::{fine_sync, sync_downsampled};
pub use extract::{extract_symbols, extract_symbols_with_powers, calculate_snr};
pub use downsample::downsample_200hz;
pub use spectra::{compute_spectra, compute_sync2d, compute_baseline};

use crate::constants::{Mode, FT8_COSTAS, FT4_COSTAS};

/// Sample rate all waterfall math operates at.
pub const SAMPLE_RATE: f32 = 12_000.0;

/// Maximum time lag searched during coarse sync, in quarter-symbol steps.
pub const MAX_LAG: i32 = 62;

/// Coarse time search window around the expected start, in quarter-symbol steps.
pub const COARSE_LAG: i32 = 10;

/// FFT size used for the spectrogram (shared by both modes; frequency
/// resolution is the same regardless of symbol rate).
pub const NFFT1: usize = 4096;

/// Number of usable FFT bins (real input, one-sided spectrum).
pub const NH1: usize = NFFT1 / 2;

/// Samples per symbol at 12 kHz for `mode`.
pub fn nsps(mode: Mode) -> usize {
    (SAMPLE_RATE * mode.symbol_period_s()).round() as usize
}

/// Spectrogram time step: one quarter symbol.
pub fn nstep(mode: Mode) -> usize {
    nsps(mode) / 4
}

/// Total samples covered by one transmission slot.
pub fn nmax(mode: Mode) -> usize {
    (SAMPLE_RATE * mode.slot_s()) as usize
}

/// Number of spectrogram time steps across one slot.
pub fn nhsym(mode: Mode) -> usize {
    nmax(mode) / nstep(mode) - 3
}

/// Costas blocks for `mode`: `(symbol offset, tone pattern)` pairs. FT8
/// repeats one 7-tone array three times; FT4 places four distinct 4-tone
/// arrays.
pub fn costas_blocks(mode: Mode) -> Vec<(usize, &'static [u8])> {
    match mode {
        Mode::Ft8 => vec![(0, &FT8_COSTAS[..]), (36, &FT8_COSTAS[..]), (72, &FT8_COSTAS[..])],
        Mode::Ft4 => vec![
            (1, &FT4_COSTAS[0][..]),
            (34, &FT4_COSTAS[1][..]),
            (67, &FT4_COSTAS[2][..]),
            (100, &FT4_COSTAS[3][..]),
        ],
    }
}
