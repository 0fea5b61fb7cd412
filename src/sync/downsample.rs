//! Downsample a 12 kHz slot to a ~200 Hz complex baseband signal centered
//! on a candidate frequency, via FFT bandpass-and-decimate.

use super::fft::{fft_complex, fft_complex_inverse};
use super::SAMPLE_RATE;
use crate::error::Error;

/// Downsample `signal` to ~200 Hz centered at `f0`.
///
/// `output` must hold at least 4096 complex samples; returns the actual
/// output sample rate in Hz (not exactly 200, since the bandwidth
/// extracted is quantized to whole FFT bins).
pub fn downsample_200hz(signal: &[f32], f0: f32, output: &mut [(f32, f32)], nmax: usize, nsps: usize) -> Result<f32, Error> {
    const NFFT_IN: usize = 262_144;
    const NFFT_OUT: usize = 4096;

    if signal.len() < nmax {
        return Err(Error::InvalidInput { message: format!("signal too short: {}", signal.len()) });
    }
    if output.len() < NFFT_OUT {
        return Err(Error::InvalidInput { message: format!("output buffer too small: {} (need {NFFT_OUT})", output.len()) });
    }

    let mut x_real = vec![0.0f32; NFFT_IN];
    let mut x_imag = vec![0.0f32; NFFT_IN];
    for i in 0..nmax.min(NFFT_IN) {
        x_real[i] = signal[i];
    }

    fft_complex(&mut x_real, &mut x_imag, NFFT_IN)?;

    let df = SAMPLE_RATE / NFFT_IN as f32;
    let baud = SAMPLE_RATE / nsps as f32;

    let fb = (f0 - 1.5 * baud).max(0.0);
    let ft = (f0 + 8.5 * baud).min(SAMPLE_RATE / 2.0);

    let ib = (fb / df).round().max(1.0) as usize;
    let it = (ft / df).round().min((NFFT_IN / 2) as f32) as usize;
    let i0 = (f0 / df).round() as usize;

    let mut out_real = vec![0.0f32; NFFT_OUT];
    let mut out_imag = vec![0.0f32; NFFT_OUT];

    let mut k = 0;
    for i in ib..=it {
        if k < NFFT_OUT {
            out_real[k] = x_real[i];
            out_imag[k] = x_imag[i];
            k += 1;
        }
    }

    let bandwidth = (it - ib + 1) as f32 * df;
    let actual_sample_rate = bandwidth * (NFFT_OUT as f32) / (k.max(1) as f32);

    let taper_len = 101;
    for i in 0..taper_len {
        let taper_val = 0.5 * (1.0 + libm::cosf(core::f32::consts::PI * i as f32 / 100.0));
        if i < k {
            out_real[i] *= taper_val;
            out_imag[i] *= taper_val;
        }
        let j = k - 1 - i;
        if j < k {
            out_real[j] *= taper_val;
            out_imag[j] *= taper_val;
        }
    }

    let shift = (i0 as i32 - ib as i32).max(0) as usize;
    if shift > 0 && shift < k {
        let temp_real = out_real.clone();
        let temp_imag = out_imag.clone();
        for i in 0..k {
            let src = (i + shift) % k;
            out_real[i] = temp_real[src];
            out_imag[i] = temp_imag[src];
        }
    }

    fft_complex_inverse(&mut out_real, &mut out_imag, NFFT_OUT)?;

    let fac = 1.0 / libm::sqrtf((NFFT_IN * NFFT_OUT) as f32);
    for i in 0..NFFT_OUT {
        output[i] = (out_real[i] * fac, out_imag[i] * fac);
    }

    Ok(actual_sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::nmax;
    use crate::constants::Mode;

    #[test]
    fn rejects_signal_shorter_than_one_slot() {
        let signal = vec![0.0f32; 100];
        let mut out = vec![(0.0f32, 0.0f32); 4096];
        assert!(downsample_200hz(&signal, 1000.0, &mut out, nmax(Mode::Ft8), 1920).is_err());
    }

    #[test]
    fn downsamples_silence_without_error() {
        let signal = vec![0.0f32; nmax(Mode::Ft8)];
        let mut out = vec![(0.0f32, 0.0f32); 4096];
        let rate = downsample_200hz(&signal, 1500.0, &mut out, nmax(Mode::Ft8), 1920).unwrap();
        assert!(rate > 0.0);
    }
}
