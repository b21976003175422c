//! Deterministic noise reduction over an in-memory sample buffer.
//!
//! Two stages, both per-channel:
//! 1. Butterworth high-pass (cascaded biquad sections) to drop rumble
//!    below the configured cutoff.
//! 2. Spectral gating: STFT with a Hann window and 75% overlap, noise
//!    profile estimated from the quietest frames, Wiener-style gain with
//!    a floor, overlap-add resynthesis.
//!
//! The whole buffer is processed at once. No RNG or clock is involved, so
//! identical input always produces identical output.

use std::sync::Arc;

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F64};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::config::CleaningSettings;

use super::wav::WavBuffer;

/// STFT frame length.
const FFT_SIZE: usize = 2048;
/// Hop between frames (75% overlap).
const HOP_SIZE: usize = FFT_SIZE / 4;
/// Minimum spectral gain, so gated bins are attenuated rather than zeroed.
const GAIN_FLOOR: f64 = 0.02;
/// Fraction of frames (quietest first) used for the noise profile.
const NOISE_FRAME_FRACTION: usize = 10;

/// Noise-reduction parameters.
#[derive(Debug, Clone)]
pub struct NoiseReduction {
    /// Apply the high-pass pre-filter.
    pub highpass_enabled: bool,
    /// High-pass cutoff in Hz.
    pub highpass_hz: f64,
    /// Spectral reduction amount in dB.
    pub reduction_db: f64,
}

impl Default for NoiseReduction {
    fn default() -> Self {
        Self {
            highpass_enabled: true,
            highpass_hz: 80.0,
            reduction_db: 12.0,
        }
    }
}

impl From<&CleaningSettings> for NoiseReduction {
    fn from(settings: &CleaningSettings) -> Self {
        Self {
            highpass_enabled: settings.highpass_enabled,
            highpass_hz: settings.highpass_hz,
            reduction_db: settings.reduction_db,
        }
    }
}

/// Reduce noise in `buffer` in place.
///
/// Channels are deinterleaved and processed independently. Buffers
/// shorter than one STFT frame skip the spectral stage; the high-pass
/// still applies.
pub fn reduce_noise(buffer: &mut WavBuffer, options: &NoiseReduction) {
    let channels = buffer.channels();
    if channels == 0 || buffer.samples.is_empty() {
        return;
    }

    let sample_rate = buffer.sample_rate();

    for channel in 0..channels {
        let mut samples: Vec<f64> = buffer
            .samples
            .iter()
            .skip(channel)
            .step_by(channels)
            .map(|&s| s as f64)
            .collect();

        if options.highpass_enabled {
            apply_highpass(&mut samples, sample_rate, options.highpass_hz);
        }
        spectral_gate(&mut samples, options.reduction_db);

        for (frame, &value) in samples.iter().enumerate() {
            buffer.samples[frame * channels + channel] = value as f32;
        }
    }
}

/// Apply a Butterworth high-pass filter using cascaded biquad sections.
///
/// Two second-order sections give a 4th-order (24 dB/octave) slope. An
/// invalid cutoff (at or above Nyquist) leaves the samples unfiltered.
fn apply_highpass(samples: &mut [f64], sample_rate: u32, cutoff_hz: f64) {
    if samples.is_empty() {
        return;
    }

    let fs = sample_rate.hz();
    let f0 = cutoff_hz.hz();

    let coeffs = match Coefficients::<f64>::from_params(Type::HighPass, fs, f0, Q_BUTTERWORTH_F64)
    {
        Ok(c) => c,
        Err(_) => return,
    };

    for _ in 0..2 {
        // Fresh filter state per section
        let mut filter = DirectForm2Transposed::<f64>::new(coeffs);
        for sample in samples.iter_mut() {
            *sample = filter.run(*sample);
        }
    }
}

/// Spectral gating over the full buffer.
fn spectral_gate(samples: &mut [f64], reduction_db: f64) {
    if samples.len() < FFT_SIZE {
        return;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    let ifft = planner.plan_fft_inverse(FFT_SIZE);

    // Hann window
    let window: Vec<f64> = (0..FFT_SIZE)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / FFT_SIZE as f64).cos()))
        .collect();

    let starts: Vec<usize> = (0..=samples.len() - FFT_SIZE).step_by(HOP_SIZE).collect();

    let noise_profile = estimate_noise_profile(samples, &starts, &window, &fft);

    // Wiener-style gain against the scaled noise profile, overlap-add
    let reduction = 10f64.powf(reduction_db / 20.0);
    let mut output = vec![0.0f64; samples.len()];
    let mut window_sum = vec![0.0f64; samples.len()];

    for &start in &starts {
        let mut spectrum = windowed_fft(samples, start, &window, fft.as_ref());

        for (bin, value) in spectrum.iter_mut().enumerate() {
            let signal = value.norm();
            let noise = noise_profile[bin] * reduction;

            let gain = if signal > 0.0 {
                let snr = signal / (noise + 1e-12);
                ((snr - 1.0) / snr).max(GAIN_FLOOR)
            } else {
                GAIN_FLOOR
            };

            *value *= gain;
        }

        ifft.process(&mut spectrum);

        let norm = 1.0 / FFT_SIZE as f64;
        for i in 0..FFT_SIZE {
            output[start + i] += spectrum[i].re * norm * window[i];
            window_sum[start + i] += window[i] * window[i];
        }
    }

    // Overlap-add normalization; the tail not covered by any frame keeps
    // its original samples.
    for (i, sample) in samples.iter_mut().enumerate() {
        if window_sum[i] > 1e-3 {
            *sample = output[i] / window_sum[i];
        }
    }
}

/// Average magnitude spectrum of the quietest frames.
fn estimate_noise_profile(
    samples: &[f64],
    starts: &[usize],
    window: &[f64],
    fft: &Arc<dyn Fft<f64>>,
) -> Vec<f64> {
    let mut energies: Vec<(usize, f64)> = starts
        .iter()
        .map(|&start| {
            let energy = samples[start..start + FFT_SIZE].iter().map(|s| s * s).sum();
            (start, energy)
        })
        .collect();

    // Sort by energy with start index as tiebreak for determinism.
    energies.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let quiet_count = (energies.len() / NOISE_FRAME_FRACTION).max(1);

    let mut profile = vec![0.0f64; FFT_SIZE];
    for &(start, _) in energies.iter().take(quiet_count) {
        let spectrum = windowed_fft(samples, start, window, fft.as_ref());
        for (acc, value) in profile.iter_mut().zip(&spectrum) {
            *acc += value.norm();
        }
    }
    for value in &mut profile {
        *value /= quiet_count as f64;
    }

    profile
}

/// Window one frame and transform it to the frequency domain.
fn windowed_fft(
    samples: &[f64],
    start: usize,
    window: &[f64],
    fft: &dyn Fft<f64>,
) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = samples[start..start + FFT_SIZE]
        .iter()
        .zip(window)
        .map(|(&s, &w)| Complex::new(s * w, 0.0))
        .collect();
    fft.process(&mut buffer);
    buffer
}
