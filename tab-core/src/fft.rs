//! # Fast Fourier Transform (FFT) Module
//!
//! Frequency-domain helpers for frame analysis: Hann windowing and
//! positive-frequency magnitude spectra, built on RustFFT.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Computes the Hann window coefficients `0.5 - 0.5*cos(2πk/(N-1))`.
///
/// A single-sample window is `[1.0]`.
pub fn hann_window(n: usize) -> Vec<f32> {
    if n == 1 {
        return vec![1.0];
    }
    let n_minus_1 = (n.saturating_sub(1)) as f32;
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos()))
        .collect()
}

/// Windows frames and produces their magnitude spectra.
///
/// The forward FFT is planned once per frame size and reused for every frame.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(frame_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);
        let scratch = vec![Complex { re: 0.0, im: 0.0 }; fft.get_inplace_scratch_len()];
        Self {
            fft,
            window: hann_window(frame_size),
            scratch,
        }
    }

    pub fn frame_size(&self) -> usize {
        self.window.len()
    }

    /// Multiplies `frame` element-wise by the Hann window.
    ///
    /// # Panics
    /// * If `frame` is not exactly `frame_size` samples long
    pub fn apply_window(&self, frame: &[f32]) -> Vec<f32> {
        assert_eq!(frame.len(), self.window.len(), "frame length must equal frame_size");
        frame.iter().zip(&self.window).map(|(s, w)| s * w).collect()
    }

    /// Magnitudes of the first `frame_size / 2` bins of an already windowed frame.
    pub fn magnitudes(&mut self, windowed: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = windowed
            .iter()
            .map(|&sample| Complex { re: sample, im: 0.0 })
            .collect();

        self.fft.process_with_scratch(&mut buffer, &mut self.scratch);
        spectrum_to_magnitudes(&buffer)
    }
}

/// Keeps the positive-frequency half of a complex spectrum as magnitudes.
pub fn spectrum_to_magnitudes(spectrum: &[Complex<f32>]) -> Vec<f32> {
    spectrum
        .iter()
        .take(spectrum.len() / 2)
        .map(|c| c.norm()) // .norm() is sqrt(re^2 + im^2)
        .collect()
}

/// Index of the largest value; the first one wins on ties.
pub fn peak_bin(magnitudes: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &m) in magnitudes.iter().enumerate() {
        match best {
            Some((_, best_m)) if m <= best_m => {}
            _ => best = Some((i, m)),
        }
    }
    best.map(|(i, _)| i)
}
