//! # Pitch Tracking Module
//!
//! Estimates one dominant frequency per overlapping analysis frame by
//! picking the strongest bin of a Hann-windowed magnitude spectrum.
//! Frames whose windowed peak amplitude falls under the silence threshold
//! report 0 Hz.

use log::debug;

use crate::audio::AudioBuffer;
use crate::error::{TabError, TabResult};
use crate::fft::{peak_bin, SpectrumAnalyzer};

/// Default analysis window length in samples.
pub const DEFAULT_FRAME_SIZE: usize = 2048;
/// Default distance between frame starts in samples.
pub const DEFAULT_HOP_LENGTH: usize = 512;
/// Default windowed-frame amplitude under which a frame is silent.
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.1;

/// Frame-by-frame dominant frequency estimator.
pub struct PitchTracker {
    analyzer: SpectrumAnalyzer,
    hop_length: usize,
    silence_threshold: f32,
}

impl PitchTracker {
    /// Creates a tracker for the given frame geometry.
    ///
    /// Fails with `InvalidConfig` if `frame_size` or `hop_length` is zero.
    pub fn new(frame_size: usize, hop_length: usize, silence_threshold: f32) -> TabResult<Self> {
        if frame_size == 0 || hop_length == 0 {
            return Err(TabError::InvalidConfig(format!(
                "frame_size ({}) and hop_length ({}) must be positive",
                frame_size, hop_length
            )));
        }
        Ok(Self {
            analyzer: SpectrumAnalyzer::new(frame_size),
            hop_length,
            silence_threshold,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.analyzer.frame_size()
    }

    /// Number of whole frames that fit in `len` samples, `None` if not even one does.
    pub fn frame_count(&self, len: usize) -> Option<usize> {
        let frame_size = self.frame_size();
        if len < frame_size {
            return None;
        }
        Some(1 + (len - frame_size) / self.hop_length)
    }

    /// Estimates the dominant frequency of every frame.
    ///
    /// The buffer is expected to be normalized already.
    ///
    /// # Arguments
    /// * `buffer` - Normalized mono samples
    ///
    /// # Returns
    /// * `Ok(pitches)` - One frequency in Hz per frame, 0 marking silence
    /// * `Err(TabError::InvalidInput)` - The buffer is shorter than one frame
    pub fn track(&mut self, buffer: &AudioBuffer) -> TabResult<Vec<f32>> {
        let samples = buffer.samples();
        let frame_size = self.frame_size();
        let num_frames = self.frame_count(samples.len()).ok_or_else(|| {
            TabError::InvalidInput(format!(
                "buffer has {} samples, need at least {} for one frame",
                samples.len(),
                frame_size
            ))
        })?;

        let bin_hz = buffer.sample_rate() as f32 / frame_size as f32;
        let mut pitches = Vec::with_capacity(num_frames);

        for i in 0..num_frames {
            let start = i * self.hop_length;
            let windowed = self.analyzer.apply_window(&samples[start..start + frame_size]);
            let magnitudes = self.analyzer.magnitudes(&windowed);

            let frame_peak = windowed.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            if frame_peak < self.silence_threshold {
                pitches.push(0.0);
                continue;
            }

            let frequency = peak_bin(&magnitudes).map_or(0.0, |bin| bin as f32 * bin_hz);
            pitches.push(frequency);
        }

        debug!(
            "tracked {} frames (frame_size={}, hop_length={})",
            num_frames, frame_size, self.hop_length
        );
        Ok(pitches)
    }
}
