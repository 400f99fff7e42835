//! # Audio Module
//!
//! The sample buffer handed to the pipeline, and capture of that buffer from
//! the default input device using CPAL (Cross-Platform Audio Library).
//!
//! ## Features
//! - Peak normalization with a defined result for all-zero input
//! - Automatic input device selection, preferring mono 32-bit float
//! - Down-mixing of multi-channel devices to mono
//! - Blocking fixed-duration recording fed over a crossbeam channel

use std::time::Duration;

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::Sender;
use log::{debug, info, warn};

use crate::error::{TabError, TabResult};

/// Sample rate requested from capture devices (CD quality).
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Mono samples plus the rate they were captured at.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wraps decoded mono samples.
    ///
    /// Fails with `InvalidInput` for a zero sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> TabResult<Self> {
        if sample_rate == 0 {
            return Err(TabError::InvalidInput("sample rate must be positive".into()));
        }
        Ok(Self { samples, sample_rate })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    /// Returns a copy scaled so the largest absolute sample is 1.0.
    ///
    /// A buffer whose peak is 0 (total silence) is returned unchanged as all zeros.
    /// Fails with `DegenerateInput` if any sample is NaN or infinite.
    pub fn normalized(&self) -> TabResult<AudioBuffer> {
        if let Some(i) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(TabError::DegenerateInput(format!(
                "sample {} is not finite ({})",
                i, self.samples[i]
            )));
        }
        let peak = self.peak();
        if peak == 0.0 {
            debug!("buffer is silent, skipping normalization");
            return Ok(self.clone());
        }
        Ok(AudioBuffer {
            samples: self.samples.iter().map(|s| s / peak).collect(),
            sample_rate: self.sample_rate,
        })
    }
}

/// Records `duration` of mono audio from the default input device.
///
/// Blocks the calling thread until enough samples have arrived.
pub fn record(duration: Duration) -> Result<AudioBuffer> {
    let (tx, rx) = crossbeam_channel::unbounded::<Vec<f32>>();
    let (stream, sample_rate) = start_audio_capture(tx)?;

    let wanted = (duration.as_secs_f64() * sample_rate as f64).round() as usize;
    let mut samples = Vec::with_capacity(wanted);
    while samples.len() < wanted {
        let chunk = rx
            .recv_timeout(duration + Duration::from_secs(2))
            .map_err(|e| anyhow!("audio stream stopped delivering samples: {}", e))?;
        samples.extend_from_slice(&chunk);
    }
    samples.truncate(wanted);

    if let Err(e) = stream.pause() {
        warn!("error pausing stream: {}", e);
    }
    drop(stream);
    info!("recorded {} samples at {} Hz", samples.len(), sample_rate);

    Ok(AudioBuffer::new(samples, sample_rate)?)
}

/// Starts audio capture from the default input device.
///
/// Every callback's samples are down-mixed to mono and sent over `sender`.
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Audio stream handle and sample rate
/// * `Err(e)` - Error if audio setup fails
pub fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    info!("Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = TARGET_SAMPLE_RATE
        .clamp(supported_config.min_sample_rate().0, supported_config.max_sample_rate().0);
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    info!("Selected sample rate: {} Hz, {} channel(s)", sample_rate, channels);

    let err_fn = |err| warn!("An error occurred on the audio stream: {}", err);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // The receiver hangs up once recording is complete.
            let _ = sender.send(downmix(data, channels));
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Averages interleaved frames into mono samples.
fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Picks the f32 input configuration closest to `target_rate`, preferring mono.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let in_range =
                c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0;
            let rate_diff = if in_range {
                0
            } else {
                let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
                let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
                min_diff.min(max_diff)
            };
            (c.channels() != 1, rate_diff)
        })
}
