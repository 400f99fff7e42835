//! WAV file decoding and encoding for recorded or supplied audio

use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use log::debug;

use crate::audio::AudioBuffer;

/// Reads a WAV file as mono `f32` samples in [-1, 1].
///
/// Integer formats are scaled by their full-scale value; multi-channel files
/// are averaged down to mono.
pub fn read_wav(path: impl AsRef<Path>) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let mono: Vec<f32> = if channels == 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    debug!(
        "read {} ({} Hz, {} channel(s), {} frames)",
        path.display(),
        spec.sample_rate,
        spec.channels,
        mono.len()
    );
    Ok(AudioBuffer::new(mono, spec.sample_rate)?)
}

/// Writes a buffer as a mono 32-bit float WAV file.
pub fn write_wav(path: impl AsRef<Path>, buffer: &AudioBuffer) -> Result<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for &sample in buffer.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
