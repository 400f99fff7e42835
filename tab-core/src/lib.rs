// tab-core/src/lib.rs

//! The core logic for the guitar tab transcriber.
//! This crate turns a mono sample buffer into timed notes and ASCII guitar
//! tablature. It also owns the thin audio collaborators (device capture and
//! WAV files) but contains no presentation code.
//!
//! The pipeline runs strictly in order, each stage consuming the previous
//! stage's complete output:
//!
//! ```text
//! AudioBuffer → PitchTracker → Note::from_frequency → smooth_notes → segment_notes → TabMapper
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod fft;
pub mod note;
pub mod pitch;
pub mod segment;
pub mod smoothing;
pub mod tab;
pub mod wav;

use log::debug;

pub use audio::AudioBuffer;
pub use config::TranscriptionConfig;
pub use error::{TabError, TabResult};
pub use note::{Note, PitchClass};
pub use pitch::PitchTracker;
pub use segment::{segment_notes, NoteEvent};
pub use smoothing::smooth_notes;
pub use tab::{GuitarString, Slot, TabMapper, TabPosition, Tablature};

/// The result of transcribing one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    /// Note events in time order; durations sum to the analysed time.
    pub events: Vec<NoteEvent>,
    /// The events rendered as six-string tablature.
    pub tablature: Tablature,
}

/// Runs the full pipeline over `buffer`.
///
/// The buffer is peak-normalized first (an all-zero buffer stays all zero).
///
/// # Arguments
/// * `buffer` - Mono samples and their sample rate
/// * `config` - Frame geometry, smoothing, tuning and slot parameters
///
/// # Returns
/// * `Transcription` - Note events and their tablature
///
/// # Errors
/// * `InvalidConfig` - a configuration value is out of range
/// * `DegenerateInput` - the buffer contains non-finite samples
/// * `InvalidInput` - the buffer is shorter than one frame
pub fn transcribe(buffer: &AudioBuffer, config: &TranscriptionConfig) -> TabResult<Transcription> {
    config.validate()?;

    let normalized = buffer.normalized()?;
    let mut tracker = PitchTracker::new(config.frame_size, config.hop_length, config.silence_threshold)?;
    let pitches = tracker.track(&normalized)?;

    let notes: Vec<Note> = pitches.iter().map(|&freq| Note::from_frequency(freq)).collect();
    let smoothed = smooth_notes(&notes, config.smoothing_window);
    let events = segment_notes(&smoothed, config.hop_length, buffer.sample_rate())?;

    let mapper = TabMapper::new(config.tuning, config.max_fret, config.slot_seconds)?;
    let tablature = mapper.render(&events);

    debug!(
        "transcribed {:.2}s of audio into {} events",
        buffer.duration_seconds(),
        events.len()
    );
    Ok(Transcription { events, tablature })
}
