//! Run-length segmentation of per-frame notes into timed note events

use std::fmt;

use log::debug;

use crate::error::{TabError, TabResult};
use crate::note::Note;

/// A note held for a duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub note: Note,
    pub duration: f64,
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.note, self.duration)
    }
}

/// Collapses consecutive identical notes into events.
///
/// Each frame contributes `hop_length / sample_rate` seconds, so event durations
/// always sum to `notes.len() * hop_length / sample_rate`.
/// Fails with `EmptyInput` on an empty sequence.
pub fn segment_notes(notes: &[Note], hop_length: usize, sample_rate: u32) -> TabResult<Vec<NoteEvent>> {
    let (&first, rest) = notes.split_first().ok_or(TabError::EmptyInput)?;
    let frame_seconds = hop_length as f64 / sample_rate as f64;

    let mut events = Vec::new();
    let mut current = first;
    let mut run = 1usize;
    for &note in rest {
        if note == current {
            run += 1;
        } else {
            events.push(NoteEvent { note: current, duration: run as f64 * frame_seconds });
            current = note;
            run = 1;
        }
    }
    events.push(NoteEvent { note: current, duration: run as f64 * frame_seconds });

    debug!("segmented {} frames into {} events", notes.len(), events.len());
    Ok(events)
}
