//! Majority-vote smoothing of quantized note sequences

use crate::note::Note;

/// Default smoothing window length.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Removes single-frame jitter from a note sequence.
///
/// Each position looks at the window `notes[i - w/2 ..= i + w/2]`, clamped to the
/// sequence so windows at either end are shorter. If the window's first element
/// occurs in strictly more than `len / 2` of its slots it replaces `notes[i]`;
/// otherwise `notes[i]` is kept. The vote is against the first element of the
/// window, not the window's mode, so this is not idempotent.
pub fn smooth_notes(notes: &[Note], window_size: usize) -> Vec<Note> {
    let half = window_size / 2;
    (0..notes.len())
        .map(|i| {
            let window = &notes[i.saturating_sub(half)..(i + half + 1).min(notes.len())];
            let first = window[0];
            let votes = window.iter().filter(|&&n| n == first).count();
            if votes > window.len() / 2 { first } else { notes[i] }
        })
        .collect()
}
