//! # Note Quantization Module
//!
//! Maps detected frequencies onto equal-tempered notes (A4 = 440 Hz) and
//! provides the typed note representation used by every later stage.
//! Labels such as `"C#3"` are parsed once, here, and never re-parsed downstream.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::error::TabError;

/// The twelve equal-tempered pitch classes, in semitone order starting at C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes, indexed by semitone above C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C (0-11).
    pub fn semitone(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self as usize]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Static map for pitch-class name lookups when parsing labels.
static PITCH_CLASS_MAP: Lazy<BTreeMap<&'static str, PitchClass>> = Lazy::new(|| {
    NOTE_NAMES
        .iter()
        .zip(PitchClass::ALL)
        .map(|(&name, pitch_class)| (name, pitch_class))
        .collect()
});

/// A quantized note: either silence or a pitch class in a given octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Note {
    Rest,
    Pitched { pitch_class: PitchClass, octave: i32 },
}

impl Note {
    /// Quantizes a frequency to the nearest equal-tempered note.
    ///
    /// A frequency of exactly 0 Hz is the silence sentinel and yields [`Note::Rest`].
    /// The MIDI number is rounded half away from zero.
    pub fn from_frequency(freq: f32) -> Note {
        if freq == 0.0 {
            return Note::Rest;
        }
        let midi = (12.0 * (freq as f64 / 440.0).log2() + 69.0).round() as i32;
        Note::from_midi(midi)
    }

    /// Builds the note for a MIDI number (69 = A4).
    pub fn from_midi(midi: i32) -> Note {
        Note::Pitched {
            pitch_class: PitchClass::ALL[midi.rem_euclid(12) as usize],
            octave: midi.div_euclid(12) - 1,
        }
    }

    /// The MIDI number of a pitched note, `None` for a rest.
    pub fn midi(&self) -> Option<i32> {
        match *self {
            Note::Rest => None,
            Note::Pitched { pitch_class, octave } => Some(
                octave
                    .saturating_add(1)
                    .saturating_mul(12)
                    .saturating_add(pitch_class.semitone()),
            ),
        }
    }
}

/// MIDI number of `pitch_class` in `octave`, `None` if it does not fit in an `i32`.
fn checked_midi(pitch_class: PitchClass, octave: i32) -> Option<i32> {
    octave.checked_add(1)?.checked_mul(12)?.checked_add(pitch_class.semitone())
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Note::Rest => f.write_str("Rest"),
            Note::Pitched { pitch_class, octave } => write!(f, "{}{}", pitch_class, octave),
        }
    }
}

impl FromStr for Note {
    type Err = TabError;

    /// Parses `"Rest"` or `"<PitchClass><Octave>"`, e.g. `"A4"`, `"C#-1"`.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        if label == "Rest" {
            return Ok(Note::Rest);
        }
        let split = label
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| TabError::InvalidNote(label.to_string()))?;
        let (name, octave) = label.split_at(split);
        let pitch_class = *PITCH_CLASS_MAP
            .get(name)
            .ok_or_else(|| TabError::InvalidNote(label.to_string()))?;
        let octave = octave
            .parse::<i32>()
            .map_err(|_| TabError::InvalidNote(label.to_string()))?;
        if checked_midi(pitch_class, octave).is_none() {
            return Err(TabError::InvalidNote(label.to_string()));
        }
        Ok(Note::Pitched { pitch_class, octave })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(octave: i32) -> Note {
        Note::Pitched { pitch_class: PitchClass::A, octave }
    }

    #[test]
    fn test_zero_frequency_is_rest() {
        assert_eq!(Note::from_frequency(0.0), Note::Rest);
    }

    #[test]
    fn test_concert_a() {
        assert_eq!(Note::from_frequency(440.0), a(4));
        assert_eq!(Note::from_frequency(880.0), a(5));
        assert_eq!(Note::from_frequency(220.0), a(3));
    }

    #[test]
    fn test_nearest_semitone() {
        // 430.66 Hz is bin 20 of a 2048-point FFT at 44.1 kHz, 37 cents flat of A4
        assert_eq!(Note::from_frequency(430.664), a(4));
        // Middle C
        assert_eq!(
            Note::from_frequency(261.63),
            Note::Pitched { pitch_class: PitchClass::C, octave: 4 }
        );
        // Low E string
        assert_eq!(Note::from_frequency(82.41).midi(), Some(40));
    }

    #[test]
    fn test_midi_round_trip() {
        for midi in [0, 11, 12, 40, 59, 60, 64, 69, 127] {
            assert_eq!(Note::from_midi(midi).midi(), Some(midi));
        }
        assert_eq!(Note::Rest.midi(), None);
    }

    #[test]
    fn test_negative_midi_uses_floor_division() {
        assert_eq!(
            Note::from_midi(-1),
            Note::Pitched { pitch_class: PitchClass::B, octave: -2 }
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(a(4).to_string(), "A4");
        assert_eq!(Note::from_midi(61).to_string(), "C#4");
        assert_eq!(Note::Rest.to_string(), "Rest");
        assert_eq!("F#2".parse::<Note>().unwrap(), Note::from_midi(42));
        assert_eq!("Rest".parse::<Note>().unwrap(), Note::Rest);
        assert_eq!("B-2".parse::<Note>().unwrap(), Note::from_midi(-1));
    }

    #[test]
    fn test_semitone_boundary_rounding() {
        // A4 + 50 cents is 452.893 Hz; either side of it must land on the nearer semitone
        assert_eq!(Note::from_frequency(452.85), a(4));
        assert_eq!(
            Note::from_frequency(452.95),
            Note::Pitched { pitch_class: PitchClass::ASharp, octave: 4 }
        );
        // Same boundary one octave down
        assert_eq!(Note::from_frequency(226.42), a(3));
        assert_eq!(Note::from_frequency(226.48).midi(), Some(58));
    }

    #[test]
    fn test_octave_overflow_rejected() {
        for label in ["C2147483647", "B178956970", "C-2147483648", "C99999999999"] {
            assert!(
                matches!(label.parse::<Note>(), Err(TabError::InvalidNote(_))),
                "{label:?} should be rejected"
            );
        }
        assert!("C178956969".parse::<Note>().is_ok());
    }

    #[test]
    fn test_midi_saturates_for_extreme_octaves() {
        let high = Note::Pitched { pitch_class: PitchClass::B, octave: i32::MAX };
        let low = Note::Pitched { pitch_class: PitchClass::C, octave: i32::MIN };
        assert_eq!(high.midi(), Some(i32::MAX));
        assert_eq!(low.midi(), Some(i32::MIN));
    }

    #[test]
    fn test_unrecognised_labels() {
        for label in ["H4", "A", "Db4", "", "4", "C#x"] {
            assert!(
                matches!(label.parse::<Note>(), Err(TabError::InvalidNote(_))),
                "{label:?} should be rejected"
            );
        }
    }
}
