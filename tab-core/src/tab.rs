//! # Tablature Module
//!
//! Maps note events onto a six-string fretted instrument and renders the
//! result as ASCII tablature.
//!
//! ## Features
//! - Lowest-fret position search with ties going to the lower string
//! - Configurable open-string tuning and fret limit
//! - Fixed-width time slots (0.1 s each by default) with dash sustain

use std::fmt;

use log::debug;

use crate::error::{TabError, TabResult};
use crate::note::Note;
use crate::segment::NoteEvent;

/// Open-string MIDI numbers of standard tuning, low to high (E2 A2 D3 G3 B3 E4).
pub const STANDARD_TUNING: [u8; 6] = [40, 45, 50, 55, 59, 64];

/// Highest fret used when searching for a position.
pub const MAX_FRET: u8 = 20;

/// Default seconds per tablature slot.
pub const DEFAULT_SLOT_SECONDS: f64 = 0.1;

/// The six strings, ordered low to high. The order drives tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GuitarString {
    LowE,
    A,
    D,
    G,
    B,
    HighE,
}

impl GuitarString {
    /// Low-to-high order, used for the fret search.
    pub const ALL: [GuitarString; 6] = [
        GuitarString::LowE,
        GuitarString::A,
        GuitarString::D,
        GuitarString::G,
        GuitarString::B,
        GuitarString::HighE,
    ];

    /// High-to-low order, used for display.
    pub const DISPLAY_ORDER: [GuitarString; 6] = [
        GuitarString::HighE,
        GuitarString::B,
        GuitarString::G,
        GuitarString::D,
        GuitarString::A,
        GuitarString::LowE,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-character label printed at the start of a tab line.
    pub fn id(self) -> &'static str {
        match self {
            GuitarString::LowE => "E",
            GuitarString::A => "A",
            GuitarString::D => "D",
            GuitarString::G => "G",
            GuitarString::B => "B",
            GuitarString::HighE => "e",
        }
    }
}

impl fmt::Display for GuitarString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Where a note is played, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPosition {
    Fretted { string: GuitarString, fret: u8 },
    /// Below the lowest open string, beyond the fret limit, or a rest.
    Unplayable,
}

impl TabPosition {
    /// String label, `"-"` when unplayable.
    pub fn string_label(&self) -> String {
        match self {
            TabPosition::Fretted { string, .. } => string.id().to_string(),
            TabPosition::Unplayable => "-".to_string(),
        }
    }

    /// Fret label, `"-"` when unplayable.
    pub fn fret_label(&self) -> String {
        match self {
            TabPosition::Fretted { fret, .. } => fret.to_string(),
            TabPosition::Unplayable => "-".to_string(),
        }
    }
}

/// One time slot on one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A fret number struck in this slot
    Fret(u8),
    /// Sustain or nothing played
    Dash,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Fret(fret) => write!(f, "{:>2}", fret),
            Slot::Dash => f.write_str("-"),
        }
    }
}

/// Six parallel slot sequences, indexed low to high by [`GuitarString`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tablature {
    strings: [Vec<Slot>; 6],
}

impl Tablature {
    pub fn slots(&self, string: GuitarString) -> &[Slot] {
        &self.strings[string.index()]
    }

    /// Number of slots on every string.
    pub fn len(&self) -> usize {
        self.strings[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders one string as `"<id>|<slots>|"`.
    pub fn line(&self, string: GuitarString) -> String {
        let body: String = self.slots(string).iter().map(Slot::to_string).collect();
        format!("{}|{}|", string.id(), body)
    }

    /// All six rendered lines, high string first.
    pub fn lines(&self) -> Vec<String> {
        GuitarString::DISPLAY_ORDER.iter().map(|&s| self.line(s)).collect()
    }
}

impl fmt::Display for Tablature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Assigns note events to strings and frets.
#[derive(Debug, Clone)]
pub struct TabMapper {
    tuning: [u8; 6],
    max_fret: u8,
    slots_per_second: f64,
}

impl Default for TabMapper {
    fn default() -> Self {
        Self {
            tuning: STANDARD_TUNING,
            max_fret: MAX_FRET,
            slots_per_second: 1.0 / DEFAULT_SLOT_SECONDS,
        }
    }
}

impl TabMapper {
    /// Creates a mapper for a tuning and fret limit.
    ///
    /// # Arguments
    /// * `tuning` - Open-string MIDI numbers, low to high
    /// * `max_fret` - Highest fret the search may use
    /// * `slot_seconds` - Seconds represented by one tablature slot
    ///
    /// # Returns
    /// * `Ok(mapper)` - Ready to map and render
    /// * `Err(TabError::InvalidConfig)` - `slot_seconds` is not a positive finite number
    pub fn new(tuning: [u8; 6], max_fret: u8, slot_seconds: f64) -> TabResult<Self> {
        if !slot_seconds.is_finite() || slot_seconds <= 0.0 {
            return Err(TabError::InvalidConfig(format!(
                "slot_seconds must be positive, got {}",
                slot_seconds
            )));
        }
        Ok(Self {
            tuning,
            max_fret,
            slots_per_second: 1.0 / slot_seconds,
        })
    }

    /// Finds the lowest fret that plays `midi`.
    ///
    /// Strings are scanned low to high and only a strictly lower fret replaces
    /// the current best, so the lower string wins a tie.
    pub fn position_for_midi(&self, midi: i32) -> TabPosition {
        let mut best = TabPosition::Unplayable;
        for (string, &open) in GuitarString::ALL.iter().zip(&self.tuning) {
            let fret = midi.saturating_sub(open as i32);
            if fret < 0 || fret > self.max_fret as i32 {
                continue;
            }
            let fret = fret as u8;
            let improves = match best {
                TabPosition::Fretted { fret: best_fret, .. } => fret < best_fret,
                TabPosition::Unplayable => true,
            };
            if improves {
                best = TabPosition::Fretted { string: *string, fret };
            }
        }
        best
    }

    /// Position for a note; rests occupy no string.
    pub fn position_for_note(&self, note: &Note) -> TabPosition {
        note.midi().map_or(TabPosition::Unplayable, |midi| self.position_for_midi(midi))
    }

    /// Parses a label such as `"C#3"` and maps it.
    ///
    /// Fails with `InvalidNote` if the label does not name a note.
    pub fn position_for_label(&self, label: &str) -> TabResult<TabPosition> {
        let note: Note = label.parse()?;
        Ok(self.position_for_note(&note))
    }

    /// Slots occupied by an event: `max(1, round(duration * slots_per_second))`.
    pub fn slot_count(&self, duration: f64) -> usize {
        ((duration * self.slots_per_second).round() as usize).max(1)
    }

    /// Renders events into tablature.
    ///
    /// The played string gets the fret in the first slot and dashes for the
    /// rest of the event; every other string gets dashes. Strings are padded
    /// with dashes to the longest.
    ///
    /// # Arguments
    /// * `events` - Note events in time order
    ///
    /// # Returns
    /// * `Tablature` - Six equal-length slot sequences
    pub fn render(&self, events: &[NoteEvent]) -> Tablature {
        let mut tab = Tablature::default();

        for event in events {
            let repeat = self.slot_count(event.duration);
            let position = self.position_for_note(&event.note);
            for string in GuitarString::ALL {
                let slots = &mut tab.strings[string.index()];
                match position {
                    TabPosition::Fretted { string: played, fret } if played == string => {
                        slots.push(Slot::Fret(fret));
                        slots.extend(std::iter::repeat_n(Slot::Dash, repeat - 1));
                    }
                    _ => slots.extend(std::iter::repeat_n(Slot::Dash, repeat)),
                }
            }
        }

        let max_length = tab.strings.iter().map(Vec::len).max().unwrap_or(0);
        for slots in tab.strings.iter_mut() {
            slots.resize(max_length, Slot::Dash);
        }

        debug!("rendered {} events into {} slots", events.len(), max_length);
        tab
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::PitchClass;

    fn fretted(string: GuitarString, fret: u8) -> TabPosition {
        TabPosition::Fretted { string, fret }
    }

    #[test]
    fn test_open_strings() {
        let mapper = TabMapper::default();
        assert_eq!(mapper.position_for_midi(40), fretted(GuitarString::LowE, 0));
        assert_eq!(mapper.position_for_midi(64), fretted(GuitarString::HighE, 0));
        let pos = mapper.position_for_midi(40);
        assert_eq!((pos.string_label(), pos.fret_label()), ("E".to_string(), "0".to_string()));
        let pos = mapper.position_for_midi(64);
        assert_eq!(pos.string_label(), "e");
    }

    #[test]
    fn test_lowest_fret_wins() {
        let mapper = TabMapper::default();
        // D fret 10, G fret 5, B fret 1
        let pos = mapper.position_for_midi(60);
        assert_eq!(pos, fretted(GuitarString::B, 1));
        assert_eq!((pos.string_label(), pos.fret_label()), ("B".to_string(), "1".to_string()));
    }

    #[test]
    fn test_unplayable() {
        let mapper = TabMapper::default();
        let pos = mapper.position_for_midi(39);
        assert_eq!(pos, TabPosition::Unplayable);
        assert_eq!((pos.string_label(), pos.fret_label()), ("-".to_string(), "-".to_string()));
        assert_eq!(mapper.position_for_midi(84), fretted(GuitarString::HighE, 20));
        assert_eq!(mapper.position_for_midi(85), TabPosition::Unplayable);
        assert_eq!(mapper.position_for_note(&Note::Rest), TabPosition::Unplayable);
    }

    #[test]
    fn test_tie_goes_to_lower_string() {
        let mapper = TabMapper::new([40, 45, 45, 55, 59, 64], MAX_FRET, DEFAULT_SLOT_SECONDS).unwrap();
        assert_eq!(mapper.position_for_midi(47), fretted(GuitarString::A, 2));
    }

    #[test]
    fn test_fret_limit_is_configurable() {
        let mapper = TabMapper::new(STANDARD_TUNING, 12, DEFAULT_SLOT_SECONDS).unwrap();
        assert_eq!(mapper.position_for_midi(76), fretted(GuitarString::HighE, 12));
        assert_eq!(mapper.position_for_midi(77), TabPosition::Unplayable);
    }

    #[test]
    fn test_position_for_label() {
        let mapper = TabMapper::default();
        assert_eq!(mapper.position_for_label("A2").unwrap(), fretted(GuitarString::A, 0));
        assert_eq!(mapper.position_for_label("Rest").unwrap(), TabPosition::Unplayable);
        assert!(matches!(mapper.position_for_label("X9"), Err(TabError::InvalidNote(_))));
    }

    #[test]
    fn test_out_of_range_octaves() {
        let mapper = TabMapper::default();
        for label in ["C2147483647", "C-2147483648"] {
            assert!(matches!(mapper.position_for_label(label), Err(TabError::InvalidNote(_))));
        }
        let low = Note::Pitched { pitch_class: PitchClass::C, octave: i32::MIN };
        let high = Note::Pitched { pitch_class: PitchClass::B, octave: i32::MAX };
        assert_eq!(mapper.position_for_note(&low), TabPosition::Unplayable);
        assert_eq!(mapper.position_for_note(&high), TabPosition::Unplayable);
        assert_eq!(mapper.position_for_midi(i32::MIN), TabPosition::Unplayable);
    }

    #[test]
    fn test_rejects_non_positive_slot_length() {
        for slot_seconds in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                TabMapper::new(STANDARD_TUNING, MAX_FRET, slot_seconds),
                Err(TabError::InvalidConfig(_))
            ));
        }
        let mapper = TabMapper::new(STANDARD_TUNING, MAX_FRET, 0.05).unwrap();
        assert_eq!(mapper.slot_count(0.5), 10);
    }

    #[test]
    fn test_slot_count() {
        let mapper = TabMapper::default();
        assert_eq!(mapper.slot_count(0.0116), 1);
        assert_eq!(mapper.slot_count(0.96), 10);
        assert_eq!(mapper.slot_count(0.25), 3);
        assert_eq!(mapper.slot_count(0.34), 3);
    }

    #[test]
    fn test_render_layout() {
        let mapper = TabMapper::default();
        let events = [
            NoteEvent { note: Note::Pitched { pitch_class: PitchClass::A, octave: 4 }, duration: 0.3 },
            NoteEvent { note: Note::Rest, duration: 0.2 },
            NoteEvent { note: Note::Pitched { pitch_class: PitchClass::C, octave: 3 }, duration: 0.1 },
        ];
        let tab = mapper.render(&events);
        assert_eq!(tab.len(), 6);
        assert_eq!(
            tab.lines(),
            vec![
                "e| 5-----|",
                "B|------|",
                "G|------|",
                "D|------|",
                "A|----- 3|",
                "E|------|",
            ]
        );
    }

    #[test]
    fn test_fret_labels_right_justified() {
        let mapper = TabMapper::default();
        // MIDI 61: D fret 11, G fret 6, B fret 2
        let events = [NoteEvent { note: Note::from_midi(61), duration: 0.1 }];
        assert_eq!(mapper.render(&events).line(GuitarString::B), "B| 2|");

        // MIDI 75: B fret 16, e fret 11
        let events = [NoteEvent { note: Note::from_midi(75), duration: 0.2 }];
        let tab = mapper.render(&events);
        assert_eq!(tab.line(GuitarString::HighE), "e|11-|");
        assert_eq!(tab.line(GuitarString::B), "B|--|");
    }

    #[test]
    fn test_all_strings_same_length() {
        let mapper = TabMapper::default();
        let events: Vec<NoteEvent> = (35..90)
            .map(|midi| NoteEvent { note: Note::from_midi(midi), duration: 0.05 * (midi % 7) as f64 })
            .collect();
        let tab = mapper.render(&events);
        for string in GuitarString::ALL {
            assert_eq!(tab.slots(string).len(), tab.len());
        }
    }

    #[test]
    fn test_empty_events() {
        let tab = TabMapper::default().render(&[]);
        assert!(tab.is_empty());
        assert_eq!(tab.line(GuitarString::LowE), "E||");
    }
}
