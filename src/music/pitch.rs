// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch-class arithmetic and enharmonic naming.
//!
//! All pitch math is done modulo 12 with a non-negative result. Display
//! names come from a [`NamingStyle`] that callers pass explicitly; there is
//! no process-wide "current" spelling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Reduce any integer to a pitch class in [0, 11].
pub fn mod12(value: i32) -> u8 {
    value.rem_euclid(12) as u8
}

/// A note identity modulo the octave (0 = C).
///
/// Deserialized values go through `From<u8>`, so they are reduced into
/// range like every other constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Create a pitch class, wrapping into [0, 11]
    pub fn new(value: i32) -> Self {
        PitchClass(mod12(value))
    }

    /// Pitch class of a MIDI note number
    pub fn from_midi(note: MidiNote) -> Self {
        PitchClass(note % 12)
    }

    /// Raw value in [0, 11]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Transpose by semitones
    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::new(self.0 as i32 + semitones)
    }

    /// Ascending interval in semitones to another pitch class (0-11)
    pub fn interval_to(self, other: PitchClass) -> u8 {
        mod12(other.0 as i32 - self.0 as i32)
    }

    /// All twelve pitch classes in chromatic order
    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..12).map(PitchClass)
    }
}

impl From<u8> for PitchClass {
    fn from(value: u8) -> Self {
        PitchClass(value % 12)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", NamingStyle::default().name(*self))
    }
}

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];
const MIXED_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];
const DOUBLE_SHARP_NAMES: [&str; 12] = [
    "B#", "C#", "C##", "D#", "D##", "E#", "F#", "F##", "G#", "G##", "A#", "A##",
];
const DOUBLE_FLAT_NAMES: [&str; 12] = [
    "Dbb", "Db", "Ebb", "Eb", "Fb", "Gbb", "Gb", "Abb", "Ab", "Bbb", "Bb", "Cb",
];

/// Enharmonic spelling table used to display pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStyle {
    Sharp,
    Flat,
    #[default]
    Mixed,
    DoubleSharp,
    DoubleFlat,
}

impl NamingStyle {
    pub const ALL: [NamingStyle; 5] = [
        NamingStyle::Sharp,
        NamingStyle::Flat,
        NamingStyle::Mixed,
        NamingStyle::DoubleSharp,
        NamingStyle::DoubleFlat,
    ];

    fn table(self) -> &'static [&'static str; 12] {
        match self {
            NamingStyle::Sharp => &SHARP_NAMES,
            NamingStyle::Flat => &FLAT_NAMES,
            NamingStyle::Mixed => &MIXED_NAMES,
            NamingStyle::DoubleSharp => &DOUBLE_SHARP_NAMES,
            NamingStyle::DoubleFlat => &DOUBLE_FLAT_NAMES,
        }
    }

    /// Display name of a pitch class under this style
    pub fn name(self, pc: PitchClass) -> &'static str {
        self.table()[pc.value() as usize]
    }

    /// Parse a style from a config string
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match s.as_str() {
            "sharp" | "sharps" => Some(NamingStyle::Sharp),
            "flat" | "flats" => Some(NamingStyle::Flat),
            "mixed" => Some(NamingStyle::Mixed),
            "doublesharp" => Some(NamingStyle::DoubleSharp),
            "doubleflat" => Some(NamingStyle::DoubleFlat),
            _ => None,
        }
    }
}

/// Parse a note name ("C", "f#", "Bb", "E♭", "Fx", "Dbb") to a pitch class.
///
/// Any enharmonic spelling is accepted regardless of the active style.
pub fn parse_note_name(name: &str) -> Option<PitchClass> {
    let mut chars = name.trim().chars();
    let base: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let mut offset = 0i32;
    for c in chars {
        offset += match c {
            '#' | '♯' => 1,
            'x' | '𝄪' => 2,
            'b' | '♭' => -1,
            '𝄫' => -2,
            _ => return None,
        };
    }

    Some(PitchClass::new(base + offset))
}

/// Canonical spelling of a user-supplied note name: trimmed, with an
/// uppercase letter. Accidentals are kept as written.
pub fn spell_note_name(name: &str) -> String {
    let name = name.trim();
    let mut chars = name.chars();
    match chars.next() {
        Some(letter) => letter.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Name resolution callback used by the chord detector and display code.
pub trait NoteNamer {
    fn name_of(&self, pc: PitchClass) -> String;
}

impl NoteNamer for NamingStyle {
    fn name_of(&self, pc: PitchClass) -> String {
        self.name(pc).to_string()
    }
}

impl<F> NoteNamer for F
where
    F: Fn(PitchClass) -> String,
{
    fn name_of(&self, pc: PitchClass) -> String {
        self(pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod12_negative() {
        assert_eq!(mod12(-1), 11);
        assert_eq!(mod12(-12), 0);
        assert_eq!(mod12(25), 1);
    }

    #[test]
    fn test_pitch_class_transpose() {
        assert_eq!(PitchClass::C.transpose(7), PitchClass::new(7));
        assert_eq!(PitchClass::new(2).transpose(-3), PitchClass::new(11));
        assert_eq!(PitchClass::from_midi(61), PitchClass::new(1));
    }

    #[test]
    fn test_interval_to() {
        let c = PitchClass::C;
        let g = PitchClass::new(7);
        assert_eq!(c.interval_to(g), 7);
        assert_eq!(g.interval_to(c), 5);
        assert_eq!(c.interval_to(c), 0);
    }

    #[test]
    fn test_style_names() {
        let cs = PitchClass::new(1);
        assert_eq!(NamingStyle::Sharp.name(cs), "C#");
        assert_eq!(NamingStyle::Flat.name(cs), "Db");
        assert_eq!(NamingStyle::Mixed.name(PitchClass::new(3)), "Eb");
        assert_eq!(NamingStyle::DoubleSharp.name(PitchClass::new(2)), "C##");
        assert_eq!(NamingStyle::DoubleFlat.name(PitchClass::new(11)), "Cb");
    }

    #[test]
    fn test_every_style_names_round_trip_through_parser() {
        for style in NamingStyle::ALL {
            for pc in PitchClass::all() {
                assert_eq!(parse_note_name(style.name(pc)), Some(pc), "{:?} {}", style, pc.value());
            }
        }
    }

    #[test]
    fn test_parse_note_name() {
        assert_eq!(parse_note_name("c"), Some(PitchClass::C));
        assert_eq!(parse_note_name("E♭"), Some(PitchClass::new(3)));
        assert_eq!(parse_note_name("Fx"), Some(PitchClass::new(7)));
        assert_eq!(parse_note_name("Cb"), Some(PitchClass::new(11)));
        assert_eq!(parse_note_name("H"), None);
        assert_eq!(parse_note_name("C?"), None);
        assert_eq!(parse_note_name(""), None);
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!(NamingStyle::from_str("double_flat"), Some(NamingStyle::DoubleFlat));
        assert_eq!(NamingStyle::from_str("Sharp"), Some(NamingStyle::Sharp));
        assert_eq!(NamingStyle::from_str("weird"), None);
    }

    #[test]
    fn test_deserialize_reduces_into_range() {
        let pc: PitchClass = serde_yaml::from_str("14").unwrap();
        assert_eq!(pc, PitchClass::new(2));
        assert_eq!(NamingStyle::Mixed.name_of(pc), "D");

        let pc: PitchClass = serde_yaml::from_str("7").unwrap();
        assert_eq!(pc.value(), 7);
        assert_eq!(serde_yaml::to_string(&pc).unwrap().trim(), "7");
    }

    #[test]
    fn test_spell_note_name() {
        assert_eq!(spell_note_name(" c "), "C");
        assert_eq!(spell_note_name("bb"), "Bb");
        assert_eq!(spell_note_name("f#"), "F#");
        assert_eq!(spell_note_name("E♭"), "E♭");
    }

    #[test]
    fn test_closure_namer() {
        let namer = |pc: PitchClass| format!("pc{}", pc.value());
        assert_eq!(namer.name_of(PitchClass::new(4)), "pc4");
        assert_eq!(NamingStyle::Flat.name_of(PitchClass::new(10)), "Bb");
    }
}
