// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Canonical scale table and named scale presets.
//!
//! The canonical table is what scale recognition compares against; presets
//! are the user-facing names ("dorian", "aeolian", ...) which resolve to a
//! canonical scale plus a mode rotation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::gamme::Signature;

/// Scales recognized by rotation matching, in recognition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalScale {
    Major,
    HarmonicMinor,
    MelodicMinor,
    Pentatonic,
    Altered,
    Chromatic,
    WholeTone,
    Diminished,
    Blues,
}

impl CanonicalScale {
    /// Table order matters: the first scale that matches wins.
    pub const ALL: [CanonicalScale; 9] = [
        CanonicalScale::Major,
        CanonicalScale::HarmonicMinor,
        CanonicalScale::MelodicMinor,
        CanonicalScale::Pentatonic,
        CanonicalScale::Altered,
        CanonicalScale::Chromatic,
        CanonicalScale::WholeTone,
        CanonicalScale::Diminished,
        CanonicalScale::Blues,
    ];

    /// Un-rotated 12-bit signature, bit 0 first
    pub fn signature_str(self) -> &'static str {
        match self {
            CanonicalScale::Major => "101011010101",
            CanonicalScale::HarmonicMinor => "101101011001",
            CanonicalScale::MelodicMinor => "101101010101",
            CanonicalScale::Pentatonic => "101010010100",
            CanonicalScale::Altered => "110110101010",
            CanonicalScale::Chromatic => "111111111111",
            CanonicalScale::WholeTone => "101010101010",
            CanonicalScale::Diminished => "101101101101",
            CanonicalScale::Blues => "100101110010",
        }
    }

    pub fn signature(self) -> Signature {
        Signature::from_bits(self.signature_str().chars().map(|c| c == '1'))
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            CanonicalScale::Major => "Major",
            CanonicalScale::HarmonicMinor => "Harmonic Minor",
            CanonicalScale::MelodicMinor => "Melodic Minor",
            CanonicalScale::Pentatonic => "Pentatonic",
            CanonicalScale::Altered => "Altered",
            CanonicalScale::Chromatic => "Chromatic",
            CanonicalScale::WholeTone => "Whole Tone",
            CanonicalScale::Diminished => "Diminished",
            CanonicalScale::Blues => "Blues",
        }
    }

    fn mode_names(self) -> &'static [&'static str] {
        match self {
            CanonicalScale::Major => &[
                "Ionian",
                "Dorian",
                "Phrygian",
                "Lydian",
                "Mixolydian",
                "Aeolian",
                "Locrian",
            ],
            CanonicalScale::HarmonicMinor => &[
                "Harmonic Minor",
                "Locrian ♮6",
                "Ionian ♯5",
                "Dorian ♯4",
                "Phrygian Dominant",
                "Lydian ♯2",
                "Ultralocrian",
            ],
            CanonicalScale::MelodicMinor => &[
                "Melodic Minor",
                "Dorian ♭2",
                "Lydian Augmented",
                "Lydian Dominant",
                "Mixolydian ♭6",
                "Locrian ♮2",
                "Altered",
            ],
            CanonicalScale::Pentatonic => &[
                "Major Pentatonic",
                "Suspended Pentatonic",
                "Blues Minor",
                "Blues Major",
                "Minor Pentatonic",
            ],
            _ => &[],
        }
    }

    /// Name of a mode of this scale (0 = the scale itself)
    pub fn mode_name(self, mode: usize) -> String {
        match self.mode_names().get(mode) {
            Some(name) => name.to_string(),
            None if mode == 0 => self.name().to_string(),
            None => format!("{} Mode {}", self.name(), mode + 1),
        }
    }
}

impl fmt::Display for CanonicalScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Named scale presets that resolve to a canonical scale and mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    // Major scale and modes
    Major,        // Ionian
    Dorian,       // Minor with raised 6th
    Phrygian,     // Minor with lowered 2nd
    Lydian,       // Major with raised 4th
    Mixolydian,   // Major with lowered 7th
    NaturalMinor, // Aeolian
    Locrian,      // Diminished

    // Other minor scales
    HarmonicMinor,
    MelodicMinor, // Ascending form
    Altered,

    // Pentatonic scales
    MajorPentatonic,
    MinorPentatonic,

    // Symmetric and other
    Blues,
    WholeTone,
    Diminished, // Whole-half
    Chromatic,
}

impl ScaleType {
    /// Canonical scale and mode index this preset rotates from
    pub fn canonical(self) -> (CanonicalScale, usize) {
        match self {
            ScaleType::Major => (CanonicalScale::Major, 0),
            ScaleType::Dorian => (CanonicalScale::Major, 1),
            ScaleType::Phrygian => (CanonicalScale::Major, 2),
            ScaleType::Lydian => (CanonicalScale::Major, 3),
            ScaleType::Mixolydian => (CanonicalScale::Major, 4),
            ScaleType::NaturalMinor => (CanonicalScale::Major, 5),
            ScaleType::Locrian => (CanonicalScale::Major, 6),
            ScaleType::HarmonicMinor => (CanonicalScale::HarmonicMinor, 0),
            ScaleType::MelodicMinor => (CanonicalScale::MelodicMinor, 0),
            ScaleType::Altered => (CanonicalScale::MelodicMinor, 6),
            ScaleType::MajorPentatonic => (CanonicalScale::Pentatonic, 0),
            ScaleType::MinorPentatonic => (CanonicalScale::Pentatonic, 4),
            ScaleType::Blues => (CanonicalScale::Blues, 0),
            ScaleType::WholeTone => (CanonicalScale::WholeTone, 0),
            ScaleType::Diminished => (CanonicalScale::Diminished, 0),
            ScaleType::Chromatic => (CanonicalScale::Chromatic, 0),
        }
    }

    /// Signature of this preset relative to its own tonic
    pub fn signature(self) -> Signature {
        let (scale, mode) = self.canonical();
        scale.signature().mode(mode)
    }

    /// Parse scale type from string
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match s.as_str() {
            "major" | "ionian" => Some(ScaleType::Major),
            "dorian" => Some(ScaleType::Dorian),
            "phrygian" => Some(ScaleType::Phrygian),
            "lydian" => Some(ScaleType::Lydian),
            "mixolydian" => Some(ScaleType::Mixolydian),
            "minor" | "naturalminor" | "aeolian" => Some(ScaleType::NaturalMinor),
            "locrian" => Some(ScaleType::Locrian),
            "harmonicminor" => Some(ScaleType::HarmonicMinor),
            "melodicminor" => Some(ScaleType::MelodicMinor),
            "altered" | "superlocrian" => Some(ScaleType::Altered),
            "majorpentatonic" | "pentatonicmajor" | "pentatonic" => Some(ScaleType::MajorPentatonic),
            "minorpentatonic" | "pentatonicminor" => Some(ScaleType::MinorPentatonic),
            "blues" | "minorblues" => Some(ScaleType::Blues),
            "wholetone" => Some(ScaleType::WholeTone),
            "diminished" | "octatonic" | "wholehalf" => Some(ScaleType::Diminished),
            "chromatic" => Some(ScaleType::Chromatic),
            _ => None,
        }
    }

    /// Get a human-readable name for this scale type
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::Dorian => "Dorian",
            ScaleType::Phrygian => "Phrygian",
            ScaleType::Lydian => "Lydian",
            ScaleType::Mixolydian => "Mixolydian",
            ScaleType::NaturalMinor => "Natural Minor",
            ScaleType::Locrian => "Locrian",
            ScaleType::HarmonicMinor => "Harmonic Minor",
            ScaleType::MelodicMinor => "Melodic Minor",
            ScaleType::Altered => "Altered",
            ScaleType::MajorPentatonic => "Major Pentatonic",
            ScaleType::MinorPentatonic => "Minor Pentatonic",
            ScaleType::Blues => "Blues",
            ScaleType::WholeTone => "Whole Tone",
            ScaleType::Diminished => "Diminished",
            ScaleType::Chromatic => "Chromatic",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
