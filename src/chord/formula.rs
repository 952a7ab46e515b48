// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord formula table.

use std::fmt;

use serde::Serialize;

/// One entry of the chord formula table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChordQuality {
    // Triads
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,

    // Sixths
    Major6,
    Minor6,
    SixNine,

    // Sevenths
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    HalfDiminished7,
    Diminished7,
    Augmented7,
    Dominant7Sus4,

    // Extended
    Dominant9,
    Major9,
    Minor9,
    Dominant11,
    Minor11,
    Dominant13,
    Major13,
}

impl ChordQuality {
    /// Every formula, in matching order
    pub const ALL: [ChordQuality; 24] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
        ChordQuality::Major6,
        ChordQuality::Minor6,
        ChordQuality::SixNine,
        ChordQuality::Dominant7,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::MinorMajor7,
        ChordQuality::HalfDiminished7,
        ChordQuality::Diminished7,
        ChordQuality::Augmented7,
        ChordQuality::Dominant7Sus4,
        ChordQuality::Dominant9,
        ChordQuality::Major9,
        ChordQuality::Minor9,
        ChordQuality::Dominant11,
        ChordQuality::Minor11,
        ChordQuality::Dominant13,
        ChordQuality::Major13,
    ];

    /// Required pitch-class intervals above the root
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::Major6 => &[0, 4, 7, 9],
            ChordQuality::Minor6 => &[0, 3, 7, 9],
            ChordQuality::SixNine => &[0, 2, 4, 7, 9],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::MinorMajor7 => &[0, 3, 7, 11],
            ChordQuality::HalfDiminished7 => &[0, 3, 6, 10],
            ChordQuality::Diminished7 => &[0, 3, 6, 9],
            ChordQuality::Augmented7 => &[0, 4, 8, 10],
            ChordQuality::Dominant7Sus4 => &[0, 5, 7, 10],
            ChordQuality::Dominant9 => &[0, 2, 4, 7, 10],
            ChordQuality::Major9 => &[0, 2, 4, 7, 11],
            ChordQuality::Minor9 => &[0, 2, 3, 7, 10],
            ChordQuality::Dominant11 => &[0, 2, 5, 7, 10],
            ChordQuality::Minor11 => &[0, 2, 3, 5, 7, 10],
            ChordQuality::Dominant13 => &[0, 2, 4, 7, 9, 10],
            ChordQuality::Major13 => &[0, 2, 4, 7, 9, 11],
        }
    }

    /// Chord-symbol suffix ("" for a plain major triad)
    pub fn label(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Major6 => "6",
            ChordQuality::Minor6 => "m6",
            ChordQuality::SixNine => "6/9",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::MinorMajor7 => "mMaj7",
            ChordQuality::HalfDiminished7 => "m7♭5",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::Augmented7 => "aug7",
            ChordQuality::Dominant7Sus4 => "7sus4",
            ChordQuality::Dominant9 => "9",
            ChordQuality::Major9 => "maj9",
            ChordQuality::Minor9 => "m9",
            ChordQuality::Dominant11 => "11",
            ChordQuality::Minor11 => "m11",
            ChordQuality::Dominant13 => "13",
            ChordQuality::Major13 => "maj13",
        }
    }

    /// Whether the formula requires a pitch-class interval
    pub fn has(self, interval: u8) -> bool {
        self.intervals().contains(&interval)
    }

    /// Plain sixth chords give way to a seventh reading
    pub fn is_plain_sixth(self) -> bool {
        matches!(self, ChordQuality::Major6 | ChordQuality::Minor6)
    }

    /// Chords built on a minor or major seventh. These take 9/11/13
    /// upgrades and altered tensions instead of add-tags.
    pub fn has_seventh(self) -> bool {
        self.has(10) || self.has(11) || self == ChordQuality::Diminished7
    }

    /// The extension degree written in the label (7, 9, 11 or 13) and the
    /// token to replace when upgrading. Diminished sevenths never upgrade.
    pub fn extension_token(self) -> Option<(u8, &'static str)> {
        match self {
            ChordQuality::Diminished7 => None,
            ChordQuality::Dominant9 | ChordQuality::Major9 | ChordQuality::Minor9 => Some((9, "9")),
            ChordQuality::Dominant11 | ChordQuality::Minor11 => Some((11, "11")),
            ChordQuality::Dominant13 | ChordQuality::Major13 => Some((13, "13")),
            q if q.has_seventh() => Some((7, "7")),
            _ => None,
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_formula_has_root() {
        for quality in ChordQuality::ALL {
            assert_eq!(quality.intervals()[0], 0, "{:?}", quality);
        }
    }

    #[test]
    fn test_seventh_classification() {
        assert!(ChordQuality::Dominant7.has_seventh());
        assert!(ChordQuality::Major9.has_seventh());
        assert!(ChordQuality::Diminished7.has_seventh());
        assert!(!ChordQuality::Major6.has_seventh());
        assert!(!ChordQuality::SixNine.has_seventh());
    }

    #[test]
    fn test_extension_tokens() {
        assert_eq!(ChordQuality::Major7.extension_token(), Some((7, "7")));
        assert_eq!(ChordQuality::HalfDiminished7.extension_token(), Some((7, "7")));
        assert_eq!(ChordQuality::Minor11.extension_token(), Some((11, "11")));
        assert_eq!(ChordQuality::Diminished7.extension_token(), None);
        assert_eq!(ChordQuality::Major.extension_token(), None);
    }
}
