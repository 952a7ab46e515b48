// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The active scale ("gamme") and everything derived from it.
//!
//! A [`Gamme`] owns a 12-bit [`Signature`] relative to its tonic. Every
//! mutator re-derives chroma, absolute pitch classes, degree labels,
//! interval labels and the recognized scale/mode before it returns, so a
//! caller never sees a half-updated scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::pitch::{parse_note_name, spell_note_name, NamingStyle, NoteNamer, PitchClass};
use super::scale::{CanonicalScale, ScaleType};

/// Number of semitone positions in a signature
pub const SIGNATURE_LEN: usize = 12;

/// Major-scale reference positions used for 7-note degree labelling
const MAJOR_REFERENCE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Degree labels for scales that do not have exactly seven notes
const FALLBACK_DEGREES: [&str; 12] = [
    "1", "♭2", "2", "♭3", "3", "4", "♯4", "5", "♭6", "6", "♭7", "7",
];

/// Interval labels for scales that do not have exactly seven notes
const FALLBACK_INTERVALS: [&str; 12] = [
    "P1", "m2", "M2", "m3", "M3", "P4", "A4", "P5", "m6", "M6", "m7", "M7",
];

/// Quality ladders indexed by (semitone delta + offset)
const PERFECT_LADDER: [&str; 5] = ["dd", "d", "P", "A", "AA"];
const MAJOR_LADDER: [&str; 6] = ["dd", "d", "m", "M", "A", "AA"];

/// Errors for rejected scale edits. The scale is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GammeError {
    #[error("degree {0} is outside 0..12")]
    DegreeOutOfRange(usize),
    #[error("cannot move degree {from} to {to}: {reason}")]
    InvalidMove {
        from: usize,
        to: usize,
        reason: &'static str,
    },
    #[error("unknown note name: {0:?}")]
    UnknownNote(String),
    #[error("invalid signature {0:?}: expected 12 characters of 0/1")]
    InvalidSignature(String),
}

/// 12-bit scale membership mask; bit k is set iff the scale contains the
/// pitch k semitones above the tonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(u16);

impl Signature {
    const MASK: u16 = 0x0FFF;

    /// Build from 12 booleans, position 0 first
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut value = 0u16;
        for (k, bit) in bits.into_iter().take(SIGNATURE_LEN).enumerate() {
            if bit {
                value |= 1 << k;
            }
        }
        Signature(value)
    }

    /// Build from semitone offsets (values reduced mod 12)
    pub fn from_offsets(offsets: &[u8]) -> Self {
        let mut value = 0u16;
        for &k in offsets {
            value |= 1 << (k % 12);
        }
        Signature(value)
    }

    pub fn contains(self, k: usize) -> bool {
        k < SIGNATURE_LEN && self.0 & (1 << k) != 0
    }

    /// Number of notes
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn with(self, k: usize) -> Self {
        Signature(self.0 | (1 << k))
    }

    fn without(self, k: usize) -> Self {
        Signature(self.0 & !(1 << k))
    }

    /// Ascending set offsets
    pub fn chroma(self) -> Vec<u8> {
        (0..SIGNATURE_LEN as u8)
            .filter(|&k| self.contains(k as usize))
            .collect()
    }

    /// Bit k of the result is bit (k + n) of self
    pub fn rotate_left(self, n: usize) -> Self {
        let n = (n % SIGNATURE_LEN) as u32;
        Signature(((self.0 >> n) | (self.0 << (12 - n))) & Self::MASK)
    }

    /// Bit k of the result is bit (k - n) of self
    pub fn rotate_right(self, n: usize) -> Self {
        self.rotate_left(SIGNATURE_LEN - n % SIGNATURE_LEN)
    }

    /// The rotation starting on the `mode`-th set bit (0-based)
    pub fn mode(self, mode: usize) -> Self {
        let chroma = self.chroma();
        if chroma.is_empty() {
            return self;
        }
        self.rotate_left(chroma[mode % chroma.len()] as usize)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for k in 0..SIGNATURE_LEN {
            f.write_str(if self.contains(k) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Signature {
    type Err = GammeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.chars().count() != SIGNATURE_LEN || !s.chars().all(|c| c == '0' || c == '1') {
            return Err(GammeError::InvalidSignature(s.to_string()));
        }
        Ok(Signature::from_bits(s.chars().map(|c| c == '1')))
    }
}

impl Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Recognize a signature as a mode of one of the canonical scales.
///
/// The signature is rotated through all twelve shifts; each rotation that
/// starts on a set bit is one mode step. The first canonical scale (in
/// table order) with an exact match wins.
pub fn reconnaitre(signature: Signature) -> Option<(CanonicalScale, usize)> {
    for scale in CanonicalScale::ALL {
        let canonical = scale.signature();
        let mut mode = 0;
        for r in 0..SIGNATURE_LEN {
            let rotated = signature.rotate_right(r);
            if !rotated.contains(0) {
                continue;
            }
            if rotated == canonical {
                return Some((scale, mode));
            }
            mode += 1;
        }
    }
    None
}

fn alteration_prefix(delta: i32) -> Option<&'static str> {
    match delta {
        0 => Some(""),
        1 => Some("♯"),
        2 => Some("♯♯"),
        -1 => Some("♭"),
        -2 => Some("♭♭"),
        _ => None,
    }
}

/// Degree label for every chroma entry ("1", "♭3", "♯4", ...)
pub fn degree_labels(chroma: &[u8]) -> Vec<String> {
    if chroma.len() == MAJOR_REFERENCE.len() {
        chroma
            .iter()
            .zip(MAJOR_REFERENCE)
            .enumerate()
            .map(|(degree, (&offset, reference))| {
                match alteration_prefix(offset as i32 - reference) {
                    Some(prefix) => format!("{}{}", prefix, degree + 1),
                    None => "?".to_string(),
                }
            })
            .collect()
    } else {
        chroma
            .iter()
            .map(|&offset| FALLBACK_DEGREES[offset as usize % 12].to_string())
            .collect()
    }
}

/// Interval quality label for every chroma entry ("P1", "m3", "A4", ...)
pub fn interval_labels(chroma: &[u8]) -> Vec<String> {
    if chroma.len() == MAJOR_REFERENCE.len() {
        chroma
            .iter()
            .zip(MAJOR_REFERENCE)
            .enumerate()
            .map(|(degree, (&offset, reference))| {
                let delta = offset as i32 - reference;
                // unison, fourth and fifth are the perfect family
                let quality = if matches!(degree, 0 | 3 | 4) {
                    usize::try_from(delta + 2)
                        .ok()
                        .and_then(|idx| PERFECT_LADDER.get(idx))
                } else {
                    usize::try_from(delta + 3)
                        .ok()
                        .and_then(|idx| MAJOR_LADDER.get(idx))
                };
                match quality {
                    Some(q) => format!("{}{}", q, degree + 1),
                    None => "?".to_string(),
                }
            })
            .collect()
    } else {
        chroma
            .iter()
            .map(|&offset| FALLBACK_INTERVALS[offset as usize % 12].to_string())
            .collect()
    }
}

/// The active scale: signature, tonic and all derived views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gamme {
    signature: Signature,
    tonic_pc: PitchClass,
    tonic_note: String,
    style: NamingStyle,
    chroma: Vec<u8>,
    pitch_classes: Vec<PitchClass>,
    degres: Vec<String>,
    intervalles: Vec<String>,
    nom_reconnu: Option<CanonicalScale>,
    mode_reconnu: Option<usize>,
}

impl Gamme {
    /// Create a scale from a signature and a tonic name
    pub fn new(signature: Signature, tonic: &str, style: NamingStyle) -> Result<Self, GammeError> {
        let tonic_pc =
            parse_note_name(tonic).ok_or_else(|| GammeError::UnknownNote(tonic.to_string()))?;
        let mut gamme = Self {
            signature,
            tonic_pc,
            tonic_note: spell_note_name(tonic),
            style,
            chroma: Vec::new(),
            pitch_classes: Vec::new(),
            degres: Vec::new(),
            intervalles: Vec::new(),
            nom_reconnu: None,
            mode_reconnu: None,
        };
        gamme.rederive();
        Ok(gamme)
    }

    /// Create a scale from a named preset (e.g. D dorian)
    pub fn from_scale_type(
        scale_type: ScaleType,
        tonic: &str,
        style: NamingStyle,
    ) -> Result<Self, GammeError> {
        Self::new(scale_type.signature(), tonic, style)
    }

    /// Recompute every derived field from signature + tonic
    fn rederive(&mut self) {
        self.chroma = self.signature.chroma();
        self.pitch_classes = self
            .chroma
            .iter()
            .map(|&c| self.tonic_pc.transpose(c as i32))
            .collect();
        self.degres = degree_labels(&self.chroma);
        self.intervalles = interval_labels(&self.chroma);

        let recognized = reconnaitre(self.signature);
        self.nom_reconnu = recognized.map(|(scale, _)| scale);
        self.mode_reconnu = recognized.map(|(_, mode)| mode);

        trace!(
            signature = %self.signature,
            tonic = %self.tonic_note,
            recognized = ?recognized,
            "gamme re-derived"
        );
    }

    fn check_degree(k: usize) -> Result<(), GammeError> {
        if k >= SIGNATURE_LEN {
            return Err(GammeError::DegreeOutOfRange(k));
        }
        Ok(())
    }

    /// Add the note k semitones above the tonic. No-op if already present.
    pub fn ajouter(&mut self, k: usize) -> Result<bool, GammeError> {
        Self::check_degree(k)?;
        if self.signature.contains(k) {
            return Ok(false);
        }
        self.signature = self.signature.with(k);
        self.rederive();
        debug!(degree = k, signature = %self.signature, "note added to gamme");
        Ok(true)
    }

    /// Remove the note k semitones above the tonic. No-op if absent.
    pub fn supprimer(&mut self, k: usize) -> Result<bool, GammeError> {
        Self::check_degree(k)?;
        if !self.signature.contains(k) {
            return Ok(false);
        }
        self.signature = self.signature.without(k);
        self.rederive();
        debug!(degree = k, signature = %self.signature, "note removed from gamme");
        Ok(true)
    }

    /// Move a note one semitone: `from` must be set, `to` clear and adjacent.
    pub fn deplacer(&mut self, from: usize, to: usize) -> Result<bool, GammeError> {
        Self::check_degree(from)?;
        Self::check_degree(to)?;
        let invalid = |reason| GammeError::InvalidMove { from, to, reason };
        if from.abs_diff(to) != 1 {
            return Err(invalid("positions are not adjacent"));
        }
        if !self.signature.contains(from) {
            return Err(invalid("source position is empty"));
        }
        if self.signature.contains(to) {
            return Err(invalid("target position is occupied"));
        }
        self.signature = self.signature.without(from).with(to);
        self.rederive();
        debug!(from, to, signature = %self.signature, "note moved in gamme");
        Ok(true)
    }

    /// Set a new tonic by name, keeping the signature
    pub fn set_tonic(&mut self, name: &str) -> Result<bool, GammeError> {
        let pc = parse_note_name(name).ok_or_else(|| GammeError::UnknownNote(name.to_string()))?;
        self.tonic_pc = pc;
        self.tonic_note = spell_note_name(name);
        self.rederive();
        debug!(tonic = %self.tonic_note, "gamme tonic set");
        Ok(true)
    }

    /// Transpose the tonic by a semitone offset
    pub fn transpose(&mut self, offset: i32) -> Result<bool, GammeError> {
        if offset.rem_euclid(12) == 0 {
            return Ok(false);
        }
        self.tonic_pc = self.tonic_pc.transpose(offset);
        self.tonic_note = self.style.name(self.tonic_pc).to_string();
        self.rederive();
        debug!(offset, tonic = %self.tonic_note, "gamme transposed");
        Ok(true)
    }

    /// Replace the whole signature
    pub fn set_signature(&mut self, signature: Signature) -> Result<bool, GammeError> {
        if signature == self.signature {
            return Ok(false);
        }
        self.signature = signature;
        self.rederive();
        debug!(signature = %self.signature, "gamme signature replaced");
        Ok(true)
    }

    /// Change the enharmonic style used for display names
    pub fn set_naming_style(&mut self, style: NamingStyle) -> Result<bool, GammeError> {
        if style == self.style {
            return Ok(false);
        }
        self.style = style;
        self.tonic_note = style.name(self.tonic_pc).to_string();
        Ok(true)
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn tonic_pc(&self) -> PitchClass {
        self.tonic_pc
    }

    pub fn tonic_note(&self) -> &str {
        &self.tonic_note
    }

    pub fn naming_style(&self) -> NamingStyle {
        self.style
    }

    pub fn chroma(&self) -> &[u8] {
        &self.chroma
    }

    pub fn pitch_classes(&self) -> &[PitchClass] {
        &self.pitch_classes
    }

    pub fn degres(&self) -> &[String] {
        &self.degres
    }

    pub fn intervalles(&self) -> &[String] {
        &self.intervalles
    }

    pub fn nom_reconnu(&self) -> Option<CanonicalScale> {
        self.nom_reconnu
    }

    pub fn mode_reconnu(&self) -> Option<usize> {
        self.mode_reconnu
    }

    /// Name of the recognized mode, e.g. "Dorian"
    pub fn mode_name(&self) -> Option<String> {
        Some(self.nom_reconnu?.mode_name(self.mode_reconnu?))
    }

    /// Whether an absolute pitch class belongs to the scale
    pub fn contains(&self, pc: PitchClass) -> bool {
        self.signature.contains(self.tonic_pc.interval_to(pc) as usize)
    }

    /// Display names of the scale notes, tonic first
    pub fn note_names(&self) -> Vec<String> {
        self.pitch_classes.iter().map(|&pc| self.name_of(pc)).collect()
    }
}

impl Default for Gamme {
    fn default() -> Self {
        let signature = ScaleType::Major.signature();
        let mut gamme = Self {
            signature,
            tonic_pc: PitchClass::C,
            tonic_note: "C".to_string(),
            style: NamingStyle::default(),
            chroma: Vec::new(),
            pitch_classes: Vec::new(),
            degres: Vec::new(),
            intervalles: Vec::new(),
            nom_reconnu: None,
            mode_reconnu: None,
        };
        gamme.rederive();
        gamme
    }
}

impl NoteNamer for Gamme {
    fn name_of(&self, pc: PitchClass) -> String {
        if pc == self.tonic_pc {
            return self.tonic_note.clone();
        }
        self.style.name(pc).to_string()
    }
}

impl fmt::Display for Gamme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode_name() {
            Some(mode) => write!(f, "{} {}", self.tonic_note, mode),
            None => write!(f, "{} [{}]", self.tonic_note, self.signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_major() -> Gamme {
        Gamme::default()
    }

    #[test]
    fn test_signature_parse_and_display() {
        let sig: Signature = "101011010101".parse().unwrap();
        assert_eq!(sig.to_string(), "101011010101");
        assert_eq!(sig.chroma(), vec![0, 2, 4, 5, 7, 9, 11]);
        assert_eq!(sig.len(), 7);
        assert!("10101".parse::<Signature>().is_err());
        assert!("10101101010x".parse::<Signature>().is_err());
    }

    #[test]
    fn test_signature_rotation() {
        let sig: Signature = "110000000000".parse().unwrap();
        assert_eq!(sig.rotate_left(1).to_string(), "100000000001");
        assert_eq!(sig.rotate_right(1).to_string(), "011000000000");
        assert_eq!(sig.rotate_left(5).rotate_right(5), sig);
    }

    #[test]
    fn test_recognize_major_and_modes() {
        assert_eq!(
            reconnaitre(ScaleType::Major.signature()),
            Some((CanonicalScale::Major, 0))
        );
        assert_eq!(
            reconnaitre(ScaleType::Dorian.signature()),
            Some((CanonicalScale::Major, 1))
        );
        assert_eq!(
            reconnaitre(ScaleType::NaturalMinor.signature()),
            Some((CanonicalScale::Major, 5))
        );
    }

    #[test]
    fn test_every_mode_rotation_is_recognized() {
        for scale in [
            CanonicalScale::Major,
            CanonicalScale::HarmonicMinor,
            CanonicalScale::MelodicMinor,
            CanonicalScale::Pentatonic,
            CanonicalScale::Blues,
        ] {
            let canonical = scale.signature();
            for mode in 0..canonical.len() {
                assert_eq!(
                    reconnaitre(canonical.mode(mode)),
                    Some((scale, mode)),
                    "{} mode {}",
                    scale,
                    mode
                );
            }
        }
    }

    #[test]
    fn test_first_table_entry_wins() {
        // The altered scale is a rotation of melodic minor
        assert_eq!(
            reconnaitre(CanonicalScale::Altered.signature()),
            Some((CanonicalScale::MelodicMinor, 6))
        );
        assert_eq!(
            reconnaitre(CanonicalScale::Chromatic.signature()),
            Some((CanonicalScale::Chromatic, 0))
        );
    }

    #[test]
    fn test_unrecognized_signature() {
        let sig: Signature = "110000000001".parse().unwrap();
        assert_eq!(reconnaitre(sig), None);

        let gamme = Gamme::new(sig, "C", NamingStyle::Sharp).unwrap();
        assert_eq!(gamme.nom_reconnu(), None);
        assert_eq!(gamme.mode_reconnu(), None);
    }

    #[test]
    fn test_degree_labels_major_and_minor() {
        let major = c_major();
        assert_eq!(major.degres(), &["1", "2", "3", "4", "5", "6", "7"]);

        let minor = Gamme::from_scale_type(ScaleType::NaturalMinor, "A", NamingStyle::Mixed).unwrap();
        assert_eq!(minor.degres(), &["1", "2", "♭3", "4", "5", "♭6", "♭7"]);

        let lydian = Gamme::from_scale_type(ScaleType::Lydian, "F", NamingStyle::Mixed).unwrap();
        assert_eq!(lydian.degres()[3], "♯4");
    }

    #[test]
    fn test_degree_labels_unresolved() {
        // Seven notes crammed at the bottom: the 7th degree is 5 below its reference
        let labels = degree_labels(&[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(labels[0], "1");
        assert_eq!(labels[1], "♭2");
        assert_eq!(labels[6], "?");
    }

    #[test]
    fn test_degree_labels_fallback() {
        let pentatonic = Gamme::from_scale_type(ScaleType::MinorPentatonic, "A", NamingStyle::Mixed).unwrap();
        assert_eq!(pentatonic.degres(), &["1", "♭3", "4", "5", "♭7"]);
    }

    #[test]
    fn test_interval_labels() {
        let major = c_major();
        assert_eq!(major.intervalles(), &["P1", "M2", "M3", "P4", "P5", "M6", "M7"]);

        let locrian = Gamme::from_scale_type(ScaleType::Locrian, "B", NamingStyle::Mixed).unwrap();
        assert_eq!(locrian.intervalles(), &["P1", "m2", "m3", "P4", "d5", "m6", "m7"]);

        let lydian = Gamme::from_scale_type(ScaleType::Lydian, "F", NamingStyle::Mixed).unwrap();
        assert_eq!(lydian.intervalles()[3], "A4");
    }

    #[test]
    fn test_interval_labels_unresolved_and_fallback() {
        let labels = interval_labels(&[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(labels[2], "d3");
        assert_eq!(labels[6], "?");

        assert_eq!(interval_labels(&[0, 3, 7]), vec!["P1", "m3", "P5"]);
    }

    #[test]
    fn test_ajouter_is_idempotent() {
        let mut gamme = c_major();
        assert_eq!(gamme.ajouter(6), Ok(true));
        let after_first = gamme.clone();
        assert_eq!(gamme.ajouter(6), Ok(false));
        assert_eq!(gamme, after_first);
        assert_eq!(gamme.chroma().len(), 8);
    }

    #[test]
    fn test_supprimer_absent_is_noop() {
        let mut gamme = c_major();
        let before = gamme.clone();
        assert_eq!(gamme.supprimer(1), Ok(false));
        assert_eq!(gamme, before);

        assert_eq!(gamme.supprimer(11), Ok(true));
        assert_eq!(gamme.chroma(), &[0, 2, 4, 5, 7, 9]);
        assert_eq!(gamme.nom_reconnu(), None);
    }

    #[test]
    fn test_mutation_out_of_range() {
        let mut gamme = c_major();
        assert_eq!(gamme.ajouter(12), Err(GammeError::DegreeOutOfRange(12)));
        assert_eq!(gamme, c_major());
    }

    #[test]
    fn test_deplacer() {
        let mut gamme = c_major();
        // F -> F# turns C major into C lydian
        assert_eq!(gamme.deplacer(5, 6), Ok(true));
        assert_eq!(gamme.mode_name().as_deref(), Some("Lydian"));

        let before = gamme.clone();
        assert!(matches!(gamme.deplacer(6, 8), Err(GammeError::InvalidMove { .. })));
        assert!(matches!(gamme.deplacer(6, 7), Err(GammeError::InvalidMove { .. })));
        assert!(matches!(gamme.deplacer(1, 0), Err(GammeError::InvalidMove { .. })));
        assert_eq!(gamme, before);
    }

    #[test]
    fn test_set_tonic_and_transpose() {
        let mut gamme = c_major();
        gamme.set_tonic("D").unwrap();
        assert_eq!(gamme.tonic_pc(), PitchClass::new(2));
        assert_eq!(gamme.pitch_classes()[2], PitchClass::new(6));

        gamme.transpose(-3).unwrap();
        assert_eq!(gamme.tonic_note(), "B");
        assert_eq!(gamme.signature(), ScaleType::Major.signature());
        assert!(gamme.contains(PitchClass::new(3)));

        assert_eq!(gamme.transpose(12), Ok(false));
        assert!(matches!(gamme.set_tonic("Q"), Err(GammeError::UnknownNote(_))));
    }

    #[test]
    fn test_naming_style_change() {
        let mut gamme = Gamme::from_scale_type(ScaleType::Major, "F", NamingStyle::Sharp).unwrap();
        assert!(gamme.note_names().contains(&"A#".to_string()));
        gamme.set_naming_style(NamingStyle::Flat).unwrap();
        assert!(gamme.note_names().contains(&"Bb".to_string()));
    }

    #[test]
    fn test_display() {
        let gamme = Gamme::from_scale_type(ScaleType::Dorian, "D", NamingStyle::Mixed).unwrap();
        assert_eq!(gamme.to_string(), "D Dorian");
    }

    #[test]
    fn test_lowercase_tonic_is_capitalized() {
        let mut gamme = Gamme::from_scale_type(ScaleType::Major, "c", NamingStyle::Mixed).unwrap();
        assert_eq!(gamme.to_string(), "C Ionian");
        assert_eq!(gamme.note_names()[0], "C");

        gamme.set_tonic(" bb").unwrap();
        assert_eq!(gamme.tonic_note(), "Bb");
        assert_eq!(gamme.note_names()[0], "Bb");
    }
}
