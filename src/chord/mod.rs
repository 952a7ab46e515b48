// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord detection from a set of sounding notes.
//!
//! Every pitch class present is tried as a root. Each root is matched
//! against the formula table, named with its extensions and altered
//! tensions, scored, and finally the whole list is ranked and pruned of
//! readings that are only an impoverished subset of a richer one.

pub mod formula;

pub use formula::ChordQuality;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::music::{parse_note_name, MidiNote, NoteNamer, PitchClass};

/// Notes further than this below the median are treated as doubled roots
const LOW_ROOT_THRESHOLD: f32 = 12.0;

/// Absolute interval window (two octaves)
const ABSOLUTE_WINDOW: i32 = 24;

/// Octave used to voice named input
const NAMED_INPUT_BASE: MidiNote = 60;

/// Altered tensions in display order: (absolute interval, symbol)
const ALTERATIONS: [(u8, &str); 4] = [(13, "♭9"), (15, "♯9"), (18, "♯11"), (20, "♭13")];

/// A single reading of the active notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordMatch {
    /// Root display name
    pub root: String,
    /// Quality, extensions, alterations and optional slash bass
    pub chord_type: String,
    /// Bass display name
    pub bass: String,
    pub recognized_notes: usize,
    pub total_notes: usize,
    /// Sorted absolute pitch classes implied by the reading
    pub chord_signature: Vec<u8>,
    pub root_pc: PitchClass,
    pub bass_pc: PitchClass,
    pub quality: ChordQuality,
}

impl ChordMatch {
    fn ratio_cmp(&self, other: &Self) -> Ordering {
        let lhs = self.recognized_notes * other.total_notes.max(1);
        let rhs = other.recognized_notes * self.total_notes.max(1);
        lhs.cmp(&rhs)
    }

    fn is_strict_subset_of(&self, other: &Self) -> bool {
        self.chord_signature.len() < other.chord_signature.len()
            && self
                .chord_signature
                .iter()
                .all(|pc| other.chord_signature.contains(pc))
    }
}

impl fmt::Display for ChordMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.chord_type)
    }
}

/// Detector options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Keep at most this many readings
    pub max_results: Option<usize>,
}

/// Normalized input: sorted MIDI notes, the bass, and the pitch-class set
#[derive(Debug, Clone)]
struct Voicing {
    notes: Vec<MidiNote>,
    bass: MidiNote,
    pitch_classes: Vec<PitchClass>,
}

impl Voicing {
    fn from_midi(notes: &[MidiNote]) -> Option<Self> {
        let mut notes = notes.to_vec();
        notes.sort_unstable();
        notes.dedup();
        let bass = *notes.first()?;
        Some(Self::with_bass(notes, bass))
    }

    /// Close voicing above the first pitch class, which becomes the bass
    fn from_pitch_classes(pcs: &[PitchClass]) -> Option<Self> {
        let first = *pcs.first()?;
        let bass = NAMED_INPUT_BASE + first.value();
        let notes: Vec<MidiNote> = pcs
            .iter()
            .map(|&pc| bass + first.interval_to(pc))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Some(Self::with_bass(notes, bass))
    }

    fn with_bass(notes: Vec<MidiNote>, bass: MidiNote) -> Self {
        let pitch_classes = notes
            .iter()
            .map(|&n| PitchClass::from_midi(n))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            notes,
            bass,
            pitch_classes,
        }
    }

    fn median(&self) -> f32 {
        let n = self.notes.len();
        if n % 2 == 1 {
            self.notes[n / 2] as f32
        } else {
            (self.notes[n / 2 - 1] as f32 + self.notes[n / 2] as f32) / 2.0
        }
    }
}

/// Stateless chord matcher
#[derive(Debug, Clone, Default)]
pub struct ChordDetector {
    config: DetectorConfig,
}

impl ChordDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect chords from absolute MIDI notes; the lowest note is the bass
    pub fn detect_midi(&self, notes: &[MidiNote], namer: &dyn NoteNamer) -> Vec<ChordMatch> {
        match Voicing::from_midi(notes) {
            Some(voicing) => self.detect(&voicing, namer),
            None => Vec::new(),
        }
    }

    /// Detect chords from note names; the first name is the bass.
    /// Names that do not parse are skipped.
    pub fn detect_names(&self, names: &[&str], namer: &dyn NoteNamer) -> Vec<ChordMatch> {
        let pcs: Vec<PitchClass> = names
            .iter()
            .filter_map(|name| {
                let pc = parse_note_name(name);
                if pc.is_none() {
                    warn!(name = %name, "ignoring unknown note name");
                }
                pc
            })
            .collect();
        self.detect_pitch_classes(&pcs, namer)
    }

    /// Detect chords from pitch classes; the first one is the bass
    pub fn detect_pitch_classes(&self, pcs: &[PitchClass], namer: &dyn NoteNamer) -> Vec<ChordMatch> {
        match Voicing::from_pitch_classes(pcs) {
            Some(voicing) => self.detect(&voicing, namer),
            None => Vec::new(),
        }
    }

    fn detect(&self, voicing: &Voicing, namer: &dyn NoteNamer) -> Vec<ChordMatch> {
        let mut matches: Vec<ChordMatch> = voicing
            .pitch_classes
            .iter()
            .flat_map(|&root| analyze_root(voicing, root, namer))
            .collect();

        matches.sort_by(|a, b| {
            b.recognized_notes
                .cmp(&a.recognized_notes)
                .then_with(|| b.total_notes.cmp(&a.total_notes))
                .then_with(|| b.ratio_cmp(a))
                .then_with(|| b.quality.intervals().len().cmp(&a.quality.intervals().len()))
        });

        let mut kept: Vec<ChordMatch> = Vec::new();
        for candidate in matches {
            let redundant = kept.iter().any(|k| {
                candidate.is_strict_subset_of(k)
                    || (k.root_pc == candidate.root_pc
                        && k.bass_pc == candidate.bass_pc
                        && k.chord_signature == candidate.chord_signature)
            });
            if redundant {
                trace!(chord = %candidate, "dropping redundant reading");
                continue;
            }
            kept.push(candidate);
        }

        if let Some(max) = self.config.max_results {
            kept.truncate(max);
        }

        debug!(
            notes = ?voicing.notes,
            results = kept.len(),
            top = ?kept.first().map(|m| m.to_string()),
            "chord detection complete"
        );
        kept
    }
}

/// All formula matches for one candidate root
fn analyze_root(voicing: &Voicing, root_pc: PitchClass, namer: &dyn NoteNamer) -> Vec<ChordMatch> {
    // Doubled roots far below the median are not extensions
    let median = voicing.median();
    let is_low_root =
        |n: MidiNote| PitchClass::from_midi(n) == root_pc && (n as f32) < median - LOW_ROOT_THRESHOLD;
    let mut notes: Vec<MidiNote> = voicing.notes.iter().copied().filter(|&n| !is_low_root(n)).collect();
    if !notes.iter().any(|&n| PitchClass::from_midi(n) == root_pc) {
        notes = voicing.notes.clone();
    }

    // A bass a third above the root anchors the root a third below it
    let bass_pc = PitchClass::from_midi(voicing.bass);
    let bass_interval = root_pc.interval_to(bass_pc);
    let root_midi: i32 = if bass_interval == 3 || bass_interval == 4 {
        voicing.bass as i32 - bass_interval as i32
    } else {
        match notes.iter().find(|&&n| PitchClass::from_midi(n) == root_pc) {
            Some(&n) => n as i32,
            None => return Vec::new(),
        }
    };

    let absolute: BTreeSet<u8> = notes
        .iter()
        .map(|&n| absolute_interval(n as i32 - root_midi))
        .collect();
    let mut intervals: BTreeSet<u8> = notes
        .iter()
        .map(|&n| root_pc.interval_to(PitchClass::from_midi(n)))
        .collect();

    if intervals.contains(&3) && intervals.contains(&4) {
        intervals.remove(&4);
    }
    if intervals.contains(&4) && intervals.contains(&1) {
        intervals.remove(&1);
    }

    let has_seventh = intervals.contains(&10) || intervals.contains(&11);

    let mut matches = Vec::new();
    for quality in ChordQuality::ALL {
        if !quality.intervals().iter().all(|i| intervals.contains(i)) {
            continue;
        }
        if quality.is_plain_sixth() && has_seventh {
            continue;
        }

        let mut reading = if quality.has_seventh() {
            name_seventh(quality, &absolute)
        } else {
            name_triad(quality, &absolute)
        };
        add_alterations(&mut reading, quality, &absolute);

        let mut chord_type = reading.label;
        if bass_pc != root_pc {
            chord_type.push('/');
            chord_type.push_str(&namer.name_of(bass_pc));
        }

        let chord_signature: Vec<u8> = quality
            .intervals()
            .iter()
            .chain(reading.extra_intervals.iter())
            .map(|&i| root_pc.transpose(i as i32).value())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let count = quality.intervals().len() + reading.extra_intervals.len();
        let chord = ChordMatch {
            root: namer.name_of(root_pc),
            chord_type,
            bass: namer.name_of(bass_pc),
            recognized_notes: count,
            total_notes: count,
            chord_signature,
            root_pc,
            bass_pc,
            quality,
        };
        trace!(chord = %chord, recognized = chord.recognized_notes, "candidate");
        matches.push(chord);
    }
    matches
}

/// Interval of a note above the anchored root within the two-octave
/// window. Notes below the root only count by pitch class, so they never
/// read as upper extensions.
fn absolute_interval(semitones: i32) -> u8 {
    if semitones < 0 {
        semitones.rem_euclid(12) as u8
    } else {
        (semitones % ABSOLUTE_WINDOW) as u8
    }
}

/// Full label plus the pitch-class intervals it adds to the formula
#[derive(Debug)]
struct Reading {
    label: String,
    extra_intervals: Vec<u8>,
}

impl Reading {
    fn new(quality: ChordQuality) -> Self {
        Self {
            label: quality.label().to_string(),
            extra_intervals: Vec::new(),
        }
    }
}

/// Add-tags for chords without a seventh
fn name_triad(quality: ChordQuality, absolute: &BTreeSet<u8>) -> Reading {
    let mut reading = Reading::new(quality);
    let mut add = |tag: &str, interval: u8| {
        reading.label.push_str(tag);
        reading.extra_intervals.push(interval % 12);
    };

    if !quality.has(2) {
        if absolute.contains(&14) {
            add("add9", 14);
        } else if absolute.contains(&2) {
            add("add2", 2);
        }
    }
    if !quality.has(5) {
        if absolute.contains(&17) {
            add("add11", 17);
        } else if absolute.contains(&5) {
            add("add4", 5);
        }
    }
    if !quality.has(9) && absolute.contains(&21) {
        add("add13", 21);
    }
    reading
}

/// Extension upgrade for seventh chords
fn name_seventh(quality: ChordQuality, absolute: &BTreeSet<u8>) -> Reading {
    let mut reading = Reading::new(quality);

    if let Some((degree, token)) = quality.extension_token() {
        let extensions = [(9u8, 14u8, 2u8), (11, 17, 5), (13, 21, 9)];
        let mut highest = None;
        for (ext_degree, abs, pc) in extensions {
            if absolute.contains(&abs) && !quality.has(pc) {
                reading.extra_intervals.push(pc);
                highest = Some(ext_degree);
            }
        }
        if let Some(ext_degree) = highest.filter(|&d| d > degree) {
            reading.label = reading.label.replacen(token, &ext_degree.to_string(), 1);
        }
    }
    reading
}

/// Altered tensions, in fixed order, skipping any that clash with a
/// natural tone of the reading
fn add_alterations(reading: &mut Reading, quality: ChordQuality, absolute: &BTreeSet<u8>) {
    let mut altered = Vec::new();
    for (abs, symbol) in ALTERATIONS {
        let conflicting = match abs {
            13 => absolute.contains(&14),
            15 => quality.has(3),
            18 => quality.has(6) || absolute.contains(&17),
            _ => quality.has(8) || absolute.contains(&21),
        };
        if absolute.contains(&abs) && !conflicting {
            altered.push(symbol);
            reading.extra_intervals.push(abs % 12);
        }
    }
    if !altered.is_empty() {
        reading.label = format!("{}({})", reading.label, altered.join(","));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::NamingStyle;

    fn detector() -> ChordDetector {
        ChordDetector::default()
    }

    fn pcs(values: &[i32]) -> Vec<PitchClass> {
        values.iter().map(|&v| PitchClass::new(v)).collect()
    }

    #[test]
    fn test_c_major_triad_from_pitch_classes() {
        let result = detector().detect_pitch_classes(&pcs(&[0, 4, 7]), &NamingStyle::Mixed);
        let top = &result[0];
        assert_eq!(top.root, "C");
        assert_eq!(top.chord_type, "");
        assert_eq!(top.recognized_notes, 3);
        assert_eq!(top.total_notes, 3);
        assert_eq!(top.chord_signature, vec![0, 4, 7]);
    }

    #[test]
    fn test_c_major7_first_inversion() {
        // E4 G4 B4 C5
        let result = detector().detect_midi(&[64, 67, 71, 72], &NamingStyle::Mixed);
        let top = &result[0];
        assert_eq!(top.root, "C");
        assert_eq!(top.bass, "E");
        assert!(top.chord_type.contains("maj7"));
        assert!(top.chord_type.ends_with("/E"));
        assert_eq!(top.chord_type, "maj7/E");
    }

    #[test]
    fn test_triad_dropped_for_seventh_superset() {
        let result = detector().detect_midi(&[60, 64, 67, 70], &NamingStyle::Mixed);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].to_string(), "C7");
        assert!(result.iter().all(|m| m.quality != ChordQuality::Major));
    }

    #[test]
    fn test_minor_triad() {
        let result = detector().detect_midi(&[57, 60, 64], &NamingStyle::Mixed);
        assert_eq!(result[0].to_string(), "Am");
    }

    #[test]
    fn test_add9_prefers_upper_octave() {
        let result = detector().detect_midi(&[60, 64, 67, 74], &NamingStyle::Mixed);
        assert_eq!(result[0].to_string(), "Cadd9");
        assert_eq!(result[0].recognized_notes, 4);

        let close = detector().detect_midi(&[60, 62, 64, 67], &NamingStyle::Mixed);
        assert_eq!(close[0].to_string(), "Cadd2");
    }

    #[test]
    fn test_seventh_upgraded_to_ninth() {
        // C E G B D5
        let result = detector().detect_midi(&[60, 64, 67, 71, 74], &NamingStyle::Mixed);
        assert_eq!(result[0].root, "C");
        assert_eq!(result[0].chord_type, "maj9");
        assert_eq!(result[0].chord_signature, vec![0, 2, 4, 7, 11]);
    }

    #[test]
    fn test_flat_nine_alteration() {
        // C E G Bb Db5
        let result = detector().detect_midi(&[60, 64, 67, 70, 73], &NamingStyle::Mixed);
        assert_eq!(result[0].to_string(), "C7(♭9)");
        assert_eq!(result[0].recognized_notes, 5);
        assert_eq!(result[0].chord_signature, vec![0, 1, 4, 7, 10]);
    }

    #[test]
    fn test_low_doubled_root_is_not_an_extension() {
        // C3 under C4 E4 G4 Bb4 Db5: the C3 must not anchor the intervals
        let result = detector().detect_midi(&[48, 60, 64, 67, 70, 73], &NamingStyle::Mixed);
        assert_eq!(result[0].to_string(), "C7(♭9)");
    }

    fn labels(result: &[ChordMatch]) -> Vec<String> {
        result.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_notes_below_root_are_not_extensions() {
        // The C under G, Bb and Db roots is a chord tone, not an 11th or 13th
        let by_name = detector().detect_names(&["C", "E", "G", "Bb", "Db"], &NamingStyle::Mixed);
        assert_eq!(labels(&by_name), vec!["C7(♭9)"]);

        let by_number = detector().detect_midi(&[60, 64, 67, 70, 73], &NamingStyle::Mixed);
        assert_eq!(labels(&by_number), vec!["C7(♭9)"]);
    }

    #[test]
    fn test_six_nine_full_result_list() {
        // C6/9 also spells D11 and, with C a third above A, Am11 in first inversion
        let result = detector().detect_midi(&[60, 64, 67, 69, 74], &NamingStyle::Mixed);
        assert_eq!(labels(&result), vec!["C6/9", "D11/C", "Am11/C"]);
        assert!(result.iter().all(|m| m.recognized_notes == 5));
        assert!(result.iter().all(|m| m.chord_signature == vec![0, 2, 4, 7, 9]));
    }

    #[test]
    fn test_same_notes_same_root_reported_once() {
        // Major6 + add9 names the same notes over the same bass as 6/9
        let result = detector().detect_midi(&[60, 64, 67, 69, 74], &NamingStyle::Mixed);
        let c_readings: Vec<_> = result.iter().filter(|m| m.root == "C").collect();
        assert_eq!(c_readings.len(), 1);
        assert_eq!(c_readings[0].chord_type, "6/9");
    }

    #[test]
    fn test_single_low_root_is_kept_as_anchor() {
        // C2 is the only C and sits far below the median; it still roots the chord
        let result = detector().detect_midi(&[36, 64, 67, 70], &NamingStyle::Mixed);
        assert_eq!(labels(&result), vec!["C7"]);
        assert_eq!(result[0].recognized_notes, 4);
        assert_eq!(result[0].chord_signature, vec![0, 4, 7, 10]);
    }

    #[test]
    fn test_flat_nine_over_triad() {
        let result = detector().detect_midi(&[60, 64, 67, 73], &NamingStyle::Mixed);
        assert_eq!(labels(&result), vec!["C(♭9)"]);
        assert_eq!(result[0].recognized_notes, 4);
        assert_eq!(result[0].chord_signature, vec![0, 1, 4, 7]);
    }

    #[test]
    fn test_absolute_interval_window() {
        assert_eq!(absolute_interval(0), 0);
        assert_eq!(absolute_interval(14), 14);
        assert_eq!(absolute_interval(26), 2);
        assert_eq!(absolute_interval(-7), 5);
        assert_eq!(absolute_interval(-16), 8);
    }

    #[test]
    fn test_ambiguous_thirds_prefer_minor() {
        let result = detector().detect_midi(&[60, 63, 64, 67], &NamingStyle::Mixed);
        assert_eq!(result[0].to_string(), "Cm");
    }

    #[test]
    fn test_sixth_yields_to_seventh() {
        let result = detector().detect_midi(&[60, 64, 67, 69, 70], &NamingStyle::Mixed);
        assert!(result.iter().all(|m| m.quality != ChordQuality::Major6));
    }

    #[test]
    fn test_named_input_bass_is_first() {
        let result = detector().detect_names(&["E", "G", "C"], &NamingStyle::Mixed);
        assert_eq!(result[0].root, "C");
        assert_eq!(result[0].chord_type, "/E");
        assert_eq!(result[0].bass, "E");
    }

    #[test]
    fn test_unknown_names_are_skipped() {
        let result = detector().detect_names(&["C", "Z", "E", "G"], &NamingStyle::Mixed);
        assert_eq!(result[0].to_string(), "C");
    }

    #[test]
    fn test_empty_and_unmatched_input() {
        assert!(detector().detect_midi(&[], &NamingStyle::Mixed).is_empty());
        assert!(detector().detect_pitch_classes(&[], &NamingStyle::Mixed).is_empty());
        assert!(detector().detect_midi(&[60, 61], &NamingStyle::Mixed).is_empty());
    }

    #[test]
    fn test_namer_controls_spelling() {
        let result = detector().detect_midi(&[61, 65, 68], &NamingStyle::Sharp);
        assert_eq!(result[0].root, "C#");
        let result = detector().detect_midi(&[61, 65, 68], &NamingStyle::Flat);
        assert_eq!(result[0].root, "Db");
    }

    #[test]
    fn test_max_results() {
        let detector = ChordDetector::new(DetectorConfig { max_results: Some(1) });
        let result = detector.detect_midi(&[60, 64, 67, 74], &NamingStyle::Mixed);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_ranking_order() {
        let result = detector().detect_midi(&[60, 64, 67, 69], &NamingStyle::Mixed);
        for pair in result.windows(2) {
            assert!(pair[0].recognized_notes >= pair[1].recognized_notes);
        }
        // C6 and Am7/C share a signature; the longer-ranked C6 comes first
        assert_eq!(result[0].to_string(), "C6");
        assert!(result.iter().any(|m| m.to_string() == "Am7/C"));
    }
}
