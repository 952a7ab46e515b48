// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory core.
//!
//! Pitch-class arithmetic and naming, the canonical scale table, and the
//! active scale model with its derived degree and interval labels.

pub mod gamme;
pub mod pitch;
pub mod scale;

pub use gamme::{degree_labels, interval_labels, reconnaitre, Gamme, GammeError, Signature};
pub use pitch::{mod12, parse_note_name, spell_note_name, MidiNote, NamingStyle, NoteNamer, PitchClass};
pub use scale::{CanonicalScale, ScaleType};
