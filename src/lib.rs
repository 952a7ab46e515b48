// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tonnetz: pitch-class relationships, scale recognition, harmonic lattice
//! construction and chord detection for music-theory visualizers and MIDI
//! analyzers.

pub mod chord;
pub mod config;
pub mod lattice;
pub mod midi;
pub mod music;

pub use chord::{ChordDetector, ChordMatch, ChordQuality, DetectorConfig};
pub use lattice::{Coord, Edge, EdgeKind, Lattice, LatticeConfig, Node, Orientation, Projection, Triangle};
pub use music::{CanonicalScale, Gamme, GammeError, NamingStyle, NoteNamer, PitchClass, ScaleType, Signature};
