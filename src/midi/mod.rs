// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI input for live chord analysis.
//!
//! Raw bytes from a controller are parsed into [`MidiMessage`]s, folded
//! into the set of sounding notes by [`HeldNotes`], and that set is what
//! the chord detector sees.

pub mod held;
pub mod input;

pub use held::HeldNotes;
pub use input::{list_sources, print_sources, MidiInput, MidiMessage};

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const CONTROL_CHANGE: u8 = 0xB0;

    // Channel Mode controllers
    pub const ALL_SOUND_OFF: u8 = 120;
    pub const ALL_NOTES_OFF: u8 = 123;
}
