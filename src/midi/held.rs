// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Set of currently sounding notes.

use std::collections::BTreeSet;

use super::{messages, MidiMessage};
use crate::music::MidiNote;

/// Notes held down across all channels, kept in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldNotes {
    notes: BTreeSet<MidiNote>,
}

impl HeldNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one message into the set. Returns true if the set changed.
    pub fn apply(&mut self, message: &MidiMessage) -> bool {
        match *message {
            MidiMessage::NoteOn { note, .. } => self.notes.insert(note),
            MidiMessage::NoteOff { note, .. } => self.notes.remove(&note),
            MidiMessage::ControlChange { controller, .. }
                if controller == messages::ALL_NOTES_OFF || controller == messages::ALL_SOUND_OFF =>
            {
                let changed = !self.notes.is_empty();
                self.notes.clear();
                changed
            }
            _ => false,
        }
    }

    /// Held notes, lowest first
    pub fn notes(&self) -> Vec<MidiNote> {
        self.notes.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(note: u8) -> MidiMessage {
        MidiMessage::NoteOn {
            channel: 0,
            note,
            velocity: 100,
        }
    }

    fn off(note: u8) -> MidiMessage {
        MidiMessage::NoteOff {
            channel: 0,
            note,
            velocity: 0,
        }
    }

    #[test]
    fn test_note_on_off() {
        let mut held = HeldNotes::new();
        assert!(held.apply(&on(67)));
        assert!(held.apply(&on(60)));
        assert!(held.apply(&on(64)));
        assert_eq!(held.notes(), vec![60, 64, 67]);

        assert!(held.apply(&off(64)));
        assert_eq!(held.notes(), vec![60, 67]);
    }

    #[test]
    fn test_repeated_events_are_not_changes() {
        let mut held = HeldNotes::new();
        assert!(held.apply(&on(60)));
        assert!(!held.apply(&on(60)));
        assert!(!held.apply(&off(62)));
        assert_eq!(held.len(), 1);
    }

    #[test]
    fn test_all_notes_off() {
        let mut held = HeldNotes::new();
        held.apply(&on(60));
        held.apply(&on(64));

        let all_off = MidiMessage::ControlChange {
            channel: 3,
            controller: messages::ALL_NOTES_OFF,
            value: 0,
        };
        assert!(held.apply(&all_off));
        assert!(held.is_empty());
        assert!(!held.apply(&all_off));
    }

    #[test]
    fn test_other_controllers_ignored() {
        let mut held = HeldNotes::new();
        held.apply(&on(60));
        let sustain = MidiMessage::ControlChange {
            channel: 0,
            controller: 64,
            value: 127,
        };
        assert!(!held.apply(&sustain));
        assert!(!held.apply(&MidiMessage::Unknown(vec![0xF8])));
        assert_eq!(held.notes(), vec![60]);
    }
}
