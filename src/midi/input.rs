// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI input handling for receiving notes from controllers.
//!
//! This module parses raw MIDI bytes and connects to an input port through
//! midir, queueing parsed messages on a channel for the caller to drain.

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{anyhow, Result};
use midir::{Ignore, MidiInputConnection};
use tracing::{debug, info};

use super::messages;

const CLIENT_NAME: &str = "tonnetz";

/// Parsed MIDI message types
#[derive(Debug, Clone, PartialEq)]
pub enum MidiMessage {
    /// Note On: channel (0-15), note (0-127), velocity (1-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Control Change: channel (0-15), controller (0-127), value (0-127)
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Anything the analyzer does not act on
    Unknown(Vec<u8>),
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a MidiMessage
    pub fn parse(data: &[u8]) -> Option<Self> {
        let &status = data.first()?;
        let msg_type = status & 0xF0;
        let channel = status & 0x0F;

        match msg_type {
            messages::NOTE_OFF if data.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            messages::NOTE_ON if data.len() >= 3 => {
                let note = data[1] & 0x7F;
                let velocity = data[2] & 0x7F;
                // Note On with velocity 0 is equivalent to Note Off
                if velocity == 0 {
                    Some(MidiMessage::NoteOff {
                        channel,
                        note,
                        velocity: 0,
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note,
                        velocity,
                    })
                }
            }
            messages::CONTROL_CHANGE if data.len() >= 3 => Some(MidiMessage::ControlChange {
                channel,
                controller: data[1] & 0x7F,
                value: data[2] & 0x7F,
            }),
            _ => Some(MidiMessage::Unknown(data.to_vec())),
        }
    }

    /// Whether this message can change the set of sounding notes
    pub fn affects_notes(&self) -> bool {
        match self {
            MidiMessage::NoteOn { .. } | MidiMessage::NoteOff { .. } => true,
            MidiMessage::ControlChange { controller, .. } => {
                *controller == messages::ALL_NOTES_OFF || *controller == messages::ALL_SOUND_OFF
            }
            MidiMessage::Unknown(_) => false,
        }
    }
}

/// MIDI input connected to one source port
pub struct MidiInput {
    _connection: MidiInputConnection<()>,
    receiver: Receiver<MidiMessage>,
    port_name: String,
}

impl MidiInput {
    /// Create a new MIDI input connected to the specified source
    pub fn new(source_index: usize) -> Result<Self> {
        let mut midi_in = midir::MidiInput::new(CLIENT_NAME)
            .map_err(|e| anyhow!("Failed to create MIDI client: {}", e))?;
        midi_in.ignore(Ignore::All);

        let ports = midi_in.ports();
        let port = ports.get(source_index).ok_or_else(|| {
            anyhow!(
                "MIDI source {} not found (only {} available)",
                source_index,
                ports.len()
            )
        })?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| format!("Unknown {}", source_index));

        let (tx, rx): (Sender<MidiMessage>, Receiver<MidiMessage>) = mpsc::channel();

        let connection = midi_in
            .connect(
                port,
                "tonnetz-input",
                move |_timestamp, data, _| {
                    if let Some(msg) = MidiMessage::parse(data) {
                        debug!(?msg, "midi in");
                        let _ = tx.send(msg);
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to source {}: {}", source_index, e))?;

        info!(port = %port_name, "MIDI input connected");

        Ok(Self {
            _connection: connection,
            receiver: rx,
            port_name,
        })
    }

    /// Try to receive the next MIDI message (non-blocking)
    pub fn try_recv(&self) -> Option<MidiMessage> {
        self.receiver.try_recv().ok()
    }

    /// Block until the next MIDI message arrives; `None` once the
    /// connection is gone
    pub fn recv(&self) -> Option<MidiMessage> {
        self.receiver.recv().ok()
    }

    /// Receive all pending MIDI messages
    pub fn recv_all(&self) -> Vec<MidiMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = self.try_recv() {
            messages.push(msg);
        }
        messages
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// List all available MIDI sources
pub fn list_sources() -> Vec<(usize, String)> {
    let Ok(midi_in) = midir::MidiInput::new(CLIENT_NAME) else {
        return Vec::new();
    };

    midi_in
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown {}", i));
            (i, name)
        })
        .collect()
}

/// Print all available MIDI sources to stdout
pub fn print_sources() {
    let sources = list_sources();
    if sources.is_empty() {
        println!("No MIDI sources found.");
    } else {
        println!("Available MIDI sources (inputs):");
        for (i, name) in sources {
            println!("  {}: {}", i, name);
        }
    }
}
