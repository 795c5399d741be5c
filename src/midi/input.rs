// MIDI input - midir port connection feeding the command channel

use midir::{MidiInput as MidirInput, MidiInputConnection};
use ringbuf::traits::Producer;

use crate::messaging::channels::CommandProducer;
use crate::messaging::command::Command;
use crate::midi::parser::{MidiParser, ParsedEvent};

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("MIDI init error: {0}")]
    Init(#[from] midir::InitError),

    #[error("MIDI connect error: {0}")]
    Connect(String),
}

/// Owns the midir connection; events flow from the midir callback thread
/// into the ring buffer and nowhere else.
pub struct MidiInput {
    _connection: Option<MidiInputConnection<()>>,
}

impl MidiInput {
    /// Connect to the first available input port. A machine without MIDI
    /// ports is not an error; the synth runs on, silent until commands
    /// arrive some other way.
    pub fn new(mut command_tx: CommandProducer, midi_channel: u8) -> Result<Self, MidiError> {
        let midi_in = MidirInput::new("hexsynth midi input")?;

        let ports = midi_in.ports();
        if ports.is_empty() {
            log::warn!("no MIDI input port detected; running without MIDI");
            return Ok(Self { _connection: None });
        }

        for (i, port) in ports.iter().enumerate() {
            if let Ok(name) = midi_in.port_name(port) {
                log::info!("MIDI port [{}]: {}", i, name);
            }
        }

        let port = &ports[0];
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| "unknown".to_string());

        let mut parser = MidiParser::new(midi_channel);
        let connection = midi_in
            .connect(
                port,
                "hexsynth-input",
                move |_timestamp, message, _| {
                    for &byte in message {
                        let Some(parsed) = parser.feed(byte) else {
                            continue;
                        };
                        let command = match parsed {
                            ParsedEvent::Event(event) => Command::Midi(event),
                            ParsedEvent::NoteChange { note } => Command::NoteChange(note),
                        };
                        if command_tx.try_push(command).is_err() {
                            log::warn!("command buffer full, MIDI event dropped");
                        }
                    }
                },
                (),
            )
            .map_err(|e| MidiError::Connect(e.to_string()))?;

        log::info!("MIDI input connected: {}", port_name);
        Ok(Self {
            _connection: Some(connection),
        })
    }
}
