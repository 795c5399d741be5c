// Command types - control context to audio callback

use crate::midi::event::MidiEvent;

/// Everything the control context may ask of the engine. Drained by the
/// audio callback at the top of every buffer.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    Midi(MidiEvent),
    /// Mono chord fold: move the sounding pitch without re-triggering.
    NoteChange(u8),
}
