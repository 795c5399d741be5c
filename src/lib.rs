// hexsynth - monophonic six-oscillator wave-table synthesizer

pub mod audio;
pub mod config;
pub mod messaging;
pub mod midi;
pub mod synth;

// Re-export commonly used types for binaries, tests and benchmarks
pub use audio::engine::{AudioEngine, AudioError};
pub use config::{ConfigParams, SettingsStore, VibratoMode};
pub use messaging::channels::create_command_channel;
pub use messaging::command::Command;
pub use midi::event::MidiEvent;
pub use midi::input::{MidiError, MidiInput};
pub use midi::parser::{MidiParser, ParsedEvent};
pub use synth::engine::SynthEngine;
pub use synth::fixed::Fx;
pub use synth::patch::{PatchParams, preset_patches};
pub use synth::tables::{CONTROL_TICK_SAMPLES, SAMPLE_RATE_HZ};
