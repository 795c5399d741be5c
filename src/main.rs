use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use hexsynth::config::SettingsStore;
use hexsynth::synth::patch::preset_patches;
use hexsynth::{AudioEngine, MidiInput, create_command_channel};

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .ok();

    let store_path =
        SettingsStore::default_path().unwrap_or_else(|| PathBuf::from("hexsynth-settings.ron"));
    let store = SettingsStore::new(store_path);
    let settings = store.load_or_default();

    // restore the last selected preset, or the stored user patch
    let patch = preset_patches()
        .get(settings.config.preset_last_selected as usize)
        .cloned()
        .unwrap_or_else(|| settings.user_patch.clone());
    log::info!("patch: {}", patch.name);

    let (command_tx, command_rx) = create_command_channel(512);

    let audio = match AudioEngine::new(command_rx, patch, settings.config.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("audio start-up failed: {}", e);
            return;
        }
    };

    let _midi = match MidiInput::new(command_tx, settings.config.midi_channel) {
        Ok(input) => input,
        Err(e) => {
            log::error!("MIDI start-up failed: {}", e);
            return;
        }
    };

    log::info!("hexsynth running; Ctrl-C to quit");
    loop {
        thread::sleep(Duration::from_secs(10));
        log::debug!(
            "callback duty {:.1}%, bend {:.4}, expression {:.3}",
            audio.duty.duty_percent(),
            audio.diagnostics.pitch_bend_factor.get(),
            audio.diagnostics.expression_level.get(),
        );
    }
}
