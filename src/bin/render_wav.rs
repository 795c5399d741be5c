// Offline renderer - drives the engine at the fixed rate and writes a WAV
//
// Usage: render_wav [preset-index] [output.wav]
//
// Plays a short demo phrase through the selected preset. Handy for hearing
// a patch without an audio device or a MIDI keyboard.

use std::env;
use std::error::Error;

use hound::{SampleFormat, WavSpec, WavWriter};

use hexsynth::synth::engine::SynthEngine;
use hexsynth::synth::patch::preset_patches;
use hexsynth::synth::tables::{CONTROL_TICK_SAMPLES, SAMPLE_RATE_HZ};
use hexsynth::ConfigParams;

const PHRASE: [(u8, u32); 4] = [(60, 400), (64, 400), (67, 400), (72, 800)];
const RELEASE_GAP_MS: u32 = 150;
const TAIL_MS: u32 = 1500;

fn render_ms(engine: &mut SynthEngine, writer: &mut WavWriter<impl std::io::Write + std::io::Seek>, ms: u32) -> Result<(), hound::Error> {
    for _ in 0..ms {
        engine.process_control_tick();
        for _ in 0..CONTROL_TICK_SAMPLES {
            writer.write_sample(engine.render_sample_i16())?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .ok();

    let mut args = env::args().skip(1);
    let preset: usize = args.next().map(|a| a.parse()).transpose()?.unwrap_or(0);
    let out_path = args.next().unwrap_or_else(|| "hexsynth.wav".to_string());

    let presets = preset_patches();
    let patch = presets
        .get(preset)
        .ok_or_else(|| format!("preset {} out of range (0..{})", preset, presets.len() - 1))?
        .clone();
    log::info!("rendering preset {}: {}", preset, patch.name);

    let mut engine = SynthEngine::new(patch, ConfigParams::default());
    // a plausible playing level for expression-controlled presets
    engine.expression(14000);

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE_HZ,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&out_path, spec)?;

    for (note, hold_ms) in PHRASE {
        engine.note_on(note, 100);
        render_ms(&mut engine, &mut writer, hold_ms)?;
        engine.note_off(note);
        render_ms(&mut engine, &mut writer, RELEASE_GAP_MS)?;
    }
    render_ms(&mut engine, &mut writer, TAIL_MS)?;

    writer.finalize()?;
    log::info!("wrote {}", out_path);
    Ok(())
}
