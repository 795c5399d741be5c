// Audio engine - real-time cpal callback
//
// The callback owns the SynthEngine outright. Control work arrives through
// the command ring buffer, drained at the top of every buffer; the 1 kHz
// control tick is derived from the running sample counter. Nothing in the
// callback allocates, blocks or logs.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, Stream, StreamConfig};
use ringbuf::traits::Consumer;

use crate::audio::duty_monitor::DutyMonitor;
use crate::audio::parameters::EngineDiagnostics;
use crate::config::ConfigParams;
use crate::messaging::channels::CommandConsumer;
use crate::messaging::command::Command;
use crate::synth::engine::SynthEngine;
use crate::synth::patch::PatchParams;
use crate::synth::tables::{CONTROL_TICK_SAMPLES, SAMPLE_RATE_HZ};

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("failed to enumerate output configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("device does not support {0} Hz f32 output")]
    UnsupportedSampleRate(u32),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub struct AudioEngine {
    _stream: Stream,
    pub duty: DutyMonitor,
    pub diagnostics: EngineDiagnostics,
}

impl AudioEngine {
    pub fn new(
        mut command_rx: CommandConsumer,
        patch: PatchParams,
        config: ConfigParams,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        log::info!(
            "audio device: {}",
            device.name().unwrap_or_else(|_| "unknown".into())
        );

        // the engine runs at its fixed rate; the device must match
        let config_range = device
            .supported_output_configs()?
            .find(|c| {
                c.sample_format() == SampleFormat::F32
                    && c.min_sample_rate().0 <= SAMPLE_RATE_HZ
                    && c.max_sample_rate().0 >= SAMPLE_RATE_HZ
            })
            .ok_or(AudioError::UnsupportedSampleRate(SAMPLE_RATE_HZ))?;
        let stream_config: StreamConfig = config_range
            .with_sample_rate(SampleRate(SAMPLE_RATE_HZ))
            .into();
        let channels = stream_config.channels as usize;
        log::info!("output: {} Hz, {} channels", SAMPLE_RATE_HZ, channels);

        let duty = DutyMonitor::new(SAMPLE_RATE_HZ, 10);
        let duty_cb = duty.clone();
        let diagnostics = EngineDiagnostics::new();
        let diagnostics_cb = diagnostics.clone();

        let mut engine = SynthEngine::new(patch, config);
        let mut samples_until_tick: u32 = 0;

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let measure = duty_cb.start_measure();

                while let Some(cmd) = command_rx.try_pop() {
                    match cmd {
                        Command::Midi(event) => engine.handle_midi(event),
                        Command::NoteChange(note) => engine.note_change(note),
                    }
                }

                for frame in data.chunks_mut(channels) {
                    if samples_until_tick == 0 {
                        engine.process_control_tick();
                        samples_until_tick = CONTROL_TICK_SAMPLES;
                    }
                    samples_until_tick -= 1;

                    let sample = engine.render_sample().to_f32();
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                }

                diagnostics_cb
                    .pitch_bend_factor
                    .set(engine.pitch_bend_factor().to_f32());
                diagnostics_cb
                    .expression_level
                    .set(engine.expression_level().to_f32());

                duty_cb.end_measure(measure, data.len() / channels);
            },
            move |err| {
                log::error!("audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;

        Ok(Self {
            _stream: stream,
            duty,
            diagnostics,
        })
    }
}
