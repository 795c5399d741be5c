// Synth engine - note state, control chain and the render path
//
// One owned value holds the entire voice: oscillator bank, modulation
// generators, mixer, reverb and limiter. The audio callback owns it and
// calls `render_sample` per tick plus `process_control_tick` every 1 ms;
// every other method belongs to the control context and is delivered
// through the command channel.

use crate::config::{AmpldOverride, ConfigParams, VibratoMode};
use crate::midi::event::MidiEvent;

use super::contour::{ContourGen, ContourParams, TransientGen, TransientParams};
use super::envelope::{EnvParams, EnvPhase, EnvelopeGen};
use super::fixed::{Fx, base2_exp};
use super::lfo::{Lfo, LfoParams};
use super::limiter::Limiter;
use super::mixer::Mixer;
use super::oscillator::{WaveOscillator, step_for_freq};
use super::patch::{AmpldControlSource, ModSource, PatchParams, preset_patches};
use super::reverb::ReverbDelay;
use super::tables::{FREQ_MULT, OSC_COUNT, Tables};

/// Breath-style expression inputs rarely reach the top of their range, so
/// expression is boosted by this percentage and then saturated.
const EXPRESSION_BOOST_PC: i64 = 125;

pub struct SynthEngine {
    tables: Box<Tables>,
    patch: PatchParams,
    config: ConfigParams,

    oscs: [WaveOscillator; OSC_COUNT],
    /// Per-oscillator amplitude factor, recomputed at control rate and held
    /// for the intervening audio samples.
    osc_ampld: [Fx; OSC_COUNT],
    /// Static `2^(cents/1200)` factor per oscillator (detune + master tune).
    detune_factor: [f64; OSC_COUNT],
    mixer: Mixer,
    env1: EnvelopeGen,
    contour: ContourGen,
    env2: TransientGen,
    lfo: Lfo,
    reverb: ReverbDelay,
    limiter: Limiter,

    note: u8,
    gate_on: bool,
    velocity: Fx,
    base_freq_hz: f64,
    bend_factor: Fx,
    vibrato_factor: Fx,
    expression: Fx,
    modulation: Fx,
    output_ampld: Fx,
    steps_stale: bool,

    // MSB latches for 14-bit controller pairs
    modulation_msb: u8,
    expression_msb: u8,
}

impl SynthEngine {
    pub fn new(patch: PatchParams, config: ConfigParams) -> Self {
        let mut engine = Self {
            tables: Tables::new(),
            patch,
            config,
            oscs: [WaveOscillator::new(); OSC_COUNT],
            osc_ampld: [Fx::ONE; OSC_COUNT],
            detune_factor: [1.0; OSC_COUNT],
            mixer: Mixer::new(),
            env1: EnvelopeGen::new(EnvParams::default()),
            contour: ContourGen::new(ContourParams::default()),
            env2: TransientGen::new(TransientParams::default()),
            lfo: Lfo::new(LfoParams::default()),
            reverb: ReverbDelay::new(),
            limiter: Limiter::new(),
            note: 0,
            gate_on: false,
            velocity: Fx::ZERO,
            base_freq_hz: 0.0,
            bend_factor: Fx::ONE,
            vibrato_factor: Fx::ONE,
            expression: Fx::ZERO,
            modulation: Fx::ZERO,
            output_ampld: Fx::ZERO,
            steps_stale: false,
            modulation_msb: 0,
            expression_msb: 0,
        };
        engine.patch.sanitize();
        engine.config.sanitize();
        engine.prepare();
        engine
    }

    /// Reset all engine state from the current patch and config. Safe to call
    /// from outside the audio context only while the engine is not rendering;
    /// in the running synth it executes inside the callback, between samples.
    pub fn prepare(&mut self) {
        self.env1.set_params(EnvParams::new(
            self.patch.env_attack_ms,
            self.patch.env_hold_ms,
            self.patch.env_decay_ms,
            self.patch.env_sustain_pc,
            self.patch.env_release_ms,
        ));
        self.env1.kill();

        self.contour.set_params(ContourParams::new(
            self.patch.contour_start_pc,
            self.patch.contour_delay_ms,
            self.patch.contour_ramp_ms,
            self.patch.contour_hold_pc,
        ));
        self.contour.kill();

        self.env2.set_params(TransientParams::new(
            self.patch.env2_decay_ms,
            self.patch.env2_sustain_pc,
        ));
        self.env2.kill();

        self.lfo.set_params(LfoParams::new(
            self.patch.lfo_freq_x10,
            self.patch.lfo_ramp_ms,
            self.patch.lfo_fm_depth_cents,
            self.patch.lfo_am_depth_pc,
        ));
        self.lfo.reset();

        self.mixer.configure(
            &self.patch.mixer_step,
            self.patch.mixer_out_gain_x10,
            &self.tables,
        );
        self.limiter.set_level_pc(self.patch.limiter_level_pc);

        self.reverb.set_mix_pc(self.config.reverb_mix_pc);
        self.reverb.set_atten_pc(self.config.reverb_atten_pc);
        self.reverb.reset();

        for (factor, &detune) in self.detune_factor.iter_mut().zip(self.patch.osc_detune.iter()) {
            let cents = detune as f64 + self.config.master_tune_cents as f64;
            *factor = (cents / 1200.0).exp2();
        }
        for osc in self.oscs.iter_mut() {
            osc.reset();
            osc.set_step(0);
        }
        self.osc_ampld = [Fx::ONE; OSC_COUNT];

        self.note = 0;
        self.gate_on = false;
        self.velocity = Fx::ZERO;
        self.base_freq_hz = 0.0;
        self.bend_factor = Fx::ONE;
        self.vibrato_factor = Fx::ONE;
        self.expression = Fx::ZERO;
        self.modulation = Fx::ZERO;
        self.output_ampld = Fx::ZERO;
        self.steps_stale = false;
        self.modulation_msb = 0;
        self.expression_msb = 0;
    }

    /// Replace the active patch and re-prepare.
    pub fn set_patch(&mut self, mut patch: PatchParams) {
        patch.sanitize();
        self.patch = patch;
        self.prepare();
    }

    /// Replace the configuration and re-prepare.
    pub fn set_config(&mut self, mut config: ConfigParams) {
        config.sanitize();
        self.config = config;
        self.prepare();
    }

    /// Load a preset by index; out-of-range indices are a no-op.
    pub fn select_preset(&mut self, index: u8) {
        let presets = preset_patches();
        if let Some(preset) = presets.get(index as usize) {
            self.patch = preset.clone();
            self.config.preset_last_selected = index;
            self.prepare();
        }
    }

    pub fn patch(&self) -> &PatchParams {
        &self.patch
    }

    pub fn config(&self) -> &ConfigParams {
        &self.config
    }

    // ---- control inputs -------------------------------------------------

    pub fn note_on(&mut self, note: u8, velocity: u8) {
        let note = note.min(127);
        if velocity == 0 {
            self.note_off(note);
            return;
        }

        let legato_glide = self.config.legato_enable && self.gate_on && self.env1.is_active();
        self.note = note;
        self.gate_on = true;
        self.base_freq_hz = self.tables.note_freq[note as usize];

        // the contour restarts on every note-on, glides included
        self.contour.trigger();

        if !legato_glide {
            self.velocity = Fx::from_f64(velocity.min(127) as f64 / 127.0);
            self.env1.trigger();
            self.env2.trigger();
            self.lfo.arm_gate();
        }
        self.steps_stale = true;
    }

    /// Update the pitch of the sounding note without re-triggering anything.
    pub fn note_change(&mut self, note: u8) {
        let note = note.min(127);
        self.note = note;
        self.base_freq_hz = self.tables.note_freq[note as usize];
        self.steps_stale = true;
    }

    pub fn note_off(&mut self, note: u8) {
        if self.gate_on && note.min(127) == self.note {
            self.gate_on = false;
            self.env1.release();
        }
    }

    /// Bipolar 14-bit pitch bend (-8192..=+8191). Ignored when disabled.
    pub fn pitch_bend(&mut self, data14: i16) {
        if !self.config.pitch_bend_enable {
            return;
        }
        let data = data14.clamp(-8192, 8191) as i64;
        let range = self.config.pitch_bend_range as i64;
        // exponent = (data / 8192) * range / 12, in Q12.20
        let exponent = Fx((((data * range) << 20) / (8192 * 12)) as i32);
        self.bend_factor = base2_exp(exponent);
        self.steps_stale = true;
    }

    /// Unsigned 14-bit expression (0..=16383), boosted and saturated.
    pub fn expression(&mut self, data14: u16) {
        let data = data14.min(0x3FFF) as i64;
        let level = (data << 20) / 0x3FFF;
        let boosted = level * EXPRESSION_BOOST_PC / 100;
        self.expression = Fx::saturate(boosted).max(Fx::ZERO);
    }

    /// Unsigned 14-bit modulation (0..=16383).
    pub fn modulation(&mut self, data14: u16) {
        let data = data14.min(0x3FFF) as i64;
        self.modulation = Fx(((data << 20) / 0x3FFF) as i32);
    }

    /// MIDI CC120/121: clear the note and force every generator idle. The
    /// reverb line keeps its tail; only the dry path goes silent.
    pub fn all_sound_off(&mut self) {
        self.gate_on = false;
        self.note = 0;
        self.velocity = Fx::ZERO;
        self.env1.kill();
        self.contour.kill();
        self.env2.kill();
        self.lfo.reset();
        self.output_ampld = Fx::ZERO;
        for osc in self.oscs.iter_mut() {
            osc.reset();
            osc.set_step(0);
        }
    }

    /// Dispatch one engine-relevant MIDI event.
    pub fn handle_midi(&mut self, event: MidiEvent) {
        match event {
            MidiEvent::NoteOn { note, velocity } => self.note_on(note, velocity),
            MidiEvent::NoteOff { note } => self.note_off(note),
            MidiEvent::PitchBend { value } => self.pitch_bend(value),
            MidiEvent::ProgramChange { program } => self.select_preset(program),
            MidiEvent::ControlChange { controller, value } => {
                self.control_change(controller, value)
            }
        }
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        let value = value.min(127);
        let expr_cc = self.config.midi_expression_cc;
        match controller {
            1 => {
                self.modulation_msb = value;
                self.modulation((value as u16) << 7);
            }
            33 => {
                self.modulation(((self.modulation_msb as u16) << 7) | value as u16);
            }
            120 | 121 => self.all_sound_off(),
            cc if expr_cc != 0 && cc == expr_cc => {
                self.expression_msb = value;
                self.expression((value as u16) << 7);
            }
            cc if expr_cc != 0 && cc == expr_cc + 32 => {
                self.expression(((self.expression_msb as u16) << 7) | value as u16);
            }
            _ => {}
        }
    }

    // ---- control-rate tick ----------------------------------------------

    /// Advance every modulator and republish the coefficients the render
    /// path reads. Called every 1 ms.
    pub fn process_control_tick(&mut self) {
        self.env1.tick();
        self.contour.tick();
        self.env2.tick();
        self.lfo.tick(&self.tables);

        let vibrato = self.compute_vibrato_factor();
        if vibrato != self.vibrato_factor {
            self.vibrato_factor = vibrato;
            self.steps_stale = true;
        }
        if self.steps_stale {
            self.update_osc_steps();
            self.steps_stale = false;
        }

        self.update_osc_ampld();
        self.output_ampld = self.compute_output_ampld();
    }

    fn compute_vibrato_factor(&self) -> Fx {
        let depth_cents = match self.config.vibrato_ctrl {
            VibratoMode::Disabled | VibratoMode::EffectSwitch => return Fx::ONE,
            VibratoMode::ByModulation => {
                Fx::from_int(self.patch.lfo_fm_depth_cents as i32).mul(self.modulation)
            }
            VibratoMode::Automatic => {
                Fx::from_int(self.patch.lfo_fm_depth_cents as i32).mul(self.lfo.gate())
            }
        };
        let offset_cents = depth_cents.mul(self.lfo.bipolar());
        base2_exp(offset_cents.div(Fx::from_int(1200)))
    }

    fn update_osc_steps(&mut self) {
        let bend = self.bend_factor.to_f64();
        let vibrato = self.vibrato_factor.to_f64();
        for i in 0..OSC_COUNT {
            let mult = FREQ_MULT[self.patch.osc_freq_mult[i] as usize];
            let freq = self.base_freq_hz * mult * self.detune_factor[i] * bend * vibrato;
            self.oscs[i].set_step(step_for_freq(freq));
        }
    }

    fn update_osc_ampld(&mut self) {
        let expression = self.effective_expression();
        let tremolo = {
            let depth = Fx::from_f64(self.patch.lfo_am_depth_pc as f64 / 100.0).mul(self.lfo.gate());
            Fx::ONE - depth.mul(Fx::ONE - self.lfo.unipolar()).mul(Fx::HALF)
        };

        for i in 0..OSC_COUNT {
            self.osc_ampld[i] = match self.patch.osc_mod_source[i] {
                ModSource::None => Fx::ONE,
                ModSource::ContourPos => self.contour.level(),
                ModSource::ContourNeg => Fx::ONE - self.contour.level(),
                ModSource::Transient => self.env2.level(),
                ModSource::Modulation => self.modulation,
                ModSource::ExpressionPos => expression,
                ModSource::ExpressionNeg => Fx::ONE - expression,
                ModSource::LfoTremolo => tremolo,
                ModSource::VelocityPos => self.velocity,
                ModSource::VelocityNeg => Fx::ONE - self.velocity,
            };
        }
    }

    fn compute_output_ampld(&self) -> Fx {
        // note fully ended: silence regardless of the selected source
        if !self.gate_on && !self.env1.is_active() {
            return Fx::ZERO;
        }
        let source = match self.config.audio_ampld_ctrl {
            AmpldOverride::ByPatch => self.patch.ampld_control,
            AmpldOverride::ConstMax => AmpldControlSource::ConstMax,
            AmpldOverride::Env1Velocity => AmpldControlSource::Env1Velocity,
            AmpldOverride::Expression => AmpldControlSource::Expression,
        };
        match source {
            AmpldControlSource::ConstMax => Fx::ONE,
            AmpldControlSource::ConstLow => Fx::HALF,
            AmpldControlSource::Env1Velocity => self.env1.level().mul(self.velocity),
            AmpldControlSource::Expression => self.effective_expression(),
        }
    }

    /// Expression input disabled in the config reads as full scale, so
    /// expression-controlled patches still sound.
    fn effective_expression(&self) -> Fx {
        if self.config.midi_expression_cc == 0 {
            Fx::FULL_SCALE
        } else {
            self.expression
        }
    }

    // ---- audio-rate render ----------------------------------------------

    /// Render one mono sample in Q12.20. Never allocates or blocks.
    #[inline]
    pub fn render_sample(&mut self) -> Fx {
        let mut inputs = [Fx::ZERO; OSC_COUNT];
        for (input, osc) in inputs.iter_mut().zip(self.oscs.iter_mut()) {
            *input = osc.next_sample(&self.tables.sine);
        }
        for (input, ampld) in inputs.iter_mut().zip(self.osc_ampld.iter()) {
            *input = input.mul(*ampld);
        }

        let raw = self.mixer.mix(&inputs);
        let signal = raw.mul(self.output_ampld).clamp_full_scale();
        let signal = self.reverb.process(signal);
        self.limiter.process(signal)
    }

    /// Render one sample and shift down to the 16-bit device format.
    #[inline]
    pub fn render_sample_i16(&mut self) -> i16 {
        (self.render_sample().0 >> 5) as i16
    }

    // ---- diagnostics ----------------------------------------------------

    pub fn pitch_bend_factor(&self) -> Fx {
        self.bend_factor
    }

    pub fn expression_level(&self) -> Fx {
        self.expression
    }

    pub fn modulation_level(&self) -> Fx {
        self.modulation
    }

    pub fn is_note_on(&self) -> bool {
        self.gate_on
    }

    pub fn is_sounding(&self) -> bool {
        self.env1.is_active()
    }

    pub fn current_note(&self) -> u8 {
        self.note
    }

    pub fn env_phase(&self) -> EnvPhase {
        self.env1.phase()
    }

    pub fn env_level(&self) -> Fx {
        self.env1.level()
    }

    /// Current phase step of one oscillator, for tests and diagnostics.
    pub fn osc_step(&self, index: usize) -> u32 {
        self.oscs[index].step()
    }
}
