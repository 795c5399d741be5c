// Patch model - timbre parameters and the preset bank
//
// A patch is the full set of voice parameters; presets are read-only patches
// selectable by index (MIDI program change). Wire values match the encoded
// integers carried in stored patch data.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::tables::OSC_COUNT;

/// Per-oscillator amplitude modulation source. Persisted as the encoded
/// integer carried in stored patch data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum ModSource {
    /// Fixed 100% amplitude.
    #[default]
    None,
    /// Contour generator level.
    ContourPos,
    /// Inverted contour: `1 - level`.
    ContourNeg,
    /// ENV2 transient level.
    Transient,
    /// MIDI modulation (CC1).
    Modulation,
    /// MIDI expression.
    ExpressionPos,
    /// Inverted expression: `1 - level`.
    ExpressionNeg,
    /// LFO tremolo (uses the patch AM depth).
    LfoTremolo,
    /// Key velocity.
    VelocityPos,
    /// Inverted velocity: `1 - velocity`.
    VelocityNeg,
}

impl From<u16> for ModSource {
    /// Decode the stored integer; unknown values fall back to `None`.
    fn from(v: u16) -> Self {
        match v {
            1 => ModSource::ContourPos,
            2 => ModSource::ContourNeg,
            3 => ModSource::Transient,
            4 => ModSource::Modulation,
            5 => ModSource::ExpressionPos,
            6 => ModSource::ExpressionNeg,
            7 => ModSource::LfoTremolo,
            8 => ModSource::VelocityPos,
            9 => ModSource::VelocityNeg,
            _ => ModSource::None,
        }
    }
}

impl From<ModSource> for u16 {
    fn from(source: ModSource) -> u16 {
        match source {
            ModSource::None => 0,
            ModSource::ContourPos => 1,
            ModSource::ContourNeg => 2,
            ModSource::Transient => 3,
            ModSource::Modulation => 4,
            ModSource::ExpressionPos => 5,
            ModSource::ExpressionNeg => 6,
            ModSource::LfoTremolo => 7,
            ModSource::VelocityPos => 8,
            ModSource::VelocityNeg => 9,
        }
    }
}

/// Output amplitude control source selected by the patch (the config may
/// override it globally). Persisted as the encoded integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum AmpldControlSource {
    /// Constant full level.
    ConstMax,
    /// Constant half level.
    ConstLow,
    /// ENV1 level scaled by key velocity.
    #[default]
    Env1Velocity,
    /// MIDI expression level.
    Expression,
}

impl From<u16> for AmpldControlSource {
    fn from(v: u16) -> Self {
        match v {
            0 => AmpldControlSource::ConstMax,
            1 => AmpldControlSource::ConstLow,
            3 => AmpldControlSource::Expression,
            _ => AmpldControlSource::Env1Velocity,
        }
    }
}

impl From<AmpldControlSource> for u16 {
    fn from(source: AmpldControlSource) -> u16 {
        match source {
            AmpldControlSource::ConstMax => 0,
            AmpldControlSource::ConstLow => 1,
            AmpldControlSource::Env1Velocity => 2,
            AmpldControlSource::Expression => 3,
        }
    }
}

/// The full parameter set of one voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchParams {
    pub name: String,

    /// Frequency-multiplier table index per oscillator (0..=11).
    pub osc_freq_mult: [u16; OSC_COUNT],
    /// Amplitude modulation routing per oscillator.
    pub osc_mod_source: [ModSource; OSC_COUNT],
    /// Detune per oscillator in cents (-600..=600).
    pub osc_detune: [i16; OSC_COUNT],
    /// Mixer input step per oscillator (0..=16, log scale).
    pub mixer_step: [u16; OSC_COUNT],

    pub env_attack_ms: u16,
    pub env_hold_ms: u16,
    pub env_decay_ms: u16,
    pub env_sustain_pc: u16,
    pub env_release_ms: u16,

    pub contour_start_pc: u16,
    pub contour_delay_ms: u16,
    pub contour_ramp_ms: u16,
    pub contour_hold_pc: u16,

    pub env2_decay_ms: u16,
    pub env2_sustain_pc: u16,

    /// LFO frequency in tenths of a Hz (5..=250).
    pub lfo_freq_x10: u16,
    pub lfo_ramp_ms: u16,
    pub lfo_fm_depth_cents: u16,
    pub lfo_am_depth_pc: u16,

    /// Mixer output gain in tenths (0..=100).
    pub mixer_out_gain_x10: u16,
    pub ampld_control: AmpldControlSource,
    /// Limiter ceiling in percent; zero keeps only the hard ceiling.
    pub limiter_level_pc: u16,
}

impl PatchParams {
    /// Clamp every field into its legal range.
    pub fn sanitize(&mut self) {
        for m in self.osc_freq_mult.iter_mut() {
            *m = (*m).min(11);
        }
        for d in self.osc_detune.iter_mut() {
            *d = (*d).clamp(-600, 600);
        }
        for s in self.mixer_step.iter_mut() {
            *s = (*s).min(16);
        }
        self.env_attack_ms = self.env_attack_ms.max(1);
        self.env_decay_ms = self.env_decay_ms.max(1);
        self.env_sustain_pc = self.env_sustain_pc.min(100);
        self.env_release_ms = self.env_release_ms.max(1);
        self.contour_start_pc = self.contour_start_pc.min(100);
        self.contour_ramp_ms = self.contour_ramp_ms.max(1);
        self.contour_hold_pc = self.contour_hold_pc.min(100);
        self.env2_decay_ms = self.env2_decay_ms.max(1);
        self.env2_sustain_pc = self.env2_sustain_pc.min(100);
        self.lfo_freq_x10 = self.lfo_freq_x10.clamp(5, 250);
        self.lfo_fm_depth_cents = self.lfo_fm_depth_cents.min(600);
        self.lfo_am_depth_pc = self.lfo_am_depth_pc.min(100);
        self.mixer_out_gain_x10 = self.mixer_out_gain_x10.min(100);
        self.limiter_level_pc = self.limiter_level_pc.min(100);
    }
}

impl Default for PatchParams {
    fn default() -> Self {
        preset_patches()[0].clone()
    }
}

/// The read-only preset bank. Indexed by MIDI program number; out-of-range
/// selections are a no-op at the engine level.
pub fn preset_patches() -> &'static [PatchParams] {
    static PRESETS: OnceLock<Vec<PatchParams>> = OnceLock::new();
    PRESETS.get_or_init(build_presets)
}

fn build_presets() -> Vec<PatchParams> {
    let base = PatchParams {
        name: String::new(),
        osc_freq_mult: [1, 1, 1, 1, 1, 1],
        osc_mod_source: [ModSource::None; OSC_COUNT],
        osc_detune: [0; OSC_COUNT],
        mixer_step: [16, 0, 0, 0, 0, 0],
        env_attack_ms: 10,
        env_hold_ms: 0,
        env_decay_ms: 400,
        env_sustain_pc: 80,
        env_release_ms: 200,
        contour_start_pc: 0,
        contour_delay_ms: 0,
        contour_ramp_ms: 300,
        contour_hold_pc: 100,
        env2_decay_ms: 300,
        env2_sustain_pc: 0,
        lfo_freq_x10: 50,
        lfo_ramp_ms: 500,
        lfo_fm_depth_cents: 30,
        lfo_am_depth_pc: 0,
        mixer_out_gain_x10: 10,
        ampld_control: AmpldControlSource::Env1Velocity,
        limiter_level_pc: 0,
    };

    vec![
        PatchParams {
            name: "Pipe Organ".into(),
            osc_freq_mult: [0, 1, 4, 5, 6, 8],
            mixer_step: [12, 16, 13, 11, 9, 8],
            env_attack_ms: 30,
            env_sustain_pc: 100,
            env_release_ms: 300,
            ampld_control: AmpldControlSource::ConstMax,
            ..base.clone()
        },
        PatchParams {
            name: "Recorder".into(),
            osc_freq_mult: [1, 1, 1, 1, 1, 1],
            mixer_step: [16, 0, 0, 0, 0, 0],
            env_attack_ms: 30,
            env_hold_ms: 0,
            env_sustain_pc: 100,
            env_release_ms: 200,
            lfo_freq_x10: 55,
            lfo_ramp_ms: 600,
            lfo_fm_depth_cents: 30,
            ampld_control: AmpldControlSource::Expression,
            ..base.clone()
        },
        PatchParams {
            name: "Reed Organ".into(),
            osc_freq_mult: [0, 1, 3, 4, 6, 7],
            mixer_step: [11, 16, 12, 12, 8, 7],
            osc_detune: [0, 0, 4, -4, 0, 0],
            env_attack_ms: 60,
            env_sustain_pc: 100,
            env_release_ms: 250,
            ampld_control: AmpldControlSource::Expression,
            ..base.clone()
        },
        PatchParams {
            name: "Electric Piano".into(),
            osc_freq_mult: [1, 4, 7, 9, 1, 1],
            osc_mod_source: [
                ModSource::None,
                ModSource::Transient,
                ModSource::Transient,
                ModSource::VelocityPos,
                ModSource::None,
                ModSource::None,
            ],
            osc_detune: [0, 0, 3, 0, -3, 0],
            mixer_step: [16, 12, 10, 8, 9, 0],
            env_attack_ms: 5,
            env_hold_ms: 20,
            env_decay_ms: 2500,
            env_sustain_pc: 10,
            env_release_ms: 300,
            env2_decay_ms: 600,
            env2_sustain_pc: 10,
            ..base.clone()
        },
        PatchParams {
            name: "Vibraphone".into(),
            osc_freq_mult: [1, 6, 10, 1, 1, 1],
            osc_mod_source: [
                ModSource::None,
                ModSource::Transient,
                ModSource::Transient,
                ModSource::LfoTremolo,
                ModSource::None,
                ModSource::None,
            ],
            mixer_step: [16, 11, 8, 13, 0, 0],
            env_attack_ms: 3,
            env_hold_ms: 10,
            env_decay_ms: 3000,
            env_sustain_pc: 0,
            env_release_ms: 500,
            env2_decay_ms: 900,
            lfo_freq_x10: 45,
            lfo_am_depth_pc: 60,
            ..base.clone()
        },
        PatchParams {
            name: "Glass Harp".into(),
            osc_freq_mult: [1, 4, 6, 9, 1, 1],
            osc_mod_source: [
                ModSource::None,
                ModSource::ContourPos,
                ModSource::ContourPos,
                ModSource::ContourNeg,
                ModSource::None,
                ModSource::None,
            ],
            osc_detune: [0, 2, -2, 0, 0, 0],
            mixer_step: [16, 12, 11, 9, 0, 0],
            env_attack_ms: 150,
            env_sustain_pc: 90,
            env_release_ms: 600,
            contour_start_pc: 0,
            contour_delay_ms: 200,
            contour_ramp_ms: 900,
            contour_hold_pc: 100,
            ..base.clone()
        },
        PatchParams {
            name: "Brass Synth".into(),
            osc_freq_mult: [1, 3, 4, 5, 1, 0],
            osc_mod_source: [
                ModSource::None,
                ModSource::ContourPos,
                ModSource::ContourPos,
                ModSource::ContourPos,
                ModSource::None,
                ModSource::None,
            ],
            osc_detune: [0, 0, 0, 0, 6, -6],
            mixer_step: [16, 13, 12, 10, 11, 9],
            env_attack_ms: 40,
            env_hold_ms: 30,
            env_decay_ms: 600,
            env_sustain_pc: 75,
            env_release_ms: 250,
            contour_start_pc: 20,
            contour_delay_ms: 30,
            contour_ramp_ms: 250,
            contour_hold_pc: 100,
            ..base.clone()
        },
        PatchParams {
            name: "Bell Tower".into(),
            osc_freq_mult: [1, 2, 5, 8, 11, 3],
            osc_mod_source: [
                ModSource::None,
                ModSource::Transient,
                ModSource::Transient,
                ModSource::Transient,
                ModSource::Transient,
                ModSource::None,
            ],
            osc_detune: [0, 35, -35, 20, -20, 0],
            mixer_step: [16, 13, 12, 10, 9, 7],
            env_attack_ms: 2,
            env_hold_ms: 10,
            env_decay_ms: 4000,
            env_sustain_pc: 0,
            env_release_ms: 800,
            env2_decay_ms: 1500,
            ..base.clone()
        },
        PatchParams {
            name: "Breathy Flute".into(),
            osc_freq_mult: [1, 4, 1, 1, 1, 1],
            osc_mod_source: [
                ModSource::None,
                ModSource::ExpressionPos,
                ModSource::None,
                ModSource::None,
                ModSource::None,
                ModSource::None,
            ],
            mixer_step: [16, 9, 0, 0, 0, 0],
            env_attack_ms: 50,
            env_sustain_pc: 100,
            env_release_ms: 150,
            lfo_freq_x10: 50,
            lfo_ramp_ms: 800,
            lfo_fm_depth_cents: 25,
            ampld_control: AmpldControlSource::Expression,
            ..base.clone()
        },
        PatchParams {
            name: "Sub Bass".into(),
            osc_freq_mult: [0, 1, 4, 1, 1, 1],
            osc_detune: [0, 0, 0, 7, -7, 0],
            mixer_step: [16, 14, 8, 10, 10, 0],
            env_attack_ms: 8,
            env_hold_ms: 0,
            env_sustain_pc: 90,
            env_release_ms: 120,
            ..base
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_bank_is_populated() {
        let presets = preset_patches();
        assert!(presets.len() >= 8);
        for p in presets {
            assert!(!p.name.is_empty());
        }
    }

    #[test]
    fn test_presets_are_already_sane() {
        for preset in preset_patches() {
            let mut sanitized = preset.clone();
            sanitized.sanitize();
            assert_eq!(&sanitized, preset, "preset {} out of range", preset.name);
        }
    }

    #[test]
    fn test_mod_source_wire_round_trip() {
        for v in 0..=9u16 {
            assert_eq!(u16::from(ModSource::from(v)), v);
        }
        // unknown values decode to None
        assert_eq!(ModSource::from(10u16), ModSource::None);
        assert_eq!(ModSource::from(u16::MAX), ModSource::None);
    }

    #[test]
    fn test_ampld_control_wire_round_trip() {
        for v in 0..=3u16 {
            assert_eq!(u16::from(AmpldControlSource::from(v)), v);
        }
        assert_eq!(
            AmpldControlSource::from(99u16),
            AmpldControlSource::Env1Velocity
        );
    }

    #[test]
    fn test_sanitize_clamps_everything() {
        let mut p = PatchParams {
            osc_freq_mult: [99; OSC_COUNT],
            osc_detune: [i16::MIN; OSC_COUNT],
            mixer_step: [77; OSC_COUNT],
            env_attack_ms: 0,
            env_sustain_pc: 999,
            lfo_freq_x10: 0,
            lfo_fm_depth_cents: 9999,
            mixer_out_gain_x10: 200,
            ..PatchParams::default()
        };
        p.sanitize();
        assert!(p.osc_freq_mult.iter().all(|&m| m <= 11));
        assert!(p.osc_detune.iter().all(|&d| (-600..=600).contains(&d)));
        assert!(p.mixer_step.iter().all(|&s| s <= 16));
        assert_eq!(p.env_attack_ms, 1);
        assert_eq!(p.env_sustain_pc, 100);
        assert_eq!(p.lfo_freq_x10, 5);
        assert_eq!(p.lfo_fm_depth_cents, 600);
        assert_eq!(p.mixer_out_gain_x10, 100);
    }

    #[test]
    fn test_default_patch_is_first_preset() {
        assert_eq!(PatchParams::default(), preset_patches()[0]);
    }
}
