// Configuration model - performance settings orthogonal to the patch

pub mod store;

use serde::{Deserialize, Serialize};

pub use store::{SettingsStore, StoreError};

/// Global output-amplitude control override. `ByPatch` defers to the patch's
/// own amplitude control source. Persisted as the encoded integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum AmpldOverride {
    #[default]
    ByPatch,
    ConstMax,
    Env1Velocity,
    Expression,
}

impl From<u16> for AmpldOverride {
    fn from(v: u16) -> Self {
        match v {
            1 => AmpldOverride::ConstMax,
            2 => AmpldOverride::Env1Velocity,
            3 => AmpldOverride::Expression,
            _ => AmpldOverride::ByPatch,
        }
    }
}

impl From<AmpldOverride> for u16 {
    fn from(mode: AmpldOverride) -> u16 {
        match mode {
            AmpldOverride::ByPatch => 0,
            AmpldOverride::ConstMax => 1,
            AmpldOverride::Env1Velocity => 2,
            AmpldOverride::Expression => 3,
        }
    }
}

/// Vibrato control mode. `EffectSwitch` is a reserved wire value and behaves
/// as disabled. Persisted as the encoded integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum VibratoMode {
    #[default]
    Disabled,
    EffectSwitch,
    ByModulation,
    Automatic,
}

impl From<u16> for VibratoMode {
    fn from(v: u16) -> Self {
        match v {
            1 => VibratoMode::EffectSwitch,
            2 => VibratoMode::ByModulation,
            3 => VibratoMode::Automatic,
            _ => VibratoMode::Disabled,
        }
    }
}

impl From<VibratoMode> for u16 {
    fn from(mode: VibratoMode) -> u16 {
        match mode {
            VibratoMode::Disabled => 0,
            VibratoMode::EffectSwitch => 1,
            VibratoMode::ByModulation => 2,
            VibratoMode::Automatic => 3,
        }
    }
}

/// Performance configuration, persisted across sessions alongside the user
/// patch. Everything here is independent of the selected preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigParams {
    pub audio_ampld_ctrl: AmpldOverride,
    pub vibrato_ctrl: VibratoMode,
    pub pitch_bend_enable: bool,
    /// Bend range in semitones (1..=12).
    pub pitch_bend_range: u8,
    /// Reverb wet/dry mix in percent (0 bypasses the reverb).
    pub reverb_mix_pc: u16,
    /// Reverb feedback attenuation in percent (50..=95).
    pub reverb_atten_pc: u16,
    /// MIDI receive channel; 0 means omni.
    pub midi_channel: u8,
    /// Expression controller number: 0 disables expression input, otherwise
    /// CC2, CC7 or CC11.
    pub midi_expression_cc: u8,
    /// Mono legato: overlapping note-ons glide instead of re-attacking.
    pub legato_enable: bool,
    /// Master tuning offset in cents (-100..=100).
    pub master_tune_cents: i16,
    /// Preset restored at start-up.
    pub preset_last_selected: u8,
}

impl Default for ConfigParams {
    fn default() -> Self {
        Self {
            audio_ampld_ctrl: AmpldOverride::ByPatch,
            vibrato_ctrl: VibratoMode::Disabled,
            pitch_bend_enable: true,
            pitch_bend_range: 2,
            reverb_mix_pc: 15,
            reverb_atten_pc: 70,
            midi_channel: 0,
            midi_expression_cc: 2,
            legato_enable: false,
            master_tune_cents: 0,
            preset_last_selected: 0,
        }
    }
}

impl ConfigParams {
    /// Clamp every field into its legal range.
    pub fn sanitize(&mut self) {
        self.pitch_bend_range = self.pitch_bend_range.clamp(1, 12);
        self.reverb_mix_pc = self.reverb_mix_pc.min(100);
        self.reverb_atten_pc = self.reverb_atten_pc.clamp(50, 95);
        self.midi_channel = self.midi_channel.min(16);
        if !matches!(self.midi_expression_cc, 0 | 2 | 7 | 11) {
            self.midi_expression_cc = 2;
        }
        self.master_tune_cents = self.master_tune_cents.clamp(-100, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sane() {
        let mut config = ConfigParams::default();
        let before = config.clone();
        config.sanitize();
        assert_eq!(config, before);
    }

    #[test]
    fn test_sanitize_clamps() {
        let mut config = ConfigParams {
            pitch_bend_range: 0,
            reverb_mix_pc: 500,
            reverb_atten_pc: 10,
            midi_channel: 99,
            midi_expression_cc: 42,
            master_tune_cents: -5000,
            ..Default::default()
        };
        config.sanitize();
        assert_eq!(config.pitch_bend_range, 1);
        assert_eq!(config.reverb_mix_pc, 100);
        assert_eq!(config.reverb_atten_pc, 50);
        assert_eq!(config.midi_channel, 16);
        assert_eq!(config.midi_expression_cc, 2);
        assert_eq!(config.master_tune_cents, -100);
    }

    #[test]
    fn test_wire_decoding() {
        assert_eq!(AmpldOverride::from(0u16), AmpldOverride::ByPatch);
        assert_eq!(AmpldOverride::from(3u16), AmpldOverride::Expression);
        assert_eq!(AmpldOverride::from(77u16), AmpldOverride::ByPatch);
        assert_eq!(VibratoMode::from(2u16), VibratoMode::ByModulation);
        assert_eq!(VibratoMode::from(3u16), VibratoMode::Automatic);
        assert_eq!(VibratoMode::from(9u16), VibratoMode::Disabled);
        for v in 0..=3u16 {
            assert_eq!(u16::from(VibratoMode::from(v)), v);
            assert_eq!(u16::from(AmpldOverride::from(v)), v);
        }
    }
}
