// Lookup tables shared by the oscillators and the control chain

use std::f64::consts::TAU;

use super::fixed::Fx;

/// Fixed engine sample rate in Hz.
pub const SAMPLE_RATE_HZ: u32 = 32_000;

/// Control-rate tick period is 1 ms, i.e. this many audio samples.
pub const CONTROL_TICK_SAMPLES: u32 = SAMPLE_RATE_HZ / 1000;

/// Single-cycle wave table length (power of two).
pub const WAVE_TABLE_SIZE: usize = 2048;

/// Number of wave-table oscillators in the bank.
pub const OSC_COUNT: usize = 6;

/// Anti-alias guard: oscillator frequencies are clamped below this.
pub const MAX_OSC_FREQ_HZ: f64 = 0.4 * SAMPLE_RATE_HZ as f64;

/// Steps on the mixer input gain scale (0 mutes, 16 is unity).
pub const MIXER_STEPS: usize = 17;

/// Oscillator frequency-multiplier options, indexed by the patch value 0..=11.
/// Sub-harmonic, near-unison and integer harmonic ratios.
pub const FREQ_MULT: [f64; 12] = [
    0.5,
    1.0,
    4.0 / 3.0,
    1.5,
    2.0,
    3.0,
    4.0,
    5.0,
    6.0,
    7.0,
    8.0,
    9.0,
];

/// Read-only tables built once at engine construction.
pub struct Tables {
    /// Band-limited single-cycle sine, Q12.20, full-scale amplitude.
    pub sine: [Fx; WAVE_TABLE_SIZE],
    /// Equal-tempered note frequencies for MIDI notes 0..=127 (A4 = 440 Hz).
    pub note_freq: [f64; 128],
    /// Log-scaled mixer input gains; entry 0 is zero, entry 16 is unity.
    pub mixer_gain: [Fx; MIXER_STEPS],
}

impl Tables {
    pub fn new() -> Box<Tables> {
        let mut sine = [Fx::ZERO; WAVE_TABLE_SIZE];
        for (i, s) in sine.iter_mut().enumerate() {
            let phase = i as f64 / WAVE_TABLE_SIZE as f64;
            *s = Fx(((phase * TAU).sin() * Fx::FULL_SCALE.0 as f64).round() as i32);
        }

        let mut note_freq = [0.0f64; 128];
        for (n, f) in note_freq.iter_mut().enumerate() {
            *f = 440.0 * ((n as f64 - 69.0) / 12.0).exp2();
        }

        // 3 dB per step below unity
        let mut mixer_gain = [Fx::ZERO; MIXER_STEPS];
        for (step, g) in mixer_gain.iter_mut().enumerate().skip(1) {
            let db = (step as f64 - 16.0) * 3.0;
            *g = Fx::from_f64(10.0f64.powf(db / 20.0)).min(Fx::ONE);
        }
        mixer_gain[16] = Fx::ONE;

        Box::new(Tables {
            sine,
            note_freq,
            mixer_gain,
        })
    }
}
