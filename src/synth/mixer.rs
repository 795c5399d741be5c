// Six-input mixer - quantized input gains plus a shared output gain

use super::fixed::Fx;
use super::tables::{MIXER_STEPS, OSC_COUNT, Tables};

/// Sums the oscillator bank through per-input gains taken from the
/// log-scaled 17-entry table, then applies the output gain.
///
/// The internal sum is 64-bit and may exceed full scale; saturation happens
/// once, on the way out. The limiter downstream owns the final ceiling.
pub struct Mixer {
    input_gain: [Fx; OSC_COUNT],
    out_gain: Fx,
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            input_gain: [Fx::ZERO; OSC_COUNT],
            out_gain: Fx::ONE,
        }
    }

    /// Resolve patch mixer steps (0..=16) and output gain (tenths) into gains.
    pub fn configure(&mut self, steps: &[u16; OSC_COUNT], out_gain_x10: u16, tables: &Tables) {
        for (gain, &step) in self.input_gain.iter_mut().zip(steps.iter()) {
            let step = (step as usize).min(MIXER_STEPS - 1);
            *gain = tables.mixer_gain[step];
        }
        self.out_gain = Fx::from_f64(out_gain_x10.min(100) as f64 / 10.0);
    }

    pub fn input_gain(&self, index: usize) -> Fx {
        self.input_gain[index]
    }

    /// Mix one sample from the six gained inputs.
    #[inline]
    pub fn mix(&self, inputs: &[Fx; OSC_COUNT]) -> Fx {
        let mut sum: i64 = 0;
        for (input, gain) in inputs.iter().zip(self.input_gain.iter()) {
            sum += (input.0 as i64 * gain.0 as i64) >> 20;
        }
        Fx::saturate((sum * self.out_gain.0 as i64) >> 20)
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_inputs_stay_silent() {
        let tables = Tables::new();
        let mut mixer = Mixer::new();
        mixer.configure(&[0; OSC_COUNT], 10, &tables);
        let inputs = [Fx::FULL_SCALE; OSC_COUNT];
        assert_eq!(mixer.mix(&inputs), Fx::ZERO);
    }

    #[test]
    fn test_unity_single_input() {
        let tables = Tables::new();
        let mut mixer = Mixer::new();
        mixer.configure(&[16, 0, 0, 0, 0, 0], 10, &tables);
        let mut inputs = [Fx::ZERO; OSC_COUNT];
        inputs[0] = Fx::HALF;
        let out = mixer.mix(&inputs);
        assert!((out - Fx::HALF).abs() <= Fx(2));
    }

    #[test]
    fn test_sum_saturates_at_full_scale() {
        let tables = Tables::new();
        let mut mixer = Mixer::new();
        // six unity inputs at full scale, output gain 1.0: far over full scale
        mixer.configure(&[16; OSC_COUNT], 10, &tables);
        let inputs = [Fx::FULL_SCALE; OSC_COUNT];
        assert_eq!(mixer.mix(&inputs), Fx::FULL_SCALE);
        let inputs = [-Fx::FULL_SCALE; OSC_COUNT];
        assert_eq!(mixer.mix(&inputs), -Fx::FULL_SCALE);
    }

    #[test]
    fn test_output_gain_scales() {
        let tables = Tables::new();
        let mut mixer = Mixer::new();
        mixer.configure(&[16, 0, 0, 0, 0, 0], 5, &tables); // gain 0.5
        let mut inputs = [Fx::ZERO; OSC_COUNT];
        inputs[0] = Fx::HALF;
        let out = mixer.mix(&inputs);
        assert!((out - Fx::from_f32(0.25)).abs() <= Fx(4));
    }

    #[test]
    fn test_step_out_of_range_clamps_to_unity() {
        let tables = Tables::new();
        let mut mixer = Mixer::new();
        mixer.configure(&[99, 0, 0, 0, 0, 0], 10, &tables);
        assert_eq!(mixer.input_gain(0), Fx::ONE);
    }
}
