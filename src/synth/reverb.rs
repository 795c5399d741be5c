// Reverb - single-tap feedback comb with wet/dry mix
//
// A fixed-length delay line with one feedback tap. The ring buffer is owned
// by the render path; the control side only adjusts mix and attenuation.
// Pre-allocated at construction, nothing allocates while rendering.

use super::fixed::Fx;
use super::tables::SAMPLE_RATE_HZ;

/// Hard cap on the delay line length, samples.
pub const REVERB_DELAY_MAX_SIZE: usize = 2000;

/// Loop time of the comb, seconds.
pub const REVERB_LOOP_TIME_SEC: f64 = 0.04;

pub struct ReverbDelay {
    buf: Vec<Fx>,
    head: usize,
    mix: Fx,
    feedback: Fx,
}

impl ReverbDelay {
    pub fn new() -> Self {
        let len = ((REVERB_LOOP_TIME_SEC * SAMPLE_RATE_HZ as f64) as usize)
            .min(REVERB_DELAY_MAX_SIZE)
            .max(1);
        Self {
            buf: vec![Fx::ZERO; len],
            head: 0,
            mix: Fx::ZERO,
            feedback: Fx::ZERO,
        }
    }

    /// Wet/dry mix in percent; zero bypasses the effect entirely.
    pub fn set_mix_pc(&mut self, mix_pc: u16) {
        self.mix = Fx::from_f64(mix_pc.min(100) as f64 / 100.0).min(Fx::ONE);
    }

    /// Feedback attenuation in percent (50..=95).
    pub fn set_atten_pc(&mut self, atten_pc: u16) {
        let pc = atten_pc.clamp(50, 95);
        self.feedback = Fx::from_f64(pc as f64 / 100.0);
    }

    /// Clear the delay line (prepare / preset change).
    pub fn reset(&mut self) {
        self.buf.fill(Fx::ZERO);
        self.head = 0;
    }

    /// Process one sample. With mix at zero the input passes through
    /// untouched, bit for bit.
    #[inline]
    pub fn process(&mut self, x: Fx) -> Fx {
        if self.mix == Fx::ZERO {
            return x;
        }

        let delayed = self.buf[self.head];
        self.buf[self.head] = Fx::saturate(x.0 as i64 + ((delayed.0 as i64 * self.feedback.0 as i64) >> 20));
        self.head += 1;
        if self.head == self.buf.len() {
            self.head = 0;
        }

        let dry = x.mul(Fx::ONE - self.mix);
        let wet = delayed.mul(self.mix);
        Fx::saturate(dry.0 as i64 + wet.0 as i64)
    }

    pub fn delay_len(&self) -> usize {
        self.buf.len()
    }
}

impl Default for ReverbDelay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_length() {
        let r = ReverbDelay::new();
        assert_eq!(r.delay_len(), 1280); // 0.04 s at 32 kHz
        assert!(r.delay_len() <= REVERB_DELAY_MAX_SIZE);
    }

    #[test]
    fn test_zero_mix_is_bit_exact_bypass() {
        let mut r = ReverbDelay::new();
        r.set_mix_pc(0);
        r.set_atten_pc(70);
        for i in -100..100 {
            let x = Fx(i * 4321);
            assert_eq!(r.process(x), x);
        }
    }

    #[test]
    fn test_impulse_returns_after_loop_time() {
        let mut r = ReverbDelay::new();
        r.set_mix_pc(100); // fully wet
        r.set_atten_pc(70);

        let len = r.delay_len();
        let first = r.process(Fx::HALF);
        assert_eq!(first, Fx::ZERO); // nothing in the line yet

        let mut echo_at = None;
        for i in 1..len * 2 {
            let out = r.process(Fx::ZERO);
            if out != Fx::ZERO && echo_at.is_none() {
                echo_at = Some((i, out));
            }
        }
        let (at, level) = echo_at.expect("echo never arrived");
        assert_eq!(at, len);
        assert!((level - Fx::HALF).abs() <= Fx(2));
    }

    #[test]
    fn test_tail_decays_with_attenuation() {
        let mut r = ReverbDelay::new();
        r.set_mix_pc(100);
        r.set_atten_pc(70);

        r.process(Fx::HALF);
        let len = r.delay_len();

        // capture successive round trips of the impulse
        let mut peaks = Vec::new();
        for round in 0..4 {
            let mut peak = Fx::ZERO;
            for _ in 0..len {
                let out = r.process(Fx::ZERO).abs();
                if out > peak {
                    peak = out;
                }
            }
            peaks.push(peak);
            assert!(peak > Fx::ZERO, "tail died too early in round {}", round);
        }
        for w in peaks.windows(2) {
            assert!(w[1] < w[0], "tail must decay every loop");
        }
    }

    #[test]
    fn test_mix_blends_dry_and_wet() {
        let mut r = ReverbDelay::new();
        r.set_mix_pc(50);
        r.set_atten_pc(70);

        // empty line: output is the dry half only
        let out = r.process(Fx::HALF);
        assert!((out - Fx::from_f32(0.25)).abs() <= Fx(4));
    }

    #[test]
    fn test_reset_clears_tail() {
        let mut r = ReverbDelay::new();
        r.set_mix_pc(100);
        r.set_atten_pc(90);
        for _ in 0..5000 {
            r.process(Fx::HALF);
        }
        r.reset();
        for _ in 0..r.delay_len() {
            assert_eq!(r.process(Fx::ZERO), Fx::ZERO);
        }
    }

    #[test]
    fn test_attenuation_clamped() {
        let mut r = ReverbDelay::new();
        r.set_atten_pc(99);
        r.set_mix_pc(100);
        // sustained full-scale input must not blow up with max feedback
        for _ in 0..100_000 {
            let out = r.process(Fx::FULL_SCALE);
            assert!(out.abs() <= Fx::FULL_SCALE);
        }
    }
}
