// Amplitude envelope - six-phase ADHSR generator
//
// Attack is a linear ramp, decay and release are exponential approaches.
// The generator advances on the 1 ms control tick, not per audio sample;
// the render path reads the latest level.

use super::fixed::Fx;

/// 95% of an exponential segment completes in the configured time, so the
/// per-millisecond factor is `0.05^(1/time_ms)` and `ln(0.05) ~= -3`.
const SEGMENT_LN: f64 = -2.995_732_273_553_991;

/// ENV1 segment times and sustain level, in patch units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvParams {
    /// Attack ramp time in ms.
    pub attack_ms: u16,
    /// Peak hold time in ms; zero skips the decay segment entirely.
    pub hold_ms: u16,
    /// Decay time in ms.
    pub decay_ms: u16,
    /// Sustain level in percent of full scale.
    pub sustain_pc: u16,
    /// Release time in ms.
    pub release_ms: u16,
}

impl EnvParams {
    pub fn new(attack_ms: u16, hold_ms: u16, decay_ms: u16, sustain_pc: u16, release_ms: u16) -> Self {
        Self {
            attack_ms: attack_ms.max(1),
            hold_ms,
            decay_ms: decay_ms.max(1),
            sustain_pc: sustain_pc.min(100),
            release_ms: release_ms.max(1),
        }
    }
}

impl Default for EnvParams {
    fn default() -> Self {
        Self::new(10, 50, 400, 70, 200)
    }
}

/// Envelope phase, in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvPhase {
    Idle,
    Attack,
    PeakHold,
    Decay,
    Sustain,
    Release,
}

pub struct EnvelopeGen {
    params: EnvParams,
    phase: EnvPhase,
    level: Fx,
    sustain: Fx,
    attack_step: Fx,
    hold_ms_left: u16,
    decay_factor: Fx,
    release_factor: Fx,
}

impl EnvelopeGen {
    pub fn new(params: EnvParams) -> Self {
        let mut env = Self {
            params,
            phase: EnvPhase::Idle,
            level: Fx::ZERO,
            sustain: Fx::ZERO,
            attack_step: Fx::ZERO,
            hold_ms_left: 0,
            decay_factor: Fx::ZERO,
            release_factor: Fx::ZERO,
        };
        env.set_params(params);
        env
    }

    /// Install new segment parameters; does not disturb the running phase.
    pub fn set_params(&mut self, params: EnvParams) {
        self.params = params;
        self.sustain = Fx::from_f64(params.sustain_pc as f64 / 100.0).min(Fx::FULL_SCALE);
        self.decay_factor = Fx::from_f64((SEGMENT_LN / params.decay_ms as f64).exp());
        self.release_factor = Fx::from_f64((SEGMENT_LN / params.release_ms as f64).exp());
    }

    pub fn params(&self) -> EnvParams {
        self.params
    }

    /// Start the attack ramp from the current level (retrigger keeps whatever
    /// level a still-sounding note left behind).
    pub fn trigger(&mut self) {
        let remaining = Fx::FULL_SCALE - self.level;
        self.attack_step = Fx(remaining.0 / self.params.attack_ms as i32).max(Fx::MIN_LEVEL);
        self.hold_ms_left = self.params.hold_ms;
        self.phase = EnvPhase::Attack;
    }

    /// Enter the release segment, from any active phase.
    pub fn release(&mut self) {
        if self.phase != EnvPhase::Idle {
            self.phase = EnvPhase::Release;
        }
    }

    /// Force idle immediately (all-sound-off).
    pub fn kill(&mut self) {
        self.phase = EnvPhase::Idle;
        self.level = Fx::ZERO;
    }

    /// Advance one control tick (1 ms) and return the new level.
    pub fn tick(&mut self) -> Fx {
        match self.phase {
            EnvPhase::Idle => {}
            EnvPhase::Attack => {
                self.level += self.attack_step;
                if self.level >= Fx::FULL_SCALE {
                    self.level = Fx::FULL_SCALE;
                    self.phase = EnvPhase::PeakHold;
                }
            }
            EnvPhase::PeakHold => {
                // hold_ms == 0 pins the envelope at full scale until release
                if self.params.hold_ms != 0 {
                    self.hold_ms_left = self.hold_ms_left.saturating_sub(1);
                    if self.hold_ms_left == 0 {
                        self.phase = EnvPhase::Decay;
                    }
                }
            }
            EnvPhase::Decay => {
                let diff = self.level - self.sustain;
                self.level = self.sustain + diff.mul(self.decay_factor);
                if (self.level - self.sustain).abs() <= Fx::MIN_LEVEL {
                    self.level = self.sustain;
                    self.phase = EnvPhase::Sustain;
                }
            }
            EnvPhase::Sustain => {
                self.level = self.sustain;
            }
            EnvPhase::Release => {
                self.level = self.level.mul(self.release_factor);
                if self.level <= Fx::MIN_LEVEL {
                    self.level = Fx::ZERO;
                    self.phase = EnvPhase::Idle;
                }
            }
        }
        self.level
    }

    pub fn level(&self) -> Fx {
        self.level
    }

    pub fn phase(&self) -> EnvPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != EnvPhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ms(env: &mut EnvelopeGen, ms: u32) {
        for _ in 0..ms {
            env.tick();
        }
    }

    #[test]
    fn test_starts_idle() {
        let env = EnvelopeGen::new(EnvParams::default());
        assert_eq!(env.phase(), EnvPhase::Idle);
        assert_eq!(env.level(), Fx::ZERO);
        assert!(!env.is_active());
    }

    #[test]
    fn test_attack_reaches_full_scale_in_time() {
        let mut env = EnvelopeGen::new(EnvParams::new(50, 10, 100, 70, 100));
        env.trigger();
        run_ms(&mut env, 49);
        assert_eq!(env.phase(), EnvPhase::Attack);
        run_ms(&mut env, 2);
        assert_eq!(env.phase(), EnvPhase::PeakHold);
        assert_eq!(env.level(), Fx::FULL_SCALE);
    }

    #[test]
    fn test_hold_then_decay_to_sustain() {
        let mut env = EnvelopeGen::new(EnvParams::new(1, 20, 50, 50, 100));
        env.trigger();
        run_ms(&mut env, 2);
        assert_eq!(env.phase(), EnvPhase::PeakHold);
        run_ms(&mut env, 20);
        assert_eq!(env.phase(), EnvPhase::Decay);
        // 95% of the decay completes in decay_ms; give it the full tail
        run_ms(&mut env, 500);
        assert_eq!(env.phase(), EnvPhase::Sustain);
        let sustain = Fx::from_f32(0.5);
        assert!((env.level() - sustain).abs() < Fx::from_f32(0.01));
    }

    #[test]
    fn test_zero_hold_skips_decay() {
        let mut env = EnvelopeGen::new(EnvParams::new(1, 0, 50, 50, 100));
        env.trigger();
        run_ms(&mut env, 2);
        assert_eq!(env.phase(), EnvPhase::PeakHold);
        // stays pinned at full scale indefinitely
        run_ms(&mut env, 2_000);
        assert_eq!(env.phase(), EnvPhase::PeakHold);
        assert_eq!(env.level(), Fx::FULL_SCALE);
        env.release();
        run_ms(&mut env, 1);
        assert!(env.level() < Fx::FULL_SCALE);
    }

    #[test]
    fn test_release_is_monotonic_and_reaches_idle() {
        let mut env = EnvelopeGen::new(EnvParams::new(1, 1, 10, 80, 100));
        env.trigger();
        run_ms(&mut env, 200);
        env.release();
        assert_eq!(env.phase(), EnvPhase::Release);

        let mut prev = env.level();
        for _ in 0..1_000 {
            let level = env.tick();
            assert!(level <= prev, "release must never rise");
            prev = level;
        }
        assert_eq!(env.phase(), EnvPhase::Idle);
        assert_eq!(env.level(), Fx::ZERO);
    }

    #[test]
    fn test_release_during_attack() {
        let mut env = EnvelopeGen::new(EnvParams::new(100, 10, 100, 70, 50));
        env.trigger();
        run_ms(&mut env, 10);
        env.release();
        assert_eq!(env.phase(), EnvPhase::Release);
        run_ms(&mut env, 1_000);
        assert!(!env.is_active());
    }

    #[test]
    fn test_retrigger_ramps_from_current_level() {
        let mut env = EnvelopeGen::new(EnvParams::new(10, 0, 10, 50, 400));
        env.trigger();
        run_ms(&mut env, 50);
        env.release();
        run_ms(&mut env, 20);
        let mid = env.level();
        assert!(mid > Fx::ZERO);

        env.trigger();
        let after_one = env.tick();
        assert!(after_one >= mid, "attack restarts from the current level");
    }

    #[test]
    fn test_kill_goes_straight_to_idle() {
        let mut env = EnvelopeGen::new(EnvParams::default());
        env.trigger();
        run_ms(&mut env, 100);
        env.kill();
        assert_eq!(env.phase(), EnvPhase::Idle);
        assert_eq!(env.level(), Fx::ZERO);
    }
}
