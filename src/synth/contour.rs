// Contour and transient generators
//
// The contour generator is a Delay-Ramp-Hold control envelope; the transient
// generator (ENV2) is a one-shot exponential decay. Both feed per-oscillator
// amplitude modulation and re-trigger on every note-on, legato included.

use super::fixed::Fx;

const SEGMENT_LN: f64 = -2.995_732_273_553_991;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourParams {
    /// Level at note-on, percent of full scale.
    pub start_pc: u16,
    /// Delay before the ramp starts, ms.
    pub delay_ms: u16,
    /// Linear ramp time, ms.
    pub ramp_ms: u16,
    /// Level held after the ramp, percent of full scale.
    pub hold_pc: u16,
}

impl ContourParams {
    pub fn new(start_pc: u16, delay_ms: u16, ramp_ms: u16, hold_pc: u16) -> Self {
        Self {
            start_pc: start_pc.min(100),
            delay_ms,
            ramp_ms: ramp_ms.max(1),
            hold_pc: hold_pc.min(100),
        }
    }
}

impl Default for ContourParams {
    fn default() -> Self {
        Self::new(0, 100, 300, 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourPhase {
    Idle,
    Delay,
    Ramp,
    Hold,
}

pub struct ContourGen {
    params: ContourParams,
    phase: ContourPhase,
    level: Fx,
    start: Fx,
    hold: Fx,
    delay_ms_left: u16,
    ramp_ms_left: u16,
    ramp_step: Fx,
}

impl ContourGen {
    pub fn new(params: ContourParams) -> Self {
        let mut r#gen = Self {
            params,
            phase: ContourPhase::Idle,
            level: Fx::ZERO,
            start: Fx::ZERO,
            hold: Fx::ZERO,
            delay_ms_left: 0,
            ramp_ms_left: 0,
            ramp_step: Fx::ZERO,
        };
        r#gen.set_params(params);
        r#gen
    }

    pub fn set_params(&mut self, params: ContourParams) {
        self.params = params;
        self.start = Fx::from_f64(params.start_pc as f64 / 100.0).min(Fx::FULL_SCALE);
        self.hold = Fx::from_f64(params.hold_pc as f64 / 100.0).min(Fx::FULL_SCALE);
    }

    /// Restart from the start level; called on every note-on.
    pub fn trigger(&mut self) {
        self.level = self.start;
        self.delay_ms_left = self.params.delay_ms;
        self.ramp_ms_left = self.params.ramp_ms;
        self.ramp_step = Fx((self.hold.0 - self.start.0) / self.params.ramp_ms as i32);
        self.phase = if self.params.delay_ms == 0 {
            ContourPhase::Ramp
        } else {
            ContourPhase::Delay
        };
    }

    pub fn kill(&mut self) {
        self.phase = ContourPhase::Idle;
        self.level = Fx::ZERO;
    }

    /// Advance one control tick (1 ms) and return the new level.
    pub fn tick(&mut self) -> Fx {
        match self.phase {
            ContourPhase::Idle | ContourPhase::Hold => {}
            ContourPhase::Delay => {
                self.delay_ms_left -= 1;
                if self.delay_ms_left == 0 {
                    self.phase = ContourPhase::Ramp;
                }
            }
            ContourPhase::Ramp => {
                self.level += self.ramp_step;
                self.ramp_ms_left -= 1;
                if self.ramp_ms_left == 0 {
                    self.level = self.hold;
                    self.phase = ContourPhase::Hold;
                }
            }
        }
        self.level
    }

    pub fn level(&self) -> Fx {
        self.level
    }

    pub fn phase(&self) -> ContourPhase {
        self.phase
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientParams {
    /// Decay time, ms.
    pub decay_ms: u16,
    /// Level the decay settles toward, percent of full scale.
    pub sustain_pc: u16,
}

impl TransientParams {
    pub fn new(decay_ms: u16, sustain_pc: u16) -> Self {
        Self {
            decay_ms: decay_ms.max(1),
            sustain_pc: sustain_pc.min(100),
        }
    }
}

impl Default for TransientParams {
    fn default() -> Self {
        Self::new(300, 0)
    }
}

/// ENV2: starts at full scale on note-on and decays toward its sustain
/// level. Note-off is ignored; only the next note-on resets it.
pub struct TransientGen {
    params: TransientParams,
    level: Fx,
    sustain: Fx,
    decay_factor: Fx,
}

impl TransientGen {
    pub fn new(params: TransientParams) -> Self {
        let mut r#gen = Self {
            params,
            level: Fx::ZERO,
            sustain: Fx::ZERO,
            decay_factor: Fx::ZERO,
        };
        r#gen.set_params(params);
        r#gen
    }

    pub fn set_params(&mut self, params: TransientParams) {
        self.params = params;
        self.sustain = Fx::from_f64(params.sustain_pc as f64 / 100.0).min(Fx::FULL_SCALE);
        self.decay_factor = Fx::from_f64((SEGMENT_LN / params.decay_ms as f64).exp());
    }

    pub fn trigger(&mut self) {
        self.level = Fx::FULL_SCALE;
    }

    pub fn kill(&mut self) {
        self.level = Fx::ZERO;
    }

    /// Advance one control tick (1 ms) and return the new level.
    pub fn tick(&mut self) -> Fx {
        let diff = self.level - self.sustain;
        if diff > Fx::ZERO {
            self.level = self.sustain + diff.mul(self.decay_factor);
        }
        self.level
    }

    pub fn level(&self) -> Fx {
        self.level
    }
}
