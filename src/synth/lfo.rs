// Low-frequency oscillator with a delay/ramp depth gate
//
// The LFO advances on the control tick (1 kHz) and reads the same sine table
// as the audio oscillators. Its gate stays closed for the first half of the
// ramp time, then opens linearly over the second half; vibrato and tremolo
// depths are both multiplied by the gate.

use super::fixed::Fx;
use super::oscillator::WaveOscillator;
use super::tables::Tables;

/// Control-rate ticks per second; the LFO phase accumulator advances at
/// this rate rather than the audio rate.
const CONTROL_RATE_HZ: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LfoParams {
    /// Frequency in tenths of a Hz (5..=250, i.e. 0.5 Hz to 25 Hz).
    pub freq_x10: u16,
    /// Gate delay+ramp time in ms.
    pub ramp_ms: u16,
    /// Vibrato depth in cents (0..=600).
    pub fm_depth_cents: u16,
    /// Tremolo depth in percent (0..=100).
    pub am_depth_pc: u16,
}

impl LfoParams {
    pub fn new(freq_x10: u16, ramp_ms: u16, fm_depth_cents: u16, am_depth_pc: u16) -> Self {
        Self {
            freq_x10: freq_x10.clamp(5, 250),
            ramp_ms,
            fm_depth_cents: fm_depth_cents.min(600),
            am_depth_pc: am_depth_pc.min(100),
        }
    }
}

impl Default for LfoParams {
    fn default() -> Self {
        Self::new(50, 500, 0, 0)
    }
}

pub struct Lfo {
    params: LfoParams,
    osc: WaveOscillator,
    gate_elapsed_ms: u32,
    bipolar: Fx,
}

impl Lfo {
    pub fn new(params: LfoParams) -> Self {
        let mut lfo = Self {
            params,
            osc: WaveOscillator::new(),
            gate_elapsed_ms: u32::MAX,
            bipolar: Fx::ZERO,
        };
        lfo.set_params(params);
        lfo
    }

    pub fn set_params(&mut self, params: LfoParams) {
        self.params = params;
        let freq_hz = params.freq_x10 as f64 / 10.0;
        let step = (freq_hz * (1u64 << 32) as f64 / CONTROL_RATE_HZ).round() as u32;
        self.osc.set_step(step);
    }

    pub fn params(&self) -> LfoParams {
        self.params
    }

    /// Re-arm the delay/ramp gate; called on note-on. The oscillator phase
    /// free-runs across notes.
    pub fn arm_gate(&mut self) {
        self.gate_elapsed_ms = 0;
    }

    pub fn reset(&mut self) {
        self.osc.reset();
        self.gate_elapsed_ms = u32::MAX;
        self.bipolar = Fx::ZERO;
    }

    /// Advance one control tick (1 ms).
    pub fn tick(&mut self, tables: &Tables) {
        self.bipolar = self.osc.next_sample(&tables.sine);
        self.gate_elapsed_ms = self.gate_elapsed_ms.saturating_add(1);
    }

    /// Raw oscillator output in `[-1, +1]`.
    pub fn bipolar(&self) -> Fx {
        self.bipolar
    }

    /// Output mapped to `[0, 1]` as `(sin + 1) / 2`; used by tremolo.
    pub fn unipolar(&self) -> Fx {
        Fx((self.bipolar.0 + Fx::ONE.0) / 2)
    }

    /// Gate level in `[0, 1]`: zero through the first half of the ramp time,
    /// then a linear ramp to one over the second half.
    pub fn gate(&self) -> Fx {
        let ramp = self.params.ramp_ms as u32;
        if self.gate_elapsed_ms >= ramp {
            return Fx::ONE;
        }
        let half = ramp / 2;
        if self.gate_elapsed_ms < half {
            return Fx::ZERO;
        }
        let num = (self.gate_elapsed_ms - half) as i64;
        let den = (ramp - half).max(1) as i64;
        Fx(((num << 20) / den) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_clamping() {
        assert_eq!(LfoParams::new(0, 0, 0, 0).freq_x10, 5);
        assert_eq!(LfoParams::new(1000, 0, 700, 150).freq_x10, 250);
        assert_eq!(LfoParams::new(50, 0, 700, 150).fm_depth_cents, 600);
        assert_eq!(LfoParams::new(50, 0, 0, 150).am_depth_pc, 100);
    }

    #[test]
    fn test_oscillation_rate() {
        let tables = Tables::new();
        // 5 Hz: one full cycle every 200 control ticks
        let mut lfo = Lfo::new(LfoParams::new(50, 0, 600, 0));
        let mut crossings = 0;
        let mut prev = Fx::ZERO;
        for _ in 0..2_000 {
            lfo.tick(&tables);
            let b = lfo.bipolar();
            if (prev.0 < 0) != (b.0 < 0) {
                crossings += 1;
            }
            prev = b;
        }
        // 2 seconds at 5 Hz: ~20 zero crossings
        assert!((18..=22).contains(&crossings), "got {} crossings", crossings);
    }

    #[test]
    fn test_unipolar_mapping() {
        let tables = Tables::new();
        let mut lfo = Lfo::new(LfoParams::default());
        for _ in 0..1_000 {
            lfo.tick(&tables);
            let u = lfo.unipolar();
            assert!(u >= Fx::ZERO && u <= Fx::ONE);
        }
    }

    #[test]
    fn test_gate_delay_then_ramp() {
        let tables = Tables::new();
        let mut lfo = Lfo::new(LfoParams::new(50, 400, 600, 0));
        lfo.arm_gate();

        // first half: closed
        for _ in 0..199 {
            lfo.tick(&tables);
            assert_eq!(lfo.gate(), Fx::ZERO);
        }

        // second half: strictly rising
        let mut prev = Fx::ZERO;
        for _ in 0..200 {
            lfo.tick(&tables);
            let g = lfo.gate();
            assert!(g >= prev);
            prev = g;
        }

        lfo.tick(&tables);
        assert_eq!(lfo.gate(), Fx::ONE);
    }

    #[test]
    fn test_gate_open_without_arming_after_ramp_time() {
        let lfo = Lfo::new(LfoParams::new(50, 400, 600, 0));
        // never armed: counter sits at the far end, gate fully open
        assert_eq!(lfo.gate(), Fx::ONE);
    }

    #[test]
    fn test_zero_ramp_time_opens_immediately() {
        let tables = Tables::new();
        let mut lfo = Lfo::new(LfoParams::new(50, 0, 600, 0));
        lfo.arm_gate();
        lfo.tick(&tables);
        assert_eq!(lfo.gate(), Fx::ONE);
    }
}
