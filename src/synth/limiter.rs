// Output limiter - hard ceiling on the rendered signal

use super::fixed::Fx;

/// Absolute ceiling the limiter always enforces, as a fraction of full scale.
pub const MAX_CLIPPING_LEVEL: f64 = 0.97;

/// Clips the output at `min(0.97, level_pc / 100)` of full scale.
///
/// A patch level of zero does not disable the limiter; the hard 0.97 ceiling
/// still applies.
#[derive(Debug, Clone, Copy)]
pub struct Limiter {
    ceiling: Fx,
}

impl Limiter {
    pub fn new() -> Self {
        let mut limiter = Self { ceiling: Fx::ZERO };
        limiter.set_level_pc(0);
        limiter
    }

    pub fn set_level_pc(&mut self, level_pc: u16) {
        let hard = Fx::from_f64(MAX_CLIPPING_LEVEL);
        self.ceiling = if level_pc == 0 {
            hard
        } else {
            Fx::from_f64(level_pc.min(100) as f64 / 100.0).min(hard)
        };
    }

    pub fn ceiling(&self) -> Fx {
        self.ceiling
    }

    #[inline]
    pub fn process(&self, y: Fx) -> Fx {
        y.clamp(-self.ceiling, self.ceiling)
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new()
    }
}
