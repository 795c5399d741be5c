// Atomic parameters - lock-free publication between audio and control threads

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe f32 published as its bit pattern in a single atomic word.
#[derive(Clone)]
pub struct AtomicF32 {
    inner: Arc<AtomicU32>,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            inner: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    pub fn set(&self, value: f32) {
        self.inner.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Diagnostic values the audio callback publishes for the control side.
#[derive(Clone)]
pub struct EngineDiagnostics {
    pub pitch_bend_factor: AtomicF32,
    pub expression_level: AtomicF32,
}

impl EngineDiagnostics {
    pub fn new() -> Self {
        Self {
            pitch_bend_factor: AtomicF32::new(1.0),
            expression_level: AtomicF32::new(0.0),
        }
    }
}

impl Default for EngineDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_f32_round_trip() {
        let a = AtomicF32::new(0.5);
        assert_eq!(a.get(), 0.5);
        a.set(-1.25);
        assert_eq!(a.get(), -1.25);
    }

    #[test]
    fn test_clone_shares_storage() {
        let a = AtomicF32::new(0.0);
        let b = a.clone();
        a.set(3.5);
        assert_eq!(b.get(), 3.5);
    }
}
