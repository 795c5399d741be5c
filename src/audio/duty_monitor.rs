// Duty monitor - audio callback load tracking
//
// Measures how much of the available buffer period the callback actually
// spends rendering. Metrics cross threads through atomics only.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

/// Estimates the callback duty cycle: rendering time over available time.
///
/// Only one out of `measure_every_n` callbacks is timed, to keep the
/// measurement itself out of the budget.
#[derive(Clone)]
pub struct DutyMonitor {
    total_render_time_ns: Arc<AtomicU64>,
    total_available_time_ns: Arc<AtomicU64>,
    measured_count: Arc<AtomicU64>,
    current_count: Arc<AtomicU32>,
    sample_rate: u32,
    measure_every_n: u32,
}

impl DutyMonitor {
    pub fn new(sample_rate: u32, measure_every_n: u32) -> Self {
        Self {
            total_render_time_ns: Arc::new(AtomicU64::new(0)),
            total_available_time_ns: Arc::new(AtomicU64::new(0)),
            measured_count: Arc::new(AtomicU64::new(0)),
            current_count: Arc::new(AtomicU32::new(0)),
            sample_rate,
            measure_every_n: measure_every_n.max(1),
        }
    }

    /// Call at callback entry. `Some` means this callback is being timed.
    #[inline]
    pub fn start_measure(&self) -> Option<Instant> {
        let count = self.current_count.fetch_add(1, Ordering::Relaxed);
        (count % self.measure_every_n == 0).then(Instant::now)
    }

    /// Call at callback exit with the token from `start_measure` and the
    /// number of frames just rendered.
    #[inline]
    pub fn end_measure(&self, start: Option<Instant>, frames: usize) {
        if let Some(start) = start {
            let elapsed_ns = start.elapsed().as_nanos() as u64;
            let available_ns =
                (frames as f64 / self.sample_rate as f64 * 1_000_000_000.0) as u64;
            self.total_render_time_ns.fetch_add(elapsed_ns, Ordering::Relaxed);
            self.total_available_time_ns.fetch_add(available_ns, Ordering::Relaxed);
            self.measured_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Duty estimate in percent; may exceed 100 when the callback overruns.
    pub fn duty_percent(&self) -> f32 {
        let render = self.total_render_time_ns.load(Ordering::Relaxed);
        let available = self.total_available_time_ns.load(Ordering::Relaxed);
        if available == 0 {
            return 0.0;
        }
        (render as f64 / available as f64 * 100.0) as f32
    }

    pub fn measured_count(&self) -> u64 {
        self.measured_count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.total_render_time_ns.store(0, Ordering::Relaxed);
        self.total_available_time_ns.store(0, Ordering::Relaxed);
        self.measured_count.store(0, Ordering::Relaxed);
        self.current_count.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_starts_at_zero() {
        let monitor = DutyMonitor::new(32_000, 10);
        assert_eq!(monitor.duty_percent(), 0.0);
        assert_eq!(monitor.measured_count(), 0);
    }

    #[test]
    fn test_sampling_rate() {
        let monitor = DutyMonitor::new(32_000, 10);
        let mut measured = 0;
        for _ in 0..100 {
            if monitor.start_measure().is_some() {
                measured += 1;
            }
        }
        assert_eq!(measured, 10);
    }

    #[test]
    fn test_duty_accumulates() {
        let monitor = DutyMonitor::new(32_000, 1);
        for _ in 0..5 {
            let start = monitor.start_measure();
            thread::sleep(Duration::from_micros(200));
            monitor.end_measure(start, 512);
        }
        assert!(monitor.duty_percent() > 0.0);
        assert_eq!(monitor.measured_count(), 5);
    }

    #[test]
    fn test_reset() {
        let monitor = DutyMonitor::new(32_000, 1);
        let start = monitor.start_measure();
        monitor.end_measure(start, 512);
        monitor.reset();
        assert_eq!(monitor.duty_percent(), 0.0);
        assert_eq!(monitor.measured_count(), 0);
    }
}
