use std::time::{Duration, Instant};

/// Exponentially decaying event count.
///
/// Each increment adds 1 after decaying the previous value by
/// `e^(-elapsed / window)`, so old events fade out smoothly instead of
/// falling off a bucket edge.
#[derive(Debug, Clone, Copy)]
pub struct RollingAverage {
    window: Duration,
    value: f64,
    last: Instant,
}

impl RollingAverage {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            value: 0.0,
            last: now,
        }
    }

    pub fn increment(&mut self, now: Instant) {
        self.value = self.value(now) + 1.0;
        self.last = now;
    }

    pub fn value(&self, now: Instant) -> f64 {
        let window = self.window.as_secs_f64();
        if window <= 0.0 {
            return 0.0;
        }
        let elapsed = now.saturating_duration_since(self.last).as_secs_f64();
        self.value * (-elapsed / window).exp()
    }

    /// Rounded to the nearest whole event.
    pub fn count(&self, now: Instant) -> u32 {
        let v = self.value(now).round();
        if v >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            v as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(15);

    #[test]
    fn counts_accumulate_without_elapsed_time() {
        let t0 = Instant::now();
        let mut avg = RollingAverage::new(WINDOW, t0);
        avg.increment(t0);
        avg.increment(t0);
        avg.increment(t0);
        assert_eq!(avg.count(t0), 3);
    }

    #[test]
    fn value_decays_by_one_e_per_window() {
        let t0 = Instant::now();
        let mut avg = RollingAverage::new(WINDOW, t0);
        avg.increment(t0);
        let v = avg.value(t0 + WINDOW);
        assert!((v - (-1.0f64).exp()).abs() < 1e-9, "got {v}");
        assert_eq!(avg.count(t0 + WINDOW), 1);
        assert_eq!(avg.count(t0 + WINDOW * 5), 0);
    }

    #[test]
    fn increment_after_decay_adds_to_decayed_value() {
        let t0 = Instant::now();
        let mut avg = RollingAverage::new(WINDOW, t0);
        avg.increment(t0);
        avg.increment(t0 + WINDOW);
        let expected = (-1.0f64).exp() + 1.0;
        assert!((avg.value(t0 + WINDOW) - expected).abs() < 1e-9);
    }
}
