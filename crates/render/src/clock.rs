use std::time::Instant;

/// Monotonic timestamp source for the frame loop. Timestamps are in
/// milliseconds, matching host animation-frame callbacks.
pub trait Clock {
    fn now_ms(&mut self) -> f64;
}

/// Wall clock measured from its own construction.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-stepped clock for tests and headless runs. Each call advances by
/// a fixed step, so the first reading is one step past zero.
pub struct ManualClock {
    now_ms: f64,
    step_ms: f64,
}

impl ManualClock {
    pub fn new(step_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            step_ms,
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&mut self) -> f64 {
        self.now_ms += self.step_ms;
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_steps_fixed_amounts() {
        let mut clock = ManualClock::new(16.0);
        assert_eq!(clock.now_ms(), 16.0);
        assert_eq!(clock.now_ms(), 32.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
