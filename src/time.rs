//! Platform-agnostic time utilities
//!
//! Wall clock in seconds since app start, an interval gate and an FPS counter.

use std::collections::VecDeque;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
pub fn now_seconds() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Fires at most once per `period` seconds. The first check always fires.
#[derive(Clone, Debug)]
pub struct Every {
    period: f64,
    last: Option<f64>,
}

impl Every {
    pub fn new(period: f64) -> Self {
        Self { period, last: None }
    }

    pub fn due(&mut self, now: f64) -> bool {
        match self.last {
            Some(last) if now - last < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Frames per second over a sliding window of recent frames
#[derive(Clone, Debug)]
pub struct FpsCounter {
    frames: VecDeque<f64>,
    window: usize,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FpsCounter {
    pub fn new(window: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(window + 1),
            window: window.max(2),
        }
    }

    pub fn tick(&mut self, now: f64) {
        self.frames.push_back(now);
        if self.frames.len() > self.window {
            self.frames.pop_front();
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.front(), self.frames.back()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let a = now_seconds();
        let b = now_seconds();
        assert!(b >= a);
    }

    #[test]
    fn test_every() {
        let mut gate = Every::new(1.0);
        assert!(gate.due(5.0));
        assert!(!gate.due(5.5));
        assert!(gate.due(6.0));
        assert!(!gate.due(6.9));
        assert!(gate.due(7.2));
    }

    #[test]
    fn test_fps() {
        let mut fps = FpsCounter::new(10);
        assert_eq!(fps.fps(), 0.0);
        for i in 0..30 {
            fps.tick(i as f64 / 60.0);
        }
        assert!((fps.fps() - 60.0).abs() < 1e-6, "fps was {}", fps.fps());
    }
}
