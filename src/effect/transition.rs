//! Declarative property transitions
//!
//! A transition is just data: start value, end value, start time, duration
//! and an easing curve. The controller samples it each frame.

/// Easing curve applied to normalized time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Cubic ease-in-out
    #[default]
    EaseInOut,
}

impl Easing {
    /// Map progress `t` in 0..1 to eased progress
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: f32,
    pub to: f32,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Transition {
    pub fn new(from: f32, to: f32, start_ms: f64, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: duration_ms.max(0.0),
            easing,
        }
    }

    /// Opacity 0 → 1
    pub fn fade_in(start_ms: f64, duration_ms: f64) -> Self {
        Self::new(0.0, 1.0, start_ms, duration_ms, Easing::EaseInOut)
    }

    /// Opacity from wherever it is now → 0
    pub fn fade_out(from: f32, start_ms: f64, duration_ms: f64) -> Self {
        Self::new(from, 0.0, start_ms, duration_ms, Easing::EaseInOut)
    }

    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }

    /// Linear progress in 0..1
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn sample(&self, now_ms: f64) -> f32 {
        let t = self.easing.apply(self.progress(now_ms));
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        now_ms >= self.end_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ease_in_out_is_slow_at_the_ends() {
        let e = Easing::EaseInOut;
        assert!(e.apply(0.1) < 0.1);
        assert!(e.apply(0.9) > 0.9);
    }

    #[test]
    fn test_fade_in_samples() {
        let t = Transition::fade_in(1000.0, 500.0);
        assert_eq!(t.sample(0.0), 0.0);
        assert_eq!(t.sample(1000.0), 0.0);
        assert!((t.sample(1250.0) - 0.5).abs() < 1e-6);
        assert_eq!(t.sample(1500.0), 1.0);
        assert_eq!(t.sample(9000.0), 1.0);
        assert!(!t.is_finished(1499.0));
        assert!(t.is_finished(1500.0));
    }

    #[test]
    fn test_fade_out_from_partial() {
        let t = Transition::fade_out(0.4, 0.0, 500.0);
        assert!((t.sample(0.0) - 0.4).abs() < 1e-6);
        assert_eq!(t.sample(500.0), 0.0);
    }

    #[test]
    fn test_fade_is_monotonic() {
        let t = Transition::fade_in(0.0, 500.0);
        let mut last = -1.0;
        for ms in 0..=500 {
            let v = t.sample(ms as f64);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn test_zero_duration_jumps() {
        let t = Transition::new(0.0, 1.0, 100.0, 0.0, Easing::Linear);
        assert_eq!(t.sample(100.0), 1.0);
        assert!(t.is_finished(100.0));
    }
}
