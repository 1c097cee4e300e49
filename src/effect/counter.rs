//! Repeated-interaction counter
//!
//! Owned by whoever receives the interactions (a logo, a button) and handed to
//! `EffectController::trigger_from_interaction` on each one.

use crate::tuning::ControllerTuning;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionCounter {
    pub count: u32,
    pub last_interaction_ms: Option<f64>,
    /// While set, registrations before this time are ignored
    pub locked_until_ms: Option<f64>,
}

impl InteractionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one interaction at `now_ms`.
    ///
    /// Returns true when this interaction reaches `limit`; the counter then
    /// resets and ignores further interactions for `cooldown_ms`.
    pub fn register(&mut self, now_ms: f64, limit: u32, reset_ms: f64, cooldown_ms: f64) -> bool {
        if let Some(until) = self.locked_until_ms {
            if now_ms < until {
                return false;
            }
            self.locked_until_ms = None;
            self.count = 0;
        }

        if self
            .last_interaction_ms
            .is_some_and(|last| now_ms - last > reset_ms)
        {
            self.count = 0;
        }
        self.count += 1;
        self.last_interaction_ms = Some(now_ms);

        if self.count >= limit.max(1) {
            log::debug!("Interaction limit {} reached", limit);
            self.count = 0;
            self.locked_until_ms = Some(now_ms + cooldown_ms);
            return true;
        }
        false
    }

    /// `register` with the limits from `tuning`
    pub fn register_tuned(&mut self, now_ms: f64, tuning: &ControllerTuning, touch: bool) -> bool {
        let limit = if touch {
            tuning.interaction_limit_touch
        } else {
            tuning.interaction_limit
        };
        self.register(
            now_ms,
            limit,
            tuning.interaction_reset_ms,
            tuning.interaction_cooldown_ms,
        )
    }

    pub fn is_locked(&self, now_ms: f64) -> bool {
        self.locked_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_the_limit() {
        let mut counter = InteractionCounter::new();
        let fired: Vec<bool> = (0..5)
            .map(|i| counter.register(i as f64 * 100.0, 5, 1000.0, 6000.0))
            .collect();
        assert_eq!(fired, vec![false, false, false, false, true]);
        assert_eq!(counter.count, 0);
    }

    #[test]
    fn test_slow_interactions_restart_the_count() {
        let mut counter = InteractionCounter::new();
        for i in 0..4 {
            assert!(!counter.register(i as f64 * 100.0, 5, 1000.0, 6000.0));
        }
        // Gap longer than the reset window
        assert!(!counter.register(2000.0, 5, 1000.0, 6000.0));
        assert_eq!(counter.count, 1);
    }

    #[test]
    fn test_cooldown_ignores_interactions() {
        let mut counter = InteractionCounter::new();
        for i in 0..2 {
            counter.register(i as f64 * 10.0, 2, 1000.0, 6000.0);
        }
        assert!(counter.is_locked(100.0));
        assert!(!counter.register(100.0, 2, 1000.0, 6000.0));
        assert!(!counter.register(200.0, 2, 1000.0, 6000.0));
        assert_eq!(counter.count, 0);

        assert!(!counter.is_locked(6010.0));
        assert!(!counter.register(6010.0, 2, 1000.0, 6000.0));
        assert!(counter.register(6020.0, 2, 1000.0, 6000.0));
    }

    #[test]
    fn test_touch_uses_lower_limit() {
        let tuning = ControllerTuning::default();
        let mut mouse = InteractionCounter::new();
        let mut touch = InteractionCounter::new();
        let mouse_hits = (0..tuning.interaction_limit_touch)
            .filter(|i| mouse.register_tuned(*i as f64 * 50.0, &tuning, false))
            .count();
        let touch_hits = (0..tuning.interaction_limit_touch)
            .filter(|i| touch.register_tuned(*i as f64 * 50.0, &tuning, true))
            .count();
        assert_eq!(mouse_hits, 0);
        assert_eq!(touch_hits, 1);
    }
}
