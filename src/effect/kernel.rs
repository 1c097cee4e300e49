//! Kernel contract
//!
//! A kernel is the per-effect simulation bound to the lifecycle: it declares
//! what input it wants, reacts to timers, steps once per fixed tick and
//! describes its frame. All side effects go through `KernelContext`.

use std::any::Any;

use crate::clock::Timers;
use crate::input::{InputAdapter, InputCapture, InputSignal};
use crate::renderer::Scene;
use crate::sim::{SimRng, Viewport};

pub use crate::clock::SimulationHandle;

/// Timers a kernel may arm. At most one of each is pending per effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelTimer {
    /// Fixed wall-clock lifetime
    Duration,
    /// Debounce before coasting to a stop
    Grace,
    /// No pointer movement for too long
    Inactivity,
    /// Delay between the final score and exit
    GameOverExit,
}

/// Why an effect ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// The kernel finished on its own
    Finished,
    /// A duration or inactivity deadline passed
    Timeout,
    /// Close control, double tap or an API call
    Dismissed,
    /// Its simulation handle was stopped
    Stopped,
    /// The overlay vanished from the document
    Detached,
    /// A new trigger replaced it
    Superseded,
}

/// Latch that records the first completion only
#[derive(Debug, Clone, Copy, Default)]
pub struct Completion {
    reason: Option<CompletionReason>,
}

impl Completion {
    /// Returns true if this call completed the effect
    pub fn complete(&mut self, reason: CompletionReason) -> bool {
        if self.reason.is_some() {
            return false;
        }
        self.reason = Some(reason);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.reason.is_some()
    }

    pub fn reason(&self) -> Option<CompletionReason> {
        self.reason
    }
}

/// Timer payload held by the controller: which effect generation it belongs to and what it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTimer {
    Kernel(KernelTimer),
    /// Controller-enforced deadline
    Deadline,
    FadeOutDone,
}

pub type TimerQueue = Timers<(u64, EffectTimer)>;

/// Capabilities a kernel gets while handling an event or a tick
pub struct KernelContext<'a> {
    pub now_ms: f64,
    pub rng: &'a mut SimRng,
    timers: &'a mut TimerQueue,
    generation: u64,
    completion: &'a mut Completion,
}

impl<'a> KernelContext<'a> {
    pub fn new(
        now_ms: f64,
        rng: &'a mut SimRng,
        timers: &'a mut TimerQueue,
        generation: u64,
        completion: &'a mut Completion,
    ) -> Self {
        Self {
            now_ms,
            rng,
            timers,
            generation,
            completion,
        }
    }

    /// Arm `timer`, replacing any pending one of the same kind
    pub fn schedule(&mut self, timer: KernelTimer, delay_ms: f64) {
        self.cancel(timer);
        log::debug!("Kernel timer {:?} armed for {} ms", timer, delay_ms);
        self.timers
            .schedule(self.now_ms, delay_ms, (self.generation, EffectTimer::Kernel(timer)));
    }

    /// Disarm `timer`. Returns false if nothing was pending.
    pub fn cancel(&mut self, timer: KernelTimer) -> bool {
        let generation = self.generation;
        self.timers
            .cancel_where(|(g, t)| *g == generation && *t == EffectTimer::Kernel(timer))
            > 0
    }

    pub fn is_pending(&self, timer: KernelTimer) -> bool {
        let generation = self.generation;
        self.timers
            .iter_payloads()
            .any(|(g, t)| *g == generation && *t == EffectTimer::Kernel(timer))
    }

    /// Signal completion. Later calls are ignored.
    pub fn complete(&mut self, reason: CompletionReason) {
        self.completion.complete(reason);
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_complete()
    }
}

pub trait Kernel {
    /// Input this kernel listens to while it owns the overlay
    fn input_capture(&self) -> InputCapture {
        InputCapture::NONE
    }

    /// Normalizer for this kernel's input (dismiss corners, double tap)
    fn input_adapter(&self) -> InputAdapter {
        InputAdapter::new(self.input_capture())
    }

    /// Called once after the overlay is mounted
    fn start(&mut self, _ctx: &mut KernelContext) {}

    fn input(&mut self, _signal: InputSignal, _ctx: &mut KernelContext) {}

    fn timer(&mut self, _timer: KernelTimer, _ctx: &mut KernelContext) {}

    /// One fixed simulation tick. Return false once there is nothing left to simulate.
    fn step(&mut self, ctx: &mut KernelContext) -> bool;

    fn resize(&mut self, viewport: Viewport);

    /// Describe the current frame. Must not change simulation state.
    fn draw(&self, scene: &mut Scene);

    /// Downcast hook for hosts and tests
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::seeded_rng;

    #[test]
    fn test_completion_latches_first_reason() {
        let mut completion = Completion::default();
        assert!(completion.complete(CompletionReason::Timeout));
        assert!(!completion.complete(CompletionReason::Dismissed));
        assert_eq!(completion.reason(), Some(CompletionReason::Timeout));
    }

    #[test]
    fn test_schedule_replaces_same_kind() {
        let mut rng = seeded_rng(1);
        let mut timers = TimerQueue::new();
        let mut completion = Completion::default();
        let mut ctx = KernelContext::new(0.0, &mut rng, &mut timers, 7, &mut completion);

        ctx.schedule(KernelTimer::Grace, 2000.0);
        ctx.schedule(KernelTimer::Grace, 500.0);
        ctx.schedule(KernelTimer::Duration, 8000.0);
        assert!(ctx.is_pending(KernelTimer::Grace));
        assert!(ctx.cancel(KernelTimer::Grace));
        assert!(!ctx.cancel(KernelTimer::Grace));
        assert!(!ctx.is_pending(KernelTimer::Grace));
        drop(ctx);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel_ignores_other_generations() {
        let mut rng = seeded_rng(2);
        let mut timers = TimerQueue::new();
        timers.schedule(0.0, 100.0, (1, EffectTimer::Kernel(KernelTimer::Grace)));
        let mut completion = Completion::default();
        let mut ctx = KernelContext::new(0.0, &mut rng, &mut timers, 2, &mut completion);
        assert!(!ctx.cancel(KernelTimer::Grace));
        drop(ctx);
        assert_eq!(timers.len(), 1);
    }
}
