//! Frame driver and wall-clock timers
//!
//! The per-frame callback and the timer queue are the only two suspension
//! points: everything else runs to completion within a frame.

use std::cell::Cell;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, SIM_DT_MS};

/// Shared stop flag for a running loop or kernel.
///
/// Cloning shares the flag. `stop()` is idempotent.
#[derive(Debug, Clone, Default)]
pub struct SimulationHandle {
    stopped: Rc<Cell<bool>>,
}

impl SimulationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to end. Repeated calls are no-ops.
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

/// What one display frame hands to the step function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Wall time since the previous frame, clamped
    pub elapsed_ms: f64,
    /// Fixed simulation ticks to run this frame
    pub steps: u32,
}

/// Drives a per-frame step function until it returns false or is stopped.
#[derive(Debug)]
pub struct FrameDriver {
    handle: SimulationHandle,
    last_time: Option<f64>,
    accumulator: f64,
    frames: u64,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            handle: SimulationHandle::new(),
            last_time: None,
            accumulator: 0.0,
            frames: 0,
        }
    }

    /// Handle that stops this driver from outside
    pub fn handle(&self) -> SimulationHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_stopped()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one display frame.
    ///
    /// `attached` is the host's answer to "is my surface still visible"; a
    /// detached surface stops the driver without calling `step`. Returns
    /// whether the driver is still running afterwards.
    pub fn frame(
        &mut self,
        now_ms: f64,
        attached: bool,
        mut step: impl FnMut(FrameTick) -> bool,
    ) -> bool {
        if self.handle.is_stopped() {
            return false;
        }
        if !attached {
            log::debug!("Frame driver: surface detached, stopping");
            self.handle.stop();
            return false;
        }

        let elapsed_ms = match self.last_time {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => SIM_DT_MS,
        };
        self.last_time = Some(now_ms);
        self.frames += 1;
        let steps = self.fixed_steps(elapsed_ms);

        if !step(FrameTick { elapsed_ms, steps }) {
            self.handle.stop();
            return false;
        }
        self.is_running()
    }

    /// Convert frame time into a bounded number of fixed simulation ticks
    pub fn fixed_steps(&mut self, elapsed_ms: f64) -> u32 {
        self.accumulator += elapsed_ms;

        let mut steps = 0;
        while self.accumulator >= SIM_DT_MS && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT_MS;
            steps += 1;
        }
        // Drop backlog beyond the substep cap rather than spiralling
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT_MS);
        }
        steps
    }
}

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

#[derive(Debug)]
struct Timer<T> {
    deadline_ms: f64,
    /// Insertion order, breaks deadline ties
    seq: u64,
    payload: T,
}

/// Cancellable one-shot timers fired against an externally supplied clock
#[derive(Debug)]
pub struct Timers<T> {
    slots: SlotMap<TimerId, Timer<T>>,
    next_seq: u64,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(Timer {
            deadline_ms: now_ms + delay_ms.max(0.0),
            seq,
            payload,
        })
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.slots.remove(id).is_some()
    }

    /// Cancel every timer whose payload matches
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, timer| !pred(&timer.payload));
        before - self.slots.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn iter_payloads(&self) -> impl Iterator<Item = &T> {
        self.slots.values().map(|t| &t.payload)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove the earliest timer due at `now_ms` and return its deadline and payload.
    ///
    /// Popping one at a time lets a handler cancel or schedule timers
    /// between firings.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(f64, T)> {
        let id = self
            .slots
            .iter()
            .filter(|(_, t)| t.deadline_ms <= now_ms)
            .min_by(|(_, a), (_, b)| {
                a.deadline_ms
                    .partial_cmp(&b.deadline_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|(id, _)| id)?;
        self.slots.remove(id).map(|t| (t.deadline_ms, t.payload))
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<f64> {
        self.slots
            .values()
            .map(|t| t.deadline_ms)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}
