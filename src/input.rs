//! Pointer and touch normalization
//!
//! Mouse and touch events are folded into one `InputSignal` so a kernel
//! registers a single handler for both families.

use glam::Vec2;

use crate::sim::Viewport;

/// Browsers replay a tap as mouse events shortly after the touch
pub const EMULATED_MOUSE_MS: f64 = 800.0;

/// Normalized input phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Move,
    Start,
    End,
}

/// Which device family produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// The single signal kernels consume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSignal {
    pub pos: Vec2,
    pub kind: InputKind,
    pub source: PointerSource,
}

/// Raw browser-level events as the host sees them
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    MouseDown(Vec2),
    MouseUp(Vec2),
    MouseMove(Vec2),
    /// Pointer left the overlay; treated as a release
    MouseLeave(Vec2),
    /// `points` is `touches` for start/move and `changedTouches` for end
    Touch { kind: InputKind, points: Vec<Vec2> },
}

/// What a kernel wants to listen to while it owns the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputCapture {
    /// Pointer/touch movement
    pub moves: bool,
    /// Press/release (mousedown/up, touchstart/end)
    pub presses: bool,
    /// Block page scroll/zoom gestures while captured
    pub prevent_gestures: bool,
    /// Two quick taps dismiss the effect
    pub double_tap_dismiss: bool,
}

impl InputCapture {
    pub const NONE: Self = Self {
        moves: false,
        presses: false,
        prevent_gestures: false,
        double_tap_dismiss: false,
    };

    pub fn wants_any(&self) -> bool {
        self.moves || self.presses
    }

    /// DOM event types a host must listen to for this capture
    pub fn event_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.moves {
            names.extend(["mousemove", "touchmove"]);
        }
        if self.presses {
            names.extend(["mousedown", "mouseup", "mouseleave", "touchstart", "touchend"]);
        }
        if self.double_tap_dismiss && !self.presses {
            names.push("touchend");
        }
        names
    }

    pub fn listener_count(&self) -> usize {
        self.event_names().len()
    }
}

/// Normalizes raw events for the active kernel
#[derive(Debug, Clone)]
pub struct InputAdapter {
    capture: InputCapture,
    /// Size of the top-corner zones that never get captured (0 = none)
    dismiss_corner: f32,
    double_tap_ms: f64,
    last_tap_ms: Option<f64>,
    last_touch_ms: Option<f64>,
}

impl InputAdapter {
    pub fn new(capture: InputCapture) -> Self {
        Self {
            capture,
            dismiss_corner: 0.0,
            double_tap_ms: 0.0,
            last_tap_ms: None,
            last_touch_ms: None,
        }
    }

    /// Leave the top corners to the dismiss control
    pub fn with_dismiss_corner(mut self, size: f32) -> Self {
        self.dismiss_corner = size;
        self
    }

    pub fn with_double_tap(mut self, window_ms: f64) -> Self {
        self.double_tap_ms = window_ms;
        self
    }

    pub fn capture(&self) -> InputCapture {
        self.capture
    }

    /// True if `pos` lies in a top corner reserved for the dismiss control
    pub fn in_dismiss_corner(&self, pos: Vec2, viewport: Viewport) -> bool {
        self.dismiss_corner > 0.0
            && pos.y < self.dismiss_corner
            && (pos.x < self.dismiss_corner || pos.x > viewport.width - self.dismiss_corner)
    }

    /// Fold a raw event into a signal, or None if the kernel doesn't want it
    pub fn normalize(&self, raw: &RawInput, viewport: Viewport) -> Option<InputSignal> {
        let (pos, kind, source) = match raw {
            RawInput::MouseDown(p) => (*p, InputKind::Start, PointerSource::Mouse),
            RawInput::MouseUp(p) | RawInput::MouseLeave(p) => {
                (*p, InputKind::End, PointerSource::Mouse)
            }
            RawInput::MouseMove(p) => (*p, InputKind::Move, PointerSource::Mouse),
            RawInput::Touch { kind, points } => {
                let pos = points.first().copied()?;
                if self.in_dismiss_corner(pos, viewport) {
                    return None;
                }
                (pos, *kind, PointerSource::Touch)
            }
        };

        let wanted = match kind {
            InputKind::Move => self.capture.moves,
            InputKind::Start | InputKind::End => self.capture.presses,
        };
        wanted.then_some(InputSignal { pos, kind, source })
    }

    /// Whether the host should cancel the browser's default for this event
    pub fn should_prevent_default(&self, raw: &RawInput, viewport: Viewport) -> bool {
        match raw {
            RawInput::Touch { kind, points } => {
                // A cancelled touchstart also stops the emulated mouse events
                let wanted = self.capture.prevent_gestures
                    || (self.capture.presses && *kind == InputKind::Start);
                wanted
                    && !points
                        .first()
                        .is_some_and(|p| self.in_dismiss_corner(*p, viewport))
            }
            RawInput::MouseDown(_) | RawInput::MouseUp(_) => self.capture.presses,
            RawInput::MouseMove(_) | RawInput::MouseLeave(_) => false,
        }
    }

    /// Remember touches; returns true for a mouse event that only replays one
    pub fn is_emulated_mouse(&mut self, raw: &RawInput, now_ms: f64) -> bool {
        match raw {
            RawInput::Touch { .. } => {
                self.last_touch_ms = Some(now_ms);
                false
            }
            _ => self
                .last_touch_ms
                .is_some_and(|last| now_ms - last < EMULATED_MOUSE_MS),
        }
    }

    /// Track touch ends; returns true on the second tap inside the window
    pub fn register_tap(&mut self, raw: &RawInput, now_ms: f64) -> bool {
        if !self.capture.double_tap_dismiss {
            return false;
        }
        let RawInput::Touch {
            kind: InputKind::End,
            ..
        } = raw
        else {
            return false;
        };

        let is_double = self
            .last_tap_ms
            .is_some_and(|last| now_ms - last > 0.0 && now_ms - last < self.double_tap_ms);
        self.last_tap_ms = if is_double { None } else { Some(now_ms) };
        is_double
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn all() -> InputCapture {
        InputCapture {
            moves: true,
            presses: true,
            prevent_gestures: true,
            double_tap_dismiss: true,
        }
    }

    #[test]
    fn test_mouse_and_touch_fold_to_same_signal() {
        let adapter = InputAdapter::new(all());
        let mouse = adapter
            .normalize(&RawInput::MouseDown(Vec2::new(10.0, 200.0)), VIEW)
            .unwrap();
        let touch = adapter
            .normalize(
                &RawInput::Touch {
                    kind: InputKind::Start,
                    points: vec![Vec2::new(10.0, 200.0)],
                },
                VIEW,
            )
            .unwrap();
        assert_eq!(mouse.kind, touch.kind);
        assert_eq!(mouse.pos, touch.pos);
        assert_eq!(touch.source, PointerSource::Touch);
    }

    #[test]
    fn test_mouse_leave_is_release() {
        let adapter = InputAdapter::new(all());
        let signal = adapter
            .normalize(&RawInput::MouseLeave(Vec2::ZERO), VIEW)
            .unwrap();
        assert_eq!(signal.kind, InputKind::End);
    }

    #[test]
    fn test_unwanted_kinds_are_dropped() {
        let adapter = InputAdapter::new(InputCapture {
            presses: true,
            ..InputCapture::NONE
        });
        assert!(adapter
            .normalize(&RawInput::MouseMove(Vec2::ZERO), VIEW)
            .is_none());
        assert!(adapter
            .normalize(&RawInput::MouseUp(Vec2::ZERO), VIEW)
            .is_some());
    }

    #[test]
    fn test_dismiss_corner_touches_pass_through() {
        let adapter = InputAdapter::new(all()).with_dismiss_corner(80.0);
        let corner = RawInput::Touch {
            kind: InputKind::Move,
            points: vec![Vec2::new(790.0, 20.0)],
        };
        assert!(adapter.normalize(&corner, VIEW).is_none());
        assert!(!adapter.should_prevent_default(&corner, VIEW));

        let middle = RawInput::Touch {
            kind: InputKind::Move,
            points: vec![Vec2::new(400.0, 20.0)],
        };
        assert!(adapter.normalize(&middle, VIEW).is_some());
        assert!(adapter.should_prevent_default(&middle, VIEW));
    }

    #[test]
    fn test_gestures_only_prevented_while_capturing() {
        let adapter = InputAdapter::new(InputCapture {
            moves: true,
            ..InputCapture::NONE
        });
        let touch = RawInput::Touch {
            kind: InputKind::Move,
            points: vec![Vec2::new(100.0, 100.0)],
        };
        assert!(!adapter.should_prevent_default(&touch, VIEW));
    }

    #[test]
    fn test_touch_start_prevented_when_presses_captured() {
        let adapter = InputAdapter::new(InputCapture {
            presses: true,
            ..InputCapture::NONE
        });
        let start = RawInput::Touch {
            kind: InputKind::Start,
            points: vec![Vec2::new(300.0, 300.0)],
        };
        let moving = RawInput::Touch {
            kind: InputKind::Move,
            points: vec![Vec2::new(300.0, 300.0)],
        };
        assert!(adapter.should_prevent_default(&start, VIEW));
        assert!(!adapter.should_prevent_default(&moving, VIEW));
    }

    #[test]
    fn test_mouse_replay_after_touch_is_emulated() {
        let mut adapter = InputAdapter::new(all());
        let pos = Vec2::new(300.0, 300.0);
        assert!(!adapter.is_emulated_mouse(&RawInput::MouseDown(pos), 0.0));
        let touch = RawInput::Touch {
            kind: InputKind::Start,
            points: vec![pos],
        };
        assert!(!adapter.is_emulated_mouse(&touch, 1000.0));
        assert!(adapter.is_emulated_mouse(&RawInput::MouseDown(pos), 1050.0));
        assert!(!adapter.is_emulated_mouse(&RawInput::MouseDown(pos), 1000.0 + EMULATED_MOUSE_MS));
    }

    #[test]
    fn test_double_tap_window() {
        let mut adapter = InputAdapter::new(all()).with_double_tap(500.0);
        let tap = RawInput::Touch {
            kind: InputKind::End,
            points: vec![Vec2::new(300.0, 300.0)],
        };
        assert!(!adapter.register_tap(&tap, 1000.0));
        assert!(!adapter.register_tap(&tap, 1600.0));
        assert!(adapter.register_tap(&tap, 1900.0));
        // Third tap starts a fresh pair
        assert!(!adapter.register_tap(&tap, 2000.0));
    }

    #[test]
    fn test_listener_count_matches_capture() {
        assert_eq!(InputCapture::NONE.listener_count(), 0);
        assert_eq!(all().listener_count(), 7);
        let tap_only = InputCapture {
            moves: true,
            double_tap_dismiss: true,
            ..InputCapture::NONE
        };
        assert_eq!(tap_only.event_names(), vec!["mousemove", "touchmove", "touchend"]);
    }
}
