//! What the controller needs from the page hosting the overlay

use std::cell::Cell;
use std::rc::Rc;

use super::catalog::EffectDescriptor;
use crate::error::FxResult;
use crate::input::InputAdapter;
use crate::renderer::Scene;
use crate::sim::Viewport;

/// Shared "surface was removed from the document" flag.
///
/// The host keeps one clone and marks it from its observer; the controller
/// polls the other each frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceWatch {
    detached: Rc<Cell<bool>>,
}

impl SurfaceWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_detached(&self) {
        self.detached.set(true);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }
}

/// The overlay surface and everything attached to it.
///
/// Only one surface exists at a time: the controller always calls `unmount`
/// before the next `mount`.
pub trait OverlayHost {
    /// Create the overlay, fully transparent and input-transparent
    fn mount(&mut self, desc: &EffectDescriptor) -> FxResult<SurfaceWatch>;

    fn viewport(&self) -> Viewport;

    fn set_opacity(&mut self, opacity: f32);

    /// Register listeners for what `adapter` captures
    fn attach_input(&mut self, adapter: &InputAdapter);

    /// Remove every listener added by `attach_input`
    fn detach_input(&mut self);

    /// Block or restore page scroll and zoom gestures
    fn set_gesture_lock(&mut self, locked: bool);

    fn show_dismiss_control(&mut self);

    /// Start a cosmetic (non-simulated) effect
    fn play_cosmetic(&mut self, name: &str);

    /// Draw one simulation frame
    fn present(&mut self, scene: &Scene);

    /// Remove the overlay. Must tolerate a surface already removed by someone else.
    fn unmount(&mut self);
}
