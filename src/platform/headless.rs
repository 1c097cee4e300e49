//! Recording host without a page
//!
//! Keeps the observable state of an overlay (mounted, opacity, listeners,
//! HUD) so native runs and tests can watch the lifecycle.

use crate::effect::{EffectDescriptor, OverlayHost, SurfaceWatch};
use crate::error::{FxError, FxResult};
use crate::input::InputAdapter;
use crate::renderer::Scene;
use crate::sim::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessHost {
    pub viewport: Viewport,
    /// When false, `mount` fails as if the mountpoint were missing
    pub mount_available: bool,
    pub mounted: bool,
    pub mounts: u32,
    pub unmounts: u32,
    /// Mounts that happened while another overlay was still up
    pub overlapping_mounts: u32,
    pub opacity: f32,
    /// Distinct consecutive opacity values
    pub opacity_history: Vec<f32>,
    pub listeners: usize,
    attached: usize,
    pub gesture_locked: bool,
    pub dismiss_control: bool,
    pub cosmetics: Vec<String>,
    pub frames_presented: u64,
    pub last_hud: Vec<String>,
    pub last_vertex_count: usize,
    watch: Option<SurfaceWatch>,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            mount_available: true,
            mounted: false,
            mounts: 0,
            unmounts: 0,
            overlapping_mounts: 0,
            opacity: 0.0,
            opacity_history: Vec::new(),
            listeners: 0,
            attached: 0,
            gesture_locked: false,
            dismiss_control: false,
            cosmetics: Vec::new(),
            frames_presented: 0,
            last_hud: Vec::new(),
            last_vertex_count: 0,
            watch: None,
        }
    }

    /// Pull the overlay out from under the controller, as foreign page code might
    pub fn detach(&self) {
        if let Some(watch) = &self.watch {
            watch.mark_detached();
        }
    }
}

impl OverlayHost for HeadlessHost {
    fn mount(&mut self, desc: &EffectDescriptor) -> FxResult<SurfaceWatch> {
        if !self.mount_available {
            return Err(FxError::MissingMount("overlay-root".into()));
        }
        if self.mounted {
            self.overlapping_mounts += 1;
        }
        log::debug!("Headless mount for '{}'", desc.name);
        self.mounted = true;
        self.mounts += 1;
        let watch = SurfaceWatch::new();
        self.watch = Some(watch.clone());
        Ok(watch)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        if self.opacity_history.last() != Some(&opacity) {
            self.opacity_history.push(opacity);
        }
    }

    fn attach_input(&mut self, adapter: &InputAdapter) {
        self.attached = adapter.capture().listener_count();
        self.listeners += self.attached;
    }

    fn detach_input(&mut self) {
        self.listeners -= self.attached;
        self.attached = 0;
    }

    fn set_gesture_lock(&mut self, locked: bool) {
        self.gesture_locked = locked;
    }

    fn show_dismiss_control(&mut self) {
        self.dismiss_control = true;
    }

    fn play_cosmetic(&mut self, name: &str) {
        self.cosmetics.push(name.to_string());
    }

    fn present(&mut self, scene: &Scene) {
        self.frames_presented += 1;
        self.last_vertex_count = scene.vertices.len();
        self.last_hud = scene.hud_text().map(str::to_string).collect();
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.unmounts += 1;
        self.dismiss_control = false;
        self.watch = None;
    }
}
