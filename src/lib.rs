//! Overlay FX - short-lived full-screen effects over a host page
//!
//! Core modules:
//! - `sim`: Deterministic simulations (starfield, fireworks, pong)
//! - `effect`: Effect lifecycle (catalog, controller, kernels, fades)
//! - `clock`: Frame driver and cancellable timers
//! - `input`: Pointer/touch normalization
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/headless host abstraction
//! - `settings` / `tuning`: User preferences and data-driven constants

pub mod clock;
pub mod effect;
pub mod error;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use effect::{EffectController, EffectTicket, InteractionCounter, OverlayHost};
pub use error::FxError;
pub use settings::{ContentMode, QualityPreset, Settings};
pub use tuning::Tuning;

#[cfg(target_arch = "wasm32")]
pub use platform::web::FxRuntime;

/// Runtime configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz; kernel constants are per tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Fixed timestep in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Frame delta clamp (a backgrounded tab resumes without a burst of ticks)
    pub const MAX_FRAME_MS: f64 = 100.0;
}
