//! Platform abstraction layer
//!
//! Hosts implement `OverlayHost`:
//! - `headless`: records the overlay lifecycle (native runs, tests)
//! - `web`: DOM overlay, canvas, listeners and the JS API (wasm32 only)

pub mod headless;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::HeadlessHost;
