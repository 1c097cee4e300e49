//! WebGPU rendering module
//!
//! Kernels describe a frame as a `Scene` of pixel-space triangles plus HUD
//! text; `RenderState` turns the triangles into draws with an optional trail
//! accumulation texture.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{ClearMode, HudText, Scene, TextAnchor};
pub use vertex::Vertex;
