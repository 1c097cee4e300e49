//! Effect lifecycle: catalog, controller, kernels and fades

pub mod catalog;
pub mod controller;
pub mod counter;
pub mod host;
pub mod kernel;
pub mod kernels;
pub mod transition;

pub use catalog::{Catalog, DurationPolicy, EffectDescriptor, EffectKind};
pub use controller::{Chain, EffectController, EffectTicket};
pub use counter::InteractionCounter;
pub use host::{OverlayHost, SurfaceWatch};
pub use kernel::{CompletionReason, Kernel, KernelContext, KernelTimer, SimulationHandle};
pub use kernels::{FireworksKernel, PongKernel, WarpKernel};
pub use transition::{Easing, Transition};
