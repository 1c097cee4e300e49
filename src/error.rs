//! Error types
//!
//! None of these ever reach the end user: the controller logs them and the
//! effect either does not start or ends early.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FxError {
    /// The designated overlay mountpoint is not in the document
    #[error("mountpoint '{0}' not found")]
    MissingMount(String),

    /// The overlay was removed from the visible tree by someone else
    #[error("overlay surface is detached")]
    Detached,

    /// No GPU adapter/device/surface for canvas effects
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// Tuning JSON failed to parse or holds out-of-range values
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// A host (DOM) call failed
    #[error("host call failed: {0}")]
    Host(String),
}

pub type FxResult<T> = Result<T, FxError>;
