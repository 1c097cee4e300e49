//! Deterministic simulation module
//!
//! All kernel physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to `tick` = one 60 Hz step)
//! - RNG is passed in, never global
//! - No rendering, timer or platform dependencies

pub mod collision;
pub mod fireworks;
pub mod pong;
pub mod starfield;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

pub use collision::{Contact, PaddleBand, WallContact};
pub use fireworks::{Fireworks, Particle, Rocket};
pub use pong::{Ball, PongEvent, PongInput, PongOutcome, PongPhase, PongState, Side};
pub use starfield::{Star, Starfield, Streak};

/// RNG used by every kernel
pub type SimRng = Pcg32;

/// Seeded RNG for reproducible runs
pub fn seeded_rng(seed: u64) -> SimRng {
    Pcg32::seed_from_u64(seed)
}

/// Overlay size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, p: glam::Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
