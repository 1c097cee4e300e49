//! Warp-speed starfield
//!
//! A fixed pool of stars flies toward the viewer. Each tick every star's depth
//! shrinks by the current speed; a star that passes the recycle floor is
//! respawned at maximum depth in place. Speed eases toward a target that
//! input raises (hold) and lowers (release, then stop).

use glam::Vec2;
use rand::Rng;

use super::{SimRng, Viewport};
use crate::tuning::WarpTuning;

/// One star in view space: `pos` spans a cube twice the viewport wide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub pos: Vec2,
    pub z: f32,
    /// Depth on the previous tick (streak tail)
    pub pz: f32,
    pub hue: f32,
}

/// Screen-space motion-blur line for one star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Streak {
    pub from: Vec2,
    pub to: Vec2,
    pub width: f32,
    pub alpha: f32,
    pub hue: f32,
}

#[derive(Debug, Clone)]
pub struct Starfield {
    stars: Vec<Star>,
    pub speed: f32,
    pub target_speed: f32,
    /// Coasting to a stop; finishes once speed drops under the threshold
    pub stopping: bool,
    viewport: Viewport,
    tuning: WarpTuning,
}

impl Starfield {
    pub fn new(count: usize, viewport: Viewport, tuning: WarpTuning, rng: &mut SimRng) -> Self {
        let mut field = Self {
            stars: Vec::with_capacity(count),
            speed: tuning.cruise_speed,
            target_speed: tuning.cruise_speed,
            stopping: false,
            viewport,
            tuning,
        };
        let (near, far) = field.depth_range();
        for _ in 0..count {
            let z = rng.random_range(near..=far);
            let star = Star {
                pos: field.random_position(rng),
                z,
                pz: z,
                hue: field.random_hue(rng),
            };
            field.stars.push(star);
        }
        field
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Hold: accelerate toward boost speed and abandon any pending stop
    pub fn press(&mut self) {
        self.target_speed = self.tuning.boost_speed;
        self.stopping = false;
    }

    /// Release: fall back to cruise speed
    pub fn release(&mut self) {
        self.target_speed = self.tuning.cruise_speed;
    }

    /// Grace expired: coast down to zero
    pub fn begin_stop(&mut self) {
        self.stopping = true;
        self.target_speed = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        self.stopping && self.speed < self.tuning.stop_threshold
    }

    /// Advance one tick. Returns false once the coast-to-stop has finished.
    pub fn tick(&mut self, rng: &mut SimRng) -> bool {
        self.speed += (self.target_speed - self.speed) * self.tuning.easing;

        let floor = self.tuning.recycle_floor.max(f32::MIN_POSITIVE);
        let max_depth = self.tuning.max_depth;
        for i in 0..self.stars.len() {
            let star = &mut self.stars[i];
            star.pz = star.z;
            star.z -= self.speed;
            if star.z < floor {
                let pos = random_position(self.viewport, rng);
                let hue = self.tuning.hue_min + rng.random::<f32>() * self.tuning.hue_span;
                self.stars[i] = Star {
                    pos,
                    z: max_depth,
                    pz: max_depth,
                    hue,
                };
            }
        }

        !self.is_finished()
    }

    /// Project every on-screen star to a streak. Pure: never touches state.
    pub fn streaks(&self) -> impl Iterator<Item = Streak> + '_ {
        let center = self.viewport.center();
        let focal = self.tuning.focal;
        let max_depth = self.tuning.max_depth;
        let viewport = self.viewport;

        self.stars.iter().filter_map(move |star| {
            let to = center + star.pos / star.z * focal;
            if !viewport.contains(to) {
                return None;
            }
            let from = center + star.pos / star.pz * focal;
            let nearness = (1.0 - star.z / max_depth).clamp(0.0, 1.0);
            Some(Streak {
                from,
                to,
                width: nearness * self.tuning.streak_width,
                alpha: nearness,
                hue: star.hue,
            })
        })
    }

    fn depth_range(&self) -> (f32, f32) {
        let far = self.tuning.max_depth;
        let near = self
            .tuning
            .spawn_depth
            .max(self.tuning.recycle_floor)
            .max(f32::MIN_POSITIVE)
            .min(far);
        (near, far)
    }

    fn random_position(&self, rng: &mut SimRng) -> Vec2 {
        random_position(self.viewport, rng)
    }

    fn random_hue(&self, rng: &mut SimRng) -> f32 {
        self.tuning.hue_min + rng.random::<f32>() * self.tuning.hue_span
    }
}

fn random_position(viewport: Viewport, rng: &mut SimRng) -> Vec2 {
    Vec2::new(
        (rng.random::<f32>() - 0.5) * viewport.width * 2.0,
        (rng.random::<f32>() - 0.5) * viewport.height * 2.0,
    )
}
