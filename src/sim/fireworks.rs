//! Fireworks particle system
//!
//! Rockets launch from the bottom edge, decelerate under gravity and burst at
//! their apex into a ring of particles that fade out under friction.

use glam::Vec2;
use rand::Rng;

use super::{SimRng, Viewport};
use crate::tuning::FireworksTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rocket {
    pub pos: Vec2,
    pub vel: Vec2,
    pub hue: f32,
    pub exploded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub hue: f32,
    /// 1.0 at birth, removed at or below zero
    pub life: f32,
    pub decay: f32,
}

#[derive(Debug, Clone)]
pub struct Fireworks {
    pub rockets: Vec<Rocket>,
    pub particles: Vec<Particle>,
    viewport: Viewport,
    tuning: FireworksTuning,
    max_particles: usize,
    /// Total bursts so far
    pub bursts: u32,
}

impl Fireworks {
    pub fn new(viewport: Viewport, tuning: FireworksTuning, max_particles: usize) -> Self {
        Self {
            rockets: Vec::new(),
            particles: Vec::with_capacity(max_particles),
            viewport,
            tuning,
            max_particles: max_particles.max(1),
            bursts: 0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn tuning(&self) -> &FireworksTuning {
        &self.tuning
    }

    /// Launch a rocket from a random point on the bottom edge
    pub fn launch_random(&mut self, rng: &mut SimRng) {
        let x = rng.random::<f32>() * self.viewport.width;
        let drift = (rng.random::<f32>() - 0.5) * 2.0 * self.tuning.rocket_drift;
        self.launch(x, drift, rng);
    }

    /// Launch a rocket under the pointer, leaning away from the center
    pub fn launch_at(&mut self, x: f32, rng: &mut SimRng) {
        let drift = (x - self.viewport.width / 2.0) / self.tuning.aim_divisor;
        self.launch(x, drift, rng);
    }

    fn launch(&mut self, x: f32, drift: f32, rng: &mut SimRng) {
        if self.rockets.len() >= self.tuning.max_rockets {
            return;
        }
        let lift = rng.random::<f32>() * self.tuning.rocket_lift_span + self.tuning.rocket_lift_min;
        self.rockets.push(Rocket {
            pos: Vec2::new(x, self.viewport.height),
            vel: Vec2::new(drift, -lift),
            hue: rng.random::<f32>() * 360.0,
            exploded: false,
        });
    }

    /// Advance one tick: spawn, rockets, then particles
    pub fn tick(&mut self, rng: &mut SimRng) {
        let chance = self.tuning.spawn_chance.clamp(0.0, 1.0);
        if rng.random_bool(chance) {
            self.launch_random(rng);
        }

        let gravity = self.tuning.rocket_gravity;
        let mut bursts = Vec::new();
        for rocket in self.rockets.iter_mut() {
            let rising = rocket.vel.y < 0.0;
            rocket.pos += rocket.vel;
            rocket.vel.y += gravity;
            // Apex: vertical velocity crosses from negative to non-negative
            if rising && rocket.vel.y >= 0.0 {
                rocket.exploded = true;
                bursts.push((rocket.pos, rocket.hue));
            }
        }
        self.rockets.retain(|r| !r.exploded);
        for (pos, hue) in bursts {
            self.explode(pos, hue, rng);
        }

        let friction = self.tuning.friction;
        let particle_gravity = self.tuning.particle_gravity;
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel;
            particle.vel.y += particle_gravity;
            particle.vel *= friction;
            particle.life -= particle.decay;
        }
        // Remove dead particles
        self.particles.retain(|p| p.life > 0.0);
    }

    fn explode(&mut self, pos: Vec2, hue: f32, rng: &mut SimRng) {
        self.bursts += 1;
        let count = self.tuning.burst_size.min(self.max_particles);

        // Remove oldest particles to make room
        let overflow = (self.particles.len() + count).saturating_sub(self.max_particles);
        if overflow > 0 {
            self.particles.drain(..overflow);
        }

        for _ in 0..count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed =
                rng.random::<f32>() * self.tuning.particle_speed_span + self.tuning.particle_speed_min;
            self.particles.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * speed,
                hue,
                life: 1.0,
                decay: rng.random::<f32>() * self.tuning.decay_span + self.tuning.decay_min,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rockets.is_empty() && self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::seeded_rng;
    use proptest::prelude::*;

    fn quiet() -> FireworksTuning {
        FireworksTuning {
            spawn_chance: 0.0,
            ..FireworksTuning::default()
        }
    }

    #[test]
    fn test_rocket_bursts_at_apex() {
        let mut rng = seeded_rng(1);
        let mut fx = Fireworks::new(Viewport::new(800.0, 600.0), quiet(), 1600);
        fx.launch_at(400.0, &mut rng);
        let lift = -fx.rockets[0].vel.y;

        let mut ticks = 0;
        while !fx.rockets.is_empty() {
            fx.tick(&mut rng);
            ticks += 1;
            assert!(ticks < 200);
        }
        // vy reaches zero after lift / gravity ticks (give or take float rounding)
        let expected = (lift / 0.2).ceil() as i64;
        assert!((ticks as i64 - expected).abs() <= 1);
        assert_eq!(fx.bursts, 1);
        assert_eq!(fx.particles.len(), 80);
    }

    #[test]
    fn test_launch_at_leans_from_center() {
        let mut rng = seeded_rng(2);
        let mut fx = Fireworks::new(Viewport::new(800.0, 600.0), quiet(), 1600);
        fx.launch_at(600.0, &mut rng);
        fx.launch_at(200.0, &mut rng);
        assert_eq!(fx.rockets[0].vel.x, 2.0);
        assert_eq!(fx.rockets[1].vel.x, -2.0);
        assert_eq!(fx.rockets[0].pos.y, 600.0);
    }

    #[test]
    fn test_particles_die_out() {
        let mut rng = seeded_rng(3);
        let mut fx = Fireworks::new(Viewport::new(800.0, 600.0), quiet(), 1600);
        fx.launch_at(400.0, &mut rng);
        // Slowest decay is 0.01/tick: everything gone within ~200 ticks of the burst
        for _ in 0..300 {
            fx.tick(&mut rng);
        }
        assert!(fx.is_empty());
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut rng = seeded_rng(4);
        let mut fx = Fireworks::new(Viewport::new(800.0, 600.0), quiet(), 100);
        fx.explode(Vec2::new(100.0, 100.0), 10.0, &mut rng);
        fx.explode(Vec2::new(500.0, 100.0), 200.0, &mut rng);
        assert_eq!(fx.particles.len(), 100);
        // The newest burst survives intact
        assert_eq!(fx.particles.iter().filter(|p| p.hue == 200.0).count(), 80);
    }

    #[test]
    fn test_rocket_cap() {
        let mut rng = seeded_rng(5);
        let mut fx = Fireworks::new(Viewport::new(800.0, 600.0), quiet(), 1600);
        for _ in 0..100 {
            fx.launch_at(400.0, &mut rng);
        }
        assert_eq!(fx.rockets.len(), 32);
    }

    #[test]
    fn test_spawn_rate_is_roughly_five_percent() {
        let mut rng = seeded_rng(6);
        let mut fx = Fireworks::new(
            Viewport::new(800.0, 600.0),
            FireworksTuning::default(),
            100_000,
        );
        for _ in 0..2000 {
            fx.tick(&mut rng);
        }
        let launched = fx.bursts as usize + fx.rockets.len();
        assert!(launched > 60 && launched < 150, "launched {launched}");
    }

    proptest! {
        #[test]
        fn prop_particle_count_capped(seed in any::<u64>(), ticks in 1usize..400) {
            let mut rng = seeded_rng(seed);
            let mut fx = Fireworks::new(
                Viewport::new(640.0, 480.0),
                FireworksTuning { spawn_chance: 0.2, ..FireworksTuning::default() },
                640,
            );
            for _ in 0..ticks {
                fx.tick(&mut rng);
                prop_assert!(fx.particles.len() <= 640);
                prop_assert!(fx.rockets.len() <= 32);
                prop_assert!(fx.particles.iter().all(|p| p.life > 0.0 && p.life <= 1.0));
            }
        }

        #[test]
        fn prop_life_monotonic_and_dead_removed(
            seed in any::<u64>(),
            xs in proptest::collection::vec(0.0f32..640.0, 1..6),
        ) {
            let mut rng = seeded_rng(seed);
            let mut fx = Fireworks::new(Viewport::new(640.0, 480.0), quiet(), 1600);
            for x in xs {
                fx.launch_at(x, &mut rng);
            }
            while !fx.rockets.is_empty() {
                fx.tick(&mut rng);
            }

            while !fx.particles.is_empty() {
                let expected: Vec<f32> = fx
                    .particles
                    .iter()
                    .map(|p| p.life - p.decay)
                    .filter(|life| *life > 0.0)
                    .collect();
                let before: Vec<f32> = fx.particles.iter().map(|p| p.life).collect();
                fx.tick(&mut rng);
                let after: Vec<f32> = fx.particles.iter().map(|p| p.life).collect();
                prop_assert_eq!(&after, &expected);
                prop_assert!(after.len() <= before.len());
            }
        }
    }
}
