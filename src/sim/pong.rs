//! Retro pong
//!
//! Human paddle on the left, AI on the right. The AI follows the ball with
//! exponential smoothing so it can be beaten. Until the human moves, their
//! paddle is flown by a slightly lazier autopilot and the match is a demo.

use glam::Vec2;
use rand::Rng;

use super::collision::{PaddleBand, ball_band_contact, bounce_off_walls};
use super::{SimRng, Viewport};
use crate::tuning::PongTuning;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PongPhase {
    Playing,
    /// Terminal
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Ai,
}

/// How a finished match is labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PongOutcome {
    PlayerWon,
    PlayerLost,
    /// Nobody touched the controls
    DemoOver,
}

impl PongOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PongOutcome::PlayerWon => "YOU WIN!",
            PongOutcome::PlayerLost => "YOU LOSE!",
            PongOutcome::DemoOver => "DEMO OVER",
        }
    }
}

/// Things that happened during a tick, for the kernel to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PongEvent {
    PaddleHit(Side),
    WallBounce,
    /// `Side` scored a point
    Scored(Side),
    GameOver(PongOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// Per-tick input
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PongInput {
    /// Latest pointer y, if the pointer moved since the last tick
    pub pointer_y: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct PongState {
    pub ball: Ball,
    /// Top edge of the human paddle
    pub player_y: f32,
    /// Top edge of the AI paddle
    pub ai_y: f32,
    pub player_score: u8,
    pub ai_score: u8,
    pub phase: PongPhase,
    /// Human input has been seen at least once
    pub player_active: bool,
    pub viewport: Viewport,
    /// Events from the most recent tick
    pub events: Vec<PongEvent>,
    tuning: PongTuning,
}

impl PongState {
    pub fn new(viewport: Viewport, tuning: PongTuning) -> Self {
        let paddle_top = viewport.height / 2.0 - tuning.paddle_height / 2.0;
        Self {
            ball: Ball {
                pos: viewport.center(),
                vel: Vec2::splat(tuning.serve_speed_min),
                radius: tuning.ball_radius,
            },
            player_y: paddle_top,
            ai_y: paddle_top,
            player_score: 0,
            ai_score: 0,
            phase: PongPhase::Playing,
            player_active: false,
            viewport,
            events: Vec::new(),
            tuning,
        }
    }

    pub fn tuning(&self) -> &PongTuning {
        &self.tuning
    }

    pub fn player_band(&self) -> PaddleBand {
        PaddleBand {
            x_min: self.tuning.paddle_inset,
            x_max: self.tuning.paddle_inset + self.tuning.paddle_width,
            top: self.player_y,
            height: self.tuning.paddle_height,
        }
    }

    pub fn ai_band(&self) -> PaddleBand {
        let outer = self.viewport.width - self.tuning.paddle_inset;
        PaddleBand {
            x_min: outer - self.tuning.paddle_width,
            x_max: outer,
            top: self.ai_y,
            height: self.tuning.paddle_height,
        }
    }

    /// Result once the match is over
    pub fn outcome(&self) -> Option<PongOutcome> {
        if self.phase != PongPhase::GameOver {
            return None;
        }
        Some(if !self.player_active {
            PongOutcome::DemoOver
        } else if self.player_score >= self.tuning.win_score {
            PongOutcome::PlayerWon
        } else {
            PongOutcome::PlayerLost
        })
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.player_y = self.clamp_paddle(self.player_y);
        self.ai_y = self.clamp_paddle(self.ai_y);
    }

    /// Recenter the ball with a random direction and serve speed
    pub fn serve(&mut self, rng: &mut SimRng) {
        let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let speed =
            self.tuning.serve_speed_min + rng.random::<f32>() * self.tuning.serve_speed_span;
        let vertical = (rng.random::<f32>() - 0.5) * 2.0 * self.tuning.serve_vertical;
        self.ball.pos = self.viewport.center();
        self.ball.vel = Vec2::new(dir * speed, vertical);
    }

    fn clamp_paddle(&self, y: f32) -> f32 {
        y.clamp(0.0, (self.viewport.height - self.tuning.paddle_height).max(0.0))
    }

    fn track(&self, paddle_y: f32, smoothing: f32) -> f32 {
        let target = self.ball.pos.y - self.tuning.paddle_height / 2.0;
        self.clamp_paddle(paddle_y + (target - paddle_y) * smoothing)
    }
}

/// Advance the match by one tick
pub fn tick(state: &mut PongState, input: &PongInput, rng: &mut SimRng) {
    state.events.clear();
    if state.phase == PongPhase::GameOver {
        return;
    }

    if let Some(y) = input.pointer_y {
        state.player_active = true;
        state.player_y = state.clamp_paddle(y - state.tuning.paddle_height / 2.0);
    }

    // Ball
    let radius = state.ball.radius;
    let height = state.viewport.height;
    state.ball.pos += state.ball.vel;
    if bounce_off_walls(&mut state.ball.pos, &mut state.ball.vel, radius, height).is_some() {
        state.events.push(PongEvent::WallBounce);
    }

    // Paddles: only a ball moving toward a paddle can hit it
    if state.ball.vel.x < 0.0 {
        let band = state.player_band();
        if let Some(contact) = ball_band_contact(state.ball.pos, radius, &band) {
            state.ball.vel.x = state.ball.vel.x.abs() + state.tuning.hit_speedup;
            state.ball.pos.x = band.x_max + radius;
            state.ball.vel.y += contact.offset * state.tuning.edge_deflection;
            state.events.push(PongEvent::PaddleHit(Side::Player));
        }
    } else if state.ball.vel.x > 0.0 {
        let band = state.ai_band();
        if ball_band_contact(state.ball.pos, radius, &band).is_some() {
            state.ball.vel.x = -(state.ball.vel.x.abs() + state.tuning.hit_speedup);
            state.ball.pos.x = band.x_min - radius;
            state.events.push(PongEvent::PaddleHit(Side::Ai));
        }
    }

    // Scoring
    let margin = state.tuning.boundary_margin;
    let scorer = if state.ball.pos.x < -margin {
        Some(Side::Ai)
    } else if state.ball.pos.x > state.viewport.width + margin {
        Some(Side::Player)
    } else {
        None
    };
    if let Some(side) = scorer {
        match side {
            Side::Player => state.player_score += 1,
            Side::Ai => state.ai_score += 1,
        }
        log::debug!(
            "Pong: {:?} scored ({} - {})",
            side,
            state.player_score,
            state.ai_score
        );
        state.events.push(PongEvent::Scored(side));
        state.serve(rng);
    }

    // AI and autopilot track after the ball moves
    state.ai_y = state.track(state.ai_y, state.tuning.ai_smoothing);
    if !state.player_active {
        state.player_y = state.track(state.player_y, state.tuning.autopilot_smoothing);
    }

    if state.player_score.max(state.ai_score) >= state.tuning.win_score {
        state.phase = PongPhase::GameOver;
        if let Some(outcome) = state.outcome() {
            state.events.push(PongEvent::GameOver(outcome));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::seeded_rng;
    use proptest::prelude::*;

    fn new_state() -> PongState {
        PongState::new(Viewport::new(800.0, 600.0), PongTuning::default())
    }

    #[test]
    fn test_initial_layout() {
        let state = new_state();
        assert_eq!(state.ball.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.ball.vel, Vec2::new(6.0, 6.0));
        assert_eq!(state.player_y, 240.0);
        assert_eq!(state.ai_y, 240.0);
        assert_eq!(state.ai_band().x_min, 760.0);
        assert_eq!(state.player_band().x_max, 40.0);
    }

    #[test]
    fn test_player_hit_speeds_up_and_deflects() {
        let mut rng = seeded_rng(1);
        let mut state = new_state();
        state.player_active = true;
        state.player_y = 200.0;
        state.ball.pos = Vec2::new(60.0, 300.0);
        state.ball.vel = Vec2::new(-8.0, 0.0);

        tick(&mut state, &PongInput::default(), &mut rng);

        assert_eq!(state.ball.vel.x, 8.5);
        assert_eq!(state.ball.pos.x, 55.0);
        // Hit 40px below paddle center: (40 / 60) * 3
        assert!((state.ball.vel.y - 2.0).abs() < 1e-4);
        assert!(state.events.contains(&PongEvent::PaddleHit(Side::Player)));
    }

    #[test]
    fn test_ai_hit_reflects() {
        let mut rng = seeded_rng(2);
        let mut state = new_state();
        state.ai_y = 240.0;
        state.ball.pos = Vec2::new(740.0, 300.0);
        state.ball.vel = Vec2::new(7.0, 0.0);

        tick(&mut state, &PongInput::default(), &mut rng);

        assert_eq!(state.ball.vel.x, -7.5);
        assert_eq!(state.ball.pos.x, 745.0);
        assert_eq!(state.ball.vel.y, 0.0);
    }

    #[test]
    fn test_ball_moving_away_passes_through() {
        let mut rng = seeded_rng(3);
        let mut state = new_state();
        state.player_y = 240.0;
        state.ball.pos = Vec2::new(30.0, 300.0);
        state.ball.vel = Vec2::new(5.0, 0.0);
        tick(&mut state, &PongInput::default(), &mut rng);
        assert_eq!(state.ball.vel.x, 5.0);
    }

    #[test]
    fn test_scoring_recenters_ball() {
        let mut rng = seeded_rng(4);
        let mut state = new_state();
        state.player_y = 0.0;
        state.ball.pos = Vec2::new(-10.0, 500.0);
        state.ball.vel = Vec2::new(-15.0, 0.0);

        tick(&mut state, &PongInput::default(), &mut rng);

        assert_eq!(state.ai_score, 1);
        assert_eq!(state.player_score, 0);
        assert_eq!(state.ball.pos, Vec2::new(400.0, 300.0));
        let speed = state.ball.vel.x.abs();
        assert!((6.0..=8.0).contains(&speed));
        assert!(state.ball.vel.y.abs() <= 4.0);
    }

    #[test]
    fn test_pointer_input_activates_player() {
        let mut rng = seeded_rng(5);
        let mut state = new_state();
        tick(
            &mut state,
            &PongInput {
                pointer_y: Some(1000.0),
            },
            &mut rng,
        );
        assert!(state.player_active);
        assert_eq!(state.player_y, 480.0);
    }

    #[test]
    fn test_autopilot_follows_ball_when_idle() {
        let mut rng = seeded_rng(6);
        let mut state = new_state();
        // Paddle center lines up with the ball at top = 0
        state.ball.pos = Vec2::new(400.0, 60.0);
        state.ball.vel = Vec2::ZERO;
        for _ in 0..200 {
            tick(&mut state, &PongInput::default(), &mut rng);
        }
        assert!(state.player_y < 1.0);
        assert!(state.ai_y < 1.0);
    }

    #[test]
    fn test_game_over_labels() {
        let mut rng = seeded_rng(7);

        let mut state = new_state();
        state.player_active = true;
        state.player_score = 2;
        state.ball.pos = Vec2::new(830.0, 300.0);
        state.ball.vel = Vec2::new(5.0, 0.0);
        state.ai_y = 0.0;
        tick(&mut state, &PongInput::default(), &mut rng);
        assert_eq!(state.phase, PongPhase::GameOver);
        assert_eq!(state.outcome(), Some(PongOutcome::PlayerWon));
        assert!(state
            .events
            .contains(&PongEvent::GameOver(PongOutcome::PlayerWon)));

        let mut demo = new_state();
        demo.ai_score = 3;
        tick(&mut demo, &PongInput::default(), &mut rng);
        assert_eq!(demo.outcome(), Some(PongOutcome::DemoOver));
        assert_eq!(PongOutcome::DemoOver.label(), "DEMO OVER");
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut rng = seeded_rng(8);
        let mut state = new_state();
        state.ai_score = 3;
        tick(&mut state, &PongInput::default(), &mut rng);
        let frozen = state.ball;
        for _ in 0..10 {
            tick(
                &mut state,
                &PongInput {
                    pointer_y: Some(10.0),
                },
                &mut rng,
            );
        }
        assert_eq!(state.phase, PongPhase::GameOver);
        assert_eq!(state.ball, frozen);
    }

    proptest! {
        #[test]
        fn prop_ball_stays_in_bounds_while_playing(
            seed in any::<u64>(),
            pointer in proptest::collection::vec(proptest::option::of(-100.0f32..700.0), 1..1500),
        ) {
            let mut rng = seeded_rng(seed);
            let mut state = new_state();
            for pointer_y in pointer {
                let before = (state.player_score, state.ai_score);
                tick(&mut state, &PongInput { pointer_y }, &mut rng);
                if state.phase == PongPhase::Playing {
                    prop_assert!(state.ball.pos.x >= -20.0 && state.ball.pos.x <= 820.0);
                }
                // Scores move by at most one per tick
                let gained = (state.player_score - before.0) + (state.ai_score - before.1);
                prop_assert!(gained <= 1);
                if gained == 1 {
                    prop_assert_eq!(state.ball.pos, Vec2::new(400.0, 300.0));
                    let speed = state.ball.vel.x.abs();
                    prop_assert!((6.0..=8.0).contains(&speed));
                }
            }
        }

        #[test]
        fn prop_game_over_iff_three_points(
            seed in any::<u64>(),
            ticks in 1usize..6000,
        ) {
            let mut rng = seeded_rng(seed);
            let mut state = new_state();
            let mut was_over = false;
            for _ in 0..ticks {
                tick(&mut state, &PongInput::default(), &mut rng);
                let over = state.phase == PongPhase::GameOver;
                prop_assert_eq!(over, state.player_score.max(state.ai_score) >= 3);
                prop_assert!(!was_over || over);
                was_over = over;
            }
        }
    }
}
