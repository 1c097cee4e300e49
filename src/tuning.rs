//! Data-driven effect balance
//!
//! Every number the kernels and the controller depend on lives here so a
//! host page can ship a JSON override without a rebuild. Missing fields keep
//! their defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effect::catalog;
use crate::error::{FxError, FxResult};

/// Warp-speed starfield constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpTuning {
    /// Depth a recycled star starts from (also the upper bound of any depth)
    pub max_depth: f32,
    /// Shallowest depth a freshly spawned star may have
    pub spawn_depth: f32,
    /// A star below this depth is recycled
    pub recycle_floor: f32,
    /// Projection focal constant
    pub focal: f32,
    pub cruise_speed: f32,
    pub boost_speed: f32,
    /// Fraction of the remaining speed gap closed each tick
    pub easing: f32,
    /// Coasting below this speed ends the effect
    pub stop_threshold: f32,
    /// Delay after release before coasting to a stop
    pub grace_ms: f64,
    /// Delay before coasting when nobody ever presses
    pub idle_grace_ms: f64,
    /// Streak width at zero depth (pixels)
    pub streak_width: f32,
    pub trail_alpha: f32,
    pub hue_min: f32,
    pub hue_span: f32,
}

impl Default for WarpTuning {
    fn default() -> Self {
        Self {
            max_depth: 2000.0,
            spawn_depth: 500.0,
            recycle_floor: 1.0,
            focal: 1000.0,
            cruise_speed: 2.0,
            boost_speed: 50.0,
            easing: 0.05,
            stop_threshold: 0.1,
            grace_ms: 2000.0,
            idle_grace_ms: 4000.0,
            streak_width: 4.0,
            trail_alpha: 0.3,
            hue_min: 200.0,
            hue_span: 60.0,
        }
    }
}

/// Fireworks constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksTuning {
    /// Chance per tick of launching a rocket
    pub spawn_chance: f64,
    pub rocket_gravity: f32,
    /// Horizontal drift range (±)
    pub rocket_drift: f32,
    pub rocket_lift_min: f32,
    pub rocket_lift_span: f32,
    pub burst_size: usize,
    pub particle_speed_min: f32,
    pub particle_speed_span: f32,
    pub particle_gravity: f32,
    /// Velocity multiplier applied each tick
    pub friction: f32,
    pub decay_min: f32,
    pub decay_span: f32,
    pub rocket_radius: f32,
    pub particle_radius: f32,
    pub duration_ms: f64,
    pub trail_alpha: f32,
    /// Pointer launches drift by (x - center) / aim_divisor
    pub aim_divisor: f32,
    pub max_rockets: usize,
}

impl Default for FireworksTuning {
    fn default() -> Self {
        Self {
            spawn_chance: 0.05,
            rocket_gravity: 0.2,
            rocket_drift: 2.0,
            rocket_lift_min: 12.0,
            rocket_lift_span: 5.0,
            burst_size: 80,
            particle_speed_min: 2.0,
            particle_speed_span: 6.0,
            particle_gravity: 0.1,
            friction: 0.95,
            decay_min: 0.01,
            decay_span: 0.015,
            rocket_radius: 3.0,
            particle_radius: 2.0,
            duration_ms: 8000.0,
            trail_alpha: 0.2,
            aim_divisor: 100.0,
            max_rockets: 32,
        }
    }
}

/// Retro pong constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PongTuning {
    pub ball_radius: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Gap between the screen edge and a paddle's outer face
    pub paddle_inset: f32,
    /// Added to |vx| on every paddle hit
    pub hit_speedup: f32,
    /// Vertical kick at the very edge of the player paddle
    pub edge_deflection: f32,
    pub serve_speed_min: f32,
    pub serve_speed_span: f32,
    /// Serve vertical speed range (±)
    pub serve_vertical: f32,
    /// How far past an edge the ball must travel to score
    pub boundary_margin: f32,
    pub ai_smoothing: f32,
    pub autopilot_smoothing: f32,
    pub win_score: u8,
    pub game_over_delay_ms: f64,
    pub inactivity_ms: f64,
    pub double_tap_ms: f64,
    /// Touches inside the top corners of this size pass through
    pub dismiss_corner: f32,
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            ball_radius: 15.0,
            paddle_width: 20.0,
            paddle_height: 120.0,
            paddle_inset: 20.0,
            hit_speedup: 0.5,
            edge_deflection: 3.0,
            serve_speed_min: 6.0,
            serve_speed_span: 2.0,
            serve_vertical: 4.0,
            boundary_margin: 20.0,
            ai_smoothing: 0.1,
            autopilot_smoothing: 0.09,
            win_score: 3,
            game_over_delay_ms: 3000.0,
            inactivity_ms: 10_000.0,
            double_tap_ms: 500.0,
            dismiss_corner: 80.0,
        }
    }
}

/// Lifecycle constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerTuning {
    /// Overlay fade in/out duration
    pub fade_ms: f64,
    /// Fallback duration for one-shot entries missing from `one_shot_durations`
    pub one_shot_ms: f64,
    /// Per-effect one-shot durations; an override replaces the whole table
    pub one_shot_durations: BTreeMap<String, f64>,
    pub interaction_limit: u32,
    pub interaction_limit_touch: u32,
    /// Gap after which the interaction count restarts
    pub interaction_reset_ms: f64,
    /// Lockout after the interaction sequence fires
    pub interaction_cooldown_ms: f64,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            fade_ms: 500.0,
            one_shot_ms: 4000.0,
            one_shot_durations: [
                (catalog::EMOJI_RAIN, 4000.0),
                (catalog::MATRIX_RAIN, 5000.0),
                (catalog::SPIN_MADNESS, 4000.0),
                (catalog::ASCII_TUX, 4500.0),
                (catalog::ASCII_WAIFU, 4500.0),
                (catalog::RETRO_TERMINAL, 4000.0),
                (catalog::SCREEN_MELT, 4000.0),
                (catalog::GRAVITY, 4000.0),
                (catalog::ELEMENT_EATER, 1200.0),
            ]
            .into_iter()
            .map(|(name, ms)| (name.to_string(), ms))
            .collect(),
            interaction_limit: 10,
            interaction_limit_touch: 5,
            interaction_reset_ms: 1000.0,
            interaction_cooldown_ms: 6000.0,
        }
    }
}

fn check(ok: bool, rule: &str) -> FxResult<()> {
    if ok {
        Ok(())
    } else {
        Err(FxError::InvalidTuning(rule.to_string()))
    }
}

fn unit(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

impl WarpTuning {
    fn validate(&self) -> FxResult<()> {
        check(self.max_depth > 0.0, "warp.max_depth must be positive")?;
        check(
            self.spawn_depth > 0.0 && self.spawn_depth <= self.max_depth,
            "warp.spawn_depth must lie in (0, max_depth]",
        )?;
        check(
            self.recycle_floor > 0.0 && self.recycle_floor < self.spawn_depth,
            "warp.recycle_floor must lie in (0, spawn_depth)",
        )?;
        check(self.focal > 0.0, "warp.focal must be positive")?;
        check(
            self.cruise_speed >= 0.0 && self.boost_speed >= self.cruise_speed,
            "warp speeds must satisfy 0 <= cruise_speed <= boost_speed",
        )?;
        check(self.easing > 0.0 && self.easing <= 1.0, "warp.easing must lie in (0, 1]")?;
        check(self.stop_threshold > 0.0, "warp.stop_threshold must be positive")?;
        check(
            self.grace_ms >= 0.0 && self.idle_grace_ms >= 0.0,
            "warp grace delays must not be negative",
        )?;
        check(unit(self.trail_alpha), "warp.trail_alpha must lie in [0, 1]")
    }
}

impl FireworksTuning {
    fn validate(&self) -> FxResult<()> {
        check(
            (0.0..=1.0).contains(&self.spawn_chance),
            "fireworks.spawn_chance must lie in [0, 1]",
        )?;
        check(self.rocket_gravity > 0.0, "fireworks.rocket_gravity must be positive")?;
        check(self.rocket_lift_min > 0.0, "fireworks.rocket_lift_min must be positive")?;
        check(unit(self.friction), "fireworks.friction must lie in [0, 1]")?;
        check(
            self.decay_min > 0.0 && self.decay_span >= 0.0,
            "fireworks decay must be positive",
        )?;
        check(self.aim_divisor.abs() > 0.0, "fireworks.aim_divisor must not be zero")?;
        check(self.duration_ms > 0.0, "fireworks.duration_ms must be positive")?;
        check(unit(self.trail_alpha), "fireworks.trail_alpha must lie in [0, 1]")
    }
}

impl PongTuning {
    fn validate(&self) -> FxResult<()> {
        check(
            self.ball_radius > 0.0 && self.paddle_width > 0.0 && self.paddle_height > 0.0,
            "pong ball and paddle sizes must be positive",
        )?;
        check(self.serve_speed_min > 0.0, "pong.serve_speed_min must be positive")?;
        check(
            self.ai_smoothing > 0.0 && self.ai_smoothing <= 1.0,
            "pong.ai_smoothing must lie in (0, 1]",
        )?;
        check(
            self.autopilot_smoothing > 0.0 && self.autopilot_smoothing <= 1.0,
            "pong.autopilot_smoothing must lie in (0, 1]",
        )?;
        check(self.win_score >= 1, "pong.win_score must be at least 1")?;
        check(
            self.game_over_delay_ms >= 0.0 && self.inactivity_ms > 0.0,
            "pong delays must be positive",
        )
    }
}

impl ControllerTuning {
    fn validate(&self) -> FxResult<()> {
        check(self.fade_ms >= 0.0, "controller.fade_ms must not be negative")?;
        check(
            self.one_shot_ms > 0.0 && self.one_shot_durations.values().all(|ms| *ms > 0.0),
            "one-shot durations must be positive",
        )?;
        check(
            self.interaction_limit >= 1 && self.interaction_limit_touch >= 1,
            "interaction limits must be at least 1",
        )?;
        check(
            self.interaction_reset_ms >= 0.0 && self.interaction_cooldown_ms >= 0.0,
            "interaction windows must not be negative",
        )
    }

    /// How long the one-shot `name` stays up before fading out
    pub fn one_shot_duration(&self, name: &str) -> f64 {
        self.one_shot_durations
            .get(name)
            .copied()
            .unwrap_or(self.one_shot_ms)
    }
}

/// All effect tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub warp: WarpTuning,
    pub fireworks: FireworksTuning,
    pub pong: PongTuning,
    pub controller: ControllerTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and check its ranges
    pub fn from_json(json: &str) -> FxResult<Self> {
        let tuning: Self =
            serde_json::from_str(json).map_err(|e| FxError::InvalidTuning(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> FxResult<()> {
        self.warp.validate()?;
        self.fireworks.validate()?;
        self.pong.validate()?;
        self.controller.validate()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
