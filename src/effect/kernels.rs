//! The three simulation kernels
//!
//! Each wraps a pure `sim` state and adds the lifecycle glue: which input it
//! captures, which timers it arms and how a frame is drawn.

use std::any::Any;

use glam::Vec2;

use super::catalog::{self, EffectDescriptor};
use super::kernel::{CompletionReason, Kernel, KernelContext, KernelTimer};
use crate::input::{InputAdapter, InputCapture, InputKind, InputSignal};
use crate::renderer::vertex::{colors, hsla, with_alpha};
use crate::renderer::{ClearMode, Scene, TextAnchor};
use crate::settings::Settings;
use crate::sim::pong::{self, PongEvent, PongInput, PongOutcome, PongPhase, PongState};
use crate::sim::{Fireworks, SimRng, Starfield, Viewport};
use crate::tuning::{PongTuning, Tuning, WarpTuning};

/// Build the kernel for a simulation entry; one-shot entries have none
pub fn build_kernel(
    desc: &EffectDescriptor,
    settings: &Settings,
    tuning: &Tuning,
    viewport: Viewport,
    rng: &mut SimRng,
) -> Option<Box<dyn Kernel>> {
    match desc.name {
        catalog::WARP_SPEED => Some(Box::new(WarpKernel::new(settings, tuning, viewport, rng))),
        catalog::FIREWORKS => Some(Box::new(FireworksKernel::new(settings, tuning, viewport))),
        catalog::RETRO_PONG => Some(Box::new(PongKernel::new(tuning, viewport))),
        _ => None,
    }
}

/// Hold-to-accelerate starfield
pub struct WarpKernel {
    field: Starfield,
    tuning: WarpTuning,
    trails: bool,
    show_hint: bool,
}

pub const WARP_HINT: &str = "HOLD TO WARP // RELEASE TO EXIT";

impl WarpKernel {
    pub fn new(settings: &Settings, tuning: &Tuning, viewport: Viewport, rng: &mut SimRng) -> Self {
        Self {
            field: Starfield::new(
                settings.quality.star_count(),
                viewport,
                tuning.warp.clone(),
                rng,
            ),
            tuning: tuning.warp.clone(),
            trails: settings.effective_trails(),
            show_hint: settings.show_hints,
        }
    }

    pub fn starfield(&self) -> &Starfield {
        &self.field
    }
}

impl Kernel for WarpKernel {
    fn input_capture(&self) -> InputCapture {
        InputCapture {
            presses: true,
            prevent_gestures: true,
            ..InputCapture::NONE
        }
    }

    fn start(&mut self, ctx: &mut KernelContext) {
        // Nobody may ever press: coast out eventually anyway
        ctx.schedule(KernelTimer::Grace, self.tuning.idle_grace_ms);
    }

    fn input(&mut self, signal: InputSignal, ctx: &mut KernelContext) {
        match signal.kind {
            InputKind::Start => {
                self.field.press();
                ctx.cancel(KernelTimer::Grace);
            }
            InputKind::End => {
                self.field.release();
                ctx.schedule(KernelTimer::Grace, self.tuning.grace_ms);
            }
            InputKind::Move => {}
        }
    }

    fn timer(&mut self, timer: KernelTimer, _ctx: &mut KernelContext) {
        if timer == KernelTimer::Grace {
            log::debug!("Warp: grace expired, coasting to a stop");
            self.field.begin_stop();
        }
    }

    fn step(&mut self, ctx: &mut KernelContext) -> bool {
        if self.field.tick(ctx.rng) {
            return true;
        }
        ctx.complete(CompletionReason::Finished);
        false
    }

    fn resize(&mut self, viewport: Viewport) {
        self.field.resize(viewport);
    }

    fn draw(&self, scene: &mut Scene) {
        scene.clear = if self.trails {
            ClearMode::Trail {
                alpha: self.tuning.trail_alpha,
            }
        } else {
            ClearMode::Hard
        };
        for streak in self.field.streaks() {
            let color = hsla(streak.hue, 1.0, 0.8, streak.alpha);
            scene.line(streak.from, streak.to, streak.width, color);
        }
        if self.show_hint {
            scene.text(WARP_HINT, Vec2::new(scene.viewport.width / 2.0, 40.0), 14.0, colors::HINT)
                .anchor = TextAnchor::Bottom;
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Rockets and bursts for a fixed duration
pub struct FireworksKernel {
    fx: Fireworks,
    trails: bool,
}

impl FireworksKernel {
    pub fn new(settings: &Settings, tuning: &Tuning, viewport: Viewport) -> Self {
        Self {
            fx: Fireworks::new(
                viewport,
                tuning.fireworks.clone(),
                settings.quality.max_particles(),
            ),
            trails: settings.effective_trails(),
        }
    }

    pub fn fireworks(&self) -> &Fireworks {
        &self.fx
    }
}

impl Kernel for FireworksKernel {
    fn input_capture(&self) -> InputCapture {
        InputCapture {
            presses: true,
            ..InputCapture::NONE
        }
    }

    fn start(&mut self, ctx: &mut KernelContext) {
        ctx.schedule(KernelTimer::Duration, self.fx.tuning().duration_ms);
    }

    fn input(&mut self, signal: InputSignal, ctx: &mut KernelContext) {
        if signal.kind == InputKind::Start {
            self.fx.launch_at(signal.pos.x, ctx.rng);
        }
    }

    fn timer(&mut self, timer: KernelTimer, ctx: &mut KernelContext) {
        if timer == KernelTimer::Duration {
            ctx.complete(CompletionReason::Timeout);
        }
    }

    fn step(&mut self, ctx: &mut KernelContext) -> bool {
        // Keeps animating through the fade-out; the overlay removal cuts it
        self.fx.tick(ctx.rng);
        true
    }

    fn resize(&mut self, viewport: Viewport) {
        self.fx.resize(viewport);
    }

    fn draw(&self, scene: &mut Scene) {
        let tuning = self.fx.tuning();
        scene.clear = if self.trails {
            ClearMode::Trail {
                alpha: tuning.trail_alpha,
            }
        } else {
            ClearMode::Hard
        };
        for rocket in &self.fx.rockets {
            scene.circle(rocket.pos, tuning.rocket_radius, hsla(rocket.hue, 1.0, 0.5, 1.0));
        }
        for particle in &self.fx.particles {
            let color = hsla(particle.hue, 1.0, 0.5, particle.life.clamp(0.0, 1.0));
            scene.circle(particle.pos, tuning.particle_radius, color);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Dark translucent table over the page
pub const PONG_BACKDROP_ALPHA: f32 = 0.85;

/// Human vs AI, first to the win score
pub struct PongKernel {
    state: PongState,
    tuning: PongTuning,
    /// Latest pointer y since the previous tick
    pending_y: Option<f32>,
}

impl PongKernel {
    pub fn new(tuning: &Tuning, viewport: Viewport) -> Self {
        Self {
            state: PongState::new(viewport, tuning.pong.clone()),
            tuning: tuning.pong.clone(),
            pending_y: None,
        }
    }

    pub fn state(&self) -> &PongState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PongState {
        &mut self.state
    }

    fn draw_table(&self, scene: &mut Scene) {
        let s = &self.state;
        let w = s.viewport.width;

        scene.dashed_vertical(w / 2.0, 10.0, 15.0, colors::NET);
        scene.text(s.player_score.to_string(), Vec2::new(w / 4.0, 70.0), 100.0, colors::SCORE);
        scene.text(s.ai_score.to_string(), Vec2::new(w * 3.0 / 4.0, 70.0), 100.0, colors::SCORE);
        scene.text(
            format!("FIRST TO {} WINS", self.tuning.win_score),
            Vec2::new(w / 2.0, 50.0),
            20.0,
            colors::CAPTION,
        );

        scene.circle(s.ball.pos, s.ball.radius, colors::WHITE);

        let paddle = Vec2::new(self.tuning.paddle_width, self.tuning.paddle_height);
        let player = s.player_band();
        let ai = s.ai_band();
        scene.rect(Vec2::new(player.x_min, player.top), paddle, colors::PLAYER_PADDLE);
        scene.rect(Vec2::new(ai.x_min, ai.top), paddle, colors::AI_PADDLE);
    }

    fn draw_result(&self, scene: &mut Scene, outcome: PongOutcome) {
        let s = &self.state;
        let center = s.viewport.center();
        let color = match outcome {
            PongOutcome::PlayerWon => colors::WIN,
            PongOutcome::PlayerLost => colors::LOSE,
            PongOutcome::DemoOver => colors::DEMO,
        };
        scene
            .text(outcome.label(), center - Vec2::new(0.0, 20.0), 80.0, color)
            .bold = true;
        scene.text(
            format!("{} - {}", s.player_score, s.ai_score),
            center + Vec2::new(0.0, 60.0),
            30.0,
            colors::WHITE,
        );
    }
}

impl Kernel for PongKernel {
    fn input_capture(&self) -> InputCapture {
        InputCapture {
            moves: true,
            prevent_gestures: true,
            double_tap_dismiss: true,
            ..InputCapture::NONE
        }
    }

    fn input_adapter(&self) -> InputAdapter {
        InputAdapter::new(self.input_capture())
            .with_dismiss_corner(self.tuning.dismiss_corner)
            .with_double_tap(self.tuning.double_tap_ms)
    }

    fn start(&mut self, ctx: &mut KernelContext) {
        ctx.schedule(KernelTimer::Inactivity, self.tuning.inactivity_ms);
    }

    fn input(&mut self, signal: InputSignal, ctx: &mut KernelContext) {
        if signal.kind != InputKind::Move || self.state.phase != PongPhase::Playing {
            return;
        }
        self.pending_y = Some(signal.pos.y);
        ctx.schedule(KernelTimer::Inactivity, self.tuning.inactivity_ms);
    }

    fn timer(&mut self, timer: KernelTimer, ctx: &mut KernelContext) {
        match timer {
            KernelTimer::Inactivity if self.state.phase == PongPhase::Playing => {
                log::debug!("Pong: no input for {} ms, closing", self.tuning.inactivity_ms);
                ctx.complete(CompletionReason::Timeout);
            }
            KernelTimer::GameOverExit => ctx.complete(CompletionReason::Finished),
            _ => {}
        }
    }

    fn step(&mut self, ctx: &mut KernelContext) -> bool {
        let input = PongInput {
            pointer_y: self.pending_y.take(),
        };
        pong::tick(&mut self.state, &input, ctx.rng);

        for event in &self.state.events {
            if let PongEvent::GameOver(outcome) = event {
                log::info!(
                    "Pong over: {} ({} - {})",
                    outcome.label(),
                    self.state.player_score,
                    self.state.ai_score
                );
                ctx.cancel(KernelTimer::Inactivity);
                ctx.schedule(KernelTimer::GameOverExit, self.tuning.game_over_delay_ms);
            }
        }
        true
    }

    fn resize(&mut self, viewport: Viewport) {
        self.state.resize(viewport);
    }

    fn draw(&self, scene: &mut Scene) {
        scene.backdrop = with_alpha(colors::BACKDROP, PONG_BACKDROP_ALPHA);
        scene.clear = ClearMode::Hard;
        match self.state.outcome() {
            Some(outcome) => self.draw_result(scene, outcome),
            None => self.draw_table(scene),
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::kernel::{Completion, EffectTimer, TimerQueue};
    use crate::input::PointerSource;
    use crate::sim::seeded_rng;

    const VIEW: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    struct Harness {
        rng: SimRng,
        timers: TimerQueue,
        completion: Completion,
        now: f64,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                rng: seeded_rng(42),
                timers: TimerQueue::new(),
                completion: Completion::default(),
                now: 0.0,
            }
        }

        fn with<R>(&mut self, f: impl FnOnce(&mut KernelContext) -> R) -> R {
            let mut ctx = KernelContext::new(
                self.now,
                &mut self.rng,
                &mut self.timers,
                1,
                &mut self.completion,
            );
            f(&mut ctx)
        }

        /// Advance one 60 Hz tick, firing due timers first
        fn tick(&mut self, kernel: &mut dyn Kernel) -> bool {
            self.now += crate::consts::SIM_DT_MS;
            while let Some((_, (_, timer))) = self.timers.pop_due(self.now) {
                if let EffectTimer::Kernel(t) = timer {
                    self.with(|ctx| kernel.timer(t, ctx));
                }
            }
            self.with(|ctx| kernel.step(ctx))
        }
    }

    fn signal(kind: InputKind, x: f32, y: f32) -> InputSignal {
        InputSignal {
            pos: Vec2::new(x, y),
            kind,
            source: PointerSource::Mouse,
        }
    }

    #[test]
    fn test_build_kernel_only_for_simulations() {
        let mut rng = seeded_rng(1);
        let settings = Settings::default();
        let tuning = Tuning::default();
        for desc in catalog::CATALOG {
            let kernel = build_kernel(desc, &settings, &tuning, VIEW, &mut rng);
            assert_eq!(kernel.is_some(), desc.is_simulation(), "{}", desc.name);
        }
    }

    #[test]
    fn test_warp_untouched_coasts_out() {
        let mut h = Harness::new();
        let mut kernel = WarpKernel::new(&Settings::default(), &Tuning::default(), VIEW, &mut h.rng);
        h.with(|ctx| kernel.start(ctx));

        let mut ticks = 0;
        while h.tick(&mut kernel) {
            ticks += 1;
            assert!(ticks < 60 * 10);
        }
        // 4 s idle grace, then about a second of coasting
        assert!(h.now > 4000.0 && h.now < 5500.0);
        assert_eq!(h.completion.reason(), Some(CompletionReason::Finished));
    }

    #[test]
    fn test_warp_repress_cancels_grace() {
        let mut h = Harness::new();
        let mut kernel = WarpKernel::new(&Settings::default(), &Tuning::default(), VIEW, &mut h.rng);
        h.with(|ctx| kernel.start(ctx));
        h.with(|ctx| kernel.input(signal(InputKind::Start, 0.0, 0.0), ctx));
        assert!(h.timers.is_empty());

        h.with(|ctx| kernel.input(signal(InputKind::End, 0.0, 0.0), ctx));
        for _ in 0..60 {
            h.tick(&mut kernel);
        }
        h.with(|ctx| kernel.input(signal(InputKind::Start, 0.0, 0.0), ctx));
        for _ in 0..300 {
            assert!(h.tick(&mut kernel));
        }
        assert!(!kernel.starfield().stopping);
    }

    #[test]
    fn test_warp_draw_has_hint_and_trails() {
        let mut rng = seeded_rng(3);
        let kernel = WarpKernel::new(&Settings::default(), &Tuning::default(), VIEW, &mut rng);
        let mut scene = Scene::new(VIEW);
        kernel.draw(&mut scene);
        assert_eq!(scene.clear, ClearMode::Trail { alpha: 0.3 });
        assert!(scene.hud_text().any(|t| t == WARP_HINT));
    }

    #[test]
    fn test_pong_table_darkens_page() {
        let kernel = PongKernel::new(&Tuning::default(), VIEW);
        let mut scene = Scene::new(VIEW);
        kernel.draw(&mut scene);
        assert_eq!(scene.clear, ClearMode::Hard);
        assert_eq!(scene.backdrop, [0.0, 0.0, 0.0, 0.85]);
    }

    #[test]
    fn test_fireworks_times_out() {
        let mut h = Harness::new();
        let mut kernel = FireworksKernel::new(&Settings::default(), &Tuning::default(), VIEW);
        h.with(|ctx| kernel.start(ctx));
        while !h.completion.is_complete() {
            assert!(h.tick(&mut kernel));
            assert!(h.now < 9000.0);
        }
        assert!((h.now - 8000.0).abs() < 20.0);
        assert_eq!(h.completion.reason(), Some(CompletionReason::Timeout));
    }

    #[test]
    fn test_fireworks_click_launches_toward_pointer() {
        let mut h = Harness::new();
        let mut kernel = FireworksKernel::new(&Settings::default(), &Tuning::default(), VIEW);
        h.with(|ctx| kernel.input(signal(InputKind::Start, 700.0, 300.0), ctx));
        let rocket = kernel.fireworks().rockets[0];
        assert_eq!(rocket.pos, Vec2::new(700.0, 600.0));
        assert_eq!(rocket.vel.x, 3.0);
    }

    #[test]
    fn test_pong_inactivity_restarts_on_move() {
        let mut h = Harness::new();
        let mut kernel = PongKernel::new(&Tuning::default(), VIEW);
        h.with(|ctx| kernel.start(ctx));

        // Move every 5 s for 20 s: never times out
        for i in 0..(20 * 60) {
            if i % 300 == 0 {
                h.with(|ctx| kernel.input(signal(InputKind::Move, 10.0, 300.0), ctx));
            }
            h.tick(&mut kernel);
            if kernel.state().phase == PongPhase::GameOver {
                break;
            }
        }
        assert_ne!(h.completion.reason(), Some(CompletionReason::Timeout));
    }

    #[test]
    fn test_pong_idle_times_out() {
        let mut h = Harness::new();
        let mut kernel = PongKernel::new(&Tuning::default(), VIEW);
        h.with(|ctx| kernel.start(ctx));
        while !h.completion.is_complete() {
            h.tick(&mut kernel);
            assert!(h.now < 20_000.0);
        }
        // Either the demo ended first or the idle timer fired at 10 s
        match h.completion.reason() {
            Some(CompletionReason::Timeout) => assert!((h.now - 10_000.0).abs() < 20.0),
            Some(CompletionReason::Finished) => {
                assert_eq!(kernel.state().outcome(), Some(PongOutcome::DemoOver))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_pong_game_over_exits_after_delay() {
        let mut h = Harness::new();
        let mut kernel = PongKernel::new(&Tuning::default(), VIEW);
        h.with(|ctx| kernel.start(ctx));
        h.with(|ctx| kernel.input(signal(InputKind::Move, 10.0, 300.0), ctx));
        {
            let state = kernel.state_mut();
            state.player_score = 2;
            state.ai_y = 0.0;
            state.ball.pos = Vec2::new(810.0, 500.0);
            state.ball.vel = Vec2::new(15.0, 0.0);
        }
        h.tick(&mut kernel);
        let over_at = h.now;
        assert_eq!(kernel.state().outcome(), Some(PongOutcome::PlayerWon));

        while !h.completion.is_complete() {
            h.tick(&mut kernel);
            assert!(h.now < over_at + 4000.0);
        }
        assert!((h.now - over_at - 3000.0).abs() < 20.0);

        let mut scene = Scene::new(VIEW);
        kernel.draw(&mut scene);
        assert!(scene.hud_text().any(|t| t == "YOU WIN!"));
        assert!(scene.hud_text().any(|t| t == "3 - 0"));
    }
}
