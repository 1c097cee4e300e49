//! Effect lifecycle
//!
//! One overlay at a time: resolve → mount → fade in → run → complete → fade
//! out → teardown. Every path out of an effect (kernel finished, deadline,
//! dismissal, external stop, detached surface, a newer trigger) ends in
//! `release`, which runs exactly once per effect.

use std::any::Any;

use super::catalog::{self, Catalog, EffectDescriptor};
use super::counter::InteractionCounter;
use super::host::{OverlayHost, SurfaceWatch};
use super::kernel::{Completion, CompletionReason, EffectTimer, Kernel, KernelContext, TimerQueue};
use super::kernels::build_kernel;
use super::transition::Transition;
use crate::clock::{FrameDriver, SimulationHandle};
use crate::input::{InputAdapter, InputCapture, RawInput};
use crate::renderer::Scene;
use crate::settings::{ContentMode, Settings};
use crate::sim::{SimRng, Viewport, seeded_rng};
use crate::tuning::Tuning;

/// Returned by a successful trigger
#[derive(Debug, Clone)]
pub struct EffectTicket {
    pub generation: u64,
    pub name: &'static str,
    handle: SimulationHandle,
}

impl EffectTicket {
    pub fn handle(&self) -> SimulationHandle {
        self.handle.clone()
    }

    /// End the effect early (it still fades out). Idempotent.
    pub fn stop(&self) {
        self.handle.stop();
    }
}

/// Lets a completion callback queue the next effect
#[derive(Debug, Default)]
pub struct Chain {
    next: Option<Option<String>>,
}

impl Chain {
    /// Run `name` (or a random pick) once the current overlay is gone
    pub fn trigger(&mut self, name: Option<&str>) {
        self.next = Some(name.map(str::to_owned));
    }

    pub fn is_requested(&self) -> bool {
        self.next.is_some()
    }
}

type OnComplete = Box<dyn FnOnce(&mut Chain)>;

struct ActiveEffect {
    desc: &'static EffectDescriptor,
    generation: u64,
    kernel: Option<Box<dyn Kernel>>,
    adapter: InputAdapter,
    input_attached: bool,
    driver: FrameDriver,
    watch: SurfaceWatch,
    completion: Completion,
    fade: Transition,
    fading_out: bool,
    /// False once the kernel reports nothing left to simulate
    simulating: bool,
    on_complete: Option<OnComplete>,
    scene: Scene,
}

pub struct EffectController<H: OverlayHost> {
    host: H,
    settings: Settings,
    tuning: Tuning,
    rng: SimRng,
    timers: TimerQueue,
    active: Option<ActiveEffect>,
    generation: u64,
    now_ms: f64,
}

impl<H: OverlayHost> EffectController<H> {
    pub fn new(host: H, settings: Settings, tuning: Tuning, seed: u64) -> Self {
        Self {
            host,
            settings,
            tuning,
            rng: seeded_rng(seed),
            timers: TimerQueue::new(),
            active: None,
            generation: 0,
            now_ms: 0.0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Takes effect from the next trigger
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn set_content_mode(&mut self, mode: ContentMode) {
        self.settings.content_mode = mode;
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Move the controller clock forward. Time never runs backwards.
    pub fn advance_clock(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_name(&self) -> Option<&'static str> {
        self.active.as_ref().map(|e| e.desc.name)
    }

    /// Current overlay opacity, if an effect is mounted
    pub fn opacity(&self) -> Option<f32> {
        self.active.as_ref().map(|e| e.fade.sample(self.now_ms))
    }

    pub fn completion_reason(&self) -> Option<CompletionReason> {
        self.active.as_ref().and_then(|e| e.completion.reason())
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// The running kernel, if it is a `K`
    pub fn kernel_mut<K: Kernel + Any>(&mut self) -> Option<&mut K> {
        self.active
            .as_mut()?
            .kernel
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<K>()
    }

    /// Start `name`, or a random catalog entry when it is None or unknown.
    ///
    /// A running effect is torn down first. Returns None when nothing could
    /// be mounted.
    pub fn trigger(&mut self, name: Option<&str>) -> Option<EffectTicket> {
        self.start(name, None)
    }

    /// Like `trigger`, with a callback run after the fade-out that may chain another effect
    pub fn trigger_with(
        &mut self,
        name: Option<&str>,
        on_complete: impl FnOnce(&mut Chain) + 'static,
    ) -> Option<EffectTicket> {
        self.start(name, Some(Box::new(on_complete)))
    }

    /// Count one interaction; on the limit, run the element eater and chain a pick from the interaction pool
    pub fn trigger_from_interaction(
        &mut self,
        counter: &mut InteractionCounter,
        now_ms: f64,
    ) -> Option<EffectTicket> {
        self.advance_clock(now_ms);
        let touch = self.settings.touch_device;
        if !counter.register_tuned(self.now_ms, &self.tuning.controller, touch) {
            return None;
        }

        let mut pool = Catalog::interaction_pool(self.settings.content_mode);
        if self.settings.reduced_motion {
            pool = pool.without_simulations();
        }
        let follow_up = pool.pick(&mut self.rng).map(|d| d.name);
        log::info!("Interaction limit reached, chaining into {:?}", follow_up);

        self.trigger_with(Some(catalog::ELEMENT_EATER), move |chain| {
            chain.trigger(follow_up)
        })
    }

    /// Dismiss the running effect (close control or API). Returns false if there was nothing to dismiss.
    pub fn dismiss(&mut self) -> bool {
        let Some(effect) = self.active.as_mut() else {
            return false;
        };
        let dismissed = effect.completion.complete(CompletionReason::Dismissed);
        self.settle(self.now_ms);
        dismissed
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(kernel) = self.active.as_mut().and_then(|e| e.kernel.as_mut()) {
            kernel.resize(viewport);
        }
    }

    /// Feed one raw input event to the running kernel
    pub fn input(&mut self, raw: &RawInput, now_ms: f64) {
        self.advance_clock(now_ms);
        let now = self.now_ms;
        let viewport = self.host.viewport();

        let Some(effect) = self.active.as_mut() else {
            return;
        };
        if effect.completion.is_complete() {
            return;
        }

        if effect.adapter.is_emulated_mouse(raw, now) {
            return;
        }
        if effect.adapter.register_tap(raw, now) {
            log::debug!("Double tap on '{}', dismissing", effect.desc.name);
            effect.completion.complete(CompletionReason::Dismissed);
        } else if let Some(signal) = effect.adapter.normalize(raw, viewport)
            && let Some(kernel) = effect.kernel.as_mut()
        {
            let mut ctx = KernelContext::new(
                now,
                &mut self.rng,
                &mut self.timers,
                effect.generation,
                &mut effect.completion,
            );
            kernel.input(signal, &mut ctx);
        }
        self.settle(now);
    }

    /// Run one display frame: timers, fixed simulation steps, fade, draw.
    ///
    /// Returns whether an effect is still mounted.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        self.advance_clock(now_ms);
        let now = self.now_ms;
        self.fire_due_timers(now);

        let Some(effect) = self.active.as_mut() else {
            return false;
        };
        let attached = !effect.watch.is_detached();
        let generation = effect.generation;
        let running = effect.driver.frame(now, attached, |tick| {
            let Some(kernel) = effect.kernel.as_mut() else {
                return true;
            };
            for _ in 0..tick.steps {
                if !effect.simulating {
                    break;
                }
                let mut ctx = KernelContext::new(
                    now,
                    &mut self.rng,
                    &mut self.timers,
                    generation,
                    &mut effect.completion,
                );
                effect.simulating = kernel.step(&mut ctx);
            }
            true
        });

        if !attached {
            log::info!("Effect '{}' lost its surface", effect.desc.name);
            self.teardown(CompletionReason::Detached);
            return false;
        }
        if !running && effect.completion.complete(CompletionReason::Stopped) {
            log::debug!("Effect '{}' stopped by handle", effect.desc.name);
        }
        self.settle(now);

        let viewport = self.host.viewport();
        let Some(effect) = self.active.as_mut() else {
            return false;
        };
        self.host.set_opacity(effect.fade.sample(now));
        if let Some(kernel) = effect.kernel.as_ref() {
            effect.scene.reset(viewport);
            kernel.draw(&mut effect.scene);
            self.host.present(&effect.scene);
        }
        true
    }

    fn start(&mut self, name: Option<&str>, on_complete: Option<OnComplete>) -> Option<EffectTicket> {
        if self.active.is_some() {
            self.teardown(CompletionReason::Superseded);
        }

        let desc = catalog::resolve(name, &self.settings, &mut self.rng)?;
        let watch = match self.host.mount(desc) {
            Ok(watch) => watch,
            Err(err) => {
                log::warn!("Effect '{}' not started: {}", desc.name, err);
                return None;
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let now = self.now_ms;
        let viewport = self.host.viewport();

        let kernel = build_kernel(desc, &self.settings, &self.tuning, viewport, &mut self.rng);
        let adapter = kernel
            .as_ref()
            .map_or_else(|| InputAdapter::new(InputCapture::NONE), |k| k.input_adapter());
        let capture = adapter.capture();

        self.host.set_opacity(0.0);
        let input_attached = capture.listener_count() > 0;
        if input_attached {
            self.host.attach_input(&adapter);
        }
        if capture.prevent_gestures {
            self.host.set_gesture_lock(true);
        }
        if desc.has_dismiss_control() {
            self.host.show_dismiss_control();
        }
        if !desc.is_simulation() {
            self.host.play_cosmetic(desc.name);
        }
        if let Some(ms) = desc.controller_deadline_ms(&self.tuning.controller) {
            self.timers.schedule(now, ms, (generation, EffectTimer::Deadline));
        }

        let driver = FrameDriver::new();
        let handle = driver.handle();
        let mut effect = ActiveEffect {
            desc,
            generation,
            simulating: kernel.is_some(),
            kernel,
            adapter,
            input_attached,
            driver,
            watch,
            completion: Completion::default(),
            fade: Transition::fade_in(now, self.tuning.controller.fade_ms),
            fading_out: false,
            on_complete,
            scene: Scene::new(viewport),
        };

        if let Some(kernel) = effect.kernel.as_mut() {
            let mut ctx = KernelContext::new(
                now,
                &mut self.rng,
                &mut self.timers,
                generation,
                &mut effect.completion,
            );
            kernel.start(&mut ctx);
        }

        log::info!("Effect '{}' started (#{})", desc.name, generation);
        self.active = Some(effect);
        Some(EffectTicket {
            generation,
            name: desc.name,
            handle,
        })
    }

    fn fire_due_timers(&mut self, now: f64) {
        while let Some((deadline, (generation, timer))) = self.timers.pop_due(now) {
            if generation != self.generation {
                continue;
            }
            match timer {
                EffectTimer::Kernel(kind) => {
                    let Some(effect) = self.active.as_mut() else {
                        continue;
                    };
                    if let Some(kernel) = effect.kernel.as_mut() {
                        let mut ctx = KernelContext::new(
                            deadline,
                            &mut self.rng,
                            &mut self.timers,
                            generation,
                            &mut effect.completion,
                        );
                        kernel.timer(kind, &mut ctx);
                    }
                    self.settle(deadline);
                }
                EffectTimer::Deadline => {
                    if let Some(effect) = self.active.as_mut() {
                        effect.completion.complete(CompletionReason::Timeout);
                    }
                    self.settle(deadline);
                }
                EffectTimer::FadeOutDone => self.finish(),
            }
        }
    }

    /// Begin the fade-out once the effect has completed
    fn settle(&mut self, at_ms: f64) {
        let fade_ms = self.tuning.controller.fade_ms;
        let Some(effect) = self.active.as_mut() else {
            return;
        };
        if effect.fading_out || !effect.completion.is_complete() {
            return;
        }

        effect.fading_out = true;
        effect.fade = Transition::fade_out(effect.fade.sample(at_ms), at_ms, fade_ms);
        self.timers
            .schedule(at_ms, fade_ms, (effect.generation, EffectTimer::FadeOutDone));
        log::debug!(
            "Effect '{}' completing: {:?}",
            effect.desc.name,
            effect.completion.reason()
        );
    }

    /// Fade-out done: run the callback, release, then start any chained effect
    fn finish(&mut self) {
        let Some(mut effect) = self.active.take() else {
            return;
        };
        let mut chain = Chain::default();
        if let Some(on_complete) = effect.on_complete.take() {
            on_complete(&mut chain);
        }
        self.release(effect);

        if let Some(next) = chain.next {
            self.start(next.as_deref(), None);
        }
    }

    /// Immediate teardown without fade or callback
    fn teardown(&mut self, reason: CompletionReason) {
        if let Some(mut effect) = self.active.take() {
            effect.completion.complete(reason);
            self.release(effect);
        }
    }

    fn release(&mut self, effect: ActiveEffect) {
        effect.driver.handle().stop();
        let generation = effect.generation;
        let cancelled = self.timers.cancel_where(|(g, _)| *g == generation);

        if effect.input_attached {
            self.host.detach_input();
        }
        if effect.adapter.capture().prevent_gestures {
            self.host.set_gesture_lock(false);
        }
        self.host.set_opacity(0.0);
        self.host.unmount();

        log::info!(
            "Effect '{}' torn down ({:?}, {} timers cancelled)",
            effect.desc.name,
            effect.completion.reason(),
            cancelled
        );
    }
}
