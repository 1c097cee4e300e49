//! Overlay FX entry point
//!
//! On the web the library's `FxRuntime` is the real API; this binary only
//! sets up logging there. Natively it runs each canvas effect against the
//! headless host and logs the lifecycle.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    overlay_fx::platform::web::init_logging();
    log::info!("Overlay FX loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Overlay FX (native) starting...");
    log::info!("Native mode drives a headless overlay - build for wasm32 for the real one");

    headless::run_demo("warp-speed", |ctrl, now| {
        // Hold for a second, then let go
        if now < 16.0 {
            ctrl.input(&headless::press(true), now);
        } else if (1000.0..1000.0 + overlay_fx::consts::SIM_DT_MS).contains(&now) {
            ctrl.input(&headless::press(false), now);
        }
    });
    headless::run_demo("fireworks", |_, _| {});
    headless::run_demo("retro-pong", |ctrl, now| {
        // Follow the ball with the player paddle
        let y = ctrl
            .kernel_mut::<overlay_fx::effect::PongKernel>()
            .map(|k| k.state().ball.pos.y);
        if let Some(y) = y {
            ctrl.input(
                &overlay_fx::input::RawInput::MouseMove(glam::Vec2::new(40.0, y)),
                now,
            );
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use overlay_fx::consts::SIM_DT_MS;
    use overlay_fx::input::RawInput;
    use overlay_fx::platform::HeadlessHost;
    use overlay_fx::sim::Viewport;
    use overlay_fx::{EffectController, Settings, Tuning};

    /// Give up on an effect after this much simulated time
    const DEMO_LIMIT_MS: f64 = 120_000.0;

    pub fn press(down: bool) -> RawInput {
        let center = Vec2::new(640.0, 360.0);
        if down {
            RawInput::MouseDown(center)
        } else {
            RawInput::MouseUp(center)
        }
    }

    pub fn run_demo(
        name: &str,
        mut drive: impl FnMut(&mut EffectController<HeadlessHost>, f64),
    ) {
        let host = HeadlessHost::new(Viewport::new(1280.0, 720.0));
        let mut ctrl = EffectController::new(host, Settings::default(), Tuning::default(), 42);
        if ctrl.trigger(Some(name)).is_none() {
            log::error!("'{}' did not start", name);
            return;
        }

        let mut now = 0.0;
        let mut reason = None;
        while now < DEMO_LIMIT_MS {
            drive(&mut ctrl, now);
            now += SIM_DT_MS;
            if let Some(r) = ctrl.completion_reason() {
                reason.get_or_insert(r);
            }
            if !ctrl.frame(now) {
                break;
            }
        }

        let host = ctrl.host();
        if host.mounted {
            log::warn!("'{}' still mounted after {:.0} ms", name, now);
        } else {
            log::info!(
                "'{}' removed at {:.0} ms ({:?}), {} frames, last HUD {:?}",
                name,
                now,
                reason,
                host.frames_presented,
                host.last_hud
            );
        }
    }
}
