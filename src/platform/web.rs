//! Browser host and JS entry points
//!
//! `WebHost` owns the overlay DOM (container, canvas, HUD, close button) and
//! the listeners the active effect asked for. DOM callbacks never touch the
//! controller directly: they queue `HostEvent`s that the animation frame
//! drains before stepping.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    MouseEvent, MutationObserver, MutationObserverInit, TouchEvent, TouchList, Window,
};

use crate::effect::{
    EffectController, EffectDescriptor, InteractionCounter, OverlayHost, SurfaceWatch,
};
use crate::error::{FxError, FxResult};
use crate::input::{InputAdapter, InputKind, RawInput};
use crate::renderer::{HudText, RenderState, Scene};
use crate::settings::{ContentMode, Settings};
use crate::sim::Viewport;
use crate::tuning::Tuning;

const OVERLAY_CSS: &str = "position:fixed;inset:0;z-index:2147483647;opacity:0;\
    pointer-events:none;overflow:hidden;";
const CANVAS_CSS: &str = "position:absolute;inset:0;display:block;width:100%;height:100%;";
const HUD_CSS: &str = "position:absolute;inset:0;pointer-events:none;\
    font-family:'Courier New',monospace;";
const CLOSE_CSS: &str = "position:absolute;top:12px;right:12px;width:36px;height:36px;\
    border:none;border-radius:50%;background:rgba(0,0,0,0.5);color:#fff;\
    font-size:18px;line-height:36px;cursor:pointer;pointer-events:auto;";

/// Something a DOM callback saw, handled on the next frame
#[derive(Debug)]
enum HostEvent {
    Input(RawInput),
    Dismiss,
    Resize,
}

type EventQueue = Rc<RefCell<VecDeque<HostEvent>>>;

fn js_err(err: JsValue) -> FxError {
    FxError::Host(format!("{:?}", err))
}

/// An event listener that can be removed again
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn add(
        target: &EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> FxResult<Self> {
        // Non-passive so gesture-locking kernels can prevent scrolling
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(js_err)?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }

    fn remove(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// DOM nodes of the mounted overlay
struct Overlay {
    container: HtmlElement,
    hud: HtmlElement,
    hud_cache: Vec<HudText>,
    observer: MutationObserver,
    _on_mutation: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
    input_listeners: Vec<Listener>,
    control_listeners: Vec<Listener>,
}

impl Overlay {
    fn update_hud(&mut self, document: &Document, hud: &[HudText]) {
        if self.hud_cache == hud {
            return;
        }
        self.hud.set_inner_html("");
        for line in hud {
            let Ok(el) = document.create_element("div") else {
                continue;
            };
            el.set_text_content(Some(&line.text));
            let _ = el.set_attribute("style", &line.css());
            let _ = self.hud.append_child(&el);
        }
        self.hud_cache = hud.to_vec();
    }

    fn remove_input_listeners(&mut self) {
        for listener in self.input_listeners.drain(..) {
            listener.remove();
        }
    }
}

/// Overlay host backed by the page DOM and a WebGPU canvas
pub struct WebHost {
    window: Window,
    document: Document,
    mount_id: String,
    icon_lookup: Option<js_sys::Function>,
    canvas: HtmlCanvasElement,
    renderer: Option<RenderState>,
    events: EventQueue,
    overlay: Option<Overlay>,
    saved_body_style: Option<(String, String)>,
}

impl WebHost {
    fn create_html(&self, tag: &str) -> FxResult<HtmlElement> {
        self.document
            .create_element(tag)
            .map_err(js_err)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| FxError::Host(format!("<{}> is not an HTMLElement", tag)))
    }

    fn close_icon(&self) -> String {
        self.icon_lookup
            .as_ref()
            .and_then(|lookup| lookup.call1(&JsValue::NULL, &JsValue::from_str("close")).ok())
            .and_then(|icon| icon.as_string())
            .unwrap_or_else(|| "&times;".to_string())
    }

    /// Match the canvas backing store to the window size
    fn sync_canvas_size(&mut self) -> Viewport {
        let viewport = self.viewport();
        let dpr = self.window.device_pixel_ratio();
        let width = ((viewport.width as f64 * dpr) as u32).max(1);
        let height = ((viewport.height as f64 * dpr) as u32).max(1);
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
        viewport
    }

    /// Watch the document for removal of the container
    fn observe_removal(
        &self,
        container: &HtmlElement,
        watch: SurfaceWatch,
    ) -> FxResult<(MutationObserver, Closure<dyn FnMut(js_sys::Array, MutationObserver)>)> {
        let target = container.clone();
        let on_mutation = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |_records: js_sys::Array, _observer: MutationObserver| {
                if !target.is_connected() && !watch.is_detached() {
                    log::warn!("Overlay removed from the document");
                    watch.mark_detached();
                }
            },
        );
        let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref()).map_err(js_err)?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(&self.document, &init)
            .map_err(js_err)?;
        Ok((observer, on_mutation))
    }
}

impl OverlayHost for WebHost {
    fn mount(&mut self, desc: &EffectDescriptor) -> FxResult<SurfaceWatch> {
        let root = self
            .document
            .get_element_by_id(&self.mount_id)
            .ok_or_else(|| FxError::MissingMount(self.mount_id.clone()))?;
        if desc.is_simulation() && self.renderer.is_none() {
            return Err(FxError::RendererUnavailable(
                "no GPU for canvas effects".into(),
            ));
        }
        self.unmount();

        let container = self.create_html("div")?;
        container.style().set_css_text(OVERLAY_CSS);
        container
            .set_attribute("data-effect", desc.name)
            .map_err(js_err)?;
        if desc.is_simulation() {
            self.sync_canvas_size();
            container.append_child(&self.canvas).map_err(js_err)?;
        }
        let hud = self.create_html("div")?;
        hud.style().set_css_text(HUD_CSS);
        container.append_child(&hud).map_err(js_err)?;
        root.append_child(&container).map_err(js_err)?;

        let watch = SurfaceWatch::new();
        let (observer, on_mutation) = self.observe_removal(&container, watch.clone())?;
        self.overlay = Some(Overlay {
            container,
            hud,
            hud_cache: Vec::new(),
            observer,
            _on_mutation: on_mutation,
            input_listeners: Vec::new(),
            control_listeners: Vec::new(),
        });
        Ok(watch)
    }

    fn viewport(&self) -> Viewport {
        window_viewport(&self.window)
    }

    fn set_opacity(&mut self, opacity: f32) {
        if let Some(overlay) = &self.overlay {
            let _ = overlay
                .container
                .style()
                .set_property("opacity", &opacity.to_string());
        }
    }

    fn attach_input(&mut self, adapter: &InputAdapter) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        let capture = adapter.capture();
        let style = overlay.container.style();
        if capture.wants_any() {
            let _ = style.set_property("pointer-events", "auto");
        }
        if capture.prevent_gestures {
            let _ = style.set_property("touch-action", "none");
        }

        for kind in capture.event_names() {
            let events = self.events.clone();
            let adapter = adapter.clone();
            let window = self.window.clone();
            let callback = Closure::<dyn FnMut(_)>::new(move |event: Event| {
                let Some(raw) = raw_input(kind, &event) else {
                    return;
                };
                if adapter.should_prevent_default(&raw, window_viewport(&window)) {
                    event.prevent_default();
                }
                events.borrow_mut().push_back(HostEvent::Input(raw));
            });
            match Listener::add(&overlay.container, kind, callback) {
                Ok(listener) => overlay.input_listeners.push(listener),
                Err(e) => log::warn!("Failed to listen for {}: {}", kind, e),
            }
        }
    }

    fn detach_input(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.remove_input_listeners();
            let style = overlay.container.style();
            let _ = style.set_property("pointer-events", "none");
            let _ = style.remove_property("touch-action");
        }
    }

    fn set_gesture_lock(&mut self, locked: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        let style = body.style();
        if locked {
            if self.saved_body_style.is_none() {
                self.saved_body_style = Some((
                    style.get_property_value("overflow").unwrap_or_default(),
                    style.get_property_value("touch-action").unwrap_or_default(),
                ));
            }
            let _ = style.set_property("overflow", "hidden");
            let _ = style.set_property("touch-action", "none");
        } else if let Some((overflow, touch_action)) = self.saved_body_style.take() {
            let _ = style.set_property("overflow", &overflow);
            let _ = style.set_property("touch-action", &touch_action);
        }
    }

    fn show_dismiss_control(&mut self) {
        let button = match self.create_html("button") {
            Ok(button) => button,
            Err(e) => {
                log::warn!("No close control: {}", e);
                return;
            }
        };
        button.style().set_css_text(CLOSE_CSS);
        button.set_inner_html(&self.close_icon());
        let _ = button.set_attribute("aria-label", "Close");

        let events = self.events.clone();
        let callback = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            event.stop_propagation();
            events.borrow_mut().push_back(HostEvent::Dismiss);
        });
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        if overlay.container.append_child(&button).is_err() {
            return;
        }
        match Listener::add(&button, "click", callback) {
            Ok(listener) => overlay.control_listeners.push(listener),
            Err(e) => log::warn!("Close control has no listener: {}", e),
        }
    }

    fn play_cosmetic(&mut self, name: &str) {
        // Page CSS keys its animations off this class
        if let Some(overlay) = &self.overlay {
            overlay.container.set_class_name(&format!("fx-{}", name));
        }
    }

    fn present(&mut self, scene: &Scene) {
        if let Some(renderer) = self.renderer.as_mut() {
            match renderer.render(scene) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (width, height) = renderer.size;
                    renderer.resize(width, height);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => {
                    log::warn!("Render error: {:?}", e);
                }
            }
        }
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.update_hud(&self.document, &scene.hud);
        }
    }

    fn unmount(&mut self) {
        let Some(mut overlay) = self.overlay.take() else {
            return;
        };
        overlay.observer.disconnect();
        overlay.remove_input_listeners();
        for listener in overlay.control_listeners.drain(..) {
            listener.remove();
        }
        overlay.container.remove();
    }
}

fn window_viewport(window: &Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Viewport::new(
        dimension(window.inner_width()),
        dimension(window.inner_height()),
    )
}

fn touch_points(list: TouchList) -> Vec<Vec2> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| Vec2::new(t.client_x() as f32, t.client_y() as f32))
        .collect()
}

/// Convert a DOM event into the controller's raw input
fn raw_input(kind: &str, event: &Event) -> Option<RawInput> {
    if let Some(touch) = event.dyn_ref::<TouchEvent>() {
        return match kind {
            "touchstart" => Some(RawInput::Touch {
                kind: InputKind::Start,
                points: touch_points(touch.touches()),
            }),
            "touchmove" => Some(RawInput::Touch {
                kind: InputKind::Move,
                points: touch_points(touch.touches()),
            }),
            "touchend" => Some(RawInput::Touch {
                kind: InputKind::End,
                points: touch_points(touch.changed_touches()),
            }),
            _ => None,
        };
    }

    let mouse = event.dyn_ref::<MouseEvent>()?;
    let pos = Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32);
    match kind {
        "mousedown" => Some(RawInput::MouseDown(pos)),
        "mouseup" => Some(RawInput::MouseUp(pos)),
        "mousemove" => Some(RawInput::MouseMove(pos)),
        "mouseleave" => Some(RawInput::MouseLeave(pos)),
        _ => None,
    }
}

/// Milliseconds on the same clock as animation frame timestamps
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Set up panic reporting and console logging (idempotent)
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

struct Runtime {
    controller: EffectController<WebHost>,
    events: EventQueue,
    counter: InteractionCounter,
    looping: bool,
}

impl Runtime {
    fn drain_events(&mut self, now: f64) {
        let pending: Vec<HostEvent> = self.events.borrow_mut().drain(..).collect();
        for event in pending {
            match event {
                HostEvent::Input(raw) => self.controller.input(&raw, now),
                HostEvent::Dismiss => {
                    self.controller.advance_clock(now);
                    self.controller.dismiss();
                }
                HostEvent::Resize => {
                    let viewport = self.controller.host_mut().sync_canvas_size();
                    self.controller.resize(viewport);
                }
            }
        }
    }
}

fn request_frame(inner: Rc<RefCell<Runtime>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| frame_loop(inner, time));
    if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {:?}", e);
    }
    closure.forget();
}

fn frame_loop(inner: Rc<RefCell<Runtime>>, time: f64) {
    let active = {
        let mut rt = inner.borrow_mut();
        rt.drain_events(time);
        let active = rt.controller.frame(time);
        rt.looping = active;
        active
    };
    if active {
        request_frame(inner);
    }
}

fn ensure_loop(inner: &Rc<RefCell<Runtime>>) {
    {
        let mut rt = inner.borrow_mut();
        if rt.looping || !rt.controller.is_active() {
            return;
        }
        rt.looping = true;
    }
    request_frame(inner.clone());
}

/// Request a WebGPU surface on the shared canvas
async fn init_renderer(canvas: &HtmlCanvasElement, width: u32, height: u32) -> FxResult<RenderState> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| FxError::RendererUnavailable(e.to_string()))?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| FxError::RendererUnavailable(e.to_string()))?;
    log::info!("Adapter: {:?}", adapter.get_info());
    RenderState::new(surface, &adapter, width, height).await
}

/// Settings from storage plus what the browser says about the device
fn detect_settings(window: &Window) -> Settings {
    let mut settings = Settings::load();
    settings.touch_device = window.navigator().max_touch_points() > 0;
    if let Ok(Some(query)) = window.match_media("(prefers-reduced-motion: reduce)")
        && query.matches()
    {
        settings.reduced_motion = true;
    }
    settings
}

/// JS handle to the effects runtime
#[wasm_bindgen]
pub struct FxRuntime {
    inner: Rc<RefCell<Runtime>>,
}

#[wasm_bindgen]
impl FxRuntime {
    /// Build the runtime against the element with id `mount_id`.
    ///
    /// `icon_lookup(name)` may return markup for the close control.
    /// `tuning_json` overrides any subset of the default tuning and is
    /// rejected when a value is out of range. Without a GPU only the
    /// one-shot effects can run.
    pub async fn create(
        mount_id: String,
        icon_lookup: Option<js_sys::Function>,
        tuning_json: Option<String>,
    ) -> Result<FxRuntime, JsValue> {
        init_logging();
        let tuning = match tuning_json.as_deref() {
            Some(json) => Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("canvas element unavailable"))?;
        canvas.style().set_css_text(CANVAS_CSS);

        let renderer = match init_renderer(&canvas, 1, 1).await {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                log::warn!("Canvas effects disabled: {}", e);
                None
            }
        };

        let events: EventQueue = Rc::new(RefCell::new(VecDeque::new()));
        let settings = detect_settings(&window);
        log::info!(
            "Settings: quality {}, touch {}, reduced motion {}",
            settings.quality.as_str(),
            settings.touch_device,
            settings.reduced_motion
        );

        let host = WebHost {
            window: window.clone(),
            document,
            mount_id,
            icon_lookup,
            canvas,
            renderer,
            events: events.clone(),
            overlay: None,
            saved_body_style: None,
        };
        let seed = js_sys::Date::now() as u64;
        let controller = EffectController::new(host, settings, tuning, seed);

        // The window lives as long as the page
        let resize_events = events.clone();
        let on_resize = Closure::<dyn FnMut(_)>::new(move |_: Event| {
            resize_events.borrow_mut().push_back(HostEvent::Resize);
        });
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        on_resize.forget();

        Ok(FxRuntime {
            inner: Rc::new(RefCell::new(Runtime {
                controller,
                events,
                counter: InteractionCounter::default(),
                looping: false,
            })),
        })
    }

    /// Start `name`, or a random pick when absent. Returns whether an effect started.
    pub fn trigger(&self, name: Option<String>) -> bool {
        let started = {
            let mut rt = self.inner.borrow_mut();
            let now = now_ms();
            rt.drain_events(now);
            rt.controller.advance_clock(now);
            rt.controller.trigger(name.as_deref()).is_some()
        };
        ensure_loop(&self.inner);
        started
    }

    /// Count a user interaction; past the limit this starts an effect chain
    pub fn interact(&self) -> bool {
        let started = {
            let rt = &mut *self.inner.borrow_mut();
            rt.controller
                .trigger_from_interaction(&mut rt.counter, now_ms())
                .is_some()
        };
        ensure_loop(&self.inner);
        started
    }

    pub fn dismiss(&self) -> bool {
        let mut rt = self.inner.borrow_mut();
        rt.controller.advance_clock(now_ms());
        rt.controller.dismiss()
    }

    /// Switch the catalog filter; `restricted` swaps/removes the flagged entries
    #[wasm_bindgen(js_name = setContentMode)]
    pub fn set_content_mode(&self, restricted: bool) {
        let mode = if restricted {
            ContentMode::Restricted
        } else {
            ContentMode::Standard
        };
        self.inner.borrow_mut().controller.set_content_mode(mode);
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.inner.borrow().controller.is_active()
    }
}
