//! Browser host for the `mote-field` particle simulation.
//!
//! `ParticleFieldHost` owns the canvas, the DOM listeners and the animation
//! frame loop. All simulation state lives in the engine crate; this crate only
//! translates browser input into [`FieldEvent`]s and paints what the field
//! produces.

mod canvas;
mod frame_loop;
mod listeners;
mod runner;

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Float32Array;
use mote_field::{ExplosionOrigin, FieldConfig, FieldError, FieldEvent, Occluders, Rect};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use canvas::{window_viewport, CanvasSurface};
use frame_loop::FrameLoop;
use listeners::DomListeners;
pub use runner::FieldRunner;

type SharedRunner = Rc<RefCell<FieldRunner<CanvasSurface>>>;

#[wasm_bindgen]
pub struct ParticleFieldHost {
    runner: SharedRunner,
    /// The config carried its own seed; every start reproduces that layout.
    seed_pinned: bool,
    static_rects: Rc<RefCell<Vec<Rect>>>,
    tracked: Rc<RefCell<Vec<Element>>>,
    listeners: Option<DomListeners>,
    frame_loop: Option<FrameLoop>,
}

#[wasm_bindgen]
impl ParticleFieldHost {
    /// Build a stopped host. `config_json` overrides any subset of the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ParticleFieldHost, JsValue> {
        init_logging();

        let config = match config_json.as_deref() {
            Some(json) => FieldConfig::from_json(json).map_err(to_js)?,
            None => FieldConfig::default(),
        };
        let seed_pinned = config.seed.is_some();

        let runner = FieldRunner::new(config).map_err(to_js)?;
        Ok(Self {
            runner: Rc::new(RefCell::new(runner)),
            seed_pinned,
            static_rects: Rc::default(),
            tracked: Rc::default(),
            listeners: None,
            frame_loop: None,
        })
    }

    /// Insert the canvas, attach listeners and begin animating.
    /// Resolves to `false` when the field was already running.
    pub fn start(&mut self) -> Result<bool, JsValue> {
        let (window, document) = dom().map_err(to_js)?;
        let viewport = window_viewport(&window);

        let mut runner = self.runner.borrow_mut();
        if !self.seed_pinned && !runner.is_running() {
            runner.reseed(fresh_seed());
        }
        let started = runner
            .start(viewport, |_| CanvasSurface::create(&document))
            .map_err(to_js)?;
        drop(runner);
        if !started {
            return Ok(false);
        }

        if let Err(err) = self.attach(&window, &document) {
            log::error!("particle field failed to attach; rolling back");
            self.stop();
            return Err(err);
        }
        Ok(true)
    }

    /// Cancel the frame loop, remove every listener and the canvas.
    /// Returns `false` when nothing was running.
    pub fn stop(&mut self) -> bool {
        if let Some(mut frame_loop) = self.frame_loop.take() {
            frame_loop.cancel();
        }
        if let Some(mut listeners) = self.listeners.take() {
            listeners.remove();
        }
        self.runner.borrow_mut().stop()
    }

    /// Blast every particle away from `(x, y)`.
    pub fn explode(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        let origin = ExplosionOrigin::new(x, y).map_err(to_js)?;
        self.runner
            .borrow_mut()
            .handle_event(FieldEvent::Explode(origin));
        Ok(())
    }

    pub fn ripple(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(to_js(FieldError::InvalidPoint { x, y }));
        }
        self.runner
            .borrow_mut()
            .handle_event(FieldEvent::Ripple { x, y });
        Ok(())
    }

    /// Replace the static foreground rectangles with flat `x, y, w, h` quads.
    #[wasm_bindgen(js_name = setOccluderRects)]
    pub fn set_occluder_rects(&mut self, rects: &[f32]) {
        *self.static_rects.borrow_mut() = Rect::from_flat(rects);
        self.refresh_occluders();
    }

    /// Follow an element's bounding box every frame until it leaves the DOM.
    #[wasm_bindgen(js_name = trackOccluder)]
    pub fn track_occluder(&mut self, element: Element) {
        self.tracked.borrow_mut().push(element);
        self.refresh_occluders();
    }

    #[wasm_bindgen(js_name = clearOccluders)]
    pub fn clear_occluders(&mut self) {
        self.static_rects.borrow_mut().clear();
        self.tracked.borrow_mut().clear();
        self.runner.borrow_mut().occluders_mut().clear();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.runner.borrow().is_running()
    }

    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.runner.borrow().field().map_or(0, |field| field.len())
    }

    /// Last painted glows as `[x, y, radius, alpha]` records. Empty while stopped.
    #[wasm_bindgen(js_name = glowSnapshot)]
    pub fn glow_snapshot(&self) -> Float32Array {
        match self.runner.borrow().draw_list() {
            Some(list) => Float32Array::from(list.glow_floats()),
            None => Float32Array::new_with_length(0),
        }
    }
}

impl ParticleFieldHost {
    fn attach(&mut self, window: &Window, document: &Document) -> Result<(), JsValue> {
        let ripple_on_pointer_down = self.runner.borrow().config().ripple.on_pointer_down;

        let weak = Rc::downgrade(&self.runner);
        let sink = move |event: FieldEvent| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            match shared.try_borrow_mut() {
                Ok(mut runner) => {
                    runner.handle_event(event);
                }
                Err(_) => log::warn!("particle field busy; dropping {event:?}"),
            };
        };
        self.listeners = Some(DomListeners::attach(
            window,
            document,
            sink,
            ripple_on_pointer_down,
        )?);

        let weak = Rc::downgrade(&self.runner);
        let static_rects = self.static_rects.clone();
        let tracked = self.tracked.clone();
        self.frame_loop = Some(FrameLoop::start(window, move || {
            let Some(shared) = weak.upgrade() else {
                return false;
            };
            let Ok(mut runner) = shared.try_borrow_mut() else {
                return true;
            };
            update_occluders(
                runner.occluders_mut(),
                &static_rects.borrow(),
                &mut tracked.borrow_mut(),
            );
            runner.frame()
        })?);
        Ok(())
    }

    fn refresh_occluders(&self) {
        update_occluders(
            self.runner.borrow_mut().occluders_mut(),
            &self.static_rects.borrow(),
            &mut self.tracked.borrow_mut(),
        );
    }
}

impl Drop for ParticleFieldHost {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

/// Static rectangles plus the current client box of every tracked element
/// still in the document. Detached elements are forgotten.
fn update_occluders(occluders: &mut Occluders, static_rects: &[Rect], tracked: &mut Vec<Element>) {
    tracked.retain(|element| element.is_connected());
    let live = tracked.iter().map(|element| {
        let bounds = element.get_bounding_client_rect();
        Rect::new(
            bounds.x() as f32,
            bounds.y() as f32,
            bounds.width() as f32,
            bounds.height() as f32,
        )
    });
    occluders.replace(static_rects.iter().copied().chain(live));
}

fn dom() -> Result<(Window, Document), FieldError> {
    let window = web_sys::window().ok_or_else(|| FieldError::Surface("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| FieldError::Surface("window has no document".into()))?;
    Ok((window, document))
}

/// 53 random bits mixed with the clock, so back-to-back starts differ.
fn fresh_seed() -> u64 {
    let random = (js_sys::Math::random() * (1u64 << 53) as f64) as u64;
    random ^ (js_sys::Date::now() as u64).rotate_left(32)
}

fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn to_js(err: FieldError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
