//! Self-rescheduling `requestAnimationFrame` loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::canvas::js_message;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Runs `tick` once per animation frame until cancelled or until `tick`
/// returns `false`.
pub struct FrameLoop {
    window: Window,
    handle: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl FrameLoop {
    pub fn start<F>(window: &Window, mut tick: F) -> Result<Self, JsValue>
    where
        F: FnMut() -> bool + 'static,
    {
        let handle = Rc::new(Cell::new(None));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        // The closure holds a handle to its own slot so it can reschedule itself.
        // `cancel` empties the slot, which breaks the cycle.
        let slot = callback.clone();
        let next_handle = handle.clone();
        let win = window.clone();
        *callback.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
            next_handle.set(None);
            if !tick() {
                return;
            }
            if let Some(cb) = slot.borrow().as_ref() {
                match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => next_handle.set(Some(id)),
                    Err(err) => log::error!("requestAnimationFrame failed: {}", js_message(&err)),
                }
            }
        }));

        let first = match callback.borrow().as_ref() {
            Some(cb) => window.request_animation_frame(cb.as_ref().unchecked_ref())?,
            None => return Err(JsValue::from_str("frame callback missing")),
        };
        handle.set(Some(first));

        Ok(Self {
            window: window.clone(),
            handle,
            callback,
        })
    }

    /// Cancel the pending frame and release the callback. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(id) = self.handle.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {}", js_message(&err));
            }
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
