//! DOM event listeners that feed the particle field.
//!
//! Every closure is kept (never `forget`-ed) so it can be deregistered; a
//! stopped host must leave nothing listening.

use mote_field::FieldEvent;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget, MouseEvent, PointerEvent, Window};

use crate::canvas::{js_message, window_viewport};

pub struct DomListeners {
    window: Window,
    document: Document,
    pointer_move: Closure<dyn FnMut(PointerEvent)>,
    pointer_down: Option<Closure<dyn FnMut(PointerEvent)>>,
    resize: Closure<dyn FnMut(Event)>,
    mouse_leave: Closure<dyn FnMut(MouseEvent)>,
    attached: bool,
}

impl DomListeners {
    /// Register the listeners. `sink` receives every translated event.
    /// On failure, whatever was registered is removed again.
    pub fn attach<F>(
        window: &Window,
        document: &Document,
        sink: F,
        ripple_on_pointer_down: bool,
    ) -> Result<Self, JsValue>
    where
        F: Fn(FieldEvent) + Clone + 'static,
    {
        let pointer_move = {
            let sink = sink.clone();
            Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
                sink(FieldEvent::PointerMove {
                    x: event.client_x() as f32,
                    y: event.client_y() as f32,
                });
            })
        };

        let pointer_down = ripple_on_pointer_down.then(|| {
            let sink = sink.clone();
            Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
                sink(FieldEvent::Ripple {
                    x: event.client_x() as f32,
                    y: event.client_y() as f32,
                });
            })
        });

        let resize = {
            let sink = sink.clone();
            let window = window.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                let viewport = window_viewport(&window);
                sink(FieldEvent::Resize {
                    width: viewport.width,
                    height: viewport.height,
                });
            })
        };

        let mouse_leave = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
            sink(FieldEvent::PointerLeave);
        });

        let mut listeners = Self {
            window: window.clone(),
            document: document.clone(),
            pointer_move,
            pointer_down,
            resize,
            mouse_leave,
            attached: true,
        };
        if let Err(err) = listeners.register() {
            listeners.remove();
            return Err(err);
        }
        log::debug!("particle field listeners attached");
        Ok(listeners)
    }

    fn register(&self) -> Result<(), JsValue> {
        let window: &EventTarget = self.window.as_ref();
        let document: &EventTarget = self.document.as_ref();

        window.add_event_listener_with_callback(
            "pointermove",
            self.pointer_move.as_ref().unchecked_ref(),
        )?;
        if let Some(pointer_down) = &self.pointer_down {
            window.add_event_listener_with_callback(
                "pointerdown",
                pointer_down.as_ref().unchecked_ref(),
            )?;
        }
        window.add_event_listener_with_callback("resize", self.resize.as_ref().unchecked_ref())?;
        document.add_event_listener_with_callback(
            "mouseleave",
            self.mouse_leave.as_ref().unchecked_ref(),
        )?;
        Ok(())
    }

    /// Deregister every listener. Safe to call more than once.
    pub fn remove(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;

        let window: &EventTarget = self.window.as_ref();
        let document: &EventTarget = self.document.as_ref();
        let mut results = vec![
            window.remove_event_listener_with_callback(
                "pointermove",
                self.pointer_move.as_ref().unchecked_ref(),
            ),
            window.remove_event_listener_with_callback(
                "resize",
                self.resize.as_ref().unchecked_ref(),
            ),
            document.remove_event_listener_with_callback(
                "mouseleave",
                self.mouse_leave.as_ref().unchecked_ref(),
            ),
        ];
        if let Some(pointer_down) = &self.pointer_down {
            results.push(window.remove_event_listener_with_callback(
                "pointerdown",
                pointer_down.as_ref().unchecked_ref(),
            ));
        }

        for err in results.into_iter().filter_map(Result::err) {
            log::warn!("failed to remove particle field listener: {}", js_message(&err));
        }
        log::debug!("particle field listeners removed");
    }
}

impl Drop for DomListeners {
    fn drop(&mut self) {
        self.remove();
    }
}
