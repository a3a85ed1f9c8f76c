//! Canvas 2D paint surface covering the whole viewport.

use std::f64::consts::TAU;

use mote_field::{FieldError, FrameData, Surface, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

/// Fixed, full-viewport and click-through. A negative `z-index` puts the
/// canvas in the root stacking context's negative layer, which paints before
/// in-flow content, so ordinary text and controls stay on top whether or not
/// they are positioned. The page background still paints underneath it.
const CANVAS_STYLE: [(&str, &str); 6] = [
    ("position", "fixed"),
    ("inset", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("pointer-events", "none"),
    ("z-index", "-1"),
];

const RING_LINE_WIDTH: f64 = 1.5;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    /// Create the canvas, acquire its 2D context, and insert it as the first
    /// child of `<body>`. The element is only attached once the context is in
    /// hand, so a failure leaves the page untouched.
    ///
    /// The pixel size starts at zero; the runner sizes it through
    /// [`Surface::resize`] right after creation.
    pub fn create(document: &Document) -> Result<Self, FieldError> {
        let canvas = document
            .create_element("canvas")
            .map_err(surface_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| FieldError::Surface("created element is not a canvas".into()))?;

        canvas
            .set_attribute("aria-hidden", "true")
            .map_err(surface_error)?;
        let style = canvas.style();
        for (property, value) in CANVAS_STYLE {
            style.set_property(property, value).map_err(surface_error)?;
        }

        let ctx = canvas
            .get_context("2d")
            .map_err(|err| FieldError::ContextUnavailable(js_message(&err)))?
            .ok_or_else(|| FieldError::ContextUnavailable("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| {
                FieldError::ContextUnavailable("context is not a CanvasRenderingContext2d".into())
            })?;

        let body = document
            .body()
            .ok_or_else(|| FieldError::Surface("document has no <body>".into()))?;
        body.prepend_with_node_1(&canvas).map_err(surface_error)?;

        Ok(Self {
            canvas,
            ctx,
            width: 0,
            height: 0,
        })
    }
}

impl Surface for CanvasSurface {
    fn backend(&self) -> &'static str {
        "canvas2d"
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn draw(&mut self, frame: &FrameData<'_>) {
        let accent = frame.style.accent;

        self.ctx.set_shadow_blur(frame.style.glow_blur as f64);
        for glow in frame.glows {
            let color = accent.css_rgba(glow.alpha);
            self.ctx.set_fill_style_str(&color);
            self.ctx.set_shadow_color(&color);
            self.ctx.begin_path();
            if self
                .ctx
                .arc(glow.x as f64, glow.y as f64, glow.radius as f64, 0.0, TAU)
                .is_ok()
            {
                self.ctx.fill();
            }
        }

        self.ctx.set_shadow_blur(0.0);
        self.ctx.set_line_width(RING_LINE_WIDTH);
        for ring in frame.rings {
            self.ctx.set_stroke_style_str(&accent.css_rgba(ring.alpha));
            self.ctx.begin_path();
            if self
                .ctx
                .arc(ring.x as f64, ring.y as f64, ring.radius as f64, 0.0, TAU)
                .is_ok()
            {
                self.ctx.stroke();
            }
        }
    }

    fn detach(&mut self) {
        self.canvas.remove();
    }
}

/// Current inner size of the browser window. Falls back to zero when the
/// values are unavailable (e.g. a detached window).
pub fn window_viewport(window: &Window) -> Viewport {
    let extent = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Viewport::new(extent(window.inner_width()), extent(window.inner_height()))
}

fn surface_error(err: JsValue) -> FieldError {
    FieldError::Surface(js_message(&err))
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_message(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
