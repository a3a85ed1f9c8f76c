//! The seam between the simulation and whatever paints it.
//!
//! The field never touches a paint API directly. It produces a [`DrawList`]
//! each frame and hands it to a [`Surface`]: a browser canvas in the web
//! bridge, or a recording stub in tests.
//!
//! [`DrawList`]: super::instance::DrawList

use super::instance::{GlowInstance, RingInstance};
use crate::api::config::GlowStyle;

/// Complete frame data for painting.
pub struct FrameData<'a> {
    /// Particle glows, one per active particle.
    pub glows: &'a [GlowInstance],
    /// Transient ripple rings.
    pub rings: &'a [RingInstance],
    /// Accent colour and glow radius shared by every glow.
    pub style: &'a GlowStyle,
}

/// A full-viewport drawing surface.
///
/// ```ignore
/// struct CanvasSurface { ctx: CanvasRenderingContext2d, /* ... */ }
///
/// impl Surface for CanvasSurface {
///     fn backend(&self) -> &'static str { "canvas2d" }
///     fn resize(&mut self, width: u32, height: u32) { /* set canvas size */ }
///     fn clear(&mut self) { /* clearRect over the whole canvas */ }
///     fn draw(&mut self, frame: &FrameData) { /* arc + fill per glow */ }
///     fn detach(&mut self) { /* remove the element */ }
/// }
/// ```
pub trait Surface {
    /// Backend identifier (e.g., "canvas2d").
    fn backend(&self) -> &'static str;

    /// Match the surface's pixel dimensions to the viewport.
    fn resize(&mut self, width: u32, height: u32);

    /// Erase everything; called before every draw pass so nothing trails.
    fn clear(&mut self);

    /// Paint one frame.
    fn draw(&mut self, frame: &FrameData<'_>);

    /// Remove the surface from the host. No further calls follow.
    fn detach(&mut self);
}
