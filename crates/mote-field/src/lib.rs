//! Headless particle field: a fixed pool of softly glowing particles that
//! drift, bounce off the viewport edges, shy away from the pointer and scatter
//! on demand. Hosts feed it events, step it once per animation frame, and paint
//! the resulting [`DrawList`] on any [`Surface`].

pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::config::{
    FieldConfig, MotionConfig, ExplosionConfig, GlowStyle, RippleConfig, MAX_POOL_SIZE, MAX_RIPPLES,
};
pub use api::error::FieldError;
pub use api::types::{Viewport, ExplosionOrigin, Rect, ParticleState};
pub use crate::core::field::{ParticleField, DEFAULT_SEED};
pub use crate::core::particle::Particle;
pub use crate::core::rng::Rng;
pub use input::event::FieldEvent;
pub use systems::occlusion::Occluders;
pub use systems::ripple::{Ripple, RippleSet};
pub use renderer::color::Rgb;
pub use renderer::instance::{GlowInstance, RingInstance, DrawList};
pub use renderer::traits::{FrameData, Surface};
