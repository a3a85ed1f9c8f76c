use crate::api::types::ExplosionOrigin;

/// Events the field reacts to, all in viewport pixel coordinates.
/// The host translates its own input (DOM events, UI callbacks) into these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEvent {
    /// The pointer moved to (x, y); particles near it are repelled.
    PointerMove { x: f32, y: f32 },
    /// The pointer left the viewport; repulsion stops.
    PointerLeave,
    /// The viewport changed size.
    Resize { width: f32, height: f32 },
    /// Apply a radial impulse to every particle from the origin.
    Explode(ExplosionOrigin),
    /// Start a transient ripple at (x, y).
    Ripple { x: f32, y: f32 },
}

impl FieldEvent {
    /// Build an explosion event, rejecting non-finite coordinates.
    pub fn explode(x: f32, y: f32) -> Result<Self, crate::FieldError> {
        Ok(FieldEvent::Explode(ExplosionOrigin::new(x, y)?))
    }
}
