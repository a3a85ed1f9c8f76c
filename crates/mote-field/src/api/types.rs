use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::error::FieldError;

/// Size of the drawing surface in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Negative and non-finite extents collapse to zero.
    pub fn new(width: f32, height: f32) -> Self {
        let extent = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: extent(width),
            height: extent(height),
        }
    }

    /// The same viewport passed back through [`Viewport::new`], for values
    /// built directly from the public fields.
    pub fn sanitized(self) -> Self {
        Self::new(self.width, self.height)
    }

    /// Whether `point` lies within `[0, width] × [0, height]`.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Whether `point` lies outside the viewport grown by `margin` on every side.
    pub fn is_beyond(&self, point: Vec2, margin: f32) -> bool {
        point.x < -margin
            || point.x > self.width + margin
            || point.y < -margin
            || point.y > self.height + margin
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Origin of an explosion, in viewport pixels.
/// Only constructible from finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionOrigin(Vec2);

impl ExplosionOrigin {
    pub fn new(x: f32, y: f32) -> Result<Self, FieldError> {
        if x.is_finite() && y.is_finite() {
            Ok(Self(Vec2::new(x, y)))
        } else {
            Err(FieldError::InvalidPoint { x, y })
        }
    }

    pub fn point(&self) -> Vec2 {
        self.0
    }
}

/// An opaque screen-space rectangle supplied by the host (a content panel,
/// a button). Particles drawn under one are dimmed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Edge-inclusive containment test.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Build rectangles from a flat `[x, y, w, h, x, y, w, h, ...]` slice.
    /// A trailing partial quad and quads with non-finite or negative extents are skipped.
    pub fn from_flat(values: &[f32]) -> Vec<Rect> {
        values
            .chunks_exact(4)
            .filter(|q| q.iter().all(|v| v.is_finite()) && q[2] >= 0.0 && q[3] >= 0.0)
            .map(|q| Rect::new(q[0], q[1], q[2], q[3]))
            .collect()
    }
}

/// Lifecycle state of a single particle.
///
/// `Pending → Resting → Exploded → (off-screen) → replaced → Pending`.
/// There is no `Exploded → Resting` edge for the same particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleState {
    /// Waiting out its spawn delay; neither updated nor drawn.
    Pending,
    /// Drifting, relaxing toward its base velocity, bouncing off edges.
    Resting,
    /// Hit by an explosion; passes through edges until replaced.
    Exploded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_rejects_non_finite() {
        assert!(ExplosionOrigin::new(10.0, 20.0).is_ok());
        assert_eq!(
            ExplosionOrigin::new(f32::INFINITY, 0.0),
            Err(FieldError::InvalidPoint { x: f32::INFINITY, y: 0.0 })
        );
        assert!(ExplosionOrigin::new(0.0, f32::NAN).is_err());
    }

    #[test]
    fn viewport_margin_test() {
        let vp = Viewport::new(800.0, 600.0);
        assert!(!vp.is_beyond(Vec2::new(840.0, 300.0), 50.0));
        assert!(vp.is_beyond(Vec2::new(900.0, 300.0), 50.0));
        assert!(vp.is_beyond(Vec2::new(10.0, -51.0), 50.0));
        assert!(vp.contains(Vec2::new(800.0, 0.0)));
        assert!(!vp.contains(Vec2::new(-0.1, 0.0)));
    }

    #[test]
    fn negative_viewport_is_clamped() {
        let vp = Viewport::new(-5.0, 10.0);
        assert_eq!(vp.width, 0.0);
        assert_eq!(Viewport::new(f32::NAN, f32::INFINITY), Viewport::new(0.0, 0.0));

        let raw = Viewport { width: -10.0, height: 600.0 };
        assert_eq!(raw.sanitized(), Viewport::new(0.0, 600.0));
    }

    #[test]
    fn rect_edges_are_inclusive() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Vec2::new(10.0, 30.0)));
        assert!(!r.contains(Vec2::new(30.1, 20.0)));
    }

    #[test]
    fn rects_from_flat_skip_bad_quads() {
        let rects = Rect::from_flat(&[0.0, 0.0, 10.0, 10.0, 5.0, 5.0, -1.0, 3.0, 1.0, 2.0]);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 10.0, 10.0)]);
    }
}
