//! Host-supplied opaque regions that dim the particles drawn beneath them.
//!
//! The host decides what counts as foreground (a content panel, a button)
//! and reports its screen rectangle; the field only does point-in-rect tests.

use glam::Vec2;

use crate::api::types::Rect;

/// The set of foreground rectangles for the current frame.
#[derive(Debug, Clone, Default)]
pub struct Occluders {
    rects: Vec<Rect>,
}

impl Occluders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set (called once per frame by hosts that track live layout).
    pub fn replace(&mut self, rects: impl IntoIterator<Item = Rect>) {
        self.rects.clear();
        self.rects.extend(rects);
    }

    pub fn push(&mut self, rect: Rect) {
        self.rects.push(rect);
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Whether any region covers `point`.
    pub fn covers(&self, point: Vec2) -> bool {
        self.rects.iter().any(|r| r.contains(point))
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}
