//! Transient click ripples.
//!
//! Each ripple is stamped with the frame it was born on and pruned once per
//! frame when its age reaches the lifetime. Nothing is scheduled on a timer.

use std::collections::VecDeque;

use glam::Vec2;

use crate::api::config::RippleConfig;
use crate::renderer::instance::RingInstance;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub origin: Vec2,
    pub born: u64,
}

/// Live ripples, oldest first.
#[derive(Debug, Clone)]
pub struct RippleSet {
    ripples: VecDeque<Ripple>,
    config: RippleConfig,
}

impl RippleSet {
    pub fn new(config: RippleConfig) -> Self {
        Self {
            ripples: VecDeque::with_capacity(config.max_active),
            config,
        }
    }

    /// Start a ripple at `origin`. Evicts the oldest when full.
    pub fn spawn(&mut self, origin: Vec2, frame: u64) {
        if self.config.max_active == 0 {
            return;
        }
        while self.ripples.len() >= self.config.max_active {
            self.ripples.pop_front();
        }
        self.ripples.push_back(Ripple { origin, born: frame });
    }

    /// Drop every ripple whose age has reached the lifetime.
    pub fn prune(&mut self, frame: u64) {
        let lifetime = self.config.lifetime_frames as u64;
        self.ripples.retain(|r| frame.saturating_sub(r.born) < lifetime);
    }

    /// Append one ring per live ripple, sized and faded by age.
    pub fn write_instances(&self, frame: u64, out: &mut Vec<RingInstance>) {
        let lifetime = self.config.lifetime_frames.max(1) as f32;
        for ripple in &self.ripples {
            let t = (frame.saturating_sub(ripple.born) as f32 / lifetime).min(1.0);
            out.push(RingInstance {
                x: ripple.origin.x,
                y: ripple.origin.y,
                radius: self.config.max_radius * t,
                alpha: self.config.base_alpha * (1.0 - t),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.ripples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ripples.is_empty()
    }

    pub fn clear(&mut self) {
        self.ripples.clear();
    }
}
