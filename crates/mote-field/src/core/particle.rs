//! A single pooled particle and the per-axis pieces of the force model.

use glam::Vec2;

use super::rng::Rng;
use crate::api::config::MotionConfig;
use crate::api::types::{ParticleState, Viewport};

/// A single particle. Velocities are in pixels per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Drift velocity a resting particle relaxes back toward.
    pub base_velocity: Vec2,
    /// Drawn radius, fixed at creation.
    pub radius: f32,
    /// Set by an explosion. Never cleared for this particle; only a replacement resets it.
    pub exploded: bool,
    /// Frames left before the particle is updated or drawn.
    pub spawn_delay: u32,
}

impl Particle {
    /// A particle at rest with an explicit position and drift.
    pub fn new(position: Vec2, base_velocity: Vec2, radius: f32) -> Self {
        Particle {
            position,
            velocity: base_velocity,
            base_velocity,
            radius,
            exploded: false,
            spawn_delay: 0,
        }
    }

    pub fn with_delay(mut self, spawn_delay: u32) -> Self {
        self.spawn_delay = spawn_delay;
        self
    }

    /// Sample a fresh resting particle somewhere inside `viewport`.
    pub fn resting(rng: &mut Rng, viewport: Viewport, motion: &MotionConfig, spawn_delay: u32) -> Self {
        let position = Vec2::new(
            rng.range(0.0, viewport.width),
            rng.range(0.0, viewport.height),
        );
        let radius = rng.range(motion.radius_range[0], motion.radius_range[1]);
        let drift = motion.drift_speed;
        let base_velocity = Vec2::new(rng.range(-drift, drift), rng.range(-drift, drift));
        Particle::new(position, base_velocity, radius).with_delay(spawn_delay)
    }

    pub fn state(&self) -> ParticleState {
        if self.spawn_delay > 0 {
            ParticleState::Pending
        } else if self.exploded {
            ParticleState::Exploded
        } else {
            ParticleState::Resting
        }
    }

    pub fn is_active(&self) -> bool {
        self.spawn_delay == 0
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn speed_cap(&self, motion: &MotionConfig) -> f32 {
        if self.exploded {
            motion.exploded_speed_cap
        } else {
            motion.resting_speed_cap
        }
    }

    /// Friction, then (resting only) relaxation toward the base drift, then integration.
    pub fn integrate(&mut self, motion: &MotionConfig) {
        self.velocity *= motion.friction;
        if !self.exploded {
            self.velocity += (self.base_velocity - self.velocity) * motion.restoring_rate;
        }
        self.position += self.velocity;
    }

    /// Reflect off the viewport edges and clamp back inside. Applied per axis.
    pub fn bounce(&mut self, viewport: Viewport, restitution: f32) {
        if self.position.x < 0.0 || self.position.x > viewport.width {
            self.velocity.x *= -restitution;
            self.position.x = self.position.x.clamp(0.0, viewport.width);
        }
        if self.position.y < 0.0 || self.position.y > viewport.height {
            self.velocity.y *= -restitution;
            self.position.y = self.position.y.clamp(0.0, viewport.height);
        }
    }

    /// Push away from `pointer` when inside `radius`.
    /// A particle exactly on the pointer gets no push.
    pub fn repel(&mut self, pointer: Vec2, radius: f32, strength: f32) {
        let away = self.position - pointer;
        let distance = away.length();
        if distance >= radius || distance <= f32::EPSILON {
            return;
        }
        let force = (radius - distance) / radius;
        self.velocity += away / distance * force * strength;
    }

    /// Rescale velocity to the state-dependent cap, keeping its direction.
    pub fn clamp_speed(&mut self, motion: &MotionConfig) {
        self.velocity = self.velocity.clamp_length_max(self.speed_cap(motion));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion() -> MotionConfig {
        MotionConfig::default()
    }

    #[test]
    fn resting_sample_respects_ranges() {
        let mut rng = Rng::new(11);
        let vp = Viewport::new(320.0, 200.0);
        for _ in 0..500 {
            let p = Particle::resting(&mut rng, vp, &motion(), 0);
            assert!(vp.contains(p.position));
            assert!((2.0..=4.0).contains(&p.radius));
            assert!(p.base_velocity.x.abs() <= 0.15 && p.base_velocity.y.abs() <= 0.15);
            assert_eq!(p.velocity, p.base_velocity);
            assert_eq!(p.state(), ParticleState::Resting);
        }
    }

    #[test]
    fn state_follows_delay_then_flag() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 3.0).with_delay(5);
        assert_eq!(p.state(), ParticleState::Pending);
        p.exploded = true;
        assert_eq!(p.state(), ParticleState::Pending);
        p.spawn_delay = 0;
        assert_eq!(p.state(), ParticleState::Exploded);
    }

    #[test]
    fn exploded_particles_skip_restoring_force() {
        let mut resting = Particle::new(Vec2::ZERO, Vec2::new(1.0, 0.0), 3.0);
        resting.velocity = Vec2::ZERO;
        resting.integrate(&motion());
        assert!(resting.velocity.x > 0.0);

        let mut exploded = resting.clone();
        exploded.velocity = Vec2::ZERO;
        exploded.exploded = true;
        exploded.integrate(&motion());
        assert_eq!(exploded.velocity, Vec2::ZERO);
    }

    #[test]
    fn bounce_reflects_and_clamps_each_axis() {
        let vp = Viewport::new(100.0, 100.0);
        let mut p = Particle::new(Vec2::new(101.0, -2.0), Vec2::ZERO, 3.0);
        p.velocity = Vec2::new(2.0, -1.0);
        p.bounce(vp, 0.7);
        assert_eq!(p.position, Vec2::new(100.0, 0.0));
        assert!((p.velocity.x + 1.4).abs() < 1e-6);
        assert!((p.velocity.y - 0.7).abs() < 1e-6);
    }

    #[test]
    fn repel_pushes_away_within_radius() {
        let mut p = Particle::new(Vec2::new(40.0, 0.0), Vec2::ZERO, 3.0);
        p.repel(Vec2::ZERO, 80.0, 0.5);
        // (80 - 40) / 80 * 0.5 along +x
        assert!((p.velocity.x - 0.25).abs() < 1e-6);
        assert_eq!(p.velocity.y, 0.0);

        let mut far = Particle::new(Vec2::new(200.0, 0.0), Vec2::ZERO, 3.0);
        far.repel(Vec2::ZERO, 80.0, 0.5);
        assert_eq!(far.velocity, Vec2::ZERO);
    }

    #[test]
    fn repel_at_zero_distance_is_a_no_op() {
        let mut p = Particle::new(Vec2::new(5.0, 5.0), Vec2::ZERO, 3.0);
        p.repel(Vec2::new(5.0, 5.0), 80.0, 0.5);
        assert_eq!(p.velocity, Vec2::ZERO);
        assert!(p.velocity.is_finite());
    }

    #[test]
    fn clamp_speed_keeps_direction() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 3.0);
        p.velocity = Vec2::new(30.0, 40.0);
        p.clamp_speed(&motion());
        assert!((p.speed() - 3.0).abs() < 1e-5);
        assert!((p.velocity.x / p.velocity.y - 0.75).abs() < 1e-5);

        p.exploded = true;
        p.velocity = Vec2::new(30.0, 40.0);
        p.clamp_speed(&motion());
        assert!((p.speed() - 15.0).abs() < 1e-4);
    }
}
