//! The particle field: a fixed pool advanced once per animation frame.

use glam::Vec2;

use super::particle::Particle;
use super::rng::Rng;
use crate::api::config::FieldConfig;
use crate::api::error::FieldError;
use crate::api::types::{ExplosionOrigin, Viewport};
use crate::input::event::FieldEvent;
use crate::renderer::instance::{DrawList, GlowInstance};
use crate::systems::occlusion::Occluders;
use crate::systems::ripple::RippleSet;

/// Seed used when the config does not carry one.
pub const DEFAULT_SEED: u64 = 0x6d6f_7465;

/// Owns the particle pool and every piece of state the frame update reads.
///
/// Pointer position and viewport size are mirrored here from host events;
/// nothing outside the field reads or writes them.
pub struct ParticleField {
    particles: Vec<Particle>,
    config: FieldConfig,
    viewport: Viewport,
    pointer: Option<Vec2>,
    ripples: RippleSet,
    rng: Rng,
    frame: u64,
}

impl ParticleField {
    /// Validate `config` and fill the pool with resting particles spread over `viewport`.
    pub fn new(config: FieldConfig, viewport: Viewport) -> Result<Self, FieldError> {
        config.validate()?;
        let viewport = viewport.sanitized();
        let mut rng = Rng::new(config.seed.unwrap_or(DEFAULT_SEED));
        let particles = (0..config.pool_size)
            .map(|_| Particle::resting(&mut rng, viewport, &config.motion, 0))
            .collect();
        let ripples = RippleSet::new(config.ripple.clone());
        Ok(Self {
            particles,
            config,
            viewport,
            pointer: None,
            ripples,
            rng,
            frame: 0,
        })
    }

    /// Advance every particle by one frame.
    ///
    /// Pending particles only count down. Active ones get friction, drift
    /// relaxation (resting only), integration, edge handling, pointer
    /// repulsion and the speed cap, in that order. An exploded particle that
    /// has left the viewport by more than the margin is replaced in its slot
    /// by a fresh pending one.
    pub fn step(&mut self) {
        self.frame += 1;
        self.ripples.prune(self.frame);

        let motion = &self.config.motion;
        let viewport = self.viewport;
        let pointer = self.pointer;
        let mut replaced = 0usize;

        for particle in &mut self.particles {
            if particle.spawn_delay > 0 {
                particle.spawn_delay -= 1;
                continue;
            }

            particle.integrate(motion);

            if particle.exploded {
                if viewport.is_beyond(particle.position, motion.offscreen_margin) {
                    let delay = self
                        .rng
                        .range_inclusive(motion.respawn_delay[0], motion.respawn_delay[1]);
                    *particle = Particle::resting(&mut self.rng, viewport, motion, delay);
                    replaced += 1;
                    continue;
                }
            } else {
                particle.bounce(viewport, motion.restitution);
            }

            if let Some(pointer) = pointer {
                particle.repel(pointer, motion.repulsion_radius, motion.repulsion_strength);
            }

            particle.clamp_speed(motion);
        }

        if replaced > 0 {
            log::debug!("frame {}: respawned {} off-screen particles", self.frame, replaced);
        }
    }

    /// Radial impulse from `origin` to every particle, pending ones included.
    ///
    /// Falloff is linear to zero at `explosion.reach`. A particle sitting exactly
    /// on the origin has no direction, so it only receives the jitter.
    pub fn explode(&mut self, origin: ExplosionOrigin) {
        let blast = &self.config.explosion;
        let center = origin.point();

        for particle in &mut self.particles {
            let away = particle.position - center;
            let distance = away.length();
            let mut impulse = Vec2::ZERO;
            if distance > f32::EPSILON {
                let force = ((blast.reach - distance) / blast.reach).max(0.0);
                let angle = away.y.atan2(away.x);
                impulse = Vec2::from_angle(angle) * force * blast.strength;
                impulse.y -= blast.lift;
            }
            impulse += Vec2::new(
                self.rng.range(-blast.jitter, blast.jitter),
                self.rng.range(-blast.jitter, blast.jitter),
            );
            particle.velocity += impulse;
            particle.exploded = true;
        }

        log::debug!(
            "explosion at ({:.1}, {:.1}) hit {} particles",
            center.x,
            center.y,
            self.particles.len()
        );
    }

    /// Track (or forget) the pointer used for repulsion.
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer.filter(|p| p.is_finite());
    }

    /// Adopt new viewport bounds. Particles are not moved; resting ones
    /// bounce back inside on the next step.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
    }

    /// Start a transient ripple at `origin`, stamped with the current frame.
    pub fn ripple(&mut self, origin: Vec2) {
        if origin.is_finite() {
            self.ripples.spawn(origin, self.frame);
        }
    }

    /// Apply one host event.
    pub fn handle_event(&mut self, event: FieldEvent) {
        match event {
            FieldEvent::PointerMove { x, y } => {
                let point = Vec2::new(x, y);
                if point.is_finite() {
                    self.set_pointer(Some(point));
                } else {
                    log::debug!("ignoring non-finite pointer ({x}, {y})");
                }
            }
            FieldEvent::PointerLeave => self.set_pointer(None),
            FieldEvent::Resize { width, height } => {
                if width.is_finite() && height.is_finite() {
                    self.resize(Viewport::new(width, height));
                } else {
                    log::warn!("ignoring non-finite resize {width}x{height}");
                }
            }
            FieldEvent::Explode(origin) => self.explode(origin),
            FieldEvent::Ripple { x, y } => self.ripple(Vec2::new(x, y)),
        }
    }

    /// Rebuild `out` with one glow per active particle, dimmed where an
    /// occluder covers it, plus the live ripple rings.
    pub fn render_into(&self, occluders: &Occluders, out: &mut DrawList) {
        out.clear();
        let style = &self.config.style;
        for particle in self.particles.iter().filter(|p| p.is_active()) {
            out.push_glow(GlowInstance {
                x: particle.position.x,
                y: particle.position.y,
                radius: particle.radius,
                alpha: style.alpha(occluders.covers(particle.position)),
            });
        }
        self.ripples.write_instances(self.frame, &mut out.rings);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Pool size. Constant for the lifetime of the field.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn ripple_count(&self) -> usize {
        self.ripples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ParticleState, Rect};
    use proptest::prelude::*;

    fn field(pool_size: usize, seed: u64) -> ParticleField {
        let config = FieldConfig {
            pool_size,
            seed: Some(seed),
            ..FieldConfig::default()
        };
        ParticleField::new(config, Viewport::new(800.0, 600.0)).unwrap()
    }

    fn single(particle: Particle) -> ParticleField {
        let mut f = field(1, 1);
        f.particles_mut()[0] = particle;
        f
    }

    #[test]
    fn init_fills_pool_with_visible_resting_particles() {
        let f = field(100, 42);
        assert_eq!(f.len(), 100);
        for p in f.particles() {
            assert_eq!(p.state(), ParticleState::Resting);
            assert!(f.viewport().contains(p.position));
            assert_eq!(p.velocity, p.base_velocity);
        }
        assert_eq!(f.pointer(), None);
    }

    #[test]
    fn invalid_config_is_reported() {
        let config = FieldConfig { pool_size: 0, ..FieldConfig::default() };
        assert!(matches!(
            ParticleField::new(config, Viewport::default()),
            Err(FieldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn same_seed_same_field() {
        let a = field(20, 5);
        let b = field(20, 5);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn resting_particle_bounces_off_left_edge() {
        let mut p = Particle::new(Vec2::new(0.0, 300.0), Vec2::ZERO, 3.0);
        p.velocity = Vec2::new(-1.0, 0.0);
        let mut f = single(p);

        f.step();

        let p = &f.particles()[0];
        assert_eq!(p.position.x, 0.0);
        // -1 * 0.99, relaxed toward 0 by 0.5%, then reflected at 0.7
        let expected = 0.99 * (1.0 - 0.005) * 0.7;
        assert!(p.velocity.x > 0.0);
        assert!((p.velocity.x - expected).abs() < 1e-4, "vx = {}", p.velocity.x);
    }

    #[test]
    fn exploded_particle_past_margin_is_replaced_in_place() {
        let mut p = Particle::new(Vec2::new(900.0, 300.0), Vec2::ZERO, 3.0);
        p.velocity = Vec2::new(1.0, 0.0);
        p.exploded = true;
        let mut f = single(p);

        f.step();

        assert_eq!(f.len(), 1);
        let p = &f.particles()[0];
        assert!(!p.exploded);
        assert!((120..=300).contains(&p.spawn_delay), "delay {}", p.spawn_delay);
        assert!(f.viewport().contains(p.position));
        assert_eq!(p.state(), ParticleState::Pending);
    }

    #[test]
    fn exploded_particle_within_margin_passes_through_edge() {
        let mut p = Particle::new(Vec2::new(820.0, 300.0), Vec2::ZERO, 3.0);
        p.velocity = Vec2::new(2.0, 0.0);
        p.exploded = true;
        let mut f = single(p);

        f.step();

        let p = &f.particles()[0];
        assert!(p.exploded);
        assert!(p.position.x > 820.0);
        assert!(p.velocity.x > 0.0);
    }

    #[test]
    fn explosion_at_zero_distance_applies_jitter_only() {
        let mut f = single(Particle::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 3.0));

        f.explode(ExplosionOrigin::new(100.0, 100.0).unwrap());

        let p = &f.particles()[0];
        assert!(p.exploded);
        assert!(p.velocity.is_finite());
        assert!(p.velocity.x.abs() <= 2.5 && p.velocity.y.abs() <= 2.5, "{:?}", p.velocity);
    }

    #[test]
    fn explosion_pushes_away_from_origin_with_lift() {
        let mut f = single(Particle::new(Vec2::new(200.0, 100.0), Vec2::ZERO, 3.0));

        f.explode(ExplosionOrigin::new(100.0, 100.0).unwrap());

        // force = (1200 - 100) / 1200, impulse along +x, lift pulls y up
        let p = &f.particles()[0];
        let expected_x = 1100.0 / 1200.0 * 35.0;
        assert!((p.velocity.x - expected_x).abs() <= 2.5 + 1e-3);
        assert!(p.velocity.y <= -2.0 + 2.5 + 1e-3);
    }

    #[test]
    fn explosion_beyond_reach_gives_lift_and_jitter() {
        let mut f = single(Particle::new(Vec2::new(0.0, 0.0), Vec2::ZERO, 3.0));
        f.resize(Viewport::new(4000.0, 4000.0));

        f.explode(ExplosionOrigin::new(3000.0, 0.0).unwrap());

        let p = &f.particles()[0];
        assert!(p.exploded);
        assert!(p.velocity.x.abs() <= 2.5);
        assert!((-4.5..=0.5).contains(&p.velocity.y));
    }

    #[test]
    fn explosion_marks_pending_particles_and_keeps_their_delay() {
        let mut f = field(10, 3);
        f.particles_mut()[4].spawn_delay = 50;

        f.explode(ExplosionOrigin::new(400.0, 300.0).unwrap());

        assert!(f.particles().iter().all(|p| p.exploded));
        assert_eq!(f.particles()[4].spawn_delay, 50);
        assert_eq!(f.particles()[4].state(), ParticleState::Pending);
    }

    #[test]
    fn pending_particle_counts_down_without_moving() {
        let mut p = Particle::new(Vec2::new(10.0, 10.0), Vec2::new(0.1, 0.1), 3.0).with_delay(2);
        p.velocity = Vec2::new(5.0, 5.0);
        let mut f = single(p);

        f.step();
        assert_eq!(f.particles()[0].spawn_delay, 1);
        f.step();
        assert_eq!(f.particles()[0].spawn_delay, 0);
        assert_eq!(f.particles()[0].position, Vec2::new(10.0, 10.0));

        f.step();
        assert_ne!(f.particles()[0].position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn pending_particles_are_not_drawn() {
        let mut f = field(5, 8);
        f.particles_mut()[0].spawn_delay = 10;
        f.particles_mut()[3].spawn_delay = 1;
        let mut list = DrawList::new();

        f.render_into(&Occluders::new(), &mut list);

        assert_eq!(list.glow_count(), 3);
    }

    #[test]
    fn occluded_particles_are_dimmed() {
        let mut f = field(2, 8);
        f.particles_mut()[0].position = Vec2::new(50.0, 50.0);
        f.particles_mut()[1].position = Vec2::new(500.0, 500.0);
        let mut occ = Occluders::new();
        occ.push(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut list = DrawList::new();

        f.render_into(&occ, &mut list);

        assert!((list.glows[0].alpha - 0.18).abs() < 1e-6);
        assert_eq!(list.glows[1].alpha, 0.3);
        assert_eq!(list.glows[0].radius, f.particles()[0].radius);
    }

    #[test]
    fn pointer_repels_nearby_particle() {
        let mut f = single(Particle::new(Vec2::new(400.0, 300.0), Vec2::ZERO, 3.0));
        f.handle_event(FieldEvent::PointerMove { x: 380.0, y: 300.0 });

        f.step();

        assert!(f.particles()[0].velocity.x > 0.0);

        f.handle_event(FieldEvent::PointerLeave);
        assert_eq!(f.pointer(), None);
    }

    #[test]
    fn non_finite_pointer_is_ignored() {
        let mut f = field(1, 1);
        f.handle_event(FieldEvent::PointerMove { x: f32::NAN, y: 1.0 });
        assert_eq!(f.pointer(), None);
    }

    #[test]
    fn shrinking_viewport_pulls_resting_particles_back_inside() {
        let mut f = single(Particle::new(Vec2::new(700.0, 500.0), Vec2::ZERO, 3.0));

        f.handle_event(FieldEvent::Resize { width: 400.0, height: 300.0 });
        assert_eq!(f.particles()[0].position, Vec2::new(700.0, 500.0));

        f.step();
        assert_eq!(f.particles()[0].position, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn unclamped_viewport_is_sanitized_before_stepping() {
        let mut f = single(Particle::new(Vec2::new(700.0, 500.0), Vec2::ZERO, 3.0));
        f.resize(Viewport { width: -10.0, height: 600.0 });
        assert_eq!(f.viewport(), Viewport::new(0.0, 600.0));

        f.step();
        assert_eq!(f.particles()[0].position, Vec2::new(0.0, 500.0));

        let config = FieldConfig { pool_size: 5, seed: Some(3), ..FieldConfig::default() };
        let mut f = ParticleField::new(config, Viewport { width: f32::NAN, height: -1.0 }).unwrap();
        f.step();
        assert_eq!(f.viewport(), Viewport::new(0.0, 0.0));
        assert!(f.particles().iter().all(|p| p.position.is_finite()));
    }

    #[test]
    fn ripples_are_stamped_and_pruned_by_frame() {
        let mut f = field(1, 1);
        f.handle_event(FieldEvent::Ripple { x: 10.0, y: 10.0 });
        assert_eq!(f.ripple_count(), 1);

        let mut list = DrawList::new();
        f.render_into(&Occluders::new(), &mut list);
        assert_eq!(list.rings.len(), 1);

        for _ in 0..f.config().ripple.lifetime_frames {
            f.step();
        }
        assert_eq!(f.ripple_count(), 0);
    }

    #[test]
    fn pool_size_survives_frames_and_explosions() {
        let mut f = field(100, 77);
        for frame in 0..600 {
            if frame % 90 == 0 {
                f.explode(ExplosionOrigin::new(400.0, 300.0).unwrap());
            }
            f.step();
            assert_eq!(f.len(), 100);
        }
        assert_eq!(f.frame(), 600);
    }

    proptest! {
        #[test]
        fn stepping_keeps_speed_and_bounds_invariants(
            seed in any::<u64>(),
            frames in 1usize..150,
            pointer in (0f32..800.0, 0f32..600.0),
            blast in proptest::option::of((-200f32..1000.0, -200f32..800.0)),
            blast_frame in 0usize..150,
        ) {
            let mut f = field(40, seed);
            let motion = f.config().motion.clone();
            f.set_pointer(Some(Vec2::new(pointer.0, pointer.1)));

            for frame in 0..frames {
                if frame == blast_frame {
                    if let Some((x, y)) = blast {
                        f.explode(ExplosionOrigin::new(x, y).unwrap());
                    }
                }
                let was_active: Vec<bool> = f.particles().iter().map(|p| p.is_active()).collect();
                f.step();
                prop_assert_eq!(f.len(), 40);

                for (p, updated) in f.particles().iter().zip(was_active) {
                    if updated && p.is_active() {
                        prop_assert!(
                            p.speed() <= p.speed_cap(&motion) + 1e-3,
                            "speed {} over cap {}", p.speed(), p.speed_cap(&motion)
                        );
                    }
                    if p.state() == ParticleState::Resting {
                        prop_assert!(f.viewport().contains(p.position), "escaped: {:?}", p.position);
                    }
                }
            }
        }

        #[test]
        fn explosion_flags_every_slot(
            seed in any::<u64>(),
            x in -500f32..1500.0,
            y in -500f32..1500.0,
            delays in proptest::collection::vec(0u32..300, 25),
        ) {
            let mut f = field(25, seed);
            for (p, d) in f.particles_mut().iter_mut().zip(&delays) {
                p.spawn_delay = *d;
            }
            f.explode(ExplosionOrigin::new(x, y).unwrap());
            for (p, d) in f.particles().iter().zip(&delays) {
                prop_assert!(p.exploded);
                prop_assert_eq!(p.spawn_delay, *d);
                prop_assert!(p.velocity.is_finite());
            }
        }
    }
}
