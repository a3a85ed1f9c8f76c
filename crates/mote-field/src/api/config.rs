use serde::{Deserialize, Serialize};

use super::error::FieldError;
use crate::renderer::color::Rgb;

/// Largest accepted `pool_size`.
pub const MAX_POOL_SIZE: usize = 10_000;

/// Largest accepted `ripple.max_active`.
pub const MAX_RIPPLES: usize = 256;

/// Configuration for a particle field, provided by the host.
///
/// Every field has a default, so a host may pass `{}` or only the
/// values it wants to override:
///
/// ```
/// use mote_field::FieldConfig;
///
/// let config = FieldConfig::from_json(r#"{ "pool_size": 40, "seed": 7 }"#).unwrap();
/// assert_eq!(config.pool_size, 40);
/// assert_eq!(config.motion.repulsion_radius, 80.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles in the pool (default: 100). Constant for the field's lifetime.
    pub pool_size: usize,
    /// RNG seed. `None` lets the host pick one.
    pub seed: Option<u64>,
    pub motion: MotionConfig,
    pub explosion: ExplosionConfig,
    pub style: GlowStyle,
    pub ripple: RippleConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            pool_size: 100,
            seed: None,
            motion: MotionConfig::default(),
            explosion: ExplosionConfig::default(),
            style: GlowStyle::default(),
            ripple: RippleConfig::default(),
        }
    }
}

/// Per-frame force model. Velocities are in pixels per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Drawn radius range `[min, max]`, sampled once per particle.
    pub radius_range: [f32; 2],
    /// Base drift components are sampled from `[-drift_speed, drift_speed]`.
    pub drift_speed: f32,
    /// Velocity multiplier applied every frame.
    pub friction: f32,
    /// Fraction of the gap to base velocity closed per frame (resting particles only).
    pub restoring_rate: f32,
    /// Velocity multiplier on an edge bounce (sign is flipped separately).
    pub restitution: f32,
    /// How far an exploded particle may leave the viewport before it is replaced.
    pub offscreen_margin: f32,
    /// Spawn delay range `[min, max]` in frames for replacement particles.
    pub respawn_delay: [u32; 2],
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    pub resting_speed_cap: f32,
    pub exploded_speed_cap: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            radius_range: [2.0, 4.0],
            drift_speed: 0.15,
            friction: 0.99,
            restoring_rate: 0.005,
            restitution: 0.7,
            offscreen_margin: 50.0,
            respawn_delay: [120, 300],
            repulsion_radius: 80.0,
            repulsion_strength: 0.5,
            resting_speed_cap: 3.0,
            exploded_speed_cap: 15.0,
        }
    }
}

/// Radial impulse applied by an explosion trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    /// Distance at which the falloff reaches zero.
    pub reach: f32,
    /// Impulse magnitude at zero falloff.
    pub strength: f32,
    /// Upward bias subtracted from the vertical impulse.
    pub lift: f32,
    /// Per-axis jitter sampled from `[-jitter, jitter]`.
    pub jitter: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            reach: 1200.0,
            strength: 35.0,
            lift: 2.0,
            jitter: 2.5,
        }
    }
}

/// How particles are painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowStyle {
    /// Fill and glow colour.
    pub accent: Rgb,
    /// Opacity of an unobstructed particle.
    pub base_alpha: f32,
    /// Opacity multiplier for particles under an occluding region.
    pub occluded_factor: f32,
    /// Glow (shadow blur) radius in pixels.
    pub glow_blur: f32,
}

impl GlowStyle {
    /// Opacity for a particle, dimmed when occluded.
    pub fn alpha(&self, occluded: bool) -> f32 {
        if occluded {
            self.base_alpha * self.occluded_factor
        } else {
            self.base_alpha
        }
    }
}

impl Default for GlowStyle {
    fn default() -> Self {
        Self {
            accent: Rgb::LAVENDER,
            base_alpha: 0.3,
            occluded_factor: 0.6,
            glow_blur: 12.0,
        }
    }
}

/// Transient click ripples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    /// Spawn a ripple on every pointer press.
    pub on_pointer_down: bool,
    /// Frames a ripple stays alive.
    pub lifetime_frames: u32,
    /// Radius reached at the end of the lifetime.
    pub max_radius: f32,
    /// Opacity at birth; fades linearly to zero.
    pub base_alpha: f32,
    /// Upper bound on simultaneously live ripples; the oldest is evicted.
    pub max_active: usize,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            on_pointer_down: true,
            lifetime_frames: 36,
            max_radius: 60.0,
            base_alpha: 0.4,
            max_active: 16,
        }
    }
}

impl FieldConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, FieldError> {
        let config: FieldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value keeps the simulation stable.
    pub fn validate(&self) -> Result<(), FieldError> {
        let m = &self.motion;
        let e = &self.explosion;
        let s = &self.style;

        if !(1..=MAX_POOL_SIZE).contains(&self.pool_size) {
            return Err(invalid(format!("pool_size must be in 1..={MAX_POOL_SIZE}")));
        }
        ordered("motion.radius_range", m.radius_range)?;
        if m.radius_range[0] < 0.0 {
            return Err(invalid("motion.radius_range must be non-negative"));
        }
        if m.respawn_delay[0] > m.respawn_delay[1] {
            return Err(invalid("motion.respawn_delay must be [min, max]"));
        }
        non_negative("motion.drift_speed", m.drift_speed)?;
        if !(m.friction > 0.0 && m.friction <= 1.0) {
            return Err(invalid("motion.friction must be in (0, 1]"));
        }
        unit("motion.restoring_rate", m.restoring_rate)?;
        unit("motion.restitution", m.restitution)?;
        non_negative("motion.offscreen_margin", m.offscreen_margin)?;
        non_negative("motion.repulsion_radius", m.repulsion_radius)?;
        non_negative("motion.repulsion_strength", m.repulsion_strength)?;
        positive("motion.resting_speed_cap", m.resting_speed_cap)?;
        positive("motion.exploded_speed_cap", m.exploded_speed_cap)?;

        positive("explosion.reach", e.reach)?;
        non_negative("explosion.strength", e.strength)?;
        non_negative("explosion.lift", e.lift)?;
        non_negative("explosion.jitter", e.jitter)?;

        unit("style.base_alpha", s.base_alpha)?;
        unit("style.occluded_factor", s.occluded_factor)?;
        non_negative("style.glow_blur", s.glow_blur)?;

        unit("ripple.base_alpha", self.ripple.base_alpha)?;
        non_negative("ripple.max_radius", self.ripple.max_radius)?;
        if self.ripple.lifetime_frames == 0 {
            return Err(invalid("ripple.lifetime_frames must be at least 1"));
        }
        if self.ripple.max_active > MAX_RIPPLES {
            return Err(invalid(format!("ripple.max_active must be at most {MAX_RIPPLES}")));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> FieldError {
    FieldError::InvalidConfig(msg.into())
}

fn ordered(name: &str, range: [f32; 2]) -> Result<(), FieldError> {
    if range.iter().all(|v| v.is_finite()) && range[0] <= range[1] {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be a finite [min, max]")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), FieldError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite and >= 0")))
    }
}

fn positive(name: &str, value: f32) -> Result<(), FieldError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite and > 0")))
    }
}

fn unit(name: &str, value: f32) -> Result<(), FieldError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be in [0, 1]")))
    }
}
