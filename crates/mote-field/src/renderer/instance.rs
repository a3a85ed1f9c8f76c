use bytemuck::{Pod, Zeroable};

/// One filled, soft-glow circle. 4 floats = 16 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GlowInstance {
    /// X position in viewport pixels.
    pub x: f32,
    /// Y position in viewport pixels.
    pub y: f32,
    /// Drawn radius in pixels.
    pub radius: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
}

impl GlowInstance {
    pub const FLOATS: usize = 4;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// One stroked, expanding ring (click ripple). Same layout as [`GlowInstance`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RingInstance {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub alpha: f32,
}

impl RingInstance {
    pub const FLOATS: usize = 4;
}

/// Everything to paint for one frame. Rebuilt from scratch every frame.
pub struct DrawList {
    pub glows: Vec<GlowInstance>,
    pub rings: Vec<RingInstance>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    pub fn with_capacity(glows: usize) -> Self {
        Self {
            glows: Vec::with_capacity(glows),
            rings: Vec::with_capacity(16),
        }
    }

    pub fn clear(&mut self) {
        self.glows.clear();
        self.rings.clear();
    }

    pub fn push_glow(&mut self, glow: GlowInstance) {
        self.glows.push(glow);
    }

    pub fn glow_count(&self) -> u32 {
        self.glows.len() as u32
    }

    /// Glow instances as a flat float slice, `FLOATS` per instance.
    pub fn glow_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.glows)
    }
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}
