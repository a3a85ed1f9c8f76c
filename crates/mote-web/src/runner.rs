use mote_field::{
    DrawList, FieldConfig, FieldError, FieldEvent, FrameData, Occluders, ParticleField, Surface,
    Viewport,
};

/// Lifecycle controller that wires a [`ParticleField`] to a paint [`Surface`].
///
/// Knows nothing about the DOM, so the browser host and native tests share it.
/// `start` and `stop` are idempotent; while stopped, events and frames are
/// dropped without effect.
pub struct FieldRunner<S: Surface> {
    config: FieldConfig,
    occluders: Occluders,
    active: Option<ActiveField<S>>,
}

struct ActiveField<S> {
    field: ParticleField,
    surface: S,
    draw_list: DrawList,
}

impl<S: Surface> FieldRunner<S> {
    pub fn new(config: FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;
        Ok(Self {
            config,
            occluders: Occluders::new(),
            active: None,
        })
    }

    /// Build the field and acquire a surface. Returns `Ok(false)` without
    /// calling `make_surface` when already running.
    pub fn start<F>(&mut self, viewport: Viewport, make_surface: F) -> Result<bool, FieldError>
    where
        F: FnOnce(Viewport) -> Result<S, FieldError>,
    {
        if self.active.is_some() {
            log::warn!("particle field already running; start ignored");
            return Ok(false);
        }

        let field = ParticleField::new(self.config.clone(), viewport)?;
        let mut surface = make_surface(viewport)?;
        surface.resize(to_px(viewport.width), to_px(viewport.height));

        log::info!(
            "particle field started: {} particles on {} ({}x{})",
            field.len(),
            surface.backend(),
            viewport.width,
            viewport.height
        );

        self.active = Some(ActiveField {
            field,
            surface,
            draw_list: DrawList::with_capacity(self.config.pool_size),
        });
        Ok(true)
    }

    /// Detach the surface and drop the field. Returns whether anything was running.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(mut active) => {
                active.surface.detach();
                log::info!("particle field stopped after {} frames", active.field.frame());
                true
            }
            None => {
                log::warn!("particle field not running; stop ignored");
                false
            }
        }
    }

    /// Forward a host event. Returns `false` (and does nothing) while stopped.
    pub fn handle_event(&mut self, event: FieldEvent) -> bool {
        let Some(active) = self.active.as_mut() else {
            log::trace!("particle field stopped; dropping {event:?}");
            return false;
        };
        if let FieldEvent::Resize { width, height } = event {
            active.surface.resize(to_px(width), to_px(height));
        }
        active.field.handle_event(event);
        true
    }

    /// One animation tick: step, rebuild the draw list, clear, paint.
    /// Returns `false` while stopped so the caller can stop scheduling.
    pub fn frame(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        active.field.step();
        active.field.render_into(&self.occluders, &mut active.draw_list);

        active.surface.clear();
        active.surface.draw(&FrameData {
            glows: &active.draw_list.glows,
            rings: &active.draw_list.rings,
            style: &active.field.config().style,
        });
        true
    }

    /// Seed for the next `start`. A running field keeps its current layout.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = Some(seed);
    }

    /// Foreground regions used to dim particles. Kept across restarts.
    pub fn occluders_mut(&mut self) -> &mut Occluders {
        &mut self.occluders
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.active.as_ref().map(|a| &a.field)
    }

    /// The most recently painted frame.
    pub fn draw_list(&self) -> Option<&DrawList> {
        self.active.as_ref().map(|a| &a.draw_list)
    }

    pub fn surface(&self) -> Option<&S> {
        self.active.as_ref().map(|a| &a.surface)
    }
}

/// Viewport extent to whole surface pixels.
fn to_px(extent: f32) -> u32 {
    if extent.is_finite() {
        extent.max(0.0).round() as u32
    } else {
        0
    }
}
