use std::rc::Rc;

use crate::error::Result;
use crate::platform::Stage;
use crate::render::{Surface, SurfaceSpec};

/// The one surface an engine draws on, created lazily and released on cleanup.
pub struct SurfaceSlot {
    stage: Rc<dyn Stage>,
    spec: SurfaceSpec,
    surface: Option<Box<dyn Surface>>,
}

impl SurfaceSlot {
    pub fn new(stage: Rc<dyn Stage>, spec: SurfaceSpec) -> Self {
        Self {
            stage,
            spec,
            surface: None,
        }
    }

    pub fn marker(&self) -> &'static str {
        self.spec.marker
    }

    pub fn is_attached(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.is_attached())
    }

    /// Make sure an attached surface exists. Stray surfaces with the same
    /// marker are removed before a new one goes up.
    pub fn ensure(&mut self) -> Result<()> {
        if let Some(surface) = self.surface.as_mut() {
            if surface.is_attached() {
                return Ok(());
            }
            self.stage.remove_surfaces(self.spec.marker);
            return surface.attach();
        }
        let removed = self.stage.remove_surfaces(self.spec.marker);
        if removed > 0 {
            log::debug!("Removed {} stray {} surface(s)", removed, self.spec.marker);
        }
        let mut surface = self.stage.create_surface(self.spec)?;
        surface.attach()?;
        log::debug!("Attached {} surface", self.spec.marker);
        self.surface = Some(surface);
        Ok(())
    }

    /// The surface, only while it is on screen.
    pub fn active(&mut self) -> Option<&mut Box<dyn Surface>> {
        self.surface.as_mut().filter(|s| s.is_attached())
    }

    /// Detach and drop the surface, then sweep any others with the marker.
    pub fn release(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.detach();
        }
        self.stage.remove_surfaces(self.spec.marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessStage;
    use crate::render::Layer;
    use glam::Vec2;

    const SPEC: SurfaceSpec = SurfaceSpec {
        marker: "slot-test",
        layer: Layer::FIREWORKS,
    };

    #[test]
    fn test_ensure_is_idempotent() {
        let stage = Rc::new(HeadlessStage::new(Vec2::new(100.0, 100.0)));
        let mut slot = SurfaceSlot::new(stage.clone(), SPEC);
        slot.ensure().unwrap();
        slot.ensure().unwrap();
        assert_eq!(stage.created("slot-test"), 1);
        assert_eq!(stage.attached("slot-test"), 1);
    }

    #[test]
    fn test_ensure_sweeps_strays_first() {
        let stage = Rc::new(HeadlessStage::new(Vec2::new(100.0, 100.0)));
        let mut stray = stage.create_surface(SPEC).unwrap();
        stray.attach().unwrap();
        let mut slot = SurfaceSlot::new(stage.clone(), SPEC);
        slot.ensure().unwrap();
        assert_eq!(stage.attached("slot-test"), 1);
        assert!(!stray.is_attached());
    }

    #[test]
    fn test_reattaches_after_external_removal() {
        let stage = Rc::new(HeadlessStage::new(Vec2::new(100.0, 100.0)));
        let mut slot = SurfaceSlot::new(stage.clone(), SPEC);
        slot.ensure().unwrap();
        stage.remove_surfaces("slot-test");
        assert!(slot.active().is_none());
        slot.ensure().unwrap();
        assert!(slot.is_attached());
        assert_eq!(stage.created("slot-test"), 1);
    }

    #[test]
    fn test_release_clears_listeners() {
        let stage = Rc::new(HeadlessStage::new(Vec2::new(100.0, 100.0)));
        let mut slot = SurfaceSlot::new(stage.clone(), SPEC);
        slot.ensure().unwrap();
        slot.release();
        slot.release();
        assert_eq!(stage.attached_total(), 0);
        assert_eq!(stage.resize_listeners(), 0);
    }

    #[test]
    fn test_refused_surface_leaves_slot_empty() {
        let stage = Rc::new(HeadlessStage::new(Vec2::new(100.0, 100.0)));
        stage.refuse_surfaces(true);
        let mut slot = SurfaceSlot::new(stage.clone(), SPEC);
        assert!(slot.ensure().is_err());
        assert!(!slot.is_attached());
    }
}
