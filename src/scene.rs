//! GPU-independent scene state.
//!
//! [`Scene`] owns everything that changes from frame to frame: the raindrop
//! arena, the optional text instance, the camera, its orbit controls and the
//! viewport. The app calls [`Scene::tick`] once per redraw and then hands the
//! scene to the renderer.

use glam::Vec3;

use crate::config::SceneConfig;
use crate::gpu::camera::{OrbitControls, PerspectiveCamera};
use crate::input::PointerAction;
use crate::instance::{Instance, InstanceArena, InstanceRaw};
use crate::spawn::Spawner;
use crate::time::FrameClock;
use crate::viewport::Viewport;

/// Summary of one tick, for logging and the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub wrapped: usize,
}

pub struct Scene {
    pub config: SceneConfig,
    pub raindrops: InstanceArena,
    /// The text mesh instance, present once the font has loaded.
    pub text: Option<Instance>,
    pub camera: PerspectiveCamera,
    pub controls: Option<OrbitControls>,
    pub viewport: Viewport,
    pub clock: FrameClock,
}

impl Scene {
    /// Build the camera, controls and raindrop batch.
    pub fn new(config: SceneConfig, viewport: Viewport) -> Self {
        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());
        let controls = config
            .camera
            .orbit_controls
            .then(|| OrbitControls::new(&camera, config.camera.damping));
        let raindrops = Spawner::new(config.spawn).spawn();

        Self {
            config,
            raindrops,
            text: None,
            camera,
            controls,
            viewport,
            clock: FrameClock::new(),
        }
    }

    /// Advance the scene by one frame.
    ///
    /// Every raindrop is moved in index order, then the camera follows the
    /// orbit controls.
    pub fn tick(&mut self) -> TickStats {
        self.clock.tick();
        let wrapped = self.raindrops.animate(&self.config.fall);

        if let Some(controls) = &mut self.controls {
            controls.update();
            controls.apply(&mut self.camera);
        }

        TickStats { wrapped }
    }

    /// Viewport responder: keep the camera aspect in step with the window.
    ///
    /// Returns `false` if the size was degenerate and nothing changed.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> bool {
        if !self.viewport.resize(width, height, device_pixel_ratio) {
            return false;
        }
        self.camera.aspect = self.viewport.aspect();
        true
    }

    /// Apply pointer input to the orbit controls.
    pub fn handle_pointer(&mut self, action: PointerAction) {
        let Some(controls) = &mut self.controls else {
            return;
        };
        match action {
            PointerAction::Drag(d) => controls.rotate(d.x, d.y),
            PointerAction::Zoom(lines) => controls.zoom(lines),
            PointerAction::DoubleClick => {}
        }
    }

    /// Place the text mesh at the origin with the configured scale.
    pub fn attach_text(&mut self) {
        if let Some(text) = &self.config.text {
            self.text = Some(Instance::fixed(Vec3::ZERO, Vec3::splat(text.scale)));
        }
    }

    /// Raindrop instance data sorted for blending from the current camera.
    pub fn raindrop_instances(&self) -> Vec<InstanceRaw> {
        if self.config.raindrop.transparent {
            self.raindrops.sorted_back_to_front(self.camera.position)
        } else {
            self.raindrops.raw()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use approx::assert_relative_eq;

    fn scene(variant: Variant) -> Scene {
        let mut config = SceneConfig::preset(variant);
        config.spawn.seed = Some(1);
        Scene::new(config, Viewport::new(800.0, 600.0, 1.0))
    }

    #[test]
    fn test_bootstrap_spawns_configured_batch() {
        let s = scene(Variant::Classic);
        assert_eq!(s.raindrops.len(), 150);
        assert!(s.controls.is_some());
        assert_relative_eq!(s.camera.aspect, 800.0 / 600.0);
    }

    #[test]
    fn test_tick_moves_every_drop_down_or_wraps() {
        let mut s = scene(Variant::Classic);
        let before: Vec<f32> = s.raindrops.iter().map(|(_, i)| i.position.y).collect();
        let stats = s.tick();

        let mut wraps = 0;
        for ((_, inst), y0) in s.raindrops.iter().zip(before) {
            if inst.position.y == s.config.fall.ceiling_y && y0 - 0.1 < -10.0 {
                wraps += 1;
            } else {
                assert_relative_eq!(inst.position.y, y0 - 0.1, epsilon = 1e-5);
            }
        }
        assert_eq!(stats.wrapped, wraps);
    }

    #[test]
    fn test_positions_stay_above_floor() {
        let mut s = scene(Variant::Named);
        for _ in 0..500 {
            s.tick();
            for (_, inst) in s.raindrops.iter() {
                assert!(inst.position.y >= s.config.fall.floor_y);
            }
        }
    }

    #[test]
    fn test_single_variant_does_not_move() {
        let mut s = scene(Variant::Single);
        s.tick();
        s.tick();
        let (_, inst) = s.raindrops.iter().next().unwrap();
        assert_eq!(inst.position, Vec3::ZERO);
        assert_eq!(s.camera.position, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_resize_updates_camera_aspect() {
        let mut s = scene(Variant::Classic);
        assert!(s.resize(1920.0, 1080.0, 3.0));
        assert_relative_eq!(s.camera.aspect, 1.778, epsilon = 1e-3);
        assert_eq!(s.viewport.size(), (1920.0, 1080.0));
        assert_eq!(s.viewport.pixel_ratio(), 2.0);

        assert!(!s.resize(0.0, 0.0, 1.0));
        assert_relative_eq!(s.camera.aspect, 1.778, epsilon = 1e-3);
    }

    #[test]
    fn test_drag_orbits_camera_around_origin() {
        let mut s = scene(Variant::Classic);
        s.handle_pointer(PointerAction::Drag(glam::Vec2::new(-200.0, 0.0)));
        for _ in 0..100 {
            s.tick();
        }
        assert!(s.camera.position.x > 0.0);
        assert_relative_eq!(s.camera.position.length(), 5.0, epsilon = 1e-4);
        assert_eq!(s.camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_attach_text_uses_config_scale() {
        let mut s = scene(Variant::Named);
        s.attach_text();
        assert_eq!(s.text.unwrap().scale, Vec3::splat(2.0));

        let mut s = scene(Variant::Classic);
        s.attach_text();
        assert!(s.text.is_none());
    }
}
