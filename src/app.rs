//! Window and event loop.
//!
//! [`run`] opens the window, then drives one [`Scene::tick`] and one render
//! per `RedrawRequested`, requesting the next redraw immediately.

use std::path::PathBuf;
use std::sync::Arc;

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use crate::assets::{AssetLoader, LoadedAsset};
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::gpu::{EguiIntegration, GpuState};
use crate::input::{Pointer, PointerAction};
use crate::panel::{self, PanelStats};
use crate::scene::Scene;
use crate::viewport::Viewport;

/// Run a scene until its window is closed.
pub fn run(config: SceneConfig, asset_root: impl Into<PathBuf>) -> Result<(), SceneError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, asset_root.into());
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Everything that exists once the window is open.
struct Running {
    window: Arc<Window>,
    scene: Scene,
    gpu: GpuState,
    egui: Option<EguiIntegration>,
    pointer: Pointer,
    assets: AssetLoader,
}

pub struct App {
    config: Option<SceneConfig>,
    asset_root: PathBuf,
    running: Option<Running>,
    error: Option<SceneError>,
}

impl App {
    pub fn new(config: SceneConfig, asset_root: PathBuf) -> Self {
        Self {
            config: Some(config),
            asset_root,
            running: None,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop, config: SceneConfig) -> Result<Running, SceneError> {
        let window_attrs = Window::default_attributes()
            .with_title(config.window.title.as_str())
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let scene = Scene::new(config, viewport);
        let gpu = pollster::block_on(GpuState::new(window.clone(), &scene))?;

        let mut assets = AssetLoader::new(&self.asset_root);
        if let Some(path) = &scene.config.environment.path {
            assets.load_environment(path, gpu.max_texture_dimension());
        }
        if let Some(text) = &scene.config.text {
            assets.load_text(text);
        }

        let egui = scene
            .config
            .panel
            .enabled
            .then(|| EguiIntegration::new(&gpu.device, gpu.surface_format(), &window));

        info!(
            "Scene ready: {} drops, {}x{} drawing buffer",
            scene.raindrops.len(),
            scene.viewport.drawing_buffer_size().0,
            scene.viewport.drawing_buffer_size().1,
        );

        Ok(Running {
            window,
            scene,
            gpu,
            egui,
            pointer: Pointer::new(),
            assets,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };
        match self.start(event_loop, config) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => {
                error!("{e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        // The panel sees every event first.
        let consumed = match &mut running.egui {
            Some(egui) => egui.on_window_event(&running.window, &event),
            None => false,
        };

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                running.resize(*physical_size, running.window.scale_factor());
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                running.resize(running.window.inner_size(), *scale_factor);
            }
            WindowEvent::RedrawRequested => {
                running.frame(event_loop);
                running.window.request_redraw();
            }
            other if consumed => running.pointer.track(other, running.window.scale_factor()),
            other => running.pointer_event(other),
        }
    }
}

impl Running {
    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let logical = size.to_logical::<f64>(scale_factor);
        if self.scene.resize(logical.width, logical.height, scale_factor) {
            debug!(
                "Resized to {}x{} @ {:.2} (aspect {:.3})",
                logical.width,
                logical.height,
                self.scene.viewport.pixel_ratio(),
                self.scene.camera.aspect
            );
        }
        self.gpu.resize(size, self.scene.viewport.drawing_buffer_size());
    }

    fn pointer_event(&mut self, event: &WindowEvent) {
        let Some(action) = self.pointer.handle_event(event, self.window.scale_factor()) else {
            return;
        };
        match action {
            PointerAction::DoubleClick if self.scene.config.window.fullscreen_on_double_click => {
                toggle_fullscreen(&self.window);
            }
            action => self.scene.handle_pointer(action),
        }
    }

    fn receive_assets(&mut self) {
        for asset in self.assets.poll() {
            match asset {
                LoadedAsset::Environment(map) => {
                    debug!("Environment map {}x{}", map.width, map.height);
                    self.gpu.set_environment(&map);
                }
                LoadedAsset::Text(mesh) => {
                    if let Some(text) = &self.scene.config.text {
                        debug!("Text mesh with {} triangles", mesh.triangle_count());
                        self.gpu.set_text_mesh(&mesh, &text.material);
                        self.scene.attach_text();
                    }
                }
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        self.receive_assets();

        let stats = self.scene.tick();
        if stats.wrapped > 0 {
            trace!("{} drops wrapped to the ceiling", stats.wrapped);
        }

        let egui_output = match self.egui.as_mut() {
            Some(egui) => {
                egui.begin_frame(&self.window);

                let panel_stats = PanelStats {
                    fps: self.scene.clock.fps(),
                    frame_ms: self.scene.clock.delta() * 1000.0,
                    instances: self.scene.raindrops.len(),
                };
                let config = &mut self.scene.config;
                let text_material = match &mut config.text {
                    Some(text) if self.gpu.has_text() => Some(&mut text.material),
                    _ => None,
                };
                let changed = panel::show(
                    &egui.ctx,
                    &config.panel,
                    &mut config.raindrop,
                    text_material,
                    panel_stats,
                );
                if changed {
                    self.gpu.update_materials(
                        &config.raindrop,
                        config.text.as_ref().map(|t| &t.material),
                    );
                }

                let output = egui.end_frame(&self.window);
                Some((egui, output))
            }
            None => None,
        };

        match self.gpu.render(&self.scene, egui_output) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {e}"),
        }
    }
}

fn toggle_fullscreen(window: &Window) {
    if window.fullscreen().is_some() {
        debug!("Leaving fullscreen");
        window.set_fullscreen(None);
    } else {
        debug!("Entering borderless fullscreen");
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }
}
