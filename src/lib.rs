//! # raindrops
//!
//! Animated 3D raindrop scenes rendered with wgpu.
//!
//! A batch of lathe-shaped drops is scattered through a volume around the
//! origin and falls at a constant rate per frame. A drop that would drop
//! below the floor reappears at the ceiling. Drops are drawn with a glassy,
//! environment-lit material under an orbiting camera, optionally around a
//! line of extruded 3D text, with an egui panel for live material tweaks.
//!
//! ## Quick Start
//!
//! ```ignore
//! use raindrops::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut config = SceneConfig::preset(Variant::Named);
//!     config.spawn.count = 200;
//!     raindrops::run(config, ".")
//! }
//! ```
//!
//! ## Variants
//!
//! | Variant   | Drops | Extras                                         |
//! |-----------|-------|------------------------------------------------|
//! | `classic` | 150   | sky environment map, wireframe tweak           |
//! | `named`   | 110   | 3D text, double-click fullscreen               |
//! | `single`  | 1     | static, unlit, no controls                     |
//!
//! ## Animation
//!
//! The per-frame update is centralized: [`Scene::tick`] walks the
//! [`InstanceArena`] in index order and applies [`fall::advance`] to every
//! animated instance. The step is per frame, not per second, so the fall
//! speed follows the display refresh rate.
//!
//! ```
//! use raindrops::fall::{step, FallConfig};
//!
//! let cfg = FallConfig::default();
//! assert_eq!(step(-9.95, &cfg), 10.0);
//! ```
//!
//! ## Assets
//!
//! Paths in the config are resolved against an asset root:
//! `textures/environmentMap/sky.hdr` for the environment and
//! `fonts/vindey.ttf` for the text. Both load on background threads; if
//! either is missing the scene runs without it and logs a warning.

pub mod app;
pub mod assets;
pub mod config;
pub mod environment;
pub mod error;
pub mod fall;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod instance;
pub mod material;
pub mod panel;
pub mod scene;
pub mod spawn;
pub mod text;
pub mod time;
pub mod viewport;

pub use app::run;
pub use config::{SceneConfig, Variant};
pub use error::{AssetError, ConfigError, GpuError, SceneError};
pub use instance::{Instance, InstanceArena, InstanceId};
pub use scene::Scene;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{PanelConfig, SceneConfig, Variant, WindowConfig};
    pub use crate::error::SceneError;
    pub use crate::fall::FallConfig;
    pub use crate::gpu::camera::CameraConfig;
    pub use crate::material::{Color, Material, MaterialKind};
    pub use crate::spawn::SpawnConfig;
    pub use crate::text::TextConfig;
    pub use crate::Scene;
    pub use glam::{Vec2, Vec3};
}
