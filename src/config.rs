//! Scene configuration.
//!
//! A [`SceneConfig`] describes everything the app builds at startup. The
//! three built-in variants are available through [`SceneConfig::preset`];
//! any of them can be written out as JSON, edited, and loaded back with
//! [`SceneConfig::load`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentConfig;
use crate::error::ConfigError;
use crate::fall::FallConfig;
use crate::geometry::LatheConfig;
use crate::gpu::camera::CameraConfig;
use crate::material::{Color, Material};
use crate::spawn::SpawnConfig;
use crate::text::TextConfig;

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// 150 glassy drops under a sky environment map.
    Classic,
    /// 110 drops around an extruded name.
    Named,
    /// One unlit drop close to the camera.
    Single,
}

/// Window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Initial logical size.
    pub width: u32,
    pub height: u32,
    /// Toggle borderless fullscreen on double click.
    pub fullscreen_on_double_click: bool,
    /// Clear colour when no environment background is shown.
    pub clear_color: Color,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "raindrops".to_string(),
            width: 1280,
            height: 720,
            fullscreen_on_double_click: false,
            clear_color: Color::BLACK,
        }
    }
}

/// Debug panel layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub enabled: bool,
    pub title: String,
    pub width: f32,
    /// Collapse the whole panel at startup.
    pub start_closed: bool,
    /// Collapse every folder at startup.
    pub folders_closed: bool,
    pub raindrop_folder: String,
    pub text_folder: String,
    /// Offer the wireframe checkbox in the raindrop folder.
    pub wireframe_toggle: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "raindrops".to_string(),
            width: 300.0,
            start_closed: false,
            folders_closed: true,
            raindrop_folder: "raindropTweaks".to_string(),
            text_folder: "nameTweaks".to_string(),
            wireframe_toggle: true,
        }
    }
}

/// Complete description of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub fall: FallConfig,
    pub spawn: SpawnConfig,
    pub lathe: LatheConfig,
    pub raindrop: Material,
    pub environment: EnvironmentConfig,
    pub text: Option<TextConfig>,
    pub panel: PanelConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl SceneConfig {
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self::classic(),
            Variant::Named => Self::named(),
            Variant::Single => Self::single(),
        }
    }

    /// 150 clear-water drops, tweakable wireframe.
    pub fn classic() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            fall: FallConfig::default(),
            spawn: SpawnConfig::default(),
            lathe: LatheConfig::default(),
            raindrop: Material::water(Color::from_srgb(0xB0, 0xD0, 0xD3), 6.613),
            environment: EnvironmentConfig::default(),
            text: None,
            panel: PanelConfig::default(),
        }
    }

    /// 110 light-blue drops in a wider volume around 3D text.
    pub fn named() -> Self {
        Self {
            window: WindowConfig {
                fullscreen_on_double_click: true,
                ..WindowConfig::default()
            },
            spawn: SpawnConfig {
                count: 110,
                spread: glam::Vec3::new(25.0, 20.0, 20.0),
                scale: 0.4,
                ..SpawnConfig::default()
            },
            raindrop: Material::water(Color::from_srgb(0xA7, 0xC7, 0xE7), 4.0),
            text: Some(TextConfig::default()),
            panel: PanelConfig {
                title: "Tweaks".to_string(),
                start_closed: true,
                raindrop_folder: "rainTweaks".to_string(),
                wireframe_toggle: false,
                ..PanelConfig::default()
            },
            ..Self::classic()
        }
    }

    /// A single unlit drop, no environment, no controls.
    pub fn single() -> Self {
        Self {
            camera: CameraConfig {
                distance: 3.0,
                orbit_controls: false,
                ..CameraConfig::default()
            },
            spawn: SpawnConfig {
                count: 1,
                spread: glam::Vec3::ZERO,
                scale: 1.0,
                animated: false,
                seed: Some(0),
            },
            raindrop: Material::basic(Color::from_srgb(0x00, 0x77, 0xFF), 0.8),
            environment: EnvironmentConfig::disabled(),
            panel: PanelConfig {
                enabled: false,
                ..PanelConfig::default()
            },
            ..Self::classic()
        }
    }

    /// Read a JSON config file. Missing fields take the classic defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // Every field is a plain value or string, so this cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::invalid("window", "size must be non-zero"));
        }
        let cam = &self.camera;
        if !(cam.fov_y_degrees > 0.0 && cam.fov_y_degrees < 180.0) {
            return Err(ConfigError::invalid("camera.fov_y_degrees", "must be in (0, 180)"));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::invalid("camera", "need 0 < near < far"));
        }
        self.fall.validate()?;
        self.spawn.validate()?;
        self.lathe.validate()?;
        self.raindrop.validate("raindrop")?;
        if let Some(text) = &self.text {
            text.validate()?;
        }
        Ok(())
    }
}
