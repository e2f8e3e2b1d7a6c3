//! Error types for raindrops.
//!
//! GPU initialization, asset loading and configuration each get their own
//! error enum; [`SceneError`] wraps everything that can stop a scene from
//! running.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; ensure your system has a GPU with Vulkan/Metal/DX12/GL support")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture formats.
    #[error("surface has no supported formats for this adapter")]
    NoSurfaceFormat,
}

/// Errors that can occur while loading scene assets.
///
/// These never abort a running scene: the loader logs them and the
/// corresponding feature (background, text) stays absent.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Failed to read a file from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to decode an image.
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The font file could not be parsed.
    #[error("{0} is not a usable TrueType/OpenType font")]
    InvalidFont(PathBuf),
    /// None of the requested characters produced an outline.
    #[error("font has no outlines for text {0:?}")]
    EmptyText(String),
    /// Glyph outlines could not be tessellated.
    #[error("failed to tessellate glyph outlines: {0:?}")]
    Tessellation(lyon::tessellation::TessellationError),
}

/// Errors produced while loading or validating a scene configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for a scene.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A colour string was not recognised.
    #[error("invalid colour {0:?}; expected #RRGGBB, #RGB, 0xRRGGBB or a CSS name")]
    InvalidColor(String),
    /// A value is outside of its allowed range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when running a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The scene configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
