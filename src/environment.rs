//! Equirectangular environment maps.
//!
//! The map is both the scene background and the source of reflections and
//! refractions on physical materials. Radiance `.hdr` files are the usual
//! input; PNG and JPEG also decode.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Where to find the environment map, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Path relative to the asset root. `None` disables the environment.
    pub path: Option<PathBuf>,
    /// Draw the map behind the scene, not only in reflections.
    pub background: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("textures/environmentMap/sky.hdr")),
            background: true,
        }
    }
}

impl EnvironmentConfig {
    pub fn disabled() -> Self {
        Self {
            path: None,
            background: false,
        }
    }
}

/// Decoded RGBA32F texels, row-major from the top-left.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<f32>,
}

impl EnvironmentMap {
    /// Load and decode an image, shrinking it to fit `max_dimension`.
    pub fn load(path: &Path, max_dimension: u32) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes, max_dimension).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Decode an in-memory image, shrinking it to fit `max_dimension`.
    pub fn decode(bytes: &[u8], max_dimension: u32) -> Result<Self, image::ImageError> {
        let mut img = image::load_from_memory(bytes)?;
        let max_dimension = max_dimension.max(1);
        if img.width() > max_dimension || img.height() > max_dimension {
            img = img.resize(
                max_dimension,
                max_dimension,
                image::imageops::FilterType::Triangle,
            );
        }
        let rgba = img.to_rgba32f();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            texels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb([x as u8, y as u8, 0]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png_to_rgba32f() {
        let map = EnvironmentMap::decode(&gradient_png(8, 4), 4096).unwrap();
        assert_eq!((map.width, map.height), (8, 4));
        assert_eq!(map.texels.len(), 8 * 4 * 4);
        // Alpha is filled in as opaque.
        assert_eq!(map.texels[3], 1.0);
    }

    #[test]
    fn test_decode_downscales_to_limit() {
        let map = EnvironmentMap::decode(&gradient_png(64, 32), 16).unwrap();
        assert_eq!((map.width, map.height), (16, 8));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = EnvironmentMap::load(Path::new("does/not/exist.hdr"), 1024).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_decode_rejects_non_image() {
        assert!(EnvironmentMap::decode(b"not an image", 1024).is_err());
    }
}
