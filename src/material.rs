//! Surface materials.
//!
//! Colours are written the way a stylesheet would write them (`#B0D0D3`,
//! `black`) and converted to linear RGB for the shader.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Linear RGB colour that keeps the sRGB hex it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    srgb: [u8; 3],
}

impl Color {
    pub const BLACK: Color = Color::from_srgb(0, 0, 0);
    pub const WHITE: Color = Color::from_srgb(255, 255, 255);

    pub const fn from_srgb(r: u8, g: u8, b: u8) -> Self {
        Self { srgb: [r, g, b] }
    }

    /// Parse `#RRGGBB`, `#RGB`, `0xRRGGBB` or one of a few CSS names.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let t = s.trim();

        match t.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            "red" => return Ok(Self::from_srgb(255, 0, 0)),
            "blue" => return Ok(Self::from_srgb(0, 0, 255)),
            _ => {}
        }

        let hex = t
            .strip_prefix('#')
            .or_else(|| t.strip_prefix("0x"))
            .or_else(|| t.strip_prefix("0X"))
            .ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match hex.len() {
            6 => {
                let v = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
                Ok(Self::from_srgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
            }
            3 => {
                let v = u16::from_str_radix(hex, 16).map_err(|_| invalid())?;
                let expand = |n: u16| ((n & 0xF) as u8) * 17;
                Ok(Self::from_srgb(expand(v >> 8), expand(v >> 4), expand(v)))
            }
            _ => Err(invalid()),
        }
    }

    pub fn srgb(&self) -> [u8; 3] {
        self.srgb
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.srgb;
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Linear RGB in 0..1.
    pub fn to_linear(&self) -> Vec3 {
        let [r, g, b] = self.srgb;
        Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Lighting model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    /// Flat colour, no lighting.
    Basic,
    /// Environment-lit with refraction, reflection and transmission.
    Physical,
}

/// Range and step of a material slider in the debug panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweakRange {
    pub min: f32,
    pub max: f32,
    pub step: f64,
}

pub const TRANSMISSION_RANGE: TweakRange = TweakRange {
    min: 0.0,
    max: 1.0,
    step: 0.0001,
};
pub const IOR_RANGE: TweakRange = TweakRange {
    min: 1.0,
    max: 10.0,
    step: 0.0001,
};
pub const THICKNESS_RANGE: TweakRange = TweakRange {
    min: 0.0,
    max: 1.0,
    step: 0.0001,
};

/// Material shared by every instance of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub metalness: f32,
    pub roughness: f32,
    pub transmission: f32,
    pub ior: f32,
    pub thickness: f32,
    pub wireframe: bool,
    pub flat_shading: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Physical,
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            metalness: 0.0,
            roughness: 1.0,
            transmission: 0.0,
            ior: 1.5,
            thickness: 0.0,
            wireframe: false,
            flat_shading: false,
        }
    }
}

impl Material {
    /// Clear, glassy water drop.
    pub fn water(color: Color, ior: f32) -> Self {
        Self {
            kind: MaterialKind::Physical,
            color,
            opacity: 0.5,
            transparent: true,
            metalness: 0.0,
            roughness: 0.0,
            transmission: 1.0,
            ior,
            thickness: 0.0,
            wireframe: false,
            flat_shading: false,
        }
    }

    /// Unlit translucent colour.
    pub fn basic(color: Color, opacity: f32) -> Self {
        Self {
            kind: MaterialKind::Basic,
            color,
            opacity,
            transparent: true,
            ..Self::default()
        }
    }

    /// Opaque, flat shaded physical material.
    pub fn flat(color: Color) -> Self {
        Self {
            flat_shading: true,
            ..Self::default()
        }
        .with_color(color)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Clamp panel-tweakable values into their slider ranges.
    pub fn clamp_tweaks(&mut self) {
        self.transmission = self.transmission.clamp(TRANSMISSION_RANGE.min, TRANSMISSION_RANGE.max);
        self.ior = self.ior.clamp(IOR_RANGE.min, IOR_RANGE.max);
        self.thickness = self.thickness.clamp(THICKNESS_RANGE.min, THICKNESS_RANGE.max);
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self.metalness = self.metalness.clamp(0.0, 1.0);
        self.roughness = self.roughness.clamp(0.0, 1.0);
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        let values = [
            self.opacity,
            self.metalness,
            self.roughness,
            self.transmission,
            self.ior,
            self.thickness,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::invalid(field, "material values must be finite"));
        }
        if self.ior < IOR_RANGE.min {
            return Err(ConfigError::invalid(field, "ior must be at least 1"));
        }
        Ok(())
    }

    /// Effective alpha: opaque materials ignore `opacity`.
    pub fn alpha(&self) -> f32 {
        if self.transparent {
            self.opacity
        } else {
            1.0
        }
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        let c = self.color.to_linear();
        MaterialUniform {
            color: [c.x, c.y, c.z, self.alpha()],
            params: [self.metalness, self.roughness, self.transmission, self.ior],
            extra: [
                self.thickness,
                self.flat_shading as u32 as f32,
                match self.kind {
                    MaterialKind::Basic => 0.0,
                    MaterialKind::Physical => 1.0,
                },
                0.0,
            ],
        }
    }
}

/// GPU layout of a [`Material`]. Must match `MaterialUniform` in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Linear RGB plus alpha.
    pub color: [f32; 4],
    /// metalness, roughness, transmission, ior.
    pub params: [f32; 4],
    /// thickness, flat shading flag, physical flag, unused.
    pub extra: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse("#B0D0D3").unwrap().srgb(), [0xB0, 0xD0, 0xD3]);
        assert_eq!(Color::parse("0x0077ff").unwrap().srgb(), [0x00, 0x77, 0xFF]);
        assert_eq!(Color::parse("#abc").unwrap().srgb(), [0xAA, 0xBB, 0xCC]);
        assert_eq!(Color::parse(" Black ").unwrap(), Color::BLACK);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for s in ["", "#12", "#GGGGGG", "B0D0D3", "#1234567", "transparent"] {
            assert!(Color::parse(s).is_err(), "{s:?} should not parse");
        }
    }

    #[test]
    fn test_hex_round_trip() {
        let c = Color::parse("#a7c7e7").unwrap();
        assert_eq!(c.to_hex(), "#A7C7E7");
    }

    #[test]
    fn test_linear_conversion_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), Vec3::ZERO);
        assert_relative_eq!(Color::WHITE.to_linear().x, 1.0, epsilon = 1e-6);
        // sRGB mid grey is about 21.4% linear.
        assert_relative_eq!(Color::from_srgb(128, 128, 128).to_linear().x, 0.2158, epsilon = 1e-3);
    }

    #[test]
    fn test_clamp_tweaks() {
        let mut m = Material::water(Color::WHITE, 42.0);
        m.transmission = 3.0;
        m.thickness = -1.0;
        m.clamp_tweaks();
        assert_eq!(m.ior, 10.0);
        assert_eq!(m.transmission, 1.0);
        assert_eq!(m.thickness, 0.0);
    }

    #[test]
    fn test_uniform_packs_alpha_and_flags() {
        let m = Material::water(Color::WHITE, 6.613);
        let u = m.to_uniform();
        assert_eq!(u.color[3], 0.5);
        assert_eq!(u.params[3], 6.613);
        assert_eq!(u.extra[2], 1.0);

        let opaque = Material::flat(Color::BLACK).to_uniform();
        assert_eq!(opaque.color[3], 1.0);
        assert_eq!(opaque.extra[1], 1.0);
    }

    #[test]
    fn test_color_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::from_srgb(0xB0, 0xD0, 0xD3)).unwrap();
        assert_eq!(json, "\"#B0D0D3\"");
        let back: Color = serde_json::from_str("\"black\"").unwrap();
        assert_eq!(back, Color::BLACK);
    }
}
