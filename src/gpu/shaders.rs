//! WGSL sources.
//!
//! `common.wgsl` holds the globals bind group and environment sampling; it is
//! prepended to the background and mesh shaders.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::material::Color;

pub const COMMON_SOURCE: &str = include_str!("../shaders/common.wgsl");
pub const BLIT_SOURCE: &str = include_str!("../shaders/blit.wgsl");
const BACKGROUND_BODY: &str = include_str!("../shaders/background.wgsl");
const MESH_BODY: &str = include_str!("../shaders/mesh.wgsl");

pub fn background_source() -> String {
    format!("{COMMON_SOURCE}\n{BACKGROUND_BODY}")
}

pub fn mesh_source() -> String {
    format!("{COMMON_SOURCE}\n{MESH_BODY}")
}

/// Per-frame values in group 0. Must match `Globals` in `common.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub env_flags: [f32; 4],
    pub clear_color: [f32; 4],
}

impl Globals {
    pub fn new(view_proj: Mat4, camera_pos: Vec3, env_loaded: bool, env_background: bool, clear: Color) -> Self {
        let c = clear.to_linear();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_pos: camera_pos.extend(1.0).to_array(),
            env_flags: [env_loaded as u32 as f32, env_background as u32 as f32, 0.0, 0.0],
            clear_color: [c.x, c.y, c.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_mesh_shader_is_valid() {
        validate_wgsl(&mesh_source()).unwrap();
    }

    #[test]
    fn test_background_shader_is_valid() {
        validate_wgsl(&background_source()).unwrap();
    }

    #[test]
    fn test_blit_shader_is_valid() {
        validate_wgsl(BLIT_SOURCE).unwrap();
    }

    #[test]
    fn test_globals_size_matches_wgsl() {
        // Two mat4x4 plus three vec4.
        assert_eq!(std::mem::size_of::<Globals>(), 2 * 64 + 3 * 16);
    }

    #[test]
    fn test_mesh_instance_locations_match_layout() {
        let src = mesh_source();
        for loc in 5..=8 {
            assert!(src.contains(&format!("@location({loc}) model_{}", loc - 5)));
        }
    }

    #[test]
    fn test_globals_inverse() {
        let vp = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0) * Mat4::from_translation(Vec3::Z * -5.0);
        let g = Globals::new(vp, Vec3::new(0.0, 0.0, 5.0), true, false, Color::BLACK);
        let inv = Mat4::from_cols_array_2d(&g.inv_view_proj);
        assert!((inv * vp).abs_diff_eq(Mat4::IDENTITY, 1e-4));
        assert_eq!(g.env_flags, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(g.camera_pos, [0.0, 0.0, 5.0, 1.0]);
    }
}
