//! CPU-side mesh generation.
//!
//! Meshes are plain vertex/index lists ([`MeshData`]) that the renderer
//! uploads once. The raindrop is a lathe: a 2D profile revolved around the Y
//! axis.

use std::collections::BTreeSet;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Vertex layout shared by every mesh.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unique triangle edges as a line list, for wireframe drawing.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }

    /// Axis-aligned bounds as `(min, max)`. Empty meshes report zero bounds.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.vertices.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        self.vertices.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), v| {
                let p = Vec3::from(v.position);
                (min.min(p), max.max(p))
            },
        )
    }

    /// Translate the mesh so its bounding box is centred on the origin.
    pub fn center(&mut self) {
        let (min, max) = self.bounds();
        let offset = (min + max) * 0.5;
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) - offset).to_array();
        }
    }
}

/// Profile and resolution of the revolved raindrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatheConfig {
    /// Profile in the XY plane, top to bottom. `x` is the radius.
    pub points: Vec<Vec2>,
    /// Number of slices around the Y axis.
    pub segments: u32,
}

impl Default for LatheConfig {
    fn default() -> Self {
        Self {
            points: raindrop_profile(),
            segments: 32,
        }
    }
}

impl LatheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points.len() < 2 {
            return Err(ConfigError::invalid(
                "lathe.points",
                "needs at least two profile points",
            ));
        }
        if self.points.iter().any(|p| p.x < 0.0 || !p.is_finite()) {
            return Err(ConfigError::invalid(
                "lathe.points",
                "radii must be finite and non-negative",
            ));
        }
        if self.segments < 3 {
            return Err(ConfigError::invalid("lathe.segments", "must be at least 3"));
        }
        Ok(())
    }

    pub fn build(&self) -> MeshData {
        lathe(&self.points, self.segments)
    }
}

/// Teardrop outline: pointy tip at the top, widest just above the middle.
pub fn raindrop_profile() -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 1.5),
        Vec2::new(0.3, 1.0),
        Vec2::new(0.6, 0.5),
        Vec2::new(0.7, 0.0),
        Vec2::new(0.4, -0.8),
        Vec2::new(0.0, -1.0),
    ]
}

/// Revolve `points` a full turn around the Y axis.
///
/// Produces `points.len() * (segments + 1)` vertices; the first and last
/// slice overlap so the UV seam is clean.
pub fn lathe(points: &[Vec2], segments: u32) -> MeshData {
    let segments = segments.max(1);
    let n = points.len();
    if n < 2 {
        return MeshData::default();
    }

    let normals = profile_normals(points);

    let mut vertices = Vec::with_capacity(n * (segments as usize + 1));
    for i in 0..=segments {
        let u = i as f32 / segments as f32;
        let phi = u * std::f32::consts::TAU;
        let (sin, cos) = phi.sin_cos();

        for (j, (p, nrm)) in points.iter().zip(&normals).enumerate() {
            let v = j as f32 / (n - 1) as f32;
            let normal = Vec3::new(nrm.x * sin, nrm.y, nrm.x * cos).normalize_or_zero();
            vertices.push(Vertex {
                position: [p.x * sin, p.y, p.x * cos],
                normal: normal.to_array(),
                uv: [u, v],
            });
        }
    }

    let n = n as u32;
    let mut indices = Vec::with_capacity(((n - 1) * segments * 6) as usize);
    for i in 0..segments {
        for j in 0..n - 1 {
            let a = i * n + j;
            let b = a + n;
            let c = b + 1;
            let d = a + 1;
            indices.extend_from_slice(&[a, b, d, c, d, b]);
        }
    }

    MeshData { vertices, indices }
}

/// Outward 2D normal per profile point, averaged over the adjacent segments.
fn profile_normals(points: &[Vec2]) -> Vec<Vec2> {
    let seg_normals: Vec<Vec2> = points
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            Vec2::new(-d.y, d.x).normalize_or_zero()
        })
        .collect();

    (0..points.len())
        .map(|j| {
            let prev = j.checked_sub(1).and_then(|k| seg_normals.get(k));
            let next = seg_normals.get(j);
            match (prev, next) {
                (Some(a), Some(b)) => (*a + *b).normalize_or_zero(),
                (Some(a), None) => *a,
                (None, Some(b)) => *b,
                (None, None) => Vec2::X,
            }
        })
        .collect()
}
