//! Extruded 3D text.
//!
//! Glyph outlines come from `rusttype`, go through a `lyon` path, and are
//! flattened into closed contours. The solid is built from two tessellated
//! caps and a stack of rings swept along the contours: the bevel rings grow
//! the outline outward on a quarter circle, the straight walls span the
//! extrusion depth. The finished mesh is centred on the origin.

use std::f32::consts::FRAC_PI_2;
use std::path::{Path as FsPath, PathBuf};

use glam::{Vec2, Vec3};
use lyon::math::point;
use lyon::path::iterator::PathIterator;
use lyon::path::{Path, PathEvent};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use rusttype::{Font, OutlineBuilder, Scale};
use serde::{Deserialize, Serialize};

use crate::error::{AssetError, ConfigError};
use crate::geometry::{MeshData, Vertex};
use crate::material::{Color, Material};

/// Squared length below which flattened points are merged.
const MIN_EDGE_SQ: f32 = 1e-10;
/// Smallest cosine of the half corner angle used for miters; caps spikes at 4x.
const MITER_COS_LIMIT: f32 = 0.25;

/// Text mesh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub content: String,
    /// Font file relative to the asset root.
    pub font: PathBuf,
    /// Glyph size in world units.
    pub size: f32,
    /// Extrusion depth in world units.
    pub depth: f32,
    /// Resolution of curved glyph segments. Higher is smoother.
    pub curve_segments: u32,
    pub bevel: BevelConfig,
    /// Uniform scale of the finished mesh.
    pub scale: f32,
    pub material: Material,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: "Arun".to_string(),
            font: PathBuf::from("fonts/vindey.ttf"),
            size: 0.5,
            depth: 0.2,
            curve_segments: 12,
            bevel: BevelConfig::default(),
            scale: 2.0,
            material: Material::flat(Color::BLACK),
        }
    }
}

impl TextConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size <= 0.0 || !self.size.is_finite() {
            return Err(ConfigError::invalid("text.size", "must be positive"));
        }
        if self.depth < 0.0 || !self.depth.is_finite() {
            return Err(ConfigError::invalid("text.depth", "must not be negative"));
        }
        if self.curve_segments == 0 {
            return Err(ConfigError::invalid("text.curve_segments", "must be at least 1"));
        }
        if self.scale <= 0.0 || !self.scale.is_finite() {
            return Err(ConfigError::invalid("text.scale", "must be positive"));
        }
        self.bevel.validate()?;
        self.material.validate("text.material")
    }

    /// Maximum distance between a curve and its flattened polyline.
    pub fn tolerance(&self) -> f32 {
        (self.size / (self.curve_segments as f32 * 8.0)).max(1e-4)
    }
}

/// Rounded edge between the caps and the side walls.
///
/// With a bevel the solid reaches `size + offset` beyond the glyph outline in
/// x/y and `thickness` in front of and behind the walls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BevelConfig {
    pub enabled: bool,
    /// Extra depth on each side of the walls.
    pub thickness: f32,
    /// Outward reach from the glyph outline.
    pub size: f32,
    /// Outline offset the bevel starts from.
    pub offset: f32,
    /// Rings per side between cap and wall.
    pub segments: u32,
}

impl Default for BevelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thickness: 0.03,
            size: 0.02,
            offset: 0.0,
            segments: 5,
        }
    }
}

impl BevelConfig {
    /// Straight walls only.
    #[cfg(test)]
    fn none() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.thickness < 0.0 || !self.thickness.is_finite() {
            return Err(ConfigError::invalid("text.bevel.thickness", "must not be negative"));
        }
        if self.size < 0.0 || !self.size.is_finite() {
            return Err(ConfigError::invalid("text.bevel.size", "must not be negative"));
        }
        if !self.offset.is_finite() {
            return Err(ConfigError::invalid("text.bevel.offset", "must be finite"));
        }
        if self.segments == 0 {
            return Err(ConfigError::invalid("text.bevel.segments", "must be at least 1"));
        }
        Ok(())
    }

    /// `(outline offset, z)` per ring, from the back cap edge to the front one.
    fn rings(&self, depth: f32) -> Vec<(f32, f32)> {
        if !self.enabled {
            return vec![(0.0, 0.0), (0.0, depth)];
        }
        let steps = self.segments.max(1);
        let profile = |b: u32| {
            let t = b as f32 / steps as f32 * FRAC_PI_2;
            (self.size * t.sin() + self.offset, self.thickness * t.cos())
        };
        let full = self.size + self.offset;

        let mut rings: Vec<(f32, f32)> = (0..steps)
            .map(|b| {
                let (d, z) = profile(b);
                (d, -z)
            })
            .collect();
        rings.push((full, 0.0));
        rings.push((full, depth));
        rings.extend((0..steps).rev().map(|b| {
            let (d, z) = profile(b);
            (d, depth + z)
        }));
        rings
    }
}

/// Read and parse a font file.
pub fn load_font(path: &FsPath) -> Result<Font<'static>, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| AssetError::InvalidFont(path.to_path_buf()))
}

/// Load a font and build the text mesh described by `config`.
pub fn load_text_mesh(path: &FsPath, config: &TextConfig) -> Result<MeshData, AssetError> {
    let font = load_font(path)?;
    build_text_mesh(&font, config)
}

/// Lay out `config.content` on one line and extrude it.
pub fn build_text_mesh(font: &Font<'_>, config: &TextConfig) -> Result<MeshData, AssetError> {
    let outline = layout_outline(font, config)
        .ok_or_else(|| AssetError::EmptyText(config.content.clone()))?;
    let mut mesh = extrude(&outline, config.depth, config.tolerance(), &config.bevel)?;
    mesh.center();
    Ok(mesh)
}

/// All glyph outlines of `config.content` as one path, baseline at y = 0.
/// `None` when no glyph has an outline.
fn layout_outline(font: &Font<'_>, config: &TextConfig) -> Option<Path> {
    let mut collector = OutlineCollector::new();
    let mut any = false;

    for glyph in font.layout(&config.content, Scale::uniform(config.size), rusttype::point(0.0, 0.0)) {
        let origin = glyph.position();
        collector.set_origin(origin.x, origin.y);
        any |= glyph.unpositioned().build_outline(&mut collector);
        collector.finish_contour();
    }

    any.then(|| collector.build())
}

/// Bridges rusttype outlines into a lyon path.
///
/// rusttype reports glyph coordinates with y pointing down; they are flipped
/// here so the text reads upright in world space.
pub struct OutlineCollector {
    builder: lyon::path::path::Builder,
    origin: (f32, f32),
    open: bool,
}

impl OutlineCollector {
    pub fn new() -> Self {
        Self {
            builder: Path::builder(),
            origin: (0.0, 0.0),
            open: false,
        }
    }

    fn set_origin(&mut self, x: f32, y: f32) {
        self.origin = (x, y);
    }

    fn map(&self, x: f32, y: f32) -> lyon::math::Point {
        point(x + self.origin.0, -(y + self.origin.1))
    }

    fn finish_contour(&mut self) {
        if self.open {
            self.builder.end(true);
            self.open = false;
        }
    }

    pub fn build(mut self) -> Path {
        self.finish_contour();
        self.builder.build()
    }
}

impl Default for OutlineCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.finish_contour();
        let p = self.map(x, y);
        self.builder.begin(p);
        self.open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if self.open {
            let p = self.map(x, y);
            self.builder.line_to(p);
        }
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        if self.open {
            let (c, p) = (self.map(x1, y1), self.map(x, y));
            self.builder.quadratic_bezier_to(c, p);
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        if self.open {
            let (c1, c2, p) = (self.map(x1, y1), self.map(x2, y2), self.map(x, y));
            self.builder.cubic_bezier_to(c1, c2, p);
        }
    }

    fn close(&mut self) {
        self.finish_contour();
    }
}

/// One closed, flattened outline loop.
struct Contour {
    points: Vec<Vec2>,
    /// Outward unit normal of the edge from `points[i]` to `points[i + 1]`.
    normals: Vec<Vec2>,
    /// Per-point direction that moves both adjacent edges out by one unit.
    miters: Vec<Vec2>,
}

impl Contour {
    fn new(points: Vec<Vec2>, outward_sign: f32) -> Self {
        let n = points.len();
        let normals: Vec<Vec2> = (0..n)
            .map(|i| (points[(i + 1) % n] - points[i]).perp().normalize_or_zero() * outward_sign)
            .collect();
        let miters = (0..n)
            .map(|i| {
                let (prev, next) = (normals[(i + n - 1) % n], normals[i]);
                let sum = prev + next;
                if sum.length_squared() < 1e-6 {
                    return next;
                }
                let m = sum.normalize();
                m / m.dot(next).max(MITER_COS_LIMIT)
            })
            .collect();
        Self {
            points,
            normals,
            miters,
        }
    }

    fn offset_point(&self, i: usize, d: f32) -> Vec2 {
        self.points[i] + self.miters[i] * d
    }
}

/// Positive for counter-clockwise loops.
fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n).map(|i| points[i].perp_dot(points[(i + 1) % n])).sum::<f32>() * 0.5
}

/// Flatten `path` into closed loops of at least three distinct points.
fn flatten_loops(path: &Path, tolerance: f32) -> Vec<Vec<Vec2>> {
    let mut loops = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    for event in path.iter().flattened(tolerance) {
        match event {
            PathEvent::Begin { at } => {
                current.clear();
                current.push(Vec2::new(at.x, at.y));
            }
            PathEvent::Line { to, .. } => {
                let p = Vec2::new(to.x, to.y);
                if current.last().map_or(true, |last| last.distance_squared(p) > MIN_EDGE_SQ) {
                    current.push(p);
                }
            }
            PathEvent::End { .. } => {
                if current.len() > 1 && current[0].distance_squared(current[current.len() - 1]) <= MIN_EDGE_SQ {
                    current.pop();
                }
                if current.len() >= 3 {
                    loops.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            _ => {}
        }
    }
    loops
}

/// Build the contours of `path` with normals pointing out of the filled area.
///
/// Outer loops and holes wind in opposite directions under the non-zero rule,
/// so the largest loop decides which side of every edge is outside.
fn contours(path: &Path, tolerance: f32) -> Vec<Contour> {
    let loops = flatten_loops(path, tolerance);
    let dominant = loops
        .iter()
        .map(|l| signed_area(l))
        .fold(0.0_f32, |acc, a| if a.abs() > acc.abs() { a } else { acc });
    let outward_sign = if dominant > 0.0 { -1.0 } else { 1.0 };
    loops
        .into_iter()
        .map(|points| Contour::new(points, outward_sign))
        .collect()
}

fn offset_path(contours: &[Contour], d: f32) -> Path {
    let mut builder = Path::builder();
    for contour in contours {
        let p = contour.offset_point(0, d);
        builder.begin(point(p.x, p.y));
        for i in 1..contour.points.len() {
            let p = contour.offset_point(i, d);
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    builder.build()
}

/// Extrude a closed 2D path along +Z.
///
/// The walls span `0..=depth`; an enabled bevel adds `bevel.thickness` on
/// both sides and pushes the walls out by `bevel.size + bevel.offset`.
pub fn extrude(
    path: &Path,
    depth: f32,
    tolerance: f32,
    bevel: &BevelConfig,
) -> Result<MeshData, AssetError> {
    let contours = contours(path, tolerance);
    let rings = bevel.rings(depth);
    let (cap_offset, back_z) = rings[0];
    let front_z = rings[rings.len() - 1].1;

    let mut caps: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &offset_path(&contours, cap_offset),
            &FillOptions::tolerance(tolerance).with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut caps, |v: FillVertex| v.position().to_array()),
        )
        .map_err(AssetError::Tessellation)?;

    let mut mesh = MeshData::default();

    // Back cap gets the reversed winding.
    for (z, normal) in [(front_z, Vec3::Z), (back_z, Vec3::NEG_Z)] {
        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend(caps.vertices.iter().map(|&[x, y]| Vertex {
            position: [x, y, z],
            normal: normal.to_array(),
            uv: [x, y],
        }));
        for tri in caps.indices.chunks_exact(3) {
            if normal.z > 0.0 {
                mesh.indices.extend_from_slice(&[base + tri[0], base + tri[1], base + tri[2]]);
            } else {
                mesh.indices.extend_from_slice(&[base + tri[0], base + tri[2], base + tri[1]]);
            }
        }
    }

    let v_step = 1.0 / (rings.len() - 1) as f32;
    for (r, pair) in rings.windows(2).enumerate() {
        let ((d0, z0), (d1, z1)) = (pair[0], pair[1]);
        if d0 == d1 && z0 == z1 {
            continue;
        }
        for contour in &contours {
            let n = contour.points.len();
            for i in 0..n {
                let j = (i + 1) % n;
                // Perpendicular to the ring step in the plane of the edge normal and z.
                let normal = (contour.normals[i].extend(0.0) * (z1 - z0) - Vec3::Z * (d1 - d0))
                    .normalize_or_zero();
                let corner = |k: usize, d: f32, z: f32| contour.offset_point(k, d).extend(z);
                let quad = [
                    (corner(i, d0, z0), r as f32),
                    (corner(j, d0, z0), r as f32),
                    (corner(j, d1, z1), r as f32 + 1.0),
                    (corner(i, d1, z1), r as f32 + 1.0),
                ];
                add_quad(&mut mesh, quad, normal, v_step);
            }
        }
    }

    Ok(mesh)
}

fn add_quad(mesh: &mut MeshData, quad: [(Vec3, f32); 4], normal: Vec3, v_step: f32) {
    let base = mesh.vertices.len() as u32;
    for (p, ring) in quad {
        mesh.vertices.push(Vertex {
            position: p.to_array(),
            normal: normal.to_array(),
            uv: [0.0, ring * v_step],
        });
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}
