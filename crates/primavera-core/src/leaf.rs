//! Static leaf blade mesh shared by every leaf instance.
//!
//! The blade is swept from a family of cubic contours that all run from the
//! base at the origin to the tip on `+y`. The lateral coordinate `u` in
//! \[-1, 1\] scales the contour's control-point `x` offsets, so `u = 0` is the
//! midrib and `u = ±1` are the edges; every contour meets at base and tip.
//! Along each contour the lengthwise coordinate `v` goes through the
//! arc-length mapping so rows stay evenly spaced from base to tip.

use crate::bezier::CubicBezier;
use crate::error::PlantError;
use glam::{Quat, Vec2, Vec3};

/// Authoring parameters for the leaf blade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafShape {
    /// Rows along the blade (base to tip).
    pub lat_segments: usize,
    /// Columns across the blade (edge to edge).
    pub lon_segments: usize,
    pub length: f32,
    /// Half-width pull of the edge contours' control points.
    pub width: f32,
    /// Out-of-plane tip offset as a fraction of `length`.
    pub bend: f32,
    /// Tip curl depth as a fraction of `length`.
    pub curl: f32,
}

impl Default for LeafShape {
    fn default() -> Self {
        Self {
            lat_segments: 12,
            lon_segments: 6,
            length: 10.0,
            width: 3.5,
            bend: 0.35,
            curl: 0.12,
        }
    }
}

impl LeafShape {
    pub fn validate(&self) -> Result<(), PlantError> {
        if self.lat_segments == 0 || self.lon_segments == 0 {
            return Err(PlantError::InvalidLeafShape("segment counts must be positive"));
        }
        let vertex_count = (self.lat_segments + 1) * (self.lon_segments + 1);
        if vertex_count > u32::MAX as usize {
            return Err(PlantError::InvalidLeafShape("too many vertices"));
        }
        let values = [self.length, self.width, self.bend, self.curl];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PlantError::InvalidLeafShape("dimensions must be finite"));
        }
        if self.length <= 0.0 || self.width <= 0.0 {
            return Err(PlantError::InvalidLeafShape("length and width must be positive"));
        }
        Ok(())
    }

    fn tip(&self) -> Vec3 {
        Vec3::new(0.0, self.length, self.bend * self.length)
    }

    /// Contour of the family member at lateral coordinate `u`.
    pub fn contour(&self, u: f32) -> CubicBezier {
        let bend = self.bend * self.length;
        CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(u * self.width, self.length * 0.3, bend * 0.4),
            Vec3::new(u * self.width * 0.7, self.length * 0.75, bend * 0.9),
            self.tip(),
        )
    }
}

/// Curl magnitude across the blade: `sqrt(2)` on the midrib, 1 at the edges.
#[inline]
pub fn curl_factor(u: f32) -> f32 {
    (2.0 - u * u).max(0.0).sqrt()
}

/// Immutable vertex/index buffers for one leaf blade.
#[derive(Clone, Debug, Default)]
pub struct LeafMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Counter-clockwise triangles, front faces toward `+z`.
    pub indices: Vec<u32>,
}

impl LeafMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normals_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn uvs_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.uvs)
    }
}

/// The leaf blade plus the data the plant needs to place it.
#[derive(Clone, Debug)]
pub struct LeafGeometry {
    pub shape: LeafShape,
    pub mesh: LeafMesh,
    /// Offset from the leaf base to its tip in leaf space.
    pub extent: Vec3,
}

impl LeafGeometry {
    pub fn new(shape: LeafShape) -> Result<Self, PlantError> {
        shape.validate()?;
        let mesh = build_mesh(&shape);
        log::debug!(
            "[leaf] vertices={} triangles={}",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(Self {
            shape,
            mesh,
            extent: shape.tip(),
        })
    }
}

fn build_mesh(shape: &LeafShape) -> LeafMesh {
    let rows = shape.lat_segments + 1;
    let cols = shape.lon_segments + 1;
    let curl_depth = shape.curl * shape.length;

    let mut mesh = LeafMesh {
        positions: Vec::with_capacity(rows * cols),
        normals: Vec::with_capacity(rows * cols),
        uvs: Vec::with_capacity(rows * cols),
        indices: Vec::with_capacity(shape.lat_segments * shape.lon_segments * 6),
    };

    let contours: Vec<CubicBezier> = (0..cols)
        .map(|j| shape.contour(lateral(j, shape.lon_segments)))
        .collect();

    for i in 0..rows {
        let v = i as f32 / shape.lat_segments as f32;
        let v3 = v * v * v;
        for (j, contour) in contours.iter().enumerate() {
            let u = lateral(j, shape.lon_segments);
            let t = contour.map(v);

            // curl pulls the midrib down harder than the edges near the tip
            let curl = curl_depth * v3 * curl_factor(u);
            let position = contour.point_at(t) - Vec3::Z * curl;

            // sideways tilt of the curled surface, then follow the contour's slope
            let side_slope = curl_depth * v3 * u / (curl_factor(u).max(1e-3) * shape.width);
            let curl_normal = Vec3::new(-side_slope, 0.0, 1.0).normalize();
            let velocity = contour.velocity_at(t);
            let pitch = velocity.z.atan2(velocity.y);
            let normal = (Quat::from_rotation_x(pitch) * curl_normal).normalize_or_zero();

            mesh.positions.push(position);
            mesh.normals.push(normal);
            mesh.uvs.push(Vec2::new(j as f32 / shape.lon_segments as f32, v));
        }
    }

    let stride = cols as u32;
    for i in 0..shape.lat_segments as u32 {
        for j in 0..shape.lon_segments as u32 {
            let a = i * stride + j;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }
    mesh
}

#[inline]
fn lateral(j: usize, lon_segments: usize) -> f32 {
    -1.0 + 2.0 * j as f32 / lon_segments as f32
}
