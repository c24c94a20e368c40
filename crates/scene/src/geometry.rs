//! Procedural primitive geometry.
//!
//! Each descriptor tessellates into an indexed triangle list. Parameter
//! conventions and vertex layouts follow the usual WebGL scene-graph
//! primitives so scenes authored against them look the same here.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};
use std::hash::{Hash, Hasher};

/// A primitive shape descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Lies in the XY plane facing +Z.
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
        arc: f32,
    },
    TorusKnot {
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    },
}

impl Geometry {
    pub fn cube(size: f32) -> Self {
        Self::Box {
            width: size,
            height: size,
            depth: size,
        }
    }

    /// Sphere with the default 32x16 segmentation.
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            radius,
            width_segments: 32,
            height_segments: 16,
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane {
            width,
            height,
            width_segments: 1,
            height_segments: 1,
        }
    }

    /// Torus knot with the default 64x8 segmentation and a (2, 3) winding.
    pub fn torus_knot(radius: f32, tube: f32) -> Self {
        Self::TorusKnot {
            radius,
            tube,
            tubular_segments: 64,
            radial_segments: 8,
            p: 2,
            q: 3,
        }
    }

    /// Short human-readable name used in debug output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Plane { .. } => "plane",
            Self::Torus { .. } => "torus",
            Self::TorusKnot { .. } => "torus-knot",
        }
    }

    /// Generate vertex and index data for this shape.
    pub fn tessellate(&self) -> MeshData {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => box_mesh(width, height, depth),
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere_mesh(radius, width_segments.max(3), height_segments.max(2)),
            Self::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => plane_mesh(width, height, width_segments.max(1), height_segments.max(1)),
            Self::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
                arc,
            } => torus_mesh(
                radius,
                tube,
                radial_segments.max(2),
                tubular_segments.max(3),
                arc,
            ),
            Self::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
                p,
                q,
            } => torus_knot_mesh(
                radius,
                tube,
                tubular_segments.max(3),
                radial_segments.max(3),
                p.max(1),
                q,
            ),
        }
    }
}

// Geometry is used as a GPU mesh cache key; floats compare by bit pattern.
impl Eq for Geometry {}

impl Hash for Geometry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => [width, height, depth].map(f32::to_bits).hash(state),
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => (radius.to_bits(), width_segments, height_segments).hash(state),
            Self::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => (width.to_bits(), height.to_bits(), width_segments, height_segments).hash(state),
            Self::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
                arc,
            } => (
                [radius, tube, arc].map(f32::to_bits),
                radial_segments,
                tubular_segments,
            )
                .hash(state),
            Self::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
                p,
                q,
            } => (
                [radius, tube].map(f32::to_bits),
                tubular_segments,
                radial_segments,
                p,
                q,
            )
                .hash(state),
        }
    }
}

/// Indexed triangle-list mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push(&mut self, position: Vec3, normal: Vec3) {
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
    }

    fn quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    /// Unique undirected edges as a line-list index buffer, for wireframe.
    pub fn edges(&self) -> Vec<u32> {
        let mut seen = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                seen.insert((a.min(b), a.max(b)));
            }
        }
        seen.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }
}

fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let h = Vec3::new(width, height, depth) * 0.5;
    // (normal, u axis, v axis) per face; corners wind counter-clockwise seen from outside.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    let mut mesh = MeshData::default();
    for (normal, u, v) in faces {
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * h;
            mesh.push(p, normal);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = width_segments + 1;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let p = Vec3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            );
            mesh.push(p, p.normalize_or_zero());
        }
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // Poles collapse to a single triangle.
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

fn plane_mesh(width: f32, height: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let seg_w = width / width_segments as f32;
    let seg_h = height / height_segments as f32;
    let row = width_segments + 1;

    for iy in 0..=height_segments {
        let y = iy as f32 * seg_h - height * 0.5;
        for ix in 0..=width_segments {
            let x = ix as f32 * seg_w - width * 0.5;
            mesh.push(Vec3::new(x, -y, 0.0), Vec3::Z);
        }
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            mesh.quad(
                ix + row * iy,
                ix + row * (iy + 1),
                ix + 1 + row * (iy + 1),
                ix + 1 + row * iy,
            );
        }
    }
    mesh
}

fn torus_mesh(radius: f32, tube: f32, radial: u32, tubular: u32, arc: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = tubular + 1;

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * arc;
            let ring = radius + tube * v.cos();
            let p = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.push(p, (p - center).normalize_or_zero());
        }
    }

    for j in 1..=radial {
        for i in 1..=tubular {
            mesh.quad(row * j + i - 1, row * (j - 1) + i - 1, row * (j - 1) + i, row * j + i);
        }
    }
    mesh
}

fn torus_knot_mesh(radius: f32, tube: f32, tubular: u32, radial: u32, p: u32, q: u32) -> MeshData {
    let curve = |u: f32| {
        let qu_over_p = q as f32 / p as f32 * u;
        let cs = qu_over_p.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * 0.5 * u.sin(),
            radius * qu_over_p.sin() * 0.5,
        )
    };

    let mut mesh = MeshData::default();
    let row = radial + 1;

    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * p as f32 * TAU;
        let p1 = curve(u);
        let p2 = curve(u + 0.01);

        // Frenet-style frame along the curve.
        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n).normalize_or_zero();
        let n = b.cross(t).normalize_or_zero();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let vertex = p1 + n * cx + b * cy;
            mesh.push(vertex, (vertex - p1).normalize_or_zero());
        }
    }

    for j in 1..=tubular {
        for i in 1..=radial {
            mesh.quad(row * (j - 1) + i - 1, row * j + i - 1, row * j + i, row * (j - 1) + i);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_well_formed(mesh: &MeshData) {
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        for normal in &mesh.normals {
            let len = Vec3::from_array(*normal).length();
            assert!((len - 1.0).abs() < 1e-3 || len == 0.0);
        }
    }

    #[test]
    fn box_has_24_vertices_12_triangles() {
        let mesh = Geometry::cube(0.3).tessellate();
        assert_well_formed(&mesh);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        for p in &mesh.positions {
            assert!(p.iter().all(|c| (c.abs() - 0.15).abs() < 1e-6));
        }
    }

    #[test]
    fn box_faces_wind_outward() {
        let mesh = Geometry::cube(1.0).tessellate();
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(mesh.positions[i as usize]));
            let face_normal = (b - a).cross(c - a).normalize();
            let stored = Vec3::from_array(mesh.normals[tri[0] as usize]);
            assert!(face_normal.dot(stored) > 0.99);
        }
    }

    #[test]
    fn low_poly_sphere_counts() {
        let mesh = Geometry::Sphere {
            radius: 0.3,
            width_segments: 7,
            height_segments: 4,
        }
        .tessellate();
        assert_well_formed(&mesh);
        assert_eq!(mesh.vertex_count(), 8 * 5);
        // Pole rows contribute one triangle per segment, inner rows two.
        assert_eq!(mesh.triangle_count(), 7 + 7 + 2 * 7 * 2);
    }

    #[test]
    fn plane_segments_and_extent() {
        let mesh = Geometry::Plane {
            width: 10.0,
            height: 10.0,
            width_segments: 50,
            height_segments: 50,
        }
        .tessellate();
        assert_well_formed(&mesh);
        assert_eq!(mesh.vertex_count(), 51 * 51);
        assert_eq!(mesh.triangle_count(), 50 * 50 * 2);
        let max_x = mesh.positions.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn partial_torus_and_knot_are_well_formed() {
        let torus = Geometry::Torus {
            radius: 1.2,
            tube: 0.3,
            radial_segments: 10,
            tubular_segments: 20,
            arc: 3.2,
        }
        .tessellate();
        assert_well_formed(&torus);
        assert_eq!(torus.vertex_count(), 11 * 21);

        let knot = Geometry::torus_knot(0.5, 0.2).tessellate();
        assert_well_formed(&knot);
        assert_eq!(knot.vertex_count(), 65 * 9);
        assert_eq!(knot.triangle_count(), 64 * 8 * 2);
    }

    #[test]
    fn edges_are_unique_pairs() {
        let mesh = Geometry::plane(1.0, 1.0).tessellate();
        let edges = mesh.edges();
        // A single quad: four sides plus the diagonal.
        assert_eq!(edges.len(), 5 * 2);
        let pairs: HashSet<(u32, u32)> = edges.chunks_exact(2).map(|e| (e[0], e[1])).collect();
        assert_eq!(pairs.len(), 5);
    }

    #[test]
    fn geometry_hash_distinguishes_parameters() {
        let mut set = HashSet::new();
        set.insert(Geometry::cube(0.3));
        set.insert(Geometry::cube(0.3));
        set.insert(Geometry::cube(0.5));
        set.insert(Geometry::sphere(0.3));
        assert_eq!(set.len(), 3);
    }
}
