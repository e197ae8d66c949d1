//! Triangle Meshes
//!
//! Indexed triangle geometry in a block's local space. Vertex normals, UVs
//! and GPU buffers are the renderer's business; the editor core only needs
//! positions for partitioning, alignment, picking and bounds.

use glam::{Mat4, Vec3};

use crate::physics::collision::Aabb;

/// Indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Triangle list indices (three per triangle)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a non-indexed-style mesh from a triangle soup.
    pub fn from_triangles(tris: impl IntoIterator<Item = [Vec3; 3]>) -> Self {
        let mut mesh = Mesh::new();
        for tri in tris {
            mesh.push_triangle(tri);
        }
        mesh
    }

    /// Axis-aligned box of the given size centered at `center`.
    ///
    /// Four vertices per side (24 total) so each side can later be split off
    /// on its own.
    pub fn cuboid(size: Vec3, center: Vec3) -> Self {
        let h = size * 0.5;
        let mut mesh = Mesh::new();
        // (normal axis, sign) -> corner list wound counter-clockwise seen from outside
        let sides: [[Vec3; 4]; 6] = [
            // +Y
            [
                Vec3::new(-h.x, h.y, h.z),
                Vec3::new(h.x, h.y, h.z),
                Vec3::new(h.x, h.y, -h.z),
                Vec3::new(-h.x, h.y, -h.z),
            ],
            // -Y
            [
                Vec3::new(-h.x, -h.y, -h.z),
                Vec3::new(h.x, -h.y, -h.z),
                Vec3::new(h.x, -h.y, h.z),
                Vec3::new(-h.x, -h.y, h.z),
            ],
            // +Z
            [
                Vec3::new(-h.x, -h.y, h.z),
                Vec3::new(h.x, -h.y, h.z),
                Vec3::new(h.x, h.y, h.z),
                Vec3::new(-h.x, h.y, h.z),
            ],
            // -Z
            [
                Vec3::new(h.x, -h.y, -h.z),
                Vec3::new(-h.x, -h.y, -h.z),
                Vec3::new(-h.x, h.y, -h.z),
                Vec3::new(h.x, h.y, -h.z),
            ],
            // -X
            [
                Vec3::new(-h.x, -h.y, -h.z),
                Vec3::new(-h.x, -h.y, h.z),
                Vec3::new(-h.x, h.y, h.z),
                Vec3::new(-h.x, h.y, -h.z),
            ],
            // +X
            [
                Vec3::new(h.x, -h.y, h.z),
                Vec3::new(h.x, -h.y, -h.z),
                Vec3::new(h.x, h.y, -h.z),
                Vec3::new(h.x, h.y, h.z),
            ],
        ];
        for quad in sides {
            let base = mesh.positions.len() as u32;
            mesh.positions
                .extend(quad.iter().map(|c| (*c + center).to_array()));
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// The 1×1×1 box centered at the origin.
    pub fn unit_cube() -> Self {
        Self::cuboid(Vec3::ONE, Vec3::ZERO)
    }

    pub fn push_triangle(&mut self, tri: [Vec3; 3]) {
        let base = self.positions.len() as u32;
        self.positions.extend(tri.iter().map(|v| v.to_array()));
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Iterate triangles as vertex triples. Triangles referencing missing
    /// vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = self.positions.get(tri[0] as usize)?;
            let b = self.positions.get(tri[1] as usize)?;
            let c = self.positions.get(tri[2] as usize)?;
            Some([Vec3::from(*a), Vec3::from(*b), Vec3::from(*c)])
        })
    }

    /// Bounding box over the vertices referenced by triangles.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut tris = self.triangles().peekable();
        tris.peek()?;
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for tri in tris {
            for v in tri {
                min = min.min(v);
                max = max.max(v);
            }
        }
        Some(Aabb::new(min, max))
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from(*p) + offset).to_array();
        }
    }

    pub fn transform(&mut self, matrix: &Mat4) {
        for p in &mut self.positions {
            *p = matrix.transform_point3(Vec3::from(*p)).to_array();
        }
    }

    pub fn transformed(&self, matrix: &Mat4) -> Mesh {
        let mut out = self.clone();
        out.transform(matrix);
        out
    }

    /// Scale so the largest extent is 1 and center the bounds on the origin.
    ///
    /// Meshes without triangles or with zero extent come back unchanged.
    pub fn normalized(&self) -> Mesh {
        let Some(bb) = self.bounds() else {
            return self.clone();
        };
        let largest = bb.size().max_element();
        if largest <= f32::EPSILON {
            return self.clone();
        }
        let s = 1.0 / largest;
        let matrix = Mat4::from_scale(Vec3::splat(s)) * Mat4::from_translation(-bb.center());
        self.transformed(&matrix)
    }

    /// Concatenate several meshes into one index space.
    ///
    /// Returns `None` when the parts contain no triangles at all.
    pub fn merge<'a>(parts: impl IntoIterator<Item = &'a Mesh>) -> Option<Mesh> {
        let mut out = Mesh::new();
        for part in parts {
            let base = out.positions.len() as u32;
            out.positions.extend_from_slice(&part.positions);
            out.indices.extend(part.indices.iter().map(|i| i + base));
        }
        if out.is_empty() { None } else { Some(out) }
    }

    /// Positions flattened to `x, y, z, x, y, z, ...`.
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Rebuild from flattened buffers.
    ///
    /// Returns `None` if the position buffer is not a whole number of
    /// vertices, an index points past the end, or there are no triangles.
    pub fn from_buffers(positions: &[f32], indices: &[u32]) -> Option<Mesh> {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return None;
        }
        let positions: Vec<[f32; 3]> = bytemuck::cast_slice(positions).to_vec();
        if indices.iter().any(|&i| i as usize >= positions.len()) {
            return None;
        }
        let mesh = Mesh {
            positions,
            indices: indices.to_vec(),
        };
        if mesh.is_empty() { None } else { Some(mesh) }
    }
}
