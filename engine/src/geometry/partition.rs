//! Face Partitioning
//!
//! Splits a closed mesh into six directional face fragments by classifying
//! triangles against the planes of its bounding box. Sides with no flat
//! triangles get a thin synthesized slab so every block always has six
//! faces to select and replace.
//!
//! Fragments stay in the source mesh's local space; nothing is scaled or
//! centered here.

use glam::Vec3;

use super::direction::{Direction, DirectionMap};
use super::mesh::Mesh;
use crate::physics::collision::Aabb;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Tuning for plane classification and slab synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionParams {
    /// Plane tolerance as a fraction of the largest bounding extent
    pub tolerance_ratio: f32,
    /// Absolute term added to the tolerance (keeps zero-size meshes sane)
    pub epsilon: f32,
    /// Slab thickness as a fraction of the shortest bounding extent
    pub slab_thickness_ratio: f32,
    /// Lower bound on slab thickness
    pub slab_min_thickness: f32,
}

impl Default for PartitionParams {
    fn default() -> Self {
        Self {
            tolerance_ratio: 0.03,
            epsilon: 1e-6,
            slab_thickness_ratio: 0.002,
            slab_min_thickness: 0.0002,
        }
    }
}

impl PartitionParams {
    pub fn tolerance(&self, bounds: &Aabb) -> f32 {
        bounds.size().max_element() * self.tolerance_ratio + self.epsilon
    }

    pub fn slab_thickness(&self, bounds: &Aabb) -> f32 {
        (bounds.size().min_element() * self.slab_thickness_ratio).max(self.slab_min_thickness)
    }
}

// ============================================================================
// PARTITION
// ============================================================================

/// Result of partitioning one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub faces: DirectionMap<Mesh>,
    /// Directions whose fragment is a synthesized slab
    pub synthesized: Vec<Direction>,
}

/// Split `mesh` into six directional fragments.
///
/// A mesh without any triangles is treated as the unit cube.
pub fn partition(mesh: &Mesh, params: &PartitionParams) -> Partition {
    let fallback;
    let (source, bounds) = match mesh.bounds() {
        Some(bb) => (mesh, bb),
        None => {
            log::debug!("partition: empty mesh, using unit cube");
            fallback = Mesh::unit_cube();
            let bb = Aabb::from_center_half(Vec3::ZERO, Vec3::splat(0.5));
            (&fallback, bb)
        }
    };

    let tol = params.tolerance(&bounds);
    let mut synthesized = Vec::new();

    let faces = DirectionMap::from_fn(|dir| {
        let fragment = collect_plane_triangles(source, &bounds, dir, tol);
        if fragment.is_empty() {
            synthesized.push(dir);
            slab(&bounds, dir, params.slab_thickness(&bounds))
        } else {
            fragment
        }
    });

    if !synthesized.is_empty() {
        log::debug!("partition: synthesized slabs for {synthesized:?}");
    }

    Partition { faces, synthesized }
}

/// Coordinate of the bounding plane for `dir`.
pub fn bounding_plane(bounds: &Aabb, dir: Direction) -> f32 {
    let a = dir.axis().index();
    if dir.is_max() { bounds.max[a] } else { bounds.min[a] }
}

/// Every triangle whose three vertices lie within `tol` of the `dir` plane.
fn collect_plane_triangles(mesh: &Mesh, bounds: &Aabb, dir: Direction, tol: f32) -> Mesh {
    let a = dir.axis().index();
    let plane = bounding_plane(bounds, dir);
    Mesh::from_triangles(
        mesh.triangles()
            .filter(|tri| tri.iter().all(|v| (v[a] - plane).abs() <= tol)),
    )
}

/// Thin box flush against the `dir` plane, lying inside the bounds.
fn slab(bounds: &Aabb, dir: Direction, thickness: f32) -> Mesh {
    let a = dir.axis().index();
    let plane = bounding_plane(bounds, dir);

    let mut size = bounds.size();
    size[a] = thickness;

    let mut center = bounds.center();
    center[a] = if dir.is_max() {
        plane - thickness * 0.5
    } else {
        plane + thickness * 0.5
    };

    Mesh::cuboid(size, center)
}
