//! Block Scene
//!
//! The placed-block collection together with the two lists derived from
//! it: pickable surfaces (solid meshes and group faces, used for selection
//! and deletion) and collider proxies (used for snapping). Every structural
//! change goes through a method here that updates all three at once.

use glam::Vec3;

use crate::game::block_editor::block::{Block, BlockBody, BlockId, Face, FaceId};
use crate::game::block_editor::library::KindRegistry;
use crate::game::block_editor::proxy::{ProxyHit, ProxyManager};
use crate::geometry::{Direction, Transform};
use crate::physics::collision::{Ray, ray_triangle_intersect};

// ============================================================================
// IDS
// ============================================================================

/// Monotonic id source for blocks and faces.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_block: u64,
    next_face: u64,
}

impl IdAllocator {
    pub fn next_block(&mut self) -> BlockId {
        self.next_block += 1;
        BlockId(self.next_block)
    }

    pub fn next_face(&mut self) -> FaceId {
        self.next_face += 1;
        FaceId(self.next_face)
    }
}

// ============================================================================
// PICKING
// ============================================================================

/// Something a pick ray can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    /// The single mesh of a solid block
    Solid(BlockId),
    /// One face of a group block
    Face(BlockId, FaceId),
}

impl PickTarget {
    pub fn owner(&self) -> BlockId {
        match *self {
            PickTarget::Solid(id) | PickTarget::Face(id, _) => id,
        }
    }
}

/// Nearest pickable struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub target: PickTarget,
    /// Face direction for group hits
    pub direction: Option<Direction>,
    pub distance: f32,
    pub point: Vec3,
}

// ============================================================================
// SCENE
// ============================================================================

/// Placed blocks plus their pick list and proxies.
#[derive(Debug, Clone)]
pub struct Scene {
    blocks: Vec<Block>,
    pickables: Vec<PickTarget>,
    proxies: ProxyManager,
    pub ids: IdAllocator,
}

impl Scene {
    pub fn new(proxy_padding: f32) -> Self {
        Self {
            blocks: Vec::new(),
            pickables: Vec::new(),
            proxies: ProxyManager::new(proxy_padding),
            ids: IdAllocator::default(),
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn pickables(&self) -> &[PickTarget] {
        &self.pickables
    }

    pub fn proxies(&self) -> &ProxyManager {
        &self.proxies
    }

    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    // ========================================================================
    // STRUCTURAL MUTATION
    // ========================================================================

    /// Add a block with a fresh id, its pick entries and its proxy.
    pub fn insert(
        &mut self,
        kind: &str,
        transform: Transform,
        body: BlockBody,
        registry: &KindRegistry,
    ) -> BlockId {
        let id = self.ids.next_block();
        let block = Block {
            id,
            kind: kind.to_string(),
            transform,
            body,
        };
        self.pickables.extend(pick_targets(&block));
        self.proxies
            .attach(id, &block.transform, registry.half_extent(kind));
        self.blocks.push(block);
        id
    }

    /// Remove a block along with its pick entries and proxy.
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let index = self.blocks.iter().position(|b| b.id == id)?;
        let block = self.blocks.remove(index);
        self.pickables.retain(|p| p.owner() != id);
        self.proxies.detach(id);
        Some(block)
    }

    /// Swap a block's body, keeping its id, position in the list and proxy.
    pub fn replace_body(&mut self, id: BlockId, body: BlockBody) -> Option<BlockBody> {
        let block = self.blocks.iter_mut().find(|b| b.id == id)?;
        let old = std::mem::replace(&mut block.body, body);
        let targets = pick_targets(block);
        self.pickables.retain(|p| p.owner() != id);
        self.pickables.extend(targets);
        Some(old)
    }

    /// Replace one face of a group block, updating the pick list.
    ///
    /// Returns the removed face, or `None` if the block is missing or solid.
    pub fn replace_face(&mut self, id: BlockId, face: Face) -> Option<Face> {
        let block = self.blocks.iter_mut().find(|b| b.id == id)?;
        let BlockBody::Group { faces } = &mut block.body else {
            return None;
        };
        let new_target = PickTarget::Face(id, face.id);
        let old = faces.set(face.direction, Some(face));
        if let Some(old_face) = &old {
            self.pickables
                .retain(|p| *p != PickTarget::Face(id, old_face.id));
        }
        self.pickables.push(new_target);
        old
    }

    /// Mutable access to one face for non-structural edits (color).
    pub fn face_mut(&mut self, id: BlockId, dir: Direction) -> Option<&mut Face> {
        self.blocks
            .iter_mut()
            .find(|b| b.id == id)
            .and_then(|b| b.face_mut(dir))
    }

    /// Tear down every block, pick entry and proxy.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.pickables.clear();
        self.proxies.clear();
    }

    /// Per-frame proxy update.
    pub fn sync_proxies(&mut self, registry: &KindRegistry) {
        self.proxies.sync(&self.blocks, registry);
    }

    // ========================================================================
    // RAYCASTS
    // ========================================================================

    /// Nearest proxy along `ray`.
    pub fn raycast_proxies(&self, ray: &Ray) -> Option<ProxyHit> {
        self.proxies.raycast(ray)
    }

    /// Nearest pickable surface along `ray`, tested against real triangles.
    pub fn raycast_pickables(&self, ray: &Ray) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;
        for target in &self.pickables {
            let Some(block) = self.get(target.owner()) else {
                continue;
            };
            let block_matrix = block.matrix();
            let (mesh, direction) = match (*target, &block.body) {
                (PickTarget::Solid(_), BlockBody::Solid { mesh, .. }) => {
                    (mesh.transformed(&block_matrix), None)
                }
                (PickTarget::Face(_, face_id), BlockBody::Group { faces }) => {
                    let Some(face) = faces
                        .iter()
                        .filter_map(|(_, f)| f.as_ref())
                        .find(|f| f.id == face_id)
                    else {
                        continue;
                    };
                    let matrix = block_matrix * face.transform.matrix();
                    (face.mesh.transformed(&matrix), Some(face.direction))
                }
                _ => continue,
            };

            for tri in mesh.triangles() {
                let Some(t) = ray_triangle_intersect(ray.origin, ray.direction, &tri) else {
                    continue;
                };
                if best.is_none_or(|b| t < b.distance) {
                    best = Some(PickHit {
                        target: *target,
                        direction,
                        distance: t,
                        point: ray.at(t),
                    });
                }
            }
        }
        best
    }
}

/// Pick entries a block contributes.
fn pick_targets(block: &Block) -> Vec<PickTarget> {
    match &block.body {
        BlockBody::Solid { .. } => vec![PickTarget::Solid(block.id)],
        BlockBody::Group { .. } => block
            .faces()
            .map(|f| PickTarget::Face(block.id, f.id))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::block_editor::block::Color;
    use crate::game::config::EditorConfig;

    fn setup() -> (Scene, KindRegistry) {
        let cfg = EditorConfig::default();
        (
            Scene::new(cfg.proxy_padding),
            KindRegistry::with_builtins(&cfg).unwrap(),
        )
    }

    fn solid(reg: &KindRegistry) -> BlockBody {
        BlockBody::Solid {
            mesh: reg.base_mesh("Void"),
            material: crate::game::block_editor::block::Material::shared(
                Color::parse("#7D7F7D").unwrap(),
            ),
        }
    }

    #[test]
    fn test_insert_and_remove_keep_lists_in_step() {
        let (mut scene, reg) = setup();
        let a = scene.insert("Void", Transform::from_position(Vec3::new(0.0, 0.5, 0.0)), solid(&reg), &reg);
        let b = scene.insert("Void", Transform::from_position(Vec3::new(1.0, 0.5, 0.0)), solid(&reg), &reg);
        assert_ne!(a, b);
        assert_eq!(scene.pickables().len(), 2);
        assert_eq!(scene.proxies().len(), 2);

        scene.remove(a).unwrap();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.pickables(), &[PickTarget::Solid(b)]);
        assert_eq!(scene.proxies().len(), 1);
        assert!(scene.remove(a).is_none());
    }

    #[test]
    fn test_replace_body_swaps_pick_entries() {
        let (mut scene, reg) = setup();
        let id = scene.insert("Void", Transform::IDENTITY, solid(&reg), &reg);
        let color = Color::parse("#7D7F7D").unwrap();
        let body = reg.editable_body("Void", &color, &mut scene.ids).unwrap();
        scene.replace_body(id, body);
        assert_eq!(scene.pickables().len(), 6);
        assert!(scene.pickables().iter().all(|p| matches!(p, PickTarget::Face(owner, _) if *owner == id)));
        assert_eq!(scene.proxies().len(), 1);
    }

    #[test]
    fn test_pick_hits_face_direction() {
        let (mut scene, reg) = setup();
        let id = scene.insert("Void", Transform::from_position(Vec3::new(0.0, 0.5, 0.0)), solid(&reg), &reg);
        let color = Color::parse("#7D7F7D").unwrap();
        let body = reg.editable_body("Void", &color, &mut scene.ids).unwrap();
        scene.replace_body(id, body);

        let ray = Ray::new(Vec3::new(0.1, 5.0, 0.1), Vec3::NEG_Y);
        let hit = scene.raycast_pickables(&ray).unwrap();
        assert_eq!(hit.target.owner(), id);
        assert_eq!(hit.direction, Some(Direction::Top));
        assert!((hit.point.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clear_empties_everything() {
        let (mut scene, reg) = setup();
        scene.insert("Void", Transform::IDENTITY, solid(&reg), &reg);
        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.pickables().is_empty());
        assert!(scene.proxies().is_empty());
    }
}
