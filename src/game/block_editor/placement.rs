//! Block Placement
//!
//! Tracks the ghost preview under the pointer, snaps it to the build plate
//! or flush against the face of an existing block, and validates the
//! candidate with an axis-aligned overlap test.
//!
//! # State machine
//!
//! - **Idle**: no ghost visible (nothing under the pointer, or suspended)
//! - **Previewing**: ghost visible at a valid candidate
//! - **Invalid**: ghost visible but the candidate is rejected
//!
//! Committing a valid ghost hands back the kind and transform to build and
//! leaves the engine previewing.

use glam::Vec3;

use crate::game::block_editor::block::{Block, BlockId};
use crate::game::block_editor::library::KindRegistry;
use crate::game::block_editor::scene::Scene;
use crate::game::config::EditorConfig;
use crate::geometry::{Axis, Transform};
use crate::physics::collision::{Aabb, Ray, ray_ground_intersect};
use crate::world::grid::{clamp_snap, snap_to_grid};

// ============================================================================
// TYPES
// ============================================================================

/// Placement tolerances, taken from [`EditorConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    /// Candidate half extents are multiplied by this before the overlap test
    pub shrink: f32,
    /// Overlap tolerance as a fraction of the largest half extent
    pub overlap_epsilon_ratio: f32,
    pub snap_bias: f32,
    /// The build plate spans `[-ground_half_size, ground_half_size]` in X and Z
    pub ground_half_size: f32,
}

impl From<&EditorConfig> for PlacementParams {
    fn from(cfg: &EditorConfig) -> Self {
        Self {
            shrink: cfg.placement_shrink,
            overlap_epsilon_ratio: cfg.overlap_epsilon_ratio,
            snap_bias: cfg.snap_bias_ratio,
            ground_half_size: cfg.ground_half_size,
        }
    }
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    Idle,
    Previewing,
    Invalid,
}

/// What the pointer ray struck first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceHit {
    Ground {
        point: Vec3,
    },
    Block {
        owner: BlockId,
        point: Vec3,
        normal: Vec3,
    },
}

/// Placement preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub kind: String,
    pub transform: Transform,
    pub valid: bool,
    pub visible: bool,
}

impl Ghost {
    fn hidden(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            transform: Transform::IDENTITY,
            valid: false,
            visible: false,
        }
    }
}

/// Accepted placement, ready to be built.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub kind: String,
    pub transform: Transform,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Whether a block of `kind` centered at `center` fits.
///
/// Fails when the block would dip below the ground plane or when its shrunk
/// box overlaps another block's kind box on all three axes. `ignore`
/// excludes one block from the test. Rotation is not considered.
pub fn can_place(
    center: Vec3,
    kind: &str,
    ignore: Option<BlockId>,
    blocks: &[Block],
    registry: &KindRegistry,
    params: &PlacementParams,
) -> bool {
    let half = registry.half_extent(kind);
    if center.y - half.y < 0.0 {
        return false;
    }

    let test = Aabb::from_center_half(center, half * params.shrink);
    let eps = half.max_element() * params.overlap_epsilon_ratio;

    !blocks
        .iter()
        .filter(|b| Some(b.id) != ignore)
        .any(|b| {
            let other =
                Aabb::from_center_half(b.transform.position, registry.half_extent(&b.kind));
            test.overlaps(&other, eps)
        })
}

// ============================================================================
// PLACEMENT ENGINE
// ============================================================================

/// Ghost tracking and candidate validation.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    params: PlacementParams,
    active_kind: String,
    ghost: Ghost,
    suspended: bool,
}

impl PlacementEngine {
    pub fn new(params: PlacementParams, kind: &str) -> Self {
        Self {
            params,
            active_kind: kind.to_string(),
            ghost: Ghost::hidden(kind),
            suspended: false,
        }
    }

    pub fn params(&self) -> &PlacementParams {
        &self.params
    }

    pub fn active_kind(&self) -> &str {
        &self.active_kind
    }

    /// Switch the kind being placed; the ghost is rebuilt hidden.
    pub fn set_kind(&mut self, kind: &str) {
        if kind != self.active_kind {
            log::debug!("ghost kind {} -> {kind}", self.active_kind);
        }
        self.active_kind = kind.to_string();
        self.ghost = Ghost::hidden(kind);
    }

    /// The ghost, when visible.
    pub fn ghost(&self) -> Option<&Ghost> {
        self.ghost.visible.then_some(&self.ghost)
    }

    pub fn state(&self) -> PlacementState {
        match (self.ghost.visible, self.ghost.valid) {
            (false, _) => PlacementState::Idle,
            (true, true) => PlacementState::Previewing,
            (true, false) => PlacementState::Invalid,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Hide the ghost and ignore pointer moves until [`resume`](Self::resume).
    pub fn suspend(&mut self) {
        self.suspended = true;
        self.ghost.visible = false;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Hide the ghost without suspending placement.
    pub fn hide(&mut self) {
        self.ghost.visible = false;
    }

    /// Nearest of the proxy set and the build plate along `ray`.
    pub fn cast(&self, ray: &Ray, scene: &Scene) -> Option<SurfaceHit> {
        let block = scene.raycast_proxies(ray);
        let ground = ray_ground_intersect(ray, 0.0, self.params.ground_half_size);
        match (block, ground) {
            (Some(b), Some(t)) if t < b.distance => Some(SurfaceHit::Ground { point: ray.at(t) }),
            (Some(b), _) => Some(SurfaceHit::Block {
                owner: b.owner,
                point: b.point,
                normal: b.normal,
            }),
            (None, Some(t)) => Some(SurfaceHit::Ground { point: ray.at(t) }),
            (None, None) => None,
        }
    }

    /// Recompute the ghost for a new pointer ray.
    pub fn update(&mut self, ray: &Ray, scene: &Scene, registry: &KindRegistry) -> PlacementState {
        if self.suspended {
            self.ghost.visible = false;
            return PlacementState::Idle;
        }
        let Some(hit) = self.cast(ray, scene) else {
            self.ghost.visible = false;
            return PlacementState::Idle;
        };

        let (center, ignore) = self.candidate(&hit, scene, registry);
        let valid = can_place(center, &self.active_kind, ignore, scene.blocks(), registry, &self.params);

        let prev = self.state();
        self.ghost.transform = Transform::from_position(center);
        self.ghost.valid = valid;
        self.ghost.visible = true;

        let state = self.state();
        if state != prev {
            let surface = match hit {
                SurfaceHit::Ground { .. } => "ground",
                SurfaceHit::Block { .. } => "block",
            };
            log::debug!("ghost {state:?} on {surface} at {center}");
        }
        state
    }

    /// Candidate center for `hit`, plus the block to exclude from the test.
    pub fn candidate(
        &self,
        hit: &SurfaceHit,
        scene: &Scene,
        registry: &KindRegistry,
    ) -> (Vec3, Option<BlockId>) {
        let half = registry.half_extent(&self.active_kind);
        let step = half * 2.0;
        let bias = self.params.snap_bias;

        match *hit {
            SurfaceHit::Ground { point } => {
                let mut center = snap_to_grid(point, step, bias);
                center.y = half.y;
                (center, None)
            }
            SurfaceHit::Block {
                owner,
                point,
                normal,
            } => {
                let target = scene.get(owner);
                let footprint = target
                    .and_then(Block::world_bounds)
                    .or_else(|| {
                        target.map(|b| {
                            Aabb::from_center_half(
                                b.transform.position,
                                registry.half_extent(&b.kind),
                            )
                        })
                    })
                    .unwrap_or_else(|| Aabb::from_center_half(point, Vec3::ZERO));

                let axis = Axis::dominant(normal);
                let (u, v) = axis.tangents();
                let (n, u, v) = (axis.index(), u.index(), v.index());

                let mut center = Vec3::ZERO;
                center[n] = if normal[n] > 0.0 {
                    footprint.max[n] + half[n]
                } else {
                    footprint.min[n] - half[n]
                };
                for a in [u, v] {
                    center[a] = clamp_snap(
                        point[a],
                        footprint.min[a],
                        footprint.max[a],
                        half[a],
                        step[a],
                        bias,
                    );
                }
                (center, Some(owner))
            }
        }
    }

    /// Validate an explicit center for the active kind.
    pub fn can_place_at(&self, center: Vec3, scene: &Scene, registry: &KindRegistry) -> bool {
        can_place(center, &self.active_kind, None, scene.blocks(), registry, &self.params)
    }

    /// Accept the current ghost if it is visible and valid.
    pub fn commit(&self) -> Option<Placement> {
        if self.suspended || !self.ghost.visible || !self.ghost.valid {
            return None;
        }
        Some(Placement {
            kind: self.active_kind.clone(),
            transform: self.ghost.transform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::block_editor::block::{BlockBody, Color, Material};

    fn setup() -> (Scene, KindRegistry, PlacementEngine) {
        let cfg = EditorConfig::default();
        (
            Scene::new(cfg.proxy_padding),
            KindRegistry::with_builtins(&cfg).unwrap(),
            PlacementEngine::new(PlacementParams::from(&cfg), "Void"),
        )
    }

    fn add_void(scene: &mut Scene, reg: &KindRegistry, pos: Vec3) -> BlockId {
        let body = BlockBody::Solid {
            mesh: reg.base_mesh("Void"),
            material: Material::shared(Color::parse("#7D7F7D").unwrap()),
        };
        scene.insert("Void", Transform::from_position(pos), body, reg)
    }

    fn down_at(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 20.0, z), Vec3::NEG_Y)
    }

    #[test]
    fn test_ground_hit_snaps_to_cell() {
        let (scene, reg, mut engine) = setup();
        assert_eq!(engine.state(), PlacementState::Idle);
        let state = engine.update(&down_at(0.3, -0.8), &scene, &reg);
        assert_eq!(state, PlacementState::Previewing);
        assert_eq!(engine.ghost().unwrap().transform.position, Vec3::new(0.0, 0.5, -1.0));
    }

    #[test]
    fn test_miss_goes_idle() {
        let (scene, reg, mut engine) = setup();
        engine.update(&down_at(0.0, 0.0), &scene, &reg);
        let state = engine.update(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y), &scene, &reg);
        assert_eq!(state, PlacementState::Idle);
        assert!(engine.ghost().is_none());
        assert!(engine.commit().is_none());
    }

    #[test]
    fn test_stacks_on_top_face() {
        let (mut scene, reg, mut engine) = setup();
        let below = add_void(&mut scene, &reg, Vec3::new(0.0, 0.5, 0.0));
        let state = engine.update(&down_at(0.2, 0.1), &scene, &reg);
        assert_eq!(state, PlacementState::Previewing);
        let ghost = engine.ghost().unwrap();
        assert!((ghost.transform.position - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-5);
        let hit = engine.cast(&down_at(0.2, 0.1), &scene).unwrap();
        assert!(matches!(hit, SurfaceHit::Block { owner, .. } if owner == below));
    }

    #[test]
    fn test_side_face_places_flush() {
        let (mut scene, reg, mut engine) = setup();
        add_void(&mut scene, &reg, Vec3::new(0.0, 0.5, 0.0));
        let ray = Ray::new(Vec3::new(5.0, 0.6, 0.1), Vec3::NEG_X);
        engine.update(&ray, &scene, &reg);
        let pos = engine.ghost().unwrap().transform.position;
        assert!((pos - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-5);
        assert!(engine.ghost().unwrap().valid);
    }

    #[test]
    fn test_can_place_rejects_overlap_and_below_ground() {
        let (mut scene, reg, engine) = setup();
        add_void(&mut scene, &reg, Vec3::new(0.0, 0.5, 0.0));
        assert!(!engine.can_place_at(Vec3::new(0.0, 0.5, 0.0), &scene, &reg));
        assert!(engine.can_place_at(Vec3::new(1.0, 0.5, 0.0), &scene, &reg));
        assert!(!engine.can_place_at(Vec3::new(5.0, 0.4, 0.0), &scene, &reg));
    }

    #[test]
    fn test_ignore_excludes_block() {
        let (mut scene, reg, engine) = setup();
        let id = add_void(&mut scene, &reg, Vec3::new(0.0, 0.5, 0.0));
        let p = *engine.params();
        assert!(can_place(Vec3::new(0.0, 0.5, 0.0), "Void", Some(id), scene.blocks(), &reg, &p));
    }

    #[test]
    fn test_suspend_hides_ghost() {
        let (scene, reg, mut engine) = setup();
        engine.update(&down_at(0.0, 0.0), &scene, &reg);
        engine.suspend();
        assert_eq!(engine.update(&down_at(0.0, 0.0), &scene, &reg), PlacementState::Idle);
        engine.resume();
        assert_eq!(engine.update(&down_at(0.0, 0.0), &scene, &reg), PlacementState::Previewing);
        assert_eq!(engine.commit().unwrap().kind, "Void");
    }
}
