//! Undo/Redo System for the Block Editor
//!
//! Snapshot-based history: every scene-changing action pushes a complete
//! description of all placed blocks, and undo/redo restore whole
//! snapshots. The bottom of the undo stack is the baseline and is never
//! undone past.
//!
//! # Usage
//!
//! ```ignore
//! use cubik_engine::game::block_editor::undo::{History, Snapshot};
//!
//! let mut history = History::new(25, Snapshot::capture(&scene));
//! // ...mutate the scene...
//! history.push(Snapshot::capture(&scene));
//!
//! if let Some(snapshot) = history.undo() {
//!     snapshot.restore(&mut scene, &registry)?;
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::block_editor::block::{Block, BlockBody, Color, Face, Material};
use crate::game::block_editor::error::EditorError;
use crate::game::block_editor::library::KindRegistry;
use crate::game::block_editor::scene::Scene;
use crate::geometry::{Direction, DirectionMap, Mesh, Transform};

// ============================================================================
// TYPES
// ============================================================================

/// Raw geometry buffers stored with each group face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryBuffers {
    /// Flattened `x, y, z` positions
    pub positions: Vec<f32>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl GeometryBuffers {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self {
            positions: mesh.flat_positions().to_vec(),
            indices: mesh.indices.clone(),
        }
    }

    pub fn to_mesh(&self) -> Option<Mesh> {
        Mesh::from_buffers(&self.positions, &self.indices)
    }
}

/// One face of a group block in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDescriptor {
    pub color: Color,
    pub face_type: String,
    #[serde(flatten)]
    pub transform: Transform,
    pub geometry: GeometryBuffers,
}

/// One placed block in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockDescriptor {
    Solid {
        kind: String,
        color: Color,
        #[serde(flatten)]
        transform: Transform,
    },
    Group {
        kind: String,
        #[serde(flatten)]
        transform: Transform,
        faces: BTreeMap<Direction, FaceDescriptor>,
    },
}

impl BlockDescriptor {
    pub fn describe(block: &Block) -> Self {
        match &block.body {
            BlockBody::Solid { material, .. } => BlockDescriptor::Solid {
                kind: block.kind.clone(),
                color: material.color.clone(),
                transform: block.transform,
            },
            BlockBody::Group { .. } => BlockDescriptor::Group {
                kind: block.kind.clone(),
                transform: block.transform,
                faces: block
                    .faces()
                    .map(|f| {
                        (
                            f.direction,
                            FaceDescriptor {
                                color: f.material.color.clone(),
                                face_type: f.face_type.clone(),
                                transform: f.transform,
                                geometry: GeometryBuffers::from_mesh(&f.mesh),
                            },
                        )
                    })
                    .collect(),
            },
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            BlockDescriptor::Solid { kind, .. } | BlockDescriptor::Group { kind, .. } => kind,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            BlockDescriptor::Solid { transform, .. } | BlockDescriptor::Group { transform, .. } => {
                transform
            }
        }
    }
}

/// Complete description of every placed block, in placement order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub blocks: Vec<BlockDescriptor>,
}

/// Decoded geometry for one group face, awaiting a face id.
struct StagedFace {
    direction: Direction,
    mesh: Mesh,
    descriptor: FaceDescriptor,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

impl Snapshot {
    pub fn capture(scene: &Scene) -> Self {
        Self {
            blocks: scene.blocks().iter().map(BlockDescriptor::describe).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replace the scene's contents with this snapshot.
    ///
    /// All face buffers are decoded before the scene is touched; a
    /// malformed snapshot leaves the scene as it was.
    pub fn restore(&self, scene: &mut Scene, registry: &KindRegistry) -> Result<(), EditorError> {
        let mut staged: Vec<Option<Vec<StagedFace>>> = Vec::with_capacity(self.blocks.len());
        for (i, desc) in self.blocks.iter().enumerate() {
            match desc {
                BlockDescriptor::Solid { .. } => staged.push(None),
                BlockDescriptor::Group { faces, .. } => {
                    let mut decoded = Vec::with_capacity(faces.len());
                    for (&direction, face) in faces {
                        let mesh = face.geometry.to_mesh().ok_or_else(|| {
                            EditorError::UnresolvedGeometry(format!(
                                "Snapshot block {i} has malformed {direction} geometry"
                            ))
                        })?;
                        decoded.push(StagedFace {
                            direction,
                            mesh,
                            descriptor: face.clone(),
                        });
                    }
                    staged.push(Some(decoded));
                }
            }
        }

        scene.clear();
        for (desc, faces) in self.blocks.iter().zip(staged) {
            if !registry.contains(desc.kind()) {
                log::warn!("restore: unknown kind {}, using unit cube", desc.kind());
            }
            let body = match (desc, faces) {
                (BlockDescriptor::Solid { kind, color, .. }, _) => BlockBody::Solid {
                    mesh: registry.base_mesh(kind),
                    material: Material::shared(color.clone()),
                },
                (BlockDescriptor::Group { .. }, faces) => {
                    let mut map: DirectionMap<Option<Face>> = DirectionMap::default();
                    for face in faces.into_iter().flatten() {
                        map[face.direction] = Some(Face {
                            id: scene.ids.next_face(),
                            direction: face.direction,
                            mesh: face.mesh,
                            transform: face.descriptor.transform,
                            material: Material::shared(face.descriptor.color),
                            face_type: face.descriptor.face_type,
                        });
                    }
                    BlockBody::Group { faces: map }
                }
            };
            scene.insert(desc.kind(), *desc.transform(), body, registry);
        }
        Ok(())
    }
}

// ============================================================================
// HISTORY
// ============================================================================

/// Bounded undo stack of snapshots plus a redo stack.
///
/// The undo stack never drops below its bottom entry. Pushing clears the
/// redo stack; past `limit` entries the oldest snapshot is discarded.
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    limit: usize,
}

impl History {
    /// New history whose baseline is `baseline`.
    pub fn new(limit: usize, baseline: Snapshot) -> Self {
        Self {
            undo: vec![baseline],
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a new scene state.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo.push(snapshot);
        self.redo.clear();
        if self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(0..excess);
        }
    }

    /// Step back. Returns the snapshot to restore, or `None` at the baseline.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.undo.len() <= 1 {
            return None;
        }
        let current = self.undo.pop()?;
        self.redo.push(current);
        self.undo.last()
    }

    /// Step forward. Returns the snapshot to restore, or `None` if there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push(next);
        self.undo.last()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// True once anything beyond the baseline has been recorded.
    pub fn has_unsaved_changes(&self) -> bool {
        self.undo.len() > 1
    }

    /// The most recently recorded (current) snapshot.
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo.last()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Drop all history and start over from `baseline`.
    pub fn reset(&mut self, baseline: Snapshot) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push(baseline);
    }
}
