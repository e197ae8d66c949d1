//! Kind Registry
//!
//! Catalog of block kinds. Built-in kinds are loaded from the editor config
//! at startup; custom kinds are promoted from edited blocks at runtime and
//! live until the registry is reset. Every kind carries its base geometry
//! and the six face fragments partitioned from it.

use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;

use crate::game::block_editor::block::{Block, BlockBody, Color, Face, Material};
use crate::game::block_editor::error::EditorError;
use crate::game::block_editor::scene::IdAllocator;
use crate::game::config::EditorConfig;
use crate::geometry::{
    Direction, DirectionMap, Mesh, PartitionParams, Transform, load_obj, partition,
};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Prefix of auto-generated custom kind names.
const AUTO_KIND_PREFIX: &str = "Kind-";

/// Prefix of kinds derived from the block last edited in the face editor.
const DERIVED_KIND_PREFIX: &str = "FromEdited-";

/// Half extent reported for kinds the registry does not know.
const FALLBACK_HALF: Vec3 = Vec3::splat(0.5);

// ============================================================================
// TYPES
// ============================================================================

/// Where a kind came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindOrigin {
    /// Loaded at startup
    Builtin,
    /// Registered from an edited block
    Custom,
    /// Derived from the block last closed in the face editor
    Derived,
}

/// Per-face data captured when a custom kind is registered.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFace {
    /// Block-local geometry with the face transform baked in
    pub mesh: Mesh,
    pub color: Color,
    pub face_type: String,
}

/// A named geometry and face decomposition blocks are stamped from.
#[derive(Debug, Clone)]
pub struct Kind {
    pub id: String,
    pub origin: KindOrigin,
    /// Closed base geometry, shared with every solid of this kind
    pub base: Rc<Mesh>,
    /// Face fragments partitioned from `base`
    pub faces: DirectionMap<Mesh>,
    /// Face-type label each direction starts with
    pub face_types: DirectionMap<String>,
    /// Directions that cannot be swapped for another face type
    pub locked: DirectionMap<bool>,
    /// Half of the base geometry's bounding size
    pub half_extent: Vec3,
    /// Captured faces; present for custom kinds only
    pub template: Option<DirectionMap<Option<TemplateFace>>>,
}

impl Kind {
    pub fn is_locked(&self, dir: Direction) -> bool {
        self.locked[dir]
    }

    pub fn is_custom(&self) -> bool {
        self.template.is_some()
    }
}

// ============================================================================
// KIND REGISTRY
// ============================================================================

/// Catalog of kinds, keyed by id, in registration order.
#[derive(Debug, Clone)]
pub struct KindRegistry {
    kinds: HashMap<String, Kind>,
    /// Ids in registration order (palette order)
    order: Vec<String>,
    params: PartitionParams,
    /// Next `Kind-NNN` number; never reused
    next_auto: u32,
    /// Next `FromEdited-NNN` number
    next_derived: u32,
}

impl KindRegistry {
    /// Empty registry.
    pub fn new(params: PartitionParams) -> Self {
        Self {
            kinds: HashMap::new(),
            order: Vec::new(),
            params,
            next_auto: 1,
            next_derived: 1,
        }
    }

    /// Registry loaded with the config's built-in kinds.
    pub fn with_builtins(config: &EditorConfig) -> Result<Self, EditorError> {
        let mut registry = Self::new(config.partition_params());
        for kind in &config.builtin_kinds {
            let face_types = DirectionMap::from_fn(|d| kind.face_type(d).to_string());
            let locked = DirectionMap::from_fn(|d| kind.locked.contains(&d));
            let mesh = match &kind.mesh {
                Some(path) => load_obj(path).unwrap_or_else(|e| {
                    log::warn!("kind {}: cannot load {}: {e}", kind.name, path.display());
                    Mesh::cuboid(kind.size, Vec3::ZERO)
                }),
                None => Mesh::cuboid(kind.size, Vec3::ZERO),
            };
            registry.register_builtin(&kind.name, &mesh, face_types, locked)?;
        }
        Ok(registry)
    }

    /// Add a built-in kind. The mesh is normalized (largest extent 1,
    /// centered) before partitioning.
    pub fn register_builtin(
        &mut self,
        id: &str,
        mesh: &Mesh,
        face_types: DirectionMap<String>,
        locked: DirectionMap<bool>,
    ) -> Result<(), EditorError> {
        let base = if mesh.is_empty() {
            Mesh::unit_cube()
        } else {
            mesh.normalized()
        };
        let kind = self.build_kind(id, KindOrigin::Builtin, base, face_types, locked, None)?;
        self.insert(kind)
    }

    /// Drop every custom and derived kind and restart the name sequences.
    pub fn reset(&mut self) {
        self.kinds.retain(|_, k| k.origin == KindOrigin::Builtin);
        self.order.retain(|id| self.kinds.contains_key(id));
        self.next_auto = 1;
        self.next_derived = 1;
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    pub fn get(&self, id: &str) -> Option<&Kind> {
        self.kinds.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&Kind, EditorError> {
        self.get(id)
            .ok_or_else(|| EditorError::UnknownKind(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.kinds.contains_key(id)
    }

    /// Kind ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Half extent of the kind's base geometry; unknown kinds are unit cubes.
    pub fn half_extent(&self, id: &str) -> Vec3 {
        self.get(id).map_or(FALLBACK_HALF, |k| k.half_extent)
    }

    /// Base geometry for solids; unknown kinds get a unit cube.
    pub fn base_mesh(&self, id: &str) -> Rc<Mesh> {
        match self.get(id) {
            Some(kind) => Rc::clone(&kind.base),
            None => Rc::new(Mesh::unit_cube()),
        }
    }

    pub fn face_fragment(&self, id: &str, dir: Direction) -> Option<&Mesh> {
        self.get(id).map(|k| &k.faces[dir])
    }

    /// Default face-type label for `dir` of kind `id`.
    pub fn default_face_type(&self, id: &str, dir: Direction) -> String {
        self.get(id)
            .map_or_else(|| id.to_string(), |k| k.face_types[dir].clone())
    }

    pub fn is_locked(&self, id: &str, dir: Direction) -> bool {
        self.get(id).is_some_and(|k| k.is_locked(dir))
    }

    // ========================================================================
    // CUSTOM KINDS
    // ========================================================================

    /// Promote an editable group into a reusable kind.
    ///
    /// Each face's local transform is baked into its geometry and the faces
    /// are merged into the kind's base. Colors and face types are captured
    /// as-is. Without a `name`, the kind is called `Kind-NNN`.
    pub fn register_custom_kind(
        &mut self,
        block: &Block,
        name: Option<&str>,
    ) -> Result<String, EditorError> {
        let BlockBody::Group { faces } = &block.body else {
            return Err(EditorError::InvalidSelection(
                "Only edited blocks can become kinds".to_string(),
            ));
        };
        if let Some(name) = name.filter(|n| self.contains(n)) {
            return Err(EditorError::ForbiddenOperation(format!(
                "Kind {name} already exists"
            )));
        }

        let template = faces.map(|_, face| {
            face.as_ref().map(|f| TemplateFace {
                mesh: f.baked_mesh(),
                color: f.material.color.clone(),
                face_type: f.face_type.clone(),
            })
        });
        let parts: Vec<&Mesh> = template
            .iter()
            .filter_map(|(_, t)| t.as_ref().map(|t| &t.mesh))
            .collect();
        let merged = Mesh::merge(parts).ok_or_else(|| {
            EditorError::UnresolvedGeometry("Edited block has no usable faces".to_string())
        })?;

        let (id, auto_seq) = match name {
            Some(name) => (name.to_string(), None),
            None => {
                let (id, seq) = self.free_auto_name();
                (id, Some(seq))
            }
        };
        let face_types = template.map(|_, t| {
            t.as_ref()
                .map_or_else(|| id.clone(), |t| t.face_type.clone())
        });
        let kind = self.build_kind(
            &id,
            KindOrigin::Custom,
            merged,
            face_types,
            DirectionMap::default(),
            Some(template),
        )?;
        self.insert(kind)?;
        if let Some(seq) = auto_seq {
            self.next_auto = seq + 1;
        }
        log::info!("registered kind {id}");
        Ok(id)
    }

    /// Rebuild an editable group body from a custom kind's captured faces.
    pub fn build_from_custom_kind(
        &self,
        id: &str,
        ids: &mut IdAllocator,
    ) -> Result<BlockBody, EditorError> {
        let kind = self.require(id)?;
        let template = kind.template.as_ref().ok_or_else(|| {
            EditorError::UnknownKind(format!("{id} is not a custom kind"))
        })?;
        let faces = template.map(|dir, t| {
            t.as_ref().map(|t| Face {
                id: ids.next_face(),
                direction: dir,
                mesh: t.mesh.clone(),
                transform: Transform::IDENTITY,
                material: Material::shared(t.color.clone()),
                face_type: t.face_type.clone(),
            })
        });
        Ok(BlockBody::Group { faces })
    }

    /// Group body used when a solid of kind `id` becomes editable.
    ///
    /// Custom kinds rebuild their captured faces; every other kind uses its
    /// partitioned fragments, all sharing one material of `color`.
    pub fn editable_body(
        &self,
        id: &str,
        color: &Color,
        ids: &mut IdAllocator,
    ) -> Result<BlockBody, EditorError> {
        if self.get(id).is_some_and(Kind::is_custom) {
            return self.build_from_custom_kind(id, ids);
        }

        let material = Material::shared(color.clone());
        let faces = match self.get(id) {
            Some(kind) => DirectionMap::from_fn(|dir| {
                Some(Face {
                    id: ids.next_face(),
                    direction: dir,
                    mesh: kind.faces[dir].clone(),
                    transform: Transform::IDENTITY,
                    material: Rc::clone(&material),
                    face_type: kind.face_types[dir].clone(),
                })
            }),
            None => {
                log::warn!("editable_body: unknown kind {id}, using unit cube faces");
                let fallback = partition(&Mesh::unit_cube(), &self.params);
                DirectionMap::from_fn(|dir| {
                    Some(Face {
                        id: ids.next_face(),
                        direction: dir,
                        mesh: fallback.faces[dir].clone(),
                        transform: Transform::IDENTITY,
                        material: Rc::clone(&material),
                        face_type: id.to_string(),
                    })
                })
            }
        };
        Ok(BlockBody::Group { faces })
    }

    /// Derive a solid kind from an edited block's merged geometry.
    ///
    /// Deriving the same geometry and face types twice returns the same id.
    pub fn derive_from_block(&mut self, block: &Block) -> Result<String, EditorError> {
        let merged = block.local_mesh().ok_or_else(|| {
            EditorError::UnresolvedGeometry("Edited block has no geometry".to_string())
        })?;
        let face_types = DirectionMap::from_fn(|dir| {
            block
                .face(dir)
                .map_or_else(|| self.default_face_type(&block.kind, dir), |f| f.face_type.clone())
        });

        let existing = self.order.iter().find(|id| {
            self.kinds.get(id.as_str()).is_some_and(|k| {
                k.origin == KindOrigin::Derived
                    && *k.base == merged
                    && k.face_types == face_types
            })
        });
        if let Some(id) = existing {
            return Ok(id.clone());
        }

        let id = format!("{DERIVED_KIND_PREFIX}{:03}", self.next_derived);
        let kind = self.build_kind(
            &id,
            KindOrigin::Derived,
            merged,
            face_types,
            DirectionMap::default(),
            None,
        )?;
        self.insert(kind)?;
        self.next_derived += 1;
        log::debug!("derived ghost kind {id}");
        Ok(id)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// First `Kind-NNN` at or after the sequence counter that is not taken.
    fn free_auto_name(&self) -> (String, u32) {
        let mut seq = self.next_auto;
        loop {
            let name = format!("{AUTO_KIND_PREFIX}{seq:03}");
            if !self.contains(&name) {
                return (name, seq);
            }
            seq += 1;
        }
    }

    fn build_kind(
        &self,
        id: &str,
        origin: KindOrigin,
        base: Mesh,
        face_types: DirectionMap<String>,
        locked: DirectionMap<bool>,
        template: Option<DirectionMap<Option<TemplateFace>>>,
    ) -> Result<Kind, EditorError> {
        let bounds = base.bounds().ok_or_else(|| {
            EditorError::UnresolvedGeometry(format!("Kind {id} has no triangles"))
        })?;
        let parts = partition(&base, &self.params);
        Ok(Kind {
            id: id.to_string(),
            origin,
            half_extent: bounds.half_extents(),
            base: Rc::new(base),
            faces: parts.faces,
            face_types,
            locked,
            template,
        })
    }

    fn insert(&mut self, kind: Kind) -> Result<(), EditorError> {
        if self.kinds.contains_key(&kind.id) {
            return Err(EditorError::ForbiddenOperation(format!(
                "Kind {} already exists",
                kind.id
            )));
        }
        self.order.push(kind.id.clone());
        self.kinds.insert(kind.id.clone(), kind);
        Ok(())
    }
}
