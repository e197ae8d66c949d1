//! Block Model
//!
//! A placed block is either a single rigid mesh (solid) or a group of six
//! independently colorable, replaceable faces. Solids turn into groups the
//! first time they are edited and stay groups for the rest of the session.

use std::fmt;
use std::rc::Rc;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, DirectionMap, Mesh, Transform};
use crate::physics::collision::Aabb;

// ============================================================================
// IDS
// ============================================================================

/// Identifier of a placed block. Never reused within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u64);

/// Identifier of one face of a group block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block#{}", self.0)
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face#{}", self.0)
    }
}

// ============================================================================
// COLOR / MATERIAL
// ============================================================================

/// Hex color normalized to uppercase `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Normalize a user-supplied hex color.
    ///
    /// Accepts `#RGB`, `#RRGGBB` and the same without `#`, in any case.
    pub fn parse(hex: &str) -> Option<Color> {
        let s = hex.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        Some(Color(format!("#{}", expanded.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 8-bit RGB channels.
    pub fn rgb(&self) -> [u8; 3] {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        [channel(1), channel(3), channel(5)]
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("invalid hex color {value:?}"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Surface appearance. Faces hold it behind an `Rc`; a face that paints a
/// shared material gets its own copy first.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
}

impl Material {
    pub fn shared(color: Color) -> Rc<Material> {
        Rc::new(Material { color })
    }
}

// ============================================================================
// FACE
// ============================================================================

/// One directional face of a group block.
#[derive(Debug, Clone)]
pub struct Face {
    pub id: FaceId,
    pub direction: Direction,
    /// Geometry in the face's own space
    pub mesh: Mesh,
    /// Placement of the face inside its block
    pub transform: Transform,
    pub material: Rc<Material>,
    /// Face-type label; may differ from the owning block's kind
    pub face_type: String,
}

impl Face {
    /// Face geometry expressed in block-local space.
    pub fn baked_mesh(&self) -> Mesh {
        if self.transform.is_identity() {
            self.mesh.clone()
        } else {
            self.mesh.transformed(&self.transform.matrix())
        }
    }

    /// Block-local bounds of the face geometry.
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.baked_mesh().bounds()
    }
}

// ============================================================================
// BLOCK
// ============================================================================

/// Shape category of a block.
#[derive(Debug, Clone)]
pub enum BlockBody {
    /// One rigid mesh shared with the kind it came from.
    Solid {
        mesh: Rc<Mesh>,
        material: Rc<Material>,
    },
    /// Up to six faces, keyed by direction.
    Group { faces: DirectionMap<Option<Face>> },
}

/// A block placed in the scene.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub kind: String,
    pub transform: Transform,
    pub body: BlockBody,
}

impl Block {
    pub fn is_solid(&self) -> bool {
        matches!(self.body, BlockBody::Solid { .. })
    }

    pub fn face(&self, dir: Direction) -> Option<&Face> {
        match &self.body {
            BlockBody::Group { faces } => faces[dir].as_ref(),
            BlockBody::Solid { .. } => None,
        }
    }

    pub fn face_mut(&mut self, dir: Direction) -> Option<&mut Face> {
        match &mut self.body {
            BlockBody::Group { faces } => faces[dir].as_mut(),
            BlockBody::Solid { .. } => None,
        }
    }

    /// Faces present on a group block, in direction order.
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        let faces = match &self.body {
            BlockBody::Group { faces } => Some(faces),
            BlockBody::Solid { .. } => None,
        };
        faces
            .into_iter()
            .flat_map(|map| map.iter().filter_map(|(_, f)| f.as_ref()))
    }

    /// Geometry of the whole block in block-local space.
    ///
    /// For groups this merges every face with its local transform baked in.
    pub fn local_mesh(&self) -> Option<Mesh> {
        match &self.body {
            BlockBody::Solid { mesh, .. } => Some(mesh.as_ref().clone()),
            BlockBody::Group { .. } => {
                let baked: Vec<Mesh> = self.faces().map(Face::baked_mesh).collect();
                Mesh::merge(&baked)
            }
        }
    }

    pub fn matrix(&self) -> Mat4 {
        self.transform.matrix()
    }

    /// World-space bounds of the rendered geometry.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let matrix = self.matrix();
        match &self.body {
            BlockBody::Solid { mesh, .. } => mesh.transformed(&matrix).bounds(),
            BlockBody::Group { .. } => self
                .faces()
                .filter_map(|f| f.baked_mesh().transformed(&matrix).bounds())
                .reduce(|a, b| a.union(&b)),
        }
    }

    /// Color of a solid, or of the face in `dir` for a group.
    pub fn color(&self, dir: Direction) -> Option<&Color> {
        match &self.body {
            BlockBody::Solid { material, .. } => Some(&material.color),
            BlockBody::Group { faces } => faces[dir].as_ref().map(|f| &f.material.color),
        }
    }
}
