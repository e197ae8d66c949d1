//! Cubik Engine Library
//!
//! Core of a block-building editor: cuboid blocks are placed on a grid,
//! individual block faces are recolored or swapped for other face types,
//! edited blocks can be promoted into reusable kinds, and the whole scene
//! has snapshot-based undo/redo.
//!
//! Rendering, file export and persistence are left to the host; the core
//! exposes a scene of blocks, faces, proxies and a ghost, and answers ray
//! queries against them.
//!
//! # Modules
//!
//! - [`geometry`] - Meshes, transforms, face directions and the face partitioner
//! - [`physics`] - Ray and box queries
//! - [`world`] - Grid snapping
//! - [`input`] - Pointer ray buffering
//! - [`game`] - The block editor itself
//!
//! # Example
//!
//! ```ignore
//! use cubik_engine::game::{BlockEditor, EditorConfig};
//! use cubik_engine::physics::Ray;
//! use glam::Vec3;
//!
//! let mut editor = BlockEditor::new(EditorConfig::default())?;
//! editor.set_active_kind("Void")?;
//!
//! // Host feeds pointer rays; one ghost update per frame
//! editor.pointer_moved(Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y));
//! editor.tick();
//!
//! if let Some(id) = editor.commit_placement() {
//!     println!("placed {id}");
//! }
//! ```

pub mod geometry;
pub mod input;
pub mod physics;
pub mod world;

// Editor systems (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export commonly used types at crate level
pub use geometry::{Direction, DirectionMap, Mesh, Transform};
pub use input::PointerQueue;
pub use physics::{Aabb, Ray};
pub use world::{clamp_snap, snap};
