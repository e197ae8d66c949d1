//! Geometry Module
//!
//! Mesh data, transforms, face directions and the directional face
//! partitioner used by the block editor.
//!
//! # Submodules
//!
//! - [`direction`] - The six face directions and `DirectionMap`
//! - [`mesh`] - Indexed triangle meshes
//! - [`obj`] - Wavefront OBJ loading
//! - [`partition`] - Plane-classification of a mesh into six face fragments
//! - [`transform`] - Position / rotation / scale

pub mod direction;
pub mod mesh;
pub mod obj;
pub mod partition;
pub mod transform;

pub use direction::{Axis, Direction, DirectionMap};
pub use mesh::Mesh;
pub use obj::{load_obj, parse_obj};
pub use partition::{Partition, PartitionParams, bounding_plane, partition};
pub use transform::Transform;
