//! Physics module
//!
//! Ray and box queries used for picking and placement. There is no dynamics
//! simulation here; blocks never move on their own.
//!
//! # Submodules
//!
//! - [`collision`] - Ray-triangle, ray-ground and box overlap tests

pub mod collision;

pub use collision::{Aabb, Ray, ray_ground_intersect, ray_triangle_intersect};
