//! World Module
//!
//! World-space grid snapping for the build plate.

pub mod grid;

pub use grid::{DEFAULT_SNAP_BIAS, clamp_snap, snap, snap_to_grid};
