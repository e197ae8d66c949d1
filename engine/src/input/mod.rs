//! Input Module
//!
//! Platform-agnostic pointer input. The host application turns window
//! events into world-space rays (it owns the camera); this module only
//! buffers them until the next frame.

pub mod pointer;

pub use pointer::PointerQueue;
