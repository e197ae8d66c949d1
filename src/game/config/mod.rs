//! Config Module
//!
//! Centralized configuration for the block editor.

pub mod editor_config;

pub use editor_config::{EditorConfig, KindConfig};
