//! Game Module
//!
//! Editor systems that build on top of the engine.

pub mod block_editor;
pub mod config;

pub use block_editor::{
    Block, BlockBody, BlockEditor, BlockId, EditorError, FacetStats, KindRegistry, Snapshot,
    StatusMessage,
};
pub use config::{EditorConfig, KindConfig};
