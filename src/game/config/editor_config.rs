//! Editor Configuration
//!
//! Centralized tuning for the block editor: placement tolerances, snapping,
//! face partitioning, history depth and the built-in kind catalog.
//! `Default` returns the values the editor ships with; a JSON document can
//! override any subset of them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::game::block_editor::EditorError;
use crate::geometry::{Direction, PartitionParams};

/// One built-in block kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KindConfig {
    /// Kind identifier shown in the palette
    pub name: String,
    /// Box size before normalization (largest extent becomes 1)
    #[serde(default = "unit_size")]
    pub size: Vec3,
    /// OBJ file used instead of the box; falls back to the box if unreadable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<PathBuf>,
    /// Face-type overrides; directions not listed are typed by the kind name
    #[serde(default)]
    pub face_types: BTreeMap<Direction, String>,
    /// Directions whose faces cannot be replaced
    #[serde(default)]
    pub locked: Vec<Direction>,
}

impl KindConfig {
    /// Unit cube whose faces all carry the kind's own type.
    pub fn cube(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: Vec3::ONE,
            mesh: None,
            face_types: BTreeMap::new(),
            locked: Vec::new(),
        }
    }

    /// Face-type label for `dir`.
    pub fn face_type(&self, dir: Direction) -> &str {
        self.face_types
            .get(&dir)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}

fn unit_size() -> Vec3 {
    Vec3::ONE
}

/// Central configuration for the block editor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum snapshots kept on the undo stack, baseline included
    pub history_limit: usize,
    /// Candidate box shrink factor used by the overlap test
    pub placement_shrink: f32,
    /// Overlap tolerance as a fraction of the candidate's largest half extent
    pub overlap_epsilon_ratio: f32,
    /// Snap bias as a fraction of the step
    pub snap_bias_ratio: f32,
    /// Plane tolerance as a fraction of the largest mesh extent
    pub partition_tolerance: f32,
    /// Absolute term added to the plane tolerance
    pub partition_epsilon: f32,
    /// Synthesized slab thickness as a fraction of the shortest extent
    pub slab_thickness_ratio: f32,
    /// Minimum synthesized slab thickness
    pub slab_min_thickness: f32,
    /// Added to proxy box size so proxies enclose their block's surface
    pub proxy_padding: f32,
    /// Half the side length of the square build plate at y = 0
    pub ground_half_size: f32,
    /// Color of freshly placed blocks
    pub default_color: String,
    /// Kinds available at startup
    pub builtin_kinds: Vec<KindConfig>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let half = KindConfig {
            name: "Zen/2".to_string(),
            size: Vec3::ONE,
            mesh: None,
            face_types: BTreeMap::from([
                (Direction::Top, "Bion".to_string()),
                (Direction::Bottom, "Bion".to_string()),
            ]),
            locked: vec![
                Direction::Front,
                Direction::Back,
                Direction::Left,
                Direction::Right,
            ],
        };

        Self {
            history_limit: 25,
            placement_shrink: 0.97,
            overlap_epsilon_ratio: 1e-3,
            snap_bias_ratio: 1e-4,
            partition_tolerance: 0.03,
            partition_epsilon: 1e-6,
            slab_thickness_ratio: 0.002,
            slab_min_thickness: 0.0002,
            proxy_padding: 0.002,
            ground_half_size: 10.4,
            default_color: "#7D7F7D".to_string(),
            builtin_kinds: vec![
                KindConfig::cube("Void"),
                KindConfig::cube("Zen"),
                KindConfig::cube("Bion"),
                half,
            ],
        }
    }
}

impl EditorConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        if config.history_limit == 0 {
            return Err(EditorError::ForbiddenOperation(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Resolve relative kind mesh paths against `dir`, usually the
    /// directory holding the config file.
    pub fn rebase_mesh_paths(&mut self, dir: &Path) {
        for kind in &mut self.builtin_kinds {
            if let Some(mesh) = kind.mesh.as_mut().filter(|p| p.is_relative()) {
                *mesh = dir.join(&*mesh);
            }
        }
    }

    pub fn partition_params(&self) -> PartitionParams {
        PartitionParams {
            tolerance_ratio: self.partition_tolerance,
            epsilon: self.partition_epsilon,
            slab_thickness_ratio: self.slab_thickness_ratio,
            slab_min_thickness: self.slab_min_thickness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipping_values() {
        let cfg = EditorConfig::default();
        assert_eq!(cfg.history_limit, 25);
        assert_eq!(cfg.ground_half_size * 2.0, 20.8);
        let names: Vec<_> = cfg.builtin_kinds.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, ["Void", "Zen", "Bion", "Zen/2"]);
    }

    #[test]
    fn test_half_kind_face_types() {
        let cfg = EditorConfig::default();
        let half = &cfg.builtin_kinds[3];
        assert_eq!(half.face_type(Direction::Top), "Bion");
        assert_eq!(half.face_type(Direction::Left), "Zen/2");
        assert!(half.locked.contains(&Direction::Front));
        assert!(!half.locked.contains(&Direction::Bottom));
    }

    #[test]
    fn test_partial_json_override() {
        let cfg =
            EditorConfig::from_json(r##"{ "history_limit": 5, "default_color": "#112233" }"##)
                .unwrap();
        assert_eq!(cfg.history_limit, 5);
        assert_eq!(cfg.default_color, "#112233");
        assert_eq!(cfg.placement_shrink, 0.97);
        assert_eq!(cfg.builtin_kinds.len(), 4);
    }

    #[test]
    fn test_json_kind_list() {
        let cfg = EditorConfig::from_json(
            r#"{ "builtin_kinds": [
                { "name": "Slab", "size": [1.0, 0.6, 1.0], "face_types": { "top": "Cap" }, "locked": ["left"] }
            ] }"#,
        )
        .unwrap();
        let slab = &cfg.builtin_kinds[0];
        assert_eq!(slab.size, Vec3::new(1.0, 0.6, 1.0));
        assert_eq!(slab.face_type(Direction::Top), "Cap");
        assert_eq!(slab.face_type(Direction::Bottom), "Slab");
        assert_eq!(slab.locked, vec![Direction::Left]);
    }

    #[test]
    fn test_mesh_kind_defaults_size_and_rebases() {
        let mut cfg = EditorConfig::from_json(
            r#"{ "builtin_kinds": [
                { "name": "House", "mesh": "shapes/house.obj" },
                { "name": "Rock", "mesh": "/abs/rock.obj" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(cfg.builtin_kinds[0].size, Vec3::ONE);
        cfg.rebase_mesh_paths(Path::new("/cfg"));
        assert_eq!(
            cfg.builtin_kinds[0].mesh.as_deref(),
            Some(Path::new("/cfg/shapes/house.obj"))
        );
        assert_eq!(cfg.builtin_kinds[1].mesh.as_deref(), Some(Path::new("/abs/rock.obj")));
    }

    #[test]
    fn test_rejects_zero_history() {
        assert!(EditorConfig::from_json(r#"{ "history_limit": 0 }"#).is_err());
        assert!(EditorConfig::from_json("not json").is_err());
    }
}
