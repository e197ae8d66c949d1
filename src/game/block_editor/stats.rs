//! Facet statistics: how many faces of each type and color the scene holds.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::game::block_editor::block::{Block, BlockBody, Color};
use crate::game::block_editor::library::KindRegistry;
use crate::geometry::Direction;

/// Face counts keyed by face type, then color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FacetStats {
    counts: BTreeMap<String, BTreeMap<Color, usize>>,
}

impl FacetStats {
    /// Count every face in `blocks`.
    ///
    /// A solid counts six faces typed by its kind's default face-type map;
    /// a group counts each face it has under that face's own type.
    pub fn compute(blocks: &[Block], registry: &KindRegistry) -> Self {
        let mut stats = Self::default();
        for block in blocks {
            match &block.body {
                BlockBody::Solid { material, .. } => {
                    for dir in Direction::ALL {
                        stats.add(&registry.default_face_type(&block.kind, dir), &material.color, 1);
                    }
                }
                BlockBody::Group { .. } => {
                    for face in block.faces() {
                        stats.add(&face.face_type, &face.material.color, 1);
                    }
                }
            }
        }
        stats
    }

    fn add(&mut self, face_type: &str, color: &Color, n: usize) {
        *self
            .counts
            .entry(face_type.to_string())
            .or_default()
            .entry(color.clone())
            .or_default() += n;
    }

    pub fn count(&self, face_type: &str, color: &Color) -> usize {
        self.counts
            .get(face_type)
            .and_then(|m| m.get(color))
            .copied()
            .unwrap_or(0)
    }

    /// Faces of `face_type` in any color.
    pub fn type_total(&self, face_type: &str) -> usize {
        self.counts.get(face_type).map_or(0, |m| m.values().sum())
    }

    pub fn total(&self) -> usize {
        self.counts.values().flat_map(|m| m.values()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(face type, color, count)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Color, usize)> {
        self.counts.iter().flat_map(|(t, colors)| {
            colors.iter().map(move |(c, n)| (t.as_str(), c, *n))
        })
    }
}

impl fmt::Display for FacetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (face_type, colors) in &self.counts {
            let total: usize = colors.values().sum();
            writeln!(f, "{face_type}: {total}")?;
            for (color, n) in colors {
                writeln!(f, "  {color}: {n}")?;
            }
        }
        write!(f, "Total: {}", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::block_editor::block::Material;
    use crate::game::block_editor::scene::Scene;
    use crate::game::config::EditorConfig;
    use crate::geometry::Transform;

    #[test]
    fn test_half_kind_solid_counts_split() {
        let cfg = EditorConfig::default();
        let reg = KindRegistry::with_builtins(&cfg).unwrap();
        let mut scene = Scene::new(cfg.proxy_padding);
        let grey = Color::parse("#7D7F7D").unwrap();
        let body = BlockBody::Solid {
            mesh: reg.base_mesh("Zen/2"),
            material: Material::shared(grey.clone()),
        };
        scene.insert("Zen/2", Transform::IDENTITY, body, &reg);

        let stats = FacetStats::compute(scene.blocks(), &reg);
        assert_eq!(stats.count("Zen/2", &grey), 4);
        assert_eq!(stats.count("Bion", &grey), 2);
        assert_eq!(stats.total(), 6);
    }

    #[test]
    fn test_group_counts_per_face() {
        let cfg = EditorConfig::default();
        let reg = KindRegistry::with_builtins(&cfg).unwrap();
        let mut scene = Scene::new(cfg.proxy_padding);
        let grey = Color::parse("#7D7F7D").unwrap();
        let body = reg.editable_body("Void", &grey, &mut scene.ids).unwrap();
        let id = scene.insert("Void", Transform::IDENTITY, body, &reg);
        let red = Color::parse("#FF0000").unwrap();
        crate::game::block_editor::paint::paint_faces(&mut scene, id, &[Direction::Top], &red)
            .unwrap();

        let stats = FacetStats::compute(scene.blocks(), &reg);
        assert_eq!(stats.count("Void", &grey), 5);
        assert_eq!(stats.count("Void", &red), 1);
        assert_eq!(stats.type_total("Void"), 6);
        assert!(stats.to_string().ends_with("Total: 6"));
    }
}
