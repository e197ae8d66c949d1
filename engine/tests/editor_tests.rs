//! Editor Tests - Face Editing, Custom Kinds and History
//!
//! End-to-end flows through `BlockEditor`: painting and replacing faces,
//! promoting edited blocks to kinds, deleting and clearing, and
//! snapshot-based undo/redo.

use cubik_engine::game::block_editor::{BlockBody, Color, EditorError};
use cubik_engine::game::{BlockEditor, BlockId, EditorConfig, KindConfig, Snapshot};
use cubik_engine::{Direction, Ray};
use glam::Vec3;
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn config_with_slim() -> EditorConfig {
    let mut cfg = EditorConfig::default();
    cfg.builtin_kinds.push(KindConfig {
        size: Vec3::new(1.0, 0.6, 1.0),
        ..KindConfig::cube("Slim")
    });
    cfg
}

/// Editor with one Void at the origin cell, selected and open for editing.
fn editing(cfg: EditorConfig) -> (BlockEditor, BlockId) {
    let mut editor = BlockEditor::new(cfg).unwrap();
    let id = editor.place_at(Vec3::new(0.0, 0.5, 0.0)).unwrap();
    editor.open_editor(id).unwrap();
    (editor, id)
}

fn red() -> Color {
    Color::parse("#FF0000").unwrap()
}

// ============================================================================
// Paint
// ============================================================================

#[test]
fn test_paint_top_and_front() {
    let (mut editor, id) = editing(EditorConfig::default());
    editor.select_faces(&[Direction::Top, Direction::Front]).unwrap();
    assert_eq!(editor.paint_selected("#FF0000").unwrap(), 2);
    assert_eq!(editor.status().unwrap().text, "Colored facets: 2");

    let block = editor.scene().get(id).unwrap();
    assert_eq!(block.color(Direction::Top), Some(&red()));
    assert_eq!(block.color(Direction::Front), Some(&red()));
    assert_eq!(block.color(Direction::Back).unwrap().as_str(), "#7D7F7D");

    let stats = editor.facet_stats();
    assert_eq!(stats.count("Void", &red()), 2);
    assert_eq!(stats.total(), 6);
}

#[test]
fn test_paint_needs_selection_and_faces() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    assert!(editor.paint_selected("#FF0000").is_err());
    assert_eq!(editor.status().unwrap().text, "Select a cubik first");
    assert!(!editor.status().unwrap().ok);

    let (mut editor, _) = editing(EditorConfig::default());
    assert!(editor.paint_selected("#FF0000").is_err());
    assert_eq!(editor.status().unwrap().text, "Select a facett");
}

#[test]
fn test_toggle_face_twice_deselects() {
    let (mut editor, _) = editing(EditorConfig::default());
    assert!(editor.toggle_face(Direction::Left).unwrap());
    assert!(!editor.toggle_face(Direction::Left).unwrap());
    assert!(editor.selected_faces().is_empty());
}

// ============================================================================
// Replace
// ============================================================================

#[test]
fn test_replace_top_keeps_outer_plane() {
    let (mut editor, id) = editing(config_with_slim());
    editor.select_faces(&[Direction::Top]).unwrap();
    assert_eq!(editor.replace_selected("Slim").unwrap(), 1);
    assert_eq!(editor.status().unwrap().text, "Replaced facets: 1");

    let top = editor.scene().get(id).unwrap().face(Direction::Top).unwrap();
    assert_eq!(top.face_type, "Slim");
    let bb = top.local_bounds().unwrap();
    assert!((bb.max.y - 0.5).abs() < 1e-5);
    assert!((bb.min.y - 0.5).abs() < 1e-5);
    assert_eq!(top.material.color.as_str(), "#7D7F7D");
}

#[test]
fn test_half_kind_sides_cannot_be_replaced() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    editor.set_active_kind("Zen/2").unwrap();
    let id = editor.place_at(Vec3::new(0.0, 0.5, 0.0)).unwrap();
    editor.open_editor(id).unwrap();
    let undo_depth = editor.history().undo_len();

    editor.select_faces(&[Direction::Right]).unwrap();
    let err = editor.replace_selected("Zen").unwrap_err();
    assert!(matches!(err, EditorError::ForbiddenOperation(_)));
    assert_eq!(
        editor.status().unwrap().text,
        "Cannot replace Zen/2 side facet. Only Top and Bottom are allowed"
    );
    assert_eq!(editor.history().undo_len(), undo_depth);

    editor.select_faces(&[Direction::Bottom]).unwrap();
    assert_eq!(editor.replace_selected("Zen").unwrap(), 1);
}

// ============================================================================
// Custom kinds
// ============================================================================

#[test]
fn test_registered_kind_builds_edited_copy() {
    let (mut editor, _) = editing(EditorConfig::default());
    editor.select_faces(&[Direction::Top]).unwrap();
    editor.paint_selected("#FF0000").unwrap();
    editor.select_faces(&[Direction::Front]).unwrap();
    editor.replace_selected("Zen").unwrap();

    assert_eq!(editor.register_selected_kind(Some("Tower")).unwrap(), "Tower");
    editor.close_editor();
    editor.set_active_kind("Tower").unwrap();
    let copy = editor.place_at(Vec3::new(3.0, 0.5, 0.0)).unwrap();

    let block = editor.scene().get(copy).unwrap();
    assert!(matches!(block.body, BlockBody::Group { .. }));
    assert_eq!(block.kind, "Tower");
    assert_eq!(block.color(Direction::Top), Some(&red()));
    assert_eq!(block.face(Direction::Front).unwrap().face_type, "Zen");
    assert_eq!(block.face(Direction::Back).unwrap().face_type, "Void");
}

#[test]
fn test_register_names_and_duplicates() {
    let (mut editor, _) = editing(EditorConfig::default());
    assert_eq!(editor.register_selected_kind(None).unwrap(), "Kind-001");
    assert_eq!(editor.register_selected_kind(None).unwrap(), "Kind-002");
    let err = editor.register_selected_kind(Some("Void")).unwrap_err();
    assert!(matches!(err, EditorError::ForbiddenOperation(_)));
    assert!(editor.registry().contains("Kind-002"));
}

#[test]
fn test_auto_names_skip_taken_ids() {
    let mut cfg = EditorConfig::default();
    cfg.builtin_kinds.push(KindConfig::cube("Kind-001"));
    let (mut editor, _) = editing(cfg);
    assert_eq!(editor.register_selected_kind(None).unwrap(), "Kind-002");

    editor.register_selected_kind(Some("Kind-003")).unwrap();
    assert_eq!(editor.register_selected_kind(None).unwrap(), "Kind-004");
    assert!(editor.registry().contains("Kind-001"));
}

#[test]
fn test_use_selected_switches_active_kind() {
    let (mut editor, _) = editing(EditorConfig::default());
    let kind = editor.use_selected().unwrap();
    assert_eq!(editor.active_kind(), kind);
}

#[test]
fn test_closing_editor_adopts_edited_shape() {
    let (mut editor, _) = editing(config_with_slim());
    editor.select_faces(&[Direction::Top]).unwrap();
    editor.replace_selected("Slim").unwrap();
    editor.close_editor();

    assert!(!editor.is_editor_open());
    assert!(editor.active_kind().starts_with("FromEdited-"));
    let kind = editor.registry().get(editor.active_kind()).unwrap();
    assert_eq!(kind.face_types[Direction::Top], "Slim");
}

// ============================================================================
// Mesh-backed built-in kinds
// ============================================================================

const HOUSE_OBJ: &str = "\
v -0.5 0 -0.5
v 0.5 0 -0.5
v 0.5 0 0.5
v -0.5 0 0.5
v -0.5 1 -0.5
v 0.5 1 -0.5
v 0.5 1 0.5
v -0.5 1 0.5
v 0 1.5 0
f 1 2 3 4
f 1 5 6 2
f 2 6 7 3
f 3 7 8 4
f 4 8 5 1
f 5 9 6
f 6 9 7
f 7 9 8
f 8 9 5
";

#[test]
fn test_builtin_kind_loads_obj_mesh() {
    let root = std::env::temp_dir().join(format!("cubik_kinds_{}", std::process::id()));
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("house.obj"), HOUSE_OBJ).unwrap();

    let mut cfg = EditorConfig::from_json(
        r#"{ "builtin_kinds": [ { "name": "House", "mesh": "house.obj" } ] }"#,
    )
    .unwrap();
    cfg.rebase_mesh_paths(&root);
    let editor = BlockEditor::new(cfg).unwrap();
    std::fs::remove_dir_all(&root).ok();

    let house = editor.registry().get("House").unwrap();
    assert_eq!(house.base.triangle_count(), 14);
    assert!((house.half_extent.y - 0.5).abs() < 1e-5);
    assert!((house.half_extent.x - 1.0 / 3.0).abs() < 1e-5);
    for dir in [Direction::Front, Direction::Back, Direction::Left, Direction::Right] {
        assert_eq!(house.faces[dir].triangle_count(), 2, "{dir}");
    }
    // The roof has no flat top, so the top face is a thin slab.
    let top = house.faces[Direction::Top].bounds().unwrap();
    assert!(top.size().y < 0.01);
}

#[test]
fn test_unreadable_obj_falls_back_to_box() {
    let cfg = EditorConfig::from_json(
        r#"{ "builtin_kinds": [
            { "name": "Ghost", "size": [1.0, 0.5, 1.0], "mesh": "/nonexistent/cubik/ghost.obj" }
        ] }"#,
    )
    .unwrap();
    let mut editor = BlockEditor::new(cfg).unwrap();
    assert_eq!(editor.registry().half_extent("Ghost"), Vec3::new(0.5, 0.25, 0.5));
    editor.set_active_kind("Ghost").unwrap();
    assert!(editor.place_at(Vec3::new(0.0, 0.25, 0.0)).is_some());
}

// ============================================================================
// Delete / clear
// ============================================================================

#[test]
fn test_delete_by_ray() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    editor.place_at(Vec3::new(0.0, 0.5, 0.0)).unwrap();
    let far = editor.place_at(Vec3::new(4.0, 0.5, 0.0)).unwrap();

    let hit = editor.delete_at(&Ray::new(Vec3::new(4.2, 5.0, 0.1), Vec3::NEG_Y));
    assert_eq!(hit, Some(far));
    assert_eq!(editor.status().unwrap().text, "Deleted");
    assert_eq!(editor.block_count(), 1);

    assert!(editor.delete_at(&Ray::new(Vec3::new(9.0, 5.0, 9.0), Vec3::NEG_Y)).is_none());
}

#[test]
fn test_deleting_selected_block_clears_selection() {
    let (mut editor, id) = editing(EditorConfig::default());
    assert!(editor.delete_block(id));
    assert_eq!(editor.selected_block(), None);
    assert!(!editor.is_editor_open());
}

#[test]
fn test_clear_all_then_undo() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    editor.place_at(Vec3::new(0.0, 0.5, 0.0)).unwrap();
    editor.place_at(Vec3::new(2.0, 0.5, 0.0)).unwrap();

    editor.clear_all();
    assert_eq!(editor.block_count(), 0);
    assert_eq!(editor.status().unwrap().text, "Scene cleared");
    assert_eq!(editor.pivot(), Vec3::new(0.0, 0.5, 0.0));

    assert!(editor.undo().unwrap());
    assert_eq!(editor.block_count(), 2);
    assert_eq!(editor.pivot(), Vec3::new(2.0, 0.5, 0.0));
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_undo_at_baseline_is_noop() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    assert!(!editor.undo().unwrap());
    assert!(!editor.redo().unwrap());
    assert!(!editor.has_unsaved_changes());
}

#[test]
fn test_undo_restores_painted_faces() {
    let (mut editor, id) = editing(EditorConfig::default());
    editor.select_faces(&[Direction::Top]).unwrap();
    editor.paint_selected("#FF0000").unwrap();

    assert!(editor.undo().unwrap());
    assert_eq!(editor.selected_block(), None);
    assert!(!editor.is_editor_open());
    let block = &editor.blocks()[0];
    assert!(block.is_solid());
    assert_eq!(block.color(Direction::Top).unwrap().as_str(), "#7D7F7D");

    assert!(editor.redo().unwrap());
    let block = &editor.blocks()[0];
    assert_eq!(block.color(Direction::Top), Some(&red()));
    assert_ne!(block.id, id);
}

#[test]
fn test_new_action_discards_redo() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    editor.place_at(Vec3::new(0.0, 0.5, 0.0)).unwrap();
    editor.undo().unwrap();
    assert!(editor.history().can_redo());
    editor.place_at(Vec3::new(1.0, 0.5, 0.0)).unwrap();
    assert!(!editor.history().can_redo());
}

#[test]
fn test_history_is_capped() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    for i in 0..30 {
        editor.place_at(Vec3::new(i as f32, 0.5, 0.0)).unwrap();
    }
    assert_eq!(editor.history().undo_len(), 25);
    let mut undone = 0;
    while editor.undo().unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 24);
    assert_eq!(editor.block_count(), 6);
}

#[test]
fn test_snapshot_json_loads_into_fresh_editor() {
    let (mut editor, _) = editing(EditorConfig::default());
    editor.select_faces(&[Direction::Top]).unwrap();
    editor.paint_selected("#00FF00").unwrap();
    editor.close_editor();
    editor.place_at(Vec3::new(2.0, 0.5, 0.0)).unwrap();
    let json = editor.snapshot_scene().to_json().unwrap();

    let mut other = BlockEditor::new(EditorConfig::default()).unwrap();
    other.load_scene(&Snapshot::from_json(&json).unwrap()).unwrap();
    assert_eq!(other.snapshot_scene(), editor.snapshot_scene());
    assert!(!other.has_unsaved_changes());
    assert!(!other.undo().unwrap());
}

#[test]
fn test_restore_rejects_malformed_geometry_and_keeps_scene() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    editor.place_at(Vec3::new(0.0, 0.5, 0.0)).unwrap();
    let json = r##"[
        {"type":"solid","kind":"Void","color":"#FFFFFF",
         "position":[3,0.5,0],"rotation":[0,0,0],"scale":[1,1,1]},
        {"type":"group","kind":"Void",
         "position":[5,0.5,0],"rotation":[0,0,0],"scale":[1,1,1],
         "faces":{"top":{"color":"#FFFFFF","face_type":"Void",
            "position":[0,0,0],"rotation":[0,0,0],"scale":[1,1,1],
            "geometry":{"positions":[0,0,0,1,0,0],"indices":[0,1,2]}}}}
    ]"##;
    let snapshot = Snapshot::from_json(json).unwrap();
    let err = editor.restore_scene(&snapshot).unwrap_err();
    assert!(matches!(err, EditorError::UnresolvedGeometry(_)));
    assert_eq!(editor.block_count(), 1);
    assert_eq!(editor.blocks()[0].transform.position, Vec3::new(0.0, 0.5, 0.0));
}

#[test]
fn test_restore_tolerates_unknown_kind() {
    let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
    let json = r##"[{"type":"solid","kind":"Nope","color":"#FFFFFF",
        "position":[0,0.5,0],"rotation":[0,0,0],"scale":[1,1,1]}]"##;
    editor.restore_scene(&Snapshot::from_json(json).unwrap()).unwrap();
    assert_eq!(editor.blocks()[0].kind, "Nope");
    assert_eq!(editor.pivot(), Vec3::new(0.0, 0.5, 0.0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_undo_redo_walks_exact_snapshots(cells in prop::collection::vec((-8i32..8, -8i32..8), 1..10)) {
        let mut editor = BlockEditor::new(EditorConfig::default()).unwrap();
        let mut seen = vec![editor.snapshot_scene()];
        for (x, z) in cells {
            if editor.place_at(Vec3::new(x as f32, 0.5, z as f32)).is_some() {
                seen.push(editor.snapshot_scene());
            }
        }

        for expected in seen.iter().rev().skip(1) {
            prop_assert!(editor.undo().unwrap());
            prop_assert_eq!(&editor.snapshot_scene(), expected);
        }
        prop_assert!(!editor.undo().unwrap());

        for expected in seen.iter().skip(1) {
            prop_assert!(editor.redo().unwrap());
            prop_assert_eq!(&editor.snapshot_scene(), expected);
        }
        prop_assert!(!editor.redo().unwrap());
    }
}
