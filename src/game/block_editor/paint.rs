//! Face Editing
//!
//! Recoloring and face-type replacement on the faces of a group block.
//! - **Paint**: sets the color of each selected face; a face sharing its
//!   material gets a private copy first
//! - **Replace**: swaps each selected face for the matching fragment of
//!   another kind, slid along the face normal so the block stays closed
//!
//! Replacement validates every selected direction before touching the
//! block, so a rejected request leaves it unchanged.

use std::rc::Rc;

use crate::game::block_editor::block::{BlockBody, BlockId, Color, Face};
use crate::game::block_editor::error::EditorError;
use crate::game::block_editor::library::KindRegistry;
use crate::game::block_editor::scene::Scene;
use crate::geometry::{Axis, Direction, Mesh, bounding_plane};

// ============================================================================
// MESSAGES
// ============================================================================

pub(crate) const NO_BLOCK: &str = "Select a cubik first";
pub(crate) const NO_FACES: &str = "Select a facett";

// ============================================================================
// ALIGNMENT
// ============================================================================

/// Translate `fragment` along the axis of `dir` so its bounding plane on
/// that side coincides with the same plane of `reference`.
pub fn align_to_plane(reference: &Mesh, fragment: &Mesh, dir: Direction) -> Option<Mesh> {
    let old_plane = bounding_plane(&reference.bounds()?, dir);
    let new_plane = bounding_plane(&fragment.bounds()?, dir);
    let mut offset = glam::Vec3::ZERO;
    offset[dir.axis().index()] = old_plane - new_plane;

    let mut aligned = fragment.clone();
    aligned.translate(offset);
    Some(aligned)
}

// ============================================================================
// PAINT
// ============================================================================

/// Set the color of the selected faces of a group block.
///
/// Returns the number of faces painted. Directions with no face are skipped.
pub fn paint_faces(
    scene: &mut Scene,
    block: BlockId,
    dirs: &[Direction],
    color: &Color,
) -> Result<usize, EditorError> {
    let target = scene
        .get(block)
        .ok_or_else(|| EditorError::InvalidSelection(NO_BLOCK.to_string()))?;
    if target.is_solid() {
        return Err(EditorError::InvalidSelection(
            "Block must be editable before painting".to_string(),
        ));
    }
    if dirs.is_empty() {
        return Err(EditorError::InvalidSelection(NO_FACES.to_string()));
    }

    let mut painted = 0;
    for &dir in dirs {
        if let Some(face) = scene.face_mut(block, dir) {
            Rc::make_mut(&mut face.material).color = color.clone();
            painted += 1;
        }
    }
    Ok(painted)
}

// ============================================================================
// REPLACE
// ============================================================================

/// Replace the selected faces with the fragments of `target_kind`.
///
/// Fails without changing anything when a selected direction is locked by
/// the block's kind or the target kind lacks usable geometry. Returns the
/// number of faces replaced.
pub fn replace_face_type(
    scene: &mut Scene,
    registry: &KindRegistry,
    block: BlockId,
    dirs: &[Direction],
    target_kind: &str,
) -> Result<usize, EditorError> {
    let owner = scene
        .get(block)
        .ok_or_else(|| EditorError::InvalidSelection(NO_BLOCK.to_string()))?;
    let BlockBody::Group { faces } = &owner.body else {
        return Err(EditorError::InvalidSelection(
            "Block must be editable before replacing faces".to_string(),
        ));
    };
    if dirs.is_empty() {
        return Err(EditorError::InvalidSelection(NO_FACES.to_string()));
    }

    if let Some(&dir) = dirs.iter().find(|&&d| registry.is_locked(&owner.kind, d)) {
        return Err(EditorError::ForbiddenOperation(locked_message(
            registry,
            &owner.kind,
            dir,
        )));
    }

    let kind = registry.require(target_kind)?;

    // Build every replacement first; apply only if all succeed.
    let mut staged = Vec::with_capacity(dirs.len());
    for &dir in dirs {
        let Some(old) = faces[dir].as_ref() else {
            continue;
        };
        let fragment = &kind.faces[dir];
        let aligned = align_to_plane(&old.mesh, fragment, dir).ok_or_else(|| {
            EditorError::UnresolvedGeometry(format!("No geometry for {target_kind} {dir}"))
        })?;
        staged.push((dir, aligned, old.transform, Rc::clone(&old.material)));
    }

    let mut replaced = 0;
    for (dir, mesh, transform, material) in staged {
        let face = Face {
            id: scene.ids.next_face(),
            direction: dir,
            mesh,
            transform,
            material,
            face_type: target_kind.to_string(),
        };
        if scene.replace_face(block, face).is_some() {
            replaced += 1;
        }
    }
    Ok(replaced)
}

fn locked_message(registry: &KindRegistry, kind: &str, dir: Direction) -> String {
    let allowed: Vec<String> = Direction::ALL
        .into_iter()
        .filter(|&d| !registry.is_locked(kind, d))
        .map(|d| capitalize(d.name()))
        .collect();
    let what = if dir.axis() == Axis::Y { dir.name() } else { "side" };
    if allowed.is_empty() {
        format!("Cannot replace {kind} {what} facet")
    } else {
        format!(
            "Cannot replace {kind} {what} facet. Only {} are allowed",
            allowed.join(" and ")
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
