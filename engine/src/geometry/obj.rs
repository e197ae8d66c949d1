//! Wavefront OBJ Loading
//!
//! Reads OBJ geometry into a single [`Mesh`]. Every model in the file is
//! triangulated and merged; materials and texture coordinates are ignored.

use std::io::{BufReader, Cursor};
use std::path::Path;

use super::mesh::Mesh;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

fn merge_models(models: &[tobj::Model]) -> Mesh {
    let parts: Vec<Mesh> = models
        .iter()
        .filter_map(|m| Mesh::from_buffers(&m.mesh.positions, &m.mesh.indices))
        .collect();
    Mesh::merge(&parts).unwrap_or_default()
}

/// Parse OBJ source text. Material libraries are not followed.
///
/// A file with no faces yields an empty mesh.
pub fn parse_obj(text: &str) -> Result<Mesh, tobj::LoadError> {
    let mut reader = BufReader::new(Cursor::new(text.as_bytes()));
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;
    Ok(merge_models(&models))
}

/// Load an OBJ file from disk.
pub fn load_obj(path: &Path) -> Result<Mesh, tobj::LoadError> {
    let (models, _materials) = tobj::load_obj(path, &load_options())?;
    log::debug!("loaded {} model(s) from {}", models.len(), path.display());
    Ok(merge_models(&models))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn test_quad_is_triangulated() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.positions.len(), 4);
    }

    #[test]
    fn test_models_are_merged() {
        let two = format!("o a\n{QUAD}o b\nv 0 0 1\nv 1 0 1\nv 1 1 1\nf 5 6 7\n");
        let mesh = parse_obj(&two).unwrap();
        assert_eq!(mesh.triangle_count(), 3);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));
    }

    #[test]
    fn test_vertices_without_faces_is_empty() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\n").unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_obj(Path::new("/nonexistent/cubik/shape.obj")).is_err());
    }
}
