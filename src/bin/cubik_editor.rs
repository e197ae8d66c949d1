//! Cubik Editor - Headless Script Runner
//!
//! Drives the block editor from a JSON command script and prints the
//! resulting scene snapshot and facet statistics.
//!
//! Run with: `cargo run --bin cubik_editor -- script.json [config.json]`
//! (reads the script from stdin when no path is given)
//!
//! Script format: a JSON array of commands, e.g.
//! ```json
//! [
//!   { "op": "place_at", "position": [0.0, 0.5, 0.0] },
//!   { "op": "open_editor", "block": 1 },
//!   { "op": "select_faces", "faces": ["top", "front"] },
//!   { "op": "paint", "color": "#FF0000" },
//!   { "op": "close_editor" },
//!   { "op": "undo" }
//! ]
//! ```
//!
//! Set `RUST_LOG=debug` for a trace of every editor step.

use std::io::Read;
use std::process::ExitCode;

use glam::Vec3;
use serde::Deserialize;

use cubik_engine::Ray;
use cubik_engine::game::{BlockEditor, BlockId, EditorConfig, EditorError, Snapshot};
use cubik_engine::geometry::Direction;

// ============================================================================
// SCRIPT
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command {
    /// Move the pointer, advance one frame, then build at the ghost.
    PlaceRay { origin: Vec3, direction: Vec3 },
    PlaceAt { position: Vec3 },
    DeleteRay { origin: Vec3, direction: Vec3 },
    Delete { block: u64 },
    Select { block: u64 },
    SelectAt { origin: Vec3, direction: Vec3 },
    /// Open the face editor on `block`, or on the current selection.
    OpenEditor {
        #[serde(default)]
        block: Option<u64>,
    },
    ToggleFace { face: Direction },
    SelectFaces { faces: Vec<Direction> },
    Paint { color: String },
    Replace { kind: String },
    Register {
        #[serde(default)]
        name: Option<String>,
    },
    Use,
    CloseEditor,
    SetKind { kind: String },
    SetColor { color: String },
    Undo,
    Redo,
    Clear,
    /// Replace the scene with a snapshot and make it the history baseline.
    Load { snapshot: Snapshot },
}

fn run(editor: &mut BlockEditor, command: Command) -> Result<(), EditorError> {
    match command {
        Command::PlaceRay { origin, direction } => {
            editor.pointer_moved(Ray::new(origin, direction));
            editor.tick();
            if editor.commit_placement().is_none() {
                log::info!("ghost invalid, nothing placed");
            }
        }
        Command::PlaceAt { position } => {
            if editor.place_at(position).is_none() {
                log::info!("cannot place at {position}");
            }
        }
        Command::DeleteRay { origin, direction } => {
            editor.delete_at(&Ray::new(origin, direction));
        }
        Command::Delete { block } => {
            editor.delete_block(BlockId(block));
        }
        Command::Select { block } => editor.select_block(BlockId(block))?,
        Command::SelectAt { origin, direction } => {
            editor.select_at(&Ray::new(origin, direction));
        }
        Command::OpenEditor { block } => {
            let id = block.map(BlockId).or(editor.selected_block()).ok_or_else(|| {
                EditorError::InvalidSelection("Select a cubik first".to_string())
            })?;
            editor.open_editor(id)?;
        }
        Command::ToggleFace { face } => {
            editor.toggle_face(face)?;
        }
        Command::SelectFaces { faces } => editor.select_faces(&faces)?,
        Command::Paint { color } => {
            editor.paint_selected(&color)?;
        }
        Command::Replace { kind } => {
            editor.replace_selected(&kind)?;
        }
        Command::Register { name } => {
            editor.register_selected_kind(name.as_deref())?;
        }
        Command::Use => {
            editor.use_selected()?;
        }
        Command::CloseEditor => editor.close_editor(),
        Command::SetKind { kind } => editor.set_active_kind(&kind)?,
        Command::SetColor { color } => editor.set_color(&color)?,
        Command::Undo => {
            editor.undo()?;
        }
        Command::Redo => {
            editor.redo()?;
        }
        Command::Clear => editor.clear_all(),
        Command::Load { snapshot } => editor.load_scene(&snapshot)?,
    }
    Ok(())
}

// ============================================================================
// MAIN
// ============================================================================

fn read_script(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn load_config(path: Option<&str>) -> Result<EditorConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let mut config = EditorConfig::from_json(&std::fs::read_to_string(path)?)?;
            if let Some(dir) = std::path::Path::new(path).parent() {
                config.rebase_mesh_paths(dir);
            }
            Ok(config)
        }
        None => Ok(EditorConfig::default()),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let script_path = args.first().map(String::as_str);
    let config_path = args.get(1).map(String::as_str);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let script = match read_script(script_path) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("cannot read script: {e}");
            return ExitCode::FAILURE;
        }
    };
    let commands: Vec<Command> = match serde_json::from_str(&script) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("invalid script: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut editor = match BlockEditor::new(config) {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("editor setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    for (step, command) in commands.into_iter().enumerate() {
        log::debug!("step {step}: {command:?}");
        if let Err(e) = run(&mut editor, command) {
            // Rejected commands leave the scene as it was; keep going.
            log::warn!("step {step} rejected: {e}");
        }
        if let Some(status) = editor.status() {
            println!("[{step}] {}", status.text);
        }
    }

    match editor.snapshot_scene().to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("cannot serialize scene: {e}");
            return ExitCode::FAILURE;
        }
    }
    println!("{}", editor.facet_stats());
    ExitCode::SUCCESS
}
