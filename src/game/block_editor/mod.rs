//! Block Editor Module
//!
//! The editor core: places blocks under a ghost preview, edits the faces
//! of a selected block, promotes edited blocks into reusable kinds, and
//! keeps snapshot-based undo/redo over the whole scene.
//!
//! All mutation happens synchronously on the caller's thread. Pointer
//! moves are buffered and applied once per [`BlockEditor::tick`].

pub mod block;
pub mod error;
pub mod library;
pub mod paint;
pub mod placement;
pub mod proxy;
pub mod scene;
pub mod stats;
pub mod undo;

use glam::Vec3;

use crate::game::config::EditorConfig;
use crate::geometry::{Direction, DirectionMap, Transform};
use crate::input::PointerQueue;
use crate::physics::collision::Ray;

pub use block::{Block, BlockBody, BlockId, Color, Face, FaceId, Material};
pub use error::EditorError;
pub use library::{Kind, KindOrigin, KindRegistry};
pub use placement::{Ghost, PlacementEngine, PlacementParams, PlacementState, can_place};
pub use scene::{PickHit, PickTarget, Scene};
pub use stats::FacetStats;
pub use undo::{BlockDescriptor, FaceDescriptor, History, Snapshot};

use paint::{NO_BLOCK, NO_FACES};

// ============================================================================
// TYPES
// ============================================================================

/// Last user-facing status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    /// False for rejected or failed actions
    pub ok: bool,
}

/// Kind the ghost starts with when the catalog has it.
const DEFAULT_KIND: &str = "Void";

// ============================================================================
// BLOCK EDITOR
// ============================================================================

/// Editor state: kinds, placed blocks, ghost, selection and history.
pub struct BlockEditor {
    config: EditorConfig,
    registry: KindRegistry,
    scene: Scene,
    placement: PlacementEngine,
    history: History,
    pointer: PointerQueue,
    /// Block targeted by face editing and kind registration
    selected: Option<BlockId>,
    selected_faces: DirectionMap<bool>,
    editor_open: bool,
    /// Color given to newly placed solids
    color: Color,
    /// Camera orbit pivot
    pivot: Vec3,
    status: Option<StatusMessage>,
}

impl BlockEditor {
    /// Editor with the config's built-in kinds and an empty scene as the
    /// history baseline.
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        let registry = KindRegistry::with_builtins(&config)?;
        let color = Color::parse(&config.default_color).ok_or_else(|| {
            EditorError::ForbiddenOperation(format!(
                "Invalid default color {}",
                config.default_color
            ))
        })?;
        let kind = Self::initial_kind(&registry);
        let scene = Scene::new(config.proxy_padding);
        let history = History::new(config.history_limit, Snapshot::capture(&scene));
        let placement = PlacementEngine::new(PlacementParams::from(&config), &kind);

        let mut editor = Self {
            config,
            registry,
            scene,
            placement,
            history,
            pointer: PointerQueue::new(),
            selected: None,
            selected_faces: DirectionMap::default(),
            editor_open: false,
            color,
            pivot: Vec3::ZERO,
            status: None,
        };
        editor.reset_pivot();
        Ok(editor)
    }

    fn initial_kind(registry: &KindRegistry) -> String {
        if registry.contains(DEFAULT_KIND) {
            DEFAULT_KIND.to_string()
        } else {
            registry.ids().next().unwrap_or(DEFAULT_KIND).to_string()
        }
    }

    /// Back to the startup state: built-in kinds only, empty scene, fresh
    /// history.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.scene.clear();
        self.history.reset(Snapshot::capture(&self.scene));
        self.pointer.clear();
        self.clear_selection();
        self.editor_open = false;
        self.placement.resume();
        self.placement.set_kind(&Self::initial_kind(&self.registry));
        self.reset_pivot();
        self.status = None;
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn blocks(&self) -> &[Block] {
        self.scene.blocks()
    }

    pub fn block_count(&self) -> usize {
        self.scene.len()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn active_kind(&self) -> &str {
        self.placement.active_kind()
    }

    pub fn ghost(&self) -> Option<&Ghost> {
        self.placement.ghost()
    }

    pub fn placement_state(&self) -> PlacementState {
        self.placement.state()
    }

    pub fn selected_block(&self) -> Option<BlockId> {
        self.selected
    }

    /// Selected face directions in canonical order.
    pub fn selected_faces(&self) -> Vec<Direction> {
        self.selected_faces
            .iter()
            .filter_map(|(d, &on)| on.then_some(d))
            .collect()
    }

    pub fn is_editor_open(&self) -> bool {
        self.editor_open
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    pub fn facet_stats(&self) -> FacetStats {
        FacetStats::compute(self.scene.blocks(), &self.registry)
    }

    // ========================================================================
    // SETTINGS
    // ========================================================================

    /// Choose the kind to place. The ghost is rebuilt.
    pub fn set_active_kind(&mut self, kind: &str) -> Result<(), EditorError> {
        let result = self.registry.require(kind).map(|_| ());
        let result = self.report(result);
        if result.is_ok() {
            self.placement.set_kind(kind);
        }
        result
    }

    /// Color for newly placed solids.
    pub fn set_color(&mut self, hex: &str) -> Result<(), EditorError> {
        let parsed = Color::parse(hex)
            .ok_or_else(|| EditorError::InvalidSelection(format!("Invalid color {hex}")));
        let result = self.report(parsed);
        result.map(|c| self.color = c)
    }

    // ========================================================================
    // FRAME / POINTER
    // ========================================================================

    /// Queue a pointer ray; only the latest one per frame is processed.
    pub fn pointer_moved(&mut self, ray: Ray) {
        self.pointer.push(ray);
    }

    /// Per-frame update: sync proxies, then recompute the ghost if the
    /// pointer moved. Returns the new placement state when it was
    /// recomputed.
    pub fn tick(&mut self) -> Option<PlacementState> {
        self.scene.sync_proxies(&self.registry);
        let ray = self.pointer.take()?;
        Some(self.placement.update(&ray, &self.scene, &self.registry))
    }

    // ========================================================================
    // PLACE / DELETE / CLEAR
    // ========================================================================

    /// Build a block where the ghost is, if the ghost is valid.
    pub fn commit_placement(&mut self) -> Option<BlockId> {
        let placement = self.placement.commit()?;
        self.build_block(&placement.kind, placement.transform)
    }

    /// Place the active kind centered at `center`, if it fits.
    pub fn place_at(&mut self, center: Vec3) -> Option<BlockId> {
        if self.editor_open {
            return None;
        }
        if !self
            .placement
            .can_place_at(center, &self.scene, &self.registry)
        {
            log::debug!("placement rejected at {center}");
            return None;
        }
        let kind = self.placement.active_kind().to_string();
        self.build_block(&kind, Transform::from_position(center))
    }

    fn build_block(&mut self, kind: &str, transform: Transform) -> Option<BlockId> {
        let body = if self.registry.get(kind).is_some_and(Kind::is_custom) {
            match self.registry.build_from_custom_kind(kind, &mut self.scene.ids) {
                Ok(body) => body,
                Err(e) => {
                    let _ = self.report::<()>(Err(e));
                    return None;
                }
            }
        } else {
            BlockBody::Solid {
                mesh: self.registry.base_mesh(kind),
                material: Material::shared(self.color.clone()),
            }
        };
        let id = self.scene.insert(kind, transform, body, &self.registry);
        self.pivot = transform.position;
        log::info!("placed {kind} {id} at {}", transform.position);
        self.set_status("Cubik added", true);
        self.push_snapshot();
        Some(id)
    }

    /// Delete the block whose surface `ray` strikes first.
    pub fn delete_at(&mut self, ray: &Ray) -> Option<BlockId> {
        let hit = self.scene.raycast_pickables(ray)?;
        let id = hit.target.owner();
        self.delete_block(id).then_some(id)
    }

    pub fn delete_block(&mut self, id: BlockId) -> bool {
        if self.scene.remove(id).is_none() {
            return false;
        }
        if self.selected == Some(id) {
            self.clear_selection();
            self.close_view();
        }
        log::info!("deleted {id}");
        self.set_status("Deleted", true);
        self.push_snapshot();
        true
    }

    /// Remove every block.
    pub fn clear_all(&mut self) {
        self.scene.clear();
        self.clear_selection();
        self.close_view();
        log::info!("scene cleared");
        self.set_status("Scene cleared", true);
        self.push_snapshot();
        self.reset_pivot();
    }

    // ========================================================================
    // SELECTION / FACE EDITOR
    // ========================================================================

    pub fn select_block(&mut self, id: BlockId) -> Result<(), EditorError> {
        if self.scene.get(id).is_none() {
            return self.report(Err(EditorError::InvalidSelection(NO_BLOCK.to_string())));
        }
        if self.selected != Some(id) {
            self.selected = Some(id);
            self.selected_faces = DirectionMap::default();
        }
        Ok(())
    }

    /// Select the block under `ray`; a face hit on an open editor's block
    /// toggles that face instead.
    pub fn select_at(&mut self, ray: &Ray) -> Option<BlockId> {
        let hit = self.scene.raycast_pickables(ray)?;
        let id = hit.target.owner();
        if self.editor_open && self.selected == Some(id) {
            if let Some(dir) = hit.direction {
                self.selected_faces[dir] = !self.selected_faces[dir];
            }
            return Some(id);
        }
        self.select_block(id).ok()?;
        Some(id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.selected_faces = DirectionMap::default();
    }

    /// Turn a solid into an editable group. The block keeps its id,
    /// position in the scene and proxy. Groups are left alone.
    pub fn ensure_editable(&mut self, id: BlockId) -> Result<(), EditorError> {
        let block = self
            .scene
            .get(id)
            .ok_or_else(|| EditorError::InvalidSelection(NO_BLOCK.to_string()))?;
        let BlockBody::Solid { material, .. } = &block.body else {
            return Ok(());
        };
        let color = material.color.clone();
        let kind = block.kind.clone();
        let body = self
            .registry
            .editable_body(&kind, &color, &mut self.scene.ids)?;
        self.scene.replace_body(id, body);
        log::debug!("{id} converted to editable group");
        Ok(())
    }

    /// Select `id` and open the face editor on it.
    pub fn open_editor(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.select_block(id)?;
        let result = self.ensure_editable(id);
        self.report(result)?;
        self.editor_open = true;
        self.placement.suspend();
        Ok(())
    }

    /// Toggle one face of the selected block. Returns the new state.
    pub fn toggle_face(&mut self, dir: Direction) -> Result<bool, EditorError> {
        self.require_selection()?;
        let on = !self.selected_faces[dir];
        self.selected_faces[dir] = on;
        Ok(on)
    }

    /// Replace the face selection.
    pub fn select_faces(&mut self, dirs: &[Direction]) -> Result<(), EditorError> {
        self.require_selection()?;
        self.selected_faces = DirectionMap::from_fn(|d| dirs.contains(&d));
        Ok(())
    }

    /// Close the face editor and make the edited block's shape the ghost.
    ///
    /// If no kind can be derived the previous ghost kind stays active.
    pub fn close_editor(&mut self) {
        if !self.editor_open {
            return;
        }
        self.close_view();
        let Some(block) = self.selected.and_then(|id| self.scene.get(id)) else {
            return;
        };
        match self.registry.derive_from_block(block) {
            Ok(kind) => self.placement.set_kind(&kind),
            Err(e) => log::debug!("keeping ghost {}: {e}", self.placement.active_kind()),
        }
    }

    fn close_view(&mut self) {
        self.editor_open = false;
        self.selected_faces = DirectionMap::default();
        self.placement.resume();
    }

    fn require_selection(&mut self) -> Result<BlockId, EditorError> {
        match self.selected.filter(|id| self.scene.get(*id).is_some()) {
            Some(id) => Ok(id),
            None => self.report(Err(EditorError::InvalidSelection(NO_BLOCK.to_string()))),
        }
    }

    // ========================================================================
    // FACE EDITING
    // ========================================================================

    /// Paint the selected faces of the selected block.
    pub fn paint_selected(&mut self, hex: &str) -> Result<usize, EditorError> {
        let id = self.require_selection()?;
        let result = self.paint_inner(id, hex);
        let painted = self.report(result)?;
        self.set_status(&format!("Colored facets: {painted}"), true);
        self.push_snapshot();
        Ok(painted)
    }

    fn paint_inner(&mut self, id: BlockId, hex: &str) -> Result<usize, EditorError> {
        let color = Color::parse(hex)
            .ok_or_else(|| EditorError::InvalidSelection(format!("Invalid color {hex}")))?;
        let dirs = self.selected_faces();
        if dirs.is_empty() {
            return Err(EditorError::InvalidSelection(NO_FACES.to_string()));
        }
        self.ensure_editable(id)?;
        paint::paint_faces(&mut self.scene, id, &dirs, &color)
    }

    /// Swap the selected faces of the selected block for `target_kind`'s.
    pub fn replace_selected(&mut self, target_kind: &str) -> Result<usize, EditorError> {
        let id = self.require_selection()?;
        let result = self.replace_inner(id, target_kind);
        let replaced = self.report(result)?;
        self.set_status(&format!("Replaced facets: {replaced}"), replaced > 0);
        if replaced > 0 {
            self.push_snapshot();
        }
        Ok(replaced)
    }

    fn replace_inner(&mut self, id: BlockId, target_kind: &str) -> Result<usize, EditorError> {
        let dirs = self.selected_faces();
        if dirs.is_empty() {
            return Err(EditorError::InvalidSelection(NO_FACES.to_string()));
        }
        self.ensure_editable(id)?;
        paint::replace_face_type(&mut self.scene, &self.registry, id, &dirs, target_kind)
    }

    // ========================================================================
    // KINDS
    // ========================================================================

    /// Register the selected block as a custom kind.
    ///
    /// A solid selection is captured as if it had been made editable; the
    /// scene itself is not changed.
    pub fn register_selected_kind(&mut self, name: Option<&str>) -> Result<String, EditorError> {
        let id = self.require_selection()?;
        let result = self.register_inner(id, name);
        self.report(result)
    }

    fn register_inner(&mut self, id: BlockId, name: Option<&str>) -> Result<String, EditorError> {
        let mut block = self
            .scene
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::InvalidSelection(NO_BLOCK.to_string()))?;
        if let BlockBody::Solid { material, .. } = &block.body {
            let color = material.color.clone();
            block.body = self
                .registry
                .editable_body(&block.kind, &color, &mut self.scene.ids)?;
        }
        self.registry.register_custom_kind(&block, name)
    }

    /// Register the selected block and make it the kind being placed.
    pub fn use_selected(&mut self) -> Result<String, EditorError> {
        let kind = self.register_selected_kind(None)?;
        self.placement.set_kind(&kind);
        self.set_status(&format!("Using {kind}"), true);
        Ok(kind)
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    fn push_snapshot(&mut self) {
        self.history.push(Snapshot::capture(&self.scene));
    }

    /// Step back one snapshot. Returns false at the baseline.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let Some(snapshot) = self.history.undo().cloned() else {
            return Ok(false);
        };
        self.apply_snapshot(&snapshot)?;
        log::info!("undo ({} left)", self.history.undo_len() - 1);
        self.set_status("Undo", true);
        Ok(true)
    }

    /// Step forward one snapshot. Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let Some(snapshot) = self.history.redo().cloned() else {
            return Ok(false);
        };
        self.apply_snapshot(&snapshot)?;
        log::info!("redo ({} left)", self.history.redo_len());
        self.set_status("Redo", true);
        Ok(true)
    }

    /// Describe every placed block.
    pub fn snapshot_scene(&self) -> Snapshot {
        Snapshot::capture(&self.scene)
    }

    /// Rebuild the scene from `snapshot` without recording history.
    pub fn restore_scene(&mut self, snapshot: &Snapshot) -> Result<(), EditorError> {
        self.apply_snapshot(snapshot)
    }

    /// Restore `snapshot` and make it the new history baseline.
    pub fn load_scene(&mut self, snapshot: &Snapshot) -> Result<(), EditorError> {
        self.apply_snapshot(snapshot)?;
        self.history.reset(snapshot.clone());
        Ok(())
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), EditorError> {
        let result = snapshot.restore(&mut self.scene, &self.registry);
        self.report(result)?;
        self.clear_selection();
        self.close_view();
        match self.scene.last() {
            Some(block) => self.pivot = block.transform.position,
            None => self.reset_pivot(),
        }
        Ok(())
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn reset_pivot(&mut self) {
        self.pivot = Vec3::new(0.0, self.registry.half_extent(DEFAULT_KIND).y, 0.0);
    }

    fn set_status(&mut self, text: &str, ok: bool) {
        self.status = Some(StatusMessage {
            text: text.to_string(),
            ok,
        });
    }

    /// Surface an error on the status line and the log, then pass it on.
    fn report<T>(&mut self, result: Result<T, EditorError>) -> Result<T, EditorError> {
        if let Err(e) = &result {
            log::warn!("{e}");
            self.set_status(&e.user_message(), false);
        }
        result
    }
}
