//! The workspace façade: one open canvas and everything attached to it.
//!
//! `Workspace` owns the scene, viewport, controller, history, minimap,
//! render sync, and the persistence/media collaborators. The host feeds it
//! input and calls `tick` once per frame; everything else (snapshots,
//! debounced saves, projection updates) follows from that.
//!
//! ## Flow
//!
//! ```text
//! input ─► Controller ─► Scene/Viewport ─► SceneEvent channel
//!                                              │
//!              ┌───────────────┬───────────────┤
//!              ▼               ▼               ▼
//!         RenderSync      Minimap dirty    Autosave schedule
//! ```

use crate::autosave::AutosaveDebouncer;
use crate::config::EngineConfig;
use crate::config_watcher::{ConfigEvent, ConfigWatcher};
use crate::error::{CanvasError, CanvasResult};
use crate::events::{EventSink, SceneEvent, drain, event_channel};
use crate::geometry::Point;
use crate::history::HistoryManager;
use crate::input::{Controller, InputOutcome, KeyIntent, PointerEvent, WheelEvent};
use crate::media::MediaStore;
use crate::minimap::{ItemFilter, MinimapProjection, MinimapProjector};
use crate::notifications::{Notification, NotificationQueue};
use crate::perf::FrameStats;
use crate::persistence::{self, SceneStore};
use crate::profile_scope;
use crate::render_sync::{RenderInputs, RenderSurface, RenderSync, SyncStats};
use crate::scene::Scene;
use crate::selection::Selection;
use crate::types::{
    CanvasItem, ColorTag, Connection, ConnectionDirection, Handle, ItemKind, ItemPatch, ItemSpec,
};
use crate::viewport::{ViewTransform, Viewport};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What a frame tick did, for hosts that redraw on demand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    /// A viewport transition is still running
    pub animating: bool,
    /// The minimap projection was recomputed this frame
    pub minimap_updated: bool,
    /// An autosave write was attempted this frame
    pub saved: bool,
}

pub struct Workspace {
    scene: Scene,
    events: Receiver<SceneEvent>,
    sink: EventSink,
    viewport: Viewport,
    controller: Controller,
    history: HistoryManager,
    minimap: MinimapProjector,
    render_sync: RenderSync,
    autosave: AutosaveDebouncer,
    store: Box<dyn SceneStore>,
    media: Box<dyn MediaStore>,
    canvas_id: Option<String>,
    /// Media of deleted items, released once no history entry needs it
    pending_release: Vec<String>,
    notifications: NotificationQueue,
    frame_stats: FrameStats,
    config: EngineConfig,
    config_watcher: Option<ConfigWatcher>,
}

impl Workspace {
    pub fn new(config: EngineConfig, store: Box<dyn SceneStore>, media: Box<dyn MediaStore>) -> Self {
        let config = config.sanitized();
        let (sink, events) = event_channel();
        let mut scene = Scene::new().with_min_size(config.min_item_size);
        scene.set_event_sink(sink.clone());

        let viewport = Viewport::new()
            .with_zoom_bounds(config.min_zoom, config.max_zoom)
            .with_fit_options(config.fit_options())
            .with_animation_duration(config.animation_duration());

        let mut history = HistoryManager::new(config.history_capacity);
        history.snapshot(&scene);

        Self {
            scene,
            events,
            sink,
            viewport,
            controller: Controller::new(config.controller_settings()),
            history,
            minimap: MinimapProjector::new(config.minimap_size, config.minimap_padding),
            render_sync: RenderSync::new(),
            autosave: AutosaveDebouncer::new(config.autosave_delay()),
            store,
            media,
            canvas_id: None,
            pending_release: Vec::new(),
            notifications: NotificationQueue::default(),
            frame_stats: FrameStats::new(),
            config,
            config_watcher: None,
        }
    }

    // ==================== Accessors ====================

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn minimap(&self) -> Option<&MinimapProjection> {
        self.minimap.last()
    }

    pub fn canvas_id(&self) -> Option<&str> {
        self.canvas_id.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.frame_stats
    }

    pub fn media(&self) -> &dyn MediaStore {
        self.media.as_ref()
    }

    pub fn media_mut(&mut self) -> &mut dyn MediaStore {
        self.media.as_mut()
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    // ==================== Canvas Lifecycle ====================

    /// Make `canvas_id` the live canvas. Pending work for the previous canvas
    /// is flushed first. A canvas that was never saved opens empty.
    ///
    /// On a load failure the previous canvas stays open.
    pub fn open_canvas(&mut self, canvas_id: &str) -> CanvasResult<()> {
        if self.canvas_id.as_deref() == Some(canvas_id) {
            return Ok(());
        }
        self.flush_pending_save();
        self.viewport.cancel_animation();
        self.controller.reset();

        let loaded = match self.store.load(canvas_id) {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(canvas_id, error = %e, "Failed to load canvas");
                self.notify(Notification::error(format!("Could not open canvas: {e}")));
                return Err(e);
            }
        };

        match loaded {
            Some(data) => {
                if let Err(e) = persistence::deserialize_scene(data, &mut self.scene, &mut self.viewport) {
                    error!(canvas_id, error = %e, "Failed to restore canvas");
                    self.notify(Notification::error(format!("Could not open canvas: {e}")));
                    return Err(e);
                }
            }
            None => {
                self.scene.clear();
                self.viewport.reset();
            }
        }

        self.canvas_id = Some(canvas_id.to_string());
        self.history.clear();
        self.history.snapshot(&self.scene);
        self.release_unreferenced_media();
        self.sink.emit(SceneEvent::ViewportChanged);
        self.pump_events();
        // Loading is not an edit
        self.autosave.cancel();

        info!(canvas_id, items = self.scene.item_count(), "Opened canvas");
        Ok(())
    }

    /// Alias kept for hosts that think in terms of switching.
    pub fn switch_canvas(&mut self, canvas_id: &str) -> CanvasResult<()> {
        self.open_canvas(canvas_id)
    }

    /// Flush pending work and drop the live canvas.
    pub fn close_canvas(&mut self) {
        self.flush_pending_save();
        self.viewport.cancel_animation();
        self.controller.reset();
        self.scene.clear();
        self.viewport.reset();
        self.history.clear();
        self.history.snapshot(&self.scene);
        self.release_unreferenced_media();
        if let Some(id) = self.canvas_id.take() {
            info!(canvas_id = %id, "Closed canvas");
        }
        self.pump_events();
        self.autosave.cancel();
    }

    /// Write the live canvas now, cancelling any pending debounced save.
    pub fn save_now(&mut self) -> CanvasResult<()> {
        self.pump_events();
        self.autosave.cancel();
        self.write_canvas()
    }

    fn flush_pending_save(&mut self) {
        self.pump_events();
        if self.autosave.flush() {
            // Failures are already surfaced as notifications
            let _ = self.write_canvas();
        }
    }

    fn write_canvas(&mut self) -> CanvasResult<()> {
        let Some(canvas_id) = self.canvas_id.clone() else {
            return Err(CanvasError::NoCanvas);
        };
        let data = persistence::serialize_scene(&self.scene, &self.viewport);
        match self.store.save(&canvas_id, &data) {
            Ok(()) => {
                info!(canvas_id, items = data.items.len(), "Saved canvas");
                Ok(())
            }
            Err(e) => {
                error!(canvas_id, error = %e, "Failed to save canvas");
                self.notify(Notification::error(format!("Save failed: {e}")));
                Err(e)
            }
        }
    }

    // ==================== Scene Operations ====================

    pub fn create_item(&mut self, spec: ItemSpec) -> CanvasItem {
        let item = self.scene.create_item(spec);
        self.commit();
        item
    }

    /// Delete an item and its connections. Its media resource is released
    /// once undo can no longer bring the item back.
    pub fn delete_item(&mut self, id: &str) -> bool {
        if !self.remove_item(id) {
            return false;
        }
        self.controller.sync_selection(&self.scene);
        self.commit();
        true
    }

    fn remove_item(&mut self, id: &str) -> bool {
        let Some(removed) = self.scene.delete_item(id) else {
            return false;
        };
        if let Some(media_id) = removed.item.content.media_id().filter(|m| !m.is_empty()) {
            if !self.pending_release.iter().any(|m| m == media_id) {
                debug!(id, media_id, "Media release deferred");
                self.pending_release.push(media_id.to_string());
            }
        }
        true
    }

    /// Release deferred media that neither the scene nor history references.
    fn release_unreferenced_media(&mut self) {
        if self.pending_release.is_empty() {
            return;
        }
        let (keep, release): (Vec<String>, Vec<String>) =
            std::mem::take(&mut self.pending_release)
                .into_iter()
                .partition(|media_id| {
                    self.history.references_media(media_id)
                        || self
                            .scene
                            .items()
                            .iter()
                            .any(|item| item.content.media_id() == Some(media_id.as_str()))
                });
        self.pending_release = keep;

        for media_id in release {
            if let Err(e) = self.media.release(&media_id) {
                warn!(media_id = %media_id, error = %e, "Failed to release media");
                self.notify(Notification::warning(format!("Could not release media: {e}")));
            }
        }
    }

    /// Delete the selected items, or the selected connection.
    pub fn delete_selection(&mut self) -> bool {
        let selection = self.controller.selection().clone();
        let mut changed = false;
        if let Some(conn) = selection.connection() {
            changed |= self.scene.delete_connection(conn);
        }
        for id in selection.items() {
            changed |= self.remove_item(&id);
        }
        if changed {
            self.controller.selection_mut().clear();
            self.sink.emit(SceneEvent::SelectionChanged);
            self.commit();
        }
        changed
    }

    pub fn update_item(&mut self, id: &str, patch: ItemPatch) -> bool {
        self.commit_if(|scene| scene.mutate_item(id, patch))
    }

    pub fn set_color(&mut self, id: &str, color: Option<ColorTag>) -> bool {
        self.commit_if(|scene| scene.set_color(id, color))
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> bool {
        self.commit_if(|scene| scene.set_locked(id, locked))
    }

    pub fn connect(&mut self, from: &str, from_handle: Handle, to: &str, to_handle: Handle) -> Option<Connection> {
        self.connect_with(from, from_handle, to, to_handle, ConnectionDirection::default())
    }

    pub fn connect_with(
        &mut self,
        from: &str,
        from_handle: Handle,
        to: &str,
        to_handle: Handle,
        direction: ConnectionDirection,
    ) -> Option<Connection> {
        let conn = self
            .scene
            .create_connection_with(from, from_handle, to, to_handle, direction)?;
        self.commit();
        Some(conn)
    }

    pub fn delete_connection(&mut self, id: &str) -> bool {
        let deleted = self.commit_if(|scene| scene.delete_connection(id));
        if deleted {
            self.controller.sync_selection(&self.scene);
        }
        deleted
    }

    pub fn set_connection_direction(&mut self, id: &str, direction: ConnectionDirection) -> bool {
        self.commit_if(|scene| scene.set_connection_direction(id, direction))
    }

    pub fn spawn_child(&mut self, parent_id: &str, kind: ItemKind) -> Option<(CanvasItem, Connection)> {
        let spawned = self.scene.spawn_child(parent_id, kind)?;
        self.commit();
        Some(spawned)
    }

    fn commit_if(&mut self, op: impl FnOnce(&mut Scene) -> bool) -> bool {
        let changed = op(&mut self.scene);
        if changed {
            self.commit();
        }
        changed
    }

    /// Mutation boundary: capture history and forward events.
    fn commit(&mut self) {
        self.history.snapshot(&self.scene);
        self.release_unreferenced_media();
        self.pump_events();
    }

    // ==================== History ====================

    pub fn undo(&mut self) -> bool {
        self.controller.cancel(&mut self.scene);
        let undone = self.history.undo(&mut self.scene, self.media.as_ref());
        self.after_restore(undone)
    }

    pub fn redo(&mut self) -> bool {
        self.controller.cancel(&mut self.scene);
        let redone = self.history.redo(&mut self.scene, self.media.as_ref());
        self.after_restore(redone)
    }

    fn after_restore(&mut self, restored: bool) -> bool {
        if restored {
            self.controller.sync_selection(&self.scene);
            self.sink.emit(SceneEvent::SelectionChanged);
        }
        self.pump_events();
        restored
    }

    // ==================== Input ====================

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> InputOutcome {
        profile_scope!("workspace_pointer");

        let before = (self.viewport.transform(), self.controller.selection().clone());
        let outcome = self
            .controller
            .handle_pointer(event, &mut self.scene, &mut self.viewport);
        self.after_input(outcome, before);
        outcome
    }

    pub fn handle_wheel(&mut self, event: &WheelEvent) -> InputOutcome {
        let before = (self.viewport.transform(), self.controller.selection().clone());
        let outcome = self.controller.handle_wheel(event, &mut self.viewport);
        self.after_input(outcome, before);
        outcome
    }

    pub fn handle_key(&mut self, intent: KeyIntent) -> InputOutcome {
        debug!(?intent, "Key intent");
        match intent {
            KeyIntent::Undo => outcome_of(self.undo()),
            KeyIntent::Redo => outcome_of(self.redo()),
            KeyIntent::DeleteSelection => outcome_of(self.delete_selection()),
            KeyIntent::Cancel => {
                let outcome = self.controller.cancel(&mut self.scene);
                self.pump_events();
                outcome
            }
            KeyIntent::SelectAll => {
                let outcome = self.controller.select_all(&self.scene);
                self.sink.emit(SceneEvent::SelectionChanged);
                self.pump_events();
                outcome
            }
        }
    }

    fn after_input(&mut self, outcome: InputOutcome, before: (ViewTransform, Selection)) {
        if outcome == InputOutcome::Ignored {
            return;
        }
        let (transform, selection) = before;
        if self.viewport.transform() != transform {
            self.sink.emit(SceneEvent::ViewportChanged);
        }
        if *self.controller.selection() != selection {
            self.sink.emit(SceneEvent::SelectionChanged);
        }
        if outcome.is_commit() {
            self.commit();
        } else {
            self.pump_events();
        }
    }

    // ==================== Viewport ====================

    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.viewport.set_screen_size(width, height);
        self.sink.emit(SceneEvent::ViewportChanged);
        self.pump_events();
    }

    pub fn zoom_at(&mut self, scale: f32, pivot_x: f32, pivot_y: f32) -> bool {
        let changed = self.viewport.set_zoom(scale, pivot_x, pivot_y);
        if changed {
            self.sink.emit(SceneEvent::ViewportChanged);
            self.pump_events();
        }
        changed
    }

    /// Animate so every item is visible.
    pub fn fit_to_content(&mut self, now: Instant) {
        self.viewport.fit_to_content(self.scene.items(), now);
    }

    /// Centre the viewport on the world point under an overview click.
    pub fn minimap_click(&mut self, point: Point, now: Instant) -> bool {
        let Some(world) = self.minimap.click_to_world(point) else {
            return false;
        };
        self.viewport.pan_to(world, now);
        true
    }

    pub fn set_item_filter(&mut self, filter: ItemFilter) {
        self.minimap.set_filter(filter.clone());
        self.render_sync.set_filter(filter);
    }

    // ==================== Frame Loop ====================

    /// Advance animations, fire a due autosave, and refresh the minimap.
    pub fn tick(&mut self, now: Instant) -> FrameUpdate {
        profile_scope!("workspace_tick");

        if self.frame_stats.tick(now).is_some() && self.frame_stats.total_frames() % 300 == 0 {
            self.frame_stats.log_summary_if_slow();
        }
        self.check_config_reload();

        let mut update = FrameUpdate::default();
        if self.viewport.tick(now) {
            self.sink.emit(SceneEvent::ViewportChanged);
        }
        update.animating = self.viewport.is_animating();
        self.pump_events();

        // Never persist a half-finished gesture
        if !self.controller.state().is_drag_class() && self.autosave.poll(now) && self.canvas_id.is_some() {
            update.saved = true;
            let _ = self.write_canvas();
        }

        update.minimap_updated = self
            .minimap
            .frame(&self.scene, self.viewport.visible_world_rect())
            .is_some();
        update
    }

    /// Push pending model changes to the host's visuals.
    pub fn sync_render(&mut self, surface: &mut dyn RenderSurface) -> SyncStats {
        self.pump_events();
        let inputs = RenderInputs {
            scene: &self.scene,
            viewport: &self.viewport,
            input: self.controller.state(),
            selection: self.controller.selection(),
            media: self.media.as_ref(),
        };
        self.render_sync.sync(&inputs, surface)
    }

    /// Remove every visual from the surface, e.g. before the host drops it.
    pub fn teardown_render(&mut self, surface: &mut dyn RenderSurface) {
        self.render_sync.teardown(surface);
    }

    /// Route queued events to the derived consumers.
    fn pump_events(&mut self) {
        let events = drain(&self.events);
        if events.is_empty() {
            return;
        }
        self.render_sync.apply_events(&events);
        if events.iter().any(SceneEvent::is_model_mutation) {
            self.minimap.mark_dirty();
            self.autosave.schedule(Instant::now());
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    // ==================== Import / Export ====================

    pub fn export_json(&self) -> CanvasResult<String> {
        persistence::export_json(&persistence::serialize_scene(&self.scene, &self.viewport))
    }

    /// Replace the scene with imported JSON. The import is undoable.
    pub fn import_json(&mut self, json: &str) -> CanvasResult<()> {
        let data = match persistence::import_json(json) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Rejected import");
                self.notify(Notification::error(format!("Import failed: {e}")));
                return Err(e);
            }
        };
        self.controller.reset();
        self.viewport.cancel_animation();
        persistence::deserialize_scene(data, &mut self.scene, &mut self.viewport)?;
        self.sink.emit(SceneEvent::ViewportChanged);
        self.sink.emit(SceneEvent::SelectionChanged);
        self.commit();
        info!(items = self.scene.item_count(), "Imported scene");
        Ok(())
    }

    // ==================== Configuration ====================

    /// Apply a new config to every component. History and the live scene
    /// are kept; shrinking the history capacity evicts the oldest entries.
    pub fn apply_config(&mut self, config: EngineConfig) {
        let config = config.sanitized();
        if config == self.config {
            return;
        }

        self.history.set_capacity(config.history_capacity);
        self.release_unreferenced_media();
        self.autosave.set_delay(config.autosave_delay());
        self.scene.set_min_size(config.min_item_size);
        self.controller.set_settings(config.controller_settings());

        let before = self.viewport.transform();
        self.viewport.set_zoom_bounds(config.min_zoom, config.max_zoom);
        self.viewport.set_fit_options(config.fit_options());
        self.viewport.set_animation_duration(config.animation_duration());
        if self.viewport.transform() != before {
            self.sink.emit(SceneEvent::ViewportChanged);
        }

        if config.minimap_size != self.config.minimap_size || config.minimap_padding != self.config.minimap_padding {
            let filter = self.minimap.filter().clone();
            self.minimap = MinimapProjector::new(config.minimap_size, config.minimap_padding);
            self.minimap.set_filter(filter);
        }

        debug!(?config, "Applied engine config");
        self.config = config;
        self.pump_events();
    }

    /// Start watching a config file for hot reload.
    pub fn watch_config(&mut self, path: PathBuf) -> anyhow::Result<()> {
        self.config_watcher = Some(ConfigWatcher::new(path)?);
        Ok(())
    }

    /// Reload the config if the watched file changed.
    pub fn check_config_reload(&mut self) {
        let Some(watcher) = self.config_watcher.as_mut() else {
            return;
        };
        let Some(event) = watcher.poll() else {
            return;
        };
        match event {
            ConfigEvent::Modified | ConfigEvent::Created => {
                info!("Engine config changed, reloading...");
                let path = watcher.path().to_path_buf();
                match EngineConfig::load(&path) {
                    Ok(config) => {
                        self.apply_config(config);
                        self.notify(Notification::info("Engine config reloaded"));
                    }
                    Err(e) => {
                        warn!(error = %e, "Keeping previous engine config");
                        self.notify(Notification::error(format!("Invalid engine config: {e}")));
                    }
                }
            }
            ConfigEvent::Deleted => {
                warn!("Engine config file deleted");
                self.notify(Notification::warning("Engine config file deleted"));
            }
            ConfigEvent::Error(e) => {
                error!("Engine config watch error: {}", e);
            }
        }
    }
}

fn outcome_of(changed: bool) -> InputOutcome {
    if changed {
        InputOutcome::Commit
    } else {
        InputOutcome::Ignored
    }
}
