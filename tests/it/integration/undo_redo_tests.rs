//! Undo/redo through the workspace, including cascades and media.

use crate::helpers::{TestWorkspace, assert_item_count, assert_position, drag};
use canvasflow::config::EngineConfig;
use canvasflow::input::{InputOutcome, KeyIntent, PointerEvent};
use canvasflow::media::{MediaStore, MemoryMediaStore};
use canvasflow::types::{ConnectionDirection, Handle, ItemContent, ItemPatch, ItemSpec};

#[test]
fn test_delete_undo_redo_restores_connection() {
    let mut test = TestWorkspace::opened("history");
    let ws = &mut test.ws;

    let a = ws.create_item(ItemSpec::note("A", "").at(0.0, 0.0)).id;
    let b = ws.create_item(ItemSpec::memo("B").at(300.0, 0.0)).id;
    let conn = ws.connect(&a, Handle::Right, &b, Handle::Left).unwrap();
    assert_eq!(conn.direction, ConnectionDirection::Forward);

    assert!(ws.delete_item(&b));
    assert_item_count(ws.scene(), 1);
    assert!(ws.scene().connections().is_empty());

    assert!(ws.undo());
    assert_item_count(ws.scene(), 2);
    assert_position(ws.scene(), &b, (300.0, 0.0));
    let restored = ws.scene().get_connection(&conn.id).unwrap();
    assert_eq!(restored, &conn);

    assert!(ws.redo());
    assert_item_count(ws.scene(), 1);
    assert!(ws.scene().get_item(&b).is_none());
    assert!(ws.scene().connections().is_empty());
}

#[test]
fn test_undo_walks_back_to_empty_canvas() {
    let mut test = TestWorkspace::opened("history");
    let ws = &mut test.ws;
    ws.create_item(ItemSpec::memo("one"));
    ws.create_item(ItemSpec::memo("two"));

    assert!(ws.undo());
    assert!(ws.undo());
    assert!(ws.scene().is_empty());
    assert!(!ws.undo());
    assert!(!ws.history().can_undo());
    assert!(ws.history().can_redo());
}

#[test]
fn test_new_edit_clears_redo() {
    let mut test = TestWorkspace::opened("history");
    let ws = &mut test.ws;
    let id = ws.create_item(ItemSpec::memo("one")).id;
    ws.set_color(&id, Some(canvasflow::types::ColorTag::Green));

    assert!(ws.undo());
    assert!(ws.history().can_redo());

    ws.update_item(&id, ItemPatch::new().position(40.0, 40.0));
    assert!(!ws.history().can_redo());
    assert!(!ws.redo());
}

#[test]
fn test_key_intents_drive_history() {
    let mut test = TestWorkspace::opened("history");
    let ws = &mut test.ws;
    ws.create_item(ItemSpec::memo("one"));

    assert_eq!(ws.handle_key(KeyIntent::Undo), InputOutcome::Commit);
    assert!(ws.scene().is_empty());
    assert_eq!(ws.handle_key(KeyIntent::Redo), InputOutcome::Commit);
    assert_item_count(ws.scene(), 1);
    assert_eq!(ws.handle_key(KeyIntent::Redo), InputOutcome::Ignored);
}

#[test]
fn test_undo_cancels_active_gesture() {
    let mut test = TestWorkspace::opened("history");
    let ws = &mut test.ws;
    let id = ws.create_item(ItemSpec::memo("one").at(0.0, 0.0)).id;
    drag(ws, (50.0, 50.0), (150.0, 50.0));
    assert_position(ws.scene(), &id, (100.0, 0.0));

    ws.handle_pointer(&PointerEvent::down(150.0, 50.0));
    ws.handle_pointer(&PointerEvent::moved(250.0, 50.0));
    assert!(ws.undo());

    assert!(ws.controller().state().is_idle());
    assert_position(ws.scene(), &id, (0.0, 0.0));
}

#[test]
fn test_undo_drops_stale_selection() {
    let mut test = TestWorkspace::opened("history");
    let ws = &mut test.ws;
    let id = ws.create_item(ItemSpec::memo("one").at(0.0, 0.0)).id;
    ws.handle_key(KeyIntent::SelectAll);
    assert!(ws.controller().selection().contains(&id));

    ws.undo();
    assert!(ws.controller().selection().is_empty());
}

fn image_workspace(capacity: usize) -> TestWorkspace {
    let mut media = MemoryMediaStore::new();
    media.insert("img-1", "file:///tmp/cat.png");
    let config = EngineConfig {
        history_capacity: capacity,
        ..EngineConfig::default()
    };
    let mut test = TestWorkspace::with_media(config, media);
    test.ws.open_canvas("media").unwrap();
    test
}

#[test]
fn test_deleted_media_item_comes_back_on_undo() {
    let mut test = image_workspace(50);
    let ws = &mut test.ws;

    let image = ws.create_item(ItemSpec::new(ItemContent::image("img-1"))).id;
    let memo = ws.create_item(ItemSpec::memo("caption").at(400.0, 0.0)).id;
    let conn = ws.connect(&image, Handle::Right, &memo, Handle::Left).unwrap();

    assert!(ws.delete_item(&image));
    // Undo can still bring it back, so the resource stays
    assert!(ws.media().is_resident("img-1"));

    assert!(ws.undo());
    assert!(ws.scene().get_item(&image).is_some());
    assert!(ws.scene().get_connection(&conn.id).is_some());

    assert!(ws.redo());
    assert!(ws.scene().get_item(&image).is_none());
    assert!(ws.media().is_resident("img-1"));
}

#[test]
fn test_media_released_once_history_forgets_item() {
    let mut test = image_workspace(3);
    let ws = &mut test.ws;

    let image = ws.create_item(ItemSpec::new(ItemContent::image("img-1"))).id;
    let memo = ws.create_item(ItemSpec::memo("caption").at(400.0, 0.0)).id;
    assert!(ws.delete_item(&image));
    assert!(ws.media().is_resident("img-1"));

    ws.update_item(&memo, ItemPatch::new().position(10.0, 0.0));
    assert!(ws.media().is_resident("img-1"));
    ws.update_item(&memo, ItemPatch::new().position(20.0, 0.0));
    assert!(!ws.media().is_resident("img-1"));
    assert!(ws.take_notifications().is_empty());

    // With the resource gone, walking back skips the image
    assert!(ws.undo());
    assert!(ws.undo());
    assert!(ws.scene().get_item(&image).is_none());
    assert!(ws.scene().get_item(&memo).is_some());
}

#[test]
fn test_closing_canvas_releases_deleted_media() {
    let mut test = image_workspace(50);
    let ws = &mut test.ws;

    let image = ws.create_item(ItemSpec::new(ItemContent::image("img-1"))).id;
    assert!(ws.delete_item(&image));
    assert!(ws.media().is_resident("img-1"));

    ws.close_canvas();
    assert!(!ws.media().is_resident("img-1"));
}

#[test]
fn test_media_placeholder_survives_undo() {
    let mut test = TestWorkspace::opened("media");
    let ws = &mut test.ws;
    let id = ws
        .create_item(ItemSpec::new(ItemContent::empty(canvasflow::types::ItemKind::Video)))
        .id;

    assert!(ws.delete_item(&id));
    assert!(ws.take_notifications().is_empty());
    assert!(ws.undo());
    assert!(ws.scene().get_item(&id).is_some());
}

#[test]
fn test_history_capacity_from_config() {
    let config = EngineConfig {
        history_capacity: 3,
        ..EngineConfig::default()
    };
    let mut test = TestWorkspace::with_config(config);
    let ws = &mut test.ws;
    ws.open_canvas("small").unwrap();
    for i in 0..6 {
        ws.create_item(ItemSpec::memo(format!("m{i}")));
    }
    assert_eq!(ws.history().len(), 3);

    assert!(ws.undo());
    assert!(ws.undo());
    assert!(!ws.undo());
    assert_item_count(ws.scene(), 4);
}
