//! Unit tests for serialization and the scene stores.

use crate::helpers::TestSceneBuilder;
use canvasflow::error::CanvasError;
use canvasflow::persistence::{
    JsonFileStore, SCENE_FORMAT_VERSION, SceneData, SceneStore, deserialize_scene, export_json,
    import_json, serialize_scene,
};
use canvasflow::scene::Scene;
use canvasflow::types::{Connection, ConnectionDirection, Handle, ItemSpec};
use canvasflow::viewport::{ViewTransform, Viewport};
use tempfile::tempdir;

fn sample() -> (Scene, Viewport) {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_note("A", (0.0, 0.0))
        .with_memo("B", (300.0, 0.0))
        .build();
    scene.create_connection(&ids[0], Handle::Right, &ids[1], Handle::Left);
    let mut viewport = Viewport::new();
    viewport.set_transform(ViewTransform {
        scale: 1.5,
        offset_x: -20.0,
        offset_y: 35.0,
    });
    (scene, viewport)
}

#[test]
fn test_serialize_round_trip_is_structurally_equal() {
    let (scene, viewport) = sample();
    let data = serialize_scene(&scene, &viewport);

    let mut restored = Scene::new();
    let mut restored_viewport = Viewport::new();
    deserialize_scene(data.clone(), &mut restored, &mut restored_viewport).unwrap();

    assert_eq!(restored.items(), scene.items());
    assert_eq!(restored.connections(), scene.connections());
    assert_eq!(restored_viewport.transform(), viewport.transform());
    assert_eq!(serialize_scene(&restored, &restored_viewport), data);
}

#[test]
fn test_restored_counters_never_reuse_ids() {
    let (scene, viewport) = sample();
    let data = serialize_scene(&scene, &viewport);

    let mut restored = Scene::new();
    deserialize_scene(data, &mut restored, &mut Viewport::new()).unwrap();
    assert!(restored.counters().next_id >= scene.counters().next_id);
    assert!(restored.counters().z_order >= scene.counters().z_order);

    let fresh = restored.create_item(ItemSpec::memo("C"));
    assert!(scene.items().iter().all(|item| item.id != fresh.id));
    assert!(restored.items().iter().all(|item| item.id == fresh.id || item.z_order < fresh.z_order));
}

#[test]
fn test_export_import_through_json() {
    let (scene, viewport) = sample();
    let json = export_json(&serialize_scene(&scene, &viewport)).unwrap();
    let data = import_json(&json).unwrap();
    assert_eq!(data.version, SCENE_FORMAT_VERSION);
    assert_eq!(data.items.len(), 2);
    assert_eq!(data.connections.len(), 1);
}

#[test]
fn test_malformed_json_is_an_error() {
    assert!(matches!(import_json("{ not json"), Err(CanvasError::Json(_))));
}

#[test]
fn test_connection_wire_shape() {
    let conn = Connection {
        id: "conn-1".to_string(),
        from: "item-a".to_string(),
        to: "item-b".to_string(),
        from_handle: Handle::Right,
        to_handle: Handle::Left,
        direction: ConnectionDirection::Forward,
    };
    insta::assert_json_snapshot!(conn, @r#"
    {
      "id": "conn-1",
      "from": "item-a",
      "to": "item-b",
      "from_handle": "right",
      "to_handle": "left",
      "direction": "forward"
    }
    "#);
}

#[test]
fn test_json_file_store_round_trip() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("canvases"));
    let (scene, viewport) = sample();
    let data = serialize_scene(&scene, &viewport);

    assert_eq!(store.load("board one").unwrap(), None);
    store.save("board one", &data).unwrap();
    assert!(store.path_for("board one").exists());
    assert_eq!(store.load("board one").unwrap(), Some(data.clone()));

    // Overwrite keeps a single file
    store.save("board one", &SceneData::default()).unwrap();
    assert_eq!(store.load("board one").unwrap(), Some(SceneData::default()));
    assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 1);

    store.delete("board one").unwrap();
    store.delete("board one").unwrap();
    assert_eq!(store.load("board one").unwrap(), None);
}

#[test]
fn test_similar_ids_keep_separate_files() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let (scene, viewport) = sample();
    let data = serialize_scene(&scene, &viewport);
    assert!(!data.items.is_empty());

    store.save("my canvas", &data).unwrap();
    store.save("my_canvas", &SceneData::default()).unwrap();
    store.save("my/canvas", &SceneData::default()).unwrap();

    assert_eq!(store.load("my canvas").unwrap(), Some(data));
    assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 3);
}
