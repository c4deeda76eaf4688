//! Unit tests for snapshot history.

use crate::helpers::TestSceneBuilder;
use canvasflow::history::{HistoryEntry, HistoryManager};
use canvasflow::media::MemoryMediaStore;
use canvasflow::scene::Scene;
use canvasflow::types::{ItemPatch, ItemSpec};

#[test]
fn test_stack_never_exceeds_capacity() {
    let mut scene = Scene::new();
    let mut history = HistoryManager::new(8);
    history.snapshot(&scene);
    for i in 0..40 {
        scene.create_item(ItemSpec::memo(format!("m{i}")));
        history.snapshot(&scene);
        assert!(history.len() <= history.capacity());
    }
    assert_eq!(history.len(), 8);
}

#[test]
fn test_full_stack_undoes_to_non_empty_baseline() {
    let media = MemoryMediaStore::new();
    let mut scene = Scene::new();
    let mut history = HistoryManager::new(5);
    for i in 0..12 {
        scene.create_item(ItemSpec::memo(format!("m{i}")));
        history.snapshot(&scene);
    }

    for _ in 0..(history.capacity() - 1) {
        assert!(history.undo(&mut scene, &media));
    }
    // The oldest surviving entry had 8 items
    assert_eq!(scene.item_count(), 8);
    assert!(!history.can_undo());
    assert!(!history.undo(&mut scene, &media));
    assert_eq!(scene.item_count(), 8);
}

#[test]
fn test_undo_then_redo_is_identity() {
    let media = MemoryMediaStore::new();
    let (mut scene, ids) = TestSceneBuilder::new().with_n_memos(3).build();
    let mut history = HistoryManager::default();
    history.snapshot(&scene);

    scene.mutate_item(&ids[0], ItemPatch::new().position(-50.0, 75.0));
    history.snapshot(&scene);
    scene.delete_item(&ids[2]);
    history.snapshot(&scene);
    let before_undo = HistoryEntry::capture(&scene);

    assert!(history.undo(&mut scene, &media));
    assert_ne!(HistoryEntry::capture(&scene), before_undo);
    assert!(history.redo(&mut scene, &media));
    assert_eq!(HistoryEntry::capture(&scene), before_undo);
}

#[test]
fn test_redo_is_noop_when_empty() {
    let media = MemoryMediaStore::new();
    let mut scene = Scene::new();
    let mut history = HistoryManager::default();
    history.snapshot(&scene);
    assert!(!history.can_redo());
    assert!(!history.redo(&mut scene, &media));
}

#[test]
fn test_capacity_has_floor_of_two() {
    let mut history = HistoryManager::new(0);
    assert_eq!(history.capacity(), 2);
    history.set_capacity(1);
    assert_eq!(history.capacity(), 2);
}

#[test]
fn test_restore_preserves_literal_z_order() {
    let media = MemoryMediaStore::new();
    let (mut scene, ids) = TestSceneBuilder::new().with_n_memos(2).build();
    scene.bring_to_front(&ids[0]);
    let z_before: Vec<u64> = scene.items().iter().map(|item| item.z_order).collect();

    let mut history = HistoryManager::default();
    history.snapshot(&scene);
    scene.delete_item(&ids[1]);
    history.snapshot(&scene);
    history.undo(&mut scene, &media);

    let z_after: Vec<u64> = scene.items().iter().map(|item| item.z_order).collect();
    assert_eq!(z_before, z_after);
}
