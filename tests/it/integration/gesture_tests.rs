//! Pointer and wheel gestures driven through the workspace.

use crate::helpers::{TestWorkspace, approx_eq, assert_position, click, drag};
use canvasflow::input::{InputOutcome, KeyIntent, PointerButton, PointerEvent, WheelEvent};
use canvasflow::types::{ConnectionDirection, Handle, ItemId, ItemSpec};
use canvasflow::workspace::Workspace;

/// Two 200x120 memos on an identity viewport: A at (0, 0), B at (300, 0).
fn two_memos() -> (TestWorkspace, ItemId, ItemId) {
    let mut test = TestWorkspace::opened("gestures");
    let a = test.ws.create_item(ItemSpec::memo("A").at(0.0, 0.0)).id;
    let b = test.ws.create_item(ItemSpec::memo("B").at(300.0, 0.0)).id;
    (test, a, b)
}

fn selected(ws: &Workspace) -> Vec<ItemId> {
    let mut ids = ws.controller().selection().items();
    ids.sort();
    ids
}

#[test]
fn test_drag_moves_selected_group() {
    let (mut test, a, b) = two_memos();
    let ws = &mut test.ws;

    click(ws, 50.0, 50.0);
    ws.handle_pointer(&PointerEvent::down(350.0, 50.0).additive());
    ws.handle_pointer(&PointerEvent::up(350.0, 50.0).additive());
    assert_eq!(ws.controller().selection().len(), 2);

    let outcome = drag(ws, (50.0, 50.0), (150.0, 100.0));
    assert_eq!(outcome, InputOutcome::Commit);
    assert_position(ws.scene(), &a, (100.0, 50.0));
    assert_position(ws.scene(), &b, (400.0, 50.0));
    assert!(ws.controller().state().is_idle());
}

#[test]
fn test_drag_brings_item_to_front() {
    let (mut test, a, b) = two_memos();
    let ws = &mut test.ws;

    drag(ws, (50.0, 50.0), (60.0, 60.0));
    let za = ws.scene().get_item(&a).unwrap().z_order;
    let zb = ws.scene().get_item(&b).unwrap().z_order;
    assert!(za > zb);
}

#[test]
fn test_drag_commits_one_history_entry() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;
    let depth = ws.history().len();

    drag(ws, (50.0, 50.0), (150.0, 50.0));
    assert_eq!(ws.history().len(), depth + 1);

    assert!(ws.undo());
    assert_position(ws.scene(), &a, (0.0, 0.0));
}

#[test]
fn test_click_without_move_does_not_commit() {
    let (mut test, _, _) = two_memos();
    let ws = &mut test.ws;
    let depth = ws.history().len();

    let outcome = click(ws, 50.0, 50.0);
    assert_eq!(outcome, InputOutcome::Redraw);
    assert_eq!(ws.history().len(), depth);
}

#[test]
fn test_locked_item_is_selected_but_not_moved() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;
    ws.set_locked(&a, true);

    let outcome = drag(ws, (50.0, 50.0), (150.0, 150.0));
    assert_ne!(outcome, InputOutcome::Commit);
    assert_position(ws.scene(), &a, (0.0, 0.0));
    assert!(ws.controller().selection().contains(&a));
}

#[test]
fn test_box_select_from_either_corner() {
    let (mut test, a, b) = two_memos();
    let ws = &mut test.ws;

    drag(ws, (550.0, 300.0), (-20.0, -20.0));
    let mut expected = vec![a.clone(), b.clone()];
    expected.sort();
    assert_eq!(selected(ws), expected);

    // A press on the background without the additive modifier clears
    click(ws, 700.0, 700.0);
    assert!(ws.controller().selection().is_empty());

    drag(ws, (-20.0, -20.0), (100.0, 100.0));
    assert_eq!(selected(ws), vec![a]);
}

#[test]
fn test_tiny_box_is_a_background_click() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;
    click(ws, 50.0, 50.0);

    drag(ws, (600.0, 600.0), (601.0, 601.0));
    assert!(!ws.controller().selection().contains(&a));
    assert!(ws.controller().selection().is_empty());
}

#[test]
fn test_additive_click_toggles() {
    let (mut test, a, b) = two_memos();
    let ws = &mut test.ws;
    drag(ws, (550.0, 300.0), (-20.0, -20.0));

    ws.handle_pointer(&PointerEvent::down(50.0, 50.0).additive());
    ws.handle_pointer(&PointerEvent::up(50.0, 50.0).additive());
    assert_eq!(selected(ws), vec![b]);
    assert!(!ws.controller().selection().contains(&a));
}

#[test]
fn test_resize_from_bottom_right_corner() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;

    let outcome = drag(ws, (195.0, 115.0), (255.0, 145.0));
    assert_eq!(outcome, InputOutcome::Commit);
    let item = ws.scene().get_item(&a).unwrap();
    assert!(approx_eq(item.size.0, 260.0));
    assert!(approx_eq(item.size.1, 150.0));
    assert_eq!(item.position, (0.0, 0.0));
}

#[test]
fn test_resize_never_shrinks_below_minimum() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;

    drag(ws, (195.0, 115.0), (-400.0, -400.0));
    let item = ws.scene().get_item(&a).unwrap();
    let min = ws.scene().min_size();
    assert!(approx_eq(item.size.0, min.0));
    assert!(approx_eq(item.size.1, min.1));
}

#[test]
fn test_click_click_connection_between_anchors() {
    let (mut test, a, b) = two_memos();
    let ws = &mut test.ws;

    click(ws, 200.0, 60.0);
    assert!(ws.controller().state().is_connecting());
    assert!(ws.scene().connections().is_empty());

    click(ws, 300.0, 60.0);
    assert!(ws.controller().state().is_idle());
    let conns = ws.scene().connections();
    assert_eq!(conns.len(), 1);
    assert_eq!(conns[0].from, a);
    assert_eq!(conns[0].from_handle, Handle::Right);
    assert_eq!(conns[0].to, b);
    assert_eq!(conns[0].to_handle, Handle::Left);
    assert_eq!(conns[0].direction, ConnectionDirection::Forward);
    assert!(ws.history().can_undo());
}

#[test]
fn test_connection_completes_on_release_over_anchor() {
    let (mut test, _, _) = two_memos();
    let ws = &mut test.ws;

    let outcome = drag(ws, (200.0, 60.0), (300.0, 60.0));
    assert_eq!(outcome, InputOutcome::Commit);
    assert_eq!(ws.scene().connections().len(), 1);
}

#[test]
fn test_pending_connection_discarded_by_background_press() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;

    click(ws, 200.0, 60.0);
    assert_eq!(ws.controller().state().pending_connection().map(|(id, ..)| id), Some(a.as_str()));

    click(ws, 700.0, 700.0);
    assert!(ws.controller().state().is_idle());
    assert!(ws.scene().connections().is_empty());
}

#[test]
fn test_cancel_restores_dragged_items() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;
    let depth = ws.history().len();

    ws.handle_pointer(&PointerEvent::down(50.0, 50.0));
    ws.handle_pointer(&PointerEvent::moved(150.0, 90.0));
    assert_position(ws.scene(), &a, (100.0, 40.0));

    ws.handle_key(KeyIntent::Cancel);
    assert_position(ws.scene(), &a, (0.0, 0.0));

    let outcome = ws.handle_pointer(&PointerEvent::up(150.0, 90.0));
    assert_eq!(outcome, InputOutcome::Ignored);
    assert_eq!(ws.history().len(), depth);
}

#[test]
fn test_secondary_button_pans() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;

    ws.handle_pointer(&PointerEvent::down(600.0, 600.0).with_button(PointerButton::Secondary));
    ws.handle_pointer(&PointerEvent::moved(650.0, 620.0).with_button(PointerButton::Secondary));
    ws.handle_pointer(&PointerEvent::up(650.0, 620.0).with_button(PointerButton::Secondary));

    assert_eq!(ws.viewport().offset(), (50.0, 20.0));
    // Panning is a view change, not an edit
    assert_position(ws.scene(), &a, (0.0, 0.0));
}

#[test]
fn test_editable_regions_keep_their_events() {
    let (mut test, a, _) = two_memos();
    let ws = &mut test.ws;

    let outcome = ws.handle_pointer(&PointerEvent::down(50.0, 50.0).over_editable());
    assert_eq!(outcome, InputOutcome::Ignored);
    assert!(ws.controller().state().is_idle());
    assert!(!ws.controller().selection().contains(&a));
}

#[test]
fn test_wheel_zoom_keeps_pivot_fixed() {
    let (mut test, _, _) = two_memos();
    let ws = &mut test.ws;
    let pivot = canvasflow::geometry::Point::new(100.0, 100.0);
    let before = ws.viewport().screen_to_world(pivot);

    let outcome = ws.handle_wheel(&WheelEvent::new(100.0, 100.0, 0.0, -100.0).zooming());
    assert_eq!(outcome, InputOutcome::Redraw);
    assert!(ws.viewport().scale() > 1.0);

    let after = ws.viewport().screen_to_world(pivot);
    assert!((before.x - after.x).abs() < 0.05);
    assert!((before.y - after.y).abs() < 0.05);
}

#[test]
fn test_wheel_without_modifier_pans() {
    let (mut test, _, _) = two_memos();
    let ws = &mut test.ws;

    ws.handle_wheel(&WheelEvent::new(0.0, 0.0, 10.0, 20.0));
    assert_eq!(ws.viewport().offset(), (-10.0, -20.0));
    assert_eq!(ws.viewport().scale(), 1.0);
}

#[test]
fn test_select_all_and_delete_selection() {
    let (mut test, _, _) = two_memos();
    let ws = &mut test.ws;
    drag(ws, (200.0, 60.0), (300.0, 60.0));

    ws.handle_key(KeyIntent::SelectAll);
    assert_eq!(ws.controller().selection().len(), 2);

    let outcome = ws.handle_key(KeyIntent::DeleteSelection);
    assert_eq!(outcome, InputOutcome::Commit);
    assert!(ws.scene().is_empty());
    assert!(ws.scene().connections().is_empty());
    assert!(ws.controller().selection().is_empty());
}
