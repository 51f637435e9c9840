#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::*;
use crate::bus::EventBus;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn core() -> EngineCore {
    let mut core = EngineCore::default();
    core.set_container(Container::new(Point::default(), Size::new(400.0, 400.0)));
    core
}

/// A 100×60 sticker at (100,100). Center (150,130); with it selected the
/// rotate handle sits at (85,85), remove at (215,85), zoom at (215,175).
fn with_sticker(core: &mut EngineCore) -> ElementId {
    core.add_element(ElementKind::sticker("stickers/star.svg"), Size::new(100.0, 60.0), Some(pt(100.0, 100.0))).0
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn has_action(actions: &[Action], wanted: &Action) -> bool {
    actions.iter().any(|a| a == wanted)
}

fn record(bus: &CanvasBus, names: &[EventName]) -> Rc<RefCell<Vec<CanvasEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in names {
        let log = Rc::clone(&log);
        bus.on(*name, move |event| log.borrow_mut().push(event.clone()));
    }
    log
}

// =============================================================
// Elements
// =============================================================

#[test]
fn add_element_centers_in_container() {
    let mut core = core();
    let (id, actions) = core.add_element(ElementKind::sticker("s.svg"), Size::new(100.0, 60.0), None);
    let t = core.transform(&id).unwrap();
    assert_eq!((t.x, t.y), (150.0, 170.0));
    assert_eq!(t.scale, 1.0);
    assert_eq!(core.z_index(&id), Some(10));
    assert_eq!(actions.first(), Some(&Action::ElementAdded { id, kind: ElementType::Sticker }));
    assert!(has_action(&actions, &Action::LayersChanged));
}

#[test]
fn add_element_without_container_uses_default_transform() {
    let mut core = EngineCore::default();
    let (id, _) = core.add_element(ElementKind::text("Hello"), Size::new(80.0, 30.0), None);
    assert_eq!(core.transform(&id), Some(Transform::default()));
}

#[test]
fn remove_element_clears_selection_and_layer() {
    let mut core = core();
    let id = with_sticker(&mut core);
    core.select(&id);
    let actions = core.remove_element(&id);
    assert!(has_action(&actions, &Action::ElementRemoved { id }));
    assert!(has_action(&actions, &Action::SelectionChanged(None)));
    assert_eq!(core.selection(), None);
    assert_eq!(core.z_index(&id), None);
    assert!(core.layers.is_empty());
}

#[test]
fn remove_unknown_element_is_noop() {
    let mut core = core();
    assert!(core.remove_element(&uuid::Uuid::new_v4()).is_empty());
}

#[test]
fn removing_gesture_target_returns_to_idle() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let now = Instant::now();
    core.on_pointer_down(pt(150.0, 130.0), now);
    assert_eq!(core.input, InputState::Dragging { id });
    core.remove_element(&id);
    assert!(core.input.is_idle());
    assert!(core.on_pointer_move(pt(200.0, 200.0), now).is_empty());
}

#[test]
fn set_element_size_rejects_negative() {
    let mut core = core();
    let id = with_sticker(&mut core);
    assert!(core.set_element_size(&id, Size::new(-1.0, 10.0)).is_empty());
    assert!(!core.set_element_size(&id, Size::new(120.0, 40.0)).is_empty());
    assert_eq!(core.element(&id).unwrap().size, Size::new(120.0, 40.0));
}

// =============================================================
// Selection
// =============================================================

#[test]
fn selection_is_exclusive() {
    let mut core = core();
    let a = with_sticker(&mut core);
    let b = core.add_element(ElementKind::text("b"), Size::new(50.0, 20.0), Some(pt(300.0, 300.0))).0;
    core.select(&a);
    let actions = core.select(&b);
    assert_eq!(actions[0], Action::SelectionChanged(Some(Selection { id: b, kind: ElementType::Text })));
    assert!(!core.is_selected(&a));
    assert!(core.is_selected(&b));
}

#[test]
fn reselecting_same_element_is_silent() {
    let mut core = core();
    let id = with_sticker(&mut core);
    assert!(!core.select(&id).is_empty());
    assert!(core.select(&id).is_empty());
}

#[test]
fn page_click_outside_deselects() {
    let mut core = core();
    let id = with_sticker(&mut core);
    core.select(&id);
    let actions = core.on_page_click(pt(10.0, 10.0), false);
    assert_eq!(actions[0], Action::SelectionChanged(None));
}

#[test]
fn page_click_on_selected_or_in_menu_keeps_selection() {
    let mut core = core();
    let id = with_sticker(&mut core);
    core.select(&id);
    assert!(core.on_page_click(pt(150.0, 130.0), false).is_empty());
    assert!(core.on_page_click(pt(85.0, 85.0), false).is_empty());
    assert!(core.on_page_click(pt(10.0, 10.0), true).is_empty());
    assert!(core.is_selected(&id));
}

#[test]
fn page_click_honors_container_origin() {
    let mut core = core();
    core.set_container(Container::new(pt(500.0, 50.0), Size::new(400.0, 400.0)));
    let id = with_sticker(&mut core);
    core.select(&id);
    assert!(core.on_page_click(pt(650.0, 180.0), false).is_empty());
    assert!(!core.on_page_click(pt(150.0, 130.0), false).is_empty());
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_moves_by_pointer_delta_and_commits() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let now = Instant::now();

    let actions = core.on_pointer_down(pt(150.0, 130.0), now);
    assert!(has_action(&actions, &Action::SelectionChanged(Some(Selection { id, kind: ElementType::Sticker }))));
    assert_eq!(core.input, InputState::Dragging { id });

    core.on_pointer_move(pt(160.0, 135.0), now);
    let actions = core.on_pointer_move(pt(170.0, 140.0), now);
    let t = core.transform(&id).unwrap();
    assert_eq!((t.x, t.y), (120.0, 110.0));
    assert!(matches!(actions[0], Action::TransformChanged { .. }));

    let actions = core.on_pointer_up(pt(170.0, 140.0), now);
    assert_eq!(actions[0], Action::TransformCommitted { id, transform: t });
    assert!(core.input.is_idle());
    assert!(core.on_pointer_move(pt(300.0, 300.0), now).is_empty());
}

#[test]
fn container_resize_mid_drag_keeps_session() {
    let mut core = core();
    core.set_print_area(Some(PrintAreaSpec::new(0.0, 0.0, 100.0, 100.0)));
    let id = with_sticker(&mut core);
    let now = Instant::now();

    core.on_pointer_down(pt(150.0, 130.0), now);
    core.on_pointer_move(pt(160.0, 130.0), now);
    let actions = core.set_container(Container::new(Point::default(), Size::new(200.0, 200.0)));
    assert_eq!(
        actions,
        vec![Action::PrintAreaChanged(Some(Rect::new(0.0, 0.0, 200.0, 200.0))), Action::OutOfBoundsChanged(true)]
    );
    assert_eq!(core.input, InputState::Dragging { id });

    core.on_pointer_move(pt(170.0, 140.0), now);
    let t = core.transform(&id).unwrap();
    assert_eq!((t.x, t.y), (120.0, 110.0));
    assert_eq!(core.print_bounds(), Some(Rect::new(0.0, 0.0, 200.0, 200.0)));
    assert!(core.out_of_bounds());
}

#[test]
fn pointer_down_on_empty_space_does_nothing() {
    let mut core = core();
    with_sticker(&mut core);
    assert!(core.on_pointer_down(pt(350.0, 350.0), Instant::now()).is_empty());
    assert!(core.input.is_idle());
}

#[test]
fn drag_picks_topmost_element() {
    let mut core = core();
    let below = with_sticker(&mut core);
    let above = with_sticker(&mut core);
    core.apply_props(&above, &PropsPatch { z_delta: Some(10), ..PropsPatch::default() });
    core.on_pointer_down(pt(150.0, 130.0), Instant::now());
    assert_eq!(core.input, InputState::Dragging { id: above });
    assert!(!core.is_selected(&below));
}

// =============================================================
// Rotate / zoom handles
// =============================================================

#[test]
fn rotate_handle_is_damped() {
    let mut core = core();
    let id = with_sticker(&mut core);
    core.select(&id);
    let now = Instant::now();

    let actions = core.on_pointer_down(pt(85.0, 85.0), now);
    assert_eq!(core.input, InputState::Rotating { id });
    assert!(has_action(&actions, &Action::SetCursor(Cursor::Grabbing)));

    // The handle vector from the center is (-65,-45); a quarter turn puts
    // the pointer at center + (45,-65).
    core.on_pointer_move(pt(195.0, 65.0), now);
    assert!(approx(core.transform(&id).unwrap().angle, 45.0));
    assert_eq!(core.transform(&id).unwrap().position(), pt(100.0, 100.0));

    let actions = core.on_pointer_up(pt(195.0, 65.0), now);
    assert!(has_action(&actions, &Action::SetCursor(Cursor::Default)));
    assert!(core.input.is_idle());
}

#[test]
fn drag_is_disabled_while_rotating() {
    let mut core = core();
    let id = with_sticker(&mut core);
    core.select(&id);
    core.on_pointer_down(pt(85.0, 85.0), Instant::now());
    assert!(core.controls.get(&id).unwrap().drag.is_disabled());
    core.on_pointer_up(pt(85.0, 85.0), Instant::now());
    assert!(!core.controls.get(&id).unwrap().drag.is_disabled());
}

#[test]
fn handles_need_selection() {
    let mut core = core();
    with_sticker(&mut core);
    assert!(core.on_pointer_down(pt(85.0, 85.0), Instant::now()).is_empty());
}

#[test]
fn zoom_handle_maps_horizontal_motion_and_clamps() {
    let mut core = core();
    let id = with_sticker(&mut core);
    core.select(&id);
    let now = Instant::now();

    let actions = core.on_pointer_down(pt(215.0, 175.0), now);
    assert_eq!(core.input, InputState::Zooming { id });
    assert!(has_action(&actions, &Action::SetCursor(Cursor::EwResize)));

    core.on_pointer_move(pt(265.0, 400.0), now);
    assert!(approx(core.transform(&id).unwrap().scale, 1.5));

    core.on_pointer_move(pt(1000.0, 175.0), now);
    assert_eq!(core.transform(&id).unwrap().scale, 2.0);

    core.on_pointer_move(pt(-1000.0, 175.0), now);
    assert_eq!(core.transform(&id).unwrap().scale, 0.3);
}

#[test]
fn remove_handle_deletes_element() {
    let mut core = core();
    let id = with_sticker(&mut core);
    core.select(&id);
    let actions = core.on_pointer_down(pt(215.0, 85.0), Instant::now());
    assert!(has_action(&actions, &Action::ElementRemoved { id }));
    assert!(core.element(&id).is_none());
    assert!(core.input.is_idle());
}

// =============================================================
// Touch
// =============================================================

#[test]
fn second_finger_turns_drag_into_pinch() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let now = Instant::now();

    core.on_touch_start(&[pt(150.0, 130.0)], now);
    assert_eq!(core.input, InputState::Dragging { id });

    core.on_touch_start(&[pt(150.0, 130.0), pt(170.0, 130.0)], now);
    assert_eq!(core.input, InputState::Pinching { id });
    assert!(!core.controls.get(&id).unwrap().drag.is_active());

    core.on_touch_move(&[pt(140.0, 130.0), pt(170.0, 130.0)], now);
    let t = core.transform(&id).unwrap();
    assert!(approx(t.scale, 1.5));
    assert!(approx(t.angle, 0.0));
    assert_eq!(t.position(), pt(100.0, 100.0));

    let actions = core.on_touch_end(&[pt(170.0, 130.0)], now);
    assert!(matches!(actions[0], Action::TransformCommitted { .. }));
    assert!(core.input.is_idle());
}

#[test]
fn pinch_clamps_to_kind_limits_through_release() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let now = Instant::now();
    core.on_touch_start(&[pt(150.0, 130.0), pt(170.0, 130.0)], now);
    assert_eq!(core.input, InputState::Pinching { id });

    core.on_touch_move(&[pt(100.0, 130.0), pt(170.0, 130.0)], now);
    assert_eq!(core.transform(&id).unwrap().scale, 2.0);
    core.on_touch_end(&[], now);
    assert_eq!(core.transform(&id).unwrap().scale, 2.0);
}

#[test]
fn two_fingers_on_empty_space_do_nothing() {
    let mut core = core();
    with_sticker(&mut core);
    assert!(core.on_touch_start(&[pt(350.0, 350.0), pt(380.0, 350.0)], Instant::now()).is_empty());
    assert!(core.input.is_idle());
}

#[test]
fn single_touch_drag_follows_finger() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let now = Instant::now();
    core.on_touch_start(&[pt(150.0, 130.0)], now);
    core.on_touch_move(&[pt(140.0, 150.0)], now);
    assert_eq!(core.transform(&id).unwrap().position(), pt(90.0, 120.0));
    core.on_touch_end(&[], now);
    assert!(core.input.is_idle());
}

// =============================================================
// Props
// =============================================================

#[test]
fn apply_props_clamps_scale_per_kind() {
    let mut core = core();
    let sticker = with_sticker(&mut core);
    let photo = core.add_element(ElementKind::printed_image("p.png"), Size::new(100.0, 100.0), None).0;
    let props = PropsPatch { transform: TransformPatch::scale(3.5), ..PropsPatch::default() };
    core.apply_props(&sticker, &props);
    core.apply_props(&photo, &props);
    assert_eq!(core.transform(&sticker).unwrap().scale, 2.0);
    assert_eq!(core.transform(&photo).unwrap().scale, 3.0);
}

#[test]
fn apply_props_absent_fields_leave_state_alone() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let before = core.transform(&id);
    assert!(core.apply_props(&id, &PropsPatch::default()).is_empty());
    assert_eq!(core.transform(&id), before);
    assert_eq!(core.z_index(&id), Some(10));
}

#[test]
fn apply_props_explicit_zero_applies() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let props = PropsPatch { transform: TransformPatch { x: Some(0.0), ..TransformPatch::default() }, ..PropsPatch::default() };
    core.apply_props(&id, &props);
    assert_eq!(core.transform(&id).unwrap().position(), pt(0.0, 100.0));
}

#[test]
fn apply_props_font_size_drives_text_scale() {
    let mut core = core();
    let id = core.add_element(ElementKind::text("Hi"), Size::new(40.0, 20.0), None).0;
    let actions = core.apply_props(&id, &PropsPatch { font_size: Some(36.0), ..PropsPatch::default() });
    assert_eq!(core.transform(&id).unwrap().scale, 1.5);
    let ElementKind::Text { font_size, .. } = &core.element(&id).unwrap().kind else {
        panic!("expected text");
    };
    assert_eq!(*font_size, 36.0);
    assert!(has_action(&actions, &Action::TransformChanged { id, transform: core.transform(&id).unwrap() }));
}

#[test]
fn apply_props_updates_text_payload() {
    let mut core = core();
    let id = core.add_element(ElementKind::text("Hi"), Size::new(40.0, 20.0), None).0;
    let props = PropsPatch { color: Some("#ff0000".into()), content: Some("Bye".into()), ..PropsPatch::default() };
    let actions = core.apply_props(&id, &props);
    assert!(has_action(&actions, &Action::ElementUpdated { id }));
    let ElementKind::Text { content, color, .. } = &core.element(&id).unwrap().kind else {
        panic!("expected text");
    };
    assert_eq!((content.as_str(), color.as_str()), ("Bye", "#ff0000"));
}

#[test]
fn apply_props_z_delta_shifts_layer() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let actions = core.apply_props(&id, &PropsPatch { z_delta: Some(-10), ..PropsPatch::default() });
    assert_eq!(core.z_index(&id), Some(0));
    assert!(has_action(&actions, &Action::LayersChanged));
}

#[test]
fn set_transform_does_not_clamp() {
    let mut core = core();
    let id = with_sticker(&mut core);
    core.set_transform(&id, &TransformPatch::scale(5.0));
    assert_eq!(core.transform(&id).unwrap().scale, 5.0);
}

// =============================================================
// Bounds
// =============================================================

/// Print area (100,100)-(300,300) in a 400×400 container.
fn bounded_core() -> EngineCore {
    let mut core = core();
    core.set_print_area(Some(PrintAreaSpec::new(25.0, 25.0, 50.0, 50.0)));
    core
}

#[test]
fn drag_out_of_bounds_flags_after_debounce() {
    let mut core = bounded_core();
    let id = core.add_element(ElementKind::sticker("s.svg"), Size::new(50.0, 50.0), Some(pt(150.0, 150.0))).0;
    assert!(!core.out_of_bounds());
    let t0 = Instant::now();

    core.on_pointer_down(pt(175.0, 175.0), t0);
    core.on_pointer_move(pt(300.0, 175.0), t0);
    assert_eq!(core.transform(&id).unwrap().x, 275.0);
    assert!(core.tick(t0 + Duration::from_millis(49)).is_empty());
    assert!(!core.out_of_bounds());
    assert_eq!(core.tick(t0 + Duration::from_millis(50)), vec![Action::OutOfBoundsChanged(true)]);
    assert_eq!(core.overlay(), OverlayStyle::SHOWN);

    core.on_pointer_move(pt(175.0, 175.0), t0 + Duration::from_millis(60));
    assert_eq!(core.next_deadline(), Some(t0 + Duration::from_millis(110)));
    assert_eq!(core.tick(t0 + Duration::from_millis(110)), vec![Action::OutOfBoundsChanged(false)]);
    assert_eq!(core.overlay(), OverlayStyle::HIDDEN);
}

#[test]
fn adding_element_outside_flags_immediately() {
    let mut core = bounded_core();
    let (_, actions) = core.add_element(ElementKind::sticker("s.svg"), Size::new(50.0, 50.0), Some(pt(0.0, 0.0)));
    assert!(has_action(&actions, &Action::OutOfBoundsChanged(true)));
    assert!(core.out_of_bounds());
}

#[test]
fn clearing_print_area_clears_flag() {
    let mut core = bounded_core();
    core.add_element(ElementKind::sticker("s.svg"), Size::new(50.0, 50.0), Some(pt(0.0, 0.0)));
    let actions = core.set_print_area(None);
    assert_eq!(actions, vec![Action::PrintAreaChanged(None), Action::OutOfBoundsChanged(false)]);
    assert_eq!(core.print_bounds(), None);
}

#[test]
fn print_area_follows_product_image() {
    let mut core = core();
    core.set_print_area(Some(PrintAreaSpec::new(0.0, 0.0, 100.0, 100.0)));
    assert_eq!(core.print_bounds(), Some(Rect::new(0.0, 0.0, 400.0, 400.0)));
    let actions = core.set_product_image(Some(Size::new(200.0, 100.0)));
    assert_eq!(actions[0], Action::PrintAreaChanged(Some(Rect::new(0.0, 100.0, 400.0, 200.0))));
    core.set_product_image(None);
    assert_eq!(core.print_bounds(), Some(Rect::new(0.0, 0.0, 400.0, 400.0)));
}

#[test]
fn degenerate_container_keeps_print_area() {
    let mut core = bounded_core();
    let before = core.print_bounds();
    assert!(core.set_container(Container::new(Point::default(), Size::new(0.0, 0.0))).is_empty());
    assert_eq!(core.print_bounds(), before);
}

#[test]
fn props_change_rechecks_immediately() {
    let mut core = bounded_core();
    let id = core.add_element(ElementKind::sticker("s.svg"), Size::new(50.0, 50.0), Some(pt(150.0, 150.0))).0;
    let props = PropsPatch { transform: TransformPatch::position(290.0, 150.0), ..PropsPatch::default() };
    let actions = core.apply_props(&id, &props);
    assert!(has_action(&actions, &Action::OutOfBoundsChanged(true)));
}

// =============================================================
// Snapshots
// =============================================================

#[test]
fn snapshot_restores_into_fresh_engine() {
    let mut core = bounded_core();
    let id = with_sticker(&mut core);
    core.set_transform(&id, &TransformPatch { angle: Some(725.5), scale: Some(1.25), ..TransformPatch::default() });
    core.apply_props(&id, &PropsPatch { z_delta: Some(20), ..PropsPatch::default() });
    let snapshot = core.snapshot();

    let mut other = EngineCore::default();
    other.set_container(Container::new(Point::default(), Size::new(400.0, 400.0)));
    let actions = other.load_snapshot(snapshot.clone()).unwrap();
    assert!(has_action(&actions, &Action::LayersChanged));
    assert_eq!(other.transform(&id), core.transform(&id));
    assert_eq!(other.z_index(&id), Some(30));
    assert_eq!(other.print_bounds(), core.print_bounds());
    assert_eq!(other.snapshot(), snapshot);
}

#[test]
fn loaded_elements_are_interactive() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let snapshot = core.snapshot();
    let mut other = self::core();
    other.load_snapshot(snapshot).unwrap();
    other.on_pointer_down(pt(150.0, 130.0), Instant::now());
    assert_eq!(other.input, InputState::Dragging { id });
}

#[test]
fn invalid_snapshot_leaves_engine_untouched() {
    let mut core = core();
    let id = with_sticker(&mut core);
    let mut snapshot = core.snapshot();
    snapshot.elements.push(snapshot.elements[0].clone());
    assert_eq!(core.load_snapshot(snapshot), Err(SnapshotError::DuplicateId(id)));
    assert_eq!(core.doc.len(), 1);
}

// =============================================================
// Engine + bus
// =============================================================

#[test]
fn submitted_props_apply_on_flush_then_sync() {
    let bus = EventBus::new();
    let engine = Engine::new(EngineConfig::default(), bus.clone());
    let (id, _) = engine.add_element(ElementKind::sticker("s.svg"), Size::new(50.0, 50.0), None);
    let log = record(&bus, &[EventName::PropsSubmitted, EventName::PropsSynced]);

    engine.submit_props(id, PropsPatch { transform: TransformPatch::angle(90.0), ..PropsPatch::default() });
    assert_eq!(engine.transform(&id).unwrap().angle, 0.0);
    engine.flush();

    assert_eq!(engine.transform(&id).unwrap().angle, 90.0);
    let log = log.borrow();
    assert!(matches!(log[0], CanvasEvent::PropsSubmitted { .. }));
    assert_eq!(log[1], CanvasEvent::PropsSynced { id });
    assert_eq!(log.len(), 2);
}

#[test]
fn pointer_selection_publishes_picked_and_cleared() {
    let bus = EventBus::new();
    let engine = Engine::new(EngineConfig::default(), bus.clone());
    engine.set_container(Container::new(Point::default(), Size::new(400.0, 400.0)));
    let (id, _) = engine.add_element(ElementKind::text("t"), Size::new(100.0, 60.0), Some(pt(100.0, 100.0)));
    let log = record(&bus, &[EventName::ElementPicked, EventName::SelectionCleared]);

    let now = Instant::now();
    engine.on_pointer_down(pt(150.0, 130.0), now);
    engine.on_pointer_up(pt(150.0, 130.0), now);
    engine.page_click(pt(10.0, 10.0), false);
    engine.flush();

    assert_eq!(
        *log.borrow(),
        vec![CanvasEvent::ElementPicked { id, kind: ElementType::Text }, CanvasEvent::SelectionCleared]
    );
    assert_eq!(engine.selection(), None);
}

#[test]
fn out_of_bounds_is_published() {
    let bus = EventBus::new();
    let engine = Engine::new(EngineConfig::default(), bus.clone());
    engine.set_container(Container::new(Point::default(), Size::new(400.0, 400.0)));
    engine.set_print_area(Some(PrintAreaSpec::new(25.0, 25.0, 50.0, 50.0)));
    let log = record(&bus, &[EventName::OutOfBoundsChanged]);
    engine.add_element(ElementKind::sticker("s.svg"), Size::new(50.0, 50.0), Some(pt(0.0, 0.0)));
    engine.flush();
    assert_eq!(*log.borrow(), vec![CanvasEvent::OutOfBoundsChanged { out_of_bounds: true }]);
    assert!(engine.out_of_bounds());
}

#[test]
fn props_for_unknown_element_are_ignored() {
    let bus = EventBus::new();
    let engine = Engine::new(EngineConfig::default(), bus.clone());
    let log = record(&bus, &[EventName::PropsSynced]);
    engine.submit_props(uuid::Uuid::new_v4(), PropsPatch { transform: TransformPatch::scale(1.5), ..PropsPatch::default() });
    engine.flush();
    assert!(log.borrow().is_empty());
}

#[test]
fn props_arriving_while_core_is_borrowed_are_dropped() {
    let bus = EventBus::new();
    let engine = Engine::new(EngineConfig::default(), bus.clone());
    let (id, _) = engine.add_element(ElementKind::sticker("s.svg"), Size::new(50.0, 50.0), None);
    let log = record(&bus, &[EventName::PropsSynced]);

    let handle = engine.core_handle();
    let guard = handle.borrow_mut();
    engine.submit_props(id, PropsPatch { transform: TransformPatch::angle(90.0), ..PropsPatch::default() });
    engine.flush();
    drop(guard);

    assert_eq!(engine.transform(&id).unwrap().angle, 0.0);
    assert!(log.borrow().is_empty());
    assert_eq!(engine.flush(), 0);
}

#[test]
fn dropping_engine_unsubscribes() {
    let bus = EventBus::new();
    let engine = Engine::new(EngineConfig::default(), bus.clone());
    assert_eq!(bus.handler_count(EventName::PropsSubmitted), 1);
    assert_eq!(bus.handler_count(EventName::PageClicked), 1);
    drop(engine);
    assert_eq!(bus.handler_count(EventName::PropsSubmitted), 0);
    assert_eq!(bus.handler_count(EventName::PageClicked), 0);
}
