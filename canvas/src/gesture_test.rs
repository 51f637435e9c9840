#![allow(clippy::float_cmp)]

use proptest::prelude::*;

use super::*;

const EPS: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_moves_by_pointer_displacement() {
    let mut drag = DragController::default();
    assert!(drag.begin(pt(100.0, 100.0), pt(10.0, 20.0)));
    assert_eq!(drag.update(pt(130.0, 90.0)), Some(pt(40.0, 10.0)));
}

#[test]
fn drag_update_without_session_is_none() {
    let drag = DragController::default();
    assert_eq!(drag.update(pt(5.0, 5.0)), None);
}

#[test]
fn drag_end_clears_session() {
    let mut drag = DragController::default();
    drag.begin(pt(0.0, 0.0), pt(0.0, 0.0));
    assert!(drag.end());
    assert!(!drag.end());
    assert_eq!(drag.update(pt(1.0, 1.0)), None);
}

#[test]
fn disabled_drag_refuses_to_begin() {
    let mut drag = DragController::default();
    drag.set_disabled(true);
    assert!(!drag.begin(pt(0.0, 0.0), pt(0.0, 0.0)));
    assert!(!drag.is_active());
}

#[test]
fn disabling_mid_drag_ends_it() {
    let mut drag = DragController::default();
    drag.begin(pt(0.0, 0.0), pt(0.0, 0.0));
    drag.set_disabled(true);
    assert!(!drag.is_active());
    drag.set_disabled(false);
    assert_eq!(drag.update(pt(3.0, 3.0)), None);
}

#[test]
fn drag_applies_no_clamping() {
    let mut drag = DragController::default();
    drag.begin(pt(0.0, 0.0), pt(0.0, 0.0));
    assert_eq!(drag.update(pt(-5000.0, 9000.0)), Some(pt(-5000.0, 9000.0)));
}

// =============================================================
// Rotate
// =============================================================

#[test]
fn rotate_quarter_turn_is_damped_to_half() {
    let mut rotate = RotateController::new(0.5);
    let center = pt(100.0, 100.0);
    rotate.begin(center, pt(200.0, 100.0), 10.0);
    let angle = rotate.update(pt(100.0, 200.0)).unwrap();
    assert!(approx(angle, 55.0), "got {angle}");
}

#[test]
fn rotate_crosses_the_seam_without_jumping() {
    let mut rotate = RotateController::new(1.0);
    let center = pt(0.0, 0.0);
    // Start just above the negative x axis (170°), move to just below (-170°).
    let start = pt(-100.0, 17.632_698_070_846_5);
    rotate.begin(center, start, 0.0);
    let angle = rotate.update(pt(-100.0, -17.632_698_070_846_5)).unwrap();
    assert!((angle - 20.0).abs() < 1e-6, "got {angle}");
}

#[test]
fn rotate_accumulates_past_a_full_turn() {
    let mut rotate = RotateController::new(1.0);
    let center = pt(0.0, 0.0);
    rotate.begin(center, pt(1.0, 0.0), 0.0);
    let mut last = 0.0;
    for step in 1..=8 {
        let theta = f64::from(step) * 60.0_f64.to_radians();
        last = rotate.update(pt(theta.cos(), theta.sin())).unwrap();
    }
    assert!((last - 480.0).abs() < 1e-6, "got {last}");
}

#[test]
fn rotate_update_without_session_is_none() {
    let mut rotate = RotateController::new(0.5);
    assert_eq!(rotate.update(pt(1.0, 1.0)), None);
    assert!(!rotate.end());
}

// =============================================================
// Zoom
// =============================================================

#[test]
fn zoom_maps_horizontal_travel() {
    let mut zoom = ZoomController::new(0.01, ScaleLimits::new(0.3, 2.0));
    zoom.begin(100.0, 1.0);
    assert!(approx(zoom.update(150.0).unwrap(), 1.5));
    assert!(approx(zoom.update(60.0).unwrap(), 0.6));
}

#[test]
fn zoom_clamps_during_the_gesture() {
    let mut zoom = ZoomController::new(0.01, ScaleLimits::new(0.3, 2.0));
    zoom.begin(0.0, 1.0);
    assert_eq!(zoom.update(500.0), Some(2.0));
    assert_eq!(zoom.update(-500.0), Some(0.3));
}

// =============================================================
// Pinch
// =============================================================

#[test]
fn pinch_scales_by_distance_ratio() {
    let mut pinch = PinchController::new(ScaleLimits::new(0.3, 3.0), false);
    assert!(pinch.begin(pt(0.0, 0.0), pt(100.0, 0.0), 1.0, 0.0));
    let update = pinch.update(pt(0.0, 0.0), pt(150.0, 0.0)).unwrap();
    assert!(approx(update.scale, 1.5));
    assert_eq!(update.angle, None);
}

#[test]
fn pinch_clamps_overshoot_mid_gesture() {
    let mut pinch = PinchController::new(ScaleLimits::new(0.3, 2.0), false);
    pinch.begin(pt(0.0, 0.0), pt(100.0, 0.0), 1.0, 0.0);
    let update = pinch.update(pt(0.0, 0.0), pt(350.0, 0.0)).unwrap();
    assert_eq!(update.scale, 2.0);
}

#[test]
fn pinch_rotation_is_undamped() {
    let mut pinch = PinchController::new(ScaleLimits::new(0.3, 2.0), true);
    pinch.begin(pt(0.0, 0.0), pt(100.0, 0.0), 1.0, 5.0);
    let update = pinch.update(pt(0.0, 0.0), pt(0.0, 100.0)).unwrap();
    assert!(approx(update.angle.unwrap(), 95.0));
    assert!(approx(update.scale, 1.0));
}

#[test]
fn pinch_refuses_coincident_fingers() {
    let mut pinch = PinchController::new(ScaleLimits::new(0.3, 2.0), true);
    assert!(!pinch.begin(pt(5.0, 5.0), pt(5.0, 5.0), 1.0, 0.0));
    assert!(!pinch.is_active());
    assert_eq!(pinch.update(pt(0.0, 0.0), pt(10.0, 0.0)), None);
}

// =============================================================
// ElementControls
// =============================================================

#[test]
fn controls_use_kind_limits() {
    let config = EngineConfig::default();
    let mut controls = ElementControls::new(&config, ElementType::PrintedImage);
    controls.zoom.begin(0.0, 1.0);
    assert_eq!(controls.zoom.update(1000.0), Some(3.0));
    let mut controls = ElementControls::new(&config, ElementType::Text);
    controls.zoom.begin(0.0, 1.0);
    assert_eq!(controls.zoom.update(1000.0), Some(2.0));
}

#[test]
fn cancel_all_ends_sessions_and_reenables_drag() {
    let config = EngineConfig::default();
    let mut controls = ElementControls::new(&config, ElementType::Sticker);
    controls.rotate.begin(pt(0.0, 0.0), pt(1.0, 0.0), 0.0);
    controls.drag.set_disabled(true);
    assert!(controls.rotate.is_active());
    controls.cancel_all();
    assert!(!controls.rotate.is_active());
    assert!(!controls.drag.is_disabled());
}

proptest! {
    #[test]
    fn prop_drag_sums_deltas(
        start_x in -1000.0f64..1000.0,
        start_y in -1000.0f64..1000.0,
        deltas in proptest::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 1..40),
    ) {
        let mut drag = DragController::default();
        let mut client = pt(500.0, 500.0);
        drag.begin(client, pt(start_x, start_y));
        let mut last = pt(start_x, start_y);
        let (mut sum_x, mut sum_y) = (0.0, 0.0);
        for (dx, dy) in deltas {
            client = pt(client.x + dx, client.y + dy);
            sum_x += dx;
            sum_y += dy;
            last = drag.update(client).unwrap();
        }
        prop_assert!((last.x - (start_x + sum_x)).abs() < 1e-9);
        prop_assert!((last.y - (start_y + sum_y)).abs() < 1e-9);
    }

    #[test]
    fn prop_zoom_stays_in_limits(dx in -1e5f64..1e5, start in 0.3f64..2.0) {
        let mut zoom = ZoomController::new(0.01, ScaleLimits::new(0.3, 2.0));
        zoom.begin(0.0, start);
        let scale = zoom.update(dx).unwrap();
        prop_assert!((0.3..=2.0).contains(&scale));
    }
}
