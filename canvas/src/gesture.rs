//! Gesture controllers: drag, rotate, button-zoom and pinch.
//!
//! Each controller owns one short-lived session between `begin` and `end`
//! and turns raw pointer positions into a new transform value. Controllers
//! never touch the element store themselves; the engine writes whatever
//! `update` returns. All coordinates are client (viewport) space except
//! where a parameter says otherwise.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::config::{EngineConfig, ScaleLimits};
use crate::doc::ElementType;
use crate::geom::{Point, angle_between, wrap_degrees};

// =============================================================================
// DRAG
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct DragSession {
    /// Pointer position at pointer-down.
    start_client: Point,
    /// Element position at pointer-down.
    start: Point,
}

/// Moves an element by the pointer's displacement since pointer-down.
///
/// No clamping is applied; leaving the print area is reported separately
/// by the bounds checker.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    disabled: bool,
    session: Option<DragSession>,
}

impl DragController {
    /// Start a drag. Returns false while disabled.
    pub fn begin(&mut self, client: Point, start: Point) -> bool {
        if self.disabled {
            return false;
        }
        self.session = Some(DragSession { start_client: client, start });
        true
    }

    /// New element position for the pointer at `client`, or `None` when no
    /// drag is active.
    #[must_use]
    pub fn update(&self, client: Point) -> Option<Point> {
        if self.disabled {
            return None;
        }
        let session = self.session?;
        Some(Point::new(
            session.start.x + (client.x - session.start_client.x),
            session.start.y + (client.y - session.start_client.y),
        ))
    }

    /// End the session. Returns whether one was active.
    pub fn end(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Suppress dragging while a competing gesture owns the pointer.
    /// Disabling also ends any session in progress.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.session = None;
        }
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

// =============================================================================
// ROTATE
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct RotateSession {
    /// Rotation pivot: the element's center in client space.
    center: Point,
    /// Pointer angle at the previous event.
    last_pointer_angle: f64,
    /// Undamped pointer rotation since pointer-down.
    accumulated: f64,
    /// Element angle at pointer-down.
    start_angle: f64,
}

/// Rotates an element by a damped fraction of the pointer's angular travel
/// around the element's center.
///
/// Pointer deltas are unwrapped step by step, so crossing the ±180° seam
/// never produces a jump and multi-turn gestures keep accumulating.
#[derive(Debug, Clone)]
pub struct RotateController {
    sensitivity: f64,
    session: Option<RotateSession>,
}

impl RotateController {
    #[must_use]
    pub fn new(sensitivity: f64) -> Self {
        Self { sensitivity, session: None }
    }

    pub fn begin(&mut self, center: Point, pointer: Point, start_angle: f64) {
        self.session = Some(RotateSession {
            center,
            last_pointer_angle: angle_between(center, pointer),
            accumulated: 0.0,
            start_angle,
        });
    }

    /// New element angle in degrees, or `None` when no rotation is active.
    pub fn update(&mut self, pointer: Point) -> Option<f64> {
        let sensitivity = self.sensitivity;
        let session = self.session.as_mut()?;
        let pointer_angle = angle_between(session.center, pointer);
        session.accumulated += wrap_degrees(pointer_angle - session.last_pointer_angle);
        session.last_pointer_angle = pointer_angle;
        Some(session.start_angle + session.accumulated * sensitivity)
    }

    pub fn end(&mut self) -> bool {
        self.session.take().is_some()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

// =============================================================================
// BUTTON ZOOM
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct ZoomSession {
    origin_x: f64,
    start_scale: f64,
}

/// Maps horizontal travel on the zoom handle linearly onto scale, clamped
/// to the element kind's limits on every update.
#[derive(Debug, Clone)]
pub struct ZoomController {
    sensitivity: f64,
    limits: ScaleLimits,
    session: Option<ZoomSession>,
}

impl ZoomController {
    #[must_use]
    pub fn new(sensitivity: f64, limits: ScaleLimits) -> Self {
        Self { sensitivity, limits, session: None }
    }

    pub fn begin(&mut self, client_x: f64, start_scale: f64) {
        self.session = Some(ZoomSession { origin_x: client_x, start_scale });
    }

    #[must_use]
    pub fn update(&self, client_x: f64) -> Option<f64> {
        let session = self.session?;
        Some(self.limits.clamp(session.start_scale + (client_x - session.origin_x) * self.sensitivity))
    }

    pub fn end(&mut self) -> bool {
        self.session.take().is_some()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

// =============================================================================
// PINCH
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct PinchSession {
    initial_distance: f64,
    last_finger_angle: f64,
    accumulated_angle: f64,
    start_scale: f64,
    start_angle: f64,
}

/// Result of one pinch update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchUpdate {
    pub scale: f64,
    /// New angle, present only when the pinch also rotates.
    pub angle: Option<f64>,
}

/// Two-finger scale (and optional rotate).
///
/// Scale follows the ratio of the current finger distance to the initial
/// one and is clamped on every update, not just on release. The rotation
/// term is undamped.
#[derive(Debug, Clone)]
pub struct PinchController {
    limits: ScaleLimits,
    rotate: bool,
    session: Option<PinchSession>,
}

impl PinchController {
    #[must_use]
    pub fn new(limits: ScaleLimits, rotate: bool) -> Self {
        Self { limits, rotate, session: None }
    }

    /// Start a pinch from two finger positions. Returns false when the
    /// fingers coincide, since no ratio can be taken against zero.
    pub fn begin(&mut self, a: Point, b: Point, start_scale: f64, start_angle: f64) -> bool {
        let initial_distance = a.distance_to(b);
        if !initial_distance.is_finite() || initial_distance <= f64::EPSILON {
            return false;
        }
        self.session = Some(PinchSession {
            initial_distance,
            last_finger_angle: angle_between(a, b),
            accumulated_angle: 0.0,
            start_scale,
            start_angle,
        });
        true
    }

    pub fn update(&mut self, a: Point, b: Point) -> Option<PinchUpdate> {
        let limits = self.limits;
        let rotate = self.rotate;
        let session = self.session.as_mut()?;
        let ratio = a.distance_to(b) / session.initial_distance;
        let scale = limits.clamp(session.start_scale * ratio);
        let angle = if rotate {
            let finger_angle = angle_between(a, b);
            session.accumulated_angle += wrap_degrees(finger_angle - session.last_finger_angle);
            session.last_finger_angle = finger_angle;
            Some(session.start_angle + session.accumulated_angle)
        } else {
            None
        };
        Some(PinchUpdate { scale, angle })
    }

    pub fn end(&mut self) -> bool {
        self.session.take().is_some()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

// =============================================================================
// PER-ELEMENT BUNDLE
// =============================================================================

/// The four controllers attached to one element.
#[derive(Debug, Clone)]
pub struct ElementControls {
    pub drag: DragController,
    pub rotate: RotateController,
    pub zoom: ZoomController,
    pub pinch: PinchController,
}

impl ElementControls {
    /// Controllers for an element of `kind`, using that kind's scale limits.
    #[must_use]
    pub fn new(config: &EngineConfig, kind: ElementType) -> Self {
        let limits = config.limits_for(kind);
        Self {
            drag: DragController::default(),
            rotate: RotateController::new(config.rotate_sensitivity),
            zoom: ZoomController::new(config.zoom_sensitivity, limits),
            pinch: PinchController::new(limits, config.pinch_rotation),
        }
    }

    /// End every session and re-enable dragging.
    pub fn cancel_all(&mut self) {
        self.drag.end();
        self.rotate.end();
        self.zoom.end();
        self.pinch.end();
        self.drag.set_disabled(false);
    }
}
