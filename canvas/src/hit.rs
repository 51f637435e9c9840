//! Hit-testing of element bodies and the selected element's handles.
//!
//! Handles live inside the element's transformed subtree, diagonally outside
//! the frame corners, so they rotate and scale with it. Tests are done in
//! element-local space: the container point is unprojected through the
//! element's transform and compared against the unscaled frame.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_OFFSET_PX, HANDLE_RADIUS_PX};
use crate::doc::{Element, ElementId, ElementStore};
use crate::geom::{Point, project, unproject};
use crate::layers::LayerManager;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    /// Top-left handle; starts a rotation.
    RotateHandle,
    /// Bottom-right handle; starts a button-zoom.
    ZoomHandle,
    /// Top-right handle; removes the element.
    RemoveHandle,
}

impl HitPart {
    pub const HANDLES: [HitPart; 3] = [HitPart::RemoveHandle, HitPart::RotateHandle, HitPart::ZoomHandle];
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Center of a handle relative to the element center, in unscaled element
/// pixels. `None` for [`HitPart::Body`].
#[must_use]
pub fn handle_offset(element: &Element, part: HitPart) -> Option<Point> {
    let half_w = element.size.width / 2.0 + HANDLE_OFFSET_PX;
    let half_h = element.size.height / 2.0 + HANDLE_OFFSET_PX;
    match part {
        HitPart::Body => None,
        HitPart::RotateHandle => Some(Point::new(-half_w, -half_h)),
        HitPart::RemoveHandle => Some(Point::new(half_w, -half_h)),
        HitPart::ZoomHandle => Some(Point::new(half_w, half_h)),
    }
}

/// Center of a handle in container space.
#[must_use]
pub fn handle_position(element: &Element, part: HitPart) -> Option<Point> {
    let local = handle_offset(element, part)?;
    Some(project(element.frame(), element.transform.angle, element.transform.scale, local))
}

/// Which part of `element`, if any, lies under `pt` (container space).
/// Handles are only considered when `with_handles` is set.
#[must_use]
pub fn hit_element(element: &Element, pt: Point, with_handles: bool) -> Option<HitPart> {
    let local = unproject(element.frame(), element.transform.angle, element.transform.scale, pt)?;
    if with_handles {
        for part in HitPart::HANDLES {
            if let Some(center) = handle_offset(element, part) {
                if local.distance_to(center) <= HANDLE_RADIUS_PX {
                    return Some(part);
                }
            }
        }
    }
    let inside = local.x.abs() <= element.size.width / 2.0 && local.y.abs() <= element.size.height / 2.0;
    inside.then_some(HitPart::Body)
}

/// Test which element (if any) is under `pt`, in container space.
///
/// The selected element's handles are checked first, then bodies from the
/// topmost layer down.
#[must_use]
pub fn hit_test(pt: Point, store: &ElementStore, layers: &LayerManager, selected: Option<ElementId>) -> Option<Hit> {
    if let Some(element) = selected.and_then(|id| store.get(&id)) {
        if let Some(part) = hit_element(element, pt, true) {
            if part != HitPart::Body {
                return Some(Hit { element_id: element.id, part });
            }
        }
    }
    layers.iter().rev().find_map(|layer| {
        let element = store.get(&layer.element_id)?;
        (hit_element(element, pt, false)? == HitPart::Body).then_some(Hit { element_id: element.id, part: HitPart::Body })
    })
}
