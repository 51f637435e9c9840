//! Print-area bounds checking.
//!
//! The checker resolves a percentage [`PrintAreaSpec`] against the container
//! and reports whether any element's on-screen bounding box leaves the
//! resulting rectangle. The result drives an advisory overlay; nothing is
//! ever blocked or clamped here.
//!
//! Checks triggered by pointer movement are debounced. [`Debouncer`] is a
//! cancellable deadline driven by caller-supplied instants, so hosts and
//! tests own the clock.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::doc::{Element, ElementStore};
use crate::geom::{PrintAreaSpec, Rect, Size};

// =============================================================================
// DEBOUNCER
// =============================================================================

/// Trailing-edge debounce: every `schedule` pushes the deadline back to
/// `now + delay`, and the work becomes due once a full quiet period passes.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether the deadline has passed. Consumes it when it has.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// OVERLAY
// =============================================================================

/// Style of the out-of-bounds warning overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub opacity: f64,
    /// Whether the overlay intercepts pointer events.
    pub pointer_events: bool,
}

impl OverlayStyle {
    pub const HIDDEN: OverlayStyle = OverlayStyle { opacity: 0.0, pointer_events: false };
    pub const SHOWN: OverlayStyle = OverlayStyle { opacity: 1.0, pointer_events: true };
}

// =============================================================================
// CHECKER
// =============================================================================

/// Outcome of [`BoundsChecker::configure`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsUpdate {
    /// No usable spec; the constraint is off.
    Disabled,
    /// Bounds were recomputed.
    Resolved(Rect),
    /// The frame was degenerate; the previous bounds were kept.
    Retained(Option<Rect>),
}

#[derive(Debug, Clone)]
pub struct BoundsChecker {
    bounds: Option<Rect>,
    out_of_bounds: bool,
    debounce: Debouncer,
}

impl BoundsChecker {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self { bounds: None, out_of_bounds: false, debounce: Debouncer::new(debounce) }
    }

    /// Recompute bounds for a new surface or container size. Any pending
    /// debounced check is dropped, since it was scheduled against stale
    /// bounds.
    pub fn configure(&mut self, spec: Option<&PrintAreaSpec>, container: Size) -> BoundsUpdate {
        let frame = (!container.is_degenerate()).then(|| Rect::new(0.0, 0.0, container.width, container.height));
        self.configure_in(spec, frame)
    }

    /// Like [`BoundsChecker::configure`], resolving against an arbitrary
    /// frame such as a contain-fitted product image. `None` means the frame
    /// can't be measured yet and the previous bounds are kept.
    pub fn configure_in(&mut self, spec: Option<&PrintAreaSpec>, frame: Option<Rect>) -> BoundsUpdate {
        self.debounce.cancel();
        let Some(spec) = spec.filter(|s| s.percentages().is_some()) else {
            self.bounds = None;
            debug!("print area disabled");
            return BoundsUpdate::Disabled;
        };
        match frame.and_then(|frame| spec.resolve_in(frame)) {
            Some(rect) => {
                self.bounds = Some(rect);
                debug!(x = rect.x, y = rect.y, w = rect.width, h = rect.height, "print area resolved");
                BoundsUpdate::Resolved(rect)
            }
            None => {
                debug!("frame not measurable, keeping bounds");
                BoundsUpdate::Retained(self.bounds)
            }
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Whether `rect` lies fully inside the print area. Always true when no
    /// print area is set.
    #[must_use]
    pub fn check_rect(&self, rect: &Rect) -> bool {
        self.bounds.is_none_or(|bounds| bounds.contains_rect(rect))
    }

    #[must_use]
    pub fn check_element(&self, element: &Element) -> bool {
        self.check_rect(&element.bounds())
    }

    #[must_use]
    pub fn any_out_of_bounds(&self, store: &ElementStore) -> bool {
        self.bounds.is_some() && store.iter().any(|element| !self.check_element(element))
    }

    /// Note pointer movement; the next check runs one debounce period after
    /// the last call.
    pub fn pointer_moved(&mut self, now: Instant) {
        self.debounce.schedule(now);
    }

    #[must_use]
    pub fn check_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Run the debounced check if it's due. Returns the new flag only when
    /// it changed.
    pub fn poll(&mut self, now: Instant, store: &ElementStore) -> Option<bool> {
        if !self.debounce.due(now) {
            return None;
        }
        self.check_now(store)
    }

    /// Run the check immediately. Returns the new flag only when it changed.
    pub fn check_now(&mut self, store: &ElementStore) -> Option<bool> {
        let out_of_bounds = self.any_out_of_bounds(store);
        if out_of_bounds == self.out_of_bounds {
            return None;
        }
        self.out_of_bounds = out_of_bounds;
        info!(out_of_bounds, "print area warning toggled");
        Some(out_of_bounds)
    }

    #[must_use]
    pub fn is_out_of_bounds(&self) -> bool {
        self.out_of_bounds
    }

    #[must_use]
    pub fn overlay(&self) -> OverlayStyle {
        if self.out_of_bounds { OverlayStyle::SHOWN } else { OverlayStyle::HIDDEN }
    }
}
