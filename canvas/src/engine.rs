//! Engine: ties the store, layers, controllers and bounds checker together.
//!
//! `EngineCore` holds all state and logic and is driven by plain method
//! calls that return [`Action`]s for the host. It never touches the bus, so
//! it can be tested on its own. `Engine` wraps a shared core, subscribes it
//! to the bus (props submitted, page clicked) and republishes its actions
//! as [`CanvasEvent`]s for menus.
//!
//! Every input method takes the pointer position in client (viewport)
//! coordinates plus the current instant, which feeds the bounds debounce.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::bounds::{BoundsChecker, BoundsUpdate, OverlayStyle};
use crate::bus::{CanvasBus, CanvasEvent, EventName, HandlerId};
use crate::config::EngineConfig;
use crate::consts::{SCALE_ROUND_DECIMALS, TEXT_BASE_FONT_SIZE};
use crate::doc::{
    Element, ElementId, ElementKind, ElementStore, ElementType, PropsPatch, Transform, TransformPatch,
};
use crate::geom::{Container, Point, PrintAreaSpec, Rect, Size, contain_rect, round_to};
use crate::gesture::ElementControls;
use crate::hit::{HitPart, hit_test};
use crate::input::{Cursor, InputState, Selection, UiState};
use crate::layers::LayerManager;
use crate::mockup::{MockupSnapshot, SnapshotError};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementAdded { id: ElementId, kind: ElementType },
    ElementRemoved { id: ElementId },
    /// A transform changed mid-gesture or from a menu.
    TransformChanged { id: ElementId, transform: Transform },
    /// A gesture ended; this is the value to persist.
    TransformCommitted { id: ElementId, transform: Transform },
    /// Payload (text, color, font) or layer position changed.
    ElementUpdated { id: ElementId },
    LayersChanged,
    SelectionChanged(Option<Selection>),
    OutOfBoundsChanged(bool),
    PrintAreaChanged(Option<Rect>),
    SetCursor(Cursor),
    RenderNeeded,
}

/// Core engine state. All logic that doesn't depend on the bus.
pub struct EngineCore {
    pub doc: ElementStore,
    pub layers: LayerManager,
    pub ui: UiState,
    pub input: InputState,
    pub bounds: BoundsChecker,
    pub config: EngineConfig,
    pub container: Container,
    pub print_area: Option<PrintAreaSpec>,
    /// Natural size of the product image the print area is anchored to.
    /// `None` resolves the print area against the whole container.
    pub product_image: Option<Size>,
    controls: HashMap<ElementId, ElementControls>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            doc: ElementStore::new(),
            layers: LayerManager::new(),
            ui: UiState::default(),
            input: InputState::default(),
            bounds: BoundsChecker::new(config.bounds_debounce),
            config,
            container: Container::default(),
            print_area: None,
            product_image: None,
            controls: HashMap::new(),
        }
    }

    // --- Surface ---

    /// The container moved or resized. Bounds are recomputed before the next
    /// check; a degenerate size keeps the previous bounds.
    pub fn set_container(&mut self, container: Container) -> Vec<Action> {
        self.container = container;
        self.reconfigure_bounds()
    }

    /// Switch the active product surface's print area.
    pub fn set_print_area(&mut self, spec: Option<PrintAreaSpec>) -> Vec<Action> {
        self.print_area = spec;
        self.reconfigure_bounds()
    }

    /// Anchor the print area to a product image drawn with
    /// `object-fit: contain`, or back to the container with `None`.
    pub fn set_product_image(&mut self, natural: Option<Size>) -> Vec<Action> {
        self.product_image = natural;
        self.reconfigure_bounds()
    }

    fn reconfigure_bounds(&mut self) -> Vec<Action> {
        let frame = match self.product_image {
            Some(natural) => contain_rect(self.container.size, natural),
            None => {
                let size = self.container.size;
                (!size.is_degenerate()).then(|| Rect::new(0.0, 0.0, size.width, size.height))
            }
        };
        let mut actions = Vec::new();
        match self.bounds.configure_in(self.print_area.as_ref(), frame) {
            BoundsUpdate::Retained(_) => return actions,
            BoundsUpdate::Disabled => actions.push(Action::PrintAreaChanged(None)),
            BoundsUpdate::Resolved(rect) => actions.push(Action::PrintAreaChanged(Some(rect))),
        }
        self.push_bounds_check(&mut actions);
        actions
    }

    // --- Elements ---

    /// Add an element. Without a position it is centered in the container,
    /// or placed at the configured default when the container has no size.
    pub fn add_element(&mut self, kind: ElementKind, size: Size, position: Option<Point>) -> (ElementId, Vec<Action>) {
        let mut transform = self.config.default_transform;
        if let Some(at) = position {
            transform.x = at.x;
            transform.y = at.y;
        } else if !self.container.size.is_degenerate() {
            transform.x = (self.container.size.width - size.width) / 2.0;
            transform.y = (self.container.size.height - size.height) / 2.0;
        }
        let element = Element::new(kind, size, transform);
        let id = element.id;
        let element_type = element.element_type();
        self.controls.insert(id, ElementControls::new(&self.config, element_type));
        self.doc.insert(element);
        self.layers.add(id, self.config.default_zindex);
        info!(%id, kind = element_type.as_str(), "element added");

        let mut actions = vec![Action::ElementAdded { id, kind: element_type }, Action::LayersChanged];
        self.push_bounds_check(&mut actions);
        actions.push(Action::RenderNeeded);
        (id, actions)
    }

    pub fn remove_element(&mut self, id: &ElementId) -> Vec<Action> {
        self.remove_elements(&[*id])
    }

    /// Remove elements, detaching them from the layer list, the selection
    /// and any gesture in progress. Unknown ids are ignored.
    pub fn remove_elements(&mut self, ids: &[ElementId]) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut removed = Vec::new();
        for id in ids {
            if self.doc.remove(id).is_some() {
                self.controls.remove(id);
                removed.push(*id);
                actions.push(Action::ElementRemoved { id: *id });
            }
        }
        if removed.is_empty() {
            return actions;
        }
        info!(count = removed.len(), "elements removed");
        if self.layers.remove(&removed) > 0 {
            actions.push(Action::LayersChanged);
        }
        if self.ui.selected_id().is_some_and(|id| removed.contains(&id)) {
            self.ui.selection = None;
            actions.push(Action::SelectionChanged(None));
        }
        if self.input.target().is_some_and(|id| removed.contains(&id)) {
            self.input = InputState::Idle;
            self.push_cursor(Cursor::Default, &mut actions);
        }
        self.push_bounds_check(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Selection ---

    /// Select an element. Selecting while another is selected switches
    /// directly, without passing through an empty selection.
    pub fn select(&mut self, id: &ElementId) -> Vec<Action> {
        let Some(element) = self.doc.get(id) else {
            return vec![];
        };
        if self.ui.is_selected(id) {
            return vec![];
        }
        let selection = Selection { id: *id, kind: element.element_type() };
        self.ui.selection = Some(selection);
        debug!(%id, "element selected");
        vec![Action::SelectionChanged(Some(selection)), Action::RenderNeeded]
    }

    pub fn deselect(&mut self) -> Vec<Action> {
        if self.ui.selection.take().is_none() {
            return vec![];
        }
        debug!("selection cleared");
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    /// A click anywhere on the page. Clears the selection unless it landed
    /// on the selected element (handles included) or inside a menu.
    pub fn on_page_click(&mut self, client: Point, in_menu: bool) -> Vec<Action> {
        if in_menu || self.ui.selection.is_none() {
            return vec![];
        }
        let local = self.container.client_to_local(client);
        let hit = hit_test(local, &self.doc, &self.layers, self.ui.selected_id());
        if hit.is_some_and(|h| self.ui.is_selected(&h.element_id)) {
            return vec![];
        }
        self.deselect()
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, client: Point, now: Instant) -> Vec<Action> {
        let mut actions = self.finish_gesture(now);
        let local = self.container.client_to_local(client);
        let Some(hit) = hit_test(local, &self.doc, &self.layers, self.ui.selected_id()) else {
            return actions;
        };
        let id = hit.element_id;
        let Some(transform) = self.doc.get(&id).map(|el| el.transform) else {
            return actions;
        };
        let center = self.element_center_client(&id);
        let Some(controls) = self.controls.get_mut(&id) else {
            return actions;
        };

        match hit.part {
            HitPart::RemoveHandle => {
                actions.extend(self.remove_element(&id));
                return actions;
            }
            HitPart::RotateHandle => {
                controls.drag.set_disabled(true);
                controls.rotate.begin(center, client, transform.angle);
                self.input = InputState::Rotating { id };
            }
            HitPart::ZoomHandle => {
                controls.drag.set_disabled(true);
                controls.zoom.begin(client.x, transform.scale);
                self.input = InputState::Zooming { id };
            }
            HitPart::Body => {
                if controls.drag.begin(client, transform.position()) {
                    self.input = InputState::Dragging { id };
                }
                actions.extend(self.select(&id));
            }
        }
        if !self.input.is_idle() {
            debug!(%id, gesture = ?self.input, "gesture started");
        }
        self.push_cursor(self.input.cursor(), &mut actions);
        actions
    }

    pub fn on_pointer_move(&mut self, client: Point, now: Instant) -> Vec<Action> {
        self.bounds.pointer_moved(now);
        let Some(id) = self.input.target() else {
            return vec![];
        };
        if !self.doc.contains(&id) {
            return self.abandon_gesture(&id);
        }
        let Some(controls) = self.controls.get_mut(&id) else {
            return self.abandon_gesture(&id);
        };
        let patch = match self.input {
            InputState::Dragging { .. } => controls.drag.update(client).map(|p| TransformPatch::position(p.x, p.y)),
            InputState::Rotating { .. } => controls.rotate.update(client).map(TransformPatch::angle),
            InputState::Zooming { .. } => controls.zoom.update(client.x).map(TransformPatch::scale),
            InputState::Pinching { .. } | InputState::Idle => None,
        };
        match patch {
            Some(patch) => self.write_transform(&id, &patch),
            None => vec![],
        }
    }

    pub fn on_pointer_up(&mut self, _client: Point, now: Instant) -> Vec<Action> {
        self.finish_gesture(now)
    }

    pub fn on_pointer_cancel(&mut self, now: Instant) -> Vec<Action> {
        self.finish_gesture(now)
    }

    // --- Touch input ---

    /// `touches` lists every finger currently down, in client coordinates.
    /// One finger behaves like a pointer. A second finger converts whatever
    /// the first one started into a pinch on the same element.
    pub fn on_touch_start(&mut self, touches: &[Point], now: Instant) -> Vec<Action> {
        match touches {
            [] => vec![],
            [single] => self.on_pointer_down(*single, now),
            [a, b, ..] => self.begin_pinch(*a, *b, now),
        }
    }

    pub fn on_touch_move(&mut self, touches: &[Point], now: Instant) -> Vec<Action> {
        match (self.input, touches) {
            (InputState::Pinching { id }, [a, b, ..]) => {
                self.bounds.pointer_moved(now);
                if !self.doc.contains(&id) {
                    return self.abandon_gesture(&id);
                }
                let Some(update) = self.controls.get_mut(&id).and_then(|c| c.pinch.update(*a, *b)) else {
                    return vec![];
                };
                let patch = TransformPatch { scale: Some(update.scale), angle: update.angle, ..TransformPatch::default() };
                self.write_transform(&id, &patch)
            }
            (InputState::Pinching { .. }, _) => vec![],
            (_, [single]) => self.on_pointer_move(*single, now),
            _ => vec![],
        }
    }

    /// `touches` lists the fingers still down after the change.
    pub fn on_touch_end(&mut self, touches: &[Point], now: Instant) -> Vec<Action> {
        match self.input {
            InputState::Pinching { .. } if touches.len() < 2 => self.finish_gesture(now),
            InputState::Pinching { .. } => vec![],
            _ if touches.is_empty() => self.finish_gesture(now),
            _ => vec![],
        }
    }

    fn begin_pinch(&mut self, a: Point, b: Point, now: Instant) -> Vec<Action> {
        let mut actions = Vec::new();
        let target = match self.input.target() {
            Some(id) => Some(id),
            None => {
                let local = self.container.client_to_local(a);
                hit_test(local, &self.doc, &self.layers, self.ui.selected_id()).map(|h| h.element_id)
            }
        };
        let Some(id) = target else {
            return actions;
        };
        if !matches!(self.input, InputState::Dragging { id: current } if current == id) {
            actions.extend(self.finish_gesture(now));
        }
        let Some(transform) = self.doc.get(&id).map(|el| el.transform) else {
            return actions;
        };
        let Some(controls) = self.controls.get_mut(&id) else {
            return actions;
        };
        controls.drag.end();
        controls.drag.set_disabled(true);
        if controls.pinch.begin(a, b, transform.scale, transform.angle) {
            self.input = InputState::Pinching { id };
            debug!(%id, "pinch started");
            actions.extend(self.select(&id));
        } else {
            controls.drag.set_disabled(false);
            self.input = InputState::Idle;
        }
        self.push_cursor(self.input.cursor(), &mut actions);
        actions
    }

    /// End whatever gesture is running, commit its transform and schedule a
    /// bounds check.
    fn finish_gesture(&mut self, now: Instant) -> Vec<Action> {
        let Some(id) = self.input.target() else {
            return vec![];
        };
        self.input = InputState::Idle;
        let mut actions = Vec::new();
        if let Some(controls) = self.controls.get_mut(&id) {
            controls.cancel_all();
        }
        if let Some(element) = self.doc.get(&id) {
            actions.push(Action::TransformCommitted { id, transform: element.transform });
            debug!(%id, "gesture committed");
        }
        self.bounds.pointer_moved(now);
        self.push_cursor(Cursor::Default, &mut actions);
        actions
    }

    /// The gesture's element vanished mid-gesture: drop the session quietly.
    fn abandon_gesture(&mut self, id: &ElementId) -> Vec<Action> {
        warn!(%id, "gesture target removed mid-gesture");
        self.controls.remove(id);
        self.input = InputState::Idle;
        let mut actions = Vec::new();
        self.push_cursor(Cursor::Default, &mut actions);
        actions
    }

    fn element_center_client(&self, id: &ElementId) -> Point {
        let center = self.doc.get(id).map(|el| el.frame().center()).unwrap_or_default();
        Point::new(center.x + self.container.origin.x, center.y + self.container.origin.y)
    }

    // --- Programmatic updates ---

    /// Apply a menu submission. Scale is clamped to the element kind's
    /// limits; a text font size is converted to scale when no scale is
    /// given. Absent fields are left alone.
    pub fn apply_props(&mut self, id: &ElementId, props: &PropsPatch) -> Vec<Action> {
        let Some(element) = self.doc.get(id) else {
            return vec![];
        };
        let kind = element.element_type();
        let limits = self.config.limits_for(kind);
        let mut patch = props.transform;
        if patch.scale.is_none() && kind == ElementType::Text {
            patch.scale = props.font_size.map(|fs| round_to(fs / TEXT_BASE_FONT_SIZE, SCALE_ROUND_DECIMALS));
        }
        patch.scale = patch.scale.map(|s| limits.clamp(s));

        let mut actions = Vec::new();
        if self.doc.set_transform(id, &patch) {
            if let Some(element) = self.doc.get(id) {
                actions.push(Action::TransformChanged { id: *id, transform: element.transform });
            }
        }
        if self.doc.update_text(id, props) {
            actions.push(Action::ElementUpdated { id: *id });
        }
        if let Some(delta) = props.z_delta {
            self.layers.shift(*id, delta, self.config.default_zindex);
            actions.push(Action::LayersChanged);
            actions.push(Action::ElementUpdated { id: *id });
        }
        if actions.is_empty() {
            return actions;
        }
        debug!(%id, "props applied");
        self.push_bounds_check(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Write a sparse transform as-is, without clamping.
    pub fn set_transform(&mut self, id: &ElementId, patch: &TransformPatch) -> Vec<Action> {
        let mut actions = self.write_transform(id, patch);
        if !actions.is_empty() {
            self.push_bounds_check(&mut actions);
        }
        actions
    }

    /// The element's layout size changed (e.g. text reflowed).
    pub fn set_element_size(&mut self, id: &ElementId, size: Size) -> Vec<Action> {
        if !self.doc.set_size(id, size) {
            return vec![];
        }
        let mut actions = Vec::new();
        self.push_bounds_check(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    fn write_transform(&mut self, id: &ElementId, patch: &TransformPatch) -> Vec<Action> {
        if !self.doc.set_transform(id, patch) {
            return vec![];
        }
        match self.doc.get(id) {
            Some(element) => vec![Action::TransformChanged { id: *id, transform: element.transform }, Action::RenderNeeded],
            None => vec![],
        }
    }

    // --- Bounds ---

    /// Run the debounced bounds check if it's due.
    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        match self.bounds.poll(now, &self.doc) {
            Some(out_of_bounds) => {
                self.ui.out_of_bounds = out_of_bounds;
                vec![Action::OutOfBoundsChanged(out_of_bounds)]
            }
            None => vec![],
        }
    }

    /// Run the bounds check immediately.
    pub fn check_bounds(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.push_bounds_check(&mut actions);
        actions
    }

    fn push_bounds_check(&mut self, actions: &mut Vec<Action>) {
        if let Some(out_of_bounds) = self.bounds.check_now(&self.doc) {
            self.ui.out_of_bounds = out_of_bounds;
            actions.push(Action::OutOfBoundsChanged(out_of_bounds));
        }
    }

    fn push_cursor(&mut self, cursor: Cursor, actions: &mut Vec<Action>) {
        if self.ui.cursor != cursor {
            self.ui.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }

    // --- Snapshots ---

    #[must_use]
    pub fn snapshot(&self) -> MockupSnapshot {
        MockupSnapshot::capture(&self.doc, &self.layers, self.print_area, self.config.default_zindex)
    }

    /// Replace every element, the layer order and the print area with a
    /// saved mockup. Selection and gestures are reset.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the snapshot is invalid; the engine is
    /// left untouched in that case.
    pub fn load_snapshot(&mut self, snapshot: MockupSnapshot) -> Result<Vec<Action>, SnapshotError> {
        let print_area = snapshot.print_area;
        let (elements, layers) = snapshot.into_parts()?;
        self.controls = elements
            .iter()
            .map(|el| (el.id, ElementControls::new(&self.config, el.element_type())))
            .collect();
        info!(count = elements.len(), "snapshot loaded");
        self.doc.load(elements);
        self.layers.load(layers);
        self.input = InputState::Idle;

        let mut actions = self.deselect();
        self.push_cursor(Cursor::Default, &mut actions);
        actions.push(Action::LayersChanged);
        self.print_area = print_area;
        actions.extend(self.reconfigure_bounds());
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    // --- Queries ---

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn transform(&self, id: &ElementId) -> Option<Transform> {
        self.doc.get(id).map(|el| el.transform)
    }

    #[must_use]
    pub fn z_index(&self, id: &ElementId) -> Option<i64> {
        self.layers.z_index(id)
    }

    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.ui.selection
    }

    #[must_use]
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.ui.is_selected(id)
    }

    #[must_use]
    pub fn out_of_bounds(&self) -> bool {
        self.ui.out_of_bounds
    }

    #[must_use]
    pub fn overlay(&self) -> OverlayStyle {
        self.bounds.overlay()
    }

    #[must_use]
    pub fn print_bounds(&self) -> Option<Rect> {
        self.bounds.bounds()
    }

    /// When the pending bounds check becomes due, if one is scheduled.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.bounds.next_deadline()
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// The full engine: a shared [`EngineCore`] wired to a [`CanvasBus`].
///
/// Props submitted on the bus are applied to the core, page clicks drive
/// deselection, and every batch of actions is republished for menus:
/// selection changes as `ElementPicked`/`SelectionCleared`, transform and
/// payload changes as `PropsSynced`, and overlay toggles as
/// `OutOfBoundsChanged`. Events are delivered on [`Engine::flush`].
pub struct Engine {
    core: Rc<RefCell<EngineCore>>,
    bus: CanvasBus,
    subscriptions: Vec<(EventName, HandlerId)>,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig, bus: CanvasBus) -> Self {
        let core = Rc::new(RefCell::new(EngineCore::new(config)));
        let mut subscriptions = Vec::new();

        let weak = Rc::downgrade(&core);
        let publish_to = bus.clone();
        let handler = bus.on(EventName::PropsSubmitted, move |event| {
            if let CanvasEvent::PropsSubmitted { id, props } = event {
                with_core(&weak, &publish_to, |core| core.apply_props(id, props));
            }
        });
        subscriptions.push((EventName::PropsSubmitted, handler));

        let weak = Rc::downgrade(&core);
        let publish_to = bus.clone();
        let handler = bus.on(EventName::PageClicked, move |event| {
            if let CanvasEvent::PageClicked { point, in_menu } = event {
                with_core(&weak, &publish_to, |core| core.on_page_click(*point, *in_menu));
            }
        });
        subscriptions.push((EventName::PageClicked, handler));

        Self { core, bus, subscriptions }
    }

    #[must_use]
    pub fn bus(&self) -> &CanvasBus {
        &self.bus
    }

    /// Shared handle to the core, for menus that read element state.
    #[must_use]
    pub fn core_handle(&self) -> Rc<RefCell<EngineCore>> {
        Rc::clone(&self.core)
    }

    /// Deliver queued bus events. Returns the number of handlers run.
    pub fn flush(&self) -> usize {
        self.bus.flush()
    }

    /// Run `f` against the core and republish its actions.
    fn drive<F>(&self, f: F) -> Vec<Action>
    where
        F: FnOnce(&mut EngineCore) -> Vec<Action>,
    {
        let actions = f(&mut *self.core.borrow_mut());
        publish_actions(&self.bus, &self.core.borrow(), &actions);
        actions
    }

    pub fn set_container(&self, container: Container) -> Vec<Action> {
        self.drive(|core| core.set_container(container))
    }

    pub fn set_print_area(&self, spec: Option<PrintAreaSpec>) -> Vec<Action> {
        self.drive(|core| core.set_print_area(spec))
    }

    pub fn set_product_image(&self, natural: Option<Size>) -> Vec<Action> {
        self.drive(|core| core.set_product_image(natural))
    }

    pub fn add_element(&self, kind: ElementKind, size: Size, position: Option<Point>) -> (ElementId, Vec<Action>) {
        let (id, actions) = self.core.borrow_mut().add_element(kind, size, position);
        publish_actions(&self.bus, &self.core.borrow(), &actions);
        (id, actions)
    }

    pub fn remove_element(&self, id: &ElementId) -> Vec<Action> {
        self.drive(|core| core.remove_element(id))
    }

    pub fn select(&self, id: &ElementId) -> Vec<Action> {
        self.drive(|core| core.select(id))
    }

    pub fn deselect(&self) -> Vec<Action> {
        self.drive(EngineCore::deselect)
    }

    pub fn on_pointer_down(&self, client: Point, now: Instant) -> Vec<Action> {
        self.drive(|core| core.on_pointer_down(client, now))
    }

    pub fn on_pointer_move(&self, client: Point, now: Instant) -> Vec<Action> {
        self.drive(|core| core.on_pointer_move(client, now))
    }

    pub fn on_pointer_up(&self, client: Point, now: Instant) -> Vec<Action> {
        self.drive(|core| core.on_pointer_up(client, now))
    }

    pub fn on_pointer_cancel(&self, now: Instant) -> Vec<Action> {
        self.drive(|core| core.on_pointer_cancel(now))
    }

    pub fn on_touch_start(&self, touches: &[Point], now: Instant) -> Vec<Action> {
        self.drive(|core| core.on_touch_start(touches, now))
    }

    pub fn on_touch_move(&self, touches: &[Point], now: Instant) -> Vec<Action> {
        self.drive(|core| core.on_touch_move(touches, now))
    }

    pub fn on_touch_end(&self, touches: &[Point], now: Instant) -> Vec<Action> {
        self.drive(|core| core.on_touch_end(touches, now))
    }

    /// Notify the engine of a page-level click. Handled on the next flush.
    pub fn page_click(&self, client: Point, in_menu: bool) {
        self.bus.emit(CanvasEvent::PageClicked { point: client, in_menu });
    }

    /// Submit properties as a menu would. Applied on the next flush.
    pub fn submit_props(&self, id: ElementId, props: PropsPatch) {
        self.bus.emit(CanvasEvent::PropsSubmitted { id, props });
    }

    pub fn set_transform(&self, id: &ElementId, patch: &TransformPatch) -> Vec<Action> {
        self.drive(|core| core.set_transform(id, patch))
    }

    pub fn set_element_size(&self, id: &ElementId, size: Size) -> Vec<Action> {
        self.drive(|core| core.set_element_size(id, size))
    }

    pub fn tick(&self, now: Instant) -> Vec<Action> {
        self.drive(|core| core.tick(now))
    }

    #[must_use]
    pub fn snapshot(&self) -> MockupSnapshot {
        self.core.borrow().snapshot()
    }

    /// # Errors
    ///
    /// See [`EngineCore::load_snapshot`].
    pub fn load_snapshot(&self, snapshot: MockupSnapshot) -> Result<Vec<Action>, SnapshotError> {
        let actions = self.core.borrow_mut().load_snapshot(snapshot)?;
        publish_actions(&self.bus, &self.core.borrow(), &actions);
        Ok(actions)
    }

    #[must_use]
    pub fn transform(&self, id: &ElementId) -> Option<Transform> {
        self.core.borrow().transform(id)
    }

    #[must_use]
    pub fn z_index(&self, id: &ElementId) -> Option<i64> {
        self.core.borrow().z_index(id)
    }

    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.core.borrow().selection()
    }

    #[must_use]
    pub fn out_of_bounds(&self) -> bool {
        self.core.borrow().out_of_bounds()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.core.borrow().next_deadline()
    }

    #[must_use]
    pub fn container(&self) -> Container {
        self.core.borrow().container
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        for (name, id) in self.subscriptions.drain(..) {
            self.bus.off(name, Some(id));
        }
    }
}

fn with_core<F>(core: &Weak<RefCell<EngineCore>>, bus: &CanvasBus, f: F)
where
    F: FnOnce(&mut EngineCore) -> Vec<Action>,
{
    let Some(core) = core.upgrade() else {
        return;
    };
    let actions = match core.try_borrow_mut() {
        Ok(mut guard) => f(&mut *guard),
        Err(_) => {
            warn!("engine busy, dropping bus event");
            return;
        }
    };
    match core.try_borrow() {
        Ok(guard) => publish_actions(bus, &guard, &actions),
        Err(_) => warn!(actions = actions.len(), "engine busy, dropping action batch"),
    }
}

/// Translate engine actions into bus events. At most one `PropsSynced` is
/// emitted per element per batch.
fn publish_actions(bus: &CanvasBus, core: &EngineCore, actions: &[Action]) {
    let mut synced = HashSet::new();
    for action in actions {
        match action {
            Action::SelectionChanged(Some(selection)) => {
                bus.emit(CanvasEvent::ElementPicked { id: selection.id, kind: selection.kind });
            }
            Action::SelectionChanged(None) => {
                bus.emit(CanvasEvent::SelectionCleared);
            }
            Action::TransformChanged { id, .. } | Action::TransformCommitted { id, .. } | Action::ElementUpdated { id } => {
                if core.doc.contains(id) && synced.insert(*id) {
                    bus.emit(CanvasEvent::PropsSynced { id: *id });
                }
            }
            Action::LayersChanged => {
                if let Some(id) = core.ui.selected_id() {
                    if synced.insert(id) {
                        bus.emit(CanvasEvent::PropsSynced { id });
                    }
                }
            }
            Action::OutOfBoundsChanged(out_of_bounds) => {
                bus.emit(CanvasEvent::OutOfBoundsChanged { out_of_bounds: *out_of_bounds });
            }
            Action::ElementAdded { .. }
            | Action::ElementRemoved { .. }
            | Action::PrintAreaChanged(_)
            | Action::SetCursor(_)
            | Action::RenderNeeded => {}
        }
    }
}
