//! Event bus: deferred publish/subscribe between the canvas and its menus.
//!
//! DESIGN
//! ======
//! `emit` never runs a handler. It snapshots the handlers registered for the
//! event's name and queues one delivery per handler; `flush` drains the
//! queue in FIFO order. Deliveries queued during a flush run in the same
//! flush, after everything queued before them, so a "props submitted"
//! always lands before a "props synced" emitted in response to it.
//!
//! The bus is single-threaded (`Rc<RefCell<..>>`) and cloning it yields
//! another handle to the same registry. No borrow is held while a handler
//! runs, so handlers may freely emit, subscribe, or unsubscribe.

#[cfg(test)]
#[path = "bus_test.rs"]
mod bus_test;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use tracing::trace;

use crate::doc::{ElementId, ElementType, PropsPatch};
use crate::geom::Point;

/// An event that can travel on an [`EventBus`].
pub trait BusEvent: Clone {
    /// Key handlers are registered under.
    type Name: Copy + Eq + Hash + fmt::Debug;

    fn name(&self) -> Self::Name;
}

/// Handle returned by [`EventBus::on`], used to remove that one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

type Handler<E> = Rc<dyn Fn(&E)>;

struct Delivery<E: BusEvent> {
    id: HandlerId,
    name: E::Name,
    handler: Handler<E>,
    event: E,
}

struct Inner<E: BusEvent> {
    next_id: u64,
    handlers: HashMap<E::Name, Vec<(HandlerId, Handler<E>)>>,
    queue: VecDeque<Delivery<E>>,
    flushing: bool,
}

impl<E: BusEvent> Inner<E> {
    fn is_registered(&self, name: E::Name, id: HandlerId) -> bool {
        self.handlers.get(&name).is_some_and(|list| list.iter().any(|(h, _)| *h == id))
    }
}

pub struct EventBus<E: BusEvent> {
    inner: Rc<RefCell<Inner<E>>>,
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").field("pending", &self.pending()).finish_non_exhaustive()
    }
}

impl<E: BusEvent> EventBus<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_id: 0,
                handlers: HashMap::new(),
                queue: VecDeque::new(),
                flushing: false,
            })),
        }
    }

    /// Register `handler` for events named `name`. Handlers for the same
    /// name are delivered in registration order.
    pub fn on<F>(&self, name: E::Name, handler: F) -> HandlerId
    where
        F: Fn(&E) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = HandlerId(inner.next_id);
        inner.next_id += 1;
        inner.handlers.entry(name).or_default().push((id, Rc::new(handler)));
        trace!(?name, %id, "handler registered");
        id
    }

    /// Remove one handler, or every handler for `name` when `id` is `None`.
    /// Deliveries already queued for a removed handler are dropped.
    /// Returns the number of handlers removed.
    pub fn off(&self, name: E::Name, id: Option<HandlerId>) -> usize {
        let mut inner = self.inner.borrow_mut();
        let Some(list) = inner.handlers.get_mut(&name) else {
            return 0;
        };
        let before = list.len();
        match id {
            Some(id) => list.retain(|(h, _)| *h != id),
            None => list.clear(),
        }
        let removed = before - list.len();
        if list.is_empty() {
            inner.handlers.remove(&name);
        }
        removed
    }

    /// Queue `event` for every handler currently registered under its name.
    /// Returns the number of deliveries queued.
    pub fn emit(&self, event: E) -> usize {
        let mut inner = self.inner.borrow_mut();
        let name = event.name();
        let Some(list) = inner.handlers.get(&name) else {
            trace!(?name, "event emitted with no handlers");
            return 0;
        };
        let deliveries: Vec<Delivery<E>> = list
            .iter()
            .map(|(id, handler)| Delivery { id: *id, name, handler: Rc::clone(handler), event: event.clone() })
            .collect();
        let count = deliveries.len();
        inner.queue.extend(deliveries);
        trace!(?name, count, "event queued");
        count
    }

    /// Run queued deliveries until the queue is empty. A flush started from
    /// inside a handler returns immediately; the outer flush picks up
    /// whatever that handler queued. Returns the number of handlers run.
    pub fn flush(&self) -> usize {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.flushing {
                return 0;
            }
            inner.flushing = true;
        }
        let _guard = FlushGuard { inner: &self.inner };

        let mut delivered = 0;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let mut next = None;
                while let Some(delivery) = inner.queue.pop_front() {
                    if inner.is_registered(delivery.name, delivery.id) {
                        next = Some(delivery);
                        break;
                    }
                }
                next
            };
            let Some(delivery) = next else {
                break;
            };
            (delivery.handler)(&delivery.event);
            delivered += 1;
        }
        delivered
    }

    /// Number of queued deliveries.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    #[must_use]
    pub fn handler_count(&self, name: E::Name) -> usize {
        self.inner.borrow().handlers.get(&name).map_or(0, Vec::len)
    }

    /// Drop every handler and queued delivery.
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.handlers.clear();
        inner.queue.clear();
    }
}

struct FlushGuard<'a, E: BusEvent> {
    inner: &'a RefCell<Inner<E>>,
}

impl<E: BusEvent> Drop for FlushGuard<'_, E> {
    fn drop(&mut self) {
        self.inner.borrow_mut().flushing = false;
    }
}

// =============================================================================
// CANVAS EVENTS
// =============================================================================

/// Events exchanged between the canvas engine and property menus.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// An element became the selection.
    ElementPicked { id: ElementId, kind: ElementType },
    /// A menu submitted new properties for an element.
    PropsSubmitted { id: ElementId, props: PropsPatch },
    /// The element's state changed; menus showing it should re-read the store.
    PropsSynced { id: ElementId },
    /// A click landed somewhere on the page, in client coordinates.
    PageClicked { point: Point, in_menu: bool },
    SelectionCleared,
    OutOfBoundsChanged { out_of_bounds: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    ElementPicked,
    PropsSubmitted,
    PropsSynced,
    PageClicked,
    SelectionCleared,
    OutOfBoundsChanged,
}

impl BusEvent for CanvasEvent {
    type Name = EventName;

    fn name(&self) -> EventName {
        match self {
            Self::ElementPicked { .. } => EventName::ElementPicked,
            Self::PropsSubmitted { .. } => EventName::PropsSubmitted,
            Self::PropsSynced { .. } => EventName::PropsSynced,
            Self::PageClicked { .. } => EventName::PageClicked,
            Self::SelectionCleared => EventName::SelectionCleared,
            Self::OutOfBoundsChanged { .. } => EventName::OutOfBoundsChanged,
        }
    }
}

/// The bus the canvas engine and menus share.
pub type CanvasBus = EventBus<CanvasEvent>;
