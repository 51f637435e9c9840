//! Drives an [`Engine`] through a script and reports the final mockup.
//!
//! After every step the bus is flushed and the bounds debounce ticked, the
//! way a browser host would after each event. Time is synthetic by default
//! (step `at_ms` offsets from a fixed start); [`Pacing::Realtime`] sleeps
//! on the tokio timer between steps instead.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use canvas::bus::CanvasBus;
use canvas::config::{ConfigError, EngineConfig};
use canvas::doc::ElementId;
use canvas::engine::Engine;
use canvas::geom::{Container, Point, Size};
use canvas::menu::PropertyMenu;
use canvas::mockup::{MockupSnapshot, SnapshotError};
use serde::Serialize;
use tracing::{debug, info};

use crate::script::{ElementDecl, Script, ScriptInput};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown element key `{0}`")]
    UnknownElement(String),
    #[error("duplicate element key `{0}`")]
    DuplicateElement(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid mockup: {0}")]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Steps run back to back on a synthetic clock.
    #[default]
    Synthetic,
    /// Steps wait for their `at_ms` on the tokio timer.
    Realtime,
}

/// Result printed by the binary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub out_of_bounds: bool,
    pub mockup: MockupSnapshot,
    /// Script key of every element still on the canvas.
    pub keys: BTreeMap<String, ElementId>,
}

struct Clock {
    pacing: Pacing,
    start: Instant,
    latest: Instant,
}

impl Clock {
    fn new(pacing: Pacing) -> Self {
        let start = Instant::now();
        Self { pacing, start, latest: start }
    }

    /// Wait for `at_ms` and return the instant the step runs at. Synthetic
    /// time never runs backwards, even if steps are out of order.
    async fn at(&mut self, at_ms: u64) -> Instant {
        let target = self.start + Duration::from_millis(at_ms);
        if self.pacing == Pacing::Realtime {
            tokio::time::sleep_until(tokio::time::Instant::from_std(target)).await;
        }
        self.latest = self.latest.max(target);
        self.latest
    }
}

struct Session {
    engine: Engine,
    keys: HashMap<String, ElementId>,
}

impl Session {
    fn lookup(&self, key: &str) -> Result<ElementId, ReplayError> {
        self.keys.get(key).copied().ok_or_else(|| ReplayError::UnknownElement(key.to_owned()))
    }

    fn add(&mut self, decl: &ElementDecl) {
        let size = decl.display_size(self.engine.container().size);
        let (id, _) = self.engine.add_element(decl.kind.clone(), size, decl.position);
        debug!(key = %decl.key, %id, "script element added");
        self.keys.insert(decl.key.clone(), id);
    }

    fn apply(&mut self, input: &ScriptInput, now: Instant) -> Result<(), ReplayError> {
        let engine = &self.engine;
        match input {
            ScriptInput::PointerDown { x, y } => {
                engine.on_pointer_down(Point::new(*x, *y), now);
            }
            ScriptInput::PointerMove { x, y } => {
                engine.on_pointer_move(Point::new(*x, *y), now);
            }
            ScriptInput::PointerUp { x, y } => {
                engine.on_pointer_up(Point::new(*x, *y), now);
            }
            ScriptInput::PointerCancel => {
                engine.on_pointer_cancel(now);
            }
            ScriptInput::TouchStart { touches } => {
                engine.on_touch_start(touches, now);
            }
            ScriptInput::TouchMove { touches } => {
                engine.on_touch_move(touches, now);
            }
            ScriptInput::TouchEnd { touches } => {
                engine.on_touch_end(touches, now);
            }
            ScriptInput::PageClick { x, y, in_menu } => {
                engine.page_click(Point::new(*x, *y), *in_menu);
            }
            ScriptInput::Submit { element, props } => {
                engine.submit_props(self.lookup(element)?, props.clone());
            }
            ScriptInput::Form { element, form } => {
                let menu = PropertyMenu::attach(engine, self.lookup(element)?);
                if !menu.submit(form) {
                    debug!(%element, "form had no valid fields");
                }
            }
            ScriptInput::Menu { element, action } => {
                let menu = PropertyMenu::attach(engine, self.lookup(element)?);
                menu.apply(*action);
            }
            ScriptInput::Add { element } => self.add(element),
            ScriptInput::Remove { element } => {
                let id = self.lookup(element)?;
                engine.remove_element(&id);
                self.keys.remove(element);
            }
            ScriptInput::Resize { element, width, height } => {
                engine.set_element_size(&self.lookup(element)?, Size::new(*width, *height));
            }
            ScriptInput::Surface { print_area, product_image } => {
                engine.set_product_image(*product_image);
                engine.set_print_area(*print_area);
            }
            ScriptInput::Container { x, y, width, height } => {
                engine.set_container(Container::new(Point::new(*x, *y), Size::new(*width, *height)));
            }
        }
        Ok(())
    }

    /// Deliver bus events and run a due bounds check.
    fn settle(&self, now: Instant) {
        self.engine.flush();
        self.engine.tick(now);
        self.engine.flush();
    }
}

/// Replay `script` and return the final state.
///
/// # Errors
///
/// Fails on an unknown element key or an invalid starting mockup.
pub async fn run(script: &Script, config: EngineConfig, pacing: Pacing) -> Result<Outcome, ReplayError> {
    let debounce = config.bounds_debounce;
    let mut session = Session { engine: Engine::new(config, CanvasBus::new()), keys: HashMap::new() };
    session.engine.set_container(script.container());
    session.engine.set_product_image(script.product_image);

    if let Some(mockup) = &script.mockup {
        let ids: Vec<ElementId> = mockup.elements.iter().map(|e| e.id).collect();
        session.engine.load_snapshot(mockup.clone())?;
        session.keys.extend(ids.into_iter().map(|id| (id.to_string(), id)));
    }
    // An explicit print area wins over the one saved with the mockup.
    if script.print_area.is_some() || script.mockup.is_none() {
        session.engine.set_print_area(script.print_area);
    }
    for decl in &script.elements {
        session.add(decl);
    }

    let mut clock = Clock::new(pacing);
    session.settle(clock.at(0).await);
    info!(steps = script.steps.len(), ?pacing, "replay started");
    for (index, step) in script.steps.iter().enumerate() {
        let now = clock.at(step.at_ms).await;
        debug!(index, at_ms = step.at_ms, input = ?step.input, "step");
        session.apply(&step.input, now)?;
        session.settle(now);
    }

    let wait = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
    let end = clock.at(script.duration_ms().saturating_add(wait)).await;
    session.settle(end);

    let outcome = Outcome {
        out_of_bounds: session.engine.out_of_bounds(),
        mockup: session.engine.snapshot(),
        keys: session.keys.into_iter().collect(),
    };
    info!(elements = outcome.mockup.elements.len(), out_of_bounds = outcome.out_of_bounds, "replay finished");
    Ok(outcome)
}
