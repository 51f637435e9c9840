//! Property menus: form validation, display values and the bus participant
//! that keeps a menu in step with its element.
//!
//! Menus never write element state. A submission is validated into a
//! [`PropsPatch`] and emitted as `PropsSubmitted`; the engine applies it and
//! answers with `PropsSynced`, on which the menu re-reads the store. Fields
//! that fail validation are dropped from the patch rather than coerced, so
//! a typo in one box never zeroes a value.

#[cfg(test)]
#[path = "menu_test.rs"]
mod menu_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bus::{CanvasBus, CanvasEvent, EventName, HandlerId};
use crate::doc::{Element, ElementId, ElementKind, PropsPatch, TransformPatch};
use crate::engine::{Engine, EngineCore};

// =============================================================================
// FIELD VALIDATION
// =============================================================================

/// Numeric form fields, each with its own accepted syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Degrees; negatives allowed.
    Angle,
    /// Percent; `150` means scale 1.5.
    Scale,
    Position,
    FontSize,
}

static SIGNED: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static UNSIGNED: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static INTEGER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static COLOR: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn regex_match(cell: &'static OnceLock<Result<Regex, regex::Error>>, pattern: &str, raw: &str) -> bool {
    match cell.get_or_init(|| Regex::new(pattern)) {
        Ok(re) => re.is_match(raw),
        Err(_) => false,
    }
}

/// Parse a numeric field. Returns `None` for anything the field's syntax
/// rejects, including empty input.
#[must_use]
pub fn parse_field(raw: &str, kind: FieldKind) -> Option<f64> {
    let raw = raw.trim();
    let valid = match kind {
        FieldKind::Angle => regex_match(&SIGNED, r"^-?\d*\.?\d+$|^0$", raw),
        FieldKind::Scale | FieldKind::Position | FieldKind::FontSize => regex_match(&UNSIGNED, r"^\d+(\.\d+)?$", raw),
    };
    if !valid {
        return None;
    }
    let value: f64 = match raw.parse() {
        Ok(v) => v,
        Err(_) => return None,
    };
    match kind {
        FieldKind::Scale => Some(value / 100.0),
        _ => Some(value),
    }
}

fn parse_weight(raw: &str) -> Option<u16> {
    let raw = raw.trim();
    if !regex_match(&INTEGER, r"^\d+$", raw) {
        return None;
    }
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

/// `#rrggbb`, `#rgb` or a named color.
#[must_use]
pub fn is_valid_color(raw: &str) -> bool {
    regex_match(&COLOR, r"^#([0-9a-fA-F]{6}|[0-9a-fA-F]{3})$|^[a-zA-Z]+$", raw.trim())
}

// =============================================================================
// FORM
// =============================================================================

/// Raw text of a property menu's inputs. `None` means the field wasn't
/// touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuForm {
    pub x: Option<String>,
    pub y: Option<String>,
    pub angle: Option<String>,
    pub scale: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub font_family: Option<String>,
    pub color: Option<String>,
    pub content: Option<String>,
}

impl MenuForm {
    /// Validate every field into a patch. Invalid fields are left out.
    #[must_use]
    pub fn build_patch(&self) -> PropsPatch {
        let field = |raw: &Option<String>, kind| raw.as_deref().and_then(|s| parse_field(s, kind));
        PropsPatch {
            transform: TransformPatch {
                x: field(&self.x, FieldKind::Position),
                y: field(&self.y, FieldKind::Position),
                angle: field(&self.angle, FieldKind::Angle),
                scale: field(&self.scale, FieldKind::Scale),
            },
            z_delta: None,
            color: self.color.as_deref().filter(|c| is_valid_color(c)).map(|c| c.trim().to_owned()),
            content: self.content.clone(),
            font_family: self.font_family.as_deref().map(str::trim).filter(|f| !f.is_empty()).map(str::to_owned),
            font_weight: self.font_weight.as_deref().and_then(parse_weight),
            font_size: field(&self.font_size, FieldKind::FontSize),
        }
    }
}

/// Menu buttons that submit without a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    LayerUp,
    LayerDown,
}

impl MenuAction {
    #[must_use]
    pub fn to_patch(self, zindex_step: i64) -> PropsPatch {
        let z_delta = match self {
            Self::LayerUp => zindex_step,
            Self::LayerDown => -zindex_step,
        };
        PropsPatch { z_delta: Some(z_delta), ..PropsPatch::default() }
    }
}

// =============================================================================
// DISPLAY
// =============================================================================

/// Values a menu shows. Scale is a rounded percent; angle and position are
/// rounded to whole units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuDisplay {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub scale_percent: f64,
    pub z_index: Option<i64>,
    pub text: Option<TextDisplay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextDisplay {
    pub content: String,
    pub color: String,
    pub font_family: String,
    pub font_weight: u16,
    pub font_size: f64,
}

impl MenuDisplay {
    #[must_use]
    pub fn from_element(element: &Element, z_index: Option<i64>) -> Self {
        let t = element.transform;
        let text = match &element.kind {
            ElementKind::Text { content, font_family, font_weight, color, font_size } => Some(TextDisplay {
                content: content.clone(),
                color: color.clone(),
                font_family: font_family.clone(),
                font_weight: *font_weight,
                font_size: *font_size,
            }),
            ElementKind::Sticker { .. } | ElementKind::PrintedImage { .. } => None,
        };
        Self {
            x: t.x.round(),
            y: t.y.round(),
            angle: t.angle.round(),
            scale_percent: (t.scale * 100.0).round(),
            z_index,
            text,
        }
    }
}

// =============================================================================
// PROPERTY MENU
// =============================================================================

/// A menu bound to one element. It refreshes its display whenever the
/// engine reports the element synced, and submits through the bus.
pub struct PropertyMenu {
    element_id: ElementId,
    bus: CanvasBus,
    core: Weak<RefCell<EngineCore>>,
    display: Rc<RefCell<Option<MenuDisplay>>>,
    zindex_step: i64,
    subscription: Option<HandlerId>,
}

impl PropertyMenu {
    /// Open a menu for `element_id` and populate it from the store.
    #[must_use]
    pub fn attach(engine: &Engine, element_id: ElementId) -> Self {
        let core = engine.core_handle();
        let zindex_step = core.borrow().config.zindex_step;
        let weak = Rc::downgrade(&core);
        let display = Rc::new(RefCell::new(read_display(&weak, &element_id)));

        let bus = engine.bus().clone();
        let handler_core = Weak::clone(&weak);
        let handler_display = Rc::clone(&display);
        let subscription = bus.on(EventName::PropsSynced, move |event| {
            if let CanvasEvent::PropsSynced { id } = event {
                if *id == element_id {
                    *handler_display.borrow_mut() = read_display(&handler_core, id);
                    trace!(%id, "menu synced");
                }
            }
        });
        debug!(%element_id, "menu attached");

        Self { element_id, bus, core: weak, display, zindex_step, subscription: Some(subscription) }
    }

    #[must_use]
    pub fn element_id(&self) -> ElementId {
        self.element_id
    }

    /// Last displayed values. `None` once the element is gone.
    #[must_use]
    pub fn display(&self) -> Option<MenuDisplay> {
        self.display.borrow().clone()
    }

    /// Re-read the store now, without waiting for a sync event.
    pub fn refresh(&self) {
        *self.display.borrow_mut() = read_display(&self.core, &self.element_id);
    }

    /// Validate `form` and submit whatever survived. Returns false when
    /// nothing did.
    pub fn submit(&self, form: &MenuForm) -> bool {
        self.submit_patch(form.build_patch())
    }

    pub fn apply(&self, action: MenuAction) -> bool {
        self.submit_patch(action.to_patch(self.zindex_step))
    }

    fn submit_patch(&self, props: PropsPatch) -> bool {
        if props.is_empty() {
            return false;
        }
        self.bus.emit(CanvasEvent::PropsSubmitted { id: self.element_id, props });
        true
    }

    /// Stop listening for syncs. The display keeps its last values.
    pub fn detach(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.bus.off(EventName::PropsSynced, Some(id));
            debug!(element_id = %self.element_id, "menu detached");
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for PropertyMenu {
    fn drop(&mut self) {
        self.detach();
    }
}

fn read_display(core: &Weak<RefCell<EngineCore>>, id: &ElementId) -> Option<MenuDisplay> {
    let core = core.upgrade()?;
    let core = match core.try_borrow() {
        Ok(core) => core,
        Err(_) => return None,
    };
    core.element(id).map(|el| MenuDisplay::from_element(el, core.z_index(id)))
}
