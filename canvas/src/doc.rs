//! Element model: placed elements, their transforms, and the in-memory store.
//!
//! This module defines what sits on the canvas (`Element`, `ElementKind`),
//! the canonical transform (`Transform`), the sparse-update records used by
//! gestures and property menus (`TransformPatch`, `PropsPatch`), and the
//! runtime store that owns every live element (`ElementStore`).
//!
//! The store is the single source of truth for transforms. Anything drawn
//! on screen is a projection of it. Updates are sparse: a `None` field is a
//! no-op, while an explicit `Some(0.0)` always takes effect.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::consts::{
    DEFAULT_ANGLE, DEFAULT_SCALE, DEFAULT_X, DEFAULT_Y, SCALE_ROUND_DECIMALS, TEXT_BASE_FONT_SIZE,
    TEXT_DEFAULT_COLOR, TEXT_DEFAULT_FONT_FAMILY, TEXT_DEFAULT_FONT_WEIGHT,
};
use crate::geom::{Point, Rect, Size, rotated_bounds, round_to};

/// Unique identifier for a placed element.
pub type ElementId = Uuid;

/// Discriminant of [`ElementKind`], used for selection and per-kind limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Text,
    Sticker,
    PrintedImage,
}

impl ElementType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Sticker => "sticker",
            Self::PrintedImage => "printed-image",
        }
    }
}

/// Kind-specific payload. Opaque to the transform engine apart from the text
/// font size, which tracks scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    /// A block of text.
    Text {
        content: String,
        #[serde(default = "default_font_family")]
        font_family: String,
        #[serde(default = "default_font_weight")]
        font_weight: u16,
        #[serde(default = "default_color")]
        color: String,
        /// Rendered font size; always `scale × 24` rounded to 12 places.
        #[serde(default = "default_font_size")]
        font_size: f64,
    },
    /// A sticker drawn from the built-in asset set.
    Sticker { path: String },
    /// A user photo, optionally cropped.
    PrintedImage {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        crop: Option<Rect>,
    },
}

impl ElementKind {
    /// Text payload with the default font, weight and color.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            font_family: default_font_family(),
            font_weight: default_font_weight(),
            color: default_color(),
            font_size: default_font_size(),
        }
    }

    #[must_use]
    pub fn sticker(path: impl Into<String>) -> Self {
        Self::Sticker { path: path.into() }
    }

    #[must_use]
    pub fn printed_image(url: impl Into<String>) -> Self {
        Self::PrintedImage { url: url.into(), crop: None }
    }

    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Text { .. } => ElementType::Text,
            Self::Sticker { .. } => ElementType::Sticker,
            Self::PrintedImage { .. } => ElementType::PrintedImage,
        }
    }
}

fn default_font_family() -> String {
    TEXT_DEFAULT_FONT_FAMILY.to_owned()
}

fn default_font_weight() -> u16 {
    TEXT_DEFAULT_FONT_WEIGHT
}

fn default_color() -> String {
    TEXT_DEFAULT_COLOR.to_owned()
}

fn default_font_size() -> f64 {
    TEXT_BASE_FONT_SIZE
}

/// Canonical transform of an element.
///
/// `x`/`y` are the top-left offset of the element's layout frame in container
/// space. `angle` is in degrees and is never normalized. `scale` is uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { x: DEFAULT_X, y: DEFAULT_Y, angle: DEFAULT_ANGLE, scale: DEFAULT_SCALE }
    }
}

impl Transform {
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The angle folded into `[0, 360)`, for rendering only.
    #[must_use]
    pub fn normalized_angle(&self) -> f64 {
        self.angle.rem_euclid(360.0)
    }
}

/// Sparse update for a transform. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl TransformPatch {
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    #[must_use]
    pub fn angle(angle: f64) -> Self {
        Self { angle: Some(angle), ..Self::default() }
    }

    #[must_use]
    pub fn scale(scale: f64) -> Self {
        Self { scale: Some(scale), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.angle.is_none() && self.scale.is_none()
    }

    /// Apply present, finite fields to `transform`. Returns true if any field
    /// was written.
    pub fn apply_to(&self, transform: &mut Transform) -> bool {
        let mut written = false;
        for (slot, value) in [
            (&mut transform.x, self.x),
            (&mut transform.y, self.y),
            (&mut transform.angle, self.angle),
            (&mut transform.scale, self.scale),
        ] {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                *slot = v;
                written = true;
            }
        }
        written
    }
}

/// Property-menu submission. Every field is optional with the same
/// `None`-is-no-op rule as [`TransformPatch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropsPatch {
    #[serde(flatten)]
    pub transform: TransformPatch,
    /// Relative z-index change, normally `±zindex_step`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_delta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    /// Text only: converted to a scale of `font_size / 24`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

impl PropsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transform.is_empty()
            && self.z_delta.is_none()
            && self.color.is_none()
            && self.content.is_none()
            && self.font_family.is_none()
            && self.font_weight.is_none()
            && self.font_size.is_none()
    }
}

/// A placed element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub transform: Transform,
    /// Layout size before the transform is applied.
    pub size: Size,
}

impl Element {
    #[must_use]
    pub fn new(kind: ElementKind, size: Size, transform: Transform) -> Self {
        Self::with_id(Uuid::new_v4(), kind, size, transform)
    }

    /// Rebuild an element with a known id, e.g. from a saved mockup.
    #[must_use]
    pub fn with_id(id: ElementId, kind: ElementKind, size: Size, transform: Transform) -> Self {
        let mut element = Self { id, kind, transform, size };
        element.sync_font_size();
        element
    }

    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Untransformed layout frame in container space.
    #[must_use]
    pub fn frame(&self) -> Rect {
        Rect::new(self.transform.x, self.transform.y, self.size.width, self.size.height)
    }

    /// On-screen bounding box: the frame scaled and rotated about its center.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        rotated_bounds(self.frame(), self.transform.angle, self.transform.scale)
    }

    fn sync_font_size(&mut self) {
        let scale = self.transform.scale;
        if let ElementKind::Text { font_size, .. } = &mut self.kind {
            *font_size = round_to(scale * TEXT_BASE_FONT_SIZE, SCALE_ROUND_DECIMALS);
        }
    }
}

/// In-memory store of placed elements.
#[derive(Debug, Default)]
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
}

impl ElementStore {
    #[must_use]
    pub fn new() -> Self {
        Self { elements: HashMap::new() }
    }

    /// Insert or replace an element, returning the replaced one if any.
    pub fn insert(&mut self, element: Element) -> Option<Element> {
        debug!(id = %element.id, kind = element.element_type().as_str(), "element stored");
        self.elements.insert(element.id, element)
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let removed = self.elements.remove(id);
        if removed.is_some() {
            debug!(%id, "element removed");
        }
        removed
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Apply a sparse transform update. Returns false if the element doesn't
    /// exist or nothing was written.
    ///
    /// Text elements keep their font size in step with the new scale.
    pub fn set_transform(&mut self, id: &ElementId, patch: &TransformPatch) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        if !patch.apply_to(&mut element.transform) {
            return false;
        }
        if patch.scale.is_some() {
            element.sync_font_size();
        }
        true
    }

    /// Replace the layout size. Sizes must be finite and non-negative.
    pub fn set_size(&mut self, id: &ElementId, size: Size) -> bool {
        if !(size.width.is_finite() && size.height.is_finite() && size.width >= 0.0 && size.height >= 0.0) {
            return false;
        }
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        element.size = size;
        true
    }

    /// Apply the non-transform fields of a menu submission to a text
    /// payload. Returns true if anything changed. Other kinds ignore them.
    pub fn update_text(&mut self, id: &ElementId, props: &PropsPatch) -> bool {
        let Some(Element { kind: ElementKind::Text { content, font_family, font_weight, color, .. }, .. }) =
            self.elements.get_mut(id)
        else {
            return false;
        };
        let mut changed = false;
        if let Some(v) = &props.content {
            content.clone_from(v);
            changed = true;
        }
        if let Some(v) = &props.font_family {
            font_family.clone_from(v);
            changed = true;
        }
        if let Some(v) = props.font_weight {
            *font_weight = v;
            changed = true;
        }
        if let Some(v) = &props.color {
            color.clone_from(v);
            changed = true;
        }
        changed
    }

    /// Replace all elements.
    pub fn load(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        for element in elements {
            self.elements.insert(element.id, element);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
