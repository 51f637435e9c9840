//! Mockup snapshot: the serialized shape handed to cart/checkout.
//!
//! Each element is flattened to `{x, y, angle, scale, zIndex}` plus its
//! layout size and payload. Angles are written unwrapped, exactly as stored,
//! so with `serde_json`'s `float_roundtrip` feature a snapshot written and
//! read back restores every transform bit for bit.

#[cfg(test)]
#[path = "mockup_test.rs"]
mod mockup_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::doc::{Element, ElementId, ElementKind, ElementStore, Transform};
use crate::geom::{PrintAreaSpec, Size};
use crate::layers::{Layer, LayerManager};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SnapshotError {
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
    #[error("element {id} has a non-finite {field}")]
    NonFinite { id: ElementId, field: &'static str },
    #[error("element {id} has an invalid size {width}x{height}")]
    InvalidSize { id: ElementId, width: f64, height: f64 },
}

/// One element in a saved mockup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub scale: f64,
    pub z_index: i64,
    pub width: f64,
    pub height: f64,
}

impl ElementSnapshot {
    #[must_use]
    pub fn from_element(element: &Element, z_index: i64) -> Self {
        let t = element.transform;
        Self {
            id: element.id,
            kind: element.kind.clone(),
            x: t.x,
            y: t.y,
            angle: t.angle,
            scale: t.scale,
            z_index,
            width: element.size.width,
            height: element.size.height,
        }
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform { x: self.x, y: self.y, angle: self.angle, scale: self.scale }
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        for (field, value) in [("x", self.x), ("y", self.y), ("angle", self.angle), ("scale", self.scale)] {
            if !value.is_finite() {
                return Err(SnapshotError::NonFinite { id: self.id, field });
            }
        }
        if !(self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0) {
            return Err(SnapshotError::InvalidSize { id: self.id, width: self.width, height: self.height });
        }
        Ok(())
    }
}

/// A saved design: the active print area and every element, bottom to top.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_area: Option<PrintAreaSpec>,
    pub elements: Vec<ElementSnapshot>,
}

impl MockupSnapshot {
    /// Capture the store in layer order. Elements missing from the layer
    /// list are appended at `default_z`.
    #[must_use]
    pub fn capture(
        store: &ElementStore,
        layers: &LayerManager,
        print_area: Option<PrintAreaSpec>,
        default_z: i64,
    ) -> Self {
        let mut elements: Vec<ElementSnapshot> = layers
            .iter()
            .filter_map(|layer| store.get(&layer.element_id).map(|el| ElementSnapshot::from_element(el, layer.z_index)))
            .collect();
        let mut unlayered: Vec<ElementSnapshot> = store
            .iter()
            .filter(|el| layers.z_index(&el.id).is_none())
            .map(|el| ElementSnapshot::from_element(el, default_z))
            .collect();
        unlayered.sort_by_key(|s| s.id);
        elements.extend(unlayered);
        elements.sort_by_key(|s| s.z_index);
        Self { print_area, elements }
    }

    /// Check ids are unique and every number is usable.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for element in &self.elements {
            if !seen.insert(element.id) {
                return Err(SnapshotError::DuplicateId(element.id));
            }
            element.validate()?;
        }
        Ok(())
    }

    /// Split into store elements and layer entries.
    ///
    /// # Errors
    ///
    /// Same as [`MockupSnapshot::validate`].
    pub fn into_parts(self) -> Result<(Vec<Element>, Vec<Layer>), SnapshotError> {
        self.validate()?;
        let mut elements = Vec::with_capacity(self.elements.len());
        let mut layers = Vec::with_capacity(self.elements.len());
        for snap in self.elements {
            let transform = snap.transform();
            layers.push(Layer { element_id: snap.id, z_index: snap.z_index });
            elements.push(Element::with_id(snap.id, snap.kind, Size::new(snap.width, snap.height), transform));
        }
        Ok((elements, layers))
    }
}
