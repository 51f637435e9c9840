//! Layer manager: z-ordering of placed elements.
//!
//! The list is held behind an `Arc<[Layer]>` and rebuilt on every mutation,
//! so a snapshot taken before a change is never affected by it. Entries are
//! kept sorted ascending by z-index; ties keep insertion order.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::doc::ElementId;

/// One entry in the layer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub element_id: ElementId,
    pub z_index: i64,
}

#[derive(Debug, Clone)]
pub struct LayerManager {
    layers: Arc<[Layer]>,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerManager {
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Arc::from(Vec::new()) }
    }

    /// Add an element at `z_index`. Adding an id that is already present
    /// does nothing and returns false.
    pub fn add(&mut self, element_id: ElementId, z_index: i64) -> bool {
        if self.position(&element_id).is_some() {
            return false;
        }
        let mut next = self.layers.to_vec();
        next.push(Layer { element_id, z_index });
        self.replace(next);
        debug!(%element_id, z_index, "layer added");
        true
    }

    /// Remove every listed id. Unknown ids are ignored. Returns the number
    /// removed.
    pub fn remove(&mut self, ids: &[ElementId]) -> usize {
        let next: Vec<Layer> = self.layers.iter().filter(|l| !ids.contains(&l.element_id)).copied().collect();
        let removed = self.layers.len() - next.len();
        if removed > 0 {
            self.replace(next);
        }
        removed
    }

    /// Shift an element's z-index by `delta`. An unknown element is added
    /// at `default_z + delta`. Returns the resulting z-index.
    pub fn shift(&mut self, element_id: ElementId, delta: i64, default_z: i64) -> i64 {
        let mut next = self.layers.to_vec();
        let z_index = if let Some(layer) = next.iter_mut().find(|l| l.element_id == element_id) {
            layer.z_index = layer.z_index.saturating_add(delta);
            layer.z_index
        } else {
            let z_index = default_z.saturating_add(delta);
            next.push(Layer { element_id, z_index });
            z_index
        };
        self.replace(next);
        debug!(%element_id, delta, z_index, "layer shifted");
        z_index
    }

    /// Replace the whole list.
    pub fn load(&mut self, layers: Vec<Layer>) {
        self.replace(layers);
    }

    #[must_use]
    pub fn z_index(&self, element_id: &ElementId) -> Option<i64> {
        self.layers.iter().find(|l| l.element_id == *element_id).map(|l| l.z_index)
    }

    /// Current list, sorted ascending by z-index. Cheap to clone; later
    /// mutations do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[Layer]> {
        Arc::clone(&self.layers)
    }

    /// Iterate bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> {
        self.layers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn position(&self, element_id: &ElementId) -> Option<usize> {
        self.layers.iter().position(|l| l.element_id == *element_id)
    }

    fn replace(&mut self, mut next: Vec<Layer>) {
        next.sort_by_key(|l| l.z_index);
        self.layers = Arc::from(next);
    }
}
