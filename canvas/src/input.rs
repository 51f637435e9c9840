//! Input model: selection, the active-gesture state machine, and cursor hints.
//!
//! `Selection` is the single process-wide selected element. `InputState` is
//! the gesture being tracked between pointer-down and pointer-up; the
//! per-gesture numbers live in the element's controllers, so each variant
//! only records which element owns the pointer.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::{ElementId, ElementType};

/// The selected element and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub id: ElementId,
    pub kind: ElementType,
}

/// Cursor the host should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Rotating.
    Grabbing,
    /// Zooming with the handle.
    EwResize,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grabbing => "grabbing",
            Self::EwResize => "ew-resize",
        }
    }
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// At most one selected element at a time.
    pub selection: Option<Selection>,
    /// Last reported print-area warning state.
    pub out_of_bounds: bool,
    pub cursor: Cursor,
}

impl UiState {
    #[must_use]
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selection.is_some_and(|s| s.id == *id)
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<ElementId> {
        self.selection.map(|s| s.id)
    }
}

/// Gesture currently owning the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving an element with one pointer.
    Dragging { id: ElementId },
    /// Turning an element by its rotate handle.
    Rotating { id: ElementId },
    /// Resizing an element by its zoom handle.
    Zooming { id: ElementId },
    /// Scaling (and possibly turning) an element with two fingers.
    Pinching { id: ElementId },
}

impl InputState {
    /// Element the active gesture targets.
    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id } | Self::Rotating { id } | Self::Zooming { id } | Self::Pinching { id } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Cursor to show while this gesture runs.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        match self {
            Self::Rotating { .. } => Cursor::Grabbing,
            Self::Zooming { .. } => Cursor::EwResize,
            Self::Idle | Self::Dragging { .. } | Self::Pinching { .. } => Cursor::Default,
        }
    }
}
