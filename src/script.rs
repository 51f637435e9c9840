//! Replay scripts: a container, a print area, the starting elements and a
//! timed list of inputs.
//!
//! Elements are referred to by script-local keys so scripts never need to
//! know the ids the engine assigns.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::collections::HashSet;
use std::path::Path;

use canvas::doc::{ElementKind, PropsPatch};
use canvas::geom::{Container, Point, PrintAreaSpec, Rect, Size, initial_display_size};
use canvas::menu::{MenuAction, MenuForm};
use canvas::mockup::MockupSnapshot;
use serde::{Deserialize, Serialize};

use crate::replay::ReplayError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// The canvas container in client coordinates.
    pub container: Rect,
    #[serde(default)]
    pub print_area: Option<PrintAreaSpec>,
    /// Natural size of the product image the print area is anchored to.
    #[serde(default)]
    pub product_image: Option<Size>,
    /// A saved design to start from. Its elements are keyed by id.
    #[serde(default)]
    pub mockup: Option<MockupSnapshot>,
    #[serde(default)]
    pub elements: Vec<ElementDecl>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDecl {
    pub key: String,
    pub kind: ElementKind,
    pub size: Size,
    /// Top-left offset in the container. Centered when absent.
    #[serde(default)]
    pub position: Option<Point>,
}

impl ElementDecl {
    /// Layout size to add the element with. A printed image declares its
    /// natural size, which is capped to fit `container`.
    #[must_use]
    pub fn display_size(&self, container: Size) -> Size {
        match self.kind {
            ElementKind::PrintedImage { .. } => initial_display_size(self.size, container),
            ElementKind::Text { .. } | ElementKind::Sticker { .. } => self.size,
        }
    }
}

/// One input, fired `at_ms` after the script starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub input: ScriptInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum ScriptInput {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    PointerCancel,
    /// Every finger down after the change, in client coordinates.
    TouchStart { touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    TouchEnd { touches: Vec<Point> },
    PageClick {
        x: f64,
        y: f64,
        #[serde(default)]
        in_menu: bool,
    },
    /// Props submitted directly on the bus.
    Submit { element: String, props: PropsPatch },
    /// Raw menu input, validated the way a property menu does.
    Form { element: String, form: MenuForm },
    Menu { element: String, action: MenuAction },
    Add { element: ElementDecl },
    Remove { element: String },
    Resize { element: String, width: f64, height: f64 },
    /// Switch product surface.
    Surface {
        print_area: Option<PrintAreaSpec>,
        #[serde(default)]
        product_image: Option<Size>,
    },
    Container { x: f64, y: f64, width: f64, height: f64 },
}

impl Script {
    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// I/O and JSON errors, and duplicate element keys.
    pub async fn load(path: &Path) -> Result<Self, ReplayError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::parse(&raw)
    }

    /// # Errors
    ///
    /// JSON errors and duplicate element keys.
    pub fn parse(raw: &str) -> Result<Self, ReplayError> {
        let script: Self = serde_json::from_str(raw)?;
        script.validate()?;
        Ok(script)
    }

    /// Keys declared up front or added by a step must be unique.
    ///
    /// # Errors
    ///
    /// Returns the first repeated key.
    pub fn validate(&self) -> Result<(), ReplayError> {
        let mut seen = HashSet::new();
        let added = self.steps.iter().filter_map(|step| match &step.input {
            ScriptInput::Add { element } => Some(element),
            _ => None,
        });
        for decl in self.elements.iter().chain(added) {
            if !seen.insert(decl.key.as_str()) {
                return Err(ReplayError::DuplicateElement(decl.key.clone()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn container(&self) -> Container {
        container_from_rect(self.container)
    }

    /// Time of the last step.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.at_ms).max().unwrap_or(0)
    }
}

#[must_use]
pub fn container_from_rect(rect: Rect) -> Container {
    Container::new(Point::new(rect.x, rect.y), Size::new(rect.width, rect.height))
}
