//! Shared data model for the selectable text layer
//!
//! A rendered PDF page carries an invisible text layer: a container of
//! absolutely positioned leaf elements, each holding a raw inline style
//! declaration and a short text payload. This crate defines that model plus
//! the opaque descriptors the layer populator consumes.

use serde::{Deserialize, Serialize};

/// Unique identifier for a text-layer container
pub type LayerId = uuid::Uuid;

/// Rendered bounding box in layer coordinates (CSS-like, top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl LayerRect {
    /// Create a new rectangle from its edges
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Width of the rectangle
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the rectangle
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Check if this rectangle contains a point
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Check if this rectangle overlaps with another
    pub fn overlaps(&self, other: &LayerRect) -> bool {
        !(self.right < other.left
            || other.right < self.left
            || self.bottom < other.top
            || other.bottom < self.top)
    }
}

/// One leaf of the text layer
///
/// Carries the raw inline style declaration exactly as the layer populator
/// emitted it (e.g. `"left:10px; top:100px; font-size:12px;"`) and a text
/// payload of one or more characters. The style is never parsed into a
/// structured form; row grouping and run merging are defined on the raw
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerElement {
    /// Inline style declaration string
    pub style: String,

    /// Text payload
    pub text: String,
}

impl LayerElement {
    /// Create a new element
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self { style: style.into(), text: text.into() }
    }

    /// The raw value of the `top:` declaration, used as the exact-string row
    /// key. `None` when the declaration carries no `top:` token.
    pub fn top_key(&self) -> Option<&str> {
        self.style.split(';').find_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            if name.trim() == "top" {
                Some(value.trim())
            } else {
                None
            }
        })
    }
}

/// The text-layer container owned by the host page
///
/// The populator appends children; the merger replaces the whole child
/// vector in one assignment, so an observer never sees a half-merged layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerContainer {
    /// Leaf elements in document order
    pub children: Vec<LayerElement>,
}

impl LayerContainer {
    /// Create a new empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child element
    pub fn push(&mut self, element: LayerElement) {
        self.children.push(element);
    }

    /// Number of child elements
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the container has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Remove all children
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Concatenated text of all children, in document order
    ///
    /// This is what a select-all-and-copy over the layer yields.
    pub fn text(&self) -> String {
        self.children.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Page viewport descriptor
///
/// Opaque to the merger; passed through to the layer populator unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Render scale relative to 72 dpi page space
    pub scale: f32,

    /// Page rotation in degrees
    pub rotation: f32,

    /// Viewport width in CSS pixels
    pub width: f32,

    /// Viewport height in CSS pixels
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0, rotation: 0.0, width: 612.0, height: 792.0 }
    }
}

/// One extracted text fragment as produced by the PDF text extractor
///
/// Opaque to the merger; the layer populator turns items into positioned
/// [`LayerElement`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    /// Fragment text
    pub text: String,

    /// Text-space transform (a, b, c, d, e, f)
    pub transform: [f32; 6],

    /// Advance width in text space
    pub width: f32,

    /// Line height in text space
    pub height: f32,

    /// Resource name of the font, when known
    #[serde(default)]
    pub font_name: Option<String>,
}

/// Extracted text for one page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextContent {
    /// Extracted fragments in reading order
    pub items: Vec<TextItem>,
}

impl TextContent {
    /// Create an empty text content descriptor
    pub fn new() -> Self {
        Self::default()
    }
}
