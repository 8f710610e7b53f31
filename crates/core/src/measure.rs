//! Geometry measurement capability
//!
//! The merger never touches a live rendering surface. All geometry reads go
//! through this trait, making the merge pass a pure function of the
//! populated container and an injected measurement source.

use layer_model::{LayerElement, LayerRect};

/// Source of rendered geometry for text-layer elements
pub trait Measure {
    /// Rendered bounding box of one positioned element
    fn measure_bounding_box(&self, element: &LayerElement) -> LayerRect;

    /// Rendered advance width of `text` laid out under `style`
    ///
    /// Positioning tokens in `style` are irrelevant to the result.
    fn measure_width(&self, style: &str, text: &str) -> f32;

    /// Rendered width of a single non-breaking space under `style`
    ///
    /// This is the gap-classification threshold: a same-style gap wider than
    /// one space is a deliberate break, a narrower one is inter-word spacing.
    fn space_width(&self, style: &str) -> f32 {
        self.measure_width(style, "\u{a0}")
    }
}

/// Deterministic measurement source with a constant per-character advance
///
/// Reads the element's own `left:`/`top:` tokens for the box origin and
/// charges a fixed advance per character. Suitable for hosts without live
/// font metrics and for unit tests; it is not a layout engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceMeasure {
    /// Advance per character in CSS pixels
    pub advance: f32,

    /// Line height in CSS pixels
    pub line_height: f32,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        // 0.6em at a 12px font, a conservative estimate for proportional
        // fonts.
        Self { advance: 7.2, line_height: 12.0 }
    }
}

impl FixedAdvanceMeasure {
    /// Create a measure with the given advance and line height
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self { advance, line_height }
    }
}

impl Measure for FixedAdvanceMeasure {
    fn measure_bounding_box(&self, element: &LayerElement) -> LayerRect {
        let left = px_value(&element.style, "left");
        let top = px_value(&element.style, "top");
        let width = self.measure_width(&element.style, &element.text);
        LayerRect::new(left, top, left + width, top + self.line_height)
    }

    fn measure_width(&self, _style: &str, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }
}

/// Numeric value of a `<name>:<number>px` declaration, 0.0 when absent or
/// malformed (the default a geometry query yields for unstyled elements).
fn px_value(style: &str, name: &str) -> f32 {
    style
        .split(';')
        .find_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            if key.trim() != name {
                return None;
            }
            value.trim().strip_suffix("px")?.trim().parse::<f32>().ok()
        })
        .unwrap_or(0.0)
}
