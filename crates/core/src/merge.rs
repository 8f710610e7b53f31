//! Glyph-run merging
//!
//! The layer populator emits one positioned element per glyph, which breaks
//! natural selection and copy behavior. The merger reconstructs the visual
//! rows and, within each row, regroups runs of visually contiguous,
//! identically styled glyphs into single elements, synthesizing explicit
//! space characters where a sub-space-width gap is visually present but not
//! encoded as a character.

use crate::measure::Measure;
use crate::style;
use layer_model::{LayerContainer, LayerElement};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Order in which reconstructed rows are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrdering {
    /// Rows appear in the order their `top` key is first seen in the input
    SourceOrder,

    /// Rows sorted by the numeric value of their `top` key, smallest first
    ///
    /// Keys without a numeric prefix keep their source order, after all
    /// numeric rows.
    TopToBottom,
}

/// Summary of one merge pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// Glyph elements consumed
    pub glyphs: usize,

    /// Visual rows reconstructed
    pub rows: usize,

    /// Run elements emitted
    pub runs: usize,

    /// Space characters synthesized for sub-space-width gaps
    pub spaces_inserted: usize,
}

/// Merges per-glyph text-layer elements into per-run elements
///
/// Consumes a populated container and rewrites its children in place. Rows
/// are keyed by the exact `top` style string; within a row, glyphs merge
/// while their positioning-independent style signatures match and no gap
/// wider than one space separates them. Must run only after the host's
/// layout pass, since it reads rendered geometry through the injected
/// [`Measure`] capability.
pub struct RowMerger<M: Measure> {
    measure: M,
    ordering: RowOrdering,
}

impl<M: Measure> RowMerger<M> {
    /// Create a merger emitting rows in source order
    pub fn new(measure: M) -> Self {
        Self { measure, ordering: RowOrdering::SourceOrder }
    }

    /// Set the row emission order
    pub fn with_ordering(mut self, ordering: RowOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Get the row emission order
    pub fn ordering(&self) -> RowOrdering {
        self.ordering
    }

    /// Merge the container's glyph children into run elements
    ///
    /// The previous children are consumed; the replacement fragment is
    /// swapped in as a whole once every row has been merged. Every input
    /// character appears in the output in its original row and order; spaces
    /// may be added, never removed.
    pub fn merge(&self, container: &mut LayerContainer) -> MergeStats {
        let glyphs = std::mem::take(&mut container.children);
        let glyph_count = glyphs.len();

        // Arrange glyphs into rows keyed by the exact `top` string. Grouping
        // is stable: document order within a row is preserved, never sorted.
        let mut row_index: HashMap<Option<String>, usize> = HashMap::new();
        let mut rows: Vec<(Option<String>, Vec<LayerElement>)> = Vec::new();
        for glyph in glyphs {
            let key = glyph.top_key().map(str::to_owned);
            match row_index.get(&key) {
                Some(&index) => rows[index].1.push(glyph),
                None => {
                    row_index.insert(key.clone(), rows.len());
                    rows.push((key, vec![glyph]));
                }
            }
        }

        if self.ordering == RowOrdering::TopToBottom {
            rows.sort_by(|a, b| match (row_position(&a.0), row_position(&b.0)) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        let row_count = rows.len();
        let mut fragment = Vec::new();
        let mut spaces_inserted = 0;
        for (_, row) in rows {
            self.merge_row(row, &mut fragment, &mut spaces_inserted);
        }

        let stats = MergeStats {
            glyphs: glyph_count,
            rows: row_count,
            runs: fragment.len(),
            spaces_inserted,
        };
        container.children = fragment;

        debug!(
            glyphs = stats.glyphs,
            rows = stats.rows,
            runs = stats.runs,
            spaces_inserted = stats.spaces_inserted,
            "merged text layer"
        );
        stats
    }

    /// Merge one row of glyphs, appending the emitted runs to `fragment`
    fn merge_row(
        &self,
        row: Vec<LayerElement>,
        fragment: &mut Vec<LayerElement>,
        spaces_inserted: &mut usize,
    ) {
        let mut glyphs = row.into_iter();
        let Some(first) = glyphs.next() else {
            return;
        };

        // The open run keeps the full style of the glyph that opened it, so
        // the emitted element is positioned by its first glyph.
        let mut run = open_run(&first);
        run.text.push_str(&first.text);
        let mut prev_signature = style::signature(&first.style);
        let mut prev = first;

        for glyph in glyphs {
            let signature = style::signature(&glyph.style);
            if signature != prev_signature {
                fragment.push(std::mem::replace(&mut run, open_run(&glyph)));
            } else {
                let current_rect = self.measure.measure_bounding_box(&glyph);
                let prev_rect = self.measure.measure_bounding_box(&prev);
                let gap = current_rect.left - prev_rect.right;
                let space_width = self.measure.space_width(&glyph.style);

                if gap > space_width {
                    // Wider than a space: a tab or indent, not word spacing.
                    fragment.push(std::mem::replace(&mut run, open_run(&glyph)));
                } else if gap >= 1.0 {
                    run.text.push(' ');
                    *spaces_inserted += 1;
                }
            }

            run.text.push_str(&glyph.text);
            prev_signature = signature;
            prev = glyph;
        }

        fragment.push(run);
    }
}

/// A fresh run cloned from its opening glyph, text payload emptied
fn open_run(glyph: &LayerElement) -> LayerElement {
    LayerElement::new(glyph.style.clone(), "")
}

/// Numeric prefix of a row key (`"100.5px"` -> `100.5`)
fn row_position(key: &Option<String>) -> Option<f32> {
    let key = key.as_deref()?;
    let end = key
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.' && *c != '-' && *c != '+')
        .map(|(index, _)| index)
        .unwrap_or(key.len());
    key[..end].parse::<f32>().ok()
}
