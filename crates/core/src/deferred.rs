//! Deferred merge-pass scheduling
//!
//! The merger reads rendered geometry, which is only stable once the host's
//! layout pass has run over the freshly populated container. Hosts that
//! cannot merge inside the render call queue a merge job here and drain the
//! queue after layout settles. Exactly one merge pass runs per populated
//! container; there is no cancellation and no reentrancy guard.

use crate::merge::RowOrdering;
use layer_model::LayerId;

/// One pending merge pass for one populated container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeJob {
    /// Container the pass applies to
    pub layer_id: LayerId,

    /// 0-based page index the container was populated for
    pub page_index: u32,
}

impl MergeJob {
    /// Create a new merge job
    pub fn new(layer_id: LayerId, page_index: u32) -> Self {
        Self { layer_id, page_index }
    }
}

/// Configuration for text-layer rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayerConfig {
    /// Order in which reconstructed rows are emitted
    pub row_ordering: RowOrdering,

    /// Whether to merge inside the render call instead of queueing a job
    ///
    /// Only safe when the host's geometry is already stable at render time.
    pub run_immediately: bool,
}

impl Default for TextLayerConfig {
    fn default() -> Self {
        Self {
            row_ordering: RowOrdering::SourceOrder,
            run_immediately: false, // Wait for the host's layout pass
        }
    }
}

impl TextLayerConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row emission order
    pub fn with_row_ordering(mut self, row_ordering: RowOrdering) -> Self {
        self.row_ordering = row_ordering;
        self
    }

    /// Set whether to merge inside the render call
    pub fn with_run_immediately(mut self, run_immediately: bool) -> Self {
        self.run_immediately = run_immediately;
        self
    }
}

/// FIFO queue of pending merge passes
#[derive(Debug, Default)]
pub struct MergeScheduler {
    pending: Vec<MergeJob>,
}

impl MergeScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Queue a merge pass
    ///
    /// A layer that is already queued keeps its original job, so repeated
    /// renders of the same container still produce one merge pass. Returns
    /// whether the job was queued.
    pub fn schedule(&mut self, job: MergeJob) -> bool {
        if self.pending.iter().any(|pending| pending.layer_id == job.layer_id) {
            return false;
        }
        self.pending.push(job);
        true
    }

    /// Check if any jobs are queued
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of queued jobs
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drain all queued jobs, oldest first
    pub fn take_pending(&mut self) -> Vec<MergeJob> {
        std::mem::take(&mut self.pending)
    }
}
