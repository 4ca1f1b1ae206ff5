//! Outcome types for collection reconciliation.

use serde::{Deserialize, Serialize};

use crate::sampler::DocumentCheckOutcome;

/// Terminal record of one collection pair's reconciliation.
///
/// Created by the collection reconciler and never mutated after the content
/// check completes; the coordinator and aggregator only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    /// Collection key, `database.collection`.
    pub key: String,
    /// Document count on the source.
    pub source_count: u64,
    /// Document count on the destination.
    pub dest_count: u64,
    /// Index definitions on the source.
    pub source_index_count: u64,
    /// Index definitions on the destination.
    pub dest_index_count: u64,
    /// Content check result. `None` while the check is queued, or when it
    /// failed at the task level and the outcome is indeterminate.
    pub documents: Option<DocumentCheckOutcome>,
}

impl ComparisonOutcome {
    /// Whether the record counts are equal.
    pub fn counts_match(&self) -> bool {
        self.source_count == self.dest_count
    }

    /// Whether the index counts are equal.
    pub fn indexes_match(&self) -> bool {
        self.source_index_count == self.dest_index_count
    }

    /// Whether both structural checks passed.
    pub fn structure_matches(&self) -> bool {
        self.counts_match() && self.indexes_match()
    }

    /// Conjunction of all three checks. An indeterminate content check never
    /// counts as matched.
    pub fn matched(&self) -> bool {
        self.structure_matches() && self.documents.as_ref().is_some_and(|d| d.matched)
    }

    /// Documents examined by the content check.
    pub fn checked_documents(&self) -> u64 {
        self.documents.as_ref().map_or(0, |d| d.checked)
    }

    /// Fraction of the source collection examined, as a percentage.
    pub fn checked_ratio(&self) -> f64 {
        if self.source_count == 0 {
            100.0
        } else {
            self.checked_documents() as f64 * 100.0 / self.source_count as f64
        }
    }
}
