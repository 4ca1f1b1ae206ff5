//! Per-collection reconciliation.
//!
//! For one collection pair: record-count comparison, index-count comparison,
//! and delegation to the document sampler for content comparison. Each step
//! is logged EQUAL/DIFF independently; the aggregate outcome is the
//! conjunction of all three.

mod types;

pub use types::ComparisonOutcome;

use tracing::{error, info};

use crate::cluster::{ClusterReader, CollectionRef, Namespace};
use crate::config::ComparisonPolicy;
use crate::error::Result;
use crate::sampler::{DocumentSampler, SampleStrategy};

/// Reconciles one collection pair at a time.
pub struct CollectionReconciler<'a> {
    source: &'a dyn ClusterReader,
    dest: &'a dyn ClusterReader,
    policy: &'a ComparisonPolicy,
    strategy: SampleStrategy,
}

impl<'a> CollectionReconciler<'a> {
    /// Create a reconciler with the sampling strategy already resolved for
    /// the enclosing database.
    pub fn new(
        source: &'a dyn ClusterReader,
        dest: &'a dyn ClusterReader,
        policy: &'a ComparisonPolicy,
        strategy: SampleStrategy,
    ) -> Self {
        Self {
            source,
            dest,
            policy,
            strategy,
        }
    }

    /// Measure one side of a collection pair.
    async fn measure(cluster: &dyn ClusterReader, ns: &Namespace) -> Result<CollectionRef> {
        let document_count = cluster.document_count(&ns.database, &ns.collection).await?;
        let index_count = cluster.index_count(&ns.database, &ns.collection).await?;
        Ok(CollectionRef {
            ns: ns.clone(),
            document_count,
            index_count,
        })
    }

    /// Record-count and index-count checks only.
    ///
    /// Returns a provisional outcome with no content check; the concurrent
    /// path records this entry at submission time and completes it at drain.
    pub async fn check_counts(&self, ns: &Namespace) -> Result<ComparisonOutcome> {
        let source = Self::measure(self.source, ns).await?;
        let dest = Self::measure(self.dest, ns).await?;

        if source.document_count == dest.document_count {
            info!(
                "EQUAL => collection [{}] record count matches: {}",
                ns, source.document_count
            );
        } else {
            error!(
                "DIFF => collection [{}] record count differs: source {}, destination {}",
                ns, source.document_count, dest.document_count
            );
        }

        // Only the number of index definitions is compared; sharded
        // deployments legitimately differ in low-level index structure.
        if source.index_count == dest.index_count {
            info!(
                "EQUAL => collection [{}] index count matches: {}",
                ns, source.index_count
            );
        } else {
            error!(
                "DIFF => collection [{}] index count differs: source {}, destination {}",
                ns, source.index_count, dest.index_count
            );
        }

        Ok(ComparisonOutcome {
            key: ns.to_string(),
            source_count: source.document_count,
            dest_count: dest.document_count,
            source_index_count: source.index_count,
            dest_index_count: dest.index_count,
            documents: None,
        })
    }

    /// Full reconciliation: counts, index counts, then content.
    ///
    /// With `continue_on_error` unset, a structural mismatch returns
    /// immediately without examining content; the unmatched outcome signals
    /// the database reconciler to stop the run.
    pub async fn reconcile(&self, ns: &Namespace) -> Result<ComparisonOutcome> {
        let mut outcome = self.check_counts(ns).await?;

        if !outcome.structure_matches() && !self.policy.continue_on_error {
            return Ok(outcome);
        }

        let sampler = DocumentSampler::new(self.source, self.dest, self.policy, self.strategy);
        let documents = sampler.sample_and_verify(ns, outcome.source_count).await?;

        if documents.matched {
            info!(
                "EQUAL => collection [{}] data comparison ok, checked {} of {} documents in {}s",
                ns, documents.checked, outcome.source_count, documents.elapsed_seconds
            );
        } else {
            error!(
                "DIFF => collection [{}] data comparison failed after {} documents ({}s)",
                ns, documents.checked, documents.elapsed_seconds
            );
        }

        outcome.documents = Some(documents);
        Ok(outcome)
    }
}
