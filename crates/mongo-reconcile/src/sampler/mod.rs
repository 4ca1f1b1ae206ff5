//! Document sampling and content verification.
//!
//! Given a collection pair, the sampler decides how many documents to
//! examine, which documents to pick, and how to walk a large collection
//! without expensive random-skip operations. Two strategies exist: engines
//! with a native random-sample primitive get O(1)-per-batch sampling;
//! legacy engines get a windowed skip/limit walk whose skip offsets are
//! bounded by a fixed ceiling so they never degrade with absolute position.

mod compare;

pub use compare::{documents_equal, values_equal};

use std::time::Instant;

use futures::TryStreamExt;
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::cluster::{ClusterReader, EngineVersion, FindOptions, Namespace};
use crate::config::{CompareMode, ComparisonPolicy};
use crate::error::Result;

/// Skip offsets above this degrade linearly on legacy engines; the windowed
/// walk restarts the query by identifier instead of skipping past it.
pub const LARGE_SKIP_CEILING: u64 = 10_000;

/// How documents are picked from the source collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStrategy {
    /// The engine's native random-sample primitive.
    Native,
    /// Windowed skip/limit pagination for engines without one.
    Windowed,
}

impl SampleStrategy {
    /// Select the strategy for an engine version, once per database.
    pub fn select(version: EngineVersion, threshold: u32) -> Self {
        if version.value() >= threshold {
            SampleStrategy::Native
        } else {
            SampleStrategy::Windowed
        }
    }
}

/// Result fragment of one collection's content check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCheckOutcome {
    /// Whether every checked document had an identical destination
    /// counterpart.
    pub matched: bool,
    /// Documents checked before the check completed or short-circuited.
    pub checked: u64,
    /// Wall-clock seconds spent on the check.
    pub elapsed_seconds: u64,
    /// The first mismatched pair, if any.
    pub mismatch: Option<MismatchDetail>,
}

impl DocumentCheckOutcome {
    fn clean(checked: u64, start: Instant) -> Self {
        Self {
            matched: true,
            checked,
            elapsed_seconds: start.elapsed().as_secs(),
            mismatch: None,
        }
    }

    fn failed(checked: u64, start: Instant, mismatch: MismatchDetail) -> Self {
        Self {
            matched: false,
            checked,
            elapsed_seconds: start.elapsed().as_secs(),
            mismatch: Some(mismatch),
        }
    }
}

/// The first mismatched document pair found in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MismatchDetail {
    /// Identifier of the offending document.
    pub id: Bson,
    /// The source-side document.
    pub source_document: Document,
    /// The destination-side document, or `None` if missing entirely.
    pub destination_document: Option<Document>,
}

/// Windowed pagination parameters for one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    /// Number of windows to walk.
    pub window_count: u64,
    /// Documents taken per window.
    pub batch_size: u64,
    /// Documents skipped at the start of each window after the first.
    pub stride_rows: u64,
}

impl WindowPlan {
    /// Compute the walk parameters.
    ///
    /// `stride_rows` is capped at [`LARGE_SKIP_CEILING`]: when the natural
    /// stride would exceed it, the collection is instead divided into
    /// ceiling-sized windows and the per-window batch grows to keep the
    /// total sampled count at the target.
    pub fn compute(source_count: u64, target: u64, batch_size: u64) -> Self {
        let step_factor = source_count / target.max(1);
        let stride_rows = batch_size * step_factor;

        if stride_rows > LARGE_SKIP_CEILING {
            let window_count = (source_count / LARGE_SKIP_CEILING).max(1);
            Self {
                window_count,
                batch_size: target.div_ceil(window_count) + 1,
                stride_rows: LARGE_SKIP_CEILING,
            }
        } else {
            Self {
                window_count: (target / batch_size).max(1),
                batch_size,
                stride_rows,
            }
        }
    }
}

/// Logs progress at a fixed checked-count interval.
struct ProgressTicker {
    interval: u64,
    next: u64,
}

impl ProgressTicker {
    fn new(batch_size: u64) -> Self {
        let interval = (batch_size * 25).max(1);
        Self {
            interval,
            next: interval,
        }
    }

    fn tick(&mut self, ns: &Namespace, checked: u64, target: u64) {
        if checked >= self.next {
            info!(
                "[{}] checked {}/{} documents ({:.2}%)",
                ns,
                checked,
                target,
                checked as f64 * 100.0 / target.max(1) as f64
            );
            self.next += self.interval;
        }
    }
}

/// Verifies sampled source documents against their destination counterparts.
pub struct DocumentSampler<'a> {
    source: &'a dyn ClusterReader,
    dest: &'a dyn ClusterReader,
    policy: &'a ComparisonPolicy,
    strategy: SampleStrategy,
}

impl<'a> DocumentSampler<'a> {
    /// Create a sampler with a strategy already selected for the database.
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

    /// Target sample size for a collection of `source_count` documents.
    pub fn target_size(policy: &ComparisonPolicy, source_count: u64) -> u64 {
        match policy.mode {
            CompareMode::None => 0,
            CompareMode::Sample => {
                if policy.check_percent > 0.0 && policy.check_percent <= 100.0 {
                    (source_count as f64 * policy.check_percent / 100.0).floor() as u64
                } else {
                    policy.target_count.min(source_count)
                }
            }
            CompareMode::Full => source_count,
        }
    }

    /// Select and verify a bounded sequence of documents.
    ///
    /// Short-circuits on the first content mismatch; later documents in the
    /// collection are never examined.
    pub async fn sample_and_verify(
        &self,
        ns: &Namespace,
        source_count: u64,
    ) -> Result<DocumentCheckOutcome> {
        let start = Instant::now();
        let target = Self::target_size(self.policy, source_count);

        if target == 0 {
            return Ok(DocumentCheckOutcome::clean(0, start));
        }

        // Spot-check the newest documents first; divergence from an
        // interrupted sync usually shows up at the tail.
        if self.policy.latest_size > 0 {
            if let Some(outcome) = self.check_latest(ns, start).await? {
                return Ok(outcome);
            }
        }

        if target < self.policy.full_scan_threshold {
            return self.full_scan(ns, start).await;
        }

        match self.strategy {
            SampleStrategy::Native => self.native_sample(ns, target, start).await,
            SampleStrategy::Windowed => {
                self.windowed_sample(ns, source_count, target, start).await
            }
        }
    }

    /// Look up one source document on the destination and compare.
    async fn verify_document(
        &self,
        ns: &Namespace,
        doc: &Document,
    ) -> Result<Option<MismatchDetail>> {
        let id = doc.get("_id").cloned().unwrap_or(Bson::Null);
        let migrated = self
            .dest
            .find_by_id(&ns.database, &ns.collection, &id)
            .await?;

        match migrated {
            Some(ref found) if documents_equal(doc, found) => Ok(None),
            other => {
                error!(
                    "DIFF => [{}] document {:?} differs: source {:?}, destination {:?}",
                    ns, id, doc, other
                );
                Ok(Some(MismatchDetail {
                    id,
                    source_document: doc.clone(),
                    destination_document: other,
                }))
            }
        }
    }

    /// Verify the `latest_size` most-recently-inserted documents.
    ///
    /// Returns `Some` only on mismatch; a clean pre-pass does not count
    /// toward the sampled total (the same documents may be picked again).
    async fn check_latest(
        &self,
        ns: &Namespace,
        start: Instant,
    ) -> Result<Option<DocumentCheckOutcome>> {
        debug!("[{}] verifying latest {} documents", ns, self.policy.latest_size);
        let mut stream = self
            .source
            .find(
                &ns.database,
                &ns.collection,
                FindOptions::latest(self.policy.latest_size),
            )
            .await?;

        let mut checked = 0u64;
        while let Some(doc) = stream.try_next().await? {
            checked += 1;
            if let Some(mismatch) = self.verify_document(ns, &doc).await? {
                return Ok(Some(DocumentCheckOutcome::failed(checked, start, mismatch)));
            }
        }
        Ok(None)
    }

    /// Verify every document in the source collection.
    async fn full_scan(&self, ns: &Namespace, start: Instant) -> Result<DocumentCheckOutcome> {
        debug!("[{}] target below full-scan threshold, scanning exhaustively", ns);
        let mut stream = self
            .source
            .find(&ns.database, &ns.collection, FindOptions::all())
            .await?;

        let mut checked = 0u64;
        while let Some(doc) = stream.try_next().await? {
            checked += 1;
            if let Some(mismatch) = self.verify_document(ns, &doc).await? {
                return Ok(DocumentCheckOutcome::failed(checked, start, mismatch));
            }
        }
        Ok(DocumentCheckOutcome::clean(checked, start))
    }

    /// Random batches via the engine's sampling primitive.
    async fn native_sample(
        &self,
        ns: &Namespace,
        target: u64,
        start: Instant,
    ) -> Result<DocumentCheckOutcome> {
        let mut checked = 0u64;
        let mut progress = ProgressTicker::new(self.policy.batch_size);

        while checked < target {
            let take = self.policy.batch_size.min(target - checked);
            let mut stream = self
                .source
                .sample_random(&ns.database, &ns.collection, take)
                .await?;

            let mut fetched = 0u64;
            while let Some(doc) = stream.try_next().await? {
                fetched += 1;
                checked += 1;
                if let Some(mismatch) = self.verify_document(ns, &doc).await? {
                    return Ok(DocumentCheckOutcome::failed(checked, start, mismatch));
                }
                progress.tick(ns, checked, target);
            }

            // Collection shrank under us; nothing more to sample.
            if fetched == 0 {
                break;
            }
        }

        Ok(DocumentCheckOutcome::clean(checked, start))
    }

    /// Windowed skip/limit walk for engines without native sampling.
    ///
    /// Window 0 starts at offset 0; every later window restarts the query at
    /// the last seen identifier and skips `stride_rows`, so no single skip
    /// ever exceeds [`LARGE_SKIP_CEILING`].
    async fn windowed_sample(
        &self,
        ns: &Namespace,
        source_count: u64,
        target: u64,
        start: Instant,
    ) -> Result<DocumentCheckOutcome> {
        let plan = WindowPlan::compute(source_count, target, self.policy.batch_size);
        info!(
            "[{}] windowed sampling: {} windows, batch {}, stride {}",
            ns, plan.window_count, plan.batch_size, plan.stride_rows
        );

        let mut checked = 0u64;
        let mut last_id: Option<Bson> = None;
        let mut progress = ProgressTicker::new(self.policy.batch_size);

        for window in 0..plan.window_count {
            let skip = if window == 0 { 0 } else { plan.stride_rows };
            let mut stream = self
                .source
                .find(
                    &ns.database,
                    &ns.collection,
                    FindOptions::window(last_id.clone(), skip, plan.batch_size),
                )
                .await?;

            let mut fetched = 0u64;
            while let Some(doc) = stream.try_next().await? {
                fetched += 1;
                checked += 1;
                last_id = doc.get("_id").cloned();
                if let Some(mismatch) = self.verify_document(ns, &doc).await? {
                    return Ok(DocumentCheckOutcome::failed(checked, start, mismatch));
                }
                progress.tick(ns, checked, target);
            }

            // Short window means the collection is exhausted.
            if fetched < plan.batch_size || checked >= target {
                break;
            }
        }

        Ok(DocumentCheckOutcome::clean(checked, start))
    }
}
