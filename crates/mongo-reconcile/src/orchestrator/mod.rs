//! Database-level reconciliation workflow.
//!
//! Enumerates databases and collections on both sides, applies the policy's
//! include/exclude filters, resolves the sampling strategy once per
//! database, and drives one collection reconciliation per surviving pair,
//! inline or through the bounded-concurrency coordinator.

mod coordinator;

pub use coordinator::ReconcileCoordinator;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cluster::{ClusterReader, EngineVersion, Namespace};
use crate::config::ComparisonPolicy;
use crate::error::Result;
use crate::reconcile::CollectionReconciler;
use crate::report::ReconciliationReport;
use crate::sampler::{DocumentSampler, SampleStrategy};

/// Reconciles every collection pair across two clusters.
pub struct Reconciler {
    source: Arc<dyn ClusterReader>,
    dest: Arc<dyn ClusterReader>,
    policy: Arc<ComparisonPolicy>,
}

impl Reconciler {
    /// Create a reconciler over two connected clusters.
    pub fn new(
        source: Arc<dyn ClusterReader>,
        dest: Arc<dyn ClusterReader>,
        policy: ComparisonPolicy,
    ) -> Self {
        Self {
            source,
            dest,
            policy: Arc::new(policy),
        }
    }

    /// Run the full reconciliation and return the aggregated report.
    ///
    /// With `continue_on_error` unset, the first divergence stops further
    /// enumeration; results collected up to that point are kept and the
    /// partial report is still returned.
    pub async fn run(&self) -> Result<ReconciliationReport> {
        let policy = &self.policy;
        let mut report = ReconciliationReport::new();

        info!("Comparing source and destination cluster metadata");
        let source_dbs = self.filtered_databases(self.source.as_ref()).await?;
        let dest_dbs = self.filtered_databases(self.dest.as_ref()).await?;

        if source_dbs.len() != dest_dbs.len() {
            error!(
                "DIFF => database count differs: source {} {:?}, destination {} {:?}",
                source_dbs.len(),
                source_dbs,
                dest_dbs.len(),
                dest_dbs
            );
            if policy.included_databases.is_empty() {
                report.record_database_count_mismatch(source_dbs.clone(), dest_dbs.clone());
                if !policy.continue_on_error {
                    return Ok(report);
                }
            } else {
                info!(
                    "Restricting the run to the included databases: {:?}",
                    policy.included_databases
                );
            }
        } else {
            info!("EQUAL => database count matches: {}", source_dbs.len());
        }

        let working_set: Vec<String> = if policy.included_databases.is_empty() {
            source_dbs
        } else {
            policy.included_databases.clone()
        };

        let mut coordinator = (policy.threads > 1).then(|| ReconcileCoordinator::new(policy.threads));

        'databases: for db in &working_set {
            if !dest_dbs.contains(db) {
                let collections = self.source.collection_names(db).await?;
                error!("DIFF => database [{}] only exists on source", db);
                report.record_missing_database(db.clone(), collections);
                if !policy.continue_on_error {
                    break;
                }
                continue;
            }

            // One version probe per database; every collection in it shares
            // the resulting strategy.
            let raw_version = self.source.engine_version(db).await?;
            let version = EngineVersion::parse(&raw_version)?;
            let strategy = SampleStrategy::select(version, policy.sample_version_threshold);
            debug!(
                "[{}] engine version {} (normalized {}) -> {:?} sampling",
                db, raw_version, version, strategy
            );

            let source_colls = self.filtered_collections(self.source.as_ref(), db).await?;
            let dest_colls = self.filtered_collections(self.dest.as_ref(), db).await?;

            // A count divergence is fatal, but only after the walk below has
            // had the chance to record which collections are missing.
            let collection_count_diverged = source_colls.len() != dest_colls.len();
            if collection_count_diverged {
                error!(
                    "DIFF => database [{}] collection count differs: source {:?}, destination {:?}",
                    db, source_colls, dest_colls
                );
                report.record_collection_count_mismatch(
                    db.clone(),
                    source_colls.clone(),
                    dest_colls.clone(),
                );
            } else {
                info!(
                    "EQUAL => database [{}] collection count matches: {}",
                    db,
                    source_colls.len()
                );
            }

            for coll in &source_colls {
                if !dest_colls.contains(coll) {
                    let count = self.source.document_count(db, coll).await?;
                    error!("DIFF => collection [{}.{}] only exists on source", db, coll);
                    report.record_missing_collection(Namespace::new(db.clone(), coll.clone()), count);
                    if !policy.continue_on_error {
                        break 'databases;
                    }
                    continue;
                }

                let ns = Namespace::new(db.clone(), coll.clone());
                let reconciler = CollectionReconciler::new(
                    self.source.as_ref(),
                    self.dest.as_ref(),
                    policy,
                    strategy,
                );

                match coordinator.as_mut() {
                    None => {
                        let outcome = reconciler.reconcile(&ns).await?;
                        let stop = !outcome.matched() && !policy.continue_on_error;
                        report.insert(outcome);
                        if stop {
                            break 'databases;
                        }
                    }
                    Some(coordinator) => {
                        // Counts are checked inline; only the content check
                        // is queued. The provisional entry is overwritten at
                        // drain time.
                        let provisional = reconciler.check_counts(&ns).await?;
                        let structure_ok = provisional.structure_matches();
                        let source_count = provisional.source_count;
                        report.insert(provisional);

                        if !structure_ok && !policy.continue_on_error {
                            break 'databases;
                        }

                        let source = Arc::clone(&self.source);
                        let dest = Arc::clone(&self.dest);
                        let task_policy = Arc::clone(&self.policy);
                        let task_ns = ns.clone();
                        coordinator
                            .submit(ns.to_string(), async move {
                                let sampler = DocumentSampler::new(
                                    source.as_ref(),
                                    dest.as_ref(),
                                    task_policy.as_ref(),
                                    strategy,
                                );
                                sampler.sample_and_verify(&task_ns, source_count).await
                            })
                            .await;
                    }
                }
            }

            if collection_count_diverged && !policy.continue_on_error {
                break;
            }
        }

        if let Some(coordinator) = coordinator {
            for (key, outcome) in coordinator.drain().await {
                match outcome {
                    Some(documents) => {
                        if documents.matched {
                            info!(
                                "EQUAL => collection [{}] data comparison ok, checked {} documents in {}s",
                                key, documents.checked, documents.elapsed_seconds
                            );
                        } else {
                            error!(
                                "DIFF => collection [{}] data comparison failed after {} documents ({}s)",
                                key, documents.checked, documents.elapsed_seconds
                            );
                        }
                        report.apply_document_check(&key, documents);
                    }
                    None => {
                        warn!("[{}] reported without content-check information", key);
                    }
                }
            }
        }

        Ok(report)
    }

    async fn filtered_databases(&self, cluster: &dyn ClusterReader) -> Result<Vec<String>> {
        let names = cluster.database_names().await?;
        Ok(names
            .into_iter()
            .filter(|name| !self.policy.excluded_databases.contains(name))
            .collect())
    }

    async fn filtered_collections(
        &self,
        cluster: &dyn ClusterReader,
        db: &str,
    ) -> Result<Vec<String>> {
        let names = cluster.collection_names(db).await?;
        Ok(names
            .into_iter()
            .filter(|name| !self.policy.excluded_collections.contains(name))
            .collect())
    }
}
