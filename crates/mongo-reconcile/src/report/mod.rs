//! Reconciliation report aggregation and rendering.
//!
//! The report is owned exclusively by the aggregation pass: collection
//! outcomes are merged in by key (one writer per key), missing databases and
//! collections go to their own buckets, and `render` produces the final
//! human-readable summary in discovery order.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cluster::Namespace;
use crate::reconcile::ComparisonOutcome;
use crate::sampler::DocumentCheckOutcome;

/// A database present only on the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingDatabase {
    /// Database name.
    pub name: String,
    /// Its collections, as enumerated on the source.
    pub collections: Vec<String>,
}

/// A collection present only on the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingCollection {
    /// The collection's namespace.
    pub ns: Namespace,
    /// Its document count, as observed on the source.
    pub document_count: u64,
}

/// Database-level count divergence between the two sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseCountMismatch {
    /// Filtered database names on the source.
    pub source: Vec<String>,
    /// Filtered database names on the destination.
    pub dest: Vec<String>,
}

/// One database whose filtered collection lists differ in size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionCountMismatch {
    /// Database name.
    pub database: String,
    /// Filtered collection names on the source.
    pub source: Vec<String>,
    /// Filtered collection names on the destination.
    pub dest: Vec<String>,
}

/// Aggregated result of a reconciliation run.
///
/// Serialize-only: the skipped key index makes a round-trip lossy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationReport {
    /// Per-collection outcomes, in discovery order.
    pub outcomes: Vec<ComparisonOutcome>,
    /// Databases that exist only on the source, in discovery order.
    pub missing_databases: Vec<MissingDatabase>,
    /// Collections that exist only on the source, in discovery order.
    pub missing_collections: Vec<MissingCollection>,
    /// Set when the filtered database lists differ in size.
    pub database_count_mismatch: Option<DatabaseCountMismatch>,
    /// Databases whose filtered collection lists differ in size.
    pub collection_count_mismatches: Vec<CollectionCountMismatch>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ReconciliationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a collection outcome. The first insert for a key fixes its
    /// position; a later insert for the same key overwrites in place.
    pub fn insert(&mut self, outcome: ComparisonOutcome) {
        match self.index.get(&outcome.key) {
            Some(&i) => self.outcomes[i] = outcome,
            None => {
                self.index.insert(outcome.key.clone(), self.outcomes.len());
                self.outcomes.push(outcome);
            }
        }
    }

    /// Complete a provisional entry with its content-check result.
    pub fn apply_document_check(&mut self, key: &str, documents: DocumentCheckOutcome) {
        if let Some(&i) = self.index.get(key) {
            self.outcomes[i].documents = Some(documents);
        }
    }

    /// Look up an outcome by collection key.
    pub fn outcome(&self, key: &str) -> Option<&ComparisonOutcome> {
        self.index.get(key).map(|&i| &self.outcomes[i])
    }

    /// Record a database that exists only on the source.
    pub fn record_missing_database(&mut self, name: String, collections: Vec<String>) {
        self.missing_databases.push(MissingDatabase { name, collections });
    }

    /// Record a collection that exists only on the source.
    pub fn record_missing_collection(&mut self, ns: Namespace, document_count: u64) {
        self.missing_collections.push(MissingCollection { ns, document_count });
    }

    /// Record a database-level count divergence.
    pub fn record_database_count_mismatch(&mut self, source: Vec<String>, dest: Vec<String>) {
        self.database_count_mismatch = Some(DatabaseCountMismatch { source, dest });
    }

    /// Record one database's collection-count divergence.
    pub fn record_collection_count_mismatch(
        &mut self,
        database: String,
        source: Vec<String>,
        dest: Vec<String>,
    ) {
        self.collection_count_mismatches
            .push(CollectionCountMismatch { database, source, dest });
    }

    /// Whether the run found the two clusters equivalent.
    pub fn is_clean(&self) -> bool {
        self.database_count_mismatch.is_none()
            && self.collection_count_mismatches.is_empty()
            && self.missing_databases.is_empty()
            && self.missing_collections.is_empty()
            && self.outcomes.iter().all(|o| o.matched())
    }

    /// Render the final summary text.
    pub fn render(&self) -> String {
        let mut out = String::from("summary\n----------------------------------------\n");

        for o in &self.outcomes {
            let line = match (&o.documents, o.matched()) {
                (Some(d), true) => format!(
                    "=== [{}] record={} index={} data=ok ({}/{} checked, {:.3}%, {}s)",
                    o.key,
                    o.source_count,
                    o.source_index_count,
                    d.checked,
                    o.source_count,
                    o.checked_ratio(),
                    d.elapsed_seconds
                ),
                (Some(d), false) => format!(
                    "XXX [{}] record=[{}:{}] index=[{}:{}] data=err ({}/{} checked, {:.3}%, {}s)",
                    o.key,
                    o.source_count,
                    o.dest_count,
                    o.source_index_count,
                    o.dest_index_count,
                    d.checked,
                    o.source_count,
                    o.checked_ratio(),
                    d.elapsed_seconds
                ),
                (None, _) => format!(
                    "XXX [{}] record=[{}:{}] index=[{}:{}] data=unchecked",
                    o.key, o.source_count, o.dest_count, o.source_index_count, o.dest_index_count
                ),
            };
            let _ = writeln!(out, "{}", line);
        }

        if let Some(m) = &self.database_count_mismatch {
            let _ = writeln!(
                out,
                "XXXX database count differs: source {:?}, destination {:?}",
                m.source, m.dest
            );
        }
        for m in &self.collection_count_mismatches {
            let _ = writeln!(
                out,
                "XXXX [{}] collection count differs: source {:?}, destination {:?}",
                m.database, m.source, m.dest
            );
        }
        for db in &self.missing_databases {
            let _ = writeln!(
                out,
                "XXXX [{}] database only exists on source, collections: {:?}",
                db.name, db.collections
            );
        }
        for coll in &self.missing_collections {
            let _ = writeln!(
                out,
                "XXXX [{}] collection only exists on source, document count: {}",
                coll.ns, coll.document_count
            );
        }

        out
    }
}
