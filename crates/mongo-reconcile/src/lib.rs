//! # mongo-reconcile
//!
//! Reconcile the contents of two MongoDB clusters — a source and a
//! destination believed to be a replica or migrated copy — and report, per
//! collection, whether document counts, index counts, and sampled document
//! contents match:
//!
//! - **Three comparison modes**: counts only, bounded random sampling, or
//!   full content scans
//! - **Version-aware sampling**: native random sampling on modern engines,
//!   windowed skip/limit pagination with a bounded skip ceiling on legacy
//!   ones
//! - **Bounded concurrency**: collection checks run under a fixed pool cap
//! - **Plain-text summary** with per-collection pass/fail detail
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mongo_reconcile::{ComparisonPolicy, MongoCluster, Reconciler};
//!
//! #[tokio::main]
//! async fn main() -> mongo_reconcile::Result<()> {
//!     let source = Arc::new(MongoCluster::connect("mongodb://127.0.0.1:27017").await?);
//!     let dest = Arc::new(MongoCluster::connect("mongodb://127.0.0.1:27018").await?);
//!     let policy = ComparisonPolicy::default().normalized().with_builtin_excludes();
//!     let report = Reconciler::new(source, dest, policy).run().await?;
//!     print!("{}", report.render());
//!     Ok(())
//! }
//! ```

// The BSON document model is part of this crate's public API.
pub use mongodb::bson;

pub mod cluster;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reconcile;
pub mod report;
pub mod sampler;

// Re-exports for convenient access
pub use cluster::{ClusterReader, CollectionRef, DocumentStream, EngineVersion, FindOptions,
    MongoCluster, Namespace, SortOrder};
pub use config::{CompareMode, ComparisonPolicy};
pub use error::{ReconcileError, Result};
pub use orchestrator::{ReconcileCoordinator, Reconciler};
pub use reconcile::{CollectionReconciler, ComparisonOutcome};
pub use report::{MissingCollection, MissingDatabase, ReconciliationReport};
pub use sampler::{DocumentCheckOutcome, DocumentSampler, MismatchDetail, SampleStrategy};
