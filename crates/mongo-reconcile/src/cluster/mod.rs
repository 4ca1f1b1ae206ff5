//! Read-only cluster access interface.
//!
//! The reconciliation core never talks to a driver directly; it consumes the
//! [`ClusterReader`] trait, which exposes exactly the metadata enumeration
//! and document reads the engine needs. [`MongoCluster`] implements the
//! trait over the MongoDB driver; tests substitute an in-memory double.

mod mongo;
mod types;

pub use mongo::MongoCluster;
pub use types::*;

use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::{Bson, Document};

use crate::error::Result;

/// A lazy sequence of documents.
pub type DocumentStream = BoxStream<'static, Result<Document>>;

/// Read-only operations the reconciliation core needs from one cluster.
#[async_trait]
pub trait ClusterReader: Send + Sync {
    /// List database names.
    async fn database_names(&self) -> Result<Vec<String>>;

    /// List collection names within a database.
    async fn collection_names(&self, db: &str) -> Result<Vec<String>>;

    /// Exact document count for a collection.
    async fn document_count(&self, db: &str, coll: &str) -> Result<u64>;

    /// Number of index definitions on a collection.
    async fn index_count(&self, db: &str, coll: &str) -> Result<u64>;

    /// The engine's reported version string (e.g. "4.0.12").
    async fn engine_version(&self, db: &str) -> Result<String>;

    /// Fetch one document by identifier.
    async fn find_by_id(&self, db: &str, coll: &str, id: &Bson) -> Result<Option<Document>>;

    /// Stream documents matching the given options.
    async fn find(&self, db: &str, coll: &str, options: FindOptions) -> Result<DocumentStream>;

    /// Stream a random sample of `size` documents.
    ///
    /// Only meaningful on engines at or above the native-sampling version
    /// threshold; the sampler never calls this on the legacy strategy.
    async fn sample_random(&self, db: &str, coll: &str, size: u64) -> Result<DocumentStream>;
}
