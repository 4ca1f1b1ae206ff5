//! In-memory cluster double for reconciliation tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use mongo_reconcile::bson::{Bson, Document};
use mongo_reconcile::{ClusterReader, DocumentStream, FindOptions, Result, SortOrder};

#[derive(Clone)]
pub struct CollectionData {
    pub documents: Vec<Document>,
    pub index_count: u64,
}

/// A fixed set of databases and collections behind the `ClusterReader`
/// interface, with counters for observing the engine's access pattern.
pub struct FakeCluster {
    version: String,
    databases: BTreeMap<String, BTreeMap<String, CollectionData>>,
    /// Total `find_by_id` calls issued against this cluster.
    pub id_lookups: AtomicU64,
    /// Largest skip offset seen in any `find` request.
    pub max_skip: AtomicU64,
}

impl FakeCluster {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            databases: BTreeMap::new(),
            id_lookups: AtomicU64::new(0),
            max_skip: AtomicU64::new(0),
        }
    }

    pub fn with_collection(
        mut self,
        db: &str,
        coll: &str,
        index_count: u64,
        documents: Vec<Document>,
    ) -> Self {
        self.databases.entry(db.to_string()).or_default().insert(
            coll.to_string(),
            CollectionData {
                documents,
                index_count,
            },
        );
        self
    }

    fn collection(&self, db: &str, coll: &str) -> CollectionData {
        self.databases
            .get(db)
            .and_then(|colls| colls.get(coll))
            .cloned()
            .unwrap_or(CollectionData {
                documents: Vec::new(),
                index_count: 0,
            })
    }
}

/// Numeric value of a document identifier, for ordering.
fn id_num(id: &Bson) -> i64 {
    match id {
        Bson::Int32(v) => i64::from(*v),
        Bson::Int64(v) => *v,
        _ => i64::MIN,
    }
}

fn doc_id(doc: &Document) -> Bson {
    doc.get("_id").cloned().unwrap_or(Bson::Null)
}

#[async_trait]
impl ClusterReader for FakeCluster {
    async fn database_names(&self) -> Result<Vec<String>> {
        Ok(self.databases.keys().cloned().collect())
    }

    async fn collection_names(&self, db: &str) -> Result<Vec<String>> {
        Ok(self
            .databases
            .get(db)
            .map(|colls| colls.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn document_count(&self, db: &str, coll: &str) -> Result<u64> {
        Ok(self.collection(db, coll).documents.len() as u64)
    }

    async fn index_count(&self, db: &str, coll: &str) -> Result<u64> {
        Ok(self.collection(db, coll).index_count)
    }

    async fn engine_version(&self, _db: &str) -> Result<String> {
        Ok(self.version.clone())
    }

    async fn find_by_id(&self, db: &str, coll: &str, id: &Bson) -> Result<Option<Document>> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .collection(db, coll)
            .documents
            .into_iter()
            .find(|doc| doc_id(doc) == *id))
    }

    async fn find(&self, db: &str, coll: &str, options: FindOptions) -> Result<DocumentStream> {
        self.max_skip.fetch_max(options.skip, Ordering::SeqCst);

        let mut documents = self.collection(db, coll).documents;
        if let Some(min_id) = &options.min_id {
            let min = id_num(min_id);
            documents.retain(|doc| id_num(&doc_id(doc)) >= min);
        }
        if options.sort == SortOrder::IdDescending {
            documents.sort_by_key(|doc| std::cmp::Reverse(id_num(&doc_id(doc))));
        }

        let mut documents: Vec<_> = documents.into_iter().skip(options.skip as usize).collect();
        if let Some(limit) = options.limit {
            documents.truncate(limit as usize);
        }

        Ok(futures::stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn sample_random(&self, db: &str, coll: &str, size: u64) -> Result<DocumentStream> {
        // Deterministic stand-in for the engine's sampling primitive.
        let mut documents = self.collection(db, coll).documents;
        documents.truncate(size as usize);
        Ok(futures::stream::iter(documents.into_iter().map(Ok)).boxed())
    }
}
