//! MongoDB driver implementation of the cluster read interface.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use tracing::debug;

use super::{ClusterReader, DocumentStream, FindOptions, SortOrder};
use crate::error::{ReconcileError, Result};

/// A connected cluster.
///
/// The driver owns connection pooling and TLS; this wrapper only narrows the
/// surface to what the reconciliation core consumes.
pub struct MongoCluster {
    client: Client,
}

impl MongoCluster {
    /// Connect to a cluster by connection string.
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        debug!("Connected to cluster");
        Ok(Self { client })
    }

    fn collection(&self, db: &str, coll: &str) -> Collection<Document> {
        self.client.database(db).collection(coll)
    }
}

#[async_trait]
impl ClusterReader for MongoCluster {
    async fn database_names(&self) -> Result<Vec<String>> {
        Ok(self.client.list_database_names().await?)
    }

    async fn collection_names(&self, db: &str) -> Result<Vec<String>> {
        Ok(self.client.database(db).list_collection_names().await?)
    }

    async fn document_count(&self, db: &str, coll: &str) -> Result<u64> {
        Ok(self.collection(db, coll).count_documents(doc! {}).await?)
    }

    async fn index_count(&self, db: &str, coll: &str) -> Result<u64> {
        let names = self.collection(db, coll).list_index_names().await?;
        Ok(names.len() as u64)
    }

    async fn engine_version(&self, db: &str) -> Result<String> {
        let info = self
            .client
            .database(db)
            .run_command(doc! { "buildInfo": 1 })
            .await?;
        Ok(info.get_str("version").unwrap_or_default().to_string())
    }

    async fn find_by_id(&self, db: &str, coll: &str, id: &Bson) -> Result<Option<Document>> {
        Ok(self
            .collection(db, coll)
            .find_one(doc! { "_id": id.clone() })
            .await?)
    }

    async fn find(&self, db: &str, coll: &str, options: FindOptions) -> Result<DocumentStream> {
        let filter = match options.min_id {
            Some(id) => doc! { "_id": { "$gte": id } },
            None => doc! {},
        };

        let collection = self.collection(db, coll);
        let mut find = collection.find(filter);
        if options.sort == SortOrder::IdDescending {
            find = find.sort(doc! { "_id": -1 });
        }
        if options.skip > 0 {
            find = find.skip(options.skip);
        }
        if let Some(limit) = options.limit {
            find = find.limit(limit as i64);
        }

        let cursor = find.await?;
        Ok(cursor.map_err(ReconcileError::from).boxed())
    }

    async fn sample_random(&self, db: &str, coll: &str, size: u64) -> Result<DocumentStream> {
        let pipeline = vec![doc! { "$sample": { "size": size as i64 } }];
        let cursor = self.collection(db, coll).aggregate(pipeline).await?;
        Ok(cursor.map_err(ReconcileError::from).boxed())
    }
}
