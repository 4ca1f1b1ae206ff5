//! Value types for the cluster read interface.

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ReconcileError, Result};

/// A fully qualified collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    /// Database name.
    pub database: String,
    /// Collection name.
    pub collection: String,
}

impl Namespace {
    /// Create a namespace from database and collection names.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// One side's view of a collection, as observed at check time.
#[derive(Debug, Clone)]
pub struct CollectionRef {
    /// The collection's namespace.
    pub ns: Namespace,
    /// Total document count when measured.
    pub document_count: u64,
    /// Number of index definitions when measured.
    pub index_count: u64,
}

/// Sort order for a find request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Natural collection order.
    #[default]
    Unsorted,
    /// Identifier descending (most recently inserted first).
    IdDescending,
}

/// Options for reading documents from a collection.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Only return documents with identifier >= this value.
    pub min_id: Option<Bson>,
    /// Sort order.
    pub sort: SortOrder,
    /// Documents to skip before the first returned one.
    pub skip: u64,
    /// Maximum documents to return. `None` streams to exhaustion.
    pub limit: Option<u64>,
}

impl FindOptions {
    /// Every document, in natural order.
    pub fn all() -> Self {
        Self::default()
    }

    /// The `n` most-recently-inserted documents.
    pub fn latest(n: u64) -> Self {
        Self {
            sort: SortOrder::IdDescending,
            limit: Some(n),
            ..Self::default()
        }
    }

    /// One windowed-pagination window: restart at `min_id`, skip `skip`,
    /// take `limit`.
    pub fn window(min_id: Option<Bson>, skip: u64, limit: u64) -> Self {
        Self {
            min_id,
            sort: SortOrder::Unsorted,
            skip,
            limit: Some(limit),
        }
    }
}

/// Normalized engine version: the first two dotted components of the
/// reported version string concatenated ("4.0.12" becomes 40).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EngineVersion(u32);

impl EngineVersion {
    /// Normalize a reported version string.
    pub fn parse(raw: &str) -> Result<Self> {
        let joined: String = raw.split('.').take(2).collect();
        joined
            .parse::<u32>()
            .map(EngineVersion)
            .map_err(|_| ReconcileError::Version { raw: raw.to_string() })
    }

    /// The normalized integer value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
