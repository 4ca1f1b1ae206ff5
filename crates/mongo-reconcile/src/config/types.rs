//! Comparison policy type definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::error::ReconcileError;

/// Databases that are never reconciled (engine-internal namespaces).
pub const BUILTIN_EXCLUDED_DATABASES: &[&str] = &["admin", "local", "test"];

/// Collections that are never reconciled.
pub const BUILTIN_EXCLUDED_COLLECTIONS: &[&str] = &["system.profile"];

/// How much document content to compare per collection pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Counts and index counts only; no document content is read.
    None,
    /// A bounded sample of documents (default).
    #[default]
    Sample,
    /// Every document in the source collection.
    Full,
}

impl FromStr for CompareMode {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "no" => Ok(CompareMode::None),
            "sample" => Ok(CompareMode::Sample),
            "full" | "all" => Ok(CompareMode::Full),
            other => Err(ReconcileError::Config(format!(
                "comparison mode must be none, sample, or full, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareMode::None => write!(f, "none"),
            CompareMode::Sample => write!(f, "sample"),
            CompareMode::Full => write!(f, "full"),
        }
    }
}

/// Immutable comparison policy shared read-only by every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonPolicy {
    /// Content comparison mode.
    #[serde(default)]
    pub mode: CompareMode,

    /// Number of documents to sample per collection (sample mode).
    #[serde(default = "default_target_count")]
    pub target_count: u64,

    /// Percentage of the source collection to sample. A value in (0, 100]
    /// overrides `target_count`; 0 disables.
    #[serde(default)]
    pub check_percent: f64,

    /// Documents fetched and verified per batch. Clamped to [20, 50].
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Verify the N most-recently-inserted documents before sampling.
    #[serde(default)]
    pub latest_size: u64,

    /// Target sample sizes below this trigger an exhaustive scan instead.
    #[serde(default = "default_full_scan_threshold")]
    pub full_scan_threshold: u64,

    /// Minimum normalized engine version with a native random-sample
    /// primitive ("4.0.x" normalizes to 40).
    #[serde(default = "default_sample_version_threshold")]
    pub sample_version_threshold: u32,

    /// Record divergences and keep going instead of stopping at the first.
    #[serde(default)]
    pub continue_on_error: bool,

    /// Collection reconciliations executed concurrently. 1 = sequential.
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Database names excluded on both sides.
    #[serde(default)]
    pub excluded_databases: HashSet<String>,

    /// Collection names excluded on both sides.
    #[serde(default)]
    pub excluded_collections: HashSet<String>,

    /// If non-empty, only these databases are reconciled, in this order.
    #[serde(default)]
    pub included_databases: Vec<String>,
}

fn default_target_count() -> u64 {
    10_000
}

fn default_batch_size() -> u64 {
    30
}

fn default_full_scan_threshold() -> u64 {
    1_000
}

fn default_sample_version_threshold() -> u32 {
    40
}

fn default_threads() -> usize {
    1
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        Self {
            mode: CompareMode::default(),
            target_count: default_target_count(),
            check_percent: 0.0,
            batch_size: default_batch_size(),
            latest_size: 0,
            full_scan_threshold: default_full_scan_threshold(),
            sample_version_threshold: default_sample_version_threshold(),
            continue_on_error: false,
            threads: default_threads(),
            excluded_databases: HashSet::new(),
            excluded_collections: HashSet::new(),
            included_databases: Vec::new(),
        }
    }
}

impl ComparisonPolicy {
    /// Clamp out-of-range fields to their supported ranges.
    ///
    /// Batches between 20 and 50 documents keep the per-request overhead and
    /// the per-document lookup cost balanced.
    pub fn normalized(mut self) -> Self {
        self.batch_size = self.batch_size.clamp(20, 50);
        self
    }

    /// Add the engine-internal namespaces to the exclude filters.
    pub fn with_builtin_excludes(mut self) -> Self {
        self.excluded_databases
            .extend(BUILTIN_EXCLUDED_DATABASES.iter().map(|s| s.to_string()));
        self.excluded_collections
            .extend(BUILTIN_EXCLUDED_COLLECTIONS.iter().map(|s| s.to_string()));
        self
    }

    /// Log the effective policy once at startup.
    pub fn log_summary(&self) {
        info!(
            "Policy [mode={}, count={}, check_percent={}, batch_size={}, latest_size={}, \
             full_scan_threshold={}, sample_version_threshold={}, continue_on_error={}, threads={}]",
            self.mode,
            self.target_count,
            self.check_percent,
            self.batch_size,
            self.latest_size,
            self.full_scan_threshold,
            self.sample_version_threshold,
            self.continue_on_error,
            self.threads
        );
        if !self.included_databases.is_empty() {
            info!("Policy includes databases: {:?}", self.included_databases);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_accepts_both_spellings() {
        assert_eq!("none".parse::<CompareMode>().unwrap(), CompareMode::None);
        assert_eq!("no".parse::<CompareMode>().unwrap(), CompareMode::None);
        assert_eq!("sample".parse::<CompareMode>().unwrap(), CompareMode::Sample);
        assert_eq!("full".parse::<CompareMode>().unwrap(), CompareMode::Full);
        assert_eq!("all".parse::<CompareMode>().unwrap(), CompareMode::Full);
        assert!("everything".parse::<CompareMode>().is_err());
    }

    #[test]
    fn test_batch_size_clamped_to_supported_range() {
        let low = ComparisonPolicy {
            batch_size: 5,
            ..Default::default()
        }
        .normalized();
        assert_eq!(low.batch_size, 20);

        let high = ComparisonPolicy {
            batch_size: 500,
            ..Default::default()
        }
        .normalized();
        assert_eq!(high.batch_size, 50);

        let in_range = ComparisonPolicy {
            batch_size: 30,
            ..Default::default()
        }
        .normalized();
        assert_eq!(in_range.batch_size, 30);
    }

    #[test]
    fn test_builtin_excludes_are_merged_not_replaced() {
        let mut policy = ComparisonPolicy::default();
        policy.excluded_databases.insert("staging".to_string());
        let policy = policy.with_builtin_excludes();

        assert!(policy.excluded_databases.contains("staging"));
        assert!(policy.excluded_databases.contains("admin"));
        assert!(policy.excluded_databases.contains("local"));
        assert!(policy.excluded_collections.contains("system.profile"));
    }
}
