//! Error types for the reconciliation library.

use thiserror::Error;

/// Main error type for reconciliation operations.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Configuration error (invalid mode, out-of-range percentage, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cluster connection or query error
    #[error("Cluster error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// Engine version string could not be normalized
    #[error("Unrecognized engine version string: {raw:?}")]
    Version { raw: String },
}

impl ReconcileError {
    /// Create a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        ReconcileError::Config(message.into())
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for this error class.
    ///
    /// 2 = configuration error, 3 = cluster/driver error. Exit codes 0 and 1
    /// are reserved for clean and divergent reconciliation runs.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReconcileError::Config(_) | ReconcileError::Version { .. } => 2,
            ReconcileError::Driver(_) => 3,
        }
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
