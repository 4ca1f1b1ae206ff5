//! Comparison policy construction and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;

impl ComparisonPolicy {
    /// Validate the policy.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}
