//! Comparison policy validation.

use super::ComparisonPolicy;
use crate::error::{ReconcileError, Result};

/// Validate the policy before any cluster work begins.
pub fn validate(policy: &ComparisonPolicy) -> Result<()> {
    if !(0.0..=100.0).contains(&policy.check_percent) {
        return Err(ReconcileError::Config(format!(
            "check_percent must be within [0, 100], got {}",
            policy.check_percent
        )));
    }

    if policy.threads == 0 {
        return Err(ReconcileError::Config("threads must be at least 1".into()));
    }

    // Included databases that are also excluded would silently vanish from
    // the working set.
    for db in &policy.included_databases {
        if policy.excluded_databases.contains(db) {
            return Err(ReconcileError::Config(format!(
                "database '{}' is both included and excluded",
                db
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(validate(&ComparisonPolicy::default()).is_ok());
    }

    #[test]
    fn test_percent_out_of_range() {
        let mut policy = ComparisonPolicy::default();
        policy.check_percent = 101.0;
        assert!(validate(&policy).is_err());

        policy.check_percent = -0.5;
        assert!(validate(&policy).is_err());

        policy.check_percent = 100.0;
        assert!(validate(&policy).is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let mut policy = ComparisonPolicy::default();
        policy.threads = 0;
        assert!(validate(&policy).is_err());
    }

    #[test]
    fn test_conflicting_include_exclude_rejected() {
        let mut policy = ComparisonPolicy::default();
        policy.included_databases.push("orders".to_string());
        policy.excluded_databases.insert("orders".to_string());
        assert!(validate(&policy).is_err());
    }
}
