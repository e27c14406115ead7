//! Error handling and display for the CLI.

use capalloc_allocator::AllocationError;
use capalloc_capacity::NormalizeError;
use capalloc_validate::ArtifactError;
use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Allocation validation failed with {violations} violation(s)")]
    ValidationFailed { violations: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(hint) = hint(err) {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

fn hint(err: &anyhow::Error) -> Option<String> {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::ValidationFailed { .. } => {
                Some("The report above lists every violation.".to_string())
            }
            CliError::InvalidArgument(_) => {
                Some("Ceilings are fractions greater than 0 and at most 1.".to_string())
            }
        };
    }

    if let Some(alloc_err) = err.downcast_ref::<AllocationError>() {
        return match alloc_err {
            AllocationError::CapacityExhausted { datacenter, .. } => Some(format!(
                "Raise capacity in {datacenter} or lower the domain minimums."
            )),
            AllocationError::UnknownCustomer(_) => {
                Some("Customers are the keys of private_pools.".to_string())
            }
            _ => None,
        };
    }

    if let Some(norm_err) = err.downcast_ref::<NormalizeError>() {
        if norm_err.is_datacenter_error() {
            return Some("Check data_centers and every DC reference against it.".to_string());
        }
        return Some("Run `capctl normalize` on the capacity document to check it.".to_string());
    }

    if err.downcast_ref::<ArtifactError>().is_some() {
        return Some(
            "Rebuild the artifact with `capctl combine` or `capctl run`.".to_string(),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_for_exhaustion_names_datacenter() {
        let err = anyhow::Error::new(AllocationError::CapacityExhausted {
            scope: capalloc_allocator::PoolScope::Shared,
            datacenter: "dc1".parse().unwrap(),
            resource: capalloc_capacity::Resource::Cpu,
            requested: 10,
            remaining: 5,
        });
        assert_eq!(
            hint(&err).unwrap(),
            "Raise capacity in dc1 or lower the domain minimums."
        );
    }

    #[test]
    fn hint_survives_context() {
        let err = anyhow::Error::new(CliError::InvalidArgument("x".to_string()))
            .context("while loading config");
        // downcast_ref sees through context layers
        assert!(hint(&err).is_some());
    }

    #[test]
    fn unknown_errors_have_no_hint() {
        assert!(hint(&anyhow::anyhow!("boom")).is_none());
    }
}
