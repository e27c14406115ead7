//! Policy thresholds.

use serde::{Deserialize, Serialize};

/// Default fraction of a customer's private pool it may consume per DC.
pub const DEFAULT_ISOLATION_CEILING: f64 = 0.5;

/// Validator thresholds.
///
/// Ceilings are fractions in `(0, 1]`; range checking is left to whoever
/// builds the config from user input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Isolation ceiling for private pools.
    pub isolation_ceiling: f64,

    /// Per-entry ceiling on shared-pool CPU, disabled when `None`.
    pub domain_share_ceiling: Option<f64>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            isolation_ceiling: DEFAULT_ISOLATION_CEILING,
            domain_share_ceiling: None,
        }
    }
}

impl ValidatorConfig {
    #[must_use]
    pub fn with_isolation_ceiling(mut self, ceiling: f64) -> Self {
        self.isolation_ceiling = ceiling;
        self
    }

    #[must_use]
    pub fn with_domain_share_ceiling(mut self, ceiling: Option<f64>) -> Self {
        self.domain_share_ceiling = ceiling;
        self
    }
}

/// Render a ceiling as a percentage: `0.5` becomes `50`, `0.125` becomes `12.5`.
pub(crate) fn percent(ceiling: f64) -> String {
    let pct = (ceiling * 1_000_000.0).round() / 10_000.0;
    if pct.fract() == 0.0 {
        format!("{pct:.0}")
    } else {
        format!("{pct}")
    }
}

/// Resolution of a ceiling in integer comparisons.
const CEILING_SCALE: u128 = 1_000_000;

/// Returns true if `used` is strictly above `ceiling * capacity`.
///
/// The ceiling is fixed to millionths and compared in integers, so large
/// quantities keep full precision.
pub(crate) fn exceeds(used: u128, capacity: u64, ceiling: f64) -> bool {
    let scaled = (ceiling * CEILING_SCALE as f64).round().max(0.0) as u128;
    used.saturating_mul(CEILING_SCALE) > u128::from(capacity).saturating_mul(scaled)
}
