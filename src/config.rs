//! Optimizer configuration.

use serde::{Deserialize, Serialize};

use crate::weight::WeightExponent;

/// Settings for [`optimize`](crate::optimize).
///
/// Every field has a default, so a partial JSON document is accepted:
///
/// ```
/// use trussform::{OptimizerConfig, WeightExponent};
///
/// let config = OptimizerConfig::from_json(r#"{ "exponent": 3 }"#)?;
/// assert_eq!(config.exponent, WeightExponent::Cubic);
/// assert_eq!(config.ground_level, 0.0);
/// assert_eq!(config.max_iterations, None);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Exponent of the member self-weight model used by the objective.
    #[serde(default)]
    pub exponent: WeightExponent,
    /// Joints whose y-coordinate equals this value stay where they are.
    #[serde(default)]
    pub ground_level: f64,
    /// Nelder-Mead stops once the standard deviation of the simplex costs,
    /// divided by the starting objective (or 1 if smaller), falls below this
    /// value.
    #[serde(default = "default_sd_tolerance")]
    pub sd_tolerance: f64,
    /// Relative perturbation of each coordinate in the initial simplex.
    #[serde(default = "default_relative_step")]
    pub relative_step: f64,
    /// Absolute perturbation used for coordinates that are exactly zero.
    #[serde(default = "default_zero_step")]
    pub zero_step: f64,
    /// Optional cap on minimizer iterations; unbounded when absent.
    #[serde(default)]
    pub max_iterations: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            exponent: WeightExponent::default(),
            ground_level: 0.0,
            sd_tolerance: default_sd_tolerance(),
            relative_step: default_relative_step(),
            zero_step: default_zero_step(),
            max_iterations: None,
        }
    }
}

impl OptimizerConfig {
    /// Parse a configuration from JSON, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] for malformed input or an exponent
    /// other than 1, 2 or 3.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Replace the member-weight exponent.
    #[must_use]
    pub fn with_exponent(mut self, exponent: WeightExponent) -> Self {
        self.exponent = exponent;
        self
    }

    /// Cap the number of minimizer iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

fn default_sd_tolerance() -> f64 {
    1.0e-10
}

fn default_relative_step() -> f64 {
    0.05
}

fn default_zero_step() -> f64 {
    0.000_25
}
