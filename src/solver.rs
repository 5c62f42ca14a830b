//! Linear solve of the assembled equilibrium system.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::debug;

use crate::errors::AnalysisError;

/// Smallest pivot magnitude, relative to the largest, accepted as non-singular.
const PIVOT_TOLERANCE: f64 = 1.0e-12;

/// Member forces for one solve.
///
/// The sign of a force separates the two axial states; which of them is
/// labelled tension is left to the consumer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Solution {
    /// Axial force per member, in member-index order.
    pub forces: Vec<f64>,
    /// Member self-weight lumped at each joint, in joint order; all zero when
    /// member weight was not applied.
    pub member_weights: Vec<f64>,
}

impl Solution {
    /// Sum of squared member forces.
    #[must_use]
    pub fn squared_force_sum(&self) -> f64 {
        self.forces.iter().map(|force| force * force).sum()
    }
}

/// Direct solver for the square method-of-joints system.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearSolver;

impl LinearSolver {
    /// Solve `matrix * forces = loads` by LU decomposition.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularSystem`] when the matrix is not square,
    /// a pivot vanishes or is negligible next to the largest pivot, or the
    /// result is not finite.
    pub fn solve(
        matrix: &DMatrix<f64>,
        loads: &DVector<f64>,
    ) -> Result<DVector<f64>, AnalysisError> {
        let size = loads.len();
        if matrix.shape() != (size, size) {
            return Err(AnalysisError::SingularSystem);
        }
        if size == 0 {
            return Ok(DVector::zeros(0));
        }

        let lu = matrix.clone().lu();
        let pivots = lu.u().diagonal().map(f64::abs);
        let largest = pivots.max();
        let smallest = pivots.min();
        if smallest.is_nan() || smallest <= largest * PIVOT_TOLERANCE {
            debug!(smallest, largest, "rejecting near-singular equilibrium matrix");
            return Err(AnalysisError::SingularSystem);
        }

        let forces = lu.solve(loads).ok_or(AnalysisError::SingularSystem)?;
        if forces.iter().all(|force| force.is_finite()) {
            Ok(forces)
        } else {
            Err(AnalysisError::SingularSystem)
        }
    }
}
