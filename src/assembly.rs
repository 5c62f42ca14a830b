//! Method-of-joints assembly of the equilibrium system.
//!
//! Every free direction at a joint yields one row stating that the axial
//! force components of its members balance the external load in that
//! direction. Columns follow member indices.

use nalgebra::{DMatrix, DVector};

use crate::errors::AnalysisError;
use crate::geometry::{Axis, Point};
use crate::graph::JointGraph;
use crate::weight::{MemberWeights, WeightExponent};

/// Reusable buffers for the coefficient matrix, load vector and member weights.
///
/// Assembling repeatedly through the same assembler reuses its allocations,
/// which keeps optimization loops free of per-evaluation matrix allocation.
#[derive(Clone, Debug)]
pub struct EquilibriumAssembler {
    /// Direction-cosine matrix, rows by free direction and columns by member.
    matrix: DMatrix<f64>,
    /// Right-hand side in row order.
    loads: DVector<f64>,
    /// Member self-weight lumped at joints.
    weights: MemberWeights,
}

impl EquilibriumAssembler {
    /// Allocate buffers sized for `graph`.
    #[must_use]
    pub fn new(graph: &JointGraph) -> Self {
        let size = graph.member_count();
        Self {
            matrix: DMatrix::zeros(size, size),
            loads: DVector::zeros(size),
            weights: MemberWeights::new(graph.joint_count()),
        }
    }

    /// Build both the matrix and the load vector.
    ///
    /// # Errors
    ///
    /// See [`EquilibriumAssembler::build_matrix`] and
    /// [`EquilibriumAssembler::build_load_vector`].
    pub fn assemble(
        &mut self,
        graph: &JointGraph,
        positions: &[Point],
        apply_member_weight: bool,
        exponent: u32,
    ) -> Result<(), AnalysisError> {
        self.build_matrix(graph, positions)?;
        self.build_load_vector(graph, positions, apply_member_weight, exponent)?;
        Ok(())
    }

    /// Fill the coefficient matrix for the coordinates in `positions`.
    ///
    /// The entry for the row of joint `P` along axis `a` and the column of
    /// member `PQ` is the direction cosine `(Q[a] - P[a]) / |PQ|`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::PositionCount`] for a short snapshot and
    /// [`AnalysisError::DegenerateGeometry`] when any member has zero length.
    pub fn build_matrix(
        &mut self,
        graph: &JointGraph,
        positions: &[Point],
    ) -> Result<&DMatrix<f64>, AnalysisError> {
        graph.check_positions(positions)?;
        check_member_lengths(graph, positions)?;

        let size = graph.member_count();
        if self.matrix.shape() == (size, size) {
            self.matrix.fill(0.0);
        } else {
            self.matrix = DMatrix::zeros(size, size);
        }

        for (row, dof) in graph.dof_rows().iter().enumerate() {
            let here = positions[dof.joint];
            for (member, neighbor) in graph.incident(dof.joint) {
                let there = positions[neighbor];
                let length = here.distance_to(there);
                self.matrix[(row, member)] =
                    (there.component(dof.axis) - here.component(dof.axis)) / length;
            }
        }
        Ok(&self.matrix)
    }

    /// Fill the load vector, recomputing member weights first.
    ///
    /// Member weights are always reset; they are applied at `exponent` only
    /// when `apply_member_weight` is set. Horizontal rows carry no external
    /// load and vertical rows carry the joint load plus its member weight.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] when `exponent` is not 1, 2
    /// or 3, even if member weight is not applied.
    pub fn build_load_vector(
        &mut self,
        graph: &JointGraph,
        positions: &[Point],
        apply_member_weight: bool,
        exponent: u32,
    ) -> Result<&DVector<f64>, AnalysisError> {
        WeightExponent::try_from(exponent)?;
        graph.check_positions(positions)?;

        self.weights.reset();
        if apply_member_weight {
            self.weights.apply(graph, positions, exponent)?;
        }

        let rows = graph.dof_rows();
        if self.loads.len() != rows.len() {
            self.loads = DVector::zeros(rows.len());
        }
        for (row, dof) in rows.iter().enumerate() {
            self.loads[row] = match dof.axis {
                Axis::X => 0.0,
                Axis::Y => {
                    let load = graph.joint(dof.joint).map_or(0.0, |joint| joint.load);
                    load + self.weights.at(dof.joint)
                }
            };
        }
        Ok(&self.loads)
    }

    /// The most recently built coefficient matrix.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// The most recently built load vector.
    #[must_use]
    pub fn load_vector(&self) -> &DVector<f64> {
        &self.loads
    }

    /// Member weights used by the most recent load vector.
    #[must_use]
    pub fn member_weights(&self) -> &MemberWeights {
        &self.weights
    }
}

/// Reject any member whose endpoints coincide.
fn check_member_lengths(graph: &JointGraph, positions: &[Point]) -> Result<(), AnalysisError> {
    for (member, key) in graph.members().enumerate() {
        if positions[key.start()].distance_to(positions[key.end()]) == 0.0 {
            return Err(AnalysisError::DegenerateGeometry {
                member,
                start: key.start(),
                end: key.end(),
            });
        }
    }
    Ok(())
}

/// Build the coefficient matrix of `graph` at `positions` in a fresh buffer.
///
/// # Errors
///
/// See [`EquilibriumAssembler::build_matrix`].
pub fn build_matrix(graph: &JointGraph, positions: &[Point]) -> Result<DMatrix<f64>, AnalysisError> {
    let mut assembler = EquilibriumAssembler::new(graph);
    assembler.build_matrix(graph, positions)?;
    Ok(assembler.matrix)
}

/// Build the load vector of `graph` at `positions` together with the member
/// weights it includes.
///
/// # Errors
///
/// See [`EquilibriumAssembler::build_load_vector`].
pub fn build_load_vector(
    graph: &JointGraph,
    positions: &[Point],
    apply_member_weight: bool,
    exponent: u32,
) -> Result<(DVector<f64>, MemberWeights), AnalysisError> {
    let mut assembler = EquilibriumAssembler::new(graph);
    assembler.build_load_vector(graph, positions, apply_member_weight, exponent)?;
    Ok((assembler.loads, assembler.weights))
}
