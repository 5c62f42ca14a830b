//! Error types produced while building or analysing trusses.

use thiserror::Error;

use crate::graph::JointId;

/// Error returned when a joint description cannot form a solvable truss.
///
/// These are detected once, while the [`JointGraph`](crate::JointGraph) is
/// constructed, and are never retried.
///
/// # Examples
///
/// ```
/// use trussform::{point, ConfigurationError, JointGraph, JointSpec, Support};
///
/// // Two free directions but only one member.
/// let error = JointGraph::new(vec![
///     JointSpec::new(point(0.0, 0.0)).support(Support::Pinned).neighbors([1]),
///     JointSpec::new(point(1.0, 0.0)).neighbors([0]),
/// ])
/// .expect_err("underdetermined truss is rejected");
/// assert_eq!(
///     error,
///     ConfigurationError::StaticDeterminacy { members: 1, equations: 2 }
/// );
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Returned when the member count differs from the number of free directions.
    #[error(
        "no unique solution: {members} unknown member forces but {equations} equilibrium equations"
    )]
    StaticDeterminacy {
        /// Number of distinct members.
        members: usize,
        /// Number of unanchored directions over all joints.
        equations: usize,
    },
    /// Returned when a joint lists a neighbor that does not list it back.
    #[error("joint {joint} lists {neighbor} as a neighbor but not the other way round")]
    AsymmetricAdjacency {
        /// Joint whose neighbor list contains `neighbor`.
        joint: JointId,
        /// Joint missing the reverse relation.
        neighbor: JointId,
    },
    /// Returned when a neighbor id is outside the joint list.
    #[error("joint {joint} refers to unknown neighbor {neighbor}")]
    UnknownNeighbor {
        /// Joint whose neighbor list is invalid.
        joint: JointId,
        /// Offending neighbor id.
        neighbor: JointId,
    },
    /// Returned when a joint lists itself as a neighbor.
    #[error("joint {0} is connected to itself")]
    SelfMember(JointId),
}

/// Error returned when a truss analysis or optimization fails.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when the member-weight exponent is not 1, 2 or 3.
    #[error("member weight exponent must be 1, 2 or 3 (received {exponent})")]
    InvalidParameter {
        /// Rejected exponent.
        exponent: u32,
    },
    /// Returned when a member spans zero distance.
    #[error("member {member} between joints {start} and {end} has zero length")]
    DegenerateGeometry {
        /// Index of the offending member.
        member: usize,
        /// First endpoint.
        start: JointId,
        /// Second endpoint.
        end: JointId,
    },
    /// Returned when the equilibrium system has no finite unique solution.
    #[error("equilibrium matrix is singular; check for collinear or redundant members")]
    SingularSystem,
    /// Returned when a coordinate snapshot does not cover every joint.
    #[error("expected {expected} joint positions but received {actual}")]
    PositionCount {
        /// Number of joints in the graph.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },
    /// Returned when the minimizer fails for a reason other than an analysis error.
    #[error("minimizer failed: {0}")]
    Minimizer(String),
}
