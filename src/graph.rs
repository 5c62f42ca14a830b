//! Joint and member topology of a planar pin-jointed truss.

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembly::EquilibriumAssembler;
use crate::errors::{AnalysisError, ConfigurationError};
use crate::geometry::{Axis, Point};
use crate::solver::{LinearSolver, Solution};

/// Stable identifier of a joint: its position in the construction list.
pub type JointId = usize;

/// Translational restraint at a joint.
///
/// A fixed direction is carried by the support reaction and contributes no
/// equilibrium equation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Support {
    /// Both directions free.
    #[default]
    Free,
    /// Horizontal direction fixed.
    FixedX,
    /// Vertical direction fixed (a roller on horizontal ground).
    FixedY,
    /// Both directions fixed.
    Pinned,
}

impl Support {
    /// Build a support from per-axis anchor flags.
    #[must_use]
    pub const fn from_anchors(anchored_x: bool, anchored_y: bool) -> Self {
        match (anchored_x, anchored_y) {
            (false, false) => Self::Free,
            (true, false) => Self::FixedX,
            (false, true) => Self::FixedY,
            (true, true) => Self::Pinned,
        }
    }

    /// Whether displacement along `axis` is restrained.
    #[must_use]
    pub const fn is_fixed(self, axis: Axis) -> bool {
        match (self, axis) {
            (Self::Free, _) => false,
            (Self::FixedX, Axis::X) | (Self::FixedY, Axis::Y) => true,
            (Self::FixedX, Axis::Y) | (Self::FixedY, Axis::X) => false,
            (Self::Pinned, _) => true,
        }
    }
}

/// Caller-supplied description of one joint.
///
/// Neighbor relations refer to other joints by their position in the list
/// handed to [`JointGraph::new`] and must be listed on both sides.
#[derive(Clone, Debug, PartialEq)]
pub struct JointSpec {
    /// Initial coordinate.
    pub position: Point,
    /// Restraint state.
    pub support: Support,
    /// External load, positive downwards.
    pub load: f64,
    /// Connected joints, in the order members should be discovered.
    pub neighbors: Vec<JointId>,
}

impl JointSpec {
    /// Create an unloaded, unsupported joint with no neighbors.
    #[must_use]
    pub fn new(position: Point) -> Self {
        Self {
            position,
            support: Support::Free,
            load: 0.0,
            neighbors: Vec::new(),
        }
    }

    /// Set the restraint state.
    #[must_use]
    pub fn support(mut self, support: Support) -> Self {
        self.support = support;
        self
    }

    /// Set the downward external load.
    #[must_use]
    pub fn load(mut self, load: f64) -> Self {
        self.load = load;
        self
    }

    /// Append neighbors in discovery order.
    #[must_use]
    pub fn neighbors(mut self, neighbors: impl IntoIterator<Item = JointId>) -> Self {
        self.neighbors.extend(neighbors);
        self
    }
}

/// A joint stored in a [`JointGraph`].
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    /// Current coordinate.
    pub position: Point,
    /// Restraint state.
    pub support: Support,
    /// External load, positive downwards.
    pub load: f64,
}

/// Unordered pair of joints identifying a member, stored with the smaller id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberKey(JointId, JointId);

impl MemberKey {
    /// Canonical key for the member between `a` and `b`.
    #[must_use]
    pub fn new(a: JointId, b: JointId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Endpoint with the smaller id.
    #[must_use]
    pub const fn start(self) -> JointId {
        self.0
    }

    /// Endpoint with the larger id.
    #[must_use]
    pub const fn end(self) -> JointId {
        self.1
    }
}

/// A free direction at a joint; one row of the equilibrium system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dof {
    /// Joint the equation balances.
    pub joint: JointId,
    /// Direction of the balance.
    pub axis: Axis,
}

/// Container for a statically determinate planar truss.
///
/// The topology is fixed at construction. Node indices equal joint ids and
/// edge indices equal member indices.
#[derive(Clone, Debug)]
pub struct JointGraph {
    /// Underlying graph storage for joints and members.
    graph: UnGraph<Joint, MemberKey>,
    /// Member index keyed by canonical joint pair.
    members: HashMap<MemberKey, usize>,
    /// Equation rows in assembly order.
    dofs: Vec<Dof>,
}

impl JointGraph {
    /// Build the graph and register every member in first-seen order.
    ///
    /// Joints are scanned in list order and, for each, its neighbors in list
    /// order; an unordered pair is registered the first time it is seen.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a neighbor id is invalid, the
    /// adjacency is not symmetric, or the member count differs from the number
    /// of free directions.
    pub fn new(joints: Vec<JointSpec>) -> Result<Self, ConfigurationError> {
        Self::validate_adjacency(&joints)?;

        let mut graph = UnGraph::with_capacity(joints.len(), joints.len() * 2);
        for spec in &joints {
            graph.add_node(Joint {
                position: spec.position,
                support: spec.support,
                load: spec.load,
            });
        }

        let mut members = HashMap::new();
        for (id, spec) in joints.iter().enumerate() {
            for &neighbor in &spec.neighbors {
                let key = MemberKey::new(id, neighbor);
                if !members.contains_key(&key) {
                    let edge = graph.add_edge(
                        NodeIndex::new(key.start()),
                        NodeIndex::new(key.end()),
                        key,
                    );
                    members.insert(key, edge.index());
                }
            }
        }

        let dofs: Vec<Dof> = joints
            .iter()
            .enumerate()
            .flat_map(|(joint, spec)| {
                [Axis::X, Axis::Y]
                    .into_iter()
                    .filter(move |&axis| !spec.support.is_fixed(axis))
                    .map(move |axis| Dof { joint, axis })
            })
            .collect();

        debug!(
            joints = joints.len(),
            members = members.len(),
            equations = dofs.len(),
            "built joint graph"
        );
        if dofs.len() != members.len() {
            return Err(ConfigurationError::StaticDeterminacy {
                members: members.len(),
                equations: dofs.len(),
            });
        }

        Ok(Self {
            graph,
            members,
            dofs,
        })
    }

    /// Reject unknown, self-referencing and one-sided neighbor relations.
    fn validate_adjacency(joints: &[JointSpec]) -> Result<(), ConfigurationError> {
        for (joint, spec) in joints.iter().enumerate() {
            for &neighbor in &spec.neighbors {
                if neighbor == joint {
                    return Err(ConfigurationError::SelfMember(joint));
                }
                let other = joints
                    .get(neighbor)
                    .ok_or(ConfigurationError::UnknownNeighbor { joint, neighbor })?;
                if !other.neighbors.contains(&joint) {
                    return Err(ConfigurationError::AsymmetricAdjacency { joint, neighbor });
                }
            }
        }
        Ok(())
    }

    /// Return the number of joints in the truss.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members in the truss.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Joints in id order.
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.graph.node_weights()
    }

    /// Retrieve a joint by id.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.graph.node_weight(NodeIndex::new(id))
    }

    /// Current coordinates of every joint, in id order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point> {
        self.joints().map(|joint| joint.position).collect()
    }

    /// Index of the member connecting `a` and `b`, in either order.
    #[must_use]
    pub fn member_index(&self, a: JointId, b: JointId) -> Option<usize> {
        self.members.get(&MemberKey::new(a, b)).copied()
    }

    /// The full member-to-index map.
    #[must_use]
    pub fn member_map(&self) -> &HashMap<MemberKey, usize> {
        &self.members
    }

    /// Endpoints of the member with the given index.
    #[must_use]
    pub fn member(&self, index: usize) -> Option<MemberKey> {
        self.graph.edge_weight(EdgeIndex::new(index)).copied()
    }

    /// Members in index order.
    pub fn members(&self) -> impl Iterator<Item = MemberKey> + '_ {
        self.graph.edge_weights().copied()
    }

    /// Equation rows in assembly order.
    #[must_use]
    pub fn dof_rows(&self) -> &[Dof] {
        &self.dofs
    }

    /// Members incident to `joint` as `(member index, other endpoint)`.
    pub(crate) fn incident(&self, joint: JointId) -> impl Iterator<Item = (usize, JointId)> + '_ {
        self.graph
            .edges(NodeIndex::new(joint))
            .map(move |edge| {
                let key = *edge.weight();
                let other = if key.start() == joint {
                    key.end()
                } else {
                    key.start()
                };
                (edge.id().index(), other)
            })
    }

    /// Ensure a coordinate snapshot covers every joint.
    pub(crate) fn check_positions(&self, positions: &[Point]) -> Result<(), AnalysisError> {
        if positions.len() == self.joint_count() {
            Ok(())
        } else {
            Err(AnalysisError::PositionCount {
                expected: self.joint_count(),
                actual: positions.len(),
            })
        }
    }

    /// Overwrite every joint coordinate.
    pub(crate) fn set_positions(&mut self, positions: &[Point]) -> Result<(), AnalysisError> {
        self.check_positions(positions)?;
        for (joint, &position) in self.graph.node_weights_mut().zip(positions) {
            joint.position = position;
        }
        Ok(())
    }

    /// Solve for member forces at the current coordinates.
    ///
    /// `member_weight` is the exponent of the self-weight model; `None` solves
    /// under the external loads alone.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] when the exponent is invalid, a member has zero
    /// length, or the system is singular.
    pub fn solve(&self, member_weight: Option<u32>) -> Result<Solution, AnalysisError> {
        self.solve_at(&self.positions(), member_weight)
    }

    /// Solve for member forces at an explicit coordinate snapshot.
    ///
    /// The graph itself is left untouched.
    ///
    /// # Errors
    ///
    /// As [`JointGraph::solve`], plus [`AnalysisError::PositionCount`] when
    /// `positions` does not cover every joint.
    pub fn solve_at(
        &self,
        positions: &[Point],
        member_weight: Option<u32>,
    ) -> Result<Solution, AnalysisError> {
        let mut assembler = EquilibriumAssembler::new(self);
        let (apply, exponent) = match member_weight {
            Some(exponent) => (true, exponent),
            None => (false, 1),
        };
        assembler.assemble(self, positions, apply, exponent)?;
        let forces = LinearSolver::solve(assembler.matrix(), assembler.load_vector())?;
        Ok(Solution {
            forces: forces.iter().copied().collect(),
            member_weights: assembler.member_weights().values().to_vec(),
        })
    }
}
