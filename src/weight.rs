//! Synthetic self-weight of members, lumped onto their end joints.

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::geometry::Point;
use crate::graph::JointGraph;

/// Exponent applied to member length when computing its weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum WeightExponent {
    /// Weight proportional to length.
    #[default]
    Linear,
    /// Weight proportional to length squared.
    Quadratic,
    /// Weight proportional to length cubed.
    Cubic,
}

impl WeightExponent {
    /// Numeric exponent.
    #[must_use]
    pub const fn power(self) -> u32 {
        match self {
            Self::Linear => 1,
            Self::Quadratic => 2,
            Self::Cubic => 3,
        }
    }
}

impl TryFrom<u32> for WeightExponent {
    type Error = AnalysisError;

    fn try_from(exponent: u32) -> Result<Self, Self::Error> {
        match exponent {
            1 => Ok(Self::Linear),
            2 => Ok(Self::Quadratic),
            3 => Ok(Self::Cubic),
            _ => Err(AnalysisError::InvalidParameter { exponent }),
        }
    }
}

impl From<WeightExponent> for u32 {
    fn from(value: WeightExponent) -> Self {
        value.power()
    }
}

/// Per-joint accumulator of member self-weight.
///
/// Each member adds `length^k` to both of its endpoints, so the total over
/// all joints is twice the summed member weight.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberWeights {
    /// Accumulated weight, indexed by joint id.
    values: Vec<f64>,
}

impl MemberWeights {
    /// Zeroed accumulator for `joint_count` joints.
    #[must_use]
    pub fn new(joint_count: usize) -> Self {
        Self {
            values: vec![0.0; joint_count],
        }
    }

    /// Compute the member weights of `graph` at `positions` in one step.
    ///
    /// # Errors
    ///
    /// See [`MemberWeights::apply`].
    pub fn compute(
        graph: &JointGraph,
        positions: &[Point],
        exponent: u32,
    ) -> Result<Self, AnalysisError> {
        let mut weights = Self::new(graph.joint_count());
        weights.apply(graph, positions, exponent)?;
        Ok(weights)
    }

    /// Set every joint's weight to zero.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|value| *value = 0.0);
    }

    /// Add `length^exponent` of every member to both of its endpoints.
    ///
    /// The exponent is validated before anything is accumulated.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] when `exponent` is not 1, 2
    /// or 3, [`AnalysisError::PositionCount`] when `positions` does not cover
    /// the graph and [`AnalysisError::DegenerateGeometry`] for a zero-length
    /// member.
    pub fn apply(
        &mut self,
        graph: &JointGraph,
        positions: &[Point],
        exponent: u32,
    ) -> Result<(), AnalysisError> {
        let exponent = WeightExponent::try_from(exponent)?;
        graph.check_positions(positions)?;
        self.values.resize(graph.joint_count(), 0.0);
        for (member, key) in graph.members().enumerate() {
            let length = positions[key.start()].distance_to(positions[key.end()]);
            if length == 0.0 {
                return Err(AnalysisError::DegenerateGeometry {
                    member,
                    start: key.start(),
                    end: key.end(),
                });
            }
            let weight = length.powi(exponent.power() as i32);
            self.values[key.start()] += weight;
            self.values[key.end()] += weight;
        }
        Ok(())
    }

    /// Weight lumped at each joint, indexed by joint id.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Weight lumped at `joint`, zero for unknown ids.
    #[must_use]
    pub fn at(&self, joint: usize) -> f64 {
        self.values.get(joint).copied().unwrap_or(0.0)
    }

    /// Sum over all joints.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::geometry::point;
    use crate::graph::fixtures::introduction_bridge;

    #[test]
    fn exponents_outside_range_are_rejected() {
        let graph = introduction_bridge();
        let positions = graph.positions();
        for exponent in [0, 4, 7, u32::MAX] {
            let error = MemberWeights::compute(&graph, &positions, exponent)
                .expect_err("exponent rejected");
            assert_eq!(error, AnalysisError::InvalidParameter { exponent });
        }
    }

    #[test]
    fn linear_weights_match_incident_lengths() {
        let graph = introduction_bridge();
        let weights = MemberWeights::compute(&graph, &graph.positions(), 1).expect("valid");
        let diagonal = 1.25_f64.sqrt();
        // Joint 1 carries two deck members and two diagonals.
        assert_relative_eq!(weights.at(1), 2.0 + 2.0 * diagonal, epsilon = 1.0e-12);
        // Joint 3 carries two diagonals and the top chord.
        assert_relative_eq!(weights.at(3), 1.0 + 2.0 * diagonal, epsilon = 1.0e-12);
        assert_eq!(weights.at(99), 0.0);
    }

    #[test]
    fn reset_clears_accumulated_weight() {
        let graph = introduction_bridge();
        let mut weights = MemberWeights::compute(&graph, &graph.positions(), 2).expect("valid");
        assert!(weights.total() > 0.0);
        weights.reset();
        assert!(weights.values().iter().all(|&value| value == 0.0));
    }

    #[test]
    fn zero_length_member_is_rejected() {
        let graph = introduction_bridge();
        let mut positions = graph.positions();
        positions[4] = positions[3];
        let error = MemberWeights::compute(&graph, &positions, 1).expect_err("degenerate");
        assert_eq!(
            error,
            AnalysisError::DegenerateGeometry {
                member: 6,
                start: 3,
                end: 4
            }
        );
    }

    #[test]
    fn exponent_deserializes_from_integer() {
        let exponent: WeightExponent = serde_json::from_str("3").expect("valid exponent");
        assert_eq!(exponent, WeightExponent::Cubic);
        assert!(serde_json::from_str::<WeightExponent>("5").is_err());
        assert_eq!(serde_json::to_string(&WeightExponent::Quadratic).ok(), Some("2".into()));
    }

    #[test]
    fn exponent_converts_to_and_from_integer() {
        for exponent in 1..=3 {
            let variant = WeightExponent::try_from(exponent).expect("valid exponent");
            assert_eq!(variant.power(), exponent);
            assert_eq!(u32::from(variant), exponent);
        }
    }

    proptest! {
        #[test]
        fn total_weight_is_twice_summed_member_weight(
            x3 in -3.0..3.0_f64,
            y3 in 0.2..3.0_f64,
            x4 in -3.0..3.0_f64,
            y4 in 0.2..3.0_f64,
            exponent in 1u32..=3,
        ) {
            prop_assume!((x3 - x4).abs() > 1.0e-6);
            let graph = introduction_bridge();
            let mut positions = graph.positions();
            positions[3] = point(x3, y3);
            positions[4] = point(x4, y4);

            let weights = MemberWeights::compute(&graph, &positions, exponent).expect("valid");
            let members: f64 = graph
                .members()
                .map(|key| {
                    let length = positions[key.start()].distance_to(positions[key.end()]);
                    length.powi(exponent as i32)
                })
                .sum();
            prop_assert!((weights.total() - 2.0 * members).abs() <= 1.0e-9 * members.max(1.0));
        }
    }
}
