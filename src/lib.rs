#![warn(clippy::all)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod assembly;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod graph;
pub mod optimizer;
pub mod solver;
pub mod weight;

pub use assembly::{build_load_vector, build_matrix, EquilibriumAssembler};
pub use config::OptimizerConfig;
pub use errors::{AnalysisError, ConfigurationError};
pub use geometry::{point, Axis, Point};
pub use graph::{Dof, Joint, JointGraph, JointId, JointSpec, MemberKey, Support};
pub use optimizer::{optimize, total_squared_force, Optimization};
pub use solver::{LinearSolver, Solution};
pub use weight::{MemberWeights, WeightExponent};
