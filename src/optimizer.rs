//! Shape optimization of a truss via derivative-free minimization.
//!
//! Every joint off the ground level contributes its `(x, y)` pair to the
//! variable vector. The objective is the sum of squared member forces with
//! member self-weight applied; it is minimized with Nelder-Mead from `argmin`.
//! The minimizer sees the objective divided by its starting value (at least
//! 1), so the simplex tolerance is relative to the size of the truss.
//! Coordinates are written back to the graph once, after the minimizer stops.

use std::cell::RefCell;

use argmin::core::{CostFunction, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use serde::Serialize;
use tracing::{info, trace};

use crate::assembly::EquilibriumAssembler;
use crate::config::OptimizerConfig;
use crate::errors::AnalysisError;
use crate::geometry::Point;
use crate::graph::{JointGraph, JointId};
use crate::solver::{LinearSolver, Solution};

/// Result of [`optimize`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Optimization {
    /// Solve at the optimized coordinates, with member weight applied.
    pub solution: Solution,
    /// Optimized coordinates of every joint, in joint order.
    pub positions: Vec<Point>,
    /// Joints that were free to move.
    pub movable: Vec<JointId>,
    /// Objective at the starting coordinates.
    pub initial_objective: f64,
    /// Objective at the optimized coordinates.
    pub final_objective: f64,
    /// Minimizer iterations performed.
    pub iterations: u64,
    /// Whether the minimizer met its convergence tolerance.
    pub converged: bool,
}

/// Buffers reused across objective evaluations.
struct Scratch {
    positions: Vec<Point>,
    assembler: EquilibriumAssembler,
}

/// Objective over the coordinates of the movable joints.
///
/// The graph is only read. Each evaluation writes the candidate onto a scratch
/// copy of the starting coordinates.
struct ShapeProblem<'a> {
    graph: &'a JointGraph,
    movable: &'a [JointId],
    exponent: u32,
    /// Divisor applied to the objective handed to the minimizer.
    scale: f64,
    scratch: RefCell<Scratch>,
    /// First analysis error raised inside the minimizer.
    failure: &'a RefCell<Option<AnalysisError>>,
}

impl<'a> ShapeProblem<'a> {
    fn new(
        graph: &'a JointGraph,
        movable: &'a [JointId],
        exponent: u32,
        failure: &'a RefCell<Option<AnalysisError>>,
    ) -> Self {
        Self {
            graph,
            movable,
            exponent,
            scale: 1.0,
            scratch: RefCell::new(Scratch {
                positions: graph.positions(),
                assembler: EquilibriumAssembler::new(graph),
            }),
            failure,
        }
    }

    /// Normalize the minimizer's cost by `reference`, floored at 1.
    fn normalized(mut self, reference: f64) -> Self {
        self.scale = reference.max(1.0);
        self
    }

    /// Sum of squared member forces at `variables`.
    fn evaluate(&self, variables: &[f64]) -> Result<f64, AnalysisError> {
        let mut scratch = self.scratch.borrow_mut();
        let Scratch {
            positions,
            assembler,
        } = &mut *scratch;
        unflatten(self.movable, variables, positions);
        assembler.assemble(self.graph, positions, true, self.exponent)?;
        let forces = LinearSolver::solve(assembler.matrix(), assembler.load_vector())?;
        Ok(forces.norm_squared())
    }
}

impl CostFunction for ShapeProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        match self.evaluate(param) {
            Ok(objective) => {
                trace!(objective, "objective evaluated");
                Ok(objective / self.scale)
            }
            Err(error) => {
                self.failure.borrow_mut().get_or_insert_with(|| error.clone());
                Err(argmin::core::Error::new(error))
            }
        }
    }
}

/// Joints whose y-coordinate differs from `ground_level`.
fn movable_joints(positions: &[Point], ground_level: f64) -> Vec<JointId> {
    positions
        .iter()
        .enumerate()
        .filter(|(_, position)| position.y != ground_level)
        .map(|(id, _)| id)
        .collect()
}

/// Concatenate the `(x, y)` pairs of `movable` joints.
fn flatten(movable: &[JointId], positions: &[Point]) -> Vec<f64> {
    movable
        .iter()
        .flat_map(|&id| [positions[id].x, positions[id].y])
        .collect()
}

/// Write `(x, y)` pairs from `variables` back onto the `movable` joints.
fn unflatten(movable: &[JointId], variables: &[f64], positions: &mut [Point]) {
    for (&id, pair) in movable.iter().zip(variables.chunks_exact(2)) {
        positions[id] = Point::new(pair[0], pair[1]);
    }
}

/// Starting simplex: the initial point plus one vertex per coordinate, each
/// perturbing that coordinate alone.
fn initial_simplex(initial: &[f64], relative_step: f64, zero_step: f64) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(initial.len() + 1);
    simplex.push(initial.to_vec());
    for index in 0..initial.len() {
        let mut vertex = initial.to_vec();
        vertex[index] = if vertex[index] == 0.0 {
            zero_step
        } else {
            vertex[index] * (1.0 + relative_step)
        };
        simplex.push(vertex);
    }
    simplex
}

/// Convert an argmin failure, preferring the analysis error that caused it.
fn minimizer_error(
    failure: &RefCell<Option<AnalysisError>>,
    error: &argmin::core::Error,
) -> AnalysisError {
    failure
        .take()
        .unwrap_or_else(|| AnalysisError::Minimizer(error.to_string()))
}

/// Sum of squared member forces at the graph's current coordinates, with
/// member weight applied at `exponent`.
///
/// # Errors
///
/// See [`JointGraph::solve`].
pub fn total_squared_force(graph: &JointGraph, exponent: u32) -> Result<f64, AnalysisError> {
    Ok(graph.solve(Some(exponent))?.squared_force_sum())
}

/// Move every joint off the ground level to minimize the sum of squared
/// member forces, then solve once more at the optimized coordinates.
///
/// The graph is modified only when the run succeeds.
///
/// # Errors
///
/// Returns the first [`AnalysisError`] raised by any objective evaluation; the
/// run is aborted rather than skipping the failing candidate.
/// [`AnalysisError::Minimizer`] reports failures of the minimizer itself.
pub fn optimize(
    graph: &mut JointGraph,
    config: &OptimizerConfig,
) -> Result<Optimization, AnalysisError> {
    let exponent = u32::from(config.exponent);
    let mut positions = graph.positions();
    let movable = movable_joints(&positions, config.ground_level);
    let initial = flatten(&movable, &positions);
    let failure = RefCell::new(None);

    let problem = ShapeProblem::new(graph, &movable, exponent, &failure);
    let initial_objective = problem.evaluate(&initial)?;
    let problem = problem.normalized(initial_objective);
    info!(
        movable = movable.len(),
        exponent, initial_objective, "starting shape optimization"
    );

    let (best, iterations, converged) = if initial.is_empty() {
        drop(problem);
        (initial, 0, true)
    } else {
        let simplex = initial_simplex(&initial, config.relative_step, config.zero_step);
        // Nelder-Mead evaluates its starting vertices without propagating errors.
        for vertex in &simplex[1..] {
            problem.evaluate(vertex)?;
        }
        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(config.sd_tolerance)
            .map_err(|error| AnalysisError::Minimizer(error.to_string()))?;
        let mut executor = Executor::new(problem, solver);
        if let Some(max_iterations) = config.max_iterations {
            executor = executor.configure(|state| state.max_iters(max_iterations));
        }
        let result = executor
            .run()
            .map_err(|error| minimizer_error(&failure, &error))?;
        let state = result.state();
        let best = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| AnalysisError::Minimizer("Nelder-Mead returned no best parameters".into()))?;
        let converged = matches!(
            state.get_termination_reason(),
            Some(TerminationReason::SolverConverged)
        );
        (best, state.get_iter(), converged)
    };

    unflatten(&movable, &best, &mut positions);
    graph.set_positions(&positions)?;
    let solution = graph.solve(Some(exponent))?;
    let final_objective = solution.squared_force_sum();
    info!(
        iterations,
        converged, initial_objective, final_objective, "finished shape optimization"
    );

    Ok(Optimization {
        solution,
        positions,
        movable,
        initial_objective,
        final_objective,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;
    use crate::graph::fixtures::introduction_bridge;
    use crate::graph::{JointSpec, Support};
    use crate::weight::WeightExponent;

    #[test]
    fn ground_joints_are_frozen() {
        let graph = introduction_bridge();
        assert_eq!(movable_joints(&graph.positions(), 0.0), vec![3, 4]);
        assert_eq!(movable_joints(&graph.positions(), 1.0), vec![0, 1, 2]);
    }

    #[test]
    fn flatten_and_unflatten_use_the_same_order() {
        let graph = introduction_bridge();
        let mut positions = graph.positions();
        let variables = flatten(&[3, 4], &positions);
        assert_eq!(variables, vec![0.5, 1.0, 1.5, 1.0]);

        unflatten(&[3, 4], &[0.0, 2.0, 3.0, 4.0], &mut positions);
        assert_eq!(positions[3], point(0.0, 2.0));
        assert_eq!(positions[4], point(3.0, 4.0));
        assert_eq!(positions[1], point(1.0, 0.0));
    }

    #[test]
    fn simplex_perturbs_one_coordinate_per_vertex() {
        let simplex = initial_simplex(&[2.0, 0.0], 0.05, 0.000_25);
        assert_eq!(simplex.len(), 3);
        assert_eq!(simplex[0], vec![2.0, 0.0]);
        assert_relative_eq!(simplex[1][0], 2.1);
        assert_eq!(simplex[1][1], 0.0);
        assert_eq!(simplex[2], vec![2.0, 0.000_25]);
    }

    #[test]
    fn objective_matches_weighted_solve() {
        let graph = introduction_bridge();
        let movable = [3, 4];
        let failure = RefCell::new(None);
        let problem = ShapeProblem::new(&graph, &movable, 2, &failure);
        let cost = problem
            .cost(&vec![0.5, 1.0, 1.5, 1.0])
            .expect("objective evaluates");
        let expected = total_squared_force(&graph, 2).expect("solvable");
        assert_relative_eq!(cost, expected, epsilon = 1.0e-12);
    }

    #[test]
    fn objective_failure_is_recorded() {
        let graph = introduction_bridge();
        let movable = [3, 4];
        let failure = RefCell::new(None);
        let problem = ShapeProblem::new(&graph, &movable, 1, &failure);
        assert!(problem.cost(&vec![0.5, 1.0, 0.5, 1.0]).is_err());
        drop(problem);
        assert_eq!(
            failure.into_inner(),
            Some(AnalysisError::DegenerateGeometry {
                member: 6,
                start: 3,
                end: 4
            })
        );
    }

    #[test]
    fn minimizer_sees_objective_relative_to_start() {
        let graph = introduction_bridge();
        let movable = [3, 4];
        let failure = RefCell::new(None);
        let start = vec![0.5, 1.0, 1.5, 1.0];
        let problem = ShapeProblem::new(&graph, &movable, 1, &failure);
        let objective = problem.evaluate(&start).expect("solvable");
        let problem = problem.normalized(objective);
        assert_relative_eq!(problem.cost(&start).expect("evaluates"), 1.0, epsilon = 1.0e-12);

        let tiny = ShapeProblem::new(&graph, &movable, 1, &failure).normalized(1.0e-3);
        assert_relative_eq!(tiny.cost(&start).expect("evaluates"), objective, epsilon = 1.0e-12);
    }

    /// Pinned left support, roller at (2, 0) and a loaded apex at (1, 1).
    fn loaded_triangle() -> JointGraph {
        JointGraph::new(vec![
            JointSpec::new(point(0.0, 0.0))
                .support(Support::Pinned)
                .neighbors([1, 2]),
            JointSpec::new(point(2.0, 0.0))
                .support(Support::FixedY)
                .neighbors([0, 2]),
            JointSpec::new(point(1.0, 1.0)).load(1.0).neighbors([0, 1]),
        ])
        .expect("counts balance")
    }

    #[test]
    fn failure_inside_minimizer_aborts_run() {
        // Doubling the apex height gives the worst vertex; reflecting it
        // through the other two lands the apex exactly on the roller.
        let mut graph = loaded_triangle();
        let before = graph.positions();
        let config = OptimizerConfig {
            relative_step: 1.0,
            ..OptimizerConfig::default().with_exponent(WeightExponent::Cubic)
        };

        let error = optimize(&mut graph, &config).expect_err("reflection is degenerate");

        assert_eq!(
            error,
            AnalysisError::DegenerateGeometry {
                member: 2,
                start: 1,
                end: 2
            }
        );
        assert_eq!(graph.positions(), before);
    }

    #[test]
    fn optimization_does_not_increase_objective() {
        let mut graph = introduction_bridge();
        let config = OptimizerConfig::default().with_max_iterations(400);
        let before = total_squared_force(&graph, 1).expect("solvable");

        let result = optimize(&mut graph, &config).expect("optimization runs");

        assert_relative_eq!(result.initial_objective, before, epsilon = 1.0e-12);
        assert!(result.final_objective <= before + 1.0e-9);
        assert_eq!(result.movable, vec![3, 4]);
        assert_eq!(graph.positions(), result.positions);
        for ground in [0, 1, 2] {
            assert_eq!(result.positions[ground].y, 0.0);
        }
        assert_eq!(result.positions[1], point(1.0, 0.0));
        let after = total_squared_force(&graph, 1).expect("solvable");
        assert_relative_eq!(after, result.final_objective, epsilon = 1.0e-12);
    }

    #[test]
    fn singular_start_aborts_and_leaves_graph_untouched() {
        // Three collinear joints: determinate by count but not solvable.
        let mut graph = JointGraph::new(vec![
            JointSpec::new(point(0.0, 1.0))
                .support(Support::Pinned)
                .neighbors([1, 2]),
            JointSpec::new(point(1.0, 1.0))
                .support(Support::FixedY)
                .neighbors([0, 2]),
            JointSpec::new(point(2.0, 1.0)).load(1.0).neighbors([0, 1]),
        ])
        .expect("counts balance");
        let before = graph.positions();
        let config = OptimizerConfig::default().with_exponent(WeightExponent::Quadratic);

        let error = optimize(&mut graph, &config).expect_err("singular system");
        assert_eq!(error, AnalysisError::SingularSystem);
        assert_eq!(graph.positions(), before);
    }
}
