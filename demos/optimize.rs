use trussform::{optimize, point, JointGraph, JointSpec, OptimizerConfig, Support, WeightExponent};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Heath's eight-joint bridge, carrying only its own weight
    let mut graph = JointGraph::new(vec![
        JointSpec::new(point(0.0, 0.0))
            .support(Support::Pinned)
            .neighbors([1, 2]),
        JointSpec::new(point(1.0, 0.0)).neighbors([0, 2, 4]),
        JointSpec::new(point(1.0, 1.0)).neighbors([0, 1, 3, 4]),
        JointSpec::new(point(2.0, 1.0)).neighbors([2, 4, 6]),
        JointSpec::new(point(2.0, 0.0)).neighbors([1, 2, 3, 6, 5]),
        JointSpec::new(point(3.0, 0.0)).neighbors([4, 6, 7]),
        JointSpec::new(point(3.0, 1.0)).neighbors([3, 4, 5, 7]),
        JointSpec::new(point(4.0, 0.0))
            .support(Support::FixedY)
            .neighbors([5, 6]),
    ])?;

    // Member weight grows with the cube of member length
    let config = OptimizerConfig::default().with_exponent(WeightExponent::Cubic);
    let result = optimize(&mut graph, &config)?;

    println!(
        "sum of squared forces: {:.4} -> {:.4}",
        result.initial_objective, result.final_objective
    );
    for &joint in &result.movable {
        let position = result.positions[joint];
        println!("joint {joint}: ({:.4}, {:.4})", position.x, position.y);
    }

    Ok(())
}
