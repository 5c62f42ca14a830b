use trussform::{point, JointGraph, JointSpec, Support};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A single triangle: pinned on the left, roller on the right
    let graph = JointGraph::new(vec![
        JointSpec::new(point(0.0, 0.0))
            .support(Support::Pinned)
            .neighbors([1, 2]),
        JointSpec::new(point(2.0, 0.0))
            .support(Support::FixedY)
            .neighbors([0, 2]),
        JointSpec::new(point(1.0, 1.0)).load(10.0).neighbors([0, 1]),
    ])?;

    // Solve under the apex load alone
    let solution = graph.solve(None)?;
    for (key, force) in graph.members().zip(&solution.forces) {
        println!("member {}-{}: {force:+.3}", key.start(), key.end());
    }

    Ok(())
}
