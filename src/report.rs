use std::fmt::Write;

use crate::analysis::AnalysisSummary;
use trussform::{MemberKey, Point};

/// Render a textual summary of the analysis.
///
/// Forces are printed with their sign; the report does not label members as
/// being in tension or compression.
#[must_use]
pub fn render_summary(summary: &AnalysisSummary) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Truss `{}`: {} joints, {} members",
        summary.sample,
        summary.initial_positions.len(),
        summary.members.len()
    )
    .expect("writing to string cannot fail");

    output.push_str("\nMember forces (external loads only):\n");
    write_forces(&mut output, &summary.members, &summary.unweighted.forces);

    writeln!(
        &mut output,
        "\nMember forces (member weight, k = {}):",
        u32::from(summary.config.exponent)
    )
    .expect("writing to string cannot fail");
    write_forces(&mut output, &summary.members, &summary.weighted.forces);
    output.push_str("Member weight per joint:\n");
    for (joint, weight) in summary.weighted.member_weights.iter().enumerate() {
        writeln!(&mut output, "  joint {joint:>3}: {weight:.3}")
            .expect("writing to string cannot fail");
    }

    let optimization = &summary.optimization;
    writeln!(
        &mut output,
        "\nShape optimization: {} iterations ({}), sum of squared forces {:.4} -> {:.4}",
        optimization.iterations,
        if optimization.converged {
            "converged"
        } else {
            "stopped early"
        },
        optimization.initial_objective,
        optimization.final_objective
    )
    .expect("writing to string cannot fail");
    for &joint in &optimization.movable {
        let before = summary.initial_positions[joint];
        let after = optimization.positions[joint];
        writeln!(
            &mut output,
            "  joint {joint:>3}: {} -> {}",
            format_point(before),
            format_point(after)
        )
        .expect("writing to string cannot fail");
    }
    output.push_str("Optimized member forces:\n");
    write_forces(&mut output, &summary.members, &optimization.solution.forces);

    output
}

fn write_forces(output: &mut String, members: &[MemberKey], forces: &[f64]) {
    for (index, (member, force)) in members.iter().zip(forces).enumerate() {
        writeln!(
            output,
            "  member {index:>3} ({:>3}-{:<3}): {force:+.6}",
            member.start(),
            member.end()
        )
        .expect("writing to string cannot fail");
    }
}

fn format_point(point: Point) -> String {
    format!("({:.4}, {:.4})", point.x, point.y)
}
