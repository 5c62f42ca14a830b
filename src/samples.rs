use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use trussform::{point, ConfigurationError, JointGraph, JointId, JointSpec, Support};

/// Sample trusses bundled with the demonstration binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sample {
    /// Five-joint bridge with a unit load at mid-span.
    Introduction,
    /// Eight-joint Pratt-style bridge from Heath, *Scientific Computing*, chapter 2.
    Heath,
    /// Eleven-bay deck truss with diagonals leaning towards mid-span.
    Long,
    /// Crane jib with a 30-unit load at the tip.
    Crane,
}

/// Error returned for an unrecognised sample name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sample `{0}` (expected introduction, heath, long or crane)")]
pub struct UnknownSample(String);

impl FromStr for Sample {
    type Err = UnknownSample;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "introduction" | "intro" => Ok(Self::Introduction),
            "heath" => Ok(Self::Heath),
            "long" => Ok(Self::Long),
            "crane" => Ok(Self::Crane),
            _ => Err(UnknownSample(name.to_owned())),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Introduction => "introduction",
            Self::Heath => "heath",
            Self::Long => "long",
            Self::Crane => "crane",
        };
        f.write_str(name)
    }
}

impl Sample {
    /// Build the joint graph for this sample.
    pub fn build(self) -> Result<JointGraph, ConfigurationError> {
        match self {
            Self::Introduction => introduction_bridge(),
            Self::Heath => heath_bridge(),
            Self::Long => long_bridge(11, 1.5),
            Self::Crane => crane(),
        }
    }
}

fn introduction_bridge() -> Result<JointGraph, ConfigurationError> {
    JointGraph::new(vec![
        JointSpec::new(point(0.0, 0.0))
            .support(Support::Pinned)
            .neighbors([1, 3]),
        JointSpec::new(point(1.0, 0.0))
            .load(1.0)
            .neighbors([0, 3, 4, 2]),
        JointSpec::new(point(2.0, 0.0))
            .support(Support::FixedY)
            .neighbors([1, 4]),
        JointSpec::new(point(0.5, 1.0)).neighbors([0, 1, 4]),
        JointSpec::new(point(1.5, 1.0)).neighbors([3, 1, 2]),
    ])
}

fn heath_bridge() -> Result<JointGraph, ConfigurationError> {
    JointGraph::new(vec![
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
    ])
}

/// Register a member on both of its joints.
fn link(joints: &mut [JointSpec], a: JointId, b: JointId) {
    joints[a].neighbors.push(b);
    joints[b].neighbors.push(a);
}

/// Deck truss with `bays` columns of joint pairs `height` apart.
///
/// Joint `2i` is the bottom and `2i + 1` the top of column `i`. Diagonals run
/// from each bottom joint back to the previous top joint on the left half and
/// from each top joint back to the previous bottom joint on the right half.
fn long_bridge(bays: usize, height: f64) -> Result<JointGraph, ConfigurationError> {
    let mut joints = Vec::with_capacity(bays * 2);
    for column in 0..bays {
        let x = column as f64;
        joints.push(JointSpec::new(point(x, 0.0)));
        joints.push(JointSpec::new(point(x, height)));
    }
    joints[0].support = Support::Pinned;
    joints[(bays - 1) * 2].support = Support::FixedY;

    link(&mut joints, 0, 1);
    for column in 1..bays {
        let bottom = column * 2;
        let top = bottom + 1;
        link(&mut joints, bottom, bottom - 2);
        link(&mut joints, top, top - 2);
        link(&mut joints, bottom, top);
        if column * 2 < bays {
            link(&mut joints, bottom, top - 2);
        } else {
            link(&mut joints, top, bottom - 2);
        }
    }
    JointGraph::new(joints)
}

fn crane() -> Result<JointGraph, ConfigurationError> {
    JointGraph::new(vec![
        JointSpec::new(point(3.0, 0.0))
            .support(Support::Pinned)
            .neighbors([1, 3]),
        JointSpec::new(point(5.0, 0.0))
            .support(Support::FixedY)
            .neighbors([0, 3]),
        JointSpec::new(point(2.0, 10.0))
            .support(Support::FixedY)
            .neighbors([3, 4]),
        JointSpec::new(point(4.0, 10.0)).neighbors([0, 1, 2, 4, 5]),
        JointSpec::new(point(4.0, 13.0)).neighbors([2, 3, 5]),
        JointSpec::new(point(20.0, 10.0)).load(30.0).neighbors([3, 4]),
    ])
}
