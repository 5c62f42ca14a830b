//! Fundamental geometric types for planar truss modelling.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Position in the plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the horizontal axis.
    pub x: f64,
    /// Distance along the vertical axis, positive upwards.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.to_vector() - self.to_vector()).norm()
    }

    /// Coordinate along `axis`.
    #[must_use]
    pub const fn component(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point> for Vector2<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

/// One of the two in-plane translation directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal direction.
    X,
    /// Vertical direction.
    Y,
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use trussform::point;
///
/// let apex = point(0.5, 1.0);
/// assert_eq!(apex.y, 1.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_to_vector_roundtrip() {
        let apex = Point::new(0.5, 1.0);
        let vector: Vector2<f64> = apex.into();
        assert_eq!(vector, Vector2::new(0.5, 1.0));
        assert_eq!(Point::from(vector), apex);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = point(0.0, 0.0);
        let b = point(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
    }

    #[test]
    fn component_selects_axis() {
        let p = point(2.0, -1.0);
        assert_eq!(p.component(Axis::X), 2.0);
        assert_eq!(p.component(Axis::Y), -1.0);
    }
}
