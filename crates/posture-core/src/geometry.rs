//! Planar geometry over normalized image coordinates.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Point in normalized image space (x right, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: Point2<f64>) -> Self {
        Self::new(p.x, p.y)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        nalgebra::distance(&self.to_nalgebra(), &other.to_nalgebra())
    }
}

/// Arithmetic mean of a set of points
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }

    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc: Vector2<f64>, p| acc + p.to_nalgebra().coords);

    Some(Point2D::from_nalgebra(Point2::from(sum / points.len() as f64)))
}

/// Midpoint between two points
pub fn midpoint(a: &Point2D, b: &Point2D) -> Point2D {
    Point2D::from_nalgebra(nalgebra::center(&a.to_nalgebra(), &b.to_nalgebra()))
}

/// Absolute vertical offset between a left/right landmark pair
pub fn vertical_misalignment(left: &Point2D, right: &Point2D) -> f64 {
    (left.y - right.y).abs()
}
