use crate::color::Color;
use crate::linalg::{Direction, Point};

/// What a ray struck: a visible object or the background.
///
/// The distance is kept squared so that nearest-hit comparisons never need a
/// square root. Background impacts have no position and an infinite distance.
#[derive(Clone, Debug, PartialEq)]
pub struct Impact {
    pub position: Option<Point>,
    pub distance_squared: f64,
    pub normal: Option<Direction>,
    pub color: Color,
    pub reflectivity: f64,
}

impl Impact {
    pub fn hit(
        position: Point,
        distance_squared: f64,
        normal: Direction,
        color: Color,
        reflectivity: f64,
    ) -> Self {
        Self {
            position: Some(position),
            distance_squared,
            normal: Some(normal),
            color,
            reflectivity,
        }
    }

    pub fn color_only(color: Color) -> Self {
        Self {
            position: None,
            distance_squared: f64::INFINITY,
            normal: None,
            color,
            reflectivity: 0.,
        }
    }

    pub fn color_and_normal(color: Color, normal: Direction) -> Self {
        Self {
            normal: Some(normal),
            ..Self::color_only(color)
        }
    }

    /// True for impacts on a visible object, false for the background.
    pub fn is_hit(&self) -> bool {
        self.distance_squared.is_finite()
    }
}
