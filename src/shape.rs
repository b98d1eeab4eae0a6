use nalgebra::{Matrix3, Unit};

use crate::error::{Error, Result};
use crate::linalg::{normalize, Direction, Point, Vector, EPSILON};

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { center: Point, radius: f64 },
    /// Axis-aligned cube; `size` is the edge length.
    Cube { center: Point, size: f64 },
    Rectangle(Rectangle),
}

impl Shape {
    pub fn sphere(center: Point, radius: f64) -> Result<Self> {
        if !(radius > 0.) {
            return Err(Error::Geometry(format!("sphere radius must be positive, got {}", radius)));
        }
        Ok(Self::Sphere { center, radius })
    }

    pub fn cube(center: Point, size: f64) -> Result<Self> {
        if !(size > 0.) {
            return Err(Error::Geometry(format!("cube size must be positive, got {}", size)));
        }
        Ok(Self::Cube { center, size })
    }

    pub fn rectangle(p0: Point, p1: Point, p2: Point, p3: Point) -> Result<Self> {
        Rectangle::new(p0, p1, p2, p3).map(Self::Rectangle)
    }

    /// Nearest intersection in front of `o` (ray parameter above [`EPSILON`]).
    pub fn intersect_ray(&self, o: &Point, d: &Direction) -> Option<Intersection> {
        let d = d.into_inner();
        match self {
            Self::Sphere { center, radius } => {
                // foot of the perpendicular from the center onto the ray
                let oc = center - o;
                let t_foot = oc.dot(&d);
                let perpendicular_squared = oc.norm_squared() - t_foot * t_foot;
                let radius_squared = radius * radius;
                if perpendicular_squared > radius_squared {
                    return None;
                }
                let half_chord = (radius_squared - perpendicular_squared).max(0.).sqrt();

                // far root only matters when the origin is inside the sphere
                let t = [t_foot - half_chord, t_foot + half_chord]
                    .into_iter()
                    .find(|t| *t > EPSILON)?;
                let p = o + t * d;
                Some(Intersection {
                    t,
                    normal: Unit::new_normalize(p - center),
                    uv: None,
                })
            }
            Self::Cube { center, size } => {
                let half = size / 2.;
                let (mut t_near, mut near_axis) = (f64::NEG_INFINITY, 0);
                let (mut t_far, mut far_axis) = (f64::INFINITY, 0);
                for axis in 0..3 {
                    let low = center[axis] - half - o[axis];
                    let high = center[axis] + half - o[axis];
                    if d[axis] == 0. {
                        if low > 0. || high < 0. {
                            return None;
                        }
                        continue;
                    }
                    let (a, b) = (low / d[axis], high / d[axis]);
                    let (t0, t1) = if a < b { (a, b) } else { (b, a) };
                    if t0 > t_near {
                        t_near = t0;
                        near_axis = axis;
                    }
                    if t1 < t_far {
                        t_far = t1;
                        far_axis = axis;
                    }
                }
                if t_near > t_far {
                    return None;
                }

                let (t, axis, sign) = if t_near > EPSILON {
                    (t_near, near_axis, -d[near_axis].signum())
                } else if t_far > EPSILON {
                    (t_far, far_axis, d[far_axis].signum())
                } else {
                    return None;
                };
                let mut normal = Vector::zeros();
                normal[axis] = sign;
                Some(Intersection {
                    t,
                    normal: Unit::new_unchecked(normal),
                    uv: None,
                })
            }
            Self::Rectangle(rectangle) => rectangle.intersect_ray(o, &d),
        }
    }
}

/// Planar rectangle visible from one side only.
///
/// ```text
///  p0 +-------------+ p3
///     |             |
///  u  |             |
///     v             |
///  p1 +------------>+ p2
///            v
/// ```
///
/// The visible side is the one from which `p0, p1, p2, p3` wind
/// counter-clockwise; the normal `u x v` points towards it.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    corners: [Point; 4],
    vertical: Vector,
    horizontal: Vector,
    normal: Direction,
}

impl Rectangle {
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Result<Self> {
        let vertical = p1 - p0;
        let horizontal = p2 - p1;

        if vertical.dot(&horizontal).abs() > EPSILON {
            return Err(Error::Geometry(
                "rectangle corners p0, p1, p2 do not form a right angle".into(),
            ));
        }
        if (p0 + horizontal - p3).norm_squared() > EPSILON {
            return Err(Error::Geometry(
                "rectangle corner p3 does not close the quadrilateral".into(),
            ));
        }
        let normal = normalize(&vertical.cross(&horizontal))
            .map_err(|_| Error::Geometry("rectangle has a zero-length edge".into()))?;

        Ok(Self {
            corners: [p0, p1, p2, p3],
            vertical,
            horizontal,
            normal,
        })
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn normal(&self) -> &Direction {
        &self.normal
    }

    fn intersect_ray(&self, o: &Point, d: &Vector) -> Option<Intersection> {
        // back face: nothing to see
        if self.normal.dot(d) >= 0. {
            return None;
        }

        // p0 + x*u + y*v = o + t*d  <=>  [u v -d] (x, y, t) = o - p0
        let system = Matrix3::from_columns(&[self.vertical, self.horizontal, -d]);
        let solution = system.lu().solve(&(o - self.corners[0]))?;
        let (x, y, t) = (solution.x, solution.y, solution.z);

        let inside = |s: f64| (0. ..1.).contains(&s);
        if inside(x) && inside(y) && t > EPSILON {
            Some(Intersection {
                t,
                normal: self.normal,
                uv: Some((y, x)),
            })
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Intersection {
    pub t: f64,
    pub normal: Direction,
    /// Relative texture coordinates (column, row) of the hit, for surfaces that have them.
    pub uv: Option<(f64, f64)>,
}
