use nalgebra::{Point3, Unit, Vector3};

use crate::error::{Error, Result};

/// Two reals closer than this are considered equal.
pub const EPSILON: f64 = 1e-6;

pub type Vector = Vector3<f64>;
pub type Point = Point3<f64>;
/// A vector of norm 1.
pub type Direction = Unit<Vector3<f64>>;

fn parse_triple(text: &str) -> Result<[f64; 3]> {
    let inner = text
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| Error::Parse(format!("`{}` must be written as (x, y, z)", text)))?;

    let components: Vec<&str> = inner.split(',').collect();
    if components.len() != 3 {
        return Err(Error::Parse(format!(
            "`{}` has {} components, expected 3",
            text,
            components.len()
        )));
    }

    let mut triple = [0.; 3];
    for (slot, component) in triple.iter_mut().zip(components) {
        let value: f64 = component
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("`{}` is not a number in `{}`", component.trim(), text)))?;
        if !value.is_finite() {
            return Err(Error::Parse(format!("`{}` is not finite in `{}`", component.trim(), text)));
        }
        *slot = value;
    }
    Ok(triple)
}

pub fn parse_vector(text: &str) -> Result<Vector> {
    parse_triple(text).map(Vector::from)
}

pub fn parse_point(text: &str) -> Result<Point> {
    parse_triple(text).map(Point::from)
}

/// Formats a triple as `(x.xx, y.yy, z.zz)`, the form accepted by [`parse_vector`].
pub fn to_text(v: &Vector) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

pub fn normalize(v: &Vector) -> Result<Direction> {
    Unit::try_new(*v, EPSILON).ok_or(Error::ZeroLength)
}

pub fn is_unit(v: &Vector) -> bool {
    (v.norm_squared() - 1.).abs() < EPSILON
}

/// Mirror direction of a ray travelling along `d` and bouncing on a surface of normal `n`.
pub fn reflect(d: &Direction, n: &Direction) -> Direction {
    let r = -d.into_inner();
    Unit::new_normalize(2. * n.into_inner() * n.dot(&r) - r)
}
