use crate::color::Color;
use crate::error::{Error, Result};
use crate::impact::Impact;
use crate::linalg::{Direction, Point};
use crate::shape::Shape;
use crate::texture::Texture;

/// A shape and the surface it is painted with.
#[derive(Debug)]
pub struct Object {
    pub shape: Shape,
    pub color: Color,
    /// Replaces `color` on shapes that provide texture coordinates.
    pub texture: Option<Texture>,
    pub reflectivity: f64,
}

impl Object {
    pub fn new(shape: Shape, color: Color) -> Self {
        Self {
            shape,
            color,
            texture: None,
            reflectivity: 0.,
        }
    }

    pub fn with_reflectivity(mut self, reflectivity: f64) -> Result<Self> {
        if !(0. ..=1.).contains(&reflectivity) {
            return Err(Error::Geometry(format!(
                "reflectivity must lie in [0, 1], got {}",
                reflectivity
            )));
        }
        self.reflectivity = reflectivity;
        Ok(self)
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn intersect(&self, o: &Point, d: &Direction) -> Option<Impact> {
        self.shape.intersect_ray(o, d).map(|intersection| {
            let color = match (&self.texture, intersection.uv) {
                (Some(texture), Some((u, v))) => texture.sample(u, v),
                _ => self.color,
            };
            Impact::hit(
                o + intersection.t * d.into_inner(),
                intersection.t * intersection.t,
                intersection.normal,
                color,
                self.reflectivity,
            )
        })
    }
}

/// Light sources are carried by the scene but do not take part in shading yet.
#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Ambient(f64),
    Point(f64, Point),
    Directional(f64, Direction),
}
