use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use nalgebra::Unit;

use crate::color::Color;
use crate::impact::Impact;
use crate::linalg::{Direction, Vector, EPSILON};
use crate::texture::Texture;

/// The six textures of a cube surrounding the scene.
///
/// `(1, 0, 0)` points at the center of `front`, `(0, 1, 0)` at `right` and
/// `(0, 0, 1)` at `top`. Faces may share the same texture.
#[derive(Clone, Debug)]
pub struct CubeFaces {
    pub front: Arc<Texture>,
    pub back: Arc<Texture>,
    pub left: Arc<Texture>,
    pub right: Arc<Texture>,
    pub top: Arc<Texture>,
    pub bottom: Arc<Texture>,
}

impl CubeFaces {
    pub fn uniform(texture: Texture) -> Self {
        let texture = Arc::new(texture);
        Self {
            front: texture.clone(),
            back: texture.clone(),
            left: texture.clone(),
            right: texture.clone(),
            top: texture.clone(),
            bottom: texture,
        }
    }
}

/// What a ray sees when it leaves the scene. Impacts have no position and an
/// infinite distance.
#[derive(Debug)]
pub enum Background {
    Monochrome(Color),
    Cubic(CubeFaces),
    /// Panorama wrapped around a vertical cylinder; directions steeper than
    /// 45 degrees see the average color of the top or bottom row.
    Cylindrical {
        texture: Texture,
        top: Color,
        bottom: Color,
    },
    /// One texture per hemisphere. The projection is knowingly distorting.
    Spherical { upper: Texture, lower: Texture },
}

impl Default for Background {
    fn default() -> Self {
        Self::Monochrome(Color::WHITE)
    }
}

impl Background {
    pub fn cylindrical(texture: Texture) -> Self {
        let top = texture.row_average(0);
        let bottom = texture.row_average(texture.height() - 1);
        Self::Cylindrical {
            texture,
            top,
            bottom,
        }
    }

    pub fn map_direction(&self, d: &Direction) -> Impact {
        let (x, y, z) = (d.x, d.y, d.z);
        match self {
            Self::Monochrome(color) => Impact::color_only(*color),
            Self::Cubic(faces) => {
                let (texture, canonical, normal) = cube_face(faces, x, y, z);
                Impact::color_and_normal(
                    sample_cube_face(texture, &canonical),
                    Unit::new_unchecked(normal),
                )
            }
            Self::Cylindrical {
                texture,
                top,
                bottom,
            } => {
                let color = if z * z < x * x + y * y {
                    let u = (y.atan2(x) + PI) / (2. * PI);
                    let v = (1. - z / d.norm()) / 2.;
                    texture.sample(below_one(u), below_one(v))
                } else if z > 0. {
                    *top
                } else {
                    *bottom
                };
                Impact::color_only(color)
            }
            Self::Spherical { upper, lower } => {
                let texture = if z >= 0. { upper } else { lower };
                Impact::color_only(texture.sample(0.5 + x / 2., 0.5 + y / 2.))
            }
        }
    }
}

/// Picks the face a direction points at, the direction rotated so that face
/// is in front (`x >= |y|`, `x >= |z|`), and the normal of that face.
fn cube_face(faces: &CubeFaces, x: f64, y: f64, z: f64) -> (&Texture, Vector, Vector) {
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
    if ax >= ay.max(az) {
        if x > 0. {
            (&*faces.front, Vector::new(x, y, z), -Vector::x())
        } else {
            (&*faces.back, Vector::new(-x, y, z), Vector::x())
        }
    } else if ay >= ax.max(az) {
        if y > 0. {
            (&*faces.right, Vector::new(y, -x, z), -Vector::y())
        } else {
            (&*faces.left, Vector::new(-y, x, z), Vector::y())
        }
    } else if z > 0. {
        (&*faces.top, Vector::new(z, y, -x), -Vector::z())
    } else {
        (&*faces.bottom, Vector::new(-z, y, x), Vector::z())
    }
}

fn sample_cube_face(texture: &Texture, canonical: &Vector) -> Color {
    let u = (canonical.y / canonical.x + 1.) / 2.;
    let v = (1. - canonical.z / canonical.x) / 2.;
    texture.sample(below_one(u), below_one(v))
}

/// Keeps a relative coordinate inside the half-open range [0, 1).
fn below_one(s: f64) -> f64 {
    s.max(0.).min(1. - EPSILON)
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monochrome(color) => write!(f, "monochrome {}", color),
            Self::Cubic(faces) => write!(
                f,
                "cubic (front {}, back {}, left {}, right {}, top {}, bottom {})",
                faces.front, faces.back, faces.left, faces.right, faces.top, faces.bottom
            ),
            Self::Cylindrical { texture, .. } => write!(f, "cylindrical {}", texture),
            Self::Spherical { upper, lower } => {
                write!(f, "spherical (upper {}, lower {})", upper, lower)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::linalg::normalize;
    use image::{Rgb, RgbImage};

    fn dir(x: f64, y: f64, z: f64) -> Direction {
        normalize(&Vector::new(x, y, z)).unwrap()
    }

    /// 100x100 texture whose pixel (c, r) is (c, r, tag).
    fn coordinates(tag: u8) -> Texture {
        Texture::from_image(RgbImage::from_fn(100, 100, |c, r| Rgb([c as u8, r as u8, tag]))).unwrap()
    }

    fn cube() -> Background {
        Background::Cubic(CubeFaces {
            front: Arc::new(coordinates(1)),
            back: Arc::new(coordinates(2)),
            left: Arc::new(coordinates(3)),
            right: Arc::new(coordinates(4)),
            top: Arc::new(coordinates(5)),
            bottom: Arc::new(coordinates(6)),
        })
    }

    #[test]
    fn test_default_is_white() {
        let impact = Background::default().map_direction(&dir(0.3, -1., 2.));
        assert_eq!(Impact::color_only(Color::WHITE), impact);
        assert_eq!(f64::INFINITY, impact.distance_squared);
        assert!(!impact.is_hit());
    }

    #[test]
    fn test_cubic_front_center() {
        let impact = cube().map_direction(&dir(1., 0., 0.));
        // u = v = 0.5 on a 100 pixel face
        assert_eq!(Color::new(50, 50, 1), impact.color);
        assert_eq!(-Vector::x(), impact.normal.unwrap().into_inner());
        assert_eq!(None, impact.position);
        assert_eq!(f64::INFINITY, impact.distance_squared);
    }

    #[test]
    fn test_cubic_faces() {
        let background = cube();
        let face = |x, y, z| {
            let impact = background.map_direction(&dir(x, y, z));
            (impact.color.b, impact.normal.unwrap().into_inner())
        };
        assert_eq!((2, Vector::x()), face(-1., 0., 0.));
        assert_eq!((3, Vector::y()), face(0., -1., 0.));
        assert_eq!((4, -Vector::y()), face(0., 1., 0.));
        assert_eq!((5, -Vector::z()), face(0., 0., 1.));
        assert_eq!((6, Vector::z()), face(0., 0., -1.));
    }

    #[test]
    fn test_cubic_front_orientation() {
        let background = cube();
        // +y is the right of the front face, +z its top
        let right = background.map_direction(&dir(1., 0.46, 0.)).color;
        assert_eq!(Color::new(73, 50, 1), right);
        let up = background.map_direction(&dir(1., 0., 0.46)).color;
        assert_eq!(Color::new(50, 27, 1), up);
    }

    #[test]
    fn test_cubic_edges_stay_in_texture() {
        let background = cube();
        // y == x gives u == 1, which is pulled back inside
        let edge = background.map_direction(&dir(1., 1., -1.)).color;
        assert_eq!(99, edge.r);
        assert_eq!(99, edge.g);
    }

    #[test]
    fn test_cylindrical() {
        let mut image = RgbImage::from_fn(8, 4, |c, _| Rgb([c as u8 * 10, 0, 0]));
        for c in 0..8 {
            image.put_pixel(c, 0, Rgb([0, 200, c as u8]));
            image.put_pixel(c, 3, Rgb([0, 0, 100]));
        }
        let background = Background::cylindrical(Texture::from_image(image).unwrap());

        // (1, 0, 0): atan2 = 0 -> u = 0.5 -> column 4; v = 0.5 -> row 2
        assert_eq!(Color::new(40, 0, 0), background.map_direction(&dir(1., 0., 0.)).color);
        // (-1, 0, 0): atan2 = pi -> u = 1, clamped to the last column
        assert_eq!(Color::new(70, 0, 0), background.map_direction(&dir(-1., 0., 0.)).color);

        // outside the band: average of the first / last row, (0+1+...+7)/8 = 3
        assert_eq!(Color::new(0, 200, 3), background.map_direction(&dir(0.1, 0., 1.)).color);
        assert_eq!(Color::new(0, 0, 100), background.map_direction(&dir(0., 0.1, -1.)).color);

        let impact = background.map_direction(&dir(0., 0., 1.));
        assert_eq!(None, impact.normal);
        assert_eq!(f64::INFINITY, impact.distance_squared);
    }

    #[test]
    fn test_spherical() {
        let background = Background::Spherical {
            upper: coordinates(1),
            lower: coordinates(2),
        };
        assert_eq!(Color::new(50, 50, 1), background.map_direction(&dir(0., 0., 1.)).color);
        assert_eq!(Color::new(50, 50, 2), background.map_direction(&dir(0., 0., -1.)).color);
        // x = 0.55 -> u = 0.775; y = -0.35 -> v = 0.325
        let d = dir(0.55, -0.35, 0.575f64.sqrt());
        assert_eq!(Color::new(77, 32, 1), background.map_direction(&d).color);
    }
}
