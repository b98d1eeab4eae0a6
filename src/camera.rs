use std::fmt;

use nalgebra::Unit;

use crate::error::{Error, Result};
use crate::linalg::{normalize, to_text, Direction, Point, Vector, EPSILON};

/// A pinhole camera looking through a screen of area 1 placed in front of the eye.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Point,
    look: Direction,
    up: Direction,
    screen_distance: f64,
    columns: u32,
    rows: u32,
    /// Screen corner seen through pixel (0, 0).
    top_left: Point,
    /// Spans the screen width, left to right.
    horizontal: Vector,
    /// Spans the screen height, top to bottom.
    vertical: Vector,
}

impl Camera {
    pub fn new(
        position: Point,
        look: &Vector,
        up: &Vector,
        screen_distance: f64,
        columns: u32,
        rows: u32,
    ) -> Result<Self> {
        if !(screen_distance > 0.) {
            return Err(Error::Geometry(format!(
                "screen distance must be positive, got {}",
                screen_distance
            )));
        }
        if columns == 0 || rows == 0 {
            return Err(Error::Geometry(format!(
                "image must have at least one pixel, got {}x{}",
                columns, rows
            )));
        }
        let look = normalize(look)?;
        let up = normalize(up)?;
        if look.dot(&*up).abs() > EPSILON {
            return Err(Error::Geometry(format!(
                "look direction {} and up direction {} are not orthogonal",
                to_text(&look),
                to_text(&up)
            )));
        }

        let width = (columns as f64 / rows as f64).sqrt();
        let height = 1. / width;
        let horizontal = up.cross(&*look).normalize() * width;
        let vertical = -up.into_inner() * height;
        let top_left =
            position + look.into_inner() * screen_distance - horizontal / 2. - vertical / 2.;

        Ok(Self {
            position,
            look,
            up,
            screen_distance,
            columns,
            rows,
            top_left,
            horizontal,
            vertical,
        })
    }

    pub fn position(&self) -> &Point {
        &self.position
    }

    pub fn look(&self) -> &Direction {
        &self.look
    }

    pub fn up(&self) -> &Direction {
        &self.up
    }

    pub fn screen_distance(&self) -> f64 {
        self.screen_distance
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn top_left(&self) -> &Point {
        &self.top_left
    }

    /// World position of the center of a pixel on the screen.
    pub fn pixel_position(&self, column: u32, row: u32) -> Point {
        let x = (column as f64 + 0.5) / self.columns as f64;
        let y = (row as f64 + 0.5) / self.rows as f64;
        self.top_left + x * self.horizontal + y * self.vertical
    }

    /// Direction of the primary ray leaving the eye through a pixel.
    pub fn pixel_direction(&self, column: u32, row: u32) -> Direction {
        Unit::new_normalize(self.pixel_position(column, row) - self.position)
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "camera at {} looking {} (up {}), screen at {}, {}x{} pixels",
            to_text(&self.position.coords),
            to_text(&self.look),
            to_text(&self.up),
            self.screen_distance,
            self.columns,
            self.rows
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn square(n: u32) -> Camera {
        Camera::new(Point::origin(), &Vector::x(), &Vector::z(), 1., n, n).unwrap()
    }

    #[test]
    fn test_square_screen() {
        let camera = square(10);
        // unit screen one step ahead, columns run along +y, rows along -z
        assert_relative_eq!(Point::new(1., -0.5, 0.5), *camera.top_left(), epsilon = 1e-12);
        assert_relative_eq!(
            Point::new(1., -0.05, 0.05),
            camera.pixel_position(4, 4),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_first_pixel_near_top_left() {
        let n = 16;
        let camera = square(n);
        let pixel = 1. / n as f64;
        let offset = camera.pixel_position(0, 0) - camera.top_left();
        assert!(offset.norm() <= pixel * 0.5f64.sqrt() + EPSILON);
        assert_relative_eq!(pixel / 2., offset.norm() / 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_pixel_direction_is_unit() {
        let camera = Camera::new(
            Point::new(1., 2., 3.),
            &Vector::new(0., 3., 0.),
            &Vector::new(0., 0., 2.),
            2.5,
            64,
            48,
        )
        .unwrap();
        let d = camera.pixel_direction(63, 47);
        assert_relative_eq!(1., d.norm(), epsilon = 1e-12);
        // facing +y with +z up, columns run along up x look = -x
        assert!(d.x < 0.);
        assert!(d.z < 0.);
    }

    #[test]
    fn test_screen_keeps_aspect_and_area() {
        let camera = Camera::new(Point::origin(), &Vector::x(), &Vector::z(), 1., 200, 50).unwrap();
        assert_relative_eq!(2., camera.horizontal.norm(), epsilon = 1e-12);
        assert_relative_eq!(0.5, camera.vertical.norm(), epsilon = 1e-12);
        assert_relative_eq!(
            camera.horizontal.norm() / camera.vertical.norm(),
            200. / 50.,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_center_ray_follows_look() {
        let camera = square(2);
        let center = camera.top_left() + camera.horizontal / 2. + camera.vertical / 2.;
        assert_relative_eq!(Point::new(1., 0., 0.), center, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_cameras() {
        let origin = Point::origin();
        assert!(matches!(
            Camera::new(origin, &Vector::x(), &Vector::new(1., 0., 1.), 1., 4, 4),
            Err(Error::Geometry(_))
        ));
        assert!(matches!(
            Camera::new(origin, &Vector::zeros(), &Vector::z(), 1., 4, 4),
            Err(Error::ZeroLength)
        ));
        assert!(Camera::new(origin, &Vector::x(), &Vector::z(), 0., 4, 4).is_err());
        assert!(Camera::new(origin, &Vector::x(), &Vector::z(), 1., 0, 4).is_err());
    }
}
