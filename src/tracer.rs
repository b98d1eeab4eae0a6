use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use image::RgbImage;
use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, debug_span, info};

use crate::camera::Camera;
use crate::color::Color;
use crate::linalg::{reflect, to_text, Direction, Point};
use crate::scene::Scene;

/// Casts one ray per pixel and follows mirror reflections up to a fixed depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RayTracer {
    pub max_reflections: u32,
    /// Render scanlines on the rayon thread pool instead of one after another.
    pub parallel: bool,
    /// Pixel `(column, row)` whose rays are reported at debug level.
    pub debug_pixel: Option<(u32, u32)>,
}

impl Default for RayTracer {
    fn default() -> Self {
        Self {
            max_reflections: 0,
            parallel: true,
            debug_pixel: None,
        }
    }
}

impl RayTracer {
    pub fn new(max_reflections: u32, parallel: bool) -> Self {
        Self {
            max_reflections,
            parallel,
            debug_pixel: None,
        }
    }

    /// Color seen from `o` along `d`, following at most `depth` reflections.
    pub fn trace(&self, scene: &Scene, o: &Point, d: &Direction, depth: u32) -> Color {
        trace_ray(scene, o, d, depth, &mut 0, false)
    }

    pub fn render(&self, scene: &Scene, camera: &Camera, progress: &ProgressBar) -> RgbImage {
        let mut image = RgbImage::new(camera.columns(), camera.rows());
        let row_length = camera.columns() as usize * 3;
        let reflections = AtomicU64::new(0);
        let start = Instant::now();

        let render_row = |(row, pixels): (usize, &mut [u8])| {
            let mut bounces = 0;
            for (column, pixel) in pixels.chunks_exact_mut(3).enumerate() {
                let color = self.render_pixel(scene, camera, column as u32, row as u32, &mut bounces);
                pixel.copy_from_slice(&[color.r, color.g, color.b]);
            }
            reflections.fetch_add(bounces, Ordering::Relaxed);
            progress.inc(1);
        };

        if self.parallel {
            info!("rendering on {} threads", rayon::current_num_threads());
            image.par_chunks_mut(row_length).enumerate().for_each(render_row);
        } else {
            image.chunks_mut(row_length).enumerate().for_each(render_row);
        }

        info!(
            "rendered {}x{} pixels with {} reflected rays in {:.2?}",
            camera.columns(),
            camera.rows(),
            reflections.load(Ordering::Relaxed),
            start.elapsed()
        );
        image
    }

    fn render_pixel(
        &self,
        scene: &Scene,
        camera: &Camera,
        column: u32,
        row: u32,
        bounces: &mut u64,
    ) -> Color {
        let d = camera.pixel_direction(column, row);
        if self.debug_pixel != Some((column, row)) {
            return trace_ray(scene, camera.position(), &d, self.max_reflections, bounces, false);
        }

        let _span = debug_span!("pixel", column, row).entered();
        debug!(
            position = %to_text(&camera.pixel_position(column, row).coords),
            direction = %to_text(&d),
            "primary ray"
        );
        let color = trace_ray(scene, camera.position(), &d, self.max_reflections, bounces, true);
        debug!(%color, "pixel color");
        color
    }
}

/// Counts every reflected ray it casts in `bounces`.
///
/// Surfaces met on the way out are stacked, then blended back from the last
/// one, so the depth is not limited by the call stack.
fn trace_ray(
    scene: &Scene,
    o: &Point,
    d: &Direction,
    depth: u32,
    bounces: &mut u64,
    verbose: bool,
) -> Color {
    let mut mirrors: Vec<(Color, f64)> = Vec::new();
    let (mut o, mut d) = (*o, *d);
    let mut depth = depth;

    let mut color = loop {
        let impact = scene.intersect(&o, &d);
        if verbose {
            debug!(depth, ?impact, "impact");
        }

        let local = match &impact.normal {
            Some(n) => Color::from_vector(&(impact.color.to_vector() * (-d.dot(&n.into_inner())).max(0.))),
            None => impact.color,
        };

        match (impact.position, impact.normal) {
            (Some(p), Some(n)) if depth > 0 && impact.reflectivity > 0. => {
                // mirror image of the incoming ray, pointing away from the surface
                let reflected = reflect(&d, &n);
                if verbose {
                    debug!(from = %to_text(&p.coords), direction = %to_text(&reflected), "reflection");
                }
                *bounces += 1;
                mirrors.push((local, impact.reflectivity));
                o = p;
                d = reflected;
                depth -= 1;
            }
            _ => break local,
        }
    };

    while let Some((local, r)) = mirrors.pop() {
        color = Color::from_vector(&(local.to_vector() * (1. - r) + color.to_vector() * r));
    }
    color
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::background::{Background, CubeFaces};
    use crate::linalg::{normalize, Vector};
    use crate::object::Object;
    use crate::shape::Shape;
    use crate::texture::Texture;
    use image::Rgb;

    const RED: Color = Color::new(200, 0, 0);
    const GREEN: Color = Color::new(0, 200, 0);

    /// Two mirrors facing each other across the origin, at x = -2 and x = 2.
    fn corridor(reflectivity: f64) -> Scene {
        let left = Shape::rectangle(
            Point::new(-2., -1., 1.),
            Point::new(-2., -1., -1.),
            Point::new(-2., 1., -1.),
            Point::new(-2., 1., 1.),
        )
        .unwrap();
        let right = Shape::rectangle(
            Point::new(2., 1., 1.),
            Point::new(2., 1., -1.),
            Point::new(2., -1., -1.),
            Point::new(2., -1., 1.),
        )
        .unwrap();
        let mut scene = Scene::new(Background::Monochrome(Color::BLACK));
        scene.add_object(Object::new(left, RED).with_reflectivity(reflectivity).unwrap());
        scene.add_object(Object::new(right, GREEN).with_reflectivity(reflectivity).unwrap());
        scene
    }

    fn along_x() -> Direction {
        Direction::new_unchecked(Vector::x())
    }

    #[test]
    fn test_reflections_are_bounded() {
        let scene = corridor(1.);
        for depth in 0..6 {
            let mut bounces = 0;
            trace_ray(&scene, &Point::origin(), &along_x(), depth, &mut bounces, false);
            assert_eq!(depth as u64, bounces);
        }
    }

    #[test]
    fn test_deep_reflections() {
        let scene = corridor(0.5);
        let mut bounces = 0;
        let color = trace_ray(&scene, &Point::origin(), &along_x(), 200_000, &mut bounces, false);
        assert_eq!(200_000, bounces);
        // the truncated blend settles long before the innermost mirror
        assert_eq!(Color::new(66, 133, 0), color);

        let camera = Camera::new(Point::origin(), &Vector::x(), &Vector::z(), 1., 1, 1).unwrap();
        let image = RayTracer::new(20_000, true).render(&scene, &camera, &ProgressBar::hidden());
        assert_eq!(Rgb([color.r, color.g, color.b]), *image.get_pixel(0, 0));
    }

    #[test]
    fn test_reflection_blend() {
        let scene = corridor(0.5);
        let tracer = RayTracer::default();
        let o = Point::origin();
        assert_eq!(GREEN, tracer.trace(&scene, &o, &along_x(), 0));
        // half green, half the red mirror seen in it
        assert_eq!(Color::new(100, 100, 0), tracer.trace(&scene, &o, &along_x(), 1));
        // the red mirror itself reflects the green one
        assert_eq!(Color::new(50, 150, 0), tracer.trace(&scene, &o, &along_x(), 2));
    }

    #[test]
    fn test_view_angle_attenuation() {
        let floor = Shape::rectangle(
            Point::new(-5., 5., 0.),
            Point::new(-5., -5., 0.),
            Point::new(5., -5., 0.),
            Point::new(5., 5., 0.),
        )
        .unwrap();
        let mut scene = Scene::default();
        scene.add_object(Object::new(floor, Color::new(200, 100, 0)));

        let tracer = RayTracer::default();
        let o = Point::new(0., 0., 1.);
        let straight = Direction::new_unchecked(-Vector::z());
        assert_eq!(Color::new(200, 100, 0), tracer.trace(&scene, &o, &straight, 3));
        // cos 45 = 0.7071
        let slanted = normalize(&Vector::new(1., 0., -1.)).unwrap();
        assert_eq!(Color::new(141, 70, 0), tracer.trace(&scene, &o, &slanted, 3));
    }

    #[test]
    fn test_background_is_not_reflected() {
        let sky = Texture::from_image(RgbImage::from_fn(10, 10, |c, r| Rgb([c as u8 * 20, r as u8 * 20, 9]))).unwrap();
        let scene = Scene::new(Background::Cubic(CubeFaces::uniform(sky)));
        let mut bounces = 0;
        let color = trace_ray(&scene, &Point::origin(), &along_x(), 5, &mut bounces, false);
        assert_eq!(Color::new(100, 100, 9), color);
        assert_eq!(0, bounces);

        let scene = Scene::new(Background::Monochrome(RED));
        let d = normalize(&Vector::new(1., 2., 3.)).unwrap();
        assert_eq!(RED, RayTracer::default().trace(&scene, &Point::origin(), &d, 5));
    }

    fn spheres() -> Scene {
        let mut scene = Scene::new(Background::Monochrome(Color::named("bleu").unwrap()));
        scene.add_object(
            Object::new(Shape::sphere(Point::new(4., 0., 0.), 1.).unwrap(), RED)
                .with_reflectivity(0.3)
                .unwrap(),
        );
        scene.add_object(Object::new(Shape::cube(Point::new(4., 1.5, 1.), 1.).unwrap(), GREEN));
        scene
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scene = spheres();
        let camera = Camera::new(Point::origin(), &Vector::x(), &Vector::z(), 1., 24, 16).unwrap();
        let progress = ProgressBar::hidden();

        let parallel = RayTracer::new(2, true).render(&scene, &camera, &progress);
        let sequential = RayTracer::new(2, false).render(&scene, &camera, &progress);
        assert_eq!(parallel, sequential);
        assert_eq!((24, 16), parallel.dimensions());
        // the center of the screen sees the sphere
        assert_ne!(Rgb([0, 0, 255]), *parallel.get_pixel(12, 8));
        // the corners see the sky
        assert_eq!(Rgb([0, 0, 255]), *parallel.get_pixel(0, 15));
    }

    #[test]
    fn test_progress_counts_rows() {
        let progress = ProgressBar::hidden();
        let camera = Camera::new(Point::origin(), &Vector::x(), &Vector::z(), 1., 5, 7).unwrap();
        RayTracer::default().render(&spheres(), &camera, &progress);
        assert_eq!(7, progress.position());
    }

    #[test]
    fn test_debug_pixel_renders_the_same() {
        let scene = spheres();
        let camera = Camera::new(Point::origin(), &Vector::x(), &Vector::z(), 1., 8, 8).unwrap();
        let mut tracer = RayTracer::new(1, false);
        let plain = tracer.render(&scene, &camera, &ProgressBar::hidden());
        tracer.debug_pixel = Some((4, 4));
        let traced = tracer.render(&scene, &camera, &ProgressBar::hidden());
        assert_eq!(plain, traced);
    }
}
