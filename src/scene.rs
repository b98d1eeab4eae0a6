use crate::background::Background;
use crate::impact::Impact;
use crate::linalg::{Direction, Point};
use crate::object::{Light, Object};

#[derive(Debug, Default)]
pub struct Scene {
    pub objects: Vec<Object>,
    pub lights: Vec<Light>,
    pub background: Background,
}

impl Scene {
    pub fn new(background: Background) -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            background,
        }
    }

    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Nearest object hit along the ray, or what the background shows in
    /// that direction. Among equally distant hits the first object added wins.
    pub fn intersect(&self, o: &Point, d: &Direction) -> Impact {
        self.closest_intersection(o, d)
            .unwrap_or_else(|| self.background.map_direction(d))
    }

    fn closest_intersection(&self, o: &Point, d: &Direction) -> Option<Impact> {
        self.objects
            .iter()
            .filter_map(|object| object.intersect(o, d))
            .fold(None, |acc, impact| match acc {
                Some(closest) if closest.distance_squared <= impact.distance_squared => Some(closest),
                _ => Some(impact),
            })
    }
}
