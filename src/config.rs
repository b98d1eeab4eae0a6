use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::background::{Background, CubeFaces};
use crate::camera::Camera;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::linalg::{normalize, parse_point, parse_vector};
use crate::object::{Light, Object};
use crate::output::output_format;
use crate::scene::Scene;
use crate::shape::Shape;
use crate::texture::Texture;
use crate::tracer::RayTracer;

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RayTracerData {
    pub max_reflections: u32,
    pub parallel: bool,
    pub debug_pixel: Option<(u32, u32)>,
}

impl Default for RayTracerData {
    fn default() -> Self {
        Self {
            max_reflections: 0,
            parallel: true,
            debug_pixel: None,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CameraData {
    pub position: String,
    pub look_direction: String,
    pub up_direction: String,
    pub screen_distance: f64,
    pub image_columns: u32,
    pub image_rows: u32,
    pub output_image_path: PathBuf,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ObjectData {
    Sphere {
        center: String,
        radius: f64,
        color: String,
        #[serde(default)]
        reflectivity: f64,
    },
    Cube {
        center: String,
        size: f64,
        color: Option<String>,
        #[serde(default)]
        reflectivity: f64,
    },
    /// Corners go top-left, bottom-left, bottom-right, top-right as seen
    /// from the visible side.
    Rectangle {
        corners: [String; 4],
        color: String,
        texture: Option<PathBuf>,
        #[serde(default)]
        reflectivity: f64,
    },
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum BackgroundData {
    Monochrome {
        color: String,
    },
    /// Either one `image` for every face or all six faces; the faces win.
    Cubic {
        image: Option<PathBuf>,
        front: Option<PathBuf>,
        back: Option<PathBuf>,
        left: Option<PathBuf>,
        right: Option<PathBuf>,
        top: Option<PathBuf>,
        bottom: Option<PathBuf>,
    },
    Cylindrical {
        image: PathBuf,
    },
    Spherical {
        top: PathBuf,
        bottom: PathBuf,
    },
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum LightData {
    Ambient { intensity: f64 },
    Point { intensity: f64, position: String },
    Directional { intensity: f64, direction: String },
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SceneData {
    #[serde(default)]
    pub objects: Vec<ObjectData>,
    pub background: Option<BackgroundData>,
    #[serde(default)]
    pub lights: Vec<LightData>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionData {
    #[serde(default)]
    pub ray_tracer: RayTracerData,
    pub camera: Option<CameraData>,
    #[serde(default)]
    pub cameras: Vec<CameraData>,
    pub scene: SceneData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// TOML for `.toml` files, JSON for everything else.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// One image to produce.
#[derive(Debug)]
pub struct Render {
    pub camera: Camera,
    pub output: PathBuf,
}

/// Everything needed to produce the images of a description.
#[derive(Debug)]
pub struct Description {
    pub ray_tracer: RayTracer,
    pub scene: Scene,
    pub renders: Vec<Render>,
}

/// Reads a description file. Relative paths inside it are taken from the
/// directory holding the file.
pub fn load(path: &Path) -> Result<Description> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    parse(&text, Format::of(path), base)
        .map_err(|error| match error {
            Error::Config(message) => Error::Config(format!("{}: {}", path.display(), message)),
            other => other,
        })
}

pub fn parse(text: &str, format: Format, base: &Path) -> Result<Description> {
    let data: DescriptionData = match format {
        Format::Json => serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?,
        Format::Toml => toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?,
    };
    debug!(?data, "parsed description");
    data.build(base)
}

impl DescriptionData {
    pub fn build(self, base: &Path) -> Result<Description> {
        let mut cameras = Vec::new();
        if let Some(camera) = &self.camera {
            cameras.push(("camera".to_owned(), camera));
        }
        for (i, camera) in self.cameras.iter().enumerate() {
            cameras.push((format!("cameras[{}]", i), camera));
        }
        if cameras.is_empty() {
            return Err(Error::Config(
                "missing field `camera` (or a non-empty `cameras` list)".into(),
            ));
        }

        let renders = cameras
            .into_iter()
            .map(|(field, camera)| camera.build(base).map_err(|e| e.in_field(&field)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Description {
            ray_tracer: self.ray_tracer.build(),
            scene: self.scene.build(base).map_err(|e| e.in_field("scene"))?,
            renders,
        })
    }
}

impl RayTracerData {
    pub fn build(&self) -> RayTracer {
        RayTracer {
            max_reflections: self.max_reflections,
            parallel: self.parallel,
            debug_pixel: self.debug_pixel,
        }
    }
}

impl CameraData {
    pub fn build(&self, base: &Path) -> Result<Render> {
        let position = parse_point(&self.position).map_err(|e| e.in_field("position"))?;
        let look = parse_vector(&self.look_direction).map_err(|e| e.in_field("lookDirection"))?;
        let up = parse_vector(&self.up_direction).map_err(|e| e.in_field("upDirection"))?;
        let camera = Camera::new(
            position,
            &look,
            &up,
            self.screen_distance,
            self.image_columns,
            self.image_rows,
        )?;
        let output = base.join(&self.output_image_path);
        output_format(&output)?;
        Ok(Render { camera, output })
    }
}

impl SceneData {
    pub fn build(self, base: &Path) -> Result<Scene> {
        let background = match &self.background {
            Some(background) => background.build(base).map_err(|e| e.in_field("background"))?,
            None => Background::default(),
        };
        let mut scene = Scene::new(background);
        for (i, object) in self.objects.iter().enumerate() {
            let object = object
                .build(base)
                .map_err(|e| e.in_field(&format!("objects[{}]", i)))?;
            scene.add_object(object);
        }
        for (i, light) in self.lights.iter().enumerate() {
            let light = light.build().map_err(|e| e.in_field(&format!("lights[{}]", i)))?;
            scene.add_light(light);
        }
        Ok(scene)
    }
}

fn parse_color(text: &str) -> Result<Color> {
    text.parse::<Color>().map_err(|e| e.in_field("color"))
}

impl ObjectData {
    pub fn build(&self, base: &Path) -> Result<Object> {
        let object = match self {
            Self::Sphere {
                center,
                radius,
                color,
                reflectivity,
            } => {
                let center = parse_point(center).map_err(|e| e.in_field("center"))?;
                let shape = Shape::sphere(center, *radius).map_err(|e| e.in_field("radius"))?;
                Object::new(shape, parse_color(color)?).with_reflectivity(*reflectivity)
            }
            Self::Cube {
                center,
                size,
                color,
                reflectivity,
            } => {
                let center = parse_point(center).map_err(|e| e.in_field("center"))?;
                let shape = Shape::cube(center, *size).map_err(|e| e.in_field("size"))?;
                let color = match color {
                    Some(color) => parse_color(color)?,
                    None => Color::WHITE,
                };
                Object::new(shape, color).with_reflectivity(*reflectivity)
            }
            Self::Rectangle {
                corners,
                color,
                texture,
                reflectivity,
            } => {
                let mut points = Vec::with_capacity(4);
                for (i, corner) in corners.iter().enumerate() {
                    points.push(parse_point(corner).map_err(|e| e.in_field(&format!("corners[{}]", i)))?);
                }
                let shape = Shape::rectangle(points[0], points[1], points[2], points[3])
                    .map_err(|e| e.in_field("corners"))?;
                let mut object = Object::new(shape, parse_color(color)?);
                if let Some(texture) = texture {
                    object = object.with_texture(Texture::open(&base.join(texture))?);
                }
                object.with_reflectivity(*reflectivity)
            }
        };
        object.map_err(|e| e.in_field("reflectivity"))
    }
}

impl BackgroundData {
    pub fn build(&self, base: &Path) -> Result<Background> {
        let open = |path: &PathBuf| Texture::open(&base.join(path));
        let background = match self {
            Self::Monochrome { color } => Background::Monochrome(parse_color(color)?),
            Self::Cubic {
                front: Some(front),
                back: Some(back),
                left: Some(left),
                right: Some(right),
                top: Some(top),
                bottom: Some(bottom),
                ..
            } => Background::Cubic(CubeFaces {
                front: Arc::new(open(front)?),
                back: Arc::new(open(back)?),
                left: Arc::new(open(left)?),
                right: Arc::new(open(right)?),
                top: Arc::new(open(top)?),
                bottom: Arc::new(open(bottom)?),
            }),
            Self::Cubic {
                image: Some(image), ..
            } => Background::Cubic(CubeFaces::uniform(open(image)?)),
            Self::Cubic { .. } => {
                return Err(Error::Config(
                    "cubic background needs `image` or all of `front`, `back`, `left`, `right`, `top` and `bottom`".into(),
                ))
            }
            Self::Cylindrical { image } => Background::cylindrical(open(image)?),
            Self::Spherical { top, bottom } => Background::Spherical {
                upper: open(top)?,
                lower: open(bottom)?,
            },
        };
        Ok(background)
    }
}

impl LightData {
    pub fn build(&self) -> Result<Light> {
        let light = match self {
            Self::Ambient { intensity } => Light::Ambient(*intensity),
            Self::Point {
                intensity,
                position,
            } => Light::Point(
                *intensity,
                parse_point(position).map_err(|e| e.in_field("position"))?,
            ),
            Self::Directional {
                intensity,
                direction,
            } => {
                let direction = parse_vector(direction)
                    .and_then(|v| normalize(&v))
                    .map_err(|e| e.in_field("direction"))?;
                Light::Directional(*intensity, direction)
            }
        };
        Ok(light)
    }
}
