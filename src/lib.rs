pub mod background;
pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod impact;
pub mod linalg;
pub mod object;
pub mod output;
pub mod scene;
pub mod shape;
pub mod texture;
pub mod tracer;

pub use background::{Background, CubeFaces};
pub use camera::Camera;
pub use color::Color;
pub use config::{load, Description, Render};
pub use error::{Error, Result};
pub use impact::Impact;
pub use object::{Light, Object};
pub use scene::Scene;
pub use shape::Shape;
pub use texture::Texture;
pub use tracer::RayTracer;
