use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::linalg::Vector;

/// An image sampled with relative coordinates in [0, 1) x [0, 1).
///
/// `u` runs left to right over the columns, `v` top to bottom over the rows.
pub struct Texture {
    source: Option<PathBuf>,
    image: RgbImage,
}

impl Texture {
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|source| Error::Image {
                path: path.to_owned(),
                source,
            })?
            .to_rgb8();
        let texture = Self::from_image(image)
            .map_err(|_| Error::Config(format!("texture {} is empty", path.display())))?;
        Ok(Self {
            source: Some(path.to_owned()),
            ..texture
        })
    }

    pub fn from_image(image: RgbImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::Config("texture is empty".into()));
        }
        Ok(Self { source: None, image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, column: u32, row: u32) -> Color {
        (*self.image.get_pixel(column, row)).into()
    }

    /// Color at relative coordinates `(u, v)`.
    ///
    /// Callers are expected to pass values in [0, 1); anything outside is
    /// clamped to the border pixels rather than panicking.
    pub fn sample(&self, u: f64, v: f64) -> Color {
        let column = (u * self.width() as f64).floor().max(0.) as u32;
        let row = (v * self.height() as f64).floor().max(0.) as u32;
        self.pixel(column.min(self.width() - 1), row.min(self.height() - 1))
    }

    /// Channel-wise average of one row, truncated.
    pub fn row_average(&self, row: u32) -> Color {
        let sum: Vector = (0..self.width())
            .map(|column| self.pixel(column, row).to_vector())
            .sum();
        Color::from_vector(&(sum / self.width() as f64))
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("source", &self.source)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl fmt::Display for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(path) => write!(f, "\"{}\"", path.display()),
            None => write!(f, "<{}x{} image>", self.width(), self.height()),
        }
    }
}
