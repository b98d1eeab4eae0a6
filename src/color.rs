use std::fmt;
use std::str::FromStr;

use image::Rgb;

use crate::error::{Error, Result};
use crate::linalg::{parse_vector, Vector};

/// 8-bit RGB color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Colors that scene descriptions may refer to by name.
pub const NAMED_COLORS: [(&str, Color); 17] = [
    ("blanc", Color::new(255, 255, 255)),
    ("noir", Color::new(0, 0, 0)),
    ("rouge", Color::new(255, 0, 0)),
    ("vert", Color::new(0, 255, 0)),
    ("bleu", Color::new(0, 0, 255)),
    ("cyan", Color::new(0, 255, 255)),
    ("jaune", Color::new(255, 255, 0)),
    ("magenta", Color::new(255, 0, 255)),
    ("orange", Color::new(237, 127, 16)),
    ("rose", Color::new(253, 108, 158)),
    ("mauve", Color::new(212, 115, 212)),
    ("turquoise", Color::new(37, 253, 233)),
    ("violet", Color::new(102, 0, 153)),
    ("gris", Color::new(96, 96, 96)),
    ("argent", Color::new(206, 206, 206)),
    ("brun", Color::new(91, 60, 17)),
    ("beige", Color::new(200, 173, 127)),
];

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn named(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, color)| *color)
    }

    /// Red in bits 16..24, green in 8..16, blue in 0..8.
    pub fn from_packed(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub fn to_packed(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Channels are clamped to [0, 255] and truncated.
    pub fn from_vector(v: &Vector) -> Self {
        let channel = |c: f64| c.max(0.).min(255.) as u8;
        Self::new(channel(v.x), channel(v.y), channel(v.z))
    }

    pub fn to_vector(self) -> Vector {
        Vector::new(self.r.into(), self.g.into(), self.b.into())
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Accepts a registry name or a literal `(r, g, b)` triple.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(color) = Self::named(s.trim()) {
            return Ok(color);
        }
        let v = parse_vector(s)?;
        let channel = |c: f64| {
            if (0. ..=255.).contains(&c) && c.fract() == 0. {
                Ok(c as u8)
            } else {
                Err(Error::Parse(format!(
                    "color channel {} of `{}` is not an integer in [0, 255]",
                    c, s
                )))
            }
        };
        Ok(Self::new(channel(v.x)?, channel(v.y)?, channel(v.z)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self::new(r, g, b)
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb([color.r, color.g, color.b])
    }
}
