use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::error::{Error, Result};

/// Image format written for an output path, chosen by its extension.
pub fn output_format(path: &Path) -> Result<ImageFormat> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "gif" => Ok(ImageFormat::Gif),
        "bmp" => Ok(ImageFormat::Bmp),
        _ => Err(Error::UnsupportedFormat(extension)),
    }
}

pub fn save(image: &RgbImage, path: &Path) -> Result<()> {
    let format = output_format(path)?;
    image
        .save_with_format(path, format)
        .map_err(|source| Error::Image {
            path: path.to_owned(),
            source,
        })
}
