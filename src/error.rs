use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Malformed textual vector or color.
    Parse(String),
    /// Attempt to normalize a vector whose norm is (almost) zero.
    ZeroLength,
    /// Degenerate geometry: non-orthogonal camera basis, malformed rectangle, ...
    Geometry(String),
    /// Missing or malformed field in a scene description.
    Config(String),
    Io { path: PathBuf, source: io::Error },
    Image { path: PathBuf, source: image::ImageError },
    UnsupportedFormat(String),
}

impl Error {
    /// Prefixes the message with the description field it was found in.
    pub fn in_field(self, field: &str) -> Self {
        match self {
            Self::Config(message) => Self::Config(format!("{}: {}", field, message)),
            Self::Io { .. } | Self::Image { .. } | Self::UnsupportedFormat(_) => self,
            other => Self::Config(format!("invalid field `{}`: {}", field, other)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "parse error: {}", message),
            Self::ZeroLength => write!(f, "cannot normalize a zero-length vector"),
            Self::Geometry(message) => write!(f, "invalid geometry: {}", message),
            Self::Config(message) => write!(f, "invalid scene description: {}", message),
            Self::Io { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            Self::Image { path, source } => write!(f, "image {}: {}", path.display(), source),
            Self::UnsupportedFormat(extension) => write!(
                f,
                "unsupported image format `{}` (expected png, jpg, jpeg, gif or bmp)",
                extension
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Image { source, .. } => Some(source),
            _ => None,
        }
    }
}
