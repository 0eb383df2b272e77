use std::path::PathBuf;
use std::{error, fmt};

/// Why a single part was left out of a frame.
#[non_exhaustive]
#[derive(Debug)]
pub enum RenderError {
    /// The cell's bitmap does not exist.
    MissingAsset {
        /// Name of the cell.
        cell: String,
        /// Where the bitmap was expected.
        path: PathBuf,
    },

    /// The part uses a feature the compositor cannot draw.
    UnsupportedFeature {
        /// Index of the part.
        part: usize,
        /// Name of the offending feature.
        feature: &'static str,
    },

    /// The cell's bitmap exists but could not be loaded.
    Image {
        /// The source of the error.
        source: image::ImageError,
    },
}

impl error::Error for RenderError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Self::Image { ref source } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MissingAsset { ref cell, ref path } => {
                write!(f, "bitmap for cell {cell:?} not found at {}", path.display())
            }
            Self::UnsupportedFeature { part, feature } => {
                write!(f, "part {part} uses an unsupported feature: {feature}")
            }
            Self::Image { .. } => write!(f, "failed to load cell bitmap"),
        }
    }
}
