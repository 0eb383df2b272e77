use std::{error, fmt};

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No package or animation has the requested name.
    NotFound {
        /// What was looked up ("package" or "animation").
        kind: &'static str,
        /// The requested name.
        name: String,
    },

    /// The requested frame time is not part of the animation.
    FrameOutOfRange {
        /// The requested frame time.
        frame: usize,
        /// The number of frame times in the animation.
        frame_count: usize,
    },

    /// The animation was left out while decoding because it uses an unsupported feature.
    UnsupportedFeature {
        /// Name of the offending field.
        feature: &'static str,
    },

    /// A part is stored out of order, or its parent does not come before it.
    InvalidHierarchy {
        /// Position of the offending part in its package.
        part: usize,
        /// The parent index stored in the part.
        parent: i16,
    },

    /// A part shows a cell that does not exist.
    InvalidCellIndex {
        /// Index of the offending part.
        part: usize,
        /// The cell index the part resolved to.
        cell: i16,
    },
}

impl error::Error for ResolveError {}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NotFound { kind, ref name } => write!(f, "{kind} not found: {name:?}"),
            Self::FrameOutOfRange { frame, frame_count } => {
                write!(f, "frame {frame} is out of range (animation has {frame_count} frames)")
            }
            Self::UnsupportedFeature { feature } => {
                write!(f, "animation was not decoded: unsupported feature: {feature}")
            }
            Self::InvalidHierarchy { part, parent } => {
                write!(f, "part {part} has an invalid parent index: {parent}")
            }
            Self::InvalidCellIndex { part, cell } => {
                write!(f, "part {part} refers to a missing cell: {cell}")
            }
        }
    }
}
