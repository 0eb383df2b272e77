use std::{error, fmt, io};

#[non_exhaustive]
#[derive(Debug)]
pub enum DecodeError {
    /// An error occurred while attempting to read from a file.
    ReadFailure {
        /// The underlying error that caused the failure.
        source: io::Error,
    },

    /// Attempted to read more bytes than were available.
    NotEnoughBytes {
        /// Where the read started.
        offset: usize,
        /// The number of bytes needed to complete the operation.
        needed: usize,
    },

    /// The data does not start with the SSBP signature.
    InvalidSignature {
        /// The first four bytes, as a little-endian integer.
        actual: u32,
    },

    /// A pointer refers to an offset outside of the data.
    InvalidPointer {
        /// The offending absolute offset.
        pointer: u32,
    },

    /// A record refers to a part index that cannot exist.
    InvalidPartIndex {
        /// The index stored in the record.
        index: i16,
    },

    /// The frame tables reference more keyframes than the data can hold.
    ///
    /// Each keyframe record takes at least [`MIN_KEYFRAME_SIZE`](super::MIN_KEYFRAME_SIZE) bytes,
    /// so this only happens when frame pointers reuse the same records.
    TooManyKeyframes {
        /// Where the offending frame block starts.
        pointer: u32,
    },

    /// The data uses a feature this decoder does not implement.
    ///
    /// This is not a malformed file; the decoder has to be extended to read it.
    UnsupportedFeature {
        /// Name of the offending field.
        feature: &'static str,
    },
}

impl DecodeError {
    /// Whether this error only concerns the animation being decoded.
    ///
    /// Every other error means the file itself cannot be trusted.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFeature { .. })
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Self::ReadFailure { ref source } => Some(source),
            Self::NotEnoughBytes { .. }
            | Self::InvalidSignature { .. }
            | Self::InvalidPointer { .. }
            | Self::InvalidPartIndex { .. }
            | Self::TooManyKeyframes { .. }
            | Self::UnsupportedFeature { .. } => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ReadFailure { .. } => "failed to read SSBP file".fmt(f),
            Self::NotEnoughBytes { offset, needed } => {
                write!(
                    f,
                    "not enough data at offset {offset:#x} (needed {needed} additional bytes)"
                )
            }
            Self::InvalidSignature { actual } => {
                write!(f, "expected file signature {:#010x}, got {actual:#010x}", super::SIGNATURE)
            }
            Self::InvalidPointer { pointer } => {
                write!(f, "pointer {pointer:#x} is outside of the data")
            }
            Self::InvalidPartIndex { index } => write!(f, "invalid part index: {index}"),
            Self::TooManyKeyframes { pointer } => {
                write!(f, "frame block at {pointer:#x} exceeds the keyframes the data can hold")
            }
            Self::UnsupportedFeature { feature } => write!(f, "unsupported feature: {feature}"),
        }
    }
}
