use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, RgbaImage};

use crate::de::Cell;
use crate::render::RenderError;

/// Provides the standalone bitmap of each cell.
pub trait CellImages {
    /// Load the bitmap of `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingAsset`] if there is no bitmap for the cell, or
    /// [`RenderError::Image`] if it cannot be decoded.
    fn load(&self, cell: &Cell) -> Result<RgbaImage, RenderError>;
}

/// A directory holding one `<cell name>.png` per cell.
#[derive(Debug, Clone)]
pub struct TextureDir {
    root: PathBuf,
}

impl TextureDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the bitmap of `cell` is expected.
    #[must_use]
    pub fn path(&self, cell: &Cell) -> PathBuf {
        self.root.join(format!("{}.png", cell.name()))
    }
}

impl CellImages for TextureDir {
    fn load(&self, cell: &Cell) -> Result<RgbaImage, RenderError> {
        let path = self.path(cell);

        match image::open(&path) {
            Ok(image) => Ok(image.into_rgba8()),
            Err(ImageError::IoError(err)) if err.kind() == io::ErrorKind::NotFound => {
                Err(RenderError::MissingAsset {
                    cell: cell.name().to_owned(),
                    path,
                })
            }
            Err(source) => Err(RenderError::Image { source }),
        }
    }
}

/// Bitmaps already in memory, keyed by cell name.
impl CellImages for HashMap<String, RgbaImage> {
    fn load(&self, cell: &Cell) -> Result<RgbaImage, RenderError> {
        self.get(cell.name())
            .cloned()
            .ok_or_else(|| RenderError::MissingAsset {
                cell: cell.name().to_owned(),
                path: PathBuf::from(cell.name()),
            })
    }
}
