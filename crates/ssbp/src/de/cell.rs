use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec2};

/// How texture coordinates outside of the atlas are treated.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Coordinates are clamped to the edge.
    Clamp,
    /// The atlas repeats.
    Repeat,
    /// The atlas repeats, mirrored on every other tile.
    Mirror,
    /// A value this decoder does not know about.
    Unknown(i16),
}

impl From<i16> for WrapMode {
    fn from(value: i16) -> Self {
        match value {
            0 => Self::Clamp,
            1 => Self::Repeat,
            2 => Self::Mirror,
            other => Self::Unknown(other),
        }
    }
}

/// How the atlas is sampled.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest neighbor.
    Nearest,
    /// Bilinear.
    Linear,
    /// A value this decoder does not know about.
    Unknown(i16),
}

impl From<i16> for FilterMode {
    fn from(value: i16) -> Self {
        match value {
            0 => Self::Nearest,
            1 => Self::Linear,
            other => Self::Unknown(other),
        }
    }
}

/// One shared texture atlas.
#[derive(Debug, Clone)]
pub struct CellMap {
    name: String,
    image_path: String,
    wrap_mode: WrapMode,
    filter_mode: FilterMode,
    cells: Vec<usize>,
}

impl CellMap {
    pub(crate) const fn new(
        name: String,
        image_path: String,
        wrap_mode: WrapMode,
        filter_mode: FilterMode,
    ) -> Self {
        Self {
            name,
            image_path,
            wrap_mode,
            filter_mode,
            cells: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, cell: usize) {
        self.cells.push(cell);
    }

    /// The name shared by every cell cut from this atlas.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the atlas image, relative to the file's image directory.
    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    pub const fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub const fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    /// Positions of this atlas' cells in [`Ssbp::cells`](super::Ssbp::cells), in file order.
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }
}

/// A named sub-rectangle of a [`CellMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    name: String,
    index: i16,
    map: usize,
    position: IVec2,
    size: IVec2,
    pivot: Vec2,
}

impl Cell {
    /// Unique name of the cell. Also names the cell's standalone bitmap.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The index stored in the record.
    pub const fn index(&self) -> i16 {
        self.index
    }

    /// Position of the owning atlas in [`Ssbp::cell_maps`](super::Ssbp::cell_maps).
    pub const fn map(&self) -> usize {
        self.map
    }

    /// Top-left corner within the atlas, in pixels.
    pub const fn position(&self) -> IVec2 {
        self.position
    }

    /// Width and height, in pixels.
    pub const fn size(&self) -> IVec2 {
        self.size
    }

    /// Fractional offset of the anchor from the cell's center.
    pub const fn pivot(&self) -> Vec2 {
        self.pivot
    }
}

/// Represents one record of the cell table.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CellRecord {
    name: u32,
    map: u32,
    index: i16,
    x: i16,
    y: i16,
    width: i16,
    height: i16,

    // Not used.
    _reserved: u16,

    pivot_x: u32,
    pivot_y: u32,
}

impl CellRecord {
    pub const fn name(&self) -> u32 {
        u32::from_le(self.name)
    }

    /// Pointer to the [`CellMapRecord`] this cell belongs to.
    pub const fn map(&self) -> u32 {
        u32::from_le(self.map)
    }

    pub fn into_cell(self, name: String, map: usize) -> Cell {
        Cell {
            name,
            index: i16::from_le(self.index),
            map,
            position: IVec2::new(i16::from_le(self.x).into(), i16::from_le(self.y).into()),
            size: IVec2::new(
                i16::from_le(self.width).into(),
                i16::from_le(self.height).into(),
            ),
            pivot: Vec2::new(
                f32::from_bits(u32::from_le(self.pivot_x)),
                f32::from_bits(u32::from_le(self.pivot_y)),
            ),
        }
    }
}

/// Represents the atlas header a [`CellRecord`] points at.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CellMapRecord {
    name: u32,
    image_path: u32,
    wrap_mode: i16,
    filter_mode: i16,
}

impl CellMapRecord {
    pub const fn name(&self) -> u32 {
        u32::from_le(self.name)
    }

    pub const fn image_path(&self) -> u32 {
        u32::from_le(self.image_path)
    }

    pub fn wrap_mode(&self) -> WrapMode {
        i16::from_le(self.wrap_mode).into()
    }

    pub fn filter_mode(&self) -> FilterMode {
        i16::from_le(self.filter_mode).into()
    }
}
