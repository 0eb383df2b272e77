use bytemuck::{Pod, Zeroable};

/// Represents the SSBP file header, minus the leading signature.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Header {
    version: u32,

    // Not used.
    _head_flag: u32,
    _image_base_dir: u32,

    cells: u32,
    animation_packs: u32,

    // Not used.
    _effect_files: u32,

    cell_count: u16,
    animation_pack_count: u16,
}

impl Header {
    /// Format version of the file.
    ///
    /// Unknown versions are decoded on a best-effort basis.
    pub const fn version(&self) -> u32 {
        u32::from_le(self.version)
    }

    /// Absolute offset of the cell table.
    pub const fn cells(&self) -> u32 {
        u32::from_le(self.cells)
    }

    /// Absolute offset of the animation package table.
    pub const fn animation_packs(&self) -> u32 {
        u32::from_le(self.animation_packs)
    }

    /// The number of records in the cell table.
    pub const fn cell_count(&self) -> u16 {
        u16::from_le(self.cell_count)
    }

    /// The number of records in the animation package table.
    pub const fn animation_pack_count(&self) -> u16 {
        u16::from_le(self.animation_pack_count)
    }
}
