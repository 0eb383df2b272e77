use bytemuck::{Pod, Zeroable};

/// What a part displays.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartType {
    /// Only contributes a transform to its children.
    Null,
    /// Displays a cell.
    Normal,
    Text,
    /// Plays another animation.
    Instance,
    Effect,
    /// A value this decoder does not know about.
    Unknown(i16),
}

impl From<i16> for PartType {
    fn from(value: i16) -> Self {
        match value {
            0 => Self::Null,
            1 => Self::Normal,
            2 => Self::Text,
            3 => Self::Instance,
            4 => Self::Effect,
            other => Self::Unknown(other),
        }
    }
}

/// Shape used for hit testing.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsType {
    None,
    Quad,
    Aabb,
    Circle,
    CircleScaleMin,
    CircleScaleMax,
    /// A value this decoder does not know about.
    Unknown(i16),
}

impl From<i16> for BoundsType {
    fn from(value: i16) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Quad,
            2 => Self::Aabb,
            3 => Self::Circle,
            4 => Self::CircleScaleMin,
            5 => Self::CircleScaleMax,
            other => Self::Unknown(other),
        }
    }
}

/// How a part's pixels are blended onto what is below it.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendType {
    Mix,
    Multiply,
    Add,
    Subtract,
    /// A value this decoder does not know about.
    Unknown(i16),
}

impl From<i16> for BlendType {
    fn from(value: i16) -> Self {
        match value {
            0 => Self::Mix,
            1 => Self::Multiply,
            2 => Self::Add,
            3 => Self::Subtract,
            other => Self::Unknown(other),
        }
    }
}

/// One node of a package's part hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPart {
    name: String,
    index: i16,
    parent_index: i16,
    part_type: PartType,
    bounds_type: BoundsType,
    blend_type: BlendType,
    instance_name: Option<String>,
    effect_name: Option<String>,
    color: Option<String>,
}

impl AnimationPart {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the part within its package, also used as its key in frame data.
    pub const fn index(&self) -> i16 {
        self.index
    }

    /// Index of the parent part, or `-1` for a root.
    pub const fn parent_index(&self) -> i16 {
        self.parent_index
    }

    /// The parent's position within the package, if any.
    pub fn parent(&self) -> Option<usize> {
        usize::try_from(self.parent_index).ok()
    }

    pub const fn part_type(&self) -> PartType {
        self.part_type
    }

    pub const fn bounds_type(&self) -> BoundsType {
        self.bounds_type
    }

    pub const fn blend_type(&self) -> BlendType {
        self.blend_type
    }

    /// Name of the animation played by an [`PartType::Instance`] part.
    pub fn instance_name(&self) -> Option<&str> {
        self.instance_name.as_deref()
    }

    pub fn effect_name(&self) -> Option<&str> {
        self.effect_name.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

/// Represents one record of a package's part table.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PartRecord {
    name: u32,
    index: i16,
    parent_index: i16,
    part_type: i16,
    bounds_type: i16,
    blend_type: i16,

    // Not used.
    _reserved: u16,

    instance_name: u32,
    effect_name: u32,
    color: u32,
}

impl PartRecord {
    pub const fn name(&self) -> u32 {
        u32::from_le(self.name)
    }

    pub const fn instance_name(&self) -> u32 {
        u32::from_le(self.instance_name)
    }

    pub const fn effect_name(&self) -> u32 {
        u32::from_le(self.effect_name)
    }

    pub const fn color(&self) -> u32 {
        u32::from_le(self.color)
    }

    pub fn into_part(
        self,
        name: String,
        instance_name: Option<String>,
        effect_name: Option<String>,
        color: Option<String>,
    ) -> AnimationPart {
        AnimationPart {
            name,
            index: i16::from_le(self.index),
            parent_index: i16::from_le(self.parent_index),
            part_type: i16::from_le(self.part_type).into(),
            bounds_type: i16::from_le(self.bounds_type).into(),
            blend_type: i16::from_le(self.blend_type).into(),
            instance_name,
            effect_name,
            color,
        }
    }
}
