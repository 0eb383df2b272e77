use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::{IVec2, IVec3, Vec2, Vec3};

use crate::de::parser::tenths;

bitflags! {
    /// Selects which fields a keyframe record carries.
    ///
    /// Initial frames only use the first three bits, as plain booleans.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyframeFlag: u32 {
        const INVISIBLE = 1 << 0;
        const FLIP_H = 1 << 1;
        const FLIP_V = 1 << 2;
        const CELL_INDEX = 1 << 3;
        const POSITION_X = 1 << 4;
        const POSITION_Y = 1 << 5;
        const POSITION_Z = 1 << 6;
        const PIVOT_X = 1 << 7;
        const PIVOT_Y = 1 << 8;
        const ROTATION_X = 1 << 9;
        const ROTATION_Y = 1 << 10;
        const ROTATION_Z = 1 << 11;
        const SCALE_X = 1 << 12;
        const SCALE_Y = 1 << 13;
        const OPACITY = 1 << 14;
        const COLOR_BLEND = 1 << 15;
        const VERTEX_TRANSFORM = 1 << 16;
        const SIZE_X = 1 << 17;
        const SIZE_Y = 1 << 18;
        const U_MOVE = 1 << 19;
        const V_MOVE = 1 << 20;
        const UV_ROTATION = 1 << 21;
        const U_SCALE = 1 << 22;
        const V_SCALE = 1 << 23;
        const BOUNDING_RADIUS = 1 << 24;
        const INSTANCE_KEYFRAME = 1 << 25;
        const INSTANCE_START = 1 << 26;
        const INSTANCE_END = 1 << 27;
        const INSTANCE_SPEED = 1 << 28;
        const INSTANCE_LOOP = 1 << 29;
        const INSTANCE_LOOP_FLAGS = 1 << 30;
    }
}

bitflags! {
    /// Playback options of an animation instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LoopFlag: u16 {
        const INFINITY = 1 << 0;
        const REVERSE = 1 << 1;
        const PINGPONG = 1 << 2;
        const INDEPENDENT = 1 << 3;
    }
}

/// Explicit corner positions replacing the computed quad of a part.
///
/// Corners are ordered top-left, top-right, bottom-left, bottom-right. `None` keeps the computed
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexTransform {
    pub corners: [Option<IVec2>; 4],
}

/// One field present in a keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Invisible,
    FlipH,
    FlipV,
    CellIndex(i16),
    PositionX(i32),
    PositionY(i32),
    PositionZ(i32),
    PivotX(f32),
    PivotY(f32),
    RotationX(f32),
    RotationY(f32),
    RotationZ(f32),
    ScaleX(f32),
    ScaleY(f32),
    Opacity(i16),
    SizeX(f32),
    SizeY(f32),
    UMove(f32),
    VMove(f32),
    UvRotation(f32),
    UScale(f32),
    VScale(f32),
    BoundingRadius(f32),
    VertexTransform(VertexTransform),
    InstanceKeyframe(i16),
    InstanceStart(i16),
    InstanceEnd(i16),
    InstanceSpeed(f32),
    InstanceLoop(i16),
    InstanceLoopFlags(LoopFlag),
}

/// The changes to one part at one frame time.
///
/// Only the fields selected by the record's flag word are present; everything else is unchanged
/// from the previous frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    part_index: usize,
    flags: KeyframeFlag,
    fields: Vec<Field>,
}

impl Keyframe {
    pub(crate) const fn new(part_index: usize, flags: KeyframeFlag, fields: Vec<Field>) -> Self {
        Self {
            part_index,
            flags,
            fields,
        }
    }

    pub const fn part_index(&self) -> usize {
        self.part_index
    }

    /// The raw flag word of the record.
    pub const fn flags(&self) -> KeyframeFlag {
        self.flags
    }

    /// Present fields, in the order they were stored.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether this record leaves the part unchanged.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The state of one part before any keyframe applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialFrame {
    pub part_index: usize,
    pub invisible: bool,
    pub flip_h: bool,
    pub flip_v: bool,
    pub cell_index: i16,
    pub position: IVec3,
    pub opacity: i16,
    pub pivot: Vec2,
    pub rotation: Vec3,
    pub scale: Vec2,
    pub size: Vec2,
    pub uv_move: Vec2,
    pub uv_rotation: f32,
    pub uv_scale: Vec2,
    pub bounding_radius: f32,
}

/// Represents one record of an animation's initial frame data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct InitialRecord {
    part_index: i16,

    // Not used.
    _reserved0: u16,

    flags: u32,
    cell_index: i16,
    x: i16,
    y: i16,
    z: i16,
    opacity: i16,

    // Not used.
    _reserved1: u16,

    // pivot x/y, rotation x/y/z, scale x/y, size x/y, uv move x/y, uv rotation, uv scale x/y,
    // bounding radius
    floats: [u32; 15],
}

impl InitialRecord {
    pub const fn part_index(&self) -> i16 {
        i16::from_le(self.part_index)
    }

    pub fn into_initial_frame(self, part_index: usize) -> InitialFrame {
        let flags = KeyframeFlag::from_bits_retain(u32::from_le(self.flags));
        let f = self.floats.map(|bits| f32::from_bits(u32::from_le(bits)));

        InitialFrame {
            part_index,
            invisible: flags.contains(KeyframeFlag::INVISIBLE),
            flip_h: flags.contains(KeyframeFlag::FLIP_H),
            flip_v: flags.contains(KeyframeFlag::FLIP_V),
            cell_index: i16::from_le(self.cell_index),
            position: IVec3::new(
                tenths(i16::from_le(self.x)),
                tenths(i16::from_le(self.y)),
                tenths(i16::from_le(self.z)),
            ),
            opacity: i16::from_le(self.opacity),
            pivot: Vec2::new(f[0], f[1]),
            rotation: Vec3::new(f[2], f[3], f[4]),
            scale: Vec2::new(f[5], f[6]),
            size: Vec2::new(f[7], f[8]),
            uv_move: Vec2::new(f[9], f[10]),
            uv_rotation: f[11],
            uv_scale: Vec2::new(f[12], f[13]),
            bounding_radius: f[14],
        }
    }
}
