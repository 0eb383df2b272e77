use glam::{IVec3, Vec2, Vec3};

use crate::de::{Field, InitialFrame, Keyframe, LoopFlag, VertexTransform};

/// Playback settings of a part that plays another animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub keyframe: i16,
    pub start: i16,
    pub end: i16,
    pub speed: f32,
    pub loop_count: i16,
    pub flags: LoopFlag,
}

impl Default for Instance {
    fn default() -> Self {
        Self {
            keyframe: 0,
            start: 0,
            end: 0,
            speed: 1.0,
            loop_count: 0,
            flags: LoopFlag::empty(),
        }
    }
}

/// The effective field values of one part at one frame time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartValues {
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
    pub vertex_transform: Option<VertexTransform>,
    pub instance: Option<Instance>,
}

impl Default for PartValues {
    fn default() -> Self {
        Self {
            invisible: false,
            flip_h: false,
            flip_v: false,
            cell_index: -1,
            position: IVec3::ZERO,
            opacity: 255,
            pivot: Vec2::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec2::ONE,
            size: Vec2::ZERO,
            uv_move: Vec2::ZERO,
            uv_rotation: 0.0,
            uv_scale: Vec2::ONE,
            bounding_radius: 0.0,
            vertex_transform: None,
            instance: None,
        }
    }
}

impl From<&InitialFrame> for PartValues {
    fn from(initial: &InitialFrame) -> Self {
        Self {
            invisible: initial.invisible,
            flip_h: initial.flip_h,
            flip_v: initial.flip_v,
            cell_index: initial.cell_index,
            position: initial.position,
            opacity: initial.opacity,
            pivot: initial.pivot,
            rotation: initial.rotation,
            scale: initial.scale,
            size: initial.size,
            uv_move: initial.uv_move,
            uv_rotation: initial.uv_rotation,
            uv_scale: initial.uv_scale,
            bounding_radius: initial.bounding_radius,
            vertex_transform: None,
            instance: None,
        }
    }
}

/// Apply the fields present in `keyframe` on top of `prior`.
///
/// Absent fields keep their prior value; an empty keyframe returns `prior` unchanged.
#[must_use]
pub fn merge(prior: PartValues, keyframe: &Keyframe) -> PartValues {
    let mut values = prior;

    for field in keyframe.fields() {
        match *field {
            Field::Invisible => values.invisible = true,
            Field::FlipH => values.flip_h = true,
            Field::FlipV => values.flip_v = true,
            Field::CellIndex(cell) => values.cell_index = cell,
            Field::PositionX(x) => values.position.x = x,
            Field::PositionY(y) => values.position.y = y,
            Field::PositionZ(z) => values.position.z = z,
            Field::PivotX(x) => values.pivot.x = x,
            Field::PivotY(y) => values.pivot.y = y,
            Field::RotationX(x) => values.rotation.x = x,
            Field::RotationY(y) => values.rotation.y = y,
            Field::RotationZ(z) => values.rotation.z = z,
            Field::ScaleX(x) => values.scale.x = x,
            Field::ScaleY(y) => values.scale.y = y,
            Field::Opacity(opacity) => values.opacity = opacity,
            Field::SizeX(x) => values.size.x = x,
            Field::SizeY(y) => values.size.y = y,
            Field::UMove(u) => values.uv_move.x = u,
            Field::VMove(v) => values.uv_move.y = v,
            Field::UvRotation(rotation) => values.uv_rotation = rotation,
            Field::UScale(u) => values.uv_scale.x = u,
            Field::VScale(v) => values.uv_scale.y = v,
            Field::BoundingRadius(radius) => values.bounding_radius = radius,
            Field::VertexTransform(transform) => values.vertex_transform = Some(transform),
            Field::InstanceKeyframe(keyframe) => instance(&mut values).keyframe = keyframe,
            Field::InstanceStart(start) => instance(&mut values).start = start,
            Field::InstanceEnd(end) => instance(&mut values).end = end,
            Field::InstanceSpeed(speed) => instance(&mut values).speed = speed,
            Field::InstanceLoop(count) => instance(&mut values).loop_count = count,
            Field::InstanceLoopFlags(flags) => instance(&mut values).flags = flags,
        }
    }

    values
}

fn instance(values: &mut PartValues) -> &mut Instance {
    values.instance.get_or_insert_with(Instance::default)
}

/// Forward-merge `keyframes` in order, starting from `initial`.
///
/// Parts without an initial frame start from [`PartValues::default`].
#[must_use]
pub fn fold(initial: Option<&InitialFrame>, keyframes: &[Keyframe]) -> PartValues {
    let seed = initial.map_or_else(PartValues::default, PartValues::from);
    keyframes.iter().fold(seed, merge)
}
