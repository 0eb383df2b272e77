//! Resolve the effective state of every part of an animation at one frame time.

mod error;
mod merge;

use glam::{IVec3, Mat4, Vec2, Vec3};
use tracing::{debug, trace};

pub use error::ResolveError;
pub use merge::{Instance, PartValues, fold, merge};

use crate::de::{Animation, AnimationPackage, Cell, PartType, Ssbp, VertexTransform};

/// The effective state of one part at one frame time, with its place in the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct PartState {
    /// Position of the part in its package.
    pub index: usize,
    /// Index of the parent part's state, if any.
    pub parent: Option<usize>,
    pub part_type: PartType,
    pub invisible: bool,
    pub flip_h: bool,
    pub flip_v: bool,
    /// Position of the displayed cell in [`Ssbp::cells`].
    pub cell: Option<usize>,
    pub position: IVec3,
    /// 0 (transparent) to 255 (opaque).
    pub opacity: i16,
    /// Anchor of the part, after falling back to the cell's own pivot.
    pub pivot: Vec2,
    /// Own rotation around each axis, in degrees.
    pub rotation: Vec3,
    pub scale: Vec2,
    pub size: Vec2,
    pub uv_move: Vec2,
    pub uv_rotation: f32,
    pub uv_scale: Vec2,
    pub bounding_radius: f32,
    pub vertex_transform: Option<VertexTransform>,
    pub instance: Option<Instance>,
    /// Accumulated parent-to-part transform.
    pub matrix: Mat4,
    /// Own z-rotation plus the z-rotation of every ancestor, in degrees.
    pub world_rotation: f32,
    /// Local corners of the part's quad: top-left, top-right, bottom-left, bottom-right.
    pub vertices: [Vec3; 4],
    /// Set when the part uses a feature the compositor cannot draw.
    pub unsupported: Option<&'static str>,
}

impl PartState {
    /// Whether the compositor should draw this part.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        !self.invisible
            && self.cell.is_some()
            && self.unsupported.is_none()
            && self.part_type == PartType::Normal
    }

    /// Translation of the world matrix.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// The parent's state, looked up in the list this state was resolved into.
    #[must_use]
    pub fn parent<'a>(&self, states: &'a [PartState]) -> Option<&'a PartState> {
        self.parent.and_then(|parent| states.get(parent))
    }
}

/// Resolve every part of `package` at `frame` of `animation`.
///
/// States are returned in part index order, which places parents before their children.
/// `cells` is the file's cell table, used to resolve cell indices and default pivots.
///
/// # Errors
///
/// This function returns an error if:
///
/// - `frame` is not a frame time of `animation`.
/// - A part is out of order, or its parent does not come before it.
/// - A part shows a cell that is not in `cells`.
pub fn resolve(
    package: &AnimationPackage,
    animation: &Animation,
    frame: usize,
    cells: &[Cell],
) -> Result<Vec<PartState>, ResolveError> {
    let frame_count = usize::from(animation.frame_count());
    if frame >= frame_count {
        return Err(ResolveError::FrameOutOfRange { frame, frame_count });
    }

    debug!(
        "resolving {}/{} at frame {frame}",
        package.name(),
        animation.name()
    );

    let mut states = Vec::<PartState>::with_capacity(package.parts().len());

    for (index, part) in package.parts().iter().enumerate() {
        let parent = part.parent();
        let in_order = usize::try_from(part.index()).is_ok_and(|i| i == index);
        let parent_first = part.parent_index() == -1 || parent.is_some_and(|p| p < index);

        if !in_order || !parent_first {
            return Err(ResolveError::InvalidHierarchy {
                part: index,
                parent: part.parent_index(),
            });
        }

        let keyframes = animation
            .keyframes()
            .get(&index)
            .map_or(&[][..], |keyframes| {
                &keyframes[..keyframes.len().min(frame + 1)]
            });
        let values = fold(animation.initial_frames().get(&index), keyframes);
        trace!("part {index} ({}): {values:?}", part.name());

        let cell = match values.cell_index {
            -1 => None,
            i => Some(
                usize::try_from(i)
                    .ok()
                    .filter(|&i| i < cells.len())
                    .ok_or(ResolveError::InvalidCellIndex {
                        part: index,
                        cell: i,
                    })?,
            ),
        };

        let pivot = match cell {
            Some(cell) if values.pivot == Vec2::ZERO => cells[cell].pivot(),
            _ => values.pivot,
        };

        let local = Mat4::from_translation(values.position.as_vec3())
            * Mat4::from_scale(Vec3::new(values.scale.x, values.scale.y, 1.0));

        // Rotation is left out of the matrix and applied by the compositor instead.
        let (matrix, world_rotation) = match parent.and_then(|parent| states.get(parent)) {
            Some(parent) => (
                parent.matrix * local,
                parent.world_rotation + values.rotation.z,
            ),
            None => (local, values.rotation.z),
        };

        let unsupported = unsupported_feature(part.part_type(), &values);
        if let Some(feature) = unsupported {
            debug!("part {index} ({}) uses {feature}", part.name());
        }

        states.push(PartState {
            index,
            parent,
            part_type: part.part_type(),
            invisible: values.invisible,
            flip_h: values.flip_h,
            flip_v: values.flip_v,
            cell,
            position: values.position,
            opacity: values.opacity,
            pivot,
            rotation: values.rotation,
            scale: values.scale,
            size: values.size,
            uv_move: values.uv_move,
            uv_rotation: values.uv_rotation,
            uv_scale: values.uv_scale,
            bounding_radius: values.bounding_radius,
            vertex_transform: values.vertex_transform,
            instance: values.instance,
            matrix,
            world_rotation,
            vertices: vertices(values.size, pivot, &values),
            unsupported,
        });
    }

    Ok(states)
}

fn unsupported_feature(part_type: PartType, values: &PartValues) -> Option<&'static str> {
    if values.instance.is_some() {
        return Some("animation instance");
    }

    if values.vertex_transform.is_some() {
        return Some("vertex transform");
    }

    match part_type {
        PartType::Null | PartType::Normal => None,
        PartType::Instance => Some("animation instance"),
        PartType::Effect => Some("effect"),
        PartType::Text => Some("text"),
        PartType::Unknown(_) => Some("unknown part type"),
    }
}

/// Corners of a `size` quad around `pivot`, in a y-up local space.
fn vertices(size: Vec2, pivot: Vec2, values: &PartValues) -> [Vec3; 4] {
    let (mut left, mut right) = (-size.x * (0.5 + pivot.x), size.x * (0.5 - pivot.x));
    let (mut top, mut bottom) = (size.y * (0.5 + pivot.y), -size.y * (0.5 - pivot.y));

    if values.flip_h {
        (left, right) = (right, left);
    }

    if values.flip_v {
        (top, bottom) = (bottom, top);
    }

    let mut corners = [
        Vec3::new(left, top, 0.0),
        Vec3::new(right, top, 0.0),
        Vec3::new(left, bottom, 0.0),
        Vec3::new(right, bottom, 0.0),
    ];

    if let Some(transform) = values.vertex_transform {
        for (corner, replacement) in corners.iter_mut().zip(transform.corners) {
            if let Some(replacement) = replacement {
                *corner = replacement.as_vec2().extend(0.0);
            }
        }
    }

    corners
}

impl Ssbp {
    /// Resolve every part of an animation at `frame`, looking both up by name.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    ///
    /// - There is no such package or animation.
    /// - The animation was left out while decoding.
    /// - [`resolve`] fails.
    pub fn resolve(
        &self,
        package: &str,
        animation: &str,
        frame: usize,
    ) -> Result<Vec<PartState>, ResolveError> {
        let not_found = |kind, name: &str| ResolveError::NotFound {
            kind,
            name: name.to_owned(),
        };

        let package_data = self
            .package(package)
            .ok_or_else(|| not_found("package", package))?;

        let Some(animation_data) = package_data.animation(animation) else {
            return Err(self
                .skipped()
                .iter()
                .find(|skipped| skipped.package() == package && skipped.animation() == animation)
                .map_or_else(
                    || not_found("animation", animation),
                    |skipped| ResolveError::UnsupportedFeature {
                        feature: skipped.feature(),
                    },
                ));
        };

        resolve(package_data, animation_data, frame, self.cells())
    }
}
