//! Decode SpriteStudio binary animation packages (SSBP).
//!
//! An SSBP file starts with a fixed header pointing at two tables: the cells cut out of the
//! texture atlases, and the animation packages. Every other record is reached by following
//! absolute offsets, so decoding walks the file with [`Parser::at`] instead of front to back.

mod animation;
mod cell;
mod error;
mod frame;
mod header;
mod parser;
mod part;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use tracing::{debug, trace, warn};

pub use animation::{Animation, AnimationPackage};
use animation::{AnimationRecord, PackageRecord};
pub use cell::{Cell, CellMap, FilterMode, WrapMode};
use cell::{CellMapRecord, CellRecord};
pub use error::DecodeError;
pub use frame::{Field, InitialFrame, Keyframe, KeyframeFlag, LoopFlag, VertexTransform};
use frame::InitialRecord;
use glam::IVec2;
use header::Header;
use parser::Parser;
pub use part::{AnimationPart, BlendType, BoundsType, PartType};
use part::PartRecord;

/// The first four bytes of every SSBP file ("SSPB" on disk).
pub const SIGNATURE: u32 = 0x4250_5353;

/// Size of the smallest keyframe record: a part index and an empty flag set.
pub const MIN_KEYFRAME_SIZE: usize = 6;

/// Represents the contents of an SSBP file.
#[derive(Debug, Clone)]
pub struct Ssbp {
    version: u32,
    cell_maps: Vec<CellMap>,
    cells: Vec<Cell>,
    packages: Vec<AnimationPackage>,
    skipped: Vec<SkippedAnimation>,
}

/// An animation left out by [`Ssbp::from_bytes_lenient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAnimation {
    package: String,
    animation: String,
    feature: &'static str,
}

impl SkippedAnimation {
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn animation(&self) -> &str {
        &self.animation
    }

    /// The unsupported field that stopped decoding.
    pub const fn feature(&self) -> &'static str {
        self.feature
    }
}

impl Ssbp {
    /// Read and decode an SSBP file.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    ///
    /// - Cannot read the file at path.
    /// - Data does not follow the SSBP file format.
    /// - `strict` is set and an animation uses an unsupported feature.
    pub fn open(path: &Path, strict: bool) -> Result<Self, DecodeError> {
        let data = fs::read(path).map_err(|err| DecodeError::ReadFailure { source: err })?;

        if strict {
            Self::from_bytes(&data)
        } else {
            Self::from_bytes_lenient(&data)
        }
    }

    /// Decode SSBP data.
    ///
    /// Any animation using a feature this decoder does not support fails the whole file. Use
    /// [`Self::from_bytes_lenient`] to leave such animations out instead.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    ///
    /// - Data has an invalid file signature.
    /// - Data does not follow the SSBP file format.
    /// - An animation uses an unsupported feature.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        decode(data, true)
    }

    /// Decode SSBP data, leaving out animations that use unsupported features.
    ///
    /// Every animation left out is listed by [`Self::skipped`].
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    ///
    /// - Data has an invalid file signature.
    /// - Data does not follow the SSBP file format.
    pub fn from_bytes_lenient(data: &[u8]) -> Result<Self, DecodeError> {
        decode(data, false)
    }

    /// Format version stored in the header.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Texture atlases, in order of first use by the cell table.
    #[must_use]
    pub fn cell_maps(&self) -> &[CellMap] {
        &self.cell_maps
    }

    /// Look up a texture atlas by name.
    #[must_use]
    pub fn cell_map(&self, name: &str) -> Option<&CellMap> {
        self.cell_maps.iter().find(|map| map.name() == name)
    }

    /// Every cell, in file order. Keyframes refer to cells by position in this list.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cells of `map`, in file order.
    pub fn cells_of<'a>(&'a self, map: &'a CellMap) -> impl Iterator<Item = &'a Cell> + 'a {
        map.cells().iter().filter_map(|&i| self.cells.get(i))
    }

    #[must_use]
    pub fn packages(&self) -> &[AnimationPackage] {
        &self.packages
    }

    /// Look up an animation package by name.
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&AnimationPackage> {
        self.packages.iter().find(|package| package.name() == name)
    }

    /// Animations left out because they use unsupported features.
    ///
    /// Always empty for data decoded with [`Self::from_bytes`].
    #[must_use]
    pub fn skipped(&self) -> &[SkippedAnimation] {
        &self.skipped
    }
}

fn decode(data: &[u8], strict: bool) -> Result<Ssbp, DecodeError> {
    let mut parser = Parser::new(data);
    validate_signature(&mut parser)?;

    let header = parser.read::<Header>()?;
    debug!(
        "version: {:#x}, cells: {}, packages: {}",
        header.version(),
        header.cell_count(),
        header.animation_pack_count()
    );

    let (cell_maps, cells) = parser.at(header.cells(), |parser| {
        parse_cell_table(parser, header.cell_count())
    })?;

    let mut skipped = Vec::new();
    let mut keyframe_budget = data.len() / MIN_KEYFRAME_SIZE;
    let packages = parser.at(header.animation_packs(), |parser| {
        parse_package_table(
            parser,
            header.animation_pack_count(),
            strict,
            &mut skipped,
            &mut keyframe_budget,
        )
    })?;

    Ok(Ssbp {
        version: header.version(),
        cell_maps,
        cells,
        packages,
        skipped,
    })
}

/// Check if the data starts with the SSBP signature (A.K.A. magic number).
///
/// Nothing past the signature is read when it does not match.
fn validate_signature(parser: &mut Parser) -> Result<(), DecodeError> {
    let actual = parser.read_u32()?;

    if actual != SIGNATURE {
        return Err(DecodeError::InvalidSignature { actual });
    }

    Ok(())
}

/// Decode the cell table, grouping cells by the atlas they are cut from.
fn parse_cell_table(
    parser: &mut Parser,
    count: u16,
) -> Result<(Vec<CellMap>, Vec<Cell>), DecodeError> {
    let mut maps = Vec::<CellMap>::new();
    let mut cells = Vec::with_capacity(count.into());

    for _ in 0..count {
        let record = parser.read::<CellRecord>()?;
        let name = parser.read_string_at(record.name())?;

        let map_record = parser.at(record.map(), Parser::read::<CellMapRecord>)?;
        let map_name = parser.read_string_at(map_record.name())?;

        let map = if let Some(i) = maps.iter().position(|map| map.name() == map_name) {
            i
        } else {
            let image_path = parser.read_string_at(map_record.image_path())?;
            debug!("cell map: {map_name:?} ({image_path:?})");
            maps.push(CellMap::new(
                map_name,
                image_path,
                map_record.wrap_mode(),
                map_record.filter_mode(),
            ));
            maps.len() - 1
        };

        maps[map].push(cells.len());
        let cell = record.into_cell(name, map);
        trace!("cell: {cell:?}");
        cells.push(cell);
    }

    Ok((maps, cells))
}

/// Decode the animation package table.
fn parse_package_table(
    parser: &mut Parser,
    count: u16,
    strict: bool,
    skipped: &mut Vec<SkippedAnimation>,
    keyframe_budget: &mut usize,
) -> Result<Vec<AnimationPackage>, DecodeError> {
    let mut packages = Vec::with_capacity(count.into());

    for _ in 0..count {
        let record = parser.read::<PackageRecord>()?;
        let name = parser.read_string_at(record.name())?;
        debug!(
            "package: {name:?} ({} parts, {} animations)",
            record.part_count(),
            record.animation_count()
        );

        let parts = parser.at(record.parts(), |parser| {
            parse_part_table(parser, record.part_count())
        })?;

        let animations = parser.at(record.animations(), |parser| {
            let mut animations = Vec::with_capacity(record.animation_count().into());

            for _ in 0..record.animation_count() {
                let animation = parser.read::<AnimationRecord>()?;
                let animation_name = parser.read_string_at(animation.name())?;

                let decoded = parse_animation(
                    parser,
                    &animation,
                    &animation_name,
                    record.part_count(),
                    keyframe_budget,
                );

                match decoded {
                    Ok(animation) => animations.push(animation),
                    Err(DecodeError::UnsupportedFeature { feature }) if !strict => {
                        warn!("skipping animation {name}/{animation_name}: unsupported {feature}");
                        skipped.push(SkippedAnimation {
                            package: name.clone(),
                            animation: animation_name,
                            feature,
                        });
                    }
                    Err(err) => return Err(err),
                }
            }

            Ok(animations)
        })?;

        packages.push(AnimationPackage {
            name,
            parts,
            animations,
        });
    }

    Ok(packages)
}

/// Decode a package's part hierarchy.
fn parse_part_table(parser: &mut Parser, count: u16) -> Result<Vec<AnimationPart>, DecodeError> {
    let mut parts = Vec::with_capacity(count.into());

    for _ in 0..count {
        let record = parser.read::<PartRecord>()?;
        let name = parser.read_string_at(record.name())?;
        let instance_name = parser.read_optional_string_at(record.instance_name())?;
        let effect_name = parser.read_optional_string_at(record.effect_name())?;
        let color = parser.read_optional_string_at(record.color())?;

        let part = record.into_part(name, instance_name, effect_name, color);
        trace!("part: {part:?}");
        parts.push(part);
    }

    Ok(parts)
}

/// Decode one animation.
///
/// Fails with [`DecodeError::UnsupportedFeature`] when the animation carries user data or
/// color blending.
fn parse_animation(
    parser: &mut Parser,
    record: &AnimationRecord,
    name: &str,
    part_count: u16,
    keyframe_budget: &mut usize,
) -> Result<Animation, DecodeError> {
    debug!(
        "animation: {name:?} ({} frames at {} fps, canvas {})",
        record.frame_count(),
        record.fps(),
        record.canvas_size()
    );

    if record.user_data() != 0 {
        return Err(DecodeError::UnsupportedFeature {
            feature: "user data",
        });
    }

    let initial_frames = parser.at(record.initial_frames(), |parser| {
        parse_initial_frames(parser, part_count)
    })?;

    let keyframes = parser.at(record.frames(), |parser| {
        parse_frames(parser, record.frame_count(), part_count, keyframe_budget)
    })?;

    let labels = if record.labels() == 0 {
        BTreeMap::new()
    } else {
        parser.at(record.labels(), |parser| {
            parse_labels(parser, record.label_count())
        })?
    };

    Ok(Animation {
        name: name.to_owned(),
        canvas_size: record.canvas_size(),
        frame_count: record.frame_count(),
        fps: record.fps(),
        initial_frames,
        keyframes,
        labels,
    })
}

/// Decode the initial state of every part slot.
fn parse_initial_frames(
    parser: &mut Parser,
    part_count: u16,
) -> Result<BTreeMap<usize, InitialFrame>, DecodeError> {
    let mut frames = BTreeMap::new();

    for _ in 0..part_count {
        let record = parser.read::<InitialRecord>()?;
        let index = part_index(record.part_index(), part_count)?;
        let frame = record.into_initial_frame(index);
        trace!("initial frame: {frame:?}");
        frames.insert(index, frame);
    }

    Ok(frames)
}

/// Decode the keyframes of every frame time.
///
/// The frame block is a table of pointers, one per frame time, each to `part_count` keyframe
/// records. Every block is charged against `keyframe_budget`, the number of records the whole
/// file has room for.
fn parse_frames(
    parser: &mut Parser,
    frame_count: u16,
    part_count: u16,
    keyframe_budget: &mut usize,
) -> Result<BTreeMap<usize, Vec<Keyframe>>, DecodeError> {
    let mut keyframes = BTreeMap::<usize, Vec<Keyframe>>::new();

    for time in 0..frame_count {
        let pointer = parser.read_u32()?;

        *keyframe_budget = keyframe_budget
            .checked_sub(part_count.into())
            .ok_or(DecodeError::TooManyKeyframes { pointer })?;

        parser.at(pointer, |parser| {
            let mut seen = BTreeSet::new();

            for _ in 0..part_count {
                let keyframe = parse_keyframe(parser, part_count)?;

                // Every part appears once per frame time, which keeps each part's sequence
                // indexable by time.
                if !seen.insert(keyframe.part_index()) {
                    return Err(DecodeError::InvalidPartIndex {
                        index: i16::try_from(keyframe.part_index()).unwrap_or(i16::MAX),
                    });
                }

                trace!("frame {time}: {keyframe:?}");
                keyframes
                    .entry(keyframe.part_index())
                    .or_default()
                    .push(keyframe);
            }

            Ok(())
        })?;
    }

    Ok(keyframes)
}

type FieldReader = fn(&mut Parser<'_>) -> Result<Field, DecodeError>;

/// The order in which keyframe fields are stored, with how to read each of them.
const FIELD_READERS: [(KeyframeFlag, FieldReader); 31] = [
    (KeyframeFlag::INVISIBLE, |_| Ok(Field::Invisible)),
    (KeyframeFlag::FLIP_H, |_| Ok(Field::FlipH)),
    (KeyframeFlag::FLIP_V, |_| Ok(Field::FlipV)),
    (KeyframeFlag::CELL_INDEX, |p| p.read_i16().map(Field::CellIndex)),
    (KeyframeFlag::POSITION_X, |p| p.read_tenths().map(Field::PositionX)),
    (KeyframeFlag::POSITION_Y, |p| p.read_tenths().map(Field::PositionY)),
    (KeyframeFlag::POSITION_Z, |p| p.read_tenths().map(Field::PositionZ)),
    (KeyframeFlag::PIVOT_X, |p| p.read_f32().map(Field::PivotX)),
    (KeyframeFlag::PIVOT_Y, |p| p.read_f32().map(Field::PivotY)),
    (KeyframeFlag::ROTATION_X, |p| p.read_f32().map(Field::RotationX)),
    (KeyframeFlag::ROTATION_Y, |p| p.read_f32().map(Field::RotationY)),
    (KeyframeFlag::ROTATION_Z, |p| p.read_f32().map(Field::RotationZ)),
    (KeyframeFlag::SCALE_X, |p| p.read_f32().map(Field::ScaleX)),
    (KeyframeFlag::SCALE_Y, |p| p.read_f32().map(Field::ScaleY)),
    (KeyframeFlag::OPACITY, |p| p.read_i16().map(Field::Opacity)),
    (KeyframeFlag::SIZE_X, |p| p.read_f32().map(Field::SizeX)),
    (KeyframeFlag::SIZE_Y, |p| p.read_f32().map(Field::SizeY)),
    (KeyframeFlag::U_MOVE, |p| p.read_f32().map(Field::UMove)),
    (KeyframeFlag::V_MOVE, |p| p.read_f32().map(Field::VMove)),
    (KeyframeFlag::UV_ROTATION, |p| p.read_f32().map(Field::UvRotation)),
    (KeyframeFlag::U_SCALE, |p| p.read_f32().map(Field::UScale)),
    (KeyframeFlag::V_SCALE, |p| p.read_f32().map(Field::VScale)),
    (KeyframeFlag::BOUNDING_RADIUS, |p| p.read_f32().map(Field::BoundingRadius)),
    (KeyframeFlag::VERTEX_TRANSFORM, parse_vertex_transform),
    (KeyframeFlag::COLOR_BLEND, |_| {
        Err(DecodeError::UnsupportedFeature {
            feature: "color blend",
        })
    }),
    (KeyframeFlag::INSTANCE_KEYFRAME, |p| p.read_i16().map(Field::InstanceKeyframe)),
    (KeyframeFlag::INSTANCE_START, |p| p.read_i16().map(Field::InstanceStart)),
    (KeyframeFlag::INSTANCE_END, |p| p.read_i16().map(Field::InstanceEnd)),
    (KeyframeFlag::INSTANCE_SPEED, |p| p.read_f32().map(Field::InstanceSpeed)),
    (KeyframeFlag::INSTANCE_LOOP, |p| p.read_i16().map(Field::InstanceLoop)),
    (KeyframeFlag::INSTANCE_LOOP_FLAGS, |p| {
        p.read_u16()
            .map(|bits| Field::InstanceLoopFlags(LoopFlag::from_bits_retain(bits)))
    }),
];

/// Decode one keyframe record.
fn parse_keyframe(parser: &mut Parser, part_count: u16) -> Result<Keyframe, DecodeError> {
    let index = part_index(parser.read_i16()?, part_count)?;
    let bits = parser.read_u32()?;

    if bits == 0 {
        return Ok(Keyframe::new(index, KeyframeFlag::empty(), Vec::new()));
    }

    let flags = KeyframeFlag::from_bits(bits).ok_or(DecodeError::UnsupportedFeature {
        feature: "unknown keyframe field",
    })?;

    let mut fields = Vec::new();
    for (flag, read) in FIELD_READERS {
        if flags.contains(flag) {
            fields.push(read(parser)?);
        }
    }

    Ok(Keyframe::new(index, flags, fields))
}

/// Decode a vertex transform: a corner mask followed by one (x, y) pair per selected corner.
fn parse_vertex_transform(parser: &mut Parser) -> Result<Field, DecodeError> {
    let mask = parser.read_u16()?;

    if mask & !0b1111 != 0 {
        return Err(DecodeError::UnsupportedFeature {
            feature: "vertex transform",
        });
    }

    let mut transform = VertexTransform::default();
    for (i, corner) in transform.corners.iter_mut().enumerate() {
        if mask & (1 << i) != 0 {
            let x = parser.read_i16()?;
            let y = parser.read_i16()?;
            *corner = Some(IVec2::new(x.into(), y.into()));
        }
    }

    Ok(Field::VertexTransform(transform))
}

/// Decode an animation's labels.
///
/// The label block is a table of pointers, each to a name pointer and a frame time.
fn parse_labels(parser: &mut Parser, count: u16) -> Result<BTreeMap<String, u16>, DecodeError> {
    let mut labels = BTreeMap::new();

    for _ in 0..count {
        let pointer = parser.read_u32()?;
        let (name, time) = parser.at(pointer, |parser| {
            let name = parser.read_u32()?;
            let name = parser.read_string_at(name)?;
            let time = parser.read_u16()?;
            Ok((name, time))
        })?;

        trace!("label: {name:?} at {time}");
        labels.insert(name, time);
    }

    Ok(labels)
}

fn part_index(index: i16, part_count: u16) -> Result<usize, DecodeError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < usize::from(part_count))
        .ok_or(DecodeError::InvalidPartIndex { index })
}
