//! Builds synthetic SSBP files for tests.

use std::collections::BTreeMap;

use crate::de::{KeyframeFlag, SIGNATURE};

/// Little-endian byte sink that hands out absolute offsets.
#[derive(Default)]
pub struct Writer {
    data: Vec<u8>,
}

impl Writer {
    pub fn position(&self) -> u32 {
        u32::try_from(self.data.len()).unwrap()
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.data.extend(value.to_le_bytes());
        self
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.data.extend(value.to_le_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.data.extend(value.to_le_bytes());
        self
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.data.extend(value.to_le_bytes());
        self
    }

    /// Write a null-terminated string and return its offset.
    pub fn string(&mut self, value: &str) -> u32 {
        let offset = self.position();
        self.data.extend(value.bytes());
        self.data.push(0);
        offset
    }

    pub fn patch_u16(&mut self, at: u32, value: u16) {
        let at = at as usize;
        self.data[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }

    pub fn patch_u32(&mut self, at: u32, value: u32) {
        let at = at as usize;
        self.data[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[derive(Clone)]
pub struct CellDef {
    pub name: &'static str,
    pub map: &'static str,
    pub image: &'static str,
    pub position: (i16, i16),
    pub size: (i16, i16),
    pub pivot: (f32, f32),
}

impl CellDef {
    pub fn new(name: &'static str, map: &'static str, size: (i16, i16)) -> Self {
        Self {
            name,
            map,
            image: "atlas.png",
            position: (0, 0),
            size,
            pivot: (0.0, 0.0),
        }
    }
}

#[derive(Clone)]
pub struct PartDef {
    pub name: &'static str,
    pub index: i16,
    pub parent: i16,
    pub part_type: i16,
    pub instance: Option<&'static str>,
}

impl PartDef {
    pub fn new(name: &'static str, index: i16, parent: i16, part_type: i16) -> Self {
        Self {
            name,
            index,
            parent,
            part_type,
            instance: None,
        }
    }
}

#[derive(Clone)]
pub struct InitialDef {
    pub part: i16,
    pub flags: u32,
    pub cell: i16,
    /// In tenths.
    pub position: [i16; 3],
    pub opacity: i16,
    pub pivot: (f32, f32),
    pub rotation: [f32; 3],
    pub scale: (f32, f32),
    pub size: (f32, f32),
}

impl InitialDef {
    pub fn new(part: i16) -> Self {
        Self {
            part,
            flags: 0,
            cell: -1,
            position: [0; 3],
            opacity: 255,
            pivot: (0.0, 0.0),
            rotation: [0.0; 3],
            scale: (1.0, 1.0),
            size: (0.0, 0.0),
        }
    }

    pub fn cell(mut self, cell: i16, size: (f32, f32)) -> Self {
        self.cell = cell;
        self.size = size;
        self
    }

    pub fn position(mut self, x: i16, y: i16) -> Self {
        self.position = [x * 10, y * 10, 0];
        self
    }
}

/// A keyframe record; fields are written in call order.
#[derive(Clone)]
pub struct KeyframeDef {
    pub part: i16,
    pub flags: u32,
    pub payload: Vec<u8>,
}

impl KeyframeDef {
    pub fn new(part: i16) -> Self {
        Self {
            part,
            flags: 0,
            payload: Vec::new(),
        }
    }

    pub fn flag(mut self, flag: KeyframeFlag) -> Self {
        self.flags |= flag.bits();
        self
    }

    pub fn raw(mut self, flag: KeyframeFlag, bytes: &[u8]) -> Self {
        self.flags |= flag.bits();
        self.payload.extend(bytes);
        self
    }

    pub fn i16(self, flag: KeyframeFlag, value: i16) -> Self {
        self.raw(flag, &value.to_le_bytes())
    }

    pub fn f32(self, flag: KeyframeFlag, value: f32) -> Self {
        self.raw(flag, &value.to_le_bytes())
    }
}

#[derive(Clone)]
pub struct AnimationDef {
    pub name: &'static str,
    pub canvas: (u16, u16),
    pub fps: u16,
    pub initial: Vec<InitialDef>,
    /// One entry per frame time, each holding one keyframe per part.
    pub frames: Vec<Vec<KeyframeDef>>,
    /// Write only the first frame time's keyframes and point every frame time at them.
    pub shared_frames: bool,
    pub labels: Vec<(&'static str, u16)>,
    pub user_data: u32,
}

#[derive(Clone)]
pub struct PackageDef {
    pub name: &'static str,
    pub parts: Vec<PartDef>,
    pub animations: Vec<AnimationDef>,
}

#[derive(Clone)]
pub struct FileDef {
    pub version: u32,
    pub cells: Vec<CellDef>,
    pub packages: Vec<PackageDef>,
}

const HEADER_SIZE: usize = 32;

impl FileDef {
    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer {
            data: vec![0; HEADER_SIZE],
        };

        let mut maps = BTreeMap::new();
        for cell in &self.cells {
            if !maps.contains_key(cell.map) {
                let name = w.string(cell.map);
                let image = w.string(cell.image);
                let offset = w.position();
                w.u32(name).u32(image).i16(0).i16(1);
                maps.insert(cell.map, offset);
            }
        }

        let cell_names = self
            .cells
            .iter()
            .map(|cell| w.string(cell.name))
            .collect::<Vec<_>>();
        let cell_table = w.position();
        for (i, cell) in self.cells.iter().enumerate() {
            w.u32(cell_names[i])
                .u32(maps[cell.map])
                .i16(i16::try_from(i).unwrap())
                .i16(cell.position.0)
                .i16(cell.position.1)
                .i16(cell.size.0)
                .i16(cell.size.1)
                .u16(0)
                .f32(cell.pivot.0)
                .f32(cell.pivot.1);
        }

        let packages = self
            .packages
            .iter()
            .map(|package| write_package(&mut w, package))
            .collect::<Vec<_>>();
        let package_table = w.position();
        for (name, parts, animations, part_count, animation_count) in packages {
            w.u32(name)
                .u32(parts)
                .u32(animations)
                .u16(part_count)
                .u16(animation_count);
        }

        w.patch_u32(0, SIGNATURE);
        w.patch_u32(4, self.version);
        w.patch_u32(16, cell_table);
        w.patch_u32(20, package_table);
        w.patch_u16(28, u16::try_from(self.cells.len()).unwrap());
        w.patch_u16(30, u16::try_from(self.packages.len()).unwrap());
        w.into_inner()
    }
}

fn write_package(w: &mut Writer, package: &PackageDef) -> (u32, u32, u32, u16, u16) {
    let parts = package
        .parts
        .iter()
        .map(|part| {
            let name = w.string(part.name);
            let instance = part.instance.map_or(0, |instance| w.string(instance));
            (name, instance)
        })
        .collect::<Vec<_>>();
    let empty = w.string("");
    let part_table = w.position();
    for (part, (name, instance)) in package.parts.iter().zip(parts) {
        w.u32(name)
            .i16(part.index)
            .i16(part.parent)
            .i16(part.part_type)
            .i16(0)
            .i16(0)
            .u16(0)
            .u32(instance)
            .u32(empty)
            .u32(0);
    }

    let animations = package
        .animations
        .iter()
        .map(|animation| write_animation(w, animation))
        .collect::<Vec<_>>();
    let animation_table = w.position();
    for (animation, (name, initial, frames, labels)) in package.animations.iter().zip(animations) {
        w.u32(name)
            .u32(initial)
            .u32(frames)
            .u32(animation.user_data)
            .u32(labels)
            .u16(u16::try_from(animation.frames.len()).unwrap())
            .u16(animation.fps)
            .u16(u16::try_from(animation.labels.len()).unwrap())
            .u16(animation.canvas.0)
            .u16(animation.canvas.1)
            .u16(0);
    }

    let name = w.string(package.name);
    (
        name,
        part_table,
        animation_table,
        u16::try_from(package.parts.len()).unwrap(),
        u16::try_from(package.animations.len()).unwrap(),
    )
}

fn write_animation(w: &mut Writer, animation: &AnimationDef) -> (u32, u32, u32, u32) {
    let initial = w.position();
    for frame in &animation.initial {
        w.i16(frame.part)
            .u16(0)
            .u32(frame.flags)
            .i16(frame.cell)
            .i16(frame.position[0])
            .i16(frame.position[1])
            .i16(frame.position[2])
            .i16(frame.opacity)
            .u16(0)
            .f32(frame.pivot.0)
            .f32(frame.pivot.1)
            .f32(frame.rotation[0])
            .f32(frame.rotation[1])
            .f32(frame.rotation[2])
            .f32(frame.scale.0)
            .f32(frame.scale.1)
            .f32(frame.size.0)
            .f32(frame.size.1)
            .f32(0.0)
            .f32(0.0)
            .f32(0.0)
            .f32(1.0)
            .f32(1.0)
            .f32(0.0);
    }

    let written = if animation.shared_frames { 1 } else { animation.frames.len() };
    let mut blocks = animation.frames[..written]
        .iter()
        .map(|keyframes| {
            let block = w.position();
            for keyframe in keyframes {
                w.i16(keyframe.part).u32(keyframe.flags);
                w.data.extend(&keyframe.payload);
            }
            block
        })
        .collect::<Vec<_>>();
    if let Some(&first) = blocks.first() {
        blocks.resize(animation.frames.len(), first);
    }
    let frames = w.position();
    for block in blocks {
        w.u32(block);
    }

    let labels = if animation.labels.is_empty() {
        0
    } else {
        let records = animation
            .labels
            .iter()
            .map(|&(name, time)| {
                let name = w.string(name);
                let record = w.position();
                w.u32(name).u16(time);
                record
            })
            .collect::<Vec<_>>();
        let table = w.position();
        for record in records {
            w.u32(record);
        }
        table
    };

    let name = w.string(animation.name);
    (name, initial, frames, labels)
}

/// A 64x64 cell, a root part at (4, 2) without a cell and a child part at (10, 5) showing the
/// cell, in a single-frame animation on a 100x100 canvas.
pub fn minimal() -> FileDef {
    FileDef {
        version: 0x0B,
        cells: vec![CellDef::new("body", "atlas", (64, 64))],
        packages: vec![PackageDef {
            name: "unit",
            parts: vec![
                PartDef::new("root", 0, -1, 0),
                PartDef::new("body", 1, 0, 1),
            ],
            animations: vec![AnimationDef {
                name: "idle",
                canvas: (100, 100),
                fps: 30,
                initial: vec![
                    InitialDef::new(0).position(4, 2),
                    InitialDef::new(1).cell(0, (64.0, 64.0)).position(10, 5),
                ],
                frames: vec![vec![KeyframeDef::new(0), KeyframeDef::new(1)]],
                shared_frames: false,
                labels: Vec::new(),
                user_data: 0,
            }],
        }],
    }
}

impl FileDef {
    /// The single animation of [`minimal`]'s single package.
    pub fn animation_mut(&mut self) -> &mut AnimationDef {
        &mut self.packages[0].animations[0]
    }
}
