use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use glam::UVec2;

use crate::de::frame::{InitialFrame, Keyframe};
use crate::de::part::AnimationPart;

/// A part hierarchy and the animations that move it.
#[derive(Debug, Clone)]
pub struct AnimationPackage {
    pub(crate) name: String,
    pub(crate) parts: Vec<AnimationPart>,
    pub(crate) animations: Vec<Animation>,
}

impl AnimationPackage {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part hierarchy shared by every animation of this package, in index order.
    pub fn parts(&self) -> &[AnimationPart] {
        &self.parts
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Look up an animation by name.
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|animation| animation.name == name)
    }
}

/// Keyframe data for one animation of a package.
#[derive(Debug, Clone)]
pub struct Animation {
    pub(crate) name: String,
    pub(crate) canvas_size: UVec2,
    pub(crate) frame_count: u16,
    pub(crate) fps: u16,
    pub(crate) initial_frames: BTreeMap<usize, InitialFrame>,
    pub(crate) keyframes: BTreeMap<usize, Vec<Keyframe>>,
    pub(crate) labels: BTreeMap<String, u16>,
}

impl Animation {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width and height of a rendered frame, in pixels.
    pub const fn canvas_size(&self) -> UVec2 {
        self.canvas_size
    }

    pub const fn frame_count(&self) -> u16 {
        self.frame_count
    }

    /// Playback rate, in frames per second.
    pub const fn fps(&self) -> u16 {
        self.fps
    }

    /// The state of each part before frame 0, keyed by part index.
    pub const fn initial_frames(&self) -> &BTreeMap<usize, InitialFrame> {
        &self.initial_frames
    }

    /// One keyframe per frame time for each part, keyed by part index.
    pub const fn keyframes(&self) -> &BTreeMap<usize, Vec<Keyframe>> {
        &self.keyframes
    }

    /// Named frame times.
    pub const fn labels(&self) -> &BTreeMap<String, u16> {
        &self.labels
    }
}

/// Represents one record of the animation package table.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PackageRecord {
    name: u32,
    parts: u32,
    animations: u32,
    part_count: u16,
    animation_count: u16,
}

impl PackageRecord {
    pub const fn name(&self) -> u32 {
        u32::from_le(self.name)
    }

    pub const fn parts(&self) -> u32 {
        u32::from_le(self.parts)
    }

    pub const fn animations(&self) -> u32 {
        u32::from_le(self.animations)
    }

    pub const fn part_count(&self) -> u16 {
        u16::from_le(self.part_count)
    }

    pub const fn animation_count(&self) -> u16 {
        u16::from_le(self.animation_count)
    }
}

/// Represents one record of a package's animation table.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct AnimationRecord {
    name: u32,
    initial_frames: u32,
    frames: u32,
    user_data: u32,
    labels: u32,
    frame_count: u16,
    fps: u16,
    label_count: u16,
    canvas_width: u16,
    canvas_height: u16,

    // Not used.
    _reserved: u16,
}

impl AnimationRecord {
    pub const fn name(&self) -> u32 {
        u32::from_le(self.name)
    }

    pub const fn initial_frames(&self) -> u32 {
        u32::from_le(self.initial_frames)
    }

    /// Pointer to a table holding one pointer per frame time.
    pub const fn frames(&self) -> u32 {
        u32::from_le(self.frames)
    }

    pub const fn user_data(&self) -> u32 {
        u32::from_le(self.user_data)
    }

    pub const fn labels(&self) -> u32 {
        u32::from_le(self.labels)
    }

    pub const fn frame_count(&self) -> u16 {
        u16::from_le(self.frame_count)
    }

    pub const fn fps(&self) -> u16 {
        u16::from_le(self.fps)
    }

    pub const fn label_count(&self) -> u16 {
        u16::from_le(self.label_count)
    }

    pub fn canvas_size(&self) -> UVec2 {
        UVec2::new(
            u16::from_le(self.canvas_width).into(),
            u16::from_le(self.canvas_height).into(),
        )
    }
}
