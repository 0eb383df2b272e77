//! Composite resolved part states into frame images.

mod error;
pub mod raster;
mod source;

use glam::{IVec2, UVec2, Vec2};
use image::RgbaImage;
use tracing::{debug, warn};

pub use error::RenderError;
pub use source::{CellImages, TextureDir};

use crate::de::Cell;
use crate::state::PartState;

/// Options for [`render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Added to every part's position on the canvas, in image pixels (y down).
    pub offset: IVec2,
    /// Also composite every drawn part onto its own canvas.
    pub export_parts: bool,
}

/// The result of compositing one frame.
#[derive(Debug)]
pub struct Rendered {
    /// Every drawn part, in part index order.
    pub canvas: RgbaImage,
    /// Each drawn part on its own canvas, when requested.
    pub parts: Vec<(usize, RgbaImage)>,
    /// Parts that should have been drawn but were not, with the reason.
    pub skipped: Vec<(usize, RenderError)>,
}

/// A cell bitmap transformed for one part, with its anchor point.
struct Sprite {
    image: RgbaImage,
    anchor: Vec2,
}

/// Composite `states` onto a transparent canvas of `canvas_size`.
///
/// Parts are drawn in order, so parents end up below their children. Hidden parts and parts
/// without a cell are not drawn. A part that cannot be drawn is listed in
/// [`Rendered::skipped`] and the remaining parts are still composited.
pub fn render(
    states: &[PartState],
    cells: &[Cell],
    canvas_size: UVec2,
    images: &impl CellImages,
    options: &RenderOptions,
) -> Rendered {
    let mut rendered = Rendered {
        canvas: RgbaImage::new(canvas_size.x, canvas_size.y),
        parts: Vec::new(),
        skipped: Vec::new(),
    };

    for state in states {
        if state.invisible {
            continue;
        }

        if let Some(feature) = state.unsupported {
            warn!("skipping part {}: unsupported feature: {feature}", state.index);
            rendered.skipped.push((
                state.index,
                RenderError::UnsupportedFeature {
                    part: state.index,
                    feature,
                },
            ));
            continue;
        }

        let Some(cell) = state.cell.and_then(|cell| cells.get(cell)) else {
            continue;
        };

        if !state.is_drawable() {
            continue;
        }

        let bitmap = match images.load(cell) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                warn!("skipping part {}: {err}", state.index);
                rendered.skipped.push((state.index, err));
                continue;
            }
        };

        let Some(sprite) = transform(bitmap, state) else {
            debug!("part {} has no area", state.index);
            continue;
        };

        let Some((x, y)) = placement(&sprite, state, canvas_size, options.offset) else {
            debug!("part {} has no finite position", state.index);
            continue;
        };
        let opacity = f32::from(state.opacity.clamp(0, 255)) / 255.0;
        debug!(
            "part {} ({:?}) at ({x}, {y}), {}x{}",
            state.index,
            cell.name(),
            sprite.image.width(),
            sprite.image.height()
        );

        raster::blit(&mut rendered.canvas, &sprite.image, x, y, opacity);

        if options.export_parts {
            let mut canvas = RgbaImage::new(canvas_size.x, canvas_size.y);
            raster::blit(&mut canvas, &sprite.image, x, y, opacity);
            rendered.parts.push((state.index, canvas));
        }
    }

    rendered
}

/// Flip, resize and rotate a cell bitmap as `state` asks.
///
/// Returns `None` when scaling leaves nothing to draw.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn transform(mut image: RgbaImage, state: &PartState) -> Option<Sprite> {
    raster::flip(
        &mut image,
        state.flip_h || state.scale.x < 0.0,
        state.flip_v || state.scale.y < 0.0,
    );

    let scale = state.scale.abs();
    if scale != Vec2::ONE {
        let bitmap = image.dimensions();
        let nominal = Vec2::new(
            if state.size.x > 0.0 { state.size.x } else { bitmap.0 as f32 },
            if state.size.y > 0.0 { state.size.y } else { bitmap.1 as f32 },
        );
        let target = (nominal * scale).round();

        if !target.is_finite() || target.x < 1.0 || target.y < 1.0 {
            return None;
        }

        image = raster::resize(&image, target.x as u32, target.y as u32);
    }

    if image.width() == 0 || image.height() == 0 {
        return None;
    }

    let size = Vec2::new(image.width() as f32, image.height() as f32);
    let anchor = size * (Vec2::splat(0.5) + state.pivot);
    let (image, anchor) = raster::rotate(&image, state.world_rotation, anchor);

    Some(Sprite { image, anchor })
}

/// Top-left corner of `sprite` on the canvas.
///
/// The canvas center is the origin of the part hierarchy, with y pointing up. Corners beyond the
/// `i64` range saturate.
#[expect(clippy::cast_possible_truncation)]
fn placement(
    sprite: &Sprite,
    state: &PartState,
    canvas_size: UVec2,
    offset: IVec2,
) -> Option<(i64, i64)> {
    let translation = state.translation();
    let origin = canvas_size.as_vec2() / 2.0 + offset.as_vec2();
    let anchor = origin + Vec2::new(translation.x, -translation.y);
    let corner = (anchor - sprite.anchor).round();

    corner
        .is_finite()
        .then(|| (corner.x as i64, corner.y as i64))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::de::{KeyframeFlag, Ssbp};
    use crate::testing::{self, KeyframeDef};
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn body() -> HashMap<String, RgbaImage> {
        HashMap::from([("body".to_owned(), RgbaImage::from_pixel(64, 64, RED))])
    }

    fn render_file(
        file: &testing::FileDef,
        images: &HashMap<String, RgbaImage>,
        options: &RenderOptions,
    ) -> Rendered {
        let ssbp = Ssbp::from_bytes(&file.build()).expect("expected valid data");
        let animation = ssbp.package("unit").unwrap().animation("idle").unwrap();
        let states = ssbp.resolve("unit", "idle", 0).unwrap();
        render(
            &states,
            ssbp.cells(),
            animation.canvas_size(),
            images,
            options,
        )
    }

    #[test]
    fn minimal_file() {
        let rendered = render_file(&testing::minimal(), &body(), &RenderOptions::default());
        let canvas = &rendered.canvas;

        assert_eq!(canvas.dimensions(), (100, 100));
        assert!(rendered.skipped.is_empty());
        assert!(rendered.parts.is_empty());

        // The body's anchor sits at the canvas center plus (10 + 4, 5 + 2), y up.
        assert_eq!(canvas.get_pixel(32, 11), &RED);
        assert_eq!(canvas.get_pixel(95, 74), &RED);
        assert_eq!(canvas.get_pixel(31, 11), &CLEAR);
        assert_eq!(canvas.get_pixel(32, 10), &CLEAR);
        assert_eq!(canvas.get_pixel(96, 74), &CLEAR);
        assert_eq!(canvas.get_pixel(95, 75), &CLEAR);
    }

    #[test]
    fn canvas_size_is_fixed() {
        let mut file = testing::minimal();
        file.animation_mut().initial[1].position = [30_000, -30_000, 0];

        let rendered = render_file(&file, &body(), &RenderOptions::default());
        assert_eq!(rendered.canvas.dimensions(), (100, 100));
        assert!(rendered.canvas.pixels().all(|pixel| *pixel == CLEAR));
    }

    #[test]
    fn huge_parent_scale_is_clipped() {
        let mut file = testing::minimal();
        file.animation_mut().initial[0].scale = (1e30, 1.0);

        let rendered = render_file(&file, &body(), &RenderOptions::default());
        assert_eq!(rendered.canvas.dimensions(), (100, 100));
        assert!(rendered.canvas.pixels().all(|pixel| *pixel == CLEAR));
        assert!(rendered.skipped.is_empty());
    }

    #[test]
    fn infinite_position_is_skipped() {
        let mut file = testing::minimal();
        file.animation_mut().initial[0].scale = (f32::INFINITY, 1.0);

        let rendered = render_file(&file, &body(), &RenderOptions::default());
        assert!(rendered.canvas.pixels().all(|pixel| *pixel == CLEAR));
    }

    #[test]
    fn placement_offset() {
        let options = RenderOptions {
            offset: IVec2::new(-10, 5),
            export_parts: true,
        };
        let rendered = render_file(&testing::minimal(), &body(), &options);

        assert_eq!(rendered.canvas.get_pixel(22, 16), &RED);
        assert_eq!(rendered.canvas.get_pixel(21, 16), &CLEAR);
        assert_eq!(rendered.parts.len(), 1);
        assert_eq!(rendered.parts[0].0, 1);
        assert_eq!(rendered.parts[0].1, rendered.canvas);
    }

    #[test]
    fn missing_bitmap_skips_part() {
        let rendered = render_file(
            &testing::minimal(),
            &HashMap::new(),
            &RenderOptions::default(),
        );

        assert_eq!(rendered.canvas.dimensions(), (100, 100));
        assert!(matches!(
            rendered.skipped.as_slice(),
            [(1, RenderError::MissingAsset { cell, .. })] if cell == "body"
        ));
    }

    #[test]
    fn unsupported_part_is_reported() {
        let mut file = testing::minimal();
        file.animation_mut().frames = vec![vec![
            KeyframeDef::new(0),
            KeyframeDef::new(1).raw(KeyframeFlag::VERTEX_TRANSFORM, &[0b0010, 0, 1, 0, 1, 0]),
        ]];

        let rendered = render_file(&file, &body(), &RenderOptions::default());

        assert!(rendered.canvas.pixels().all(|pixel| *pixel == CLEAR));
        assert!(matches!(
            rendered.skipped.as_slice(),
            [(
                1,
                RenderError::UnsupportedFeature {
                    part: 1,
                    feature: "vertex transform"
                }
            )]
        ));
    }

    #[test]
    fn hidden_part() {
        let mut file = testing::minimal();
        file.animation_mut().initial[1].flags = KeyframeFlag::INVISIBLE.bits();

        let rendered = render_file(&file, &body(), &RenderOptions::default());
        assert!(rendered.canvas.pixels().all(|pixel| *pixel == CLEAR));
        assert!(rendered.skipped.is_empty());
    }

    #[test]
    fn opacity_scales_alpha() {
        let mut file = testing::minimal();
        file.animation_mut().initial[1].opacity = 51;

        let rendered = render_file(&file, &body(), &RenderOptions::default());
        assert_eq!(rendered.canvas.get_pixel(50, 50), &Rgba([255, 0, 0, 51]));
    }

    #[test]
    fn scale_resizes_around_anchor() {
        let mut file = testing::minimal();
        file.animation_mut().initial[1].scale = (0.5, -2.0);

        let images = HashMap::from([(
            "body".to_owned(),
            RgbaImage::from_fn(64, 64, |_, y| if y < 32 { RED } else { Rgba([0, 0, 255, 255]) }),
        )]);
        let rendered = render_file(&file, &images, &RenderOptions::default());
        let canvas = &rendered.canvas;

        // 32x128 centered on (64, 43); negative y scale mirrors vertically.
        assert_eq!(canvas.get_pixel(48, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(48, 99), &RED);
        assert_eq!(canvas.get_pixel(47, 60), &CLEAR);
        assert_eq!(canvas.get_pixel(80, 60), &CLEAR);
        assert_eq!(canvas.get_pixel(79, 60), &RED);
    }
}
