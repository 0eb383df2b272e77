//! Pixel operations used to place a cell bitmap on a canvas.

// Pixel math moves freely between integer and float coordinates.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use glam::Vec2;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Mirror `image` in place.
pub fn flip(image: &mut RgbaImage, horizontal: bool, vertical: bool) {
    if horizontal {
        imageops::flip_horizontal_in_place(image);
    }

    if vertical {
        imageops::flip_vertical_in_place(image);
    }
}

/// Resample `image` to `width` by `height` with a bicubic filter.
#[must_use]
pub fn resize(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }

    imageops::resize(image, width, height, FilterType::CatmullRom)
}

/// Rotate `image` counter-clockwise by `degrees` around `anchor`.
///
/// The result is large enough to hold every rotated pixel. Returns the rotated bitmap and where
/// `anchor` ended up in it.
#[must_use]
pub fn rotate(image: &RgbaImage, degrees: f32, anchor: Vec2) -> (RgbaImage, Vec2) {
    if degrees.rem_euclid(360.0) == 0.0 {
        return (image.clone(), anchor);
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    let (width, height) = (image.width() as f32, image.height() as f32);

    // Image space is y-down, so a counter-clockwise turn maps (x, y) to
    // (x cos + y sin, -x sin + y cos) around the anchor.
    let forward = |p: Vec2| Vec2::new(p.x * cos + p.y * sin, -p.x * sin + p.y * cos);
    let corners = [
        Vec2::new(0.0, 0.0),
        Vec2::new(width, 0.0),
        Vec2::new(0.0, height),
        Vec2::new(width, height),
    ]
    .map(|corner| forward(corner - anchor));

    let min = corners.iter().copied().reduce(Vec2::min).unwrap_or(Vec2::ZERO);
    let max = corners.iter().copied().reduce(Vec2::max).unwrap_or(Vec2::ZERO);

    // Absorb float error so exact quarter turns do not grow by a pixel.
    let size = (max - min - 1e-3).ceil().max(Vec2::ZERO);
    let mut rotated = RgbaImage::new(size.x as u32, size.y as u32);

    for (x, y, pixel) in rotated.enumerate_pixels_mut() {
        let offset = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) + min;
        let source = anchor
            + Vec2::new(
                offset.x * cos - offset.y * sin,
                offset.x * sin + offset.y * cos,
            );

        *pixel = sample(image, source - 0.5);
    }

    (rotated, -min)
}

/// Bilinear sample at pixel coordinates `p`. Outside the image is transparent.
fn sample(image: &RgbaImage, p: Vec2) -> Rgba<u8> {
    let base = p.floor();
    let t = p - base;
    let (x0, y0) = (base.x as i64, base.y as i64);

    let mut color = [0.0f32; 3];
    let mut alpha = 0.0f32;

    for (dx, dy, weight) in [
        (0, 0, (1.0 - t.x) * (1.0 - t.y)),
        (1, 0, t.x * (1.0 - t.y)),
        (0, 1, (1.0 - t.x) * t.y),
        (1, 1, t.x * t.y),
    ] {
        let Some(texel) = texel(image, x0 + dx, y0 + dy) else {
            continue;
        };

        let a = f32::from(texel[3]) * weight;
        for (channel, value) in color.iter_mut().zip(&texel.0[..3]) {
            *channel += f32::from(*value) * a;
        }
        alpha += a;
    }

    if alpha <= f32::EPSILON {
        return Rgba([0; 4]);
    }

    let [r, g, b] = color.map(|channel| to_u8(channel / alpha));
    Rgba([r, g, b, to_u8(alpha)])
}

fn texel(image: &RgbaImage, x: i64, y: i64) -> Option<&Rgba<u8>> {
    let x = u32::try_from(x).ok()?;
    let y = u32::try_from(y).ok()?;
    (x < image.width() && y < image.height()).then(|| image.get_pixel(x, y))
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Alpha-composite `source` over `canvas` with its top-left corner at (`x`, `y`).
///
/// The destination may lie partly or entirely outside the canvas; only the overlap is drawn.
/// `opacity` (0 to 1) scales the source's alpha.
pub fn blit(canvas: &mut RgbaImage, source: &RgbaImage, x: i64, y: i64, opacity: f32) {
    let left = x.max(0);
    let top = y.max(0);
    let right = x
        .saturating_add(i64::from(source.width()))
        .min(i64::from(canvas.width()));
    let bottom = y
        .saturating_add(i64::from(source.height()))
        .min(i64::from(canvas.height()));

    for dy in top..bottom {
        for dx in left..right {
            let src = source.get_pixel((dx - x) as u32, (dy - y) as u32);
            let dst = canvas.get_pixel_mut(dx as u32, dy as u32);
            *dst = over(*src, *dst, opacity);
        }
    }
}

/// Porter-Duff "over" on straight alpha.
fn over(src: Rgba<u8>, dst: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0 * opacity;
    let da = f32::from(dst[3]) / 255.0;
    let out = sa + da * (1.0 - sa);

    if out <= f32::EPSILON {
        return Rgba([0; 4]);
    }

    let mut pixel = [0; 4];
    for (i, channel) in pixel.iter_mut().take(3).enumerate() {
        let value = f32::from(src[i]) * sa + f32::from(dst[i]) * da * (1.0 - sa);
        *channel = to_u8(value / out);
    }
    pixel[3] = to_u8(out * 255.0);

    Rgba(pixel)
}
