use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context as _;
use image::imageops;
use ssbp::de::Ssbp;
use tracing::{info, warn};

use crate::commands::{Run, for_each_unit};
use crate::config::Unit;
use crate::context::Context;
use crate::layout::{UnitDir, create_dir};

#[derive(Debug, Clone, Default, clap::Args)]
pub struct Split {
    /// Units to process (all configured units if none are given).
    units: Vec<String>,

    /// Split even if every cell already has a bitmap.
    #[clap(long)]
    force: bool,
}

impl Run for Split {
    fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        for_each_unit(ctx, &self.units, "split", |unit, dir, _| {
            let ssbp = Ssbp::open(unit.input(), false).context("failed to decode SSBP file")?;

            if self.force || needs_split(&ssbp, dir) {
                split_cells(&ssbp, unit, dir)?;
            } else {
                info!("every cell already has a bitmap");
            }

            Ok(())
        })
    }
}

/// Whether any cell is missing its bitmap.
pub fn needs_split(ssbp: &Ssbp, dir: &UnitDir) -> bool {
    let names = ssbp
        .cells()
        .iter()
        .map(|cell| cell.name())
        .collect::<BTreeSet<_>>();

    let present = names
        .iter()
        .filter(|name| dir.tex_file(name).is_file())
        .count();

    present < names.len()
}

/// Cut every cell out of its atlas into `<tex>/<cell>.png`. Returns the number of files written.
///
/// Atlases that do not exist are skipped with a warning.
pub fn split_cells(ssbp: &Ssbp, unit: &Unit, dir: &UnitDir) -> anyhow::Result<usize> {
    create_dir(&dir.tex())?;

    let textures = unit.textures();
    let mut count = 0;

    for map in ssbp.cell_maps() {
        let path = textures.join(map.image_path());

        if !path.is_file() {
            warn!("atlas not found, skipping: {}", path.display());
            continue;
        }

        let atlas = load_atlas(&path)?;

        for cell in ssbp.cells_of(map) {
            let (Ok(x), Ok(y), Ok(width), Ok(height)) = (
                u32::try_from(cell.position().x),
                u32::try_from(cell.position().y),
                u32::try_from(cell.size().x),
                u32::try_from(cell.size().y),
            ) else {
                warn!("cell {:?} has a negative rectangle, skipping", cell.name());
                continue;
            };

            let bitmap = imageops::crop_imm(&atlas, x, y, width, height).to_image();
            let output = dir.tex_file(cell.name());
            bitmap
                .save(&output)
                .with_context(|| format!("failed to save cell bitmap: {}", output.display()))?;

            count += 1;
        }
    }

    info!("wrote ({count}) cell bitmaps");
    Ok(count)
}

fn load_atlas(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let atlas = image::open(path)
        .with_context(|| format!("failed to load atlas: {}", path.display()))?;

    Ok(atlas.into_rgba8())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::config::{Config, FILE_NAME};
    use crate::testing;

    #[test]
    fn crops_cells() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("unit.ssbp"), testing::sample()).unwrap();
        fs::write(
            root.path().join(FILE_NAME),
            "[[unit]]\nname = \"unit\"\ninput = \"unit.ssbp\"\n",
        )
        .unwrap();

        let config = Config::from_file(&root.path().join(FILE_NAME)).unwrap();
        let unit = &config.units()[0];
        let dir = UnitDir::new(config.output(), unit.name());
        let ssbp = Ssbp::open(unit.input(), true).unwrap();

        // Without the atlas nothing can be split.
        assert!(needs_split(&ssbp, &dir));
        assert_eq!(split_cells(&ssbp, unit, &dir).unwrap(), 0);

        let atlas = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        atlas.save(root.path().join("atlas.png")).unwrap();

        assert_eq!(split_cells(&ssbp, unit, &dir).unwrap(), 1);
        assert!(!needs_split(&ssbp, &dir));

        let body = image::open(dir.tex_file("body")).unwrap().into_rgba8();
        assert_eq!(body.dimensions(), (2, 2));
        assert_eq!(body.get_pixel(0, 0), &Rgba([1, 1, 0, 255]));
        assert_eq!(body.get_pixel(1, 1), &Rgba([2, 2, 0, 255]));
    }
}
