use anyhow::{Context as _, bail};
use ssbp::de::{Animation, AnimationPackage, Ssbp};
use ssbp::render::{self, CellImages, RenderOptions, TextureDir};
use ssbp::state;
use tracing::{info, warn};

use crate::commands::split::{needs_split, split_cells};
use crate::commands::{Run, for_each_unit};
use crate::config::Unit;
use crate::context::Context;
use crate::layout::{UnitDir, create_dir};

#[derive(Debug, Clone, Default, clap::Args)]
pub struct Render {
    /// Units to render (all configured units if none are given).
    units: Vec<String>,

    /// Only render animations of this package.
    #[clap(long)]
    package: Option<String>,

    /// Only render animations with this name.
    #[clap(long)]
    animation: Option<String>,

    /// Frame to render, counting from 1 [default: 1].
    #[clap(
        long,
        value_parser = clap::value_parser!(u16).range(1..),
        conflicts_with = "all_frames",
    )]
    frame: Option<u16>,

    /// Render every frame of each animation.
    #[clap(long)]
    all_frames: bool,

    /// Also write each drawn part to its own image.
    #[clap(long)]
    parts: bool,

    /// Fail on animations using unsupported features instead of skipping them.
    #[clap(long)]
    strict: bool,
}

impl Run for Render {
    fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let frames = if self.all_frames {
            Frames::All
        } else {
            Frames::One(self.frame.map_or(0, |frame| usize::from(frame) - 1))
        };

        for_each_unit(ctx, &self.units, "rendered", |unit, dir, config| {
            let job = Job {
                package: self.package.as_deref(),
                animation: self.animation.as_deref(),
                frames,
                options: RenderOptions {
                    offset: config.offset(),
                    export_parts: self.parts,
                },
                strict: self.strict,
            };

            let count = process_unit(unit, dir, &job)?;
            info!("rendered ({count}) frames");
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frames {
    /// A single frame time, counting from 0.
    One(usize),
    All,
}

/// What to render from each unit.
#[derive(Debug, Clone)]
struct Job<'a> {
    package: Option<&'a str>,
    animation: Option<&'a str>,
    frames: Frames,
    options: RenderOptions,
    strict: bool,
}

/// Render the selected frames of a unit. Returns the number of frames written.
fn process_unit(unit: &Unit, dir: &UnitDir, job: &Job<'_>) -> anyhow::Result<usize> {
    let ssbp = Ssbp::open(unit.input(), job.strict).context("failed to decode SSBP file")?;

    for skipped in ssbp.skipped() {
        warn!(
            "skipped animation {}/{}: unsupported feature: {}",
            skipped.package(),
            skipped.animation(),
            skipped.feature()
        );
    }

    if needs_split(&ssbp, dir) {
        info!("some cells have no bitmap, splitting atlases");
        split_cells(&ssbp, unit, dir)?;
    }

    create_dir(&dir.frames())?;
    let images = TextureDir::new(dir.tex());
    let mut count = 0;

    let packages = ssbp
        .packages()
        .iter()
        .filter(|package| job.package.is_none_or(|name| package.name() == name));

    for package in packages {
        let animations = package
            .animations()
            .iter()
            .filter(|animation| job.animation.is_none_or(|name| animation.name() == name));

        for animation in animations {
            let frame_count = usize::from(animation.frame_count());
            let frames = match job.frames {
                Frames::One(frame) if frame >= frame_count => {
                    warn!(
                        "skipping {}/{}: frame {} is past its ({frame_count}) frames",
                        package.name(),
                        animation.name(),
                        frame + 1
                    );
                    continue;
                }
                Frames::One(frame) => frame..frame + 1,
                Frames::All => 0..frame_count,
            };

            for frame in frames {
                render_frame(&ssbp, package, animation, frame, &images, dir, &job.options)?;
                count += 1;
            }
        }
    }

    if count == 0 {
        bail!("no frame matched the selection");
    }

    Ok(count)
}

fn render_frame(
    ssbp: &Ssbp,
    package: &AnimationPackage,
    animation: &Animation,
    frame: usize,
    images: &impl CellImages,
    dir: &UnitDir,
    options: &RenderOptions,
) -> anyhow::Result<()> {
    let states = state::resolve(package, animation, frame, ssbp.cells()).with_context(|| {
        format!(
            "failed to resolve {}/{} at frame {}",
            package.name(),
            animation.name(),
            frame + 1
        )
    })?;

    let rendered = render::render(
        &states,
        ssbp.cells(),
        animation.canvas_size(),
        images,
        options,
    );

    if !rendered.skipped.is_empty() {
        info!(
            "{}/{} frame {}: ({}) parts were not drawn",
            package.name(),
            animation.name(),
            frame + 1,
            rendered.skipped.len()
        );
    }

    let path = dir.frame_file(package.name(), animation.name(), frame);
    rendered
        .canvas
        .save(&path)
        .with_context(|| format!("failed to save frame: {}", path.display()))?;
    info!("created file: {:#}", path.display());

    for (part, canvas) in &rendered.parts {
        let path = dir.part_file(package.name(), animation.name(), frame, *part);
        canvas
            .save(&path)
            .with_context(|| format!("failed to save part: {}", path.display()))?;
        info!("created file: {:#}", path.display());
    }

    Ok(())
}
