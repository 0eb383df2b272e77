use std::fmt::Write as _;
use std::fs;

use anyhow::Context as _;
use ssbp::de::{Animation, AnimationPackage, Ssbp};
use tracing::{info, warn};

use crate::commands::{Run, for_each_unit};
use crate::context::Context;
use crate::layout::create_dir;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct Dump {
    /// Units to dump (all configured units if none are given).
    units: Vec<String>,

    /// Fail on animations using unsupported features instead of skipping them.
    #[clap(long)]
    strict: bool,
}

impl Run for Dump {
    fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        for_each_unit(ctx, &self.units, "dumped", |unit, dir, _| {
            let ssbp = Ssbp::open(unit.input(), self.strict).context("failed to decode SSBP file")?;

            for skipped in ssbp.skipped() {
                warn!(
                    "skipped animation {}/{}: unsupported feature: {}",
                    skipped.package(),
                    skipped.animation(),
                    skipped.feature()
                );
            }

            for package in ssbp.packages() {
                let output = dir.dump(package.name());
                create_dir(&output)?;

                for animation in package.animations() {
                    let files = [
                        ("initial_frame_data", initial_frame_data(package, animation)?),
                        ("frame_data", frame_data(package, animation)?),
                    ];

                    for (extension, contents) in files {
                        let path = output.join(format!("{}.{extension}", animation.name()));
                        fs::write(&path, contents)
                            .with_context(|| format!("failed to write {}", path.display()))?;
                        info!("created file: {:#}", path.display());
                    }
                }
            }

            Ok(())
        })
    }
}

fn header(animation: &Animation) -> Result<String, std::fmt::Error> {
    let mut contents = String::new();
    let canvas = animation.canvas_size();

    writeln!(contents, "Animation name - {}", animation.name())?;
    writeln!(contents, "Canvas size - {}x{}", canvas.x, canvas.y)?;
    writeln!(contents, "Frames - {}", animation.frame_count())?;
    writeln!(contents, "FPS - {}", animation.fps())?;

    for (label, frame) in animation.labels() {
        writeln!(contents, "Label - {label} at frame {}", u32::from(*frame) + 1)?;
    }

    writeln!(contents)?;
    Ok(contents)
}

/// The initial state of every part, one record per line.
fn initial_frame_data(
    package: &AnimationPackage,
    animation: &Animation,
) -> Result<String, std::fmt::Error> {
    let mut contents = header(animation)?;

    for (index, part) in package.parts().iter().enumerate() {
        if let Some(frame) = animation.initial_frames().get(&index) {
            writeln!(contents, "Part {} ({}) | {frame:?}", index + 1, part.name())?;
        }
    }

    Ok(contents)
}

/// The part table, then every keyframe of every part.
fn frame_data(package: &AnimationPackage, animation: &Animation) -> Result<String, std::fmt::Error> {
    let mut contents = header(animation)?;

    writeln!(contents, "Animation parts")?;
    for part in package.parts() {
        writeln!(contents, "{part:?}")?;
    }
    writeln!(contents)?;

    for (index, keyframes) in animation.keyframes() {
        for (frame, keyframe) in keyframes.iter().enumerate() {
            writeln!(
                contents,
                "Part {} Frame {} | {:?} {:?}",
                index + 1,
                frame + 1,
                keyframe.flags(),
                keyframe.fields()
            )?;
        }
    }

    Ok(contents)
}
