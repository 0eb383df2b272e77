mod dump;
mod render;
mod split;

use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::thread;

use anyhow::anyhow;
use colored::Colorize as _;
use tracing::{error, error_span};

use crate::config::{Config, Unit};
use crate::context::Context;
use crate::layout::UnitDir;
use crate::verbosity::VerbosityLevel;

pub trait Run {
    fn run(&self, ctx: &mut Context) -> anyhow::Result<()>;
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Render animation frames to PNG files.
    Render(render::Render),

    /// Cut every cell out of its atlas into its own PNG file.
    Split(split::Split),

    /// Write the decoded records of every animation as text.
    Dump(dump::Dump),
}

impl Subcommand {
    pub fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let handler: &dyn Run = match *self {
            Self::Render(ref inner) => inner,
            Self::Split(ref inner) => inner,
            Self::Dump(ref inner) => inner,
        };

        handler.run(ctx)
    }
}

/// Run `process` for each selected unit, each on its own thread.
///
/// A failing unit does not stop the others; failures are logged and counted.
fn for_each_unit<F>(ctx: &mut Context, names: &[String], done: &str, process: F) -> anyhow::Result<()>
where
    F: Fn(&Unit, &UnitDir, &Config) -> anyhow::Result<()> + Sync,
{
    let level = ctx.level;
    let config = ctx.config()?;
    let units = config.select(names)?;

    let error_count = thread::scope(|scope| {
        let handles = units
            .iter()
            .map(|&unit| {
                // Attach context so we know which thread is emitting the events.
                let span = error_span!("", unit = ?unit.name());
                let dir = UnitDir::new(config.output(), unit.name());
                let process = &process;

                let handle =
                    scope.spawn(move || span.in_scope(|| process(unit, &dir, config)));

                (unit.name(), handle)
            })
            .collect::<Vec<_>>();

        let mut error_count = 0;
        for (name, handle) in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    let mut error_message = err.to_string();

                    if level >= VerbosityLevel::Verbose {
                        error_message.push('\n');

                        for cause in err.chain() {
                            _ = writeln!(error_message, "  Cause: {cause}");
                        }
                    }

                    error!("failed to process unit: {name}: {error_message}");
                    error_count += 1;
                }
                Err(err) => {
                    // The thread most likely panicked.
                    error!("failed to join on the associated thread: {err:#?}");
                    error_count += 1;
                }
            }
        }

        error_count
    });

    if error_count > 0 {
        Err(anyhow!("failed to process ({error_count}) units"))
    } else {
        let mut stderr = io::stderr();
        let message = format!("Successfully {done} ({}) units!", units.len());
        writeln!(stderr, "{}", message.bold().green())?;

        Ok(())
    }
}
