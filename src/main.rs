//! The main entry point to the application.

#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

mod commands;
mod config;
mod context;
mod layout;
#[cfg(test)]
mod testing;
mod verbosity;

use std::io::Write as _;
use std::process::ExitCode;
use std::{env, io, panic};

use clap::Parser as _;
use colored::Colorize as _;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use crate::context::Context;
use crate::verbosity::{Verbosity, VerbosityLevel};

#[derive(Debug, clap::Parser)]
#[clap(
    about = "Render SpriteStudio (SSBP) animations to PNG frames",
    after_help = format!(
        "{}: units are read from `{}` in the current directory",
        "Configuration".bold(),
        config::FILE_NAME,
    ),
    version,
)]
struct Parser {
    #[clap(subcommand)]
    subcommand: commands::Subcommand,

    #[clap(flatten)]
    verbosity: Verbosity,
}

fn main() -> ExitCode {
    try_main().unwrap_or_else(|err| {
        let mut stderr = io::stderr().lock();
        _ = writeln!(stderr, "{}", "ssbp-render failed".bold().red());

        for cause in err.chain() {
            _ = writeln!(stderr, "  {}: {}", "Cause".bold(), cause);
        }

        ExitCode::FAILURE
    })
}

fn try_main() -> anyhow::Result<ExitCode> {
    setup_panic_hook();

    let args = Parser::parse();
    let level = args.verbosity.level();
    setup_tracing(level)?;

    let mut ctx = Context::default().with_level(level);
    args.subcommand.run(&mut ctx).map(|()| ExitCode::SUCCESS)
}

fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        original_hook(panic_info);

        let package_name = env!("CARGO_PKG_NAME");
        let package_version = env!("CARGO_PKG_VERSION");
        let operating_system = env::consts::OS;
        let architecture = env::consts::ARCH;
        let args = env::args().collect::<Vec<_>>();

        eprintln!();
        eprintln!("------------------------------------------------------------------------------");
        eprintln!("{package_name} has panicked. This is a bug. Please report it, along with the");
        eprintln!("SSBP file that triggered it if you are able to share it.");
        eprintln!();
        eprintln!("If you can reliably reproduce this panic, re-run with the RUST_BACKTRACE=1");
        eprintln!("environment variable set and include the backtrace in your report.");
        eprintln!();
        eprintln!("Platform: {operating_system} {architecture}");
        eprintln!("Version: {package_version}");
        eprintln!("Args: {args:?}");
        eprintln!("------------------------------------------------------------------------------");
    }));
}

fn setup_tracing(level: VerbosityLevel) -> anyhow::Result<()> {
    use tracing_subscriber::prelude::*;

    let level_filter = level.level_filter();
    let directive = |target: &str| format!("{target}={level_filter}").parse::<Directive>();
    let filter = EnvFilter::default()
        .add_directive(directive("ssbp")?)
        .add_directive(directive(env!("CARGO_CRATE_NAME"))?);

    let registry = tracing_subscriber::registry().with(filter);

    if level.is_trace() {
        let subscriber = registry.with(
            tracing_subscriber::fmt::layer()
                .event_format(tracing_subscriber::fmt::format().pretty())
                .with_thread_ids(true)
                .with_writer(io::stderr),
        );

        subscriber.init();
    } else {
        let subscriber = registry.with(tracing_subscriber::fmt::layer().with_writer(io::stderr));

        subscriber.init();
    }

    Ok(())
}
