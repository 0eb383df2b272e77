use clap::ArgAction;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct Verbosity {
    #[clap(
        short,
        long,
        action = ArgAction::Count,
        help = "Use verbose output (or `-vv` and `-vvv` for more verbose output)",
        global = true,
        overrides_with = "quiet",
    )]
    verbose: u8,

    #[clap(
        short,
        long,
        action = ArgAction::Count,
        help = "Use quiet output (or `-qq` for silent output)",
        global = true,
        overrides_with = "verbose",
    )]
    quiet: u8,
}

impl Verbosity {
    /// Each `-v` moves one level up from [`VerbosityLevel::Default`], each `-q` one level down.
    pub fn level(&self) -> VerbosityLevel {
        let steps = i16::from(self.verbose) - i16::from(self.quiet);

        match steps {
            ..=-2 => VerbosityLevel::Silent,
            -1 => VerbosityLevel::Quiet,
            0 => VerbosityLevel::Default,
            1 => VerbosityLevel::Verbose,
            2 => VerbosityLevel::ExtraVerbose,
            3.. => VerbosityLevel::Trace,
        }
    }
}

/// How much the application logs, from least to most.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Silence all logging output.
    Silent,

    /// Shows events up to [`ERROR`](tracing::Level::ERROR).
    Quiet,

    /// Shows events up to [`WARN`](tracing::Level::WARN), such as skipped parts.
    #[default]
    Default,

    /// Shows events up to [`INFO`](tracing::Level::INFO), such as every file written.
    Verbose,

    /// Shows events up to [`DEBUG`](tracing::Level::DEBUG), such as every record decoded.
    ExtraVerbose,

    /// Shows events up to [`TRACE`](tracing::Level::TRACE).
    Trace,
}

impl VerbosityLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Silent => LevelFilter::OFF,
            Self::Quiet => LevelFilter::ERROR,
            Self::Default => LevelFilter::WARN,
            Self::Verbose => LevelFilter::INFO,
            Self::ExtraVerbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    pub fn is_trace(self) -> bool {
        self == Self::Trace
    }
}
