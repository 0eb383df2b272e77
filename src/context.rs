use crate::config::Config;
use crate::verbosity::VerbosityLevel;

#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Option<Config>,
    pub level: VerbosityLevel,
}

impl Context {
    pub fn with_level(self, level: VerbosityLevel) -> Self {
        Self { level, ..self }
    }

    /// The loaded configuration, locating and reading it on first use.
    pub fn config(&mut self) -> anyhow::Result<&Config> {
        let config = match self.config.take() {
            Some(config) => config,
            None => Config::locate()?,
        };

        Ok(self.config.insert(config))
    }
}
