use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs};

use anyhow::{Context as _, bail};
use glam::IVec2;
use tracing::debug;

/// Name of the configuration file.
pub const FILE_NAME: &str = "Ssbp.toml";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default = "default_output")]
    output: PathBuf,

    #[serde(default)]
    placement: Placement,

    #[serde(rename = "unit", default = "Vec::new")]
    units: Vec<Unit>,
}

fn default_output() -> PathBuf {
    PathBuf::from("output")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: default_output(),
            placement: Placement::default(),
            units: Vec::new(),
        }
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).context("failed to parse configuration")
    }
}

impl Config {
    /// Read a configuration file. Relative paths in it are relative to the file's directory.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).context("failed to read configuration file")?;
        let config = contents.parse::<Self>()?;

        let root = path.parent().unwrap_or(Path::new(""));
        Ok(config.relative_to(root))
    }

    /// Read the configuration file in the current directory, falling back to the one in the
    /// user's configuration directory.
    pub fn locate() -> anyhow::Result<Self> {
        let current_dir = env::current_dir().context("failed to get current directory")?;
        let user_dir = dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")));

        for dir in iter_candidates(&current_dir, user_dir.as_deref()) {
            let path = dir.join(FILE_NAME);

            if path.is_file() {
                debug!("using configuration: {}", path.display());
                return Self::from_file(&path)
                    .with_context(|| format!("invalid configuration: {}", path.display()));
            }
        }

        bail!("no {FILE_NAME} found in the current directory")
    }

    fn relative_to(mut self, root: &Path) -> Self {
        self.output = root.join(&self.output);

        for unit in &mut self.units {
            unit.input = root.join(&unit.input);
            unit.textures = unit.textures.as_ref().map(|textures| root.join(textures));
        }

        self
    }

    /// Root of every unit's output directory.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Canvas offset added to every placement, in image pixels.
    pub fn offset(&self) -> IVec2 {
        IVec2::from_array(self.placement.offset)
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// The units named in `names`, or every unit if `names` is empty.
    pub fn select(&self, names: &[String]) -> anyhow::Result<Vec<&Unit>> {
        let units = self.units();

        if units.is_empty() {
            bail!("no units configured");
        }

        if names.is_empty() {
            return Ok(units.iter().collect());
        }

        names
            .iter()
            .map(|name| {
                units
                    .iter()
                    .find(|unit| unit.name == *name)
                    .with_context(|| format!("unknown unit: {name}"))
            })
            .collect()
    }
}

fn iter_candidates<'a>(
    current_dir: &'a Path,
    user_dir: Option<&'a Path>,
) -> impl Iterator<Item = &'a Path> {
    std::iter::once(current_dir).chain(user_dir)
}

/// Where parts land on the canvas.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    #[serde(default)]
    offset: [i32; 2],
}

/// One SSBP file to process.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Unit {
    name: String,

    input: PathBuf,

    #[serde(default)]
    textures: Option<PathBuf>,
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Directory the atlas image paths are relative to.
    pub fn textures(&self) -> PathBuf {
        self.textures.clone().unwrap_or_else(|| {
            self.input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        output = "renders"

        [placement]
        offset = [-10, 95]

        [[unit]]
        name = "tiki"
        input = "data/tiki/tiki.ssbp"

        [[unit]]
        name = "marth"
        input = "data/marth.ssbp"
        textures = "atlases"
    "#;

    #[test]
    fn parse() {
        let config = CONFIG.parse::<Config>().unwrap();

        assert_eq!(config.output(), Path::new("renders"));
        assert_eq!(config.offset(), IVec2::new(-10, 95));
        assert_eq!(config.units().len(), 2);

        let tiki = &config.units()[0];
        assert_eq!(tiki.name(), "tiki");
        assert_eq!(tiki.textures(), Path::new("data/tiki"));

        let marth = &config.units()[1];
        assert_eq!(marth.textures(), Path::new("atlases"));
    }

    #[test]
    fn defaults() {
        let config = "[[unit]]\nname = \"a\"\ninput = \"a.ssbp\"".parse::<Config>().unwrap();

        assert_eq!(config.output(), Path::new("output"));
        assert_eq!(config.offset(), IVec2::ZERO);
        assert_eq!(config.units()[0].textures(), Path::new(""));
    }

    #[test]
    fn invalid() {
        assert!("[[unit]]\nname = \"a\"".parse::<Config>().is_err());
        assert!("[placement]\noffset = [1]".parse::<Config>().is_err());
    }

    #[test]
    fn select() {
        let config = CONFIG.parse::<Config>().unwrap();

        let all = config.select(&[]).unwrap();
        assert_eq!(all.len(), 2);

        let one = config.select(&["marth".to_owned()]).unwrap();
        assert_eq!(one[0].name(), "marth");

        let err = config.select(&["roy".to_owned()]).unwrap_err();
        assert_eq!(err.to_string(), "unknown unit: roy");

        assert!(Config::default().select(&[]).is_err());
    }

    #[test]
    fn paths_are_relative_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, CONFIG).unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.output(), dir.path().join("renders"));
        assert_eq!(
            config.units()[0].input(),
            dir.path().join("data/tiki/tiki.ssbp")
        );
        assert_eq!(config.units()[0].textures(), dir.path().join("data/tiki"));
        assert_eq!(config.units()[1].textures(), dir.path().join("atlases"));
    }

    #[test]
    fn candidates() {
        let current = Path::new("/work");
        let user = Path::new("/home/user/.config/ssbp-render");

        let found = iter_candidates(current, Some(user)).collect::<Vec<_>>();
        assert_eq!(found, [current, user]);
        assert_eq!(iter_candidates(current, None).count(), 1);
    }
}
