use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::info;

/// Output directory of one unit.
#[derive(Debug, Clone)]
pub struct UnitDir {
    path: PathBuf,
}

impl UnitDir {
    pub fn new(output: &Path, unit: &str) -> Self {
        Self {
            path: output.join(unit),
        }
    }

    /// One bitmap per cell, cut from the atlases.
    pub fn tex(&self) -> PathBuf {
        self.path.join("tex")
    }

    /// Rendered frames.
    pub fn frames(&self) -> PathBuf {
        self.path.join("frames")
    }

    /// Text dumps of the decoded records of a package.
    pub fn dump(&self, package: &str) -> PathBuf {
        self.path.join("dump").join(package)
    }

    pub fn tex_file(&self, cell: &str) -> PathBuf {
        self.tex().join(format!("{cell}.png"))
    }

    pub fn frame_file(&self, package: &str, animation: &str, frame: usize) -> PathBuf {
        self.frames()
            .join(format!("{package}-{animation}-{}.png", frame + 1))
    }

    pub fn part_file(&self, package: &str, animation: &str, frame: usize, part: usize) -> PathBuf {
        self.frames()
            .join(format!("{package}-{animation}-{}-{part}.png", frame + 1))
    }
}

/// Create `path` and its parents if missing.
pub fn create_dir(path: &Path) -> anyhow::Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
        info!("created directory: {:#}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        let dir = UnitDir::new(Path::new("output"), "tiki");

        assert_eq!(dir.tex(), Path::new("output/tiki/tex"));
        assert_eq!(dir.tex_file("head"), Path::new("output/tiki/tex/head.png"));
        assert_eq!(dir.dump("pack"), Path::new("output/tiki/dump/pack"));
        assert_eq!(
            dir.frame_file("pack", "idle", 0),
            Path::new("output/tiki/frames/pack-idle-1.png")
        );
        assert_eq!(
            dir.part_file("pack", "idle", 4, 2),
            Path::new("output/tiki/frames/pack-idle-5-2.png")
        );
    }

    #[test]
    fn create_nested() {
        let root = tempfile::tempdir().unwrap();
        let dir = UnitDir::new(root.path(), "tiki");

        create_dir(&dir.frames()).unwrap();
        create_dir(&dir.frames()).unwrap();
        assert!(dir.frames().is_dir());
    }
}
