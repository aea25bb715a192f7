use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed settings for one sorting run.
#[derive(Debug, Clone)]
pub struct Config {
    pub untagged_dir: PathBuf,
    pub fix_dir: PathBuf,
    pub output_base: PathBuf,
    pub lookup_url: String,
    pub min_folder_age: Duration,
    pub in_progress_marker: String,
    pub audio_extensions: Vec<String>,
    pub http_timeout: Duration,
    pub save_folder_cover: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_roots("/data/untagged", "/data/fix", "/data/output")
    }
}

impl Config {
    /// Default settings rooted at the given directories.
    pub fn with_roots(
        untagged_dir: impl Into<PathBuf>,
        fix_dir: impl Into<PathBuf>,
        output_base: impl Into<PathBuf>,
    ) -> Self {
        Self {
            untagged_dir: untagged_dir.into(),
            fix_dir: fix_dir.into(),
            output_base: output_base.into(),
            lookup_url: "https://api.audnex.us/lookup".to_string(),
            min_folder_age: Duration::from_secs(120),
            in_progress_marker: "-tmpfiles".to_string(),
            audio_extensions: ["m4b", "m4a", "mp3", "flac", "ogg", "opus"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            http_timeout: Duration::from_secs(10),
            save_folder_cover: true,
        }
    }

    /// Checks the input directory and creates the fix and output trees.
    pub fn prepare(&self) -> Result<()> {
        if !self.untagged_dir.is_dir() {
            anyhow::bail!("Input directory does not exist: {}", self.untagged_dir.display());
        }

        std::fs::create_dir_all(&self.fix_dir)
            .with_context(|| format!("Failed to create fix directory {}", self.fix_dir.display()))?;
        std::fs::create_dir_all(&self.output_base)
            .with_context(|| format!("Failed to create output directory {}", self.output_base.display()))?;

        Ok(())
    }

    pub fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .map(|e| self.audio_extensions.iter().any(|known| *known == e))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roots() {
        let config = Config::default();
        assert_eq!(config.untagged_dir, PathBuf::from("/data/untagged"));
        assert_eq!(config.fix_dir, PathBuf::from("/data/fix"));
        assert_eq!(config.output_base, PathBuf::from("/data/output"));
        assert_eq!(config.min_folder_age, Duration::from_secs(120));
    }

    #[test]
    fn test_is_audio_file() {
        let config = Config::default();
        assert!(config.is_audio_file(Path::new("book.m4b")));
        assert!(config.is_audio_file(Path::new("Book.MP3")));
        assert!(!config.is_audio_file(Path::new("cover.jpg")));
        assert!(!config.is_audio_file(Path::new("noext")));
    }

    #[test]
    fn test_prepare_creates_dirs() {
        let root = tempfile::tempdir().unwrap();
        let untagged = root.path().join("untagged");
        std::fs::create_dir(&untagged).unwrap();
        let config = Config::with_roots(&untagged, root.path().join("fix"), root.path().join("out/lib"));

        config.prepare().unwrap();
        assert!(config.fix_dir.is_dir());
        assert!(config.output_base.is_dir());
    }

    #[test]
    fn test_prepare_requires_input_dir() {
        let root = tempfile::tempdir().unwrap();
        let config = Config::with_roots(root.path().join("missing"), root.path().join("fix"), root.path().join("out"));
        assert!(config.prepare().is_err());
    }
}
