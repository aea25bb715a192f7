// src/scanner/collector.rs
use crate::config::Config;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recognized audio files directly inside `folder`, in natural name order.
pub fn audio_files(folder: &Path, config: &Config) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        // macOS resource forks
        if entry.file_name().to_string_lossy().starts_with("._") {
            continue;
        }

        if config.is_audio_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| {
        natord::compare(
            &a.file_name().unwrap_or_default().to_string_lossy(),
            &b.file_name().unwrap_or_default().to_string_lossy(),
        )
    });

    Ok(files)
}

/// The largest recognized audio file in `folder`. Ties go to the first file in name order.
pub fn main_audio_file(folder: &Path, config: &Config) -> std::io::Result<Option<PathBuf>> {
    let mut best: Option<(u64, PathBuf)> = None;

    for file in audio_files(folder, config)? {
        let size = std::fs::metadata(&file)?.len();
        match &best {
            Some((best_size, _)) if *best_size >= size => {}
            _ => best = Some((size, file)),
        }
    }

    Ok(best.map(|(_, path)| path))
}
