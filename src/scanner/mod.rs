// src/scanner/mod.rs
pub mod collector;
pub mod gate;

pub use collector::{audio_files, main_audio_file};
pub use gate::check_folder;

use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Direct sub-directories of the input folder, in file-name order.
///
/// Entries that cannot be read (dangling links, permission errors) are
/// still returned when their path is known, so the caller can report them.
pub fn candidate_folders(untagged_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !untagged_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", untagged_dir.display());
    }

    let mut folders = Vec::new();

    for entry in WalkDir::new(untagged_dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => folders.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => match e.path() {
                Some(path) => folders.push(path.to_path_buf()),
                None => warn!("⚠️  Unreadable entry in {}: {}", untagged_dir.display(), e),
            },
        }
    }

    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_candidate_folders_lists_only_directories() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("B Book")).unwrap();
        fs::create_dir(root.path().join("A Book")).unwrap();
        fs::create_dir_all(root.path().join("A Book/nested")).unwrap();
        fs::write(root.path().join("stray.mp3"), b"x").unwrap();

        let folders = candidate_folders(root.path()).unwrap();
        let names: Vec<_> = folders
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A Book", "B Book"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_candidate_folders_keeps_unreadable_entries() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("A Book")).unwrap();
        std::os::unix::fs::symlink(root.path().join("gone"), root.path().join("B Dangling")).unwrap();

        let folders = candidate_folders(root.path()).unwrap();
        assert_eq!(folders.len(), 2);
        assert!(folders.contains(&root.path().join("A Book")));
        assert!(folders.contains(&root.path().join("B Dangling")));
    }

    #[test]
    fn test_candidate_folders_missing_dir_errors() {
        let root = tempfile::tempdir().unwrap();
        assert!(candidate_folders(&root.path().join("nope")).is_err());
    }
}
