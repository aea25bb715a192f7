use crate::metadata::ResolvedMetadata;
use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Sanitize a string for use as a single path component
pub fn sanitize_component(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            '\0' => '_',
            _ => c,
        })
        .collect();

    let collapsed = WHITESPACE_RUN.replace_all(replaced.trim(), " ");
    match collapsed.as_ref() {
        "" | "." | ".." => "_".to_string(),
        other => other.to_string(),
    }
}

/// `<output_base>/<author>/<series>/<title>`
pub fn library_path(output_base: &Path, metadata: &ResolvedMetadata) -> PathBuf {
    let mut path = output_base.to_path_buf();
    path.push(sanitize_component(&metadata.author));
    path.push(sanitize_component(&metadata.series));
    path.push(sanitize_component(&metadata.title));
    path
}

/// `<fix_dir>/<basename>`
pub fn fix_path(fix_dir: &Path, folder: &Path) -> Result<PathBuf> {
    let name = folder
        .file_name()
        .with_context(|| format!("Folder has no name: {}", folder.display()))?;
    Ok(fix_dir.join(name))
}

/// Moves `src` to exactly `dest`, creating parents. Fails if `dest` exists.
pub fn move_dir(src: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        anyhow::bail!("Target already exists: {}", dest.display());
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .context("Failed to create directory structure")?;
    }

    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            debug!("Cross-device move, copying {} -> {}", src.display(), dest.display());
            copy_then_remove(src, dest)
        }
        Err(e) => Err(e).context("Failed to move folder"),
    }
}

fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc::EXDEV)
    }
    #[cfg(not(unix))]
    {
        let _ = err;
        false
    }
}

/// Copies `src` to `dest` and removes `src`. A failed copy removes the partial `dest`.
fn copy_then_remove(src: &Path, dest: &Path) -> Result<()> {
    if let Err(e) = copy_tree(src, dest) {
        if dest.exists() {
            if let Err(cleanup) = fs::remove_dir_all(dest) {
                warn!("⚠️  Could not remove partial copy {}: {}", dest.display(), cleanup);
            }
        }
        return Err(e);
    }

    fs::remove_dir_all(src)
        .with_context(|| format!("Copied but failed to remove {}", src.display()))
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}
