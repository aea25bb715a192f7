// src/scanner/gate.rs
use crate::config::Config;
use log::info;
use std::path::Path;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Ready,
    /// Modified too recently; a download may still be writing into it.
    TooNew(Duration),
    /// Name carries the downloader's in-progress marker.
    InProgress,
}

impl GateDecision {
    pub fn is_ready(&self) -> bool {
        matches!(self, GateDecision::Ready)
    }
}

/// Decides whether a folder can be touched yet.
pub fn check_folder(folder: &Path, config: &Config) -> std::io::Result<GateDecision> {
    let modified = std::fs::metadata(folder)?.modified()?;
    let decision = decide(folder, modified, SystemTime::now(), config);

    match decision {
        GateDecision::TooNew(age) => {
            info!("⏳ Skipping (too new, {}s old): {}", age.as_secs(), folder.display());
        }
        GateDecision::InProgress => {
            info!("🛑 Skipping (in progress): {}", folder.display());
        }
        GateDecision::Ready => {}
    }

    Ok(decision)
}

fn decide(folder: &Path, modified: SystemTime, now: SystemTime, config: &Config) -> GateDecision {
    // mtime in the future reads as brand new
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
    if age < config.min_folder_age {
        return GateDecision::TooNew(age);
    }

    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.contains(&config.in_progress_marker.to_lowercase()) {
        return GateDecision::InProgress;
    }

    GateDecision::Ready
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs_ago: u64, now: SystemTime) -> SystemTime {
        now - Duration::from_secs(secs_ago)
    }

    #[test]
    fn test_young_folder_is_too_new() {
        let config = Config::default();
        let now = SystemTime::now();
        let decision = decide(Path::new("/in/Book"), at(119, now), now, &config);
        assert_eq!(decision, GateDecision::TooNew(Duration::from_secs(119)));
    }

    #[test]
    fn test_old_folder_is_ready() {
        let config = Config::default();
        let now = SystemTime::now();
        assert!(decide(Path::new("/in/Book"), at(120, now), now, &config).is_ready());
        assert!(decide(Path::new("/in/Book"), at(86_400, now), now, &config).is_ready());
    }

    #[test]
    fn test_future_mtime_is_too_new() {
        let config = Config::default();
        let now = SystemTime::now();
        let future = now + Duration::from_secs(600);
        assert_eq!(
            decide(Path::new("/in/Book"), future, now, &config),
            GateDecision::TooNew(Duration::ZERO)
        );
    }

    #[test]
    fn test_marker_is_in_progress() {
        let config = Config::default();
        let now = SystemTime::now();
        let old = at(3_600, now);
        assert_eq!(
            decide(Path::new("/in/Book-tmpfiles"), old, now, &config),
            GateDecision::InProgress
        );
        assert_eq!(
            decide(Path::new("/in/Book-TMPFILES-2"), old, now, &config),
            GateDecision::InProgress
        );
    }

    #[test]
    fn test_check_folder_fresh_dir() {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join("Just Downloaded");
        std::fs::create_dir(&folder).unwrap();

        let decision = check_folder(&folder, &Config::default()).unwrap();
        assert!(matches!(decision, GateDecision::TooNew(_)));
    }

    #[test]
    fn test_check_folder_marker_with_no_age_limit() {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join("Book-tmpfiles");
        std::fs::create_dir(&folder).unwrap();

        let config = Config {
            min_folder_age: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(check_folder(&folder, &config).unwrap(), GateDecision::InProgress);
    }
}
