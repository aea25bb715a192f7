use crate::config::Config;
use crate::cover_art::{self, CoverArt};
use crate::error::{ProcessError, ProcessResult};
use crate::metadata::{select_candidate, BookLookup, ResolvedMetadata};
use crate::relocate;
use crate::scanner;
use crate::tags::{TagPayload, TagStore};
use anyhow::Result;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

/// What happened to one candidate folder.
#[derive(Debug)]
pub enum Outcome {
    Organized(PathBuf),
    MovedToFix { dest: PathBuf, reason: String },
    /// Not ready yet, or could not be inspected.
    Skipped,
    /// Processing failed and the move to fix failed too.
    LeftInPlace { folder: PathBuf, reason: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub organized: Vec<PathBuf>,
    /// Fix destination and the reason it was sent there.
    pub moved_to_fix: Vec<(PathBuf, String)>,
    pub skipped: usize,
    pub left_in_place: Vec<(PathBuf, String)>,
}

impl RunReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Organized(dest) => self.organized.push(dest),
            Outcome::MovedToFix { dest, reason } => self.moved_to_fix.push((dest, reason)),
            Outcome::Skipped => self.skipped += 1,
            Outcome::LeftInPlace { folder, reason } => self.left_in_place.push((folder, reason)),
        }
    }

    pub fn log_summary(&self) {
        info!(
            "🏁 Done: {} organized, {} moved to fix, {} skipped, {} left in place",
            self.organized.len(),
            self.moved_to_fix.len(),
            self.skipped,
            self.left_in_place.len()
        );

        for dest in &self.organized {
            debug!("   📗 {}", dest.display());
        }
        for (dest, reason) in &self.moved_to_fix {
            warn!("   🔧 {}: {}", dest.display(), reason);
        }
        for (folder, reason) in &self.left_in_place {
            error!("   🚫 {}: {}", folder.display(), reason);
        }
    }
}

/// Runs the sort over the input directory, one folder at a time.
pub struct Organizer<L, T> {
    config: Config,
    lookup: L,
    tags: T,
}

impl<L: BookLookup, T: TagStore> Organizer<L, T> {
    pub fn new(config: Config, lookup: L, tags: T) -> Self {
        Self { config, lookup, tags }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        for folder in scanner::candidate_folders(&self.config.untagged_dir)? {
            let decision = match scanner::check_folder(&folder, &self.config) {
                Ok(decision) => decision,
                Err(e) => {
                    warn!("⚠️  Cannot inspect {}: {}", folder.display(), e);
                    report.record(Outcome::Skipped);
                    continue;
                }
            };

            let outcome = if decision.is_ready() {
                self.handle_folder(&folder).await
            } else {
                Outcome::Skipped
            };
            report.record(outcome);
        }

        Ok(report)
    }

    /// Processes one folder; failures send it to the fix area.
    pub async fn handle_folder(&self, folder: &Path) -> Outcome {
        info!("📚 Processing: {}", folder.display());

        match self.process_folder(folder).await {
            Ok(dest) => {
                info!("✅ Moved to: {}", dest.display());
                Outcome::Organized(dest)
            }
            Err(reason) => {
                error!("❌ {}: {}", folder.display(), reason);
                self.move_to_fix(folder, reason)
            }
        }
    }

    async fn process_folder(&self, folder: &Path) -> ProcessResult<PathBuf> {
        let metadata = self.resolve(folder).await?;
        let cover = self.fetch_cover(&metadata).await;
        let payload = TagPayload::new(&metadata, cover);

        for file in scanner::audio_files(folder, &self.config)? {
            self.tags
                .write(&file, &payload)
                .map_err(|err| ProcessError::TagWrite { file, err })?;
        }

        if self.config.save_folder_cover {
            if let Some(cover) = &payload.cover {
                if let Err(e) = cover_art::save_cover_to_folder(folder, cover) {
                    warn!("⚠️  Could not save folder cover: {}", e);
                }
            }
        }

        let dest = relocate::library_path(&self.config.output_base, &metadata);
        relocate::move_dir(folder, &dest).map_err(|err| ProcessError::Relocate {
            dest: dest.clone(),
            err,
        })?;

        Ok(dest)
    }

    /// Main file -> tag hint -> lookup -> author-aware pick.
    pub async fn resolve(&self, folder: &Path) -> ProcessResult<ResolvedMetadata> {
        let main = scanner::main_audio_file(folder, &self.config)?
            .ok_or(ProcessError::NoAudioFile)?;

        let hint = self
            .tags
            .read_hint(&main)
            .map_err(|err| ProcessError::TagRead { file: main.clone(), err })?;

        let title = hint
            .title
            .clone()
            .ok_or_else(|| ProcessError::MissingTitleHint { file: main.clone() })?;

        let candidates = self.lookup.search(&title).await.map_err(ProcessError::Lookup)?;
        info!("   {} result(s) for '{}'", candidates.len(), title);

        let chosen = select_candidate(&candidates, hint.author.as_deref())
            .ok_or(ProcessError::NoCandidates { query: title })?;

        Ok(ResolvedMetadata::from(chosen))
    }

    async fn fetch_cover(&self, metadata: &ResolvedMetadata) -> Option<CoverArt> {
        let url = metadata.cover_url.as_deref()?;

        match self.lookup.fetch_cover(url).await {
            Ok(Some(cover)) => Some(cover),
            Ok(None) => {
                warn!("⚠️  No usable cover at {}", url);
                None
            }
            Err(e) => {
                warn!("⚠️  Cover download failed: {:#}", e);
                None
            }
        }
    }

    fn move_to_fix(&self, folder: &Path, reason: ProcessError) -> Outcome {
        let reason = reason.to_string();

        let moved = relocate::fix_path(&self.config.fix_dir, folder)
            .and_then(|dest| relocate::move_dir(folder, &dest).map(|_| dest));

        match moved {
            Ok(dest) => {
                warn!("❌ Moved to fix: {}", folder.display());
                Outcome::MovedToFix { dest, reason }
            }
            Err(e) => {
                error!("Could not move {} to fix: {:#}", folder.display(), e);
                Outcome::LeftInPlace {
                    folder: folder.to_path_buf(),
                    reason,
                }
            }
        }
    }
}
