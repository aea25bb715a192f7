use std::path::PathBuf;
use thiserror::Error;

/// Reasons a folder is sent to the fix area instead of the library.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("No audio file found")]
    NoAudioFile,

    #[error("Could not read tags from {}: {err:#}", .file.display())]
    TagRead { file: PathBuf, err: anyhow::Error },

    #[error("No album tag to use as a title in {}", .file.display())]
    MissingTitleHint { file: PathBuf },

    #[error("Lookup failed: {0:#}")]
    Lookup(anyhow::Error),

    #[error("No lookup results for '{query}'")]
    NoCandidates { query: String },

    #[error("Tag error on {}: {err:#}", .file.display())]
    TagWrite { file: PathBuf, err: anyhow::Error },

    #[error("Could not move to {}: {err:#}", .dest.display())]
    Relocate { dest: PathBuf, err: anyhow::Error },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProcessResult<T> = Result<T, ProcessError>;
