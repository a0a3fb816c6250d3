use std::path::PathBuf;

use thiserror::Error;

use crate::timeline::EntityHandle;

/// Captioner's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Captioner's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Malformed subtitle blocks never show up here: the parser skips them and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller asked for something the current host state can't satisfy
    /// (no active container, no selected source, no subtitle file).
    #[error("{0}")]
    Usage(String),

    /// The transcription process failed to launch or exited unsuccessfully.
    #[error("transcription failed: {reason}\n\ncommand:\n{command}")]
    ExternalTool { command: String, reason: String },

    /// Transcription finished but left nothing we could turn into captions.
    #[error("no subtitle file or transcript text found (checked {searched:?})\n\ncommand:\n{command}")]
    MissingOutput {
        command: String,
        searched: Vec<PathBuf>,
    },

    /// The host no longer has the entity a handle points at.
    #[error("caption entity {0} no longer exists in the timeline")]
    EntityVanished(EntityHandle),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}
