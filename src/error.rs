// error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong around the intro. Only the audio variants are
/// expected at runtime; the coordinator logs them and carries on.
#[derive(Debug, Error)]
pub enum IntroError {
    #[error("failed to open audio output stream: {0}")]
    AudioStream(String),

    #[error("audio clip '{0}' is not loaded")]
    ClipMissing(String),

    #[error("failed to open audio clip {path:?}: {source}")]
    ClipOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode audio clip {path:?}: {reason}")]
    ClipDecode { path: PathBuf, reason: String },

    #[error("intro state file {path:?}: {source}")]
    StateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("intro state file is malformed: {0}")]
    StateFormat(#[from] serde_json::Error),

    #[error("invalid intro settings: {0}")]
    Settings(String),

    #[error("exit timeline out of order: flash at {flash:.2}s must precede completion at {complete:.2}s")]
    Timeline { flash: f64, complete: f64 },
}
