//! Error types for bcdl
//!
//! Every fatal condition of the pipeline is a variant here. Errors propagate
//! as `Result` values up to `main`, which maps them to a process exit code
//! with [`Error::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the bcdl pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Album link failed validation
    #[error("Invalid album link {0:?}. Album link must be first argument and lead to an album, for example \"https://vbeo.bandcamp.com/album/--17\"")]
    InvalidAlbumUrl(String),

    /// No browser executable at any checked location
    #[error("Browser executable not found. Checked: {}", display_paths(.0))]
    BrowserNotFound(Vec<PathBuf>),

    /// Browser process exited unsuccessfully
    #[error("Renderer exited with {}: {stderr}", display_code(.code))]
    RendererFailed {
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Spawning or waiting on the browser process failed
    #[error("Renderer I/O error: {0}")]
    RendererIo(#[from] std::io::Error),

    /// Cancellation token fired while waiting on the renderer
    #[error("Rendering cancelled")]
    Cancelled,

    /// No `application/ld+json` script node in the document
    #[error("Album metadata node (application/ld+json) not found")]
    MetadataNodeMissing,

    /// The `application/ld+json` node has no content
    #[error("Album metadata node is empty")]
    MetadataNodeEmpty,

    /// The `application/ld+json` content is not the expected JSON object
    #[error("Album metadata could not be parsed: {0}")]
    MetadataParse(String),

    /// No script node carrying `data-tralbum`
    #[error("Track info node (data-tralbum) not found")]
    TrackInfoNodeMissing,

    /// The `data-tralbum` attribute is empty
    #[error("Track info attribute is empty")]
    TrackInfoAttributeEmpty,

    /// The `data-tralbum` value is not a JSON object
    #[error("Track info could not be parsed: {0}")]
    TrackInfoParse(String),

    /// Two track info entries share an id
    #[error("Duplicate track id {0} in track info")]
    DuplicateTrackId(u64),

    /// Writing the album report failed
    #[error("Failed to write report: {0}")]
    Report(String),

    /// bcdl-common error (configuration, I/O)
    #[error(transparent)]
    Common(#[from] bcdl_common::Error),
}

/// Convenience Result type using the bcdl Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit code for this error
    ///
    /// `2` for invalid user input, `1` for every other fatal condition.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InvalidAlbumUrl(_) => 2,
            _ => 1,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(none)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
