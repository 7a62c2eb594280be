//! bcdl library interface
//!
//! Extracts album metadata and track file links from a Bandcamp album page:
//! the page is rendered by a headless browser, two embedded JSON payloads are
//! extracted, and the results are joined by track id.

pub mod album_url;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod renderer;

pub use crate::album_url::AlbumUrl;
pub use crate::error::{Error, Result};
pub use crate::model::{Album, Track};
pub use crate::pipeline::{process_document, Pipeline};
pub use crate::reconcile::{ReconciledAlbum, ResolvedTrack, TrackCountMismatch};
pub use crate::renderer::{DomRenderer, HeadlessBrowser};
