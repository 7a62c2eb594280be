//! Render → extract → reconcile
//!
//! A single linear pass per album link. Any error aborts the run.

use crate::album_url::AlbumUrl;
use crate::error::Result;
use crate::extract::{extract_album, extract_track_files};
use crate::reconcile::{reconcile, ReconciledAlbum};
use crate::renderer::DomRenderer;
use scraper::Html;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Album extraction pipeline over a renderer
pub struct Pipeline<R> {
    renderer: R,
    budget: Duration,
}

impl<R: DomRenderer> Pipeline<R> {
    pub fn new(renderer: R, budget: Duration) -> Self {
        Self { renderer, budget }
    }

    /// Render the album page and extract the reconciled album
    pub async fn run(&self, url: &AlbumUrl, cancel: &CancellationToken) -> Result<ReconciledAlbum> {
        info!(
            budget_ms = self.budget.as_millis() as u64,
            "Rendering album page {}", url
        );
        let html = self.renderer.render(url.as_str(), self.budget, cancel).await?;
        process_document(&html)
    }
}

/// Extract and reconcile both payloads of a rendered album page
pub fn process_document(html: &str) -> Result<ReconciledAlbum> {
    let document = Html::parse_document(html);

    let album = extract_album(&document)?;
    debug!(tracks = album.tracks.len(), "Album metadata extracted");

    let files = extract_track_files(&document)?;
    debug!(files = files.len(), "Track file links extracted");

    Ok(reconcile(album, files))
}
