//! Shared test helpers

#![allow(dead_code)]

pub mod log_capture;

use async_trait::async_trait;
use bcdl::{DomRenderer, Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Contents of a file under `tests/fixtures`
pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

/// Renderer returning fixed HTML
pub struct FixtureRenderer {
    html: String,
}

impl FixtureRenderer {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn from_fixture(name: &str) -> Self {
        Self::new(fixture(name))
    }
}

#[async_trait]
impl DomRenderer for FixtureRenderer {
    async fn render(
        &self,
        _url: &str,
        _budget: Duration,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(self.html.clone())
    }
}

/// Renderer that always fails like a crashed browser
pub struct FailingRenderer;

#[async_trait]
impl DomRenderer for FailingRenderer {
    async fn render(
        &self,
        _url: &str,
        _budget: Duration,
        _cancel: &CancellationToken,
    ) -> Result<String> {
        Err(Error::RendererFailed {
            code: Some(1),
            stderr: "crashed".to_string(),
        })
    }
}

/// Rendered album page built from two JSON payloads
///
/// The linked data goes into the script body verbatim; the track info is
/// attribute-encoded the way the site serves it.
pub fn album_page(linked_data: &serde_json::Value, tralbum: &serde_json::Value) -> String {
    let encoded = tralbum
        .to_string()
        .replace('&', "&amp;")
        .replace('"', "&quot;");
    format!(
        "<html><head><script type=\"application/ld+json\">{}</script></head>\
         <body><script data-tralbum=\"{}\"></script></body></html>",
        linked_data, encoded
    )
}
