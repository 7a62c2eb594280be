//! Album link validation

use crate::error::{Error, Result};
use std::fmt;

const ALBUM_PATH_MARKER: &str = ".bandcamp.com/album";

/// A validated album page link
///
/// Trimmed, starts with `http` and points at a `*.bandcamp.com/album/...` page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumUrl(String);

impl AlbumUrl {
    /// Validate a raw command-line argument
    pub fn parse(raw: &str) -> Result<Self> {
        let link = raw.trim();
        if link.is_empty() || !link.starts_with("http") || !link.contains(ALBUM_PATH_MARKER) {
            return Err(Error::InvalidAlbumUrl(raw.to_string()));
        }
        Ok(Self(link.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
