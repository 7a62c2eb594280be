//! Merge album metadata with track file links
//!
//! The two payloads are extracted independently and joined by track id.
//! A count mismatch between them is a warning, never an error: tracks
//! without a file link simply stay unresolved.

use crate::extract::TrackFileMap;
use crate::model::{Album, Track};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use tracing::{debug, warn};

/// Album track count differs from the number of track file links
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TrackCountMismatch {
    pub album_tracks: usize,
    pub track_files: usize,
}

impl fmt::Display for TrackCountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "album lists {} tracks but {} track files were found",
            self.album_tracks, self.track_files
        )
    }
}

/// Final artifact of the pipeline
#[derive(Debug, Clone)]
pub struct ReconciledAlbum {
    pub album: Album,
    pub files: TrackFileMap,
    pub mismatch: Option<TrackCountMismatch>,
}

/// A track paired with its file link
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ResolvedTrack<'a> {
    #[serde(flatten)]
    pub track: &'a Track,
    pub file_url: Option<&'a str>,
}

impl ReconciledAlbum {
    /// File link for a track, if its id is known and present in the map
    pub fn file_url(&self, track: &Track) -> Option<&str> {
        track.track_id.and_then(|id| self.files.get(id))
    }

    /// Album tracks in order, each with its file link
    pub fn tracks(&self) -> impl Iterator<Item = ResolvedTrack<'_>> {
        self.album.tracks.iter().map(|track| ResolvedTrack {
            track,
            file_url: self.file_url(track),
        })
    }

    /// Number of tracks without a file link
    pub fn unresolved_count(&self) -> usize {
        self.tracks().filter(|t| t.file_url.is_none()).count()
    }
}

/// Serialized as the album's fields with resolved tracks in place of the
/// bare track list
impl Serialize for ReconciledAlbum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let album = &self.album;
        let tracks: Vec<ResolvedTrack<'_>> = self.tracks().collect();

        let mut state = serializer.serialize_struct("ReconciledAlbum", 10)?;
        state.serialize_field("album_id", &album.album_id)?;
        state.serialize_field("album_url", &album.album_url)?;
        state.serialize_field("title", &album.title)?;
        state.serialize_field("artist_name", &album.artist_name)?;
        state.serialize_field("artist_url", &album.artist_url)?;
        state.serialize_field("cover_image_url", &album.cover_image_url)?;
        state.serialize_field("date_published", &album.date_published)?;
        state.serialize_field("num_tracks", &album.num_tracks)?;
        state.serialize_field("tracks", &tracks)?;
        state.serialize_field("mismatch", &self.mismatch)?;
        state.end()
    }
}

/// Compare the extracted track list with the file map
pub fn check_track_counts(album: &Album, files: &TrackFileMap) -> Option<TrackCountMismatch> {
    let album_tracks = album.tracks.len();
    let track_files = files.len();
    (album_tracks != track_files).then_some(TrackCountMismatch {
        album_tracks,
        track_files,
    })
}

/// Join album and file map, warning once on a count mismatch
pub fn reconcile(album: Album, files: TrackFileMap) -> ReconciledAlbum {
    let mismatch = check_track_counts(&album, &files);
    if let Some(mismatch) = &mismatch {
        warn!(
            album_tracks = mismatch.album_tracks,
            track_files = mismatch.track_files,
            "Track count mismatch: {}",
            mismatch
        );
    }

    let reconciled = ReconciledAlbum {
        album,
        files,
        mismatch,
    };

    debug!(
        tracks = reconciled.album.tracks.len(),
        unresolved = reconciled.unresolved_count(),
        "Reconciled tracks with file links"
    );

    reconciled
}
