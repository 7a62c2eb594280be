//! Album and track value types
//!
//! Built once per run from a rendered album page and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::time::Duration;

/// One album's metadata, as published in the page's linked data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Album {
    /// Source-given opaque identifier (`@id`)
    pub album_id: Option<String>,
    /// Canonical album link
    pub album_url: Option<String>,
    /// Album title
    pub title: Option<String>,
    /// Artist display name
    pub artist_name: Option<String>,
    /// Artist page link
    pub artist_url: Option<String>,
    /// Cover art link
    pub cover_image_url: Option<String>,
    /// Release instant; absent when the source date could not be parsed
    pub date_published: Option<DateTime<Utc>>,
    /// Declared track count, or the extracted count when not declared
    pub num_tracks: usize,
    /// Tracks in album order, see [`sort_tracks`]
    pub tracks: Vec<Track>,
}

/// One song within an album
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// 1-based ordinal within the album
    pub position: Option<u32>,
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(serialize_with = "serialize_duration_secs")]
    pub duration: Option<Duration>,
    /// Join key against the track file map
    pub track_id: Option<u64>,
    pub lyrics: Option<String>,
}

/// Sort tracks into album order.
///
/// Position ascending with unpositioned tracks last, then title ascending.
/// The sort is stable, so fully tied tracks keep their page order.
pub fn sort_tracks(tracks: &mut [Track]) {
    tracks.sort_by(compare_album_order);
}

fn compare_album_order(a: &Track, b: &Track) -> Ordering {
    let by_position = match (a.position, b.position) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_position.then_with(|| a.title.cmp(&b.title))
}

/// Serialize an optional duration as fractional seconds
pub(crate) fn serialize_duration_secs<S>(
    duration: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match duration {
        Some(d) => serializer.serialize_some(&d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
pub(crate) fn track(position: Option<u32>, title: &str) -> Track {
    Track {
        position,
        title: Some(title.to_string()),
        url: None,
        duration: None,
        track_id: None,
        lyrics: None,
    }
}
