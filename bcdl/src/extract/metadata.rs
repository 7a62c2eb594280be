//! Album metadata from the page's `application/ld+json` linked data
//!
//! The linked data is a schema.org `MusicAlbum`:
//!
//! ```text
//! {
//!   "@id": "...", "name": "...", "mainEntityOfPage": "...",
//!   "byArtist": { "name": "...", "@id": "..." },
//!   "datePublished": "05 Jun 2020 00:00:00 GMT",
//!   "image": "...", "albumRelease": [{ "image": ["..."] }],
//!   "numTracks": 2,
//!   "track": { "itemListElement": [
//!     { "position": 1, "item": {
//!         "name": "...", "@id": "...", "duration": "P00H03M45S",
//!         "additionalProperty": [{ "name": "track_id", "value": 123 }],
//!         "recordingOf": { "lyrics": { "text": "..." } } } }
//!   ] }
//! }
//! ```

use super::parse::{parse_published_date, parse_track_duration};
use super::{first_present, json_id, select_first};
use crate::error::{Error, Result};
use crate::model::{sort_tracks, Album, Track};
use scraper::Html;
use serde_json::Value;
use tracing::debug;

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Extract the album from a parsed page.
///
/// Fails when the linked-data node is missing, blank, or does not hold a
/// JSON object.
pub fn extract_album(document: &Html) -> Result<Album> {
    let node = select_first(document, LD_JSON_SELECTOR).ok_or(Error::MetadataNodeMissing)?;

    let raw: String = node.text().collect();
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::MetadataNodeEmpty);
    }

    let decoded = html_escape::decode_html_entities(raw);
    let root: Value =
        serde_json::from_str(&decoded).map_err(|e| Error::MetadataParse(e.to_string()))?;

    album_from_linked_data(&root)
}

/// Build an album from already-deserialized linked data
pub fn album_from_linked_data(root: &Value) -> Result<Album> {
    if !root.is_object() {
        return Err(Error::MetadataParse(format!(
            "expected a JSON object, found {}",
            json_kind(root)
        )));
    }

    let string = |pointers: &[&str]| {
        first_present(root, pointers, Value::as_str).map(str::to_string)
    };

    let mut tracks: Vec<Track> = root
        .pointer("/track/itemListElement")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(track_from_list_item).collect())
        .unwrap_or_default();
    sort_tracks(&mut tracks);

    let num_tracks = root
        .get("numTracks")
        .and_then(json_id)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(tracks.len());

    let album = Album {
        album_id: string(&["/@id"]),
        album_url: string(&["/mainEntityOfPage", "/@id"]),
        title: string(&["/name"]),
        artist_name: string(&["/byArtist/name"]),
        artist_url: string(&["/byArtist/@id"]),
        cover_image_url: string(&["/image", "/albumRelease/0/image/0"]),
        date_published: root
            .get("datePublished")
            .and_then(Value::as_str)
            .and_then(parse_published_date),
        num_tracks,
        tracks,
    };

    debug!(
        title = album.title.as_deref().unwrap_or("?"),
        declared_tracks = album.num_tracks,
        extracted_tracks = album.tracks.len(),
        has_date = album.date_published.is_some(),
        "Extracted album metadata"
    );

    Ok(album)
}

/// One `itemListElement` entry; entries without an `item` object are skipped
fn track_from_list_item(list_item: &Value) -> Option<Track> {
    let item = list_item.get("item").filter(|item| item.is_object())?;

    let text = |pointers: &[&str]| first_present(item, pointers, Value::as_str);

    Some(Track {
        position: list_item
            .get("position")
            .and_then(json_id)
            .and_then(|p| u32::try_from(p).ok()),
        title: text(&["/name"]).map(str::to_string),
        url: text(&["/mainEntityOfPage", "/@id"]).map(str::to_string),
        duration: text(&["/duration"]).and_then(parse_track_duration),
        track_id: find_track_id(item),
        lyrics: text(&["/recordingOf/lyrics/text"])
            .map(str::trim)
            .filter(|lyrics| !lyrics.is_empty())
            .map(str::to_string),
    })
}

/// Linear scan of `additionalProperty` for the first `track_id` entry
fn find_track_id(item: &Value) -> Option<u64> {
    item.get("additionalProperty")?
        .as_array()?
        .iter()
        .find(|prop| prop.get("name").and_then(Value::as_str) == Some("track_id"))
        .and_then(|prop| prop.get("value"))
        .and_then(json_id)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
