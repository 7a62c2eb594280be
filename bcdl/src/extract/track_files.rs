//! Track file links from the page's `data-tralbum` payload
//!
//! The payload is a JSON object whose `trackinfo` list carries, per track,
//! `track_id` (or `id`) and a `file` object keyed by audio format:
//!
//! ```text
//! { "trackinfo": [ { "track_id": 123, "file": { "mp3-128": "https://..." } } ] }
//! ```

use super::{first_present, json_id, select_first};
use crate::error::{Error, Result};
use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const TRALBUM_SELECTOR: &str = "script[data-tralbum]";
const TRALBUM_ATTRIBUTE: &str = "data-tralbum";

/// Audio variant exposed to anonymous listeners
pub const FILE_FORMAT: &str = "mp3-128";

/// Mapping from track id to downloadable file link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrackFileMap(BTreeMap<u64, String>);

impl TrackFileMap {
    /// Build a map from `(track id, file link)` pairs.
    ///
    /// Fails on the first repeated id.
    pub fn from_entries(entries: impl IntoIterator<Item = (u64, String)>) -> Result<Self> {
        let mut files = BTreeMap::new();
        for (track_id, url) in entries {
            if files.insert(track_id, url).is_some() {
                return Err(Error::DuplicateTrackId(track_id));
            }
        }
        Ok(Self(files))
    }

    pub fn get(&self, track_id: u64) -> Option<&str> {
        self.0.get(&track_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct TralbumData {
    #[serde(default)]
    trackinfo: Option<Vec<Value>>,
}

/// Extract the track file map from a parsed page.
///
/// Fails when the `data-tralbum` node is missing, its attribute is blank or
/// not a JSON object, or two entries share an id.
pub fn extract_track_files(document: &Html) -> Result<TrackFileMap> {
    let node = select_first(document, TRALBUM_SELECTOR).ok_or(Error::TrackInfoNodeMissing)?;

    // Attribute values come back from the HTML parser with entities decoded
    let payload = node
        .value()
        .attr(TRALBUM_ATTRIBUTE)
        .map(str::trim)
        .unwrap_or_default();
    if payload.is_empty() {
        return Err(Error::TrackInfoAttributeEmpty);
    }

    track_files_from_payload(payload)
}

/// Build the track file map from the raw `data-tralbum` JSON text
pub fn track_files_from_payload(payload: &str) -> Result<TrackFileMap> {
    let data: TralbumData =
        serde_json::from_str(payload).map_err(|e| Error::TrackInfoParse(e.to_string()))?;

    let entries = data.trackinfo.unwrap_or_default();
    let total = entries.len();
    let files = TrackFileMap::from_entries(entries.iter().filter_map(file_entry))?;

    if files.len() < total {
        debug!(
            dropped = total - files.len(),
            "Skipped track info entries without id or {} link", FILE_FORMAT
        );
    }
    debug!(track_files = files.len(), "Extracted track file links");

    Ok(files)
}

/// `(id, link)` for one `trackinfo` entry, `None` when either is missing
fn file_entry(entry: &Value) -> Option<(u64, String)> {
    let track_id = first_present(entry, &["/track_id", "/id"], json_id)?;
    let url = entry
        .get("file")
        .and_then(|file| file.get(FILE_FORMAT))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())?;
    Some((track_id, url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_field_variants_and_encodings() {
        let url = "https://t4.bcbits.com/stream/abc/mp3-128/1?p=0&ts=1&t=x";
        let entries = [
            json!({ "track_id": 1001, "file": { "mp3-128": url } }),
            json!({ "track_id": "1001", "file": { "mp3-128": url } }),
            json!({ "id": 1001, "file": { "mp3-128": url } }),
            json!({ "id": "1001", "file": { "mp3-128": url } }),
            json!({ "track_id": null, "id": "1001", "file": { "mp3-128": url } }),
        ];

        for entry in &entries {
            assert_eq!(file_entry(entry), Some((1001, url.to_string())), "entry {}", entry);
        }
    }

    #[test]
    fn test_track_id_preferred_over_id() {
        let entry = json!({ "track_id": 7, "id": 8, "file": { "mp3-128": "u" } });
        assert_eq!(file_entry(&entry).map(|(id, _)| id), Some(7));
    }

    #[test]
    fn test_incomplete_entries_dropped() {
        let payload = json!({ "trackinfo": [
            { "track_id": 1, "file": { "mp3-128": "https://a" } },
            { "track_id": 2, "file": null },
            { "track_id": 3, "file": { "mp3-v0": "https://c" } },
            { "track_id": 4, "file": { "mp3-128": "   " } },
            { "file": { "mp3-128": "https://e" } },
            "not an entry"
        ]})
        .to_string();

        let files = track_files_from_payload(&payload).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files.get(1), Some("https://a"));
        assert_eq!(files.get(2), None);
    }

    #[test]
    fn test_missing_trackinfo_is_empty_map() {
        assert!(track_files_from_payload(r#"{"current": {}}"#).unwrap().is_empty());
        assert!(track_files_from_payload(r#"{"trackinfo": null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let payload = json!({ "trackinfo": [
            { "track_id": 5, "file": { "mp3-128": "https://a" } },
            { "id": "5", "file": { "mp3-128": "https://b" } }
        ]})
        .to_string();

        assert!(matches!(
            track_files_from_payload(&payload),
            Err(Error::DuplicateTrackId(5))
        ));
    }

    #[test]
    fn test_non_object_payload_rejected() {
        assert!(matches!(
            track_files_from_payload("[1, 2]"),
            Err(Error::TrackInfoParse(_))
        ));
        assert!(matches!(
            track_files_from_payload("{not json"),
            Err(Error::TrackInfoParse(_))
        ));
    }

    #[test]
    fn test_extract_from_encoded_attribute() {
        let html = concat!(
            r#"<html><body><script data-tralbum="{&quot;trackinfo&quot;:[{"#,
            r#"&quot;track_id&quot;:9,&quot;file&quot;:{&quot;mp3-128&quot;:"#,
            r#"&quot;https://t4.bcbits.com/stream/x?p=0&amp;ts=1&quot;}}]}""#,
            r#" src="tralbum.js"></script></body></html>"#,
        );
        let document = Html::parse_document(html);

        let files = extract_track_files(&document).unwrap();

        assert_eq!(files.get(9), Some("https://t4.bcbits.com/stream/x?p=0&ts=1"));
    }

    #[test]
    fn test_missing_node_and_empty_attribute() {
        let document =
            Html::parse_document(r#"<html><body><script src="a.js"></script></body></html>"#);
        assert!(matches!(
            extract_track_files(&document),
            Err(Error::TrackInfoNodeMissing)
        ));

        let document = Html::parse_document(
            r#"<html><body><script data-tralbum=" "></script></body></html>"#,
        );
        assert!(matches!(
            extract_track_files(&document),
            Err(Error::TrackInfoAttributeEmpty)
        ));
    }
}
