//! Extraction of the two JSON payloads embedded in a rendered album page
//!
//! - [`metadata`]: the `application/ld+json` linked-data blob (album, tracks)
//! - [`track_files`]: the `data-tralbum` attribute (track id → file link)
//!
//! Both extractors read disjoint nodes of the same parsed document.

pub mod metadata;
pub mod parse;
pub mod track_files;

pub use metadata::{album_from_linked_data, extract_album};
pub use track_files::{extract_track_files, TrackFileMap};

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Ordered fallback lookup.
///
/// Resolves each JSON pointer in turn and returns the first value the
/// accessor accepts. Paths that are missing, or whose value the accessor
/// rejects, fall through to the next one.
///
/// ```
/// use bcdl::extract::first_present;
/// use serde_json::{json, Value};
///
/// let item = json!({ "@id": "https://x.bandcamp.com/track/a" });
/// let url = first_present(&item, &["/mainEntityOfPage", "/@id"], Value::as_str);
/// assert_eq!(url, Some("https://x.bandcamp.com/track/a"));
/// ```
pub fn first_present<'a, T>(
    value: &'a Value,
    pointers: &[&str],
    accessor: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    pointers
        .iter()
        .filter_map(|pointer| value.pointer(pointer))
        .find_map(accessor)
}

/// Read a numeric id encoded either as a JSON integer or a numeric string
pub fn json_id(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// First element matching a CSS selector
pub(crate) fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_present_prefers_earlier_path() {
        let value = json!({ "mainEntityOfPage": "page", "@id": "id" });
        assert_eq!(
            first_present(&value, &["/mainEntityOfPage", "/@id"], Value::as_str),
            Some("page")
        );
    }

    #[test]
    fn test_first_present_skips_null_and_wrong_type() {
        let value = json!({ "image": null, "albumRelease": [{ "image": [42, "cover.jpg"] }] });
        assert_eq!(
            first_present(&value, &["/image", "/albumRelease/0/image/0"], Value::as_str),
            None
        );

        let value = json!({ "image": null, "albumRelease": [{ "image": ["cover.jpg"] }] });
        assert_eq!(
            first_present(&value, &["/image", "/albumRelease/0/image/0"], Value::as_str),
            Some("cover.jpg")
        );
    }

    #[test]
    fn test_first_present_nothing_found() {
        let value = json!({});
        assert_eq!(first_present(&value, &["/a", "/b/c"], Value::as_str), None);
    }

    #[test]
    fn test_json_id_encodings() {
        assert_eq!(json_id(&json!(1234567890)), Some(1234567890));
        assert_eq!(json_id(&json!("1234567890")), Some(1234567890));
        assert_eq!(json_id(&json!(" 42 ")), Some(42));
        assert_eq!(json_id(&json!("abc")), None);
        assert_eq!(json_id(&json!(-5)), None);
        assert_eq!(json_id(&json!(1.5)), None);
        assert_eq!(json_id(&Value::Null), None);
    }
}
