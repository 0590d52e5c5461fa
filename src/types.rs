use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::profile::{MediaKind, Status};

/// One title on a user's list, in the shape the overlay consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    pub id: u64,
    pub title: String,
    pub cover_image: String,
    pub status: Status,
    pub progress: u64,
    pub media: MediaKind,
}

/// `media` field of a response: one kind, or both merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSelection {
    Manga,
    Anime,
    Mixed,
}

impl From<MediaKind> for MediaSelection {
    fn from(k: MediaKind) -> Self {
        match k {
            MediaKind::Manga => MediaSelection::Manga,
            MediaKind::Anime => MediaSelection::Anime,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub items: Vec<ListEntry>,
    pub username: String,
    pub scroll_speed: u32,
    pub media: MediaSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Default,
    Title,
    Status,
    Progress,
    Random,
}

impl SortKey {
    /// Unrecognized keys keep merge order.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => SortKey::Title,
            "status" => SortKey::Status,
            "progress" => SortKey::Progress,
            "random" | "shuffle" => SortKey::Random,
            _ => SortKey::Default,
        }
    }
}

/// What the caller asked for. `status` stays a raw label: unknown labels
/// degrade to the broadest query instead of failing.
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub status: String,
    pub media: MediaKind,
    pub mixed: bool,
    pub sort: SortKey,
    pub speed: Option<u32>,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self { status: Status::All.as_str().to_string(), media: MediaKind::Manga, mixed: false, sort: SortKey::Default, speed: None }
    }
}

impl ListRequest {
    pub fn wants_all(&self) -> bool {
        let s = self.status.trim();
        s.is_empty() || s.eq_ignore_ascii_case("ALL")
    }

    pub fn kinds(&self) -> Vec<MediaKind> {
        if self.mixed { MediaKind::ALL.to_vec() } else { vec![self.media] }
    }

    pub fn selection(&self) -> MediaSelection {
        if self.mixed { MediaSelection::Mixed } else { self.media.into() }
    }
}

/// A record from the page's embedded blob. Nothing about its shape is
/// guaranteed, so every accessor tolerates missing, null or mistyped fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key).filter(|v| !v.is_null()) }

    /// Non-negative integer, from a JSON number or a numeric string.
    pub fn uint(&self, key: &str) -> Option<u64> {
        match self.get(key)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_serializes_camel_case() {
        let e = ListEntry { id: 2, title: "Berserk".into(), cover_image: "https://x/y.jpg".into(), status: Status::Reading, progress: 364, media: MediaKind::Manga };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v, json!({"id": 2, "title": "Berserk", "coverImage": "https://x/y.jpg", "status": "READING", "progress": 364, "media": "manga"}));
    }

    #[test]
    fn result_serializes_mixed_marker() {
        let r = AggregateResult { items: vec![], username: "u".into(), scroll_speed: 60, media: MediaSelection::Mixed };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v, json!({"items": [], "username": "u", "scrollSpeed": 60, "media": "mixed"}));
    }

    #[test]
    fn raw_record_tolerates_bad_fields() {
        let r: RawRecord = serde_json::from_value(json!({"a": 5, "b": "12", "c": null, "d": [1], "e": -3, "f": "x"})).unwrap();
        assert_eq!(r.uint("a"), Some(5));
        assert_eq!(r.uint("b"), Some(12));
        assert_eq!(r.uint("c"), None);
        assert_eq!(r.uint("d"), None);
        assert_eq!(r.uint("e"), None);
        assert_eq!(r.uint("f"), None);
        assert_eq!(r.uint("missing"), None);
        assert_eq!(r.text("a").as_deref(), Some("5"));
        assert_eq!(r.text("c"), None);
    }

    #[test]
    fn sort_keys_parse_loosely() {
        assert_eq!(SortKey::parse("TITLE"), SortKey::Title);
        assert_eq!(SortKey::parse("progress"), SortKey::Progress);
        assert_eq!(SortKey::parse("random"), SortKey::Random);
        assert_eq!(SortKey::parse(""), SortKey::Default);
        assert_eq!(SortKey::parse("rating"), SortKey::Default);
    }

    #[test]
    fn request_defaults() {
        let r = ListRequest::default();
        assert!(r.wants_all());
        assert_eq!(r.kinds(), vec![MediaKind::Manga]);
        assert_eq!(r.selection(), MediaSelection::Manga);
        let mixed = ListRequest { mixed: true, ..ListRequest::default() };
        assert_eq!(mixed.kinds(), vec![MediaKind::Manga, MediaKind::Anime]);
        assert_eq!(mixed.selection(), MediaSelection::Mixed);
    }
}
