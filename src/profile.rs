//! Per media kind lookup tables: status codes, record field names, URL template.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of tracked content. Selects the list endpoint and field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Manga,
    Anime,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Manga, MediaKind::Anime];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Manga => "manga",
            MediaKind::Anime => "anime",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manga" => Some(MediaKind::Manga),
            "anime" => Some(MediaKind::Anime),
            _ => None,
        }
    }

    /// Unknown or empty kinds degrade to manga.
    pub fn parse_or_default(s: &str) -> Self { Self::parse(s).unwrap_or(MediaKind::Manga) }

    pub fn profile(self) -> &'static MediaProfile {
        match self {
            MediaKind::Manga => &MANGA,
            MediaKind::Anime => &ANIME,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Local status vocabulary, independent of the site's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Reading,
    Watching,
    Completed,
    Paused,
    Dropped,
    Planning,
    All,
    Unknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Reading => "READING",
            Status::Watching => "WATCHING",
            Status::Completed => "COMPLETED",
            Status::Paused => "PAUSED",
            Status::Dropped => "DROPPED",
            Status::Planning => "PLANNING",
            Status::All => "ALL",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// Case-insensitive; accepts the site's own spellings for on-hold and plan-to.
    pub fn parse(s: &str) -> Option<Self> {
        let norm: String = s.trim().chars().filter(|c| !matches!(c, '_' | '-' | ' ')).collect::<String>().to_ascii_uppercase();
        match norm.as_str() {
            "READING" | "CURRENT" => Some(Status::Reading),
            "WATCHING" => Some(Status::Watching),
            "COMPLETED" => Some(Status::Completed),
            "PAUSED" | "ONHOLD" => Some(Status::Paused),
            "DROPPED" => Some(Status::Dropped),
            "PLANNING" | "PLANTOREAD" | "PLANTOWATCH" => Some(Status::Planning),
            "ALL" => Some(Status::All),
            "UNKNOWN" => Some(Status::Unknown),
            _ => None,
        }
    }

    pub fn is_concrete(self) -> bool { !matches!(self, Status::All | Status::Unknown) }

    pub fn is_active(self) -> bool { matches!(self, Status::Reading | Status::Watching) }

    /// Ordering used by the `status` sort; unrecognized statuses go last.
    pub fn priority(self) -> u8 {
        match self {
            Status::Reading | Status::Watching => 0,
            Status::Completed => 1,
            Status::Paused => 2,
            Status::Dropped => 3,
            Status::Planning => 4,
            Status::All | Status::Unknown => 5,
        }
    }

    /// Human label for overlays, worded for the media kind.
    pub fn label(self, kind: MediaKind) -> &'static str {
        match (self, kind) {
            (Status::Reading | Status::Watching, MediaKind::Manga) => "Reading",
            (Status::Reading | Status::Watching, MediaKind::Anime) => "Watching",
            (Status::Completed, _) => "Completed",
            (Status::Paused, _) => "On Hold",
            (Status::Dropped, _) => "Dropped",
            (Status::Planning, MediaKind::Manga) => "Plan to Read",
            (Status::Planning, MediaKind::Anime) => "Plan to Watch",
            (Status::All, _) => "All",
            (Status::Unknown, _) => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Static configuration for one media kind.
#[derive(Debug)]
pub struct MediaProfile {
    pub kind: MediaKind,
    /// Local status -> site status code. `ALL` included.
    status_codes: &'static [(Status, u8)],
    pub all_code: u8,
    pub id_field: &'static str,
    pub title_field: &'static str,
    pub image_field: &'static str,
    pub progress_field: &'static str,
    pub status_field: &'static str,
    /// Concrete statuses that together make up `ALL`, in fetch order.
    pub default_statuses: &'static [Status],
    list_path: &'static str,
}

static MANGA: MediaProfile = MediaProfile {
    kind: MediaKind::Manga,
    status_codes: &[
        (Status::Reading, 1),
        (Status::Completed, 2),
        (Status::Paused, 3),
        (Status::Dropped, 4),
        (Status::Planning, 6),
        (Status::All, 7),
    ],
    all_code: 7,
    id_field: "manga_id",
    title_field: "manga_title",
    image_field: "manga_image_path",
    progress_field: "num_read_chapters",
    status_field: "status",
    default_statuses: &[Status::Reading, Status::Completed, Status::Paused, Status::Dropped, Status::Planning],
    list_path: "mangalist",
};

static ANIME: MediaProfile = MediaProfile {
    kind: MediaKind::Anime,
    status_codes: &[
        (Status::Watching, 1),
        (Status::Completed, 2),
        (Status::Paused, 3),
        (Status::Dropped, 4),
        (Status::Planning, 6),
        (Status::All, 7),
    ],
    all_code: 7,
    id_field: "anime_id",
    title_field: "anime_title",
    image_field: "anime_image_path",
    progress_field: "num_watched_episodes",
    status_field: "status",
    default_statuses: &[Status::Watching, Status::Completed, Status::Paused, Status::Dropped, Status::Planning],
    list_path: "animelist",
};

/// Look up the profile for a media kind string; unknown kinds resolve to manga.
pub fn resolve(kind: &str) -> &'static MediaProfile { MediaKind::parse_or_default(kind).profile() }

impl MediaProfile {
    /// This kind's spelling of the "currently consuming" status.
    pub fn active_status(&self) -> Status {
        match self.kind {
            MediaKind::Manga => Status::Reading,
            MediaKind::Anime => Status::Watching,
        }
    }

    /// Map READING/WATCHING onto this kind's active status; others unchanged.
    pub fn localize(&self, status: Status) -> Status {
        if status.is_active() { self.active_status() } else { status }
    }

    pub fn status_to_code(&self, status: Status) -> Option<u8> {
        let status = self.localize(status);
        self.status_codes.iter().find(|(s, _)| *s == status).map(|(_, c)| *c)
    }

    /// Inverse of `status_to_code` restricted to concrete statuses.
    pub fn code_to_status(&self, code: u8) -> Option<Status> {
        self.status_codes.iter().find(|(s, c)| *c == code && s.is_concrete()).map(|(s, _)| *s)
    }

    /// Code to query for a requested status label; anything unmapped asks for everything.
    pub fn code_for_label(&self, label: &str) -> u8 {
        Status::parse(label).and_then(|s| self.status_to_code(s)).unwrap_or(self.all_code)
    }

    /// `{origin}/{kind}list/{username}?status={code}`
    pub fn list_url(&self, origin: &str, username: &str, code: u8) -> Result<url::Url, url::ParseError> {
        let mut url = url::Url::parse(origin)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(self.list_path)
            .push(username);
        url.query_pairs_mut().clear().append_pair("status", &code.to_string());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_falls_back_to_manga() {
        assert_eq!(resolve("").kind, MediaKind::Manga);
        assert_eq!(resolve("novel").kind, MediaKind::Manga);
        assert_eq!(resolve("ANIME").kind, MediaKind::Anime);
    }

    #[test]
    fn default_statuses_round_trip() {
        for kind in MediaKind::ALL {
            let p = kind.profile();
            assert_eq!(p.default_statuses.len(), 5);
            for s in p.default_statuses {
                let code = p.status_to_code(*s).unwrap();
                assert_eq!(p.code_to_status(code), Some(*s), "{kind} {s}");
            }
        }
    }

    #[test]
    fn all_code_has_no_inverse() {
        for kind in MediaKind::ALL {
            let p = kind.profile();
            assert_eq!(p.status_to_code(Status::All), Some(7));
            assert_eq!(p.code_to_status(7), None);
            assert_eq!(p.code_to_status(5), None);
        }
    }

    #[test]
    fn active_status_aliases_per_kind() {
        let anime = MediaKind::Anime.profile();
        assert_eq!(anime.status_to_code(Status::Reading), Some(1));
        assert_eq!(anime.code_to_status(1), Some(Status::Watching));
        let manga = MediaKind::Manga.profile();
        assert_eq!(manga.status_to_code(Status::Watching), Some(1));
        assert_eq!(manga.code_to_status(1), Some(Status::Reading));
    }

    #[test]
    fn unmapped_labels_query_everything() {
        let p = MediaKind::Manga.profile();
        assert_eq!(p.code_for_label("PLANNING"), 6);
        assert_eq!(p.code_for_label("plan_to_read"), 6);
        assert_eq!(p.code_for_label(""), 7);
        assert_eq!(p.code_for_label("SOMETHING"), 7);
    }

    #[test]
    fn builds_list_urls() {
        let url = MediaKind::Anime.profile().list_url("https://myanimelist.net", "some user", 6).unwrap();
        assert_eq!(url.as_str(), "https://myanimelist.net/animelist/some%20user?status=6");
        let url = MediaKind::Manga.profile().list_url("http://127.0.0.1:9000/", "bob", 7).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/mangalist/bob?status=7");
    }

    #[test]
    fn labels_follow_kind() {
        assert_eq!(Status::Planning.label(MediaKind::Anime), "Plan to Watch");
        assert_eq!(Status::Reading.label(MediaKind::Anime), "Watching");
        assert_eq!(Status::Paused.label(MediaKind::Manga), "On Hold");
    }
}
