//! Cover image URL normalization.

pub const PLACEHOLDER_COVER: &str = "https://cdn.myanimelist.net/images/qm_50.gif";
pub const CDN_ORIGIN: &str = "https://cdn.myanimelist.net";

// Thumbnail resize segments the list page serves instead of the full asset
const THUMBNAIL_SEGMENTS: [&str; 2] = ["/r/96x136", "/r/50x70"];

/// Turn a possibly relative, thumbnail-sized image path into an absolute
/// full-resolution URL. Missing paths yield the placeholder cover.
pub fn normalize(path: Option<&str>) -> String {
    let raw = match path.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return PLACEHOLDER_COVER.to_string(),
    };

    let mut url = raw.to_string();
    for seg in THUMBNAIL_SEGMENTS {
        if url.contains(seg) { url = url.replace(seg, ""); }
    }

    if url.starts_with("//") {
        format!("https:{url}")
    } else if !url.starts_with("http") {
        if url.starts_with('/') { format!("{CDN_ORIGIN}{url}") } else { format!("{CDN_ORIGIN}/{url}") }
    } else {
        url
    }
}
