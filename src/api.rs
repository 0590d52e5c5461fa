//! HTTP surface for the overlay: the list endpoint plus the static page.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::aggregator::Aggregator;
use crate::profile::MediaKind;
use crate::types::{ListRequest, SortKey};

pub struct AppState {
    pub aggregator: Aggregator,
    pub public_dir: Option<PathBuf>,
    pub port: u16,
}

/// Query string accepted by the list endpoints. Everything is optional and
/// loosely parsed; bad values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub media: Option<String>,
    #[serde(rename = "mediaKind")]
    pub media_kind: Option<String>,
    pub mixed: Option<String>,
    pub both: Option<String>,
    pub sort: Option<String>,
    pub speed: Option<String>,
}

fn flag(v: &Option<String>) -> bool {
    match v.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        None => false,
        Some(s) => matches!(s.as_str(), "" | "1" | "true" | "yes" | "on"),
    }
}

impl ListQuery {
    /// `pinned` forces the media kind for the legacy per-kind routes.
    pub fn into_request(self, pinned: Option<MediaKind>) -> ListRequest {
        let media_raw = self.media.or(self.media_kind).unwrap_or_default();
        let media_both = matches!(media_raw.trim().to_ascii_lowercase().as_str(), "both" | "mixed");
        let mixed = pinned.is_none() && (flag(&self.mixed) || flag(&self.both) || media_both);
        ListRequest {
            status: self.status.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| "ALL".to_string()),
            media: pinned.unwrap_or_else(|| MediaKind::parse_or_default(&media_raw)),
            mixed,
            sort: self.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
            speed: self.speed.and_then(|s| s.trim().parse().ok()),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let mut app = Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "ok" }))
        .route("/api/list", get(list))
        .route("/api/manga", get(list_manga))
        .route("/api/anime", get(list_anime));

    if let Some(dir) = state.public_dir.as_ref().filter(|d| d.is_dir()) {
        let page = dir.join("index.html");
        for path in ["/list", "/manga", "/anime"] {
            app = app.route_service(path, ServeFile::new(&page));
        }
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors).with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], state.port));
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://localhost:{}", addr.port());
    axum::serve(listener, app).await?;
    Ok(())
}

async fn list(State(state): State<Arc<AppState>>, Query(q): Query<ListQuery>) -> Response {
    respond(&state, q.into_request(None)).await
}

async fn list_manga(State(state): State<Arc<AppState>>, Query(q): Query<ListQuery>) -> Response {
    respond(&state, q.into_request(Some(MediaKind::Manga))).await
}

async fn list_anime(State(state): State<Arc<AppState>>, Query(q): Query<ListQuery>) -> Response {
    respond(&state, q.into_request(Some(MediaKind::Anime))).await
}

async fn respond(state: &AppState, req: ListRequest) -> Response {
    match state.aggregator.aggregate(&req).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            let code = StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let message = if e.is_config() { e.to_string() } else { format!("Failed to fetch list: {e}") };
            (code, Json(serde_json::json!({ "error": message }))).into_response()
        }
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let base = format!("http://localhost:{}", state.port);
    let user = escape_html(state.aggregator.username().unwrap_or("(not configured)"));
    let links: String = [
        ("READING", "manga", "Currently Reading"),
        ("WATCHING", "anime", "Currently Watching"),
        ("COMPLETED", "manga", "Completed Manga"),
        ("PLANNING", "anime", "Plan to Watch"),
        ("ALL", "manga", "All Manga"),
        ("ALL", "both", "Everything (manga + anime)"),
    ]
    .iter()
    .map(|(status, media, label)| {
        let path = format!("/list?status={status}&media={media}");
        format!("<li><a href=\"{path}\">{label}</a> - <code>{base}{path}</code></li>\n")
    })
    .collect();

    Html(format!(
        "<html><head><title>onstream</title></head>\
         <body style=\"font-family: Arial; padding: 20px;\">\
         <h1>onstream</h1>\
         <p>Server is running. Add a browser source in OBS with one of these URLs:</p>\
         <ul>\n{links}</ul>\
         <p>Username: <strong>{user}</strong></p>\
         <p style=\"color: #999; font-size: 12px;\">Your MyAnimeList lists must be public for scraping to work.</p>\
         </body></html>"
    ))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(pairs: &[(&str, &str)]) -> ListQuery {
        let s = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
        let uri: axum::http::Uri = format!("/api/list?{s}").parse().unwrap();
        Query::<ListQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn defaults() {
        let r = ListQuery::default().into_request(None);
        assert_eq!(r.status, "ALL");
        assert_eq!(r.media, MediaKind::Manga);
        assert!(!r.mixed);
        assert_eq!(r.sort, SortKey::Default);
        assert_eq!(r.speed, None);
    }

    #[test]
    fn parses_params() {
        let r = q(&[("status", "PLANNING"), ("mediaKind", "anime"), ("sort", "title"), ("speed", "90")]).into_request(None);
        assert_eq!(r.status, "PLANNING");
        assert_eq!(r.media, MediaKind::Anime);
        assert_eq!(r.sort, SortKey::Title);
        assert_eq!(r.speed, Some(90));
    }

    #[test]
    fn mixed_flags() {
        assert!(q(&[("mixed", "true")]).into_request(None).mixed);
        assert!(q(&[("both", "")]).into_request(None).mixed);
        assert!(q(&[("media", "both")]).into_request(None).mixed);
        assert!(!q(&[("mixed", "false")]).into_request(None).mixed);
        assert!(!q(&[("mixed", "1")]).into_request(Some(MediaKind::Manga)).mixed);
    }

    #[test]
    fn bad_speed_is_ignored() {
        assert_eq!(q(&[("speed", "fast")]).into_request(None).speed, None);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<b>"a"&b</b>"#), "&lt;b&gt;&quot;a&quot;&amp;b&lt;/b&gt;");
        assert_eq!(escape_html("alice_99"), "alice_99");
    }

    #[test]
    fn pinned_kind_wins() {
        let r = q(&[("media", "manga")]).into_request(Some(MediaKind::Anime));
        assert_eq!(r.media, MediaKind::Anime);
    }
}
