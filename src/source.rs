//! Fetching and decoding one list page.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ListError;
use crate::extract::{ListDataLocator, TableAttributeLocator};
use crate::image;
use crate::profile::{MediaKind, MediaProfile, Status};
use crate::types::{ListEntry, RawRecord};

pub const DEFAULT_ORIGIN: &str = "https://myanimelist.net";

// The site rejects clients it does not recognise
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Anything that can produce one branch of a list: one status of one media kind.
#[async_trait]
pub trait ListSource: Send + Sync {
    async fn fetch_list(&self, username: &str, status: &str, kind: MediaKind) -> Result<Vec<ListEntry>, ListError>;
}

/// Scrapes public list pages over HTTPS.
pub struct MalSource {
    client: reqwest::Client,
    origin: String,
    locator: Box<dyn ListDataLocator>,
}

impl MalSource {
    /// A zero `timeout` disables the per-request deadline.
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, ListError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5));
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| ListError::Transport { url: origin.to_string(), source })?;
        Ok(Self { client, origin: origin.to_string(), locator: Box::new(TableAttributeLocator::default()) })
    }

    /// Swap the embedded-data heuristic.
    pub fn with_locator(mut self, locator: impl ListDataLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    pub fn origin(&self) -> &str { &self.origin }

    async fn fetch_page(&self, url: &str) -> Result<String, ListError> {
        let resp = self.client.get(url).send().await
            .map_err(|source| ListError::Transport { url: url.to_string(), source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ListError::HttpStatus { url: url.to_string(), status: status.as_u16() });
        }
        resp.text().await.map_err(|source| ListError::Transport { url: url.to_string(), source })
    }
}

#[async_trait]
impl ListSource for MalSource {
    async fn fetch_list(&self, username: &str, status: &str, kind: MediaKind) -> Result<Vec<ListEntry>, ListError> {
        let profile = kind.profile();
        let code = profile.code_for_label(status);
        let url = profile.list_url(&self.origin, username, code)
            .map_err(|e| ListError::Config(format!("invalid list origin {}: {e}", self.origin)))?;

        tracing::debug!(%url, %kind, status, "fetching list page");
        let html = self.fetch_page(url.as_str()).await?;
        let entries = parse_list_page(&html, self.locator.as_ref(), profile, status)?;
        tracing::debug!(%kind, status, count = entries.len(), "parsed list page");
        Ok(entries)
    }
}

/// Extract, decode and normalize every record on a list page.
pub fn parse_list_page(html: &str, locator: &dyn ListDataLocator, profile: &MediaProfile, requested: &str) -> Result<Vec<ListEntry>, ListError> {
    let blob = locator.locate(html).ok_or(ListError::MissingListData)?;
    let records: Vec<RawRecord> = serde_json::from_str(&blob)?;

    // Label used when a record's own status code has no mapping
    let fallback = Status::parse(requested)
        .filter(|s| s.is_concrete())
        .map(|s| profile.localize(s))
        .unwrap_or(Status::Unknown);

    Ok(records.iter().map(|r| entry_from_record(r, profile, fallback)).collect())
}

pub fn entry_from_record(record: &RawRecord, profile: &MediaProfile, fallback: Status) -> ListEntry {
    let code = record.uint(profile.status_field);
    let status = match code.and_then(|c| u8::try_from(c).ok()).and_then(|c| profile.code_to_status(c)) {
        Some(s) => s,
        None => {
            tracing::debug!(kind = %profile.kind, code = ?code, fallback = %fallback, "unmapped status code");
            fallback
        }
    };
    ListEntry {
        id: record.uint(profile.id_field).unwrap_or_default(),
        title: record.text(profile.title_field).unwrap_or_default(),
        cover_image: image::normalize(record.text(profile.image_field).as_deref()),
        status,
        progress: record.uint(profile.progress_field).unwrap_or(0),
        media: profile.kind,
    }
}
