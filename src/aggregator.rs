use futures::future::join_all;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ListError;
use crate::profile::{MediaKind, Status};
use crate::source::ListSource;
use crate::storage::Storage;
use crate::types::{AggregateResult, ListEntry, ListRequest, SortKey};

/// One (media kind, status) fetch within a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub kind: MediaKind,
    pub status: String,
}

/// Aggregator owns the list source (and optional cache) and turns an overlay
/// request into one merged, deduplicated, sorted payload.
pub struct Aggregator {
    source: Arc<dyn ListSource>,
    storage: Option<Arc<dyn Storage>>,
    username: Option<String>,
    scroll_speed: u32,
    // Branch cache TTL (seconds); 0 = always re-scrape
    cache_ttl_secs: i64,
}

impl Aggregator {
    pub fn new(config: &Config, source: Arc<dyn ListSource>) -> Self {
        Self {
            source,
            storage: None,
            username: config.identity().map(str::to_string),
            scroll_speed: config.scroll_speed,
            cache_ttl_secs: config.cache_ttl_secs.max(0),
        }
    }

    /// Attach a cache. Only consulted when the TTL is positive.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn username(&self) -> Option<&str> { self.username.as_deref() }
    pub fn scroll_speed(&self) -> u32 { self.scroll_speed }

    /// Branches to fetch for a request, in merge order.
    pub fn plan(request: &ListRequest) -> Vec<Branch> {
        let mut out = Vec::new();
        for kind in request.kinds() {
            let profile = kind.profile();
            if request.wants_all() {
                for s in profile.default_statuses {
                    out.push(Branch { kind, status: s.as_str().to_string() });
                }
            } else {
                // READING on an anime list means WATCHING and vice versa
                let status = Status::parse(&request.status)
                    .map(|s| profile.localize(s).as_str().to_string())
                    .unwrap_or_else(|| request.status.trim().to_string());
                out.push(Branch { kind, status });
            }
        }
        out
    }

    pub async fn aggregate(&self, request: &ListRequest) -> Result<AggregateResult, ListError> {
        let username = self.username.as_deref().ok_or_else(|| {
            ListError::Config("MyAnimeList username not configured. Please set username in the config file".to_string())
        })?;

        let branches = Self::plan(request);
        let outcomes = join_all(branches.iter().map(|b| self.fetch_branch(username, b))).await;

        let single = branches.len() == 1;
        let mut first_err: Option<ListError> = None;
        let mut lists = Vec::with_capacity(branches.len());
        for (branch, outcome) in branches.iter().zip(outcomes) {
            match outcome {
                Ok(list) => {
                    tracing::debug!(kind = %branch.kind, status = %branch.status, count = list.len(), "branch fetched");
                    lists.push(list);
                }
                Err(e) => {
                    tracing::error!(kind = %branch.kind, status = %branch.status, error = %e, "branch failed");
                    if first_err.is_none() { first_err = Some(e); }
                }
            }
        }

        // Partial results win; only surface an error when nothing came back
        if lists.is_empty() {
            if let Some(e) = first_err {
                if !single { tracing::warn!(branches = branches.len(), "every branch failed"); }
                return Err(e);
            }
        }

        let mut items = merge_dedup(lists);
        sort_entries(&mut items, request.sort);
        tracing::info!(username, media = ?request.selection(), count = items.len(), "list assembled");

        Ok(AggregateResult {
            items,
            username: username.to_string(),
            scroll_speed: request.speed.unwrap_or(self.scroll_speed),
            media: request.selection(),
        })
    }

    async fn fetch_branch(&self, username: &str, branch: &Branch) -> Result<Vec<ListEntry>, ListError> {
        let storage = self.storage.as_ref().filter(|_| self.cache_ttl_secs > 0);
        // Keyed by the resolved code: unknown labels all hit the same page
        let code = branch.kind.profile().code_for_label(&branch.status);
        let key = format!("{}|list|{}|{}", username.to_ascii_lowercase(), branch.kind, code);
        let now = current_epoch();

        if let Some(store) = storage {
            if let Some(payload) = store.get_cache(&key, now).await.ok().flatten() {
                if let Ok(list) = serde_json::from_str::<Vec<ListEntry>>(&payload) {
                    tracing::debug!(%key, "cache hit");
                    return Ok(list);
                }
            }
        }

        let list = self.source.fetch_list(username, &branch.status, branch.kind).await?;

        if let Some(store) = storage {
            if let Err(e) = store.purge_expired(now).await {
                tracing::warn!(error = %e, "cache purge failed");
            }
            if let Ok(payload) = serde_json::to_string(&list) {
                let _ = store.put_cache(&key, &payload, now + self.cache_ttl_secs).await;
            }
        }
        Ok(list)
    }
}

/// Concatenate branch results, keeping the first entry seen per (media, id).
pub fn merge_dedup(lists: impl IntoIterator<Item = Vec<ListEntry>>) -> Vec<ListEntry> {
    let mut seen: HashSet<(MediaKind, u64)> = HashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for entry in list {
            if seen.insert((entry.media, entry.id)) { out.push(entry); }
        }
    }
    out
}

pub fn sort_entries(items: &mut [ListEntry], key: SortKey) {
    match key {
        SortKey::Default => {}
        SortKey::Title => items.sort_by(|a, b| a.title.cmp(&b.title)),
        SortKey::Status => items.sort_by_key(|e| e.status.priority()),
        SortKey::Progress => items.sort_by(|a, b| b.progress.cmp(&a.progress)),
        SortKey::Random => items.shuffle(&mut rand::thread_rng()),
    }
}

fn current_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
