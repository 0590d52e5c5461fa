use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPayload {
    pub key: String,
    pub payload: String,
    pub expires_at: i64,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<String>>;
    async fn put_cache(&self, key: &str, payload: &str, expires_at: i64) -> Result<()>;

    /// Drop entries expired at `now`; returns how many were removed.
    async fn purge_expired(&self, _now: i64) -> Result<usize> {
        Ok(0)
    }
}

/// Process-local cache. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, CachedPayload>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.lock().map(|m| m.len()).unwrap_or(0) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<String>> {
        let map = self.entries.lock().map_err(|_| anyhow::anyhow!("cache lock poisoned"))?;
        Ok(map.get(key).filter(|v| v.expires_at > now).map(|v| v.payload.clone()))
    }

    async fn put_cache(&self, key: &str, payload: &str, expires_at: i64) -> Result<()> {
        let mut map = self.entries.lock().map_err(|_| anyhow::anyhow!("cache lock poisoned"))?;
        map.insert(key.to_string(), CachedPayload { key: key.to_string(), payload: payload.to_string(), expires_at });
        Ok(())
    }

    async fn purge_expired(&self, now: i64) -> Result<usize> {
        let mut map = self.entries.lock().map_err(|_| anyhow::anyhow!("cache lock poisoned"))?;
        let before = map.len();
        map.retain(|_, v| v.expires_at > now);
        Ok(before - map.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_expire() {
        let s = MemoryStorage::new();
        s.put_cache("k", "v", 100).await.unwrap();
        assert_eq!(s.get_cache("k", 99).await.unwrap().as_deref(), Some("v"));
        assert_eq!(s.get_cache("k", 100).await.unwrap(), None);
        assert_eq!(s.get_cache("other", 0).await.unwrap(), None);
        assert_eq!(s.purge_expired(100).await.unwrap(), 1);
        assert!(s.is_empty());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let s = MemoryStorage::new();
        s.put_cache("k", "a", 10).await.unwrap();
        s.put_cache("k", "b", 20).await.unwrap();
        assert_eq!(s.get_cache("k", 15).await.unwrap().as_deref(), Some("b"));
        assert_eq!(s.len(), 1);
    }
}
